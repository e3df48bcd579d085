use oncostat::{join, AnimalRecord, Field, MeasurementRecord, NullPolicy, Sex, NA};

fn animals() -> Vec<AnimalRecord> {
    vec![
        AnimalRecord::new("b128", Some("Capomulin"), Sex::Female, 9, 22.0),
        AnimalRecord::new("k403", Some("Ramicane"), Sex::Male, 21, 16.0),
    ]
}

#[test]
fn test_left_join_keeps_measurement_order() {
    let measurements = vec![
        MeasurementRecord::new("k403", 5, 38.8, 0, None),
        MeasurementRecord::new("b128", 0, 45.0, 0, None),
        MeasurementRecord::new("k403", 0, 45.0, 0, None),
    ];
    let frame = join(&measurements, &animals());

    assert_eq!(frame.len(), measurements.len());
    let order: Vec<(&str, u32)> = frame.iter().map(|r| (r.mouse_id.as_str(), r.timepoint)).collect();
    assert_eq!(order, vec![("k403", 5), ("b128", 0), ("k403", 0)]);
    assert_eq!(frame.rows()[1].weight_g, NA::Value(22.0));
    assert_eq!(frame.rows()[0].drug_regimen, NA::Value("Ramicane".to_string()));
}

#[test]
fn test_unmatched_rows_degrade_to_na() {
    let measurements = vec![
        MeasurementRecord::new("b128", 0, 45.0, 0, None),
        MeasurementRecord::new("zz99", 0, 47.5, 2, None),
    ];
    let frame = join(&measurements, &animals());

    assert_eq!(frame.len(), 2);
    assert_eq!(frame.unmatched_count(), 1);
    let orphan = &frame.rows()[1];
    assert!(!orphan.is_matched());
    assert_eq!(orphan.sex, NA::NA);
    assert_eq!(orphan.age_months, NA::NA);
    assert_eq!(orphan.tumor_volume, 47.5);
    assert_eq!(orphan.metastatic_sites, 2);

    let (weights, excluded) = frame.numeric_values(Field::WeightG, NullPolicy::Exclude).unwrap();
    assert_eq!(weights, vec![22.0]);
    assert_eq!(excluded, 1);
}

#[test]
fn test_join_empty_inputs() {
    let frame = join(&[], &animals());
    assert!(frame.is_empty());

    let measurements = vec![MeasurementRecord::new("b128", 0, 45.0, 0, None)];
    let frame = join(&measurements, &[]);
    assert_eq!(frame.len(), 1);
    assert_eq!(frame.unmatched_count(), 1);
}

#[test]
fn test_measurement_regimen_takes_precedence() {
    let measurements = vec![
        MeasurementRecord::new("b128", 0, 45.0, 0, Some("Placebo")),
        MeasurementRecord::new("b128", 5, 44.0, 0, None),
    ];
    let frame = join(&measurements, &animals());
    assert_eq!(frame.rows()[0].drug_regimen, NA::Value("Placebo".to_string()));
    assert_eq!(frame.rows()[1].drug_regimen, NA::Value("Capomulin".to_string()));
}
