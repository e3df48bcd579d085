mod common;

use common::sample_study;
use oncostat::dataframe::Scalar;
use oncostat::{
    average_by_animal, box_stats_by, count_animals_by, join, load, par_summarize, summarize, AnimalRecord, Error,
    Field, GroupKey, MeasurementRecord, NullPolicy, Sex, NA,
};

#[test]
fn test_summarize_sample_study() {
    let files = sample_study("groupby_summary");
    let study = load(&files.config()).unwrap();
    let table = summarize(&study.frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude).unwrap();

    let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["Capomulin", "Infubinol", "Ramicane"]);

    let infubinol = table.get("Infubinol").unwrap();
    let values = [45.0, 48.508468, 51.852437];
    let mean = values.iter().sum::<f64>() / 3.0;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 2.0;
    assert_eq!(infubinol.count, 3);
    assert!((infubinol.mean - mean).abs() < 1e-9);
    assert!((infubinol.median - 48.508468).abs() < 1e-9);
    assert!((infubinol.variance - variance).abs() < 1e-9);
    assert!((infubinol.std_dev - variance.sqrt()).abs() < 1e-9);
    assert!((infubinol.sem - variance.sqrt() / 3f64.sqrt()).abs() < 1e-9);
    assert_eq!(table.missing_key_rows, 0);
}

#[test]
fn test_single_row_group_is_undefined_spread() {
    let animals = vec![
        AnimalRecord::new("a1", Some("Capomulin"), Sex::Male, 1, 20.0),
        AnimalRecord::new("a2", Some("Zoniferol"), Sex::Male, 1, 20.0),
    ];
    let measurements = vec![
        MeasurementRecord::new("a1", 0, 45.0, 0, None),
        MeasurementRecord::new("a1", 5, 41.0, 0, None),
        MeasurementRecord::new("a2", 0, 46.25, 0, None),
    ];
    let frame = join(&measurements, &animals);
    let table = summarize(&frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude).unwrap();

    let single = table.get("Zoniferol").unwrap();
    assert_eq!(single.mean, 46.25);
    assert_eq!(single.median, 46.25);
    assert!(single.variance.is_nan());
    assert!(single.sem.is_nan());

    // the sibling group is unaffected
    let capomulin = table.get("Capomulin").unwrap();
    assert_eq!(capomulin.variance, 8.0);
}

#[test]
fn test_null_policy_on_unmatched_rows() {
    let animals = vec![AnimalRecord::new("a1", Some("Capomulin"), Sex::Male, 1, 20.0)];
    let measurements = vec![
        MeasurementRecord::new("a1", 0, 45.0, 0, None),
        MeasurementRecord::new("ghost", 0, 45.0, 0, Some("Capomulin")),
    ];
    let frame = join(&measurements, &animals);

    let table = summarize(&frame, Field::DrugRegimen, Field::WeightG, NullPolicy::Exclude).unwrap();
    let capomulin = table.get("Capomulin").unwrap();
    assert_eq!(capomulin.count, 1);
    assert_eq!(capomulin.excluded, 1);

    let err = summarize(&frame, Field::DrugRegimen, Field::WeightG, NullPolicy::Strict).unwrap_err();
    assert!(matches!(err, Error::MissingValues { ref field, count: 1 } if field == "weight_g"));
}

#[test]
fn test_par_summarize_equals_summarize() {
    let files = sample_study("groupby_parallel");
    let study = load(&files.config()).unwrap();
    let seq = summarize(&study.frame, Field::MouseId, Field::TumorVolume, NullPolicy::Exclude).unwrap();
    let par = par_summarize(&study.frame, Field::MouseId, Field::TumorVolume, NullPolicy::Exclude).unwrap();

    assert_eq!(seq.len(), 7);
    for ((k1, a), (k2, b)) in seq.iter().zip(par.iter()) {
        assert_eq!(k1, k2);
        assert_eq!(a.count, b.count);
        assert_eq!(a.mean.to_bits(), b.mean.to_bits());
        assert_eq!(a.variance.to_bits(), b.variance.to_bits());
    }
}

#[test]
fn test_count_by_regimen_and_sex() {
    let files = sample_study("groupby_counts");
    let study = load(&files.config()).unwrap();

    let regimens = study.frame.count_by(Field::DrugRegimen);
    let pairs: Vec<(String, usize)> = regimens.iter().map(|c| (c.label(), c.count)).collect();
    assert_eq!(
        pairs,
        vec![
            ("Capomulin".to_string(), 12),
            ("Ramicane".to_string(), 6),
            ("Infubinol".to_string(), 3)
        ]
    );
    assert_eq!(regimens.iter().map(|c| c.count).sum::<usize>(), study.frame.len());

    let sexes = count_animals_by(&study.animals, Field::Sex).unwrap();
    assert_eq!(sexes[0].label(), "Female");
    assert_eq!(sexes[0].count, 4);
    assert_eq!(sexes[1].count, 3);
}

#[test]
fn test_count_by_sex_ties_and_order() {
    let animals: Vec<AnimalRecord> = [
        ("f1", Sex::Female),
        ("m1", Sex::Male),
        ("f2", Sex::Female),
        ("m2", Sex::Male),
        ("f3", Sex::Female),
    ]
    .iter()
    .map(|&(id, sex)| AnimalRecord::new(id, Some("Capomulin"), sex, 1, 20.0))
    .collect();
    let measurements: Vec<MeasurementRecord> = animals
        .iter()
        .map(|a| MeasurementRecord::new(a.mouse_id.clone(), 0, 45.0, 0, None))
        .collect();
    let frame = join(&measurements, &animals);

    let counts = frame.count_by(Field::Sex);
    assert_eq!(counts.len(), 2);
    assert_eq!((counts[0].label(), counts[0].count), ("Female".to_string(), 3));
    assert_eq!((counts[1].label(), counts[1].count), ("Male".to_string(), 2));
}

#[test]
fn test_filters() {
    let files = sample_study("groupby_filters");
    let study = load(&files.config()).unwrap();
    let frame = &study.frame;

    let subset = frame.filter_by_category(Field::DrugRegimen, ["Capomulin", "Ramicane"]);
    assert_eq!(subset.len(), 18);
    assert!(subset.iter().all(|r| r.drug_regimen != NA::Value("Infubinol".to_string())));

    // case-sensitive
    assert!(frame.filter_by_category(Field::DrugRegimen, ["capomulin"]).is_empty());

    let single = frame.filter_by_exact_match([
        (Field::MouseId, Scalar::from("s185")),
        (Field::DrugRegimen, Scalar::from("Capomulin")),
    ]);
    assert_eq!(single.len(), 3);

    let nobody = frame.filter_by_exact_match([(Field::MouseId, "zz00")]);
    assert!(nobody.is_empty());

    let day_ten = frame.filter_by_exact_match([(Field::Timepoint, Scalar::from(10u32))]);
    assert_eq!(day_ten.len(), 7);
    assert_eq!(frame.final_timepoints().len(), 7);
}

#[test]
fn test_average_by_animal_and_box_stats() {
    let files = sample_study("groupby_average");
    let study = load(&files.config()).unwrap();
    let capomulin = study.frame.filter_by_category(Field::DrugRegimen, ["Capomulin"]);

    let averages = average_by_animal(&capomulin, &[Field::WeightG, Field::TumorVolume], NullPolicy::Exclude).unwrap();
    assert_eq!(averages.len(), 4);
    let s185 = &averages["s185"];
    assert_eq!(s185.observations, 3);
    assert_eq!(s185.weight_g(), NA::Value(17.0));
    let expected = (45.0 + 43.878496 + 37.614948) / 3.0;
    assert!((s185.tumor_volume().value().unwrap() - expected).abs() < 1e-9);

    let boxes = box_stats_by(&study.frame.final_timepoints(), Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude)
        .unwrap();
    assert_eq!(boxes[&GroupKey::from("Capomulin")].count, 4);
    assert_eq!(boxes[&GroupKey::from("Infubinol")].count, 1);
    assert_eq!(boxes[&GroupKey::from("Infubinol")].median, 51.852437);
}

#[test]
fn test_timepoint_groups_in_numeric_order() {
    let files = sample_study("groupby_timepoints");
    let study = load(&files.config()).unwrap();

    let table = summarize(&study.frame, Field::Timepoint, Field::TumorVolume, NullPolicy::Exclude).unwrap();
    let labels: Vec<&str> = table.iter().map(|(k, _)| k).collect();
    assert_eq!(labels, vec!["0", "5", "10"]);
    assert_eq!(table.get("0").unwrap().mean, 45.0);
    assert_eq!(table.get("10").unwrap().count, 7);

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["groups"]["5"]["count"], 7);
}
