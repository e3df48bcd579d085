//! Rendering of study results
//!
//! The analysis hands finished tables and series to this module; nothing here
//! computes statistics of its own.
//!
//! - `ascii`: text charts for terminals, always available
//! - `svg`: SVG files drawn with `plotters`, behind the `visualization` feature

pub mod ascii;
#[cfg(feature = "visualization")]
pub mod svg;

pub use self::ascii::{
    BarChart, BarChartConfig, BoxPlot, BoxPlotConfig, Chart, ChartConfig, ChartStyle, LinePlot,
    LinePlotConfig, PieChart, ScatterPlot, ScatterPlotConfig,
};

use crate::pipeline::{Computed, StudyReport};

fn axes(title: &str, x: &str, y: &str) -> ChartConfig {
    ChartConfig {
        title: Some(title.to_string()),
        x_label: Some(x.to_string()),
        y_label: Some(y.to_string()),
        ..Default::default()
    }
}

/// Every chart of a report as one block of text
pub fn render_report_text(report: &StudyReport) -> String {
    let mut sections = Vec::new();

    let mut summary = String::from("Tumor volume by regimen\n");
    summary.push_str(&format!(
        "{:<12} {:>8} {:>8} {:>9} {:>8} {:>7} {:>5}\n",
        "Regimen", "Mean", "Median", "Variance", "Std Dev", "SEM", "n"
    ));
    for (regimen, s) in report.regimen_summary.iter() {
        summary.push_str(&format!(
            "{:<12} {:>8.3} {:>8.3} {:>9.3} {:>8.3} {:>7.3} {:>5}\n",
            regimen, s.mean, s.median, s.variance, s.std_dev, s.sem, s.count
        ));
    }
    sections.push(summary);

    let bar = BarChart::from_counts(
        &report.regimen_counts,
        BarChartConfig {
            base: ChartConfig::titled("Measurements per regimen"),
            ..Default::default()
        },
    );
    sections.push(bar.render());

    let pie = PieChart::from_counts(
        &report.sex_counts,
        BarChartConfig {
            base: ChartConfig::titled("Animals by sex"),
            ..Default::default()
        },
    );
    sections.push(pie.render());

    let boxes: Vec<_> = report
        .box_stats
        .iter()
        .filter_map(|(regimen, stats)| stats.value().map(|s| (regimen.clone(), s.clone())))
        .collect();
    let box_plot = BoxPlot::with_config(
        boxes,
        BoxPlotConfig {
            base: axes("Tumor volume distribution", "Tumor Volume (mm3)", "Regimen"),
            ..Default::default()
        },
    );
    sections.push(box_plot.render());

    let course = &report.time_course;
    let timepoints: Vec<f64> = course.timepoints.iter().map(|&t| f64::from(t)).collect();
    let line = LinePlot::with_config(
        &timepoints,
        &course.tumor_volumes,
        LinePlotConfig {
            base: ChartConfig {
                height: 10,
                ..axes(
                    &format!("{} treated with {}", course.mouse_id, course.drug_regimen),
                    "Timepoint (days)",
                    "Tumor Volume (mm3)",
                )
            },
            ..Default::default()
        },
    );
    sections.push(line.render());

    let (x, y) = report.correlation_points();
    let mut scatter = ScatterPlot::with_config(
        &x,
        &y,
        ScatterPlotConfig {
            base: ChartConfig {
                height: 15,
                width: 48,
                ..axes("Weight vs average tumor volume", "Weight (g)", "Tumor Volume (mm3)")
            },
            ..Default::default()
        },
    );
    if let Computed::Value(fit) = &report.line {
        scatter = scatter.with_fit_line(*fit);
    }
    sections.push(scatter.render());

    match (&report.correlation, &report.fit) {
        (Computed::Value(r), Computed::Value(fit)) => sections.push(format!(
            "r = {:.2}, {}, p = {:.4}, stderr = {:.4}\n",
            r,
            fit.equation(),
            fit.p_value,
            fit.stderr
        )),
        (Computed::Value(r), Computed::Undefined { reason }) => {
            sections.push(format!("r = {:.2}, regression undefined: {}\n", r, reason))
        }
        (Computed::Undefined { reason }, _) => sections.push(format!("correlation undefined: {}\n", reason)),
    }

    sections.join("\n")
}
