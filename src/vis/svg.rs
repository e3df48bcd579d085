//! SVG charts drawn with plotters

use std::f64::consts::PI;
use std::path::Path;

use log::info;
use plotters::prelude::*;

use crate::dataframe::categorical::CategoryCount;
use crate::dataframe::query::TimeCourse;
use crate::error::{Error, Result};
use crate::pipeline::{Computed, StudyReport};
use crate::stats::descriptive::BoxStats;
use crate::stats::regression::FitLine;

/// Size and labels of one SVG chart
#[derive(Debug, Clone)]
pub struct SvgSettings {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub color_palette: Vec<(u8, u8, u8)>,
}

impl Default for SvgSettings {
    fn default() -> Self {
        SvgSettings {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            width: 800,
            height: 600,
            color_palette: vec![
                (0, 123, 255),
                (255, 99, 71),
                (46, 204, 113),
                (255, 193, 7),
                (142, 68, 173),
                (52, 152, 219),
                (243, 156, 18),
                (211, 84, 0),
            ],
        }
    }
}

impl SvgSettings {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        SvgSettings {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            ..Default::default()
        }
    }

    fn color(&self, idx: usize) -> RGBColor {
        if self.color_palette.is_empty() {
            return BLUE;
        }
        let (r, g, b) = self.color_palette[idx % self.color_palette.len()];
        RGBColor(r, g, b)
    }
}

fn require_points(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::Visualization("no data to plot".to_string()));
    }
    Ok(())
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let margin = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        (max - min) * 0.05
    };
    (min - margin, max + margin)
}

fn bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    padded(min, max)
}

/// Vertical bars, one per category
pub fn bar_chart_svg<P: AsRef<Path>>(counts: &[CategoryCount], path: P, settings: &SvgSettings) -> Result<()> {
    require_points(counts.len())?;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;

    let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(counts.len() as f64 - 0.5), 0f64..(max * 1.1).max(1.0))?;

    let labels: Vec<String> = counts.iter().map(CategoryCount::label).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len())
        .x_label_formatter(&|v| {
            let idx = v.round();
            if idx >= 0.0 && (idx as usize) < labels.len() && (v - idx).abs() < 1e-6 {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .x_desc(&settings.x_label)
        .y_desc(&settings.y_label)
        .draw()?;

    let color = settings.color(0);
    chart.draw_series(counts.iter().enumerate().map(|(i, c)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, c.count as f64)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Pie chart of category shares with a legend
pub fn pie_chart_svg<P: AsRef<Path>>(counts: &[CategoryCount], path: P, settings: &SvgSettings) -> Result<()> {
    require_points(counts.len())?;
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Err(Error::Visualization("all counts are zero".to_string()));
    }

    let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 30).into_font())
        .margin(10)
        .build_cartesian_2d(-1.6f64..1.6f64, -1.2f64..1.2f64)?;

    let mut start = PI / 2.0;
    for (i, c) in counts.iter().enumerate() {
        let sweep = 2.0 * PI * c.count as f64 / total as f64;
        let steps = ((sweep / (2.0 * PI)) * 90.0).ceil().max(2.0) as usize;
        let mut outline = vec![(0.0, 0.0)];
        outline.extend((0..=steps).map(|k| {
            let a = start - sweep * k as f64 / steps as f64;
            (a.cos(), a.sin())
        }));

        let color = settings.color(i);
        let share = c.count as f64 / total as f64 * 100.0;
        chart
            .draw_series(std::iter::once(Polygon::new(outline, color.filled())))?
            .label(format!("{} ({:.1}%)", c.label(), share))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        start -= sweep;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Horizontal box plots on a shared value axis
pub fn box_plot_svg<P: AsRef<Path>>(groups: &[(String, BoxStats)], path: P, settings: &SvgSettings) -> Result<()> {
    require_points(groups.len())?;
    let extremes: Vec<f64> = groups.iter().flat_map(|(_, s)| [s.min, s.max]).collect();
    let (lo, hi) = bounds(&extremes);

    let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(lo..hi, -0.5f64..(groups.len() as f64 - 0.5))?;

    let labels: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(groups.len())
        .y_label_formatter(&|v| {
            let idx = v.round();
            if idx >= 0.0 && (idx as usize) < labels.len() && (v - idx).abs() < 1e-6 {
                labels[idx as usize].to_string()
            } else {
                String::new()
            }
        })
        .x_desc(&settings.x_label)
        .y_desc(&settings.y_label)
        .draw()?;

    for (i, (_, stats)) in groups.iter().enumerate() {
        let y = i as f64;
        let color = settings.color(i);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(stats.q1, y - 0.3), (stats.q3, y + 0.3)],
            color.mix(0.4).filled(),
        )))?;
        chart.draw_series(
            [
                vec![(stats.whisker_low, y), (stats.q1, y)],
                vec![(stats.q3, y), (stats.whisker_high, y)],
                vec![(stats.whisker_low, y - 0.15), (stats.whisker_low, y + 0.15)],
                vec![(stats.whisker_high, y - 0.15), (stats.whisker_high, y + 0.15)],
                vec![(stats.median, y - 0.3), (stats.median, y + 0.3)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;
        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|&v| Circle::new((v, y), 4, RED.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Tumor volume over time for one animal
pub fn line_plot_svg<P: AsRef<Path>>(course: &TimeCourse, path: P, settings: &SvgSettings) -> Result<()> {
    require_points(course.len())?;
    let x: Vec<f64> = course.timepoints.iter().map(|&t| f64::from(t)).collect();
    let (x_min, x_max) = bounds(&x);
    let (y_min, y_max) = bounds(&course.tumor_volumes);

    let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.1}", v))
        .x_desc(&settings.x_label)
        .y_desc(&settings.y_label)
        .draw()?;

    let points: Vec<(f64, f64)> = x.iter().copied().zip(course.tumor_volumes.iter().copied()).collect();
    let color = settings.color(0);
    chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
    chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled())))?;

    root.present()?;
    Ok(())
}

/// Scatter plot with an optional regression line
pub fn scatter_svg<P: AsRef<Path>>(
    x: &[f64],
    y: &[f64],
    line: Option<FitLine>,
    path: P,
    settings: &SvgSettings,
) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }
    require_points(x.len())?;
    let (x_min, x_max) = bounds(x);
    let (y_min, y_max) = bounds(y);

    let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| format!("{:.1}", v))
        .y_label_formatter(&|v| format!("{:.1}", v))
        .x_desc(&settings.x_label)
        .y_desc(&settings.y_label)
        .draw()?;

    let point_color = settings.color(0);
    chart.draw_series(
        x.iter()
            .zip(y)
            .map(|(&a, &b)| Circle::new((a, b), 4, point_color.filled())),
    )?;

    if let Some(line) = line {
        let line_color = settings.color(1);
        chart
            .draw_series(LineSeries::new(
                [x_min, x_max].into_iter().map(|v| (v, line.predict(v))),
                line_color.stroke_width(2),
            ))?
            .label(format!("y = {:.2}x + {:.2}", line.slope, line.intercept))
            .legend(move |(lx, ly)| PathElement::new(vec![(lx, ly), (lx + 20, ly)], line_color));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Write every chart of a report into `dir`.
///
/// Charts whose input is empty or undefined are skipped.
pub fn render_report<P: AsRef<Path>>(report: &StudyReport, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    let mut written = 0;

    if !report.regimen_counts.is_empty() {
        let settings = SvgSettings::new("Measurements per regimen", "Drug Regimen", "Measurements");
        bar_chart_svg(&report.regimen_counts, dir.join("regimen_counts.svg"), &settings)?;
        written += 1;
    }

    if !report.sex_counts.is_empty() {
        let settings = SvgSettings::new("Animals by sex", "", "");
        pie_chart_svg(&report.sex_counts, dir.join("sex_distribution.svg"), &settings)?;
        written += 1;
    }

    let boxes: Vec<(String, BoxStats)> = report
        .box_stats
        .iter()
        .filter_map(|(regimen, stats)| stats.value().map(|s| (regimen.clone(), s.clone())))
        .collect();
    if !boxes.is_empty() {
        let settings = SvgSettings::new("Tumor volume distribution", "Tumor Volume (mm3)", "Drug Regimen");
        box_plot_svg(&boxes, dir.join("tumor_volume_box.svg"), &settings)?;
        written += 1;
    }

    if !report.time_course.is_empty() {
        let course = &report.time_course;
        let title = format!("{} treated with {}", course.mouse_id, course.drug_regimen);
        let settings = SvgSettings::new(&title, "Timepoint (days)", "Tumor Volume (mm3)");
        line_plot_svg(course, dir.join("time_course.svg"), &settings)?;
        written += 1;
    }

    let (x, y) = report.correlation_points();
    if !x.is_empty() {
        let line = match &report.line {
            Computed::Value(line) => Some(*line),
            Computed::Undefined { .. } => None,
        };
        let settings = SvgSettings::new("Weight vs average tumor volume", "Weight (g)", "Tumor Volume (mm3)");
        scatter_svg(&x, &y, line, dir.join("weight_vs_volume.svg"), &settings)?;
        written += 1;
    }

    info!("wrote {} charts to {}", written, dir.display());
    Ok(())
}
