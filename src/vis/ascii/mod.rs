//! Text-based charts for study results
//!
//! Bar and pie charts for category counts, box plots for tumor volume
//! distributions, line plots for a single animal's time course and scatter
//! plots with a fitted regression line.

mod charts;

pub use charts::{
    BarChart, BarChartConfig, BoxPlot, BoxPlotConfig, LinePlot, LinePlotConfig, PieChart, ScatterPlot,
    ScatterPlotConfig,
};

/// Chart rendering trait
pub trait Chart {
    /// Render the chart to a string
    fn render(&self) -> String;

    /// Render to stdout
    fn display(&self) {
        println!("{}", self.render());
    }
}

/// Common chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart width in characters
    pub width: usize,
    /// Chart height in characters
    pub height: usize,
    /// Show axis labels
    pub show_labels: bool,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 20,
            show_labels: true,
            title: None,
            x_label: None,
            y_label: None,
        }
    }
}

impl ChartConfig {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub(crate) fn push_title(&self, output: &mut String, width: usize) {
        if let Some(ref title) = self.title {
            output.push_str(&format!("{:^width$}\n\n", title, width = width));
        }
    }

    pub(crate) fn push_axis_labels(&self, output: &mut String) {
        match (&self.x_label, &self.y_label) {
            (Some(x), Some(y)) => output.push_str(&format!("        x: {}   y: {}\n", x, y)),
            (Some(x), None) => output.push_str(&format!("        x: {}\n", x)),
            (None, Some(y)) => output.push_str(&format!("        y: {}\n", y)),
            (None, None) => {}
        }
    }
}

/// Chart style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartStyle {
    /// Simple ASCII characters
    Ascii,
    /// Unicode block characters
    #[default]
    Unicode,
}

impl ChartStyle {
    pub(crate) fn bar_char(self) -> char {
        match self {
            ChartStyle::Ascii => '#',
            ChartStyle::Unicode => '█',
        }
    }

    pub(crate) fn point_char(self) -> char {
        match self {
            ChartStyle::Ascii => '*',
            ChartStyle::Unicode => '●',
        }
    }

    pub(crate) fn line_char(self) -> char {
        match self {
            ChartStyle::Ascii => '.',
            ChartStyle::Unicode => '·',
        }
    }
}

/// Smallest and largest finite value, or `None` when there is none
pub(crate) fn finite_range<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Width of a range, widened to 1 when all values coincide
pub(crate) fn span(min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        max - min
    }
}
