//! Chart implementations for text-based visualization

use super::{finite_range, span, Chart, ChartConfig, ChartStyle};
use crate::dataframe::categorical::CategoryCount;
use crate::stats::descriptive::BoxStats;
use crate::stats::regression::FitLine;

// ============================================================================
// Bar Chart
// ============================================================================

/// Configuration for bar chart
#[derive(Debug, Clone)]
pub struct BarChartConfig {
    /// Base chart config
    pub base: ChartConfig,
    /// Chart style
    pub style: ChartStyle,
    /// Show values on bars
    pub show_values: bool,
    /// Max label width
    pub label_width: usize,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            base: ChartConfig::default(),
            style: ChartStyle::Unicode,
            show_values: true,
            label_width: 12,
        }
    }
}

/// Horizontal bar chart for categorical data
#[derive(Debug, Clone)]
pub struct BarChart {
    /// Labels for each bar
    labels: Vec<String>,
    /// Values for each bar
    values: Vec<f64>,
    /// Configuration
    config: BarChartConfig,
}

impl BarChart {
    /// Create a new bar chart
    pub fn new(labels: &[&str], values: &[f64]) -> Self {
        Self::with_config(labels, values, BarChartConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(labels: &[&str], values: &[f64], config: BarChartConfig) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            values: values.to_vec(),
            config,
        }
    }

    /// One bar per category, in the order of the counts
    pub fn from_counts(counts: &[CategoryCount], config: BarChartConfig) -> Self {
        Self {
            labels: counts.iter().map(CategoryCount::label).collect(),
            values: counts.iter().map(|c| c.count as f64).collect(),
            config,
        }
    }
}

impl Chart for BarChart {
    fn render(&self) -> String {
        if self.values.is_empty() {
            return String::from("No data to display");
        }

        let mut output = String::new();
        let max_val = self.values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let bar_width = self
            .config
            .base
            .width
            .saturating_sub(self.config.label_width + 10);
        let bar_char = self.config.style.bar_char();

        self.config.base.push_title(&mut output, self.config.base.width);

        for (label, &value) in self.labels.iter().zip(self.values.iter()) {
            let bar_len = if max_val > 0.0 {
                (value / max_val * bar_width as f64).round() as usize
            } else {
                0
            };

            let bar: String = std::iter::repeat(bar_char).take(bar_len).collect();
            let truncated_label: String = label.chars().take(self.config.label_width).collect();

            output.push_str(&format!(
                "{:>label_width$} │{:<bar_width$}│",
                truncated_label,
                bar,
                label_width = self.config.label_width,
                bar_width = bar_width
            ));
            if self.config.show_values {
                output.push_str(&format!(" {}", value));
            }
            output.push('\n');
        }

        output
    }
}

// ============================================================================
// Pie Chart
// ============================================================================

/// Shares of a whole, drawn as proportional bars with percentages
#[derive(Debug, Clone)]
pub struct PieChart {
    labels: Vec<String>,
    values: Vec<f64>,
    config: BarChartConfig,
}

impl PieChart {
    pub fn new(labels: &[&str], values: &[f64]) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            values: values.to_vec(),
            config: BarChartConfig::default(),
        }
    }

    pub fn from_counts(counts: &[CategoryCount], config: BarChartConfig) -> Self {
        Self {
            labels: counts.iter().map(CategoryCount::label).collect(),
            values: counts.iter().map(|c| c.count as f64).collect(),
            config,
        }
    }

    /// Percentage of the total for each slice
    pub fn shares(&self) -> Vec<f64> {
        let total: f64 = self.values.iter().sum();
        if total <= 0.0 {
            return vec![0.0; self.values.len()];
        }
        self.values.iter().map(|v| v / total * 100.0).collect()
    }
}

impl Chart for PieChart {
    fn render(&self) -> String {
        if self.values.is_empty() {
            return String::from("No data to display");
        }

        let mut output = String::new();
        let bar_width = self
            .config
            .base
            .width
            .saturating_sub(self.config.label_width + 12);
        let bar_char = self.config.style.bar_char();

        self.config.base.push_title(&mut output, self.config.base.width);

        for (label, share) in self.labels.iter().zip(self.shares()) {
            let bar_len = (share / 100.0 * bar_width as f64).round() as usize;
            let bar: String = std::iter::repeat(bar_char).take(bar_len).collect();
            let truncated_label: String = label.chars().take(self.config.label_width).collect();
            output.push_str(&format!(
                "{:>label_width$} │{:<bar_width$}│ {:5.1}%\n",
                truncated_label,
                bar,
                share,
                label_width = self.config.label_width,
                bar_width = bar_width
            ));
        }

        output
    }
}

// ============================================================================
// Box Plot
// ============================================================================

/// Configuration for box plot
#[derive(Debug, Clone)]
pub struct BoxPlotConfig {
    pub base: ChartConfig,
    pub style: ChartStyle,
    pub label_width: usize,
}

impl Default for BoxPlotConfig {
    fn default() -> Self {
        Self {
            base: ChartConfig::default(),
            style: ChartStyle::Unicode,
            label_width: 12,
        }
    }
}

/// Horizontal box-and-whisker rows on a shared scale
#[derive(Debug, Clone)]
pub struct BoxPlot {
    groups: Vec<(String, BoxStats)>,
    config: BoxPlotConfig,
}

impl BoxPlot {
    pub fn new(groups: Vec<(String, BoxStats)>) -> Self {
        Self::with_config(groups, BoxPlotConfig::default())
    }

    pub fn with_config(groups: Vec<(String, BoxStats)>, config: BoxPlotConfig) -> Self {
        Self { groups, config }
    }

    fn glyphs(&self) -> (char, char, char, char, char) {
        // (whisker, box, median, whisker end, outlier)
        match self.config.style {
            ChartStyle::Ascii => ('-', '=', '|', '|', 'o'),
            ChartStyle::Unicode => ('─', '█', '┃', '┼', '○'),
        }
    }
}

impl Chart for BoxPlot {
    fn render(&self) -> String {
        if self.groups.is_empty() {
            return String::from("No data to display");
        }

        let extremes = self.groups.iter().flat_map(|(_, s)| [&s.min, &s.max]);
        let Some((lo, hi)) = finite_range(extremes) else {
            return String::from("No data to display");
        };
        let range = span(lo, hi);
        let width = self
            .config
            .base
            .width
            .saturating_sub(self.config.label_width + 3)
            .max(2);
        let col = |v: f64| (((v - lo) / range) * (width - 1) as f64).round() as usize;
        let (whisker, body, median, end, outlier) = self.glyphs();

        let mut output = String::new();
        self.config.base.push_title(&mut output, self.config.base.width);

        for (label, stats) in &self.groups {
            let mut row = vec![' '; width];
            for c in col(stats.whisker_low)..=col(stats.whisker_high) {
                row[c.min(width - 1)] = whisker;
            }
            for c in col(stats.q1)..=col(stats.q3) {
                row[c.min(width - 1)] = body;
            }
            row[col(stats.whisker_low).min(width - 1)] = end;
            row[col(stats.whisker_high).min(width - 1)] = end;
            row[col(stats.median).min(width - 1)] = median;
            for &v in &stats.outliers {
                row[col(v).min(width - 1)] = outlier;
            }

            let truncated_label: String = label.chars().take(self.config.label_width).collect();
            output.push_str(&format!(
                "{:>label_width$} │{}\n",
                truncated_label,
                row.into_iter().collect::<String>(),
                label_width = self.config.label_width
            ));
        }

        if self.config.base.show_labels {
            output.push_str(&format!(
                "{:>label_width$} └{}\n",
                "",
                "─".repeat(width),
                label_width = self.config.label_width
            ));
            output.push_str(&format!(
                "{:>label_width$}  {:<w$.1}{:>8.1}\n",
                "",
                lo,
                hi,
                label_width = self.config.label_width,
                w = width.saturating_sub(8)
            ));
            self.config.base.push_axis_labels(&mut output);
        }

        output
    }
}

// ============================================================================
// Shared canvas for x/y charts
// ============================================================================

struct Canvas {
    width: usize,
    height: usize,
    x_min: f64,
    x_max: f64,
    x_span: f64,
    y_min: f64,
    y_span: f64,
    cells: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize, x: (f64, f64), y: (f64, f64)) -> Self {
        let width = width.max(2);
        let height = height.max(2);
        Self {
            width,
            height,
            x_min: x.0,
            x_max: x.1,
            x_span: span(x.0, x.1),
            y_min: y.0,
            y_span: span(y.0, y.1),
            cells: vec![vec![' '; width]; height],
        }
    }

    fn col(&self, x: f64) -> usize {
        let c = ((x - self.x_min) / self.x_span * (self.width - 1) as f64).round();
        (c.max(0.0) as usize).min(self.width - 1)
    }

    fn row(&self, y: f64) -> Option<usize> {
        let r = ((y - self.y_min) / self.y_span * (self.height - 1) as f64).round();
        if r < 0.0 || r > (self.height - 1) as f64 {
            None
        } else {
            Some(r as usize)
        }
    }

    fn plot(&mut self, x: f64, y: f64, ch: char) {
        if let Some(r) = self.row(y) {
            let c = self.col(x);
            self.cells[r][c] = ch;
        }
    }

    fn mark_empty(&mut self, x: f64, y: f64, ch: char) {
        if let Some(r) = self.row(y) {
            let c = self.col(x);
            if self.cells[r][c] == ' ' {
                self.cells[r][c] = ch;
            }
        }
    }

    /// Interior of the straight segment from `a` to `b`, one mark per column
    fn segment(&mut self, a: (f64, f64), b: (f64, f64), ch: char) {
        let steps = self.col(a.0).abs_diff(self.col(b.0));
        for i in 1..steps {
            let t = i as f64 / steps as f64;
            self.mark_empty(a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1), ch);
        }
    }

    /// Draw `f` across every column, leaving existing marks in place
    fn trace<F: Fn(f64) -> f64>(&mut self, f: F, ch: char) {
        for c in 0..self.width {
            let x = self.x_min + c as f64 / (self.width - 1) as f64 * self.x_span;
            self.mark_empty(x, f(x), ch);
        }
    }

    fn render(&self, config: &ChartConfig) -> String {
        let mut output = String::new();
        config.push_title(&mut output, self.width + 8);

        for r in (0..self.height).rev() {
            if config.show_labels {
                let y_val = self.y_min + (r as f64 / (self.height - 1) as f64) * self.y_span;
                output.push_str(&format!("{:>6.1} │", y_val));
            }
            output.extend(self.cells[r].iter());
            output.push('\n');
        }

        if config.show_labels {
            output.push_str("       └");
            output.push_str(&"─".repeat(self.width));
            output.push('\n');
            output.push_str(&format!(
                "        {:<width$.1}{:>8.1}\n",
                self.x_min,
                self.x_max,
                width = self.width.saturating_sub(8)
            ));
            config.push_axis_labels(&mut output);
        }

        output
    }
}

// ============================================================================
// Line Plot
// ============================================================================

/// Configuration for line plot
#[derive(Debug, Clone)]
pub struct LinePlotConfig {
    /// Base chart config
    pub base: ChartConfig,
    /// Chart style
    pub style: ChartStyle,
}

impl Default for LinePlotConfig {
    fn default() -> Self {
        Self {
            base: ChartConfig {
                height: 10,
                ..Default::default()
            },
            style: ChartStyle::Unicode,
        }
    }
}

/// Line plot of y over x, e.g. tumor volume over timepoints
#[derive(Debug, Clone)]
pub struct LinePlot {
    x: Vec<f64>,
    y: Vec<f64>,
    config: LinePlotConfig,
}

impl LinePlot {
    /// Create a new line plot; points are joined in the given order
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        Self::with_config(x, y, LinePlotConfig::default())
    }

    pub fn with_config(x: &[f64], y: &[f64], config: LinePlotConfig) -> Self {
        let len = x.len().min(y.len());
        Self {
            x: x[..len].to_vec(),
            y: y[..len].to_vec(),
            config,
        }
    }
}

impl Chart for LinePlot {
    fn render(&self) -> String {
        let (Some(xr), Some(yr)) = (finite_range(&self.x), finite_range(&self.y)) else {
            return String::from("No data to display");
        };

        let width = self.config.base.width.saturating_sub(8);
        let mut canvas = Canvas::new(width, self.config.base.height, xr, yr);
        let point = self.config.style.point_char();
        let line = self.config.style.line_char();

        for (i, (&x, &y)) in self.x.iter().zip(&self.y).enumerate() {
            canvas.plot(x, y, point);
            if let (Some(&nx), Some(&ny)) = (self.x.get(i + 1), self.y.get(i + 1)) {
                canvas.segment((x, y), (nx, ny), line);
            }
        }

        canvas.render(&self.config.base)
    }
}

// ============================================================================
// Scatter Plot
// ============================================================================

/// Configuration for scatter plot
#[derive(Debug, Clone)]
pub struct ScatterPlotConfig {
    /// Base chart config
    pub base: ChartConfig,
    /// Chart style
    pub style: ChartStyle,
}

impl Default for ScatterPlotConfig {
    fn default() -> Self {
        Self {
            base: ChartConfig {
                height: 15,
                width: 48,
                ..Default::default()
            },
            style: ChartStyle::Unicode,
        }
    }
}

/// Scatter plot with an optional least-squares line
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    x: Vec<f64>,
    y: Vec<f64>,
    line: Option<FitLine>,
    config: ScatterPlotConfig,
}

impl ScatterPlot {
    /// Create a new scatter plot
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        Self::with_config(x, y, ScatterPlotConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(x: &[f64], y: &[f64], config: ScatterPlotConfig) -> Self {
        let len = x.len().min(y.len());
        Self {
            x: x[..len].to_vec(),
            y: y[..len].to_vec(),
            line: None,
            config,
        }
    }

    /// Overlay a fitted line
    pub fn with_fit_line(mut self, line: FitLine) -> Self {
        self.line = Some(line);
        self
    }
}

impl Chart for ScatterPlot {
    fn render(&self) -> String {
        let (Some(xr), Some(yr)) = (finite_range(&self.x), finite_range(&self.y)) else {
            return String::from("No data to display");
        };

        let width = self.config.base.width.saturating_sub(8);
        let mut canvas = Canvas::new(width, self.config.base.height, xr, yr);

        for (&x, &y) in self.x.iter().zip(&self.y) {
            canvas.plot(x, y, self.config.style.point_char());
        }
        if let Some(line) = self.line {
            canvas.trace(|x| line.predict(x), self.config.style.line_char());
        }

        canvas.render(&self.config.base)
    }
}
