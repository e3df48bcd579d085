// Descriptive statistics module

use serde::Serialize;

use crate::error::{Error, Result};

/// Arithmetic mean; NaN for empty input
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Median; the average of the two middle values for even counts
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted_copy(data);
    median_of_sorted(&sorted)
}

/// Sample variance (denominator n - 1); NaN for fewer than two values
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Standard error of the mean: std / sqrt(n)
pub fn sem(data: &[f64]) -> f64 {
    std_dev(data) / (data.len() as f64).sqrt()
}

/// Quantile of sorted data with linear interpolation between order statistics
pub fn quantile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }

    let n = sorted_data.len();
    let idx = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let idx_floor = idx.floor() as usize;
    let idx_ceil = idx.ceil() as usize;

    if idx_floor == idx_ceil {
        return sorted_data[idx_floor];
    }

    let weight_ceil = idx - idx_floor as f64;
    sorted_data[idx_floor] * (1.0 - weight_ceil) + sorted_data[idx_ceil] * weight_ceil
}

fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Summary of one group's outcome values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Values that entered the statistics
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample variance; NaN for a single value
    pub variance: f64,
    pub std_dev: f64,
    /// NaN for a single value
    pub sem: f64,
    /// Rows skipped because the value was missing
    pub excluded: usize,
}

impl GroupSummary {
    pub fn from_values(values: &[f64], excluded: usize) -> Self {
        let variance = variance(values);
        let std_dev = variance.sqrt();
        GroupSummary {
            count: values.len(),
            mean: mean(values),
            median: median(values),
            variance,
            std_dev,
            sem: std_dev / (values.len() as f64).sqrt(),
            excluded,
        }
    }
}

/// Quartiles and Tukey fences for a box plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    /// q1 - 1.5 * iqr
    pub lower_bound: f64,
    /// q3 + 1.5 * iqr
    pub upper_bound: f64,
    /// Most extreme values inside the fences
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Values outside the fences, ascending
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                found: 0,
            });
        }

        let sorted = sorted_copy(data);
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_bound = q1 - 1.5 * iqr;
        let upper_bound = q3 + 1.5 * iqr;

        let inside = |v: f64| v >= lower_bound && v <= upper_bound;
        let outliers = sorted.iter().copied().filter(|&v| !inside(v)).collect();
        // the median always lies inside the fences
        let whisker_low = sorted.iter().copied().find(|&v| inside(v)).unwrap_or(q1);
        let whisker_high = sorted.iter().rev().copied().find(|&v| inside(v)).unwrap_or(q3);

        Ok(BoxStats {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median: median_of_sorted(&sorted),
            q3,
            max: sorted[sorted.len() - 1],
            iqr,
            lower_bound,
            upper_bound,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_statistics() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((mean(&data) - 3.0).abs() < 1e-10);
        assert!((median(&data) - 3.0).abs() < 1e-10);
        assert!((variance(&data) - 2.5).abs() < 1e-10);
        assert!((std_dev(&data) - 1.5811388300841898).abs() < 1e-10);
        assert!((sem(&data) - 1.5811388300841898 / 5f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_median_even_count() {
        assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_single_value_group() {
        let summary = GroupSummary::from_values(&[42.0], 0);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.median, 42.0);
        assert!(summary.variance.is_nan());
        assert!(summary.std_dev.is_nan());
        assert!(summary.sem.is_nan());
    }

    #[test]
    fn test_empty_group() {
        let summary = GroupSummary::from_values(&[], 3);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.excluded, 3);
        assert!(summary.mean.is_nan());
        assert!(summary.median.is_nan());
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-10);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-10);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-10);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_box_stats_flags_outliers() {
        let data = vec![10.0, 11.0, 12.0, 13.0, 14.0, 40.0];
        let stats = BoxStats::from_values(&data).unwrap();
        // q1 = 11.25, q3 = 13.75, iqr = 2.5
        assert!((stats.q1 - 11.25).abs() < 1e-10);
        assert!((stats.q3 - 13.75).abs() < 1e-10);
        assert!((stats.upper_bound - 17.5).abs() < 1e-10);
        assert_eq!(stats.outliers, vec![40.0]);
        assert_eq!(stats.whisker_low, 10.0);
        assert_eq!(stats.whisker_high, 14.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 40.0);
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_values(&[]).is_err());
    }
}
