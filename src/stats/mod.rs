//! Statistics for study tables
//!
//! Descriptive statistics for group summaries and box plots, Pearson
//! correlation, and simple linear regression with a t-test on the slope.
//!
//! # Example
//! ```rust
//! use oncostat::stats;
//!
//! let weight = vec![15.0, 17.0, 19.0, 21.0, 23.0];
//! let volume = vec![36.2, 37.9, 40.1, 41.6, 43.5];
//! let r = stats::pearson(&weight, &volume).unwrap();
//! let fit = stats::linear_fit(&weight, &volume).unwrap();
//! assert!(r > 0.99);
//! assert!((fit.r - r).abs() < 1e-12);
//! ```

pub mod descriptive;
pub mod distribution;
pub mod regression;

pub use descriptive::{mean, median, quantile, sem, std_dev, variance, BoxStats, GroupSummary};
pub use distribution::{student_t_cdf, student_t_two_sided_p};
pub use regression::{fit_line, linear_fit, pearson, residual_sum_of_squares, FitLine, FitResult};
