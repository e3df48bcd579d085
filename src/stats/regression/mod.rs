// Correlation and simple linear regression module

use serde::Serialize;

use crate::error::{Error, Result};
use crate::stats::distribution::student_t_two_sided_p;

/// Slope and intercept of a least-squares line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitLine {
    pub slope: f64,
    pub intercept: f64,
}

impl FitLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares fit of y on x
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub r: f64,
    pub r_squared: f64,
    /// Two-sided p-value of the slope t-test with n - 2 degrees of freedom
    pub p_value: f64,
    /// Standard error of the slope
    pub stderr: f64,
    pub intercept_stderr: f64,
    /// Number of (x, y) pairs
    pub n: usize,
}

impl FitResult {
    pub fn line(&self) -> FitLine {
        FitLine {
            slope: self.slope,
            intercept: self.intercept,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.line().predict(x)
    }

    /// "y = 0.95x + 21.55"
    pub fn equation(&self) -> String {
        if self.intercept < 0.0 {
            format!("y = {:.2}x - {:.2}", self.slope, -self.intercept)
        } else {
            format!("y = {:.2}x + {:.2}", self.slope, self.intercept)
        }
    }
}

/// Centered sums of squares and cross-products of a paired sample
struct Moments {
    n: usize,
    mean_x: f64,
    mean_y: f64,
    sxx: f64,
    syy: f64,
    sxy: f64,
    /// Every x (resp. y) equals the first one
    x_constant: bool,
    y_constant: bool,
}

impl Moments {
    fn new(x: &[f64], y: &[f64], required: usize) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::DimensionMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        let n = x.len();
        if n < required {
            return Err(Error::InsufficientData { required, found: n });
        }

        let mean_x = x.iter().sum::<f64>() / n as f64;
        let mean_y = y.iter().sum::<f64>() / n as f64;

        let mut moments = Moments {
            n,
            mean_x,
            mean_y,
            sxx: 0.0,
            syy: 0.0,
            sxy: 0.0,
            x_constant: x.iter().all(|&v| v == x[0]),
            y_constant: y.iter().all(|&v| v == y[0]),
        };
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            moments.sxx += dx * dx;
            moments.syy += dy * dy;
            moments.sxy += dx * dy;
        }
        Ok(moments)
    }

    // equal values can still leave a rounding residue in sxx
    fn x_is_constant(&self) -> bool {
        self.x_constant || self.sxx == 0.0
    }

    fn y_is_constant(&self) -> bool {
        self.y_constant || self.syy == 0.0
    }

    fn require_variance(&self) -> Result<()> {
        if self.x_is_constant() {
            return Err(Error::DegenerateInput("x has zero variance".into()));
        }
        if self.y_is_constant() {
            return Err(Error::DegenerateInput("y has zero variance".into()));
        }
        Ok(())
    }

    fn r(&self) -> f64 {
        (self.sxy / (self.sxx * self.syy).sqrt()).clamp(-1.0, 1.0)
    }

    fn line(&self) -> FitLine {
        let slope = self.sxy / self.sxx;
        FitLine {
            slope,
            intercept: self.mean_y - slope * self.mean_x,
        }
    }
}

/// Pearson product-moment correlation of two equal-length sequences.
///
/// Needs at least two pairs and non-zero variance in both sequences.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    let moments = Moments::new(x, y, 2)?;
    moments.require_variance()?;
    Ok(moments.r())
}

/// Least-squares line through at least two points with distinct x.
///
/// Unlike [`linear_fit`] this does not need the n - 2 degrees of freedom
/// required for the slope's standard error, so it also fits two points.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<FitLine> {
    let moments = Moments::new(x, y, 2)?;
    if moments.x_is_constant() {
        return Err(Error::DegenerateInput("x has zero variance".into()));
    }
    Ok(moments.line())
}

/// Ordinary least squares regression of y on x with inference statistics.
///
/// Fails with `InsufficientData` for fewer than three pairs and with
/// `DegenerateInput` when either sequence has zero variance.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<FitResult> {
    let moments = Moments::new(x, y, 3)?;
    moments.require_variance()?;

    let FitLine { slope, intercept } = moments.line();
    let r = moments.r();
    let r_squared = r * r;
    let n = moments.n;
    let df = (n - 2) as f64;

    let unexplained = (1.0 - r_squared).max(0.0);
    let stderr = (unexplained * moments.syy / moments.sxx / df).sqrt();
    let intercept_stderr = stderr * (moments.sxx / n as f64 + moments.mean_x.powi(2)).sqrt();

    let p_value = if unexplained == 0.0 {
        0.0
    } else {
        let t = r * (df / unexplained).sqrt();
        student_t_two_sided_p(t, df)
    };

    Ok(FitResult {
        slope,
        intercept,
        r,
        r_squared,
        p_value,
        stderr,
        intercept_stderr,
        n,
    })
}

/// Residual sum of squares of the line `slope * x + intercept`
pub fn residual_sum_of_squares(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum()
}
