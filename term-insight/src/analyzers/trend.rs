//! Linear trend detection over an ordered numeric series.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fraction of the series mean the fitted change must exceed to count as a trend.
pub const TREND_THRESHOLD_RATIO: f64 = 0.05;

const EPSILON: f64 = 1e-10;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        })
    }
}

/// Trend of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub column: String,
    pub direction: TrendDirection,
    /// Change from the first quarter's mean to the last quarter's, in percent
    pub change_percent: f64,
    /// OLS slope of value against position
    pub slope: f64,
}

/// Ordinary-least-squares fit of value against position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Fits `value = intercept + slope * index`.
///
/// Returns a flat fit through the mean for fewer than two points.
pub fn linear_regression(values: &[f64]) -> LinearFit {
    let n = values.len();
    let mean_y = if n == 0 {
        0.0
    } else {
        values.iter().sum::<f64>() / n as f64
    };
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
        };
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    }
}

/// Detects the trend of an ordered series.
///
/// Returns `None` for fewer than three values.
pub fn detect_trend(column: &str, values: &[f64]) -> Option<Trend> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let fit = linear_regression(values);
    let mean = values.iter().sum::<f64>() / n as f64;

    let quarter = (n / 4).max(1);
    let first = values[..quarter].iter().sum::<f64>() / quarter as f64;
    let last = values[n - quarter..].iter().sum::<f64>() / quarter as f64;
    let baseline = if first != 0.0 {
        first.abs()
    } else if mean != 0.0 {
        mean.abs()
    } else {
        1.0
    };
    let change_percent = (last - first) / baseline * 100.0;

    let fitted_change = fit.slope * n as f64;
    let threshold = TREND_THRESHOLD_RATIO * mean.abs().max(EPSILON);
    let direction = if fitted_change > threshold {
        TrendDirection::Up
    } else if fitted_change < -threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    Some(Trend {
        column: column.to_string(),
        direction,
        change_percent,
        slope: fit.slope,
    })
}
