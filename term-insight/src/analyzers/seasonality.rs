//! Autocorrelation-based seasonality detection.

use serde::{Deserialize, Serialize};

/// Minimum series length for seasonality detection.
pub const MIN_SEASONALITY_POINTS: usize = 8;

/// ACF a peak must exceed to be a candidate period.
pub const ACF_PEAK_THRESHOLD: f64 = 0.3;

/// Outcome of seasonality detection for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub detected: bool,
    pub period: Option<usize>,
    /// ACF at the detected period, 0 when nothing was detected
    pub strength: f64,
    pub description: String,
}

impl SeasonalityResult {
    fn not_detected(description: impl Into<String>) -> Self {
        Self {
            detected: false,
            period: None,
            strength: 0.0,
            description: description.into(),
        }
    }
}

/// Sample autocorrelation at `lag`; 0 when the series has no variance or
/// the lag leaves no overlap.
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag >= n {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let denom: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if denom == 0.0 {
        return 0.0;
    }
    let num: f64 = (0..n - lag)
        .map(|t| (values[t] - mean) * (values[t + lag] - mean))
        .sum();
    num / denom
}

/// Detects a dominant repeating period.
///
/// `max_period` defaults to half the series length.
pub fn detect_seasonality(values: &[f64], max_period: Option<usize>) -> SeasonalityResult {
    let n = values.len();
    if n < MIN_SEASONALITY_POINTS {
        return SeasonalityResult::not_detected(format!(
            "Insufficient data for seasonality detection ({n} points, need at least {MIN_SEASONALITY_POINTS})"
        ));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    if values.iter().all(|v| (v - mean).abs() == 0.0) {
        return SeasonalityResult::not_detected("No variance in data; seasonality cannot be assessed");
    }

    let max_period = max_period.unwrap_or(n / 2).min(n - 1);
    if max_period < 2 {
        return SeasonalityResult::not_detected("No significant seasonal peak found");
    }

    // acf[lag] for lag in 0..=max_period+1 where the lag exists
    let last_lag = (max_period + 1).min(n - 1);
    let acf: Vec<f64> = (0..=last_lag).map(|lag| autocorrelation(values, lag)).collect();

    let mut best: Option<(usize, f64)> = None;
    for period in 2..=max_period {
        let value = acf[period];
        if value <= ACF_PEAK_THRESHOLD || value <= acf[period - 1] {
            continue;
        }
        if let Some(&next) = acf.get(period + 1) {
            if value <= next {
                continue;
            }
        }
        // Strictly greater keeps the shorter period on ties
        if best.map_or(true, |(_, strength)| value > strength) {
            best = Some((period, value));
        }
    }

    let Some((period, strength)) = best else {
        return SeasonalityResult::not_detected("No significant seasonal peak found");
    };

    let mut description = describe_period(period);
    let double = period * 2;
    if double < n {
        let corroboration = autocorrelation(values, double);
        if corroboration > ACF_PEAK_THRESHOLD {
            description.push_str(&format!(
                " (confirmed at lag {double}, autocorrelation {corroboration:.2})"
            ));
        }
    }

    SeasonalityResult {
        detected: true,
        period: Some(period),
        strength,
        description,
    }
}

fn describe_period(period: usize) -> String {
    match period {
        7 => "Weekly pattern (period of 7 observations)".to_string(),
        12 => "Monthly pattern within a yearly cycle (period of 12 observations)".to_string(),
        4 => "Quarterly pattern (period of 4 observations)".to_string(),
        24 => "Hourly pattern within a daily cycle (period of 24 observations)".to_string(),
        p => format!("Pattern repeats every {p} observations"),
    }
}
