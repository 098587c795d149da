//! Mean-shift change point detection.
//!
//! Every admissible split is scored with a pooled-variance two-sample
//! statistic; candidates above the threshold are then selected greedily by
//! significance with a minimum spacing of one segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::descriptive::{mean, sample_variance};

pub const DEFAULT_MIN_SEGMENT_SIZE: usize = 5;
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 2.0;

const MIN_STANDARD_ERROR: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increase,
    Decrease,
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeDirection::Increase => "increase",
            ChangeDirection::Decrease => "decrease",
        })
    }
}

/// A position where the series mean shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    /// First index of the new segment
    pub index: usize,
    pub before_mean: f64,
    pub after_mean: f64,
    pub significance: f64,
    pub direction: ChangeDirection,
}

/// Detects mean shifts in `values`.
///
/// Splits closer than `min_segment_size` to either end are never
/// considered, so series shorter than `2 * min_segment_size` yield nothing.
///
/// # Examples
///
/// ```rust
/// use term_insight::analyzers::change_point::{detect_change_points, ChangeDirection};
///
/// let mut values = vec![20.0; 15];
/// values.extend(vec![80.0; 15]);
/// let points = detect_change_points(&values, 5, 2.0);
/// assert_eq!(points[0].direction, ChangeDirection::Increase);
/// ```
pub fn detect_change_points(
    values: &[f64],
    min_segment_size: usize,
    threshold: f64,
) -> Vec<ChangePoint> {
    let m = min_segment_size.max(1);
    let n = values.len();
    if n < 2 * m {
        return Vec::new();
    }

    let mut candidates: Vec<ChangePoint> = (m..n - m)
        .filter_map(|index| {
            let (before, after) = values.split_at(index);
            let n1 = before.len() as f64;
            let n2 = after.len() as f64;
            let before_mean = mean(before);
            let after_mean = mean(after);

            let pooled = ((n1 - 1.0) * sample_variance(before)
                + (n2 - 1.0) * sample_variance(after))
                / (n1 + n2 - 2.0).max(1.0);
            let se = (pooled * (1.0 / n1 + 1.0 / n2))
                .sqrt()
                .max(MIN_STANDARD_ERROR);
            let significance = (after_mean - before_mean).abs() / se;

            (significance > threshold).then(|| ChangePoint {
                index,
                before_mean,
                after_mean,
                significance,
                direction: if after_mean >= before_mean {
                    ChangeDirection::Increase
                } else {
                    ChangeDirection::Decrease
                },
            })
        })
        .collect();

    // Stable sort keeps the lower index first among equal significance
    candidates.sort_by(|a, b| b.significance.total_cmp(&a.significance));

    let mut kept: Vec<ChangePoint> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| k.index.abs_diff(candidate.index) >= m) {
            kept.push(candidate);
        }
    }
    kept.sort_by_key(|c| c.index);
    kept
}
