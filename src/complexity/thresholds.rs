//! Relative complexity buckets.
//!
//! The cut points are recomputed from the live branch population on every
//! run, so a bucket says how a task compares to the current workload rather
//! than to a fixed scale. A task can change color while its own complexity
//! stays the same.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label color assigned to a complexity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Below the medium threshold
    Green,
    /// Between the medium and high thresholds
    Yellow,
    /// At or above the high threshold
    Red,
}

impl Bucket {
    /// Board label color name.
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// All buckets, lowest first.
    pub const ALL: [Self; 3] = [Self::Green, Self::Yellow, Self::Red];
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.color())
    }
}

/// Medium and high cut points of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplexityThresholds {
    /// Mean complexity of the low/mid tasks
    pub medium: f64,
    /// Mean complexity of all tasks with a measurable diff
    pub high: f64,
}

impl ComplexityThresholds {
    /// Compute the thresholds of a run.
    ///
    /// Returns `None` when no task has a positive complexity.
    pub fn compute(complexities: &[u64]) -> Option<Self> {
        let measured: Vec<u64> = complexities.iter().copied().filter(|&c| c > 0).collect();
        let high = mean(&measured)?;

        let low_mid: Vec<u64> = measured.into_iter().filter(|&c| (c as f64) < high).collect();
        let medium = mean(&low_mid).unwrap_or(high / 2.0);

        Some(Self { medium, high })
    }

    /// Bucket of a complexity; `0` is never bucketed.
    pub fn bucket(&self, complexity: u64) -> Option<Bucket> {
        if complexity == 0 {
            return None;
        }
        let value = complexity as f64;
        if value < self.medium {
            Some(Bucket::Green)
        } else if value < self.high {
            Some(Bucket::Yellow)
        } else {
            Some(Bucket::Red)
        }
    }
}

fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = values.iter().map(|&v| v as f64).sum();
    Some(total / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tasks() {
        assert!(ComplexityThresholds::compute(&[]).is_none());
    }

    #[test]
    fn test_only_zero_complexity() {
        assert!(ComplexityThresholds::compute(&[0, 0]).is_none());
    }

    #[test]
    fn test_zero_complexity_does_not_dilute_mean() {
        let thresholds = ComplexityThresholds::compute(&[0, 10, 30]).unwrap();
        assert!((thresholds.high - 20.0).abs() < f64::EPSILON);
        assert!((thresholds.medium - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_uniform_complexity_halves_high() {
        let thresholds = ComplexityThresholds::compute(&[8, 8, 8]).unwrap();
        assert!((thresholds.high - 8.0).abs() < f64::EPSILON);
        assert!((thresholds.medium - 4.0).abs() < f64::EPSILON);
        assert_eq!(thresholds.bucket(8), Some(Bucket::Red));
    }

    #[test]
    fn test_buckets() {
        // high = 25, medium = mean(4, 8, 18) = 10
        let thresholds = ComplexityThresholds::compute(&[4, 8, 18, 70]).unwrap();
        assert_eq!(thresholds.bucket(0), None);
        assert_eq!(thresholds.bucket(4), Some(Bucket::Green));
        assert_eq!(thresholds.bucket(9), Some(Bucket::Green));
        assert_eq!(thresholds.bucket(10), Some(Bucket::Yellow));
        assert_eq!(thresholds.bucket(24), Some(Bucket::Yellow));
        assert_eq!(thresholds.bucket(25), Some(Bucket::Red));
        assert_eq!(thresholds.bucket(70), Some(Bucket::Red));
    }

    #[test]
    fn test_medium_never_exceeds_high() {
        let populations: [&[u64]; 5] =
            [&[1], &[1, 2], &[3, 3, 100], &[50, 1, 1, 1, 1], &[7, 0, 13, 21, 2, 2, 90]];
        for population in populations {
            let thresholds = ComplexityThresholds::compute(population).unwrap();
            assert!(thresholds.medium <= thresholds.high, "{population:?}");
            for &c in population.iter().filter(|&&c| c > 0) {
                let expected = if (c as f64) < thresholds.medium {
                    Bucket::Green
                } else if (c as f64) < thresholds.high {
                    Bucket::Yellow
                } else {
                    Bucket::Red
                };
                assert_eq!(thresholds.bucket(c), Some(expected));
            }
        }
    }

    #[test]
    fn test_bucket_colors() {
        assert_eq!(Bucket::Green.to_string(), "green");
        assert_eq!(Bucket::Yellow.color(), "yellow");
        assert_eq!(Bucket::ALL.len(), 3);
    }
}
