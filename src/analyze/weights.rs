//! Composite-score weights.
//!
//! JSON / TOML shape:
//! {
//!   "audience": 0.30,
//!   "engagement": 0.40,
//!   "regularity": 0.20,
//!   "diversity": 0.10
//! }
//!
//! The four weights must be finite, non-negative and sum to 1.0.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Accepted distance of the weight sum from 1.0.
///
/// Kept small enough that `100 * sum` never leaves `[0, 100]` by more than
/// the 1e-9 tolerance used when comparing sub-scores to the total.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub audience: f64,
    pub engagement: f64,
    pub regularity: f64,
    pub diversity: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            audience: 0.30,
            engagement: 0.40,
            regularity: 0.20,
            diversity: 0.10,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.audience + self.engagement + self.regularity + self.diversity
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("audience", self.audience),
            ("engagement", self.engagement),
            ("regularity", self.regularity),
            ("diversity", self.diversity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsSum { sum });
        }
        Ok(())
    }
}
