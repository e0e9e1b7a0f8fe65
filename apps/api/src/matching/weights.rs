use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("weight '{name}' must be a finite, non-negative number (got {value})")]
    InvalidWeight { name: &'static str, value: f64 },
}

/// Relative importance of the four composite terms. Missing keys are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightVector {
    #[serde(default)]
    pub semantic: f64,
    /// Stated-preference term.
    #[serde(default)]
    pub preference: f64,
    #[serde(default, alias = "skill")]
    pub skill_relevance: f64,
    /// Seniority term.
    #[serde(default)]
    pub experience: f64,
}

impl WeightVector {
    /// Applied when a ranking request carries no weights at all.
    pub const DEFAULT_REQUEST: WeightVector = WeightVector {
        semantic: 0.4,
        preference: 0.0,
        skill_relevance: 0.4,
        experience: 0.2,
    };

    pub const EQUAL: WeightVector = WeightVector {
        semantic: 0.25,
        preference: 0.25,
        skill_relevance: 0.25,
        experience: 0.25,
    };

    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("semantic", self.semantic),
            ("preference", self.preference),
            ("skill_relevance", self.skill_relevance),
            ("experience", self.experience),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.semantic + self.preference + self.skill_relevance + self.experience
    }

    /// Rescales to sum 1.0. An all-zero vector becomes equal weights.
    pub fn normalized(&self) -> Result<WeightVector, ConfigError> {
        for (name, value) in self.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let total = self.sum();
        if total == 0.0 {
            return Ok(Self::EQUAL);
        }
        if !total.is_finite() {
            return Err(ConfigError::InvalidWeight {
                name: "sum",
                value: total,
            });
        }

        Ok(WeightVector {
            semantic: self.semantic / total,
            preference: self.preference / total,
            skill_relevance: self.skill_relevance / total,
            experience: self.experience / total,
        })
    }
}
