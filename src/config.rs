// File: src/config.rs
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tunables for ranking and for the default prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Exponent on `(context length + 1)`; rewards specific contexts.
    pub context_factor: f64,
    /// Exponent on the prediction length.
    pub prediction_factor: f64,
    /// Budget of keyboard slots, each prediction costs `len + 1`.
    pub aksara_budget: usize,
    /// Prediction lengths gathered by `get_most_likely_predictions`.
    pub group_sizes: Vec<usize>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            context_factor: 0.0,
            prediction_factor: 0.0,
            aksara_budget: 11,
            group_sizes: vec![1, 2, 3, 4],
        }
    }
}

impl PredictorConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.context_factor.is_finite() || !self.prediction_factor.is_finite() {
            return Err(PredictorError::InvalidConfig("factors must be finite".to_string()));
        }
        if self.group_sizes.is_empty() {
            return Err(PredictorError::InvalidConfig("group_sizes is empty".to_string()));
        }
        if self.group_sizes.contains(&0) {
            return Err(PredictorError::InvalidConfig("group_sizes contains 0".to_string()));
        }
        Ok(())
    }
}
