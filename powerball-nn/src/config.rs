use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    None,
    /// Divide every input column by its largest absolute value.
    Max,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    pub max_error: f64,
    pub max_iterations: usize,
    pub normalization: Normalization,
    pub train_ratio: f64,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![12, 12, 20],
            learning_rate: 0.5,
            max_error: 0.001,
            max_iterations: 2500,
            normalization: Normalization::Max,
            train_ratio: 0.6,
            seed: 42,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            bail!("learning_rate must be positive, got {}", self.learning_rate);
        }
        if !(self.max_error >= 0.0 && self.max_error.is_finite()) {
            bail!("max_error must be non-negative, got {}", self.max_error);
        }
        if self.max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }
        if self.hidden_layers.is_empty() {
            bail!("at least one hidden layer is required");
        }
        if let Some(pos) = self.hidden_layers.iter().position(|&n| n == 0) {
            bail!("hidden layer {} has zero neurons", pos + 1);
        }
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            bail!("train_ratio must lie in (0, 1), got {}", self.train_ratio);
        }
        Ok(())
    }
}

/// Outcome of one `fit` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub iterations: usize,
    pub final_error: f64,
    pub error_history: Vec<f64>,
    /// True when training stopped because the error reached `max_error`.
    pub converged: bool,
    pub train_time_ms: u64,
}

/// Parse a comma-separated topology such as `12,12,20`.
pub fn parse_topology(s: &str) -> Result<Vec<usize>> {
    let mut layers = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        match part.parse::<usize>() {
            Ok(n) => layers.push(n),
            Err(_) => bail!("invalid layer size '{part}' in topology '{s}'"),
        }
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.hidden_layers, vec![12, 12, 20]);
        assert!((config.learning_rate - 0.5).abs() < 1e-12);
        assert_eq!(config.max_iterations, 2500);
        assert_eq!(config.normalization, Normalization::Max);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NetworkConfig::default();
        config.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.max_error = -1.0;
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.max_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.hidden_layers = vec![];
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.hidden_layers = vec![8, 0];
        assert!(config.validate().is_err());

        let mut config = NetworkConfig::default();
        config.train_ratio = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_topology() {
        assert_eq!(parse_topology("12,12,20").unwrap(), vec![12, 12, 20]);
        assert_eq!(parse_topology(" 8 ").unwrap(), vec![8]);
        assert!(parse_topology("8,x").is_err());
        assert!(parse_topology("").is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = NetworkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: NetworkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.hidden_layers, config.hidden_layers);
        assert_eq!(restored.normalization, config.normalization);
        assert!(json.contains("\"max\""));
    }
}
