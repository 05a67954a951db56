//! Engine configuration.
//!
//! Loaded from an optional TOML file, then overridden by `RESEMBLANCE_*`
//! environment variables. Every field has a default, so an empty file (or
//! no file) yields the reference behavior.

use crate::curve::{Breakpoint, CurveError, SimilarityCurve};
use crate::vector::DEFAULT_ZERO_NORM_EPSILON;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "RESEMBLANCE_CONFIG";
const ENV_LIKELY_MATCH_THRESHOLD: &str = "RESEMBLANCE_LIKELY_MATCH_THRESHOLD";
const ENV_ZERO_NORM_EPSILON: &str = "RESEMBLANCE_ZERO_NORM_EPSILON";
const ENV_VALID_THRESHOLD: &str = "RESEMBLANCE_VALID_THRESHOLD";
const ENV_EXCELLENT_THRESHOLD: &str = "RESEMBLANCE_EXCELLENT_THRESHOLD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid similarity curve: {0}")]
    InvalidCurve(#[from] CurveError),
    #[error("invalid {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
}

/// Consistency thresholds for multi-photo validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Below this the report is invalid.
    pub valid: f32,
    /// At or above this consistency is reported as excellent.
    pub excellent: f32,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            valid: 0.7,
            excellent: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Euclidean distance below which two faces are flagged as a likely match.
    pub likely_match_threshold: f32,
    /// Norms below this make cosine similarity report exactly 0.
    pub zero_norm_epsilon: f32,
    pub curve: SimilarityCurve,
    pub validation: ValidationThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            likely_match_threshold: 0.6,
            zero_norm_epsilon: DEFAULT_ZERO_NORM_EPSILON,
            curve: SimilarityCurve::default(),
            validation: ValidationThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Replace the distance-to-score curve.
    pub fn with_curve(mut self, points: Vec<Breakpoint>) -> Result<Self, ConfigError> {
        self.curve = SimilarityCurve::new(points)?;
        Ok(self)
    }

    /// Load from `path` (or `RESEMBLANCE_CONFIG`, or defaults), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style lookups. Unparsable values
    /// are ignored; parsed values must still pass [`validate`](Self::validate).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f32>().ok());

        if let Some(v) = read(ENV_LIKELY_MATCH_THRESHOLD) {
            self.likely_match_threshold = v;
        }
        if let Some(v) = read(ENV_ZERO_NORM_EPSILON) {
            self.zero_norm_epsilon = v;
        }
        if let Some(v) = read(ENV_VALID_THRESHOLD) {
            self.validation.valid = v;
        }
        if let Some(v) = read(ENV_EXCELLENT_THRESHOLD) {
            self.validation.excellent = v;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("likely_match_threshold", self.likely_match_threshold, f32::MAX)?;
        check_threshold("zero_norm_epsilon", self.zero_norm_epsilon, f32::MAX)?;
        if self.zero_norm_epsilon <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "zero_norm_epsilon",
                value: self.zero_norm_epsilon,
            });
        }
        check_threshold("validation.valid", self.validation.valid, 1.0)?;
        check_threshold("validation.excellent", self.validation.excellent, 1.0)?;
        if self.validation.excellent < self.validation.valid {
            return Err(ConfigError::InvalidThreshold {
                name: "validation.excellent",
                value: self.validation.excellent,
            });
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            likely_match_threshold = 0.5

            [validation]
            valid = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(cfg.likely_match_threshold, 0.5);
        assert_eq!(cfg.validation.valid, 0.6);
        assert_eq!(cfg.validation.excellent, 0.9);
        assert_eq!(cfg.curve, SimilarityCurve::default());
    }

    #[test]
    fn test_custom_curve_toml() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [[curve]]
            distance = 0.0
            score = 1.0

            [[curve]]
            distance = 1.2
            score = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.curve.breakpoints().len(), 2);
        assert!((cfg.curve.score(0.6) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_curve_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [[curve]]
            distance = 0.0
            score = 0.1

            [[curve]]
            distance = 1.0
            score = 0.9
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_with_curve_rejects_bad_points() {
        let points = vec![Breakpoint { distance: 0.0, score: 1.0 }];
        let err = EngineConfig::default().with_curve(points).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCurve(CurveError::TooFewBreakpoints(1))));
    }

    #[test]
    fn test_excellent_below_valid_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [validation]
            valid = 0.8
            excellent = 0.5
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::InvalidThreshold { name: "validation.excellent", .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RESEMBLANCE_LIKELY_MATCH_THRESHOLD", "0.55"),
            ("RESEMBLANCE_VALID_THRESHOLD", "0.65"),
            ("RESEMBLANCE_ZERO_NORM_EPSILON", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut cfg = EngineConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.likely_match_threshold, 0.55);
        assert_eq!(cfg.validation.valid, 0.65);
        assert_eq!(cfg.zero_norm_epsilon, DEFAULT_ZERO_NORM_EPSILON);
    }

    #[test]
    fn test_env_override_out_of_range() {
        let mut cfg = EngineConfig::default();
        let result = cfg.apply_env(|k| (k == "RESEMBLANCE_VALID_THRESHOLD").then(|| "1.5".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_zero_epsilon_rejected() {
        let err = EngineConfig::from_toml_str("zero_norm_epsilon = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold { name: "zero_norm_epsilon", .. }
        ));

        let mut cfg = EngineConfig::default();
        let result = cfg.apply_env(|k| (k == "RESEMBLANCE_ZERO_NORM_EPSILON").then(|| "0".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "likely_match_threshold = 0.45").unwrap();
        let cfg = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.likely_match_threshold, 0.45);
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/resemblance.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
