//! Configuration with YAML schema and validation.
//!
//! Every setting has a compiled-in default; a YAML file may override any
//! subset of them. Loading checks the schema (`validator`) first and the
//! cross-field rules second, so a bad file is rejected before anything
//! reads it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

use crate::error::{VizError, VizResult};
use crate::trace::InputKind;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VizConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Playback timing and speed range.
    #[validate(nested)]
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Input and trace size ceilings.
    #[validate(nested)]
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            playback: PlaybackConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl VizConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> VizResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> VizResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> VizResult<String> {
        serde_yaml::to_string(self).map_err(|e| VizError::serialization(e.to_string()))
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for schema violations and `Config` for
    /// cross-field violations.
    pub fn check(&self) -> VizResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> VizConfigBuilder {
        VizConfigBuilder::default()
    }

    fn validate_semantic(&self) -> VizResult<()> {
        let p = &self.playback;
        if !(p.min_speed.is_finite() && p.max_speed.is_finite()) {
            return Err(VizError::config("speed bounds must be finite"));
        }
        if p.min_speed <= 0.0 {
            return Err(VizError::config(format!(
                "min_speed must be positive, got {}",
                p.min_speed
            )));
        }
        if p.min_speed > p.max_speed {
            return Err(VizError::config(format!(
                "min_speed {} exceeds max_speed {}",
                p.min_speed, p.max_speed
            )));
        }
        if let Some(preset) = p
            .presets
            .iter()
            .find(|&&s| !(p.min_speed..=p.max_speed).contains(&s))
        {
            return Err(VizError::config(format!(
                "preset {preset} outside speed range [{}, {}]",
                p.min_speed, p.max_speed
            )));
        }
        Ok(())
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct VizConfigBuilder {
    base_delay_ms: Option<u64>,
    min_interval_ms: Option<u64>,
    speed_range: Option<(f64, f64)>,
    presets: Option<Vec<f64>>,
    max_array_len: Option<usize>,
    max_grid_cells: Option<usize>,
    max_steps: Option<usize>,
}

impl VizConfigBuilder {
    /// Set the delay between ticks at speed 1.0.
    #[must_use]
    pub const fn base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = Some(ms);
        self
    }

    /// Set the minimum delay between ticks.
    #[must_use]
    pub const fn min_interval_ms(mut self, ms: u64) -> Self {
        self.min_interval_ms = Some(ms);
        self
    }

    /// Set the allowed speed multiplier range.
    #[must_use]
    pub const fn speed_range(mut self, min: f64, max: f64) -> Self {
        self.speed_range = Some((min, max));
        self
    }

    /// Set the speed presets.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn presets(mut self, presets: Vec<f64>) -> Self {
        self.presets = Some(presets);
        self
    }

    /// Set the array length ceiling.
    #[must_use]
    pub const fn max_array_len(mut self, len: usize) -> Self {
        self.max_array_len = Some(len);
        self
    }

    /// Set the grid cell ceiling.
    #[must_use]
    pub const fn max_grid_cells(mut self, cells: usize) -> Self {
        self.max_grid_cells = Some(cells);
        self
    }

    /// Set the materialization step guard.
    #[must_use]
    pub const fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> VizConfig {
        let mut config = VizConfig::default();

        if let Some(ms) = self.base_delay_ms {
            config.playback.base_delay_ms = ms;
        }
        if let Some(ms) = self.min_interval_ms {
            config.playback.min_interval_ms = ms;
        }
        if let Some((min, max)) = self.speed_range {
            config.playback.min_speed = min;
            config.playback.max_speed = max;
        }
        if let Some(presets) = self.presets {
            config.playback.presets = presets;
        }
        if let Some(len) = self.max_array_len {
            config.limits.max_array_len = len;
        }
        if let Some(cells) = self.max_grid_cells {
            config.limits.max_grid_cells = cells;
        }
        if let Some(steps) = self.max_steps {
            config.limits.max_steps = steps;
        }

        config
    }
}

/// Playback timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Delay between ticks at speed 1.0, in milliseconds.
    #[validate(range(min = 1))]
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Floor for the delay between ticks, in milliseconds.
    #[validate(range(min = 1))]
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Slowest speed multiplier.
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    /// Fastest speed multiplier.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    /// Speeds selectable by number keys.
    #[serde(default = "default_presets")]
    pub presets: Vec<f64>,
}

const fn default_base_delay_ms() -> u64 {
    500
}

const fn default_min_interval_ms() -> u64 {
    100
}

const fn default_min_speed() -> f64 {
    0.25
}

const fn default_max_speed() -> f64 {
    16.0
}

fn default_presets() -> Vec<f64> {
    vec![0.5, 1.0, 2.0, 4.0]
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            min_interval_ms: default_min_interval_ms(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            presets: default_presets(),
        }
    }
}

impl PlaybackConfig {
    /// Delay between ticks at speed 1.0.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Floor for the delay between ticks.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Size ceilings applied when materializing a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of values for array algorithms.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_array_len")]
    pub max_array_len: usize,
    /// Maximum number of grid cells.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_grid_cells")]
    pub max_grid_cells: usize,
    /// Maximum Steps one trace may produce.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

const fn default_max_array_len() -> usize {
    50
}

const fn default_max_grid_cells() -> usize {
    2500
}

const fn default_max_steps() -> usize {
    100_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_array_len: default_max_array_len(),
            max_grid_cells: default_max_grid_cells(),
            max_steps: default_max_steps(),
        }
    }
}

impl LimitsConfig {
    /// Size ceiling for an input of the given kind.
    #[must_use]
    pub const fn ceiling_for(&self, kind: InputKind) -> usize {
        match kind {
            InputKind::Values | InputKind::Search => self.max_array_len,
            InputKind::Grid => self.max_grid_cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = VizConfig::default();

        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.playback.base_delay(), Duration::from_millis(500));
        assert_eq!(config.playback.min_interval(), Duration::from_millis(100));
        assert!((config.playback.min_speed - 0.25).abs() < f64::EPSILON);
        assert!((config.playback.max_speed - 16.0).abs() < f64::EPSILON);
        assert_eq!(config.playback.presets, vec![0.5, 1.0, 2.0, 4.0]);
        assert_eq!(config.limits.max_array_len, 50);
        assert_eq!(config.limits.max_grid_cells, 2500);
        assert_eq!(config.limits.max_steps, 100_000);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = VizConfig::builder()
            .base_delay_ms(200)
            .min_interval_ms(20)
            .speed_range(0.5, 8.0)
            .presets(vec![1.0, 8.0])
            .max_array_len(10)
            .max_grid_cells(100)
            .max_steps(500)
            .build();

        assert_eq!(config.playback.base_delay_ms, 200);
        assert_eq!(config.playback.min_interval_ms, 20);
        assert!((config.playback.max_speed - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.limits.max_array_len, 10);
        assert_eq!(config.limits.max_grid_cells, 100);
        assert_eq!(config.limits.max_steps, 500);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
playback:
  base_delay_ms: 250
  presets: [1.0, 2.0]
limits:
  max_array_len: 20
";
        let config = VizConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.playback.base_delay_ms, 250);
        assert_eq!(config.playback.min_interval_ms, 100);
        assert_eq!(config.playback.presets, vec![1.0, 2.0]);
        assert_eq!(config.limits.max_array_len, 20);
        assert_eq!(config.limits.max_grid_cells, 2500);
    }

    #[test]
    fn test_config_empty_yaml_object_is_default() {
        let config = VizConfig::from_yaml("{}").unwrap();
        assert_eq!(config, VizConfig::default());
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(VizConfig::from_yaml("colour: red").is_err());
        assert!(VizConfig::from_yaml("playback:\n  fps: 60").is_err());
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        let err = VizConfig::from_yaml("limits:\n  max_steps: 0").unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
        let err = VizConfig::from_yaml("playback:\n  min_interval_ms: 0").unwrap_err();
        assert!(matches!(err, VizError::Validation(_)));
    }

    #[test]
    fn test_config_semantic_speed_range() {
        let err = VizConfig::from_yaml("playback:\n  min_speed: 0.0").unwrap_err();
        assert!(matches!(err, VizError::Config { .. }));

        let err = VizConfig::from_yaml("playback:\n  min_speed: 4.0\n  max_speed: 2.0").unwrap_err();
        assert!(err.to_string().contains("exceeds"));

        let err = VizConfig::from_yaml("playback:\n  presets: [0.1]").unwrap_err();
        assert!(err.to_string().contains("preset"));
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = VizConfig::builder().max_array_len(12).build();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(VizConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = VizConfig::load("/nonexistent/algoscope.yaml").unwrap_err();
        assert!(matches!(err, VizError::Io(_)));
    }

    #[test]
    fn test_ceiling_for_kind() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.ceiling_for(InputKind::Values), 50);
        assert_eq!(limits.ceiling_for(InputKind::Search), 50);
        assert_eq!(limits.ceiling_for(InputKind::Grid), 2500);
    }
}
