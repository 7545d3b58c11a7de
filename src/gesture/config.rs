use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for gesture interpretation.
///
/// The defaults are the empirically tuned values the games ship with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureConfig {
    /// Thumb-tip to index-tip distance (normalized units) below which a
    /// pinch is asserted.
    pub pinch_threshold: f32,

    /// Fraction of the remaining gap closed per tick by smoothed pointers.
    pub smoothing_factor: f32,

    /// How long the target hand must stay visible for a which-hand answer.
    pub hold_duration_ms: u64,
    pub hold_poll_ms: u64,

    /// Countdown before each which-hand prompt
    pub countdown_steps: u32,
    pub countdown_step_ms: u64,

    /// Pause on the "Excellent!" screen before the next round.
    pub celebration_ms: u64,

    /// Hand tracker report interval.
    pub tracker_report_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.06,
            smoothing_factor: 0.3,
            hold_duration_ms: 2000,
            hold_poll_ms: 100,
            countdown_steps: 3,
            countdown_step_ms: 1000,
            celebration_ms: 2000,
            tracker_report_ms: 500,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.pinch_threshold > 0.0) {
            bail!("pinch_threshold must be positive, got {}", self.pinch_threshold);
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            bail!(
                "smoothing_factor must be in (0, 1], got {}",
                self.smoothing_factor
            );
        }
        if self.hold_duration_ms == 0 {
            bail!("hold_duration_ms must be greater than zero");
        }
        if self.hold_poll_ms == 0 || self.countdown_step_ms == 0 || self.tracker_report_ms == 0 {
            bail!("poll intervals must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = GestureConfig {
            smoothing_factor: 0.0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());

        config.smoothing_factor = 1.5;
        assert!(config.validate().is_err());

        config = GestureConfig {
            hold_duration_ms: 0,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());

        config = GestureConfig {
            pinch_threshold: f32::NAN,
            ..GestureConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GestureConfig = serde_json::from_str(r#"{ "pinchThreshold": 0.05 }"#).unwrap();
        assert_eq!(config.pinch_threshold, 0.05);
        assert_eq!(config.hold_duration_ms, 2000);
    }
}
