//! Fixed configuration for a speed trap installation.
//!
//! The strip spacing and loop timings are compile-time constants. There is no
//! runtime calibration; targets validate [`DEFAULT_TRAP_CONFIG`] once at
//! start-up.

use core::fmt;

use crate::display::DwellTime;
use crate::trigger::TriggerPolarity;

/// Distance between the two strips, in metres.
pub const STRIP_SPACING_M: f32 = 0.6;

/// Delay at the end of every control-loop iteration. Doubles as the only
/// debounce the trigger lines get.
pub const LOOP_PACING_MS: u32 = 5;

/// Time each digit position stays strobed during a refresh.
pub const DIGIT_DWELL_MS: u32 = 2;

/// Installation parameters used by the engine and control loop.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrapConfig {
    pub distance_m: f32,
    pub loop_pacing_ms: u32,
    pub digit_dwell: DwellTime,
    pub polarity: TriggerPolarity,
}

impl TrapConfig {
    #[must_use]
    pub const fn new(
        distance_m: f32,
        loop_pacing_ms: u32,
        digit_dwell: DwellTime,
        polarity: TriggerPolarity,
    ) -> Self {
        Self {
            distance_m,
            loop_pacing_ms,
            digit_dwell,
            polarity,
        }
    }

    /// Checks the parameters can produce meaningful measurements.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.distance_m.is_finite() || self.distance_m <= 0.0 {
            return Err(ConfigError::InvalidDistance);
        }
        if self.digit_dwell.as_millis() == 0 {
            return Err(ConfigError::ZeroDwell);
        }
        Ok(())
    }
}

impl Default for TrapConfig {
    fn default() -> Self {
        DEFAULT_TRAP_CONFIG
    }
}

/// Reference installation: 0.6 m strip spacing, active-low strips.
pub const DEFAULT_TRAP_CONFIG: TrapConfig = TrapConfig::new(
    STRIP_SPACING_M,
    LOOP_PACING_MS,
    DwellTime::from_millis(DIGIT_DWELL_MS),
    TriggerPolarity::ActiveLow,
);

/// Configuration problems detected by [`TrapConfig::validate`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Strip spacing is zero, negative, or not a finite number.
    InvalidDistance,
    /// A zero dwell would leave the display dark.
    ZeroDwell,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDistance => f.write_str("strip distance must be a positive number"),
            ConfigError::ZeroDwell => f.write_str("digit dwell must be at least 1 ms"),
        }
    }
}
