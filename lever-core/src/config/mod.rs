//! Firmware configuration
//!
//! Board-agnostic tuning values. The firmware crate generates a
//! [`LeverConfig`] constant from `lever.toml` at build time; the defaults
//! here match the shipped file.

/// Maximum device ID length in bytes
pub const MAX_DEVICE_ID_LEN: usize = 16;

/// Largest supported sample window
pub const MAX_SAMPLE_WINDOW: usize = 64;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Device ID is empty
    EmptyDeviceId,
    /// Device ID exceeds [`MAX_DEVICE_ID_LEN`]
    DeviceIdTooLong,
    /// Tick or report interval is zero
    ZeroInterval,
    /// Report interval shorter than one tick
    ReportFasterThanTick,
    /// Stuck-sensor window is zero or exceeds [`MAX_SAMPLE_WINDOW`]
    InvalidSampleCount,
    /// A timeout or threshold is zero
    ZeroTimeout,
}

/// Lever firmware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeverConfig {
    /// Device ID reported until changed by the host
    pub device_id: &'static str,
    /// Control loop period (ms)
    pub tick_interval_ms: u32,
    /// Period between unsolicited data reports (ms)
    pub report_interval_ms: u32,
    /// Consecutive identical samples that count as a stuck sensor
    pub stuck_sample_count: u16,
    /// Continuous press that counts as a stuck button (ms)
    pub button_stuck_ms: u32,
    /// Host silence that counts as a communication error (ms)
    pub comm_timeout_ms: u32,
    /// Byte offset of the calibration record in EEPROM
    pub calibration_offset: u16,
}

impl Default for LeverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LeverConfig {
    /// Shipped defaults
    pub const DEFAULT: Self = Self {
        device_id: "lever1",
        tick_interval_ms: 50,
        report_interval_ms: 200,
        stuck_sample_count: 20,
        button_stuck_ms: 10_000,
        comm_timeout_ms: 30_000,
        calibration_offset: 0,
    };

    /// Check the configuration for values the firmware cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::EmptyDeviceId);
        }
        if self.device_id.len() > MAX_DEVICE_ID_LEN {
            return Err(ConfigError::DeviceIdTooLong);
        }
        if self.tick_interval_ms == 0 || self.report_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.report_interval_ms < self.tick_interval_ms {
            return Err(ConfigError::ReportFasterThanTick);
        }
        let samples = self.stuck_sample_count as usize;
        if samples == 0 || samples > MAX_SAMPLE_WINDOW {
            return Err(ConfigError::InvalidSampleCount);
        }
        if self.button_stuck_ms == 0 || self.comm_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(LeverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_device_id_limits() {
        let config = LeverConfig {
            device_id: "",
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyDeviceId));

        let config = LeverConfig {
            device_id: "lever-with-a-long-name",
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::DeviceIdTooLong));
    }

    #[test]
    fn test_intervals() {
        let config = LeverConfig {
            tick_interval_ms: 0,
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));

        let config = LeverConfig {
            report_interval_ms: 10,
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::ReportFasterThanTick));
    }

    #[test]
    fn test_sample_count_bounds() {
        let config = LeverConfig {
            stuck_sample_count: 0,
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleCount));

        let config = LeverConfig {
            stuck_sample_count: 65,
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleCount));
    }

    #[test]
    fn test_zero_timeouts() {
        let config = LeverConfig {
            comm_timeout_ms: 0,
            ..LeverConfig::DEFAULT
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
