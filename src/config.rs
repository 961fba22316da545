//! Runtime parameters for the runway core and the simulation driver.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the runway admission policy, the controller and the
/// simulation.
///
/// Policy limits are counts; timings are wall-clock durations. Workload
/// seconds (arrival gaps, runway times, fuel reserves) are multiplied by
/// `time_scale` before use, and so are the maintenance durations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunwayConfig {
    // --- Policy limits ---
    /// Aircraft allowed on the runway at once.
    pub capacity: u32,
    /// Admissions allowed before the controller must take a break.
    pub break_limit: u32,
    /// Consecutive same-direction admissions before yielding to the
    /// opposite direction.
    pub direction_limit: u32,
    /// Consecutive admissions of one standard class before yielding to the
    /// other standard class.
    pub fairness_run_limit: u32,

    // --- Maintenance ---
    /// Length of a controller break.
    pub break_duration: Duration,
    /// Time needed to switch the runway direction.
    pub switch_duration: Duration,
    /// Interval between controller polls.
    pub controller_poll_interval: Duration,

    // --- Requesters ---
    /// Upper bound on how long a waiting aircraft sleeps between checks.
    pub recheck_interval: Duration,
    /// Inclusive range of fuel reserves in workload seconds.
    pub fuel_reserve_range: (u64, u64),
    /// Admission deadline goal for emergency aircraft, in workload seconds.
    pub emergency_timeout: u64,

    // --- Simulation ---
    /// Maximum number of aircraft read from a workload.
    pub max_aircraft: usize,
    /// Multiplier applied to workload seconds.
    pub time_scale: f64,
}

impl RunwayConfig {
    /// Converts workload seconds to a wall-clock duration using `time_scale`.
    pub fn scaled(&self, seconds: f64) -> Duration {
        Duration::from_secs_f64((seconds * self.time_scale).max(0.0))
    }

    /// Scaled break duration.
    pub fn scaled_break(&self) -> Duration {
        self.break_duration.mul_f64(self.time_scale)
    }

    /// Scaled direction switch duration.
    pub fn scaled_switch(&self) -> Duration {
        self.switch_duration.mul_f64(self.time_scale)
    }

    /// Scaled emergency admission deadline.
    pub fn scaled_emergency_timeout(&self) -> Duration {
        self.scaled(self.emergency_timeout as f64)
    }

    /// Checks that every limit and interval is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroLimit("capacity"));
        }
        if self.break_limit == 0 {
            return Err(ConfigError::ZeroLimit("break_limit"));
        }
        if self.direction_limit == 0 {
            return Err(ConfigError::ZeroLimit("direction_limit"));
        }
        if self.fairness_run_limit == 0 {
            return Err(ConfigError::ZeroLimit("fairness_run_limit"));
        }
        if self.max_aircraft == 0 {
            return Err(ConfigError::ZeroLimit("max_aircraft"));
        }
        if self.controller_poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("controller_poll_interval"));
        }
        if self.recheck_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("recheck_interval"));
        }
        let (lo, hi) = self.fuel_reserve_range;
        if lo > hi {
            return Err(ConfigError::InvertedFuelRange { min: lo, max: hi });
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(ConfigError::InvalidTimeScale(self.time_scale));
        }
        Ok(())
    }
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            break_limit: 8,
            direction_limit: 3,
            fairness_run_limit: 4,
            break_duration: Duration::from_secs(5),
            switch_duration: Duration::from_secs(5),
            controller_poll_interval: Duration::from_millis(100),
            recheck_interval: Duration::from_secs(1),
            fuel_reserve_range: (20, 60),
            emergency_timeout: 30,
            max_aircraft: 1000,
            time_scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = RunwayConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.capacity, 2);
        assert_eq!(cfg.break_limit, 8);
        assert_eq!(cfg.direction_limit, 3);
        assert_eq!(cfg.fairness_run_limit, 4);
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = RunwayConfig {
            capacity: 0,
            ..RunwayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroLimit("capacity")));
    }

    #[test]
    fn inverted_fuel_range_rejected() {
        let cfg = RunwayConfig {
            fuel_reserve_range: (60, 20),
            ..RunwayConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedFuelRange { min: 60, max: 20 })
        );
    }

    #[test]
    fn bad_time_scale_rejected() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = RunwayConfig {
                time_scale: scale,
                ..RunwayConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidTimeScale(_))
            ));
        }
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let cfg = RunwayConfig {
            controller_poll_interval: Duration::ZERO,
            ..RunwayConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroInterval("controller_poll_interval"))
        );
    }

    #[test]
    fn scaling_applies_to_workload_and_maintenance() {
        let cfg = RunwayConfig {
            time_scale: 0.5,
            ..RunwayConfig::default()
        };
        assert_eq!(cfg.scaled(2.0), Duration::from_secs(1));
        assert_eq!(cfg.scaled_break(), Duration::from_millis(2500));
        assert_eq!(cfg.scaled_switch(), Duration::from_millis(2500));
        assert_eq!(cfg.scaled_emergency_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        let cfg = RunwayConfig::default();
        assert_eq!(cfg.scaled(-3.0), Duration::ZERO);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let cfg = RunwayConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RunwayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
