//! Error types for configuration, workload loading and runway invariants.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AircraftClass, Direction};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration limit `{0}` must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("Configuration interval `{0}` must be non-zero")]
    ZeroInterval(&'static str),

    #[error("Fuel reserve range is inverted: min {min} > max {max}")]
    InvertedFuelRange { min: u64, max: u64 },

    #[error("Time scale must be a positive finite number, got {0}")]
    InvalidTimeScale(f64),
}

/// Fatal errors raised while loading a workload, before any aircraft starts.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("Cannot open input file {} for reading: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read workload: {0}")]
    Read(#[from] io::Error),

    #[error("Workload contains no aircraft")]
    Empty,

    #[error("Workload contains {count} aircraft, the maximum is {max}")]
    TooMany { count: usize, max: usize },
}

impl WorkloadError {
    /// Process exit code reported for this error.
    ///
    /// Unreadable input exits with `1`; a bad aircraft count with `65`.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkloadError::Open { .. } | WorkloadError::Read(_) => 1,
            WorkloadError::Empty | WorkloadError::TooMany { .. } => 65,
        }
    }
}

/// Failures while driving a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Aircraft {0} thread panicked")]
    AircraftPanicked(usize),

    #[error("Controller thread panicked")]
    ControllerPanicked,
}

/// Broken runway invariant.
///
/// These indicate a synchronization defect, never a runtime condition; the
/// shared runway aborts the process when one is reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Runway occupancy {occupancy} exceeds capacity {capacity}")]
    OverCapacity { occupancy: u32, capacity: u32 },

    #[error("Release of {0} aircraft with none of that class on the runway")]
    OccupancyUnderflow(AircraftClass),

    #[error("Waiting counter for {0} aircraft would go negative")]
    WaitingUnderflow(AircraftClass),

    #[error("Waiting counter for direction {0} would go negative")]
    DirectionWaitingUnderflow(Direction),

    #[error("Fuel emergency counter would go negative")]
    EscalationUnderflow,

    #[error("Commercial and cargo aircraft share the runway")]
    SegregationBroken,

    #[error("Per-class occupancy sums to {by_class}, total occupancy is {total}")]
    OccupancyMismatch { by_class: u32, total: u32 },

    #[error("Admission attempted with {since_break} aircraft since break (limit {limit})")]
    BreakLimitExceeded { since_break: u32, limit: u32 },

    #[error("Maintenance started with {0} aircraft on the runway")]
    MaintenanceOnOccupiedRunway(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_exit_codes_are_distinct_from_success() {
        let open = WorkloadError::Open {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "nope"),
        };
        assert_eq!(open.exit_code(), 1);
        assert_eq!(WorkloadError::Empty.exit_code(), 65);
        assert_eq!(
            WorkloadError::TooMany {
                count: 1001,
                max: 1000
            }
            .exit_code(),
            65
        );
    }

    #[test]
    fn open_error_display_names_the_file() {
        let e = WorkloadError::Open {
            path: PathBuf::from("flights.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        let s = e.to_string();
        assert!(s.contains("flights.txt"));
        assert!(s.contains("not found"));
    }

    #[test]
    fn invariant_display() {
        let e = InvariantViolation::OverCapacity {
            occupancy: 3,
            capacity: 2,
        };
        assert_eq!(e.to_string(), "Runway occupancy 3 exceeds capacity 2");
        assert_eq!(
            InvariantViolation::OccupancyUnderflow(AircraftClass::Cargo).to_string(),
            "Release of cargo aircraft with none of that class on the runway"
        );
    }

    #[test]
    fn simulation_error_wraps_config_error() {
        let e = SimulationError::from(ConfigError::ZeroLimit("capacity"));
        assert_eq!(e.to_string(), ConfigError::ZeroLimit("capacity").to_string());
        assert_eq!(
            SimulationError::AircraftPanicked(4).to_string(),
            "Aircraft 4 thread panicked"
        );
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::ZeroLimit("capacity").to_string(),
            "Configuration limit `capacity` must be greater than zero"
        );
    }
}
