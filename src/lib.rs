//! runway - concurrent admission control for a shared airport runway
//!
//! A two-slot runway serves commercial, cargo and emergency aircraft. Each
//! aircraft thread blocks in [`Runway::enter`] until the admission policy
//! lets it on; a controller thread takes periodic breaks and switches the
//! runway direction. Fuel emergencies escalate standard aircraft that wait
//! too long.

pub mod admission;
pub mod config;
pub mod error;
pub mod request;
pub mod runway;
pub mod simulation;
pub mod state;
pub mod types;
pub mod workload;

pub use admission::{Admission, Denial};
pub use config::RunwayConfig;
pub use error::{ConfigError, InvariantViolation, SimulationError, WorkloadError};
pub use request::Request;
pub use runway::{Clearance, Controller, ControllerHandle, Maintenance, Runway};
pub use simulation::{Simulation, SimulationReport};
pub use state::{RunwaySnapshot, RunwayState, RunwayStats};
pub use types::{AircraftClass, Direction};
pub use workload::{FlightPlan, FlightRecord, Workload};
