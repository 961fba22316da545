//! Replays a [`Workload`] against a live runway.
//!
//! One thread per aircraft plus the controller thread. Arrival gaps are
//! slept on the driver thread, so aircraft appear in workload order.

use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RunwayConfig;
use crate::error::SimulationError;
use crate::request::Request;
use crate::runway::{Controller, Runway};
use crate::workload::{FlightPlan, Workload};

/// Totals gathered over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationReport {
    pub aircraft: usize,
    pub admissions: u64,
    pub breaks: u64,
    pub direction_switches: u64,
    pub fuel_emergencies: u64,
    pub emergency_deadline_misses: u64,
    pub longest_wait: Duration,
    pub elapsed: Duration,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "aircraft:                  {}", self.aircraft)?;
        writeln!(f, "admissions:                {}", self.admissions)?;
        writeln!(f, "controller breaks:         {}", self.breaks)?;
        writeln!(f, "direction switches:        {}", self.direction_switches)?;
        writeln!(f, "fuel emergencies:          {}", self.fuel_emergencies)?;
        writeln!(f, "emergency deadline misses: {}", self.emergency_deadline_misses)?;
        writeln!(f, "longest wait:              {:.3}s", self.longest_wait.as_secs_f64())?;
        write!(f, "elapsed:                   {:.3}s", self.elapsed.as_secs_f64())
    }
}

/// Drives a whole run: controller, aircraft threads and the final report.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: RunwayConfig,
}

impl Simulation {
    pub fn new(config: RunwayConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunwayConfig {
        &self.config
    }

    /// Runs every flight of `workload` to completion.
    ///
    /// Returns once all aircraft have departed and the controller has
    /// stopped.
    pub fn run(&self, workload: &Workload) -> Result<SimulationReport, SimulationError> {
        let started = Instant::now();
        let runway = Runway::new(self.config.clone())?;
        let controller = Controller::new(runway.clone())
            .spawn()
            .map_err(|source| SimulationError::Spawn {
                role: "controller",
                source,
            })?;

        info!(
            target: "runway.simulation",
            aircraft = workload.len(),
            time_scale = self.config.time_scale,
            "simulation started"
        );

        let mut aircraft: Vec<(usize, JoinHandle<()>)> = Vec::with_capacity(workload.len());
        for flight in workload.flights() {
            thread::sleep(self.config.scaled(flight.arrival_gap.value()));
            let handle = Self::spawn_aircraft(&runway, *flight)?;
            aircraft.push((flight.id, handle));
        }

        for (id, handle) in aircraft {
            handle
                .join()
                .map_err(|_| SimulationError::AircraftPanicked(id))?;
        }
        controller
            .shutdown()
            .map_err(|_| SimulationError::ControllerPanicked)?;

        let stats = runway.snapshot().stats;
        let report = SimulationReport {
            aircraft: workload.len(),
            admissions: stats.admissions,
            breaks: stats.breaks,
            direction_switches: stats.direction_switches,
            fuel_emergencies: stats.fuel_emergencies,
            emergency_deadline_misses: stats.emergency_deadline_misses,
            longest_wait: stats.longest_wait,
            elapsed: started.elapsed(),
        };

        info!(
            target: "runway.simulation",
            aircraft = report.aircraft,
            breaks = report.breaks,
            switches = report.direction_switches,
            fuel_emergencies = report.fuel_emergencies,
            deadline_misses = report.emergency_deadline_misses,
            longest_wait_ms = report.longest_wait.as_millis() as u64,
            "simulation finished"
        );
        Ok(report)
    }

    fn spawn_aircraft(runway: &Runway, flight: FlightPlan) -> Result<JoinHandle<()>, SimulationError> {
        let runway = runway.clone();
        thread::Builder::new()
            .name(format!("aircraft-{}", flight.id))
            .spawn(move || {
                let config = runway.config();
                let request = Request::new(
                    flight.id,
                    flight.class,
                    config.scaled(flight.fuel_reserve.value()),
                );
                debug!(
                    target: "runway.simulation",
                    id = flight.id,
                    class = %flight.class,
                    fuel_s = flight.fuel_reserve.value(),
                    "aircraft arrived"
                );

                let clearance = runway.enter(request);
                thread::sleep(config.scaled(flight.runway_time.value()));
                clearance.depart();
            })
            .map_err(|source| SimulationError::Spawn {
                role: "aircraft",
                source,
            })
    }
}
