//! Shared runway state.
//!
//! [`RunwayState`] is the single source of truth for occupancy, direction,
//! fairness and waiting counters. It carries no synchronization of its own:
//! the [`Runway`](crate::runway::Runway) wraps it in one mutex, and every
//! method here assumes the caller holds that lock.
//!
//! Mutators return `Result<_, InvariantViolation>`; an `Err` means the state
//! would have been corrupted and the mutation was not applied.

mod ledger;

pub use ledger::{ClassCounts, ClassTable, DirectionTable};

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::RunwayConfig;
use crate::error::InvariantViolation;
use crate::types::{AircraftClass, Direction};

/// Admission limits copied out of [`RunwayConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolicyLimits {
    pub capacity: u32,
    pub break_limit: u32,
    pub direction_limit: u32,
    pub fairness_run_limit: u32,
}

impl From<&RunwayConfig> for PolicyLimits {
    fn from(config: &RunwayConfig) -> Self {
        Self {
            capacity: config.capacity,
            break_limit: config.break_limit,
            direction_limit: config.direction_limit,
            fairness_run_limit: config.fairness_run_limit,
        }
    }
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self::from(&RunwayConfig::default())
    }
}

/// Lifetime totals, used for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunwayStats {
    pub admissions: u64,
    pub breaks: u64,
    pub direction_switches: u64,
    pub fuel_emergencies: u64,
    pub emergency_deadline_misses: u64,
    pub longest_wait: Duration,
}

/// Point-in-time copy of the runway state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunwaySnapshot {
    pub occupancy: u32,
    pub classes: ClassTable,
    pub directions: DirectionTable,
    pub admissions_since_break: u32,
    pub current_direction: Direction,
    pub consecutive_same_direction: u32,
    pub escalated_waiting: u32,
    pub last_standard_class: Option<AircraftClass>,
    pub standard_run_length: u32,
    pub stats: RunwayStats,
}

impl RunwaySnapshot {
    pub fn on_runway(&self, class: AircraftClass) -> u32 {
        self.classes[class].on_runway
    }

    pub fn waiting(&self, class: AircraftClass) -> u32 {
        self.classes[class].waiting
    }
}

#[derive(Debug, Clone)]
pub struct RunwayState {
    limits: PolicyLimits,
    occupancy: u32,
    classes: ClassTable,
    directions: DirectionTable,
    admissions_since_break: u32,
    current_direction: Direction,
    consecutive_same_direction: u32,
    escalated_waiting: u32,
    last_standard_class: Option<AircraftClass>,
    standard_run_length: u32,
    stats: RunwayStats,
}

impl RunwayState {
    /// Creates an empty runway facing north.
    pub fn new(limits: PolicyLimits) -> Self {
        Self {
            limits,
            occupancy: 0,
            classes: ClassTable::new(),
            directions: DirectionTable::new(),
            admissions_since_break: 0,
            current_direction: Direction::North,
            consecutive_same_direction: 0,
            escalated_waiting: 0,
            last_standard_class: None,
            standard_run_length: 0,
            stats: RunwayStats::default(),
        }
    }

    // ── Waiting registry ─────────────────────────────────────────────

    /// Records an aircraft entering the wait loop.
    ///
    /// `direction` is `None` for aircraft that accept either direction.
    pub fn register_waiting(&mut self, class: AircraftClass, direction: Option<Direction>) {
        self.classes[class].waiting += 1;
        if let Some(direction) = direction {
            *self.directions.waiting_mut(direction) += 1;
        }
    }

    /// Records an aircraft leaving the wait loop, admitted or not.
    pub fn unregister_waiting(
        &mut self,
        class: AircraftClass,
        direction: Option<Direction>,
    ) -> Result<(), InvariantViolation> {
        if self.classes[class].waiting == 0 {
            return Err(InvariantViolation::WaitingUnderflow(class));
        }
        if let Some(direction) = direction {
            if self.directions.waiting(direction) == 0 {
                return Err(InvariantViolation::DirectionWaitingUnderflow(direction));
            }
            *self.directions.waiting_mut(direction) -= 1;
        }
        self.classes[class].waiting -= 1;
        Ok(())
    }

    /// Marks one waiting aircraft as having declared a fuel emergency.
    pub fn escalate(&mut self) {
        self.escalated_waiting += 1;
        self.stats.fuel_emergencies += 1;
    }

    /// Removes a fuel emergency from the waiting set.
    pub fn clear_escalation(&mut self) -> Result<(), InvariantViolation> {
        if self.escalated_waiting == 0 {
            return Err(InvariantViolation::EscalationUnderflow);
        }
        self.escalated_waiting -= 1;
        Ok(())
    }

    // ── Occupancy ────────────────────────────────────────────────────

    /// Places one aircraft of `class` on the runway.
    ///
    /// Bumps the break and direction counters and, for standard classes,
    /// the fairness run.
    pub fn admit(&mut self, class: AircraftClass) -> Result<(), InvariantViolation> {
        if self.occupancy >= self.limits.capacity {
            return Err(InvariantViolation::OverCapacity {
                occupancy: self.occupancy + 1,
                capacity: self.limits.capacity,
            });
        }
        if self.admissions_since_break >= self.limits.break_limit {
            return Err(InvariantViolation::BreakLimitExceeded {
                since_break: self.admissions_since_break,
                limit: self.limits.break_limit,
            });
        }
        if let Some(rival) = class.rival() {
            if self.classes[rival].on_runway > 0 {
                return Err(InvariantViolation::SegregationBroken);
            }
        }

        self.occupancy += 1;
        self.classes[class].on_runway += 1;
        self.admissions_since_break += 1;
        self.consecutive_same_direction += 1;
        self.stats.admissions += 1;

        if class.is_standard() {
            if self.last_standard_class == Some(class) {
                self.standard_run_length += 1;
            } else {
                self.last_standard_class = Some(class);
                self.standard_run_length = 1;
            }
        }

        self.check_invariants()
    }

    /// Removes one aircraft of `class` from the runway.
    ///
    /// Waiting counters are left alone.
    pub fn release(&mut self, class: AircraftClass) -> Result<(), InvariantViolation> {
        if self.classes[class].on_runway == 0 || self.occupancy == 0 {
            return Err(InvariantViolation::OccupancyUnderflow(class));
        }
        self.occupancy -= 1;
        self.classes[class].on_runway -= 1;
        self.check_invariants()
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Fails unless the runway is empty.
    pub fn ensure_idle(&self) -> Result<(), InvariantViolation> {
        if self.occupancy != 0 {
            return Err(InvariantViolation::MaintenanceOnOccupiedRunway(
                self.occupancy,
            ));
        }
        Ok(())
    }

    /// Completes a controller break, resetting the admission counter.
    pub fn complete_break(&mut self) -> Result<(), InvariantViolation> {
        self.ensure_idle()?;
        self.admissions_since_break = 0;
        self.stats.breaks += 1;
        Ok(())
    }

    /// Completes a direction switch and returns the new direction.
    pub fn complete_switch(&mut self) -> Result<Direction, InvariantViolation> {
        self.ensure_idle()?;
        self.current_direction = self.current_direction.opposite();
        self.consecutive_same_direction = 0;
        self.stats.direction_switches += 1;
        Ok(self.current_direction)
    }

    /// Folds one admitted aircraft's wait into the statistics.
    pub fn note_wait(&mut self, waited: Duration, missed_deadline: bool) {
        self.stats.longest_wait = self.stats.longest_wait.max(waited);
        if missed_deadline {
            self.stats.emergency_deadline_misses += 1;
        }
    }

    // ── Invariants ───────────────────────────────────────────────────

    /// Checks the structural occupancy invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.occupancy > self.limits.capacity {
            return Err(InvariantViolation::OverCapacity {
                occupancy: self.occupancy,
                capacity: self.limits.capacity,
            });
        }
        let by_class = self.classes.total_on_runway();
        if by_class != self.occupancy {
            return Err(InvariantViolation::OccupancyMismatch {
                by_class,
                total: self.occupancy,
            });
        }
        if self.classes[AircraftClass::Commercial].on_runway > 0
            && self.classes[AircraftClass::Cargo].on_runway > 0
        {
            return Err(InvariantViolation::SegregationBroken);
        }
        if self.admissions_since_break > self.limits.break_limit {
            return Err(InvariantViolation::BreakLimitExceeded {
                since_break: self.admissions_since_break,
                limit: self.limits.break_limit,
            });
        }
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn limits(&self) -> &PolicyLimits {
        &self.limits
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    pub fn is_idle(&self) -> bool {
        self.occupancy == 0
    }

    pub fn on_runway(&self, class: AircraftClass) -> u32 {
        self.classes[class].on_runway
    }

    pub fn waiting(&self, class: AircraftClass) -> u32 {
        self.classes[class].waiting
    }

    /// Aircraft waiting that require `direction`.
    pub fn waiting_for(&self, direction: Direction) -> u32 {
        self.directions.waiting(direction)
    }

    pub fn admissions_since_break(&self) -> u32 {
        self.admissions_since_break
    }

    pub fn current_direction(&self) -> Direction {
        self.current_direction
    }

    pub fn consecutive_same_direction(&self) -> u32 {
        self.consecutive_same_direction
    }

    /// Waiting aircraft that have declared a fuel emergency.
    pub fn escalated_waiting(&self) -> u32 {
        self.escalated_waiting
    }

    pub fn last_standard_class(&self) -> Option<AircraftClass> {
        self.last_standard_class
    }

    pub fn standard_run_length(&self) -> u32 {
        self.standard_run_length
    }

    pub fn stats(&self) -> &RunwayStats {
        &self.stats
    }

    pub fn snapshot(&self) -> RunwaySnapshot {
        RunwaySnapshot {
            occupancy: self.occupancy,
            classes: self.classes,
            directions: self.directions,
            admissions_since_break: self.admissions_since_break,
            current_direction: self.current_direction,
            consecutive_same_direction: self.consecutive_same_direction,
            escalated_waiting: self.escalated_waiting,
            last_standard_class: self.last_standard_class,
            standard_run_length: self.standard_run_length,
            stats: self.stats,
        }
    }
}

impl Default for RunwayState {
    fn default() -> Self {
        Self::new(PolicyLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AircraftClass::{Cargo, Commercial, Emergency};

    #[test]
    fn new_state_is_empty_and_faces_north() {
        let state = RunwayState::default();
        assert!(state.is_idle());
        assert_eq!(state.current_direction(), Direction::North);
        assert_eq!(state.last_standard_class(), None);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn register_and_unregister_track_class_and_direction() {
        let mut state = RunwayState::default();
        state.register_waiting(Commercial, Some(Direction::North));
        state.register_waiting(Emergency, None);

        assert_eq!(state.waiting(Commercial), 1);
        assert_eq!(state.waiting(Emergency), 1);
        assert_eq!(state.waiting_for(Direction::North), 1);
        assert_eq!(state.waiting_for(Direction::South), 0);

        state
            .unregister_waiting(Commercial, Some(Direction::North))
            .unwrap();
        state.unregister_waiting(Emergency, None).unwrap();
        assert_eq!(state.waiting(Commercial), 0);
        assert_eq!(state.waiting_for(Direction::North), 0);
    }

    #[test]
    fn unregister_without_register_is_a_violation() {
        let mut state = RunwayState::default();
        assert_eq!(
            state.unregister_waiting(Cargo, Some(Direction::South)),
            Err(InvariantViolation::WaitingUnderflow(Cargo))
        );
        state.register_waiting(Cargo, None);
        assert_eq!(
            state.unregister_waiting(Cargo, Some(Direction::South)),
            Err(InvariantViolation::DirectionWaitingUnderflow(Direction::South))
        );
        // Rejected mutation leaves the class counter untouched.
        assert_eq!(state.waiting(Cargo), 1);
    }

    #[test]
    fn admit_updates_occupancy_and_counters() {
        let mut state = RunwayState::default();
        state.admit(Commercial).unwrap();
        state.admit(Emergency).unwrap();

        assert_eq!(state.occupancy(), 2);
        assert_eq!(state.on_runway(Commercial), 1);
        assert_eq!(state.on_runway(Emergency), 1);
        assert_eq!(state.admissions_since_break(), 2);
        assert_eq!(state.consecutive_same_direction(), 2);
        assert_eq!(state.stats().admissions, 2);
    }

    #[test]
    fn fairness_run_counts_consecutive_standard_admissions() {
        let mut state = RunwayState::default();
        for _ in 0..3 {
            state.admit(Commercial).unwrap();
            state.release(Commercial).unwrap();
        }
        assert_eq!(state.last_standard_class(), Some(Commercial));
        assert_eq!(state.standard_run_length(), 3);

        // Emergencies do not interrupt the run.
        state.admit(Emergency).unwrap();
        state.release(Emergency).unwrap();
        assert_eq!(state.standard_run_length(), 3);

        state.admit(Cargo).unwrap();
        assert_eq!(state.last_standard_class(), Some(Cargo));
        assert_eq!(state.standard_run_length(), 1);
    }

    #[test]
    fn admit_over_capacity_is_rejected() {
        let mut state = RunwayState::default();
        state.admit(Emergency).unwrap();
        state.admit(Emergency).unwrap();
        assert_eq!(
            state.admit(Emergency),
            Err(InvariantViolation::OverCapacity {
                occupancy: 3,
                capacity: 2
            })
        );
        assert_eq!(state.occupancy(), 2);
    }

    #[test]
    fn admit_mixing_standard_classes_is_rejected() {
        let mut state = RunwayState::default();
        state.admit(Commercial).unwrap();
        assert_eq!(
            state.admit(Cargo),
            Err(InvariantViolation::SegregationBroken)
        );
    }

    #[test]
    fn admit_at_break_limit_is_rejected() {
        let mut state = RunwayState::default();
        for _ in 0..8 {
            state.admit(Emergency).unwrap();
            state.release(Emergency).unwrap();
        }
        assert_eq!(
            state.admit(Emergency),
            Err(InvariantViolation::BreakLimitExceeded {
                since_break: 8,
                limit: 8
            })
        );
    }

    #[test]
    fn release_does_not_touch_waiting_counters() {
        let mut state = RunwayState::default();
        state.register_waiting(Cargo, Some(Direction::South));
        state.admit(Emergency).unwrap();
        state.release(Emergency).unwrap();
        assert_eq!(state.occupancy(), 0);
        assert_eq!(state.waiting(Cargo), 1);
        assert_eq!(state.waiting_for(Direction::South), 1);
    }

    #[test]
    fn release_on_empty_runway_is_a_violation() {
        let mut state = RunwayState::default();
        assert_eq!(
            state.release(Cargo),
            Err(InvariantViolation::OccupancyUnderflow(Cargo))
        );
    }

    #[test]
    fn break_resets_only_the_break_counter() {
        let mut state = RunwayState::default();
        state.admit(Commercial).unwrap();
        state.release(Commercial).unwrap();
        state.complete_break().unwrap();

        assert_eq!(state.admissions_since_break(), 0);
        assert_eq!(state.consecutive_same_direction(), 1);
        assert_eq!(state.standard_run_length(), 1);
        assert_eq!(state.stats().breaks, 1);
    }

    #[test]
    fn maintenance_requires_an_empty_runway() {
        let mut state = RunwayState::default();
        state.admit(Commercial).unwrap();
        assert_eq!(
            state.complete_break(),
            Err(InvariantViolation::MaintenanceOnOccupiedRunway(1))
        );
        assert_eq!(
            state.complete_switch(),
            Err(InvariantViolation::MaintenanceOnOccupiedRunway(1))
        );
        assert_eq!(state.current_direction(), Direction::North);
    }

    #[test]
    fn switch_flips_direction_and_resets_run() {
        let mut state = RunwayState::default();
        state.admit(Commercial).unwrap();
        state.release(Commercial).unwrap();

        assert_eq!(state.complete_switch(), Ok(Direction::South));
        assert_eq!(state.consecutive_same_direction(), 0);
        assert_eq!(state.stats().direction_switches, 1);
        assert_eq!(state.complete_switch(), Ok(Direction::North));
    }

    #[test]
    fn escalation_counter() {
        let mut state = RunwayState::default();
        state.escalate();
        state.escalate();
        assert_eq!(state.escalated_waiting(), 2);
        state.clear_escalation().unwrap();
        state.clear_escalation().unwrap();
        assert_eq!(
            state.clear_escalation(),
            Err(InvariantViolation::EscalationUnderflow)
        );
        assert_eq!(state.stats().fuel_emergencies, 2);
    }

    #[test]
    fn note_wait_keeps_maximum() {
        let mut state = RunwayState::default();
        state.note_wait(Duration::from_secs(3), false);
        state.note_wait(Duration::from_secs(1), true);
        assert_eq!(state.stats().longest_wait, Duration::from_secs(3));
        assert_eq!(state.stats().emergency_deadline_misses, 1);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut state = RunwayState::default();
        state.register_waiting(Cargo, Some(Direction::South));
        state.admit(Commercial).unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.occupancy, 1);
        assert_eq!(snap.on_runway(Commercial), 1);
        assert_eq!(snap.waiting(Cargo), 1);
        assert_eq!(snap.directions.waiting(Direction::South), 1);
        assert_eq!(snap.last_standard_class, Some(Commercial));
    }
}
