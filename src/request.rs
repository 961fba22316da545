//! A single aircraft's runway request.

use std::time::{Duration, Instant};

use crate::types::{AircraftClass, Direction};

/// One waiting aircraft.
///
/// Everything except the escalation flag is fixed at creation. Escalation
/// (a fuel emergency) happens at most once and is never undone.
#[derive(Debug, Clone)]
pub struct Request {
    id: usize,
    class: AircraftClass,
    escalation_deadline: Duration,
    arrival: Instant,
    escalated: bool,
}

impl Request {
    /// Creates a request that starts waiting now.
    pub fn new(id: usize, class: AircraftClass, escalation_deadline: Duration) -> Self {
        Self::arrived_at(id, class, escalation_deadline, Instant::now())
    }

    /// Creates a request with an explicit arrival instant.
    pub fn arrived_at(
        id: usize,
        class: AircraftClass,
        escalation_deadline: Duration,
        arrival: Instant,
    ) -> Self {
        Self {
            id,
            class,
            escalation_deadline,
            arrival,
            escalated: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn class(&self) -> AircraftClass {
        self.class
    }

    pub fn arrival(&self) -> Instant {
        self.arrival
    }

    pub fn escalation_deadline(&self) -> Duration {
        self.escalation_deadline
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Direction counted in the waiting table, `None` for emergencies.
    pub fn registered_direction(&self) -> Option<Direction> {
        self.class.fixed_direction()
    }

    pub fn waited(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.arrival)
    }

    /// Flips the escalation flag if the deadline has passed.
    ///
    /// Returns true only on the call that performed the escalation.
    pub fn escalate_if_due(&mut self, now: Instant) -> bool {
        if self.escalated || self.waited(now) < self.escalation_deadline {
            return false;
        }
        self.escalated = true;
        true
    }

    /// Time until escalation, or `None` once escalated.
    pub fn until_escalation(&self, now: Instant) -> Option<Duration> {
        if self.escalated {
            return None;
        }
        Some(self.escalation_deadline.saturating_sub(self.waited(now)))
    }

    /// How long to block before re-checking admission.
    ///
    /// Never longer than `recheck`, and short enough to wake exactly at the
    /// escalation deadline.
    pub fn next_wait(&self, now: Instant, recheck: Duration) -> Duration {
        match self.until_escalation(now) {
            Some(remaining) if !remaining.is_zero() => remaining.min(recheck),
            _ => recheck,
        }
    }
}
