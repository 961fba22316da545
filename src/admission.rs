//! Runway admission predicate.
//!
//! [`evaluate`] decides whether one waiting aircraft may take a runway slot
//! right now. It reads [`RunwayState`] and nothing else, so it can be
//! re-evaluated as often as waiters wake up.
//!
//! # Checks
//!
//! Checks run in a fixed order and the first failure denies:
//!
//! | # | Denial                 | Rule                                                          |
//! |---|------------------------|---------------------------------------------------------------|
//! | 1 | `AtCapacity`           | runway already holds `capacity` aircraft                      |
//! | 2 | `BreakDue`             | `break_limit` admissions since the last controller break      |
//! | 3 | `WrongDirection`       | standard aircraft whose direction is not the current one      |
//! | 4 | `ClassConflict`        | commercial and cargo never share the runway                   |
//! | 5 | `FuelEmergencyPending` | someone else declared a fuel emergency and this one has not   |
//! | 6 | `EmergencyWaiting`     | standard aircraft while an emergency flight waits             |
//! | 7 | `FairnessYield`        | run of `fairness_run_limit` of this class, rival class waiting |
//! | 8 | `DirectionYield`       | `direction_limit` in this direction, opposite side waiting    |
//!
//! Checks 1-4 are structural; 5-8 are scheduling policy. Emergency aircraft
//! skip checks 3, 4 and 7 and always take the current direction.

use std::fmt;

use crate::state::RunwayState;
use crate::types::{AircraftClass, Direction};

/// Why an aircraft was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denial {
    AtCapacity,
    BreakDue,
    WrongDirection,
    ClassConflict,
    FuelEmergencyPending,
    EmergencyWaiting,
    FairnessYield,
    DirectionYield,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Denial::AtCapacity => "runway at capacity",
            Denial::BreakDue => "controller break due",
            Denial::WrongDirection => "runway set to the other direction",
            Denial::ClassConflict => "rival class on the runway",
            Denial::FuelEmergencyPending => "fuel emergency pending",
            Denial::EmergencyWaiting => "emergency flight waiting",
            Denial::FairnessYield => "yielding to rival class",
            Denial::DirectionYield => "yielding for direction switch",
        };
        f.write_str(s)
    }
}

/// Outcome of one predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Deny(Denial),
}

impl Admission {
    pub fn is_admit(&self) -> bool {
        matches!(self, Admission::Admit)
    }
}

/// Direction an aircraft of `class` asks for given the current runway setting.
pub fn desired_direction(class: AircraftClass, current: Direction) -> Direction {
    class.fixed_direction().unwrap_or(current)
}

/// Runs the admission checks for one aircraft.
///
/// `escalated` is true once the aircraft has declared a fuel emergency.
pub fn evaluate(state: &RunwayState, class: AircraftClass, escalated: bool) -> Admission {
    let limits = state.limits();
    let current = state.current_direction();
    let desired = desired_direction(class, current);

    if state.occupancy() >= limits.capacity {
        return Admission::Deny(Denial::AtCapacity);
    }

    if state.admissions_since_break() >= limits.break_limit {
        return Admission::Deny(Denial::BreakDue);
    }

    if class.is_standard() && desired != current {
        return Admission::Deny(Denial::WrongDirection);
    }

    if let Some(rival) = class.rival() {
        if state.on_runway(rival) > 0 {
            return Admission::Deny(Denial::ClassConflict);
        }
    }

    if state.escalated_waiting() > 0 && !escalated {
        return Admission::Deny(Denial::FuelEmergencyPending);
    }

    if class.is_standard() && state.waiting(AircraftClass::Emergency) > 0 {
        return Admission::Deny(Denial::EmergencyWaiting);
    }

    if let Some(rival) = class.rival() {
        if state.standard_run_length() >= limits.fairness_run_limit
            && state.last_standard_class() == Some(class)
            && state.waiting(rival) > 0
        {
            return Admission::Deny(Denial::FairnessYield);
        }
    }

    if desired == current
        && state.consecutive_same_direction() >= limits.direction_limit
        && state.waiting_for(current.opposite()) > 0
    {
        return Admission::Deny(Denial::DirectionYield);
    }

    Admission::Admit
}

/// Boolean form of [`evaluate`].
pub fn can_admit(state: &RunwayState, class: AircraftClass, escalated: bool) -> bool {
    evaluate(state, class, escalated).is_admit()
}
