//! Core value types shared by the runway state, the admission predicate and
//! the requester protocol.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Request class of an aircraft.
///
/// `Commercial` and `Cargo` are the two standard classes: each is bound to a
/// fixed runway direction, they never share the runway, and they take part
/// in the fairness rotation. `Emergency` is the priority class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AircraftClass {
    Commercial,
    Cargo,
    Emergency,
}

impl AircraftClass {
    /// Returns all classes in index order.
    pub fn all() -> [AircraftClass; 3] {
        [
            AircraftClass::Commercial,
            AircraftClass::Cargo,
            AircraftClass::Emergency,
        ]
    }

    /// Returns the index of this class (0=Commercial, 1=Cargo, 2=Emergency).
    pub fn index(&self) -> usize {
        match self {
            AircraftClass::Commercial => 0,
            AircraftClass::Cargo => 1,
            AircraftClass::Emergency => 2,
        }
    }

    /// Maps a workload class code to a class.
    ///
    /// `0` is commercial, `1` is cargo; every other code is treated as an
    /// emergency flight.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => AircraftClass::Commercial,
            1 => AircraftClass::Cargo,
            _ => AircraftClass::Emergency,
        }
    }

    /// Returns true for the two standard (non-priority) classes.
    pub fn is_standard(&self) -> bool {
        !matches!(self, AircraftClass::Emergency)
    }

    /// The other standard class, if this is a standard class.
    pub fn rival(&self) -> Option<AircraftClass> {
        match self {
            AircraftClass::Commercial => Some(AircraftClass::Cargo),
            AircraftClass::Cargo => Some(AircraftClass::Commercial),
            AircraftClass::Emergency => None,
        }
    }

    /// Fixed direction for standard classes; `None` for emergencies, which
    /// adopt whatever direction the runway is currently set to.
    pub fn fixed_direction(&self) -> Option<Direction> {
        match self {
            AircraftClass::Commercial => Some(Direction::North),
            AircraftClass::Cargo => Some(Direction::South),
            AircraftClass::Emergency => None,
        }
    }
}

impl fmt::Display for AircraftClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftClass::Commercial => write!(f, "commercial"),
            AircraftClass::Cargo => write!(f, "cargo"),
            AircraftClass::Emergency => write!(f, "emergency"),
        }
    }
}

/// Runway orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    North,
    South,
}

impl Direction {
    /// Returns both directions in index order.
    pub fn all() -> [Direction; 2] {
        [Direction::North, Direction::South]
    }

    pub fn index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => write!(f, "NORTH"),
            Direction::South => write!(f, "SOUTH"),
        }
    }
}
