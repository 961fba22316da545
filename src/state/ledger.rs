//! Typed counter tables backing [`RunwayState`](super::RunwayState).
//!
//! Per-class and per-direction counters, indexed by the enum they count.

use std::ops::{Index, IndexMut};

use crate::types::{AircraftClass, Direction};

/// Waiting and occupying counts for one aircraft class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassCounts {
    /// Aircraft of this class blocked in the admission loop.
    pub waiting: u32,
    /// Aircraft of this class currently holding a runway slot.
    pub on_runway: u32,
}

/// One [`ClassCounts`] record per [`AircraftClass`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassTable {
    entries: [ClassCounts; 3],
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `on_runway` across all classes.
    pub fn total_on_runway(&self) -> u32 {
        self.entries.iter().map(|c| c.on_runway).sum()
    }

    /// Iterates `(class, counts)` pairs in class index order.
    pub fn iter(&self) -> impl Iterator<Item = (AircraftClass, &ClassCounts)> {
        AircraftClass::all().into_iter().zip(self.entries.iter())
    }
}

impl Index<AircraftClass> for ClassTable {
    type Output = ClassCounts;

    fn index(&self, class: AircraftClass) -> &ClassCounts {
        &self.entries[class.index()]
    }
}

impl IndexMut<AircraftClass> for ClassTable {
    fn index_mut(&mut self, class: AircraftClass) -> &mut ClassCounts {
        &mut self.entries[class.index()]
    }
}

/// Waiting counts keyed by the direction an aircraft needs.
///
/// Emergency aircraft accept either direction and are never recorded here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionTable {
    waiting: [u32; 2],
}

impl DirectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waiting(&self, direction: Direction) -> u32 {
        self.waiting[direction.index()]
    }

    pub(crate) fn waiting_mut(&mut self, direction: Direction) -> &mut u32 {
        &mut self.waiting[direction.index()]
    }
}
