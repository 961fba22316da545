//! Synchronized runway: one mutex around [`RunwayState`] plus one condition
//! variable that every state change broadcasts on.
//!
//! # Thread model
//!
//! Each aircraft runs on its own thread and calls [`Runway::enter`], which
//! blocks until the admission predicate passes. Waiters re-check on every
//! broadcast and at least once per `recheck_interval`, waking early when
//! their own escalation deadline falls due. The [`Controller`] runs on a
//! separate thread, polls the same state and performs breaks and direction
//! switches while holding the lock for their whole duration.
//!
//! An [`InvariantViolation`] reported by the state layer is a
//! synchronization bug; the runway logs it and aborts the process.

mod controller;


pub use controller::{plan_maintenance, Controller, ControllerHandle, Maintenance};

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error, info, trace, warn};

use crate::admission::{self, Admission};
use crate::config::RunwayConfig;
use crate::error::{ConfigError, InvariantViolation};
use crate::request::Request;
use crate::state::{PolicyLimits, RunwaySnapshot, RunwayState};
use crate::types::{AircraftClass, Direction};

struct Shared {
    config: RunwayConfig,
    state: Mutex<RunwayState>,
    wake: Condvar,
}

/// Cloneable handle to the shared runway.
#[derive(Clone)]
pub struct Runway {
    shared: Arc<Shared>,
}

impl fmt::Debug for Runway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Runway");
        match self.shared.state.try_lock() {
            Some(state) => debug.field("snapshot", &state.snapshot()),
            None => debug.field("snapshot", &format_args!("<locked>")),
        };
        debug.finish_non_exhaustive()
    }
}

impl Runway {
    /// Creates an empty runway facing north.
    pub fn new(config: RunwayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RunwayState::new(PolicyLimits::from(&config));
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
                wake: Condvar::new(),
            }),
        })
    }

    pub fn config(&self) -> &RunwayConfig {
        &self.shared.config
    }

    /// Copies the current state. Only suitable for reporting and tests;
    /// the copy is stale as soon as the lock is released.
    pub fn snapshot(&self) -> RunwaySnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Blocks until `request` is admitted and returns its clearance.
    pub fn enter(&self, mut request: Request) -> Clearance {
        let recheck = self.shared.config.recheck_interval;
        let mut state = self.join_queue(&request);
        loop {
            let now = Instant::now();
            if let Some(clearance) = self.attempt(&mut state, &mut request, now) {
                drop(state);
                self.announce(&clearance, &request);
                return clearance;
            }
            self.shared.wake.wait_for(&mut state, request.next_wait(now, recheck));
        }
    }

    /// Like [`enter`](Self::enter) but gives up after `patience`.
    ///
    /// On timeout the aircraft is removed from the waiting counters and the
    /// request is handed back unchanged (escalation included).
    pub fn enter_within(&self, mut request: Request, patience: Duration) -> Result<Clearance, Request> {
        let recheck = self.shared.config.recheck_interval;
        let give_up_at = Instant::now() + patience;
        let mut state = self.join_queue(&request);
        loop {
            let now = Instant::now();
            if let Some(clearance) = self.attempt(&mut state, &mut request, now) {
                drop(state);
                self.announce(&clearance, &request);
                return Ok(clearance);
            }
            if now >= give_up_at {
                Self::leave_queue(&mut state, &request);
                drop(state);
                self.shared.wake.notify_all();
                debug!(
                    target: "runway.admission",
                    id = request.id(),
                    class = %request.class(),
                    "aircraft gave up waiting"
                );
                return Err(request);
            }
            let timeout = request.next_wait(now, recheck).min(give_up_at - now);
            self.shared.wake.wait_for(&mut state, timeout);
        }
    }

    fn join_queue(&self, request: &Request) -> MutexGuard<'_, RunwayState> {
        let mut state = self.shared.state.lock();
        state.register_waiting(request.class(), request.registered_direction());
        debug!(
            target: "runway.admission",
            id = request.id(),
            class = %request.class(),
            "aircraft waiting for runway"
        );
        state
    }

    /// One pass of the admission loop under the lock: escalate if due, then
    /// evaluate and, on success, take the slot.
    fn attempt(&self, state: &mut RunwayState, request: &mut Request, now: Instant) -> Option<Clearance> {
        let id = request.id();
        let class = request.class();

        if request.escalate_if_due(now) {
            state.escalate();
            warn!(
                target: "runway.admission",
                id,
                %class,
                waited_ms = request.waited(now).as_millis() as u64,
                "fuel emergency declared"
            );
        }

        if let Admission::Deny(reason) = admission::evaluate(state, class, request.is_escalated()) {
            trace!(target: "runway.admission", id, %class, %reason, "admission denied");
            return None;
        }

        Self::leave_queue(state, request);
        enforce(state.admit(class));

        let waited = request.waited(now);
        state.note_wait(waited, self.missed_deadline(class, waited));
        Some(Clearance {
            runway: self.clone(),
            id,
            class,
            direction: state.current_direction(),
            waited,
            released: false,
        })
    }

    fn missed_deadline(&self, class: AircraftClass, waited: Duration) -> bool {
        class == AircraftClass::Emergency && waited > self.shared.config.scaled_emergency_timeout()
    }

    /// Wakes the other waiters and logs an admission. Called without the lock.
    fn announce(&self, clearance: &Clearance, request: &Request) {
        self.shared.wake.notify_all();
        if self.missed_deadline(clearance.class, clearance.waited) {
            warn!(
                target: "runway.admission",
                id = clearance.id,
                waited_ms = clearance.waited.as_millis() as u64,
                "emergency aircraft admitted past its deadline"
            );
        }
        info!(
            target: "runway.admission",
            id = clearance.id,
            class = %clearance.class,
            direction = %clearance.direction,
            escalated = request.is_escalated(),
            "aircraft is now on the runway"
        );
    }

    fn leave_queue(state: &mut RunwayState, request: &Request) {
        enforce(state.unregister_waiting(request.class(), request.registered_direction()));
        if request.is_escalated() {
            enforce(state.clear_escalation());
        }
    }

    fn release(&self, class: AircraftClass) {
        let mut state = self.shared.state.lock();
        enforce(state.release(class));
        drop(state);
        self.shared.wake.notify_all();
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, RunwayState> {
        self.shared.state.lock()
    }

    pub(crate) fn notify_waiters(&self) {
        self.shared.wake.notify_all();
    }
}

/// Proof that an aircraft holds a runway slot.
///
/// The slot is released by [`depart`](Self::depart) or when the clearance
/// is dropped.
#[must_use = "dropping a clearance releases the runway slot immediately"]
#[derive(Debug)]
pub struct Clearance {
    runway: Runway,
    id: usize,
    class: AircraftClass,
    direction: Direction,
    waited: Duration,
    released: bool,
}

impl Clearance {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn class(&self) -> AircraftClass {
        self.class
    }

    /// Runway direction at the moment of admission.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Time spent waiting before admission.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Leaves the runway and wakes every waiter.
    pub fn depart(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.runway.release(self.class);
            debug!(target: "runway.admission", id = self.id, class = %self.class, "aircraft cleared the runway");
        }
    }
}

impl Drop for Clearance {
    fn drop(&mut self) {
        self.release();
    }
}

/// Unwraps a state mutation or aborts on a broken invariant.
pub(crate) fn enforce<T>(result: Result<T, InvariantViolation>) -> T {
    result.unwrap_or_else(|violation| {
        error!(target: "runway.invariant", %violation, "runway invariant violated, aborting");
        std::process::abort()
    })
}
