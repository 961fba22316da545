//! Air traffic controller: breaks and direction switches.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{error, info};

use super::{enforce, Runway};
use crate::state::RunwayState;
use crate::types::Direction;

/// Maintenance action performed on an idle runway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maintenance {
    Break,
    SwitchDirection { from: Direction, to: Direction },
}

/// Decides which maintenance action, if any, is due.
///
/// A break wins over a switch. Both need an empty runway. A switch is due
/// when someone waits for the opposite direction and either the current
/// direction has used up its run or nobody waits for it.
pub fn plan_maintenance(state: &RunwayState) -> Option<Maintenance> {
    if !state.is_idle() {
        return None;
    }

    if state.admissions_since_break() >= state.limits().break_limit {
        return Some(Maintenance::Break);
    }

    let current = state.current_direction();
    let opposite_waiting = state.waiting_for(current.opposite());
    let same_waiting = state.waiting_for(current);

    if opposite_waiting > 0
        && (state.consecutive_same_direction() >= state.limits().direction_limit
            || same_waiting == 0)
    {
        return Some(Maintenance::SwitchDirection {
            from: current,
            to: current.opposite(),
        });
    }

    None
}

/// Runs maintenance against a [`Runway`].
#[derive(Debug, Clone)]
pub struct Controller {
    runway: Runway,
}

impl Controller {
    pub fn new(runway: Runway) -> Self {
        Self { runway }
    }

    /// Performs at most one maintenance action.
    ///
    /// The runway lock is held for the whole action, so no aircraft can be
    /// admitted until it completes. Waiters are woken afterwards.
    pub fn service(&self) -> Option<Maintenance> {
        let config = self.runway.config();
        let mut state = self.runway.lock_state();
        let action = plan_maintenance(&state)?;
        enforce(state.ensure_idle());

        match action {
            Maintenance::Break => {
                info!(target: "runway.controller", "the air traffic controller is taking a break");
                thread::sleep(config.scaled_break());
                enforce(state.complete_break());
                info!(target: "runway.controller", "the air traffic controller is back from break");
            }
            Maintenance::SwitchDirection { from, to } => {
                info!(target: "runway.controller", %from, %to, "switching runway direction");
                thread::sleep(config.scaled_switch());
                let now = enforce(state.complete_switch());
                info!(target: "runway.controller", direction = %now, "runway direction switched");
            }
        }

        drop(state);
        self.runway.notify_waiters();
        Some(action)
    }

    /// Starts the controller on its own thread.
    pub fn spawn(self) -> io::Result<ControllerHandle> {
        let stop = Arc::new(StopSignal::default());
        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("atc-controller".into())
            .spawn(move || self.run(&thread_stop))?;
        Ok(ControllerHandle {
            stop,
            thread: Some(thread),
        })
    }

    fn run(self, stop: &StopSignal) {
        let poll = self.runway.config().controller_poll_interval;
        info!(target: "runway.controller", "the air traffic controller arrived and is beginning operations");
        loop {
            self.service();
            if stop.wait(poll) {
                break;
            }
        }
        info!(target: "runway.controller", "the air traffic controller is off duty");
    }
}

/// Owner of a running controller thread.
///
/// Dropping the handle stops the controller and waits for it.
#[derive(Debug)]
pub struct ControllerHandle {
    stop: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Stops the controller after any in-progress maintenance action and
    /// joins its thread.
    pub fn shutdown(mut self) -> thread::Result<()> {
        self.stop.trigger();
        match self.thread.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        self.stop.trigger();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                error!(target: "runway.controller", "controller thread panicked");
            }
        }
    }
}

#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    fn trigger(&self) {
        *self.stopped.lock() = true;
        self.cv.notify_all();
    }

    /// Sleeps up to `timeout`; returns true once stopped.
    fn wait(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            self.cv.wait_for(&mut stopped, timeout);
        }
        *stopped
    }
}
