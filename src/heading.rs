// src/heading.rs

//! # Heading Target Transition
//!
//! Moves the heading setpoint from where it is to a newly committed heading
//! instead of stepping it there. The transition is a plain state object
//! advanced once per fixed simulation step by [`HeadingTransition::tick`];
//! each call is synchronous and bounded.
//!
//! The step size starts at zero and grows by `easing * dt * 0.01` degrees
//! every tick, so the setpoint accelerates away from the old heading and is
//! then capped by the remaining distance, which prevents overshoot. The
//! transition ends once the current and target vectors are within
//! [`ARRIVAL_TOLERANCE`] degrees of each other.
//!
//! With a zero easing rate the step size never grows and the transition
//! runs until it is canceled.

use crate::angle::{resolve_relative, wrap_heading, HeadingVector};
use crate::number::{constant, Number};
use log::trace;
use num_traits::Float;

/// Angle in degrees under which the transition counts as arrived.
pub const ARRIVAL_TOLERANCE: f64 = 0.01;

/// Multiplier turning `easing * dt` into a per-tick step growth in degrees.
pub const EASING_SCALE: f64 = 0.01;

/// Remaining rotation, in degrees, treated as exactly half a turn.
pub const ANTIPARALLEL_TOLERANCE: f64 = 1e-4;

/// Lifecycle of a heading transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition in progress.
    Idle,
    /// Stepping toward the target.
    Running,
    /// Cancel requested, observed on the next tick.
    Canceling,
}

/// Outcome of one transition tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionStep<T> {
    /// Nothing is running; the heading setpoint is untouched.
    Idle,
    /// Still moving; the heading setpoint is now this value.
    Moving(T),
    /// Reached the target; the heading setpoint snaps to this value.
    Arrived(T),
    /// Stopped on request; the last intermediate heading stays in force.
    Canceled(T),
}

/// Cancelable smoothing of the heading setpoint.
#[derive(Debug, Clone, Copy)]
pub struct HeadingTransition<T> {
    current_target: HeadingVector<T>,
    new_target: HeadingVector<T>,
    increment: T,
    state: TransitionState,
}

impl<T: Number> HeadingTransition<T> {
    /// An idle transition.
    pub fn new() -> Self {
        let north = HeadingVector::from_heading(T::zero());
        HeadingTransition {
            current_target: north,
            new_target: north,
            increment: T::zero(),
            state: TransitionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Whether a transition is in progress, a pending cancel included.
    pub fn is_running(&self) -> bool {
        self.state != TransitionState::Idle
    }

    /// Heading the setpoint is currently aimed at.
    pub fn current_heading(&self) -> T {
        self.current_target.heading()
    }

    /// Heading the transition is moving to.
    pub fn target_heading(&self) -> T {
        self.new_target.heading()
    }

    /// Step size used on the last tick, in degrees.
    pub fn increment(&self) -> T {
        self.increment
    }

    /// Starts moving from `from` to `to`.
    ///
    /// If a transition is already running, it is redirected to `to` instead:
    /// the current position and step size are kept so the motion carries on
    /// without a restart or visible reversal.
    pub fn begin(&mut self, from: T, to: T) {
        self.new_target = HeadingVector::from_heading(to);
        if self.state == TransitionState::Running {
            trace!("heading transition redirected to {:?}", to);
            return;
        }
        self.current_target = HeadingVector::from_heading(from);
        self.increment = T::zero();
        self.state = TransitionState::Running;
        trace!("heading transition from {:?} to {:?}", from, to);
    }

    /// Shifts the target of a running transition by `delta` degrees.
    ///
    /// Returns `false` and does nothing when no transition is running.
    pub fn redirect_by(&mut self, delta: T) -> bool {
        if self.state != TransitionState::Running {
            return false;
        }
        let target = self.new_target.heading() + delta;
        self.new_target = HeadingVector::from_heading(target);
        trace!("heading transition redirected by {:?}", delta);
        true
    }

    /// Requests a stop. Honored on the next tick; a no-op when idle.
    pub fn cancel(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Canceling;
        }
    }

    /// Drops any transition at once without reporting a final heading.
    pub fn clear(&mut self) {
        self.state = TransitionState::Idle;
        self.increment = T::zero();
    }

    /// Advances the transition by one fixed step of `dt` seconds using the
    /// heading loop's `easing` rate.
    pub fn tick(&mut self, dt: T, easing: T) -> TransitionStep<T> {
        match self.state {
            TransitionState::Idle => return TransitionStep::Idle,
            TransitionState::Canceling => {
                self.state = TransitionState::Idle;
                let heading = self.current_target.heading();
                trace!("heading transition canceled at {:?}", heading);
                return TransitionStep::Canceled(heading);
            }
            TransitionState::Running => {}
        }

        if self.arrived() {
            return self.finish();
        }

        self.increment = self.increment + easing * dt * constant(EASING_SCALE);

        let final_heading = self.new_target.heading();
        let heading = self.current_target.heading();
        let mut remainder = final_heading - resolve_relative(heading, final_heading);
        let half = constant::<T>(180.0);
        if Float::abs(Float::abs(remainder) - half) <= constant(ANTIPARALLEL_TOLERANCE) {
            // No shorter way round; always turn clockwise.
            remainder = Float::abs(remainder);
        }

        let step = if remainder < T::zero() {
            Float::max(-self.increment, remainder)
        } else {
            Float::min(self.increment, remainder)
        };
        let heading = wrap_heading(heading + step);
        self.current_target = HeadingVector::from_heading(heading);

        if self.arrived() {
            self.finish()
        } else {
            TransitionStep::Moving(heading)
        }
    }

    fn arrived(&self) -> bool {
        self.current_target.angle_to(&self.new_target) <= constant(ARRIVAL_TOLERANCE)
    }

    fn finish(&mut self) -> TransitionStep<T> {
        self.current_target = self.new_target;
        self.state = TransitionState::Idle;
        let heading = self.new_target.heading();
        trace!("heading transition arrived at {:?}", heading);
        TransitionStep::Arrived(heading)
    }
}

impl<T: Number> Default for HeadingTransition<T> {
    fn default() -> Self {
        Self::new()
    }
}
