// src/pid/controller.rs

//! # Single-Loop Controller
//!
//! A [`Controller`] wraps a `piddiy::PidController` running
//! [`compute_loop`] and adds the pieces `piddiy` leaves to the caller:
//! the post-sum scalar, the output clamp, the input clamp, one-shot
//! derivative suppression, and bumpless engagement.

use crate::gains::LoopGains;
use crate::number::{clamp, Number};
use crate::pid::{compute_loop, LoopControlData};
use log::trace;
use piddiy::PidController;

/// One PID loop with clamped output and integral.
pub struct Controller<T: Number> {
    pid: PidController<T, LoopControlData<T>>,
    gains: LoopGains<T>,
    input_limits: Option<(T, T)>,
    bumpless_setpoint: T,
    skip_derivative_once: bool,
}

impl<T: Number> Controller<T> {
    /// Creates a controller from a gain record.
    ///
    /// The record is taken as is; validation happens where records enter the
    /// autopilot (see [`LoopGains::validate`]).
    pub fn with_gains(gains: LoopGains<T>) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_loop)
            .set_point(T::zero())
            .kp(gains.p)
            .ki(gains.i)
            .kd(gains.d);
        pid.integral = T::zero();
        pid.error = T::zero();

        Controller {
            pid,
            gains,
            input_limits: None,
            bumpless_setpoint: T::zero(),
            skip_derivative_once: false,
        }
    }

    /// Replaces the tuning. The setpoint and integral survive, but the
    /// integral is re-clamped to the new bounds.
    pub fn set_gains(&mut self, gains: LoopGains<T>) {
        self.pid.kp(gains.p).ki(gains.i).kd(gains.d);
        self.pid.integral = clamp(self.pid.integral, gains.integral_low, gains.integral_high);
        self.gains = gains;
    }

    /// Current tuning.
    pub fn gains(&self) -> &LoopGains<T> {
        &self.gains
    }

    /// Clamp applied to the measured input before the error is computed.
    pub fn set_input_limits(&mut self, min: T, max: T) {
        self.input_limits = Some((min, max));
    }

    /// Current setpoint.
    pub fn setpoint(&self) -> T {
        self.pid.set_point
    }

    /// Sets the setpoint. Takes effect on the next [`update`](Self::update).
    pub fn set_setpoint(&mut self, set_point: T) {
        self.pid.set_point = set_point;
    }

    /// Process value recorded by the last [`stage_setpoint`](Self::stage_setpoint).
    pub fn bumpless_setpoint(&self) -> T {
        self.bumpless_setpoint
    }

    /// Accumulated integral.
    pub fn integral(&self) -> T {
        self.pid.integral
    }

    /// Error seen on the last update.
    pub fn last_error(&self) -> T {
        self.pid.error
    }

    /// Whether the next update will drop its derivative term.
    pub fn skips_derivative(&self) -> bool {
        self.skip_derivative_once
    }

    /// Drops the derivative term on the next update only.
    pub fn skip_derivative(&mut self) {
        self.skip_derivative_once = true;
    }

    /// Runs one tick of the loop against `measured_input` and returns the
    /// clamped output.
    pub fn update(&mut self, measured_input: T, dt: T) -> T {
        let measurement = match self.input_limits {
            Some((min, max)) => clamp(measured_input, min, max),
            None => measured_input,
        };
        if dt <= T::zero() {
            trace!("degenerate timestep {:?}, derivative suppressed", dt);
        }

        let data = LoopControlData {
            measurement,
            dt,
            integral_low: self.gains.integral_low,
            integral_high: self.gains.integral_high,
            skip_derivative: self.skip_derivative_once,
        };
        self.skip_derivative_once = false;

        let raw = self.gains.scalar * self.pid.compute(data);
        clamp(raw, self.gains.out_min, self.gains.out_max)
    }

    /// Clears the integral and the remembered error. Called on disengage.
    pub fn reset(&mut self) {
        self.pid.integral = T::zero();
        self.pid.error = T::zero();
    }

    /// Seeds the integral so that, with zero error, the next update returns
    /// `value`.
    ///
    /// The seed respects the anti-windup bounds, so a `value` beyond what
    /// `scalar * i * integral_high` can express is only approached. The next
    /// update also skips its derivative term.
    pub fn preset(&mut self, value: T) {
        let weight = self.gains.scalar * self.gains.i;
        let seed = if weight == T::zero() {
            T::zero()
        } else {
            value / weight
        };
        self.pid.integral = clamp(seed, self.gains.integral_low, self.gains.integral_high);
        self.pid.error = T::zero();
        self.skip_derivative_once = true;
    }

    /// Seeds the setpoint so the proportional term alone reproduces `value`
    /// while the process sits at `measured`, and returns it.
    ///
    /// Used for loops whose setpoint belongs to the operator rather than to
    /// an outer loop. `value` is first clamped to the output range, so the
    /// staged setpoint never asks for more than the loop can command. With a
    /// zero proportional weight the setpoint is `measured`. `measured` is
    /// kept as the bumpless setpoint: where the process was at engagement.
    pub fn stage_setpoint(&mut self, measured: T, value: T) -> T {
        let weight = self.gains.scalar * self.gains.p;
        let staged = if weight == T::zero() {
            measured
        } else {
            measured + clamp(value, self.gains.out_min, self.gains.out_max) / weight
        };
        self.reset();
        self.pid.set_point = staged;
        self.bumpless_setpoint = measured;
        self.skip_derivative_once = true;
        staged
    }
}
