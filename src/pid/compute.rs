// src/pid/compute.rs

//! # Loop PID Compute Module
//!
//! This module provides the compute callback and control data structure
//! shared by every loop of the autopilot. The callback produces the error,
//! the clamped integral accumulator, and the derivative for one tick;
//! `piddiy` weights them with the loop gains and stores the error and
//! integral for the next tick.

use crate::number::{clamp, Number};
use piddiy::PidController;

/// Control data for the loop PID compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopControlData<T> {
    /// The measured process value.
    pub measurement: T,
    /// The time delta since the last computation.
    pub dt: T,
    /// The lower bound of the integral accumulator.
    pub integral_low: T,
    /// The upper bound of the integral accumulator.
    pub integral_high: T,
    /// Suppresses the derivative term, used on the first tick after a mode change.
    pub skip_derivative: bool,
}

/// Loop PID compute callback.
///
/// A non-positive `dt` yields a zero derivative instead of a division by zero.
pub fn compute_loop<T: Number>(
    pid: &mut PidController<T, LoopControlData<T>>,
    data: LoopControlData<T>,
) -> (T, T, T) {
    let error = pid.set_point - data.measurement;
    let integral = clamp(
        pid.integral + error * data.dt,
        data.integral_low,
        data.integral_high,
    );
    let derivative = if data.skip_derivative || data.dt <= T::zero() {
        T::zero()
    } else {
        (error - pid.error) / data.dt
    };

    (error, integral, derivative)
}
