// src/stabilizer/flight_stabilizer.rs

//! A module specifying the shared interface for tick-driven autopilots.
//! It includes a structure for the non-gain runtime settings and a trait
//! defining the per-tick control functionality.

use crate::number::{constant, Number};
use crate::telemetry::{ActuatorCommand, Telemetry};

/// Runtime settings that are not loop gains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutopilotSettings<T> {
    /// Seconds a heading nudge waits for further nudges before it is committed.
    pub commit_delay: T,
    /// Airspeed below which no command is emitted.
    pub min_control_speed: T,
}

impl<T: Number> AutopilotSettings<T> {
    /// Creates settings that commit nudges on the next tick and stop
    /// commanding below 1 m/s.
    ///
    /// Example Usage
    /// ```
    /// use autopilot_cascade::{Autopilot, AutopilotSettings};
    ///
    /// let mut settings = AutopilotSettings::<f64>::new();
    ///
    /// // Let keyboard nudges pile up for a quarter second before committing.
    /// settings.commit_delay = 0.25;
    ///
    /// let autopilot = Autopilot::with_settings(settings);
    /// assert_eq!(autopilot.settings().commit_delay, 0.25);
    /// ```
    pub fn new() -> Self {
        Self {
            commit_delay: T::zero(),
            min_control_speed: constant(1.0),
        }
    }
}

impl<T: Number> Default for AutopilotSettings<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A trait for autopilots driven once per fixed simulation step.
pub trait FlightStabilizer<T: Number> {
    /// Takes the sampled vehicle state and the step length, then computes the
    /// actuator commands for this tick.
    ///
    /// - `telemetry`: Vehicle state read by the host before the tick.
    /// - `dt`: Fixed step length in seconds.
    ///
    /// Returns the commands for every engaged axis; disengaged axes are `None`.
    fn control(&mut self, telemetry: &Telemetry<T>, dt: T) -> ActuatorCommand<T>;
}
