// src/telemetry.rs

//! Boundary types exchanged with the host once per control tick.

use crate::number::{clamp, Number};

/// Actuator positions as currently applied to the vehicle, whoever set them.
///
/// Read on engagement so a loop can pick up where manual control left off.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlState<T> {
    /// Roll actuator, `[-1, 1]`.
    pub roll: T,
    /// Pitch actuator, `[-1, 1]`.
    pub pitch: T,
    /// Yaw actuator, `[-1, 1]`.
    pub yaw: T,
    /// Throttle, `[0, 1]`.
    pub throttle: T,
}

/// Vehicle state sampled by the host before each tick.
///
/// Angles are in degrees, altitude in meters, speeds in meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Telemetry<T> {
    /// Compass heading of travel, `[0, 360)`.
    pub heading: T,
    /// Bank angle, positive right wing down.
    pub bank: T,
    /// Sideslip / yaw angle.
    pub yaw: T,
    /// Angle of attack.
    pub angle_of_attack: T,
    /// Altitude above sea level.
    pub altitude: T,
    /// Vertical speed, positive up.
    pub vertical_speed: T,
    /// Airspeed.
    pub airspeed: T,
    /// Vehicle is on the ground.
    pub on_ground: bool,
    /// Actuator positions currently applied.
    pub controls: ControlState<T>,
}

/// Commands produced by one tick.
///
/// `None` leaves the axis to the host: the loop is disengaged or the tick
/// decided not to command it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand<T> {
    /// Roll command, `[-1, 1]`.
    pub roll: Option<T>,
    /// Pitch command, `[-1, 1]`.
    pub pitch: Option<T>,
    /// Yaw command, `[-1, 1]`.
    pub yaw: Option<T>,
    /// Throttle command, `[0, 1]`.
    pub throttle: Option<T>,
}

impl<T: Number> ActuatorCommand<T> {
    /// A command that leaves every axis to the host.
    pub fn none() -> Self {
        ActuatorCommand {
            roll: None,
            pitch: None,
            yaw: None,
            throttle: None,
        }
    }

    /// Applies the command over `controls`, keeping uncommanded axes.
    pub fn apply_to(&self, controls: ControlState<T>) -> ControlState<T> {
        ControlState {
            roll: self.roll.unwrap_or(controls.roll),
            pitch: self.pitch.unwrap_or(controls.pitch),
            yaw: self.yaw.unwrap_or(controls.yaw),
            throttle: self.throttle.unwrap_or(controls.throttle),
        }
    }
}

impl<T: Number> Default for ActuatorCommand<T> {
    fn default() -> Self {
        Self::none()
    }
}

/// Clamps a surface command into `[-1, 1]`.
pub fn surface<T: Number>(value: T) -> T {
    clamp(value, -T::one(), T::one())
}

/// Clamps a throttle command into `[0, 1]`.
pub fn throttle<T: Number>(value: T) -> T {
    clamp(value, T::zero(), T::one())
}
