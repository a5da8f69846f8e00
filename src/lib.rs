// src/lib.rs

//! # Cascade Autopilot Core
//!
//! A `no_std`, no-alloc autopilot built from eight PID loops in three
//! cascades: heading to bank to roll (with a bank-to-yaw damper on the
//! rudder), altitude to vertical speed to angle of attack to pitch, and
//! airspeed to throttle. Heading changes are eased in by a cancelable
//! transition rather than stepped.
//!
//! The host samples the vehicle into a [`Telemetry`] once per fixed step,
//! calls [`Autopilot::tick`], and applies the returned [`ActuatorCommand`].
//!
//! ```
//! use autopilot_cascade::{Autopilot, Telemetry};
//!
//! let mut autopilot = Autopilot::<f64>::new();
//! autopilot.set_heading_hold(true);
//!
//! let telemetry = Telemetry {
//!     heading: 90.0,
//!     airspeed: 80.0,
//!     ..Telemetry::default()
//! };
//! let _ = autopilot.tick(&telemetry, 0.02);
//! autopilot.commit_heading(120.0).unwrap();
//!
//! let command = autopilot.tick(&telemetry, 0.02);
//! assert!(command.roll.unwrap() > 0.0);
//! assert!(command.pitch.is_none());
//! ```

#![no_std]
#![deny(missing_docs)]

pub mod angle;
pub mod error;
pub mod gains;
pub mod heading;
pub mod number;
pub mod pid;
pub mod stabilizer;
pub mod telemetry;

#[doc(inline)]
pub use error::{AutopilotError, GainFault};
#[doc(inline)]
pub use gains::{AutopilotPreset, GainField, LoopGains, Role};
#[doc(inline)]
pub use heading::{HeadingTransition, TransitionState, TransitionStep};
#[doc(inline)]
pub use number::Number;
#[doc(inline)]
pub use stabilizer::*;
#[doc(inline)]
pub use telemetry::{ActuatorCommand, ControlState, Telemetry};

#[cfg(test)]
mod test_utils;
