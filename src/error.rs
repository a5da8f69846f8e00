// src/error.rs

//! Error values surfaced to the caller of the autopilot.
//!
//! Nothing in this crate is fatal. A rejected operation leaves the autopilot
//! holding its last good state and reports why through [`AutopilotError`].

use crate::gains::Role;
use thiserror::Error;

/// Reason a gain record was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainFault {
    /// `out_min` is greater than `out_max`.
    #[error("output clamp minimum exceeds maximum")]
    OutputClampInverted,
    /// `integral_low` is greater than `integral_high`.
    #[error("integral clamp lower bound exceeds upper bound")]
    IntegralClampInverted,
    /// A gain, bound, scalar, or easing rate is NaN or infinite.
    #[error("non-finite value")]
    NonFinite,
}

/// Autopilot errors.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AutopilotError {
    /// A gain record failed validation; the previous tuning is retained.
    #[error("invalid gain configuration for {role:?} loop: {reason}")]
    InvalidGainConfiguration {
        /// Loop the record was meant for.
        role: Role,
        /// What was wrong with it.
        reason: GainFault,
    },

    /// A heading commit outside `[0, 360)`.
    #[error("heading {heading} outside [0, 360)")]
    HeadingOutOfRange {
        /// The rejected heading in degrees.
        heading: f64,
    },

    /// A non-finite altitude, vertical speed, or airspeed target.
    #[error("target {target} is not a finite number")]
    InvalidTarget {
        /// The rejected target.
        target: f64,
    },
}
