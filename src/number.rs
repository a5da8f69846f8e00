// src/number.rs

//! Numeric bound shared by every controller and angle routine.
//!
//! The autopilot is generic over its scalar type in the same way the
//! underlying `piddiy` controllers are, but heading math needs
//! trigonometry, so the bound also pulls in `num_traits::Float`.

use core::fmt::Debug;
use num_traits::{Float, NumCast};
use piddiy::Number as PiddiyNumber;

/// Custom trait to encapsulate base number requirements.
pub trait Number: PiddiyNumber + Float + Debug {}

impl<T: PiddiyNumber + Float + Debug> Number for T {}

/// Clamps generic PartialOrd values within a given range.
pub fn clamp<T: Number>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if max < value {
        max
    } else {
        value
    }
}

/// Converts an `f64` literal into `T`.
///
/// Every `Float` type can represent an `f64` approximately, so the cast only
/// yields NaN for types that cannot, which `Number` excludes in practice.
pub fn constant<T: Number>(value: f64) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}

/// Lossy conversion back to `f64`, used for error payloads and logging.
pub fn to_f64<T: Number>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
