// src/angle.rs

//! # Compass Angle Arithmetic
//!
//! Headings are degrees clockwise from north in `[0, 360)`. Two tools keep
//! the 0/360 seam out of the control loops:
//!
//! - [`resolve_relative`] unwraps the measured heading so that an ordinary
//!   subtraction against the target gives the short-way error.
//! - [`HeadingVector`] holds a heading as a unit vector in the local
//!   north/east plane, so interpolation and convergence checks never see
//!   the seam at all.

use crate::number::{constant, Number};
use num_traits::Float;

/// Returns `current`, shifted by a full turn when that brings it within
/// 180 degrees of `target`.
///
/// `target - resolve_relative(current, target)` is then the short-way error.
/// A difference of exactly ±180 is left alone.
pub fn resolve_relative<T: Number>(current: T, target: T) -> T {
    let half = constant::<T>(180.0);
    let full = constant::<T>(360.0);
    let difference = target - current;
    if difference < -half {
        current - full
    } else if difference > half {
        current + full
    } else {
        current
    }
}

/// Wraps any angle into `[0, 360)`.
pub fn wrap_heading<T: Number>(heading: T) -> T {
    let full = constant::<T>(360.0);
    let wrapped = heading % full;
    let wrapped = if wrapped < T::zero() {
        wrapped + full
    } else {
        wrapped
    };
    // -1e-20 % 360 + 360 rounds to exactly 360
    if wrapped >= full {
        T::zero()
    } else {
        wrapped
    }
}

/// Wraps any angle difference into `[-180, 180]`.
pub fn wrap_delta<T: Number>(delta: T) -> T {
    let half = constant::<T>(180.0);
    let full = constant::<T>(360.0);
    let wrapped = wrap_heading(delta);
    if wrapped > half {
        wrapped - full
    } else {
        wrapped
    }
}

/// A heading as a unit vector in the local horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingVector<T> {
    /// Component toward north.
    pub north: T,
    /// Component toward east.
    pub east: T,
}

impl<T: Number> HeadingVector<T> {
    /// Unit vector pointing along `heading` degrees.
    pub fn from_heading(heading: T) -> Self {
        let radians = heading.to_radians();
        HeadingVector {
            north: radians.cos(),
            east: radians.sin(),
        }
    }

    /// Compass heading of the vector in `[0, 360)`.
    ///
    /// The unsigned angle to north comes from the dot product and its sign
    /// from the cross product; west of north maps past 180.
    pub fn heading(&self) -> T {
        let north = HeadingVector {
            north: T::one(),
            east: T::zero(),
        };
        let angle = north.angle_to(self);
        let signed = if north.cross(self) < T::zero() {
            -angle
        } else {
            angle
        };
        wrap_heading(signed)
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> T {
        self.north * other.north + self.east * other.east
    }

    /// Z component of the cross product; positive when `other` lies
    /// clockwise of `self`.
    pub fn cross(&self, other: &Self) -> T {
        self.north * other.east - self.east * other.north
    }

    /// Unsigned angle between the vectors in degrees, `[0, 180]`.
    pub fn angle_to(&self, other: &Self) -> T {
        Float::abs(self.cross(other)).atan2(self.dot(other)).to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Crossing north from the west unwraps the current heading upward.
    #[test]
    fn test_angle_resolve_relative_crossing_north_clockwise() {
        let resolved = resolve_relative(10.0, 350.0);
        assert!(value_close(370.0, resolved));
        assert!(value_close(-20.0, 350.0 - resolved), "Turn left 20.");
    }

    /// Crossing north from the east unwraps the current heading downward.
    #[test]
    fn test_angle_resolve_relative_crossing_north_counterclockwise() {
        let resolved = resolve_relative(350.0, 10.0);
        assert!(value_close(-10.0, resolved));
        assert!(value_close(20.0, 10.0 - resolved), "Turn right 20.");
    }

    /// Both crossings give the same magnitude in opposite directions.
    #[test]
    fn test_angle_resolve_relative_symmetry() {
        for (a, b) in [(350.0, 10.0), (5.0, 300.0), (181.0, 0.5), (90.0, 100.0)] {
            let forward = b - resolve_relative(a, b);
            let backward = a - resolve_relative(b, a);
            assert!(value_close(forward, -backward));
            assert!(forward.abs() <= 180.0);
        }
    }

    /// Exactly half a turn is not unwrapped.
    #[test]
    fn test_angle_resolve_relative_half_turn() {
        assert!(value_close(0.0, resolve_relative(0.0, 180.0)));
        assert!(value_close(180.0, resolve_relative(180.0, 0.0)));
        assert!(value_close(90.0, resolve_relative(90.0, 45.0)));
    }

    /// Wrapping lands in [0, 360) and [-180, 180].
    #[test]
    fn test_angle_wrap() {
        assert!(value_close(10.0, wrap_heading(370.0)));
        assert!(value_close(350.0, wrap_heading(-10.0)));
        assert!(value_close(0.0, wrap_heading(360.0)));
        assert!(value_close(0.0, wrap_heading(-720.0)));
        assert!(value_close(-170.0, wrap_delta(190.0)));
        assert!(value_close(170.0, wrap_delta(-190.0)));
        assert!(value_close(180.0, wrap_delta(180.0)));
    }

    /// Headings survive the trip through the vector form, including the seam.
    #[test]
    fn test_angle_heading_vector_recovers_heading() {
        for heading in [0.0, 0.005, 45.0, 90.0, 179.99, 180.0, 270.0, 359.995] {
            let vector = HeadingVector::from_heading(heading);
            assert!(
                value_within(heading, vector.heading(), 1e-9),
                "Heading {} should be recovered.",
                heading
            );
        }
    }

    /// The angle between vectors takes the short way across north.
    #[test]
    fn test_angle_heading_vector_angle_across_north() {
        let a = HeadingVector::from_heading(350.0);
        let b = HeadingVector::from_heading(10.0);
        assert!(value_close(20.0, a.angle_to(&b)));
        assert!(a.cross(&b) > 0.0, "10 lies clockwise of 350.");

        let tiny = HeadingVector::from_heading(90.005);
        let right = HeadingVector::from_heading(90.0);
        assert!(value_within(0.005, right.angle_to(&tiny), 1e-9));
    }
}
