// src/gains.rs

//! # Loop Tuning Configuration
//!
//! Per-loop gain records and the eight-loop preset handed over by the
//! external preset-storage collaborator. Records are plain data with
//! `serde` support so the host may persist them in any format it likes.

use crate::error::{AutopilotError, GainFault};
use crate::number::{constant, Number};
use serde::{Deserialize, Serialize};

/// Named role of a controller in the cascade network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Heading error to target bank angle.
    Heading,
    /// Bank angle to yaw damper setpoint.
    BankToYaw,
    /// Bank angle to roll actuator.
    Aileron,
    /// Yaw to yaw actuator.
    Rudder,
    /// Altitude error to target vertical speed.
    Altitude,
    /// Vertical speed error to target angle of attack.
    VerticalSpeed,
    /// Angle of attack to pitch actuator.
    Elevator,
    /// Airspeed to throttle actuator.
    Throttle,
}

impl Role {
    /// Every role, in cascade order.
    pub const ALL: [Role; 8] = [
        Role::Heading,
        Role::BankToYaw,
        Role::Aileron,
        Role::Rudder,
        Role::Altitude,
        Role::VerticalSpeed,
        Role::Elevator,
        Role::Throttle,
    ];
}

/// Individually settable field of a [`LoopGains`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainField {
    /// Proportional gain.
    P,
    /// Integral gain.
    I,
    /// Derivative gain.
    D,
    /// Lower bound of the integral accumulator.
    IntegralLow,
    /// Upper bound of the integral accumulator.
    IntegralHigh,
    /// Lower bound of the output.
    OutMin,
    /// Upper bound of the output.
    OutMax,
    /// Post-sum output multiplier.
    Scalar,
    /// Heading transition easing rate.
    Easing,
}

/// Tuning for a single loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopGains<T> {
    /// Proportional gain.
    pub p: T,
    /// Integral gain.
    pub i: T,
    /// Derivative gain.
    pub d: T,
    /// Lower anti-windup bound on the accumulated integral.
    pub integral_low: T,
    /// Upper anti-windup bound on the accumulated integral.
    pub integral_high: T,
    /// Lower bound of the final output.
    pub out_min: T,
    /// Upper bound of the final output.
    pub out_max: T,
    /// Multiplier applied to the P+I+D sum before clamping.
    pub scalar: T,
    /// Rate at which a heading transition ramps its step size.
    pub easing: T,
}

impl<T: Number> LoopGains<T> {
    /// Builds a record from the storage tuple
    /// `(p, i, d, integral_low, integral_high, out_min, out_max, scalar, easing)`.
    pub fn from_tuple(values: (T, T, T, T, T, T, T, T, T)) -> Self {
        let (p, i, d, integral_low, integral_high, out_min, out_max, scalar, easing) = values;
        LoopGains {
            p,
            i,
            d,
            integral_low,
            integral_high,
            out_min,
            out_max,
            scalar,
            easing,
        }
    }

    /// Returns the record in storage tuple order.
    pub fn to_tuple(&self) -> (T, T, T, T, T, T, T, T, T) {
        (
            self.p,
            self.i,
            self.d,
            self.integral_low,
            self.integral_high,
            self.out_min,
            self.out_max,
            self.scalar,
            self.easing,
        )
    }

    /// Returns a copy with `field` replaced by `value`.
    pub fn with_field(mut self, field: GainField, value: T) -> Self {
        match field {
            GainField::P => self.p = value,
            GainField::I => self.i = value,
            GainField::D => self.d = value,
            GainField::IntegralLow => self.integral_low = value,
            GainField::IntegralHigh => self.integral_high = value,
            GainField::OutMin => self.out_min = value,
            GainField::OutMax => self.out_max = value,
            GainField::Scalar => self.scalar = value,
            GainField::Easing => self.easing = value,
        }
        self
    }

    /// Checks clamp ordering and finiteness.
    pub fn validate(&self) -> Result<(), GainFault> {
        let (p, i, d, il, ih, omin, omax, s, e) = self.to_tuple();
        if [p, i, d, il, ih, omin, omax, s, e]
            .iter()
            .any(|value| !value.is_finite())
        {
            return Err(GainFault::NonFinite);
        }
        if omax < omin {
            return Err(GainFault::OutputClampInverted);
        }
        if ih < il {
            return Err(GainFault::IntegralClampInverted);
        }
        Ok(())
    }

    /// Stock tuning for `role`.
    ///
    /// Integral bounds are in accumulator units, so `i * integral_high` is
    /// the most the integral term alone can command. Inner loops get enough
    /// room for engagement to seed any ordinary actuator position.
    pub fn stock(role: Role) -> Self {
        let values: [f64; 9] = match role {
            Role::Heading => [2.0, 0.1, 0.0, -5.0, 5.0, -30.0, 30.0, 1.0, 1.0],
            Role::BankToYaw => [0.0, 0.0, 0.01, -0.5, 0.5, -2.0, 2.0, -1.0, 1.0],
            Role::Aileron => [0.02, 0.005, 0.01, -80.0, 80.0, -1.0, 1.0, 1.0, 1.0],
            Role::Rudder => [0.1, 0.08, 0.05, -5.0, 5.0, -1.0, 1.0, 1.0, 1.0],
            Role::Altitude => [0.15, 0.01, 0.0, -1.0, 1.0, -50.0, 50.0, -1.0, 100.0],
            Role::VerticalSpeed => [2.0, 0.8, 2.0, -6.25, 6.25, -10.0, 10.0, -1.0, 10.0],
            Role::Elevator => [0.05, 0.01, 0.1, -40.0, 40.0, -1.0, 1.0, -1.0, 1.0],
            Role::Throttle => [0.2, 0.08, 0.1, -5.0, 12.5, -1.0, 0.0, -1.0, 1.0],
        };
        let [p, i, d, il, ih, omin, omax, s, e] = values.map(constant::<T>);
        LoopGains::from_tuple((p, i, d, il, ih, omin, omax, s, e))
    }
}

/// Tuning for every loop of the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutopilotPreset<T> {
    /// Heading to bank.
    pub heading: LoopGains<T>,
    /// Bank to yaw damper.
    pub bank_to_yaw: LoopGains<T>,
    /// Bank to roll actuator.
    pub aileron: LoopGains<T>,
    /// Yaw to yaw actuator.
    pub rudder: LoopGains<T>,
    /// Altitude to vertical speed.
    pub altitude: LoopGains<T>,
    /// Vertical speed to angle of attack.
    pub vertical_speed: LoopGains<T>,
    /// Angle of attack to pitch actuator.
    pub elevator: LoopGains<T>,
    /// Airspeed to throttle actuator.
    pub throttle: LoopGains<T>,
}

impl<T: Number> AutopilotPreset<T> {
    /// Returns the record for `role`.
    pub fn get(&self, role: Role) -> &LoopGains<T> {
        match role {
            Role::Heading => &self.heading,
            Role::BankToYaw => &self.bank_to_yaw,
            Role::Aileron => &self.aileron,
            Role::Rudder => &self.rudder,
            Role::Altitude => &self.altitude,
            Role::VerticalSpeed => &self.vertical_speed,
            Role::Elevator => &self.elevator,
            Role::Throttle => &self.throttle,
        }
    }

    /// Returns a mutable reference to the record for `role`.
    pub fn get_mut(&mut self, role: Role) -> &mut LoopGains<T> {
        match role {
            Role::Heading => &mut self.heading,
            Role::BankToYaw => &mut self.bank_to_yaw,
            Role::Aileron => &mut self.aileron,
            Role::Rudder => &mut self.rudder,
            Role::Altitude => &mut self.altitude,
            Role::VerticalSpeed => &mut self.vertical_speed,
            Role::Elevator => &mut self.elevator,
            Role::Throttle => &mut self.throttle,
        }
    }

    /// Validates every record, reporting the first faulty role.
    pub fn validate(&self) -> Result<(), AutopilotError> {
        for role in Role::ALL {
            self.get(role)
                .validate()
                .map_err(|reason| AutopilotError::InvalidGainConfiguration { role, reason })?;
        }
        Ok(())
    }
}

impl<T: Number> Default for AutopilotPreset<T> {
    fn default() -> Self {
        AutopilotPreset {
            heading: LoopGains::stock(Role::Heading),
            bank_to_yaw: LoopGains::stock(Role::BankToYaw),
            aileron: LoopGains::stock(Role::Aileron),
            rudder: LoopGains::stock(Role::Rudder),
            altitude: LoopGains::stock(Role::Altitude),
            vertical_speed: LoopGains::stock(Role::VerticalSpeed),
            elevator: LoopGains::stock(Role::Elevator),
            throttle: LoopGains::stock(Role::Throttle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The storage tuple keeps integral bounds ahead of output bounds.
    #[test]
    fn test_gains_tuple_order() {
        let gains = LoopGains::from_tuple((1.0, 2.0, 3.0, -4.0, 4.0, -5.0, 5.0, 6.0, 7.0));
        assert_eq!(gains.integral_low, -4.0);
        assert_eq!(gains.integral_high, 4.0);
        assert_eq!(gains.out_min, -5.0);
        assert_eq!(gains.out_max, 5.0);
        assert_eq!(gains.scalar, 6.0);
        assert_eq!(gains.easing, 7.0);
        assert_eq!(gains.to_tuple(), (1.0, 2.0, 3.0, -4.0, 4.0, -5.0, 5.0, 6.0, 7.0));
    }

    /// Stock tuning passes validation for every role.
    #[test]
    fn test_gains_stock_is_valid() {
        let preset = AutopilotPreset::<f64>::default();
        assert_eq!(preset.validate(), Ok(()));
        assert_eq!(preset.throttle.out_max, 0.0);
        assert_eq!(preset.heading.out_max, 30.0);
    }

    /// The integral term alone can hold the actuator positions a pilot
    /// ordinarily flies with.
    #[test]
    fn test_gains_stock_integral_authority() {
        for (role, needed) in [
            (Role::Aileron, 0.4),
            (Role::Rudder, 0.4),
            (Role::Elevator, 0.4),
            (Role::Throttle, 1.0),
        ] {
            let gains = LoopGains::<f64>::stock(role);
            let authority = (gains.scalar * gains.i * gains.integral_low)
                .abs()
                .max((gains.scalar * gains.i * gains.integral_high).abs());
            assert!(
                authority >= needed - 1e-9,
                "{:?} integral can only command {}.",
                role,
                authority
            );
        }
    }

    /// Inverted clamps and non-finite values are rejected.
    #[test]
    fn test_gains_validation_faults() {
        let gains = LoopGains::<f64>::stock(Role::Aileron);
        assert_eq!(
            gains.with_field(GainField::OutMin, 2.0).validate(),
            Err(GainFault::OutputClampInverted)
        );
        assert_eq!(
            gains.with_field(GainField::IntegralHigh, -100.0).validate(),
            Err(GainFault::IntegralClampInverted)
        );
        assert_eq!(
            gains.with_field(GainField::D, f64::NAN).validate(),
            Err(GainFault::NonFinite)
        );
        assert_eq!(
            gains.with_field(GainField::Scalar, f64::INFINITY).validate(),
            Err(GainFault::NonFinite)
        );
    }

    /// Preset validation names the faulty role.
    #[test]
    fn test_gains_preset_reports_role() {
        let mut preset = AutopilotPreset::<f64>::default();
        preset.get_mut(Role::Elevator).out_min = 5.0;
        assert_eq!(
            preset.validate(),
            Err(AutopilotError::InvalidGainConfiguration {
                role: Role::Elevator,
                reason: GainFault::OutputClampInverted,
            })
        );
    }

    /// A preset written by the host as JSON loads into the record layout.
    #[test]
    fn test_gains_preset_from_json() {
        let mut preset = AutopilotPreset::<f64>::default();
        preset.heading.p = 3.5;
        let text = serde_json::to_string(&preset).expect("serialize");
        assert!(text.contains("\"bank_to_yaw\""));

        let loaded: AutopilotPreset<f64> = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(loaded.heading.p, 3.5);
        assert_eq!(loaded, preset);
    }
}
