// src/stabilizer/cascade.rs

//! # Cascade Network
//!
//! Eight named loops wired into three axes. Each axis function reads the
//! outer loop's output and hands it to the inner loop as its setpoint:
//!
//! - Heading: Heading → bank → Aileron → roll, with bank → BankToYaw →
//!   Rudder → yaw damping the turn.
//! - Vertical: Altitude → vertical speed → VerticalSpeed → angle of attack →
//!   Elevator → pitch.
//! - Speed: Throttle → throttle.
//!
//! Links marked negated in the wiring take the outer output with its sign
//! flipped. The stock tuning carries `scalar = -1` on those loops so the
//! flip restores a stabilizing sign.
//!
//! Engagement seeds each chain so its first output matches what the vehicle
//! is already doing; disengagement resets the chain.

use crate::angle::{resolve_relative, wrap_heading};
use crate::gains::{AutopilotPreset, LoopGains, Role};
use crate::number::{constant, Number};
use crate::pid::Controller;
use crate::telemetry::{surface, throttle, Telemetry};

/// One controller per loop role.
pub struct CascadeNetwork<T: Number> {
    /// Heading to bank angle.
    pub heading: Controller<T>,
    /// Bank angle to yaw setpoint.
    pub bank_to_yaw: Controller<T>,
    /// Bank angle to roll actuator.
    pub aileron: Controller<T>,
    /// Yaw angle to yaw actuator.
    pub rudder: Controller<T>,
    /// Altitude to vertical speed.
    pub altitude: Controller<T>,
    /// Vertical speed to angle of attack.
    pub vertical_speed: Controller<T>,
    /// Angle of attack to pitch actuator.
    pub elevator: Controller<T>,
    /// Airspeed to throttle actuator.
    pub throttle: Controller<T>,
}

impl<T: Number> CascadeNetwork<T> {
    /// Creates a network with the stock tuning.
    pub fn new() -> Self {
        Self::with_preset(&AutopilotPreset::default())
    }

    /// Creates a network from `preset` and applies the stock input limits.
    ///
    /// The preset is taken as is; callers validate it first.
    pub fn with_preset(preset: &AutopilotPreset<T>) -> Self {
        let loop_for = |role: Role| Controller::with_gains(*preset.get(role));
        let mut network = CascadeNetwork {
            heading: loop_for(Role::Heading),
            bank_to_yaw: loop_for(Role::BankToYaw),
            aileron: loop_for(Role::Aileron),
            rudder: loop_for(Role::Rudder),
            altitude: loop_for(Role::Altitude),
            vertical_speed: loop_for(Role::VerticalSpeed),
            elevator: loop_for(Role::Elevator),
            throttle: loop_for(Role::Throttle),
        };

        let half_turn = constant::<T>(180.0);
        network.aileron.set_input_limits(-half_turn, half_turn);
        network.altitude.set_input_limits(T::zero(), T::infinity());
        network.throttle.set_input_limits(T::zero(), T::infinity());
        network
    }

    /// Controller for `role`.
    pub fn controller(&self, role: Role) -> &Controller<T> {
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

    /// Mutable controller for `role`.
    pub fn controller_mut(&mut self, role: Role) -> &mut Controller<T> {
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

    /// Replaces the tuning of every loop. Setpoints and integrals survive.
    pub fn apply_preset(&mut self, preset: &AutopilotPreset<T>) {
        for role in Role::ALL {
            self.controller_mut(role).set_gains(*preset.get(role));
        }
    }

    /// Replaces the tuning of one loop.
    pub fn apply_gains(&mut self, role: Role, gains: LoopGains<T>) {
        self.controller_mut(role).set_gains(gains);
    }

    /// Live tuning of every loop.
    pub fn preset(&self) -> AutopilotPreset<T> {
        let gains = |role: Role| *self.controller(role).gains();
        AutopilotPreset {
            heading: gains(Role::Heading),
            bank_to_yaw: gains(Role::BankToYaw),
            aileron: gains(Role::Aileron),
            rudder: gains(Role::Rudder),
            altitude: gains(Role::Altitude),
            vertical_speed: gains(Role::VerticalSpeed),
            elevator: gains(Role::Elevator),
            throttle: gains(Role::Throttle),
        }
    }

    /// Runs the heading axis toward `heading_setpoint` and returns the
    /// `(roll, yaw)` commands.
    pub fn heading_axis(&mut self, telemetry: &Telemetry<T>, heading_setpoint: T, dt: T) -> (T, T) {
        self.heading.set_setpoint(heading_setpoint);
        let measured = resolve_relative(telemetry.heading, heading_setpoint);
        let bank = self.heading.update(measured, dt);

        self.bank_to_yaw.set_setpoint(bank);
        self.aileron.set_setpoint(bank);
        let roll = surface(self.aileron.update(telemetry.bank, dt));

        let yaw_setpoint = -self.bank_to_yaw.update(telemetry.yaw, dt);
        self.rudder.set_setpoint(yaw_setpoint);
        let yaw = surface(self.rudder.update(telemetry.yaw, dt));

        (roll, yaw)
    }

    /// Holds the wings and the yaw angle level and returns the `(roll, yaw)`
    /// commands.
    pub fn wing_leveller_axis(&mut self, telemetry: &Telemetry<T>, dt: T) -> (T, T) {
        self.aileron.set_setpoint(T::zero());
        self.rudder.set_setpoint(T::zero());
        let roll = surface(self.aileron.update(telemetry.bank, dt));
        let yaw = surface(self.rudder.update(telemetry.yaw, dt));
        (roll, yaw)
    }

    /// Runs the vertical axis and returns the pitch command.
    ///
    /// With `altitude_hold` the Altitude loop drives the vertical speed
    /// setpoint; otherwise that setpoint is the operator's.
    pub fn vertical_axis(&mut self, telemetry: &Telemetry<T>, altitude_hold: bool, dt: T) -> T {
        if altitude_hold {
            let vertical_speed = -self.altitude.update(telemetry.altitude, dt);
            self.vertical_speed.set_setpoint(vertical_speed);
        }

        let angle_of_attack = -self.vertical_speed.update(telemetry.vertical_speed, dt);
        self.elevator.set_setpoint(angle_of_attack);
        surface(-self.elevator.update(telemetry.angle_of_attack, dt))
    }

    /// Runs the speed axis and returns the throttle command.
    ///
    /// A speed setpoint of exactly zero is a cutoff and commands idle
    /// without running the loop.
    pub fn speed_axis(&mut self, telemetry: &Telemetry<T>, dt: T) -> T {
        if self.throttle.setpoint() == T::zero() {
            return T::zero();
        }
        throttle(-self.throttle.update(telemetry.airspeed, dt))
    }

    /// Seeds the heading chain from the current attitude and controls.
    ///
    /// Returns the heading setpoint, wrapped into `[0, 360)`, at which the
    /// Heading loop reproduces the current bank angle.
    pub fn engage_heading(&mut self, telemetry: &Telemetry<T>) -> T {
        let staged = self.heading.stage_setpoint(telemetry.heading, telemetry.bank);

        self.aileron.set_setpoint(telemetry.bank);
        self.aileron.preset(telemetry.controls.roll);
        self.bank_to_yaw.set_setpoint(telemetry.bank);
        self.bank_to_yaw.preset(-telemetry.yaw);
        self.rudder.set_setpoint(telemetry.yaw);
        self.rudder.preset(telemetry.controls.yaw);

        wrap_heading(staged)
    }

    /// Restarts the Heading and BankToYaw loops after the wing leveller
    /// held the inner loops.
    pub fn relock_heading(&mut self) {
        for controller in [&mut self.heading, &mut self.bank_to_yaw] {
            controller.reset();
            controller.skip_derivative();
        }
        self.aileron.skip_derivative();
        self.rudder.skip_derivative();
    }

    /// Clears the heading chain.
    pub fn disengage_heading(&mut self) {
        for controller in [
            &mut self.heading,
            &mut self.bank_to_yaw,
            &mut self.aileron,
            &mut self.rudder,
        ] {
            controller.reset();
        }
    }

    /// Seeds the vertical chain from the current flight path and pitch input.
    ///
    /// Returns the staged operator setpoint: an altitude with `altitude_hold`,
    /// a vertical speed without.
    pub fn engage_vertical(&mut self, telemetry: &Telemetry<T>, altitude_hold: bool) -> T {
        self.elevator.set_setpoint(telemetry.angle_of_attack);
        self.elevator.preset(-telemetry.controls.pitch);
        self.stage_vertical(telemetry, altitude_hold)
    }

    /// Hands the vertical speed setpoint between the Altitude loop and the
    /// operator without a step in the angle of attack setpoint.
    ///
    /// Returns the staged operator setpoint as [`engage_vertical`](Self::engage_vertical) does.
    pub fn stage_vertical(&mut self, telemetry: &Telemetry<T>, altitude_hold: bool) -> T {
        self.elevator.skip_derivative();
        if altitude_hold {
            self.vertical_speed.set_setpoint(telemetry.vertical_speed);
            self.vertical_speed.preset(-telemetry.angle_of_attack);
            self.altitude
                .stage_setpoint(telemetry.altitude, -telemetry.vertical_speed)
        } else {
            self.altitude.reset();
            self.vertical_speed
                .stage_setpoint(telemetry.vertical_speed, -telemetry.angle_of_attack)
        }
    }

    /// Clears the vertical chain.
    pub fn disengage_vertical(&mut self) {
        for controller in [
            &mut self.altitude,
            &mut self.vertical_speed,
            &mut self.elevator,
        ] {
            controller.reset();
        }
    }

    /// Holds the current airspeed at the current throttle setting.
    pub fn engage_speed(&mut self, telemetry: &Telemetry<T>) {
        self.throttle.set_setpoint(telemetry.airspeed);
        self.throttle.preset(-telemetry.controls.throttle);
    }

    /// Clears the speed loop.
    pub fn disengage_speed(&mut self) {
        self.throttle.reset();
    }
}

impl<T: Number> Default for CascadeNetwork<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::ControlState;
    use crate::test_utils::*;

    fn cruise() -> Telemetry<f64> {
        Telemetry {
            heading: 90.0,
            bank: 0.0,
            yaw: 0.0,
            angle_of_attack: 2.0,
            altitude: 1000.0,
            vertical_speed: 5.0,
            airspeed: 100.0,
            on_ground: false,
            controls: ControlState {
                roll: 0.0,
                pitch: 0.2,
                yaw: 0.0,
                throttle: 0.05,
            },
        }
    }

    /// Loops tuned so vertical engagement is exactly bumpless.
    fn vertical_preset() -> AutopilotPreset<f64> {
        let mut preset = AutopilotPreset::default();
        preset.altitude = LoopGains {
            i: 0.0,
            ..preset.altitude
        };
        preset.vertical_speed = LoopGains {
            i: 0.0,
            ..preset.vertical_speed
        };
        preset.elevator = LoopGains {
            i: 0.5,
            integral_low: -1.0,
            integral_high: 1.0,
            ..preset.elevator
        };
        preset
    }

    /// Engaging the vertical axis in vertical speed mode keeps the pilot's pitch input.
    #[test]
    fn test_cascade_vertical_speed_engage_bumpless() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::with_preset(&vertical_preset());

        let staged = network.engage_vertical(&telemetry, false);
        assert!(value_close(6.0, staged), "Staged 5 m/s plus aoa / p.");

        let pitch = network.vertical_axis(&telemetry, false, 0.02);
        assert!(
            value_close(0.2, pitch),
            "First pitch command should match the manual input."
        );
        assert!(value_close(2.0, network.elevator.setpoint()));
    }

    /// Engaging in altitude hold keeps the vertical speed and pitch input.
    #[test]
    fn test_cascade_altitude_engage_bumpless() {
        let telemetry = cruise();
        let mut preset = vertical_preset();
        preset.vertical_speed.i = 0.8;
        let mut network = CascadeNetwork::with_preset(&preset);

        let staged = network.engage_vertical(&telemetry, true);
        assert!(value_close(1000.0 + 5.0 / 0.15, staged));

        let pitch = network.vertical_axis(&telemetry, true, 0.02);
        assert!(value_close(5.0, network.vertical_speed.setpoint()));
        assert!(value_close(2.0, network.elevator.setpoint()));
        assert!(value_close(0.2, pitch));
    }

    /// Switching to vertical speed mode mid-flight keeps the angle of attack setpoint.
    #[test]
    fn test_cascade_restage_to_vertical_speed() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::with_preset(&vertical_preset());
        let _ = network.engage_vertical(&telemetry, true);
        let _ = network.vertical_axis(&telemetry, true, 0.02);

        let staged = network.stage_vertical(&telemetry, false);
        assert!(value_close(6.0, staged));
        assert!(value_close(0.0, network.altitude.integral()));

        let _ = network.vertical_axis(&telemetry, false, 0.02);
        assert!(value_close(2.0, network.elevator.setpoint()));
    }

    /// Throttle engagement holds the current setting at the current airspeed.
    #[test]
    fn test_cascade_speed_engage_bumpless() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::new();
        network.engage_speed(&telemetry);

        let command = network.speed_axis(&telemetry, 0.02);
        assert!(value_close(0.05, command));
        assert!(value_close(100.0, network.throttle.setpoint()));
    }

    /// A zero speed setpoint is a cutoff, whatever the airspeed.
    #[test]
    fn test_cascade_throttle_cutoff() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::new();
        network.engage_speed(&telemetry);
        network.throttle.set_setpoint(0.0);

        assert!(value_close(0.0, network.speed_axis(&telemetry, 0.02)));
    }

    /// Too slow means full throttle; the command stays in [0, 1].
    #[test]
    fn test_cascade_throttle_range() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::new();
        network.engage_speed(&telemetry);
        network.throttle.set_setpoint(140.0);
        assert!(value_close(1.0, network.speed_axis(&telemetry, 0.02)));

        network.throttle.set_setpoint(20.0);
        for _ in 0..50 {
            let command = network.speed_axis(&telemetry, 0.02);
            assert!((0.0..=1.0).contains(&command));
        }
    }

    /// Heading engagement stages the setpoint from the bank angle across north.
    #[test]
    fn test_cascade_heading_engage_across_north() {
        let telemetry = Telemetry {
            heading: 355.0,
            bank: 20.0,
            ..cruise()
        };
        let mut network = CascadeNetwork::new();
        let staged = network.engage_heading(&telemetry);
        assert!(value_close(5.0, staged), "355 plus 20 / 2 wraps to 5.");

        let _ = network.heading_axis(&telemetry, staged, 0.02);
        assert!(
            value_within(20.0, network.aileron.setpoint(), 0.05),
            "Bank setpoint should continue the current bank."
        );
    }

    /// A target to the right banks right and rolls right.
    #[test]
    fn test_cascade_heading_turns_right() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::new();
        let _ = network.engage_heading(&telemetry);

        let (roll, _) = network.heading_axis(&telemetry, 100.0, 0.02);
        assert!(network.aileron.setpoint() > 0.0);
        assert!(roll > 0.0);

        let (roll, _) = network.heading_axis(&telemetry, 80.0, 0.02);
        assert!(network.aileron.setpoint() < 0.0);
        assert!(roll < 0.0);
    }

    /// Holding the wings level rolls against the current bank.
    #[test]
    fn test_cascade_wing_leveller() {
        let telemetry = Telemetry {
            bank: 15.0,
            ..cruise()
        };
        let mut network = CascadeNetwork::new();
        let (roll, yaw) = network.wing_leveller_axis(&telemetry, 0.02);
        assert!(roll < 0.0);
        assert!(value_close(0.0, yaw));
    }

    /// Disengaging clears every integral in the chain.
    #[test]
    fn test_cascade_disengage_resets_chain() {
        let telemetry = cruise();
        let mut network = CascadeNetwork::with_preset(&vertical_preset());
        let _ = network.engage_vertical(&telemetry, true);
        let _ = network.vertical_axis(&telemetry, true, 0.02);
        assert!(value_not_close(0.0, network.elevator.integral()));

        network.disengage_vertical();
        for role in [Role::Altitude, Role::VerticalSpeed, Role::Elevator] {
            assert!(value_close(0.0, network.controller(role).integral()));
        }
    }

    /// Negative altitude readings are clamped before the error is formed.
    #[test]
    fn test_cascade_altitude_input_limit() {
        let mut network = CascadeNetwork::<f64>::new();
        network.altitude.set_setpoint(0.0);
        let below = Telemetry {
            altitude: -20.0,
            ..cruise()
        };
        let output = network.altitude.update(below.altitude, 0.02);
        assert!(value_close(0.0, output));
    }

    /// The live tuning round-trips through a preset.
    #[test]
    fn test_cascade_preset_round_trip() {
        let mut preset = AutopilotPreset::default();
        preset.rudder.p = 0.3;
        let mut network = CascadeNetwork::<f64>::new();
        network.apply_preset(&preset);
        assert_eq!(network.preset(), preset);
    }
}
