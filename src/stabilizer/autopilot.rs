// src/stabilizer/autopilot.rs

//! # Autopilot
//!
//! Owns the [`CascadeNetwork`] and the [`HeadingTransition`] and drives both
//! once per fixed simulation step.
//!
//! Engage switches and mode flags may be flipped at any time between ticks.
//! The autopilot only acts on them at the start of the next tick, against
//! that tick's telemetry, so an engagement always seeds its chain from the
//! vehicle state the first command is computed for.

use crate::angle::{wrap_delta, wrap_heading};
use crate::error::AutopilotError;
use crate::gains::{AutopilotPreset, GainField, Role};
use crate::heading::{HeadingTransition, TransitionStep};
use crate::number::{constant, to_f64, Number};
use crate::stabilizer::{AutopilotSettings, CascadeNetwork, FlightStabilizer};
use crate::telemetry::{ActuatorCommand, Telemetry};
use log::{debug, info, warn};
use num_traits::Float;

/// A switch flipped by the operator and latched by the tick.
#[derive(Debug, Clone, Copy, Default)]
struct Switch {
    requested: bool,
    active: bool,
}

impl Switch {
    /// Latches the request, returning the new state if it changed.
    fn latch(&mut self) -> Option<bool> {
        if self.requested == self.active {
            return None;
        }
        self.active = self.requested;
        Some(self.active)
    }

    /// Sets both sides so no edge is seen.
    fn force(&mut self, on: bool) {
        self.requested = on;
        self.active = on;
    }
}

/// Heading, vertical, and speed hold over one cascade network.
pub struct Autopilot<T: Number> {
    network: CascadeNetwork<T>,
    transition: HeadingTransition<T>,
    settings: AutopilotSettings<T>,
    heading_hold: Switch,
    vertical_hold: Switch,
    speed_hold: Switch,
    altitude_hold: Switch,
    wing_leveller: Switch,
    heading_setpoint: T,
    heading_target: T,
    pending_heading: Option<T>,
    pending_nudge: T,
    nudge_timer: T,
}

impl<T: Number> Autopilot<T> {
    /// Creates a disengaged autopilot with the stock tuning and settings.
    pub fn new() -> Self {
        Self::with_settings(AutopilotSettings::new())
    }

    /// Creates a disengaged autopilot with the stock tuning.
    pub fn with_settings(settings: AutopilotSettings<T>) -> Self {
        Autopilot {
            network: CascadeNetwork::new(),
            transition: HeadingTransition::new(),
            settings,
            heading_hold: Switch::default(),
            vertical_hold: Switch::default(),
            speed_hold: Switch::default(),
            altitude_hold: Switch::default(),
            wing_leveller: Switch::default(),
            heading_setpoint: T::zero(),
            heading_target: T::zero(),
            pending_heading: None,
            pending_nudge: T::zero(),
            nudge_timer: T::zero(),
        }
    }

    /// Creates a disengaged autopilot tuned by `preset`.
    pub fn with_preset(preset: &AutopilotPreset<T>) -> Result<Self, AutopilotError> {
        let mut autopilot = Self::new();
        autopilot.load_preset(preset)?;
        Ok(autopilot)
    }

    /// Runtime settings.
    pub fn settings(&self) -> &AutopilotSettings<T> {
        &self.settings
    }

    /// Replaces the runtime settings.
    pub fn set_settings(&mut self, settings: AutopilotSettings<T>) {
        self.settings = settings;
    }

    /// The loops, for inspection.
    pub fn network(&self) -> &CascadeNetwork<T> {
        &self.network
    }

    /// The heading transition, for inspection.
    pub fn transition(&self) -> &HeadingTransition<T> {
        &self.transition
    }

    /// Heading the Heading loop is steering to on this tick.
    pub fn heading_setpoint(&self) -> T {
        self.heading_setpoint
    }

    /// Heading the setpoint is moving to.
    pub fn heading_target(&self) -> T {
        self.heading_target
    }

    /// Engages or disengages heading hold from the next tick.
    pub fn set_heading_hold(&mut self, engaged: bool) {
        self.heading_hold.requested = engaged;
    }

    /// Whether heading hold is requested.
    pub fn heading_hold(&self) -> bool {
        self.heading_hold.requested
    }

    /// Engages or disengages the vertical axis from the next tick.
    pub fn set_vertical_hold(&mut self, engaged: bool) {
        self.vertical_hold.requested = engaged;
    }

    /// Whether the vertical axis is requested.
    pub fn vertical_hold(&self) -> bool {
        self.vertical_hold.requested
    }

    /// Engages or disengages speed hold from the next tick.
    pub fn set_speed_hold(&mut self, engaged: bool) {
        self.speed_hold.requested = engaged;
    }

    /// Whether speed hold is requested.
    pub fn speed_hold(&self) -> bool {
        self.speed_hold.requested
    }

    /// Selects altitude hold (`true`) or vertical speed hold (`false`) for
    /// the vertical axis.
    pub fn set_altitude_hold(&mut self, altitude_hold: bool) {
        self.altitude_hold.requested = altitude_hold;
    }

    /// Whether altitude hold is requested.
    pub fn altitude_hold(&self) -> bool {
        self.altitude_hold.requested
    }

    /// Selects wing-leveller mode for the heading axis.
    pub fn set_wing_leveller(&mut self, wing_leveller: bool) {
        self.wing_leveller.requested = wing_leveller;
    }

    /// Whether wing-leveller mode is requested.
    pub fn wing_leveller(&self) -> bool {
        self.wing_leveller.requested
    }

    /// Commits a new heading in `[0, 360)`.
    ///
    /// While heading hold steers, the setpoint starts moving toward it, or a
    /// running transition is redirected to it. Otherwise it is kept and
    /// used the next time heading hold takes over steering.
    pub fn commit_heading(&mut self, heading: T) -> Result<(), AutopilotError> {
        if !(T::zero()..constant(360.0)).contains(&heading) {
            warn!("heading commit {:?} rejected", heading);
            return Err(AutopilotError::HeadingOutOfRange {
                heading: to_f64(heading),
            });
        }

        self.pending_nudge = T::zero();
        if self.heading_hold.active && !self.wing_leveller.active {
            self.heading_target = heading;
            self.transition.begin(self.heading_setpoint, heading);
        } else {
            self.pending_heading = Some(heading);
        }
        Ok(())
    }

    /// Adds `delta` degrees to the heading target.
    ///
    /// Nudges accumulate until `commit_delay` has passed without another
    /// one, then the sum is committed on a tick.
    pub fn nudge_heading(&mut self, delta: T) -> Result<(), AutopilotError> {
        let delta = finite_target(delta)?;
        self.pending_nudge = wrap_delta(self.pending_nudge + delta);
        self.nudge_timer = self.settings.commit_delay;
        Ok(())
    }

    /// Stops a running heading transition on the next tick. The heading
    /// reached so far becomes the target.
    pub fn cancel_heading_transition(&mut self) {
        self.transition.cancel();
    }

    /// Altitude held in altitude hold mode; negative targets clamp to zero.
    ///
    /// Engaging the axis or switching modes re-stages this target.
    pub fn set_altitude_target(&mut self, altitude: T) -> Result<(), AutopilotError> {
        let altitude = finite_target(altitude)?;
        self.network
            .altitude
            .set_setpoint(Float::max(altitude, T::zero()));
        Ok(())
    }

    /// Current altitude target.
    pub fn altitude_target(&self) -> T {
        self.network.altitude.setpoint()
    }

    /// Vertical speed held in vertical speed mode.
    pub fn set_vertical_speed_target(&mut self, vertical_speed: T) -> Result<(), AutopilotError> {
        let vertical_speed = finite_target(vertical_speed)?;
        self.network.vertical_speed.set_setpoint(vertical_speed);
        Ok(())
    }

    /// Current vertical speed target.
    pub fn vertical_speed_target(&self) -> T {
        self.network.vertical_speed.setpoint()
    }

    /// Airspeed held by speed hold; negative targets clamp to zero, and zero
    /// cuts the throttle.
    pub fn set_speed_target(&mut self, speed: T) -> Result<(), AutopilotError> {
        let speed = finite_target(speed)?;
        self.network
            .throttle
            .set_setpoint(Float::max(speed, T::zero()));
        Ok(())
    }

    /// Current airspeed target.
    pub fn speed_target(&self) -> T {
        self.network.throttle.setpoint()
    }

    /// Levels the vehicle: zero vertical speed, wings level, and the current
    /// airspeed as the speed target. Engage switches are left alone.
    pub fn level_off(&mut self, telemetry: &Telemetry<T>) {
        self.altitude_hold.force(false);
        self.network.altitude.reset();
        self.network.vertical_speed.set_setpoint(T::zero());
        self.network.vertical_speed.skip_derivative();
        self.network.elevator.skip_derivative();
        self.wing_leveller.requested = true;
        self.network
            .throttle
            .set_setpoint(Float::max(telemetry.airspeed, T::zero()));
        debug!("level off at {:?} m/s", telemetry.airspeed);
    }

    /// Sets one gain field of one loop.
    ///
    /// The resulting record is validated first; on error nothing changes.
    pub fn set_gain(&mut self, role: Role, field: GainField, value: T) -> Result<(), AutopilotError> {
        let gains = self.network.controller(role).gains().with_field(field, value);
        if let Err(reason) = gains.validate() {
            warn!("{:?} {:?} = {:?} rejected: {}", role, field, value, reason);
            return Err(AutopilotError::InvalidGainConfiguration { role, reason });
        }
        self.network.apply_gains(role, gains);
        Ok(())
    }

    /// Replaces the tuning of every loop.
    ///
    /// All eight records are validated before any is applied; on error the
    /// previous tuning is kept whole.
    pub fn load_preset(&mut self, preset: &AutopilotPreset<T>) -> Result<(), AutopilotError> {
        if let Err(error) = preset.validate() {
            warn!("preset rejected: {}", error);
            return Err(error);
        }
        self.network.apply_preset(preset);
        info!("preset loaded");
        Ok(())
    }

    /// Live tuning of every loop.
    pub fn preset(&self) -> AutopilotPreset<T> {
        self.network.preset()
    }

    /// Runs one fixed step of `dt` seconds.
    ///
    /// Switch changes are acted on first. Below the minimum control speed
    /// no loop runs and nothing is commanded.
    pub fn tick(&mut self, telemetry: &Telemetry<T>, dt: T) -> ActuatorCommand<T> {
        self.latch_switches(telemetry);

        let mut command = ActuatorCommand::none();
        if telemetry.airspeed < self.settings.min_control_speed {
            return command;
        }

        if self.heading_hold.active {
            if let Some((roll, yaw)) = self.heading_tick(telemetry, dt) {
                command.roll = Some(roll);
                command.yaw = Some(yaw);
            }
        }
        if self.vertical_hold.active {
            let pitch = self
                .network
                .vertical_axis(telemetry, self.altitude_hold.active, dt);
            command.pitch = Some(pitch);
        }
        if self.speed_hold.active {
            command.throttle = Some(self.network.speed_axis(telemetry, dt));
        }
        command
    }

    fn latch_switches(&mut self, telemetry: &Telemetry<T>) {
        let leveller = self.wing_leveller.latch();
        if let Some(on) = leveller {
            debug!("wing leveller {}", if on { "on" } else { "off" });
            if on {
                self.transition.clear();
            }
        }
        match self.heading_hold.latch() {
            Some(true) => self.engage_heading(telemetry),
            Some(false) => {
                self.transition.clear();
                self.pending_nudge = T::zero();
                self.network.disengage_heading();
                debug!("heading hold disengaged");
            }
            None if leveller == Some(false) && self.heading_hold.active => {
                self.network.relock_heading();
                self.lock_heading(telemetry.heading);
            }
            None => {}
        }

        let mode = self.altitude_hold.latch();
        match self.vertical_hold.latch() {
            Some(true) => {
                let staged = self
                    .network
                    .engage_vertical(telemetry, self.altitude_hold.active);
                debug!("vertical hold engaged, setpoint {:?}", staged);
            }
            Some(false) => {
                self.network.disengage_vertical();
                debug!("vertical hold disengaged");
            }
            None => {
                if let Some(altitude_hold) = mode.filter(|_| self.vertical_hold.active) {
                    let staged = self.network.stage_vertical(telemetry, altitude_hold);
                    debug!(
                        "{} hold, setpoint {:?}",
                        if altitude_hold { "altitude" } else { "vertical speed" },
                        staged
                    );
                }
            }
        }

        match self.speed_hold.latch() {
            Some(true) => {
                self.network.engage_speed(telemetry);
                debug!("speed hold engaged at {:?} m/s", telemetry.airspeed);
            }
            Some(false) => {
                self.network.disengage_speed();
                debug!("speed hold disengaged");
            }
            None => {}
        }
    }

    fn engage_heading(&mut self, telemetry: &Telemetry<T>) {
        let staged = self.network.engage_heading(telemetry);
        self.transition.clear();
        self.pending_nudge = T::zero();
        self.heading_setpoint = staged;
        debug!("heading hold engaged, setpoint {:?}", staged);

        if self.wing_leveller.active {
            self.heading_target = telemetry.heading;
            return;
        }
        let target = self.pending_heading.take().unwrap_or(telemetry.heading);
        self.heading_target = target;
        self.transition.begin(staged, target);
    }

    /// Points the setpoint at `heading`, then starts toward a heading
    /// committed while steering was off.
    fn lock_heading(&mut self, heading: T) {
        self.transition.clear();
        self.heading_setpoint = heading;
        self.heading_target = heading;
        if let Some(pending) = self.pending_heading.take() {
            self.heading_target = pending;
            self.transition.begin(heading, pending);
        }
    }

    fn heading_tick(&mut self, telemetry: &Telemetry<T>, dt: T) -> Option<(T, T)> {
        if telemetry.on_ground {
            self.transition.clear();
            self.pending_nudge = T::zero();
            self.heading_setpoint = telemetry.heading;
            self.heading_target = telemetry.heading;
            return None;
        }
        if self.wing_leveller.active {
            return Some(self.network.wing_leveller_axis(telemetry, dt));
        }

        self.commit_nudge(dt);
        let easing = self.network.heading.gains().easing;
        match self.transition.tick(dt, easing) {
            TransitionStep::Idle => {}
            TransitionStep::Moving(heading) | TransitionStep::Arrived(heading) => {
                self.heading_setpoint = heading;
            }
            TransitionStep::Canceled(heading) => {
                self.heading_setpoint = heading;
                self.heading_target = heading;
            }
        }
        Some(
            self.network
                .heading_axis(telemetry, self.heading_setpoint, dt),
        )
    }

    fn commit_nudge(&mut self, dt: T) {
        if self.pending_nudge == T::zero() {
            return;
        }
        if self.nudge_timer > T::zero() {
            self.nudge_timer = self.nudge_timer - dt;
            return;
        }

        let delta = core::mem::replace(&mut self.pending_nudge, T::zero());
        if self.transition.redirect_by(delta) {
            self.heading_target = self.transition.target_heading();
        } else {
            self.heading_target = wrap_heading(self.heading_target + delta);
            self.transition.begin(self.heading_setpoint, self.heading_target);
        }
    }
}

impl<T: Number> Default for Autopilot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Number> FlightStabilizer<T> for Autopilot<T> {
    fn control(&mut self, telemetry: &Telemetry<T>, dt: T) -> ActuatorCommand<T> {
        self.tick(telemetry, dt)
    }
}

fn finite_target<T: Number>(target: T) -> Result<T, AutopilotError> {
    if Float::is_finite(target) {
        Ok(target)
    } else {
        warn!("target {:?} rejected", target);
        Err(AutopilotError::InvalidTarget {
            target: to_f64(target),
        })
    }
}
