// demos/heading_turn.rs

use autopilot_cascade::{Autopilot, AutopilotSettings, ControlState, FlightStabilizer, Telemetry};

fn main() {
    let mut settings = AutopilotSettings::<f64>::new();

    // Let nudges pile up for a quarter second before committing them.
    settings.commit_delay = 0.25;

    let mut autopilot = Autopilot::with_settings(settings);

    // Level flight heading north at 80 m/s, climbing gently.
    let mut telemetry = Telemetry {
        heading: 0.0,
        bank: 0.0,
        yaw: 0.0,
        angle_of_attack: 2.0,
        altitude: 1200.0,
        vertical_speed: 1.0,
        airspeed: 80.0,
        on_ground: false,
        controls: ControlState {
            roll: 0.0,
            pitch: 0.1,
            yaw: 0.0,
            throttle: 0.6,
        },
    };
    let dt = 0.02; // 50 Hz

    autopilot.set_heading_hold(true);
    autopilot.set_vertical_hold(true);
    autopilot.set_altitude_hold(true);
    autopilot.set_speed_hold(true);
    let _ = autopilot.control(&telemetry, dt);

    if let Err(error) = autopilot.commit_heading(90.0) {
        eprintln!("{}", error);
        return;
    }

    println!("                  Setpoint,  Heading,     Bank,     Roll,      Yaw");
    let mut t = 0.0;
    for step in 0..=3000 {
        let command = autopilot.control(&telemetry, dt);
        telemetry.controls = command.apply_to(telemetry.controls);

        if step % 100 == 0 {
            println!(
                "t = {:-6.2}:    {:-8.3}, {:-8.3}, {:-8.3}, {:-8.3}, {:-8.3}",
                t,
                autopilot.heading_setpoint(),
                telemetry.heading,
                telemetry.bank,
                telemetry.controls.roll,
                telemetry.controls.yaw
            );
        }

        // simulate response: roll rate follows the roll actuator, turn rate
        // follows the bank angle
        telemetry.bank = (telemetry.bank + 45.0 * telemetry.controls.roll * dt).clamp(-60.0, 60.0);
        let turn_rate = 9.81 * telemetry.bank.to_radians().tan() / telemetry.airspeed;
        telemetry.heading = (telemetry.heading + turn_rate.to_degrees() * dt).rem_euclid(360.0);
        telemetry.yaw += (telemetry.controls.yaw - 0.05 * telemetry.yaw) * dt;

        t += dt;
    }
}
