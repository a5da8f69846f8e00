// src/stabilizer.rs

//! # Autopilot Stabilizers
//!
//! The cascade network wiring the eight loops together, and the autopilot
//! that drives it: engagement, heading smoothing, targets, and tuning.

pub mod autopilot;
pub use autopilot::*;
pub mod cascade;
pub use cascade::*;
pub mod flight_stabilizer;
pub use flight_stabilizer::*;
