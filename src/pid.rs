// src/pid.rs

//! # PID Control Module
//!
//! This module provides the compute callback and the single-loop controller
//! built on top of `piddiy::PidController`. Every loop of the cascade
//! network is one [`Controller`].

pub mod compute;
pub use compute::*;
pub mod controller;
pub use controller::*;
