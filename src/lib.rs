//! Moon Lander - a 2D lunar lander arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, physics, landing evaluation, session)
//! - `settings`: Tunable constants, loadable from JSON
//! - `seed`: Integer or free-text seeds
//! - `autopilot`: Built-in control source for demos
//!
//! World space is screen-like: x grows right, y grows down. Time is measured
//! in frames (1/60 s), so velocities are units per frame.

pub mod autopilot;
pub mod seed;
pub mod settings;
pub mod sim;

pub use seed::Seed;
pub use settings::{ConfigError, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep, in frames
    pub const SIM_DT: f64 = 1.0;
    /// Simulation rate (ticks per wall-clock second)
    pub const TICK_HZ: f64 = 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f64 = 900.0;
    pub const WORLD_HEIGHT: f64 = 650.0;

    /// Lunar-ish gravity (units/frame², downward)
    pub const GRAVITY: f64 = 0.12;
    /// Main engine acceleration along the craft's up vector
    pub const MAIN_THRUST: f64 = 0.22;
    /// Lateral RCS acceleration
    pub const RCS_THRUST: f64 = 0.08;

    /// Fuel
    pub const FUEL_CAPACITY: f64 = 100.0;
    pub const MAIN_BURN_PER_FRAME: f64 = 20.0 / 60.0;
    pub const RCS_BURN_PER_FRAME: f64 = 6.0 / 60.0;

    /// Safe landing thresholds
    pub const MAX_LAND_ANGLE_DEG: f64 = 8.0;
    pub const MAX_LAND_VX: f64 = 1.8;
    pub const MAX_LAND_VY: f64 = 2.5;

    /// Landing pad
    pub const PAD_WIDTH: f64 = 120.0;
    pub const PAD_MARGIN: f64 = 10.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    if angle.abs() > 4.0 * PI {
        angle = angle.rem_euclid(TAU);
    }
    while angle >= PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}
