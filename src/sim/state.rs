//! Craft state and simulation outcomes

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::FUEL_CAPACITY;
use crate::normalize_angle;
use crate::settings::CraftGeometry;

/// Why a contact was not a landing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrashReason {
    MissedPad,
    BadAngle,
    TooFastHorizontal,
    TooFastVertical,
    OutOfBounds,
}

impl CrashReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrashReason::MissedPad => "missed pad",
            CrashReason::BadAngle => "bad angle",
            CrashReason::TooFastHorizontal => "too fast horizontally",
            CrashReason::TooFastVertical => "too fast vertically",
            CrashReason::OutOfBounds => "out of bounds",
        }
    }
}

impl fmt::Display for CrashReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Flying,
    Landed,
    Crashed(CrashReason),
}

impl Outcome {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Flying)
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation running
    Flying,
    /// Safe touchdown; simulation halted
    Landed,
    /// Contact outside tolerances; simulation halted
    Crashed(CrashReason),
}

impl GamePhase {
    #[inline]
    pub fn is_flying(&self) -> bool {
        matches!(self, GamePhase::Flying)
    }

    pub fn label(&self) -> String {
        match self {
            GamePhase::Flying => "flying".to_string(),
            GamePhase::Landed => "landed".to_string(),
            GamePhase::Crashed(reason) => format!("crashed ({reason})"),
        }
    }
}

impl From<Outcome> for GamePhase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Flying => GamePhase::Flying,
            Outcome::Landed => GamePhase::Landed,
            Outcome::Crashed(reason) => GamePhase::Crashed(reason),
        }
    }
}

/// Lander kinematics and fuel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraftState {
    /// Centre of the hull
    pub pos: DVec2,
    /// Units per frame; +y is downward
    pub vel: DVec2,
    /// Radians in [-π, π), 0 = upright, positive = clockwise on screen
    pub angle: f64,
    /// Radians per frame
    pub angular_vel: f64,
    /// Never negative
    pub fuel: f64,
}

impl Default for CraftState {
    fn default() -> Self {
        Self {
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            angle: 0.0,
            angular_vel: 0.0,
            fuel: FUEL_CAPACITY,
        }
    }
}

impl CraftState {
    pub fn with_pos(self, x: f64, y: f64) -> Self {
        Self {
            pos: DVec2::new(x, y),
            ..self
        }
    }

    pub fn with_vel(self, vx: f64, vy: f64) -> Self {
        Self {
            vel: DVec2::new(vx, vy),
            ..self
        }
    }

    pub fn with_angle(self, angle: f64) -> Self {
        Self {
            angle: normalize_angle(angle),
            ..self
        }
    }

    pub fn with_angle_deg(self, degrees: f64) -> Self {
        self.with_angle(degrees.to_radians())
    }

    pub fn with_angular_vel(self, angular_vel: f64) -> Self {
        Self {
            angular_vel,
            ..self
        }
    }

    pub fn with_fuel(self, fuel: f64) -> Self {
        Self {
            fuel: fuel.max(0.0),
            ..self
        }
    }

    /// Tilt from upright in degrees
    #[inline]
    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Direction the main engine pushes
    #[inline]
    pub fn up(&self) -> DVec2 {
        DVec2::new(self.angle.sin(), -self.angle.cos())
    }

    /// The craft's own right-hand direction
    #[inline]
    pub fn right(&self) -> DVec2 {
        DVec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Transform a point from the craft frame to world space
    #[inline]
    pub fn to_world(&self, local: DVec2) -> DVec2 {
        self.pos + DVec2::from_angle(self.angle).rotate(local)
    }

    /// Left and right foot in world space
    pub fn feet(&self, geometry: &CraftGeometry) -> [DVec2; 2] {
        geometry.local_feet().map(|p| self.to_world(p))
    }

    /// Hull outline points in world space
    pub fn hull(&self, geometry: &CraftGeometry) -> [DVec2; 3] {
        geometry.local_hull().map(|p| self.to_world(p))
    }

    #[inline]
    pub fn is_flamed_out(&self) -> bool {
        self.fuel <= 0.0
    }
}

/// Conditions at the moment of contact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touchdown {
    pub vel: DVec2,
    pub angle: f64,
    pub fuel: f64,
    pub tick: u64,
}
