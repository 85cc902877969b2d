//! Ground contact detection and landing classification
//!
//! Contact is tested point-wise: each foot (and hull point) is dropped onto
//! the terrain polyline by interpolating the segment under it. Once anything
//! touches, the touchdown is graded against the tolerances in a fixed order:
//! pad, angle, horizontal speed, vertical speed.

use glam::DVec2;

use super::state::{CraftState, CrashReason, Outcome};
use super::terrain::{Pad, Terrain};
use crate::settings::{CraftGeometry, LandingTolerances, Settings};

/// Grades ground contact for one craft geometry and set of tolerances
#[derive(Debug, Clone, Default)]
pub struct LandingEvaluator {
    geometry: CraftGeometry,
    tolerances: LandingTolerances,
}

impl LandingEvaluator {
    pub fn new(geometry: CraftGeometry, tolerances: LandingTolerances) -> Self {
        Self {
            geometry,
            tolerances,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.craft.clone(), settings.tolerances.clone())
    }

    pub fn with_max_angle_deg(self, max_angle_deg: f64) -> Self {
        Self {
            tolerances: LandingTolerances {
                max_angle_deg,
                ..self.tolerances
            },
            ..self
        }
    }

    pub fn with_max_vx(self, max_vx: f64) -> Self {
        Self {
            tolerances: LandingTolerances {
                max_vx,
                ..self.tolerances
            },
            ..self
        }
    }

    pub fn with_max_vy(self, max_vy: f64) -> Self {
        Self {
            tolerances: LandingTolerances {
                max_vy,
                ..self.tolerances
            },
            ..self
        }
    }

    #[inline]
    pub fn geometry(&self) -> &CraftGeometry {
        &self.geometry
    }

    /// Classify the craft's situation after an integration step
    pub fn evaluate(&self, state: &CraftState, terrain: &Terrain, pad: &Pad) -> Outcome {
        let feet = state.feet(&self.geometry);

        // Off either end of the world, with or without contact
        if feet.iter().any(|f| !terrain.contains_x(f.x)) {
            return Outcome::Crashed(CrashReason::OutOfBounds);
        }

        if self.contact_depth(state, terrain).is_none() {
            return Outcome::Flying;
        }

        Outcome::from(self.classify(state, &feet, pad))
    }

    /// How far the deepest contact point sits at or below the ground
    ///
    /// None while nothing touches. Hull points beyond the terrain span are
    /// ignored.
    pub fn contact_depth(&self, state: &CraftState, terrain: &Terrain) -> Option<f64> {
        state
            .feet(&self.geometry)
            .into_iter()
            .chain(state.hull(&self.geometry))
            .filter_map(|p| penetration(p, terrain))
            .reduce(f64::max)
    }

    /// Precedence: pad, angle, horizontal speed, vertical speed
    fn classify(&self, state: &CraftState, feet: &[DVec2; 2], pad: &Pad) -> Result<(), CrashReason> {
        let tol = &self.tolerances;

        if !feet.iter().all(|f| pad.contains_x(f.x)) {
            return Err(CrashReason::MissedPad);
        }
        if state.angle.abs() > tol.max_angle_deg.to_radians() {
            return Err(CrashReason::BadAngle);
        }
        if state.vel.x.abs() > tol.max_vx {
            return Err(CrashReason::TooFastHorizontal);
        }
        if state.vel.y > tol.max_vy {
            return Err(CrashReason::TooFastVertical);
        }
        Ok(())
    }
}

impl From<Result<(), CrashReason>> for Outcome {
    fn from(grade: Result<(), CrashReason>) -> Self {
        match grade {
            Ok(()) => Outcome::Landed,
            Err(reason) => Outcome::Crashed(reason),
        }
    }
}

/// Depth of a point below the ground (>= 0 when touching)
fn penetration(point: DVec2, terrain: &Terrain) -> Option<f64> {
    let ground = terrain.ground_height(point.x)?;
    let depth = point.y - ground;
    (depth >= 0.0).then_some(depth)
}
