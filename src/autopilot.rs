//! Demo autopilot
//!
//! A simple control source for headless runs and attract mode: drift over the
//! pad with the RCS, stay upright, and meter the main engine against a
//! height-dependent descent rate. Good enough to land most seeds, not all.

use crate::settings::CraftGeometry;
use crate::sim::{ControlInput, CraftState, Pad, Session, Terrain};

/// Target vx per unit of horizontal distance to the pad centre
const LATERAL_GAIN: f64 = 0.01;
const MAX_APPROACH_VX: f64 = 1.2;
const VX_DEADBAND: f64 = 0.05;

/// Frames of angular velocity to lead the attitude correction by
const ATTITUDE_LEAD: f64 = 3.0;
const ANGLE_DEADBAND_DEG: f64 = 0.5;
/// Never light the main engine past this tilt
const MAX_THRUST_TILT_DEG: f64 = 30.0;

/// Target vy per unit of height above the ground
const DESCENT_GAIN: f64 = 0.02;
const MIN_DESCENT: f64 = 0.8;
const MAX_DESCENT: f64 = 2.0;
/// Height to hold while not yet over the pad
const HOVER_HEIGHT: f64 = 60.0;

/// Controls for the session's craft this tick
pub fn autopilot(session: &Session) -> ControlInput {
    if !session.phase().is_flying() {
        return ControlInput::default();
    }
    fly(
        session.craft(),
        session.terrain(),
        session.pad(),
        &session.settings().craft,
    )
}

/// Controls for a craft over the given ground
pub fn fly(craft: &CraftState, terrain: &Terrain, pad: &Pad, geometry: &CraftGeometry) -> ControlInput {
    let mut controls = ControlInput::default();

    // Lateral: close on the pad centre at a bounded speed
    let dx = pad.center_x() - craft.pos.x;
    let target_vx = (dx * LATERAL_GAIN).clamp(-MAX_APPROACH_VX, MAX_APPROACH_VX);
    let vx_err = target_vx - craft.vel.x;
    if vx_err > VX_DEADBAND {
        controls.strafe_right = true;
    } else if vx_err < -VX_DEADBAND {
        controls.strafe_left = true;
    }

    // Attitude: back to upright, leading by the current turn rate
    let predicted = craft.angle + craft.angular_vel * ATTITUDE_LEAD;
    let deadband = ANGLE_DEADBAND_DEG.to_radians();
    if predicted > deadband {
        controls.rotate_left = true;
    } else if predicted < -deadband {
        controls.rotate_right = true;
    }

    // Vertical: clearance under the lowest foot
    let height = craft
        .feet(geometry)
        .iter()
        .filter_map(|f| terrain.ground_height(f.x).map(|g| g - f.y))
        .fold(f64::INFINITY, f64::min);
    if !height.is_finite() {
        return controls;
    }

    let over_pad = dx.abs() < pad.width() * 0.5 - geometry.foot_offset.x.abs();
    let descent = (height * DESCENT_GAIN).clamp(MIN_DESCENT, MAX_DESCENT);
    let target_vy = if over_pad {
        descent
    } else if height < HOVER_HEIGHT {
        -0.3
    } else {
        descent.min((height - HOVER_HEIGHT) * DESCENT_GAIN)
    };

    controls.thrust =
        craft.vel.y > target_vy && craft.angle.abs() < MAX_THRUST_TILT_DEG.to_radians();
    controls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{TickInput, tick};
    use glam::DVec2;

    fn flat() -> (Terrain, Pad) {
        let terrain = Terrain::from_points(vec![
            DVec2::new(0.0, 500.0),
            DVec2::new(300.0, 500.0),
            DVec2::new(420.0, 500.0),
            DVec2::new(900.0, 500.0),
        ]);
        let pad = Pad {
            x_min: 300.0,
            x_max: 420.0,
            y: 500.0,
            first_vertex: 1,
            last_vertex: 2,
        };
        (terrain, pad)
    }

    #[test]
    fn test_brakes_when_falling_fast_over_pad() {
        let (terrain, pad) = flat();
        let craft = CraftState::default().with_pos(360.0, 400.0).with_vel(0.0, 3.0);
        let controls = fly(&craft, &terrain, &pad, &CraftGeometry::default());
        assert!(controls.thrust);
        assert!(!controls.strafe_left && !controls.strafe_right);
    }

    #[test]
    fn test_coasts_when_slow_over_pad() {
        let (terrain, pad) = flat();
        let craft = CraftState::default().with_pos(360.0, 300.0).with_vel(0.0, 0.2);
        assert!(!fly(&craft, &terrain, &pad, &CraftGeometry::default()).thrust);
    }

    #[test]
    fn test_heads_for_pad() {
        let (terrain, pad) = flat();
        let craft = CraftState::default().with_pos(100.0, 200.0);
        assert!(fly(&craft, &terrain, &pad, &CraftGeometry::default()).strafe_right);
        let craft = CraftState::default().with_pos(800.0, 200.0);
        assert!(fly(&craft, &terrain, &pad, &CraftGeometry::default()).strafe_left);
    }

    #[test]
    fn test_rights_itself() {
        let (terrain, pad) = flat();
        let geometry = CraftGeometry::default();
        let tilted = CraftState::default().with_pos(360.0, 200.0).with_angle_deg(10.0);
        let controls = fly(&tilted, &terrain, &pad, &geometry);
        assert!(controls.rotate_left);
        assert!(!controls.rotate_right);
        let tilted = tilted.with_angle_deg(-10.0);
        assert!(fly(&tilted, &terrain, &pad, &geometry).rotate_right);
    }

    #[test]
    fn test_idle_after_attempt_ends() {
        let mut session = Session::new(5u64, Settings::default());
        while tick(&mut session, &TickInput::default()).is_flying() {}
        assert_eq!(autopilot(&session), ControlInput::default());
    }
}
