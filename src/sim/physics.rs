//! Fixed-step craft integrator
//!
//! Semi-implicit Euler: velocities are updated first (gravity, rotation,
//! main engine, RCS), then position moves with the new velocity.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::CraftState;
use crate::normalize_angle;
use crate::settings::{PhysicsConfig, RcsFrame};

/// Control snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl ControlInput {
    /// -1 counter-clockwise, +1 clockwise, 0 for none or both
    #[inline]
    pub fn turn_axis(&self) -> f64 {
        axis(self.rotate_left, self.rotate_right)
    }

    /// -1 left, +1 right, 0 for none or both
    #[inline]
    pub fn strafe_axis(&self) -> f64 {
        axis(self.strafe_left, self.strafe_right)
    }
}

fn axis(negative: bool, positive: bool) -> f64 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Advance the craft by one fixed timestep
pub fn step(
    state: &CraftState,
    controls: &ControlInput,
    dt: f64,
    physics: &PhysicsConfig,
) -> CraftState {
    let mut next = *state;

    // (a) gravity
    next.vel.y += physics.gravity * dt;

    // (b) rotation: accelerate while held, bleed off when released
    let turn = controls.turn_axis();
    let delta_w = physics.angular_accel * dt;
    if turn != 0.0 {
        next.angular_vel += turn * delta_w;
    } else if next.angular_vel.abs() <= delta_w {
        next.angular_vel = 0.0;
    } else {
        next.angular_vel -= next.angular_vel.signum() * delta_w;
    }
    let max_w = physics.max_angular_rate;
    next.angular_vel = next.angular_vel.clamp(-max_w, max_w);
    next.angle = normalize_angle(next.angle + next.angular_vel * dt);

    // (c) main engine along the craft's up vector
    if controls.thrust && next.fuel > 0.0 {
        next.vel += next.up() * physics.main_thrust * dt;
        next.fuel = (next.fuel - physics.main_burn_rate * dt).max(0.0);
    }

    // (d) lateral thrusters
    let strafe = controls.strafe_axis();
    if strafe != 0.0 && next.fuel > 0.0 {
        let dir = match physics.rcs_frame {
            RcsFrame::World => DVec2::X,
            RcsFrame::Body => next.right(),
        };
        next.vel += dir * strafe * physics.rcs_thrust * dt;
        next.fuel = (next.fuel - physics.rcs_burn_rate * dt).max(0.0);
    }

    if state.fuel > 0.0 && next.fuel == 0.0 {
        log::debug!("Flame-out at ({:.1}, {:.1})", next.pos.x, next.pos.y);
    }

    // (e) position
    next.pos += next.vel * dt;

    if let Some(ceiling) = physics.ceiling_y {
        if next.pos.y < ceiling {
            next.pos.y = ceiling;
            next.vel.y = next.vel.y.max(0.0);
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn craft() -> CraftState {
        CraftState::default().with_pos(450.0, 300.0)
    }

    #[test]
    fn test_free_fall() {
        let p = physics();
        let next = step(&craft(), &ControlInput::default(), SIM_DT, &p);
        assert_feq(next.vel.y, p.gravity);
        assert_feq(next.pos.y, 300.0 + p.gravity);
        assert_feq(next.pos.x, 450.0);
        assert_feq(next.fuel, craft().fuel);
    }

    #[test]
    fn test_thrust_up_beats_gravity() {
        let p = physics();
        let controls = ControlInput {
            thrust: true,
            ..Default::default()
        };
        let next = step(&craft(), &controls, SIM_DT, &p);
        assert_feq(next.vel.y, p.gravity - p.main_thrust);
        assert_feq(next.vel.x, 0.0);
        assert_feq(next.fuel, craft().fuel - p.main_burn_rate);
    }

    #[test]
    fn test_tilted_thrust_pushes_sideways() {
        let p = physics();
        let controls = ControlInput {
            thrust: true,
            ..Default::default()
        };
        let next = step(&craft().with_angle_deg(30.0), &controls, SIM_DT, &p);
        assert!(next.vel.x > 0.0);
        assert_feq(next.vel.x, 0.5 * p.main_thrust);
    }

    #[test]
    fn test_world_strafe_ignores_orientation() {
        let p = physics();
        let controls = ControlInput {
            strafe_right: true,
            ..Default::default()
        };
        let next = step(&craft().with_angle_deg(45.0), &controls, SIM_DT, &p);
        assert_feq(next.vel.x, p.rcs_thrust);
        assert_feq(next.vel.y, p.gravity);
        assert_feq(next.fuel, craft().fuel - p.rcs_burn_rate);
    }

    #[test]
    fn test_body_strafe_follows_orientation() {
        let p = PhysicsConfig {
            rcs_frame: RcsFrame::Body,
            ..physics()
        };
        let controls = ControlInput {
            strafe_left: true,
            ..Default::default()
        };
        let next = step(&craft().with_angle_deg(90.0), &controls, SIM_DT, &p);
        // Right vector points down after a clockwise quarter turn, so left is up
        assert!(next.vel.x.abs() < 1e-9);
        assert_feq(next.vel.y, p.gravity - p.rcs_thrust);
    }

    #[test]
    fn test_opposed_strafe_cancels_and_saves_fuel() {
        let controls = ControlInput {
            strafe_left: true,
            strafe_right: true,
            ..Default::default()
        };
        let next = step(&craft(), &controls, SIM_DT, &physics());
        assert_feq(next.vel.x, 0.0);
        assert_feq(next.fuel, craft().fuel);
    }

    #[test]
    fn test_rotation_accelerates_and_caps() {
        let p = physics();
        let controls = ControlInput {
            rotate_right: true,
            ..Default::default()
        };
        let mut state = craft();
        state = step(&state, &controls, SIM_DT, &p);
        assert_feq(state.angular_vel, p.angular_accel);
        assert!(state.angle > 0.0);
        for _ in 0..20 {
            state = step(&state, &controls, SIM_DT, &p);
        }
        assert_feq(state.angular_vel, p.max_angular_rate);
    }

    #[test]
    fn test_rotation_bleeds_off_when_released() {
        let p = physics();
        let mut state = craft().with_angular_vel(-p.max_angular_rate);
        for _ in 0..10 {
            state = step(&state, &ControlInput::default(), SIM_DT, &p);
        }
        assert_eq!(state.angular_vel, 0.0);
        assert!(state.angle < 0.0);
    }

    #[test]
    fn test_fuel_clamps_at_zero() {
        let p = physics();
        let controls = ControlInput {
            thrust: true,
            strafe_left: true,
            ..Default::default()
        };
        let next = step(&craft().with_fuel(0.05), &controls, SIM_DT, &p);
        assert_eq!(next.fuel, 0.0);
    }

    #[test]
    fn test_flame_out_leaves_gravity_and_rotation() {
        let p = physics();
        let empty = craft().with_fuel(0.0).with_vel(0.5, 1.0);
        let controls = ControlInput {
            thrust: true,
            strafe_right: true,
            rotate_left: true,
            ..Default::default()
        };
        let next = step(&empty, &controls, SIM_DT, &p);
        let coast = step(
            &empty,
            &ControlInput {
                rotate_left: true,
                ..Default::default()
            },
            SIM_DT,
            &p,
        );
        assert_eq!(next, coast);
        assert_feq(next.vel.x, 0.5);
        assert_feq(next.vel.y, 1.0 + p.gravity);
        assert!(next.angle < 0.0);
        assert_eq!(next.fuel, 0.0);
    }

    #[test]
    fn test_ceiling_pins_craft() {
        let p = physics();
        let state = craft().with_pos(450.0, 21.0).with_vel(0.0, -5.0);
        let next = step(&state, &ControlInput::default(), SIM_DT, &p);
        assert_eq!(next.pos.y, 20.0);
        assert_eq!(next.vel.y, 0.0);

        let open = PhysicsConfig {
            ceiling_y: None,
            ..p
        };
        let next = step(&state, &ControlInput::default(), SIM_DT, &open);
        assert!(next.pos.y < 20.0);
    }

    fn controls_strategy() -> impl Strategy<Value = ControlInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(thrust, rotate_left, rotate_right, strafe_left, strafe_right)| ControlInput {
                thrust,
                rotate_left,
                rotate_right,
                strafe_left,
                strafe_right,
            },
        )
    }

    proptest! {
        #[test]
        fn fuel_is_monotonic_and_non_negative(
            fuel in 0.0f64..20.0,
            inputs in proptest::collection::vec(controls_strategy(), 1..200),
        ) {
            let p = physics();
            let mut state = craft().with_fuel(fuel);
            for controls in &inputs {
                let next = step(&state, controls, SIM_DT, &p);
                prop_assert!(next.fuel <= state.fuel);
                prop_assert!(next.fuel >= 0.0);
                prop_assert!((-std::f64::consts::PI..std::f64::consts::PI).contains(&next.angle));
                prop_assert!(next.angular_vel.abs() <= p.max_angular_rate);
                state = next;
            }
        }

        #[test]
        fn empty_tank_ignores_engines(controls in controls_strategy(), vx in -3.0f64..3.0, vy in -3.0f64..3.0) {
            let p = physics();
            let empty = craft().with_fuel(0.0).with_vel(vx, vy);
            let coasting = ControlInput { thrust: false, strafe_left: false, strafe_right: false, ..controls };
            prop_assert_eq!(
                step(&empty, &controls, SIM_DT, &p),
                step(&empty, &coasting, SIM_DT, &p)
            );
        }
    }
}
