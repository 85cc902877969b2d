//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically: command, then
//! physics, then landing evaluation, then the phase transition.

use serde::{Deserialize, Serialize};

use super::physics::{self, ControlInput};
use super::session::{Session, SessionCommand};
use super::state::GamePhase;

/// Input for a single tick, sampled once at the tick boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held controls
    pub controls: ControlInput,
    /// One-shot retry/new-terrain request
    pub command: Option<SessionCommand>,
}

impl TickInput {
    pub fn controls(controls: ControlInput) -> Self {
        Self {
            controls,
            command: None,
        }
    }

    pub fn command(command: SessionCommand) -> Self {
        Self {
            controls: ControlInput::default(),
            command: Some(command),
        }
    }
}

/// Advance the session by one fixed timestep and return the resulting phase
pub fn tick(session: &mut Session, input: &TickInput) -> GamePhase {
    // An accepted command resets the attempt and consumes the tick
    if let Some(command) = input.command {
        if session.request(command) {
            return session.phase;
        }
    }

    // Landed/Crashed are terminal until a command arrives
    if !session.phase.is_flying() {
        return session.phase;
    }

    session.time_ticks += 1;

    let config = &session.settings.physics;
    session.craft = physics::step(&session.craft, &input.controls, config.dt, config);

    let outcome = session
        .evaluator
        .evaluate(&session.craft, &session.terrain, &session.pad);
    if outcome.is_terminal() {
        session.finish(outcome);
    }

    session.phase
}
