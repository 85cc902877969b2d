//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, owned by the caller (no process-wide randomness)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod physics;
pub mod session;
pub mod state;
pub mod terrain;
pub mod tick;

pub use clock::FixedTimestep;
pub use collision::LandingEvaluator;
pub use physics::{ControlInput, step};
pub use session::{Session, SessionCommand, Snapshot, spawn_craft};
pub use state::{CraftState, CrashReason, GamePhase, Outcome, Touchdown};
pub use terrain::{Pad, Terrain, generate, generate_with};
pub use tick::{TickInput, tick};
