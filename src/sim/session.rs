//! Game session state machine
//!
//! A session owns everything one player needs: the seed, terrain and pad, the
//! craft, the current phase and the running score. Nothing here is global;
//! hosts pass the session to `tick` each frame.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::LandingEvaluator;
use super::state::{CraftState, GamePhase, Outcome, Touchdown};
use super::terrain::{self, Pad, Terrain};
use crate::settings::{Settings, SpawnAnchor};

/// PCG stream for spawn placement (kept apart from the terrain draws)
const SPAWN_STREAM: u64 = 0x5eed_0001;
/// PCG stream for choosing the next terrain seed
const SEED_STREAM: u64 = 0x5eed_0002;

/// Requests from the player between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    /// Same terrain, fresh craft
    Retry,
    /// Fresh seed, fresh terrain, fresh craft
    NewTerrain,
}

/// One player's game
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) settings: Settings,
    pub(crate) seed: u64,
    pub(crate) terrain: Terrain,
    pub(crate) pad: Pad,
    pub(crate) craft: CraftState,
    pub(crate) phase: GamePhase,
    pub(crate) touchdown: Option<Touchdown>,
    pub(crate) score: u64,
    pub(crate) best: u64,
    pub(crate) attempt: u32,
    /// Ticks simulated in the current attempt
    pub(crate) time_ticks: u64,
    pub(crate) evaluator: LandingEvaluator,
    seed_rng: Pcg32,
}

impl Session {
    /// Start a session on the terrain for `seed`
    ///
    /// `settings` should already have passed [`Settings::validate`]; anything
    /// else is logged and simulated as far as it makes sense.
    pub fn new(seed: impl Into<u64>, settings: Settings) -> Self {
        let seed = seed.into();
        if let Err(e) = settings.validate() {
            log::warn!("Starting session with invalid settings: {}", e);
        }
        let (terrain, pad) = terrain::generate_with(seed, &settings.terrain);
        let craft = spawn_craft(seed, &terrain, &pad, &settings);
        let evaluator = LandingEvaluator::from_settings(&settings);

        log::info!(
            "Session started: seed {}, pad x=[{:.0}, {:.0}] y={:.0}",
            seed,
            pad.x_min,
            pad.x_max,
            pad.y
        );

        Self {
            settings,
            seed,
            terrain,
            pad,
            craft,
            phase: GamePhase::Flying,
            touchdown: None,
            score: 0,
            best: 0,
            attempt: 1,
            time_ticks: 0,
            evaluator,
            seed_rng: Pcg32::new(seed, SEED_STREAM),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    pub fn craft(&self) -> &CraftState {
        &self.craft
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Conditions at the last contact, if the attempt has ended
    pub fn touchdown(&self) -> Option<&Touchdown> {
        self.touchdown.as_ref()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// 1-based attempt counter
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn evaluator(&self) -> &LandingEvaluator {
        &self.evaluator
    }

    /// Where a fresh craft starts on the current terrain
    pub fn spawn_state(&self) -> CraftState {
        spawn_craft(self.seed, &self.terrain, &self.pad, &self.settings)
    }

    /// Apply a retry/new-terrain request
    ///
    /// Only honoured once the attempt has ended; returns whether it was applied.
    pub fn request(&mut self, command: SessionCommand) -> bool {
        if self.phase.is_flying() {
            log::debug!("Ignoring {:?} while flying", command);
            return false;
        }

        match command {
            SessionCommand::Retry => {
                log::info!("Retrying seed {}", self.seed);
            }
            SessionCommand::NewTerrain => {
                let previous = self.seed;
                let seed = loop {
                    let candidate: u64 = self.seed_rng.random();
                    if candidate != previous {
                        break candidate;
                    }
                };
                let (terrain, pad) = terrain::generate_with(seed, &self.settings.terrain);
                self.seed = seed;
                self.terrain = terrain;
                self.pad = pad;
                log::info!(
                    "New terrain: seed {}, pad x=[{:.0}, {:.0}] y={:.0}",
                    seed,
                    pad.x_min,
                    pad.x_max,
                    pad.y
                );
            }
        }

        self.reset_craft();
        true
    }

    fn reset_craft(&mut self) {
        self.craft = self.spawn_state();
        self.phase = GamePhase::Flying;
        self.touchdown = None;
        self.time_ticks = 0;
        self.attempt += 1;
    }

    /// Record a terminal outcome: touchdown, settle the craft, update score
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        debug_assert!(outcome.is_terminal());
        let touchdown = Touchdown {
            vel: self.craft.vel,
            angle: self.craft.angle,
            fuel: self.craft.fuel,
            tick: self.time_ticks,
        };

        // Rest the craft on the surface for display
        if let Some(depth) = self.evaluator.contact_depth(&self.craft, &self.terrain) {
            self.craft.pos.y -= depth;
        }
        self.craft.vel = DVec2::ZERO;
        self.craft.angular_vel = 0.0;

        let scoring = &self.settings.scoring;
        match outcome {
            Outcome::Landed => {
                let fuel_bonus = touchdown.fuel.max(0.0).floor() as u64;
                let softness = (scoring.softness_bonus
                    - touchdown.vel.y.abs() * scoring.softness_per_vy)
                    .floor()
                    .max(0.0) as u64;
                self.score += scoring.landing_base + fuel_bonus + softness;
                self.best = self.best.max(self.score);
                log::info!(
                    "Touchdown! vx={:.2} vy={:.2} angle={:.1}° fuel={:.1} score={}",
                    touchdown.vel.x,
                    touchdown.vel.y,
                    touchdown.angle.to_degrees(),
                    touchdown.fuel,
                    self.score
                );
            }
            Outcome::Crashed(reason) => {
                self.score = self.score.saturating_sub(scoring.crash_penalty);
                log::info!(
                    "Crashed: {} (vx={:.2} vy={:.2} angle={:.1}°) score={}",
                    reason,
                    touchdown.vel.x,
                    touchdown.vel.y,
                    touchdown.angle.to_degrees(),
                    self.score
                );
            }
            Outcome::Flying => {}
        }

        self.touchdown = Some(touchdown);
        self.phase = GamePhase::from(outcome);
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot<'_> {
        let capacity = self.settings.craft.fuel_capacity;
        Snapshot {
            tick: self.time_ticks,
            seed: self.seed,
            attempt: self.attempt,
            phase: self.phase,
            craft: &self.craft,
            fuel_fraction: if capacity > 0.0 {
                (self.craft.fuel / capacity).clamp(0.0, 1.0)
            } else {
                0.0
            },
            terrain: &self.terrain,
            pad: &self.pad,
            touchdown: self.touchdown.as_ref(),
            score: self.score,
            best: self.best,
        }
    }
}

/// Everything a renderer draws for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub seed: u64,
    pub attempt: u32,
    pub phase: GamePhase,
    pub craft: &'a CraftState,
    pub fuel_fraction: f64,
    pub terrain: &'a Terrain,
    pub pad: &'a Pad,
    pub touchdown: Option<&'a Touchdown>,
    pub score: u64,
    pub best: u64,
}

/// Fresh craft for a seed; the same seed always spawns the same way
pub fn spawn_craft(seed: u64, terrain: &Terrain, pad: &Pad, settings: &Settings) -> CraftState {
    let mut rng = Pcg32::new(seed, SPAWN_STREAM);
    let spawn = &settings.spawn;

    let anchor_x = match spawn.anchor {
        SpawnAnchor::TopCenter => (terrain.min_x() + terrain.max_x()) * 0.5,
        SpawnAnchor::AbovePad => pad.center_x() + symmetric(&mut rng, spawn.jitter),
    };
    let drift = symmetric(&mut rng, spawn.max_drift);

    // Both feet must start over the terrain
    let half = settings.craft.foot_offset.x.abs();
    let (lo, hi) = (terrain.min_x() + half, terrain.max_x() - half);
    let x = if lo <= hi {
        anchor_x.clamp(lo, hi)
    } else {
        (terrain.min_x() + terrain.max_x()) * 0.5
    };

    CraftState {
        pos: DVec2::new(x, spawn.y),
        vel: DVec2::new(drift, 0.0),
        angle: 0.0,
        angular_vel: 0.0,
        fuel: settings.craft.fuel_capacity.max(0.0),
    }
}

/// Uniform draw in [-range, range]; zero when the span is empty or unbounded
fn symmetric(rng: &mut Pcg32, range: f64) -> f64 {
    if range > 0.0 && (2.0 * range).is_finite() {
        rng.random_range(-range..=range)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CrashReason;

    fn session() -> Session {
        Session::new(42u64, Settings::default())
    }

    #[test]
    fn test_new_session_is_flying_at_spawn() {
        let s = session();
        assert!(s.phase().is_flying());
        assert_eq!(*s.craft(), s.spawn_state());
        assert_eq!(s.craft().pos.x, 450.0);
        assert_eq!(s.craft().pos.y, Settings::default().spawn.y);
        assert!(s.craft().vel.x.abs() <= 0.6);
        assert_eq!(s.craft().vel.y, 0.0);
        assert_eq!(s.craft().fuel, Settings::default().craft.fuel_capacity);
        assert_eq!(s.attempt(), 1);
        assert_eq!(s.touchdown(), None);
    }

    #[test]
    fn test_spawn_is_deterministic_per_seed() {
        let a = Session::new(7u64, Settings::default());
        let b = Session::new(7u64, Settings::default());
        assert_eq!(a.craft(), b.craft());
        assert_eq!(a.terrain(), b.terrain());
    }

    #[test]
    fn test_above_pad_spawn_within_jitter() {
        let mut settings = Settings::default();
        settings.spawn.anchor = SpawnAnchor::AbovePad;
        for seed in 0..50u64 {
            let s = Session::new(seed, settings.clone());
            let dx = s.craft().pos.x - s.pad().center_x();
            assert!(dx.abs() <= settings.spawn.jitter + 1e-9, "seed {seed}: dx={dx}");
        }
    }

    #[test]
    fn test_no_drift_when_disabled() {
        let mut settings = Settings::default();
        settings.spawn.max_drift = 0.0;
        let s = Session::new(3u64, settings);
        assert_eq!(s.craft().vel, DVec2::ZERO);
    }

    #[test]
    fn test_commands_ignored_while_flying() {
        let mut s = session();
        let before = s.craft;
        assert!(!s.request(SessionCommand::Retry));
        assert!(!s.request(SessionCommand::NewTerrain));
        assert_eq!(s.seed(), 42);
        assert_eq!(s.craft, before);
        assert_eq!(s.attempt(), 1);
    }

    #[test]
    fn test_retry_keeps_terrain() {
        let mut s = session();
        let terrain = s.terrain().clone();
        let pad = *s.pad();
        s.craft.pos.y += 50.0;
        s.finish(Outcome::Crashed(CrashReason::TooFastVertical));
        assert_eq!(s.phase(), GamePhase::Crashed(CrashReason::TooFastVertical));

        assert!(s.request(SessionCommand::Retry));
        assert!(s.phase().is_flying());
        assert_eq!(*s.terrain(), terrain);
        assert_eq!(*s.pad(), pad);
        assert_eq!(*s.craft(), s.spawn_state());
        assert_eq!(s.attempt(), 2);
        assert_eq!(s.touchdown(), None);
    }

    #[test]
    fn test_new_terrain_changes_seed() {
        let mut s = session();
        let old_terrain = s.terrain().clone();
        s.finish(Outcome::Landed);
        assert!(s.request(SessionCommand::NewTerrain));
        assert_ne!(s.seed(), 42);
        assert_ne!(*s.terrain(), old_terrain);
        let (terrain, pad) = terrain::generate_with(s.seed(), &s.settings().terrain);
        assert_eq!(*s.terrain(), terrain);
        assert_eq!(*s.pad(), pad);
        assert!(s.phase().is_flying());
    }

    #[test]
    fn test_new_terrain_sequence_is_reproducible() {
        let mut a = session();
        let mut b = session();
        for _ in 0..3 {
            a.finish(Outcome::Landed);
            b.finish(Outcome::Landed);
            a.request(SessionCommand::NewTerrain);
            b.request(SessionCommand::NewTerrain);
            assert_eq!(a.seed(), b.seed());
        }
    }

    #[test]
    fn test_landing_score() {
        let mut s = session();
        s.craft = s.craft.with_fuel(42.7).with_vel(0.4, 1.5);
        s.finish(Outcome::Landed);
        // 100 base + 42 fuel + floor(20 - 1.5 * 4)
        assert_eq!(s.score(), 100 + 42 + 14);
        assert_eq!(s.best(), s.score());
        let td = s.touchdown().unwrap();
        assert_eq!(td.vel, DVec2::new(0.4, 1.5));
        assert_eq!(s.craft().vel, DVec2::ZERO);
    }

    #[test]
    fn test_hard_landing_gets_no_softness_bonus() {
        let mut s = session();
        s.craft = s.craft.with_fuel(0.0).with_vel(0.0, 6.0);
        s.finish(Outcome::Landed);
        assert_eq!(s.score(), 100);
    }

    #[test]
    fn test_crash_penalty_saturates() {
        let mut s = session();
        s.finish(Outcome::Crashed(CrashReason::MissedPad));
        assert_eq!(s.score(), 0);

        s.request(SessionCommand::Retry);
        s.craft = s.craft.with_fuel(10.0).with_vel(0.0, 0.0);
        s.finish(Outcome::Landed);
        assert_eq!(s.score(), 130);
        s.request(SessionCommand::Retry);
        s.finish(Outcome::Crashed(CrashReason::BadAngle));
        assert_eq!(s.score(), 80);
        assert_eq!(s.best(), 130);
    }

    #[test]
    fn test_settles_onto_ground() {
        let mut s = session();
        let pad = *s.pad();
        s.craft = CraftState::default()
            .with_pos(pad.center_x(), pad.y - 14.0 + 3.0)
            .with_vel(0.0, 2.0);
        s.finish(Outcome::Landed);
        let [left, right] = s.craft().feet(&s.settings().craft);
        assert!((left.y - pad.y).abs() < 1e-9);
        assert!((right.y - pad.y).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_spawn_ranges_do_not_panic() {
        let mut settings = Settings::default();
        settings.spawn.anchor = SpawnAnchor::AbovePad;
        settings.spawn.jitter = 1e308;
        settings.spawn.max_drift = f64::INFINITY;
        let s = Session::new(42u64, settings);
        assert_eq!(s.craft().pos.x, s.pad().center_x());
        assert_eq!(s.craft().vel, DVec2::ZERO);
    }

    #[test]
    fn test_unvalidated_segment_count_still_has_a_pad() {
        let mut settings = Settings::default();
        settings.terrain.segment_count = 0;
        let s = Session::new(42u64, settings);
        assert!(s.pad().width() > 0.0);
        assert!(s.phase().is_flying());
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = session();
        let snap = s.snapshot();
        assert_eq!(snap.fuel_fraction, 1.0);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["phase"], "Flying");
        assert_eq!(
            json["terrain"]["points"].as_array().unwrap().len(),
            s.terrain().points().len()
        );
    }
}
