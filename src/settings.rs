//! Game settings and tuning
//!
//! Every constant the simulation uses lives here so it can be tuned or tested
//! independently. Settings load from JSON; missing fields fall back to the
//! defaults, so a file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Settings loading/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Direction the lateral thrusters push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RcsFrame {
    /// Along world ±x regardless of craft orientation
    #[default]
    World,
    /// Along the craft's own right vector
    Body,
}

impl RcsFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            RcsFrame::World => "World",
            RcsFrame::Body => "Body",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "world" => Some(RcsFrame::World),
            "body" | "craft" => Some(RcsFrame::Body),
            _ => None,
        }
    }
}

/// Where a fresh craft appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpawnAnchor {
    /// Horizontal centre of the world
    #[default]
    TopCenter,
    /// Above the pad centre, offset by a seeded jitter
    AbovePad,
}

impl SpawnAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnAnchor::TopCenter => "TopCenter",
            SpawnAnchor::AbovePad => "AbovePad",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "center" | "topcenter" | "top-center" => Some(SpawnAnchor::TopCenter),
            "pad" | "abovepad" | "above-pad" => Some(SpawnAnchor::AbovePad),
            _ => None,
        }
    }
}

/// Integrator constants (per-frame units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed tick length in frames
    pub dt: f64,
    pub gravity: f64,
    pub main_thrust: f64,
    pub rcs_thrust: f64,
    /// Angular acceleration while a rotate input is held (rad/frame²)
    pub angular_accel: f64,
    /// Angular rate cap (rad/frame)
    pub max_angular_rate: f64,
    /// Fuel per frame with the main engine lit
    pub main_burn_rate: f64,
    /// Fuel per frame with a lateral thruster lit
    pub rcs_burn_rate: f64,
    pub rcs_frame: RcsFrame,
    /// Highest y the craft may reach; None disables the ceiling
    pub ceiling_y: Option<f64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            dt: SIM_DT,
            gravity: GRAVITY,
            main_thrust: MAIN_THRUST,
            rcs_thrust: RCS_THRUST,
            angular_accel: 0.5f64.to_radians(),
            max_angular_rate: 2.0f64.to_radians(), // 120°/s at 60 Hz
            main_burn_rate: MAIN_BURN_PER_FRAME,
            rcs_burn_rate: RCS_BURN_PER_FRAME,
            rcs_frame: RcsFrame::World,
            ceiling_y: Some(20.0),
        }
    }
}

/// Terrain generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: f64,
    pub segment_count: usize,
    /// Range for the first vertex height
    pub start_y_min: f64,
    pub start_y_max: f64,
    /// Hard height bounds for every vertex
    pub min_y: f64,
    pub max_y: f64,
    /// Largest height change between adjacent vertices
    pub max_step: f64,
    /// Minimum pad width (rounded up to whole segments)
    pub pad_width: f64,
    /// The pad is placed inside [pad_zone_min_x, pad_zone_max_x] when it fits
    pub pad_zone_min_x: f64,
    pub pad_zone_max_x: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            segment_count: 30,
            start_y_min: WORLD_HEIGHT * 0.45,
            start_y_max: WORLD_HEIGHT * 0.7,
            min_y: WORLD_HEIGHT * 0.35,
            max_y: WORLD_HEIGHT * 0.85,
            max_step: 35.0,
            pad_width: PAD_WIDTH,
            pad_zone_min_x: WORLD_WIDTH * 0.15,
            pad_zone_max_x: WORLD_WIDTH * 0.8,
        }
    }
}

impl TerrainConfig {
    /// Horizontal length of one terrain segment
    #[inline]
    pub fn segment_width(&self) -> f64 {
        self.width / self.segment_count as f64
    }

    /// Number of segments the pad covers
    pub fn pad_segments(&self) -> usize {
        let k = (self.pad_width / self.segment_width()).ceil();
        (k.max(1.0) as usize).min(self.segment_count.max(1))
    }
}

/// Lander footprint and tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftGeometry {
    /// Right foot offset from the centre; the left foot mirrors it in x
    pub foot_offset: DVec2,
    pub hull_half_width: f64,
    pub hull_half_height: f64,
    pub fuel_capacity: f64,
}

impl Default for CraftGeometry {
    fn default() -> Self {
        Self {
            foot_offset: DVec2::new(17.0, 14.0),
            hull_half_width: 9.0,
            hull_half_height: 14.0,
            fuel_capacity: FUEL_CAPACITY,
        }
    }
}

impl CraftGeometry {
    /// Left and right foot, in the craft's local frame
    pub fn local_feet(&self) -> [DVec2; 2] {
        let f = self.foot_offset;
        [DVec2::new(-f.x, f.y), f]
    }

    /// Nose and the two bottom hull corners, in the craft's local frame
    pub fn local_hull(&self) -> [DVec2; 3] {
        let (w, h) = (self.hull_half_width, self.hull_half_height);
        [DVec2::new(0.0, -h), DVec2::new(-w, h), DVec2::new(w, h)]
    }

    /// Distance between the two feet
    #[inline]
    pub fn footprint_width(&self) -> f64 {
        2.0 * self.foot_offset.x.abs()
    }
}

/// Touchdown limits (inclusive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingTolerances {
    /// Largest tilt from upright, degrees
    pub max_angle_deg: f64,
    /// Largest |vx|
    pub max_vx: f64,
    /// Largest downward vy
    pub max_vy: f64,
}

impl Default for LandingTolerances {
    fn default() -> Self {
        Self {
            max_angle_deg: MAX_LAND_ANGLE_DEG,
            max_vx: MAX_LAND_VX,
            max_vy: MAX_LAND_VY,
        }
    }
}

/// Spawn placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub anchor: SpawnAnchor,
    pub y: f64,
    /// Lateral offset range around the pad centre (AbovePad only)
    pub jitter: f64,
    /// Initial |vx| bound
    pub max_drift: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            anchor: SpawnAnchor::TopCenter,
            y: 120.0,
            jitter: 80.0,
            max_drift: 0.6,
        }
    }
}

/// Session score rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub landing_base: u64,
    pub crash_penalty: u64,
    /// Bonus for a perfectly soft touchdown
    pub softness_bonus: f64,
    /// Bonus lost per unit of touchdown |vy|
    pub softness_per_vy: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            landing_base: 100,
            crash_penalty: 50,
            softness_bonus: 20.0,
            softness_per_vy: 4.0,
        }
    }
}

/// All tunable game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsConfig,
    pub terrain: TerrainConfig,
    pub craft: CraftGeometry,
    pub tolerances: LandingTolerances,
    pub spawn: SpawnConfig,
    pub scoring: ScoringConfig,
    /// Pad width required beyond the footprint
    pub pad_margin: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            terrain: TerrainConfig::default(),
            craft: CraftGeometry::default(),
            tolerances: LandingTolerances::default(),
            spawn: SpawnConfig::default(),
            scoring: ScoringConfig::default(),
            pad_margin: PAD_MARGIN,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let p = &self.physics;
        let t = &self.terrain;

        if !(p.dt > 0.0 && p.dt.is_finite()) {
            return invalid(format!("physics.dt must be positive, got {}", p.dt));
        }
        if p.main_burn_rate < 0.0 || p.rcs_burn_rate < 0.0 {
            return invalid("burn rates must be non-negative".to_string());
        }
        if p.max_angular_rate < 0.0 || p.angular_accel < 0.0 {
            return invalid("angular limits must be non-negative".to_string());
        }
        if t.segment_count < 2 {
            return invalid(format!(
                "terrain.segment_count must be at least 2, got {}",
                t.segment_count
            ));
        }
        if !(t.width > 0.0 && t.width.is_finite()) {
            return invalid(format!("terrain.width must be positive, got {}", t.width));
        }
        if !(t.min_y <= t.start_y_min && t.start_y_min <= t.start_y_max && t.start_y_max <= t.max_y)
        {
            return invalid(format!(
                "terrain heights must satisfy min_y <= start_y_min <= start_y_max <= max_y \
                 ({} / {} / {} / {})",
                t.min_y, t.start_y_min, t.start_y_max, t.max_y
            ));
        }
        if !(t.start_y_max - t.start_y_min).is_finite() {
            return invalid("terrain start height range must be finite".to_string());
        }
        if !(t.max_step >= 0.0 && (2.0 * t.max_step).is_finite()) {
            return invalid(format!("terrain.max_step must be non-negative and finite, got {}", t.max_step));
        }
        let needed = self.craft.footprint_width() + self.pad_margin;
        if t.pad_width < needed {
            return invalid(format!(
                "terrain.pad_width {} is narrower than footprint + margin ({})",
                t.pad_width, needed
            ));
        }
        if t.pad_width > t.width {
            return invalid(format!(
                "terrain.pad_width {} exceeds terrain width {}",
                t.pad_width, t.width
            ));
        }
        if self.craft.fuel_capacity < 0.0 {
            return invalid("craft.fuel_capacity must be non-negative".to_string());
        }
        let tol = &self.tolerances;
        if tol.max_angle_deg < 0.0 || tol.max_vx < 0.0 || tol.max_vy < 0.0 {
            return invalid("landing tolerances must be non-negative".to_string());
        }
        let spawn = &self.spawn;
        for (name, range) in [("jitter", spawn.jitter), ("max_drift", spawn.max_drift)] {
            if !(range >= 0.0 && (2.0 * range).is_finite()) {
                return invalid(format!("spawn.{name} must be non-negative and finite, got {range}"));
            }
        }
        Ok(())
    }
}
