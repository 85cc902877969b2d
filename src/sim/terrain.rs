//! Procedural terrain and landing pad
//!
//! Terrain is a polyline of evenly spaced vertices with bounded slope. One run
//! of segments is flattened into the pad. Generation is a pure function of
//! the seed: the same seed always rebuilds the same ground.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::TerrainConfig;

/// Ground profile, ordered by strictly increasing x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    points: Vec<DVec2>,
}

impl Terrain {
    /// Build terrain from explicit vertices (must be sorted by x, at least two)
    pub fn from_points(points: Vec<DVec2>) -> Self {
        debug_assert!(points.len() >= 2, "terrain needs at least one segment");
        debug_assert!(
            points.windows(2).all(|w| w[0].x < w[1].x),
            "terrain vertices must be strictly increasing in x"
        );
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Leftmost x of the playable span
    pub fn min_x(&self) -> f64 {
        self.points.first().map(|p| p.x).unwrap_or(0.0)
    }

    /// Rightmost x of the playable span
    pub fn max_x(&self) -> f64 {
        self.points.last().map(|p| p.x).unwrap_or(0.0)
    }

    /// Whether x lies within the terrain span (edges included)
    #[inline]
    pub fn contains_x(&self, x: f64) -> bool {
        !self.points.is_empty() && x >= self.min_x() && x <= self.max_x()
    }

    /// Adjacent vertex pairs
    pub fn segments(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Ground y at x, linearly interpolated; None off either end
    pub fn ground_height(&self, x: f64) -> Option<f64> {
        if !self.contains_x(x) {
            return None;
        }
        let len = self.points.len();
        if len == 1 {
            return Some(self.points[0].y);
        }
        // First vertex strictly right of x, clamped to a valid segment end
        let i = self.points.partition_point(|p| p.x <= x).clamp(1, len - 1);
        let (a, b) = (self.points[i - 1], self.points[i]);
        let t = (x - a.x) / (b.x - a.x);
        Some(a.y + (b.y - a.y) * t)
    }
}

/// The flat landing zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub x_min: f64,
    pub x_max: f64,
    /// Surface height (screen y)
    pub y: f64,
    /// Terrain vertex indices bounding the pad
    pub first_vertex: usize,
    pub last_vertex: usize,
}

impl Pad {
    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.x_min + self.x_max) * 0.5
    }

    /// Whether x is strictly inside the pad (edges do not count)
    #[inline]
    pub fn contains_x(&self, x: f64) -> bool {
        x > self.x_min && x < self.x_max
    }
}

/// Generate terrain and pad with the default terrain settings
pub fn generate(seed: u64) -> (Terrain, Pad) {
    generate_with(seed, &TerrainConfig::default())
}

/// Generate terrain and pad for a seed
pub fn generate_with(seed: u64, config: &TerrainConfig) -> (Terrain, Pad) {
    let mut rng = Pcg32::seed_from_u64(seed);

    let n = config.segment_count.max(1);
    let seg_w = config.width / n as f64;
    let (lo, hi) = if config.min_y <= config.max_y {
        (config.min_y, config.max_y)
    } else {
        (config.max_y, config.min_y)
    };
    let step = config.max_step.abs();

    // Random walk, clamped into [lo, hi]. Clamping only shortens a step.
    let mut heights = Vec::with_capacity(n + 1);
    let mut y = uniform(&mut rng, config.start_y_min, config.start_y_max).clamp(lo, hi);
    heights.push(y);
    for _ in 0..n {
        y = (y + uniform(&mut rng, -step, step)).clamp(lo, hi);
        heights.push(y);
    }

    // Pad placement: whole segments, inside the pad zone when it fits
    let k = config.pad_segments().min(n);
    let last_start = n - k;
    let zone_lo = ((config.pad_zone_min_x / seg_w).ceil().max(0.0) as usize).min(last_start);
    let zone_end = (config.pad_zone_max_x / seg_w).floor().max(0.0) as usize;
    let (start_lo, start_hi) = if zone_end >= k && zone_lo <= (zone_end - k).min(last_start) {
        (zone_lo, (zone_end - k).min(last_start))
    } else {
        (0, last_start)
    };
    let first = rng.random_range(start_lo..=start_hi);
    let last = first + k;

    let pad_y = heights[first];
    for h in &mut heights[first..=last] {
        *h = pad_y;
    }

    // Re-impose the slope bound walking away from the pad
    for i in (last + 1)..=n {
        let prev = heights[i - 1];
        heights[i] = heights[i].clamp(prev - step, prev + step);
    }
    for i in (0..first).rev() {
        let next = heights[i + 1];
        heights[i] = heights[i].clamp(next - step, next + step);
    }

    let points: Vec<DVec2> = heights
        .iter()
        .enumerate()
        .map(|(i, &h)| DVec2::new(i as f64 * seg_w, h))
        .collect();

    let pad = Pad {
        x_min: points[first].x,
        x_max: points[last].x,
        y: pad_y,
        first_vertex: first,
        last_vertex: last,
    };

    log::debug!(
        "Generated terrain for seed {}: {} vertices, pad x=[{:.1}, {:.1}] y={:.1}",
        seed,
        points.len(),
        pad.x_min,
        pad.x_max,
        pad.y
    );

    (Terrain { points }, pad)
}

/// Uniform draw in [a, b]; collapses to a when the range is empty or unbounded
fn uniform(rng: &mut Pcg32, a: f64, b: f64) -> f64 {
    if a < b && (b - a).is_finite() { rng.random_range(a..=b) } else { a }
}
