// ABOUTME: Terrain store - owns the synthesized elevation grid and its cached extremes
// ABOUTME: Built once from a validated control-point set, then queried read-only for the rest of the run

use super::box_config::BoxConfig;
use super::heightmap::HeightMap;
use super::idw::{augment_with_rim, build_heightfield, ControlPoint};

/// Immutable elevation grid plus the altitude extremes used by scenarios
/// (`EvenRise` rises from the minimum, `Drain` floods from the maximum).
///
/// The extremes are computed once at construction rather than rescanned
/// every tick, since the grid never changes after the map is built.
#[derive(Clone, Debug)]
pub struct Terrain {
    heights: HeightMap,
    min_height: f32,
    max_height: f32,
}

impl Terrain {
    /// Builds a terrain grid from validated, deduplicated control points.
    /// Rim control points pinning the perimeter to zero are added here;
    /// callers supply only the user-authored points.
    pub fn build(points: &[ControlPoint], cfg: &BoxConfig) -> Self {
        let mut augmented = points.to_vec();
        augment_with_rim(&mut augmented, cfg);
        let heights = build_heightfield(&augmented, cfg);

        let (min_height, max_height) = heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| {
                (lo.min(h), hi.max(h))
            });

        Self {
            heights,
            min_height,
            max_height,
        }
    }

    /// Altitude at grid cell `(x, z)`. Panics (debug) / clamps (release)
    /// on out-of-range input via `HeightMap::get`'s own bounds contract.
    #[inline]
    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.heights.get(x, z)
    }

    /// Altitude at the nearest grid cell to continuous coordinates
    /// `(xf, zf)`, or `None` if they fall outside the grid.
    pub fn near_height(&self, xf: f32, zf: f32) -> Option<f32> {
        if xf < 0.0 || zf < 0.0 {
            return None;
        }
        let x = xf.round() as usize;
        let z = zf.round() as usize;
        if x >= self.heights.width() || z >= self.heights.height() {
            return None;
        }
        Some(self.heights.get(x, z))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.heights.width()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.heights.height()
    }

    #[inline]
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    #[inline]
    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn heights(&self) -> &HeightMap {
        &self.heights
    }
}
