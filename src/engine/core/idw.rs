// ABOUTME: Inverse-distance-weighting heightfield builder for the terrain grid
// ABOUTME: Builds a dense W x D elevation grid from <=50 scattered control points plus rim pins

use super::box_config::BoxConfig;
use super::heightmap::HeightMap;

/// A validated control point: `x` and `z` are grid coordinates, `y` is
/// altitude. Carries no identity; the caller is responsible for
/// deduplication before handing points to [`build_heightfield`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl ControlPoint {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

/// Appends the synthetic rim control points `(kS, 0, 0)`, `(kS, 0, D-1)`,
/// `(0, 0, kS)`, `(W-1, 0, kS)` for `k = 0, 1, ...` at stride `S` to pin
/// the perimeter altitude to zero, per spec §3.
pub fn augment_with_rim(points: &mut Vec<ControlPoint>, cfg: &BoxConfig) {
    let stride = cfg.rim_stride.max(1) as i64;
    let w = cfg.width as i64;
    let d = cfg.depth as i64;

    let mut k = 0i64;
    while k * stride < w {
        let x = k * stride;
        points.push(ControlPoint::new(x, 0, 0));
        points.push(ControlPoint::new(x, 0, d - 1));
        k += 1;
    }
    let mut k = 0i64;
    while k * stride < d {
        let z = k * stride;
        points.push(ControlPoint::new(0, 0, z));
        points.push(ControlPoint::new(w - 1, 0, z));
        k += 1;
    }
}

/// Builds the dense `T[z][x]` elevation grid from the augmented point set.
///
/// For each cell: an exact control point at that location short-circuits
/// to its altitude; otherwise the `k` nearest points (Euclidean, in the
/// xz plane) are blended with inverse-distance-squared-squared weights
/// (`1/d^4`), reproducing the steep, quickly-decaying hills the original
/// simulator is tuned for (spec §4.A). Rim cells are forced to zero
/// regardless of interpolation, since a control point could in principle
/// round to a rim cell with a non-zero altitude.
///
/// Grounded on the unified `TerrainGenerator` shape (config + generate) used
/// throughout this engine's terrain-generation module, specialized to the
/// single algorithm this spec calls for.
pub fn build_heightfield(points: &[ControlPoint], cfg: &BoxConfig) -> HeightMap {
    let mut map = HeightMap::new(cfg.width, cfg.depth, 0.0);

    for z in 0..cfg.depth {
        for x in 0..cfg.width {
            let h = if is_rim(x, z, cfg) {
                0.0
            } else {
                interpolate_height(x as i64, z as i64, points, cfg.idw_neighbors)
            };
            map.set(x, z, h);
        }
    }

    map
}

#[inline]
fn is_rim(x: usize, z: usize, cfg: &BoxConfig) -> bool {
    x == 0 || x == cfg.width - 1 || z == 0 || z == cfg.depth - 1
}

fn interpolate_height(x: i64, z: i64, points: &[ControlPoint], k: usize) -> f32 {
    // Exact match: a control point sits directly on this cell.
    if let Some(p) = points.iter().find(|p| p.x == x && p.z == z) {
        return p.y as f32;
    }

    let mut distances: Vec<(f32, f32)> = points
        .iter()
        .map(|p| {
            let dx = (p.x - x) as f32;
            let dz = (p.z - z) as f32;
            ((dx * dx + dz * dz).sqrt(), p.y as f32)
        })
        .collect();

    let n = k.min(distances.len());
    distances.select_nth_unstable_by(n.saturating_sub(1).max(0), |a, b| {
        a.0.partial_cmp(&b.0).unwrap()
    });
    distances.truncate(n.max(1));

    let mut top = 0.0f32;
    let mut bottom = 0.0f32;
    for (dist, height) in distances {
        let d2 = dist * dist;
        let d4 = (d2 * d2).max(f32::EPSILON);
        top += height / d4;
        bottom += 1.0 / d4;
    }

    if bottom == 0.0 { 0.0 } else { top / bottom }
}
