// ABOUTME: Fixed simulation box geometry - dimensions, ground slab depth, and IDW tuning
// ABOUTME: Single explicit configuration value threaded through terrain and water construction

/// Geometry and tuning knobs for one simulation instance.
///
/// Everything the IDW builder and the water solver need to know about the
/// shape of the world lives here, rather than as scattered constants, so a
/// map can be rebuilt at a different resolution without touching the
/// algorithms themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConfig {
    /// Grid width (x extent) of the terrain grid, `W`.
    pub width: usize,
    /// Vertical extent of the box (altitude range), `H`.
    pub height: usize,
    /// Grid depth (z extent) of the terrain grid, `D`.
    pub depth: usize,
    /// Depth of the ground slab beneath altitude zero, `G`.
    pub ground_depth: usize,
    /// Stride between synthetic rim control points, `S`.
    pub rim_stride: usize,
    /// Number of nearest neighbors considered by IDW, `k`.
    pub idw_neighbors: usize,
    /// Maximum number of user-supplied control points.
    pub max_user_points: usize,
    /// Gravitational acceleration used by the pipe-flow solver.
    pub gravity: f32,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            depth: 64,
            ground_depth: 24,
            rim_stride: 8,
            idw_neighbors: 16,
            max_user_points: 50,
            gravity: 9.81,
        }
    }
}

impl BoxConfig {
    pub fn new(width: usize, height: usize, depth: usize, ground_depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            ground_depth,
            ..Self::default()
        }
    }

    /// Number of water columns along x, `Wc = W - 1`.
    #[inline]
    pub fn water_width(&self) -> usize {
        self.width - 1
    }

    /// Number of water columns along z, `Dc = D - 1`.
    #[inline]
    pub fn water_depth(&self) -> usize {
        self.depth - 1
    }

    /// Lowest altitude representable in the box (bottom of the ground slab).
    #[inline]
    pub fn min_altitude(&self) -> i64 {
        -(self.ground_depth as i64)
    }

    /// Highest altitude representable in the box.
    #[inline]
    pub fn max_altitude(&self) -> i64 {
        (self.height - self.ground_depth) as i64
    }
}
