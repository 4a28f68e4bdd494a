// ABOUTME: Water column grid - depth, left/top edge flows, and precomputed terrain elevation
// ABOUTME: Sized one smaller than the terrain grid in each axis; rebuilt whenever the scenario resets

use crate::engine::core::{BoxConfig, HeightMap, Terrain, Vec2};

/// Dense grid of water columns, `Wc x Dc` where `Wc = W - 1`, `Dc = D - 1`.
///
/// Four parallel [`HeightMap`]s back the column fields rather than a
/// `Vec<WaterColumn>` of structs, matching this engine's usual
/// struct-of-arrays layout for per-cell simulation state.
pub struct WaterGrid {
    width: usize,
    depth: usize,
    pub(crate) depths: HeightMap,
    pub(crate) l_flow: HeightMap,
    pub(crate) t_flow: HeightMap,
    terrain_h: HeightMap,
    pub grid_space: Vec2,
    pub pipe_len: Vec2,
    pub grid_area: f32,
}

impl WaterGrid {
    /// Builds an empty (all-zero) column grid sized from `cfg`, with
    /// `terrainH` precomputed once from `terrain` as the average of the
    /// four surrounding terrain-grid heights.
    pub fn new(cfg: &BoxConfig, terrain: &Terrain) -> Self {
        let width = cfg.water_width();
        let depth = cfg.water_depth();

        let grid_space = Vec2::new(
            cfg.width as f32 / width as f32,
            cfg.depth as f32 / depth as f32,
        );
        let pipe_len = grid_space.scale(1.0 / 1.5);
        let grid_area = grid_space.x * grid_space.y;

        let mut terrain_h = HeightMap::new(width, depth, 0.0);
        for v in 0..depth {
            for u in 0..width {
                let h = (terrain.height(u, v)
                    + terrain.height(u + 1, v)
                    + terrain.height(u, v + 1)
                    + terrain.height(u + 1, v + 1))
                    / 4.0;
                terrain_h.set(u, v, h);
            }
        }

        Self {
            width,
            depth,
            depths: HeightMap::new(width, depth, 0.0),
            l_flow: HeightMap::new(width, depth, 0.0),
            t_flow: HeightMap::new(width, depth, 0.0),
            terrain_h,
            grid_space,
            pipe_len,
            grid_area,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn depth_at(&self, u: usize, v: usize) -> f32 {
        self.depths.get(u, v)
    }

    #[inline]
    pub fn set_depth(&mut self, u: usize, v: usize, value: f32) {
        self.depths.set(u, v, value);
    }

    #[inline]
    pub fn add_depth(&mut self, u: usize, v: usize, delta: f32) {
        let cur = self.depths.get(u, v);
        self.depths.set(u, v, cur + delta);
    }

    #[inline]
    pub fn terrain_h(&self, u: usize, v: usize) -> f32 {
        self.terrain_h.get(u, v)
    }

    #[inline]
    pub fn l_flow(&self, u: usize, v: usize) -> f32 {
        self.l_flow.get(u, v)
    }

    #[inline]
    pub fn t_flow(&self, u: usize, v: usize) -> f32 {
        self.t_flow.get(u, v)
    }

    /// Total surface altitude of column `(u, v)`: `terrainH + depth`.
    #[inline]
    pub fn surface(&self, u: usize, v: usize) -> f32 {
        self.terrain_h.get(u, v) + self.depths.get(u, v)
    }

    /// Clears flows and depths, ready for a scenario's own initial
    /// condition to be applied. Called on every `setScenario`.
    pub fn reset(&mut self) {
        self.depths.fill(0.0);
        self.l_flow.fill(0.0);
        self.t_flow.fill(0.0);
    }

    /// Total water volume across the grid, `Σ depth * gridArea`.
    pub fn total_volume(&self) -> f64 {
        self.depths.iter().map(|d| d as f64).sum::<f64>() * self.grid_area as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::idw::ControlPoint;

    #[test]
    fn terrain_h_averages_four_corners() {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let terrain = Terrain::build(&[], &cfg);
        let grid = WaterGrid::new(&cfg, &terrain);
        assert_eq!(grid.terrain_h(10, 10), 0.0);
    }

    #[test]
    fn reset_zeroes_all_fields() {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let points = vec![ControlPoint::new(10, 20, 10)];
        let terrain = Terrain::build(&points, &cfg);
        let mut grid = WaterGrid::new(&cfg, &terrain);
        grid.set_depth(5, 5, 3.0);
        grid.reset();
        assert_eq!(grid.depth_at(5, 5), 0.0);
    }

    #[test]
    fn dimensions_are_one_less_than_terrain() {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let terrain = Terrain::build(&[], &cfg);
        let grid = WaterGrid::new(&cfg, &terrain);
        assert_eq!(grid.width(), 63);
        assert_eq!(grid.depth(), 63);
    }
}
