// ABOUTME: Mesh view - derives the water surface/skirt vertex buffers and the static terrain mesh
// ABOUTME: Rebuilt every tick from terrain + water grid; buffers are sized once and repopulated in place

use crate::engine::core::{BoxConfig, Terrain};
use crate::engine::physics::WaterGrid;

/// Below this much water, a vertex fades to fully transparent (spec §4.D).
pub const VISIBILITY_THRESHOLD: f32 = 0.01;

/// A water-surface or skirt vertex handed to the renderer. Deliberately
/// free of any graphics-API type (no macroquad/wgpu/glam) — the renderer
/// is an external collaborator per §1, this crate only owns the data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub visible: f32,
}

impl Default for MeshVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 1.0, 0.0],
            visible: 0.0,
        }
    }
}

/// A terrain vertex, built once per map and never mutated afterward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// Three-stop elevation gradient the original renderer paints terrain
/// with (`#EBD9B1` low, `#9CC335` mid, `#8A808F` high), grounded on
/// `Terrain::_initColors`.
const ELEVATION_COLORS: [[f32; 3]; 3] = [
    [0.92, 0.85, 0.69],
    [0.61, 0.76, 0.2],
    [0.54, 0.5, 0.56],
];

fn elevation_color(ratio: f32) -> [f32; 3] {
    let ratio = ratio.clamp(0.0, 1.0);
    let segments = (ELEVATION_COLORS.len() - 1) as f32;
    let step = 1.0 / segments;
    let idx = ((ratio / step).floor() as usize).min(ELEVATION_COLORS.len() - 2);
    let local_min = step * idx as f32;
    let local = ((ratio - local_min) / step).clamp(0.0, 1.0);
    let a = ELEVATION_COLORS[idx];
    let b = ELEVATION_COLORS[idx + 1];
    [
        a[0] + (b[0] - a[0]) * local,
        a[1] + (b[1] - a[1]) * local,
        a[2] + (b[2] - a[2]) * local,
    ]
}

/// Flat ground-slab color for the terrain skirt, distinct from any stop in
/// [`ELEVATION_COLORS`] so the slab reads as "below the terrain" rather
/// than a continuation of it.
const GROUND_COLOR: [f32; 3] = [0.35, 0.25, 0.18];

/// Built once per map from `Terrain` alone: immutable for the rest of the run.
///
/// Carries both the heightfield surface and a static perimeter skirt
/// hanging from the rim down to the bottom of the ground slab, so the
/// renderer never sees the hollow box interior through the terrain's
/// edges (spec §6: "an additional perimeter strip for the terrain skirt
/// is produced once per map"). Unlike the water skirt in [`MeshView`],
/// this one never changes after construction — the terrain is immutable.
pub struct TerrainMesh {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    skirt_vertices: Vec<TerrainVertex>,
    skirt_indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn build(terrain: &Terrain, cfg: &BoxConfig) -> Self {
        let w = terrain.width();
        let d = terrain.depth();

        let mut vertices = Vec::with_capacity(w * d);
        let (min_h, max_h) = (terrain.min_height(), terrain.max_height());
        let range = (max_h - min_h).max(f32::EPSILON);

        for z in 0..d {
            for x in 0..w {
                let y = terrain.height(x, z);
                let ratio = (y - min_h) / range;
                vertices.push(TerrainVertex {
                    position: [x as f32, y, z as f32],
                    normal: [0.0, 1.0, 0.0],
                    color: elevation_color(ratio),
                });
            }
        }

        for z in 0..d {
            for x in 0..w {
                let normal = terrain_normal(terrain, x, z);
                vertices[z * w + x].normal = normal;
            }
        }

        let indices = triangle_strip_indices(w, d);
        let (skirt_vertices, skirt_indices) =
            terrain_skirt(terrain, cfg.min_altitude() as f32);

        Self {
            vertices,
            indices,
            skirt_vertices,
            skirt_indices,
        }
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// `(vertices, indices)` for the static perimeter strip hanging from
    /// the terrain rim down to the bottom of the ground slab.
    pub fn skirt(&self) -> (&[TerrainVertex], &[u32]) {
        (&self.skirt_vertices, &self.skirt_indices)
    }
}

/// Builds the static terrain skirt: a closed ring around the four edges of
/// the terrain grid, each perimeter vertex paired with a twin at
/// `floor_y` (the bottom of the ground slab). Walked in the same
/// top/right/bottom/left winding as [`MeshView::refresh_skirt`] so both
/// skirts read consistently to the renderer.
fn terrain_skirt(terrain: &Terrain, floor_y: f32) -> (Vec<TerrainVertex>, Vec<u32>) {
    let w = terrain.width();
    let d = terrain.depth();
    let perimeter = 2 * w + 2 * d;

    let mut vertices = vec![TerrainVertex {
        position: [0.0; 3],
        normal: [0.0; 3],
        color: GROUND_COLOR,
    }; perimeter * 2];

    let mut push = |i: &mut usize, x: usize, z: usize, normal: [f32; 3]| {
        let y = terrain.height(x, z);
        vertices[*i] = TerrainVertex {
            position: [x as f32, y, z as f32],
            normal,
            color: GROUND_COLOR,
        };
        vertices[*i + perimeter] = TerrainVertex {
            position: [x as f32, floor_y, z as f32],
            normal,
            color: GROUND_COLOR,
        };
        *i += 1;
    };

    let mut i = 0usize;
    for x in 0..w {
        push(&mut i, x, 0, [0.0, 0.0, -1.0]);
    }
    for z in 0..d {
        push(&mut i, w - 1, z, [1.0, 0.0, 0.0]);
    }
    for x in (0..w).rev() {
        push(&mut i, x, d - 1, [0.0, 0.0, 1.0]);
    }
    for z in (0..d).rev() {
        push(&mut i, 0, z, [-1.0, 0.0, 0.0]);
    }

    let mut indices = Vec::with_capacity(perimeter * 2 + 1);
    indices.push(0);
    for x in 0..perimeter {
        indices.push(x as u32);
        indices.push((x + perimeter) as u32);
    }

    (vertices, indices)
}

fn terrain_normal(terrain: &Terrain, x: usize, z: usize) -> [f32; 3] {
    let w = terrain.width();
    let d = terrain.depth();

    let h_l = if x != 0 {
        terrain.height(x - 1, z)
    } else {
        terrain.height(x, z)
    };
    let h_r = if x < w - 1 {
        terrain.height(x + 1, z)
    } else {
        terrain.height(x, z)
    };
    let h_t = if z < d - 1 {
        terrain.height(x, z + 1)
    } else {
        terrain.height(x, z)
    };
    let h_b = if z != 0 {
        terrain.height(x, z - 1)
    } else {
        terrain.height(x, z)
    };

    let mut sx = h_r - h_l;
    if x == 0 || x == w - 1 {
        sx *= 2.0;
    }
    let mut sy = h_b - h_t;
    if z == 0 || z == d - 1 {
        sy *= 2.0;
    }

    normalize([-sx, 2.0, sy])
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let mag = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if mag > 0.0 {
        [v[0] / mag, v[1] / mag, v[2] / mag]
    } else {
        [0.0, 1.0, 0.0]
    }
}

/// One triangle strip per row, stitched with degenerate triangles so the
/// whole surface draws in a single call (spec §4.D), grounded on
/// `Terrain::_initMesh`'s index loop.
fn triangle_strip_indices(w: usize, d: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity((d.saturating_sub(1)) * (2 * w + 2));
    for y in 0..d.saturating_sub(1) {
        if y > 0 {
            indices.push((y * w) as u32);
        }
        let mut b = 0u32;
        for x in 0..w {
            let a = (x + y * w) as u32;
            b = a + w as u32;
            indices.push(a);
            indices.push(b);
        }
        if y != d.saturating_sub(2) {
            indices.push(b);
        }
    }
    indices
}

/// The water surface and its perimeter skirt, rebuilt every tick from
/// `&Terrain` + `&WaterGrid`. Buffers are sized once (at construction /
/// map switch) and repopulated in place on `refresh`, matching §5's "no
/// allocation on the ticking path".
pub struct MeshView {
    surface_vertices: Vec<MeshVertex>,
    surface_indices: Vec<u32>,
    skirt_vertices: Vec<MeshVertex>,
    skirt_indices: Vec<u32>,
    vw: usize, // vertex-grid width, Wc + 1
    vd: usize, // vertex-grid depth, Dc + 1
    grid_space: (f32, f32),
}

impl MeshView {
    pub fn new(grid: &WaterGrid) -> Self {
        let vw = grid.width() + 1;
        let vd = grid.depth() + 1;
        let grid_space = (grid.grid_space.x, grid.grid_space.y);

        let surface_indices = triangle_strip_indices(vw, vd);
        let perimeter = 2 * vw + 2 * vd;
        let mut skirt_indices = Vec::with_capacity(perimeter * 2 + 1);
        skirt_indices.push(0);
        for x in 0..perimeter {
            skirt_indices.push(x as u32);
            skirt_indices.push((x + perimeter) as u32);
        }

        let mut view = Self {
            surface_vertices: vec![MeshVertex::default(); vw * vd],
            surface_indices,
            skirt_vertices: vec![MeshVertex::default(); perimeter * 2],
            skirt_indices,
            vw,
            vd,
            grid_space,
        };
        view.refresh(grid);
        view
    }

    /// Recomputes every surface and skirt vertex's position, visibility,
    /// and normal from the current column grid. Called at the end of
    /// every tick (spec §4.D / §5's "handoff is by buffer replacement").
    pub fn refresh(&mut self, grid: &WaterGrid) {
        for z in 0..self.vd {
            for x in 0..self.vw {
                let (y, depth) = corner_height(grid, x, z);
                let vertex = &mut self.surface_vertices[z * self.vw + x];
                vertex.position = [x as f32 * self.grid_space.0, y, z as f32 * self.grid_space.1];
                vertex.visible = visibility(depth);
            }
        }
        for z in 0..self.vd {
            for x in 0..self.vw {
                let normal = surface_normal(&self.surface_vertices, self.vw, self.vd, x, z);
                self.surface_vertices[z * self.vw + x].normal = normal;
            }
        }

        self.refresh_skirt(grid);
    }

    fn refresh_skirt(&mut self, grid: &WaterGrid) {
        let perimeter = 2 * self.vw + 2 * self.vd;
        let mut i = 0usize;

        let mut push = |i: &mut usize, verts: &mut [MeshVertex], x: f32, z: f32, y: f32, depth: f32, normal: [f32; 3]| {
            verts[*i] = MeshVertex {
                position: [x, y, z],
                normal,
                visible: visibility(depth),
            };
            verts[*i + perimeter] = MeshVertex {
                position: [x, 0.0, z],
                normal,
                visible: visibility(depth),
            };
            *i += 1;
        };

        for x in 0..self.vw {
            let (y, depth) = corner_height(grid, x, 0);
            push(
                &mut i,
                &mut self.skirt_vertices,
                x as f32 * self.grid_space.0,
                0.0,
                y,
                depth,
                [0.0, 0.0, -1.0],
            );
        }
        for z in 0..self.vd {
            let (y, depth) = corner_height(grid, self.vw - 1, z);
            push(
                &mut i,
                &mut self.skirt_vertices,
                (self.vw - 1) as f32 * self.grid_space.0,
                z as f32 * self.grid_space.1,
                y,
                depth,
                [1.0, 0.0, 0.0],
            );
        }
        for x in (0..self.vw).rev() {
            let (y, depth) = corner_height(grid, x, self.vd - 1);
            push(
                &mut i,
                &mut self.skirt_vertices,
                x as f32 * self.grid_space.0,
                (self.vd - 1) as f32 * self.grid_space.1,
                y,
                depth,
                [0.0, 0.0, 1.0],
            );
        }
        for z in (0..self.vd).rev() {
            let (y, depth) = corner_height(grid, 0, z);
            push(
                &mut i,
                &mut self.skirt_vertices,
                0.0,
                z as f32 * self.grid_space.1,
                y,
                depth,
                [-1.0, 0.0, 0.0],
            );
        }
    }

    /// `(vertices, indices)` for the single-draw-call triangle strip.
    pub fn surface(&self) -> (&[MeshVertex], &[u32]) {
        (&self.surface_vertices, &self.surface_indices)
    }

    /// `(vertices, indices)` for the closed perimeter band hiding the box walls.
    pub fn skirt(&self) -> (&[MeshVertex], &[u32]) {
        (&self.skirt_vertices, &self.skirt_indices)
    }
}

/// Visibility fades linearly to transparent below `VISIBILITY_THRESHOLD`
/// of water, clamped to `[0, 1]` above it (spec §4.D).
#[inline]
fn visibility(depth: f32) -> f32 {
    if depth < VISIBILITY_THRESHOLD {
        (depth / VISIBILITY_THRESHOLD).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Total surface altitude and mean depth at logical corner `(x, z)` of the
/// vertex grid, averaging the four surrounding columns with the in-range
/// partner substituted for any neighbor past the grid edge — grounded on
/// `Water::_calculateHeight`. This intentionally reuses a column twice at
/// the rim (spec §9 open question): it preserves mass but biases the
/// displayed surface slightly outward, and that bias is kept on purpose.
fn corner_height(grid: &WaterGrid, x: usize, z: usize) -> (f32, f32) {
    let w = grid.width();
    let d = grid.depth();

    let left = if x != 0 { x - 1 } else { 0 };
    let right = if x < w { x } else { x - 1 };
    let top = if z != 0 { z - 1 } else { 0 };
    let bottom = if z < d { z } else { z - 1 };

    let corners = [(left, top), (right, top), (left, bottom), (right, bottom)];
    let mut depth_sum = 0.0f32;
    let mut terrain_sum = 0.0f32;
    for (cu, cv) in corners {
        depth_sum += grid.depth_at(cu, cv);
        terrain_sum += grid.terrain_h(cu, cv);
    }
    let depth = depth_sum / 4.0;
    let terrain = terrain_sum / 4.0;
    (depth + terrain, depth)
}

fn surface_normal(vertices: &[MeshVertex], vw: usize, vd: usize, x: usize, z: usize) -> [f32; 3] {
    let h_at = |x: usize, z: usize| vertices[z * vw + x].position[1];

    let h_l = if x != 0 { h_at(x - 1, z) } else { h_at(x, z) };
    let h_r = if x < vw - 1 { h_at(x + 1, z) } else { h_at(x, z) };
    let h_t = if z < vd - 1 { h_at(x, z + 1) } else { h_at(x, z) };
    let h_b = if z != 0 { h_at(x, z - 1) } else { h_at(x, z) };

    let mut sx = h_r - h_l;
    if x == 0 || x == vw - 1 {
        sx *= 2.0;
    }
    let mut sy = h_b - h_t;
    if z == 0 || z == vd - 1 {
        sy *= 2.0;
    }

    normalize([-sx, 2.0, sy])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::BoxConfig;

    fn flat_setup() -> (BoxConfig, Terrain, WaterGrid) {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let terrain = Terrain::build(&[], &cfg);
        let grid = WaterGrid::new(&cfg, &terrain);
        (cfg, terrain, grid)
    }

    #[test]
    fn surface_vertex_count_matches_vertex_grid() {
        let (_cfg, _terrain, grid) = flat_setup();
        let view = MeshView::new(&grid);
        let (verts, _) = view.surface();
        assert_eq!(verts.len(), (grid.width() + 1) * (grid.depth() + 1));
    }

    #[test]
    fn dry_vertices_are_fully_invisible() {
        let (_cfg, _terrain, grid) = flat_setup();
        let view = MeshView::new(&grid);
        let (verts, _) = view.surface();
        assert!(verts.iter().all(|v| v.visible == 0.0));
    }

    #[test]
    fn submerged_vertex_becomes_visible_above_threshold() {
        let (cfg, terrain, mut grid) = flat_setup();
        for v in 0..grid.depth() {
            for u in 0..grid.width() {
                grid.set_depth(u, v, 1.0);
            }
        }
        let mut view = MeshView::new(&grid);
        view.refresh(&grid);
        let (verts, _) = view.surface();
        assert!(verts.iter().all(|v| v.visible == 1.0));
        let _ = (cfg, terrain);
    }

    #[test]
    fn skirt_has_matching_top_and_bottom_rings() {
        let (_cfg, _terrain, grid) = flat_setup();
        let view = MeshView::new(&grid);
        let (verts, _) = view.skirt();
        assert_eq!(verts.len() % 2, 0);
        let half = verts.len() / 2;
        for i in 0..half {
            assert_eq!(verts[i].position[0], verts[i + half].position[0]);
            assert_eq!(verts[i].position[2], verts[i + half].position[2]);
            assert_eq!(verts[i + half].position[1], 0.0);
        }
    }

    #[test]
    fn terrain_mesh_covers_full_grid_and_colors_extremes() {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let points = vec![crate::engine::core::idw::ControlPoint::new(20, -10, 20)];
        let terrain = Terrain::build(&points, &cfg);
        let mesh = TerrainMesh::build(&terrain, &cfg);
        assert_eq!(mesh.vertices().len(), terrain.width() * terrain.depth());
        assert!(!mesh.indices().is_empty());
    }

    #[test]
    fn terrain_skirt_hangs_from_rim_to_ground_floor() {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let terrain = Terrain::build(&[], &cfg);
        let mesh = TerrainMesh::build(&terrain, &cfg);
        let (verts, _) = mesh.skirt();
        assert_eq!(verts.len() % 2, 0);
        let half = verts.len() / 2;
        for i in 0..half {
            assert_eq!(verts[i].position[0], verts[i + half].position[0]);
            assert_eq!(verts[i].position[2], verts[i + half].position[2]);
            assert_eq!(verts[i + half].position[1], cfg.min_altitude() as f32);
        }
    }
}
