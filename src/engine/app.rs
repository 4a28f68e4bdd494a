// ABOUTME: Top-level simulation wiring - owns all loaded maps and drives one tick end-to-end
// ABOUTME: Scene-level knobs (pause, map index, scenario, wireframe) live here, never behind a back-pointer

use super::core::{BoxConfig, Terrain};
use super::input::{Action, FrameInput};
use super::mesh::{MeshView, TerrainMesh};
use super::physics::{Scenario, TickInput, WaterSolver};

/// Owns every loaded map's terrain, the active water solver, and the
/// mesh buffers handed to the renderer. This is the "outer frame loop"'s
/// one point of contact with the core: it calls [`App::apply_frame`]
/// once per frame and reads the mesh buffers back out.
pub struct App {
    cfg: BoxConfig,
    terrains: Vec<Terrain>,
    terrain_meshes: Vec<TerrainMesh>,
    current_map: usize,
    solver: WaterSolver,
    mesh: MeshView,
    paused: bool,
    wireframe: bool,
}

impl App {
    /// `terrains` must be non-empty; each entry corresponds to one
    /// successfully loaded `.mod1` file in CLI argument order.
    pub fn new(cfg: BoxConfig, terrains: Vec<Terrain>) -> Self {
        assert!(!terrains.is_empty(), "App requires at least one map");

        let terrain_meshes: Vec<TerrainMesh> = terrains
            .iter()
            .map(|t| TerrainMesh::build(t, &cfg))
            .collect();
        let solver = WaterSolver::new(&cfg, &terrains[0], Scenario::EvenRise);
        let mesh = MeshView::new(solver.grid());

        Self {
            cfg,
            terrains,
            terrain_meshes,
            current_map: 0,
            solver,
            mesh,
            paused: false,
            wireframe: false,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn scenario(&self) -> Scenario {
        self.solver.scenario()
    }

    pub fn current_map_index(&self) -> usize {
        self.current_map
    }

    pub fn map_count(&self) -> usize {
        self.terrains.len()
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrains[self.current_map]
    }

    pub fn terrain_mesh(&self) -> &TerrainMesh {
        &self.terrain_meshes[self.current_map]
    }

    pub fn mesh(&self) -> &MeshView {
        &self.mesh
    }

    pub fn box_config(&self) -> &BoxConfig {
        &self.cfg
    }

    /// Applies one frame's discrete actions, then — unless paused — runs
    /// one tick (scenario → flow → correction → depth → mesh refresh).
    /// Returns `false` on a logged, non-fatal per-tick fault so the
    /// caller can decide whether to terminate (spec §7); currently the
    /// only such fault is an `UnknownScenario` reported by a stray
    /// `CycleScenario` action, which this resolves by clamping back to
    /// scenario 0 rather than surfacing further.
    pub fn apply_frame(&mut self, frame: FrameInput, dt: f32) -> bool {
        let mut ok = true;

        for action in &frame.actions {
            match action {
                Action::TogglePause => self.paused = !self.paused,
                Action::ToggleWireframe => self.wireframe = !self.wireframe,
                Action::NextMap => self.switch_map(1),
                Action::PreviousMap => self.switch_map(-1),
                Action::CycleScenario => {
                    let next = self.solver.scenario().next();
                    if self.solver.set_scenario(next.id()).is_err() {
                        ok = false;
                        let _ = self.solver.set_scenario(Scenario::EvenRise.id());
                    }
                }
            }
        }

        if !self.paused {
            let input = TickInput {
                sandbox_click: frame.sandbox_click,
            };
            self.solver.tick(dt, input);
            self.mesh.refresh(self.solver.grid());
        }

        ok
    }

    fn switch_map(&mut self, delta: i64) {
        let count = self.terrains.len() as i64;
        let next = (self.current_map as i64 + delta).rem_euclid(count) as usize;
        if next == self.current_map {
            return;
        }
        self.current_map = next;
        self.solver.rebuild(&self.cfg, &self.terrains[self.current_map]);
        self.mesh = MeshView::new(self.solver.grid());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::idw::ControlPoint;

    fn app_with_two_maps() -> App {
        let cfg = BoxConfig::new(64, 64, 64, 24);
        let a = Terrain::build(&[ControlPoint::new(10, 5, 10)], &cfg);
        let b = Terrain::build(&[ControlPoint::new(40, -3, 40)], &cfg);
        App::new(cfg, vec![a, b])
    }

    #[test]
    fn pause_toggle_suspends_ticking() {
        let mut app = app_with_two_maps();
        let frame = FrameInput {
            actions: vec![Action::TogglePause],
            sandbox_click: None,
        };
        app.apply_frame(frame, 0.05);
        assert!(app.paused());

        let depth_before = app.solver.grid().depth_at(0, 0);
        app.apply_frame(FrameInput::default(), 0.05);
        assert_eq!(app.solver.grid().depth_at(0, 0), depth_before);
    }

    #[test]
    fn next_map_wraps_around() {
        let mut app = app_with_two_maps();
        assert_eq!(app.current_map_index(), 0);
        app.apply_frame(
            FrameInput {
                actions: vec![Action::NextMap],
                sandbox_click: None,
            },
            0.05,
        );
        assert_eq!(app.current_map_index(), 1);
        app.apply_frame(
            FrameInput {
                actions: vec![Action::NextMap],
                sandbox_click: None,
            },
            0.05,
        );
        assert_eq!(app.current_map_index(), 0);
    }

    #[test]
    fn cycle_scenario_advances_through_all_five() {
        let mut app = app_with_two_maps();
        let start = app.scenario();
        for _ in 0..5 {
            app.apply_frame(
                FrameInput {
                    actions: vec![Action::CycleScenario],
                    sandbox_click: None,
                },
                0.05,
            );
        }
        assert_eq!(app.scenario(), start);
    }

    #[test]
    fn wireframe_toggle_round_trips() {
        let mut app = app_with_two_maps();
        assert!(!app.wireframe());
        app.apply_frame(
            FrameInput {
                actions: vec![Action::ToggleWireframe],
                sandbox_click: None,
            },
            0.05,
        );
        assert!(app.wireframe());
    }
}
