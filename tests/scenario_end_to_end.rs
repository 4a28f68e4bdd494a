// ABOUTME: End-to-end scenario validation crossing terrain, water grid, and solver
// ABOUTME: Mirrors the teacher's scenario-style integration tests under tests/

use hydroterrain::engine::core::idw::ControlPoint;
use hydroterrain::engine::core::{BoxConfig, Terrain};
use hydroterrain::engine::physics::{Scenario, TickInput, WaterSolver};

fn cfg() -> BoxConfig {
    BoxConfig::new(64, 64, 64, 24)
}

/// S2: a central 3x3 pit surrounded by walls holds water without leaking.
/// Water is seeded through the same `Sandbox` click path the renderer
/// uses, one pit cell per tick, before the dry run that checks containment.
#[test]
fn pit_holds_water_without_leaking() {
    let cfg = cfg();
    let terrain = pit_terrain(&cfg);
    let mut solver = WaterSolver::new(&cfg, &terrain, Scenario::Sandbox);

    let grid_space = solver.grid().grid_space;
    for v in 30..33 {
        for u in 30..33 {
            let hit = (u as f32 * grid_space.x, v as f32 * grid_space.y);
            solver.tick(0.001, TickInput { sandbox_click: Some(hit) });
        }
    }

    for _ in 0..200 {
        solver.tick(0.05, TickInput::default());
    }

    for v in 30..33 {
        for u in 30..33 {
            assert!(
                solver.grid().depth_at(u, v) >= 1.9,
                "pit cell ({u},{v}) drained below the walls: {}",
                solver.grid().depth_at(u, v)
            );
        }
    }
    for v in 0..cfg.water_depth() {
        for u in 0..cfg.water_width() {
            if (30..33).contains(&u) && (30..33).contains(&v) {
                continue;
            }
            assert!(
                solver.grid().depth_at(u, v) < 1e-3,
                "water escaped the pit at ({u},{v}): {}",
                solver.grid().depth_at(u, v)
            );
        }
    }
}

fn pit_terrain(cfg: &BoxConfig) -> Terrain {
    // A dense ring of control points at altitude 10 around a 3x3 hole at
    // altitude 0 gives the surrounding walls the IDW builder needs to hold.
    let mut points = Vec::new();
    for z in 25..38 {
        for u in 25..38 {
            let inside = (30..33).contains(&u) && (30..33).contains(&z);
            points.push(ControlPoint::new(u, if inside { 0 } else { 20 }, z));
        }
    }
    Terrain::build(&points, cfg)
}

/// S3: a linear slope drains toward the low side.
#[test]
fn slope_drains_toward_low_side() {
    let cfg = cfg();
    let points = vec![ControlPoint::new(1, 0, 32), ControlPoint::new(62, 60, 32)];
    let terrain = Terrain::build(&points, &cfg);
    let mut solver = WaterSolver::new(&cfg, &terrain, Scenario::Wave);
    solver.set_scenario(Scenario::Wave.id()).unwrap();

    for _ in 0..500 {
        solver.tick(0.05, TickInput::default());
    }

    let low_side = solver.grid().depth_at(0, 32);
    let high_side = solver.grid().depth_at(cfg.water_width() - 1, 32);
    assert!(
        low_side >= high_side,
        "expected water to pool on the low side: low={low_side} high={high_side}"
    );
}

/// S4: rain accumulates mean depth within the documented probability band.
#[test]
fn rain_accumulates_within_expected_band() {
    let cfg = cfg();
    let terrain = Terrain::build(&[], &cfg);
    let mut solver = WaterSolver::new(&cfg, &terrain, Scenario::Raining);
    solver.set_scenario(Scenario::Raining.id()).unwrap();

    let dt = 0.05;
    let mut elapsed = 0.0;
    while elapsed < 2.0 {
        solver.tick(dt, TickInput::default());
        elapsed += dt;
    }

    let mut total = 0.0f64;
    let mut count = 0u64;
    for v in 0..cfg.water_depth() {
        for u in 0..cfg.water_width() {
            total += solver.grid().depth_at(u, v) as f64;
            count += 1;
        }
    }
    let mean = total / count as f64;
    assert!(
        (0.08 * elapsed as f64..=0.16 * elapsed as f64).contains(&mean),
        "rain mean depth {mean} outside expected band for t={elapsed}"
    );
}

/// S5: drain empties every shallow cell and never increases total volume.
#[test]
fn drain_empties_shallow_cells_monotonically() {
    let cfg = cfg();
    let terrain = Terrain::build(&[], &cfg);
    let mut solver = WaterSolver::new(&cfg, &terrain, Scenario::Drain);
    solver.set_scenario(Scenario::Drain.id()).unwrap();

    let mut prev_volume = solver.grid().total_volume();
    for _ in 0..400 {
        solver.tick(0.05, TickInput::default());
        let volume = solver.grid().total_volume();
        assert!(
            volume <= prev_volume + 1e-6,
            "drain volume increased: {prev_volume} -> {volume}"
        );
        prev_volume = volume;
    }

    for v in 0..cfg.water_depth() {
        for u in 0..cfg.water_width() {
            if solver.grid().terrain_h(u, v) <= 5.0 {
                assert_eq!(
                    solver.grid().depth_at(u, v),
                    0.0,
                    "cell ({u},{v}) never fully drained"
                );
            }
        }
    }
}
