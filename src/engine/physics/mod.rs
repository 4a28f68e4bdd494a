// ABOUTME: Physics simulation - the column-based pipe-flow water solver and its scenarios
// ABOUTME: Depends on engine::core for the terrain grid it flows over

pub mod scenario;
pub mod solver;
pub mod water_grid;

pub use scenario::Scenario;
pub use solver::{TickInput, WaterSolver};
pub use water_grid::WaterGrid;
