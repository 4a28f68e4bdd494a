// ABOUTME: Core engine foundation - fundamental data structures and box/grid configuration
// ABOUTME: Provides basic building blocks for the IDW terrain builder and water solver

pub mod box_config;
pub mod error;
pub mod heightmap;
pub mod idw;
pub mod math;
pub mod terrain;

// Re-export key types for convenience
pub use box_config::BoxConfig;
pub use error::SimError;
pub use heightmap::HeightMap;
pub use math::Vec2;
pub use terrain::Terrain;
