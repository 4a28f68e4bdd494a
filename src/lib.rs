// ABOUTME: Library interface for the terrain/water simulation engine
// ABOUTME: Exposes the public API the binary and tests drive

pub mod engine;

pub use engine::{App, FrameInput, MeshVertex, MeshView, Settings, TerrainMesh, TerrainVertex};
