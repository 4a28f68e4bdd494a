// ABOUTME: Error kinds shared across map loading, terrain synthesis, and the water solver
// ABOUTME: Hand-rolled std::error::Error impls, matching the rest of this codebase's no-thiserror style

use std::fmt;

/// Errors the core can report. Construction errors are fatal for the map
/// being loaded; per-tick errors are logged and confined to a `false`
/// return from `tick`.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// The upstream map parser rejected the file (malformed JSON or a
    /// value outside the documented range).
    MapParseError(String),
    /// More than `max_user_points` control points were present after parsing.
    MapPointsOverflow { found: usize, max: usize },
    /// The user point set was empty after parsing.
    MapPointsMissing,
    /// `setScenario` was called with an id outside the five known scenarios.
    UnknownScenario(u16),
    /// An internal index computation produced an out-of-grid cell.
    GridOutOfRange { u: usize, v: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::MapParseError(msg) => write!(f, "map parse error: {msg}"),
            SimError::MapPointsOverflow { found, max } => {
                write!(f, "too many map points: found {found}, max {max}")
            }
            SimError::MapPointsMissing => write!(f, "map has no control points"),
            SimError::UnknownScenario(id) => write!(f, "unknown scenario id: {id}"),
            SimError::GridOutOfRange { u, v } => {
                write!(f, "grid index out of range: ({u}, {v})")
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Logs and, in debug builds, panics on an internal grid-index bug.
/// Release builds continue with the error only logged, matching §7's
/// "logged, ignored in release, aborts in debug" policy.
pub fn report_grid_out_of_range(u: usize, v: usize) {
    let err = SimError::GridOutOfRange { u, v };
    eprintln!("[hydroterrain] {err}");
    debug_assert!(false, "{err}");
}
