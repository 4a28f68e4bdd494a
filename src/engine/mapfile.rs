// ABOUTME: Map file loading - parses a .mod1 JSON document into validated control points
// ABOUTME: Grounded on the original SettingsJson-based loader in Terrain::_loadFile, reimplemented over serde_json

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::core::box_config::BoxConfig;
use super::core::error::SimError;
use super::core::idw::ControlPoint;

/// Shape of a `.mod1` map file: `{ "map": [ {"x":.., "y":.., "z":..}, ... ] }`.
#[derive(Debug, Deserialize)]
struct MapDocument {
    map: Vec<RawPoint>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: i64,
    y: i64,
    z: i64,
}

/// Loads and validates the user control points from one `.mod1` file.
///
/// This is the concrete implementation of the "external map parser" spec
/// §6 treats as a collaborator: a finite sequence of `(x, y, z)` within
/// the documented ranges, up to `max_user_points`, duplicates tolerated
/// but reported. The caller still owes rim augmentation (`Terrain::build`
/// does that); this function returns only the user-authored points.
pub fn load_points(path: &Path, cfg: &BoxConfig) -> Result<Vec<ControlPoint>, SimError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SimError::MapParseError(format!("{}: {e}", path.display())))?;
    let doc: MapDocument = serde_json::from_str(&contents)
        .map_err(|e| SimError::MapParseError(format!("{}: {e}", path.display())))?;

    let mut seen = HashSet::new();
    let mut points = Vec::with_capacity(doc.map.len());

    for raw in doc.map {
        validate_range(raw, cfg, path)?;
        let point = ControlPoint::new(raw.x, raw.y, raw.z);
        if !seen.insert((raw.x, raw.y, raw.z)) {
            eprintln!(
                "[hydroterrain] duplicate point in {}, skipped: ({}, {}, {})",
                path.display(),
                raw.x,
                raw.y,
                raw.z
            );
            continue;
        }
        if points.len() == cfg.max_user_points {
            return Err(SimError::MapPointsOverflow {
                found: points.len() + 1,
                max: cfg.max_user_points,
            });
        }
        points.push(point);
    }

    if points.is_empty() {
        return Err(SimError::MapPointsMissing);
    }

    Ok(points)
}

fn validate_range(raw: RawPoint, cfg: &BoxConfig, path: &Path) -> Result<(), SimError> {
    let x_range = 1..=(cfg.width as i64 - 1);
    let z_range = 1..=(cfg.depth as i64 - 1);
    let y_range = cfg.min_altitude()..=cfg.max_altitude();

    if !x_range.contains(&raw.x) || !z_range.contains(&raw.z) || !y_range.contains(&raw.y) {
        return Err(SimError::MapParseError(format!(
            "{}: point ({}, {}, {}) out of range (x in {:?}, y in {:?}, z in {:?})",
            path.display(),
            raw.x,
            raw.y,
            raw.z,
            x_range,
            y_range,
            z_range
        )));
    }
    Ok(())
}

/// Returns `true` when `path` carries the `.mod1` suffix the CLI requires,
/// grounded on the original's `hasSuffix`.
pub fn has_map_suffix(path: &str) -> bool {
    path.ends_with(".mod1")
}
