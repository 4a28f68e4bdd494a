// ABOUTME: Persisted settings - screen, font, color, graphics, and mouse-sensitivity fields
// ABOUTME: Loaded from configs/settings.json; the core itself reads only box dims, maxFps, and sensitivity

use serde::{Deserialize, Serialize};

/// Mirrors the original `SettingsJson` document built by `initSettings`
/// (spec §6). Only `screen.max_fps`, `box_dims`, and `mouse_sensitivity`
/// are consulted by the core; the rest travels along because the
/// persisted file is one document, not because the simulator needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub name: String,
    pub screen: ScreenSettings,
    pub fonts: FontSettings,
    pub colors: ColorSettings,
    pub graphics: GraphicsSettings,
    pub mouse_sensitivity: f64,
    /// Grid dimensions the core builds its `BoxConfig` from: `(W, H, D)`.
    pub box_dims: (usize, usize, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenSettings {
    pub max_fps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSettings {
    pub base: BaseFont,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseFont {
    pub file: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorSettings {
    pub font: ColorAlpha,
    pub background: ColorAlpha,
    pub collider: ColorAlpha,
    pub bounding_box: ColorAlpha,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorAlpha {
    pub color: u32,
    pub alpha: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    pub fullscreen: bool,
    pub fit_to_screen: bool,
    pub width: i64,
    pub height: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "hydroterrain".to_string(),
            screen: ScreenSettings { max_fps: 60 },
            fonts: FontSettings {
                base: BaseFont {
                    file: "asset/font/monaco.ttf".to_string(),
                    size: 20,
                },
            },
            colors: ColorSettings {
                font: ColorAlpha {
                    color: 0x18_18_18,
                    alpha: 0xFF,
                },
                background: ColorAlpha {
                    color: 0x18_18_18,
                    alpha: 0xFF,
                },
                collider: ColorAlpha {
                    color: 0x64_7B_CE,
                    alpha: 0xFF,
                },
                bounding_box: ColorAlpha {
                    color: 0x15_5C_2C,
                    alpha: 0xFF,
                },
            },
            graphics: GraphicsSettings {
                fullscreen: false,
                fit_to_screen: false,
                width: 1200,
                height: 800,
            },
            mouse_sensitivity: 0.7,
            box_dims: (64, 64, 64),
        }
    }
}

impl Settings {
    /// Loads `configs/settings.json`, falling back to defaults (and
    /// logging) if the file is missing or malformed — mirrors
    /// `initSettings`'s tolerant "doesn't exist yet" handling.
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("[hydroterrain] failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                eprintln!("[hydroterrain] {} not found, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).expect("Settings always serializes");
        std::fs::write(path, json)
    }

    /// The `(W, H, D)` box dimensions consumed by `BoxConfig`.
    pub fn box_dims(&self) -> (usize, usize, usize) {
        self.box_dims
    }
}
