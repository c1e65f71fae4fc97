//! Viewer configuration with TOML overrides.
//!
//! Every section uses `#[serde(default)]`, so a file that only overrides
//! `[projection]` or a single camera field keeps the defaults for everything
//! else. Supplying `[[objects]]` replaces the built-in diorama wholesale.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::controller::{InteractionMode, KeyBindings, ProjectionType};
use crate::error::{Result, ViewerError};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WIREVIEW_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "wireview.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowOptions,
    pub camera: CameraOptions,
    pub projection: ProjectionOptions,
    pub grid: GridOptions,
    pub keybindings: KeyBindings,
    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectOptions>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowOptions::default(),
            camera: CameraOptions::default(),
            projection: ProjectionOptions::default(),
            grid: GridOptions::default(),
            keybindings: KeyBindings::default(),
            objects: default_objects(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self { title: "wireview".to_string(), width: 1280, height: 720 }
    }
}

/// Default pose and input scaling for the camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
    /// Scale from input units (pixels, wheel ticks) to radians / world units.
    pub sensitivity: f32,
    /// World units per fly-mode key poll.
    pub fly_step: f32,
    pub mode: InteractionMode,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.0, 3.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            sensitivity: 0.001,
            fly_step: 0.05,
            mode: InteractionMode::Mouse,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionOptions {
    pub kind: ProjectionType,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            kind: ProjectionType::Perspective,
            fov_y_degrees: 45.0,
            near: 0.5,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridOptions {
    pub half_cells: u32,
    pub spacing: f32,
    pub color: [f32; 3],
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { half_cells: 10, spacing: 0.5, color: [0.35, 0.35, 0.4] }
    }
}

/// Placement of one diorama object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectOptions {
    pub name: String,
    pub mesh: PathBuf,
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "default_axis")]
    pub rotation_axis: [f32; 3],
    #[serde(default)]
    pub rotation_degrees: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default = "default_color")]
    pub color: [f32; 3],
}

fn default_axis() -> [f32; 3] { [0.0, 1.0, 0.0] }

fn default_scale() -> [f32; 3] { [1.0, 1.0, 1.0] }

fn default_color() -> [f32; 3] { [0.9, 0.9, 0.9] }

fn object(name: &str, mesh: &str, translation: [f32; 3], degrees: f32, scale: [f32; 3], color: [f32; 3]) -> ObjectOptions {
    ObjectOptions {
        name: name.to_string(),
        mesh: PathBuf::from(mesh),
        translation,
        rotation_axis: default_axis(),
        rotation_degrees: degrees,
        scale,
        color,
    }
}

fn default_objects() -> Vec<ObjectOptions> {
    vec![
        object("crate", "assets/cube.obj", [-1.0, 0.25, 0.0], 20.0, [0.5, 0.5, 0.5], [0.95, 0.55, 0.2]),
        object("pyramid", "assets/pyramid.obj", [0.8, 0.0, -0.4], 0.0, [0.8, 0.8, 0.8], [0.3, 0.8, 0.95]),
        object("tower", "assets/cube.obj", [0.2, 0.75, -1.6], -10.0, [0.3, 1.5, 0.3], [0.85, 0.85, 0.3]),
        object("ramp", "assets/wedge.obj", [0.0, 0.0, 1.0], 90.0, [0.6, 0.4, 0.9], [0.6, 0.9, 0.5]),
    ]
}

impl ViewerConfig {
    /// Load from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Write as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let io_err = |source: std::io::Error| ViewerError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)
    }

    /// Config from `WIREVIEW_CONFIG` or `./wireview.toml`, falling back to
    /// defaults when the file is absent or unreadable.
    pub fn from_env() -> Self {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), "ignoring config: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = ViewerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ViewerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let text = r#"
[projection]
kind = "orthographic"

[camera]
fly_step = 0.25
"#;
        let config: ViewerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.projection.kind, ProjectionType::Orthographic);
        assert_eq!(config.projection.fov_y_degrees, 45.0);
        assert_eq!(config.camera.fly_step, 0.25);
        assert_eq!(config.camera.sensitivity, 0.001);
        assert_eq!(config.camera.eye, [0.0, 1.0, 3.0]);
        assert_eq!(config.objects, default_objects());
    }

    #[test]
    fn objects_replace_the_diorama() {
        let text = r#"
[[objects]]
name = "solo"
mesh = "meshes/solo.obj"
translation = [0.0, 1.0, 0.0]
"#;
        let config: ViewerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.objects.len(), 1);
        let solo = &config.objects[0];
        assert_eq!(solo.mesh, PathBuf::from("meshes/solo.obj"));
        assert_eq!(solo.scale, [1.0, 1.0, 1.0]);
        assert_eq!(solo.rotation_axis, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let text = "[camera]\nmode = \"hover\"\n";
        assert!(toml::from_str::<ViewerConfig>(text).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("wireview-config-{}", std::process::id()));
        let path = dir.join("nested").join("wireview.toml");
        let mut config = ViewerConfig::default();
        config.window.title = "saved".to_string();
        config.save(&path).unwrap();
        assert_eq!(ViewerConfig::load(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ViewerConfig::load(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }
}
