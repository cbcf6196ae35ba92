use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::controls::adjust::Increments;
use crate::domain::controls::Keybinds;
use crate::error::ConfigError;

/// How the HUD frame reaches the wearer's eyes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum OverlayBackend {
    /// Render into a texture mapped onto a quad in front of the center eye.
    #[default]
    TextureQuad,
    /// Mirror the HUD in a flat egui window.
    ScreenPanel,
    /// Build the frame but leave drawing to the host.
    Headless,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub backend: OverlayBackend,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub render_layer: usize,
    /// Seconds after startup during which the HUD stays hidden.
    pub startup_suppression_secs: f32,
    /// Used when no primary window exists to measure.
    pub fallback_display: UVec2,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            backend: OverlayBackend::default(),
            translation: Vec3::new(0.01, 0.17, -0.53),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(0.5),
            render_layer: 0,
            startup_suppression_secs: 1.0,
            fallback_display: UVec2::new(1280, 800),
        }
    }
}

impl OverlayConfig {
    pub fn local_transform(&self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Scene identifiers offered by the level menu, in display order.
    pub scenes: Vec<String>,
    pub increments: Increments,
    pub overlay: OverlayConfig,
    pub bindings: Keybinds,
}

impl MenuConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path`, falling back to the defaults with a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err}; using default menu config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::controls::Binding;

    #[test]
    fn empty_document_gives_defaults() {
        let config = MenuConfig::from_toml_str("").unwrap();
        assert!(config.scenes.is_empty());
        assert_eq!(config.increments.fov, 0.2);
        assert_eq!(config.overlay.backend, OverlayBackend::TextureQuad);
        assert_eq!(config.overlay.fallback_display, UVec2::new(1280, 800));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = MenuConfig::from_toml_str(
            r#"
            scenes = ["Level1", "Level2"]

            [increments]
            ipd = 0.005

            [overlay]
            backend = "Headless"
            startup_suppression_secs = 0.0
            translation = [0.0, 0.0, -1.0]

            [bindings]
            diagnostics = [{ Key = "F1" }]
            "#,
        )
        .unwrap();

        assert_eq!(config.scenes, vec!["Level1", "Level2"]);
        assert_eq!(config.increments.ipd, 0.005);
        assert_eq!(config.increments.prediction, 0.001);
        assert_eq!(config.overlay.backend, OverlayBackend::Headless);
        assert_eq!(config.overlay.translation, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(config.bindings.diagnostics, vec![Binding::Key(KeyCode::F1)]);
        assert_eq!(
            config.bindings.confirm,
            Keybinds::default().confirm,
            "unspecified bindings keep their defaults"
        );
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(matches!(
            MenuConfig::from_toml_str("scenes = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back() {
        let config = MenuConfig::load_or_default("/nonexistent/vr_menu.toml");
        assert_eq!(config.overlay.startup_suppression_secs, 1.0);
    }
}
