//! In-headset HUD and level menu for Bevy VR applications.
//!
//! Add [`VrMenuPlugin`] to an app that spawns a [`rig::CameraRig`], a
//! [`rig::MovementRig`] and a [`rig::CenterEyeAnchor`] during `Startup` and
//! inserts a [`rig::SceneHostHandle`].

pub mod config;
pub mod domain;
pub mod error;
pub mod rig;
pub mod simulated;

use bevy::prelude::*;

use config::MenuConfig;
use domain::controls::level_select::LevelSelectState;
use domain::{HudPlugin, InputPlugin};
use rig::{resolve_collaborators, Collaborators};

/// Per-tick ordering of the menu's systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MenuSet {
    Input,
    Apply,
    Telemetry,
    Hud,
}

#[derive(Default)]
pub struct VrMenuPlugin {
    pub config: MenuConfig,
}

impl Plugin for VrMenuPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<Collaborators>()
            .configure_sets(
                Update,
                (
                    MenuSet::Input,
                    MenuSet::Apply,
                    MenuSet::Telemetry,
                    MenuSet::Hud,
                )
                    .chain()
                    .run_if(not(in_state(LevelSelectState::Loading))),
            )
            .add_systems(
                PostStartup,
                resolve_collaborators.before(domain::presentation::setup_overlay),
            )
            .add_plugins((InputPlugin, HudPlugin));
    }
}
