pub mod overlay;
pub mod panels;
pub mod telemetry;

use std::time::Duration;

use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use bevy::window::PrimaryWindow;

use crate::config::{MenuConfig, OverlayBackend};
use crate::domain::controls::adjust::DiagnosticsDisplay;
use crate::domain::controls::level_select::{LevelSelectState, SceneCatalog};
use crate::rig::{Collaborators, SceneHostHandle};
use crate::MenuSet;
use overlay::{reparent_preserving_local, HudOverlay, OverlayPhase, OverlaySurface};
use panels::{ScreenPanelPresenter, TextureQuadPresenter};
use telemetry::{refresh_telemetry, TelemetryAggregator};

/// Telemetry, the HUD overlay state machine and the selected presenter.
pub struct HudPlugin;
impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<MenuConfig>()
            .cloned()
            .unwrap_or_default();
        let suppression =
            Duration::try_from_secs_f32(config.overlay.startup_suppression_secs.max(0.0))
                .unwrap_or(Duration::ZERO);

        app.insert_resource(HudOverlay::new(suppression))
            .init_resource::<TelemetryAggregator>()
            .add_systems(PostStartup, setup_overlay)
            .add_systems(Update, refresh_telemetry.in_set(MenuSet::Telemetry))
            .add_systems(
                Update,
                (attach_overlay, update_overlay).chain().in_set(MenuSet::Hud),
            );

        match config.overlay.backend {
            OverlayBackend::TextureQuad => {
                app.add_plugins(TextureQuadPresenter);
            }
            OverlayBackend::ScreenPanel => {
                app.add_plugins(ScreenPanelPresenter);
            }
            OverlayBackend::Headless => {}
        }
    }
}

pub(crate) fn setup_overlay(
    mut commands: Commands,
    mut hud: ResMut<HudOverlay>,
    config: Res<MenuConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let size = windows
        .get_single()
        .ok()
        .map(|w| UVec2::new(w.physical_width(), w.physical_height()))
        .filter(|size| size.x > 0 && size.y > 0)
        .unwrap_or(config.overlay.fallback_display);
    hud.initialize(size.x, size.y);

    let surface = commands
        .spawn((
            OverlaySurface,
            Name::new("hud_overlay_surface"),
            SpatialBundle {
                transform: config.overlay.local_transform(),
                visibility: Visibility::Hidden,
                ..default()
            },
            RenderLayers::layer(config.overlay.render_layer),
        ))
        .id();
    hud.set_surface(surface);
}

fn attach_overlay(
    mut commands: Commands,
    mut hud: ResMut<HudOverlay>,
    collaborators: Res<Collaborators>,
    surfaces: Query<&Transform, With<OverlaySurface>>,
) {
    if hud.phase() != OverlayPhase::Initialized {
        return;
    }
    let (Some(surface), Some(anchor)) = (hud.surface(), collaborators.anchor) else {
        return;
    };
    let Ok(local) = surfaces.get(surface) else {
        return;
    };
    let local = *local;
    if hud.attach(anchor) {
        reparent_preserving_local(&mut commands, surface, anchor, local);
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn update_overlay(
    time: Res<Time>,
    mut hud: ResMut<HudOverlay>,
    display: Res<DiagnosticsDisplay>,
    telemetry: Res<TelemetryAggregator>,
    state: Res<State<LevelSelectState>>,
    catalog: Res<SceneCatalog>,
    host: Option<Res<SceneHostHandle>>,
    mut surfaces: Query<&mut Visibility, With<OverlaySurface>>,
) {
    hud.tick(time.delta(), **display);

    if hud.is_visible() {
        let menu = if *state.get() == LevelSelectState::Browsing {
            let current = host.as_ref().map_or(0, |h| h.0.current_index());
            scene_menu_lines(&catalog, current)
        } else {
            Vec::new()
        };
        hud.compose(telemetry.lines().iter().chain(menu.iter().map(String::as_str)));
    }

    let Some(surface) = hud.surface() else {
        return;
    };
    if let Ok(mut visibility) = surfaces.get_mut(surface) {
        let wanted = if hud.is_visible() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

fn scene_menu_lines(catalog: &SceneCatalog, current: usize) -> Vec<String> {
    let mut lines = vec!["Scenes".to_string()];
    lines.extend(catalog.iter().enumerate().map(|(i, scene)| {
        let marker = if i == current { '>' } else { ' ' };
        format!("{marker} {scene}")
    }));
    lines
}
