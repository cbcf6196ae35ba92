use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::domain::presentation::overlay::HudOverlay;
use crate::domain::presentation::update_overlay;
use crate::MenuSet;

pub struct ScreenPanelPresenter;
impl Plugin for ScreenPanelPresenter {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }
        app.add_systems(
            Update,
            show_hud_panel.after(update_overlay).in_set(MenuSet::Hud),
        );
    }
}

fn show_hud_panel(mut contexts: EguiContexts, hud: Res<HudOverlay>) {
    if hud.is_visible() {
        egui::Window::new("HUD")
            .resizable(false)
            .show(contexts.ctx_mut(), |ui| {
                for line in hud.frame() {
                    ui.monospace(line.as_str());
                }
            });
    }
}
