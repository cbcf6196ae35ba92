use bevy::prelude::*;
use bevy::render::camera::RenderTarget;

use crate::domain::presentation::overlay::HudOverlay;
use crate::domain::presentation::{setup_overlay, update_overlay};
use crate::MenuSet;

/// Text size at the reference display resolution.
const BASE_FONT_SIZE: f32 = 22.0;
const MARGIN: f32 = 24.0;

/// Off-screen camera and text node feeding the HUD texture.
#[derive(Resource)]
struct QuadTargets {
    camera: Entity,
    text: Entity,
}

pub struct TextureQuadPresenter;
impl Plugin for TextureQuadPresenter {
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, setup_texture_quad.after(setup_overlay))
            .add_systems(
                Update,
                present_texture_quad.after(update_overlay).in_set(MenuSet::Hud),
            );
    }
}

fn setup_texture_quad(
    mut commands: Commands,
    hud: Res<HudOverlay>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (Some(target), Some(surface)) = (hud.render_target(), hud.surface()) else {
        warn!("HUD overlay was not initialised, texture quad disabled");
        return;
    };
    let image = images.add(target.to_image());
    let scale = hud.display_scale();

    let camera = commands
        .spawn((
            Camera2dBundle {
                camera: Camera {
                    target: RenderTarget::Image(image.clone()),
                    clear_color: ClearColorConfig::Custom(Color::NONE),
                    order: -1,
                    is_active: false,
                    ..default()
                },
                ..default()
            },
            Name::new("hud_overlay_camera"),
        ))
        .id();

    let text = commands
        .spawn((
            TextBundle::from_section(
                "",
                TextStyle {
                    font_size: BASE_FONT_SIZE * scale.y,
                    color: Color::WHITE,
                    ..default()
                },
            )
            .with_style(Style {
                position_type: PositionType::Absolute,
                left: Val::Px(MARGIN * scale.x),
                top: Val::Px(MARGIN * scale.y),
                ..default()
            }),
            TargetCamera(camera),
        ))
        .id();

    let mesh = meshes.add(Rectangle::new(1.0, target.aspect_height()));
    let material = materials.add(StandardMaterial {
        base_color_texture: Some(image),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        cull_mode: None,
        ..default()
    });
    commands.entity(surface).insert((mesh, material));
    commands.insert_resource(QuadTargets { camera, text });
}

fn present_texture_quad(
    hud: Res<HudOverlay>,
    targets: Option<Res<QuadTargets>>,
    mut cameras: Query<&mut Camera>,
    mut texts: Query<&mut Text>,
) {
    let Some(targets) = targets else {
        return;
    };
    if let Ok(mut camera) = cameras.get_mut(targets.camera) {
        if camera.is_active != hud.is_visible() {
            camera.is_active = hud.is_visible();
        }
    }
    if !hud.is_visible() {
        return;
    }
    let Ok(mut text) = texts.get_mut(targets.text) else {
        return;
    };
    let joined = hud.frame().join("\n");
    if text.sections.first().is_some_and(|s| s.value != joined) {
        text.sections[0].value = joined;
    }
}
