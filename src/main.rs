use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use vr_menu::config::MenuConfig;
use vr_menu::rig::{CameraRig, CenterEyeAnchor, MovementRig, SceneHostHandle};
use vr_menu::simulated::{LoggingSceneHost, SimulatedHeadset, SimulatedLocomotion};
use vr_menu::VrMenuPlugin;

const CONFIG_ENV: &str = "VR_MENU_CONFIG";
const DEFAULT_CONFIG: &str = "vr_menu.toml";

/// Walking speed at a move scale of 1, in metres per second.
const WALK_SPEED: f32 = 1.5;
/// Turning speed at a rotation scale of 1, in radians per second.
const TURN_SPEED: f32 = 1.2;

fn main() {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "vr-menu: desktop headset preview".into(),
                        resolution: (1280., 800.).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn,vr_menu=debug".into(),
                    ..default()
                }),
        )
        // Config is read after LogPlugin so fallback warnings reach the log.
        .add_plugins(VrMenuPlugin {
            config: MenuConfig::load_or_default(&path),
        })
        .add_systems(Startup, (setup_rig, setup_scene))
        .add_systems(Update, walk)
        .run();
}

fn setup_rig(mut commands: Commands) {
    commands
        .spawn((
            Camera3dBundle {
                transform: Transform::from_xyz(0.0, 1.7, 4.0),
                ..default()
            },
            CameraRig(Box::new(SimulatedHeadset::default())),
            MovementRig(Box::new(SimulatedLocomotion::default())),
            Name::new("player"),
        ))
        .with_children(|player| {
            player.spawn((SpatialBundle::default(), CenterEyeAnchor, Name::new("center_eye")));
        });
    commands.insert_resource(SceneHostHandle(Box::new(LoggingSceneHost::default())));
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(20.0, 20.0)),
        material: materials.add(Color::srgb(0.3, 0.35, 0.3)),
        ..default()
    });
    for i in 0..5 {
        let x = (i as f32 - 2.0) * 1.5;
        commands.spawn(PbrBundle {
            mesh: meshes.add(Cuboid::new(0.5, 0.5, 0.5)),
            material: materials.add(Color::srgb(0.8, 0.3 + 0.1 * i as f32, 0.2)),
            transform: Transform::from_xyz(x, 0.25, 0.0),
            ..default()
        });
    }
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.8, 0.4, 0.0)),
        ..default()
    });
}

/// WASD walking and arrow-key turning, scaled and gated by the locomotion rig.
fn walk(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut players: Query<(&mut Transform, &MovementRig)>,
) {
    for (mut transform, rig) in players.iter_mut() {
        if rig.0.halted() {
            continue;
        }
        let dt = time.delta_seconds();

        let mut turn = 0.0;
        if keys.pressed(KeyCode::ArrowLeft) {
            turn += 1.0;
        }
        if keys.pressed(KeyCode::ArrowRight) {
            turn -= 1.0;
        }
        transform.rotate_y(turn * TURN_SPEED * rig.0.rotation_scale() * dt);

        let mut step = Vec3::ZERO;
        if keys.pressed(KeyCode::KeyW) {
            step += *transform.forward();
        }
        if keys.pressed(KeyCode::KeyS) {
            step -= *transform.forward();
        }
        if keys.pressed(KeyCode::KeyD) {
            step += *transform.right();
        }
        if keys.pressed(KeyCode::KeyA) {
            step -= *transform.right();
        }
        step.y = 0.0;
        transform.translation += step.normalize_or_zero() * WALK_SPEED * rig.0.move_scale() * dt;
    }
}
