//! Contracts for the subsystems the menu drives but does not own.
//!
//! The host application attaches a [`CameraRig`] and a [`MovementRig`] to its
//! player entities, tags the head entity with [`CenterEyeAnchor`] and inserts
//! a [`SceneHostHandle`]. Everything is looked up exactly once, in
//! `PostStartup`, and the result is kept in [`Collaborators`].

use bevy::prelude::*;

use crate::error::{CollaboratorError, CollaboratorKind};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Eye {
    Left,
    Right,
}

/// Per-eye render description reported by the headset.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct EyeRenderDesc {
    /// Field of view in degrees.
    pub fov: Vec2,
    /// Eye buffer size in pixels before the texture scale is applied.
    pub resolution: UVec2,
}

/// Latency samples in seconds.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct LatencySample {
    pub render: f32,
    pub timewarp: f32,
    pub post_present: f32,
}

pub trait CameraControl: Send + Sync + 'static {
    fn ipd(&self) -> f32;
    fn set_ipd(&mut self, ipd: f32);
    fn prediction(&self) -> f32;
    fn set_prediction(&mut self, seconds: f32);
    fn fov_offset(&self) -> f32;
    fn set_fov_offset(&mut self, degrees: f32);
    fn height_offset(&self) -> f32;
    fn set_height_offset(&mut self, meters: f32);
    fn eye_render_desc(&self, eye: Eye) -> EyeRenderDesc;
    /// Combined native and virtual eye-texture scale.
    fn texture_scale(&self) -> f32;
    fn latency(&self) -> LatencySample;
    fn tracking_enabled(&self) -> bool;
    fn set_tracking_enabled(&mut self, enabled: bool);
    fn recenter_pose(&mut self);
}

pub trait Locomotion: Send + Sync + 'static {
    fn move_scale(&self) -> f32;
    fn set_move_scale(&mut self, scale: f32);
    fn rotation_scale(&self) -> f32;
    fn set_rotation_scale(&mut self, scale: f32);
    fn halted(&self) -> bool;
    fn set_halted(&mut self, halted: bool);
}

pub trait SceneHost: Send + Sync + 'static {
    /// Index of the scene that is running right now.
    fn current_index(&self) -> usize;
    /// Starts loading a scene. Completion is never reported back.
    fn load_async(&mut self, scene: &str);
}

#[derive(Component)]
pub struct CameraRig(pub Box<dyn CameraControl>);

#[derive(Component)]
pub struct MovementRig(pub Box<dyn Locomotion>);

#[derive(Component)]
pub struct CenterEyeAnchor;

#[derive(Resource)]
pub struct SceneHostHandle(pub Box<dyn SceneHost>);

/// Entities chosen at startup. `None` means the subsystem is absent for the
/// whole session.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct Collaborators {
    pub camera: Option<Entity>,
    pub movement: Option<Entity>,
    pub anchor: Option<Entity>,
}

/// Picks the first of `found`, reporting a missing or ambiguous lookup.
pub fn pick<T: Copy>(
    kind: CollaboratorKind,
    found: &[T],
) -> (Option<T>, Option<CollaboratorError>) {
    match found {
        [] => (None, Some(CollaboratorError::Missing(kind))),
        [only] => (Some(*only), None),
        [first, ..] => (
            Some(*first),
            Some(CollaboratorError::Multiple {
                kind,
                count: found.len(),
            }),
        ),
    }
}

fn pick_logged(kind: CollaboratorKind, found: Vec<Entity>) -> Option<Entity> {
    let (chosen, problem) = pick(kind, &found);
    if let Some(problem) = problem {
        warn!("{problem}");
    }
    chosen
}

pub fn resolve_collaborators(
    mut collaborators: ResMut<Collaborators>,
    cameras: Query<Entity, With<CameraRig>>,
    movers: Query<Entity, With<MovementRig>>,
    anchors: Query<Entity, With<CenterEyeAnchor>>,
) {
    collaborators.camera = pick_logged(CollaboratorKind::Camera, cameras.iter().collect());
    collaborators.movement = pick_logged(CollaboratorKind::Movement, movers.iter().collect());
    collaborators.anchor =
        pick_logged(CollaboratorKind::CenterEyeAnchor, anchors.iter().collect());
}
