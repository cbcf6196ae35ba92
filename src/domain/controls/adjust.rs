use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::router::{Direction, LogicalInput, ParamId};
use crate::rig::{CameraControl, CameraRig, Collaborators, Locomotion, MovementRig};

/// Step applied per adjustment event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Increments {
    pub ipd: f32,
    pub prediction: f32,
    pub fov: f32,
    pub height: f32,
    pub speed_rotation: f32,
}

impl Default for Increments {
    fn default() -> Self {
        Self {
            ipd: 0.0025,
            prediction: 0.001,
            fov: 0.2,
            height: 0.01,
            speed_rotation: 0.05,
        }
    }
}

impl Increments {
    pub fn step(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Ipd => self.ipd,
            ParamId::Prediction => self.prediction,
            ParamId::Fov => self.fov,
            ParamId::Height => self.height,
            ParamId::MoveScale | ParamId::RotationScale => self.speed_rotation,
        }
    }
}

/// A float that lives in another subsystem but is stepped from here.
///
/// Values are rebuilt as `base + steps * step` rather than accumulated, so
/// any interleaving of the same number of ups and downs lands on the same
/// bits. When the owner reports something other than what was last written
/// (it clamped, or someone else moved it) the parameter re-bases.
#[derive(Clone, Copy, Debug)]
pub struct TunableParameter {
    pub id: ParamId,
    pub step: f32,
    base: f32,
    steps: i64,
    last_written: Option<f32>,
}

impl TunableParameter {
    pub fn new(id: ParamId, step: f32) -> Self {
        Self {
            id,
            step,
            base: 0.0,
            steps: 0,
            last_written: None,
        }
    }

    /// Value to write given what the owner currently reports.
    pub fn next_value(&mut self, current: f32, direction: Direction) -> f32 {
        if self.last_written.map(f32::to_bits) != Some(current.to_bits()) {
            self.base = current;
            self.steps = 0;
        }
        self.steps += direction.sign();
        self.base + self.steps as f32 * self.step
    }

    /// Records what the owner reports after writing `written`. A readback
    /// that differs means the owner clamped, so counting restarts there.
    pub fn settle(&mut self, written: f32, readback: f32) {
        if written.to_bits() != readback.to_bits() {
            self.base = readback;
            self.steps = 0;
        }
        self.last_written = Some(readback);
    }
}

/// Parameter reads and writes, routed to whichever subsystem owns the value.
pub struct TunableAccess<'a> {
    pub camera: Option<&'a mut (dyn CameraControl + 'static)>,
    pub movement: Option<&'a mut (dyn Locomotion + 'static)>,
}

impl TunableAccess<'_> {
    pub fn read(&self, id: ParamId) -> Option<f32> {
        if id.is_camera() {
            let camera = self.camera.as_deref()?;
            Some(match id {
                ParamId::Ipd => camera.ipd(),
                ParamId::Prediction => camera.prediction(),
                ParamId::Fov => camera.fov_offset(),
                _ => camera.height_offset(),
            })
        } else {
            let movement = self.movement.as_deref()?;
            Some(match id {
                ParamId::MoveScale => movement.move_scale(),
                _ => movement.rotation_scale(),
            })
        }
    }

    pub fn write(&mut self, id: ParamId, value: f32) -> bool {
        if id.is_camera() {
            let Some(camera) = self.camera.as_deref_mut() else {
                return false;
            };
            match id {
                ParamId::Ipd => camera.set_ipd(value),
                ParamId::Prediction => camera.set_prediction(value),
                ParamId::Fov => camera.set_fov_offset(value),
                _ => camera.set_height_offset(value),
            }
        } else {
            let Some(movement) = self.movement.as_deref_mut() else {
                return false;
            };
            match id {
                ParamId::MoveScale => movement.set_move_scale(value),
                _ => movement.set_rotation_scale(value),
            }
        }
        true
    }
}

/// Steps tunable parameters. Bounds, if any, are enforced by the owners.
#[derive(Resource, Debug)]
pub struct ParameterAdjustor {
    params: HashMap<ParamId, TunableParameter>,
}

impl ParameterAdjustor {
    pub fn new(increments: &Increments) -> Self {
        let params = ParamId::ALL
            .into_iter()
            .map(|id| (id, TunableParameter::new(id, increments.step(id))))
            .collect();
        Self { params }
    }

    /// Moves one parameter by one step and returns what its owner reports
    /// afterwards, or `None` when the owner is absent.
    pub fn apply(
        &mut self,
        id: ParamId,
        direction: Direction,
        access: &mut TunableAccess<'_>,
    ) -> Option<f32> {
        let param = self.params.get_mut(&id)?;
        let current = access.read(id)?;
        let value = param.next_value(current, direction);
        access.write(id, value);
        let readback = access.read(id)?;
        param.settle(value, readback);
        Some(readback)
    }
}

/// The diagnostic-display flag.
#[derive(Resource, Default, Deref, DerefMut, Debug, Clone, Copy)]
pub struct DiagnosticsDisplay(pub bool);

pub(super) fn toggle_diagnostics(
    mut events: EventReader<LogicalInput>,
    mut display: ResMut<DiagnosticsDisplay>,
) {
    for ev in events.read() {
        if *ev == LogicalInput::ToggleDiagnostics {
            display.0 = !display.0;
        }
    }
}

pub(super) fn apply_adjustments(
    mut events: EventReader<LogicalInput>,
    mut adjustor: ResMut<ParameterAdjustor>,
    collaborators: Res<Collaborators>,
    mut cameras: Query<&mut CameraRig>,
    mut movers: Query<&mut MovementRig>,
) {
    let mut camera = collaborators.camera.and_then(|e| cameras.get_mut(e).ok());
    let mut movement = collaborators.movement.and_then(|e| movers.get_mut(e).ok());

    for ev in events.read() {
        match *ev {
            LogicalInput::Adjust(id, direction) => {
                let mut access = TunableAccess {
                    camera: camera.as_mut().map(|rig| &mut *rig.0),
                    movement: movement.as_mut().map(|rig| &mut *rig.0),
                };
                if let Some(value) = adjustor.apply(id, direction, &mut access) {
                    debug!("{id:?} -> {value}");
                }
            }
            LogicalInput::RecenterPose => {
                if let Some(rig) = camera.as_mut() {
                    rig.0.recenter_pose();
                }
            }
            LogicalInput::ToggleTracking => {
                if let Some(rig) = camera.as_mut() {
                    let enabled = !rig.0.tracking_enabled();
                    rig.0.set_tracking_enabled(enabled);
                }
            }
            _ => {}
        }
    }
}
