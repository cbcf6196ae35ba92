//! Desktop stand-ins for headset hardware, used by the demo binary and tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

use crate::rig::{CameraControl, Eye, EyeRenderDesc, LatencySample, Locomotion, SceneHost};

/// Field of view reported before any offset is applied.
const BASE_FOV: Vec2 = Vec2::new(90.0, 90.0);

#[derive(Debug, Clone)]
pub struct SimulatedHeadset {
    pub ipd: f32,
    pub prediction: f32,
    pub fov_offset: f32,
    /// Largest offset the device accepts. Larger writes are clamped.
    pub max_fov_offset: Option<f32>,
    pub height_offset: f32,
    pub eye_resolution: UVec2,
    pub texture_scale: f32,
    pub latency: LatencySample,
    pub tracking: bool,
    /// Shared so the count stays readable after the headset is boxed into a rig.
    pub recenters: Arc<AtomicU32>,
}

impl Default for SimulatedHeadset {
    fn default() -> Self {
        Self {
            ipd: 0.064,
            prediction: 0.03,
            fov_offset: 0.0,
            max_fov_offset: None,
            height_offset: 0.0,
            eye_resolution: UVec2::new(1182, 1461),
            texture_scale: 1.0,
            latency: LatencySample {
                render: 0.012,
                timewarp: 0.004,
                post_present: 0.002,
            },
            tracking: true,
            recenters: Arc::default(),
        }
    }
}

impl CameraControl for SimulatedHeadset {
    fn ipd(&self) -> f32 {
        self.ipd
    }

    fn set_ipd(&mut self, ipd: f32) {
        self.ipd = ipd;
    }

    fn prediction(&self) -> f32 {
        self.prediction
    }

    fn set_prediction(&mut self, seconds: f32) {
        self.prediction = seconds;
    }

    fn fov_offset(&self) -> f32 {
        self.fov_offset
    }

    fn set_fov_offset(&mut self, degrees: f32) {
        self.fov_offset = match self.max_fov_offset {
            Some(max) => degrees.min(max),
            None => degrees,
        };
    }

    fn height_offset(&self) -> f32 {
        self.height_offset
    }

    fn set_height_offset(&mut self, meters: f32) {
        self.height_offset = meters;
    }

    fn eye_render_desc(&self, _eye: Eye) -> EyeRenderDesc {
        EyeRenderDesc {
            fov: BASE_FOV + Vec2::splat(self.fov_offset),
            resolution: self.eye_resolution,
        }
    }

    fn texture_scale(&self) -> f32 {
        self.texture_scale
    }

    fn latency(&self) -> LatencySample {
        self.latency
    }

    fn tracking_enabled(&self) -> bool {
        self.tracking
    }

    fn set_tracking_enabled(&mut self, enabled: bool) {
        debug!("simulated tracking {}", if enabled { "on" } else { "off" });
        self.tracking = enabled;
    }

    fn recenter_pose(&mut self) {
        let count = self.recenters.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("simulated headset recentered ({count} times)");
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedLocomotion {
    pub move_scale: f32,
    pub rotation_scale: f32,
    pub halted: bool,
}

impl Default for SimulatedLocomotion {
    fn default() -> Self {
        Self {
            move_scale: 1.0,
            rotation_scale: 1.0,
            halted: false,
        }
    }
}

impl Locomotion for SimulatedLocomotion {
    fn move_scale(&self) -> f32 {
        self.move_scale
    }

    fn set_move_scale(&mut self, scale: f32) {
        self.move_scale = scale;
    }

    fn rotation_scale(&self) -> f32 {
        self.rotation_scale
    }

    fn set_rotation_scale(&mut self, scale: f32) {
        self.rotation_scale = scale;
    }

    fn halted(&self) -> bool {
        self.halted
    }

    fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }
}

/// Scene host that only logs load requests.
#[derive(Debug, Default)]
pub struct LoggingSceneHost {
    pub current: usize,
}

impl SceneHost for LoggingSceneHost {
    fn current_index(&self) -> usize {
        self.current
    }

    fn load_async(&mut self, scene: &str) {
        info!("scene host asked to load {scene}");
    }
}
