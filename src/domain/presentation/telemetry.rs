use bevy::prelude::*;

use crate::domain::controls::adjust::DiagnosticsDisplay;
use crate::rig::{CameraControl, CameraRig, Collaborators, Eye, LatencySample, Locomotion, MovementRig};

const NOT_AVAILABLE: &str = "N/A";
/// Below this every latency sample is treated as "not measured".
const LATENCY_EPSILON: f32 = 0.000_001;

/// Formatted diagnostic lines. `None` means the owning subsystem is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryLines {
    pub ipd: Option<String>,
    pub prediction: Option<String>,
    pub fov: Option<String>,
    pub height: Option<String>,
    pub resolution: Option<String>,
    pub latency: Option<String>,
    pub multipliers: Option<String>,
    pub tracking: Option<String>,
}

impl TelemetryLines {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.ipd,
            &self.prediction,
            &self.fov,
            &self.height,
            &self.resolution,
            &self.latency,
            &self.multipliers,
            &self.tracking,
        ]
        .into_iter()
        .filter_map(|line| line.as_deref())
    }
}

/// Rebuilds the HUD strings from live subsystem readings, but only while the
/// diagnostics display is on.
#[derive(Resource, Debug, Default)]
pub struct TelemetryAggregator {
    lines: TelemetryLines,
    format_passes: u64,
}

impl TelemetryAggregator {
    pub fn lines(&self) -> &TelemetryLines {
        &self.lines
    }

    /// Number of times the strings have been rebuilt.
    pub fn format_passes(&self) -> u64 {
        self.format_passes
    }

    pub fn refresh(
        &mut self,
        enabled: bool,
        camera: Option<&dyn CameraControl>,
        movement: Option<&dyn Locomotion>,
    ) {
        if !enabled {
            return;
        }
        self.format_passes += 1;

        let lines = &mut self.lines;
        match camera {
            Some(camera) => {
                let left = camera.eye_render_desc(Eye::Left);
                let right = camera.eye_render_desc(Eye::Right);
                lines.ipd = Some(format!("IPD (mm): {}", fixed(camera.ipd() * 1000.0, 4)));
                lines.prediction = Some(format!(
                    "Pred (ms): {}",
                    fixed(camera.prediction() * 1000.0, 1)
                ));
                lines.fov = Some(format!("FOV (deg): {}", fixed(left.fov.y, 3)));
                lines.height = Some(format!("Height (m): {}", fixed(camera.height_offset(), 3)));
                lines.resolution = Some(eye_texture_line(
                    camera.texture_scale(),
                    left.resolution,
                    right.resolution,
                ));
                lines.latency = Some(latency_line(camera.latency()));
                lines.tracking = Some(format!(
                    "Tracking: {}",
                    if camera.tracking_enabled() { "ON" } else { "OFF" }
                ));
            }
            None => {
                lines.ipd = None;
                lines.prediction = None;
                lines.fov = None;
                lines.height = None;
                lines.resolution = None;
                lines.latency = None;
                lines.tracking = None;
            }
        }

        lines.multipliers = movement.map(|movement| {
            format!(
                "Spd.X: {} Rot.X: {}",
                fixed(movement.move_scale(), 2),
                fixed(movement.rotation_scale(), 2)
            )
        });
    }
}

fn fixed(value: f32, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn eye_texture_line(scale: f32, left: UVec2, right: UVec2) -> String {
    let w = scale * (left.x + right.x) as f32;
    let h = scale * left.y.max(right.y) as f32;
    if w.is_finite() && h.is_finite() {
        format!("Resolution : {} x {}", w.trunc(), h.trunc())
    } else {
        format!("Resolution : {NOT_AVAILABLE}")
    }
}

fn latency_line(latency: LatencySample) -> String {
    let LatencySample {
        render,
        timewarp,
        post_present,
    } = latency;
    if render < LATENCY_EPSILON && timewarp < LATENCY_EPSILON && post_present < LATENCY_EPSILON {
        format!("Ren : {NOT_AVAILABLE} TWrp: {NOT_AVAILABLE} PostPresent: {NOT_AVAILABLE}")
    } else {
        format!(
            "Ren : {} TWrp: {} PostPresent: {}",
            fixed(render, 3),
            fixed(timewarp, 3),
            fixed(post_present, 3)
        )
    }
}

pub(super) fn refresh_telemetry(
    mut telemetry: ResMut<TelemetryAggregator>,
    display: Res<DiagnosticsDisplay>,
    collaborators: Res<Collaborators>,
    cameras: Query<&CameraRig>,
    movers: Query<&MovementRig>,
) {
    let camera = collaborators.camera.and_then(|e| cameras.get(e).ok());
    let movement = collaborators.movement.and_then(|e| movers.get(e).ok());
    telemetry.refresh(
        **display,
        camera.map(|rig| &*rig.0),
        movement.map(|rig| &*rig.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{SimulatedHeadset, SimulatedLocomotion};

    #[test]
    fn disabled_display_does_no_work() {
        let mut telemetry = TelemetryAggregator::default();
        let headset = SimulatedHeadset::default();
        let locomotion = SimulatedLocomotion::default();

        for _ in 0..100 {
            telemetry.refresh(false, Some(&headset), Some(&locomotion));
        }
        assert_eq!(telemetry.format_passes(), 0);
        assert_eq!(telemetry.lines(), &TelemetryLines::default());
    }

    #[test]
    fn formats_every_reading() {
        let mut telemetry = TelemetryAggregator::default();
        let headset = SimulatedHeadset::default();
        let locomotion = SimulatedLocomotion::default();

        telemetry.refresh(true, Some(&headset), Some(&locomotion));
        let lines = telemetry.lines();
        assert_eq!(lines.ipd.as_deref(), Some("IPD (mm): 64.0000"));
        assert_eq!(lines.fov.as_deref(), Some("FOV (deg): 90.000"));
        assert_eq!(lines.resolution.as_deref(), Some("Resolution : 2364 x 1461"));
        assert_eq!(
            lines.latency.as_deref(),
            Some("Ren : 0.012 TWrp: 0.004 PostPresent: 0.002")
        );
        assert_eq!(lines.multipliers.as_deref(), Some("Spd.X: 1.00 Rot.X: 1.00"));
        assert_eq!(lines.tracking.as_deref(), Some("Tracking: ON"));
        assert_eq!(telemetry.format_passes(), 1);
    }

    #[test]
    fn silent_latency_reads_not_available() {
        assert_eq!(
            latency_line(LatencySample::default()),
            "Ren : N/A TWrp: N/A PostPresent: N/A"
        );
    }

    #[test]
    fn invalid_readings_degrade_to_placeholder() {
        assert_eq!(fixed(f32::NAN, 3), "N/A");
        assert_eq!(
            eye_texture_line(f32::INFINITY, UVec2::new(10, 10), UVec2::new(10, 10)),
            "Resolution : N/A"
        );
    }

    #[test]
    fn absent_subsystems_drop_their_lines() {
        let mut telemetry = TelemetryAggregator::default();
        let locomotion = SimulatedLocomotion::default();

        telemetry.refresh(true, None, Some(&locomotion));
        let lines: Vec<&str> = telemetry.lines().iter().collect();
        assert_eq!(lines, vec!["Spd.X: 1.00 Rot.X: 1.00"]);
    }
}
