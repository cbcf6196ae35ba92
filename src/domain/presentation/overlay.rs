use std::time::Duration;

use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};

/// Layout resolution the HUD text positions were authored against.
pub const REFERENCE_DISPLAY: Vec2 = Vec2::new(1280.0, 800.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OverlayPhase {
    Uninitialized,
    Initialized,
    AttachedHidden,
    AttachedVisible,
}

/// Size of the HUD texture. Never carries a depth attachment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderTargetSize {
    pub width: u32,
    pub height: u32,
}

impl RenderTargetSize {
    pub fn has_depth(&self) -> bool {
        false
    }

    /// Height of the surface quad when its width is one unit.
    pub fn aspect_height(&self) -> f32 {
        self.height as f32 / self.width.max(1) as f32
    }

    /// A blank colour-only image usable as a camera target.
    pub fn to_image(&self) -> Image {
        let size = Extent3d {
            width: self.width,
            height: self.height,
            ..default()
        };
        let mut image = Image {
            texture_descriptor: TextureDescriptor {
                label: Some("hud_overlay"),
                size,
                dimension: TextureDimension::D2,
                format: TextureFormat::Bgra8UnormSrgb,
                mip_level_count: 1,
                sample_count: 1,
                usage: TextureUsages::TEXTURE_BINDING
                    | TextureUsages::COPY_DST
                    | TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            },
            ..default()
        };
        image.resize(size);
        image
    }
}

/// Marker for the 3D surface the HUD texture is shown on.
#[derive(Component)]
pub struct OverlaySurface;

/// Owns the HUD render target and surface and decides when the HUD is
/// composited at all.
#[derive(Resource, Debug)]
pub struct HudOverlay {
    phase: OverlayPhase,
    target: Option<RenderTargetSize>,
    display_scale: Vec2,
    surface: Option<Entity>,
    anchor: Option<Entity>,
    suppression: Timer,
    frame: Vec<String>,
    compositions: u64,
}

impl HudOverlay {
    pub fn new(startup_suppression: Duration) -> Self {
        Self {
            phase: OverlayPhase::Uninitialized,
            target: None,
            display_scale: Vec2::ONE,
            surface: None,
            anchor: None,
            suppression: Timer::new(startup_suppression, TimerMode::Once),
            frame: Vec::new(),
            compositions: 0,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn render_target(&self) -> Option<RenderTargetSize> {
        self.target
    }

    /// Physical-to-reference ratio, for sizing text only.
    pub fn display_scale(&self) -> Vec2 {
        self.display_scale
    }

    pub fn surface(&self) -> Option<Entity> {
        self.surface
    }

    pub fn anchor(&self) -> Option<Entity> {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.phase == OverlayPhase::AttachedVisible
    }

    pub fn frame(&self) -> &[String] {
        &self.frame
    }

    pub fn compositions(&self) -> u64 {
        self.compositions
    }

    /// Sizes the render target once. Later calls are ignored so the target
    /// keeps its startup size whatever happens to the display.
    pub fn initialize(&mut self, width: u32, height: u32) -> bool {
        if self.phase != OverlayPhase::Uninitialized {
            debug!("HUD target already {:?}, ignoring {width}x{height}", self.target);
            return false;
        }
        self.target = Some(RenderTargetSize { width, height });
        self.display_scale = Vec2::new(width as f32, height as f32) / REFERENCE_DISPLAY;
        self.phase = OverlayPhase::Initialized;
        info!("HUD render target {width}x{height}");
        true
    }

    pub fn set_surface(&mut self, surface: Entity) {
        self.surface = Some(surface);
    }

    /// Records the surface's new parent. The transform bookkeeping happens
    /// in [`reparent_preserving_local`].
    pub fn attach(&mut self, anchor: Entity) -> bool {
        if self.phase != OverlayPhase::Initialized || self.surface.is_none() {
            return false;
        }
        self.anchor = Some(anchor);
        self.phase = OverlayPhase::AttachedHidden;
        info!("HUD surface attached to {anchor:?}");
        true
    }

    /// Shows or hides the surface. Idempotent, and a no-op until attached.
    pub fn set_active(&mut self, visible: bool) {
        self.phase = match (self.phase, visible) {
            (OverlayPhase::AttachedHidden | OverlayPhase::AttachedVisible, true) => {
                OverlayPhase::AttachedVisible
            }
            (OverlayPhase::AttachedHidden | OverlayPhase::AttachedVisible, false) => {
                OverlayPhase::AttachedHidden
            }
            (phase, _) => phase,
        };
        if !self.is_visible() {
            self.frame.clear();
        }
    }

    /// Advances the startup suppression window and derives visibility.
    pub fn tick(&mut self, delta: Duration, show_diagnostics: bool) {
        self.suppression.tick(delta);
        self.set_active(show_diagnostics && self.suppression.finished());
    }

    /// Replaces the frame, but only while something can see it.
    pub fn compose<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) -> bool {
        if !self.is_visible() {
            return false;
        }
        self.frame.clear();
        self.frame.extend(lines.into_iter().map(str::to_owned));
        self.compositions += 1;
        true
    }
}

/// Moves `child` under `parent` without letting its local transform change.
pub fn reparent_preserving_local(
    commands: &mut Commands,
    child: Entity,
    parent: Entity,
    local: Transform,
) {
    commands.entity(child).set_parent(parent).insert(local);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> HudOverlay {
        let mut hud = HudOverlay::new(Duration::from_millis(500));
        hud.initialize(1920, 1080);
        hud.set_surface(Entity::from_raw(1));
        hud.attach(Entity::from_raw(2));
        hud
    }

    #[test]
    fn walks_the_phases_in_order() {
        let mut hud = HudOverlay::new(Duration::ZERO);
        assert_eq!(hud.phase(), OverlayPhase::Uninitialized);
        assert!(!hud.attach(Entity::from_raw(2)));

        assert!(hud.initialize(1920, 1080));
        assert_eq!(hud.phase(), OverlayPhase::Initialized);
        hud.set_active(true);
        assert_eq!(hud.phase(), OverlayPhase::Initialized);

        hud.set_surface(Entity::from_raw(1));
        assert!(hud.attach(Entity::from_raw(2)));
        assert_eq!(hud.phase(), OverlayPhase::AttachedHidden);

        hud.set_active(true);
        assert_eq!(hud.phase(), OverlayPhase::AttachedVisible);
        hud.set_active(false);
        assert_eq!(hud.phase(), OverlayPhase::AttachedHidden);
    }

    #[test]
    fn target_size_is_fixed_at_startup() {
        let mut hud = HudOverlay::new(Duration::ZERO);
        hud.initialize(2560, 1440);
        assert!(!hud.initialize(800, 600));

        let target = hud.render_target().unwrap();
        assert_eq!((target.width, target.height), (2560, 1440));
        assert!(!target.has_depth());
        assert_eq!(hud.display_scale(), Vec2::new(2.0, 1.8));
    }

    #[test]
    fn hiding_twice_equals_hiding_once() {
        let mut once = attached();
        once.set_active(true);
        once.set_active(false);

        let mut twice = attached();
        twice.set_active(true);
        twice.set_active(false);
        twice.set_active(false);

        assert_eq!(once.phase(), twice.phase());
        assert_eq!(once.is_visible(), twice.is_visible());
        assert_eq!(once.frame(), twice.frame());
    }

    #[test]
    fn suppression_window_delays_first_show() {
        let mut hud = attached();
        hud.tick(Duration::from_millis(200), true);
        assert!(!hud.is_visible());
        hud.tick(Duration::from_millis(400), true);
        assert!(hud.is_visible());
        hud.tick(Duration::from_millis(16), false);
        assert!(!hud.is_visible());
    }

    #[test]
    fn hidden_overlay_composes_nothing() {
        let mut hud = attached();
        assert!(!hud.compose(["IPD (mm): 64.0000"]));
        assert_eq!(hud.compositions(), 0);
        assert!(hud.frame().is_empty());

        hud.set_active(true);
        assert!(hud.compose(["IPD (mm): 64.0000"]));
        assert_eq!(hud.frame(), ["IPD (mm): 64.0000".to_string()]);

        hud.set_active(false);
        assert!(hud.frame().is_empty());
    }

    #[test]
    fn image_matches_target_without_depth() {
        let target = RenderTargetSize {
            width: 64,
            height: 32,
        };
        let image = target.to_image();
        assert_eq!(image.texture_descriptor.size.width, 64);
        assert_eq!(image.texture_descriptor.size.height, 32);
        assert_eq!(
            image.texture_descriptor.format,
            TextureFormat::Bgra8UnormSrgb
        );
        assert_eq!(target.aspect_height(), 0.5);
    }
}
