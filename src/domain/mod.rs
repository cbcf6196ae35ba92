//! Menu logic split by discipline.
//! - `controls`: input routing, parameter stepping, and level selection.
//! - `presentation`: telemetry text and the head-locked HUD overlay.

pub mod controls;
pub mod presentation;

pub use controls::InputPlugin;
pub use presentation::HudPlugin;
