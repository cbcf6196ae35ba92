//! Ways of putting the composed HUD frame in front of the user.
//! - `texture_quad`: render to a texture shown on a head-locked quad.
//! - `screen_panel`: an egui window on the desktop mirror.

mod screen_panel;
mod texture_quad;

pub use screen_panel::ScreenPanelPresenter;
pub use texture_quad::TextureQuadPresenter;
