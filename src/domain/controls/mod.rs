pub mod adjust;
pub mod level_select;
pub mod router;

use bevy::input::gamepad::{GamepadConnection, GamepadEvent};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MenuConfig;
use crate::MenuSet;
use adjust::{apply_adjustments, toggle_diagnostics, DiagnosticsDisplay, ParameterAdjustor};
use level_select::{update_level_select, LevelSelectState, SceneCatalog, SceneLoadRequested};
use router::{Direction, InputRouter, LogicalInput, ParamId};

/// One physical source for a logical input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Binding {
    Key(KeyCode),
    Pad(GamepadButtonType),
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybinds {
    pub toggle_menu: Vec<Binding>,
    pub confirm: Vec<Binding>,
    pub diagnostics: Vec<Binding>,
    pub recenter: Vec<Binding>,
    pub tracking: Vec<Binding>,
    pub ipd_down: Vec<Binding>,
    pub ipd_up: Vec<Binding>,
    pub prediction_down: Vec<Binding>,
    pub prediction_up: Vec<Binding>,
    pub fov_down: Vec<Binding>,
    pub fov_up: Vec<Binding>,
    pub height_down: Vec<Binding>,
    pub height_up: Vec<Binding>,
    pub move_scale_down: Vec<Binding>,
    pub move_scale_up: Vec<Binding>,
    pub rotation_scale_down: Vec<Binding>,
    pub rotation_scale_up: Vec<Binding>,
}

impl Default for Keybinds {
    fn default() -> Self {
        use Binding::{Key, Pad};
        Self {
            toggle_menu: vec![Key(KeyCode::ShiftRight), Pad(GamepadButtonType::Start)],
            confirm: vec![Key(KeyCode::Enter), Pad(GamepadButtonType::South)],
            diagnostics: vec![Key(KeyCode::Space)],
            recenter: vec![Key(KeyCode::KeyR)],
            tracking: vec![Key(KeyCode::F2)],
            ipd_down: vec![Key(KeyCode::Digit1)],
            ipd_up: vec![Key(KeyCode::Digit2)],
            fov_down: vec![Key(KeyCode::Digit3)],
            fov_up: vec![Key(KeyCode::Digit4)],
            height_down: vec![Key(KeyCode::Digit5)],
            height_up: vec![Key(KeyCode::Digit6)],
            move_scale_down: vec![Key(KeyCode::Digit7)],
            move_scale_up: vec![Key(KeyCode::Digit8)],
            rotation_scale_down: vec![Key(KeyCode::Digit9)],
            rotation_scale_up: vec![Key(KeyCode::Digit0)],
            prediction_down: vec![Key(KeyCode::Minus)],
            prediction_up: vec![Key(KeyCode::Equal)],
        }
    }
}

impl Keybinds {
    pub fn sources(&self, input: LogicalInput) -> &[Binding] {
        use Direction::{Decrease, Increase};
        match input {
            LogicalInput::ToggleMenu => &self.toggle_menu,
            LogicalInput::Confirm => &self.confirm,
            LogicalInput::ToggleDiagnostics => &self.diagnostics,
            LogicalInput::RecenterPose => &self.recenter,
            LogicalInput::ToggleTracking => &self.tracking,
            LogicalInput::Adjust(id, dir) => match (id, dir) {
                (ParamId::Ipd, Decrease) => &self.ipd_down,
                (ParamId::Ipd, Increase) => &self.ipd_up,
                (ParamId::Prediction, Decrease) => &self.prediction_down,
                (ParamId::Prediction, Increase) => &self.prediction_up,
                (ParamId::Fov, Decrease) => &self.fov_down,
                (ParamId::Fov, Increase) => &self.fov_up,
                (ParamId::Height, Decrease) => &self.height_down,
                (ParamId::Height, Increase) => &self.height_up,
                (ParamId::MoveScale, Decrease) => &self.move_scale_down,
                (ParamId::MoveScale, Increase) => &self.move_scale_up,
                (ParamId::RotationScale, Decrease) => &self.rotation_scale_down,
                (ParamId::RotationScale, Increase) => &self.rotation_scale_up,
            },
        }
    }
}

#[derive(Resource)]
struct ActiveGamepad(Gamepad);

/// Edge-detected menu input, parameter adjustment and level selection.
pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<MenuConfig>()
            .cloned()
            .unwrap_or_default();
        let catalog = SceneCatalog(config.scenes.clone());

        app.insert_resource(config.bindings.clone())
            .insert_resource(ParameterAdjustor::new(&config.increments))
            .insert_state(LevelSelectState::initial(&catalog))
            .insert_resource(catalog)
            .init_resource::<InputRouter>()
            .init_resource::<DiagnosticsDisplay>()
            .add_event::<LogicalInput>()
            .add_event::<SceneLoadRequested>()
            .add_systems(
                Update,
                (track_gamepad, route_input).chain().in_set(MenuSet::Input),
            )
            .add_systems(
                Update,
                (toggle_diagnostics, apply_adjustments, update_level_select).in_set(MenuSet::Apply),
            );
    }
}

fn route_input(
    mut router: ResMut<InputRouter>,
    keybinds: Res<Keybinds>,
    keys: Res<ButtonInput<KeyCode>>,
    my_gamepad: Option<Res<ActiveGamepad>>,
    buttons: Option<Res<ButtonInput<GamepadButton>>>,
    mut ev_input: EventWriter<LogicalInput>,
) {
    let pad = my_gamepad.as_deref().map(|ActiveGamepad(gamepad)| *gamepad);

    let held = |binding: Binding| match binding {
        Binding::Key(key) => keys.pressed(key),
        Binding::Pad(button_type) => match (pad, buttons.as_deref()) {
            (Some(gamepad), Some(buttons)) => {
                buttons.pressed(GamepadButton::new(gamepad, button_type))
            }
            _ => false,
        },
    };

    for edge in router.poll(&keybinds, held) {
        ev_input.send(edge);
    }
}

/// Keeps the first connected pad as the menu pad until it goes away.
fn track_gamepad(
    mut commands: Commands,
    active: Option<Res<ActiveGamepad>>,
    mut pad_events: EventReader<GamepadEvent>,
) {
    let mut current = active.as_deref().map(|ActiveGamepad(pad)| *pad);
    for event in pad_events.read() {
        let GamepadEvent::Connection(change) = event else {
            continue;
        };
        match (&change.connection, current) {
            (GamepadConnection::Connected(info), None) => {
                debug!("menu pad {:?} ({}) connected", change.gamepad, info.name);
                commands.insert_resource(ActiveGamepad(change.gamepad));
                current = Some(change.gamepad);
            }
            (GamepadConnection::Disconnected, Some(pad)) if pad == change.gamepad => {
                debug!("menu pad {pad:?} disconnected");
                commands.remove_resource::<ActiveGamepad>();
                current = None;
            }
            _ => {}
        }
    }
}
