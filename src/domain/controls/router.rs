use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Binding, Keybinds};

/// A runtime-tunable float owned by the camera or movement subsystem.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ParamId {
    Ipd,
    Prediction,
    Fov,
    Height,
    MoveScale,
    RotationScale,
}

impl ParamId {
    pub const ALL: [ParamId; 6] = [
        ParamId::Ipd,
        ParamId::Prediction,
        ParamId::Fov,
        ParamId::Height,
        ParamId::MoveScale,
        ParamId::RotationScale,
    ];

    pub fn is_camera(self) -> bool {
        matches!(
            self,
            ParamId::Ipd | ParamId::Prediction | ParamId::Fov | ParamId::Height
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn sign(self) -> i64 {
        match self {
            Direction::Increase => 1,
            Direction::Decrease => -1,
        }
    }
}

/// One logical button of the menu. Sent as an event once per rising edge.
#[derive(Event, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LogicalInput {
    ToggleMenu,
    Confirm,
    ToggleDiagnostics,
    RecenterPose,
    ToggleTracking,
    Adjust(ParamId, Direction),
}

impl LogicalInput {
    /// Every logical input, in the order edges are reported within a tick.
    pub fn all() -> impl Iterator<Item = LogicalInput> {
        [
            LogicalInput::ToggleMenu,
            LogicalInput::Confirm,
            LogicalInput::ToggleDiagnostics,
            LogicalInput::RecenterPose,
            LogicalInput::ToggleTracking,
        ]
        .into_iter()
        .chain(ParamId::ALL.into_iter().flat_map(|id| {
            [
                LogicalInput::Adjust(id, Direction::Decrease),
                LogicalInput::Adjust(id, Direction::Increase),
            ]
        }))
    }
}

/// Turns held button state into rising edges.
///
/// Every physical source keeps its own previous sample, so a second source
/// going down while the first is still held is an edge too. There is no
/// queue: an edge that is not observed on the tick it happens is gone.
#[derive(Resource, Default, Debug)]
pub struct InputRouter {
    previous: HashMap<(LogicalInput, Binding), bool>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples every bound source once and returns the logical inputs with
    /// at least one source that went from released to held since the last
    /// poll. Each logical input is reported at most once.
    pub fn poll(
        &mut self,
        keybinds: &Keybinds,
        mut held: impl FnMut(Binding) -> bool,
    ) -> Vec<LogicalInput> {
        let mut edges = Vec::new();
        for input in LogicalInput::all() {
            let mut rose = false;
            for &binding in keybinds.sources(input) {
                let down = held(binding);
                let was_down = self.previous.insert((input, binding), down).unwrap_or(false);
                rose |= down && !was_down;
            }
            if rose {
                edges.push(input);
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MENU_KEY: Binding = Binding::Key(KeyCode::ShiftRight);
    const MENU_PAD: Binding = Binding::Pad(GamepadButtonType::Start);

    fn only(held: &[Binding]) -> impl FnMut(Binding) -> bool + '_ {
        move |binding| held.contains(&binding)
    }

    #[test]
    fn held_button_fires_once() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();

        assert_eq!(
            router.poll(&binds, only(&[MENU_KEY])),
            vec![LogicalInput::ToggleMenu]
        );
        for _ in 0..5 {
            assert!(router.poll(&binds, only(&[MENU_KEY])).is_empty());
        }
    }

    #[test]
    fn release_rearms_the_edge() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();
        let enter = [Binding::Key(KeyCode::Enter)];

        assert_eq!(router.poll(&binds, only(&enter)).len(), 1);
        assert!(router.poll(&binds, only(&[])).is_empty());
        assert_eq!(
            router.poll(&binds, only(&enter)),
            vec![LogicalInput::Confirm]
        );
    }

    #[test]
    fn second_source_rising_while_first_held_fires() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();

        assert_eq!(
            router.poll(&binds, only(&[MENU_PAD])),
            vec![LogicalInput::ToggleMenu]
        );
        assert_eq!(
            router.poll(&binds, only(&[MENU_PAD, MENU_KEY])),
            vec![LogicalInput::ToggleMenu]
        );
        assert!(router.poll(&binds, only(&[MENU_PAD, MENU_KEY])).is_empty());
    }

    #[test]
    fn both_sources_rising_together_fire_once() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();

        assert_eq!(
            router.poll(&binds, only(&[MENU_PAD, MENU_KEY])),
            vec![LogicalInput::ToggleMenu]
        );
    }

    #[test]
    fn simultaneous_edges_are_reported_once_each() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();
        let held = [Binding::Key(KeyCode::Digit4), MENU_KEY];

        assert_eq!(
            router.poll(&binds, only(&held)),
            vec![
                LogicalInput::ToggleMenu,
                LogicalInput::Adjust(ParamId::Fov, Direction::Increase),
            ]
        );
    }

    #[test]
    fn every_logical_input_is_polled() {
        let binds = Keybinds::default();
        let mut router = InputRouter::new();
        let edges = router.poll(&binds, |_| true);
        assert_eq!(edges.len(), 5 + ParamId::ALL.len() * 2);
    }
}
