use bevy::prelude::*;

use super::router::LogicalInput;
use crate::rig::{Collaborators, MovementRig, SceneHostHandle};

/// Level menu flow. `Loading` is never left once entered.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LevelSelectState {
    #[default]
    Idle,
    CatalogEmpty,
    Browsing,
    Loading,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuVisibility {
    Idle,
    Browsing,
}

impl LevelSelectState {
    pub fn initial(catalog: &SceneCatalog) -> Self {
        if catalog.is_empty() {
            LevelSelectState::CatalogEmpty
        } else {
            LevelSelectState::Idle
        }
    }

    /// The state an input edge leads to, if it changes anything.
    pub fn on_input(self, input: LogicalInput) -> Option<Self> {
        match (self, input) {
            (LevelSelectState::Idle, LogicalInput::ToggleMenu) => Some(LevelSelectState::Browsing),
            (LevelSelectState::Browsing, LogicalInput::ToggleMenu) => Some(LevelSelectState::Idle),
            (LevelSelectState::Browsing, LogicalInput::Confirm) => Some(LevelSelectState::Loading),
            _ => None,
        }
    }

    pub fn visibility(self) -> MenuVisibility {
        match self {
            LevelSelectState::Browsing => MenuVisibility::Browsing,
            _ => MenuVisibility::Idle,
        }
    }

    /// Whether locomotion must be frozen while in this state. `None` means
    /// the flag is left alone.
    pub fn halts_movement(self) -> Option<bool> {
        match self {
            LevelSelectState::Browsing => Some(true),
            LevelSelectState::Idle | LevelSelectState::CatalogEmpty => Some(false),
            LevelSelectState::Loading => None,
        }
    }
}

/// Ordered scene identifiers offered by the menu.
#[derive(Resource, Default, Debug, Clone, Deref)]
pub struct SceneCatalog(pub Vec<String>);

/// Sent once, when the menu commits to loading a scene.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SceneLoadRequested {
    pub scene: String,
}

#[allow(clippy::too_many_arguments)]
pub(super) fn update_level_select(
    mut events: EventReader<LogicalInput>,
    state: Res<State<LevelSelectState>>,
    mut next_state: ResMut<NextState<LevelSelectState>>,
    catalog: Res<SceneCatalog>,
    mut host: Option<ResMut<SceneHostHandle>>,
    collaborators: Res<Collaborators>,
    mut movers: Query<&mut MovementRig>,
    mut ev_load: EventWriter<SceneLoadRequested>,
) {
    let mut current = *state.get();

    for ev in events.read() {
        let Some(next) = current.on_input(*ev) else {
            continue;
        };
        if next == LevelSelectState::Loading {
            let index = host.as_ref().map_or(0, |h| h.0.current_index());
            let Some(scene) = catalog.get(index) else {
                warn!(
                    "current scene index {index} is outside the catalog of {}",
                    catalog.len()
                );
                continue;
            };
            info!("loading scene {scene}");
            if let Some(host) = host.as_mut() {
                host.0.load_async(scene);
            }
            ev_load.send(SceneLoadRequested {
                scene: scene.clone(),
            });
        }
        debug!("level select {current:?} -> {next:?}");
        current = next;
    }

    if current != *state.get() {
        next_state.set(current);
    }

    if let Some(halt) = current.halts_movement() {
        if let Some(mut rig) = collaborators.movement.and_then(|e| movers.get_mut(e).ok()) {
            rig.0.set_halted(halt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(start: LevelSelectState, inputs: &[LogicalInput]) -> LevelSelectState {
        inputs
            .iter()
            .fold(start, |state, &input| state.on_input(input).unwrap_or(state))
    }

    #[test]
    fn toggle_parity_decides_visibility() {
        let catalog = SceneCatalog(vec!["Level1".into()]);
        for edges in 0..7 {
            let inputs = vec![LogicalInput::ToggleMenu; edges];
            let state = run(LevelSelectState::initial(&catalog), &inputs);
            let expected = if edges % 2 == 1 {
                MenuVisibility::Browsing
            } else {
                MenuVisibility::Idle
            };
            assert_eq!(state.visibility(), expected, "{edges} edges");
        }
    }

    #[test]
    fn empty_catalog_never_browses() {
        let catalog = SceneCatalog::default();
        let start = LevelSelectState::initial(&catalog);
        assert_eq!(start, LevelSelectState::CatalogEmpty);

        let inputs = [
            LogicalInput::ToggleMenu,
            LogicalInput::Confirm,
            LogicalInput::ToggleMenu,
            LogicalInput::ToggleMenu,
            LogicalInput::Confirm,
        ];
        let mut state = start;
        for input in inputs {
            state = state.on_input(input).unwrap_or(state);
            assert_eq!(state, LevelSelectState::CatalogEmpty);
        }
    }

    #[test]
    fn non_empty_catalog_starts_idle() {
        let catalog = SceneCatalog(vec!["a".into(), "b".into()]);
        assert_eq!(LevelSelectState::initial(&catalog), LevelSelectState::Idle);
    }

    #[test]
    fn confirm_only_loads_from_browsing() {
        assert_eq!(LevelSelectState::Idle.on_input(LogicalInput::Confirm), None);
        assert_eq!(
            LevelSelectState::Browsing.on_input(LogicalInput::Confirm),
            Some(LevelSelectState::Loading)
        );
    }

    #[test]
    fn loading_is_terminal() {
        for input in [
            LogicalInput::ToggleMenu,
            LogicalInput::Confirm,
            LogicalInput::ToggleDiagnostics,
            LogicalInput::RecenterPose,
        ] {
            assert_eq!(LevelSelectState::Loading.on_input(input), None);
        }
        assert_eq!(LevelSelectState::Loading.halts_movement(), None);
    }

    #[test]
    fn halt_follows_browsing() {
        assert_eq!(LevelSelectState::Browsing.halts_movement(), Some(true));
        assert_eq!(LevelSelectState::Idle.halts_movement(), Some(false));
        assert_eq!(LevelSelectState::CatalogEmpty.halts_movement(), Some(false));
    }
}
