//! Classifier loader state machine
//!
//! ```text
//! Unloaded ─Begin─▶ Loading ─StrictLoaded──▶ Ready
//!                     │     ─LenientLoaded─▶ Degraded
//!                     └──── LadderExhausted▶ Failed
//! Ready | Degraded | Failed ─Begin─▶ Loading   (reload)
//! ```

use crate::errors::{NeuroError, Result};
use serde::{Deserialize, Serialize};

/// Loader states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderState {
    /// No load attempted yet
    Unloaded,

    /// Ladder in progress
    Loading,

    /// Training-time architecture loaded strictly (terminal)
    Ready,

    /// Alternate architecture loaded non-strictly (terminal)
    Degraded,

    /// Every rung failed; no model available (terminal)
    Failed,
}

/// Events driving loader transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderEvent {
    Begin,
    StrictLoaded,
    LenientLoaded,
    LadderExhausted,
}

impl LoaderState {
    pub fn transition(&self, event: LoaderEvent) -> Result<LoaderState> {
        use LoaderEvent::*;
        use LoaderState::*;

        let next = match (self, event) {
            (Unloaded | Ready | Degraded | Failed, Begin) => Loading,
            (Loading, StrictLoaded) => Ready,
            (Loading, LenientLoaded) => Degraded,
            (Loading, LadderExhausted) => Failed,
            (from, event) => {
                return Err(NeuroError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = LoaderState::Unloaded
            .transition(LoaderEvent::Begin)
            .unwrap()
            .transition(LoaderEvent::StrictLoaded)
            .unwrap();
        assert_eq!(state, LoaderState::Ready);
    }

    #[test]
    fn test_degraded_and_failed() {
        let loading = LoaderState::Unloaded.transition(LoaderEvent::Begin).unwrap();
        assert_eq!(
            loading.transition(LoaderEvent::LenientLoaded).unwrap(),
            LoaderState::Degraded
        );
        assert_eq!(
            loading.transition(LoaderEvent::LadderExhausted).unwrap(),
            LoaderState::Failed
        );
    }

    #[test]
    fn test_reload_from_terminal_states() {
        for state in [LoaderState::Ready, LoaderState::Degraded, LoaderState::Failed] {
            assert_eq!(
                state.transition(LoaderEvent::Begin).unwrap(),
                LoaderState::Loading
            );
        }
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(LoaderState::Unloaded
            .transition(LoaderEvent::StrictLoaded)
            .is_err());
        assert!(LoaderState::Loading.transition(LoaderEvent::Begin).is_err());
        assert!(LoaderState::Ready
            .transition(LoaderEvent::LadderExhausted)
            .is_err());
    }
}
