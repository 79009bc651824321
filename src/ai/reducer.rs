use crate::mvi::Reducer;

use super::intent::AskIntent;
use super::state::AskState;

/// Answers only land while their own question is still pending; anything
/// else (a newer question, a clear) makes them stale.
pub struct AskReducer;

impl Reducer for AskReducer {
    type State = AskState;
    type Intent = AskIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            AskIntent::Started { item_id } => AskState::Loading { item_id },

            AskIntent::Answered { item_id, text } if state.is_loading_for(item_id) => {
                AskState::Success { item_id, text }
            }

            AskIntent::Failed { item_id, message } if state.is_loading_for(item_id) => {
                AskState::Error { item_id, message }
            }

            AskIntent::Answered { .. } | AskIntent::Failed { .. } => state,

            AskIntent::Cleared => AskState::Idle,
        }
    }
}
