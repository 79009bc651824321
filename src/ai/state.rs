use crate::catalog::ItemId;
use crate::mvi::UiState;

/// Answer panel for one catalog item.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AskState {
    #[default]
    Idle,

    Loading {
        item_id: ItemId,
    },

    Success {
        item_id: ItemId,
        text: String,
    },

    Error {
        item_id: ItemId,
        message: String,
    },
}

impl UiState for AskState {}

impl AskState {
    /// Item the current answer (or pending question) belongs to.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Idle => None,
            Self::Loading { item_id }
            | Self::Success { item_id, .. }
            | Self::Error { item_id, .. } => Some(*item_id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_loading_for(&self, id: ItemId) -> bool {
        matches!(self, Self::Loading { item_id } if *item_id == id)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
