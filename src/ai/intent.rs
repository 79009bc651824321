use crate::catalog::ItemId;
use crate::mvi::Intent;

#[derive(Debug, Clone)]
pub enum AskIntent {
    /// A question about `item_id` was sent.
    Started { item_id: ItemId },

    Answered { item_id: ItemId, text: String },

    Failed { item_id: ItemId, message: String },

    /// Close the answer panel.
    Cleared,
}

impl Intent for AskIntent {}
