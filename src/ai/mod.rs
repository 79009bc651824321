//! "Ask about this item": an answer panel backed by an LLM.

mod client;
mod error;
mod intent;
mod reducer;
mod session;
mod state;

pub use client::AskClient;
pub use error::AskError;
pub use intent::AskIntent;
pub use reducer::AskReducer;
pub use session::{build_prompt, AskSession};
pub use state::AskState;

use async_trait::async_trait;

/// Anything that can answer a free-form question.
#[async_trait]
pub trait AiQueryService: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String, AskError>;
}

#[async_trait]
impl<T: AiQueryService + ?Sized> AiQueryService for std::sync::Arc<T> {
    async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        (**self).ask(prompt).await
    }
}
