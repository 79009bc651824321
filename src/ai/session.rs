//! Drives one answer panel: at most one visible answer, newest question wins.

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::catalog::{CatalogItem, ItemId};
use crate::mvi::Reducer;

use super::intent::AskIntent;
use super::reducer::AskReducer;
use super::state::AskState;
use super::AiQueryService;

#[derive(Debug, Clone)]
struct Question {
    item_id: ItemId,
    prompt: String,
}

#[derive(Default)]
struct Panel {
    state: AskState,
    last: Option<Question>,
}

pub struct AskSession<S> {
    service: S,
    panel: Mutex<Panel>,
    states: watch::Sender<AskState>,
}

impl<S: AiQueryService> AskSession<S> {
    pub fn new(service: S) -> Self {
        let (states, _) = watch::channel(AskState::Idle);
        Self {
            service,
            panel: Mutex::new(Panel::default()),
            states,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AskState> {
        self.states.subscribe()
    }

    pub fn state(&self) -> AskState {
        self.panel.lock().state.clone()
    }

    /// Ask about `item` and wait for the answer. Returns the panel state
    /// afterwards, which is not this answer if a newer question or a
    /// [`clear`](Self::clear) came in meanwhile.
    pub async fn ask<I: CatalogItem>(&self, item: &I) -> AskState {
        let question = Question {
            item_id: item.id(),
            prompt: build_prompt(item),
        };
        self.run(question).await
    }

    /// Ask the last question again. Only from `Error`.
    pub async fn retry(&self) -> Option<AskState> {
        let question = {
            let panel = self.panel.lock();
            match (&panel.state, &panel.last) {
                (AskState::Error { item_id, .. }, Some(last)) if *item_id == last.item_id => {
                    last.clone()
                }
                _ => return None,
            }
        };
        Some(self.run(question).await)
    }

    /// Close the panel. A pending answer is discarded when it arrives.
    pub fn clear(&self) {
        let mut panel = self.panel.lock();
        panel.last = None;
        self.dispatch(&mut panel, AskIntent::Cleared);
    }

    async fn run(&self, question: Question) -> AskState {
        let item_id = question.item_id;
        {
            let mut panel = self.panel.lock();
            panel.last = Some(question.clone());
            self.dispatch(&mut panel, AskIntent::Started { item_id });
        }

        tracing::debug!(item_id = %item_id, "Asking AI about item");
        let intent = match self.service.ask(&question.prompt).await {
            Ok(text) => AskIntent::Answered { item_id, text },
            Err(err) => {
                tracing::warn!(item_id = %item_id, error = %err, "AI request failed");
                AskIntent::Failed {
                    item_id,
                    message: err.to_string(),
                }
            }
        };

        let mut panel = self.panel.lock();
        self.dispatch(&mut panel, intent);
        panel.state.clone()
    }

    fn dispatch(&self, panel: &mut Panel, intent: AskIntent) {
        let current = std::mem::take(&mut panel.state);
        panel.state = AskReducer::reduce(current, intent);
        let next = panel.state.clone();
        self.states.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Question text for `item`, built from its title and overview.
pub fn build_prompt<I: CatalogItem>(item: &I) -> String {
    let mut prompt = format!("Tell me about the {} \"{}\".", I::KIND, item.title());
    let overview = item.overview().trim();
    if !overview.is_empty() {
        prompt.push_str("\n\nOverview: ");
        prompt.push_str(overview);
    }
    prompt.push_str(
        "\n\nIn a few short paragraphs, without spoilers, describe its themes, \
         reception, and who would enjoy it.",
    );
    prompt
}
