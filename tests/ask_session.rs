//! Answer panel state transitions and the Messages API client.

mod common;

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use cinelist::ai::{AiQueryService, AskClient, AskError, AskSession, AskState};
use cinelist::catalog::ItemId;
use cinelist::config::AiConfig;
use common::mock_api::{MockApi, MockResponse};
use common::movie;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Replays canned answers; each may wait on a gate first.
#[derive(Default)]
struct ScriptedAnswers {
    answers: Mutex<VecDeque<(Result<String, String>, Option<Arc<Notify>>)>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAnswers {
    fn answer(&self, text: &str) {
        self.answers.lock().push_back((Ok(text.to_string()), None));
    }

    fn fail(&self, message: &str) {
        self.answers.lock().push_back((Err(message.to_string()), None));
    }

    fn answer_gated(&self, text: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.answers
            .lock()
            .push_back((Ok(text.to_string()), Some(Arc::clone(&gate))));
        gate
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl AiQueryService for ScriptedAnswers {
    async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        self.prompts.lock().push(prompt.to_string());
        let (result, gate) = self
            .answers
            .lock()
            .pop_front()
            .unwrap_or((Err("no answer scripted".to_string()), None));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result.map_err(|message| AskError::Api {
            status: 500,
            message,
        })
    }
}

async fn wait_for_prompts(service: &ScriptedAnswers, n: usize) {
    tokio::time::timeout(std::time::Duration::from_secs(2), async {
        while service.prompts().len() < n {
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("timed out waiting for prompts");
}

#[tokio::test]
async fn ask_publishes_loading_then_answer() {
    let service = Arc::new(ScriptedAnswers::default());
    let gate = service.answer_gated("A film about soap.");
    let session = Arc::new(AskSession::new(Arc::clone(&service)));
    let mut rx = session.subscribe();

    let asking = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.ask(&movie(550)).await })
    };

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), AskState::Loading { item_id: ItemId(550) });

    gate.notify_one();
    let state = asking.await.unwrap();

    assert_eq!(state.text(), Some("A film about soap."));
    assert_eq!(session.state(), state);
    assert!(service.prompts()[0].contains("\"Movie 550\""));
}

#[tokio::test]
async fn failure_then_retry_succeeds() {
    let service = Arc::new(ScriptedAnswers::default());
    service.fail("overloaded");
    service.answer("Second time lucky.");
    let session = AskSession::new(Arc::clone(&service));

    let state = session.ask(&movie(1)).await;
    assert!(state.error_message().unwrap().contains("overloaded"));

    let state = session.retry().await.unwrap();
    assert_eq!(state.text(), Some("Second time lucky."));

    let prompts = service.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn retry_without_error_is_ignored() {
    let service = Arc::new(ScriptedAnswers::default());
    service.answer("Fine.");
    let session = AskSession::new(Arc::clone(&service));

    assert!(session.retry().await.is_none());
    session.ask(&movie(1)).await;
    assert!(session.retry().await.is_none());
    assert_eq!(service.prompts().len(), 1);
}

#[tokio::test]
async fn newer_question_wins_over_stale_answer() {
    let service = Arc::new(ScriptedAnswers::default());
    let slow = service.answer_gated("about the first");
    service.answer("about the second");
    let session = Arc::new(AskSession::new(Arc::clone(&service)));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.ask(&movie(1)).await })
    };
    wait_for_prompts(&service, 1).await;

    let second = session.ask(&movie(2)).await;
    assert_eq!(second.text(), Some("about the second"));

    slow.notify_one();
    let first = first.await.unwrap();

    assert_eq!(first.item_id(), Some(ItemId(2)));
    assert_eq!(session.state().text(), Some("about the second"));
}

#[tokio::test]
async fn clear_discards_pending_answer() {
    let service = Arc::new(ScriptedAnswers::default());
    let gate = service.answer_gated("too late");
    let session = Arc::new(AskSession::new(Arc::clone(&service)));

    let asking = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.ask(&movie(9)).await })
    };
    wait_for_prompts(&service, 1).await;

    session.clear();
    gate.notify_one();

    assert_eq!(asking.await.unwrap(), AskState::Idle);
    assert_eq!(session.state(), AskState::Idle);
}

fn ai_config(base_url: &str) -> AiConfig {
    AiConfig {
        base_url: base_url.to_string(),
        api_key: Some("sk-test".to_string()),
        model: "test-model".to_string(),
        max_tokens: 256,
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn client_posts_messages_request() {
    let mock = MockApi::start().await;
    mock.enqueue_response(MockResponse::json(
        r#"{"content": [{"type": "text", "text": "Worth a watch."}]}"#,
    ))
    .await;
    let client = AskClient::new(ai_config(&mock.base_url())).unwrap();

    let answer = client.ask("Tell me about Heat").await.unwrap();
    assert_eq!(answer, "Worth a watch.");

    let request = &mock.captured_requests().await[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/messages");
    assert_eq!(request.header("x-api-key"), Some("sk-test"));
    assert_eq!(request.header("anthropic-version"), Some("2023-06-01"));

    let body = request.json_body();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["max_tokens"], 256);
    assert_eq!(body["messages"][0]["content"], "Tell me about Heat");
}

#[tokio::test]
async fn client_surfaces_api_errors() {
    let mock = MockApi::start().await;
    mock.enqueue_response(MockResponse::error(529, "overloaded")).await;
    let client = AskClient::new(ai_config(&mock.base_url())).unwrap();

    match client.ask("hi").await {
        Err(AskError::Api { status, message }) => {
            assert_eq!(status, 529);
            assert!(message.contains("overloaded"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn session_over_real_client_reports_errors() {
    let mock = MockApi::start().await;
    mock.enqueue_response(MockResponse::json(r#"{"content": []}"#))
        .await;
    let session = AskSession::new(AskClient::new(ai_config(&mock.base_url())).unwrap());

    let state = session.ask(&movie(3)).await;
    assert_eq!(
        state,
        AskState::Error {
            item_id: ItemId(3),
            message: AskError::EmptyResponse.to_string(),
        }
    );
}
