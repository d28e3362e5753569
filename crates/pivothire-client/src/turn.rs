use futures::StreamExt;

use crate::client::ChatClient;
use crate::error::{ClientError, Result};
use crate::session::{ChatSession, SessionState};

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The relay finished the turn; input is enabled again
    Completed,
    /// The assistant proposed a project brief awaiting confirmation
    AwaitingConfirmation,
    /// The turn could not be completed; a notice was added to the session
    Failed,
}

/// Send one user message and apply the relayed reply to `session`
///
/// Failures after the user message is accepted are recorded on the session
/// rather than returned, so the dialog stays usable. Nothing is retried.
///
/// # Errors
///
/// Returns `Session` when the session does not accept a message
pub async fn run_turn(client: &ChatClient, session: &mut ChatSession, text: &str) -> Result<TurnOutcome> {
    let history = session.begin_turn(text)?;

    let mut events = match client.open_turn(&history).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(error = %e, "failed to open chat turn");
            session.fail_turn(&e.user_message());
            return Ok(TurnOutcome::Failed);
        }
    };

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                if session.apply(event) {
                    return Ok(outcome(session));
                }
            }
            Err(ClientError::Parse(reason)) => {
                tracing::warn!(%reason, "skipping unreadable relay record");
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat stream broke");
                session.fail_turn(&e.user_message());
                return Ok(TurnOutcome::Failed);
            }
        }
    }

    tracing::warn!("chat stream ended without a done event");
    session.fail_turn("The AI stopped responding before finishing.");
    Ok(TurnOutcome::Failed)
}

const fn outcome(session: &ChatSession) -> TurnOutcome {
    match session.state() {
        SessionState::Review(_) => TurnOutcome::AwaitingConfirmation,
        SessionState::Idle | SessionState::Streaming => TurnOutcome::Completed,
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::session::{MessageKind, SessionError};

    fn sse(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
    }

    async fn relay(response: ResponseTemplate) -> (MockServer, ChatClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(response)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri()).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn text_turn_completes() {
        let (_server, client) = relay(sse(concat!(
            "data: {\"type\":\"text\",\"value\":\"Hel\"}\n\n",
            "data: {\"type\":\"text\",\"value\":\"lo \"}\n\n",
            "data: {\"type\":\"text\",\"value\":\"there\"}\n\n",
            "data: {\"type\":\"done\"}\n\n",
        )))
        .await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(session.messages().last().unwrap().text, "Hello there");
        assert!(session.can_send());
    }

    #[tokio::test]
    async fn tool_call_awaits_confirmation() {
        let (_server, client) = relay(sse(concat!(
            "data: {\"type\":\"tool_call\",\"name\":\"submitProjectRequirements\",",
            "\"arguments\":{\"projectName\":\"Site\",\"projectDescription\":\"Shop\",\"skillsRequired\":[1,2]}}\n\n",
            "data: {\"type\":\"done\"}\n\n",
        )))
        .await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "that's all").await.unwrap();

        assert_eq!(outcome, TurnOutcome::AwaitingConfirmation);
        assert_eq!(session.pending_project().unwrap().project_name, "Site");
        assert!(!session.can_send());
    }

    #[tokio::test]
    async fn relay_error_event_keeps_session_usable() {
        let (_server, client) = relay(sse(concat!(
            "data: {\"type\":\"error\",\"value\":\"AI service stream interrupted: reset\"}\n\n",
            "data: {\"type\":\"done\"}\n\n",
        )))
        .await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(session.error(), Some("AI service stream interrupted: reset"));
        assert!(session.can_send());
    }

    #[tokio::test]
    async fn rejected_request_fails_turn_with_server_message() {
        let (_server, client) = relay(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"message": "Server configuration error: Missing API key.", "type": "configuration_error"}
        })))
        .await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        let notice = session.messages().last().unwrap();
        assert_eq!(notice.kind, MessageKind::Error);
        assert_eq!(notice.text, "Error: Server configuration error: Missing API key.");
        assert!(session.can_send());
    }

    #[tokio::test]
    async fn truncated_stream_fails_turn() {
        let (_server, client) = relay(sse("data: {\"type\":\"text\",\"value\":\"Hel\"}\n\n")).await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        assert!(session.error().is_some());
        assert!(session.can_send());
    }

    #[tokio::test]
    async fn unreadable_record_is_skipped() {
        let (_server, client) = relay(sse(concat!(
            "data: not json\n\n",
            "data: {\"type\":\"text\",\"value\":\"ok\"}\n\n",
            "data: {\"type\":\"done\"}\n\n",
        )))
        .await;
        let mut session = ChatSession::new();

        let outcome = run_turn(&client, &mut session, "hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(session.messages().last().unwrap().text, "ok");
    }

    #[tokio::test]
    async fn busy_session_is_refused_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = ChatClient::new(&server.uri()).unwrap();

        let mut session = ChatSession::new();
        session.begin_turn("first").unwrap();

        let result = run_turn(&client, &mut session, "second").await;

        assert!(matches!(result, Err(ClientError::Session(SessionError::Busy))));
    }
}
