//! Bounded dialogue manager for the tutor chat.
//!
//! History is a flat list of turns, always appended in user/assistant
//! pairs. Two caps apply: the window bounds the pairs sent with each
//! request, the retention bounds the entries kept at rest (oldest pairs
//! dropped first). A failed completion never mutates history, so the
//! user can simply retry.

use tracing::debug;

use crate::providers::anthropic::CompletionClient;
use crate::providers::shared::{ChatMessage, ProviderResult};
use crate::session::SessionStore;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Window and retention caps, from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DialogueLimits {
    /// Exchange pairs included in each request.
    pub window: usize,
    /// History entries (individual turns) retained per session at rest.
    pub retention: usize,
}

/// Builds the message list for one completion request: the last `window`
/// pairs of history in chronological order, then the new user turn. The
/// system instruction travels separately and is not counted here.
pub fn compose_request(history: &[Turn], user_text: &str, window: usize) -> Vec<ChatMessage> {
    let skip = history.len().saturating_sub(window * 2);
    let mut messages: Vec<ChatMessage> = history[skip..]
        .iter()
        .map(|turn| ChatMessage::new(turn.role.as_str(), turn.text.clone()))
        .collect();
    messages.push(ChatMessage::new(Role::User.as_str(), user_text));
    messages
}

/// Appends one successful exchange and enforces the retention cap in
/// history entries, dropping the oldest whole pairs first.
pub fn record_exchange(
    history: &mut Vec<Turn>,
    user_text: &str,
    assistant_text: &str,
    retention: usize,
) {
    history.push(Turn::user(user_text));
    history.push(Turn::assistant(assistant_text));

    let mut excess = history.len().saturating_sub(retention);
    // Never split an exchange pair.
    excess += excess % 2;
    if excess > 0 {
        history.drain(..excess);
    }
}

/// Runs one tutor turn for a chat.
///
/// Blank input is a no-op (`Ok(None)`, no model call). On success the
/// exchange is appended to the session's history; on failure the error
/// propagates and the session is left untouched.
pub async fn run_turn(
    sessions: &SessionStore,
    chat_id: i64,
    client: &CompletionClient,
    system: &str,
    user_text: &str,
    limits: DialogueLimits,
) -> ProviderResult<Option<String>> {
    let trimmed = user_text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let history = sessions
        .with_session(chat_id, |session| session.history.clone())
        .await;
    let messages = compose_request(&history, trimmed, limits.window);
    debug!(chat_id, turns = messages.len(), "composing tutor request");

    let reply = client.complete(system, &messages).await?;

    sessions
        .with_session(chat_id, |session| {
            record_exchange(&mut session.history, trimmed, &reply, limits.retention);
        })
        .await;

    Ok(Some(reply))
}

#[cfg(test)]
mod tests {
    use super::{DialogueLimits, Role, Turn, compose_request, record_exchange, run_turn};
    use crate::providers::anthropic::{CompletionClient, CompletionConfig};
    use crate::session::SessionStore;

    fn history_of(turns: u32) -> Vec<Turn> {
        let mut history = Vec::new();
        for i in 1..=turns {
            history.push(Turn::user(format!("q{i}")));
            history.push(Turn::assistant(format!("a{i}")));
        }
        history
    }

    #[test]
    fn short_history_is_sent_whole() {
        let history = history_of(3);
        let messages = compose_request(&history, "q4", 8);
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0].content, "q1");
        assert_eq!(messages[6].role, "user");
        assert_eq!(messages[6].content, "q4");
    }

    #[test]
    fn window_keeps_only_the_most_recent_pairs() {
        let history = history_of(12);
        let messages = compose_request(&history, "q13", 8);

        // 8 pairs plus the new user turn.
        assert_eq!(messages.len(), 17);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "q5");
        assert_eq!(messages[15].content, "a12");
        assert_eq!(messages[16].content, "q13");

        // Strictly chronological.
        for pair in messages.chunks(2).take(8) {
            assert_eq!(pair[0].role, "user");
            assert_eq!(pair[1].role, "assistant");
        }
    }

    #[test]
    fn retention_drops_oldest_pairs_first() {
        let mut history = Vec::new();
        for i in 1..=12 {
            record_exchange(&mut history, &format!("q{i}"), &format!("a{i}"), 20);
        }

        // 12 turns produce 24 entries, capped to the most recent 20:
        // turns 1 and 2 are gone, turn 3 onward retained.
        assert_eq!(history.len(), 20);
        assert_eq!(history[0], Turn::user("q3"));
        assert_eq!(history[19], Turn::assistant("a12"));
    }

    #[test]
    fn odd_retention_still_drops_whole_pairs() {
        let mut history = Vec::new();
        for i in 1..=3 {
            record_exchange(&mut history, &format!("q{i}"), &format!("a{i}"), 5);
        }

        // A cap of 5 entries keeps two whole pairs, never half of one.
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], Turn::user("q2"));
    }

    #[test]
    fn retention_is_idempotent_below_the_cap() {
        let mut history = Vec::new();
        record_exchange(&mut history, "q1", "a1", 20);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn blank_input_is_a_no_op() {
        let sessions = SessionStore::new();
        // Never contacted: blank input short-circuits before any request.
        let client = CompletionClient::new(CompletionConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            max_tokens: 64,
            temperature: 0.0,
            request_timeout: std::time::Duration::from_secs(1),
        });

        let limits = DialogueLimits {
            window: 8,
            retention: 20,
        };
        let reply = run_turn(&sessions, 1, &client, "system", "   \n\t", limits)
            .await
            .unwrap();
        assert_eq!(reply, None);

        let len = sessions.with_session(1, |s| s.history.len()).await;
        assert_eq!(len, 0);
    }
}
