//! Per-user session state and the store that owns it.
//!
//! One session per chat, created lazily on first interaction and kept for
//! the process lifetime. Callers never touch the backing map directly;
//! every read or mutation goes through [`SessionStore::with_session`] so
//! the backing could be swapped without touching call sites.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::dialogue::Turn;

/// How inbound free text is interpreted for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigating menus; free text just re-renders the menu.
    #[default]
    Browsing,
    /// Chatting with the tutor; free text becomes a dialogue turn.
    Tutor,
}

/// Per-user mutable state: interpretation mode plus bounded chat history.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub mode: Mode,
    pub history: Vec<Turn>,
}

/// In-memory session store keyed by chat ID.
///
/// Sessions are never evicted. Ordering within one session is guaranteed
/// by the per-chat dispatch queue, not by this lock; the lock only keeps
/// concurrent chats from tearing the map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with exclusive access to the chat's session, creating a
    /// default session on first use.
    pub async fn with_session<R>(&self, chat_id: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(chat_id).or_default();
        f(session)
    }
}

#[cfg(test)]
mod tests {
    use super::{Mode, SessionStore};
    use crate::dialogue::Turn;

    #[tokio::test]
    async fn sessions_are_created_lazily_with_defaults() {
        let store = SessionStore::new();
        let (mode, len) = store
            .with_session(7, |session| (session.mode, session.history.len()))
            .await;
        assert_eq!(mode, Mode::Browsing);
        assert_eq!(len, 0);
    }

    #[tokio::test]
    async fn mutations_persist_across_calls() {
        let store = SessionStore::new();
        store
            .with_session(7, |session| {
                session.mode = Mode::Tutor;
                session.history.push(Turn::user("hola"));
            })
            .await;

        let (mode, len) = store
            .with_session(7, |session| (session.mode, session.history.len()))
            .await;
        assert_eq!(mode, Mode::Tutor);
        assert_eq!(len, 1);
    }

    #[tokio::test]
    async fn sessions_are_independent_per_chat() {
        let store = SessionStore::new();
        store
            .with_session(1, |session| session.mode = Mode::Tutor)
            .await;
        let mode = store.with_session(2, |session| session.mode).await;
        assert_eq!(mode, Mode::Browsing);
    }
}
