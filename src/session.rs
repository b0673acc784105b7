//! Per-chat session storage
//!
//! Sessions live for the lifetime of the process. A dormant session is
//! never stored: saving one removes the entry.

use crate::runtime::SessionStore;
use crate::state_machine::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Telegram chat identifier
pub type ChatId = i64;

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats with a non-dormant session
    pub async fn active_chats(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: ChatId) -> Result<Session, String> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, chat_id: ChatId, session: &Session) -> Result<(), String> {
        let mut sessions = self.sessions.write().await;
        if session.is_dormant() {
            sessions.remove(&chat_id);
        } else {
            sessions.insert(chat_id, session.clone());
        }
        Ok(())
    }

    async fn clear(&self, chat_id: ChatId) -> Result<(), String> {
        self.sessions.write().await.remove(&chat_id);
        Ok(())
    }
}
