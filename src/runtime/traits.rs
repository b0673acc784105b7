//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::content::TheoryDocument;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::session::ChatId;
use crate::state_machine::{Keyboard, Reply, Session, TextFormat};
use crate::telegram::{ReplyMarkup, TelegramClient};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for per-chat sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session, the dormant one if nothing is stored
    async fn load(&self, chat_id: ChatId) -> Result<Session, String>;

    async fn save(&self, chat_id: ChatId, session: &Session) -> Result<(), String>;

    async fn clear(&self, chat_id: ChatId) -> Result<(), String>;
}

/// Outbound side of the chat transport
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<(), String>;

    /// Send a theory document, hiding the reply keyboard
    async fn send_document(&self, chat_id: ChatId, document: &TheoryDocument)
        -> Result<(), String>;
}

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete an LLM request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn load(&self, chat_id: ChatId) -> Result<Session, String> {
        (**self).load(chat_id).await
    }

    async fn save(&self, chat_id: ChatId, session: &Session) -> Result<(), String> {
        (**self).save(chat_id, session).await
    }

    async fn clear(&self, chat_id: ChatId) -> Result<(), String> {
        (**self).clear(chat_id).await
    }
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<(), String> {
        (**self).send_reply(chat_id, reply).await
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: &TheoryDocument,
    ) -> Result<(), String> {
        (**self).send_document(chat_id, document).await
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).complete(request).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use an `LlmService` as `LlmClient`
pub struct ServiceLlmClient {
    service: Arc<dyn LlmService>,
}

impl ServiceLlmClient {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LlmClient for ServiceLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.service.complete(request).await
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_reply(&self, chat_id: ChatId, reply: &Reply) -> Result<(), String> {
        let markup = reply.keyboard.map(ReplyMarkup::from);
        let parse_mode = match reply.format {
            TextFormat::Plain => None,
            TextFormat::Markdown => Some("Markdown"),
        };
        self.send_message(chat_id, &reply.text, parse_mode, markup.as_ref())
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        document: &TheoryDocument,
    ) -> Result<(), String> {
        let remove = ReplyMarkup::from(Keyboard::Remove);
        TelegramClient::send_document(self, chat_id, &document.path, &document.caption, Some(&remove))
            .await
            .map_err(|e| e.to_string())
    }
}
