//! Inbound update routing
//!
//! Long-polls Telegram, turns each update into a dialogue event and hands
//! it to the chat's runtime.

use crate::runtime::{ChatTransport, LlmClient, RuntimeManager, SessionStore};
use crate::session::ChatId;
use crate::state_machine::{Action, Event};
use crate::telegram::{CallbackQuery, Message, TelegramClient, TelegramError, Update, User};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Long-poll timeout passed to `getUpdates`
pub const POLL_TIMEOUT_SECS: u32 = 30;

/// Pause after a failed `getUpdates` call
const ERROR_BACKOFF: Duration = Duration::from_secs(3);

/// An update resolved to its chat and event
#[derive(Debug)]
pub struct Inbound {
    pub chat_id: ChatId,
    pub event: Event,
}

/// Map an update onto a dialogue event.
///
/// Returns `None` for updates the dialogue has no use for: messages without
/// text (stickers, photos) and callbacks detached from any chat message.
pub fn event_from_update(update: Update) -> Option<Inbound> {
    if let Some(query) = update.callback_query {
        return event_from_callback(query);
    }
    update.message.and_then(event_from_message)
}

fn event_from_message(message: Message) -> Option<Inbound> {
    let text = message.text?;
    let event = if is_start_command(&text) {
        Event::Start {
            full_name: message.from.as_ref().map_or_else(String::new, User::full_name),
        }
    } else {
        Event::text(text)
    };
    Some(Inbound {
        chat_id: message.chat.id,
        event,
    })
}

fn event_from_callback(query: CallbackQuery) -> Option<Inbound> {
    let chat_id = query.message?.chat.id;
    let data = query.data.unwrap_or_default();
    let event = match Action::from_callback_data(&data) {
        Some(action) => Event::Action(action),
        None => Event::UnknownAction { data },
    };
    Some(Inbound { chat_id, event })
}

/// `/start`, `/start@SomeBot`, optionally followed by a payload
fn is_start_command(text: &str) -> bool {
    let Some(command) = text.split_whitespace().next() else {
        return false;
    };
    match command.strip_prefix("/start") {
        Some("") => true,
        Some(rest) => rest.strip_prefix('@').is_some_and(|bot| !bot.is_empty()),
        None => false,
    }
}

/// Inbound side of the chat transport
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Long-poll for updates after `offset`
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError> {
        TelegramClient::get_updates(self, offset, timeout_secs).await
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        TelegramClient::answer_callback_query(self, callback_query_id).await
    }
}

/// Polling loop feeding the runtime manager
pub struct Dispatcher<U, S, T, L>
where
    U: UpdateSource,
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    source: U,
    manager: Arc<RuntimeManager<S, T, L>>,
}

impl<U, S, T, L> Dispatcher<U, S, T, L>
where
    U: UpdateSource,
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    pub fn new(source: U, manager: Arc<RuntimeManager<S, T, L>>) -> Self {
        Self { source, manager }
    }

    /// Poll until `cancel` fires
    pub async fn run(&self, cancel: &CancellationToken) {
        let mut offset: Option<i64> = None;
        tracing::info!("Polling for updates");

        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.source.get_updates(offset, POLL_TIMEOUT_SECS) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle(update).await;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "getUpdates failed");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        tracing::info!("Polling stopped");
    }

    async fn handle(&self, update: Update) {
        let update_id = update.update_id;

        // Every button press is acknowledged so the client stops its spinner
        if let Some(query) = &update.callback_query {
            if let Err(e) = self.source.answer_callback_query(&query.id).await {
                tracing::warn!(update_id, user_id = query.from.id, error = %e, "Failed to answer callback query");
            }
        }

        let Some(Inbound { chat_id, event }) = event_from_update(update) else {
            tracing::debug!(update_id, "Ignoring update");
            return;
        };

        if let Err(e) = self.manager.dispatch(chat_id, event).await {
            tracing::error!(update_id, chat_id, error = %e, "Failed to dispatch event");
        }
    }
}
