//! Runtime for executing chats
//!
//! Every chat gets its own `ChatRuntime` task fed by a bounded channel, so
//! one chat's events are handled in order while different chats proceed
//! concurrently.

mod executor;
pub mod traits;


pub use executor::ChatRuntime;
pub use traits::*;

use crate::content::TheoryLibrary;
use crate::explain::ExplanationService;
use crate::session::{ChatId, InMemorySessionStore};
use crate::state_machine::{DialogueContext, Event};
use crate::telegram::TelegramClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Pending events a single chat may queue before new ones are dropped
pub const EVENT_QUEUE_CAPACITY: usize = 32;

/// A chat runtime with no events for this long exits and is forgotten
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Type alias for the production manager with concrete implementations
pub type ProductionManager = RuntimeManager<InMemorySessionStore, TelegramClient, ServiceLlmClient>;

/// Manager for all chat runtimes
pub struct RuntimeManager<S, T, L>
where
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    context: DialogueContext,
    storage: Arc<S>,
    transport: Arc<T>,
    explainer: Arc<ExplanationService<L>>,
    theory: Arc<TheoryLibrary>,
    runtimes: Arc<RwLock<HashMap<ChatId, ChatHandle>>>,
    idle_timeout: Duration,
    next_generation: AtomicU64,
}

/// Handle to interact with a running chat
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<Event>,
    /// Distinguishes a restarted runtime from the one it replaced
    generation: u64,
}

impl<S, T, L> RuntimeManager<S, T, L>
where
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    pub fn new(
        context: DialogueContext,
        storage: Arc<S>,
        transport: Arc<T>,
        explainer: ExplanationService<L>,
        theory: TheoryLibrary,
    ) -> Self {
        Self {
            context,
            storage,
            transport,
            explainer: Arc::new(explainer),
            theory: Arc::new(theory),
            runtimes: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: IDLE_TIMEOUT,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Queue an event for a chat, starting its runtime if needed
    pub async fn dispatch(&self, chat_id: ChatId, event: Event) -> Result<(), String> {
        let event_tx = self.get_or_create(chat_id).await;

        match event_tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(chat_id, "Chat queue full, dropping event");
                Err(format!("Event queue for chat {chat_id} is full"))
            }
            Err(TrySendError::Closed(event)) => {
                // Runtime exited; replace it and retry once
                tracing::warn!(chat_id, "Chat runtime gone, restarting");
                self.runtimes.write().await.remove(&chat_id);
                self.get_or_create(chat_id)
                    .await
                    .try_send(event)
                    .map_err(|e| format!("Failed to queue event for chat {chat_id}: {e}"))
            }
        }
    }

    async fn get_or_create(&self, chat_id: ChatId) -> mpsc::Sender<Event> {
        if let Some(handle) = self.runtimes.read().await.get(&chat_id) {
            return handle.event_tx.clone();
        }

        let mut runtimes = self.runtimes.write().await;
        // Another dispatch may have created it while we waited for the lock
        if let Some(handle) = runtimes.get(&chat_id) {
            return handle.event_tx.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let runtime = ChatRuntime::new(
            chat_id,
            self.context.clone(),
            self.storage.clone(),
            self.transport.clone(),
            self.explainer.clone(),
            self.theory.clone(),
            event_rx,
        )
        .with_idle_timeout(self.idle_timeout);

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let registry = self.runtimes.clone();
        tokio::spawn(async move {
            runtime.run().await;
            // Forget the handle unless a replacement runtime already took its place
            let mut runtimes = registry.write().await;
            if runtimes
                .get(&chat_id)
                .is_some_and(|handle| handle.generation == generation)
            {
                runtimes.remove(&chat_id);
            }
        });

        tracing::info!(chat_id, "Started chat runtime");
        runtimes.insert(
            chat_id,
            ChatHandle {
                event_tx: event_tx.clone(),
                generation,
            },
        );
        event_tx
    }

    pub async fn active_runtimes(&self) -> usize {
        self.runtimes.read().await.len()
    }

    /// Drop every handle; runtimes exit once their queues drain
    pub async fn shutdown(&self) {
        let count = {
            let mut runtimes = self.runtimes.write().await;
            let count = runtimes.len();
            runtimes.clear();
            count
        };
        tracing::info!(runtimes = count, "Chat runtimes released");
    }
}
