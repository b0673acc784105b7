//! Per-chat runtime executor

use super::traits::{ChatTransport, LlmClient, SessionStore};
use crate::content::TheoryLibrary;
use crate::explain::ExplanationService;
use crate::problems::TaskId;
use crate::session::ChatId;
use crate::state_machine::messages;
use crate::state_machine::{transition, DialogueContext, Effect, Event, Reply, Session, TextFormat};
use crate::telegram::MAX_MESSAGE_CHARS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Generic chat runtime that can work with any storage, transport, and LLM implementations.
///
/// Owns one chat: events are processed one at a time, each to completion
/// (explanation requests included), in arrival order.
pub struct ChatRuntime<S, T, L>
where
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    chat_id: ChatId,
    context: DialogueContext,
    storage: S,
    transport: T,
    explainer: Arc<ExplanationService<L>>,
    theory: Arc<TheoryLibrary>,
    event_rx: mpsc::Receiver<Event>,
    idle_timeout: Duration,
}

impl<S, T, L> ChatRuntime<S, T, L>
where
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
    L: LlmClient + 'static,
{
    pub fn new(
        chat_id: ChatId,
        context: DialogueContext,
        storage: S,
        transport: T,
        explainer: Arc<ExplanationService<L>>,
        theory: Arc<TheoryLibrary>,
        event_rx: mpsc::Receiver<Event>,
    ) -> Self {
        Self {
            chat_id,
            context,
            storage,
            transport,
            explainer,
            theory,
            event_rx,
            idle_timeout: super::IDLE_TIMEOUT,
        }
    }

    /// Stop after this long without events
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Process events until every sender is dropped or the chat goes idle
    pub async fn run(mut self) {
        tracing::debug!(chat_id = self.chat_id, "Starting chat runtime");

        loop {
            match timeout(self.idle_timeout, self.event_rx.recv()).await {
                Ok(Some(event)) => self.handle_event(event).await,
                Ok(None) => break,
                Err(_) => {
                    tracing::debug!(chat_id = self.chat_id, "Chat idle, stopping runtime");
                    // Events that slipped in before the close are still handled
                    self.event_rx.close();
                    while let Ok(event) = self.event_rx.try_recv() {
                        self.handle_event(event).await;
                    }
                    break;
                }
            }
        }

        tracing::debug!(chat_id = self.chat_id, "Chat runtime stopped");
    }

    async fn handle_event(&mut self, event: Event) {
        if let Event::UnknownAction { data } = &event {
            tracing::warn!(chat_id = self.chat_id, data = %data, "Unknown button action");
        }
        if let Err(e) = self.process_event(event).await {
            tracing::error!(chat_id = self.chat_id, error = %e, "Error handling event");
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        let mut session = match self.storage.load(self.chat_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(chat_id = self.chat_id, error = %e, "Failed to load session, starting fresh");
                Session::default()
            }
        };

        // Effects may generate follow-up events (explanation results)
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = transition(&session, &self.context, current_event);
            session = result.new_session;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(&session, effect).await? {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(
        &self,
        session: &Session,
        effect: Effect,
    ) -> Result<Option<Event>, String> {
        match effect {
            Effect::Reply(reply) => {
                self.send(&reply).await;
                Ok(None)
            }

            Effect::SendTheory { task } => {
                self.send_theory(task).await;
                Ok(None)
            }

            Effect::RequestExplanation { problem } => {
                tracing::info!(
                    chat_id = self.chat_id,
                    task = ?session.current_task,
                    problem = session.problem_index,
                    "Requesting explanation"
                );
                let outcome = self.explainer.explain(&problem).await;
                Ok(Some(Event::ExplanationReady {
                    correct_answer: problem.answer,
                    outcome,
                }))
            }

            Effect::PersistSession => {
                self.storage.save(self.chat_id, session).await?;
                Ok(None)
            }

            Effect::ClearSession => {
                self.storage.clear(self.chat_id).await?;
                Ok(None)
            }
        }
    }

    /// Send a reply, in several messages if it is over the transport limit.
    ///
    /// Markdown the transport refuses is resent as plain text. If a Markdown
    /// reply cannot be delivered at all the chat gets a generation-failure
    /// notice instead of silence. Failures never stop the runtime.
    async fn send(&self, reply: &Reply) {
        for part in reply.split(MAX_MESSAGE_CHARS) {
            if self.send_part(&part).await {
                continue;
            }
            if reply.format == TextFormat::Markdown {
                if let Err(e) = self
                    .transport
                    .send_reply(self.chat_id, &Reply::plain(messages::GENERATION_FAILED))
                    .await
                {
                    tracing::error!(chat_id = self.chat_id, error = %e, "Failed to send failure notice");
                }
            }
            return;
        }
    }

    async fn send_part(&self, part: &Reply) -> bool {
        let Err(e) = self.transport.send_reply(self.chat_id, part).await else {
            return true;
        };

        if part.format != TextFormat::Markdown {
            tracing::error!(chat_id = self.chat_id, error = %e, "Failed to send reply");
            return false;
        }

        tracing::warn!(chat_id = self.chat_id, error = %e, "Markdown reply rejected, resending as plain text");
        let plain = Reply {
            format: TextFormat::Plain,
            ..part.clone()
        };
        match self.transport.send_reply(self.chat_id, &plain).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(chat_id = self.chat_id, error = %e, "Failed to send plain-text fallback");
                false
            }
        }
    }

    async fn send_theory(&self, task: TaskId) {
        let Some(document) = self.theory.locate(task).await else {
            tracing::info!(chat_id = self.chat_id, task, "No theory document");
            self.send(&Reply::plain(messages::THEORY_MISSING)).await;
            return;
        };

        if let Err(e) = self.transport.send_document(self.chat_id, &document).await {
            tracing::error!(
                chat_id = self.chat_id,
                task,
                path = %document.path.display(),
                error = %e,
                "Failed to send theory document"
            );
            self.send(&Reply::plain(messages::THEORY_SEND_FAILED)).await;
        }
    }
}
