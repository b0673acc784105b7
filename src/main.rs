//! Exam Tutor - Telegram bot for physics exam preparation
//!
//! Serves theory documents, walks users through per-task problem sets and
//! asks a language model for worked explanations on request.

mod config;
mod content;
mod dispatch;
mod explain;
mod llm;
mod problems;
mod runtime;
mod session;
mod state_machine;
mod telegram;

use config::BotConfig;
use content::TheoryLibrary;
use dispatch::Dispatcher;
use explain::ExplanationService;
use llm::{LlmService, LoggingService, OpenAIService};
use problems::ProblemBank;
use runtime::{ProductionManager, ServiceLlmClient};
use session::InMemorySessionStore;
use state_machine::DialogueContext;
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_tutor=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    tracing::info!(config = ?config, "Configuration loaded");

    // Problem bank is read once; a broken file is fatal
    let bank = ProblemBank::load(&config.tasks_path).inspect_err(|e| {
        tracing::error!(path = %config.tasks_path.display(), error = %e, "Failed to load problem bank");
    })?;
    tracing::info!(
        tasks = bank.task_count(),
        problems = bank.problem_count(),
        "Problem bank loaded"
    );

    let theory = TheoryLibrary::new(&config.theory_dir);
    if !theory.dir().is_dir() {
        tracing::warn!(dir = %theory.dir().display(), "Theory directory not found; every task will report missing materials");
    }

    // LLM provider, wrapped for request logging
    let provider: Arc<dyn LlmService> = Arc::new(OpenAIService::new(
        config.llm_api_key.clone(),
        &config.llm_base_url,
        config.llm_model.clone(),
    )?);
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(provider));
    tracing::info!(model = %llm.model_id(), "LLM provider initialized");

    let client = TelegramClient::new(&config.bot_token, &config.telegram_api_url)?;
    client.delete_webhook(true).await?;

    let storage = Arc::new(InMemorySessionStore::new());
    let manager: Arc<ProductionManager> = Arc::new(ProductionManager::new(
        DialogueContext::new(Arc::new(bank)),
        storage.clone(),
        Arc::new(client.clone()),
        ExplanationService::new(ServiceLlmClient::new(llm), config.explanation_policy()),
        theory,
    ));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
            }
            cancel.cancel();
        }
    });

    Dispatcher::new(client, manager.clone()).run(&cancel).await;

    tracing::info!(runtimes = manager.active_runtimes().await, "Stopping chat runtimes");
    manager.shutdown().await;
    tracing::info!(active_chats = storage.active_chats().await, "Bot stopped");
    Ok(())
}
