//! Telegram Bot API transport
//!
//! A thin JSON-over-HTTP client for the handful of Bot API methods the
//! tutor needs: long polling, text and document messages, callback
//! acknowledgement and webhook removal.

mod client;
mod markup;
mod types;

pub use client::{TelegramClient, MAX_MESSAGE_CHARS};
pub use markup::ReplyMarkup;
pub use types::*;

use std::path::PathBuf;
use thiserror::Error;

/// Telegram transport errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Connection, timeout or body decoding failure. The request URL (which
    /// carries the bot token) is stripped before the error is stored.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Telegram API error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{method} returned no result")]
    MissingResult { method: &'static str },
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::Http(e.without_url())
    }
}
