//! HTTP client for the Bot API

use super::markup::ReplyMarkup;
use super::types::{ApiResponse, Update};
use super::TelegramError;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Must exceed the long-poll timeout passed to `getUpdates`
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);

/// Longest text `sendMessage` accepts
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Bot API client.
///
/// Deliberately not `Debug`: the method URLs embed the bot token.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    /// `api_url` is the Bot API root, e.g. `https://api.telegram.org`
    pub fn new(token: &str, api_url: &str) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// POST a JSON-encoded method call and unwrap the response envelope
    async fn call<P, R>(&self, method: &'static str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn decode<R: DeserializeOwned>(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<R, TelegramError> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiResponse<R> =
            serde_json::from_str(&body).map_err(|e| TelegramError::Api {
                code: Some(i64::from(status.as_u16())),
                description: format!("Unexpected {method} response: {e}"),
            })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            });
        }

        envelope
            .result
            .ok_or(TelegramError::MissingResult { method })
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut params = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            params["offset"] = json!(offset);
        }
        self.call("getUpdates", &params).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<(), TelegramError> {
        let params = SendMessage {
            chat_id,
            text,
            parse_mode,
            reply_markup,
        };
        let _: IgnoredAny = self.call("sendMessage", &params).await?;
        Ok(())
    }

    /// Upload a local file as a document
    pub async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<(), TelegramError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TelegramError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);
        if let Some(markup) = reply_markup {
            form = form.text("reply_markup", serde_json::to_string(markup)?);
        }

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let _: IgnoredAny = Self::decode("sendDocument", response).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &json!({ "drop_pending_updates": drop_pending_updates }),
            )
            .await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}
