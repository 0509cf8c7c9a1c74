use crate::providers::base::{ChatBackend, ChatHistory, Turn};
use crate::utils::media::Attachment;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::RwLock;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 120;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google generative-language API client. Conversation state is client-side:
/// the caller's [`ChatHistory`] is serialized into the `contents` array of
/// every request.
pub struct GeminiProvider {
    api_key: String,
    model: RwLock<String>,
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model: RwLock::new(model),
            base_url: BASE_URL.to_string(),
            client: Client::builder()
                .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        let mut provider = Self::new(api_key, model);
        provider.base_url = base_url;
        provider
    }

    async fn generate(&self, contents: Vec<Value>) -> Result<String> {
        let payload = json!({ "contents": contents });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model_name(),
            self.api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .context("Failed to read Gemini API response body")?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            bail!("Gemini API returned {}: {}", status.as_u16(), message);
        }

        Self::parse_response(&body)
    }

    fn parse_response(json: &Value) -> Result<String> {
        let candidate = json["candidates"]
            .as_array()
            .and_then(|arr| arr.first())
            .context("No candidates in Gemini response")?;

        candidate["content"]["parts"]
            .as_array()
            .and_then(|parts| {
                parts
                    .iter()
                    .find_map(|p| p["text"].as_str().map(std::string::ToString::to_string))
            })
            .context("No text part in Gemini response")
    }

    fn history_to_contents(history: &ChatHistory) -> Vec<Value> {
        history
            .turns
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role,
                    "parts": [{"text": turn.text}]
                })
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for GeminiProvider {
    async fn send(&self, history: &mut ChatHistory, prompt: &str) -> Result<String> {
        let mut contents = Self::history_to_contents(history);
        contents.push(json!({
            "role": "user",
            "parts": [{"text": prompt}]
        }));

        let reply = self.generate(contents).await?;

        // Record both turns only once the call has succeeded
        history.push(Turn::user(prompt));
        history.push(Turn::model(reply.clone()));

        Ok(reply)
    }

    async fn generate_once(&self, attachment: &Attachment, prompt: &str) -> Result<String> {
        let contents = vec![json!({
            "role": "user",
            "parts": [
                {
                    "inline_data": {
                        "mime_type": attachment.mime,
                        "data": BASE64.encode(&attachment.bytes),
                    }
                },
                {"text": prompt}
            ]
        })];

        self.generate(contents).await
    }

    fn model_name(&self) -> String {
        self.model.read().map(|m| m.clone()).unwrap_or_default()
    }

    fn set_model(&self, model: String) {
        if let Ok(mut current) = self.model.write() {
            *current = model;
        }
    }
}

#[cfg(test)]
mod tests;
