use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::utils::url::construct_api_url;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the completion-API credential. Absence is a
/// recoverable, user-visible condition rather than a startup failure.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Optional override for the completions endpoint base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const COMPLETION_TIMEOUT_SECONDS: u64 = 60;

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Error: OPENAI_API_KEY is not set. Set it in the environment to enable AI responses.";
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Error: Could not reach the AI model. Please check your network connection and try again.";
pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while communicating with the AI model.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Sorry, I couldn't generate a response.";

/// System/context prompt embedding the fetched context and the literal user
/// query. Instructs the model to answer from the context alone and to relay
/// any error explanation the context carries.
pub fn build_context_prompt(context: &str, user_input: &str) -> String {
    format!(
        "Context from data source: {context}\n\nUser query: {user_input}\n\n\
         Based ONLY on the context provided, answer the user's query. If the \
         context is insufficient or contains an error message, explain that to \
         the user."
    )
}

/// Client for the stateless chat-completions API. Failures are mapped to
/// user-facing assistant text; nothing here returns an error to the caller.
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
}

impl CompletionClient {
    pub fn new() -> Result<Self, String> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(COMPLETION_TIMEOUT_SECONDS))
            .build()
            .map_err(|err| format!("Failed to build HTTP client: {err}"))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Generate the assistant's reply for one submission. The returned string
    /// is always suitable for appending to the transcript: on any failure it
    /// is the user-facing error text described in the error taxonomy.
    pub async fn complete(
        &self,
        api_key: Option<&str>,
        model: &str,
        context: &str,
        user_input: &str,
    ) -> String {
        let Some(api_key) = api_key.map(str::trim).filter(|key| !key.is_empty()) else {
            return MISSING_CREDENTIAL_MESSAGE.to_string();
        };

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: build_context_prompt(context, user_input),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_input.to_string(),
                },
            ],
            stream: false,
        };

        let url = construct_api_url(&self.base_url, "chat/completions");
        debug!(%url, model, "Requesting completion");

        let response = match self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_connect() || err.is_timeout() => {
                return NETWORK_FAILURE_MESSAGE.to_string();
            }
            Err(_) => return UNEXPECTED_ERROR_MESSAGE.to_string(),
        };

        let status = response.status();
        if !status.is_success() {
            return format!(
                "Error: Could not get a response from the AI model (Status: {}). \
                 Please check your API credentials and that the model '{model}' is available.",
                status.as_u16()
            );
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => body
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .unwrap_or_else(|| EMPTY_RESPONSE_MESSAGE.to_string()),
            Err(_) => UNEXPECTED_ERROR_MESSAGE.to_string(),
        }
    }
}
