use crate::core::completion::{CompletionClient, API_KEY_ENV};
use crate::core::config::Config;
use crate::core::message::Message;
use crate::mcp::context;
use crate::mcp::session::McpSession;
use crate::utils::logging::LoggingState;
use std::collections::HashMap;
use tracing::debug;

/// Form field the presentation layer submits the raw input under.
pub const USER_INPUT_FIELD: &str = "user_input";

/// Context stand-in used when no tool-server token is configured.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No external context provided.";

/// The engine's collaborator-facing surface: an append-only transcript, a
/// single-flight processing flag, and the configuration knobs a presentation
/// layer may change.
///
/// All operations run on the caller's event loop and await network calls
/// sequentially; the processing flag is the only concurrency guard, set
/// before the first suspending call and cleared after the assistant message
/// is appended.
pub struct ChatApp {
    config: Config,
    session: McpSession,
    completion: CompletionClient,
    logging: LoggingState,
    messages: Vec<Message>,
    is_processing: bool,
}

impl ChatApp {
    pub fn new(config: Config) -> Result<Self, String> {
        let logging = LoggingState::new(config.log_file.clone());
        Ok(Self {
            session: McpSession::new()?,
            completion: CompletionClient::new()?,
            logging,
            config,
            messages: Vec::new(),
            is_processing: false,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    pub fn model_options(&self) -> &[String] {
        &self.config.model_options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one submission from the presentation layer. Empty or
    /// whitespace-only input is ignored, as is any submission while a prior
    /// one is still in flight; neither appends a message nor touches the
    /// processing flag.
    pub async fn submit(&mut self, form_data: &HashMap<String, String>) {
        let user_input = form_data
            .get(USER_INPUT_FIELD)
            .map(|value| value.trim())
            .unwrap_or_default()
            .to_string();
        if user_input.is_empty() || self.is_processing {
            return;
        }

        self.is_processing = true;
        self.messages.push(Message::user(user_input.clone()));
        self.log_turn("user", &user_input);

        let context = if self.config.token_is_set() {
            context::query_context(&mut self.session, &self.config, &user_input).await
        } else {
            NO_CONTEXT_PLACEHOLDER.to_string()
        };
        debug!(context_len = context.len(), "Context resolved");

        let api_key = std::env::var(API_KEY_ENV).ok();
        let reply = self
            .completion
            .complete(
                api_key.as_deref(),
                &self.config.model_name,
                &context,
                &user_input,
            )
            .await;

        self.log_turn("assistant", &reply);
        self.messages.push(Message::assistant(reply));
        self.is_processing = false;
    }

    /// Empty the transcript and drop the tool-server session.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.session.reset();
    }

    /// Store a new tool-server token and invalidate the session and
    /// discovered tools in the same step, since the new token may map to a
    /// different session or none at all.
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.config.mcp_token = token.into();
        self.session.reset();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model_name = model.into();
    }

    fn log_turn(&self, speaker: &str, content: &str) {
        if let Err(err) = self.logging.log_message(speaker, content) {
            eprintln!("Failed to log message: {err}");
        }
    }
}
