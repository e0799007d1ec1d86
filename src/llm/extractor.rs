//! Configuration extraction client.
//!
//! Sends the operator's utterance and the current configuration to Gemini
//! and decodes the complete updated configuration from the reply. The
//! previous system utterance, when present, rides along as chat history so
//! the model can resolve references like "yes, add that board".

use anyhow::{Context, Result};
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::message::Message;
use rig::providers::gemini;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{ActivityConfig, AppConfig};

use super::{ResponseError, strip_code_fences};

const PREAMBLE: &str = "You are an expert in extracting structured activity configuration values \
from a teacher's plain-language description of a classroom collaboration activity. You update the \
given JSON configuration with every project name, phase, board, group, account, or \
resource-visibility rule the teacher provides, preserving values the teacher did not mention. You \
respond with the complete updated configuration as JSON and nothing else.";

/// Extraction client for turning utterances into configuration updates.
pub struct ConfigExtractor {
    agent: Agent<gemini::completion::CompletionModel>, // RIG agent with Gemini backend
}

impl ConfigExtractor {
    /// Create a new extraction client.
    ///
    /// # Errors
    /// Returns an error if the Gemini client cannot be created.
    pub fn new(config: &AppConfig) -> Result<Self> {
        info!("Using Gemini model for extraction: {}", config.gemini_model);

        let client = gemini::Client::builder()
            .api_key(config.gemini_api_key.as_str())
            .build()
            .context("Failed to create Gemini client")?;

        let agent = client
            .agent(&config.gemini_model)
            .preamble(PREAMBLE)
            .temperature(0.2)
            .additional_params(json!({
                "generationConfig": {
                    "maxOutputTokens": 1024,
                    "topP": 0.95,
                    "topK": 40
                }
            }))
            .build();

        Ok(Self { agent })
    }

    /// Extract an updated configuration from the operator's message.
    ///
    /// # Arguments
    /// * `user_input` - The operator's latest message
    /// * `current` - The configuration as of the previous turn
    /// * `last_reply` - The previous system utterance, if any
    ///
    /// # Errors
    /// Returns an error if the remote call fails or the reply is not a
    /// configuration. There is no retry; the caller treats this as fatal.
    pub async fn extract(
        &self,
        user_input: &str,
        current: &ActivityConfig,
        last_reply: Option<&str>,
    ) -> Result<ActivityConfig> {
        debug!("Extracting configuration from: \"{}\"", user_input);

        use rig::completion::Chat;

        let prompt = extraction_prompt(user_input, current)?;
        let history: Vec<Message> = last_reply.map(|reply| vec![Message::assistant(reply)]).unwrap_or_default();

        let response = self
            .agent
            .chat(prompt, history)
            .await
            .context("Configuration extraction request failed")?;

        decode_config(&response)
    }
}

/// Build the fixed turn prompt with the configuration and utterance embedded.
fn extraction_prompt(user_input: &str, current: &ActivityConfig) -> Result<String> {
    let payload = json!({
        "current_config": current,
        "user_input": user_input,
    });
    let json_payload = serde_json::to_string_pretty(&payload).context("Failed to encode extraction payload")?;

    Ok(format!(
        "The following is a JSON object containing the current activity configuration and the \
         teacher's latest message:\n\n{json_payload}\n\n\
         Update the configuration with every value the message provides. Keep all values the \
         message does not change. Respond with the complete updated configuration as a single \
         JSON object, with no explanation and no markdown.\n"
    ))
}

/// Decode a model reply into a configuration.
fn decode_config(response: &str) -> Result<ActivityConfig> {
    let stripped = strip_code_fences(response);
    let text = stripped.trim();
    if text.is_empty() {
        return Err(ResponseError::Empty.into());
    }

    let config = serde_json::from_str(text).map_err(ResponseError::from)?;
    Ok(config)
}
