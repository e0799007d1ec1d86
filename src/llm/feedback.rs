//! Conversational feedback client.
//!
//! Sends the previous and modified configurations, the schema, and the
//! operator's message to Gemini and returns free-text guidance toward a
//! complete configuration. The schema rides along purely as prompt context;
//! it is never enforced locally.

use anyhow::{Context, Result};
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::providers::gemini;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{ActivityConfig, AppConfig};

use super::strip_code_fences;

const PREAMBLE: &str = "You are an expert in generating helpful feedback and co-design for \
teachers configuring a classroom activity. Your task is to create a conversational response that \
summarizes changes to a configuration, using the word 'we' to refer to work both of you have done \
so far, then provide prompts to guide further changes.";

/// Feedback client producing per-turn spoken and written guidance.
pub struct FeedbackClient {
    agent: Agent<gemini::completion::CompletionModel>, // RIG agent with Gemini backend
    schema: serde_json::Value,                         // Intended-shape schema, prompt context only
}

impl FeedbackClient {
    /// Create a new feedback client holding the loaded schema.
    ///
    /// # Errors
    /// Returns an error if the Gemini client cannot be created.
    pub fn new(config: &AppConfig, schema: serde_json::Value) -> Result<Self> {
        info!("Using Gemini model for feedback: {}", config.gemini_model);

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
                },
                "safetySettings": [
                    {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                    {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
                ]
            }))
            .build();

        Ok(Self { agent, schema })
    }

    /// Generate feedback for the operator after an extraction turn.
    ///
    /// # Arguments
    /// * `previous` - The configuration before this turn
    /// * `modified` - The configuration after extraction
    /// * `user_input` - The operator's message that drove the turn
    ///
    /// # Errors
    /// Returns an error if the remote call fails.
    pub async fn feedback(
        &self,
        previous: &ActivityConfig,
        modified: &ActivityConfig,
        user_input: &str,
    ) -> Result<String> {
        debug!("Requesting feedback for: \"{}\"", user_input);

        use rig::completion::Chat;

        let prompt = feedback_prompt(&self.schema, previous, modified, user_input)?;
        let response = self.agent.chat(prompt, Vec::<rig::message::Message>::new()).await.context("Feedback request failed")?;

        Ok(strip_code_fences(&response).trim().to_string())
    }
}

/// Build the fixed feedback prompt around the JSON payload.
fn feedback_prompt(
    schema: &serde_json::Value,
    previous: &ActivityConfig,
    modified: &ActivityConfig,
    user_input: &str,
) -> Result<String> {
    let payload = json!({
        "original_config": previous,
        "extracted_config": modified,
        "schema": schema,
        "user_input": user_input,
    });
    let json_payload = serde_json::to_string_pretty(&payload).context("Failed to encode feedback payload")?;

    Ok(format!(
        "The following is a JSON object containing the previous configuration, the modified \
         configuration that you and the teacher contributed, and the configuration schema:\n\n\
         {json_payload}\n\n\
         Create a conversational response for the teacher. In your response, do the following:\n\
         1. If the 'user_input' contains any questions related to the configuration:\n\
         \x20   - Provide an answer, but only answer questions about this activity configuration; \
         if unrelated, state that you are an assistant only able to help with activity configurations.\n\
         2. If the extracted configuration contains any changes compared to the previous configuration:\n\
         \x20   - Briefly report the types of changes made.\n\
         \x20   - If a project name and at least one phase, board, and group were provided, state \
         'Everything looks good!'; if one is missing, state 'To complete the configuration...' \
         followed by a clear and concise prompt to provide one of those missing items.\n\
         \x20   - Do not use any JSON in your response.\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_all_four_sections() {
        let schema = json!({"type": "object"});
        let previous = ActivityConfig::default();
        let modified = ActivityConfig { project_name: "Awesome Project".into(), ..Default::default() };
        let prompt = feedback_prompt(&schema, &previous, &modified, "name it Awesome Project").unwrap();

        let start = prompt.find('{').unwrap();
        let end = prompt.rfind('}').unwrap();
        let payload: serde_json::Value = serde_json::from_str(&prompt[start..=end]).unwrap();

        assert_eq!(payload["original_config"]["project_name"], "");
        assert_eq!(payload["extracted_config"]["project_name"], "Awesome Project");
        assert_eq!(payload["schema"]["type"], "object");
        assert_eq!(payload["user_input"], "name it Awesome Project");
    }

    #[test]
    fn prompt_preserves_completeness_contract() {
        let schema = json!({});
        let prompt =
            feedback_prompt(&schema, &ActivityConfig::default(), &ActivityConfig::default(), "hello").unwrap();

        assert!(prompt.contains("Everything looks good!"));
        assert!(prompt.contains("To complete the configuration..."));
        assert!(prompt.contains("Do not use any JSON"));
    }
}
