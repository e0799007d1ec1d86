//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Activity designer application configuration.
///
/// Environment-backed arguments pick up values from a `.env` file loaded at
/// startup.
#[derive(Parser, Debug, Clone)]
#[command(name = "ck-designer")]
#[command(author, version, about = "A conversational designer for classroom collaboration activities", long_about = None)]
pub struct AppConfig {
    /// Path to the activity configuration template
    #[arg(long, default_value = "activity_config_template.json")]
    pub template: PathBuf,

    /// Path to the activity configuration schema
    #[arg(long, default_value = "activity_config_schema.json")]
    pub schema: PathBuf,

    /// API key for the Gemini generative endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model name
    #[arg(long, short = 'm', env = "GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    pub gemini_model: String,

    /// Language code for spoken feedback
    #[arg(long, default_value = "en")]
    pub tts_lang: String,

    /// Tempo factor for the fast spoken-feedback variant (1.0-8.0)
    #[arg(long, default_value = "3.0", value_parser = parse_speedup)]
    pub tts_speedup: f32,

    /// Directory where feedback.mp3 and feedback_faster.mp3 are written
    #[arg(long, default_value = ".")]
    pub audio_dir: PathBuf,

    /// Draw the full-screen classroom preview after each extraction
    #[arg(long)]
    pub render: bool,

    /// Disable speech synthesis and playback (text-only session)
    #[arg(long)]
    pub mute: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.template.exists() {
            anyhow::bail!("Configuration template not found: {}", self.template.display());
        }

        if !self.schema.exists() {
            anyhow::bail!("Configuration schema not found: {}", self.schema.display());
        }

        if !self.mute && !self.audio_dir.is_dir() {
            anyhow::bail!("Audio directory does not exist: {}", self.audio_dir.display());
        }

        if self.gemini_model.trim().is_empty() {
            anyhow::bail!("Gemini model name must not be empty");
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Template: {}", self.template.display());
        info!("  Schema: {}", self.schema.display());
        info!("  Gemini model: {}", self.gemini_model);
        info!("  TTS language: {}", self.tts_lang);
        info!("  TTS speedup: {}", self.tts_speedup);
        info!("  Audio directory: {}", self.audio_dir.display());
        info!("  Classroom preview: {}", if self.render { "on" } else { "off" });
        if self.mute {
            info!("  Speech: muted");
        }
    }
}

/// Parse and validate the tempo factor (1.0-8.0).
fn parse_speedup(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if (1.0..=8.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("speedup must be between 1.0 and 8.0, got {}", value))
    }
}
