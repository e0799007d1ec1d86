//! CK Designer - a conversational assistant for designing classroom
//! collaboration activities.
//!
//! An operator describes the activity in plain language; each turn the
//! program extracts an updated configuration through Gemini, optionally
//! draws a classroom preview, and answers with spoken and written feedback
//! until the operator types the exit sentinel.

mod config;
mod llm;
mod tts;
mod ui;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use config::{ActivityConfig, AppConfig};
use llm::{ConfigExtractor, FeedbackClient};
use tts::Speaker;

const GREETING: &str = "Hello there! I'm your assistant for setting up classroom collaboration \
activities. Use plain language to tell me about the activity, or describe the project phases or \
board components you would like to use or modify. We'll work together to make sure the project is \
complete and accurate. What activity should we build?";

const EXIT_SENTINEL: &str = "exit";

/// Prompt on stdout and read one trimmed line from stdin.
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

fn is_exit(input: &str) -> bool {
    input.trim() == EXIT_SENTINEL
}

/// Run the turn-based design session until the operator exits.
async fn run(config: &AppConfig) -> Result<()> {
    let mut extracted = ActivityConfig::load(&config.template)?;
    let mut previous = extracted.clone();
    let schema = config::load_schema(&config.schema)?;

    let extractor = ConfigExtractor::new(config)?;
    let feedback_client = FeedbackClient::new(config, schema)?;
    let speaker = Speaker::new(config);

    println!("{GREETING}\n");
    speaker.say(GREETING).await?;

    let mut last_feedback: Option<String> = None;
    let mut input = prompt_line("Teacher response: ")?;

    loop {
        extracted = extractor.extract(&input, &extracted, last_feedback.as_deref()).await?;
        println!("\nExtracted Configuration:");
        println!("{}\nAnalyzing for feedback...\n", extracted.pretty());

        if config.render {
            ui::show(&extracted)?;
        }

        let feedback = feedback_client.feedback(&previous, &extracted, &input).await?;
        println!("{feedback}\n");
        speaker.say(&feedback).await?;
        last_feedback = Some(feedback);

        input = prompt_line("Teacher response (Enter 'exit' to save and quit): ")?;
        if is_exit(&input) {
            break;
        }

        previous = extracted.clone();
    }

    println!("\nFinal Configuration:");
    println!("{}", extracted.pretty());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Populate the process environment from a .env file before clap reads it.
    dotenv::dotenv().ok();

    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .unwrap();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🎓 CK Designer v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }

    config.log_config();

    run(&config).await
}
