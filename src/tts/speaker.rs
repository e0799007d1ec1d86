//! Spoken feedback pipeline: remote synthesis, tempo raise, shell playback.
//!
//! Each utterance is fetched as MP3 from the translate TTS endpoint in
//! sentence-sized chunks, written to `feedback.mp3`, re-encoded at a higher
//! tempo into `feedback_faster.mp3` with ffmpeg, and played through the
//! platform's shell player. Every step blocks the turn.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Normal-speed artifact written each turn (also the file that is played).
pub const SPOKEN_FILE: &str = "feedback.mp3";
/// Tempo-raised artifact written each turn.
pub const FAST_FILE: &str = "feedback_faster.mp3";

const SYNTH_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The synthesis endpoint rejects long inputs; text is chunked under this cap.
const MAX_CHUNK_CHARS: usize = 180;

/// Errors from the speech pipeline.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech synthesis endpoint returned HTTP {status}")]
    Http { status: u16 },
    #[error("{name} not found on PATH")]
    Missing { name: &'static str },
    #[error("{name} exited with {status}")]
    Tool { name: &'static str, status: std::process::ExitStatus },
}

/// Speech synthesizer and player for per-turn feedback.
pub struct Speaker {
    http: reqwest::Client, // Shared HTTP client for the synthesis endpoint
    lang: String,          // Synthesis language code
    speedup: f32,          // Tempo factor for the fast artifact
    audio_dir: PathBuf,    // Where both artifacts are written
    muted: bool,           // Skip the whole pipeline when set
}

impl Speaker {
    /// Create a new speaker from the application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            lang: config.tts_lang.clone(),
            speedup: config.tts_speedup,
            audio_dir: config.audio_dir.clone(),
            muted: config.mute,
        }
    }

    /// Speak a piece of text, blocking until playback finishes.
    ///
    /// Overwrites both MP3 artifacts in the audio directory. A no-op when
    /// muted or when the text contains nothing speakable.
    ///
    /// # Errors
    /// Returns an error if synthesis, re-encoding, or playback fails.
    pub async fn say(&self, text: &str) -> Result<()> {
        if self.muted {
            return Ok(());
        }

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Ok(());
        }

        info!("Initiating AI voice ({} chunk(s))...", chunks.len());

        let mut audio = Vec::new();
        for chunk in &chunks {
            audio.extend(self.fetch_chunk(chunk).await?);
        }

        let spoken = self.audio_dir.join(SPOKEN_FILE);
        tokio::fs::write(&spoken, &audio)
            .await
            .with_context(|| format!("Failed to write {}", spoken.display()))?;

        let fast = self.audio_dir.join(FAST_FILE);
        self.speed_up(&spoken, &fast).await?;

        self.play(&spoken).await
    }

    /// Fetch MP3 audio for one chunk from the synthesis endpoint.
    async fn fetch_chunk(&self, text: &str) -> Result<Vec<u8>> {
        let url = synth_url(text, &self.lang);
        debug!("Fetching speech chunk ({} chars)", text.chars().count());

        let response = self.http.get(&url).send().await.context("Speech synthesis request failed")?;
        if !response.status().is_success() {
            return Err(SpeechError::Http { status: response.status().as_u16() }.into());
        }

        let body = response.bytes().await.context("Failed to read synthesized audio")?;
        Ok(body.to_vec())
    }

    /// Re-encode the spoken file at a higher tempo.
    async fn speed_up(&self, input: &Path, output: &Path) -> Result<()> {
        let filter = atempo_chain(self.speedup);
        let status = Command::new("ffmpeg")
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-filter:a", &filter])
            .arg(output)
            .status()
            .await
            .map_err(|_| SpeechError::Missing { name: "ffmpeg" })?;

        if !status.success() {
            return Err(SpeechError::Tool { name: "ffmpeg", status }.into());
        }
        Ok(())
    }

    /// Play an MP3 file through the platform's shell player.
    async fn play(&self, path: &Path) -> Result<()> {
        let (name, args) = player_command();
        let status = Command::new(name)
            .args(args)
            .arg(path)
            .status()
            .await
            .map_err(|_| SpeechError::Missing { name })?;

        if !status.success() {
            return Err(SpeechError::Tool { name, status }.into());
        }
        Ok(())
    }
}

/// Pick the shell player for the current platform.
fn player_command() -> (&'static str, &'static [&'static str]) {
    #[cfg(target_os = "macos")]
    {
        ("afplay", &[])
    }

    #[cfg(not(target_os = "macos"))]
    {
        ("mpg123", &["-q"])
    }
}

/// Build the synthesis URL for one chunk.
fn synth_url(text: &str, lang: &str) -> String {
    format!("{SYNTH_ENDPOINT}?ie=UTF-8&client=tw-ob&tl={}&q={}", lang, urlencoding::encode(text))
}

/// Decompose a tempo factor into an ffmpeg atempo filter chain.
///
/// A single atempo stage only accepts factors in [0.5, 2.0]; larger factors
/// are split into stages whose product equals the requested factor.
fn atempo_chain(factor: f32) -> String {
    let mut remaining = factor;
    let mut stages = Vec::new();

    while remaining > 2.0 {
        stages.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        stages.push(0.5);
        remaining /= 0.5;
    }
    stages.push(remaining);

    stages.iter().map(|stage| format!("atempo={stage}")).collect::<Vec<_>>().join(",")
}

/// Split text into sentences on terminal punctuation and newlines.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);

        if c == '.' || c == '!' || c == '?' || c == '\n' {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }

    sentences
}

/// Pack sentences into synthesis-sized chunks.
///
/// Sentences are grouped up to the cap; a single over-long sentence is split
/// on whitespace so no chunk ever exceeds the cap.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let mut push_current = |current: &mut String, chunks: &mut Vec<String>| {
        if !current.is_empty() {
            chunks.push(std::mem::take(current));
        }
    };

    for sentence in split_sentences(text) {
        for piece in split_oversized(&sentence, max_chars) {
            let needed = piece.chars().count() + if current.is_empty() { 0 } else { 1 };
            if current.chars().count() + needed > max_chars {
                push_current(&mut current, &mut chunks);
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }
    push_current(&mut current, &mut chunks);

    chunks
}

/// Split one sentence on whitespace into pieces no longer than the cap.
fn split_oversized(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in sentence.split_whitespace() {
        let word_len = word.chars().count();
        let needed = word_len + if current.is_empty() { 0 } else { 1 };

        if !current.is_empty() && current.chars().count() + needed > max_chars {
            pieces.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            // A single unbreakable token; hard-cut it.
            pieces.extend(
                word.chars()
                    .collect::<Vec<_>>()
                    .chunks(max_chars)
                    .map(|c| c.iter().collect::<String>()),
            );
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atempo_chain_single_stage() {
        assert_eq!(atempo_chain(1.5), "atempo=1.5");
        assert_eq!(atempo_chain(2.0), "atempo=2");
    }

    #[test]
    fn atempo_chain_splits_large_factors() {
        assert_eq!(atempo_chain(3.0), "atempo=2,atempo=1.5");
        assert_eq!(atempo_chain(8.0), "atempo=2,atempo=2,atempo=2");
    }

    #[test]
    fn atempo_chain_product_matches_factor() {
        for factor in [1.0_f32, 1.3, 2.0, 3.0, 4.5, 7.9] {
            let product: f32 = atempo_chain(factor)
                .split(',')
                .map(|stage| stage.trim_start_matches("atempo=").parse::<f32>().unwrap())
                .product();
            assert!((product - factor).abs() < 1e-4, "factor {factor} -> {product}");
        }
    }

    #[test]
    fn atempo_stages_stay_in_legal_range() {
        for stage in atempo_chain(7.3).split(',') {
            let value: f32 = stage.trim_start_matches("atempo=").parse().unwrap();
            assert!((0.5..=2.0).contains(&value));
        }
    }

    #[test]
    fn synth_url_encodes_query() {
        let url = synth_url("Everything looks good!", "en");
        assert!(url.starts_with(SYNTH_ENDPOINT));
        assert!(url.contains("tl=en"));
        assert!(url.contains("q=Everything%20looks%20good%21"));
    }

    #[test]
    fn split_sentences_on_punctuation_and_newlines() {
        let sentences = split_sentences("Hello there! We added two phases.\nWhat next?");
        assert_eq!(sentences, vec!["Hello there!", "We added two phases.", "What next?"]);
    }

    #[test]
    fn chunking_groups_short_sentences() {
        let chunks = chunk_text("One. Two. Three.", 180);
        assert_eq!(chunks, vec!["One. Two. Three."]);
    }

    #[test]
    fn chunking_respects_the_cap() {
        let text = "word ".repeat(100);
        for chunk in chunk_text(&text, 40) {
            assert!(chunk.chars().count() <= 40, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn chunking_preserves_all_words() {
        let text = "The project has three phases. Planning comes first, then development, then testing.";
        let joined = chunk_text(text, 30).join(" ");
        for word in ["project", "phases.", "Planning", "testing."] {
            assert!(joined.contains(word));
        }
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 180).is_empty());
        assert!(chunk_text("   \n  ", 180).is_empty());
    }
}
