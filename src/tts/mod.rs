//! Text-to-speech module.
//!
//! Synthesizes spoken feedback into MP3 artifacts and plays them through an
//! OS shell player.

mod speaker;

pub use speaker::{Speaker, SpeechError};
