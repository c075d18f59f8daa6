//! # jtalk-rs
//!
//! Reads Japanese text aloud through Open JTalk and a command line audio player.
//!
//! ## Features
//!
//! - **Sentence segmentation**: splits text on `。` and line breaks, keeping the
//!   full stop attached to its sentence and removing stray spaces between
//!   Japanese and Latin script
//! - **English readings**: rewrites English words into katakana using a
//!   pronunciation table
//! - **Overlapped playback**: synthesizes the next sentence while the current
//!   one is playing, through two rotating WAV files
//! - **Resumable interruption**: a cancelled run reports the sentence index to
//!   restart from
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jtalk_rs::engines::open_jtalk::OpenJtalkEngine;
//! use jtalk_rs::pipeline::{PlaybackSlots, SpeechPipeline};
//! use jtalk_rs::resume::ResumeController;
//! use jtalk_rs::{segment, JtalkConfig, SpeakableUnit};
//!
//! let config = JtalkConfig::default();
//! let engine = OpenJtalkEngine::from_config(&config)?;
//! engine.check_available()?;
//!
//! let units: Vec<SpeakableUnit> = segment::parse_lines("こんにちは。今日はいい天気です。", false)
//!     .into_iter()
//!     .map(SpeakableUnit::new)
//!     .collect();
//!
//! let controller = ResumeController::new(None);
//! let (synthesizer, player) = engine.into_parts();
//! let mut pipeline = SpeechPipeline::new(synthesizer, player, PlaybackSlots::in_dir(&config.wav_dir));
//! pipeline.run(&units, controller.start_index(), None, controller.progress(), controller.token())?;
//! # Ok::<(), jtalk_rs::JtalkError>(())
//! ```

pub mod audio;
pub mod config;
pub mod engines;
pub mod error;
#[cfg(feature = "cli")]
pub mod input;
#[cfg(feature = "markdown")]
pub mod markup;
pub mod pipeline;
pub mod resume;
pub mod segment;
pub mod transcribe;
pub mod yomi;

pub use config::JtalkConfig;
pub use error::JtalkError;

use std::path::Path;

use transcribe::EnglishWordTranscriber;

/// One sentence-sized piece of text, spoken as a single synthesizer call.
///
/// Units are produced in one batch from the input text and never change
/// afterwards; their position in the sequence is their identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakableUnit {
    /// Text shown to the user while the unit plays
    pub display_text: String,
    /// Text sent to the synthesizer (may have English words rewritten)
    pub synthesis_text: String,
}

impl SpeakableUnit {
    /// A unit that is spoken exactly as displayed.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            synthesis_text: text.clone(),
            display_text: text,
        }
    }

    /// A unit whose English words are spoken through their katakana readings.
    pub fn transcribed(text: impl Into<String>, transcriber: &EnglishWordTranscriber<'_>) -> Self {
        let display_text = text.into();
        Self {
            synthesis_text: transcriber.transcribe(&display_text),
            display_text,
        }
    }
}

/// Renders text to an audio file.
///
/// A call blocks until the audio file is completely written.
pub trait Synthesizer {
    /// Synthesize `text` into the audio file at `output`, replacing its contents.
    fn synthesize(&mut self, text: &str, output: &Path) -> Result<(), JtalkError>;
}

/// Starts playback of audio files without waiting for them to finish.
pub trait Player {
    /// Handle to a playback that is in progress.
    type Playback: Playback;

    /// Begin playing the audio file at `source` and return immediately.
    fn play(&mut self, source: &Path) -> Result<Self::Playback, JtalkError>;
}

/// A playback started by a [`Player`].
pub trait Playback {
    /// Block until the playback has finished.
    fn wait(&mut self) -> Result<(), JtalkError>;

    /// Stop the playback early. The default leaves it running to completion.
    fn abandon(&mut self) {}
}
