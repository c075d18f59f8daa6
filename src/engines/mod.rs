//! Process-backed speech engines.
//!
//! # Available Engines
//!
//! - `open_jtalk` - Open JTalk synthesizer with a command line WAV player
//!   (`aplay` by default)

pub mod open_jtalk;
