use std::path::Path;

use crate::JtalkError;

/// Basic facts about a synthesized WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    /// Number of samples per channel
    pub frames: u32,
}

impl AudioInfo {
    /// Read the header of the WAV file at `path`.
    pub fn probe(path: &Path) -> Result<Self, JtalkError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frames: reader.duration(),
        })
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}
