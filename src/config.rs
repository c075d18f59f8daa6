use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::yomi::YOMI_DATA_FILE;
use crate::JtalkError;

/// Locations of the external tools and assets, plus default voice settings.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "voice_path": "/usr/share/hts-voice/mei/mei_happy.htsvoice", "speed": 1.2 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JtalkConfig {
    /// Synthesizer executable
    pub synthesizer: String,
    /// MeCab dictionary directory passed to the synthesizer
    pub dictionary_dir: PathBuf,
    /// HTS voice model passed to the synthesizer
    pub voice_path: PathBuf,
    /// Audio player executable
    pub player: String,
    /// Arguments given to the player before the file name
    pub player_args: Vec<String>,
    /// Directory holding the two rotating WAV files
    pub wav_dir: PathBuf,
    /// English pronunciation table; `None` looks next to the executable
    pub yomi_path: Option<PathBuf>,
    pub speed: f32,
    pub volume: f32,
}

impl Default for JtalkConfig {
    fn default() -> Self {
        Self {
            synthesizer: "open_jtalk".to_string(),
            dictionary_dir: PathBuf::from("/var/lib/mecab/dic/open-jtalk/naist-jdic"),
            voice_path: PathBuf::from("/usr/share/hts-voice/mei/mei_normal.htsvoice"),
            player: "aplay".to_string(),
            player_args: vec!["-q".to_string()],
            wav_dir: std::env::temp_dir(),
            yomi_path: None,
            speed: 1.0,
            volume: 10.0,
        }
    }
}

impl JtalkConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, JtalkError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, JtalkError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| JtalkError::Config(format!("Failed to parse JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), JtalkError> {
        if self.synthesizer.is_empty() {
            return Err(JtalkError::Config("'synthesizer' must not be empty".to_string()));
        }
        if self.player.is_empty() {
            return Err(JtalkError::Config("'player' must not be empty".to_string()));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(JtalkError::Config(format!(
                "'speed' must be a positive number, got {}",
                self.speed
            )));
        }
        if !self.volume.is_finite() {
            return Err(JtalkError::Config(format!(
                "'volume' must be a finite number, got {}",
                self.volume
            )));
        }
        Ok(())
    }

    /// Path of the pronunciation table: the configured one, or the asset
    /// file next to the running executable.
    pub fn yomi_path(&self) -> PathBuf {
        if let Some(path) = &self.yomi_path {
            return path.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(YOMI_DATA_FILE)))
            .unwrap_or_else(|| PathBuf::from(YOMI_DATA_FILE))
    }
}
