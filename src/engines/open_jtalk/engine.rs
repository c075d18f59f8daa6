use std::path::PathBuf;

use derive_builder::Builder;

use super::executable::find_executable;
use super::player::CommandPlayer;
use super::synthesizer::OpenJtalkSynthesizer;
use crate::{JtalkConfig, JtalkError};

/// Parameters passed to every `open_jtalk` run.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct OpenJtalkParams {
    /// MeCab dictionary directory (`-x`)
    #[builder(setter(into))]
    pub dictionary_dir: PathBuf,
    /// HTS voice model (`-m`)
    #[builder(setter(into))]
    pub voice_path: PathBuf,
    /// Speech speed (`-r`), 1.0 is normal
    pub speed: f32,
    /// Volume in dB (`-g`)
    pub volume: f32,
}

impl Default for OpenJtalkParams {
    fn default() -> Self {
        let config = JtalkConfig::default();
        Self {
            dictionary_dir: config.dictionary_dir,
            voice_path: config.voice_path,
            speed: config.speed,
            volume: config.volume,
        }
    }
}

/// An Open JTalk synthesizer paired with a command line player.
#[derive(Debug, Clone)]
pub struct OpenJtalkEngine {
    synthesizer: OpenJtalkSynthesizer,
    player: CommandPlayer,
}

impl OpenJtalkEngine {
    pub fn new(synthesizer: OpenJtalkSynthesizer, player: CommandPlayer) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Build the engine described by `config`.
    pub fn from_config(config: &JtalkConfig) -> Result<Self, JtalkError> {
        let params = OpenJtalkParamsBuilder::default()
            .dictionary_dir(config.dictionary_dir.clone())
            .voice_path(config.voice_path.clone())
            .speed(config.speed)
            .volume(config.volume)
            .build()
            .map_err(|e| JtalkError::Config(e.to_string()))?;

        log::info!(
            "Using `{}` with voice {} (speed {}, volume {})",
            config.synthesizer,
            params.voice_path.display(),
            params.speed,
            params.volume
        );

        Ok(Self::new(
            OpenJtalkSynthesizer::new(config.synthesizer.clone(), params),
            CommandPlayer::new(config.player.clone(), config.player_args.clone()),
        ))
    }

    /// Make sure both executables can be found before anything is spoken.
    ///
    /// Missing dictionary or voice files are only warned about; the
    /// synthesizer reports them itself.
    pub fn check_available(&self) -> Result<(), JtalkError> {
        for program in [self.synthesizer.program(), self.player.program()] {
            match find_executable(program) {
                Some(path) => log::debug!("Found `{program}` at {}", path.display()),
                None => return Err(JtalkError::ExecutableNotFound(program.to_string())),
            }
        }

        let params = self.synthesizer.params();
        for path in [&params.dictionary_dir, &params.voice_path] {
            if !path.exists() {
                log::warn!("{} does not exist", path.display());
            }
        }
        Ok(())
    }

    pub fn synthesizer(&self) -> &OpenJtalkSynthesizer {
        &self.synthesizer
    }

    pub fn player(&self) -> &CommandPlayer {
        &self.player
    }

    /// Split the engine into the halves driven by the pipeline.
    pub fn into_parts(self) -> (OpenJtalkSynthesizer, CommandPlayer) {
        (self.synthesizer, self.player)
    }
}
