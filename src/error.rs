use std::process::ExitStatus;

#[derive(thiserror::Error, Debug)]
pub enum JtalkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("`{0}` executable is not found.")]
    ExecutableNotFound(String),
    #[error("Failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    SynthesisFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{program}` was interrupted")]
    Interrupted { program: String },
    #[error("Synthesized audio at {path} is unreadable: {reason}")]
    InvalidAudio { path: String, reason: String },
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("Failed to install interrupt handler: {0}")]
    InterruptHandler(String),
}

impl JtalkError {
    /// Whether a child process was stopped by an interrupt rather than failing.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, JtalkError::Interrupted { .. })
    }
}
