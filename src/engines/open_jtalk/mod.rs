//! Open JTalk text-to-speech engine.
//!
//! Speech is produced by running the `open_jtalk` executable once per unit,
//! with the text on its standard input and a WAV file as output, and played
//! by a separate player process (`aplay -q <file>` by default).
//!
//! # System Requirements
//!
//! On Debian and Ubuntu:
//!
//! ```text
//! sudo apt-get install open-jtalk open-jtalk-mecab-naist-jdic hts-voice-nitech-jp-atr503-m001 alsa-utils
//! ```
//!
//! The default voice is the MMDAgent "mei" model, expected at
//! `/usr/share/hts-voice/mei/mei_normal.htsvoice`:
//!
//! ```text
//! wget https://sourceforge.net/projects/mmdagent/files/MMDAgent_Example/MMDAgent_Example-1.8/MMDAgent_Example-1.8.zip/download -O MMDAgent_Example-1.8.zip
//! unzip MMDAgent_Example-1.8.zip
//! sudo cp -r MMDAgent_Example-1.8/Voice/mei/ /usr/share/hts-voice
//! ```
//!
//! Any other voice or dictionary can be selected through
//! [`JtalkConfig`](crate::JtalkConfig).
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use jtalk_rs::engines::open_jtalk::OpenJtalkEngine;
//! use jtalk_rs::{JtalkConfig, Playback, Player, Synthesizer};
//!
//! let engine = OpenJtalkEngine::from_config(&JtalkConfig::default())?;
//! engine.check_available()?;
//!
//! let (mut synthesizer, mut player) = engine.into_parts();
//! let wav = Path::new("/tmp/hello.wav");
//! synthesizer.synthesize("こんにちは", wav)?;
//! player.play(wav)?.wait()?;
//! # Ok::<(), jtalk_rs::JtalkError>(())
//! ```

pub mod engine;
pub mod executable;
pub mod player;
pub mod synthesizer;

pub use engine::{OpenJtalkEngine, OpenJtalkParams, OpenJtalkParamsBuilder};
pub use executable::find_executable;
pub use player::{ChildPlayback, CommandPlayer};
pub use synthesizer::OpenJtalkSynthesizer;

use std::process::{Child, Command, ExitStatus};
use std::time::Duration;

use crate::resume::CancellationToken;
use crate::JtalkError;

/// How often a cancellable child is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[cfg(unix)]
const SIGINT: i32 = 2;

/// Map a failed `spawn()` of `program` to an error.
fn spawn_error(program: &str, source: std::io::Error) -> JtalkError {
    if source.kind() == std::io::ErrorKind::NotFound {
        JtalkError::ExecutableNotFound(program.to_string())
    } else {
        JtalkError::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

/// Start a cancellable child in its own process group.
///
/// Ctrl-C at the terminal then reaches only this process, and the child is
/// stopped through the cancellation token instead.
fn isolate_from_terminal(command: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    #[cfg(not(unix))]
    let _ = command;
}

/// Wait for `child` to exit, killing it as soon as `cancel` fires.
fn wait_child(
    program: &str,
    child: &mut Child,
    cancel: Option<&CancellationToken>,
) -> Result<ExitStatus, JtalkError> {
    let Some(cancel) = cancel else {
        return Ok(child.wait()?);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if cancel.is_cancelled() {
            log::debug!("Stopping `{program}` on interrupt");
            let _ = child.kill();
            let _ = child.wait();
            return Err(JtalkError::Interrupted {
                program: program.to_string(),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Whether `status` says the child was killed by SIGINT.
#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn sigint_exit_is_an_interrupt() {
        use std::os::unix::process::ExitStatusExt;
        // Raw wait statuses: low bits hold the terminating signal.
        assert!(killed_by_interrupt(&ExitStatus::from_raw(SIGINT)));
        assert!(!killed_by_interrupt(&ExitStatus::from_raw(9)));
        assert!(!killed_by_interrupt(&ExitStatus::from_raw(0)));
        assert!(!killed_by_interrupt(&ExitStatus::from_raw(1 << 8)));
    }

    #[test]
    fn missing_program_maps_to_not_found() {
        let err = spawn_error(
            "open_jtalk",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, JtalkError::ExecutableNotFound(name) if name == "open_jtalk"));
    }
}
