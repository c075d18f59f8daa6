use std::path::Path;
use std::process::{Child, Command, Stdio};

use super::{isolate_from_terminal, killed_by_interrupt, spawn_error, wait_child};
use crate::resume::CancellationToken;
use crate::{JtalkError, Playback, Player};

/// Plays audio files by launching an external player such as `aplay -q`.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    cancel: Option<CancellationToken>,
}

impl CommandPlayer {
    /// A player running `program args... <file>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cancel: None,
        }
    }

    /// Stop playback as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Player for CommandPlayer {
    type Playback = ChildPlayback;

    fn play(&mut self, source: &Path) -> Result<ChildPlayback, JtalkError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(source).stdin(Stdio::null());
        if self.cancel.is_some() {
            isolate_from_terminal(&mut command);
        }
        let child = command
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))?;

        Ok(ChildPlayback {
            program: self.program.clone(),
            child,
            cancel: self.cancel.clone(),
        })
    }
}

/// A running player process.
#[derive(Debug)]
pub struct ChildPlayback {
    program: String,
    child: Child,
    cancel: Option<CancellationToken>,
}

impl Playback for ChildPlayback {
    fn wait(&mut self) -> Result<(), JtalkError> {
        let status = wait_child(&self.program, &mut self.child, self.cancel.as_ref())?;
        if killed_by_interrupt(&status) {
            return Err(JtalkError::Interrupted {
                program: self.program.clone(),
            });
        }
        // Playback problems don't affect the audio of later units.
        if !status.success() {
            log::warn!("`{}` exited with {status}", self.program);
        }
        Ok(())
    }

    fn abandon(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("Could not stop `{}`: {e}", self.program);
        }
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::open_jtalk::find_executable;
    use std::thread;
    use std::time::{Duration, Instant};

    /// A player that keeps "playing" for 30 seconds. The file name lands in
    /// `$1` and is ignored.
    fn endless_player() -> Option<CommandPlayer> {
        if find_executable("sh").is_none() || find_executable("sleep").is_none() {
            return None;
        }
        Some(CommandPlayer::new(
            "sh",
            vec!["-c".to_string(), "sleep 30".to_string(), "sh".to_string()],
        ))
    }

    #[test]
    fn missing_player_is_reported() {
        let mut player = CommandPlayer::new("jtalk-rs-no-such-player", vec!["-q".to_string()]);
        assert!(matches!(
            player.play(Path::new("/tmp/open_jtalk_0.wav")),
            Err(JtalkError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn waits_for_player_to_exit() {
        if find_executable("true").is_none() {
            return;
        }
        let mut player = CommandPlayer::new("true", Vec::new());
        let mut playback = player.play(Path::new("/tmp/open_jtalk_0.wav")).unwrap();
        playback.wait().unwrap();
    }

    #[test]
    fn failing_player_is_not_fatal() {
        if find_executable("false").is_none() {
            return;
        }
        let mut player = CommandPlayer::new("false", Vec::new());
        let mut playback = player.play(Path::new("/tmp/open_jtalk_0.wav")).unwrap();
        assert!(playback.wait().is_ok());
    }

    #[test]
    fn abandon_stops_a_long_playback() {
        let Some(mut player) = endless_player() else {
            return;
        };
        let started = Instant::now();
        let mut playback = player.play(Path::new("/tmp/open_jtalk_0.wav")).unwrap();
        playback.abandon();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn cancellation_stops_a_long_playback() {
        let Some(player) = endless_player() else {
            return;
        };
        let token = CancellationToken::new();
        let mut player = player.with_cancellation(token.clone());
        let started = Instant::now();
        let mut playback = player.play(Path::new("/tmp/open_jtalk_0.wav")).unwrap();

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            token.cancel();
        });
        let err = playback.wait().unwrap_err();
        canceller.join().unwrap();

        assert!(err.is_interrupted());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn cancellable_player_still_reports_normal_exit() {
        if find_executable("true").is_none() {
            return;
        }
        let mut player =
            CommandPlayer::new("true", Vec::new()).with_cancellation(CancellationToken::new());
        let mut playback = player.play(Path::new("/tmp/open_jtalk_0.wav")).unwrap();
        playback.wait().unwrap();
    }
}
