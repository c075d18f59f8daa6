//! Overlapped synthesis and playback of speakable units.
//!
//! Units are processed strictly in order. While unit `i - 1` is playing, unit
//! `i` is synthesized into the other of two rotating WAV files; playback of
//! unit `i` starts only after both its synthesis and the playback of unit
//! `i - 1` have finished:
//!
//! ```text
//! synthesize 0 ─ play 0 ──────────┐
//!               synthesize 1 ─────┴─ play 1 ──────┐
//!                                 synthesize 2 ───┴─ play 2 ─ ...
//! ```
//!
//! Slot `i % 2` is rewritten for unit `i` only after the playback of unit
//! `i - 2`, its previous occupant, has been waited for. That ordering is the
//! only thing keeping the writer and the reader of a slot apart.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::resume::{CancellationToken, ProgressCursor, ResumeOffset};
use crate::{JtalkError, Playback, Player, SpeakableUnit, Synthesizer};

/// Prefix of the rotating WAV file names.
pub const WAV_FILE_STEM: &str = "open_jtalk_";

/// The two rotating audio files shared by synthesis and playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSlots {
    paths: [PathBuf; 2],
}

impl PlaybackSlots {
    /// Slots named `open_jtalk_0.wav` and `open_jtalk_1.wav` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            paths: [0, 1].map(|n| dir.join(format!("{WAV_FILE_STEM}{n}.wav"))),
        }
    }

    /// File used by unit `index`.
    pub fn for_unit(&self, index: usize) -> &Path {
        &self.paths[index % 2]
    }
}

impl Default for PlaybackSlots {
    fn default() -> Self {
        Self::in_dir(&std::env::temp_dir())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every unit was synthesized and played to the end.
    Completed,
    /// The run was cancelled while the given unit was in flight.
    Cancelled(ResumeOffset),
}

/// Drives a [`Synthesizer`] and a [`Player`] over a sequence of units.
pub struct SpeechPipeline<S, P> {
    synthesizer: S,
    player: P,
    slots: PlaybackSlots,
    state: PipelineState,
}

impl<S, P> SpeechPipeline<S, P>
where
    S: Synthesizer,
    P: Player,
{
    pub fn new(synthesizer: S, player: P, slots: PlaybackSlots) -> Self {
        Self {
            synthesizer,
            player,
            slots,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Speak `units[start..]` in order.
    ///
    /// When `echo` is given, each unit's display text is written to it as its
    /// playback starts. `progress` is updated with the unit in flight, and
    /// `cancel` is checked after every blocking step. A step that ends with
    /// [`JtalkError::Interrupted`] counts as a cancellation too. A start index
    /// past the end speaks nothing.
    ///
    /// Any other synthesizer, player or echo failure stops the run immediately
    /// and leaves the pipeline in [`PipelineState::Failed`].
    pub fn run(
        &mut self,
        units: &[SpeakableUnit],
        start: usize,
        mut echo: Option<&mut dyn Write>,
        progress: &ProgressCursor,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, JtalkError> {
        self.state = PipelineState::Running;
        log::debug!("Speaking units {start}..{}", units.len());

        let mut pending: Option<P::Playback> = None;

        for (index, unit) in units.iter().enumerate().skip(start) {
            progress.set(index);
            if cancel.is_cancelled() {
                return Ok(self.cancelled(index, pending));
            }

            let slot = self.slots.for_unit(index);
            log::debug!("Synthesizing unit {index} into {}", slot.display());
            let synthesized = self.synthesizer.synthesize(&unit.synthesis_text, slot);
            if interrupted(&synthesized, cancel) {
                return Ok(self.cancelled(index, pending));
            }
            if let Err(e) = synthesized {
                log::error!("Synthesis of unit {index} failed: {e}");
                return Err(self.fail(e, pending));
            }

            if let Some(mut previous) = pending.take() {
                let waited = previous.wait();
                if interrupted(&waited, cancel) {
                    return Ok(self.cancelled(index, None));
                }
                if let Err(e) = waited {
                    return Err(self.fail(e, None));
                }
            }
            if cancel.is_cancelled() {
                return Ok(self.cancelled(index, None));
            }

            if let Some(out) = echo.as_mut() {
                let echoed = writeln!(out, "{}", unit.display_text).and_then(|()| out.flush());
                if let Err(e) = echoed {
                    return Err(self.fail(e.into(), None));
                }
            }

            log::debug!("Playing unit {index}");
            match self.player.play(slot) {
                Ok(playback) => pending = Some(playback),
                Err(e) => return Err(self.fail(e, None)),
            }
        }

        if let Some(mut last) = pending.take() {
            let waited = last.wait();
            if interrupted(&waited, cancel) {
                let index = progress.current().unwrap_or(start);
                return Ok(self.cancelled(index, None));
            }
            if let Err(e) = waited {
                return Err(self.fail(e, None));
            }
        }

        self.state = PipelineState::Completed;
        Ok(RunOutcome::Completed)
    }

    fn cancelled(&mut self, index: usize, pending: Option<P::Playback>) -> RunOutcome {
        if let Some(mut playback) = pending {
            playback.abandon();
        }
        log::info!("Cancelled while unit {index} was in flight");
        self.state = PipelineState::Cancelled;
        RunOutcome::Cancelled(ResumeOffset(index))
    }

    fn fail(&mut self, error: JtalkError, pending: Option<P::Playback>) -> JtalkError {
        if let Some(mut playback) = pending {
            playback.abandon();
        }
        self.state = PipelineState::Failed;
        error
    }
}

/// Whether a blocking step ended because the run is being stopped.
fn interrupted(result: &Result<(), JtalkError>, cancel: &CancellationToken) -> bool {
    cancel.is_cancelled() || matches!(result, Err(e) if e.is_interrupted())
}
