use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use super::engine::OpenJtalkParams;
use super::{isolate_from_terminal, killed_by_interrupt, spawn_error, wait_child};
use crate::audio::AudioInfo;
use crate::resume::CancellationToken;
use crate::{JtalkError, Synthesizer};

/// Runs `open_jtalk` to render text into a WAV file.
#[derive(Debug, Clone)]
pub struct OpenJtalkSynthesizer {
    program: String,
    params: OpenJtalkParams,
    cancel: Option<CancellationToken>,
}

impl OpenJtalkSynthesizer {
    pub fn new(program: impl Into<String>, params: OpenJtalkParams) -> Self {
        Self {
            program: program.into(),
            params,
            cancel: None,
        }
    }

    /// Stop a running synthesis as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn params(&self) -> &OpenJtalkParams {
        &self.params
    }

    /// Arguments for one synthesizer run writing to `output`.
    pub fn command_args(&self, output: &Path) -> Vec<OsString> {
        let p = &self.params;
        vec![
            "-x".into(),
            p.dictionary_dir.clone().into_os_string(),
            "-m".into(),
            p.voice_path.clone().into_os_string(),
            "-r".into(),
            p.speed.to_string().into(),
            "-g".into(),
            p.volume.to_string().into(),
            "-ow".into(),
            output.as_os_str().to_owned(),
        ]
    }
}

impl Synthesizer for OpenJtalkSynthesizer {
    fn synthesize(&mut self, text: &str, output: &Path) -> Result<(), JtalkError> {
        let mut command = Command::new(&self.program);
        command
            .args(self.command_args(output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if self.cancel.is_some() {
            isolate_from_terminal(&mut command);
        }
        let mut child = command
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))?;

        // Drained on its own thread so a chatty child never blocks on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });

        if let Some(mut stdin) = child.stdin.take() {
            // A synthesizer that exits early closes the pipe; its exit status
            // below is the error worth reporting.
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(JtalkError::Io(e));
                }
                log::debug!("`{}` closed its input early", self.program);
            }
        }

        let status = wait_child(&self.program, &mut child, self.cancel.as_ref())?;
        if killed_by_interrupt(&status) {
            return Err(JtalkError::Interrupted {
                program: self.program.clone(),
            });
        }
        if !status.success() {
            let stderr = stderr_reader
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            return Err(JtalkError::SynthesisFailed {
                program: self.program.clone(),
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let info = AudioInfo::probe(output).map_err(|e| JtalkError::InvalidAudio {
            path: output.display().to_string(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "Synthesized {:.2}s of audio ({} Hz) into {}",
            info.duration_secs(),
            info.sample_rate,
            output.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::open_jtalk::{find_executable, OpenJtalkParamsBuilder};
    use std::path::PathBuf;

    fn params() -> OpenJtalkParams {
        OpenJtalkParamsBuilder::default()
            .dictionary_dir("/dic")
            .voice_path("/voice.htsvoice")
            .speed(1.5)
            .volume(10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn builds_open_jtalk_arguments() {
        let synthesizer = OpenJtalkSynthesizer::new("open_jtalk", params());
        let args = synthesizer.command_args(Path::new("/tmp/open_jtalk_1.wav"));
        assert_eq!(
            args,
            [
                "-x",
                "/dic",
                "-m",
                "/voice.htsvoice",
                "-r",
                "1.5",
                "-g",
                "10",
                "-ow",
                "/tmp/open_jtalk_1.wav"
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn missing_program_is_reported() {
        let mut synthesizer = OpenJtalkSynthesizer::new("jtalk-rs-no-such-synthesizer", params());
        let err = synthesizer
            .synthesize("こんにちは", Path::new("/tmp/unused.wav"))
            .unwrap_err();
        assert!(matches!(err, JtalkError::ExecutableNotFound(name) if name == "jtalk-rs-no-such-synthesizer"));
    }

    #[test]
    fn non_zero_exit_is_a_synthesis_failure() {
        if find_executable("false").is_none() {
            return;
        }
        let mut synthesizer = OpenJtalkSynthesizer::new("false", params());
        let err = synthesizer
            .synthesize("こんにちは", Path::new("/tmp/unused.wav"))
            .unwrap_err();
        assert!(matches!(err, JtalkError::SynthesisFailed { .. }));
    }

    #[cfg(unix)]
    fn fake_synthesizer(dir: &Path, fixture: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake_open_jtalk");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nfor arg; do out=\"$arg\"; done\ncat > \"{}\"\ncp \"{}\" \"$out\"\n",
                dir.join("stdin.txt").display(),
                fixture.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn write_fixture(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..4800 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn feeds_text_on_stdin_and_checks_output() {
        if find_executable("sh").is_none() || find_executable("cp").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        write_fixture(&fixture);
        let script = fake_synthesizer(dir.path(), &fixture);

        let mut synthesizer = OpenJtalkSynthesizer::new(script.to_str().unwrap(), params());
        let output = dir.path().join("open_jtalk_0.wav");
        synthesizer.synthesize("今日はいい天気です。", &output).unwrap();

        let stdin = std::fs::read_to_string(dir.path().join("stdin.txt")).unwrap();
        assert_eq!(stdin, "今日はいい天気です。");
        assert_eq!(AudioInfo::probe(&output).unwrap().frames, 4800);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_output_is_rejected() {
        if find_executable("sh").is_none() || find_executable("cp").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fixture.wav");
        std::fs::write(&fixture, b"RIFF....garbage").unwrap();
        let script = fake_synthesizer(dir.path(), &fixture);

        let mut synthesizer = OpenJtalkSynthesizer::new(script.to_str().unwrap(), params());
        let err = synthesizer
            .synthesize("テスト", &dir.path().join("out.wav"))
            .unwrap_err();
        assert!(matches!(err, JtalkError::InvalidAudio { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn cancellation_stops_a_running_synthesis() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        if find_executable("sh").is_none() || find_executable("sleep").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow_open_jtalk");
        std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let token = CancellationToken::new();
        let mut synthesizer = OpenJtalkSynthesizer::new(script.to_str().unwrap(), params())
            .with_cancellation(token.clone());
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            token.cancel();
        });

        let started = Instant::now();
        let err = synthesizer
            .synthesize("長い文章です。", &dir.path().join("out.wav"))
            .unwrap_err();
        canceller.join().unwrap();

        assert!(err.is_interrupted(), "unexpected error: {err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn failure_still_reports_stderr_when_cancellable() {
        if find_executable("sh").is_none() {
            return;
        }
        let mut synthesizer = OpenJtalkSynthesizer::new("sh", params())
            .with_cancellation(CancellationToken::new());
        // `sh` treats `-x` as a flag and `/dic` as a missing script.
        let err = synthesizer
            .synthesize("テスト", Path::new("/tmp/unused.wav"))
            .unwrap_err();
        match err {
            JtalkError::SynthesisFailed { stderr, .. } => assert!(!stderr.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
