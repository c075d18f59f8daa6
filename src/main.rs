use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use jtalk_rs::engines::open_jtalk::OpenJtalkEngine;
use jtalk_rs::pipeline::{PlaybackSlots, RunOutcome, SpeechPipeline};
use jtalk_rs::resume::{resume_message, ResumeController, CANCELLED_EXIT_CODE};
use jtalk_rs::transcribe::EnglishWordTranscriber;
use jtalk_rs::yomi::PronunciationTable;
use jtalk_rs::{input, markup, segment, JtalkConfig, JtalkError, SpeakableUnit};

/// 日本語テキストを読み上げます。
///
/// Reads the file (or standard input when the file is `-`) aloud with Open
/// JTalk. Without a file, the current time is read.
#[derive(Parser, Debug)]
#[command(name = "jtalk", version)]
struct Cli {
    /// Text file to read, `-` for standard input
    #[arg(value_name = "TEXTFILE")]
    textfile: Option<PathBuf>,

    /// 読み上げ開始位置(0〜)
    #[arg(short = 'n', value_name = "INDEX")]
    index: Option<usize>,

    /// 読み上げ速度 [default: 1.0]
    #[arg(short = 'r', value_name = "SPEED")]
    speed: Option<f32>,

    /// 読み上げ音量 [default: 10.0]
    #[arg(short = 'g', value_name = "VOL")]
    volume: Option<f32>,

    /// 発声されているテキストを表示する
    #[arg(short = 't')]
    show_text: bool,

    /// 日本語が含まれない行をスキップする
    #[arg(short = 'j')]
    japanese_only: bool,

    /// 英単語を読み（カタカナ）に変換する
    #[arg(short = 'y', long = "yomi")]
    yomi: bool,

    /// 改行で文を区切らないようにする
    #[arg(short = 'N')]
    merge_lines: bool,

    /// 入力テキストがmarkdownであるとして扱う
    #[arg(long = "markdown")]
    markdown: bool,

    /// JSON config file with tool and voice locations
    #[arg(short = 'c', long = "config", value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, JtalkError> {
    let mut config = match &cli.config {
        Some(path) => JtalkConfig::load(path)?,
        None => JtalkConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    if let Some(volume) = cli.volume {
        config.volume = volume;
    }

    let engine = OpenJtalkEngine::from_config(&config)?;
    engine.check_available()?;

    let source = cli.textfile.as_deref();
    let mut text = input::read_text(source)?;
    if cli.markdown || input::is_markdown_path(source) {
        text = markup::markdown_to_text(&text);
    }

    let mut lines = segment::parse_lines(&text, cli.merge_lines);
    if cli.japanese_only {
        lines.retain(|line| segment::includes_japanese(line));
    }

    let units: Vec<SpeakableUnit> = if cli.yomi {
        let table = PronunciationTable::load_or_empty(&config.yomi_path())?;
        let transcriber = EnglishWordTranscriber::new(&table);
        lines
            .into_iter()
            .map(|line| SpeakableUnit::transcribed(line, &transcriber))
            .collect()
    } else {
        lines.into_iter().map(SpeakableUnit::new).collect()
    };
    log::info!("{} units to read", units.len());

    let controller = ResumeController::new(cli.index);
    install_interrupt_handler(&controller)?;

    let (synthesizer, player) = engine.into_parts();
    let synthesizer = synthesizer.with_cancellation(controller.token().clone());
    let player = player.with_cancellation(controller.token().clone());
    let slots = PlaybackSlots::in_dir(&config.wav_dir);
    let mut pipeline = SpeechPipeline::new(synthesizer, player, slots);

    let mut stderr = io::stderr();
    let echo: Option<&mut dyn Write> = if cli.show_text {
        Some(&mut stderr)
    } else {
        None
    };

    match pipeline.run(
        &units,
        controller.start_index(),
        echo,
        controller.progress(),
        controller.token(),
    )? {
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
        RunOutcome::Cancelled(offset) => {
            controller.report_interrupted(offset, &mut io::stderr())?;
            Ok(ExitCode::from(CANCELLED_EXIT_CODE))
        }
    }
}

/// Route Ctrl-C to the pipeline's cancellation token.
///
/// A second Ctrl-C while the pipeline is still blocked exits at once.
fn install_interrupt_handler(controller: &ResumeController) -> Result<(), JtalkError> {
    let controller = controller.clone();
    ctrlc::set_handler(move || {
        if controller.token().is_cancelled() {
            eprintln!("{}", resume_message(controller.resume_offset()));
            std::process::exit(i32::from(CANCELLED_EXIT_CODE));
        }
        log::info!("Interrupt received, stopping after the current step");
        controller.token().cancel();
    })
    .map_err(|e| JtalkError::InterruptHandler(e.to_string()))
}
