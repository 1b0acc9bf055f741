use aksaru::{
    app::{run_quiz, QuizApp},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Theme},
    display,
    history::{average_correct, HistoryLog},
    letters::{self, LetterClass},
    practice::Practice,
    runtime::{InputLines, LineEventSource, QuizEvent, Runner},
    session::QuizSession,
};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::tty::IsTty;
use log::debug;
use std::{
    error::Error,
    io::{self, Write},
};

/// handwriting practice for the sundanese script
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice writing Sundanese letters. Each answer is the label your recognizer produced for the drawing; the quiz scores it against the letter asked."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// background theme used when rasterizing drawings
    #[clap(long, value_enum)]
    theme: Option<Theme>,

    /// disable colored output
    #[clap(long)]
    no_color: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// list the letters of the alphabet
    Letters {
        /// only show one class of letters
        #[clap(short = 'c', long, value_enum)]
        class: Option<ClassArg>,
    },
    /// run a timed five-letter quiz (default)
    Quiz {
        /// seed the letter sampling for a repeatable quiz
        #[clap(long)]
        seed: Option<u64>,

        /// print the final session snapshot as json
        #[clap(long)]
        json: bool,

        /// do not append the result to the history log
        #[clap(long)]
        no_history: bool,
    },
    /// practice a single letter without scoring
    Practice {
        /// letter identifier, e.g. `ka` or `ae`
        letter: String,
    },
    /// show recent quiz results
    History {
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum ClassArg {
    Swara,
    Ngalagena,
}

impl From<ClassArg> for LetterClass {
    fn from(c: ClassArg) -> Self {
        match c {
            ClassArg::Swara => LetterClass::Swara,
            ClassArg::Ngalagena => LetterClass::Ngalagena,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let mut config = store.load();
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    debug!("loaded config from {}: {:?}", store.path().display(), config);

    let color = !cli.no_color && io::stdout().is_tty();
    let mut stdout = io::stdout();

    match cli.command.clone().unwrap_or(Command::Quiz {
        seed: None,
        json: false,
        no_history: false,
    }) {
        Command::Letters { class } => {
            writeln!(stdout, "{}", display::letter_list(class.map(Into::into)))?;
        }
        Command::Quiz {
            seed,
            json,
            no_history,
        } => {
            let session = seed.map_or_else(QuizSession::new, QuizSession::with_seed);
            let record = config.record_history && !no_history;
            let tick = config.tick_interval();
            let mut app = QuizApp::new(session, config);
            if record {
                if let Some(path) = AppDirs::history_path() {
                    app = app.with_history(HistoryLog::new(path));
                }
            }

            writeln!(
                stdout,
                "Latihan Menulis: type the recognized label for each letter \
                 (:skip, :restart, :quit)"
            )?;
            let mut runner = Runner::new(LineEventSource::stdin(), tick);
            let snapshot = run_quiz(&mut app, &mut runner, &mut stdout, color)?;
            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&snapshot)?)?;
            }
        }
        Command::Practice { letter } => {
            let Some(letter) = letters::find(&letter) else {
                let mut cmd = Cli::command();
                cmd.error(
                    clap::error::ErrorKind::InvalidValue,
                    format!("unknown letter '{letter}'"),
                )
                .exit();
            };
            practice(Practice::new(letter.clone()), &mut stdout)?;
        }
        Command::History { limit } => {
            let Some(path) = AppDirs::history_path() else {
                writeln!(stdout, "no history location available")?;
                return Ok(());
            };
            let log = HistoryLog::new(path);
            let records = log.recent(limit)?;
            if records.is_empty() {
                writeln!(stdout, "no quizzes recorded yet")?;
            } else {
                writeln!(stdout, "{}", display::history_table(&records))?;
                if let Some(avg) = average_correct(&log.load()?) {
                    writeln!(stdout, "average correct: {avg:.1}")?;
                }
            }
        }
    }

    Ok(())
}

fn practice<W: Write>(mut practice: Practice, out: &mut W) -> Result<(), Box<dyn Error>> {
    writeln!(
        out,
        "Practice {}: type the recognized label (:quit to leave)",
        practice.letter().glyph()
    )?;
    out.flush()?;

    for line in InputLines::new(io::stdin().lock()) {
        match QuizEvent::parse_line(&line) {
            Some(QuizEvent::Answer(label)) => {
                let feedback = practice.submit(&label).clone();
                writeln!(out, "{}", feedback.headline())?;
                if let Some(correction) = feedback.correction(practice.letter()) {
                    writeln!(out, "{correction}")?;
                }
                practice.clear();
            }
            Some(QuizEvent::Quit) => break,
            _ => {}
        }
        out.flush()?;
    }

    writeln!(
        out,
        "{}/{} attempts correct",
        practice.correct_attempts(),
        practice.attempts()
    )?;
    Ok(())
}
