use std::fmt;
use std::path::PathBuf;

use buddy_core::catalog::PRACTICE_QUESTIONS;
use buddy_core::model::{GameRound, PromptList};
use buddy_core::time::{clock_label, listing_label};
use dialoguer::Confirm;
use services::{AppServices, BuddyConfig, Clock, SessionEvent};
use storage::{RecordingStore, StorageError};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPath { flag: &'static str, raw: String },
    MissingCommand,
    UnknownCommand(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPath { flag, raw } => write!(f, "invalid {flag} value: {raw:?}"),
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_path(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<PathBuf, ArgsError> {
    let value = require_value(args, flag)?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidPath { flag, raw: value });
    }
    Ok(PathBuf::from(value))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  buddy practice                        [flags]");
    eprintln!("  buddy synonym                         [flags]");
    eprintln!("  buddy repeat [--show]                 [flags]");
    eprintln!("  buddy recordings list                 [flags]");
    eprintln!("  buddy recordings play <file>          [flags]");
    eprintln!("  buddy recordings delete <file> [--yes] [flags]");
    eprintln!("  buddy recordings open                 [flags]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --recordings <dir>   where answers are saved (default: recordings)");
    eprintln!("  --lexicon <path>     JSON lexical database for the synonym game");
    eprintln!("  --console            type answers instead of speaking them");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BUDDY_RECORDINGS_DIR, BUDDY_LEXICON, BUDDY_TTS_PROGRAM, BUDDY_TTS_RATE,");
    eprintln!("  BUDDY_STT_API_KEY, BUDDY_STT_BASE_URL, BUDDY_STT_MODEL,");
    eprintln!("  BUDDY_CAPTURE_START_SECS, BUDDY_PHRASE_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordingsCommand {
    List,
    Play(Option<String>),
    Delete { file: Option<String>, yes: bool },
    OpenFolder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Practice,
    Synonym,
    Repeat { show: bool },
    Recordings(RecordingsCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    command: Command,
    recordings_dir: Option<PathBuf>,
    lexicon: Option<PathBuf>,
    console: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut positionals = Vec::new();
        let mut recordings_dir = None;
        let mut lexicon = None;
        let mut console = false;
        let mut show = false;
        let mut yes = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--recordings" => recordings_dir = Some(require_path(&mut args, "--recordings")?),
                "--lexicon" => lexicon = Some(require_path(&mut args, "--lexicon")?),
                "--console" => console = true,
                "--show" => show = true,
                "--yes" | "-y" => yes = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        let mut positionals = positionals.into_iter();
        let command = match positionals.next().as_deref() {
            None => return Err(ArgsError::MissingCommand),
            Some("practice") => Command::Practice,
            Some("synonym") => Command::Synonym,
            Some("repeat") => Command::Repeat { show },
            Some("recordings") => {
                let sub = positionals.next();
                let file = positionals.next();
                match sub.as_deref() {
                    None | Some("list") => Command::Recordings(RecordingsCommand::List),
                    Some("play") => Command::Recordings(RecordingsCommand::Play(file)),
                    Some("delete") => Command::Recordings(RecordingsCommand::Delete { file, yes }),
                    Some("open") if file.is_none() => Command::Recordings(RecordingsCommand::OpenFolder),
                    Some("open") => return Err(ArgsError::UnknownArg(file.unwrap_or_default())),
                    Some(other) => return Err(ArgsError::UnknownCommand(format!("recordings {other}"))),
                }
            }
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };
        if let Some(extra) = positionals.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self {
            command,
            recordings_dir,
            lexicon,
            console,
        })
    }

    fn apply(&self, mut config: BuddyConfig) -> BuddyConfig {
        if let Some(dir) = &self.recordings_dir {
            config.recordings_dir.clone_from(dir);
        }
        if let Some(path) = &self.lexicon {
            config.lexicon_path = Some(path.clone());
        }
        let console = config.console || self.console;
        config.with_console(console)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── PRACTICE ──────────────────────────────────────────────────────────────────
//

async fn practice(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut sequencer = services.sequencer().with_events(tx);

    // The display loop only reads events; the sequencer owns the state.
    let display = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Asking {
                    index,
                    prompt,
                    asked_at,
                } => println!("[{}] Q{}: {prompt}", clock_label(asked_at), index + 1),
                SessionEvent::Listening { .. } => println!("Listening..."),
                SessionEvent::Answered(record) => {
                    match &record.transcript {
                        Some(text) => println!("Answer: {text}"),
                        None => println!("Answer: (not understood)"),
                    }
                    if let Some(path) = &record.saved_path {
                        println!("Saved: {}", path.display());
                    }
                    println!();
                }
                SessionEvent::Completed { answered } => {
                    println!("Test completed. {answered} answer(s) understood.");
                }
            }
        }
    });

    sequencer.start(PromptList::new(PRACTICE_QUESTIONS)?);
    sequencer.run().await?;
    drop(sequencer);
    display.await?;
    Ok(())
}

//
// ─── GAMES ─────────────────────────────────────────────────────────────────────
//

fn show_round(round: &GameRound) {
    println!("{}", round.display_text());
    println!("{}", round.feedback());
}

async fn synonym_game(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = services.synonym_game();
    println!("Synonym game. Enter: answer, n: new word, q: quit.");
    show_round(game.new_round()?);

    while let Some(line) = services.input().read_line().await {
        match line.trim() {
            "q" => break,
            "n" => show_round(game.new_round()?),
            _ => {
                let round = game.listen().await?;
                println!("{}", round.feedback());
            }
        }
    }
    Ok(())
}

async fn repeat_game(
    services: &AppServices,
    show: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = services.repeat_game(!show);
    println!(
        "Repeat game. Enter: answer, r: hear again, n: new sentence, h: hide/show next, q: quit."
    );
    show_round(game.new_round()?);

    while let Some(line) = services.input().read_line().await {
        match line.trim() {
            "q" => break,
            "n" => show_round(game.new_round()?),
            "r" => game.replay()?,
            "h" => {
                let hide = !game.hides_sentence();
                game.set_hide_sentence(hide);
                tracing::debug!(hide, "hide setting changed");
                if hide {
                    println!("The next sentence will be hidden.");
                } else {
                    println!("The next sentence will be shown.");
                }
            }
            _ => {
                let round = game.listen().await?;
                show_round(round);
            }
        }
    }
    Ok(())
}

//
// ─── RECORDINGS ────────────────────────────────────────────────────────────────
//

const SELECT_FIRST: &str = "Select a recording first.";

async fn recordings(
    services: &AppServices,
    command: RecordingsCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = services.recordings();
    match command {
        RecordingsCommand::List => {
            let entries = store.list().await?;
            if entries.is_empty() {
                println!("No recordings yet.");
            }
            for entry in entries {
                println!("{}  {}", listing_label(entry.modified_at), entry.file_name);
            }
        }
        RecordingsCommand::Play(None) | RecordingsCommand::Delete { file: None, .. } => {
            println!("{SELECT_FIRST}");
        }
        RecordingsCommand::OpenFolder => {
            if let Err(err) = store.open_folder().await {
                tracing::warn!(error = %err, "could not open recordings folder");
                println!("Could not open the recordings folder: {err}");
            }
        }
        RecordingsCommand::Play(Some(file)) => match store.play(&file).await {
            Ok(()) => println!("Playing {file}"),
            Err(err) => report_storage_error(&file, &err),
        },
        RecordingsCommand::Delete {
            file: Some(file),
            yes,
        } => {
            if !yes && !confirm_delete(file.clone()).await? {
                println!("Kept {file}");
                return Ok(());
            }
            match store.delete(&file).await {
                Ok(()) => println!("Deleted {file}"),
                Err(err) => report_storage_error(&file, &err),
            }
        }
    }
    Ok(())
}

async fn confirm_delete(file: String) -> Result<bool, Box<dyn std::error::Error>> {
    let confirmed = tokio::task::spawn_blocking(move || {
        Confirm::new()
            .with_prompt(format!("Delete {file}?"))
            .default(false)
            .interact()
    })
    .await??;
    Ok(confirmed)
}

fn report_storage_error(file: &str, err: &StorageError) {
    tracing::warn!(file, error = %err, "recording action failed");
    match err {
        StorageError::NotFound => println!("Recording not found: {file}"),
        StorageError::InvalidName(_) => println!("Not a recording name: {file}"),
        other => println!("Could not use {file}: {other}"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    let config = args.apply(BuddyConfig::from_env());
    let services = AppServices::from_config(config, Clock::system())?;

    tracing::debug!(command = ?args.command, "dispatching");
    match args.command {
        Command::Practice => practice(&services).await,
        Command::Synonym => synonym_game(&services).await,
        Command::Repeat { show } => repeat_game(&services, show).await,
        Command::Recordings(command) => recordings(&services, command).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
