mod command;
mod logging;
mod render;

use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use quiz_core::model::{DEFAULT_TIME_LIMIT_MINUTES, QuizConfig, TIME_LIMIT_PRESETS_MINUTES};
use services::{Clock, FinishReason, QuizRunner, SessionController, SessionEvent};
use storage::{JsonFileSource, QuestionBankSource};
use tokio::sync::mpsc;

use command::{Command, HELP};
use logging::{LogConfig, init_logging};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMinutes { raw: String },
    InvalidSeconds { raw: String },
    MissingBank,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMinutes { raw } => write!(
                f,
                "invalid --minutes value: {raw} (choose one of {TIME_LIMIT_PRESETS_MINUTES:?})"
            ),
            ArgsError::InvalidSeconds { raw } => write!(f, "invalid --seconds value: {raw}"),
            ArgsError::MissingBank => write!(f, "no question bank given (--bank or QUIZ_BANK_PATH)"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [run] --bank <questions.json> [--minutes 30|60|90] [--seconds <n>] [-v...]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --minutes {DEFAULT_TIME_LIMIT_MINUTES}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_PATH, QUIZ_TIME_MINUTES, RUST_LOG");
}

struct Args {
    bank_path: PathBuf,
    config: QuizConfig,
    verbosity: u8,
}

fn parse_minutes(raw: String) -> Result<QuizConfig, ArgsError> {
    let minutes: u32 = raw
        .trim()
        .parse()
        .map_err(|_| ArgsError::InvalidMinutes { raw: raw.clone() })?;
    if !TIME_LIMIT_PRESETS_MINUTES.contains(&minutes) {
        return Err(ArgsError::InvalidMinutes { raw });
    }
    QuizConfig::from_minutes(minutes).map_err(|_| ArgsError::InvalidMinutes { raw })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_path = std::env::var("QUIZ_BANK_PATH").ok().map(PathBuf::from);
        let mut config = match std::env::var("QUIZ_TIME_MINUTES") {
            Ok(raw) => parse_minutes(raw)?,
            Err(_) => QuizConfig::default(),
        };
        let mut verbosity = 0_u8;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => {
                    bank_path = Some(PathBuf::from(require_value(args, "--bank")?));
                }
                "--minutes" => {
                    config = parse_minutes(require_value(args, "--minutes")?)?;
                }
                "--seconds" => {
                    let value = require_value(args, "--seconds")?;
                    let secs: u32 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeconds { raw: value.clone() })?;
                    if secs == 0 {
                        return Err(ArgsError::InvalidSeconds { raw: value });
                    }
                    config = QuizConfig::new(secs);
                }
                "--verbose" => verbosity = verbosity.saturating_add(1),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => match verbose_count(&arg) {
                    Some(count) => verbosity = verbosity.saturating_add(count),
                    None => return Err(ArgsError::UnknownArg(arg)),
                },
            }
        }

        Ok(Self {
            bank_path: bank_path.ok_or(ArgsError::MissingBank)?,
            config,
            verbosity,
        })
    }
}

/// Counts the `v`s in a `-v`, `-vv`, `-vvv`... flag.
fn verbose_count(arg: &str) -> Option<u8> {
    let vs = arg.strip_prefix('-')?;
    if vs.is_empty() || !vs.chars().all(|c| c == 'v') {
        return None;
    }
    Some(u8::try_from(vs.len()).unwrap_or(u8::MAX))
}

/// Forward lines from `source` on a plain thread.
///
/// The thread is never joined: a blocked stdin read must not keep the process
/// alive once the attempt has ended on a timeout.
fn spawn_line_reader<R>(source: R) -> mpsc::UnboundedReceiver<std::io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in source.lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply one learner command. Returns false once the attempt is over.
async fn handle_command(runner: &QuizRunner, command: Command) -> bool {
    let outcome = match command {
        Command::Next => runner.next().await,
        Command::Previous => runner.previous().await,
        Command::GoTo(index) => runner.go_to(index).await,
        Command::Select(option) => {
            let current = runner.inspect(SessionController::current_index).await;
            runner.select(current, option).await
        }
        Command::Submit => {
            runner.submit().await;
            return false;
        }
        Command::Time => {
            let left = runner.inspect(SessionController::time_remaining).await;
            println!("Time left {}", render::format_clock(left));
            return true;
        }
        Command::Help => {
            println!("{HELP}");
            return true;
        }
    };

    if let Err(err) = outcome {
        println!("{err}");
    }
    println!();
    println!("{}", runner.inspect(render::question_screen).await);
    true
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.first().map(String::as_str) == Some("run") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging(&LogConfig::from_verbosity(args.verbosity));

    let bank = JsonFileSource::new(&args.bank_path).load_bank().await?;
    let controller = SessionController::new(Arc::new(bank), Clock::default_clock());
    let (runner, mut events) = QuizRunner::new(controller);
    runner.start(args.config).await?;

    println!("{HELP}");
    println!();
    println!("{}", runner.inspect(render::question_screen).await);

    let mut lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()));
    let mut accepting_input = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::Tick { remaining }) => {
                    if remaining % 300 == 0 || remaining == 60 || remaining == 10 {
                        println!("Time left {}", render::format_clock(remaining));
                    }
                }
                Some(SessionEvent::Finished { reason, .. }) => {
                    if reason == FinishReason::TimedOut {
                        println!("Time is up, your answers were submitted.");
                    }
                    break;
                }
                None => break,
            },
            line = lines.recv(), if accepting_input => match line.transpose()? {
                Some(line) => match Command::parse(&line) {
                    Ok(command) => {
                        if !handle_command(&runner, command).await {
                            // Submitted; the Finished event ends the loop.
                            accepting_input = false;
                        }
                    }
                    Err(err) => println!("{err}"),
                },
                None => {
                    accepting_input = false;
                    runner.submit().await;
                }
            },
        }
    }

    runner
        .inspect(|session| -> Result<(), services::SessionError> {
            println!();
            println!(
                "{}",
                render::results_screen(session.result()?, session.elapsed_secs())
            );
            println!("{}", render::review_screen(&session.review()?));
            Ok(())
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
