use std::fmt;

use mathulator_core::model::{DifficultyBounds, Operator, TrophyTier};
use services::{AppServices, Clock, PracticeConfig, PracticeSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidOperator { raw: String },
    InvalidDbUrl { raw: String },
    InvalidBounds(String),
    MissingTarget,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidOperator { raw } => write!(f, "invalid --op value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBounds(reason) => write!(f, "invalid difficulty bounds: {reason}"),
            ArgsError::MissingTarget => write!(f, "reset requires --difficulty and --op"),
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

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    let parsed = raw.trim().parse();
    parsed.map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  mathulator [practice] [options]   # interactive drill (default)");
    eprintln!("  mathulator scores     [options]   # best streak table");
    eprintln!("  mathulator reset      --difficulty <n> --op <op> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         (default sqlite://mathulator.sqlite3)");
    eprintln!("  --min-difficulty <n>     (default 6)");
    eprintln!("  --max-difficulty <n>     (default 35)");
    eprintln!("  --difficulty <n>         (default 11)");
    eprintln!("  --op <+|-|x|/>           (default +)");
    eprintln!("  --seed <u64>             reproducible problem sequence");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATHULATOR_DB_URL, MATHULATOR_MIN_DIFFICULTY, MATHULATOR_MAX_DIFFICULTY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Scores,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "scores" => Some(Self::Scores),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    bounds: DifficultyBounds,
    difficulty: Option<f64>,
    operator: Option<Operator>,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("MATHULATOR_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://mathulator.sqlite3".into(), normalize_sqlite_url);
        let defaults = DifficultyBounds::default();
        let mut min = env_number("MATHULATOR_MIN_DIFFICULTY").unwrap_or(defaults.min());
        let mut max = env_number("MATHULATOR_MAX_DIFFICULTY").unwrap_or(defaults.max());
        let mut difficulty = None;
        let mut operator = None;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--min-difficulty" => {
                    let value = require_value(args, "--min-difficulty")?;
                    min = parse_number(value, "--min-difficulty")?;
                }
                "--max-difficulty" => {
                    let value = require_value(args, "--max-difficulty")?;
                    max = parse_number(value, "--max-difficulty")?;
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = Some(parse_number(value, "--difficulty")?);
                }
                "--op" => {
                    let value = require_value(args, "--op")?;
                    operator = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidOperator { raw: value.clone() })?,
                    );
                }
                "--seed" => {
                    seed = Some(parse_number(require_value(args, "--seed")?, "--seed")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let bounds =
            DifficultyBounds::new(min, max).map_err(|e| ArgsError::InvalidBounds(e.to_string()))?;

        Ok(Self {
            db_url,
            bounds,
            difficulty,
            operator,
            seed,
        })
    }
}

fn env_number(key: &str) -> Option<i32> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::System, parsed.bounds).await?;
    tracing::info!(
        db = %parsed.db_url,
        min = parsed.bounds.min(),
        max = parsed.bounds.max(),
        "score store ready"
    );

    match cmd {
        Command::Practice => {
            let defaults = PracticeConfig::default();
            let config = PracticeConfig {
                difficulty: parsed.difficulty.unwrap_or(defaults.difficulty),
                operator: parsed.operator.unwrap_or(defaults.operator),
                ..defaults
            };
            let session = services.practice(config, parsed.seed);
            practice_loop(session).await
        }
        Command::Scores => {
            print_scores(&services).await;
            Ok(())
        }
        Command::Reset => {
            let (Some(difficulty), Some(op)) = (parsed.difficulty, parsed.operator) else {
                return Err(ArgsError::MissingTarget.into());
            };
            #[allow(clippy::cast_possible_truncation)]
            let level = difficulty.floor() as i32;
            if services.scores().reset(level, op).await? {
                println!("reset best streak for {op} at difficulty {level}");
            } else {
                println!(
                    "difficulty {level} is outside {}..={}",
                    parsed.bounds.min(),
                    parsed.bounds.max()
                );
            }
            Ok(())
        }
    }
}

async fn print_scores(services: &AppServices) {
    let matrix = services.scores().snapshot().await;
    print!("{:>4}", "lvl");
    for op in Operator::ALL {
        print!(" {:>12}", op.symbol());
    }
    println!();
    for (difficulty, row) in matrix.iter() {
        print!("{difficulty:>4}");
        for score in row {
            let cell = format!("{score} {}", TrophyTier::for_score(*score));
            print!(" {:>12}", cell.trim_end());
        }
        println!();
    }
}

async fn practice_loop(mut session: PracticeSession) -> Result<(), Box<dyn std::error::Error>> {
    println!("commands: :op <+|-|x|/>  :d <level>  :skip  :reset  :q");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!(
            "[{} lvl {} | streak {} | best {}] {} = ?",
            session.operator(),
            session.difficulty_level(),
            session.streak(),
            session.high_score().await,
            session.problem()
        );

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("q" | "quit"), _) => break,
                (Some("op"), Some(raw)) => match raw.parse::<Operator>() {
                    Ok(op) => session.set_operator(op),
                    Err(err) => println!("{err}"),
                },
                (Some("d"), Some(raw)) => match raw.parse::<f64>() {
                    Ok(level) => session.set_difficulty(level),
                    Err(_) => println!("not a difficulty: {raw}"),
                },
                (Some("skip"), _) => session.skip(),
                (Some("reset"), _) => {
                    session.reset_high_score().await?;
                    println!("best streak reset");
                }
                _ => println!("unknown command: {line}"),
            }
            continue;
        }

        if let Some(outcome) = session.submit(line).await? {
            let entry = &outcome.entry;
            if entry.correct {
                println!("✓ {} = {}", entry.problem, entry.problem.answer);
            } else {
                println!(
                    "✗ {} = {} (you said {})",
                    entry.problem, entry.problem.answer, entry.guess
                );
            }
            if outcome.new_best {
                let tier = TrophyTier::for_score(outcome.streak);
                println!("new best streak: {} {tier}", outcome.streak);
            }
            println!("accuracy {}%", session.history().accuracy_percent());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
