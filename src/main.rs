//! CLI tool to load card price reports into a store and tidy it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cardprices::{FileStore, FractionMode, Options, Tokenizer, TokenKind, ingest, load_report};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Load card price reports into a store.
#[derive(Parser, Debug)]
#[command(author, version, name = env!("CARGO_BIN_NAME"))]
struct Args {
    /// Store file (one JSON row per line)
    #[arg(long, default_value = "card.db.jsonl", global = true)]
    store: PathBuf,

    /// Fail on malformed reports instead of stopping early
    #[arg(long, global = true)]
    strict: bool,

    /// Keep the first three fractional digits of long prices
    #[arg(long, global = true)]
    truncate_fractions: bool,

    /// Log every token and store operation
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add every card of a report to the store
    Load {
        #[arg(default_value = "prices_0.txt", value_hint = clap::ValueHint::FilePath)]
        report: PathBuf,
    },
    /// Print the token stream of a report
    Tokens {
        #[arg(default_value = "prices_0.txt", value_hint = clap::ValueHint::FilePath)]
        report: PathBuf,
    },
    /// Remove repeated identical snapshots from the store
    Clean,
}

impl Args {
    const fn options(&self) -> Options {
        let fractions = if self.truncate_fractions {
            FractionMode::Truncate
        } else {
            FractionMode::Legacy
        };
        Options::new().strict(self.strict).fractions(fractions)
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn load(args: &Args, report: &Path) -> Result<(), cardprices::Error> {
    let snapshot = load_report(report)?;
    let mut store = FileStore::open(&args.store)?;

    let result = ingest(&snapshot.text, &snapshot.timestamp, args.options(), &mut store);
    // Keep the cards read before a failure, as inserts would have.
    store.save()?;
    let summary = result?;

    if let Some(diag) = &summary.diagnostic {
        warn!(%diag, "report was irregular");
    }
    info!(
        cards = summary.cards,
        stock = summary.stock,
        store = %store.path().display(),
        "loaded"
    );
    eprintln!(
        "{}: {} card(s), {} in stock",
        report.display(),
        summary.cards,
        summary.stock
    );
    Ok(())
}

fn tokens(args: &Args, report: &Path) -> Result<bool, cardprices::Error> {
    let snapshot = load_report(report)?;
    let mut tokenizer = Tokenizer::new(&snapshot.text, args.options());
    let mut failed = false;

    for token in tokenizer.by_ref() {
        println!("{token}");
        failed |= token.kind == TokenKind::Error;
    }
    if let Some(diag) = tokenizer.diagnostic() {
        eprintln!("{}: {diag}", report.display());
    }
    Ok(!failed)
}

fn clean(args: &Args) -> Result<(), cardprices::Error> {
    let mut store = FileStore::open(&args.store)?;
    let summary = store.clean();
    store.save()?;
    eprintln!(
        "Found {} cards, removed {}, marked {} clean",
        summary.examined, summary.removed, summary.marked
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.trace);

    let result = match &args.command {
        Command::Load { report } => load(&args, report).map(|()| true),
        Command::Tokens { report } => tokens(&args, report),
        Command::Clean => clean(&args).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
