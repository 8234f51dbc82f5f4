//! Tokenizer and record assembler for fixed-width card price reports.
//!
//! A report lists set sections; each section holds card lines with a buy
//! price, a sell price and the stock held by each trading bot. The layout
//! has no delimiters beyond literal markers and column positions, so the
//! text is tokenized by a hand-written state machine and the tokens are
//! folded into [`Card`] records.
//!
//! # Quick start
//!
//! ```
//! use cardprices::{Options, assemble};
//!
//! let input = "=== Alpha === [Total Buy/Sell Value: 10/20] =====\n\
//!              Card1 [ALP]  1.50   2.25 aa[2]\n";
//! let cards = assemble(input, "2014-01-01 00:00:00 +0000 UTC", Options::new()).unwrap();
//! assert_eq!(cards[0].name, "Card1");
//! assert_eq!(cards[0].buy_price, 1500);
//! assert_eq!(cards[0].stock, 2);
//! ```
//!
//! ## Build and render a report
//!
//! ```
//! use cardprices::{CardLine, Report, Section, format};
//!
//! let report = Report::new().section(
//!     Section::new("Alpha")
//!         .totals(10, 20)
//!         .card(CardLine::new("Card1", "ALP").prices(1500, 2250).bot("mr", 2)),
//! );
//! assert!(format(&report).contains("1.50"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod assembler;
pub mod builder;
pub mod card;
pub mod config;
pub mod formatter;
pub mod lexer;
pub mod price;
pub mod report;
mod scanner;
pub mod source;
pub mod store;
pub mod token;

pub use assembler::{AssembleError, Assembler, NumberErrorKind, assemble};
pub use card::Card;
pub use config::{FractionMode, Options};
pub use formatter::format;
pub use lexer::{BUY_PRICE_MAX_COLUMN, LexError, LexErrorKind, Tokenizer, tokenize};
pub use report::{BotEntry, CardLine, Report, Section};
pub use source::{Snapshot, SourceError, load_report};
pub use store::{CardSink, CleanSummary, FileStore, MemoryStore, StoreError, StoredCard};
pub use token::{Span, Token, TokenKind};

use tracing::debug;

/// Unified error type for a whole ingest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Report file could not be read.
    #[error("{0}")]
    Source(#[from] SourceError),
    /// Tokenizing or record assembly failed.
    #[error("{0}")]
    Assemble(#[from] AssembleError),
    /// The store rejected a card.
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Totals of one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Cards handed to the sink.
    pub cards: usize,
    /// Sum of stock over those cards.
    pub stock: i64,
    /// Irregularity the lenient tokenizer stepped over, if any.
    pub diagnostic: Option<LexError>,
}

/// Assemble `input` and insert every card into `sink`.
///
/// Cards finalized before an error are already in the sink when the error
/// is returned.
pub fn ingest(
    input: &str,
    timestamp: &str,
    options: Options,
    sink: &mut impl CardSink,
) -> Result<IngestSummary, Error> {
    let mut cards = Assembler::new(Tokenizer::new(input, options), timestamp);
    let mut summary = IngestSummary::default();

    for card in cards.by_ref() {
        let card = card?;
        sink.insert(&card)?;
        summary.cards += 1;
        summary.stock = summary.stock.saturating_add(card.stock);
    }

    summary.diagnostic = cards.tokenizer().diagnostic().cloned();
    debug!(cards = summary.cards, stock = summary.stock, "ingest done");
    Ok(summary)
}
