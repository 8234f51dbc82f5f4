use std::collections::VecDeque;
use std::fmt;

use tracing::{trace, warn};

use crate::config::Options;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

const HEADER_START: &str = "=== ";
const HEADER_END: &str = " === [Total Buy/Sell Value: ";
const CARD_SET_START: &str = " [";
const CARD_SET_END: &str = "]  ";
const DIGITS: &str = "0123456789";

/// Last column (from the first character of the card name) at which a
/// price still belongs to the buy column. The report is fixed width: buy
/// prices are right-aligned to end before it, sell prices start after it.
pub const BUY_PRICE_MAX_COLUMN: usize = 44;

/// State transitions allowed without consuming input or emitting a token
/// before the machine is declared stuck.
const MAX_IDLE_TRANSITIONS: usize = 8;

const fn is_card_start(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch == 'Æ'
}

// Legacy bot codes (`mr`, `Cs`, `t2`, ...) are a subset of these.
const fn is_bot_first(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

const fn is_bot_second(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

/// Classifies a tokenizer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A literal marker never appeared before end of input (or, in strict
    /// mode, before end of line).
    MissingMarker { marker: &'static str },
    /// Expected a run of digits, found none.
    EmptyNumber,
    /// Price with a decimal point but no fractional digits.
    MalformedPrice,
    /// Header did not end with `] `, a run of `=`, and a newline.
    MalformedHeaderEnd { found: Option<char> },
    /// Character that cannot appear in the price region of a card line.
    UnexpectedCharacter(char),
    /// Bot entry did not start with a bot code.
    MissingBotCode { found: Option<char> },
    /// Bot code not followed by `[`.
    ExpectedBotCount { found: Option<char> },
    /// Bot count not closed by `]`.
    UnterminatedBotCount { found: Option<char> },
    /// The state machine stopped making progress.
    Stalled,
}

fn describe(found: Option<char>) -> String {
    found.map_or_else(|| "end of input".to_string(), |ch| format!("{ch:?}"))
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMarker { marker } => {
                write!(f, "missing {marker:?}")
            }
            Self::EmptyNumber => write!(f, "expected digits"),
            Self::MalformedPrice => {
                write!(f, "expected digits after decimal point")
            }
            Self::MalformedHeaderEnd { found } => {
                write!(
                    f,
                    "expected \"] ===\" and end of line, got {}",
                    describe(*found)
                )
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
            Self::MissingBotCode { found } => {
                write!(f, "expected bot code, got {}", describe(*found))
            }
            Self::ExpectedBotCount { found } => {
                write!(f, "expected '[', got {}", describe(*found))
            }
            Self::UnterminatedBotCount { found } => {
                write!(f, "expected ']', got {}", describe(*found))
            }
            Self::Stalled => write!(f, "tokenizer made no progress"),
        }
    }
}

/// Error produced while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at byte {offset} in {state}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub offset: usize,
    /// Name of the tokenizer state that gave up.
    pub state: &'static str,
}

/// Tokenize a whole report.
///
/// # Errors
///
/// Returns `LexError` when strict mode is on and the report is malformed.
/// In lenient mode malformed input ends the stream with `EndOfFile`; use
/// [`Tokenizer::diagnostic`] to tell that apart from a clean end.
pub fn tokenize(input: &str, options: Options) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokenizer = Tokenizer::new(input, options);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next() {
        if token.kind == TokenKind::Error {
            if let Some(err) = tokenizer.take_diagnostic() {
                return Err(err);
            }
        }
        tokens.push(token);
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    SetName,
    NumberPair,
    SetEndOfLine,
    CardName,
    SetPrefix,
    CardPrices,
    Price,
    Bots,
    BotName,
    BotCount,
    Done,
}

/// Counts consecutive transitions that neither consumed input nor emitted
/// a token.
#[derive(Debug, Default)]
struct IdleGuard {
    idle: usize,
}

impl IdleGuard {
    const fn stalled(&mut self, progressed: bool) -> bool {
        if progressed {
            self.idle = 0;
            return false;
        }
        self.idle += 1;
        self.idle > MAX_IDLE_TRANSITIONS
    }
}

impl State {
    const fn name(self) -> &'static str {
        match self {
            Self::LineStart => "line start",
            Self::SetName => "set name",
            Self::NumberPair => "set totals",
            Self::SetEndOfLine => "header end",
            Self::CardName => "card name",
            Self::SetPrefix => "set prefix",
            Self::CardPrices => "card prices",
            Self::Price => "price",
            Self::Bots => "bot list",
            Self::BotName => "bot code",
            Self::BotCount => "bot count",
            Self::Done => "end",
        }
    }
}

/// Pull-based tokenizer over a decoded report.
///
/// Each call to `next` runs the state machine only until a token is ready.
/// The stream ends after an `EndOfFile` or `Error` token.
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: State,
    options: Options,
    queue: VecDeque<Token<'a>>,
    has_header: bool,
    line_has_buy: bool,
    diagnostic: Option<LexError>,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(input: &'a str, options: Options) -> Self {
        Self {
            scanner: Scanner::new(input),
            state: State::LineStart,
            options,
            queue: VecDeque::with_capacity(2),
            has_header: false,
            line_has_buy: false,
            diagnostic: None,
        }
    }

    /// First irregularity met so far, or the error that stopped the stream.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&LexError> {
        self.diagnostic.as_ref()
    }

    pub const fn take_diagnostic(&mut self) -> Option<LexError> {
        self.diagnostic.take()
    }

    #[must_use]
    pub const fn options(&self) -> Options {
        self.options
    }

    fn step(&mut self, state: State) -> State {
        match state {
            State::LineStart => self.lex_line_start(),
            State::SetName => self.lex_set_name(),
            State::NumberPair => self.lex_number_pair(),
            State::SetEndOfLine => self.lex_set_end_of_line(),
            State::CardName => self.lex_card_name(),
            State::SetPrefix => self.lex_set_prefix(),
            State::CardPrices => self.lex_card_prices(),
            State::Price => self.lex_price(),
            State::Bots => self.lex_bots(),
            State::BotName => self.lex_bot_name(),
            State::BotCount => self.lex_bot_count(),
            State::Done => State::Done,
        }
    }

    fn emit(&mut self, kind: TokenKind) {
        let token = self.scanner.cut(kind);
        trace!(%token, "emit");
        self.queue.push_back(token);
    }

    fn finish(&mut self) -> State {
        self.scanner.ignore();
        self.emit(TokenKind::EndOfFile);
        State::Done
    }

    /// Stop the machine on malformed input.
    fn fail(&mut self, kind: LexErrorKind, state: State) -> State {
        let err = LexError {
            kind,
            offset: self.scanner.pos(),
            state: state.name(),
        };
        if self.options.strict {
            trace!(%err, "strict stop");
            let token = self.scanner.cut_rest(TokenKind::Error);
            self.queue.push_back(token);
        } else {
            warn!(%err, "report ends early");
            self.scanner.ignore();
            self.emit(TokenKind::EndOfFile);
        }
        self.diagnostic = Some(err);
        State::Done
    }

    /// Record an irregularity the lenient tokenizer steps over.
    fn note(&mut self, kind: LexErrorKind, state: State) {
        let err = LexError {
            kind,
            offset: self.scanner.pos(),
            state: state.name(),
        };
        warn!(%err, "irregular report");
        self.diagnostic.get_or_insert(err);
    }

    /// Advance until `marker` is at the cursor. Strict mode refuses to cross
    /// a newline.
    fn scan_until(&mut self, marker: &str) -> bool {
        loop {
            if self.scanner.matches_literal(marker) {
                return true;
            }
            match self.scanner.advance() {
                None => return false,
                Some('\n') if self.options.strict => {
                    self.scanner.retreat();
                    return false;
                }
                Some(_) => {}
            }
        }
    }

    fn lex_line_start(&mut self) -> State {
        loop {
            if self.scanner.matches_literal(HEADER_START) {
                self.scanner.skip_literal(HEADER_START);
                return State::SetName;
            }

            if self.has_header && self.scanner.accept_if(is_card_start) {
                self.scanner.retreat();
                self.scanner.ignore();
                return State::CardName;
            }

            if self.scanner.advance().is_none() {
                return self.finish();
            }
        }
    }

    fn lex_set_name(&mut self) -> State {
        if !self.scan_until(HEADER_END) {
            return self.fail(
                LexErrorKind::MissingMarker { marker: HEADER_END },
                State::SetName,
            );
        }
        self.emit(TokenKind::SetName);
        self.has_header = true;
        self.scanner.skip_literal(HEADER_END);
        State::NumberPair
    }

    fn lex_number_pair(&mut self) -> State {
        if !self.lex_number() {
            return State::Done;
        }
        if self.scanner.accept("/") {
            self.scanner.ignore();
            if !self.lex_number() {
                return State::Done;
            }
        }
        State::SetEndOfLine
    }

    fn lex_number(&mut self) -> bool {
        if self.scanner.accept_run(DIGITS) == 0 {
            if self.options.strict {
                self.fail(LexErrorKind::EmptyNumber, State::NumberPair);
                return false;
            }
            self.note(LexErrorKind::EmptyNumber, State::NumberPair);
        }
        self.emit(TokenKind::Number);
        true
    }

    fn lex_set_end_of_line(&mut self) -> State {
        if self.scanner.accept("]") && self.scanner.accept(" ") {
            self.scanner.accept_run("=");
            if self.scanner.advance() == Some('\n') {
                self.emit(TokenKind::EndOfLine);
                return State::LineStart;
            }
            self.scanner.retreat();
        }
        let found = self.scanner.peek();
        self.fail(
            LexErrorKind::MalformedHeaderEnd { found },
            State::SetEndOfLine,
        )
    }

    fn lex_card_name(&mut self) -> State {
        if !self.scan_until(CARD_SET_START) {
            return self.fail(
                LexErrorKind::MissingMarker {
                    marker: CARD_SET_START,
                },
                State::CardName,
            );
        }
        if self.scanner.has_pending() {
            self.scanner.mark_line_start();
            self.emit(TokenKind::CardName);
        }
        self.scanner.skip_literal(CARD_SET_START);
        self.line_has_buy = false;
        State::SetPrefix
    }

    fn lex_set_prefix(&mut self) -> State {
        if !self.scan_until(CARD_SET_END) {
            return self.fail(
                LexErrorKind::MissingMarker {
                    marker: CARD_SET_END,
                },
                State::SetPrefix,
            );
        }
        if self.scanner.has_pending() {
            self.emit(TokenKind::SetPrefix);
        }
        self.scanner.skip_literal(CARD_SET_END);
        State::CardPrices
    }

    fn lex_card_prices(&mut self) -> State {
        loop {
            match self.scanner.advance() {
                Some(' ') => self.scanner.ignore(),
                Some(ch) if ch.is_ascii_digit() => {
                    self.scanner.retreat();
                    return State::Price;
                }
                Some('\n') => {
                    self.scanner.ignore();
                    return State::LineStart;
                }
                None => return self.finish(),
                Some(ch) => {
                    if self.options.strict {
                        self.scanner.retreat();
                        return self.fail(
                            LexErrorKind::UnexpectedCharacter(ch),
                            State::CardPrices,
                        );
                    }
                    self.note(LexErrorKind::UnexpectedCharacter(ch), State::CardPrices);
                    self.scanner.ignore();
                }
            }
        }
    }

    fn lex_price(&mut self) -> State {
        let kind = if !self.line_has_buy && self.scanner.column() <= BUY_PRICE_MAX_COLUMN {
            TokenKind::BuyPrice
        } else {
            TokenKind::SellPrice
        };

        self.scanner.accept_run(DIGITS);
        if self.scanner.accept(".") && self.scanner.accept_run(DIGITS) == 0 && self.options.strict
        {
            return self.fail(LexErrorKind::MalformedPrice, State::Price);
        }
        self.emit(kind);

        if kind == TokenKind::BuyPrice {
            self.line_has_buy = true;
            return State::CardPrices;
        }
        State::Bots
    }

    fn lex_bots(&mut self) -> State {
        self.scanner.accept_run(" ");
        self.scanner.ignore();

        match self.scanner.peek() {
            Some('\n') => {
                self.scanner.advance();
                self.scanner.ignore();
                State::LineStart
            }
            None => self.finish(),
            Some(_) => State::BotName,
        }
    }

    fn lex_bot_name(&mut self) -> State {
        if self.scanner.accept_if(is_bot_first) {
            self.scanner.accept_if(is_bot_second);
            self.emit(TokenKind::BotName);
            return State::BotCount;
        }
        let found = self.scanner.peek();
        self.fail(LexErrorKind::MissingBotCode { found }, State::BotName)
    }

    fn lex_bot_count(&mut self) -> State {
        if !self.scanner.accept("[") {
            let found = self.scanner.peek();
            return self.fail(LexErrorKind::ExpectedBotCount { found }, State::BotCount);
        }
        self.scanner.ignore();

        if self.scanner.accept_run(DIGITS) == 0 {
            if self.options.strict {
                return self.fail(LexErrorKind::EmptyNumber, State::BotCount);
            }
            self.note(LexErrorKind::EmptyNumber, State::BotCount);
        }
        self.emit(TokenKind::BotCount);

        if !self.scanner.accept("]") {
            let found = self.scanner.peek();
            return self.fail(
                LexErrorKind::UnterminatedBotCount { found },
                State::BotCount,
            );
        }
        self.scanner.ignore();
        State::Bots
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let mut guard = IdleGuard::default();
        while self.queue.is_empty() {
            if self.state == State::Done {
                return None;
            }

            let from = self.state;
            let before = self.scanner.pos();
            self.state = self.step(from);
            trace!(from = from.name(), to = self.state.name(), "transition");

            let progressed = !self.queue.is_empty() || self.scanner.pos() != before;
            if guard.stalled(progressed) {
                self.state = self.fail(LexErrorKind::Stalled, from);
            }
        }
        self.queue.pop_front()
    }
}

impl std::iter::FusedIterator for Tokenizer<'_> {}
