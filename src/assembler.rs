use std::fmt;

use tracing::debug;

use crate::card::Card;
use crate::config::Options;
use crate::lexer::{LexError, LexErrorKind, Tokenizer};
use crate::price::{self, PriceError};
use crate::token::{Span, Token, TokenKind};

/// Why a lexeme could not become a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberErrorKind {
    Price(PriceError),
    Count,
}

impl fmt::Display for NumberErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Price(e) => write!(f, "{e}"),
            Self::Count => write!(f, "bot count is not a number"),
        }
    }
}

/// Error produced while assembling cards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    /// The tokenizer stopped on malformed input (strict mode).
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A price or count lexeme was not a number.
    #[error("{kind} ({text:?} at byte {})", span.offset)]
    InvalidNumber {
        kind: NumberErrorKind,
        text: String,
        span: Span,
    },
}

/// Tokenize and assemble a whole report into cards.
///
/// # Errors
///
/// Returns the first `AssembleError`: a strict-mode tokenizer error or a
/// lexeme that does not convert to a number.
pub fn assemble(
    input: &str,
    timestamp: &str,
    options: Options,
) -> Result<Vec<Card>, AssembleError> {
    Assembler::new(Tokenizer::new(input, options), timestamp).collect()
}

/// Turns a token stream into finalized cards.
///
/// A card is handed out when the next card name or the end of the stream
/// arrives. After an error the iterator is exhausted.
pub struct Assembler<'a> {
    tokens: Tokenizer<'a>,
    timestamp: String,
    current: Card,
    done: bool,
}

impl<'a> Assembler<'a> {
    #[must_use]
    pub fn new(tokens: Tokenizer<'a>, timestamp: &str) -> Self {
        Self {
            tokens,
            timestamp: timestamp.to_string(),
            current: Card::default(),
            done: false,
        }
    }

    /// The underlying tokenizer, e.g. to read its diagnostic after the
    /// stream ended.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer<'a> {
        &self.tokens
    }

    /// Hand out the working card if it has a name and start `next`.
    fn replace_current(&mut self, next: Card) -> Option<Card> {
        let card = std::mem::replace(&mut self.current, next);
        if card.name.is_empty() {
            return None;
        }
        debug!(
            name = %card.name,
            set = %card.set_name,
            buy = card.buy_price,
            sell = card.sell_price,
            stock = card.stock,
            "card"
        );
        Some(Card {
            timestamp: self.timestamp.clone(),
            ..card
        })
    }

    fn price(&self, token: &Token<'_>) -> Result<i64, AssembleError> {
        price::to_fixed(token.text, self.tokens.options().fractions).map_err(|e| {
            AssembleError::InvalidNumber {
                kind: NumberErrorKind::Price(e),
                text: token.text.to_string(),
                span: token.span,
            }
        })
    }

    fn count(token: &Token<'_>) -> Result<i64, AssembleError> {
        let invalid = || AssembleError::InvalidNumber {
            kind: NumberErrorKind::Count,
            text: token.text.to_string(),
            span: token.span,
        };
        if token.text.is_empty() || !token.text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        token.text.parse::<i64>().map_err(|_| invalid())
    }

    fn apply(&mut self, token: &Token<'_>) -> Result<Option<Card>, AssembleError> {
        match token.kind {
            TokenKind::CardName => return Ok(self.replace_current(Card::named(token.text))),
            TokenKind::SetPrefix => self.current.set_name = token.text.to_string(),
            TokenKind::BuyPrice => self.current.buy_price = self.price(token)?,
            TokenKind::SellPrice => self.current.sell_price = self.price(token)?,
            TokenKind::BotCount => {
                let count = Self::count(token)?;
                self.current.stock = self.current.stock.saturating_add(count);
            }
            TokenKind::SetName
            | TokenKind::Number
            | TokenKind::BotName
            | TokenKind::EndOfLine
            | TokenKind::EndOfFile
            | TokenKind::Error => {}
        }
        Ok(None)
    }
}

impl Iterator for Assembler<'_> {
    type Item = Result<Card, AssembleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::EndOfFile => {
                    self.done = true;
                    return self.replace_current(Card::default()).map(Ok);
                }
                TokenKind::Error => {
                    self.done = true;
                    let err = self.tokens.take_diagnostic().unwrap_or(LexError {
                        kind: LexErrorKind::Stalled,
                        offset: token.span.offset,
                        state: "end",
                    });
                    return Some(Err(err.into()));
                }
                _ => {}
            }

            match self.apply(&token) {
                Ok(Some(card)) => return Some(Ok(card)),
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        // Tokenizer ran dry without a terminal token.
        self.done = true;
        self.replace_current(Card::default()).map(Ok)
    }
}

impl std::iter::FusedIterator for Assembler<'_> {}
