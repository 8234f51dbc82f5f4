use std::fmt;

/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character of the lexeme.
    pub offset: usize,
}

/// Token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of the report (clean or lenient stop).
    EndOfFile,
    /// Tail of a section header: `] =====` and the newline.
    EndOfLine,
    /// Section title between `=== ` and ` === [Total ...`.
    SetName,
    /// Card name, up to ` [`.
    CardName,
    /// Set abbreviation between ` [` and `]  `.
    SetPrefix,
    /// One of the two section totals.
    Number,
    /// Price classified as the buy column.
    BuyPrice,
    /// Price classified as the sell column.
    SellPrice,
    /// Trading-bot code.
    BotName,
    /// Digits of a bracketed bot stock count.
    BotCount,
    /// Structural error in strict mode.
    Error,
}

impl TokenKind {
    /// Whether this kind ends the token stream.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::EndOfFile | Self::Error)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EndOfFile => "EOF",
            Self::EndOfLine => "EOL",
            Self::SetName => "SetName",
            Self::CardName => "CardName",
            Self::SetPrefix => "SetPrefix",
            Self::Number => "Number",
            Self::BuyPrice => "BuyPrice",
            Self::SellPrice => "SellPrice",
            Self::BotName => "BotName",
            Self::BotCount => "BotCount",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and source location.
///
/// The text borrows from the tokenized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfFile | TokenKind::EndOfLine => write!(f, "{}", self.kind),
            _ => write!(f, "{}({:?}) @{}", self.kind, self.text, self.span.offset),
        }
    }
}
