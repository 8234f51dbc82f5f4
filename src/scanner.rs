//! Character cursor underneath the tokenizer.
//!
//! Works on Unicode scalar values so a multi-byte character is never split.
//! `start..pos` is the pending lexeme; `cut` turns it into a token.

use crate::token::{Span, Token, TokenKind};

pub(crate) struct Scanner<'a> {
    input: &'a str,
    start: usize,
    line_start: usize,
    pos: usize,
    // Width of the last char returned by `advance`, zero once retreated.
    width: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        let start = if input.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };
        Self {
            input,
            start,
            line_start: start,
            pos: start,
            width: 0,
        }
    }

    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    /// Offset of the pending lexeme from the start of the current card line.
    pub(crate) const fn column(&self) -> usize {
        self.start.saturating_sub(self.line_start)
    }

    /// Anchor the column origin at the pending lexeme.
    pub(crate) const fn mark_line_start(&mut self) {
        self.line_start = self.start;
    }

    pub(crate) const fn has_pending(&self) -> bool {
        self.pos > self.start
    }

    pub(crate) fn pending(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    /// Consume one character, `None` at end of input.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let Some(ch) = self.input[self.pos..].chars().next() else {
            self.width = 0;
            return None;
        };
        self.width = ch.len_utf8();
        self.pos += self.width;
        Some(ch)
    }

    /// Undo the last `advance`.
    ///
    /// # Panics
    ///
    /// Panics when called twice without an `advance` in between after a
    /// character was consumed. Retreating from end of input is a no-op.
    pub(crate) fn retreat(&mut self) {
        assert!(
            self.width > 0 || self.pos == self.input.len(),
            "scanner retreated twice at byte {}",
            self.pos
        );
        self.pos -= self.width;
        self.width = 0;
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        let ch = self.advance();
        self.retreat();
        ch
    }

    pub(crate) fn accept_if(&mut self, valid: impl Fn(char) -> bool) -> bool {
        match self.advance() {
            Some(ch) if valid(ch) => true,
            _ => {
                self.retreat();
                false
            }
        }
    }

    pub(crate) fn accept(&mut self, valid: &str) -> bool {
        self.accept_if(|ch| valid.contains(ch))
    }

    pub(crate) fn accept_run_if(&mut self, valid: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while self.accept_if(&valid) {
            count += 1;
        }
        count
    }

    pub(crate) fn accept_run(&mut self, valid: &str) -> usize {
        self.accept_run_if(|ch| valid.contains(ch))
    }

    pub(crate) fn matches_literal(&self, literal: &str) -> bool {
        self.input[self.pos..].starts_with(literal)
    }

    /// Step over `literal`, which must be at the cursor, and drop it.
    pub(crate) fn skip_literal(&mut self, literal: &str) {
        debug_assert!(self.matches_literal(literal));
        self.pos += literal.len();
        self.width = 0;
        self.ignore();
    }

    /// Drop the pending lexeme.
    pub(crate) const fn ignore(&mut self) {
        self.start = self.pos;
    }

    /// Cut the pending lexeme into a token and start a new one.
    pub(crate) fn cut(&mut self, kind: TokenKind) -> Token<'a> {
        let token = Token {
            kind,
            text: self.pending(),
            span: Span { offset: self.start },
        };
        self.start = self.pos;
        token
    }

    /// Cut everything up to end of input as one token.
    pub(crate) fn cut_rest(&mut self, kind: TokenKind) -> Token<'a> {
        self.pos = self.input.len();
        self.width = 0;
        self.cut(kind)
    }
}
