#![allow(dead_code)]

use cardprices::{Options, TokenKind, Tokenizer};

pub const HEADER: &str = "=== Alpha === [Total Buy/Sell Value: 10/20] =====\n";

pub const TWO_SECTIONS: &str = "\
Price list generated for the bots\n\
\n\
=== Alpha === [Total Buy/Sell Value: 10/20] ==========\n\
Card1 [ALP]                       1.50              2.25 mr[2]\n\
Card2 [ALP]                       0.10              0.20 Cs[1] t2[4]\n\
=== Beta === [Total Buy/Sell Value: 3/4] ==========\n\
Æther Vial [BET]                  12                15\n\
Dusk [BET]                        0.005             0.01 b[9]\n";

/// Kinds and texts of every token, lenient mode.
pub fn lex(input: &str) -> Vec<(TokenKind, &str)> {
    lex_with(input, Options::new())
}

pub fn lex_with(input: &str, options: Options) -> Vec<(TokenKind, &str)> {
    Tokenizer::new(input, options)
        .map(|t| (t.kind, t.text))
        .collect()
}

/// A card line whose first price starts `column` bytes after the name.
pub fn line_with_price_at(column: usize) -> String {
    let head = "Card1 [ALP]  ";
    format!("{head}{}1.00\n", " ".repeat(column - head.len()))
}
