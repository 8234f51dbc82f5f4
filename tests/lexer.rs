//! Tokenizer behaviour on whole reports.

mod common;

use cardprices::{BUY_PRICE_MAX_COLUMN, LexErrorKind, Options, TokenKind, Tokenizer, tokenize};
use common::{HEADER, TWO_SECTIONS, lex, lex_with, line_with_price_at};

// -----------------------------------------------------------
// Grammar.
// -----------------------------------------------------------

#[test]
fn single_card_report() {
    let input = format!("{HEADER}Card1 [ALP]  1.50   2.25 aa[2]");
    assert_eq!(
        lex(&input),
        vec![
            (TokenKind::SetName, "Alpha"),
            (TokenKind::Number, "10"),
            (TokenKind::Number, "20"),
            (TokenKind::EndOfLine, "] =====\n"),
            (TokenKind::CardName, "Card1"),
            (TokenKind::SetPrefix, "ALP"),
            (TokenKind::BuyPrice, "1.50"),
            (TokenKind::SellPrice, "2.25"),
            (TokenKind::BotName, "aa"),
            (TokenKind::BotCount, "2"),
            (TokenKind::EndOfFile, ""),
        ]
    );
}

#[test]
fn offsets_point_into_input() {
    let input = format!("{HEADER}Card1 [ALP]  1.50   2.25 aa[2]\n");
    for token in Tokenizer::new(&input, Options::new()) {
        let at = token.span.offset;
        assert_eq!(&input[at..at + token.text.len()], token.text);
    }
}

#[test]
fn two_sections() {
    let tokens = lex(TWO_SECTIONS);
    let names: Vec<_> = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::CardName)
        .map(|(_, t)| *t)
        .collect();
    assert_eq!(names, vec!["Card1", "Card2", "Æther Vial", "Dusk"]);

    let sets: Vec<_> = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::SetName)
        .map(|(_, t)| *t)
        .collect();
    assert_eq!(sets, vec!["Alpha", "Beta"]);
    assert_eq!(tokens.last(), Some(&(TokenKind::EndOfFile, "")));
}

#[test]
fn preamble_is_skipped() {
    let tokens = lex(TWO_SECTIONS);
    assert_eq!(tokens[0], (TokenKind::SetName, "Alpha"));
}

#[test]
fn several_bots_on_one_line() {
    let input = format!("{HEADER}Card1 [ALP]  1   2 mr[3]  Cs[10] b[1]\n");
    let bots: Vec<_> = lex(&input)
        .into_iter()
        .filter(|(k, _)| matches!(k, TokenKind::BotName | TokenKind::BotCount))
        .map(|(_, t)| t)
        .collect();
    assert_eq!(bots, vec!["mr", "3", "Cs", "10", "b", "1"]);
}

#[test]
fn lowercase_line_is_not_a_card() {
    let input = format!("{HEADER}note: ignore me\nCard1 [ALP]  1\n");
    let names: Vec<_> = lex(&input)
        .into_iter()
        .filter(|(k, _)| *k == TokenKind::CardName)
        .collect();
    // Skipping starts over at the next uppercase letter.
    assert_eq!(names, vec![(TokenKind::CardName, "Card1")]);
}

// -----------------------------------------------------------
// Column threshold.
// -----------------------------------------------------------

#[test]
fn price_at_threshold_is_buy() {
    let input = format!("{HEADER}{}", line_with_price_at(BUY_PRICE_MAX_COLUMN));
    let tokens = lex(&input);
    assert!(tokens.contains(&(TokenKind::BuyPrice, "1.00")));
}

#[test]
fn price_past_threshold_is_sell() {
    let input = format!("{HEADER}{}", line_with_price_at(BUY_PRICE_MAX_COLUMN + 1));
    let tokens = lex(&input);
    assert!(tokens.contains(&(TokenKind::SellPrice, "1.00")));
    assert!(!tokens.iter().any(|(k, _)| *k == TokenKind::BuyPrice));
}

#[test]
fn column_counts_from_card_name_not_line() {
    // A long preamble on the header line must not shift the columns.
    let input = format!(
        "=== {} === [Total Buy/Sell Value: 1/2] =\n{}",
        "X".repeat(60),
        line_with_price_at(BUY_PRICE_MAX_COLUMN)
    );
    assert!(lex(&input).contains(&(TokenKind::BuyPrice, "1.00")));
}

#[test]
fn threshold_constant() {
    assert_eq!(BUY_PRICE_MAX_COLUMN, 44);
}

// -----------------------------------------------------------
// Determinism.
// -----------------------------------------------------------

#[test]
fn tokenizing_twice_is_identical() {
    let a = tokenize(TWO_SECTIONS, Options::new()).expect("tokenize");
    let b = tokenize(TWO_SECTIONS, Options::new()).expect("tokenize");
    assert_eq!(a, b);
}

// -----------------------------------------------------------
// Malformed input.
// -----------------------------------------------------------

const TRUNCATED: &str = "=== Alpha === [Total Buy/Sell Value: 10/20]";

#[test]
fn truncated_header_lenient_ends_with_diagnostic() {
    let mut tokenizer = Tokenizer::new(TRUNCATED, Options::new());
    let kinds: Vec<_> = tokenizer.by_ref().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::SetName,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::EndOfFile
        ]
    );
    let diag = tokenizer.diagnostic().expect("diagnostic");
    assert_eq!(diag.kind, LexErrorKind::MalformedHeaderEnd { found: None });
}

#[test]
fn truncated_header_strict_is_error() {
    let err = tokenize(TRUNCATED, Options::new().strict(true)).expect_err("strict");
    assert_eq!(err.kind, LexErrorKind::MalformedHeaderEnd { found: None });
    assert_eq!(err.offset, TRUNCATED.len());
    assert_eq!(err.state, "header end");
    assert_eq!(
        err.to_string(),
        format!(
            "expected \"] ===\" and end of line, got end of input at byte {} in header end",
            TRUNCATED.len()
        )
    );
}

#[test]
fn strict_stream_ends_with_error_token() {
    let kinds: Vec<_> = lex_with(TRUNCATED, Options::new().strict(true))
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(kinds.last(), Some(&TokenKind::Error));
    assert!(!kinds.contains(&TokenKind::EndOfFile));
}

#[test]
fn clean_report_has_no_diagnostic() {
    let mut tokenizer = Tokenizer::new(TWO_SECTIONS, Options::new().strict(true));
    assert!(tokenizer.by_ref().all(|t| t.kind != TokenKind::Error));
    assert!(tokenizer.diagnostic().is_none());
}

#[test]
fn missing_set_marker() {
    let input = format!("{HEADER}Card1 [ALP] 1.50");
    let err = tokenize(&input, Options::new().strict(true)).expect_err("strict");
    assert_eq!(err.kind, LexErrorKind::MissingMarker { marker: "]  " });
    assert_eq!(err.state, "set prefix");
}

#[test]
fn unterminated_bot_count() {
    let input = format!("{HEADER}Card1 [ALP]  1.50   2.25 aa[2 bb[3]\n");
    let err = tokenize(&input, Options::new().strict(true)).expect_err("strict");
    assert_eq!(
        err.kind,
        LexErrorKind::UnterminatedBotCount { found: Some(' ') }
    );
}

#[test]
fn bot_code_without_count() {
    let input = format!("{HEADER}Card1 [ALP]  1.50   2.25 aa\n");
    let err = tokenize(&input, Options::new().strict(true)).expect_err("strict");
    assert_eq!(
        err.kind,
        LexErrorKind::ExpectedBotCount { found: Some('\n') }
    );
    assert_eq!(err.state, "bot count");
}

#[test]
fn empty_total_is_noted_in_lenient_mode() {
    let input = "=== Alpha === [Total Buy/Sell Value: /20] =====\n";
    let mut tokenizer = Tokenizer::new(input, Options::new());
    let tokens: Vec<_> = tokenizer.by_ref().map(|t| (t.kind, t.text)).collect();
    assert_eq!(tokens[1], (TokenKind::Number, ""));
    assert_eq!(tokens.last(), Some(&(TokenKind::EndOfFile, "")));
    assert_eq!(
        tokenizer.diagnostic().map(|d| &d.kind),
        Some(&LexErrorKind::EmptyNumber)
    );

    let err = tokenize(input, Options::new().strict(true)).expect_err("strict");
    assert_eq!(err.kind, LexErrorKind::EmptyNumber);
}

#[test]
fn junk_in_price_region() {
    let input = format!("{HEADER}Card1 [ALP]  $1.50   2.25\n");
    let tokens = lex(&input);
    assert!(tokens.contains(&(TokenKind::BuyPrice, "1.50")));

    let err = tokenize(&input, Options::new().strict(true)).expect_err("strict");
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('$'));
}
