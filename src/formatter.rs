//! Renders a report document as fixed-width text the tokenizer reads back.
//!
//! Card names must start with an uppercase letter, and the part up to the
//! set prefix's closing `]  ` must fit before the buy column for the prices
//! to land in the right columns.

use std::fmt::Write as _;

use crate::price::format_fixed;
use crate::report::{CardLine, Report, Section};

/// Column (from the start of the card name) where the buy price starts
/// when the name and prefix are short enough.
pub const BUY_COLUMN: usize = 32;
/// Column where the sell price starts when the buy price is short enough.
pub const SELL_COLUMN: usize = 50;
const RULE_WIDTH: usize = 20;

/// Format a `Report` as report text. Every line ends with a newline.
#[must_use]
pub fn format(report: &Report) -> String {
    let mut out = String::new();
    for section in &report.sections {
        format_section(&mut out, section);
    }
    out
}

fn format_section(out: &mut String, section: &Section) {
    let _ = write!(
        out,
        "=== {} === [Total Buy/Sell Value: {}/{}] ",
        section.name, section.total_buy, section.total_sell
    );
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');

    for line in &section.cards {
        format_card_line(out, line);
    }
}

fn format_card_line(out: &mut String, line: &CardLine) {
    let start = out.len();
    let _ = write!(out, "{} [{}]  ", line.name, line.set_prefix);

    pad_to(out, start, BUY_COLUMN);
    out.push_str(&format_fixed(line.buy_price));

    out.push(' ');
    pad_to(out, start, SELL_COLUMN);
    out.push_str(&format_fixed(line.sell_price));

    for bot in &line.bots {
        let _ = write!(out, " {}[{}]", bot.code, bot.count);
    }
    out.push('\n');
}

/// Pad with spaces until the line that began at byte `start` is `column`
/// bytes long.
fn pad_to(out: &mut String, start: usize, column: usize) {
    let width = out.len() - start;
    if width < column {
        out.push_str(&" ".repeat(column - width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_line_columns() {
        let report = Report::new().section(
            Section::new("Alpha")
                .totals(10, 20)
                .card(CardLine::new("Card1", "ALP").prices(1500, 2250).bot("aa", 2)),
        );
        let text = format(&report);
        let line = text.lines().nth(1).expect("card line");
        assert_eq!(line.find("1.50"), Some(BUY_COLUMN));
        assert_eq!(line.find("2.25"), Some(SELL_COLUMN));
        assert!(line.ends_with("2.25 aa[2]"));
    }

    #[test]
    fn header_line() {
        let report = Report::new().section(Section::new("Beta").totals(1, 2));
        assert_eq!(
            format(&report),
            "=== Beta === [Total Buy/Sell Value: 1/2] ====================\n"
        );
    }
}
