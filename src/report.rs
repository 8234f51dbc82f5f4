use crate::card::Card;

/// A complete price report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    pub sections: Vec<Section>,
}

/// Set section: header totals plus the card lines under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub total_buy: u64,
    pub total_sell: u64,
    pub cards: Vec<CardLine>,
}

/// One card line with its fixed-point prices and bot stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLine {
    pub name: String,
    pub set_prefix: String,
    pub buy_price: i64,
    pub sell_price: i64,
    pub bots: Vec<BotEntry>,
}

/// Bot code and the number of copies that bot holds, e.g. `mr[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotEntry {
    pub code: String,
    pub count: u32,
}

impl CardLine {
    /// Stock over all bots.
    #[must_use]
    pub fn stock(&self) -> i64 {
        self.bots.iter().map(|b| i64::from(b.count)).sum()
    }

    /// The record this line assembles into.
    #[must_use]
    pub fn to_card(&self, timestamp: &str) -> Card {
        Card {
            name: self.name.clone(),
            set_name: self.set_prefix.clone(),
            buy_price: self.buy_price,
            sell_price: self.sell_price,
            stock: self.stock(),
            timestamp: timestamp.to_string(),
        }
    }
}

impl Report {
    /// Records for every card line, in document order.
    #[must_use]
    pub fn cards(&self, timestamp: &str) -> Vec<Card> {
        self.sections
            .iter()
            .flat_map(|s| &s.cards)
            .map(|line| line.to_card(timestamp))
            .collect()
    }
}
