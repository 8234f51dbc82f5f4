use crate::report::{BotEntry, CardLine, Report, Section};

impl Report {
    /// Create a new empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Add a set section.
    #[must_use]
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

impl Section {
    /// Create a section with zero totals and no cards.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_buy: 0,
            total_sell: 0,
            cards: Vec::new(),
        }
    }

    /// Set the header's buy/sell totals.
    #[must_use]
    pub const fn totals(mut self, buy: u64, sell: u64) -> Self {
        self.total_buy = buy;
        self.total_sell = sell;
        self
    }

    /// Add a card line.
    #[must_use]
    pub fn card(mut self, line: CardLine) -> Self {
        self.cards.push(line);
        self
    }
}

impl CardLine {
    /// Create a card line with zero prices and no bots.
    #[must_use]
    pub fn new(name: &str, set_prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            set_prefix: set_prefix.to_string(),
            buy_price: 0,
            sell_price: 0,
            bots: Vec::new(),
        }
    }

    /// Set buy and sell prices, fixed point.
    #[must_use]
    pub const fn prices(mut self, buy: i64, sell: i64) -> Self {
        self.buy_price = buy;
        self.sell_price = sell;
        self
    }

    /// Add a bot entry.
    #[must_use]
    pub fn bot(mut self, code: &str, count: u32) -> Self {
        self.bots.push(BotEntry {
            code: code.to_string(),
            count,
        });
        self
    }
}
