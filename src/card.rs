use serde::{Deserialize, Serialize};

/// One priced entry of the report, as handed to a store.
///
/// Prices are fixed point (see [`crate::price::SCALE`]); `stock` is the sum
/// of every bot's count for this line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub set_name: String,
    pub buy_price: i64,
    pub sell_price: i64,
    pub stock: i64,
    pub timestamp: String,
}

impl Card {
    /// Start an entry named `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Same card in the same set.
    #[must_use]
    pub fn same_listing(&self, other: &Self) -> bool {
        self.name == other.name && self.set_name == other.set_name
    }

    /// Same listing with identical prices and stock; the timestamp is not
    /// compared.
    #[must_use]
    pub fn same_details(&self, other: &Self) -> bool {
        self.same_listing(other)
            && self.buy_price == other.buy_price
            && self.sell_price == other.sell_price
            && self.stock == other.stock
    }
}
