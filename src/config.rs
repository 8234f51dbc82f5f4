/// How fractional digits beyond the thousandths are treated when a price
/// is converted to fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractionMode {
    /// Shrink the place value by ten per fractional digit. Four or more
    /// digits drive it to zero and the whole fraction is dropped. Stored
    /// prices were produced this way.
    #[default]
    Legacy,
    /// Keep the first three fractional digits and drop the rest.
    Truncate,
}

/// Options shared by the tokenizer and the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Report malformed input as an error instead of ending the stream.
    pub strict: bool,
    pub fractions: FractionMode,
}

impl Options {
    /// Lenient tokenizing with legacy fraction handling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict: false,
            fractions: FractionMode::Legacy,
        }
    }

    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn fractions(mut self, mode: FractionMode) -> Self {
        self.fractions = mode;
        self
    }
}
