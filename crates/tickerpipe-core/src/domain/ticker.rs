use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Normalized exchange symbol, e.g. `AAPL`, `BRK-B`, `^GSPC`, `EURUSD=X`.
///
/// Only case is normalized; the upstream accepts a wide alphabet of index and
/// currency markers, so no character filtering happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTickers);
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// Ordered, de-duplicated set of symbols requested in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSet {
    symbols: Vec<Symbol>,
}

impl TickerSet {
    /// Parse a whitespace- or comma-separated ticker list (`"AAPL MSFT"`,
    /// `"aapl,msft"`). Duplicates keep their first position.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for raw in split_tickers(input) {
            let symbol = Symbol::parse(raw)?;
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        if symbols.is_empty() {
            return Err(ValidationError::EmptyTickers);
        }

        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.symbols.len() == 1
    }
}

impl Display for TickerSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

/// Raw ticker tokens as typed by the caller, before normalization.
pub fn split_tickers(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = Symbol::parse(" aapl ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "AAPL");
    }

    #[test]
    fn splits_on_spaces_and_commas_and_dedupes() {
        let set = TickerSet::parse("aapl MSFT,  aapl\tspy").expect("valid set");
        let symbols = set
            .symbols()
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>();

        assert_eq!(symbols, vec!["AAPL", "MSFT", "SPY"]);
        assert_eq!(set.to_string(), "AAPL MSFT SPY");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(TickerSet::parse("  , "), Err(ValidationError::EmptyTickers));
    }
}
