use crate::domain::product::ProductKey;
use std::collections::BTreeMap;

/// Validated numbers for one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRate {
    pub current: f64,
    pub apr: f64,
    /// `None` when no previous value was supplied.
    pub previous: Option<f64>,
}

impl ParsedRate {
    /// Previous rate with the missing-value policy applied: no previous value
    /// means "unchanged", so the delta comes out as zero.
    pub fn previous_or_current(&self) -> f64 {
        self.previous.unwrap_or(self.current)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRates {
    pub products: BTreeMap<ProductKey, ParsedRate>,
}

impl ParsedRates {
    pub fn get(&self, key: ProductKey) -> Option<&ParsedRate> {
        self.products.get(&key)
    }
}
