use crate::domain::product::ProductKey;
use crate::ingest::error::InputError;
use crate::ingest::types::{ParsedRate, ParsedRates};
use std::collections::BTreeMap;

/// Raw rate inputs for one product, exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateInput {
    pub current_rate: Option<String>,
    pub current_apr: Option<String>,
    pub previous_rate: Option<String>,
}

/// Every recognised rate input, keyed by product.
///
/// Built from the environment by the worker, or from any lookup function so
/// the updater never touches process-global state itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateInputs {
    pub products: BTreeMap<ProductKey, RateInput>,
}

impl RateInputs {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let products = ProductKey::ALL
            .iter()
            .map(|&key| {
                let input = RateInput {
                    current_rate: lookup(&key.rate_var()),
                    current_apr: lookup(&key.apr_var()),
                    previous_rate: lookup(&key.prev_rate_var()),
                };
                (key, input)
            })
            .collect();

        Self { products }
    }

    /// Parses every product, failing on the first unusable value.
    pub fn parse(&self) -> Result<ParsedRates, InputError> {
        let mut products = BTreeMap::new();
        for key in ProductKey::ALL {
            let input = self.products.get(&key).cloned().unwrap_or_default();
            products.insert(key, parse_product(key, &input)?);
        }
        Ok(ParsedRates { products })
    }
}

fn parse_product(key: ProductKey, input: &RateInput) -> Result<ParsedRate, InputError> {
    let current = parse_required(&key.rate_var(), input.current_rate.as_deref())?;
    let apr = parse_required(&key.apr_var(), input.current_apr.as_deref())?;
    let previous = parse_optional(&key.prev_rate_var(), input.previous_rate.as_deref())?;

    Ok(ParsedRate {
        current,
        apr,
        previous,
    })
}

fn parse_required(variable: &str, raw: Option<&str>) -> Result<f64, InputError> {
    match parse_optional(variable, raw)? {
        Some(v) => Ok(v),
        None => Err(InputError {
            variable: variable.to_string(),
            value: raw.map(str::to_string),
            detail: "is required",
        }),
    }
}

fn parse_optional(variable: &str, raw: Option<&str>) -> Result<Option<f64>, InputError> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let invalid = || InputError {
        variable: variable.to_string(),
        value: Some(s.to_string()),
        detail: "is not a valid number",
    };

    let v = s.parse::<f64>().map_err(|_| invalid())?;
    if !v.is_finite() {
        return Err(invalid());
    }
    Ok(Some(v))
}
