use std::fmt;

/// A rate input that is missing or not a usable number.
#[derive(Debug, Clone, PartialEq)]
pub struct InputError {
    pub variable: String,
    pub value: Option<String>,
    pub detail: &'static str,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} {} (got {value:?})", self.variable, self.detail),
            None => write!(f, "{} {}", self.variable, self.detail),
        }
    }
}

impl std::error::Error for InputError {}
