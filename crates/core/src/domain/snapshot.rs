use crate::domain::product::{ProductKey, Section};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

pub const DEFAULT_UPDATE_FREQUENCY: &str = "Updated daily by 9 AM ET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product row as stored in the rates file.
///
/// Fields written by older tooling may be missing, `null`, or of the wrong
/// type; those read as their defaults since the update replaces or backfills
/// them. Keys this type does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateProduct {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_class: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub rate: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub apr: String,
    #[serde(
        default,
        deserialize_with = "lenient_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub featured: Option<bool>,
    #[serde(
        default,
        serialize_with = "serialize_rate_number",
        deserialize_with = "lenient_or_default"
    )]
    pub rate_value: f64,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub term: u32,
    #[serde(
        default,
        serialize_with = "serialize_rate_number",
        deserialize_with = "lenient_or_default"
    )]
    pub prev_rate_value: f64,
    #[serde(
        default,
        serialize_with = "serialize_rate_number",
        deserialize_with = "lenient_or_default"
    )]
    pub rate_change: f64,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub trend: Trend,
    #[serde(
        default,
        serialize_with = "serialize_opt_rate_number",
        deserialize_with = "lenient_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub avg30day: Option<f64>,
    #[serde(
        default,
        serialize_with = "serialize_opt_rate_number",
        deserialize_with = "lenient_or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub market_avg: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    #[serde(
        default,
        serialize_with = "serialize_iso_millis",
        deserialize_with = "deserialize_lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub update_frequency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub purchase: Vec<RateProduct>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub refi: Vec<RateProduct>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Snapshot {
    pub fn section(&self, section: Section) -> &[RateProduct] {
        match section {
            Section::Purchase => &self.purchase,
            Section::Refi => &self.refi,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<RateProduct> {
        match section {
            Section::Purchase => &mut self.purchase,
            Section::Refi => &mut self.refi,
        }
    }

    pub fn product(&self, key: ProductKey) -> Option<&RateProduct> {
        let (section, index) = key.slot();
        self.section(section).get(index)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Any value that does not fit `T` (wrong type, unknown variant, `null`) reads as the default.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(T::deserialize(raw).unwrap_or_default())
}

// Whole numbers are written without a fraction (`7`, not `7.0`).
fn serialize_rate_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn serialize_opt_rate_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serialize_rate_number(v, serializer),
        None => serializer.serialize_none(),
    }
}

// Millisecond precision with a trailing `Z`.
fn serialize_iso_millis<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

// An unparseable prior value reads as `None`.
fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }))
}
