use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};

const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

/// The instant an update is recorded at, plus its human-readable date.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStamp {
    pub updated_at: DateTime<Utc>,
    pub display_date: String,
}

impl UpdateStamp {
    /// `display_date` is rendered in `offset` so a run shortly after midnight
    /// UTC still shows the operator's calendar day.
    pub fn at(updated_at: DateTime<Utc>, offset: FixedOffset) -> Self {
        let display_date = updated_at
            .with_timezone(&offset)
            .format(DISPLAY_DATE_FORMAT)
            .to_string();

        Self {
            updated_at,
            display_date,
        }
    }
}

pub fn resolve_updated_at(
    updated_at_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<DateTime<Utc>> {
    match updated_at_arg {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s.trim())
            .with_context(|| format!("--updated-at must be an RFC 3339 timestamp (got {s:?})"))?
            .with_timezone(&Utc)),
        None => Ok(now_utc),
    }
}
