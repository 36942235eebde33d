pub mod domain;
pub mod ingest;
pub mod storage;
pub mod time;
pub mod update;

pub mod config {
    use anyhow::Context;
    use chrono::{FixedOffset, Offset, Utc};
    use std::path::PathBuf;

    pub const DEFAULT_RATES_PATH: &str = "rates.json";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub rates_path: PathBuf,
        pub display_offset: FixedOffset,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
        where
            F: Fn(&str) -> Option<String>,
        {
            let rates_path = lookup("RATES_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RATES_PATH));

            let display_offset = match lookup("RATES_UTC_OFFSET").filter(|s| !s.trim().is_empty()) {
                Some(s) => parse_utc_offset(&s)
                    .with_context(|| format!("RATES_UTC_OFFSET is not a valid offset: {s}"))?,
                None => utc(),
            };

            Ok(Self {
                rates_path,
                display_offset,
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
            })
        }
    }

    /// Accepts `Z`, `UTC`, or a signed `HH:MM` offset such as `-05:00`.
    pub fn parse_utc_offset(s: &str) -> anyhow::Result<FixedOffset> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(utc());
        }
        Ok(s.parse::<FixedOffset>()?)
    }

    fn utc() -> FixedOffset {
        Utc.fix()
    }

}
