//! API configuration.

use std::time::Instant;

use chrono::{FixedOffset, Offset, Utc};

/// Environment variable for the IANA timezone name passed to the extractor.
pub const TIMEZONE_ENV: &str = "TASKGRAM_TIMEZONE";

/// Environment variable for the UTC offset (`+06:00` form) used to stamp
/// "now" before each extraction.
pub const UTC_OFFSET_ENV: &str = "TASKGRAM_UTC_OFFSET";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Timezone name given to the extractor for deadline inference.
    pub timezone: String,
    /// UTC offset matching `timezone`.
    pub utc_offset: FixedOffset,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ApiConfig {
    /// Creates a new API configuration with the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timezone: "UTC".to_string(),
            utc_offset: Utc.fix(),
            start_time: Instant::now(),
        }
    }

    /// Overrides the timezone used for deadline inference.
    ///
    /// `offset` is the `±HH:MM` form; an unparseable offset keeps UTC.
    pub fn with_timezone(mut self, timezone: impl Into<String>, offset: &str) -> Self {
        self.timezone = timezone.into();
        if let Some(parsed) = parse_utc_offset(offset) {
            self.utc_offset = parsed;
        }
        self
    }

    /// Applies `TASKGRAM_TIMEZONE` / `TASKGRAM_UTC_OFFSET` from the
    /// environment, when set.
    pub fn with_env_timezone(mut self) -> Self {
        if let Ok(tz) = std::env::var(TIMEZONE_ENV) {
            self.timezone = tz;
        }
        if let Some(offset) = std::env::var(UTC_OFFSET_ENV)
            .ok()
            .as_deref()
            .and_then(parse_utc_offset)
        {
            self.utc_offset = offset;
        }
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 8080)
    }
}

/// Parses a `±HH:MM` UTC offset.
fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => (1, s),
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
