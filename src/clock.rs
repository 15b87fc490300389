//! # Clock and Date Formatting
//!
//! Turns an instant into the strings the face displays, and owns the notion of
//! "which timezone are we showing". The time source itself is a capability
//! supplied by the host so tests and simulators can pin the clock.
//!
//! ## Formats
//! - **24 hour**: `HH:MM`, zero padded (`07:05`, `23:59`)
//! - **12 hour**: `H:MM am|pm`, midnight and noon shown as 12 (`12:00 am`)
//! - **Date**: abbreviated weekday, month, day and year (`Mon, Jan 5 2026`),
//!   always with English names regardless of the device locale
//!
//! ## Timezones
//! Timezone broadcasts carry a zone identifier. Fixed offsets (`UTC`, `+05:30`,
//! `GMT-8`) are resolved here; named zones are left to the host OS and resolve
//! to the system's local offset.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Timelike, Utc};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Redraw period while interactive.
pub const INTERACTIVE_UPDATE_RATE_MS: i64 = 1000;

/// Zone identifier meaning "whatever the system is set to".
pub const LOCAL_ZONE: &str = "local";

/// Source of the current instant and the system's default zone.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;

    /// Identifier of the zone the device is currently set to.
    fn default_zone(&self) -> String {
        LOCAL_ZONE.to_string()
    }
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle and
/// give the other to the engine.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use watchface_lib::clock::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap());
/// let handle = clock.clone();
/// handle.advance_ms(1500);
/// assert_eq!(clock.now().timestamp_millis() % 1000, 500);
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    now_ms: Rc<Cell<i64>>,
    zone: String,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start.timestamp_millis())),
            zone: "UTC".to_string(),
        }
    }

    /// Report `zone` as the system default zone.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now_ms.set(instant.timestamp_millis());
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms.get()).unwrap_or_default()
    }

    fn default_zone(&self) -> String {
        self.zone.clone()
    }
}

/// Format the time of day for the main clock text.
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use watchface_lib::clock::format_time;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let t = utc.with_ymd_and_hms(2026, 1, 5, 0, 7, 0).unwrap();
/// assert_eq!(format_time(&t, true), "00:07");
/// assert_eq!(format_time(&t, false), "12:07 am");
/// ```
pub fn format_time(instant: &DateTime<FixedOffset>, use_24_hour: bool) -> String {
    let minute = instant.minute();
    if use_24_hour {
        format!("{:02}:{:02}", instant.hour(), minute)
    } else {
        // hour12() already maps 0 and 12 to 12
        let (is_pm, hour) = instant.hour12();
        let suffix = if is_pm { "pm" } else { "am" };
        format!("{}:{:02} {}", hour, minute, suffix)
    }
}

/// Format the date line, e.g. `Mon, Jan 5 2026`.
pub fn format_date(instant: &DateTime<FixedOffset>) -> String {
    instant.format("%a, %b %-d %Y").to_string()
}

/// Delay until the next whole-second boundary after `now_ms`.
///
/// Always in `1..=1000` ms; exactly on a boundary waits a full period.
pub fn next_tick_delay(now_ms: i64) -> Duration {
    let elapsed = now_ms.rem_euclid(INTERACTIVE_UPDATE_RATE_MS);
    Duration::from_millis((INTERACTIVE_UPDATE_RATE_MS - elapsed) as u64)
}

/// Parse a fixed-offset zone identifier.
///
/// Accepts `UTC`, `GMT`, `Z`, `Etc/UTC`, ISO offsets (`+05:30`, `-0800`, `+9`)
/// and the same offsets prefixed with `UTC` or `GMT`. Returns `None` for named
/// zones and anything malformed.
pub fn parse_offset(zone_id: &str) -> Option<FixedOffset> {
    let id = zone_id.trim();
    let upper = id.to_ascii_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z" | "ETC/UTC" | "ETC/GMT") {
        return FixedOffset::east_opt(0);
    }

    let rest = if upper.starts_with("UTC") || upper.starts_with("GMT") {
        &id[3..]
    } else {
        id
    };

    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes): (i32, i32) = match digits.split_once(':') {
        Some((h, m)) => (h.parse().ok()?, m.parse().ok()?),
        None if digits.len() == 4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        None => (digits.parse().ok()?, 0),
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Offset of the system's local zone at `at`.
fn local_offset(at: &DateTime<Utc>) -> FixedOffset {
    Local.offset_from_utc_datetime(&at.naive_utc()).fix()
}

/// The zone the face displays time in.
///
/// Resynced whenever the face becomes visible and on every timezone broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallTime {
    zone_id: String,
    /// `None` follows the system local offset, including DST changes
    offset: Option<FixedOffset>,
}

impl Default for WallTime {
    fn default() -> Self {
        Self::new(LOCAL_ZONE)
    }
}

impl WallTime {
    pub fn new(zone_id: &str) -> Self {
        let offset = parse_offset(zone_id);
        if offset.is_none() && zone_id != LOCAL_ZONE {
            log::debug!("zone `{zone_id}` is not a fixed offset, following system local time");
        }
        Self {
            zone_id: zone_id.to_string(),
            offset,
        }
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Convert `instant` to the displayed zone.
    pub fn localize(&self, instant: &DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = self.offset.unwrap_or_else(|| local_offset(instant));
        instant.with_timezone(&offset)
    }
}
