use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── LocalClock ────────────────────────────────────────────────────────────────

/// Projects UTC instants onto the wall clock of one timezone.
///
/// Day grouping and the hour-of-day histogram are computed in this zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    tz: Tz,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self { tz: Tz::UTC }
    }
}

impl LocalClock {
    /// Create a clock for an IANA timezone name.
    ///
    /// `"auto"` resolves to the system timezone. Unrecognised names fall back
    /// to UTC and log a warning.
    pub fn new(tz_name: &str) -> Self {
        let resolved = if tz_name.eq_ignore_ascii_case("auto") {
            get_system_timezone()
        } else {
            tz_name.to_string()
        };
        let tz = resolved.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "LocalClock: unrecognised timezone \"{}\", falling back to UTC",
                resolved
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Calendar date of `dt` on this clock.
    pub fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }

    /// Hour of day (0–23) of `dt` on this clock.
    pub fn local_hour(&self, dt: DateTime<Utc>) -> u32 {
        dt.with_timezone(&self.tz).hour()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

// ── 12-hour / 24-hour format detection ───────────────────────────────────────

/// Country codes whose users conventionally read a 12-hour clock.
const TWELVE_HOUR_COUNTRIES: &[&str] = &[
    "US", "CA", "AU", "NZ", "PH", "IN", "EG", "SA", "PK", "BD", "MY", "MX", "CO",
];

/// Decide whether hour labels should use the 12-hour clock.
///
/// Priority:
/// 1. `explicit` `"12h"` → `true`, `"24h"` → `false`.
/// 2. Country derived from `timezone` (e.g. `"America/New_York"` → `"US"`).
/// 3. System timezone.
pub fn detect_time_format(timezone: Option<&str>, explicit: Option<&str>) -> bool {
    if let Some(fmt) = explicit {
        match fmt.to_lowercase().as_str() {
            "12h" => return true,
            "24h" => return false,
            _ => {}
        }
    }

    let tz_to_check = timezone
        .map(|s| s.to_string())
        .unwrap_or_else(get_system_timezone);

    country_from_timezone(&tz_to_check)
        .map(|country| TWELVE_HOUR_COUNTRIES.contains(&country))
        .unwrap_or(false)
}

/// Heuristic: derive a 2-letter country code from an IANA timezone name.
fn country_from_timezone(tz: &str) -> Option<&'static str> {
    let lower = tz.to_lowercase();

    const CA_CITIES: &[&str] = &[
        "toronto",
        "vancouver",
        "montreal",
        "edmonton",
        "winnipeg",
        "halifax",
        "regina",
        "st_johns",
    ];
    const EXACT: &[(&str, &str)] = &[
        ("america/mexico_city", "MX"),
        ("america/bogota", "CO"),
        ("pacific/auckland", "NZ"),
        ("asia/manila", "PH"),
        ("asia/kolkata", "IN"),
        ("asia/calcutta", "IN"),
        ("asia/karachi", "PK"),
        ("asia/dhaka", "BD"),
        ("asia/kuala_lumpur", "MY"),
        ("africa/cairo", "EG"),
        ("asia/riyadh", "SA"),
    ];

    if let Some(&(_, code)) = EXACT.iter().find(|(name, _)| lower == *name) {
        return Some(code);
    }
    if let Some(city) = lower.strip_prefix("america/") {
        if CA_CITIES.contains(&city) {
            return Some("CA");
        }
        return Some("US");
    }
    if lower.starts_with("australia/") {
        return Some("AU");
    }
    None
}

// ── format_hour_label ─────────────────────────────────────────────────────────

/// Label for an hour-of-day bucket.
///
/// * 12-hour: `0 → "12 AM"`, `13 → "1 PM"`.
/// * 24-hour: `0 → "00:00"`, `13 → "13:00"`.
pub fn format_hour_label(hour: u32, twelve_hour: bool) -> String {
    if !twelve_hour {
        return format!("{:02}:00", hour);
    }
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{} {}", display, suffix)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
