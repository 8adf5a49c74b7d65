// Timestamp formatting helpers

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use wasm_bindgen::prelude::*;

use crate::error::DisplayError;

/// What `formatLocal` prints for a date the browser could not parse:
/// every field of an invalid `Date` reads back as `NaN`.
pub const INVALID_LOCAL: &str = "NaN-NaN-NaN NaN:NaN:NaN";
/// Countdown text for an unparseable target. `NaN < 0` is false, so the
/// browser keeps the `in ` prefix and falls through to seconds.
pub const INVALID_DUE_IN: &str = "in NaNs";

// zone-less date-times are read in the viewer's zone
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

pub fn pad2(n: u32) -> String {
    if n < 10 {
        format!("0{}", n)
    } else {
        n.to_string()
    }
}

/// Parses `s` the way the page's `Date` constructor does.
#[cfg(target_arch = "wasm32")]
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, DisplayError> {
    let millis = js_sys::Date::new(&JsValue::from_str(s)).get_time();
    if millis.is_nan() {
        return Err(DisplayError::InvalidTimestamp(s.to_string()));
    }
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| DisplayError::InvalidTimestamp(s.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, DisplayError> {
    parse_instant_in(s, &Local)
}

/// Parses the ECMAScript date-time shapes plus RFC 2822. Date-only and
/// year-month strings are UTC; date-times without an offset are wall-clock
/// times in `tz`.
pub fn parse_instant_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Utc>, DisplayError> {
    let s = s.trim();
    let invalid = || DisplayError::InvalidTimestamp(s.to_string());

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let iso = normalize_iso(s);
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&iso, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&iso, fmt) {
            return resolve_wall_clock(naive, tz).ok_or_else(invalid);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&iso, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|m| m.and_utc()).ok_or_else(invalid);
    }
    // year-month only, first of the month
    if iso.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", iso), "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|m| m.and_utc()).ok_or_else(invalid);
        }
    }
    Err(invalid())
}

// `T` for a space date/time separator, `+00:00` for a trailing `Z`
fn normalize_iso(s: &str) -> String {
    let mut iso = s.to_string();
    if iso.len() > 11 && iso.as_bytes()[10] == b' ' {
        iso.replace_range(10..11, "T");
    }
    if iso.len() > 10 && (iso.ends_with('Z') || iso.ends_with('z')) {
        iso.pop();
        iso.push_str("+00:00");
    }
    iso
}

// Times skipped by a DST jump resolve one hour later, like the browser does.
fn resolve_wall_clock<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// `YYYY-MM-DD HH:MM:SS` in `tz`, no zone suffix.
pub fn format_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String {
    let d = instant.with_timezone(tz);
    format!(
        "{}-{}-{} {}:{}:{}",
        d.year(),
        pad2(d.month()),
        pad2(d.day()),
        pad2(d.hour()),
        pad2(d.minute()),
        pad2(d.second())
    )
}

/// Renders a timestamp in the viewer's zone. Unparseable input renders as
/// [`INVALID_LOCAL`].
#[wasm_bindgen(js_name = formatLocal)]
pub fn format_local(ts: &str) -> String {
    match parse_instant(ts) {
        Ok(instant) => format_in(&instant, &Local),
        Err(e) => {
            log::debug!("{}", e);
            INVALID_LOCAL.to_string()
        }
    }
}

/// Signed distance from `now` to `target` using the two most significant
/// non-zero units of d/h/m, or seconds when all of those are zero.
/// Future targets are prefixed with `in `; past or equal ones are bare.
pub fn format_due_in(target: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let diff_ms = target.timestamp_millis() - now.timestamp_millis();
    let prefix = if diff_ms > 0 { "in " } else { "" };

    let secs = diff_ms.unsigned_abs() / 1000;
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut parts: Vec<String> = Vec::with_capacity(2);
    for (value, unit) in [(days, 'd'), (hours, 'h'), (minutes, 'm')] {
        if value > 0 && parts.len() < 2 {
            parts.push(format!("{}{}", value, unit));
        }
    }
    if parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    format!("{}{}", prefix, parts.join(" "))
}

#[wasm_bindgen(js_name = formatDueInFromNow)]
pub fn format_due_in_from_now(ts: &str) -> String {
    match parse_instant(ts) {
        Ok(target) => format_due_in(&target, &Utc::now()),
        Err(e) => {
            log::debug!("{}", e);
            INVALID_DUE_IN.to_string()
        }
    }
}
