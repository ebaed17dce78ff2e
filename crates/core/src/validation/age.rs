//! Birthdate checks: ISO shape and the adult-age rule.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

/// Minimum age, in whole years, to open an account.
pub const ADULT_AGE: i32 = 18;

/// Earliest accepted birth year.
pub const MIN_BIRTH_YEAR: i32 = 1900;

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("valid regex")
});

/// Whether the string has the shape of an ISO date or datetime.
///
/// Only the layout is checked; calendar validity is left to [`is_adult`].
pub fn has_iso_date_shape(s: &str) -> bool {
    ISO_DATE_RE.is_match(s)
}

/// Whether a birthdate belongs to someone at least [`ADULT_AGE`] years old
/// at `now`.
///
/// Rejects strings that do not name a real calendar date (including dates a
/// lenient parser would roll over, such as `2000-02-30`), dates after `now`,
/// and years outside `MIN_BIRTH_YEAR..=now.year()`.
pub fn is_adult(date_of_birth: &str, now: DateTime<Utc>) -> bool {
    if date_of_birth.is_empty() {
        return false;
    }

    let Some(instant) = parse_instant(date_of_birth) else {
        return false;
    };
    if instant > now {
        return false;
    }

    let date_part = date_of_birth.split('T').next().unwrap_or_default();
    let Some((year, month, day)) = split_ymd(date_part) else {
        return false;
    };
    if year < MIN_BIRTH_YEAR || year > now.year() {
        return false;
    }
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return false;
    }

    // chrono refuses impossible dates instead of rolling them forward.
    let Some(birth) = NaiveDate::from_ymd_opt(year, month, day) else {
        return false;
    };

    age_on(birth, now.date_naive()) >= ADULT_AGE
}

/// Whole years between `birth` and `today`.
///
/// The year difference is decremented when this year's anniversary has not
/// been reached yet.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Parse a date or datetime into a UTC instant. Date-only strings and
/// datetimes without an offset are read as UTC.
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let Some((date, time)) = s.split_once('T') else {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    };

    let (clock, offset) = match time.find(['Z', '+', '-']) {
        Some(i) => (&time[..i], parse_offset(&time[i..])?),
        None => (time, FixedOffset::east_opt(0)?),
    };
    let local = format!("{date}T{clock}");
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&local, fmt).ok())?;
    let instant = naive.and_local_timezone(offset).single()?;
    Some(instant.with_timezone(&Utc))
}

/// `Z`, `+HH:MM` or `+HHMM`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = s.split_at(1);
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let seconds = (hours * 60 + minutes) * 60;
    match sign {
        "+" => FixedOffset::east_opt(seconds),
        "-" => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

fn split_ymd(s: &str) -> Option<(i32, u32, u32)> {
    let mut parts = s.splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    Some((year, month, day))
}
