//! Time spans for delivery settings.
//!
//! Accepted forms: `500ms`, `30s`, `15m`, `1h`, `1d`, a bare integer
//! (milliseconds), `HH:MM:SS` or `D.HH:MM:SS`.

use crate::error::{Error, Result};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Parse a time span into milliseconds.
pub fn parse_millis(input: &str) -> Result<u64> {
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid(input, "empty value"));
    }
    if s.contains(':') {
        return parse_clock(input, s);
    }

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| invalid(input, "expected a number"))?;
    let factor = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" => 1,
        "s" => MS_PER_SECOND,
        "m" | "min" => MS_PER_MINUTE,
        "h" => MS_PER_HOUR,
        "d" => MS_PER_DAY,
        other => return Err(invalid(input, &format!("unknown unit '{other}'"))),
    };
    value
        .checked_mul(factor)
        .ok_or_else(|| invalid(input, "value too large"))
}

fn parse_clock(input: &str, s: &str) -> Result<u64> {
    let (days, clock) = match s.split_once('.') {
        Some((d, rest)) if !d.contains(':') => (
            d.parse::<u64>().map_err(|_| invalid(input, "bad day count"))?,
            rest,
        ),
        _ => (0, s),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    let [h, m, sec] = parts.as_slice() else {
        return Err(invalid(input, "expected HH:MM:SS"));
    };
    let field = |v: &str, max: u64| -> Result<u64> {
        v.parse::<u64>()
            .ok()
            .filter(|n| *n < max)
            .ok_or_else(|| invalid(input, "clock field out of range"))
    };
    let clock_ms = field(*h, 24)? * MS_PER_HOUR
        + field(*m, 60)? * MS_PER_MINUTE
        + field(*sec, 60)? * MS_PER_SECOND;
    days.checked_mul(MS_PER_DAY)
        .and_then(|ms| ms.checked_add(clock_ms))
        .ok_or_else(|| invalid(input, "value too large"))
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::invalid("time span", format!("'{input}': {reason}"))
}
