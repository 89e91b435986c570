// Max-age parsing
// Accepts plain milliseconds or duration strings such as "1d", "2 hours", "500ms"

use crate::error::OptionsError;
use std::time::Duration;

/// Upper bound for `max-age` (one year)
pub const MAX_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = SECOND_MS * 60.0;
const HOUR_MS: f64 = MINUTE_MS * 60.0;
const DAY_MS: f64 = HOUR_MS * 24.0;
const WEEK_MS: f64 = DAY_MS * 7.0;
const YEAR_MS: f64 = DAY_MS * 365.25;

/// Clamp a duration to `[0, 365 days]`.
pub fn clamp_max_age(value: Duration) -> Duration {
    value.min(MAX_MAX_AGE)
}

/// Convert a millisecond count to a clamped duration.
///
/// Negative and NaN values become zero; infinity becomes the one-year cap.
pub fn max_age_from_millis(millis: f64) -> Duration {
    if millis.is_nan() || millis <= 0.0 {
        return Duration::ZERO;
    }
    if millis >= MAX_MAX_AGE.as_secs_f64() * SECOND_MS {
        return MAX_MAX_AGE;
    }
    Duration::from_secs_f64(millis / SECOND_MS)
}

/// Parse a max-age string.
///
/// # Examples
/// ```
/// use serve_static::config::duration::parse_max_age;
/// use std::time::Duration;
///
/// assert_eq!(parse_max_age("1d").unwrap(), Duration::from_secs(86_400));
/// assert_eq!(parse_max_age("1500").unwrap(), Duration::from_millis(1500));
/// ```
pub fn parse_max_age(value: &str) -> Result<Duration, OptionsError> {
    let trimmed = value.trim();
    let invalid = || OptionsError::InvalidMaxAge(value.to_string());

    if trimmed.eq_ignore_ascii_case("infinity") {
        return Ok(MAX_MAX_AGE);
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number: f64 = number.parse().map_err(|_| invalid())?;

    let scale = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND_MS,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE_MS,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR_MS,
        "d" | "day" | "days" => DAY_MS,
        "w" | "week" | "weeks" => WEEK_MS,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR_MS,
        _ => return Err(invalid()),
    };

    Ok(max_age_from_millis(number * scale))
}
