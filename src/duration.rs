// duration.rs - Compact Duration Parsing
// Turns strings like "10m", "2h" or "1d" into a number of seconds.
//
// Used by: commands/moderation.rs (mute), commands/remind.rs (remindme)

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static DURATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([A-Za-z])$").expect("duration pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration format: '{0}'")]
    InvalidFormat(String),
    #[error("unknown time unit '{0}'")]
    UnknownUnit(char),
    #[error("duration must be greater than zero")]
    Zero,
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

/// Seconds represented by a single unit character, if it is one we accept.
fn unit_seconds(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

/// Parses a compact duration (`<positive integer><s|m|h|d>`) into seconds.
///
/// Compound forms such as "1h30m" and negative amounts are rejected.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    let trimmed = input.trim();
    let caps = DURATION_PATTERN
        .captures(trimmed)
        .ok_or_else(|| DurationError::InvalidFormat(trimmed.to_string()))?;

    let unit = caps[2].chars().next().unwrap_or_default();
    let multiplier = unit_seconds(unit).ok_or(DurationError::UnknownUnit(unit))?;

    let amount: u64 = caps[1]
        .parse()
        .map_err(|_| DurationError::Overflow(trimmed.to_string()))?;

    let seconds = amount
        .checked_mul(multiplier)
        .ok_or_else(|| DurationError::Overflow(trimmed.to_string()))?;

    if seconds == 0 {
        return Err(DurationError::Zero);
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_each_unit() {
        assert_eq!(parse_duration("30s"), Ok(30));
        assert_eq!(parse_duration("10m"), Ok(600));
        assert_eq!(parse_duration("2h"), Ok(7200));
        assert_eq!(parse_duration("1d"), Ok(86400));
    }

    #[test]
    fn test_unit_is_case_insensitive() {
        assert_eq!(parse_duration("5M"), Ok(300));
        assert_eq!(parse_duration(" 1D "), Ok(86400));
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(parse_duration("0m"), Err(DurationError::Zero));
        assert_eq!(parse_duration("000s"), Err(DurationError::Zero));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(matches!(parse_duration("abc"), Err(DurationError::InvalidFormat(_))));
        assert!(matches!(parse_duration(""), Err(DurationError::InvalidFormat(_))));
        assert!(matches!(parse_duration("m"), Err(DurationError::InvalidFormat(_))));
        assert!(matches!(parse_duration("-5m"), Err(DurationError::InvalidFormat(_))));
        assert!(matches!(parse_duration("1h30m"), Err(DurationError::InvalidFormat(_))));
    }

    #[test]
    fn test_rejects_unknown_unit() {
        assert_eq!(parse_duration("10x"), Err(DurationError::UnknownUnit('x')));
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999d"),
            Err(DurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration("999999999999999999d"),
            Err(DurationError::Overflow(_))
        ));
    }
}
