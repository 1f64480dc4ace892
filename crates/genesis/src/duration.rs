// Path: crates/genesis/src/duration.rs
//! Parsing of `1h30m`-style duration strings.
//!
//! Values are accumulated in whole nanoseconds so that a duration such as
//! `1500ms` survives parsing intact and can be rejected later for not being a
//! whole number of seconds.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parses a sequence of decimal numbers, each with an optional fraction and
/// a mandatory unit (`ns`, `us`, `ms`, `s`, `m`, `h`), e.g. `"2s"`, `"144h"`,
/// `"1h30m"` or `"1.5s"`. A bare `"0"` is accepted. Negative values are not.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let mut rest = s.strip_prefix('+').unwrap_or(s);
    if rest.starts_with('-') {
        return Err("negative durations are not allowed".to_string());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (int_part, after) = split_digits(rest);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("expected a number at {after:?}"));
        }

        let unit_end = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_end);
        if unit.is_empty() {
            return Err("missing unit".to_string());
        }
        let scale = unit_scale(unit).ok_or_else(|| format!("unknown unit {unit:?}"))?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| "number out of range".to_string())?
        };
        let mut value = whole
            .checked_mul(scale)
            .ok_or_else(|| "duration out of range".to_string())?;

        // Fractional digits below the unit's resolution are truncated.
        let mut digit_scale = scale;
        for digit in frac_part.bytes() {
            digit_scale /= 10;
            if digit_scale == 0 {
                break;
            }
            value += u128::from(digit - b'0') * digit_scale;
        }

        total = total
            .checked_add(value)
            .ok_or_else(|| "duration out of range".to_string())?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| "duration out of range".to_string())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("144h").unwrap(), Duration::from_secs(518_400));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("3us").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5_400));
        assert_eq!(parse_duration("1m0.5s").unwrap(), Duration::from_millis(60_500));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1_500));
        assert_eq!(parse_duration(".5h").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_duration("1.0000000009s").unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_sub_second_precision_is_kept() {
        let d = parse_duration("1500ms").unwrap();
        assert_eq!(d.as_secs(), 1);
        assert_eq!(d.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "5", "s", "-2s", "2x", "1..5s", "2s3"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
