//! Human-readable durations such as `30s`, `1m30s`, `500ms` or `1.5h`.

use std::time::Duration;

/// A duration string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration '{input}': {reason}")]
pub struct DurationError {
    pub input: String,
    pub reason: String,
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" => Some(1e3),
        "ms" => Some(1e6),
        "s" => Some(1e9),
        "m" => Some(60e9),
        "h" => Some(3600e9),
        _ => None,
    }
}

/// Parse a sequence of `<number><unit>` terms.
///
/// Units are `ns`, `us`, `ms`, `s`, `m` and `h`; numbers may carry a
/// fractional part. A bare `0` is accepted, any other number needs a unit.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let fail = |reason: &str| DurationError {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let text = input.trim();
    if text.is_empty() {
        return Err(fail("empty value"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| fail("missing unit"))?;
        if number_end == 0 {
            return Err(fail("expected a number"));
        }
        let value: f64 = rest[..number_end]
            .parse()
            .map_err(|_| fail("malformed number"))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_nanos(&rest[..unit_end])
            .ok_or_else(|| fail(&format!("unknown unit '{}'", &rest[..unit_end])))?;
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(fail("out of range"));
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Duration::ZERO)]
    #[case("1m", Duration::from_secs(60))]
    #[case("30s", Duration::from_secs(30))]
    #[case("1m30s", Duration::from_secs(90))]
    #[case("500ms", Duration::from_millis(500))]
    #[case("2h", Duration::from_secs(7200))]
    #[case("1.5h", Duration::from_secs(5400))]
    #[case("250us", Duration::from_micros(250))]
    #[case(" 10s ", Duration::from_secs(10))]
    fn parses(#[case] input: &str, #[case] expected: Duration) {
        assert_eq!(parse_duration(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("10")]
    #[case("s")]
    #[case("5 minutes")]
    #[case("1d")]
    #[case("-5s")]
    #[case("1..5s")]
    fn rejects(#[case] input: &str) {
        let err = parse_duration(input).unwrap_err();
        assert_eq!(err.input, input);
    }
}
