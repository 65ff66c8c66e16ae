//! CLI output formatting.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use num_bigint::BigUint;
use serde::Serialize;

use labseq_core::engine::EvaluationResult;

/// Values longer than this many digits are elided unless verbose.
const ELIDE_ABOVE_DIGITS: usize = 100;
/// Digits kept on each side of an elided value.
const ELIDED_EDGE: usize = 50;

/// Decimal rendering of `value`; long values keep only their edges unless `verbose`.
#[must_use]
pub fn format_result(value: &BigUint, verbose: bool) -> String {
    let digits = value.to_string();
    let len = digits.len();
    if verbose || len <= ELIDE_ABOVE_DIGITS {
        return digits;
    }
    format!(
        "{}...{} ({len} digits)",
        &digits[..ELIDED_EDGE],
        &digits[len - ELIDED_EDGE..]
    )
}

/// Human duration: µs, ms, s, or `XmY.Ys` past one minute.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_duration(d: Duration) -> String {
    match d.as_micros() {
        0..=999 => format!("{:.2}µs", d.as_nanos() as f64 / 1_000.0),
        1_000..=999_999 => format!("{:.2}ms", d.as_secs_f64() * 1_000.0),
        _ if d.as_secs() < 60 => format!("{:.3}s", d.as_secs_f64()),
        _ => {
            let mins = d.as_secs() / 60;
            let rest = d.as_secs_f64() - (mins * 60) as f64;
            format!("{mins}m{rest:.1}s")
        }
    }
}

/// `1234567` -> `1,234,567`.
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && i % 3 == head {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Body returned for a rejected request.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

/// `{"n": .., "result": "..", "strategy": ..}` for a successful evaluation.
pub fn format_json_result(result: &EvaluationResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

/// `{"message": ".."}` for a failed evaluation.
#[must_use]
pub fn format_json_error(message: &str) -> String {
    serde_json::to_string(&ErrorBody { message })
        .unwrap_or_else(|_| String::from(r#"{"message":"internal error"}"#))
}

/// Write the decimal value to a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &Path, value: &BigUint) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{value}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labseq_core::selector::Strategy;

    #[test]
    fn format_duration_units() {
        assert!(format_duration(Duration::from_nanos(500)).contains("µs"));
        assert!(format_duration(Duration::from_millis(42)).contains("ms"));
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.500s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }

    #[test]
    fn format_number_groups() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(182_376_579), "182,376,579");
        assert_eq!(format_number(1_000_000), "1,000,000");
    }

    #[test]
    fn format_result_short() {
        assert_eq!(format_result(&BigUint::from(182_376_579u64), false), "182376579");
    }

    #[test]
    fn format_result_truncates_long_values() {
        let value = BigUint::parse_bytes("7".repeat(150).as_bytes(), 10).unwrap();
        let short = format_result(&value, false);
        assert!(short.ends_with("(150 digits)"));
        assert_eq!(format_result(&value, true).len(), 150);
    }

    #[test]
    fn json_result_body() {
        let result = EvaluationResult {
            index: 10,
            value: BigUint::from(3u32),
            strategy: Strategy::Sequential,
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_json_result(&result).unwrap()).unwrap();
        assert_eq!(json["n"], 10);
        assert_eq!(json["result"], "3");
        assert_eq!(json["strategy"], "sequential");
    }

    #[test]
    fn json_error_body() {
        let body = format_json_error("invalid input: n must be non-negative, got -1");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json["message"],
            "invalid input: n must be non-negative, got -1"
        );
    }

    #[test]
    fn write_value_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labseq.txt");
        write_to_file(&path, &BigUint::from(8505u32)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "8505\n");
    }
}
