//! Unit conversion for Kubernetes resource quantities
//!
//! CPU quantities are reported in millicores and memory quantities in bytes.
//! Parsing rounds toward positive infinity, which is how the API server
//! reports `MilliValue()` and `Value()` for fractional amounts.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;
use tracing::warn;

/// Binary unit suffixes used by [`bytes_human`]
const BYTE_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Largest number of significant digits accepted in a quantity mantissa
const MAX_MANTISSA_DIGITS: usize = 30;

/// Errors raised while parsing a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unknown suffix {suffix:?} in quantity {input:?}")]
    UnknownSuffix { input: String, suffix: String },
    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// Multiplier encoded by a quantity suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    /// Power of 1024 (`Ki`, `Mi`, ...)
    Binary(u32),
    /// Power of 10 (`m`, `k`, `M`, `e3`, ...)
    Decimal(i32),
}

fn parse_suffix(input: &str, suffix: &str) -> Result<Suffix, QuantityError> {
    let parsed = match suffix {
        "" => Suffix::Decimal(0),
        "Ki" => Suffix::Binary(1),
        "Mi" => Suffix::Binary(2),
        "Gi" => Suffix::Binary(3),
        "Ti" => Suffix::Binary(4),
        "Pi" => Suffix::Binary(5),
        "Ei" => Suffix::Binary(6),
        "n" => Suffix::Decimal(-9),
        "u" => Suffix::Decimal(-6),
        "m" => Suffix::Decimal(-3),
        "k" => Suffix::Decimal(3),
        "M" => Suffix::Decimal(6),
        "G" => Suffix::Decimal(9),
        "T" => Suffix::Decimal(12),
        "P" => Suffix::Decimal(15),
        "E" => Suffix::Decimal(18),
        other => {
            let exponent = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))
                .and_then(|e| e.parse::<i32>().ok())
                .ok_or_else(|| QuantityError::UnknownSuffix {
                    input: input.to_string(),
                    suffix: other.to_string(),
                })?;
            Suffix::Decimal(exponent)
        }
    };
    Ok(parsed)
}

/// Parse a quantity string and return `ceil(value * 10^scale)`.
///
/// `scale = 3` yields millis, `scale = 0` yields whole units.
pub fn parse_scaled(input: &str, scale: i32) -> Result<i128, QuantityError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let number_end = unsigned
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(unsigned.len());
    let (number, suffix) = unsigned.split_at(number_end);

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return Err(QuantityError::InvalidNumber(input.to_string()));
    }

    let digits = format!("{whole}{fraction}");
    let significant = digits.trim_start_matches('0');
    if significant.len() > MAX_MANTISSA_DIGITS {
        return Err(QuantityError::OutOfRange(input.to_string()));
    }
    let mantissa: i128 = if significant.is_empty() {
        0
    } else {
        significant
            .parse()
            .map_err(|_| QuantityError::InvalidNumber(input.to_string()))?
    };

    let (binary_power, decimal_exponent) = match parse_suffix(input, suffix)? {
        Suffix::Binary(power) => (power, 0),
        Suffix::Decimal(exponent) => (0, exponent),
    };

    let out_of_range = || QuantityError::OutOfRange(input.to_string());
    let scaled_mantissa = mantissa
        .checked_mul(1024i128.pow(binary_power))
        .ok_or_else(out_of_range)?;
    let exponent = i32::try_from(fraction.len())
        .ok()
        .and_then(|places| decimal_exponent.checked_add(scale)?.checked_sub(places))
        .ok_or_else(out_of_range)?;

    let magnitude = if exponent >= 0 {
        10i128
            .checked_pow(exponent as u32)
            .and_then(|factor| scaled_mantissa.checked_mul(factor))
            .ok_or_else(out_of_range)?
    } else {
        match 10i128.checked_pow(exponent.unsigned_abs()) {
            Some(divisor) if negative => scaled_mantissa / divisor,
            Some(divisor) => div_ceil(scaled_mantissa, divisor),
            // Anything smaller than 10^-38 of the unit rounds up to one step
            None if negative || scaled_mantissa == 0 => 0,
            None => 1,
        }
    };

    Ok(if negative { -magnitude } else { magnitude })
}

fn div_ceil(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}

fn to_unsigned(quantity: Option<&Quantity>, scale: i32, kind: &str) -> u64 {
    let Some(quantity) = quantity else {
        return 0;
    };
    match parse_scaled(&quantity.0, scale) {
        Ok(value) => u64::try_from(value.max(0)).unwrap_or(u64::MAX),
        Err(error) => {
            warn!(kind, input = %quantity.0, %error, "Ignoring malformed quantity");
            0
        }
    }
}

/// CPU quantity in millicores; absent or malformed quantities count as 0
pub fn cpu_millis(quantity: Option<&Quantity>) -> u64 {
    to_unsigned(quantity, 3, "cpu")
}

/// Memory quantity in bytes; absent or malformed quantities count as 0
pub fn memory_bytes(quantity: Option<&Quantity>) -> u64 {
    to_unsigned(quantity, 0, "memory")
}

/// Format millicores the way the report tables show them
pub fn format_millis(millis: u64) -> String {
    format!("{} m", millis)
}

/// Format bytes with the largest binary unit keeping the value in `[1, 1024)`
pub fn bytes_human(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // 1023.999 would print as 1024.00 in the current unit
    if (value * 100.0).round() >= 102_400.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2}{}", value, BYTE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: u64 = 1024 * 1024 * 1024;

    fn qty(s: &str) -> Quantity {
        Quantity(s.to_string())
    }

    /// Parse a `bytes_human` string back to (mantissa, unit index)
    fn parse_human(s: &str) -> (f64, usize) {
        let split = s.find(|c: char| c.is_ascii_alphabetic()).unwrap();
        let (number, unit) = s.split_at(split);
        let index = BYTE_UNITS.iter().position(|u| *u == unit).unwrap();
        (number.parse().unwrap(), index)
    }

    #[test]
    fn test_cpu_millis_suffixes() {
        assert_eq!(cpu_millis(Some(&qty("100m"))), 100);
        assert_eq!(cpu_millis(Some(&qty("1"))), 1000);
        assert_eq!(cpu_millis(Some(&qty("0.5"))), 500);
        assert_eq!(cpu_millis(Some(&qty("2.25"))), 2250);
        assert_eq!(cpu_millis(Some(&qty("8"))), 8000);
        assert_eq!(cpu_millis(Some(&qty("7820m"))), 7820);
    }

    #[test]
    fn test_cpu_millis_rounds_up_sub_milli_usage() {
        // metrics-server reports usage in nanocores
        assert_eq!(cpu_millis(Some(&qty("5123456n"))), 6);
        assert_eq!(cpu_millis(Some(&qty("6000000n"))), 6);
        assert_eq!(cpu_millis(Some(&qty("250u"))), 1);
        assert_eq!(cpu_millis(Some(&qty("0"))), 0);
    }

    #[test]
    fn test_absent_or_malformed_is_zero() {
        assert_eq!(cpu_millis(None), 0);
        assert_eq!(memory_bytes(None), 0);
        assert_eq!(cpu_millis(Some(&qty("lots"))), 0);
        assert_eq!(memory_bytes(Some(&qty("12Qi"))), 0);
        assert_eq!(memory_bytes(Some(&qty("-5Mi"))), 0);
    }

    #[test]
    fn test_memory_bytes_suffixes() {
        assert_eq!(memory_bytes(Some(&qty("64Mi"))), 64 * 1024 * 1024);
        assert_eq!(memory_bytes(Some(&qty("1Gi"))), GIB);
        assert_eq!(memory_bytes(Some(&qty("1.5Gi"))), 3 * GIB / 2);
        assert_eq!(memory_bytes(Some(&qty("36601Ki"))), 36601 * 1024);
        assert_eq!(memory_bytes(Some(&qty("129M"))), 129_000_000);
        assert_eq!(memory_bytes(Some(&qty("1e3"))), 1000);
        assert_eq!(memory_bytes(Some(&qty("37480000"))), 37_480_000);
    }

    #[test]
    fn test_parse_scaled_errors() {
        assert_eq!(parse_scaled("", 0), Err(QuantityError::Empty));
        assert!(matches!(
            parse_scaled(".", 0),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_scaled("1.2.3", 0),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_scaled("10Xi", 0),
            Err(QuantityError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            parse_scaled("1e400", 0),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_scaled_extreme_exponents() {
        assert!(matches!(
            parse_scaled("1e2147483647", 3),
            Err(QuantityError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_scaled("1.5e-2147483648", 0),
            Err(QuantityError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_scaled("1E2147483647", 0),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_scaled_negative_and_exponent() {
        assert_eq!(parse_scaled("-100m", 3), Ok(-100));
        assert_eq!(parse_scaled("+2", 3), Ok(2000));
        assert_eq!(parse_scaled("12E-1", 3), Ok(1200));
        assert_eq!(parse_scaled("1e-50", 3), Ok(1));
    }

    #[test]
    fn test_bytes_human_scenarios() {
        assert_eq!(bytes_human(0), "0B");
        assert_eq!(bytes_human(1023), "1023B");
        assert_eq!(bytes_human(1024), "1.00KiB");
        assert_eq!(bytes_human(32 * GIB), "32.00GiB");
        assert_eq!(bytes_human(29 * GIB), "29.00GiB");
        assert_eq!(bytes_human(64 * 1024 * 1024), "64.00MiB");
        assert_eq!(bytes_human(37_480_000), "35.74MiB");
        assert_eq!(bytes_human(u64::MAX), "16.00EiB");
    }

    #[test]
    fn test_bytes_human_never_prints_1024_mantissa() {
        assert_eq!(bytes_human(1024 * 1024 - 1), "1.00MiB");
        assert_eq!(bytes_human(GIB - 1), "1.00GiB");
    }

    #[test]
    fn test_bytes_human_unit_and_precision() {
        let samples = [
            1024u64,
            1500,
            999_999,
            37_480_000,
            5 * GIB + 123_456,
            1023 * GIB,
            7 * GIB * 1024 * 1024,
        ];
        for bytes in samples {
            let (mantissa, unit) = parse_human(&bytes_human(bytes));
            assert!((1.0..1024.0).contains(&mantissa), "{bytes} -> {mantissa}");
            let exact = bytes as f64 / 1024f64.powi(unit as i32);
            assert!((mantissa - exact).abs() <= 0.01, "{bytes}: {mantissa} vs {exact}");
        }
    }

    #[test]
    fn test_bytes_human_is_monotonic() {
        let mut previous = 0.0;
        let mut bytes = 1u64;
        while bytes < u64::MAX / 3 {
            let (mantissa, unit) = parse_human(&bytes_human(bytes));
            let value = mantissa * 1024f64.powi(unit as i32);
            assert!(value >= previous, "bytes_human({bytes}) went backwards");
            previous = value;
            bytes = bytes * 3 / 2 + 1;
        }
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(38), "38 m");
        assert_eq!(format_millis(0), "0 m");
    }
}
