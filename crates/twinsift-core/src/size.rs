//! Human-readable byte counts.

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count using binary (1024) units.
///
/// The value is rounded half-to-even to two decimals and always carries at
/// least one decimal digit, so `1024` renders as `"1.0 KB"`. Zero is the
/// special case `"0B"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut exponent = 0usize;
    let mut divisor = 1u128;
    while exponent + 1 < UNITS.len() && divisor * 1024 <= u128::from(bytes) {
        divisor *= 1024;
        exponent += 1;
    }

    let value = bytes as f64 / divisor as f64;
    // Exact halves go to the even neighbour: 1.125 KB prints as 1.12 KB.
    let rounded = (value * 100.0).round_ties_even() / 100.0;

    // Debug formatting of f64 is the shortest round-trip form and keeps ".0".
    format!("{rounded:?} {}", UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_has_no_space() {
        assert_eq!(format_size(0), "0B");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_size(1), "1.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_two_decimal_rounding() {
        assert_eq!(format_size(1_000_000), "976.56 KB");
        assert_eq!(format_size(1_052_770), "1.0 MB");
    }

    #[test]
    fn test_halves_round_to_even() {
        assert_eq!(format_size(1152), "1.12 KB");
        assert_eq!(format_size(1408), "1.38 KB");
        assert_eq!(format_size(1664), "1.62 KB");
        assert_eq!(format_size(1920), "1.88 KB");
    }

    #[test]
    fn test_largest_values() {
        assert_eq!(format_size(1u64 << 60), "1.0 EB");
        assert_eq!(format_size(u64::MAX), "16.0 EB");
    }
}
