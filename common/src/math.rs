/// Integer division rounded to the nearest whole number.
///
/// Ties round up. `divisor` must be non-zero. Works over the full `u64`
/// range.
#[inline]
pub const fn div_round_closest(dividend: u64, divisor: u64) -> u64 {
    dividend / divisor + (dividend % divisor >= divisor - divisor / 2) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest() {
        // 16 MHz / (16 * 115200) = 8.68
        assert_eq!(div_round_closest(16_000_000, 16 * 115_200), 9);
        // 32 MHz / (16 * 115200) = 17.36
        assert_eq!(div_round_closest(32_000_000, 16 * 115_200), 17);
    }

    #[test]
    fn rounds_either_way_off_the_midpoint() {
        // 4 / 3 = 1.33, 5 / 3 = 1.67
        assert_eq!(div_round_closest(4, 3), 1);
        assert_eq!(div_round_closest(5, 3), 2);
        assert_eq!(div_round_closest(7, 1), 7);
    }

    #[test]
    fn full_range_does_not_overflow() {
        assert_eq!(div_round_closest(u64::MAX, 1), u64::MAX);
        assert_eq!(div_round_closest(u64::MAX, 2), 1 << 63);
        assert_eq!(div_round_closest(u64::MAX, u64::MAX), 1);
        assert_eq!(div_round_closest(u64::MAX, 16 * 115_200), 10_007_999_171_934);
    }

    #[test]
    fn ties_round_up() {
        assert_eq!(div_round_closest(5, 2), 3);
        assert_eq!(div_round_closest(7, 2), 4);
    }

    #[test]
    fn exact_division_is_unchanged() {
        assert_eq!(div_round_closest(48_000_000, 16 * 250_000), 12);
    }

    #[test]
    fn is_deterministic() {
        let a = div_round_closest(16_000_000, 16 * 115_200);
        let b = div_round_closest(16_000_000, 16 * 115_200);
        assert_eq!(a, b);
    }
}
