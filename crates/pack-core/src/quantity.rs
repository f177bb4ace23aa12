//! 數量比較（依計量單位捨入精度的容差比較）

use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

use crate::{PackError, Result};

/// 數量精度
///
/// 以捨入單位（例如 0.01）表示。所有包裝計算都透過此結構比較數量，
/// 不直接比較原始數值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    rounding: Decimal,
}

impl Precision {
    /// 由計量單位捨入單位建立精度
    pub fn new(rounding: Decimal) -> Result<Self> {
        if rounding <= Decimal::ZERO {
            return Err(PackError::InvalidPrecision(format!(
                "捨入單位必須大於零，實際為 {}",
                rounding
            )));
        }
        Ok(Self { rounding })
    }

    /// 由小數位數建立精度（例如 2 → 0.01）
    pub fn from_digits(digits: u32) -> Self {
        Self {
            rounding: Decimal::new(1, digits.min(28)),
        }
    }

    /// 捨入單位
    pub fn rounding(&self) -> Decimal {
        self.rounding
    }

    /// 四捨五入（中點遠離零）到捨入單位
    pub fn round_half_up(&self, value: Decimal) -> Decimal {
        // 捨入單位為十的次方時直接取小數位
        let unit = self.rounding.normalize();
        if unit.mantissa() == 1 {
            return value
                .round_dp_with_strategy(unit.scale(), RoundingStrategy::MidpointAwayFromZero);
        }
        value
            .checked_div(self.rounding)
            .map(|steps| steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|steps| steps.checked_mul(self.rounding))
            .unwrap_or(value)
    }

    /// 捨入後是否為零
    pub fn is_zero(&self, value: Decimal) -> bool {
        self.round_half_up(value).is_zero()
    }

    /// 容差比較
    pub fn compare(&self, a: Decimal, b: Decimal) -> Ordering {
        let delta = a - b;
        if self.is_zero(delta) {
            Ordering::Equal
        } else if delta < Decimal::ZERO {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    pub fn is_positive(&self, value: Decimal) -> bool {
        self.compare(value, Decimal::ZERO) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(num: i64, scale: u32) -> Decimal {
        Decimal::new(num, scale)
    }

    #[test]
    fn test_rejects_non_positive_rounding() {
        assert!(Precision::new(Decimal::ZERO).is_err());
        assert!(Precision::new(dec(-1, 2)).is_err());
        assert!(Precision::new(dec(1, 2)).is_ok());
    }

    #[test]
    fn test_from_digits() {
        assert_eq!(Precision::from_digits(2).rounding(), dec(1, 2));
        assert_eq!(Precision::from_digits(0).rounding(), Decimal::ONE);
    }

    #[rstest]
    #[case(dec(1234, 3), dec(123, 2))]
    #[case(dec(1235, 3), dec(124, 2))]
    #[case(dec(-1235, 3), dec(-124, 2))]
    #[case(dec(10, 0), dec(10, 0))]
    fn test_round_half_up(#[case] value: Decimal, #[case] expected: Decimal) {
        let precision = Precision::from_digits(2);
        assert_eq!(precision.round_half_up(value), expected);
    }

    #[rstest]
    #[case(dec(12, 1), dec(10, 1))]
    #[case(dec(13, 1), dec(15, 1))]
    #[case(dec(126, 2), dec(15, 1))]
    fn test_round_half_up_to_non_decimal_unit(#[case] value: Decimal, #[case] expected: Decimal) {
        let precision = Precision::new(dec(5, 1)).unwrap();
        assert_eq!(precision.round_half_up(value), expected);
    }

    #[test]
    fn test_round_half_up_with_tiny_rounding_does_not_overflow() {
        let finest = Precision::from_digits(28);
        assert_eq!(finest.round_half_up(dec(25, 0)), dec(25, 0));
        assert!(finest.is_positive(dec(25, 0)));

        let odd = Precision::new(dec(3, 28)).unwrap();
        assert_eq!(odd.round_half_up(dec(25, 0)), dec(25, 0));
        assert_eq!(odd.compare(dec(25, 0), dec(24, 0)), Ordering::Greater);
    }

    #[rstest]
    #[case(dec(1000, 2), dec(1000, 2), Ordering::Equal)]
    #[case(dec(10004, 3), dec(10, 0), Ordering::Equal)]
    #[case(dec(10005, 3), dec(10, 0), Ordering::Greater)]
    #[case(dec(9996, 3), dec(10, 0), Ordering::Equal)]
    #[case(dec(999, 2), dec(10, 0), Ordering::Less)]
    fn test_compare_with_tolerance(
        #[case] a: Decimal,
        #[case] b: Decimal,
        #[case] expected: Ordering,
    ) {
        let precision = Precision::new(dec(1, 2)).unwrap();
        assert_eq!(precision.compare(a, b), expected);
    }

    #[test]
    fn test_is_zero() {
        let precision = Precision::new(dec(1, 2)).unwrap();
        assert!(precision.is_zero(dec(4, 3)));
        assert!(!precision.is_zero(dec(5, 3)));
        assert!(precision.is_positive(dec(1, 1)));
        assert!(!precision.is_positive(Decimal::ZERO));
    }
}
