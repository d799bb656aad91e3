//! Tax
//!
//! Percentage-of-amount arithmetic in minor units.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors specific to tax calculations.
#[derive(Debug, Error, PartialEq)]
pub enum TaxError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Calculate `percent` of an amount given in minor units, rounded to the
/// nearest minor unit with halves rounded away from zero.
///
/// # Errors
///
/// Returns [`TaxError::PercentConversion`] if the calculation overflows or cannot
/// be represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, TaxError> {
    let minor = Decimal::from_i64(minor).ok_or(TaxError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(TaxError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(TaxError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn eight_percent_of_three_hundred() -> TestResult {
        let percent = Percentage::from(0.08);

        assert_eq!(percent_of_minor(&percent, 30_000)?, 2_400);

        Ok(())
    }

    #[test]
    fn zero_percent_is_zero() -> TestResult {
        assert_eq!(percent_of_minor(&Percentage::from(0.0), 50_000)?, 0);

        Ok(())
    }

    #[test]
    fn halves_round_away_from_zero() -> TestResult {
        let percent = Percentage::from(0.05);

        // 5% of 1.30 is 0.065
        assert_eq!(percent_of_minor(&percent, 130)?, 7);

        Ok(())
    }

    #[test]
    fn overflow_returns_error() {
        let percent = Percentage::from(2.0);

        assert_eq!(
            percent_of_minor(&percent, i64::MAX),
            Err(TaxError::PercentConversion)
        );
    }
}
