//! Prices
//!
//! Unit price and unit weight resolution for a product with an optional
//! selected variation.

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::trace;

use crate::products::{Product, Variation};

/// Errors that can occur while totalling prices.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Multiplying a price by a quantity overflowed the minor unit range.
    #[error("price {0} minor units × {1} overflows")]
    Overflow(i64, u32),

    /// Multiplying a unit weight by a quantity overflowed.
    #[error("weight {0}kg × {1} overflows")]
    WeightOverflow(Decimal, u32),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Effective unit price of a product, with an optional selected variation.
///
/// Precedence:
///
/// 1. variation sale price, while the product is on sale
/// 2. variation price
/// 3. product sale price, while the product is on sale
/// 4. product base price
pub fn resolve_unit_price<'a>(
    product: &Product<'a>,
    variation: Option<&Variation<'a>>,
) -> Money<'a, Currency> {
    let price = match variation {
        Some(Variation {
            sale_price: Some(sale),
            ..
        }) if product.on_sale => *sale,
        Some(Variation {
            price: Some(price), ..
        }) => *price,
        _ => match product.sale_price {
            Some(sale) if product.on_sale => sale,
            _ => product.price,
        },
    };

    trace!(product = %product.id, %price, "resolved unit price");

    price
}

/// Effective unit weight in kilograms: variation weight, else product weight, else zero.
pub fn resolve_weight(product: &Product<'_>, variation: Option<&Variation<'_>>) -> Decimal {
    variation
        .and_then(|variation| variation.weight)
        .or(product.weight)
        .unwrap_or(Decimal::ZERO)
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// - [`PricingError::Money`]: the unit price itself does not fit in minor units.
/// - [`PricingError::Overflow`]: the result does not fit in minor units.
pub fn line_total<'a>(
    unit_price: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit_price.try_to_minor_units()?;

    minor
        .checked_mul(i64::from(quantity))
        .map(|total| Money::from_minor(total, unit_price.currency()))
        .ok_or(PricingError::Overflow(minor, quantity))
}
