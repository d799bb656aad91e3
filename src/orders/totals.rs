//! Order Totals

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    tax::{TaxError, percent_of_minor},
};

/// Errors that can occur while assembling order totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// Cart subtotal could not be calculated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Tax could not be calculated.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Computed totals for a cart at a given destination and tax context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Selected shipping cost
    pub shipping_cost: Money<'a, Currency>,

    /// Tax on the subtotal
    pub tax: Money<'a, Currency>,

    /// Subtotal plus shipping plus tax
    pub total: Money<'a, Currency>,

    /// Rate the tax was computed at
    pub tax_rate: Percentage,
}

impl<'a> OrderTotals<'a> {
    /// Build totals from a subtotal, a shipping cost and a tax rate.
    ///
    /// Tax is charged on the subtotal only.
    ///
    /// # Errors
    ///
    /// - [`TotalsError::Tax`]: the tax amount could not be represented.
    /// - [`TotalsError::Money`]: the amounts are in different currencies, or the
    ///   subtotal does not fit in minor units.
    pub fn from_parts(
        subtotal: Money<'a, Currency>,
        shipping_cost: Money<'a, Currency>,
        tax_rate: Percentage,
    ) -> Result<Self, TotalsError> {
        let tax = Money::from_minor(
            percent_of_minor(&tax_rate, subtotal.try_to_minor_units()?)?,
            subtotal.currency(),
        );

        let total = subtotal.add(shipping_cost)?.add(tax)?;

        Ok(Self {
            subtotal,
            shipping_cost,
            tax,
            total,
            tax_rate,
        })
    }

    /// Currency of every amount
    pub fn currency(&self) -> &'a Currency {
        self.total.currency()
    }
}

/// Combine a cart's subtotal, a shipping cost and a tax rate into order totals.
///
/// The cart is not modified.
///
/// # Errors
///
/// - [`TotalsError::Cart`]: the cart subtotal could not be calculated.
/// - [`TotalsError::Tax`]: the tax amount could not be represented.
/// - [`TotalsError::Money`]: the shipping cost is in another currency than the cart.
pub fn assemble_order<'a>(
    cart: &Cart<'a>,
    shipping_cost: Money<'a, Currency>,
    tax_rate: Percentage,
) -> Result<OrderTotals<'a>, TotalsError> {
    let totals = OrderTotals::from_parts(cart.subtotal()?, shipping_cost, tax_rate)?;

    debug!(
        subtotal = %totals.subtotal,
        shipping = %totals.shipping_cost,
        tax = %totals.tax,
        total = %totals.total,
        "assembled order totals"
    );

    Ok(totals)
}
