//! Store Configuration

use decimal_percentage::Percentage;
use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::orders::CheckoutContext;

/// Store-wide checkout settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Currency every price, fee and total is expressed in
    pub currency: &'static Currency,

    /// Tax rate applied to storefront checkouts
    pub storefront_tax_rate: Percentage,

    /// Tax rate applied to manually entered orders
    pub manual_tax_rate: Percentage,

    /// Shipping fee used for manual orders when none is given
    pub manual_shipping_fee: Money<'static, Currency>,
}

impl StoreConfig {
    /// Tax rate for a checkout context.
    pub fn tax_rate(&self, context: CheckoutContext) -> Percentage {
        match context {
            CheckoutContext::Storefront => self.storefront_tax_rate,
            CheckoutContext::Manual => self.manual_tax_rate,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: iso::USD,
            storefront_tax_rate: Percentage::from(0.08),
            manual_tax_rate: Percentage::from(0.0),
            manual_shipping_fee: Money::from_minor(10_000, iso::USD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rates_per_context() {
        let config = StoreConfig::default();

        assert_eq!(
            config.tax_rate(CheckoutContext::Storefront),
            Percentage::from(0.08)
        );
        assert_eq!(config.tax_rate(CheckoutContext::Manual), Percentage::from(0.0));
        assert_eq!(config.manual_shipping_fee.to_minor_units(), 10_000);
    }
}
