//! Cart Lines

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::{PricingError, line_total, resolve_unit_price, resolve_weight},
    products::{Product, ProductId, Variation, VariationId},
};

/// One row in the cart, keyed by product and optional variation.
///
/// Holds snapshots of the product and variation taken when the line was
/// first added, so later catalog edits do not reprice it.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: Product<'a>,
    variation: Option<Variation<'a>>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    pub(crate) fn new(product: Product<'a>, variation: Option<Variation<'a>>) -> Self {
        Self {
            product,
            variation,
            quantity: 1,
        }
    }

    /// Whether this line is the one identified by `product_id` and `variation_id`.
    ///
    /// A line without a variation never matches a request for a variation,
    /// and vice versa.
    pub fn matches(&self, product_id: &ProductId, variation_id: Option<&VariationId>) -> bool {
        if &self.product.id != product_id {
            return false;
        }

        match (variation_id, &self.variation) {
            (None, None) => true,
            (Some(requested), Some(variation)) => &variation.id == requested,
            _ => false,
        }
    }

    /// Product snapshot
    pub fn product(&self) -> &Product<'a> {
        &self.product
    }

    /// Selected variation snapshot
    pub fn variation(&self) -> Option<&Variation<'a>> {
        self.variation.as_ref()
    }

    /// Product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Selected variation identifier
    pub fn variation_id(&self) -> Option<&VariationId> {
        self.variation.as_ref().map(|variation| &variation.id)
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Effective unit price of this line.
    pub fn unit_price(&self) -> Money<'a, Currency> {
        resolve_unit_price(&self.product, self.variation.as_ref())
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, PricingError> {
        line_total(self.unit_price(), self.quantity)
    }

    /// Effective unit weight in kilograms.
    pub fn unit_weight(&self) -> Decimal {
        resolve_weight(&self.product, self.variation.as_ref())
    }

    /// Unit weight multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::WeightOverflow`] if the product does not fit in a decimal.
    pub fn weight(&self) -> Result<Decimal, PricingError> {
        let unit_weight = self.unit_weight();

        unit_weight
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(PricingError::WeightOverflow(unit_weight, self.quantity))
    }

    /// Model number of the selected variation, falling back to the product's.
    pub fn model_number(&self) -> Option<&str> {
        self.variation
            .as_ref()
            .and_then(|variation| variation.model_number.as_deref())
            .or(self.product.model_number.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    fn lamp() -> Product<'static> {
        let mut product = Product::new("lamp", "Floor Lamp", Money::from_minor(4_000, USD))
            .with_weight(Decimal::new(35, 1))
            .with_variation(
                Variation::new("brass", "Finish", "Brass")
                    .with_price(Money::from_minor(5_000, USD))
                    .with_model_number("FL-2-B"),
            );
        product.model_number = Some("FL-2".to_string());
        product
    }

    #[test]
    fn matches_requires_same_product() {
        let line = CartLine::new(lamp(), None);

        assert!(line.matches(&"lamp".into(), None));
        assert!(!line.matches(&"sofa".into(), None));
    }

    #[test]
    fn absence_only_matches_absence() {
        let product = lamp();
        let brass = product.variation(&"brass".into()).cloned();

        let plain = CartLine::new(product.clone(), None);
        let varied = CartLine::new(product, brass);

        assert!(!plain.matches(&"lamp".into(), Some(&"brass".into())));
        assert!(!varied.matches(&"lamp".into(), None));
        assert!(varied.matches(&"lamp".into(), Some(&"brass".into())));
        assert!(!varied.matches(&"lamp".into(), Some(&"chrome".into())));
    }

    #[test]
    fn totals_and_weights_scale_with_quantity() -> TestResult {
        let mut line = CartLine::new(lamp(), None);
        line.set_quantity(3);

        assert_eq!(line.unit_price(), Money::from_minor(4_000, USD));
        assert_eq!(line.total()?, Money::from_minor(12_000, USD));
        assert_eq!(line.weight()?, Decimal::new(105, 1));

        Ok(())
    }

    #[test]
    fn model_number_prefers_variation() {
        let product = lamp();
        let brass = product.variation(&"brass".into()).cloned();

        assert_eq!(CartLine::new(product.clone(), brass).model_number(), Some("FL-2-B"));
        assert_eq!(CartLine::new(product, None).model_number(), Some("FL-2"));
    }
}
