//! Cart
//!
//! The shopping cart keeps at most one line per product/variation pair. Every
//! mutation goes through [`Cart::apply`], so the line identity rule lives in
//! exactly one place.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    pricing::PricingError,
    products::{Product, ProductId, VariationId},
};

mod line;
pub mod selection;

pub use line::CartLine;

/// Errors related to cart mutation or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product is priced in a different currency than the cart (product currency, cart currency).
    #[error("product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The requested variation does not belong to the product.
    #[error("product {0} has no variation {1}")]
    UnknownVariation(ProductId, VariationId),

    /// The requested quantity does not fit in a cart line.
    #[error("quantity {1} for product {0} is too large")]
    QuantityTooLarge(ProductId, i64),

    /// Price arithmetic overflowed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A single cart mutation.
#[derive(Debug, Clone)]
pub enum CartAction<'a> {
    /// Add one unit of a product, optionally with a variation
    Add {
        /// Product to add
        product: Product<'a>,
        /// Selected variation
        variation: Option<VariationId>,
    },

    /// Set a line's quantity; anything below one removes the line
    SetQuantity {
        /// Product of the line
        product_id: ProductId,
        /// Variation of the line
        variation_id: Option<VariationId>,
        /// New quantity
        quantity: i64,
    },

    /// Remove a line
    Remove {
        /// Product of the line
        product_id: ProductId,
        /// Variation of the line
        variation_id: Option<VariationId>,
    },

    /// Remove every line
    Clear,
}

/// Shopping cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Apply a single mutation.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the mutation was rejected; the cart is left unchanged.
    pub fn apply(&mut self, action: CartAction<'a>) -> Result<(), CartError> {
        match action {
            CartAction::Add { product, variation } => {
                self.insert_or_increment(product, variation.as_ref())
            }
            CartAction::SetQuantity {
                product_id,
                variation_id,
                quantity,
            } => self.update_quantity(&product_id, variation_id.as_ref(), quantity),
            CartAction::Remove {
                product_id,
                variation_id,
            } => {
                self.remove(&product_id, variation_id.as_ref());
                Ok(())
            }
            CartAction::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Add one unit of `product`, with an optional variation.
    ///
    /// If a line for the same product and variation already exists its quantity
    /// goes up by one, otherwise a new line with quantity one is appended.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the product is priced in another currency.
    /// - [`CartError::UnknownVariation`]: the variation is not one of the product's.
    /// - [`CartError::QuantityTooLarge`]: the line quantity would overflow.
    pub fn add_line(
        &mut self,
        product: &Product<'a>,
        variation: Option<&VariationId>,
    ) -> Result<(), CartError> {
        self.apply(CartAction::Add {
            product: product.clone(),
            variation: variation.cloned(),
        })
    }

    /// Set the quantity of a line. A quantity below one removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] if `quantity` does not fit in a line.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
        variation_id: Option<&VariationId>,
    ) -> Result<(), CartError> {
        self.apply(CartAction::SetQuantity {
            product_id: product_id.clone(),
            variation_id: variation_id.cloned(),
            quantity,
        })
    }

    /// Remove a line; does nothing if it is not in the cart.
    pub fn remove_line(&mut self, product_id: &ProductId, variation_id: Option<&VariationId>) {
        self.remove(product_id, variation_id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn insert_or_increment(
        &mut self,
        product: Product<'a>,
        variation: Option<&VariationId>,
    ) -> Result<(), CartError> {
        let product_currency = product.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(line) = self.find_mut(&product.id, variation) {
            let quantity = line.quantity().checked_add(1).ok_or_else(|| {
                CartError::QuantityTooLarge(product.id.clone(), i64::from(u32::MAX) + 1)
            })?;

            line.set_quantity(quantity);

            debug!(product = %product.id, quantity, "incremented cart line");

            return Ok(());
        }

        let variation = match variation {
            Some(id) => Some(
                product
                    .variation(id)
                    .cloned()
                    .ok_or_else(|| CartError::UnknownVariation(product.id.clone(), id.clone()))?,
            ),
            None => None,
        };

        debug!(product = %product.id, variation = ?variation.as_ref().map(|v| &v.id), "added cart line");

        self.lines.push(CartLine::new(product, variation));

        Ok(())
    }

    fn update_quantity(
        &mut self,
        product_id: &ProductId,
        variation_id: Option<&VariationId>,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            self.remove(product_id, variation_id);

            return Ok(());
        }

        let quantity = u32::try_from(quantity)
            .map_err(|_err| CartError::QuantityTooLarge(product_id.clone(), quantity))?;

        if let Some(line) = self.find_mut(product_id, variation_id) {
            line.set_quantity(quantity);

            debug!(product = %product_id, quantity, "set cart line quantity");
        }

        Ok(())
    }

    fn remove(&mut self, product_id: &ProductId, variation_id: Option<&VariationId>) {
        let before = self.lines.len();

        self.lines.retain(|line| !line.matches(product_id, variation_id));

        if self.lines.len() < before {
            debug!(product = %product_id, "removed cart line");
        }
    }

    fn find_mut(
        &mut self,
        product_id: &ProductId,
        variation_id: Option<&VariationId>,
    ) -> Option<&mut CartLine<'a>> {
        self.lines
            .iter_mut()
            .find(|line| line.matches(product_id, variation_id))
    }

    /// Find the line for a product and optional variation.
    pub fn line(
        &self,
        product_id: &ProductId,
        variation_id: Option<&VariationId>,
    ) -> Option<&CartLine<'a>> {
        self.lines
            .iter()
            .find(|line| line.matches(product_id, variation_id))
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Sum of every line's unit price × quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Pricing`] if there was a money arithmetic or overflow error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let total = self.lines.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| -> Result<_, PricingError> { Ok(acc.add(line.total()?)?) },
        )?;

        Ok(total)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Total weight in kilograms across all lines.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::WeightOverflow`] if a line weight or the sum does not fit in a decimal.
    pub fn total_weight(&self) -> Result<Decimal, PricingError> {
        self.lines.iter().try_fold(Decimal::ZERO, |acc, line| -> Result<_, PricingError> {
            let weight = line.weight()?;

            acc.checked_add(weight)
                .ok_or(PricingError::WeightOverflow(weight, line.quantity()))
        })
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;
    use crate::products::Variation;

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    fn armchair() -> Product<'static> {
        Product::new("armchair", "Armchair", usd(30_000))
            .with_weight(Decimal::new(18, 0))
            .with_variation(Variation::new("velvet", "Fabric", "Velvet").with_price(usd(35_000)))
            .with_variation(Variation::new("linen", "Fabric", "Linen"))
    }

    fn side_table() -> Product<'static> {
        Product::new("side-table", "Side Table", usd(10_000)).with_weight(Decimal::new(6, 0))
    }

    #[test]
    fn new_cart_is_empty() -> TestResult {
        let cart = Cart::new(USD);

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal()?, usd(0));
        assert_eq!(cart.currency(), USD);

        Ok(())
    }

    #[test]
    fn add_line_appends_with_quantity_one() -> TestResult {
        let mut cart = Cart::new(USD);

        cart.add_line(&side_table(), None)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal()?, usd(10_000));

        Ok(())
    }

    #[test]
    fn adding_same_identity_increments_quantity() -> TestResult {
        let mut cart = Cart::new(USD);
        let product = armchair();

        cart.add_line(&product, Some(&"velvet".into()))?;
        cart.add_line(&product, Some(&"velvet".into()))?;

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.line(&"armchair".into(), Some(&"velvet".into()))
                .map(CartLine::quantity),
            Some(2)
        );

        Ok(())
    }

    #[test]
    fn variation_and_no_variation_are_separate_lines() -> TestResult {
        let mut cart = Cart::new(USD);
        let product = armchair();

        cart.add_line(&product, None)?;
        cart.add_line(&product, Some(&"velvet".into()))?;
        cart.add_line(&product, Some(&"linen".into()))?;

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.subtotal()?, usd(30_000 + 35_000 + 30_000));

        Ok(())
    }

    #[test]
    fn add_line_snapshots_product() -> TestResult {
        let mut cart = Cart::new(USD);
        let mut product = side_table();

        cart.add_line(&product, None)?;
        product.price = usd(1);

        assert_eq!(cart.subtotal()?, usd(10_000));

        Ok(())
    }

    #[test]
    fn add_line_rejects_unknown_variation() {
        let mut cart = Cart::new(USD);

        let result = cart.add_line(&armchair(), Some(&"leather".into()));

        assert_eq!(
            result,
            Err(CartError::UnknownVariation("armchair".into(), "leather".into()))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_line_rejects_currency_mismatch() {
        let mut cart = Cart::new(GBP);

        let result = cart.add_line(&side_table(), None);

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                "side-table".into(),
                USD.iso_alpha_code,
                GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn set_quantity_updates_in_place() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&side_table(), None)?;

        cart.set_quantity(&"side-table".into(), 4, None)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal()?, usd(40_000));

        Ok(())
    }

    #[test]
    fn set_quantity_below_one_removes_line() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&side_table(), None)?;
        cart.add_line(&armchair(), None)?;

        cart.set_quantity(&"side-table".into(), 0, None)?;
        cart.set_quantity(&"armchair".into(), -3, None)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_for_missing_line_is_noop() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&armchair(), Some(&"linen".into()))?;

        cart.set_quantity(&"armchair".into(), 5, None)?;

        assert_eq!(cart.item_count(), 1);

        Ok(())
    }

    #[test]
    fn set_quantity_rejects_quantities_beyond_line_capacity() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&side_table(), None)?;

        let too_many = i64::from(u32::MAX) + 1;
        let result = cart.set_quantity(&"side-table".into(), too_many, None);

        assert_eq!(
            result,
            Err(CartError::QuantityTooLarge("side-table".into(), too_many))
        );
        assert_eq!(cart.item_count(), 1);

        Ok(())
    }

    #[test]
    fn remove_line_only_removes_matching_identity() -> TestResult {
        let mut cart = Cart::new(USD);
        let product = armchair();
        cart.add_line(&product, None)?;
        cart.add_line(&product, Some(&"velvet".into()))?;

        cart.remove_line(&"armchair".into(), Some(&"velvet".into()));

        assert_eq!(cart.len(), 1);
        assert!(cart.line(&"armchair".into(), None).is_some());

        cart.remove_line(&"armchair".into(), Some(&"velvet".into()));
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&side_table(), None)?;
        cart.add_line(&armchair(), None)?;

        cart.clear();

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn apply_funnels_every_action() -> TestResult {
        let mut cart = Cart::new(USD);

        cart.apply(CartAction::Add {
            product: side_table(),
            variation: None,
        })?;
        cart.apply(CartAction::SetQuantity {
            product_id: "side-table".into(),
            variation_id: None,
            quantity: 3,
        })?;
        assert_eq!(cart.item_count(), 3);

        cart.apply(CartAction::Remove {
            product_id: "side-table".into(),
            variation_id: None,
        })?;
        assert!(cart.is_empty());

        cart.apply(CartAction::Add {
            product: armchair(),
            variation: Some("linen".into()),
        })?;
        cart.apply(CartAction::Clear)?;
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn total_weight_sums_line_weights() -> TestResult {
        let mut cart = Cart::new(USD);
        cart.add_line(&side_table(), None)?;
        cart.add_line(&side_table(), None)?;
        cart.add_line(&armchair(), None)?;

        assert_eq!(cart.total_weight()?, Decimal::new(30, 0));

        Ok(())
    }

    #[test]
    fn total_weight_overflow_is_an_error() -> TestResult {
        let anvil = Product::new("anvil", "Anvil", usd(10_000)).with_weight(Decimal::MAX / Decimal::TWO);

        let mut cart = Cart::new(USD);
        cart.add_line(&anvil, None)?;
        cart.set_quantity(&ProductId::new("anvil"), 3, None)?;

        assert!(matches!(
            cart.total_weight(),
            Err(PricingError::WeightOverflow(_, 3))
        ));

        Ok(())
    }
}
