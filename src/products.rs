//! Products

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::shipping::AreaId;

new_key_type! {
    /// Catalog storage key for a product
    pub struct ProductKey;
}

/// Stable product identifier, as used by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variation identifier, unique within its product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariationId(String);

impl VariationId {
    /// Create a variation identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for VariationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product data problems detected by [`Product::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// Product is flagged on sale but has no sale price.
    #[error("product {0} is on sale but has no sale price")]
    MissingSalePrice(ProductId),

    /// Sale price is higher than the price it discounts.
    #[error("product {product} has sale price {sale} above price {price}")]
    SalePriceAboveBase {
        /// Offending product
        product: ProductId,
        /// Offending variation, if the prices came from one
        variation: Option<VariationId>,
        /// Sale price, formatted
        sale: String,
        /// Base price, formatted
        price: String,
    },

    /// Two variations share an identifier.
    #[error("product {0} has duplicate variation {1}")]
    DuplicateVariation(ProductId, VariationId),

    /// A price is in a different currency than the product's base price.
    #[error("product {0} mixes currencies {1} and {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// A selectable sub-option of a product (colour, size, finish).
///
/// Any override that is present supersedes the parent product's value when
/// this variation is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation<'a> {
    /// Variation identifier
    pub id: VariationId,

    /// Type label, e.g. "Color"
    pub kind: String,

    /// Value label, e.g. "Walnut"
    pub value: String,

    /// Price override
    pub price: Option<Money<'a, Currency>>,

    /// Sale price override, used only while the product is on sale
    pub sale_price: Option<Money<'a, Currency>>,

    /// Weight override in kilograms
    pub weight: Option<Decimal>,

    /// Model number override
    pub model_number: Option<String>,
}

impl<'a> Variation<'a> {
    /// Create a variation with no overrides.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: VariationId::new(id),
            kind: kind.into(),
            value: value.into(),
            price: None,
            sale_price: None,
            weight: None,
            model_number: None,
        }
    }

    /// Set the price override.
    #[must_use]
    pub fn with_price(mut self, price: Money<'a, Currency>) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the sale price override.
    #[must_use]
    pub fn with_sale_price(mut self, sale_price: Money<'a, Currency>) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    /// Set the weight override.
    #[must_use]
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the model number override.
    #[must_use]
    pub fn with_model_number(mut self, model_number: impl Into<String>) -> Self {
        self.model_number = Some(model_number.into());
        self
    }
}

/// Per-unit shipping surcharge for one destination area.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificShippingCharge<'a> {
    /// Destination area the surcharge applies to
    pub area: AreaId,

    /// Charge per unit shipped
    pub charge: Money<'a, Currency>,
}

/// Variations sharing one type label.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationGroup<'p, 'a> {
    /// Shared type label
    pub kind: &'p str,

    /// Variations in catalog order
    pub variations: SmallVec<[&'p Variation<'a>; 4]>,
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Base price
    pub price: Money<'a, Currency>,

    /// Sale price, used only while `on_sale` is set
    pub sale_price: Option<Money<'a, Currency>>,

    /// Whether sale prices apply
    pub on_sale: bool,

    /// Weight in kilograms
    pub weight: Option<Decimal>,

    /// Model number
    pub model_number: Option<String>,

    /// Selectable variations
    pub variations: Vec<Variation<'a>>,

    /// Per-area shipping surcharges
    pub specific_shipping_charges: Vec<SpecificShippingCharge<'a>>,
}

impl<'a> Product<'a> {
    /// Create a product with only an id, name and base price.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            price,
            sale_price: None,
            on_sale: false,
            weight: None,
            model_number: None,
            variations: Vec::new(),
            specific_shipping_charges: Vec::new(),
        }
    }

    /// Put the product on sale at the given price.
    #[must_use]
    pub fn on_sale_at(mut self, sale_price: Money<'a, Currency>) -> Self {
        self.sale_price = Some(sale_price);
        self.on_sale = true;
        self
    }

    /// Set the product weight.
    #[must_use]
    pub fn with_weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Add a variation.
    #[must_use]
    pub fn with_variation(mut self, variation: Variation<'a>) -> Self {
        self.variations.push(variation);
        self
    }

    /// Add a per-unit shipping surcharge for an area.
    #[must_use]
    pub fn with_shipping_charge(mut self, area: impl Into<AreaId>, charge: Money<'a, Currency>) -> Self {
        self.specific_shipping_charges.push(SpecificShippingCharge {
            area: area.into(),
            charge,
        });
        self
    }

    /// Currency of the base price.
    pub fn currency(&self) -> &'a Currency {
        self.price.currency()
    }

    /// Look up one of this product's variations.
    pub fn variation(&self, id: &VariationId) -> Option<&Variation<'a>> {
        self.variations.iter().find(|variation| &variation.id == id)
    }

    /// Whether the product has any variations to choose from.
    pub fn has_variations(&self) -> bool {
        !self.variations.is_empty()
    }

    /// Surcharge configured for shipping this product to `area`, if any.
    pub fn shipping_charge_for(&self, area: &AreaId) -> Option<&Money<'a, Currency>> {
        self.specific_shipping_charges
            .iter()
            .find(|charge| &charge.area == area)
            .map(|charge| &charge.charge)
    }

    /// Group variations by type label, in the order each label first appears.
    pub fn variation_groups(&self) -> SmallVec<[VariationGroup<'_, 'a>; 2]> {
        let mut groups: SmallVec<[VariationGroup<'_, 'a>; 2]> = SmallVec::new();

        for variation in &self.variations {
            match groups.iter_mut().find(|group| group.kind == variation.kind) {
                Some(group) => group.variations.push(variation),
                None => groups.push(VariationGroup {
                    kind: &variation.kind,
                    variations: SmallVec::from_elem(variation, 1),
                }),
            }
        }

        groups
    }

    /// Check sale pricing, currencies and variation identity.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductError`] found.
    pub fn validate(&self) -> Result<(), ProductError> {
        let currency = self.currency();

        if self.on_sale && self.sale_price.is_none() {
            return Err(ProductError::MissingSalePrice(self.id.clone()));
        }

        if self.on_sale
            && let Some(sale) = self.sale_price
        {
            self.check_sale(None, sale, self.price)?;
        }

        for (idx, variation) in self.variations.iter().enumerate() {
            if self
                .variations
                .iter()
                .take(idx)
                .any(|earlier| earlier.id == variation.id)
            {
                return Err(ProductError::DuplicateVariation(
                    self.id.clone(),
                    variation.id.clone(),
                ));
            }

            for money in [variation.price, variation.sale_price].into_iter().flatten() {
                self.check_currency(currency, money.currency())?;
            }

            if self.on_sale
                && let Some(sale) = variation.sale_price
            {
                self.check_sale(Some(&variation.id), sale, variation.price.unwrap_or(self.price))?;
            }
        }

        for charge in &self.specific_shipping_charges {
            self.check_currency(currency, charge.charge.currency())?;
        }

        Ok(())
    }

    fn check_currency(&self, expected: &Currency, actual: &Currency) -> Result<(), ProductError> {
        if expected == actual {
            Ok(())
        } else {
            Err(ProductError::CurrencyMismatch(
                self.id.clone(),
                expected.iso_alpha_code,
                actual.iso_alpha_code,
            ))
        }
    }

    fn check_sale(
        &self,
        variation: Option<&VariationId>,
        sale: Money<'a, Currency>,
        price: Money<'a, Currency>,
    ) -> Result<(), ProductError> {
        self.check_currency(price.currency(), sale.currency())?;

        if sale.amount() > price.amount() {
            return Err(ProductError::SalePriceAboveBase {
                product: self.id.clone(),
                variation: variation.cloned(),
                sale: sale.to_string(),
                price: price.to_string(),
            });
        }

        Ok(())
    }
}
