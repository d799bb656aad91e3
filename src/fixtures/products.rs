//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{AUD, CAD, Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use serde_norway::Mapping;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId, SpecificShippingCharge, Variation, VariationId},
    shipping::AreaId,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture, in file order
    pub products: Mapping,
}

impl ProductsFixture {
    /// Product fixtures with their ids, in the order they appear in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is not a string or an entry is malformed.
    pub fn into_entries(self) -> Result<Vec<(String, ProductFixture)>, FixtureError> {
        self.products
            .into_iter()
            .map(|(key, value)| -> Result<_, FixtureError> {
                Ok((serde_norway::from_value(key)?, serde_norway::from_value(value)?))
            })
            .collect()
    }
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Base price (e.g., "450.00 USD")
    pub price: String,

    /// Sale price, used when `on_sale` is set
    #[serde(default)]
    pub sale_price: Option<String>,

    /// Whether the sale price applies
    #[serde(default)]
    pub on_sale: bool,

    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,

    /// Manufacturer model number
    #[serde(default)]
    pub model_number: Option<String>,

    /// Selectable variations
    #[serde(default)]
    pub variations: Vec<VariationFixture>,

    /// Per-area shipping surcharges (area id -> "25.00 USD")
    #[serde(default)]
    pub shipping_charges: FxHashMap<String, String>,
}

/// Variation Fixture
#[derive(Debug, Deserialize)]
pub struct VariationFixture {
    /// Variation id, unique within the product
    pub id: String,

    /// Type label (e.g., "Color")
    #[serde(rename = "type")]
    pub kind: String,

    /// Value label (e.g., "Green")
    pub value: String,

    /// Price override
    #[serde(default)]
    pub price: Option<String>,

    /// Sale price override
    #[serde(default)]
    pub sale_price: Option<String>,

    /// Weight override in kilograms
    #[serde(default)]
    pub weight: Option<f64>,

    /// Model number override
    #[serde(default)]
    pub model_number: Option<String>,
}

impl ProductFixture {
    /// Build a validated product with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if a price, weight or the product data itself is invalid.
    pub fn try_into_product<'a>(self, id: &str) -> Result<Product<'a>, FixtureError> {
        let mut specific_shipping_charges = self
            .shipping_charges
            .into_iter()
            .map(|(area, charge)| -> Result<_, FixtureError> {
                Ok(SpecificShippingCharge {
                    area: AreaId::new(area),
                    charge: parse_money(&charge)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        specific_shipping_charges.sort_by(|a, b| a.area.cmp(&b.area));

        let product = Product {
            id: ProductId::new(id),
            name: self.name,
            price: parse_money(&self.price)?,
            sale_price: self.sale_price.as_deref().map(parse_money).transpose()?,
            on_sale: self.on_sale,
            weight: self.weight.map(parse_weight).transpose()?,
            model_number: self.model_number,
            variations: self
                .variations
                .into_iter()
                .map(Variation::try_from)
                .collect::<Result<_, _>>()?,
            specific_shipping_charges,
        };

        product.validate()?;

        Ok(product)
    }
}

impl TryFrom<VariationFixture> for Variation<'_> {
    type Error = FixtureError;

    fn try_from(fixture: VariationFixture) -> Result<Self, Self::Error> {
        Ok(Variation {
            id: VariationId::new(fixture.id),
            kind: fixture.kind,
            value: fixture.value,
            price: fixture.price.as_deref().map(parse_money).transpose()?,
            sale_price: fixture.sale_price.as_deref().map(parse_money).transpose()?,
            weight: fixture.weight.map(parse_weight).transpose()?,
            model_number: fixture.model_number,
        })
    }
}

/// Parse a price string straight into [`Money`].
///
/// # Errors
///
/// Returns an error if [`parse_price`] rejects the string.
pub fn parse_money<'a>(s: &str) -> Result<Money<'a, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "299.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(
        parts
            .get(1)
            .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?,
    )?;

    let scale = Decimal::from(10_i64.pow(currency.exponent));

    let minor_units = amount
        .checked_mul(scale)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    if minor_units < 0 {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    Ok((minor_units, currency))
}

/// Look up a supported ISO currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "USD" => Ok(USD),
        "GBP" => Ok(GBP),
        "EUR" => Ok(EUR),
        "CAD" => Ok(CAD),
        "AUD" => Ok(AUD),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse percentage string (e.g., "8%" or "0.08") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or the rate is negative.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let value = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
            / 100.0
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?
    };

    if !value.is_finite() || value < 0.0 {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value))
}

/// Convert a weight in kilograms to a decimal.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidWeight`] for negative or non-finite weights.
pub fn parse_weight(kg: f64) -> Result<Decimal, FixtureError> {
    if kg < 0.0 {
        return Err(FixtureError::InvalidWeight(kg.to_string()));
    }

    Decimal::from_f64(kg).ok_or_else(|| FixtureError::InvalidWeight(kg.to_string()))
}
