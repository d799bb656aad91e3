//! Shipping
//!
//! Shipping areas, shipping methods and the cost calculator that matches a
//! cart against them.

use std::fmt;

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{pricing::PricingError, products::ProductId};

pub mod calculator;
pub mod tiers;

pub use calculator::{
    Eligibility, ShippingOption, ShippingQuote, UnavailableMethod, UnavailableReason,
    compute_shipping_cost,
};
pub use tiers::{TierMatch, WeightTier};

/// Shipping area identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(String);

impl AreaId {
    /// Create an area identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AreaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shipping method identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(String);

impl MethodId {
    /// Create a method identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MethodId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised while pricing shipping.
#[derive(Debug, Error, PartialEq)]
pub enum ShippingError {
    /// No configured method ships to the destination.
    #[error("no shipping available to area {0}")]
    NoEligibleShippingMethod(AreaId),

    /// A weight-rated method has no tiers configured.
    #[error("shipping method {0} has no weight tiers")]
    NoWeightTiers(MethodId),

    /// The cart weight falls below or between the configured tiers.
    #[error("cart weight {weight}kg is not covered by the tiers of shipping method {method}")]
    WeightOutsideTiers {
        /// Method whose tiers were searched
        method: MethodId,
        /// Total cart weight, formatted
        weight: String,
    },

    /// The requested method is not among the priced options.
    #[error("shipping method {0} is not available for this cart")]
    MethodUnavailable(MethodId),

    /// Price multiplication overflowed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A named geographic bucket used to match shipping methods to a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingArea {
    /// Area identifier
    pub id: AreaId,

    /// Display name
    pub name: String,
}

impl ShippingArea {
    /// Create a shipping area.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AreaId::new(id),
            name: name.into(),
        }
    }
}

/// How a shipping method charges.
#[derive(Debug, Clone, PartialEq)]
pub enum ShippingRate<'a> {
    /// One charge regardless of the cart
    Flat(Money<'a, Currency>),

    /// Charge picked from weight tiers, in configuration order
    Weight(Vec<WeightTier<'a>>),
}

/// A named shipping rule associated with one or more areas.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingMethod<'a> {
    /// Method identifier
    pub id: MethodId,

    /// Display name
    pub name: String,

    /// Areas this method ships to
    pub area_ids: SmallVec<[AreaId; 4]>,

    /// Charging rule
    pub rate: ShippingRate<'a>,

    /// Offered to every destination, whatever its area
    pub is_global: bool,

    /// When non-empty, only carts made up entirely of these products qualify
    pub product_ids: Vec<ProductId>,
}

impl<'a> ShippingMethod<'a> {
    /// Create a flat-rate method.
    pub fn flat(id: impl Into<String>, name: impl Into<String>, rate: Money<'a, Currency>) -> Self {
        Self::with_rate(id, name, ShippingRate::Flat(rate))
    }

    /// Create a weight-tiered method.
    pub fn weight(
        id: impl Into<String>,
        name: impl Into<String>,
        tiers: impl Into<Vec<WeightTier<'a>>>,
    ) -> Self {
        Self::with_rate(id, name, ShippingRate::Weight(tiers.into()))
    }

    fn with_rate(id: impl Into<String>, name: impl Into<String>, rate: ShippingRate<'a>) -> Self {
        Self {
            id: MethodId::new(id),
            name: name.into(),
            area_ids: SmallVec::new(),
            rate,
            is_global: false,
            product_ids: Vec::new(),
        }
    }

    /// Add an area this method ships to.
    #[must_use]
    pub fn for_area(mut self, area: impl Into<AreaId>) -> Self {
        self.area_ids.push(area.into());
        self
    }

    /// Mark this method as offered everywhere.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    /// Restrict this method to the given products.
    #[must_use]
    pub fn restricted_to(mut self, products: impl IntoIterator<Item = ProductId>) -> Self {
        self.product_ids.extend(products);
        self
    }

    /// Whether this method lists `area` explicitly.
    pub fn serves_area(&self, area: &AreaId) -> bool {
        self.area_ids.contains(area)
    }
}
