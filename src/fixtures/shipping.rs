//! Shipping Fixtures

use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        products::{parse_money, parse_weight},
    },
    products::ProductId,
    shipping::{AreaId, MethodId, ShippingArea, ShippingMethod, ShippingRate, WeightTier},
};

/// Wrapper for shipping areas and methods in YAML
#[derive(Debug, Deserialize)]
pub struct ShippingFixture {
    /// Shipping areas
    #[serde(default)]
    pub areas: Vec<AreaFixture>,

    /// Shipping methods, in the order they are offered
    #[serde(default)]
    pub methods: Vec<MethodFixture>,
}

/// Area Fixture
#[derive(Debug, Deserialize)]
pub struct AreaFixture {
    /// Area id
    pub id: String,

    /// Display name
    pub name: String,
}

impl From<AreaFixture> for ShippingArea {
    fn from(fixture: AreaFixture) -> Self {
        ShippingArea::new(fixture.id, fixture.name)
    }
}

/// Method Fixture
///
/// Exactly one of `flat_rate` and `weight_tiers` must be given.
#[derive(Debug, Deserialize)]
pub struct MethodFixture {
    /// Method id
    pub id: String,

    /// Display name
    pub name: String,

    /// Areas served
    #[serde(default)]
    pub areas: Vec<String>,

    /// Offered to every area
    #[serde(default)]
    pub global: bool,

    /// Restrict to carts made up of these products only
    #[serde(default)]
    pub products: Vec<String>,

    /// Flat charge (e.g., "30.00 USD")
    #[serde(default)]
    pub flat_rate: Option<String>,

    /// Weight tiers
    #[serde(default)]
    pub weight_tiers: Option<Vec<TierFixture>>,
}

/// Weight Tier Fixture
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Inclusive lower bound in kilograms
    pub min: f64,

    /// Exclusive upper bound in kilograms
    pub max: f64,

    /// Charge for this tier
    pub cost: String,
}

impl TryFrom<TierFixture> for WeightTier<'_> {
    type Error = FixtureError;

    fn try_from(fixture: TierFixture) -> Result<Self, Self::Error> {
        let min = parse_weight(fixture.min)?;
        let max = parse_weight(fixture.max)?;

        if max <= min {
            return Err(FixtureError::InvalidWeight(format!(
                "tier upper bound {max} is not above lower bound {min}"
            )));
        }

        Ok(WeightTier::new(min, max, parse_money(&fixture.cost)?))
    }
}

impl TryFrom<MethodFixture> for ShippingMethod<'_> {
    type Error = FixtureError;

    fn try_from(fixture: MethodFixture) -> Result<Self, Self::Error> {
        let rate = match (fixture.flat_rate, fixture.weight_tiers) {
            (Some(flat), None) => ShippingRate::Flat(parse_money(&flat)?),
            (None, Some(tiers)) => ShippingRate::Weight(
                tiers
                    .into_iter()
                    .map(WeightTier::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            _ => {
                return Err(FixtureError::InvalidShippingMethod(format!(
                    "{}: give exactly one of flat_rate and weight_tiers",
                    fixture.id
                )));
            }
        };

        Ok(ShippingMethod {
            id: MethodId::new(fixture.id),
            name: fixture.name,
            area_ids: fixture.areas.into_iter().map(AreaId::new).collect(),
            rate,
            is_global: fixture.global,
            product_ids: fixture.products.into_iter().map(ProductId::new).collect(),
        })
    }
}
