//! Shipping Cost Calculator
//!
//! Matches shipping methods against a destination area and prices each
//! eligible method for a cart. Selecting one of the priced options is left to
//! the caller.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    pricing::line_total,
    shipping::{
        AreaId, MethodId, ShippingError, ShippingMethod, ShippingRate,
        tiers::{TierMatch, select_tier},
    },
};

/// Why a shipping method was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The method lists the destination area
    Area,

    /// The method is global and does not list the destination area
    Global,
}

impl ShippingMethod<'_> {
    /// Decide whether this method can ship `cart` to `destination`.
    ///
    /// Returns `None` when the method does not serve the area (and is not
    /// global), or when it is restricted to products and the cart holds
    /// anything else.
    pub fn eligibility(&self, destination: &AreaId, cart: &Cart<'_>) -> Option<Eligibility> {
        let eligibility = if self.serves_area(destination) {
            Eligibility::Area
        } else if self.is_global {
            Eligibility::Global
        } else {
            return None;
        };

        if !self.product_ids.is_empty()
            && !cart
                .iter()
                .all(|line| self.product_ids.contains(line.product_id()))
        {
            return None;
        }

        Some(eligibility)
    }
}

/// A priced shipping method.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingOption<'a> {
    /// Method identifier
    pub method_id: MethodId,

    /// Method display name
    pub name: String,

    /// Why the method was offered
    pub eligibility: Eligibility,

    /// Cost from the method's own rate
    pub method_cost: Money<'a, Currency>,

    /// Per-product surcharges for the destination area
    pub surcharge: Money<'a, Currency>,

    /// Method cost plus surcharges
    pub cost: Money<'a, Currency>,

    /// The cart was heavier than every tier and was priced at the highest tier
    pub tier_overflow: bool,
}

/// Why an eligible method could not be priced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnavailableReason {
    /// The method is weight-rated but has no tiers
    NoWeightTiers,

    /// The cart weight is below or between the method's tiers
    WeightOutsideTiers(Decimal),
}

/// An eligible method that could not be priced.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableMethod {
    /// Method identifier
    pub method_id: MethodId,

    /// Method display name
    pub name: String,

    /// Pricing failure
    pub reason: UnavailableReason,
}

impl UnavailableMethod {
    /// The failure as a [`ShippingError`].
    pub fn to_error(&self) -> ShippingError {
        match self.reason {
            UnavailableReason::NoWeightTiers => {
                ShippingError::NoWeightTiers(self.method_id.clone())
            }
            UnavailableReason::WeightOutsideTiers(weight) => ShippingError::WeightOutsideTiers {
                method: self.method_id.clone(),
                weight: weight.to_string(),
            },
        }
    }
}

/// Every eligible shipping method for a cart and destination.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingQuote<'a> {
    destination: AreaId,
    weight: Decimal,
    options: SmallVec<[ShippingOption<'a>; 4]>,
    unavailable: SmallVec<[UnavailableMethod; 2]>,
}

impl<'a> ShippingQuote<'a> {
    /// Destination area
    pub fn destination(&self) -> &AreaId {
        &self.destination
    }

    /// Total cart weight used for tier lookups
    pub fn weight(&self) -> Decimal {
        self.weight
    }

    /// Priced options, in method configuration order.
    pub fn options(&self) -> &[ShippingOption<'a>] {
        &self.options
    }

    /// Eligible methods whose tiers did not cover the cart.
    pub fn unavailable(&self) -> &[UnavailableMethod] {
        &self.unavailable
    }

    /// The first priced option.
    pub fn first(&self) -> Option<&ShippingOption<'a>> {
        self.options.first()
    }

    /// The lowest-cost option; ties go to the earlier one.
    pub fn cheapest(&self) -> Option<&ShippingOption<'a>> {
        self.options
            .iter()
            .min_by_key(|option| *option.cost.amount())
    }

    /// The option for a given method.
    ///
    /// # Errors
    ///
    /// - The unavailability reason, if the method was eligible but could not be priced.
    /// - [`ShippingError::MethodUnavailable`] if the method was not eligible at all.
    pub fn option(&self, method_id: &MethodId) -> Result<&ShippingOption<'a>, ShippingError> {
        if let Some(option) = self
            .options
            .iter()
            .find(|option| &option.method_id == method_id)
        {
            return Ok(option);
        }

        match self
            .unavailable
            .iter()
            .find(|method| &method.method_id == method_id)
        {
            Some(method) => Err(method.to_error()),
            None => Err(ShippingError::MethodUnavailable(method_id.clone())),
        }
    }

    /// Whether no method could be priced.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Price every eligible shipping method for `cart` going to `destination`.
///
/// # Errors
///
/// - [`ShippingError::NoEligibleShippingMethod`]: no method serves the destination.
/// - [`ShippingError::Money`]: a method or surcharge is in another currency than the cart.
/// - [`ShippingError::Pricing`]: surcharge or weight arithmetic overflowed.
pub fn compute_shipping_cost<'a>(
    cart: &Cart<'a>,
    destination: &AreaId,
    methods: &[ShippingMethod<'a>],
) -> Result<ShippingQuote<'a>, ShippingError> {
    let eligible: SmallVec<[(&ShippingMethod<'a>, Eligibility); 4]> = methods
        .iter()
        .filter_map(|method| {
            method
                .eligibility(destination, cart)
                .map(|eligibility| (method, eligibility))
        })
        .collect();

    if eligible.is_empty() {
        return Err(ShippingError::NoEligibleShippingMethod(destination.clone()));
    }

    let weight = cart.total_weight()?;
    let surcharge = area_surcharge(cart, destination)?;

    let mut options = SmallVec::new();
    let mut unavailable = SmallVec::new();

    for (method, eligibility) in eligible {
        match method_cost(method, weight) {
            Ok((method_cost, tier_overflow)) => {
                let cost = method_cost.add(surcharge)?;

                debug!(method = %method.id, %cost, "priced shipping method");

                options.push(ShippingOption {
                    method_id: method.id.clone(),
                    name: method.name.clone(),
                    eligibility,
                    method_cost,
                    surcharge,
                    cost,
                    tier_overflow,
                });
            }
            Err(reason) => {
                warn!(method = %method.id, ?reason, "shipping method unavailable");

                unavailable.push(UnavailableMethod {
                    method_id: method.id.clone(),
                    name: method.name.clone(),
                    reason,
                });
            }
        }
    }

    Ok(ShippingQuote {
        destination: destination.clone(),
        weight,
        options,
        unavailable,
    })
}

/// Cost from a method's own rate, and whether the weight overflowed its tiers.
fn method_cost<'a>(
    method: &ShippingMethod<'a>,
    weight: Decimal,
) -> Result<(Money<'a, Currency>, bool), UnavailableReason> {
    match &method.rate {
        ShippingRate::Flat(rate) => Ok((*rate, false)),
        ShippingRate::Weight(tiers) => match select_tier(tiers, weight) {
            TierMatch::Exact(tier) => Ok((tier.cost, false)),
            TierMatch::Overflow(tier) => {
                warn!(
                    method = %method.id,
                    %weight,
                    max_weight = %tier.max_weight,
                    "cart weight exceeds every tier; using highest tier"
                );

                Ok((tier.cost, true))
            }
            TierMatch::Uncovered => Err(UnavailableReason::WeightOutsideTiers(weight)),
            TierMatch::Empty => Err(UnavailableReason::NoWeightTiers),
        },
    }
}

/// Sum of per-unit product surcharges for `destination` across the cart.
fn area_surcharge<'a>(
    cart: &Cart<'a>,
    destination: &AreaId,
) -> Result<Money<'a, Currency>, ShippingError> {
    cart.iter().try_fold(
        Money::from_minor(0, cart.currency()),
        |acc, line| -> Result<_, ShippingError> {
            match line.product().shipping_charge_for(destination) {
                Some(charge) => Ok(acc.add(line_total(*charge, line.quantity())?)?),
                None => Ok(acc),
            }
        },
    )
}
