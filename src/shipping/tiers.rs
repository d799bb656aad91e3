//! Weight Tiers
//!
//! Tiers are half-open: a tier covers `min_weight <= w < max_weight`. The
//! first covering tier in configuration order wins.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// A single weight band and its shipping cost.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTier<'a> {
    /// Inclusive lower bound in kilograms
    pub min_weight: Decimal,

    /// Exclusive upper bound in kilograms
    pub max_weight: Decimal,

    /// Cost for a cart inside this band
    pub cost: Money<'a, Currency>,
}

impl<'a> WeightTier<'a> {
    /// Create a weight tier.
    pub fn new(min_weight: Decimal, max_weight: Decimal, cost: Money<'a, Currency>) -> Self {
        Self {
            min_weight,
            max_weight,
            cost,
        }
    }

    /// Whether `weight` falls inside `[min_weight, max_weight)`.
    pub fn covers(&self, weight: Decimal) -> bool {
        weight >= self.min_weight && weight < self.max_weight
    }
}

/// Outcome of looking up a weight in a tier list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierMatch<'t, 'a> {
    /// A tier covers the weight
    Exact(&'t WeightTier<'a>),

    /// The weight is at or above every tier's upper bound; the highest tier is used
    Overflow(&'t WeightTier<'a>),

    /// The weight is below the lowest tier or inside a gap between tiers
    Uncovered,

    /// There are no tiers
    Empty,
}

impl<'a> TierMatch<'_, 'a> {
    /// The tier whose cost applies, if any.
    pub fn tier(&self) -> Option<&WeightTier<'a>> {
        match self {
            Self::Exact(tier) | Self::Overflow(tier) => Some(*tier),
            Self::Uncovered | Self::Empty => None,
        }
    }
}

/// Find the tier that prices `weight`.
pub fn select_tier<'t, 'a>(tiers: &'t [WeightTier<'a>], weight: Decimal) -> TierMatch<'t, 'a> {
    if let Some(tier) = tiers.iter().find(|tier| tier.covers(weight)) {
        return TierMatch::Exact(tier);
    }

    let Some(highest) = tiers.iter().max_by_key(|tier| tier.max_weight) else {
        return TierMatch::Empty;
    };

    if weight >= highest.max_weight {
        TierMatch::Overflow(highest)
    } else {
        TierMatch::Uncovered
    }
}
