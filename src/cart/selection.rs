//! Variation selection checks for add-to-cart forms.

use thiserror::Error;

use crate::products::{Product, ProductId, VariationId};

/// Problems with a product/variation selection.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    /// The product has variations but none was chosen.
    #[error("product {0} requires a variation to be selected")]
    MissingVariationSelection(ProductId),

    /// The chosen variation does not belong to the product.
    #[error("product {0} has no variation {1}")]
    UnknownVariation(ProductId, VariationId),
}

/// Check that a selection is complete enough to add to the cart.
///
/// Products with variations need exactly one of them selected. Products
/// without variations accept only an empty selection.
///
/// # Errors
///
/// Returns a [`SelectionError`] describing what the shopper has to fix.
pub fn check_selection(
    product: &Product<'_>,
    variation: Option<&VariationId>,
) -> Result<(), SelectionError> {
    match variation {
        None if product.has_variations() => {
            Err(SelectionError::MissingVariationSelection(product.id.clone()))
        }
        None => Ok(()),
        Some(id) if product.variation(id).is_some() => Ok(()),
        Some(id) => Err(SelectionError::UnknownVariation(
            product.id.clone(),
            id.clone(),
        )),
    }
}
