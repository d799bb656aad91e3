//! Checkout
//!
//! Ties the cart, the shipping calculator and the totals assembler together
//! and turns the result into an [`Order`]. Checkout only borrows its inputs,
//! so a single [`Checkout`] can serve concurrent requests.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::Cart,
    config::StoreConfig,
    orders::{
        CheckoutContext, Customer, Order, OrderError, OrderTotals, ShippingAddress, TotalsError,
        assemble_order,
    },
    shipping::{
        AreaId, MethodId, ShippingError, ShippingMethod, ShippingQuote, UnavailableMethod,
        compute_shipping_cost,
    },
};

/// Errors raised while checking out.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// A manual shipping fee was supplied for a storefront checkout.
    #[error("manual shipping fees are only accepted for manual orders")]
    ManualShippingNotAllowed,

    /// Totals submitted by the client differ from the recomputed ones.
    #[error("submitted {field} {submitted} does not match computed {expected}")]
    TotalsMismatch {
        /// First differing amount
        field: &'static str,
        /// Server-side value
        expected: String,
        /// Client-side value
        submitted: String,
    },

    /// Shipping could not be priced.
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// Totals could not be assembled.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// The order could not be created.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// How shipping is chosen for a checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum ShippingSelection<'a> {
    /// Price shipping with the calculator. Picks the given method, or the
    /// first priced option when none is given.
    Method(Option<MethodId>),

    /// Use a fee entered by an administrator, or the configured manual fee.
    Manual(Option<Money<'a, Currency>>),
}

/// Everything a checkout needs besides the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest<'a> {
    /// Where the order is being placed
    pub context: CheckoutContext,

    /// Who is ordering
    pub customer: Customer,

    /// Where the order ships to
    pub address: ShippingAddress,

    /// How shipping is chosen
    pub shipping: ShippingSelection<'a>,
}

/// Checkout service over a store configuration and its shipping methods.
#[derive(Debug, Clone, Copy)]
pub struct Checkout<'c, 'a> {
    config: &'c StoreConfig,
    methods: &'c [ShippingMethod<'a>],
}

impl<'c, 'a> Checkout<'c, 'a> {
    /// Create a checkout service.
    pub fn new(config: &'c StoreConfig, methods: &'c [ShippingMethod<'a>]) -> Self {
        Self { config, methods }
    }

    /// Store configuration in use
    pub fn config(&self) -> &StoreConfig {
        self.config
    }

    /// Price every eligible shipping method for `cart` to `area`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Shipping`] if no method serves the area or a
    /// cost could not be computed.
    pub fn quote(&self, cart: &Cart<'a>, area: &AreaId) -> Result<ShippingQuote<'a>, CheckoutError> {
        Ok(compute_shipping_cost(cart, area, self.methods)?)
    }

    /// Compute the totals a checkout would produce, along with the shipping
    /// method they were priced with.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::ManualShippingNotAllowed`]: a manual fee on a storefront checkout.
    /// - [`CheckoutError::Shipping`]: shipping could not be priced.
    /// - [`CheckoutError::Totals`]: totals could not be assembled.
    pub fn totals(
        &self,
        cart: &Cart<'a>,
        request: &CheckoutRequest<'a>,
    ) -> Result<(Option<MethodId>, OrderTotals<'a>), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (method, shipping_cost) = self.shipping_for(cart, request)?;
        let tax_rate = self.config.tax_rate(request.context);

        let totals = assemble_order(cart, shipping_cost, tax_rate)?;

        Ok((method, totals))
    }

    /// Place an order for `cart`. The cart is left as it is.
    ///
    /// # Errors
    ///
    /// Any error from [`Checkout::totals`], or [`CheckoutError::Order`] if
    /// the order could not be created.
    pub fn place_order(
        &self,
        cart: &Cart<'a>,
        request: CheckoutRequest<'a>,
    ) -> Result<Order<'a>, CheckoutError> {
        let (method, totals) = self.totals(cart, &request)?;

        let order = Order::place(
            request.context,
            request.customer,
            request.address,
            cart,
            method,
            totals,
        )?;

        Ok(order)
    }

    /// Recompute totals and compare them with totals submitted by a client.
    ///
    /// Returns the recomputed totals when every amount matches.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::TotalsMismatch`] naming the first amount that
    /// differs, or any error from [`Checkout::totals`].
    pub fn verify_submitted_totals(
        &self,
        cart: &Cart<'a>,
        request: &CheckoutRequest<'a>,
        submitted: &OrderTotals<'_>,
    ) -> Result<OrderTotals<'a>, CheckoutError> {
        let (_method, expected) = self.totals(cart, request)?;

        let amounts = [
            ("subtotal", expected.subtotal, submitted.subtotal),
            ("shipping", expected.shipping_cost, submitted.shipping_cost),
            ("tax", expected.tax, submitted.tax),
            ("total", expected.total, submitted.total),
        ];

        for (field, ours, theirs) in amounts {
            if ours != theirs {
                info!(field, expected = %ours, submitted = %theirs, "submitted totals rejected");

                return Err(CheckoutError::TotalsMismatch {
                    field,
                    expected: ours.to_string(),
                    submitted: theirs.to_string(),
                });
            }
        }

        Ok(expected)
    }

    fn shipping_for(
        &self,
        cart: &Cart<'a>,
        request: &CheckoutRequest<'a>,
    ) -> Result<(Option<MethodId>, Money<'a, Currency>), CheckoutError> {
        match (&request.shipping, request.context) {
            (ShippingSelection::Manual(_), CheckoutContext::Storefront) => {
                Err(CheckoutError::ManualShippingNotAllowed)
            }
            (ShippingSelection::Manual(fee), CheckoutContext::Manual) => {
                let fee = fee.unwrap_or(self.config.manual_shipping_fee);

                debug!(%fee, "manual shipping fee");

                Ok((None, fee))
            }
            (ShippingSelection::Method(method_id), _) => {
                let quote = self.quote(cart, &request.address.area)?;

                let option = match method_id {
                    Some(method_id) => quote.option(method_id)?,
                    None => quote.first().ok_or_else(|| {
                        quote.unavailable().first().map_or_else(
                            || ShippingError::NoEligibleShippingMethod(quote.destination().clone()),
                            UnavailableMethod::to_error,
                        )
                    })?,
                };

                debug!(method = %option.method_id, cost = %option.cost, "shipping selected");

                Ok((Some(option.method_id.clone()), option.cost))
            }
        }
    }
}
