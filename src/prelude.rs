//! Cartwright prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartAction, CartError, CartLine,
        selection::{SelectionError, check_selection},
    },
    checkout::{Checkout, CheckoutError, CheckoutRequest, ShippingSelection},
    config::StoreConfig,
    fixtures::{Catalog, FixtureError},
    orders::{
        CheckoutContext, Customer, Order, OrderBook, OrderError, OrderLine, OrderStatus,
        OrderTotals, PaymentStatus, ShippingAddress, TotalsError, assemble_order,
    },
    pricing::{PricingError, line_total, resolve_unit_price, resolve_weight},
    products::{Product, ProductError, ProductId, ProductKey, Variation, VariationId},
    receipt::ReceiptError,
    shipping::{
        AreaId, Eligibility, MethodId, ShippingArea, ShippingError, ShippingMethod, ShippingOption,
        ShippingQuote, ShippingRate, WeightTier, compute_shipping_cost,
    },
    tax::{TaxError, percent_of_minor},
};
