//! Orders
//!
//! An order freezes the cart, the shipping choice and the totals at checkout
//! time. Afterwards only its status and payment status change, and only
//! through explicit admin actions.

use std::fmt;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartLine},
    pricing::PricingError,
    products::{ProductId, VariationId},
    shipping::{AreaId, MethodId},
};

pub mod book;
pub mod totals;

pub use book::OrderBook;
pub use totals::{OrderTotals, TotalsError, assemble_order};

/// Errors related to order creation and lifecycle.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Orders need at least one line.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// The requested status change is not allowed.
    #[error("order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Order identifier
        id: Uuid,
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// No order with this identifier is stored.
    #[error("order {0} not found")]
    NotFound(Uuid),

    /// An order with this identifier is already stored.
    #[error("order {0} already exists")]
    Duplicate(Uuid),

    /// The totals were not computed from the lines being ordered.
    #[error("order subtotal {totals} does not match line totals {lines}")]
    SubtotalMismatch {
        /// Sum of the order line totals, formatted
        lines: String,
        /// Subtotal carried by the totals, formatted
        totals: String,
    },

    /// Line totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Where an order was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutContext {
    /// Customer checkout on the storefront
    Storefront,

    /// Order keyed in by an administrator
    Manual,
}

impl fmt::Display for CheckoutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storefront => f.write_str("storefront"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Fulfilment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Placed, not yet worked on
    #[default]
    Pending,

    /// Being prepared
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Received by the customer
    Delivered,

    /// Will not be fulfilled
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order may move from this status to `next`.
    ///
    /// Orders move forward one step at a time, and may be cancelled from
    /// any status that is not terminal.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        ) || (next == Self::Cancelled && !self.is_terminal())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };

        f.write_str(label)
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Not paid yet
    #[default]
    Unpaid,

    /// Paid in full
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => f.write_str("Unpaid"),
            Self::Paid => f.write_str("Paid"),
        }
    }
}

/// Customer identity and contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone: Option<String>,
}

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    /// First address line
    pub line1: String,

    /// Second address line
    pub line2: Option<String>,

    /// City or town
    pub city: String,

    /// Postal code
    pub postcode: String,

    /// Shipping area the address belongs to
    pub area: AreaId,
}

/// Variation labels captured on an order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderVariation {
    /// Variation identifier
    pub id: VariationId,

    /// Type label
    pub kind: String,

    /// Value label
    pub value: String,
}

/// A cart line frozen at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine<'a> {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name at checkout
    pub product_name: String,

    /// Selected variation at checkout
    pub variation: Option<OrderVariation>,

    /// Model number at checkout
    pub model_number: Option<String>,

    /// Unit price charged
    pub unit_price: Money<'a, Currency>,

    /// Units ordered
    pub quantity: u32,

    /// Unit price × quantity
    pub total: Money<'a, Currency>,
}

impl<'a> TryFrom<&CartLine<'a>> for OrderLine<'a> {
    type Error = PricingError;

    fn try_from(line: &CartLine<'a>) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: line.product_id().clone(),
            product_name: line.product().name.clone(),
            variation: line.variation().map(|variation| OrderVariation {
                id: variation.id.clone(),
                kind: variation.kind.clone(),
                value: variation.value.clone(),
            }),
            model_number: line.model_number().map(str::to_string),
            unit_price: line.unit_price(),
            quantity: line.quantity(),
            total: line.total()?,
        })
    }
}

/// Order
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    id: Uuid,
    placed_at: Timestamp,
    context: CheckoutContext,
    customer: Customer,
    shipping_address: ShippingAddress,
    lines: Vec<OrderLine<'a>>,
    shipping_method: Option<MethodId>,
    totals: OrderTotals<'a>,
    status: OrderStatus,
    payment_status: PaymentStatus,
}

impl<'a> Order<'a> {
    /// Snapshot a cart into a new pending, unpaid order.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no lines.
    /// - [`OrderError::Pricing`]: a line total could not be computed.
    /// - [`OrderError::SubtotalMismatch`]: `totals` were computed for other lines.
    pub(crate) fn place(
        context: CheckoutContext,
        customer: Customer,
        shipping_address: ShippingAddress,
        cart: &Cart<'a>,
        shipping_method: Option<MethodId>,
        totals: OrderTotals<'a>,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let lines = cart
            .iter()
            .map(OrderLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let lines_subtotal = lines.iter().try_fold(
            Money::from_minor(0, cart.currency()),
            |acc, line| -> Result<_, PricingError> { Ok(acc.add(line.total)?) },
        )?;

        if lines_subtotal != totals.subtotal {
            return Err(OrderError::SubtotalMismatch {
                lines: lines_subtotal.to_string(),
                totals: totals.subtotal.to_string(),
            });
        }

        let order = Self {
            id: Uuid::new_v4(),
            placed_at: Timestamp::now(),
            context,
            customer,
            shipping_address,
            lines,
            shipping_method,
            totals,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
        };

        info!(order = %order.id, %context, total = %order.totals.total, "order placed");

        Ok(order)
    }

    /// Order identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Where the order was created
    pub fn context(&self) -> CheckoutContext {
        self.context
    }

    /// Customer details
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Delivery address
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Lines as they were at checkout
    pub fn lines(&self) -> &[OrderLine<'a>] {
        &self.lines
    }

    /// Shipping method chosen at checkout; `None` for a manually entered fee
    pub fn shipping_method(&self) -> Option<&MethodId> {
        self.shipping_method.as_ref()
    }

    /// Totals frozen at checkout
    pub fn totals(&self) -> &OrderTotals<'a> {
        &self.totals
    }

    /// Fulfilment status
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Payment status
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Move the order to a new fulfilment status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] if the move is not allowed; the
    /// status is left unchanged.
    pub fn advance_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }

        info!(order = %self.id, from = %self.status, to = %next, "order status changed");

        self.status = next;

        Ok(())
    }

    /// Record a payment status change.
    pub fn set_payment_status(&mut self, payment_status: PaymentStatus) {
        info!(order = %self.id, payment = %payment_status, "order payment status changed");

        self.payment_status = payment_status;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;
    use crate::products::{Product, Variation};

    pub(crate) fn customer() -> Customer {
        Customer {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
        }
    }

    pub(crate) fn address(area: &str) -> ShippingAddress {
        ShippingAddress {
            line1: "12 Analytical Row".to_string(),
            line2: None,
            city: "London".to_string(),
            postcode: "N1 9GU".to_string(),
            area: area.into(),
        }
    }

    fn placed_order() -> Result<Order<'static>, Box<dyn std::error::Error>> {
        let desk = Product::new("desk", "Writing Desk", Money::from_minor(40_000, USD)).with_variation(
            Variation::new("oak", "Finish", "Oak").with_price(Money::from_minor(45_000, USD)),
        );

        let mut cart = Cart::new(USD);
        cart.add_line(&desk, Some(&"oak".into()))?;
        cart.add_line(&desk, Some(&"oak".into()))?;

        let totals = assemble_order(&cart, Money::from_minor(5_000, USD), Percentage::from(0.0))?;

        Ok(Order::place(
            CheckoutContext::Storefront,
            customer(),
            address("metro"),
            &cart,
            Some("standard".into()),
            totals,
        )?)
    }

    #[test]
    fn place_snapshots_lines_and_starts_pending_unpaid() -> TestResult {
        let order = placed_order()?;

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Unpaid);
        assert_eq!(order.lines().len(), 1);

        let line = order.lines().first().ok_or("missing line")?;
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Money::from_minor(45_000, USD));
        assert_eq!(line.total, Money::from_minor(90_000, USD));
        assert_eq!(
            line.variation.as_ref().map(|variation| variation.value.as_str()),
            Some("Oak")
        );
        assert_eq!(order.totals().total, Money::from_minor(95_000, USD));

        Ok(())
    }

    #[test]
    fn place_rejects_empty_cart() -> TestResult {
        let cart = Cart::new(USD);
        let totals = assemble_order(&cart, Money::from_minor(0, USD), Percentage::from(0.0))?;

        let result = Order::place(
            CheckoutContext::Manual,
            customer(),
            address("metro"),
            &cart,
            None,
            totals,
        );

        assert_eq!(result, Err(OrderError::EmptyCart));

        Ok(())
    }

    #[test]
    fn place_rejects_totals_from_another_cart() -> TestResult {
        let stool = Product::new("stool", "Stool", Money::from_minor(6_000, USD));

        let mut priced = Cart::new(USD);
        priced.add_line(&stool, None)?;

        let mut ordered = priced.clone();
        ordered.add_line(&stool, None)?;

        let totals = assemble_order(&priced, Money::from_minor(1_000, USD), Percentage::from(0.0))?;

        let result = Order::place(
            CheckoutContext::Storefront,
            customer(),
            address("metro"),
            &ordered,
            None,
            totals,
        );

        assert_eq!(
            result,
            Err(OrderError::SubtotalMismatch {
                lines: Money::from_minor(12_000, USD).to_string(),
                totals: Money::from_minor(6_000, USD).to_string(),
            })
        );

        Ok(())
    }

    #[test]
    fn status_moves_forward_to_delivered() -> TestResult {
        let mut order = placed_order()?;

        order.advance_status(OrderStatus::Processing)?;
        order.advance_status(OrderStatus::Shipped)?;
        order.advance_status(OrderStatus::Delivered)?;

        assert_eq!(order.status(), OrderStatus::Delivered);

        Ok(())
    }

    #[test]
    fn status_cannot_skip_steps() -> TestResult {
        let mut order = placed_order()?;

        let result = order.advance_status(OrderStatus::Shipped);

        assert_eq!(
            result,
            Err(OrderError::InvalidTransition {
                id: order.id(),
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        );
        assert_eq!(order.status(), OrderStatus::Pending);

        Ok(())
    }

    #[test]
    fn cancel_allowed_until_terminal() -> TestResult {
        let mut order = placed_order()?;
        order.advance_status(OrderStatus::Processing)?;
        order.advance_status(OrderStatus::Cancelled)?;

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.advance_status(OrderStatus::Processing).is_err());
        assert!(order.advance_status(OrderStatus::Cancelled).is_err());

        Ok(())
    }

    #[test]
    fn delivered_orders_cannot_be_cancelled() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn payment_status_is_independent_of_fulfilment() -> TestResult {
        let mut order = placed_order()?;

        order.set_payment_status(PaymentStatus::Paid);

        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert_eq!(order.status(), OrderStatus::Pending);

        Ok(())
    }
}
