//! Order Book

use rustc_hash::FxHashMap;
use tracing::info;
use uuid::Uuid;

use super::{Order, OrderError, OrderStatus, PaymentStatus};

/// In-memory order store.
///
/// Orders are kept in placement order. There is no delete; cancelled orders
/// stay in the book.
#[derive(Debug, Default)]
pub struct OrderBook<'a> {
    orders: FxHashMap<Uuid, Order<'a>>,
    placed: Vec<Uuid>,
}

impl<'a> OrderBook<'a> {
    /// Create an empty order book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a newly placed order and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Duplicate`] if an order with the same identifier
    /// is already stored.
    pub fn insert(&mut self, order: Order<'a>) -> Result<Uuid, OrderError> {
        let id = order.id();

        if self.orders.contains_key(&id) {
            return Err(OrderError::Duplicate(id));
        }

        self.orders.insert(id, order);
        self.placed.push(id);

        info!(order = %id, stored = self.placed.len(), "order stored");

        Ok(id)
    }

    /// Look up an order.
    pub fn get(&self, id: Uuid) -> Option<&Order<'a>> {
        self.orders.get(&id)
    }

    /// Change the fulfilment status of a stored order.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`]: no order with this identifier.
    /// - [`OrderError::InvalidTransition`]: the status change is not allowed.
    pub fn update_status(&mut self, id: Uuid, status: OrderStatus) -> Result<&Order<'a>, OrderError> {
        let order = self.orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;

        order.advance_status(status)?;

        Ok(&*order)
    }

    /// Change the payment status of a stored order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if no order has this identifier.
    pub fn update_payment_status(
        &mut self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<&Order<'a>, OrderError> {
        let order = self.orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;

        order.set_payment_status(payment_status);

        Ok(&*order)
    }

    /// Orders in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Order<'a>> {
        self.placed.iter().filter_map(|id| self.orders.get(id))
    }

    /// Orders with the given status, in placement order.
    pub fn by_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order<'a>> {
        self.iter().filter(move |order| order.status() == status)
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether the book holds no orders.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}
