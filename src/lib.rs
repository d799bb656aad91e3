//! Cartwright
//!
//! Cartwright is the checkout core of a furniture storefront: it resolves
//! product and variation prices, keeps the cart, prices shipping per area and
//! weight, and freezes the resulting totals into orders.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod shipping;
pub mod tax;
