//! samsa-orders
//!
//! Order intake domain: the request shape posted by the storefront, its
//! presence-only validation, the persisted [`Order`] record, the Telegram
//! summary text, and the JSON-array [`OrderLog`] file.
//!
//! This crate performs no network I/O. The daemon wires it to the notifier.

pub mod lenient;
pub mod log;
pub mod order;
pub mod summary;

pub use log::{OrderLog, PersistenceError};
pub use order::{
    format_order_date, generate_order_id, Customer, Order, OrderItem, OrderRequest, PendingOrder,
    ValidatedOrder, ValidationError, ORDER_ID_END, ORDER_ID_START,
};
pub use summary::{format_amount, render_summary};
