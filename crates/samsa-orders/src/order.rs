//! Order request, validation and the persisted order record.
//!
//! Lifecycle of one submission:
//!
//! ```text
//! OrderRequest --validate()--> ValidatedOrder --PendingOrder::issue()--> PendingOrder
//!      (raw JSON body)          (required fields present)   (id + date assigned)
//!
//! PendingOrder --into_order(telegram_sent)--> Order   (immutable, persisted once)
//! ```

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::lenient;

/// Smallest order id handed out.
pub const ORDER_ID_START: u32 = 1000;
/// Order ids are drawn from `ORDER_ID_START..ORDER_ID_END` (end exclusive,
/// so 9999 itself is never issued).
pub const ORDER_ID_END: u32 = 9999;

// ---------------------------------------------------------------------------
// Wire / disk types
// ---------------------------------------------------------------------------

/// One line of the basket.
///
/// `quantity` and `price` accept numbers or numeric strings; anything else
/// reads as 0. Keys the storefront adds beyond these three (`id`, `image`,
/// ...) are carried through to the order log unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub name: String,
    #[serde(default, with = "amount")]
    pub quantity: f64,
    #[serde(default, with = "amount")]
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            price,
            extra: Map::new(),
        }
    }

    /// `price × quantity`; not rounded.
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of `POST /api/order` exactly as the storefront sends it.
///
/// Every field is optional at the decoding stage so that a missing field
/// becomes a [`ValidationError`] instead of a decoder rejection. Scalars are
/// decoded leniently: a numeric `phone` or a string `total` is still an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: Option<f64>,
}

/// An accepted order as it is stored in the order log.
///
/// Field names are camelCase on disk so logs written by earlier deployments
/// stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: u32,
    pub date: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    #[serde(with = "amount")]
    pub total: f64,
    pub telegram_sent: bool,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("order has no items")]
    EmptyItems,
    #[error("malformed order body: {0}")]
    Malformed(String),
}

/// A request whose required fields are all present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    /// Caller-supplied; not checked against the items. Absent means 0.
    pub total: f64,
}

impl OrderRequest {
    /// Presence checks only: `name`, `phone` and a non-empty `items` list.
    /// Empty strings count as missing.
    pub fn validate(self) -> Result<ValidatedOrder, ValidationError> {
        let name = required(self.name, "name")?;
        let phone = required(self.phone, "phone")?;
        let items = match self.items {
            None => return Err(ValidationError::MissingField("items")),
            Some(items) if items.is_empty() => return Err(ValidationError::EmptyItems),
            Some(items) => items,
        };

        Ok(ValidatedOrder {
            customer: Customer {
                name,
                phone,
                address: self.address,
                comment: self.comment,
            },
            items,
            total: self.total.unwrap_or(0.0),
        })
    }
}

fn required(v: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match v {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::MissingField(field)),
    }
}

// ---------------------------------------------------------------------------
// Id + timestamp
// ---------------------------------------------------------------------------

/// Uniform in `ORDER_ID_START..ORDER_ID_END`. Not unique: two orders may share an id.
pub fn generate_order_id<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(ORDER_ID_START..ORDER_ID_END)
}

/// `DD.MM.YYYY, HH:MM:SS`, the ru-RU locale rendering the storefront owners read.
pub fn format_order_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d.%m.%Y, %H:%M:%S").to_string()
}

/// A validated order that has been given its id and date but whose
/// notification outcome is not known yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub order_id: u32,
    pub date: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total: f64,
}

impl PendingOrder {
    /// Assign a random id and the current local time.
    pub fn issue(validated: ValidatedOrder) -> Self {
        let order_id = generate_order_id(&mut rand::thread_rng());
        Self::with_id_and_date(validated, order_id, format_order_date(&Local::now()))
    }

    pub fn with_id_and_date(validated: ValidatedOrder, order_id: u32, date: String) -> Self {
        Self {
            order_id,
            date,
            customer: validated.customer,
            items: validated.items,
            total: validated.total,
        }
    }

    /// Freeze into the persisted record.
    pub fn into_order(self, telegram_sent: bool) -> Order {
        Order {
            order_id: self.order_id,
            date: self.date,
            customer: self.customer,
            items: self.items,
            total: self.total,
            telegram_sent,
        }
    }
}

// ---------------------------------------------------------------------------
// Amount encoding
// ---------------------------------------------------------------------------

/// Integral amounts are written as JSON integers (`10`, not `10.0`), matching
/// the files the storefront backend has always produced.
mod amount {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        match crate::summary::integral(*v) {
            Some(i) => s.serialize_i64(i),
            None => s.serialize_f64(*v),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        crate::lenient::number_or_zero(d)
    }
}
