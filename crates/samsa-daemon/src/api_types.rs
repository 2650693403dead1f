//! Request and response types for all samsa-daemon HTTP endpoints.
//!
//! The order request body itself is [`samsa_orders::OrderRequest`]. These types
//! are `Serialize + Deserialize` so tests can decode what Axum encodes.

use serde::{Deserialize, Serialize};

/// Body of every 400 from `POST /api/order`.
pub const MISSING_FIELDS: &str = "Missing required fields";

/// Confirmation shown to the customer once an order passes validation.
pub const ORDER_ACCEPTED: &str = "Заказ принят, мы свяжемся с вами";

/// Text sent by the Telegram probe.
pub const PROBE_TEXT: &str = "✅ Тест: Telegram работает";
pub const PROBE_SENT: &str = "Тестовое сообщение отправлено";
pub const PROBE_FAILED: &str = "Ошибка при отправке. Проверьте ENV.";

// ---------------------------------------------------------------------------
// /api/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// /api/order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAcceptedResponse {
    pub success: bool,
    pub message: String,
    pub order_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// /api/test-telegram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub ok: bool,
    pub message: String,
}
