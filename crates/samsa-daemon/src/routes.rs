//! Axum router and all HTTP handlers for samsa-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Tests compose the bare router directly.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use samsa_orders::{render_summary, OrderRequest, PendingOrder, ValidationError};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::{
    api_types::{
        ErrorResponse, HealthResponse, OrderAcceptedResponse, ProbeResponse, MISSING_FIELDS,
        ORDER_ACCEPTED, PROBE_FAILED, PROBE_SENT, PROBE_TEXT,
    },
    state::AppState,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Anything that is not an API route is served from the static directory,
/// and paths with no matching file get `index.html` (single-page app).
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let spa = ServeDir::new(&state.static_dir).fallback(ServeFile::new(state.index_html()));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/order", post(create_order))
        .route("/api/test-telegram", get(test_telegram))
        .fallback_service(spa)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /api/order
// ---------------------------------------------------------------------------

/// Accept an order.
///
/// Only validation can fail the request. Once it passes, the notification
/// outcome is recorded on the order and a storage failure is logged, but the
/// customer is always told the order was accepted.
pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> Response {
    let validated = match body
        .map_err(|rejection| ValidationError::Malformed(rejection.body_text()))
        .and_then(|Json(req)| req.validate())
    {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "order rejected");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: MISSING_FIELDS.to_string(),
                }),
            )
                .into_response();
        }
    };

    let pending = PendingOrder::issue(validated);
    let order_id = pending.order_id;

    let summary = render_summary(&pending);
    let telegram_sent = st.notifier.notify(&summary).await;

    let order = pending.into_order(telegram_sent);
    if let Err(err) = st.orders.append(&order).await {
        error!(order_id, error = %err, "error saving order to file");
    }

    info!(
        order_id,
        items = order.items.len(),
        telegram_sent,
        channel = st.notifier.channel(),
        "order accepted"
    );

    (
        StatusCode::OK,
        Json(OrderAcceptedResponse {
            success: true,
            message: ORDER_ACCEPTED.to_string(),
            order_id,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /api/test-telegram
// ---------------------------------------------------------------------------

/// Operator probe: push a fixed message through the notifier.
pub(crate) async fn test_telegram(State(st): State<Arc<AppState>>) -> Response {
    let ok = st.notifier.notify(PROBE_TEXT).await;
    info!(ok, channel = st.notifier.channel(), "test-telegram");

    let (status, message) = if ok {
        (StatusCode::OK, PROBE_SENT)
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, PROBE_FAILED)
    };

    (
        status,
        Json(ProbeResponse {
            ok,
            message: message.to_string(),
        }),
    )
        .into_response()
}
