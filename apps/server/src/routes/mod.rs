//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//!
//! # Shifts
//! POST   /sessions                      - Open a shift
//! GET    /sessions                      - List shifts (admin)
//! GET    /sessions/active               - Caller's open shift
//! POST   /sessions/end                  - Close the caller's shift
//! GET    /sessions/{id}                 - Shift detail (admin)
//!
//! # Sales
//! POST   /transactions                  - Create a sale
//! GET    /transactions                  - List sales (non-admins see their own)
//! GET    /transactions/{id}             - Sale with line items
//! POST   /transactions/{id}/void        - Void a sale (admin)
//!
//! # Stock ledger
//! GET    /stock/{product_id}            - Live stock level
//! GET    /stock/{product_id}/movements  - Movement history
//! POST   /stock/restock                 - Goods received
//! POST   /stock/adjust                  - Signed correction
//! POST   /stock/set                     - Absolute count
//!
//! # Cash drawer
//! GET    /drawer                        - Balance and today's activity
//! GET    /drawer/movements              - Movement history
//! POST   /drawer/deposit                - Cash in
//! POST   /drawer/withdraw               - Cash out
//! POST   /drawer/adjust                 - Signed correction
//! POST   /drawer/set-balance            - Absolute count
//!
//! # Daily closure
//! POST   /closures                      - Close a business date (admin)
//! DELETE /closures/{id}                 - Reopen a date (admin)
//! GET    /closures/status?date=...      - Date status (admin)
//! ```
//!
//! Handlers stay thin: decode the request, call the engine, map the entity
//! to its wire view. Authorization lives in the engine.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use kasir_engine::Pos;

pub mod closures;
pub mod drawer;
pub mod sessions;
pub mod stock;
pub mod transactions;

/// Builds the application router around a [`Pos`] engine.
pub fn router(pos: Pos) -> Router {
    Router::new()
        .route("/health", get(health))
        // Shifts
        .route("/sessions", post(sessions::start).get(sessions::list))
        .route("/sessions/active", get(sessions::active))
        .route("/sessions/end", post(sessions::end))
        .route("/sessions/{id}", get(sessions::show))
        // Sales
        .route(
            "/transactions",
            post(transactions::create).get(transactions::list),
        )
        .route("/transactions/{id}", get(transactions::show))
        .route("/transactions/{id}/void", post(transactions::void))
        // Stock ledger
        .route("/stock/restock", post(stock::restock))
        .route("/stock/adjust", post(stock::adjust))
        .route("/stock/set", post(stock::set))
        .route("/stock/{product_id}", get(stock::level))
        .route("/stock/{product_id}/movements", get(stock::movements))
        // Cash drawer
        .route("/drawer", get(drawer::summary))
        .route("/drawer/movements", get(drawer::movements))
        .route("/drawer/deposit", post(drawer::deposit))
        .route("/drawer/withdraw", post(drawer::withdraw))
        .route("/drawer/adjust", post(drawer::adjust))
        .route("/drawer/set-balance", post(drawer::set_balance))
        // Daily closure
        .route("/closures", post(closures::close))
        .route("/closures/status", get(closures::status))
        .route("/closures/{id}", delete(closures::reopen))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pos)
}

/// Liveness check endpoint.
async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// Unit Tests
// =============================================================================
