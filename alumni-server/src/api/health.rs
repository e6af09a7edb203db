//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// `db` reports whether the connection cache could hand out a pool; a failed
/// check leaves the cache empty so the next check tries again.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = match state.db.ensure_connected().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unavailable");
            false
        }
    };
    let status = if db_ok { "ok" } else { "degraded" };
    Json(serde_json::json!({
        "status": status,
        "db": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
