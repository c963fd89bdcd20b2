use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health — reports store and session-cache reachability.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let store_reachable = state.store.list_active_tenants().is_ok();

    Json(json!({
        "status": if store_reachable { "ok" } else { "degraded" },
        "store_reachable": store_reachable,
        // The session cache is an in-process DashMap — it has no external
        // dependency to go unreachable, so it's reported unconditionally.
        "session_cache_reachable": true,
    }))
}
