use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::store::Store;
use crate::AppState;

/// Health check endpoint
///
/// Reports process liveness and store connectivity for load balancers and
/// monitoring.
pub async fn health_check<S: Store>(State(state): State<AppState<S>>) -> Json<Value> {
    let db_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!("Store health check failed: {:?}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": if db_status == "connected" { "healthy" } else { "unhealthy" },
        "database": db_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
