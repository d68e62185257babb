use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::models::Season;
use crate::state::AppState;
use crate::store::Select;

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "RG Family API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": "/api/rankings, /api/organization, /api/schedules, /api/signatures, /api/seasons/active",
                "vip": "/api/vip/lounge (signed in)",
                "auth": "/auth/callback, /auth/signout",
                "admin": "/admin, /admin/members, /admin/donations, /admin/schedules, /admin/signatures (admin roles)",
                "robots": "/robots.txt",
            }
        }
    }))
}

/// GET /health - liveness plus a cheap store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.count(Select::<Season>::new()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store.kind()
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "store unavailable",
                "code": "SERVICE_UNAVAILABLE",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
