use axum::Json;

use warbler_shared::types::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        "warbler-web",
        env!("CARGO_PKG_VERSION"),
    ))
}
