//! # GET /health
//!
//! ヘルスチェックと未定義ルートのハンドラ。

use axum::http::StatusCode;
use axum::Json;
use extradite_types::HealthResponse;

/// GET /health — ヘルスチェック。
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}

/// 未定義ルートは404をJSONで返す。
pub async fn handle_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "message": "The requested endpoint does not exist"
        })),
    )
}
