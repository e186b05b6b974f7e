//! # Extractorエンドポイント
//!
//! ## API エンドポイント
//! - `GET /` / `GET /extract-asset` — アセット抽出（`?assetUrl=...`）
//! - `GET /health` — ヘルスチェック

pub mod extract_asset;
pub mod health;

pub use extract_asset::handle_extract_asset;
pub use health::{handle_health, handle_not_found};

use std::sync::Arc;

use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::config::AppState;

/// 全ルートを持つaxumルーターを構築する。
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/", get(handle_extract_asset))
        .route("/extract-asset", get(handle_extract_asset))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
