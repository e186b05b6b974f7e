//! # GET /extract-asset
//!
//! リモートアセットをダウンロードし、メディアホストへ再アップロードする。
//! レスポンスはパイプライン全体の完了後に返し、実際の結果を反映する。

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use extradite_types::*;

use crate::config::AppState;
use crate::error::ExtractError;
use crate::pipeline;

/// GET /extract-asset?assetUrl=... — アセット抽出。
///
/// `assetUrl` が欠落・空の場合はダウンロードを試みずに400を返す。
/// クエリ文字列自体が解釈できない場合も同じJSON形式で400を返す。
pub async fn handle_extract_asset(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AssetQuery>, QueryRejection>,
) -> Result<Json<ExtractResponse>, ExtractError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "クエリ文字列を解釈できません");
        ExtractError::InvalidAssetUrl(rejection.body_text())
    })?;

    let Some(raw_url) = query.asset_url() else {
        tracing::warn!("assetUrlが指定されていないリクエストを拒否しました");
        return Err(ExtractError::MissingAssetUrl);
    };

    let url = pipeline::parse_asset_url(raw_url).inspect_err(|e| {
        tracing::warn!(asset_url = %raw_url, error = %e, "不正なassetUrlを拒否しました");
    })?;

    let asset = pipeline::extract_asset(&state, &url).await?;
    Ok(Json(ExtractResponse::uploaded(asset)))
}
