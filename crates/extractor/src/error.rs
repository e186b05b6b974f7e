//! # Extractor エラー型
//!
//! 全エンドポイントで共通のエラー型。
//! 呼び出し元にはJSON本体 `{message, reason}` として返却する。

use axum::http::StatusCode;
use axum::Json;
use extradite_types::*;

/// Extractorエラー型。
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// `assetUrl` クエリパラメータが欠落
    #[error("assetUrlが指定されていません")]
    MissingAssetUrl,
    /// `assetUrl` がhttp(s)の絶対URLでない
    #[error("不正なassetUrl: {0}")]
    InvalidAssetUrl(String),
    /// アセットのダウンロードに失敗
    #[error("アセットのダウンロードに失敗: {0}")]
    Download(String),
    /// ローカルファイル操作に失敗
    #[error("ローカルファイル操作に失敗: {0}")]
    Storage(String),
    /// シークレット取得に失敗
    #[error("シークレット取得に失敗: {0}")]
    Secret(String),
    /// メディアホストへのアップロードに失敗
    #[error("アップロードに失敗: {0}")]
    Upload(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl ExtractError {
    /// HTTPステータスコード。
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::MissingAssetUrl | ExtractError::InvalidAssetUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            ExtractError::Download(_) | ExtractError::Upload(_) => StatusCode::BAD_GATEWAY,
            ExtractError::Storage(_) | ExtractError::Secret(_) | ExtractError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// レスポンス本体の `message`。外部契約の固定文字列。
    pub fn message(&self) -> &'static str {
        match self {
            ExtractError::MissingAssetUrl | ExtractError::InvalidAssetUrl(_) => {
                MESSAGE_MISSING_ASSET_URL
            }
            ExtractError::Download(_) | ExtractError::Upload(_) => MESSAGE_FETCH_FAILED,
            ExtractError::Storage(_) => MESSAGE_SAVE_FAILED,
            ExtractError::Secret(_) | ExtractError::Internal(_) => MESSAGE_REQUEST_FAILED,
        }
    }

    /// レスポンス本体を構築する。欠落エラーには `reason` を付けない。
    pub fn to_body(&self) -> ExtractResponse {
        let reason = match self {
            ExtractError::MissingAssetUrl => None,
            other => Some(other.to_string()),
        };
        ExtractResponse::error(self.message(), reason)
    }
}

impl axum::response::IntoResponse for ExtractError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset_url_body() {
        let err = ExtractError::MissingAssetUrl;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.to_body();
        assert_eq!(body.message, "Asset URL to extract missing!");
        assert!(body.reason.is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ExtractError::Download("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ExtractError::Upload("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ExtractError::Secret("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExtractError::Storage("x".into()).message(),
            "ERROR ON SAVE FILE OPERATION"
        );
        assert_eq!(ExtractError::Internal("x".into()).message(), "ERROR ON REQUEST");
    }

    #[test]
    fn test_reason_carries_detail() {
        let body = ExtractError::Secret("SecretStringが空です".into()).to_body();
        assert_eq!(body.message, "ERROR ON REQUEST");
        assert!(body.reason.unwrap().contains("SecretStringが空です"));
    }
}
