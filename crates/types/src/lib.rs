//! # Extradite 共有型定義
//!
//! アセット抽出関数のリクエスト・レスポンス・シークレットをRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - クエリパラメータ・シークレットのフィールド名は外部契約に合わせてcamelCase / 大文字スネークケース
//! - レスポンスのフィールド名はsnake_case

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// レスポンスメッセージ
// ---------------------------------------------------------------------------

/// `assetUrl` が欠落している場合のメッセージ
pub const MESSAGE_MISSING_ASSET_URL: &str = "Asset URL to extract missing!";

/// アップロード成功時のメッセージ（既存クライアントとの互換のため綴りは変更しない）
pub const MESSAGE_UPLOAD_SUCCESSFUL: &str = "Upload succesful";

/// アセットの取得・アップロードに失敗した場合のメッセージ
pub const MESSAGE_FETCH_FAILED: &str = "UNABLE TO FETCH TARGET ASSET";

/// ローカルファイル操作に失敗した場合のメッセージ
pub const MESSAGE_SAVE_FAILED: &str = "ERROR ON SAVE FILE OPERATION";

/// リクエスト処理（シークレット取得等）に失敗した場合のメッセージ
pub const MESSAGE_REQUEST_FAILED: &str = "ERROR ON REQUEST";

// ---------------------------------------------------------------------------
// リクエスト
// ---------------------------------------------------------------------------

/// 抽出リクエストのクエリパラメータ。
///
/// `assetUrl` は必須だが、欠落時に400を返すため `Option` で受ける。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetQuery {
    /// 抽出対象アセットのURL
    #[serde(rename = "assetUrl", default)]
    pub asset_url: Option<String>,
}

impl AssetQuery {
    /// 空白のみの値も欠落として扱い、有効なURL文字列だけを返す。
    pub fn asset_url(&self) -> Option<&str> {
        self.asset_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// レスポンス
// ---------------------------------------------------------------------------

/// 抽出エンドポイントのJSONレスポンス本体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// 結果メッセージ
    pub message: String,
    /// エラー理由（エラー時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// アップロードされたアセット（成功時のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<UploadedAsset>,
}

impl ExtractResponse {
    /// 成功レスポンスを構築する。
    pub fn uploaded(asset: UploadedAsset) -> Self {
        Self {
            message: MESSAGE_UPLOAD_SUCCESSFUL.to_string(),
            reason: None,
            asset: Some(asset),
        }
    }

    /// エラーレスポンスを構築する。
    pub fn error(message: &str, reason: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            reason,
            asset: None,
        }
    }
}

/// メディアホストへのアップロード結果のうち、呼び出し元に返すフィールド。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// メディアホスト上の公開ID
    pub public_id: String,
    /// HTTPS配信URL
    pub secure_url: String,
    /// HTTP配信URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// フォーマット（png, jpg等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// リソース種別（image, raw等）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// バイト数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// メディアホストが認識した元ファイル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

/// GET /health のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

// ---------------------------------------------------------------------------
// シークレット
// ---------------------------------------------------------------------------

/// シークレットストアに保存されたメディアホストの認証情報。
///
/// `Debug` 出力では `api_secret` を伏せる。
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadCredentials {
    /// Cloudinaryのクラウド名
    #[serde(rename = "CLOUDINARY_CLOUD")]
    pub cloud_name: String,
    /// APIキー
    #[serde(rename = "CLOUDINARY_API_KEY")]
    pub api_key: String,
    /// APIシークレット
    #[serde(rename = "CLOUDINARY_API_SECRET")]
    pub api_secret: String,
}

impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_query_treats_blank_as_missing() {
        let q: AssetQuery = serde_json::from_str(r#"{"assetUrl":"   "}"#).unwrap();
        assert_eq!(q.asset_url(), None);

        let q: AssetQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.asset_url(), None);

        let q: AssetQuery =
            serde_json::from_str(r#"{"assetUrl":" https://host/img.png "}"#).unwrap();
        assert_eq!(q.asset_url(), Some("https://host/img.png"));
    }

    /// エラーレスポンスにassetが、成功レスポンスにreasonが含まれないことを確認
    #[test]
    fn test_response_omits_absent_fields() {
        let err = ExtractResponse::error(MESSAGE_MISSING_ASSET_URL, None);
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v, serde_json::json!({"message": "Asset URL to extract missing!"}));

        let ok = ExtractResponse::uploaded(UploadedAsset {
            public_id: "img_abc".to_string(),
            secure_url: "https://res.example.com/img_abc.png".to_string(),
            url: None,
            format: Some("png".to_string()),
            resource_type: None,
            bytes: None,
            original_filename: None,
        });
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["message"], "Upload succesful");
        assert!(v.get("reason").is_none());
        assert_eq!(v["asset"]["public_id"], "img_abc");
    }

    #[test]
    fn test_credentials_parse_and_redact() {
        let creds: UploadCredentials = serde_json::from_str(
            r#"{"CLOUDINARY_CLOUD":"demo","CLOUDINARY_API_KEY":"123","CLOUDINARY_API_SECRET":"shh"}"#,
        )
        .unwrap();
        assert_eq!(creds.cloud_name, "demo");
        assert_eq!(creds.api_key, "123");
        assert_eq!(creds.api_secret, "shh");

        let debug = format!("{creds:?}");
        assert!(!debug.contains("shh"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_credentials_missing_field_is_error() {
        let result: Result<UploadCredentials, _> =
            serde_json::from_str(r#"{"CLOUDINARY_CLOUD":"demo","CLOUDINARY_API_KEY":"123"}"#);
        assert!(result.is_err());
    }
}
