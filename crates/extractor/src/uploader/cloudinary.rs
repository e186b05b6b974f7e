//! # Cloudinary アップローダー
//!
//! Upload APIへの署名付きアップロード。
//! エンドポイント: `{upload_prefix}/v1_1/{cloud_name}/{resource_type}/upload`

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use extradite_types::{UploadCredentials, UploadedAsset};
use reqwest::multipart::{Form, Part};
use sha1::{Digest, Sha1};

use super::{MediaUploader, UploadOptions};
use crate::download::DownloadedAsset;
use crate::error::ExtractError;

/// セキュア（HTTPS）なUpload APIのデフォルトプレフィックス。
pub const DEFAULT_UPLOAD_PREFIX: &str = "https://api.cloudinary.com";

/// CloudinaryのUpload APIを使うアップローダー。
pub struct CloudinaryUploader {
    client: reqwest::Client,
    /// Upload APIのベースURL（末尾スラッシュなし）
    upload_prefix: String,
}

impl CloudinaryUploader {
    pub fn new(client: reqwest::Client, upload_prefix: &str) -> Self {
        Self {
            client,
            upload_prefix: upload_prefix.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, cloud_name: &str, resource_type: &str) -> String {
        format!(
            "{}/v1_1/{cloud_name}/{resource_type}/upload",
            self.upload_prefix
        )
    }
}

/// リクエスト署名を計算する。
///
/// 空値を除くパラメータをキー順に `k=v` で `&` 連結し、
/// APIシークレットを末尾に付けたSHA-1の16進表現。
pub fn api_sign_request(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Upload APIのエラーレスポンス `{"error": {"message": ...}}`。
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(serde::Deserialize)]
struct ApiErrorMessage {
    message: String,
}

#[async_trait::async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        asset: &DownloadedAsset,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ExtractError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ExtractError::Internal(format!("時刻取得失敗: {e}")))?
            .as_secs();

        // 署名対象パラメータ（file, api_key, resource_type は署名に含めない）
        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.to_string());
        if options.use_filename {
            params.insert("use_filename", "true".to_string());
        }
        if let Some(folder) = &options.folder {
            params.insert("folder", folder.clone());
        }
        let signature = api_sign_request(&params, &credentials.api_secret);

        let bytes = tokio::fs::read(&asset.path).await.map_err(|e| {
            ExtractError::Storage(format!("{}: {e}", asset.path.display()))
        })?;
        let file_part = Part::bytes(bytes).file_name(asset.file_name.clone());

        let mut form = Form::new()
            .part("file", file_part)
            .text("api_key", credentials.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = self.endpoint(&credentials.cloud_name, &options.resource_type);
        tracing::info!(
            cloud_name = %credentials.cloud_name,
            file_name = %asset.file_name,
            bytes = asset.bytes,
            "Cloudinaryへアップロードします"
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractError::Upload(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::Upload(format!("レスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ExtractError::Upload(format!(
                "Cloudinaryがエラーを返しました: HTTP {status} - {detail}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ExtractError::Upload(format!("レスポンスのパースに失敗: {e}")))
    }
}
