//! # 環境変数シークレットプロバイダー
//!
//! ローカル開発用。シークレットストアと同名の環境変数から認証情報を読み込む。

use extradite_types::UploadCredentials;

use super::SecretProvider;
use crate::error::ExtractError;

/// 環境変数 `CLOUDINARY_CLOUD` / `CLOUDINARY_API_KEY` / `CLOUDINARY_API_SECRET`
/// から認証情報を読み込むプロバイダー。
#[derive(Debug, Default)]
pub struct EnvSecretProvider;

fn required(name: &str) -> Result<String, ExtractError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ExtractError::Secret(format!("{name}が設定されていません")))
}

#[async_trait::async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn fetch_upload_credentials(&self) -> Result<UploadCredentials, ExtractError> {
        Ok(UploadCredentials {
            cloud_name: required("CLOUDINARY_CLOUD")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
        })
    }
}
