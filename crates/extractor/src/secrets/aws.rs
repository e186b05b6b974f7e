//! # AWS Secrets Manager シークレットプロバイダー
//!
//! 固定のシークレットIDで `GetSecretValue` を呼び出し、
//! SecretString（JSON）から認証情報を取り出す。

use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use extradite_types::UploadCredentials;

use super::{parse_credentials, SecretProvider};
use crate::error::ExtractError;

/// AWS Secrets Managerによるシークレットプロバイダー。
pub struct AwsSecretsProvider {
    client: aws_sdk_secretsmanager::Client,
    /// シークレットID（例: "prod/extradite-lambda"）
    secret_id: String,
}

impl AwsSecretsProvider {
    /// 構築済みクライアントから作成する。
    pub fn new(client: aws_sdk_secretsmanager::Client, secret_id: String) -> Self {
        Self { client, secret_id }
    }

    /// 指定リージョンのデフォルト認証情報チェーンからクライアントを構築する。
    pub async fn from_region(region: &str, secret_id: String) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        tracing::info!(region, secret_id = %secret_id, "Secrets Managerクライアントを構築しました");
        Self::new(aws_sdk_secretsmanager::Client::new(&config), secret_id)
    }
}

#[async_trait::async_trait]
impl SecretProvider for AwsSecretsProvider {
    async fn fetch_upload_credentials(&self) -> Result<UploadCredentials, ExtractError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(&self.secret_id)
            .send()
            .await
            .map_err(|e| {
                ExtractError::Secret(format!(
                    "GetSecretValue失敗 ({}): {}",
                    self.secret_id,
                    DisplayErrorContext(&e)
                ))
            })?;

        let secret_string = output.secret_string().ok_or_else(|| {
            ExtractError::Secret(format!("SecretStringがありません ({})", self.secret_id))
        })?;

        parse_credentials(secret_string)
    }
}
