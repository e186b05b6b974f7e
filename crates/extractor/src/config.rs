//! # Extractor設定・共有状態
//!
//! 環境変数からの設定読み込みとExtractorの共有状態の定義。

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::download::{Downloader, HttpDownloader};
use crate::filename::ExtensionFallback;
use crate::secrets::{EnvSecretProvider, SecretProvider};
use crate::uploader::cloudinary::DEFAULT_UPLOAD_PREFIX;
use crate::uploader::{CloudinaryUploader, MediaUploader, UploadOptions};

/// シークレットのデフォルトID
pub const DEFAULT_SECRET_ID: &str = "prod/extradite-lambda";

/// Secrets Managerのデフォルトリージョン
pub const DEFAULT_SECRETS_REGION: &str = "us-east-1";

/// 認証情報の取得元。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsSource {
    /// AWS Secrets Manager
    Aws,
    /// 環境変数（ローカル開発用）
    Env,
}

impl FromStr for SecretsSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(SecretsSource::Aws),
            "env" => Ok(SecretsSource::Env),
            other => Err(format!(
                "SECRETS_SOURCEは aws または env である必要があります: {other}"
            )),
        }
    }
}

/// Extractorの設定。
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// 待ち受けアドレス（サーバーモード）
    pub bind_addr: String,
    /// 一時ファイルを置くディレクトリ。リクエストごとにサブディレクトリを作る。
    pub work_dir: PathBuf,
    /// シークレットID
    pub secret_id: String,
    /// Secrets Managerのリージョン
    pub secrets_region: String,
    /// 認証情報の取得元
    pub secrets_source: SecretsSource,
    /// Cloudinary Upload APIのベースURL
    pub upload_prefix: String,
    /// アップロード時のリソース種別
    pub resource_type: String,
    /// アップロード先フォルダ
    pub upload_folder: Option<String>,
    /// 許可リスト外の拡張子の扱い
    pub extension_fallback: ExtensionFallback,
    /// ダウンロードのタイムアウト
    pub download_timeout: Duration,
    /// アップロードのタイムアウト
    pub upload_timeout: Duration,
    /// 取得するアセットの最大サイズ（バイト）
    pub max_asset_bytes: u64,
    /// 同名の部分ファイルがあれば続きから取得する。
    /// 一時ディレクトリはリクエストごとに新しく作るため、リクエストをまたいだ再開は起きない。
    pub resume_if_exists: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            work_dir: PathBuf::from("/tmp"),
            secret_id: DEFAULT_SECRET_ID.to_string(),
            secrets_region: DEFAULT_SECRETS_REGION.to_string(),
            secrets_source: SecretsSource::Aws,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            resource_type: "image".to_string(),
            upload_folder: None,
            extension_fallback: ExtensionFallback::Append,
            download_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(120),
            max_asset_bytes: 100 * 1024 * 1024, // 100MiB
            resume_if_exists: true,
        }
    }
}

/// 環境変数を読み、未設定（または空）ならNoneを返す。
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 環境変数をパースする。未設定ならデフォルト値。
fn env_parse<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{name}の値が不正です ({raw}): {e}")),
        None => Ok(default),
    }
}

impl ExtractorConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let timeout_secs: u64 =
            env_parse("DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout.as_secs())?;
        let upload_timeout_secs: u64 =
            env_parse("UPLOAD_TIMEOUT_SECS", defaults.upload_timeout.as_secs())?;

        Ok(Self {
            bind_addr: env_opt("BIND_ADDR").unwrap_or(defaults.bind_addr),
            work_dir: env_opt("WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            secret_id: env_opt("SECRET_ID").unwrap_or(defaults.secret_id),
            secrets_region: env_opt("SECRETS_REGION").unwrap_or(defaults.secrets_region),
            secrets_source: env_parse("SECRETS_SOURCE", defaults.secrets_source)?,
            upload_prefix: env_opt("CLOUDINARY_UPLOAD_PREFIX").unwrap_or(defaults.upload_prefix),
            resource_type: env_opt("CLOUDINARY_RESOURCE_TYPE").unwrap_or(defaults.resource_type),
            upload_folder: env_opt("CLOUDINARY_FOLDER"),
            extension_fallback: env_parse("EXTENSION_FALLBACK", defaults.extension_fallback)?,
            download_timeout: Duration::from_secs(timeout_secs),
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            max_asset_bytes: env_parse("MAX_ASSET_BYTES", defaults.max_asset_bytes)?,
            resume_if_exists: env_parse("RESUME_IF_EXISTS", defaults.resume_if_exists)?,
        })
    }

    /// アップロードオプション。元のファイル名の保持を常に要求する。
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            use_filename: true,
            folder: self.upload_folder.clone(),
            resource_type: self.resource_type.clone(),
        }
    }
}

/// Extractorの共有状態。
pub struct AppState {
    /// 設定
    pub config: ExtractorConfig,
    /// ダウンローダー（トレイトで抽象化）
    pub downloader: Box<dyn Downloader>,
    /// 認証情報の取得元（トレイトで抽象化）
    pub secrets: Box<dyn SecretProvider>,
    /// メディアホストへのアップローダー（トレイトで抽象化）
    pub uploader: Box<dyn MediaUploader>,
}

impl AppState {
    /// 設定から各実装を構築する。
    pub async fn from_config(config: ExtractorConfig) -> anyhow::Result<Self> {
        let download_client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .build()
            .context("ダウンロード用HTTPクライアントの構築に失敗")?;
        let downloader = HttpDownloader::new(
            download_client,
            config.extension_fallback,
            config.max_asset_bytes,
            config.resume_if_exists,
        );

        let secrets: Box<dyn SecretProvider> = match config.secrets_source {
            SecretsSource::Aws => aws_secrets(&config).await?,
            SecretsSource::Env => {
                tracing::warn!("環境変数から認証情報を読み込みます（開発環境用）");
                Box::new(EnvSecretProvider)
            }
        };

        let upload_client = reqwest::Client::builder()
            .timeout(config.upload_timeout)
            .build()
            .context("アップロード用HTTPクライアントの構築に失敗")?;
        let uploader = CloudinaryUploader::new(upload_client, &config.upload_prefix);

        Ok(Self {
            config,
            downloader: Box::new(downloader),
            secrets,
            uploader: Box::new(uploader),
        })
    }
}

#[cfg(feature = "vendor-aws")]
async fn aws_secrets(config: &ExtractorConfig) -> anyhow::Result<Box<dyn SecretProvider>> {
    let provider = crate::secrets::AwsSecretsProvider::from_region(
        &config.secrets_region,
        config.secret_id.clone(),
    )
    .await;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "vendor-aws"))]
async fn aws_secrets(_config: &ExtractorConfig) -> anyhow::Result<Box<dyn SecretProvider>> {
    anyhow::bail!("SECRETS_SOURCE=aws にはvendor-aws featureが必要です")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.secret_id, "prod/extradite-lambda");
        assert_eq!(config.secrets_region, "us-east-1");
        assert_eq!(config.work_dir, PathBuf::from("/tmp"));
        assert!(config.upload_prefix.starts_with("https://"));
        assert!(config.upload_options().use_filename);
        assert_eq!(config.upload_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_env_parse_reports_variable() {
        // 他のテストと衝突しない変数名を使う
        std::env::set_var("EXTRADITE_TEST_NUMBER", "not-a-number");
        let err = env_parse::<u64>("EXTRADITE_TEST_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("EXTRADITE_TEST_NUMBER"));

        std::env::set_var("EXTRADITE_TEST_NUMBER", "42");
        assert_eq!(env_parse::<u64>("EXTRADITE_TEST_NUMBER", 1).unwrap(), 42);

        std::env::remove_var("EXTRADITE_TEST_NUMBER_UNSET");
        assert_eq!(env_parse::<u64>("EXTRADITE_TEST_NUMBER_UNSET", 7).unwrap(), 7);
    }

    #[test]
    fn test_secrets_source_from_str() {
        assert_eq!("AWS".parse::<SecretsSource>(), Ok(SecretsSource::Aws));
        assert_eq!("env".parse::<SecretsSource>(), Ok(SecretsSource::Env));
        assert!("vault".parse::<SecretsSource>().is_err());
    }
}
