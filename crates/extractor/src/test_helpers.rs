//! # テスト用共通ヘルパー
//!
//! モックサーバー、モック実装、一時ディレクトリ。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use extradite_types::{UploadCredentials, UploadedAsset};

use crate::config::{AppState, ExtractorConfig};
use crate::download::{DownloadedAsset, HttpDownloader};
use crate::error::ExtractError;
use crate::filename::ExtensionFallback;
use crate::secrets::SecretProvider;
use crate::uploader::{MediaUploader, UploadOptions};

/// テスト用アセットの内容
pub const ASSET_BYTES: &[u8] = b"\x89PNG\r\n\x1a\ntest-asset";

/// テスト用モックHTTPサーバーを起動し、ポート番号を返す。
pub async fn start_mock_server(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// `/img.png` で固定データを返すアセットサーバーを起動する。
/// `/slow.png` は応答まで5秒待つ。
pub async fn start_asset_server() -> u16 {
    let app = axum::Router::new()
        .route(
            "/img.png",
            axum::routing::get(|| async { ASSET_BYTES.to_vec() }),
        )
        .route(
            "/slow.png",
            axum::routing::get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                ASSET_BYTES.to_vec()
            }),
        );
    start_mock_server(app).await
}

/// テストごとに独立した一時ディレクトリを作成する。
pub async fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("extradite-test-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}

/// ディレクトリが空かどうか。
pub async fn dir_is_empty(dir: &Path) -> bool {
    let mut entries = tokio::fs::read_dir(dir).await.unwrap();
    entries.next_entry().await.unwrap().is_none()
}

pub fn test_credentials() -> UploadCredentials {
    UploadCredentials {
        cloud_name: "test-cloud".to_string(),
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
    }
}

/// モック呼び出しの記録。
#[derive(Default)]
pub struct Probe {
    pub secret_calls: AtomicUsize,
    uploaded: Mutex<Vec<PathBuf>>,
}

impl Probe {
    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.uploaded.lock().unwrap().clone()
    }
}

/// 固定結果を返すモックSecretProvider。
pub struct MockSecretProvider {
    result: Result<UploadCredentials, String>,
    probe: Arc<Probe>,
}

#[async_trait::async_trait]
impl SecretProvider for MockSecretProvider {
    async fn fetch_upload_credentials(&self) -> Result<UploadCredentials, ExtractError> {
        self.probe.secret_calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(ExtractError::Secret)
    }
}

/// アップロード時点でファイルが存在することを確認し、パスを記録するモック。
pub struct MockUploader {
    result: Result<(), String>,
    probe: Arc<Probe>,
}

#[async_trait::async_trait]
impl MediaUploader for MockUploader {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        asset: &DownloadedAsset,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ExtractError> {
        assert_eq!(credentials, &test_credentials());
        assert!(options.use_filename);

        let contents = tokio::fs::read(&asset.path)
            .await
            .map_err(|e| ExtractError::Storage(e.to_string()))?;
        assert_eq!(contents, ASSET_BYTES);
        self.probe.uploaded.lock().unwrap().push(asset.path.clone());

        self.result.clone().map_err(ExtractError::Upload)?;

        let stem = asset
            .file_name
            .rsplit_once('.')
            .map(|(s, _)| s.to_string())
            .unwrap_or_else(|| asset.file_name.clone());
        Ok(UploadedAsset {
            secure_url: format!("https://res.cloudinary.com/test-cloud/image/upload/{stem}.png"),
            public_id: stem.clone(),
            url: None,
            format: Some("png".to_string()),
            resource_type: Some("image".to_string()),
            bytes: Some(asset.bytes),
            original_filename: Some(stem),
        })
    }
}

/// 実HttpDownloaderとモックのシークレット・アップローダーでAppStateを構築する。
pub fn test_state(
    work_dir: &Path,
    secret: Result<UploadCredentials, String>,
    upload: Result<(), String>,
) -> (AppState, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let config = ExtractorConfig {
        work_dir: work_dir.to_path_buf(),
        ..ExtractorConfig::default()
    };
    let state = AppState {
        downloader: Box::new(HttpDownloader::new(
            reqwest::Client::new(),
            ExtensionFallback::Append,
            config.max_asset_bytes,
            config.resume_if_exists,
        )),
        secrets: Box::new(MockSecretProvider {
            result: secret,
            probe: probe.clone(),
        }),
        uploader: Box::new(MockUploader {
            result: upload,
            probe: probe.clone(),
        }),
        config,
    };
    (state, probe)
}
