//! # 抽出パイプライン
//!
//! ダウンロード → 認証情報取得 → アップロード を逐次実行し、
//! その結果をそのまま呼び出し元に返す。
//!
//! 一時ファイルはリクエストごとのディレクトリ `{work_dir}/{invocation_id}` に置き、
//! 成功・失敗にかかわらずパイプライン終了時に削除する。

use std::path::{Path, PathBuf};

use extradite_types::UploadedAsset;
use url::Url;
use uuid::Uuid;

use crate::config::AppState;
use crate::error::ExtractError;

/// `assetUrl` をhttp(s)の絶対URLとしてパースする。
pub fn parse_asset_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw).map_err(|e| ExtractError::InvalidAssetUrl(format!("{e}: {raw}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ExtractError::InvalidAssetUrl(format!(
            "サポートされていないスキームです: {scheme}"
        ))),
    }
}

/// リクエスト単位の一時ディレクトリ。
///
/// 通常は `remove` で非同期に削除する。`remove` を経ずに破棄された場合
/// （リクエストのキャンセル、パニック）は `Drop` で同期的に削除する。
pub struct InvocationDir {
    path: PathBuf,
    removed: bool,
}

impl InvocationDir {
    /// `{work_dir}/{invocation_id}` を作成する。
    pub async fn create(work_dir: &Path, invocation_id: Uuid) -> Result<Self, ExtractError> {
        let path = work_dir.join(invocation_id.to_string());
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| {
                ExtractError::Internal(format!(
                    "一時ディレクトリを作成できません ({}): {e}",
                    path.display()
                ))
            })?;
        Ok(Self {
            path,
            removed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ディレクトリを中身ごと削除する。失敗はログのみ。
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "一時ディレクトリの削除に失敗"
            );
        }
    }
}

impl Drop for InvocationDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        tracing::warn!(
            path = %self.path.display(),
            "パイプライン中断のため一時ディレクトリを削除します"
        );
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "一時ディレクトリの削除に失敗"
                );
            }
        }
    }
}

/// アセットを抽出し、メディアホストへ再アップロードする。
pub async fn extract_asset(state: &AppState, url: &Url) -> Result<UploadedAsset, ExtractError> {
    let invocation_id = Uuid::new_v4();
    let dir = InvocationDir::create(&state.config.work_dir, invocation_id).await?;

    tracing::info!(
        invocation_id = %invocation_id,
        asset_url = %url,
        "アセット抽出を開始します"
    );

    let result = run(state, url, dir.path()).await;
    dir.remove().await;

    match &result {
        Ok(asset) => tracing::info!(
            invocation_id = %invocation_id,
            public_id = %asset.public_id,
            "アセット抽出が完了しました"
        ),
        Err(e) => tracing::error!(
            invocation_id = %invocation_id,
            asset_url = %url,
            error = %e,
            "アセット抽出に失敗しました"
        ),
    }

    result
}

async fn run(state: &AppState, url: &Url, dir: &Path) -> Result<UploadedAsset, ExtractError> {
    // Step 1: ダウンロード
    let asset = state.downloader.download(url, dir).await?;

    // Step 2: ダウンロード完了後に認証情報を取得（毎回取得し直す）
    let credentials = state.secrets.fetch_upload_credentials().await?;

    // Step 3: アップロード
    state
        .uploader
        .upload(&credentials, &asset, &state.config.upload_options())
        .await
}
