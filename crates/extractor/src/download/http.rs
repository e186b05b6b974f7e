//! # HTTPダウンローダー
//!
//! reqwestでアセットを取得し、チャンク単位でファイルに書き込む。

use std::path::Path;

use reqwest::header::{CONTENT_DISPOSITION, RANGE};
use reqwest::StatusCode;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::{DownloadedAsset, Downloader};
use crate::error::ExtractError;
use crate::filename::{resolve_file_name, ExtensionFallback};

/// HTTP(S)経由でアセットを取得するダウンローダー。
pub struct HttpDownloader {
    /// HTTPクライアント（タイムアウト設定済み）
    client: reqwest::Client,
    /// 許可リスト外の拡張子の扱い
    fallback: ExtensionFallback,
    /// 取得するアセットの最大サイズ（バイト）
    max_asset_bytes: u64,
    /// 同名ファイルが既にある場合にRangeリクエストで続きから取得するか。
    /// パイプラインは毎回新しいディレクトリを渡すため、同じ `dest_dir` で
    /// 再度 `download` を呼んだ場合にのみ効く。
    resume_if_exists: bool,
}

impl HttpDownloader {
    /// 新しいHttpDownloaderを作成する。
    pub fn new(
        client: reqwest::Client,
        fallback: ExtensionFallback,
        max_asset_bytes: u64,
        resume_if_exists: bool,
    ) -> Self {
        Self {
            client,
            fallback,
            max_asset_bytes,
            resume_if_exists,
        }
    }

    fn too_large(&self, url: &Url) -> ExtractError {
        ExtractError::Download(format!(
            "アセットサイズが上限を超えています: 上限 {} bytes ({url})",
            self.max_asset_bytes
        ))
    }
}

/// 既存ファイルのサイズ。存在しなければ0。
async fn existing_len(path: &Path) -> u64 {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => 0,
    }
}

/// 既に書き込んだ量に `incoming` を足すと上限を超えるか。
fn exceeds_limit(written: u64, incoming: u64, max_asset_bytes: u64) -> bool {
    written.saturating_add(incoming) > max_asset_bytes
}

fn storage_error(path: &Path, e: std::io::Error) -> ExtractError {
    ExtractError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &Url, dest_dir: &Path) -> Result<DownloadedAsset, ExtractError> {
        // 再開判定はURL由来のファイル名で行う
        let guessed_name = resolve_file_name(url, None, self.fallback);
        let guessed_path = dest_dir.join(&guessed_name);
        let resume_from = if self.resume_if_exists {
            existing_len(&guessed_path).await
        } else {
            0
        };

        let mut request = self.client.get(url.as_str());
        if resume_from > 0 {
            tracing::info!(
                path = %guessed_path.display(),
                resume_from,
                "既存ファイルから取得を再開します"
            );
            request = request.header(RANGE, format!("bytes={resume_from}-"));
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| ExtractError::Download(format!("HTTP送信失敗 ({url}): {e}")))?;
        let status = response.status();

        // 既存ファイルが完全な場合、サーバーは416を返す
        if resume_from > 0 && status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(DownloadedAsset {
                path: guessed_path,
                file_name: guessed_name,
                bytes: resume_from,
            });
        }

        if !status.is_success() {
            return Err(ExtractError::Download(format!(
                "HTTPエラー: ステータス {status} ({url})"
            )));
        }

        let resuming = resume_from > 0 && status == StatusCode::PARTIAL_CONTENT;
        let (file_name, mut written) = if resuming {
            (guessed_name, resume_from)
        } else {
            let disposition = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok());
            (resolve_file_name(url, disposition, self.fallback), 0)
        };
        let path = dest_dir.join(&file_name);

        if let Some(len) = response.content_length() {
            if exceeds_limit(written, len, self.max_asset_bytes) {
                return Err(self.too_large(url));
            }
        }

        let mut file = if resuming {
            OpenOptions::new()
                .append(true)
                .open(&path)
                .await
                .map_err(|e| storage_error(&path, e))?
        } else {
            File::create(&path)
                .await
                .map_err(|e| storage_error(&path, e))?
        };

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ExtractError::Download(format!("レスポンス読み取り失敗 ({url}): {e}")))?
        {
            if exceeds_limit(written, chunk.len() as u64, self.max_asset_bytes) {
                return Err(self.too_large(url));
            }
            written += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| storage_error(&path, e))?;
        }
        file.flush().await.map_err(|e| storage_error(&path, e))?;

        if written == 0 {
            return Err(ExtractError::Download(format!("空のレスポンス ({url})")));
        }

        tracing::info!(path = %path.display(), bytes = written, "アセットを保存しました");

        Ok(DownloadedAsset {
            path,
            file_name,
            bytes: written,
        })
    }
}
