//! # アセットダウンローダー
//!
//! リモートアセットをローカルの一時ディレクトリへ取得する処理を抽象化する。
//!
//! ## ダウンローダー実装
//! - `HttpDownloader`: reqwestでHTTP(S)から取得する（途中再開対応）

pub mod http;

pub use http::HttpDownloader;

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ExtractError;

/// ダウンロード結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    /// 保存先のフルパス
    pub path: PathBuf,
    /// 保存先のファイル名（拡張子正規化済み）
    pub file_name: String,
    /// 保存されたファイルの総バイト数
    pub bytes: u64,
}

/// アセットをダウンロードするトレイト。
///
/// 取得元（HTTP、テスト用固定データ等）を差し替え可能にする。
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// `url` のアセットを `dest_dir` 直下に保存する。
    ///
    /// `dest_dir` は呼び出し側が作成済みであること。
    async fn download(&self, url: &Url, dest_dir: &Path) -> Result<DownloadedAsset, ExtractError>;
}
