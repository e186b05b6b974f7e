//! # メディアアップローダー
//!
//! ローカルに保存したアセットをメディアホストへアップロードする処理を抽象化する。
//! Cloudinary実装は `cloudinary` サブモジュールを参照。

pub mod cloudinary;

pub use cloudinary::CloudinaryUploader;

use extradite_types::{UploadCredentials, UploadedAsset};

use crate::download::DownloadedAsset;
use crate::error::ExtractError;

/// アップロード時のオプション。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// 元のファイル名を公開IDに使うようメディアホストに要求する
    pub use_filename: bool,
    /// アップロード先フォルダ
    pub folder: Option<String>,
    /// リソース種別（image, raw, video, auto）
    pub resource_type: String,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            use_filename: true,
            folder: None,
            resource_type: "image".to_string(),
        }
    }
}

/// メディアホストへのアップロードを行うトレイト。
///
/// 認証情報は呼び出しごとに渡す（実装は認証情報を保持しない）。
#[async_trait::async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        asset: &DownloadedAsset,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ExtractError>;
}
