//! # シークレットプロバイダー
//!
//! メディアホストのアップロード認証情報の取得元を抽象化する。
//! AWS Secrets Manager実装は `aws` サブモジュールを参照。

#[cfg(feature = "vendor-aws")]
pub mod aws;
pub mod env;

#[cfg(feature = "vendor-aws")]
pub use aws::AwsSecretsProvider;
pub use env::EnvSecretProvider;

use extradite_types::UploadCredentials;

use crate::error::ExtractError;

/// アップロード認証情報を取得するトレイト。
///
/// 呼び出しごとに取得し直す。キャッシュは実装側でも持たない。
#[async_trait::async_trait]
pub trait SecretProvider: Send + Sync {
    async fn fetch_upload_credentials(&self) -> Result<UploadCredentials, ExtractError>;
}

/// シークレット文字列（JSON）を認証情報としてパースする。
///
/// パースエラーにはシークレットの内容を含めない。
pub fn parse_credentials(secret_string: &str) -> Result<UploadCredentials, ExtractError> {
    if secret_string.trim().is_empty() {
        return Err(ExtractError::Secret("シークレット文字列が空です".to_string()));
    }
    serde_json::from_str(secret_string).map_err(|e| {
        ExtractError::Secret(format!(
            "シークレットのパースに失敗: {} (行 {}, 列 {})",
            classify(&e),
            e.line(),
            e.column()
        ))
    })
}

fn classify(e: &serde_json::Error) -> &'static str {
    match e.classify() {
        serde_json::error::Category::Io => "I/Oエラー",
        serde_json::error::Category::Syntax => "JSON構文エラー",
        serde_json::error::Category::Data => "必須フィールドの欠落または型不一致",
        serde_json::error::Category::Eof => "JSONが途中で終了しています",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let creds = parse_credentials(
            r#"{"CLOUDINARY_CLOUD":"demo","CLOUDINARY_API_KEY":"123","CLOUDINARY_API_SECRET":"abc","extra":1}"#,
        )
        .unwrap();
        assert_eq!(creds.cloud_name, "demo");
    }

    #[test]
    fn test_parse_credentials_errors_do_not_leak_secret() {
        let err = parse_credentials("").unwrap_err();
        assert!(matches!(err, ExtractError::Secret(_)));

        let err = parse_credentials(r#"{"CLOUDINARY_API_SECRET":"topsecret"}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Secret(_)));
        assert!(!err.to_string().contains("topsecret"));

        let err = parse_credentials("{not json").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }
}
