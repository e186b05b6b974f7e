//! # Extradite アセット抽出関数
//!
//! リモートアセットのURLを受け取り、ローカルの一時ディレクトリへダウンロードし、
//! シークレットストアから取得した認証情報でメディアホスト（Cloudinary）へ再アップロードする。
//!
//! ## 処理の流れ
//! 1. `assetUrl` クエリパラメータの検証
//! 2. `{work_dir}/{invocation_id}` へのダウンロード
//! 3. ダウンロード完了後にシークレットを取得
//! 4. アップロード
//! 5. 一時ディレクトリを削除し、結果をレスポンスとして返却
//!
//! ## 実行形態
//! - デフォルト: axumサーバーとして `BIND_ADDR` で待ち受け
//! - `lambda` feature: API Gateway配下のLambda関数として実行

mod config;
mod download;
mod endpoints;
mod error;
mod filename;
mod pipeline;
mod secrets;
mod uploader;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use config::{AppState, ExtractorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "lambda")]
    lambda_http::tracing::init_default_subscriber();
    #[cfg(not(feature = "lambda"))]
    tracing_subscriber::fmt::init();

    let config = ExtractorConfig::from_env()?;
    tracing::info!(
        work_dir = %config.work_dir.display(),
        secret_id = %config.secret_id,
        secrets_source = ?config.secrets_source,
        extension_fallback = ?config.extension_fallback,
        "設定を読み込みました"
    );

    #[cfg(not(feature = "lambda"))]
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::from_config(config).await?);
    let app = endpoints::router(state);

    #[cfg(feature = "lambda")]
    {
        tracing::info!("Lambda関数として起動します");
        lambda_http::run(app)
            .await
            .map_err(|e| anyhow::anyhow!("Lambdaランタイムが異常終了しました: {e}"))?;
    }

    #[cfg(not(feature = "lambda"))]
    {
        tracing::info!("Extractorを {} で起動します", bind_addr);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        axum::serve(listener, app).await?;
    }

    Ok(())
}
