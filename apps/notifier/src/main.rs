//! # ErrMail CLI
//!
//! 通知メールの送信とテンプレートのレンダリングを行うコマンドラインツール。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFICATION_BACKEND` | No | `smtp` または `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `localhost`） |
//! | `SMTP_PORT` | No | SMTP ポート（デフォルト: `1025`） |
//! | `SMTP_TIMEOUT_SECS` | No | SMTP タイムアウト秒（デフォルト: `180`） |
//! | `NOTIFICATION_FROM_ADDRESS` | No | 既定の送信元 |
//! | `ERROR_MAIL_RECIPIENTS` | No | エラーメールの宛先（`;` 区切り） |
//! | `ERROR_MAIL_APP_NAME` | No | エラーメールのアプリケーション名 |
//! | `ERROR_MAIL_SUBJECT` | No | エラーメールの件名 |
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,errmail=debug`） |
//! | `LOG_FORMAT` | No | `json` または `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # テンプレートのレンダリング
//! cargo run -p errmail-notifier -- render --template mail.html --param Name=Tom --clean-up
//!
//! # Mailpit 経由の送信
//! NOTIFICATION_BACKEND=smtp cargo run -p errmail-notifier -- \
//!     send --to ops@example.com --subject test --body hello
//! ```

use std::process::ExitCode;

use clap::Parser;
use errmail_notifier::cli::{self, Cli};
use errmail_shared::observability::{TracingConfig, init_tracing};
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("errmail");
    init_tracing(&tracing_config);

    let cli = Cli::parse();
    let span = tracing::info_span!("errmail", service = %tracing_config.service_name);

    cli::run(cli).instrument(span).await
}
