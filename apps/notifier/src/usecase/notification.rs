//! # 通知ユースケース
//!
//! メール送信と、例外をエラーメールとして通知する処理を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - エラーメールテンプレートのレンダリング
//! - [`attachment`] - 添付ファイルの読み込み
//! - [`report`] - `anyhow::Error` から例外レポートへの変換
//! - [`service`] - 宛先解析 + 添付 + 送信 + ログ記録の統合サービス

pub mod attachment;
pub mod report;
pub mod service;
pub mod template_renderer;

use std::sync::Arc;

use errmail_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
};
pub use service::{EmailRequest, NotificationService};
pub use template_renderer::ErrorMailRenderer;

use crate::config::{NotificationBackend, NotificationConfig};

/// 設定に応じた送信手段を作成する
pub fn sender_from_config(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                timeout_secs = config.smtp_timeout.as_secs(),
                "SMTP 送信を使用します"
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                Some(config.smtp_timeout),
            ))
        }
        NotificationBackend::Noop => {
            tracing::info!("Noop 送信を使用します（メールは送信されません）");
            Arc::new(NoopNotificationSender)
        }
    }
}
