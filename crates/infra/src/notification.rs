//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（リレー / Mailpit）、Noop（送信無効化時）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **失敗は値で返す**: 送信失敗は `NotificationError` として返し、
//!   ログ出力と真偽値への変換は呼び出し側（通知サービス）が行う

mod noop;
mod smtp;

use async_trait::async_trait;
use errmail_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
