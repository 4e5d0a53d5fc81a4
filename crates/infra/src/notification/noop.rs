//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! SMTP リレーのない環境や通知無効化時に使用する。

use async_trait::async_trait;
use errmail_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            from = %email.from,
            recipients = email.recipient_count(),
            attachments = email.attachments.len(),
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}
