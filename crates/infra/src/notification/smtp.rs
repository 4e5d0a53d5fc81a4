//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 社内 SMTP リレーや開発用の Mailpit（ローカル SMTP サーバー）に接続する。
//!
//! コネクションプールは使わないため、接続は送信ごとに確立され、
//! 送信の成否にかかわらず送信完了時に閉じられる。

use std::time::Duration;

use async_trait::async_trait;
use errmail_domain::notification::{EmailAddress, EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Attachment, Mailbox, Message, MultiPart, SinglePart, header::ContentType},
};

use super::NotificationSender;

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 25, Mailpit なら 1025）
    /// - `timeout`: 接続・コマンドごとのタイムアウト（`None` で無制限）
    pub fn new(host: &str, port: u16, timeout: Option<Duration>) -> Self {
        // builder_dangerous: TLS なしで接続（社内リレー / Mailpit 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(timeout)
            .build();

        Self { transport }
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}

fn to_mailbox(address: &EmailAddress) -> Result<Mailbox, NotificationError> {
    address
        .as_str()
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{address}: {e}")))
}

/// ドメインのメールメッセージを lettre のメッセージに変換する
///
/// 添付がなければ本文だけの単一パート、あれば `multipart/mixed` にする。
/// 宛先が 1 件もない場合は lettre がエラーを返すため、`SendFailed` になる。
fn build_message(email: &EmailMessage) -> Result<Message, NotificationError> {
    let mut builder = Message::builder()
        .from(to_mailbox(&email.from)?)
        .subject(&email.subject);

    for address in &email.to {
        builder = builder.to(to_mailbox(address)?);
    }
    for address in &email.cc {
        builder = builder.cc(to_mailbox(address)?);
    }
    for address in &email.bcc {
        builder = builder.bcc(to_mailbox(address)?);
    }

    let body_type = if email.is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    let message = if email.attachments.is_empty() {
        builder.header(body_type).body(email.body.clone())
    } else {
        let mut multipart = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(body_type)
                .body(email.body.clone()),
        );
        for attachment in &email.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                NotificationError::AttachmentFailed(format!(
                    "{}: MIME タイプ不正: {e}",
                    attachment.filename
                ))
            })?;
            multipart = multipart.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }
        builder.multipart(multipart)
    };

    message.map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}
