//! # 通知サービス
//!
//! 宛先解析 → 添付読み込み → メール送信 → ログ記録を統合するサービス。
//!
//! ## 設計方針
//!
//! - **宛先不正は呼び出し元へ**: 送信元・宛先の形式エラーは `Err` で返す
//! - **送信失敗は `Ok(false)`**: SMTP などの送信失敗はログに記録し、エラーにはしない
//! - **依存性注入**: `NotificationSender` は trait で抽象化

use std::{path::PathBuf, sync::Arc};

use errmail_domain::{
    EmailAddress,
    EmailMessage,
    ExceptionReport,
    NotificationError,
    notification::parse_recipients,
};
use errmail_infra::notification::NotificationSender;
use errmail_shared::{
    event_log::{error, event},
    log_business_event,
};

use super::{ErrorMailRenderer, attachment::load_attachments, report::exception_report};
use crate::config::NotificationConfig;

/// メール送信要求
///
/// 宛先（To / Cc / Bcc）は `;` 区切りの文字列で受け取る。空文字列は宛先なし。
#[derive(Debug, Clone, Default)]
pub struct EmailRequest {
    pub from:        String,
    pub to:          String,
    pub cc:          String,
    pub bcc:         String,
    pub subject:     String,
    pub body:        String,
    pub is_html:     bool,
    pub attachments: Vec<PathBuf>,
}

impl EmailRequest {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = bcc.into();
        self
    }

    /// 本文を HTML として送信する
    pub fn html(mut self) -> Self {
        self.is_html = true;
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }
}

/// 通知サービス
pub struct NotificationService {
    sender:   Arc<dyn NotificationSender>,
    renderer: ErrorMailRenderer,
    config:   NotificationConfig,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        renderer: ErrorMailRenderer,
        config: NotificationConfig,
    ) -> Self {
        Self {
            sender,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// メールを送信する
    ///
    /// 送信できた場合は `Ok(true)`、送信手段が失敗した場合は `Ok(false)` を返す。
    /// 送信失敗の詳細はログに出力する。
    ///
    /// # エラー
    ///
    /// 送信元または宛先の形式が不正な場合は `NotificationError::InvalidAddress` を返す。
    pub async fn send_email(&self, request: EmailRequest) -> Result<bool, NotificationError> {
        let mut message = EmailMessage::new(
            EmailAddress::new(request.from)?,
            request.subject,
            request.body,
        );
        message.to = parse_recipients(&request.to)?;
        message.cc = parse_recipients(&request.cc)?;
        message.bcc = parse_recipients(&request.bcc)?;
        message.is_html = request.is_html;
        message.attachments = load_attachments(&request.attachments).await;

        Ok(self.deliver(&message).await)
    }

    /// 例外レポートをエラーメールとして送信する
    ///
    /// 送信元・宛先・件名は設定値を使い、本文は HTML としてレンダリングする。
    pub async fn send_exception_mail(
        &self,
        report: &ExceptionReport,
    ) -> Result<bool, NotificationError> {
        let body = self.renderer.render(&self.config.app_name, report);
        let request = EmailRequest::new(
            self.config.from_address.as_str(),
            self.config.error_recipients.as_str(),
            self.config.error_subject.as_str(),
            body,
        )
        .html();

        let sent = self.send_email(request).await?;
        let result = if sent {
            event::result::SUCCESS
        } else {
            event::result::FAILURE
        };

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::EXCEPTION_REPORTED,
            event.result = result,
            exception.message = %report.message,
            "エラーメール通知"
        );

        Ok(sent)
    }

    /// エラーをエラーメールで通知する（fire-and-forget）
    ///
    /// 宛先設定の不正も含め、いずれの失敗もエラーを返さない（ログ出力のみ）。
    pub async fn report_error(&self, err: &anyhow::Error) -> bool {
        let report = exception_report(&self.config.app_name, err);

        match self.send_exception_mail(&report).await {
            Ok(sent) => sent,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "エラーメールの宛先設定が不正なため通知できません"
                );
                false
            }
        }
    }

    async fn deliver(&self, message: &EmailMessage) -> bool {
        match self.sender.send_email(message).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::EMAIL_SENT,
                    event.result = event::result::SUCCESS,
                    notification.recipients = message.recipient_count(),
                    notification.attachments = message.attachments.len(),
                    notification.subject = %message.subject,
                    "メール送信成功"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = error::kind::MAIL_TRANSPORT,
                    error = %e,
                    notification.subject = %message.subject,
                    "メール送信に失敗"
                );
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::EMAIL_FAILED,
                    event.result = event::result::FAILURE,
                    notification.recipients = message.recipient_count(),
                    "メール送信失敗"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use errmail_infra::mock::MockNotificationSender;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_config() -> NotificationConfig {
        NotificationConfig::from_lookup(|name: &str| match name {
            "ERROR_MAIL_RECIPIENTS" => Some("ops@example.com;dev@example.com".to_string()),
            "ERROR_MAIL_APP_NAME" => Some("PayrollBatch".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn make_service(sender: MockNotificationSender) -> NotificationService {
        NotificationService::new(Arc::new(sender), ErrorMailRenderer::new(), make_config())
    }

    #[tokio::test]
    async fn 送信成功時にtrueを返す() {
        let sender = MockNotificationSender::new();
        let service = make_service(sender.clone());

        let sent = service
            .send_email(
                EmailRequest::new("batch@example.com", "a@x.com;b@x.com", "件名", "本文")
                    .with_cc("c@x.com")
                    .with_bcc("d@x.com"),
            )
            .await
            .unwrap();

        assert!(sent);
        let emails = sender.sent_emails();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to.len(), 2);
        assert_eq!(emails[0].recipient_count(), 4);
        assert!(!emails[0].is_html);
    }

    #[tokio::test]
    async fn 送信失敗時はfalseを返す() {
        let service = make_service(MockNotificationSender::failing());

        let sent = service
            .send_email(EmailRequest::new("batch@example.com", "a@x.com", "件名", "本文"))
            .await
            .unwrap();

        assert!(!sent);
    }

    #[tokio::test]
    async fn 不正な宛先はエラーを返し送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(sender.clone());

        let result = service
            .send_email(EmailRequest::new("batch@example.com", "a@x.com;broken", "件名", "本文"))
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn 不正な送信元はエラーを返す() {
        let service = make_service(MockNotificationSender::new());

        let result = service
            .send_email(EmailRequest::new("", "a@x.com", "件名", "本文"))
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn エラーメールは設定の宛先と件名でhtml送信する() {
        let sender = MockNotificationSender::new();
        let service = make_service(sender.clone());
        let report = ExceptionReport::new("PayrollBatch", "boom", "at main");

        let sent = service.send_exception_mail(&report).await.unwrap();

        assert!(sent);
        let email = &sender.sent_emails()[0];
        assert_eq!(email.from.as_str(), "noreply@errmail.example.com");
        assert_eq!(email.to.len(), 2);
        assert_eq!(email.subject, "PayrollBatch Exception");
        assert!(email.is_html);
        assert!(email.body.contains("boom"));
    }

    #[tokio::test]
    async fn report_errorは送信失敗でもパニックしない() {
        let service = make_service(MockNotificationSender::failing());

        let sent = service.report_error(&anyhow::anyhow!("boom")).await;

        assert!(!sent);
    }
}
