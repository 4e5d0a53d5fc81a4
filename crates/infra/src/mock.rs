//! # テスト用モック送信
//!
//! 通知サービスのテストで使用するインメモリの送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! errmail-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use errmail_domain::notification::{EmailMessage, NotificationError};

use crate::notification::NotificationSender;

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `clone()` したインスタンス同士は記録を共有するため、サービスに渡した後も
/// テスト側から送信内容を検証できる。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:    Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に送信失敗を返すモックを作成する
    pub fn failing() -> Self {
        let sender = Self::new();
        sender.set_failing(true);
        sender
    }

    /// 以降の送信を失敗させるかを切り替える
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 送信に成功したメールの一覧
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed(
                "モック: 送信失敗".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
