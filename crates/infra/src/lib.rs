//! # ErrMail インフラ層
//!
//! 外部システム（SMTP リレー）との通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! ドメイン層で定義されたメールメッセージを受け取り、具体的な送信手段に
//! 変換する。送信手段の詳細をカプセル化し、通知サービスを SMTP の変更から
//! 保護する。
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信トレイトと SMTP / Noop 実装
//! - `mock` - テスト用の送信記録モック（`test-utils` feature）

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender};
