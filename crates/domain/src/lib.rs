//! # ErrMail ドメイン層
//!
//! 通知メールの組み立てに必要な、I/O を伴わないロジックを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘                ↑
//!       ───────────────
//! ```
//!
//! ドメイン層は SMTP やファイルシステムに一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`template`] - プレースホルダ置換によるテンプレートエンジン
//! - [`notification`] - メールアドレス・メールメッセージ・通知エラー
//! - [`exception_report`] - エラーメールに載せる例外情報
//!
//! ## 使用例
//!
//! ```rust
//! use errmail_domain::{notification::parse_recipients, template::TemplateEngine};
//!
//! let recipients = parse_recipients("ops@example.com;dev@example.com").unwrap();
//! assert_eq!(recipients.len(), 2);
//!
//! let mut engine = TemplateEngine::new("<b>{$$Message$$}</b>");
//! engine.add_parameter("Message", "disk full");
//! engine.process();
//! assert_eq!(engine.text(), "<b>disk full</b>");
//! ```

pub mod exception_report;
pub mod notification;
pub mod template;

pub use exception_report::ExceptionReport;
pub use notification::{EmailAddress, EmailAttachment, EmailMessage, NotificationError};
pub use template::TemplateEngine;
