//! # ユースケース層
//!
//! 通知メールの組み立てと送信を実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信手段を `Arc<dyn NotificationSender>` で外部から注入
//! - **設定の注入**: SMTP や宛先の設定は起動時に読み込んだ値を受け取る
//!
//! ## モジュール構成
//!
//! - `notification`: メール送信とエラーメール通知

pub mod notification;

pub use notification::{EmailRequest, ErrorMailRenderer, NotificationService};
