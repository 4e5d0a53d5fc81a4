//! # ErrMail 共有ユーティリティ
//!
//! ErrMail の各クレート（domain / infra / notifier）から共通で使われる
//! 観測性まわりのユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature の背後に置き、
//!   ライブラリ利用側に subscriber の依存を強制しない

pub mod event_log;
pub mod observability;
