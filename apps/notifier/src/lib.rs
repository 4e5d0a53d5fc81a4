//! # ErrMail Notifier ライブラリ
//!
//! 通知設定・通知サービス・CLI を公開する。
//! 他のプロセスから例外をエラーメールで通知する場合もこのクレートを使う。

pub mod cli;
pub mod config;
pub mod usecase;
