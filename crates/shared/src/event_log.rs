//! # ビジネスイベントログの構造化ヘルパー
//!
//! 通知の送信結果を `jq` で追跡できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        pub const EMAIL_SENT: &str = "email.sent";
        pub const EMAIL_FAILED: &str = "email.failed";
        pub const EXCEPTION_REPORTED: &str = "exception.reported";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 外部サービス呼び出し（SMTP リレー）
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// ローカルファイル（添付ファイル読み込み）
        pub const FILESYSTEM: &str = "filesystem";
    }

    /// エラー種別
    pub mod kind {
        pub const MAIL_TRANSPORT: &str = "mail_transport";
        pub const ATTACHMENT_READ: &str = "attachment_read";
    }
}
