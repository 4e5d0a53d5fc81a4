//! # Notifier 設定
//!
//! 環境変数から通知送信の設定を読み込む。
//! プロセス起動時に 1 回だけ読み込み、以降は読み取り専用の値として
//! 通知サービスへ注入する。

use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数値として解釈できない
    #[error("{name} は有効な数値である必要があります: {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    /// 未知の送信バックエンド
    #[error("NOTIFICATION_BACKEND が不正です（smtp | noop）: {0:?}")]
    UnknownBackend(String),
}

/// 送信バックエンド
///
/// `NOTIFICATION_BACKEND` 環境変数で切り替える:
/// - `smtp`: SMTP リレー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationBackend {
    Smtp,
    #[default]
    Noop,
}

impl FromStr for NotificationBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "smtp" => Ok(Self::Smtp),
            "noop" => Ok(Self::Noop),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// 通知機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:          NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:        String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:        u16,
    /// SMTP の接続・コマンドタイムアウト
    pub smtp_timeout:     Duration,
    /// 既定の送信元メールアドレス
    pub from_address:     String,
    /// エラーメールの宛先（`;` 区切り）
    pub error_recipients: String,
    /// エラーメールに表示するアプリケーション名
    pub app_name:         String,
    /// エラーメールの件名
    pub error_subject:    String,
}

impl NotificationConfig {
    const DEFAULT_SMTP_PORT: u16 = 1025;
    const DEFAULT_TIMEOUT_SECS: u64 = 180;
    const DEFAULT_APP_NAME: &'static str = "ErrMail";

    /// 環境変数から通知設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の読み取り関数から通知設定を読み込む
    ///
    /// 未設定の項目は既定値で補う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = lookup("NOTIFICATION_BACKEND")
            .map(|value| value.parse::<NotificationBackend>())
            .transpose()?
            .unwrap_or_default();

        let smtp_port = parse_number::<u16>("SMTP_PORT", lookup("SMTP_PORT"))?
            .unwrap_or(Self::DEFAULT_SMTP_PORT);

        let timeout_secs = parse_number::<u64>("SMTP_TIMEOUT_SECS", lookup("SMTP_TIMEOUT_SECS"))?
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);

        let app_name =
            lookup("ERROR_MAIL_APP_NAME").unwrap_or_else(|| Self::DEFAULT_APP_NAME.to_string());
        let error_subject =
            lookup("ERROR_MAIL_SUBJECT").unwrap_or_else(|| format!("{app_name} Exception"));

        Ok(Self {
            backend,
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port,
            smtp_timeout: Duration::from_secs(timeout_secs),
            from_address: lookup("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@errmail.example.com".to_string()),
            error_recipients: lookup("ERROR_MAIL_RECIPIENTS").unwrap_or_default(),
            app_name,
            error_subject,
        })
    }
}

fn parse_number<T: FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        })
        .transpose()
}
