//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! 通知 CLI とライブラリ利用側で共通のログ初期化ロジックを集約し、
//! 環境変数 `LOG_FORMAT` による JSON / Pretty 出力の切り替えに対応する。

/// ログ出力形式
///
/// 環境変数 `LOG_FORMAT` で切り替える。
/// 値が未設定または不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（ログ収集基盤向け）
    Json,
    /// 人間が読みやすい形式（端末向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// 文字列からログ形式をパースする
    ///
    /// 前後の空白は無視する。不正な値の場合は [`Pretty`](LogFormat::Pretty)
    /// にフォールバックし、stderr に警告を出力する。
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }

    /// 環境変数 `LOG_FORMAT` から読み取る
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|val| Self::parse(&val))
            .unwrap_or_default()
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（ルートスパンの `service` フィールドに出力）
    pub service_name:   String,
    /// ログ出力形式
    pub log_format:     LogFormat,
    /// `RUST_LOG` 未設定時に使うフィルタ
    pub default_filter: String,
}

impl TracingConfig {
    /// 既定のフィルタ
    pub const DEFAULT_FILTER: &'static str = "info,errmail=debug";

    /// 新しい設定を作成する
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: Self::DEFAULT_FILTER.to_string(),
        }
    }

    /// 環境変数から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::new(service_name, LogFormat::from_env())
    }

    /// `RUST_LOG` 未設定時のフィルタを差し替える
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数でログレベルを制御可能。未設定の場合は
/// [`TracingConfig::default_filter`] を使う。
///
/// `tracing_error::ErrorLayer` も登録するため、ここで初期化したプロセスでは
/// `SpanTrace::capture()` が呼び出し経路を記録できる。
///
/// 既に subscriber が設定されている場合（テストから複数回呼ばれた場合など）は
/// 何もしない。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_filter.as_str().into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init();
}
