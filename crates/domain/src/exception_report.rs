//! # 例外レポート
//!
//! エラーメールに載せる例外情報（発生源・メッセージ・スタックトレース）を
//! 表現する。内側の原因（inner）を 1 段だけ持ち、メール本文では外側の値の後に
//! 区切り [`INNER_SEPARATOR`] を挟んで内側の値を連結する。

/// 外側と内側の値を連結する区切り（HTML の改行 2 つ）
pub const INNER_SEPARATOR: &str = "<br><br>";

/// 例外レポート
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionReport {
    /// 発生源（アプリケーション名やモジュール名）
    pub source:      String,
    /// エラーメッセージ
    pub message:     String,
    /// スタックトレース
    pub stack_trace: String,
    /// 内側の原因
    pub inner:       Option<Box<ExceptionReport>>,
}

impl ExceptionReport {
    pub fn new(
        source: impl Into<String>,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            source:      source.into(),
            message:     message.into(),
            stack_trace: stack_trace.into(),
            inner:       None,
        }
    }

    /// 内側の原因を設定する
    pub fn with_inner(mut self, inner: ExceptionReport) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// `std::error::Error` からレポートを作成する
    ///
    /// `error.source()` があれば内側の原因とする。標準のエラー型は
    /// スタックトレースを持たないため、内側のスタックトレースは空になる。
    pub fn from_error(
        source: &str,
        error: &(dyn std::error::Error + 'static),
        stack_trace: impl Into<String>,
    ) -> Self {
        let report = Self::new(source, error.to_string(), stack_trace);
        match error.source() {
            Some(cause) => report.with_inner(Self::new(source, cause.to_string(), "")),
            None => report,
        }
    }

    /// 発生源（内側があれば区切りを挟んで連結）
    pub fn combined_source(&self) -> String {
        self.combine(|report| report.source.as_str())
    }

    /// メッセージ（内側があれば区切りを挟んで連結）
    pub fn combined_message(&self) -> String {
        self.combine(|report| report.message.as_str())
    }

    /// スタックトレース（内側があれば区切りを挟んで連結）
    pub fn combined_stack_trace(&self) -> String {
        self.combine(|report| report.stack_trace.as_str())
    }

    fn combine(&self, field: impl Fn(&Self) -> &str) -> String {
        match &self.inner {
            Some(inner) => format!("{}{INNER_SEPARATOR}{}", field(self), field(inner)),
            None => field(self).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("接続に失敗しました")]
    struct ConnectError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_innerがなければ外側の値だけを返す() {
        let report = ExceptionReport::new("app", "失敗", "at main");

        assert_eq!(report.combined_source(), "app");
        assert_eq!(report.combined_message(), "失敗");
        assert_eq!(report.combined_stack_trace(), "at main");
    }

    #[test]
    fn test_innerがあれば区切りを挟んで連結する() {
        let report = ExceptionReport::new("outer-src", "outer-msg", "outer-trace")
            .with_inner(ExceptionReport::new("inner-src", "inner-msg", "inner-trace"));

        assert_eq!(report.combined_source(), "outer-src<br><br>inner-src");
        assert_eq!(report.combined_message(), "outer-msg<br><br>inner-msg");
        assert_eq!(
            report.combined_stack_trace(),
            "outer-trace<br><br>inner-trace"
        );
    }

    #[test]
    fn test_innerの値が空でも区切りは付く() {
        let report = ExceptionReport::new("src", "msg", "trace").with_inner(ExceptionReport::default());

        assert_eq!(report.combined_stack_trace(), "trace<br><br>");
    }

    #[test]
    fn test_from_errorはsourceを内側の原因にする() {
        let error = ConnectError {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };

        let report = ExceptionReport::from_error("worker", &error, "trace");

        assert_eq!(report.message, "接続に失敗しました");
        assert_eq!(report.stack_trace, "trace");
        let inner = report.inner.as_deref().unwrap();
        assert_eq!(inner.source, "worker");
        assert_eq!(inner.message, "refused");
        assert_eq!(inner.stack_trace, "");
    }

    #[test]
    fn test_from_errorはsourceがなければinnerなし() {
        let error = std::io::Error::other("disk full");

        let report = ExceptionReport::from_error("worker", &error, "");

        assert_eq!(report.message, "disk full");
        assert!(report.inner.is_none());
    }
}
