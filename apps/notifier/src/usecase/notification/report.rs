//! # `anyhow::Error` から例外レポートへの変換

use std::backtrace::BacktraceStatus;

use errmail_domain::ExceptionReport;
use tracing_error::{SpanTrace, SpanTraceStatus};

/// `anyhow::Error` を例外レポートに変換する
///
/// 外側のメッセージはエラー自身の表示、内側はチェーンの次の原因になる。
/// スタックトレースには、`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE` で取得が有効なら
/// バックトレースを、そうでなければ現在のスパントレースを入れる。
pub fn exception_report(source: &str, error: &anyhow::Error) -> ExceptionReport {
    let backtrace = error.backtrace();
    let stack_trace = match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string(),
        _ => span_trace(),
    };

    ExceptionReport::from_error(source, &**error, stack_trace)
}

/// 現在のスパントレースを文字列化する
///
/// `ErrorLayer` が登録されていない、またはスパンの外なら空文字列。
fn span_trace() -> String {
    let trace = SpanTrace::capture();
    if trace.status() == SpanTraceStatus::CAPTURED {
        trace.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use pretty_assertions::assert_eq;
    use tracing_error::ErrorLayer;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn コンテキストが外側で原因が内側になる() {
        let error = Err::<(), _>(std::io::Error::other("connection refused"))
            .context("集計に失敗しました")
            .unwrap_err();

        let report = exception_report("PayrollBatch", &error);

        assert_eq!(report.source, "PayrollBatch");
        assert_eq!(report.message, "集計に失敗しました");
        let inner = report.inner.as_deref().unwrap();
        assert_eq!(inner.message, "connection refused");
        assert_eq!(inner.source, "PayrollBatch");
    }

    #[test]
    fn 原因がなければinnerなし() {
        let error = anyhow::anyhow!("boom");

        let report = exception_report("app", &error);

        assert_eq!(report.message, "boom");
        assert!(report.inner.is_none());
    }

    #[test]
    fn error_layerがあればスパントレースを記録する() {
        let subscriber = tracing_subscriber::registry().with(ErrorLayer::default());

        let trace = tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("monthly_payroll");
            let _guard = span.enter();
            span_trace()
        });

        assert!(trace.contains("monthly_payroll"));
    }

    #[test]
    fn スパン内の例外レポートはスタックトレースを持つ() {
        let subscriber = tracing_subscriber::registry().with(ErrorLayer::default());

        let report = tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("monthly_payroll");
            let _guard = span.enter();
            exception_report("app", &anyhow::anyhow!("boom"))
        });

        assert!(!report.stack_trace.is_empty());
    }

    #[test]
    fn subscriberがなければスパントレースは空() {
        assert_eq!(span_trace(), "");
    }
}
