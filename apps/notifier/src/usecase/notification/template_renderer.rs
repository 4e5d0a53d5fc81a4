//! # エラーメールレンダラー
//!
//! 例外レポートをエラーメールの HTML テンプレートに埋め込む。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: 既定テンプレートはバイナリに埋め込まれる
//! - **4 つのスロット**: `AppName` / `Source` / `Message` / `StackTrace`
//! - **失敗しない**: テンプレートにスロットがなくてもエラーにせず、
//!   対応するプレースホルダはそのまま残る

use errmail_domain::{ExceptionReport, TemplateEngine};

/// 既定のエラーメールテンプレート
pub const ERROR_MAIL_TEMPLATE: &str = include_str!("../../../templates/error_mail.html");

/// エラーメールレンダラー
#[derive(Debug, Clone)]
pub struct ErrorMailRenderer {
    template: String,
}

impl Default for ErrorMailRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorMailRenderer {
    /// 既定テンプレートでレンダラーを作成する
    pub fn new() -> Self {
        Self::with_template(ERROR_MAIL_TEMPLATE)
    }

    /// 任意のテンプレートでレンダラーを作成する
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// 例外レポートを HTML 本文にレンダリングする
    ///
    /// 内側の原因がある場合、各スロットには外側の値と内側の値が
    /// `<br><br>` 区切りで入る。値は HTML エンコードしない。
    pub fn render(&self, app_name: &str, report: &ExceptionReport) -> String {
        let mut engine = TemplateEngine::new(self.template.as_str());
        engine.add_parameter("AppName", app_name);
        engine.add_parameter("Source", report.combined_source());
        engine.add_parameter("Message", report.combined_message());
        engine.add_parameter("StackTrace", report.combined_stack_trace());
        engine.process();
        engine.into_text()
    }
}
