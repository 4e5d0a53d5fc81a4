//! # コマンドライン
//!
//! `errmail` の引数定義とサブコマンドの実行。
//!
//! | サブコマンド | 説明 |
//! |-------------|------|
//! | `send` | メールを送信する |
//! | `render` | テンプレートをレンダリングして標準出力に書く |
//! | `test-error` | サンプルのエラーをエラーメールで通知する |
//!
//! `send` と `test-error` は送信に失敗した場合に終了コード 1 で終了する。

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use errmail_domain::{
    TemplateEngine,
    template::{DEFAULT_PREFIX, DEFAULT_SUFFIX},
};

use crate::{
    config::NotificationConfig,
    usecase::{
        EmailRequest,
        ErrorMailRenderer,
        NotificationService,
        notification::sender_from_config,
    },
};

/// 通知メールの送信とテンプレートのレンダリング
#[derive(Debug, Parser)]
#[command(name = "errmail", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// メールを送信する
    Send(SendArgs),
    /// テンプレートをレンダリングする
    Render(RenderArgs),
    /// サンプルのエラーをエラーメールで通知する
    TestError(TestErrorArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// 送信元（未指定なら NOTIFICATION_FROM_ADDRESS）
    #[arg(long)]
    pub from: Option<String>,

    /// 宛先（`;` 区切り）
    #[arg(long, default_value = "")]
    pub to: String,

    /// CC（`;` 区切り）
    #[arg(long, default_value = "")]
    pub cc: String,

    /// BCC（`;` 区切り）
    #[arg(long, default_value = "")]
    pub bcc: String,

    #[arg(long)]
    pub subject: String,

    /// 本文
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    pub body: Option<String>,

    /// 本文を読み込むファイル
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// 本文を HTML として送信する
    #[arg(long)]
    pub html: bool,

    /// 添付ファイル（複数指定可）
    #[arg(long = "attach", action = clap::ArgAction::Append)]
    pub attachments: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// テンプレートファイル
    #[arg(long)]
    pub template: PathBuf,

    /// パラメータ `NAME=VALUE`（複数指定可）
    #[arg(long = "param", value_parser = parse_param, action = clap::ArgAction::Append)]
    pub params: Vec<(String, String)>,

    /// 値を HTML エンコードする
    #[arg(long)]
    pub html_encode: bool,

    /// 要素を取り除く `ID:ELEMENT`（複数指定可）
    #[arg(long = "remove", value_parser = parse_removal, action = clap::ArgAction::Append)]
    pub removals: Vec<(String, String)>,

    /// 置換されずに残ったプレースホルダを取り除く
    #[arg(long)]
    pub clean_up: bool,

    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,
}

#[derive(Debug, Clone, Args)]
pub struct TestErrorArgs {
    /// 通知するエラーメッセージ
    #[arg(long, default_value = "errmail test-error")]
    pub message: String,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("NAME=VALUE の形式で指定してください: {s}"))
}

fn parse_removal(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((id, element)) if !id.is_empty() && !element.is_empty() => {
            Ok((id.to_string(), element.to_string()))
        }
        _ => Err(format!("ID:ELEMENT の形式で指定してください: {s}")),
    }
}

/// サブコマンドを実行する
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Render(args) => {
            let template = tokio::fs::read_to_string(&args.template)
                .await
                .with_context(|| {
                    format!("テンプレートを読み込めません: {}", args.template.display())
                })?;
            println!("{}", render(&template, &args));
            Ok(ExitCode::SUCCESS)
        }
        Command::Send(args) => {
            let service = service_from_env()?;
            let request = send_request(args, service.config()).await?;
            let sent = service.send_email(request).await?;
            Ok(exit_code(sent))
        }
        Command::TestError(args) => {
            let service = service_from_env()?;
            let error = anyhow::Error::new(std::io::Error::other("サンプルの下位エラー"))
                .context(args.message);
            Ok(exit_code(service.report_error(&error).await))
        }
    }
}

/// テンプレートに引数の操作を順に適用する
///
/// パラメータ置換 → 要素の除去 → 残ったプレースホルダの除去の順。
pub fn render(template: &str, args: &RenderArgs) -> String {
    let mut engine = TemplateEngine::with_delimiters(template, &args.prefix, &args.suffix);
    engine.set_html_encode(args.html_encode);
    for (name, value) in &args.params {
        engine.add_parameter(name, value);
    }
    engine.process();
    for (id, element) in &args.removals {
        engine.remove_placeholder(id, element);
    }
    if args.clean_up {
        engine.clean_up_placeholders();
    }
    engine.into_text()
}

fn service_from_env() -> anyhow::Result<NotificationService> {
    let config = NotificationConfig::from_env().context("通知設定の読み込みに失敗しました")?;
    Ok(NotificationService::new(
        sender_from_config(&config),
        ErrorMailRenderer::new(),
        config,
    ))
}

async fn send_request(
    args: SendArgs,
    config: &NotificationConfig,
) -> anyhow::Result<EmailRequest> {
    let body = match (args.body, args.body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("本文を読み込めません: {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut request = EmailRequest::new(
        args.from.unwrap_or_else(|| config.from_address.clone()),
        args.to,
        args.subject,
        body,
    )
    .with_cc(args.cc)
    .with_bcc(args.bcc);
    request.is_html = args.html;
    request.attachments = args.attachments;
    Ok(request)
}

fn exit_code(sent: bool) -> ExitCode {
    if sent {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("errmail").chain(args.iter().copied())).unwrap()
    }

    fn render_args(args: &[&str]) -> RenderArgs {
        let mut full = vec!["render", "--template", "t.html"];
        full.extend_from_slice(args);
        match parse(&full).command {
            Command::Render(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sendの引数を解析できる() {
        let cli = parse(&[
            "send",
            "--to",
            "a@x.com;b@x.com",
            "--subject",
            "件名",
            "--body",
            "本文",
            "--html",
            "--attach",
            "a.pdf",
            "--attach",
            "b.csv",
        ]);

        let Command::Send(args) = cli.command else {
            panic!("send ではない");
        };
        assert_eq!(args.to, "a@x.com;b@x.com");
        assert_eq!(args.cc, "");
        assert!(args.html);
        assert_eq!(
            args.attachments,
            vec![PathBuf::from("a.pdf"), PathBuf::from("b.csv")]
        );
    }

    #[rstest]
    #[case(&["send", "--subject", "s"])]
    #[case(&["send", "--subject", "s", "--body", "b", "--body-file", "b.txt"])]
    #[case(&["render", "--template", "t.html", "--param", "no-equals"])]
    #[case(&["render", "--template", "t.html", "--remove", "only-id"])]
    fn 不正な引数はエラーになる(#[case] args: &[&str]) {
        let result = Cli::try_parse_from(std::iter::once("errmail").chain(args.iter().copied()));

        assert!(result.is_err());
    }

    #[test]
    fn renderはパラメータ置換と除去を順に適用する() {
        let args = render_args(&[
            "--param",
            "Name=<Tom>",
            "--html-encode",
            "--remove",
            "promo:div",
            "--clean-up",
        ]);
        let template = r#"<p>{$$Name$$}</p><div id="promo">sale</div><p>{$$Missing$$}</p>"#;

        assert_eq!(render(template, &args), "<p>&lt;Tom&gt;</p><p></p>");
    }

    #[test]
    fn renderは値の等号を保持する() {
        let args = render_args(&["--param", "Query=a=b"]);

        assert_eq!(render("{$$Query$$}", &args), "a=b");
    }

    #[test]
    fn renderは区切りを差し替えられる() {
        let args = render_args(&["--prefix", "[[", "--suffix", "]]", "--param", "X=1"]);

        assert_eq!(render("[[X]]-{$$X$$}", &args), "1-{$$X$$}");
    }

    #[tokio::test]
    async fn body_fileから本文を読み込む() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        std::fs::write(&path, "ファイルの本文").unwrap();
        let cli = parse(&[
            "send",
            "--subject",
            "s",
            "--body-file",
            path.to_str().unwrap(),
        ]);
        let Command::Send(args) = cli.command else {
            panic!("send ではない");
        };
        let config = NotificationConfig::from_lookup(|_: &str| None).unwrap();

        let request = send_request(args, &config).await.unwrap();

        assert_eq!(request.body, "ファイルの本文");
        assert_eq!(request.from, "noreply@errmail.example.com");
    }
}
