//! # テンプレートエンジン
//!
//! HTML テンプレート文字列中のプレースホルダを、登録済みパラメータの値で
//! 置換する。テンプレート言語ではなく、区切り文字で囲まれたトークンの
//! リテラル置換のみを行う。
//!
//! ## ドメイン用語
//!
//! | 型 / 用語 | 意味 |
//! |---|---|
//! | プレースホルダ | `prefix + パラメータ名 + suffix` 形式のトークン（既定: `{$$Name$$}`） |
//! | [`ParameterValue`] | 置換後の文字列（呼び出し側で文字列化済み） |
//! | [`TemplateEngine`] | テキストバッファとパラメータ表を保持し、置換を行う |
//!
//! ## 設計方針
//!
//! - **レンダリングごとに生成**: インスタンスは 1 回のレンダリングで使い捨てる
//! - **後勝ち**: 同名パラメータを再登録すると値を上書きする
//! - **値のみエンコード**: HTML エンコードは置換値にのみ適用し、
//!   プレースホルダ自体はエンコードしない
//! - **必ず停止する後始末**: 未解決プレースホルダの除去は入力長から求めた
//!   パス数の上限付き
//!
//! ## 使用例
//!
//! ```rust
//! use errmail_domain::template::TemplateEngine;
//!
//! let mut engine = TemplateEngine::new("<p>{$$Greeting$$}, {$$Name$$}{$$Unused$$}</p>");
//! engine.add_parameter("Greeting", "Hello");
//! engine.add_parameter("Name", "World");
//! engine.process();
//! engine.clean_up_placeholders();
//!
//! assert_eq!(engine.text(), "<p>Hello, World</p>");
//! ```

use std::collections::BTreeMap;

use derive_more::Display;
use regex::RegexBuilder;

/// 既定のプレースホルダ接頭辞
pub const DEFAULT_PREFIX: &str = "{$$";

/// 既定のプレースホルダ接尾辞
pub const DEFAULT_SUFFIX: &str = "$$}";

// =========================================================================
// ParameterValue（置換値）
// =========================================================================

/// プレースホルダの置換値（値オブジェクト）
///
/// 呼び出し側で文字列化した値を保持する。値なし（`None`）は空文字列に
/// 正規化されるため、`"null"` のような文字列が出力されることはない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct ParameterValue(String);

impl ParameterValue {
    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for ParameterValue {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

// =========================================================================
// TemplateEngine
// =========================================================================

/// テンプレートエンジン
///
/// テキストバッファをその場で書き換えながら置換を進める。
/// 典型的な流れは「パラメータ登録 → [`process`](Self::process) →
/// [`text`](Self::text) で取り出し」。
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    text:             String,
    prefix:           String,
    suffix:           String,
    html_encode:      bool,
    parameters:       BTreeMap<String, ParameterValue>,
    encode_overrides: BTreeMap<String, bool>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new("")
    }
}

impl TemplateEngine {
    /// 既定の区切り文字でエンジンを作成する
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_delimiters(text, DEFAULT_PREFIX, DEFAULT_SUFFIX)
    }

    /// 区切り文字を指定してエンジンを作成する
    pub fn with_delimiters(
        text: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            text:             text.into(),
            prefix:           prefix.into(),
            suffix:           suffix.into(),
            html_encode:      false,
            parameters:       BTreeMap::new(),
            encode_overrides: BTreeMap::new(),
        }
    }

    // ----- アクセサ -----

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// バッファを取り出してエンジンを破棄する
    pub fn into_text(self) -> String {
        self.text
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.suffix = suffix.into();
    }

    /// 置換値を HTML エンコードするか（グローバル設定）
    pub fn html_encode(&self) -> bool {
        self.html_encode
    }

    pub fn set_html_encode(&mut self, html_encode: bool) {
        self.html_encode = html_encode;
    }

    /// 登録済みパラメータ（名前順）
    pub fn parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameters
    }

    // ----- パラメータ操作 -----

    /// パラメータを登録する
    ///
    /// 同名のパラメータが既にあれば値を上書きする。値なし（`None`）は
    /// 空文字列として登録される。
    ///
    /// 名前が空の場合は登録せず `false` を返す。
    pub fn add_parameter(&mut self, name: &str, value: impl Into<ParameterValue>) -> bool {
        if name.is_empty() {
            return false;
        }
        self.parameters.insert(name.to_string(), value.into());
        true
    }

    /// パラメータを登録し、このパラメータだけの HTML エンコード指定を記録する
    ///
    /// 指定はグローバル設定より優先されるが、エンコードが行われるのは
    /// グローバル設定も有効な場合に限る。
    pub fn add_parameter_with_encoding(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
        html_encode: bool,
    ) -> bool {
        if !self.add_parameter(name, value) {
            return false;
        }
        self.encode_overrides.insert(name.to_string(), html_encode);
        true
    }

    /// パラメータ表を空にする
    ///
    /// パラメータ個別のエンコード指定は消さない。後で同名パラメータを
    /// 再登録すると、以前の指定がそのまま効く。
    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    /// プレースホルダのリテラル表記を返す
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.suffix)
    }

    fn should_encode(&self, name: &str) -> bool {
        self.html_encode
            && self
                .encode_overrides
                .get(name)
                .copied()
                .unwrap_or(self.html_encode)
    }

    // ----- 置換 -----

    /// 登録済みの全パラメータについてプレースホルダを置換する
    ///
    /// 大文字小文字を区別するリテラル検索で、出現箇所をすべて置き換える。
    /// 未登録のプレースホルダはそのまま残る。
    pub fn process(&mut self) {
        for (name, value) in &self.parameters {
            let placeholder = format!("{}{}{}", self.prefix, name, self.suffix);
            if !self.text.contains(&placeholder) {
                continue;
            }

            let replacement = if self.should_encode(name) {
                tera::escape_html(value.as_str())
            } else {
                value.as_str().to_string()
            };

            self.text = self.text.replace(&placeholder, &replacement);
        }
    }

    /// `id` 属性で指定した HTML 要素を中身ごと削除する
    ///
    /// `<element ... id="id" ...>` から最初の `</element>` までを、
    /// 大文字小文字を区別せず、改行をまたいで削除する。
    /// `id` と `element` は正規表現ではなくリテラルとして扱う。
    ///
    /// `id`、`element`、バッファのいずれかが空なら何もしない。
    pub fn remove_placeholder(&mut self, id: &str, element: &str) {
        if id.is_empty() || element.is_empty() || self.text.is_empty() {
            return;
        }

        let element = regex::escape(element);
        let id = regex::escape(id);
        let pattern = format!(r#"<{element}[^>]*?id="{id}"[^>]*?>.*?</{element}>"#);

        let regex = match RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!(error = %e, %pattern, "要素削除パターンの構築に失敗");
                return;
            }
        };

        let removed = regex.replace_all(&self.text, "").into_owned();
        self.text = removed;
    }

    /// 未解決のプレースホルダをすべて取り除く
    ///
    /// 接頭辞ごとに、その後ろで最初に現れる接尾辞までを削除する。
    /// 削除によって新たにトークンが形成される場合に備えて、何も削除されなく
    /// なるまでパスを繰り返す。1 パスで少なくとも接頭辞と接尾辞の長さの和だけ
    /// 短くなるため、パス数は `text.len() / (prefix.len() + suffix.len()) + 1`
    /// を超えない。
    ///
    /// 対応する接尾辞のない接頭辞はそのまま残す。区切り文字のどちらかが
    /// 空の場合は何もしない。
    pub fn clean_up_placeholders(&mut self) {
        if self.prefix.is_empty() || self.suffix.is_empty() {
            return;
        }

        let max_passes = self.text.len() / (self.prefix.len() + self.suffix.len()) + 1;
        for _ in 0..max_passes {
            let (cleaned, removed) = strip_placeholders(&self.text, &self.prefix, &self.suffix);
            if removed == 0 {
                return;
            }
            self.text = cleaned;
        }
    }
}

/// 1 パス分のプレースホルダ除去を行い、結果と除去数を返す
fn strip_placeholders(text: &str, prefix: &str, suffix: &str) -> (String, usize) {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;
    let mut removed = 0;

    while let Some(start) = rest.find(prefix) {
        let after_prefix = &rest[start + prefix.len()..];
        let Some(end) = after_prefix.find(suffix) else {
            break;
        };
        cleaned.push_str(&rest[..start]);
        rest = &after_prefix[end + suffix.len()..];
        removed += 1;
    }
    cleaned.push_str(rest);

    (cleaned, removed)
}
