//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 備考 |
//! |---|------------|------|
//! | [`EmailAddress`] | メールアドレス | `user@example.com` または `名前 <user@example.com>` |
//! | [`EmailMessage`] | 送信メール | 送信元・宛先（To/Cc/Bcc）・件名・本文・添付 |
//! | [`EmailAttachment`] | 添付ファイル | 読み込み済みのバイト列と MIME タイプ |
//! | [`NotificationError`] | 通知エラー | 宛先不正・送信失敗など |
//!
//! ## 設計方針
//!
//! - **宛先リストは `;` 区切り**: [`parse_recipients`] で分割し、空要素は読み飛ばす
//! - **不正な宛先は伝播する**: 1 件でも不正なら全体をエラーとし、送信しない
//! - **送信手段とは分離**: 実際の送信はインフラ層の `NotificationSender` が担う

use thiserror::Error;

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メールアドレスの形式が不正
    #[error("メールアドレスの形式が不正です: {0}")]
    InvalidAddress(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// 添付ファイルの読み込みに失敗
    #[error("添付ファイルの読み込みに失敗: {0}")]
    AttachmentFailed(String),
}

// =========================================================================
// EmailAddress（メールアドレス）
// =========================================================================

/// メールアドレス（値オブジェクト）
///
/// 表示名付きの `名前 <user@example.com>` 形式も受け付ける。
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// メールアドレスを作成する
    ///
    /// 前後の空白は取り除く。
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - アドレス部分が `local@domain` の形式で、空白を含まない
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `NotificationError::InvalidAddress` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, NotificationError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(NotificationError::InvalidAddress(
                "メールアドレスが空です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(NotificationError::InvalidAddress(format!(
                "255文字を超えています: {value}"
            )));
        }

        let address = address_part(&value);
        let Some((local, domain)) = address.split_once('@') else {
            return Err(NotificationError::InvalidAddress(value));
        };

        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || address.chars().any(char::is_whitespace)
        {
            return Err(NotificationError::InvalidAddress(value));
        }

        Ok(Self(value))
    }

    /// 入力どおりの文字列参照を取得する（表示名を含む）
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 表示名を除いたアドレス部分を取得する
    pub fn address(&self) -> &str {
        address_part(&self.0)
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// `名前 <addr>` 形式なら `addr` を、それ以外は入力全体を返す
fn address_part(value: &str) -> &str {
    match value.rfind('<') {
        Some(start) if value.ends_with('>') => value[start + 1..value.len() - 1].trim(),
        _ => value,
    }
}

/// `;` 区切りの宛先リストを分割する
///
/// 空または空白のみの要素は読み飛ばす。入力が空なら空のリストを返す。
/// 重複は取り除かない。
///
/// # エラー
///
/// いずれかの要素が不正な形式なら `NotificationError::InvalidAddress` を返す。
pub fn parse_recipients(value: &str) -> Result<Vec<EmailAddress>, NotificationError> {
    value
        .split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(EmailAddress::new)
        .collect()
}

// =========================================================================
// EmailMessage / EmailAttachment
// =========================================================================

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    /// 受信者に見せるファイル名
    pub filename:     String,
    /// MIME タイプ（例: `application/pdf`）
    pub content_type: String,
    /// ファイル内容
    pub content:      Vec<u8>,
}

impl EmailAttachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
        }
    }
}

/// メールメッセージ
///
/// `NotificationSender` に渡される送信単位。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信元
    pub from:        EmailAddress,
    /// 宛先
    pub to:          Vec<EmailAddress>,
    /// CC
    pub cc:          Vec<EmailAddress>,
    /// BCC
    pub bcc:         Vec<EmailAddress>,
    /// 件名
    pub subject:     String,
    /// 本文
    pub body:        String,
    /// 本文が HTML か
    pub is_html:     bool,
    /// 添付ファイル
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    /// 添付なし・宛先なしのメッセージを作成する
    pub fn new(from: EmailAddress, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            body: body.into(),
            is_html: false,
            attachments: Vec::new(),
        }
    }

    /// To / Cc / Bcc を合わせた宛先数
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // ===== NotificationError =====

    fn error_kind(error: &NotificationError) -> &'static str {
        match error {
            NotificationError::InvalidAddress(_) => "invalid_address",
            NotificationError::SendFailed(_) => "send_failed",
            NotificationError::AttachmentFailed(_) => "attachment_failed",
        }
    }

    #[rstest]
    #[case(NotificationError::InvalidAddress("x".to_string()), "invalid_address", "メールアドレスの形式が不正です: x")]
    #[case(NotificationError::SendFailed("x".to_string()), "send_failed", "メール送信に失敗: x")]
    #[case(NotificationError::AttachmentFailed("x".to_string()), "attachment_failed", "添付ファイルの読み込みに失敗: x")]
    fn test_通知エラーは宛先送信添付の3種類(
        #[case] error: NotificationError,
        #[case] kind: &str,
        #[case] message: &str,
    ) {
        assert_eq!(error_kind(&error), kind);
        assert_eq!(error.to_string(), message);
    }

    // ===== EmailAddress =====

    #[rstest]
    #[case("user@example.com", "user@example.com")]
    #[case("  user@example.com ", "user@example.com")]
    #[case("Taro Yamada <taro@example.com>", "taro@example.com")]
    #[case("<ops@example.com>", "ops@example.com")]
    fn test_メールアドレスは正常な形式を受け入れる(
        #[case] input: &str,
        #[case] address: &str,
    ) {
        let email = EmailAddress::new(input).unwrap();
        assert_eq!(email.address(), address);
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("no-at-sign", "@記号なし")]
    #[case("@", "@のみ")]
    #[case("@example.com", "ローカル部分が空")]
    #[case("user@", "ドメイン部分が空")]
    #[case("a@b@example.com", "@が複数")]
    #[case("us er@example.com", "空白を含む")]
    #[case(&format!("{}@example.com", "a".repeat(256)), "255文字超過")]
    fn test_メールアドレスは不正な形式を拒否する(
        #[case] input: &str,
        #[case] _reason: &str,
    ) {
        assert!(matches!(
            EmailAddress::new(input),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_from_strで生成できる() {
        let email: EmailAddress = "ops@example.com".parse().unwrap();
        assert_eq!(email.to_string(), "ops@example.com");
    }

    // ===== parse_recipients =====

    #[test]
    fn test_セミコロン区切りを個別の宛先に分割する() {
        let recipients = parse_recipients("a@x.com;b@x.com").unwrap();

        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].as_str(), "a@x.com");
        assert_eq!(recipients[1].as_str(), "b@x.com");
    }

    #[rstest]
    #[case("")]
    #[case(";")]
    #[case("  ;  ; ")]
    fn test_空の宛先リストは空のvecを返す(#[case] input: &str) {
        assert!(parse_recipients(input).unwrap().is_empty());
    }

    #[test]
    fn test_空要素と前後の空白を読み飛ばす() {
        let recipients = parse_recipients(" a@x.com ;; ;b@x.com;").unwrap();

        let addresses: Vec<&str> = recipients.iter().map(EmailAddress::as_str).collect();
        assert_eq!(addresses, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn test_不正な宛先が1件でもあればエラーを返す() {
        let result = parse_recipients("a@x.com;not-an-address");

        assert!(matches!(result, Err(NotificationError::InvalidAddress(v)) if v == "not-an-address"));
    }

    // ===== EmailMessage =====

    #[test]
    fn test_recipient_countは全宛先を数える() {
        let mut message = EmailMessage::new(
            EmailAddress::new("from@example.com").unwrap(),
            "件名",
            "本文",
        );
        message.to = parse_recipients("a@x.com;b@x.com").unwrap();
        message.bcc = parse_recipients("c@x.com").unwrap();

        assert_eq!(message.recipient_count(), 3);
        assert!(!message.is_html);
    }
}
