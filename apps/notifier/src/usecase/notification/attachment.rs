//! # 添付ファイルの読み込み
//!
//! パスのリストから添付ファイルを読み込む。
//!
//! - 空のパスと存在しないパスは黙って読み飛ばす
//! - 読み込みに失敗したファイルは警告を出して読み飛ばす
//! - MIME タイプは拡張子から推定し、不明なら `application/octet-stream`

use std::path::{Path, PathBuf};

use errmail_domain::EmailAttachment;
use errmail_shared::event_log::error;

/// 添付ファイルを読み込む
///
/// 読み込めなかったファイルは結果に含めない。送信自体は止めない。
pub async fn load_attachments(paths: &[PathBuf]) -> Vec<EmailAttachment> {
    let mut attachments = Vec::with_capacity(paths.len());

    for path in paths {
        if path.as_os_str().is_empty() {
            continue;
        }

        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                tracing::debug!(path = %path.display(), "添付ファイルが存在しないためスキップ");
                continue;
            }
        }

        match tokio::fs::read(path).await {
            Ok(content) => attachments.push(EmailAttachment::new(
                file_name(path),
                mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .to_string(),
                content,
            )),
            Err(e) => {
                tracing::warn!(
                    error.category = error::category::FILESYSTEM,
                    error.kind = error::kind::ATTACHMENT_READ,
                    path = %path.display(),
                    error = %e,
                    "添付ファイルの読み込みに失敗したためスキップ"
                );
            }
        }
    }

    attachments
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
