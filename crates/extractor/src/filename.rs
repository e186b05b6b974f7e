//! # 保存ファイル名の決定
//!
//! URLのベース名（またはContent-Dispositionのfilename）から
//! ローカル保存先のファイル名を決定し、拡張子を許可リストに正規化する。

use std::path::Path;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;

/// 許可する拡張子（小文字、先頭ドット付き）。
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".png", ".jpeg", ".jpg", ".gif"];

/// 許可リスト外の拡張子に付与する拡張子。
pub const FALLBACK_EXTENSION: &str = ".png";

/// ベース名が得られない場合のファイル名（拡張子なし）。
const DEFAULT_STEM: &str = "asset";

/// 許可リスト外の拡張子の扱い。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionFallback {
    /// 元の名前の末尾に `.png` を付与する（`photo.webp` → `photo.webp.png`）
    #[default]
    Append,
    /// 元の拡張子を `.png` で置き換える（`photo.webp` → `photo.png`）
    Replace,
}

impl FromStr for ExtensionFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(ExtensionFallback::Append),
            "replace" => Ok(ExtensionFallback::Replace),
            other => Err(format!(
                "EXTENSION_FALLBACKは append または replace である必要があります: {other}"
            )),
        }
    }
}

/// 拡張子が許可リストに含まれるかを判定する（大文字小文字を区別しない）。
pub fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let dotted = format!(".{}", ext.to_ascii_lowercase());
            ALLOWED_EXTENSIONS.contains(&dotted.as_str())
        })
        .unwrap_or(false)
}

/// 許可リストに従ってファイル名の拡張子を正規化する。
pub fn normalize_extension(name: &str, fallback: ExtensionFallback) -> String {
    if has_allowed_extension(name) {
        return name.to_string();
    }

    match fallback {
        ExtensionFallback::Append => format!("{name}{FALLBACK_EXTENSION}"),
        ExtensionFallback::Replace => {
            let stem = Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name);
            format!("{stem}{FALLBACK_EXTENSION}")
        }
    }
}

/// URLパスの最後のセグメントをパーセントデコードして返す。
/// クエリ文字列・フラグメントは含まない。
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())?;

    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    sanitize(&decoded)
}

/// Content-Dispositionヘッダからfilenameを取り出す。
///
/// `filename*=UTF-8''...` を `filename=` より優先する。
pub fn file_name_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in header.split(';').map(str::trim) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim().trim_matches('"');
                // charset'lang'value
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned());
            }
            "filename" => {
                plain = Some(value.trim().trim_matches('"').to_string());
            }
            _ => {}
        }
    }

    extended.or(plain).and_then(|name| sanitize(&name))
}

/// 保存先ファイル名を決定する。
///
/// Content-Dispositionのfilenameがあればそれを、なければURLのベース名を使う。
/// どちらも得られない場合は `asset` とし、拡張子を正規化する。
pub fn resolve_file_name(
    url: &Url,
    content_disposition: Option<&str>,
    fallback: ExtensionFallback,
) -> String {
    let name = content_disposition
        .and_then(file_name_from_content_disposition)
        .or_else(|| file_name_from_url(url))
        .unwrap_or_else(|| DEFAULT_STEM.to_string());

    normalize_extension(&name, fallback)
}

/// ディレクトリ成分を取り除き、ファイル名として安全な部分だけを残す。
fn sanitize(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches('\0');

    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}
