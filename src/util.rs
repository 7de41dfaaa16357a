//! Text helpers shared by the document adapter and the classifiers.

use std::borrow::Cow;

/// Decode page bytes to a string.
///
/// 1. UTF-8 (BOM handled by encoding_rs)
/// 2. The declared encoding, if any
/// 3. Windows-1252
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding named by an XML declaration or a `<meta charset>` near the start of
/// the page.
pub fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    find_quoted_after(prefix, b"encoding=").or_else(|| find_charset(prefix))
}

fn find_quoted_after<'a>(haystack: &'a [u8], key: &[u8]) -> Option<&'a str> {
    let pos = haystack
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let rest = &haystack[pos + key.len()..];
    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = rest[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&rest[1..end]).ok()
}

fn find_charset(haystack: &[u8]) -> Option<&str> {
    if let Some(quoted) = find_quoted_after(haystack, b"charset=") {
        return Some(quoted);
    }
    let key = b"charset=";
    let pos = haystack
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let rest = &haystack[pos + key.len()..];
    let end = rest
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    std::str::from_utf8(&rest[..end]).ok()
}

/// First `max_chars` characters of `text` (Unicode scalar values, not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
