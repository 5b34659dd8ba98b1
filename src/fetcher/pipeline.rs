use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use tracing::debug;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Bytes scanned for `<meta>` charset declarations and by the detector.
const SNIFF_WINDOW: usize = 4096;

/// Picks the body encoding: Content-Type header, then `<meta charset>`,
/// then `http-equiv`, then statistical detection.
pub fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = labelled(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_WINDOW)];
    let head_str = String::from_utf8_lossy(head);
    for pattern in [&*META_CHARSET, &*META_HTTP_EQUIV] {
        if let Some(encoding) = labelled(pattern, &head_str) {
            return encoding;
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_WINDOW);
    detector.guess(None, true)
}

fn labelled(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Decodes the body, replacing malformed sequences rather than failing the page.
pub fn decode_body(content_type: &str, body: &[u8]) -> (String, &'static str) {
    let encoding = detect_encoding(content_type, body);
    let (decoded, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(
            "body contained sequences invalid in {}; replaced",
            used.name()
        );
    }
    (decoded.into_owned(), used.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_from_content_type() {
        let body = b"<html><head><title>Test</title></head></html>";
        let encoding = detect_encoding("text/html; charset=utf-8", body);
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_encoding_from_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";
        // encoding_rs maps ISO-8859-1 onto its windows-1252 superset
        assert_eq!(detect_encoding("text/html", body), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_encoding_from_http_equiv() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"><title>Test</title></head></html>";
        assert_eq!(detect_encoding("text/html", body), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_decode_latin1_title() {
        let body = b"<html><head><meta charset=\"windows-1252\"><title>Caf\xe9</title></head></html>";
        let (decoded, label) = decode_body("text/html", body);
        assert!(decoded.contains("Café"));
        assert_eq!(label, "windows-1252");
    }

    #[test]
    fn test_decode_utf8() {
        let (decoded, _) = decode_body("text/html; charset=utf-8", "Hello, 世界!".as_bytes());
        assert_eq!(decoded, "Hello, 世界!");
    }
}
