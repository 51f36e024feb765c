use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Bytes inspected when guessing the text encoding.
pub const DETECTION_SAMPLE_BYTES: usize = 50_000;

/// Guess the encoding of `bytes` from its first `DETECTION_SAMPLE_BYTES`.
///
/// A byte-order mark wins. A sample that is valid UTF-8 (a character cut at
/// the sample boundary is tolerated) is UTF-8. Anything else goes to the
/// statistical detector. An empty sample falls back to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE_BYTES)];
    if sample.is_empty() {
        return UTF_8;
    }

    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return UTF_8,
        Err(e) if e.error_len().is_none() && sample.len() < bytes.len() => return UTF_8,
        Err(_) => {}
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

/// Decode the full body with the detected encoding, stripping any BOM.
pub fn decode_text(bytes: &[u8]) -> (String, &'static Encoding) {
    let encoding = detect_encoding(bytes);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            "Input is not clean {}; undecodable bytes were replaced",
            used.name()
        );
    }
    (text.into_owned(), used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_16LE};

    #[test]
    fn test_plain_ascii_is_utf8() {
        assert_eq!(detect_encoding(b"company,RD_0\nA,1\n"), UTF_8);
    }

    #[test]
    fn test_empty_input_falls_back_to_utf8() {
        assert_eq!(detect_encoding(b""), UTF_8);
        let (text, encoding) = decode_text(b"");
        assert!(text.is_empty());
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_bom_is_honoured_and_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("company\nÅngström\n".as_bytes());
        let (text, encoding) = decode_text(&bytes);
        assert_eq!(encoding, UTF_8);
        assert_eq!(text, "company\nÅngström\n");

        let utf16: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("a,b".encode_utf16().flat_map(|u| u.to_le_bytes()))
            .collect();
        assert_eq!(detect_encoding(&utf16), UTF_16LE);
        assert_eq!(decode_text(&utf16).0, "a,b");
    }

    #[test]
    fn test_multibyte_char_cut_at_sample_boundary() {
        let mut text = "a".repeat(DETECTION_SAMPLE_BYTES - 1);
        text.push('é');
        assert_eq!(detect_encoding(text.as_bytes()), UTF_8);
    }

    #[test]
    fn test_legacy_chinese_export_is_detected() {
        let source = "company,industry,RD_0\n平安银行,银行业,0.5\n招商银行,银行业,0.7\n万科企业,房地产业,0.2\n";
        let repeated = source.repeat(20);
        let (bytes, _, _) = GBK.encode(&repeated);
        assert!(std::str::from_utf8(&bytes).is_err());

        let (text, _) = decode_text(&bytes);
        assert!(text.starts_with("company,industry,RD_0\n平安银行"));
    }
}
