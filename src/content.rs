//! File content loading with size limits and binary detection
//!
//! Every failure here is soft: the caller always gets a [`Payload`] back,
//! and unreadable files are described rather than reported as errors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

/// Default maximum number of content bytes embedded per file (1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Number of leading bytes inspected to tell text from binary.
pub const BINARY_SAMPLE_SIZE: usize = 8 * 1024;

/// Share of suspicious bytes in the sample above which a file is binary.
const BINARY_THRESHOLD: f64 = 0.10;

/// Classified, size-bounded content of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Text {
        text: String,
        size: u64,
    },
    /// Only the first `shown` bytes of a file of `original_size` bytes.
    Truncated {
        text: String,
        shown: u64,
        original_size: u64,
    },
    Binary {
        size: u64,
    },
    Unreadable {
        reason: String,
    },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text { .. } => "text",
            Payload::Truncated { .. } => "truncated",
            Payload::Binary { .. } => "binary",
            Payload::Unreadable { .. } => "unreadable",
        }
    }

    /// Embedded text, if any was captured.
    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Text { text, .. } | Payload::Truncated { text, .. } => Some(text),
            Payload::Binary { .. } | Payload::Unreadable { .. } => None,
        }
    }

    /// Size of the file on disk, when known.
    pub fn original_size(&self) -> Option<u64> {
        match self {
            Payload::Text { size, .. } | Payload::Binary { size } => Some(*size),
            Payload::Truncated { original_size, .. } => Some(*original_size),
            Payload::Unreadable { .. } => None,
        }
    }
}

/// Load a file for embedding.
///
/// Reads at most `max(max_file_size, BINARY_SAMPLE_SIZE)` bytes, so an
/// oversized file is never pulled into memory whole.
pub fn load(path: &Path, max_file_size: u64) -> Payload {
    match try_load(path, max_file_size) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("cannot read {}: {}", path.display(), e);
            Payload::Unreadable {
                reason: e.to_string(),
            }
        }
    }
}

fn try_load(path: &Path, max_file_size: u64) -> std::io::Result<Payload> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    let window = max_file_size.max(BINARY_SAMPLE_SIZE as u64);
    let mut buf = Vec::with_capacity(size.min(window) as usize);
    file.take(window).read_to_end(&mut buf)?;

    let sample = &buf[..buf.len().min(BINARY_SAMPLE_SIZE)];
    if is_binary(sample) {
        return Ok(Payload::Binary { size });
    }

    let encoding = detect_encoding(sample);
    let read_len = buf.len() as u64;
    if size > max_file_size || read_len > max_file_size {
        let (text, shown) = decode_prefix(&buf, encoding, max_file_size as usize);
        log::debug!(
            "truncated {} to {} of {} bytes ({})",
            path.display(),
            shown,
            size,
            encoding.name()
        );
        return Ok(Payload::Truncated {
            text,
            shown,
            original_size: size.max(read_len),
        });
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(&buf);
    if had_errors {
        log::debug!("replaced malformed {} sequences in {}", encoding.name(), path.display());
    }
    Ok(Payload::Text {
        text: text.into_owned(),
        size,
    })
}

/// Heuristic text/binary classification of a leading sample.
///
/// A NUL byte means binary outright. Otherwise the sample is binary when more
/// than [`BINARY_THRESHOLD`] of it is invalid UTF-8 or control characters
/// other than common whitespace and escape. A multi-byte character cut off at
/// the end of the sample is not held against it.
pub fn is_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    let mut suspicious = 0usize;
    let mut rest = sample;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                suspicious += count_control(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                suspicious += count_control(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(bad) => {
                        suspicious += bad;
                        rest = &after[bad..];
                    }
                    // Incomplete sequence at the end of the sample.
                    None => break,
                }
            }
        }
    }

    (suspicious as f64 / sample.len() as f64) > BINARY_THRESHOLD
}

fn count_control(text: &str) -> usize {
    text.bytes()
        .filter(|&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b)) || b == 0x7f)
        .count()
}

/// Encoding of a text sample: UTF-8 when it validates, else chardetng's guess.
///
/// A multi-byte character cut off at the end of the sample still counts as
/// valid UTF-8.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    match std::str::from_utf8(sample) {
        Ok(_) => UTF_8,
        Err(e) if e.error_len().is_none() => UTF_8,
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(sample, true);
            detector.guess(None, true)
        }
    }
}

/// Decode at most `limit` bytes of `bytes` into at most `limit` bytes of text.
///
/// Returns the text and the number of source bytes it covers. A UTF-8
/// character split by the cut is dropped, as is anything whose decoded form
/// would not fit in the limit.
fn decode_prefix(bytes: &[u8], encoding: &'static Encoding, limit: usize) -> (String, u64) {
    let mut src = &bytes[..bytes.len().min(limit)];
    if encoding == UTF_8 {
        src = &src[..src.len() - incomplete_tail(src)];
    }

    let mut out = vec![0u8; limit];
    let Ok(dst) = std::str::from_utf8_mut(&mut out) else {
        return (String::new(), 0);
    };
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let (_, read, written, _) = decoder.decode_to_str(src, dst, true);
    (dst[..written].to_string(), read as u64)
}

/// Length of a trailing incomplete UTF-8 sequence, if any.
fn incomplete_tail(bytes: &[u8]) -> usize {
    let tail_start = bytes.len().saturating_sub(3);
    for i in (tail_start..bytes.len()).rev() {
        let b = bytes[i];
        if b & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match b {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return 0,
        };
        let present = bytes.len() - i;
        return if present < width { present } else { 0 };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_load_text_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "hello.txt", b"hi\nthere\n");

        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(
            payload,
            Payload::Text {
                text: "hi\nthere\n".to_string(),
                size: 9
            }
        );
    }

    #[test]
    fn test_empty_file_is_text() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty", b"");

        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(payload.kind(), "text");
        assert_eq!(payload.text(), Some(""));
    }

    #[test]
    fn test_null_byte_in_sample_is_binary() {
        let dir = TempDir::new().unwrap();
        let mut bytes = b"looks like text".to_vec();
        bytes.push(0);
        bytes.extend_from_slice(b"but is not");
        let path = write(&dir, "blob.dat", &bytes);

        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(payload, Payload::Binary { size: bytes.len() as u64 });
        assert!(payload.text().is_none());
    }

    #[test]
    fn test_null_byte_detected_even_with_tiny_limit() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; 5000];
        bytes[4000] = 0;
        let path = write(&dir, "late_null.bin", &bytes);

        let payload = load(&path, 100);
        assert_eq!(payload.kind(), "binary");
    }

    #[test]
    fn test_null_byte_after_sample_is_not_checked() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; BINARY_SAMPLE_SIZE + 100];
        bytes[BINARY_SAMPLE_SIZE + 50] = 0;
        let path = write(&dir, "late.txt", &bytes);

        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(payload.kind(), "text");
    }

    #[test]
    fn test_oversized_file_is_truncated_at_limit() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "big.txt", "x".repeat(20_000).as_bytes());

        let payload = load(&path, 10_000);
        match payload {
            Payload::Truncated {
                text,
                shown,
                original_size,
            } => {
                assert_eq!(text.len(), 10_000);
                assert_eq!(shown, 10_000);
                assert_eq!(original_size, 20_000);
            }
            other => panic!("expected truncated payload, got {:?}", other),
        }
    }

    #[test]
    fn test_file_exactly_at_limit_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "edge.txt", "y".repeat(500).as_bytes());

        assert_eq!(load(&path, 500).kind(), "text");
        assert_eq!(load(&path, 499).kind(), "truncated");
    }

    #[test]
    fn test_truncation_never_splits_a_character() {
        let dir = TempDir::new().unwrap();
        // 'é' is two bytes; a limit of 3 cuts the second one in half.
        let path = write(&dir, "accents.txt", "éééé".as_bytes());

        let payload = load(&path, 3);
        assert_eq!(payload.text(), Some("é"));
        assert!(payload.text().unwrap().len() <= 3);
    }

    #[test]
    fn test_zero_limit_truncates_everything() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.txt", b"abc");

        let payload = load(&path, 0);
        assert_eq!(
            payload,
            Payload::Truncated {
                text: String::new(),
                shown: 0,
                original_size: 3
            }
        );
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let payload = load(Path::new("/nonexistent/file.txt"), DEFAULT_MAX_FILE_SIZE);
        assert_eq!(payload.kind(), "unreadable");
        assert!(payload.original_size().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_denied_is_unreadable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write(&dir, "secret.txt", b"classified");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Root can read anything; only assert when the open actually fails.
        let readable = File::open(&path).is_ok();
        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        if !readable {
            assert_eq!(payload.kind(), "unreadable");
        }
    }

    #[test]
    fn test_is_binary_heuristic() {
        assert!(!is_binary(b""));
        assert!(!is_binary(b"plain ascii\twith\ttabs\r\n"));
        assert!(!is_binary("unicode: 日本語 🦀".as_bytes()));
        assert!(!is_binary(b"\x1b[31mred\x1b[0m"));
        assert!(is_binary(b"\x00"));
        assert!(is_binary(&[0xff, 0xfe, 0xfd, 0xfc, b'a', b'b']));
        assert!(is_binary(&[0x01, 0x02, 0x03, 0x04, b'a']));
    }

    #[test]
    fn test_is_binary_tolerates_few_invalid_bytes() {
        let mut sample = vec![b'a'; 100];
        sample[10] = 0xff;
        assert!(!is_binary(&sample));
    }

    #[test]
    fn test_is_binary_ignores_char_cut_at_sample_end() {
        let mut sample = b"ok".to_vec();
        sample.extend_from_slice(&"日".as_bytes()[..2]);
        assert!(!is_binary(&sample));
    }

    #[test]
    fn test_latin1_text_is_decoded() {
        let dir = TempDir::new().unwrap();
        let mut bytes = b"Le caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b" est tr");
        bytes.push(0xe8);
        bytes.extend_from_slice(b"s bon, servi avec une cr");
        bytes.push(0xe8);
        bytes.extend_from_slice(b"me fra");
        bytes.push(0xee);
        bytes.extend_from_slice(b"che et un g");
        bytes.push(0xe2);
        bytes.extend_from_slice(b"teau.\n");
        let path = write(&dir, "menu.txt", &bytes);

        let payload = load(&path, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(
            payload.text(),
            Some("Le café est très bon, servi avec une crème fraîche et un gâteau.\n")
        );
        assert_eq!(payload.original_size(), Some(bytes.len() as u64));
    }

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"plain ascii"), UTF_8);
        assert_eq!(detect_encoding("naïve".as_bytes()), UTF_8);
        assert_eq!(detect_encoding(&"日".as_bytes()[..2]), UTF_8);
        assert_ne!(detect_encoding(b"na\xefve caf\xe9 cr\xe8me"), UTF_8);
    }

    #[test]
    fn test_truncated_text_never_exceeds_limit() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![0xff, 0xfe];
        bytes.extend_from_slice(&[b'a'; 9000]);
        let path = write(&dir, "odd.txt", &bytes);

        match load(&path, 2) {
            Payload::Truncated {
                text,
                shown,
                original_size,
            } => {
                assert!(text.len() <= 2, "embedded {:?}", text);
                assert!(shown <= 2);
                assert_eq!(original_size, 9002);
            }
            other => panic!("expected truncated payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_prefix_counts_source_bytes() {
        // Two source bytes decode to four bytes of UTF-8
        let (text, shown) = decode_prefix(b"\xe9\xe9\xe9", encoding_rs::WINDOWS_1252, 3);
        assert_eq!(text, "é");
        assert_eq!(shown, 1);

        let (text, shown) = decode_prefix(b"ab\xffcd", UTF_8, 4);
        assert!(text.len() <= 4);
        assert!(text.starts_with("ab"));
        assert!(shown <= 4);
    }

    #[test]
    fn test_default_max_file_size() {
        assert_eq!(DEFAULT_MAX_FILE_SIZE, 1_000_000);
    }
}
