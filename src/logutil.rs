//! Logging helpers that keep stored blobs readable on a single log line.

use std::fmt::Write;

/// Characters of a stored record shown when it is logged.
pub const MAX_PREVIEW: usize = 160;

/// Escape a string for single-line logging and cap it at [`MAX_PREVIEW`] chars.
///
/// Newlines, carriage returns, tabs and backslashes are backslash-escaped;
/// other control characters become `\xNN`.
fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Preview of a raw stored value; invalid UTF-8 is replaced, not rejected.
pub fn escape_log_bytes(bytes: &[u8]) -> String {
    escape_log(&String::from_utf8_lossy(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("a\nb\r\tc\\"), "a\\nb\\r\\tc\\\\");
        assert_eq!(escape_log("\u{0}x"), "\\x00x");
    }

    #[test]
    fn truncates_long_blobs() {
        let long = "{".repeat(MAX_PREVIEW + 20);
        let esc = escape_log(&long);
        assert!(esc.ends_with('…'));
        assert_eq!(esc.chars().count(), MAX_PREVIEW + 1);
    }

    #[test]
    fn bytes_preview_tolerates_invalid_utf8() {
        let esc = escape_log_bytes(b"\xff{\"a\"");
        assert!(esc.contains("{\"a\""));
    }
}
