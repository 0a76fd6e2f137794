//! Byte-level text utilities shared by the spec parser and the replacer.
//!
//! Everything here works in byte-index space on UTF-8 strings. The
//! whitespace classifier recognises ASCII whitespace plus the Unicode
//! space separators that show up in copy-pasted source code, so that
//! cell trimming and line-edge checks do not get fooled by a NBSP.

/// Returns the byte width (1, 2 or 3) of the whitespace codepoint starting
/// at `i`, or 0 when `bytes[i]` does not start a whitespace codepoint.
///
/// Recognised beyond ASCII: U+00A0, U+1680, U+2000..U+200A, U+2028, U+2029,
/// U+202F, U+205F, U+3000 and U+FEFF (25 codepoints in total).
///
/// Only valid when `i` is on a codepoint boundary.
pub fn whitespace_width(bytes: &[u8], i: usize) -> usize {
    let first = match bytes.get(i) {
        Some(b) => *b,
        None => return 0,
    };
    // is_ascii_whitespace() leaves out vertical tab; the classifier counts
    // all six ASCII whitespace bytes.
    if first.is_ascii_whitespace() || first == 0x0B {
        return 1;
    }
    if first < 0x80 {
        return 0;
    }
    let second = match bytes.get(i + 1) {
        Some(b) => *b,
        None => return 0,
    };
    if first == 0xC2 && second == 0xA0 {
        return 2; // U+00A0
    }
    let third = match bytes.get(i + 2) {
        Some(b) => *b,
        None => return 0,
    };
    match (first, second) {
        (0xE1, 0x9A) if third == 0x80 => 3, // U+1680
        (0xE3, 0x80) if third == 0x80 => 3, // U+3000
        (0xEF, 0xBB) if third == 0xBF => 3, // U+FEFF
        (0xE2, 0x81) if third == 0x9F => 3, // U+205F
        (0xE2, 0x80) => {
            // U+2000..U+200A, U+2028, U+2029, U+202F
            if (0x80..=0x8A).contains(&third) || third == 0xAF || third == 0xA8 || third == 0xA9 {
                3
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Byte index of the last byte of the last non-whitespace codepoint in
/// `bytes`, or `None` when the slice is empty or all whitespace.
///
/// Walks backwards, backing across UTF-8 continuation bytes (`0b10xxxxxx`)
/// to land on codepoint lead bytes before classifying.
pub fn last_non_whitespace(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }
    let mut it = bytes.len() - 1;
    loop {
        let index = it;
        while (bytes[it] & 0xC0) == 0x80 && it > 0 {
            it -= 1;
        }
        if whitespace_width(bytes, it) != 0 {
            if it == 0 {
                return None;
            }
            it -= 1;
        } else {
            return Some(index);
        }
    }
}

/// A string is multi-line when it contains an interior `\n` or `\r` that is
/// not adjacent to another newline character and not at either endpoint.
/// Leading/trailing newline runs therefore do not count.
pub fn is_multiline(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    for i in 1..bytes.len() - 1 {
        if (bytes[i] == b'\n' || bytes[i] == b'\r')
            && bytes[i - 1] != b'\n'
            && bytes[i - 1] != b'\r'
            && bytes[i + 1] != b'\n'
            && bytes[i + 1] != b'\r'
        {
            return true;
        }
    }
    false
}

/// Splits `s` on `\n`, retaining the `\n` on every line except the last.
/// Concatenating the result reproduces `s` exactly.
pub fn split_lines(s: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            lines.push(s[start..=i].to_string());
            start = i + 1;
        }
    }
    if start < s.len() || lines.is_empty() {
        lines.push(s[start..].to_string());
    }
    lines
}

/// Char-level view of the classifier, for callers that walk `char`s
/// instead of bytes.
pub fn is_whitespace_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    whitespace_width(c.encode_utf8(&mut buf).as_bytes(), 0) != 0
}

/// Replaces control and non-ASCII bytes with `?` so untrusted text can be
/// echoed to a terminal without smuggling escape sequences.
pub fn sanitize_message(input: &str) -> String {
    input
        .bytes()
        .map(|b| if (32..127).contains(&b) { b as char } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_finds_exactly_25_bmp_whitespace_codepoints() {
        let mut found = 0u32;
        for cp in 0u32..=0xFFFF {
            let Some(c) = char::from_u32(cp) else { continue };
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf);
            if whitespace_width(encoded.as_bytes(), 0) != 0 {
                found += 1;
            }
        }
        assert_eq!(found, 25);
    }

    #[test]
    fn classifier_reports_byte_widths() {
        assert_eq!(whitespace_width(b" x", 0), 1);
        assert_eq!(whitespace_width(b"\tx", 0), 1);
        assert_eq!(whitespace_width(b"\x0Bx", 0), 1);
        assert_eq!(whitespace_width("\u{00A0}x".as_bytes(), 0), 2);
        assert_eq!(whitespace_width("\u{2003}x".as_bytes(), 0), 3);
        assert_eq!(whitespace_width("\u{FEFF}".as_bytes(), 0), 3);
        assert_eq!(whitespace_width(b"ax", 0), 0);
    }

    #[test]
    fn last_non_whitespace_trims_unicode_spaces() {
        assert_eq!(last_non_whitespace(b"abc  "), Some(2));
        assert_eq!(last_non_whitespace("ab\u{00A0}".as_bytes()), Some(1));
        assert_eq!(last_non_whitespace(b"   "), None);
        assert_eq!(last_non_whitespace(b""), None);
        // Multi-byte non-whitespace tail: index of its final byte.
        let s = "a\u{00E9}"; // 'é' is two bytes
        assert_eq!(last_non_whitespace(s.as_bytes()), Some(2));
    }

    #[test]
    fn multiline_ignores_edge_newlines() {
        assert!(is_multiline("a\nb"));
        assert!(is_multiline("if (a) {\n  b();\n}"));
        assert!(!is_multiline("abc"));
        assert!(!is_multiline("abc\n"));
        assert!(!is_multiline("\nabc"));
    }

    #[test]
    fn multiline_requires_isolated_newline() {
        // A doubled newline has a newline neighbour on one side at every
        // position, so it never satisfies the isolation test by itself.
        assert!(!is_multiline("a\n\n"));
        assert!(!is_multiline("a\n\nb"));
        assert!(is_multiline("a\nb\n"));
    }

    #[test]
    fn split_lines_round_trips() {
        for s in ["", "a", "a\n", "a\nb", "a\nb\n", "\n", "\n\n", "x\n\ny\n"] {
            assert_eq!(split_lines(s).concat(), s);
        }
    }

    #[test]
    fn split_lines_keeps_newlines_on_all_but_last() {
        let lines = split_lines("a\nb\nc");
        assert_eq!(lines, vec!["a\n", "b\n", "c"]);
    }

    #[test]
    fn sanitize_masks_control_bytes() {
        assert_eq!(sanitize_message("ok\x1b[33m"), "ok?[33m");
        assert_eq!(sanitize_message("plain"), "plain");
    }
}
