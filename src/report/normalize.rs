//! Cleanup of serialization artifacts in extracted report text.
//!
//! Reports sometimes arrive double-encoded: literal `\n` sequences, `\uXXXX`
//! escapes, a byte-order mark, Windows line endings. [`normalize`] repairs
//! these and leaves everything else untouched.

const BOM: char = '\u{feff}';

/// Repair escape artifacts, strip a leading BOM and unify line endings.
///
/// Idempotent: running it on its own output changes nothing. To keep that
/// property, a `\u`/`\U` escape is left as written when the character it
/// names could re-form an escape (the backslash, `n` `t` `r` `u` `U`, hex
/// digits), is the BOM, or is not a valid scalar value.
pub fn normalize(text: &str) -> String {
    let text = text.trim_start_matches(BOM);
    if !text.contains(['\\', '\r']) {
        return text.to_string();
    }
    let unescaped = unescape(text);
    normalize_line_endings(&unescaped)
}

fn unescape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let decoded = match chars.get(i + 1) {
            Some('n') => Some(('\n', 2)),
            Some('t') => Some(('\t', 2)),
            Some('r') => Some(('\r', 2)),
            Some('u') => decode_utf16_escape(&chars[i..]),
            Some('U') => decode_hex(&chars[i + 2..], 8)
                .and_then(char::from_u32)
                .map(|c| (c, 10)),
            _ => None,
        };
        match decoded {
            Some((c, len)) if !reforms_artifact(c) => {
                out.push(c);
                i += len;
            }
            _ => {
                out.push('\\');
                i += 1;
            }
        }
    }
    out
}

/// `\uXXXX`, joining a `\uD8xx\uDCxx` surrogate pair into one character.
fn decode_utf16_escape(chars: &[char]) -> Option<(char, usize)> {
    let unit = decode_hex(chars.get(2..)?, 4)?;
    match unit {
        0xD800..=0xDBFF => {
            if chars.get(6) != Some(&'\\') || chars.get(7) != Some(&'u') {
                return None;
            }
            let low = decode_hex(chars.get(8..)?, 4)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return None;
            }
            let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(scalar).map(|c| (c, 12))
        }
        0xDC00..=0xDFFF => None,
        _ => char::from_u32(unit).map(|c| (c, 6)),
    }
}

fn decode_hex(chars: &[char], width: usize) -> Option<u32> {
    let digits = chars.get(..width)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| c.to_digit(16).map(|d| (acc << 4) | d))
}

fn reforms_artifact(c: char) -> bool {
    c.is_ascii_hexdigit() || matches!(c, '\\' | 'n' | 't' | 'r' | 'u' | 'U' | BOM)
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
