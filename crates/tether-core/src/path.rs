//!
//! URL path-segment escaping for rendered endpoint paths.
//!

use std::fmt::Write;

/// Escape `value` so it can be placed inside a single URL path segment.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) and the sub-delimiters
/// `$ & + , : ; = @` are kept; every other byte becomes `%XX`.
#[must_use]
pub fn path_escape(value: &str) -> String {
    let extra = value.bytes().filter(|b| !keep(*b)).count();
    if extra == 0 {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + extra * 2);
    for b in value.bytes() {
        if keep(b) {
            out.push(char::from(b));
        } else {
            // writing into a String cannot fail
            let _ = write!(out, "%{b:02X}");
        }
    }

    out
}

/// Inverse of [`path_escape`]; `None` on malformed escapes or invalid UTF-8.
#[must_use]
pub fn path_unescape(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

const fn keep(b: u8) -> bool {
    matches!(
        b,
        b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b'$'
            | b'&'
            | b'+'
            | b','
            | b':'
            | b';'
            | b'='
            | b'@'
    )
}
