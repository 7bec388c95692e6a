//! Script data block parsing
//!
//! Detail pages ship their hydration data as inline script blocks of the
//! form `AF_initDataCallback({key: 'ds:5', hash: '...', data: [...],
//! sideChannel: {}});`. This module scans the raw page text for those
//! blocks and deserializes each payload into a generic value keyed by its
//! block id. Payloads are JS literals, not strict JSON: single-quoted
//! strings and trailing commas must be tolerated.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use serde_json::Value;
use tracing::warn;

use crate::error::ParseError;

const MARKER: &str = "AF_initDataCallback(";

/// Parse all script data blocks out of a raw detail page.
///
/// Blocks whose payload fails to deserialize are skipped. Duplicate block
/// ids keep the last occurrence, matching how the page overwrites earlier
/// partial blocks with fuller ones. Fails only when zero blocks decode,
/// which means the page shape changed or the fetch returned an error page.
pub fn parse_script_data(page: &str) -> Result<HashMap<String, Value>, ParseError> {
    let mut blocks = HashMap::new();
    let mut cursor = 0;

    while let Some(found) = page[cursor..].find(MARKER) {
        let arg_start = cursor + found + MARKER.len();
        let Some(arg) = balanced_prefix(&page[arg_start..], '(', ')') else {
            // unterminated call, keep scanning past the marker
            cursor = arg_start;
            continue;
        };
        cursor = arg_start + arg.len();

        match parse_block(arg) {
            Some((key, data)) => {
                blocks.insert(key, data);
            }
            None => warn!("skipping undecodable script data block"),
        }
    }

    if blocks.is_empty() {
        return Err(ParseError::NoScriptData);
    }
    Ok(blocks)
}

fn parse_block(arg: &str) -> Option<(String, Value)> {
    let key = quoted_field(arg, "key")?;
    let payload = payload_literal(arg)?;
    let data = parse_loose_literal(payload)?;
    Some((key.to_string(), data))
}

/// Value of a `name: '...'` field inside the callback argument.
/// Accepts single or double quotes around the value.
fn quoted_field<'a>(arg: &'a str, name: &str) -> Option<&'a str> {
    let mut search = 0;
    while let Some(found) = arg[search..].find(name) {
        let after = search + found + name.len();
        let rest = arg[after..].trim_start();
        if let Some(rest) = rest.strip_prefix(':') {
            let rest = rest.trim_start();
            let delim = rest.chars().next()?;
            if delim == '\'' || delim == '"' {
                let body = &rest[1..];
                let end = body.find(delim)?;
                return Some(&body[..end]);
            }
        }
        search = after;
    }
    None
}

/// Byte span of the literal following the top-level `data:` property.
///
/// The scan is string aware so a `data:` occurrence inside a string (e.g. a
/// data: URL in the payload) is never mistaken for the property.
fn payload_literal(arg: &str) -> Option<&str> {
    let bytes = arg.as_bytes();
    let mut string_delim: Option<u8> = None;
    let mut escaped = false;
    // last significant byte seen outside strings; a property name can only
    // follow the object opener or a separator
    let mut prev = b'{';
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(delim) = string_delim {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == delim {
                string_delim = None;
                prev = b'"';
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => {
                string_delim = Some(b);
                i += 1;
            }
            b'd' if bytes[i..].starts_with(b"data") && (prev == b'{' || prev == b',') => {
                let after = arg[i + 4..].trim_start();
                if let Some(rest) = after.strip_prefix(':') {
                    return literal_span(rest.trim_start());
                }
                prev = b'a';
                i += 4;
            }
            _ => {
                if !b.is_ascii_whitespace() {
                    prev = b;
                }
                i += 1;
            }
        }
    }
    None
}

/// The full literal starting at the first byte of `text`: a bracketed
/// container, a quoted string, or a bare primitive up to the next
/// separator.
fn literal_span(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    match first {
        '[' => balanced_prefix(&text[1..], '[', ']').map(|inner| &text[..inner.len() + 2]),
        '{' => balanced_prefix(&text[1..], '{', '}').map(|inner| &text[..inner.len() + 2]),
        '\'' | '"' => {
            let mut escaped = false;
            for (i, c) in text[1..].char_indices() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == first {
                    return Some(&text[..i + 2]);
                }
            }
            None
        }
        _ => {
            let end = text.find([',', '}', ')']).unwrap_or(text.len());
            Some(text[..end].trim_end())
        }
    }
}

/// Span up to the delimiter matching an already-consumed opener, string
/// aware so brackets inside string bodies do not count.
fn balanced_prefix(text: &str, open: char, close: char) -> Option<&str> {
    let mut depth = 1usize;
    let mut string_delim: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(delim) = string_delim {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == delim {
                string_delim = None;
            }
            continue;
        }
        if c == '\'' || c == '"' {
            string_delim = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[..i]);
            }
        }
    }
    None
}

/// Deserialize a script payload literal. Strict JSON is tried first; on
/// failure the literal is normalized and retried.
fn parse_loose_literal(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    serde_json::from_str(&normalize_literal(text)).ok()
}

/// Rewrite a JS literal into strict JSON: single-quoted strings become
/// double-quoted and trailing commas are dropped. The walk is string aware
/// so apostrophes and quotes inside string bodies survive.
fn normalize_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push('"');
                copy_string_body(&mut chars, &mut out, c);
            }
            ',' => {
                let mut lookahead = chars.clone();
                while lookahead.peek().is_some_and(|next| next.is_whitespace()) {
                    lookahead.next();
                }
                // a comma directly before a closing bracket is dropped
                if !matches!(lookahead.peek(), Some(']') | Some('}')) {
                    out.push(',');
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn copy_string_body(chars: &mut Peekable<Chars<'_>>, out: &mut String, delim: char) {
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                // JS-only escape, plain apostrophe in JSON
                Some('\'') if delim == '\'' => out.push('\''),
                Some(esc) => {
                    out.push('\\');
                    out.push(esc);
                }
                None => return,
            },
            '"' if delim == '\'' => out.push_str("\\\""),
            c if c == delim => {
                out.push('"');
                return;
            }
            c => out.push(c),
        }
    }
}
