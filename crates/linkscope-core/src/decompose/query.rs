//! Query string decoding and permissive parameter extraction.

use std::collections::BTreeMap;

/// Parses a raw query string (without the leading `?`) into a parameter map.
///
/// Escaped text is decoded before pairs are split, so `&` written as
/// `\u0026` or `%26` still separates parameters. Pairs split on the first `=`
/// only; empty pairs from repeated `&` are skipped; a bare key maps to `""`;
/// the last occurrence of a key wins.
pub fn parse_query(raw: &str) -> BTreeMap<String, String> {
    let decoded = decode_query(raw);
    let mut params = BTreeMap::new();
    for pair in decoded.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        params.insert(key.to_string(), value.to_string());
    }
    params
}

/// Decodes `\uXXXX` escapes, then percent-encoded bytes.
///
/// Malformed escapes are left as written; invalid UTF-8 after percent
/// decoding is replaced lossily.
pub fn decode_query(raw: &str) -> String {
    let unescaped = unescape_unicode(raw);
    let bytes = urlencoding::decode_binary(unescaped.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Replaces `\uXXXX` sequences (including UTF-16 surrogate pairs) with the
/// characters they encode.
pub(crate) fn unescape_unicode(input: &str) -> String {
    if !input.contains("\\u") {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        match hex4(after) {
            Some(high @ 0xD800..=0xDBFF) => {
                let low = after
                    .get(4..)
                    .and_then(|s| s.strip_prefix("\\u"))
                    .and_then(hex4)
                    .filter(|low| (0xDC00..=0xDFFF).contains(low));
                match low {
                    Some(low) => {
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        out.extend(char::from_u32(code));
                        rest = &after[10..];
                    }
                    None => {
                        out.push_str("\\u");
                        rest = after;
                    }
                }
            }
            Some(code) => match char::from_u32(code) {
                Some(c) => {
                    out.push(c);
                    rest = &after[4..];
                }
                None => {
                    out.push_str("\\u");
                    rest = after;
                }
            },
            None => {
                out.push_str("\\u");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
