//! Percent-coding helpers shared by the matcher and the URL builder.
//!
//! Request paths are decoded once before matching. Canonical paths and built
//! URLs are encoded segment by segment so that separators survive while
//! everything else round-trips through `urlencoding`. Redirect targets pass
//! through [`sanitize_location`] so a hostile request line can never smuggle
//! raw control bytes into a `Location` header.

/// Decodes percent-escapes in a path.
///
/// Returns `None` when an escape is truncated or malformed, or when the
/// decoded bytes are not valid UTF-8. `+` is left alone: this is path
/// decoding, not form decoding.
#[must_use]
pub fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_owned());
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            if i + 2 >= bytes.len() {
                return None;
            }
            let hi = hex_value(bytes[i + 1])?;
            let lo = hex_value(bytes[i + 2])?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(b);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Percent-encodes a path, keeping `/` as a separator.
///
/// Each segment is encoded on its own, so converter output that legitimately
/// contains separators (the `path` converter) stays multi-segment.
#[must_use]
pub fn encode_path(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, segment) in text.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&urlencoding::encode(segment));
    }
    out
}

/// Makes a redirect target safe to emit as a `Location` header value.
///
/// A candidate is passed through verbatim when it is plain ASCII, free of
/// control bytes, and every `%` begins a well-formed escape. Anything else is
/// percent-encoded as a whole, reserved characters included; the result no
/// longer resolves but it cannot corrupt the response head either.
#[must_use]
pub fn sanitize_location(candidate: &str) -> String {
    if is_safe_location(candidate) {
        candidate.to_owned()
    } else {
        urlencoding::encode(candidate).into_owned()
    }
}

fn is_safe_location(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !(0x20..0x7f).contains(&b) {
            return false;
        }
        if b == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
