//! HTML utility functions.
//!
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `unescape()` - entity decoding for extracted text
//! - `text_content()` - visible text of serialized markup

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    escape_with(s, &ESCAPE_CHARS)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape_with(s, &ESCAPE_CHARS)
}

#[inline]
fn escape_with<'a>(s: &'a str, chars: &[char]) -> Cow<'a, str> {
    if !s.contains(chars) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
/// Unknown entities are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&end| end > 0 && end <= 10)
            .and_then(|end| decode_entity(&after[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &after[end + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "hellip" => Some('…'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "rsquo" => Some('’'),
        "lsquo" => Some('‘'),
        "rdquo" => Some('”'),
        "ldquo" => Some('“'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

// =============================================================================
// Text Extraction
// =============================================================================

/// Check if tag is a raw text element (content is not visible text).
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if tag is phrasing content that flows with the surrounding text.
#[inline]
pub fn is_inline_element(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "b"
            | "bdi"
            | "bdo"
            | "cite"
            | "code"
            | "data"
            | "del"
            | "dfn"
            | "em"
            | "i"
            | "ins"
            | "kbd"
            | "mark"
            | "q"
            | "s"
            | "samp"
            | "small"
            | "span"
            | "strong"
            | "sub"
            | "sup"
            | "time"
            | "u"
            | "var"
    )
}

/// Extract the visible text of serialized HTML.
///
/// Block-level tags are replaced by a single space and inline tags by
/// nothing, `<script>`/`<style>` bodies and
/// comments are dropped, entities are decoded, and whitespace runs are
/// collapsed. Not a parser: malformed markup degrades to best-effort text.
pub fn text_content(html: &str) -> String {
    let mut text = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let tail = &rest[open..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(close) = tail.find('>') else {
            rest = "";
            break;
        };
        let tag = tag_name(&tail[1..close]);
        if !is_inline_element(&tag) {
            text.push(' ');
        }
        rest = &tail[close + 1..];

        if is_raw_text_element(&tag) {
            let end_tag = format!("</{tag}");
            rest = find_ascii_ci(rest, &end_tag)
                .and_then(|end| rest[end..].find('>').map(|gt| &rest[end + gt + 1..]))
                .unwrap_or("");
        }
    }
    text.push_str(rest);

    let decoded = unescape(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased element name of a tag body (`a href=".."` → `a`).
fn tag_name(inner: &str) -> String {
    inner
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("hello"), "hello");
        assert_eq!(escape("<b>"), "&lt;b&gt;");
        assert_eq!(escape_attr(r#"a"b'c&d"#), "a&quot;b&#39;c&amp;d");
    }

    #[test]
    fn test_escape_no_alloc() {
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&lt;tag&gt;"), "<tag>");
        assert_eq!(unescape("&#65;&#x42;"), "AB");
        assert_eq!(unescape("it&rsquo;s"), "it’s");
    }

    #[test]
    fn test_unescape_unknown_kept() {
        assert_eq!(unescape("&bogus; & done"), "&bogus; & done");
        assert_eq!(unescape("AT&T"), "AT&T");
    }

    #[test]
    fn test_text_content_strips_tags() {
        let html = "<h1>Title</h1><p>Hello <a href=\"/x\">world</a>.</p>";
        assert_eq!(text_content(html), "Title Hello world.");
    }

    #[test]
    fn test_text_content_inline_tags_join_text() {
        assert_eq!(
            text_content("<p>It is <em>very</em>, <code>really</code> fast!</p><p>Next</p>"),
            "It is very, really fast! Next"
        );
        assert_eq!(text_content("<p>a<br>b</p>"), "a b");
    }

    #[test]
    fn test_text_content_drops_script_and_style() {
        let html = "<p>a</p><script>var x = '<p>';</script><STYLE>p{}</STYLE><p>b</p>";
        assert_eq!(text_content(html), "a b");
    }

    #[test]
    fn test_text_content_drops_comments() {
        assert_eq!(text_content("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn test_text_content_decodes_entities() {
        assert_eq!(text_content("<p>Tom &amp; Jerry</p>"), "Tom & Jerry");
    }

    #[test]
    fn test_text_content_unclosed_tag() {
        assert_eq!(text_content("text <a href="), "text");
    }
}
