//! Site-root reference rewriting for syndicated HTML.
//!
//! Feed readers show embedded content outside the site, so every
//! site-root-relative reference has to carry the canonical origin.
//! Rewriting is textual, one ordered rule at a time:
//!
//! | # | Rule            | Before                  | After                        |
//! |---|-----------------|-------------------------|------------------------------|
//! | 1 | `href`          | `href="/about"`         | `href="ORIGIN/about"`        |
//! | 2 | `src`           | `src="/img.png"`        | `src="ORIGIN/img.png"`       |
//! | 3 | quoted static   | `"/static/a.png"`       | `"ORIGIN/static/a.png"`      |
//! | 4 | srcset static   | `a.png 1x, /static/b 2x`| `a.png 1x,ORIGIN/static/b 2x`|
//!
//! Every rule matches only a reference that starts with `/` right after its
//! lead-in, and every rewrite puts the origin between the lead-in and that
//! `/`. Rewritten text therefore never matches again, which makes
//! [`absolutize`] idempotent. Protocol-relative references (`//cdn/..`) and
//! anything with a scheme are left alone.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::FeedError;

/// One rewrite rule: `lead` capture, then the path capture starting at `/`.
struct Rule {
    name: &'static str,
    pattern: Regex,
    /// The lead-in may open a double-quoted attribute value that must be
    /// closed.
    quoted: bool,
    /// Leave `//host/..` references untouched.
    skip_protocol_relative: bool,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, quoted: bool, skip_protocol_relative: bool) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            quoted,
            skip_protocol_relative,
        }
    }

    fn apply<'h>(&self, html: &'h str, origin: &str) -> Cow<'h, str> {
        self.pattern.replace_all(html, |caps: &Captures<'_>| {
            let end = caps.get(0).map_or(0, |m| m.end());
            if self.skip_protocol_relative && html[end..].starts_with('/') {
                return caps[0].to_string();
            }
            format!("{}{}{}", &caps[1], origin, &caps[2])
        })
    }

    /// Find the first attribute value opened by this rule that is never
    /// closed.
    ///
    /// Only a `"` preceded by `=` opens an attribute value; a bare quote in
    /// text is not checked. A value counts as closed when a `"` appears
    /// before the next `<`. Each scan stops at the first `"`, which is at or
    /// before the next match, so the whole check is linear in `html`.
    fn find_unterminated(&self, html: &str) -> Option<usize> {
        if !self.quoted {
            return None;
        }
        self.pattern.captures_iter(html).find_map(|caps| {
            let lead = caps.get(1)?;
            let opens_attribute =
                lead.as_str().ends_with("=\"") || html[..lead.start()].ends_with('=');
            if !opens_attribute {
                return None;
            }
            let value = &html[lead.end()..];
            let closed = value
                .find(['"', '<'])
                .is_some_and(|i| value.as_bytes()[i] == b'"');
            (!closed).then_some(lead.start())
        })
    }
}

/// Rules in precedence order.
static RULES: LazyLock<[Rule; 4]> = LazyLock::new(|| {
    [
        Rule::new("href", r#"(href=")(/)"#, true, true),
        Rule::new("src", r#"(src=")(/)"#, true, true),
        Rule::new("static", r#"(")(/static/)"#, true, false),
        Rule::new("srcset", r#"(,)[ \t\r\n]*(/static/)"#, false, false),
    ]
});

/// Rewrite every site-root reference in `html` to an absolute URL under
/// `origin` (a trailing `/` on `origin` is ignored).
///
/// Fails with [`FeedError::MalformedReference`] when a quoted attribute
/// reference is never closed; nothing is rewritten in that case. A stray
/// `"/static/` in text is rewritten like any other match.
pub fn absolutize(html: &str, origin: &str) -> Result<String, FeedError> {
    let origin = origin.trim_end_matches('/');

    for rule in RULES.iter() {
        if let Some(offset) = rule.find_unterminated(html) {
            return Err(FeedError::MalformedReference {
                offset,
                attr: rule.name,
            });
        }
    }

    let mut out = html.to_string();
    for rule in RULES.iter() {
        let rewritten = match rule.apply(&out, origin) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        };
        if let Some(s) = rewritten {
            out = s;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://example.com";

    fn abs(html: &str) -> String {
        absolutize(html, ORIGIN).unwrap()
    }

    #[test]
    fn test_href() {
        assert_eq!(
            abs(r#"<a href="/about">x</a>"#),
            r#"<a href="https://example.com/about">x</a>"#
        );
    }

    #[test]
    fn test_src() {
        assert_eq!(
            abs(r#"<img src="/img/a.png">"#),
            r#"<img src="https://example.com/img/a.png">"#
        );
    }

    #[test]
    fn test_quoted_static() {
        assert_eq!(
            abs(r#"<source data-x="/static/a.webp">"#),
            r#"<source data-x="https://example.com/static/a.webp">"#
        );
    }

    #[test]
    fn test_srcset() {
        let html = r#"<img srcset="/static/a.png 1x, /static/b.png 2x,/static/c.png 3x">"#;
        assert_eq!(
            abs(html),
            r#"<img srcset="https://example.com/static/a.png 1x,https://example.com/static/b.png 2x,https://example.com/static/c.png 3x">"#
        );
    }

    #[test]
    fn test_root_href() {
        assert_eq!(
            abs(r#"<a href="/">home</a>"#),
            r#"<a href="https://example.com/">home</a>"#
        );
    }

    #[test]
    fn test_absolute_references_untouched() {
        let html = concat!(
            r#"<a href="https://other.org/x">a</a>"#,
            r#"<a href="mailto:me@example.com">b</a>"#,
            r#"<a href="https://example.com/about">c</a>"#,
            r#"<img src="//cdn.example.org/a.png">"#,
            r##"<a href="#top">d</a>"##,
            r#"<a href="relative/page">e</a>"#,
        );
        assert_eq!(abs(html), html);
    }

    #[test]
    fn test_no_references_borrowed_path() {
        assert_eq!(abs("<p>plain text</p>"), "<p>plain text</p>");
        assert_eq!(abs(""), "");
    }

    #[test]
    fn test_trailing_slash_origin() {
        assert_eq!(
            absolutize(r#"<a href="/about">x</a>"#, "https://example.com/").unwrap(),
            r#"<a href="https://example.com/about">x</a>"#
        );
    }

    #[test]
    fn test_origin_with_path() {
        assert_eq!(
            absolutize(r#"<img src="/static/a.png">"#, "https://example.com/blog").unwrap(),
            r#"<img src="https://example.com/blog/static/a.png">"#
        );
    }

    #[test]
    fn test_href_takes_precedence_over_static() {
        assert_eq!(
            abs(r#"<a href="/static/doc.pdf">pdf</a>"#),
            r#"<a href="https://example.com/static/doc.pdf">pdf</a>"#
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "<p>none</p>",
            r#"<a href="/about">x</a>"#,
            r#"<a href="/">home</a><img src="/a.png">"#,
            r#"<img src="/static/a.png" srcset="/static/a.png 1x, /static/b.png 2x">"#,
            r#"<picture><source srcset="/static/a.webp 400w,/static/b.webp 800w"></picture>"#,
            r#"<a href="//cdn.example.org/x">cdn</a><a href="https://example.com/y">abs</a>"#,
            r#"<video src="/static/v.mp4" poster="/static/p.jpg"></video>"#,
        ];

        for html in samples {
            let once = abs(html);
            let twice = abs(&once);
            assert_eq!(once, twice, "not idempotent for {html}");
        }
    }

    #[test]
    fn test_no_site_root_reference_survives() {
        let html = r#"<a href="/a">a</a><img src="/b.png" srcset="/static/c.png 1x, /static/d.png 2x">"#;
        let out = abs(html);
        assert!(!out.contains(r#"="/"#));
        assert!(!out.contains(", /static/"));
        assert_eq!(out.matches(ORIGIN).count(), 4);
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = absolutize(r#"<a href="/about>x</a>"#, ORIGIN).unwrap_err();
        assert_eq!(
            err,
            FeedError::MalformedReference {
                offset: 3,
                attr: "href"
            }
        );
    }

    #[test]
    fn test_unterminated_at_end_of_input() {
        assert!(matches!(
            absolutize(r#"<img src="/a.png"#, ORIGIN),
            Err(FeedError::MalformedReference { attr: "src", .. })
        ));
    }

    #[test]
    fn test_gt_inside_value_is_not_malformed() {
        let html = r#"<a href="/search?q=a>b">x</a>"#;
        assert_eq!(
            abs(html),
            r#"<a href="https://example.com/search?q=a>b">x</a>"#
        );
    }

    #[test]
    fn test_quote_in_text_is_not_malformed() {
        let html = r#"<p>Assets live under "/static/ on disk.</p><a href="/about">x</a>"#;
        let out = abs(html);
        assert!(out.contains(r#"<a href="https://example.com/about">x</a>"#));
        assert_eq!(abs(&out), out);
    }

    #[test]
    fn test_unterminated_static_attribute_is_malformed() {
        assert!(matches!(
            absolutize(r#"<img data-x="/static/a.png><p>x</p>"#, ORIGIN),
            Err(FeedError::MalformedReference { attr: "static", .. })
        ));
    }

    #[test]
    fn test_large_input_without_tags() {
        let n = 200_000;
        let html = r#" href="/a""#.repeat(n);

        let start = std::time::Instant::now();
        let out = abs(&html);
        assert!(start.elapsed() < std::time::Duration::from_secs(10));
        assert_eq!(out.matches(ORIGIN).count(), n);
    }
}
