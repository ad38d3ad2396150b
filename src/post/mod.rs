//! Rendered posts and the content store they are served from.
//!
//! A [`PostRecord`] is produced once per rendered document when the content
//! snapshot is loaded and never mutated afterwards. Feeds read posts through
//! [`PostStore::list_posts`], one language partition at a time.

mod meta;
mod store;

pub use meta::{PostMeta, split_frontmatter};
pub use store::PostStore;

use crate::utils::date::DateTimeUtc;

/// Maximum excerpt length (in characters) when no spoiler is given.
pub const EXCERPT_LENGTH: usize = 250;

/// A rendered post ready for syndication.
///
/// `title` and `date` stay optional here: a record missing either is still
/// a valid store entry, it just cannot become a feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// URL path below the canonical origin, without leading slash.
    pub slug: String,
    pub title: Option<String>,
    pub date: Option<DateTimeUtc>,
    /// Frontmatter spoiler, or a pruned text excerpt of the body.
    pub excerpt: String,
    pub html: String,
    pub lang: String,
}

impl PostRecord {
    /// Build a record from parsed frontmatter and the rendered body.
    pub fn from_meta(
        meta: PostMeta,
        date: Option<DateTimeUtc>,
        slug: String,
        lang: String,
        html: &str,
    ) -> Self {
        let excerpt = meta
            .spoiler
            .unwrap_or_else(|| prune(&crate::utils::html::text_content(html), EXCERPT_LENGTH));

        Self {
            slug,
            title: meta.title,
            date,
            excerpt,
            html: html.to_string(),
            lang,
        }
    }
}

/// Prune whitespace-collapsed text to at most `max` characters.
///
/// Cuts on a word boundary and ends with `…` when anything was dropped.
pub fn prune(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(1);
    let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    let head = &text[..end];

    let head = if text[end..].starts_with(char::is_whitespace) {
        head
    } else {
        head.rfind(' ').map_or(head, |i| &head[..i])
    };

    format!("{}…", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_short_text_untouched() {
        assert_eq!(prune("short text", 250), "short text");
        assert_eq!(prune("", 250), "");
    }

    #[test]
    fn test_prune_cuts_on_word_boundary() {
        assert_eq!(prune("alpha beta gamma", 12), "alpha beta…");
    }

    #[test]
    fn test_prune_exact_boundary() {
        // 11th char is a space: the first 10 chars are whole words
        assert_eq!(prune("alpha beta gamma", 11), "alpha beta…");
    }

    #[test]
    fn test_prune_respects_limit() {
        let text = "word ".repeat(200);
        let pruned = prune(text.trim_end(), EXCERPT_LENGTH);
        assert!(pruned.chars().count() <= EXCERPT_LENGTH);
        assert!(pruned.ends_with("word…"));
    }

    #[test]
    fn test_prune_multibyte() {
        let text = "é".repeat(300);
        let pruned = prune(&text, 10);
        assert_eq!(pruned.chars().count(), 10);
    }

    #[test]
    fn test_from_meta_prefers_spoiler() {
        let meta = PostMeta {
            title: Some("Hello".into()),
            spoiler: Some("Teaser".into()),
            ..Default::default()
        };
        let record = PostRecord::from_meta(meta, None, "hello".into(), "en".into(), "<p>Body</p>");
        assert_eq!(record.excerpt, "Teaser");
        assert_eq!(record.html, "<p>Body</p>");
    }

    #[test]
    fn test_from_meta_derives_excerpt() {
        let record = PostRecord::from_meta(
            PostMeta::default(),
            None,
            "hello".into(),
            "en".into(),
            "<h1>Hi</h1><p>Some &amp; more</p>",
        );
        assert_eq!(record.excerpt, "Hi Some & more");
    }
}
