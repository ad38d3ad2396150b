//! Post → feed item synthesis.

use super::{FeedError, absolutize};
use crate::log;
use crate::post::PostRecord;
use crate::utils::date::DateTimeUtc;
use crate::utils::html::{escape, escape_attr};

/// Site-wide values every feed item is derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMetadata {
    /// Canonical origin without trailing slash, e.g. `https://example.com`.
    pub origin: String,
    /// Channel title.
    pub title: String,
    pub description: String,
}

/// One syndicated post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Source slug, kept as the ordering tie-break.
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: DateTimeUtc,
    pub url: String,
    /// Always equal to `url`.
    pub guid: String,
    /// Absolutized body followed by the provenance notice.
    pub content: String,
}

/// Turn a post into a feed item.
///
/// Fails with [`FeedError::MissingField`] when the slug, title or date is
/// missing. A body with broken quoting is embedded as-is (logged) instead
/// of being half rewritten.
pub fn synthesize(post: &PostRecord, site: &SiteMetadata) -> Result<FeedItem, FeedError> {
    let missing = |field| FeedError::MissingField {
        slug: post.slug.clone(),
        field,
    };

    if post.slug.trim_matches('/').is_empty() {
        return Err(missing("slug"));
    }
    let title = post
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| missing("title"))?;
    let date = post.date.ok_or_else(|| missing("date"))?;

    let url = canonical_url(&site.origin, &post.slug);

    let body = match absolutize(&post.html, &site.origin) {
        Ok(body) => body,
        Err(e) => {
            log!("warning"; "`{}`: {}, embedding content unabsolutized", post.slug, e);
            post.html.clone()
        }
    };
    let content = format!("{body}{}", provenance_notice(&site.origin, &url));

    Ok(FeedItem {
        slug: post.slug.clone(),
        title: title.to_string(),
        description: post.excerpt.clone(),
        date,
        guid: url.clone(),
        url,
        content,
    })
}

/// Join origin and slug with exactly one `/` and no empty segments.
///
/// A trailing `/` on the slug is kept (`hello/` → `ORIGIN/hello/`).
pub fn canonical_url(origin: &str, slug: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let path = slug
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if slug.ends_with('/') && !path.is_empty() {
        format!("{origin}/{path}/")
    } else {
        format!("{origin}/{path}")
    }
}

/// Fixed notice appended to syndicated content, linking back to the post.
pub fn provenance_notice(origin: &str, url: &str) -> String {
    format!(
        "\n<div style=\"margin-top: 55px; font-style: italic;\">(This is an article posted to my blog at {}. You can read it online by <a href=\"{}\">clicking here</a>.)</div>\n",
        escape(origin),
        escape_attr(url)
    )
}
