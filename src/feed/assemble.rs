//! Feed document assembly: ordering, truncation and channel checks.

use rustc_hash::FxHashSet;

use super::{FeedError, FeedItem};
use crate::utils::date::DateTimeUtc;

/// Default maximum number of items per feed.
pub const DEFAULT_LIMIT: usize = 1000;

/// Channel-level metadata of one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub description: String,
    /// Site link of the channel (origin, plus `/<lang>` for non-default
    /// languages).
    pub url: String,
    pub language: Option<String>,
}

/// An ordered, bounded feed ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub channel: Channel,
    /// Newest first, ties broken by slug ascending.
    pub items: Vec<FeedItem>,
}

impl FeedDocument {
    /// Most recent item, if any.
    pub fn newest(&self) -> Option<&FeedItem> {
        self.items.first()
    }

    pub fn last_build_date(&self) -> Option<DateTimeUtc> {
        self.newest().map(|item| item.date)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Order `items` by date descending (slug ascending on ties), keep the
/// first `limit`, and attach the channel.
///
/// Truncation happens after sorting, so the result is always the newest
/// `limit` items no matter how the input was ordered.
pub fn assemble(
    items: impl IntoIterator<Item = FeedItem>,
    channel: Channel,
    limit: usize,
) -> Result<FeedDocument, FeedError> {
    if channel.title.trim().is_empty() {
        return Err(FeedError::EmptyChannel { field: "title" });
    }
    if channel.url.trim().is_empty() {
        return Err(FeedError::EmptyChannel { field: "url" });
    }

    let mut items: Vec<FeedItem> = items.into_iter().collect();
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    items.truncate(limit);

    let mut guids = FxHashSet::default();
    if let Some(dup) = items.iter().find(|item| !guids.insert(item.guid.as_str())) {
        return Err(FeedError::DuplicateGuid {
            guid: dup.guid.clone(),
        });
    }

    Ok(FeedDocument { channel, items })
}
