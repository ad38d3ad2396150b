//! Syndication pipeline: posts → items → ordered feed document → RSS.
//!
//! Each language partition is built independently by [`build_feed`], so
//! callers are free to run partitions in parallel.

mod absolutize;
mod assemble;
mod error;
mod item;
mod rss;

pub use absolutize::absolutize;
pub use assemble::{Channel, DEFAULT_LIMIT, FeedDocument, assemble};
pub use error::FeedError;
pub use item::{FeedItem, SiteMetadata, synthesize};
pub use self::rss::{StagedFile, minify_xml, to_rss};

use crate::config::SiteConfig;
use crate::post::PostStore;

impl SiteMetadata {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            origin: config.origin().to_string(),
            title: config.feed_title(),
            description: config.site.description.clone(),
        }
    }
}

impl Channel {
    /// Channel metadata for one language partition.
    ///
    /// Non-default languages link to `ORIGIN/<lang>`.
    pub fn for_language(config: &SiteConfig, lang: &str) -> Self {
        Self::from_site(
            &SiteMetadata::from_config(config),
            lang,
            config.is_default_language(lang),
        )
    }

    pub fn from_site(site: &SiteMetadata, lang: &str, is_default: bool) -> Self {
        let url = if is_default || site.origin.is_empty() {
            site.origin.clone()
        } else {
            format!("{}/{lang}", site.origin)
        };

        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            url,
            language: Some(lang.to_string()),
        }
    }
}

/// Run one language partition from store to feed document.
pub fn build_feed(
    store: &PostStore,
    lang: &str,
    config: &SiteConfig,
) -> Result<FeedDocument, FeedError> {
    let site = SiteMetadata::from_config(config);
    let items = store
        .list_posts(lang)
        .map(|post| synthesize(post, &site))
        .collect::<Result<Vec<_>, _>>()?;

    let channel = Channel::from_site(&site, lang, config.is_default_language(lang));
    assemble(items, channel, config.feed.limit)
}
