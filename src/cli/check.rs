//! Dry run: build every feed in memory and report what would be written.

use crate::{config::SiteConfig, log};
use anyhow::Result;
use serde::Serialize;

use super::build::{RenderedFeed, load_store, render_all};

/// What a build would write for one language.
#[derive(Debug, Serialize)]
pub struct FeedSummary {
    pub lang: String,
    pub path: String,
    pub items: usize,
    pub newest: Option<String>,
    pub oldest: Option<String>,
    pub bytes: usize,
}

impl FeedSummary {
    fn new(feed: &RenderedFeed, config: &SiteConfig) -> Self {
        let dates = &feed.doc.items;
        Self {
            lang: feed.lang.clone(),
            path: config.root_relative(&feed.path).display().to_string(),
            items: feed.doc.len(),
            newest: dates.first().map(|i| i.date.to_string()),
            oldest: dates.last().map(|i| i.date.to_string()),
            bytes: feed.xml.len(),
        }
    }
}

/// Run the whole pipeline without writing and print one summary per language.
pub fn check_feeds(config: &SiteConfig, json: bool) -> Result<()> {
    let store = load_store(config)?;
    let summaries: Vec<_> = render_all(&store, config)?
        .iter()
        .map(|feed| FeedSummary::new(feed, config))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for s in &summaries {
        match (&s.newest, &s.oldest) {
            (Some(newest), Some(oldest)) => log!(
                "check";
                "{}: {} items ({} .. {}) -> {}",
                s.lang, s.items, oldest, newest, s.path
            ),
            _ => log!("check"; "{}: empty feed -> {}", s.lang, s.path),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::feed::{Channel, FeedDocument, FeedItem};
    use crate::utils::date::DateTimeUtc;
    use std::path::PathBuf;

    fn item(slug: &str, date: DateTimeUtc) -> FeedItem {
        let url = format!("https://example.com/{slug}");
        FeedItem {
            slug: slug.into(),
            title: slug.into(),
            description: String::new(),
            date,
            guid: url.clone(),
            url,
            content: String::new(),
        }
    }

    #[test]
    fn test_summary_json_shape() {
        let mut config = test_parse_config("");
        config.root = PathBuf::from("/site");
        let feed = RenderedFeed {
            lang: "en".into(),
            path: PathBuf::from("/site/public/rss.xml"),
            doc: FeedDocument {
                channel: Channel {
                    title: "Test".into(),
                    description: String::new(),
                    url: "https://example.com".into(),
                    language: Some("en".into()),
                },
                items: vec![
                    item("new", DateTimeUtc::from_ymd(2021, 5, 1)),
                    item("old", DateTimeUtc::from_ymd(2020, 1, 1)),
                ],
            },
            xml: b"<rss/>".to_vec(),
        };

        let summary = FeedSummary::new(&feed, &config);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["lang"], "en");
        assert_eq!(json["path"], "public/rss.xml");
        assert_eq!(json["items"], 2);
        assert_eq!(json["newest"], "2021-05-01");
        assert_eq!(json["oldest"], "2020-01-01");
        assert_eq!(json["bytes"], 6);
    }
}
