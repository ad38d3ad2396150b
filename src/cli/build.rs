//! Feed build orchestration.
//!
//! Build phases:
//! - **Load** - Materialize the content snapshot into a `PostStore`
//! - **Render** - One feed per language, in parallel, fully in memory
//! - **Write** - Stage every feed as a temp file, then rename each into place
//!
//! Nothing is replaced until every language rendered and every temp file
//! was written, so a failing partition or a full disk leaves all previously
//! published feeds in place. Only a failing rename in the last step can
//! leave languages out of step with each other.

use crate::{
    config::SiteConfig,
    debug,
    feed::{FeedDocument, StagedFile, build_feed, minify_xml, to_rss},
    log,
    post::PostStore,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::PathBuf;

/// A serialized feed waiting to be written.
#[derive(Debug)]
pub struct RenderedFeed {
    pub lang: String,
    /// Absolute output path.
    pub path: PathBuf,
    pub doc: FeedDocument,
    pub xml: Vec<u8>,
}

/// Build the content snapshot and write every feed.
pub fn build_feeds(config: &SiteConfig) -> Result<Vec<RenderedFeed>> {
    let store = load_store(config)?;
    let feeds = render_all(&store, config)?;

    let staged = feeds
        .iter()
        .map(|feed| StagedFile::stage(&feed.path, &feed.xml))
        .collect::<Result<Vec<_>>>()?;

    for (feed, file) in feeds.iter().zip(staged) {
        file.persist()?;
        log!(
            "rss";
            "{} ({} item{})",
            config.root_relative(&feed.path).display(),
            feed.doc.len(),
            if feed.doc.len() == 1 { "" } else { "s" }
        );
    }

    Ok(feeds)
}

pub(super) fn load_store(config: &SiteConfig) -> Result<PostStore> {
    let store = PostStore::load(config)?;
    log!(
        "load";
        "{} posts from {}",
        store.len(),
        config.root_relative(&config.build.content).display()
    );
    Ok(store)
}

/// Render every configured language. Fails on the first broken partition.
pub fn render_all(store: &PostStore, config: &SiteConfig) -> Result<Vec<RenderedFeed>> {
    let mut seen = FxHashSet::default();
    let languages: Vec<&str> = config
        .site
        .languages
        .iter()
        .map(String::as_str)
        .filter(|lang| seen.insert(*lang))
        .collect();

    languages
        .par_iter()
        .map(|lang| render_language(store, lang, config))
        .collect()
}

fn render_language(store: &PostStore, lang: &str, config: &SiteConfig) -> Result<RenderedFeed> {
    let doc = build_feed(store, lang, config)
        .with_context(|| format!("failed to build the `{lang}` feed"))?;
    let xml = to_rss(&doc).with_context(|| format!("failed to serialize the `{lang}` feed"))?;
    let xml = minify_xml(xml.as_bytes(), config.feed.minify).into_owned();

    debug!("render"; "{}: {} items, {} bytes", lang, doc.len(), xml.len());

    Ok(RenderedFeed {
        lang: lang.to_string(),
        path: config.feed_path(lang),
        doc,
        xml,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::feed::FeedError;
    use std::fs;
    use std::path::Path;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn setup(extra: &str) -> (tempfile::TempDir, SiteConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_parse_config(extra);
        config.root = dir.path().to_path_buf();
        config.build.content = dir.path().join("content");
        config.build.output = dir.path().join("public");
        fs::create_dir_all(&config.build.content).unwrap();
        (dir, config)
    }

    #[test]
    fn test_build_writes_feed_per_language() {
        let (_dir, config) = setup("[site]\nauthor = \"Dan\"\nlanguages = [\"en\", \"fr\"]");
        let content = &config.build.content;
        write(
            content,
            "hello-world/index.html",
            "---\ntitle: Hello\ndate: 2020-01-01\n---\n<a href=\"/about\">x</a>",
        );
        write(
            content,
            "hello-world/index.fr.html",
            "---\ntitle: Bonjour\ndate: 2020-01-02\n---\n<p>Salut</p>",
        );

        let feeds = build_feeds(&config).unwrap();
        assert_eq!(feeds.len(), 2);

        let en = fs::read_to_string(config.build.output.join("rss.xml")).unwrap();
        let channel = en.parse::<rss::Channel>().unwrap();
        assert_eq!(channel.title(), "Dan's Blog RSS Feed");
        assert_eq!(channel.items().len(), 1);
        assert!(
            channel.items()[0]
                .content()
                .unwrap()
                .contains(r#"href="https://example.com/about""#)
        );

        let fr = fs::read_to_string(config.build.output.join("fr/rss.xml")).unwrap();
        let channel = fr.parse::<rss::Channel>().unwrap();
        assert_eq!(channel.link(), "https://example.com/fr");
        assert_eq!(
            channel.items()[0].link(),
            Some("https://example.com/fr/hello-world")
        );
    }

    #[test]
    fn test_missing_title_aborts_without_writing() {
        let (_dir, config) = setup("");
        let feed_path = config.feed_path("en");
        write(&config.build.output, "rss.xml", "previous feed");
        write(
            &config.build.content,
            "untitled.html",
            "---\ndate: 2020-01-01\n---\n<p>x</p>",
        );

        let err = build_feeds(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::MissingField { field: "title", .. })
        ));
        assert_eq!(fs::read_to_string(feed_path).unwrap(), "previous feed");
    }

    #[test]
    fn test_failed_staging_replaces_nothing() {
        let (_dir, config) = setup("[site]\nlanguages = [\"en\", \"fr\"]");
        write(&config.build.output, "rss.xml", "previous feed");
        // `fr/rss.xml` cannot be created below a regular file.
        write(&config.build.output, "fr", "not a directory");
        write(
            &config.build.content,
            "hello.html",
            "---\ntitle: Hello\ndate: 2020-01-01\n---\n<p>x</p>",
        );

        assert!(build_feeds(&config).is_err());
        assert_eq!(
            fs::read_to_string(config.feed_path("en")).unwrap(),
            "previous feed"
        );
        assert_eq!(fs::read_dir(&config.build.output).unwrap().count(), 2);
    }

    #[test]
    fn test_render_is_deterministic() {
        let (_dir, config) = setup("");
        for (slug, date) in [("b-post", "2021-05-01"), ("a-post", "2021-05-01"), ("c", "2020-01-01")] {
            write(
                &config.build.content,
                &format!("{slug}.html"),
                &format!("---\ntitle: {slug}\ndate: {date}\n---\n<p>{slug}</p>"),
            );
        }

        let store = PostStore::load(&config).unwrap();
        let first = render_all(&store, &config).unwrap();
        let second = render_all(&store, &config).unwrap();
        assert_eq!(first[0].xml, second[0].xml);

        let slugs: Vec<_> = first[0].doc.items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-post", "b-post", "c"]);
    }

    #[test]
    fn test_duplicate_languages_rendered_once() {
        let (_dir, config) = setup("[site]\nlanguages = [\"en\", \"en\"]");
        let store = PostStore::new(Vec::new());
        let feeds = render_all(&store, &config).unwrap();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].lang, "en");
    }

    #[test]
    fn test_minified_output() {
        let (_dir, config) = setup("[feed]\nminify = true");
        let store = PostStore::new(Vec::new());
        let feeds = render_all(&store, &config).unwrap();
        assert!(!feeds[0].xml.contains(&b'\n'));
    }
}
