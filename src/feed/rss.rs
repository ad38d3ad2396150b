//! RSS 2.0 serialization and output.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use tempfile::NamedTempFile;

use super::{FeedDocument, FeedItem};

/// Generator name written to `<generator>`.
pub const GENERATOR: &str = "postfeed";

/// Serialize a feed document to an RSS 2.0 string.
///
/// The channel is validated before serialization. `content:encoded` and its
/// namespace declaration are emitted by the `rss` writer.
pub fn to_rss(doc: &FeedDocument) -> Result<String> {
    let items: Vec<_> = doc.items.iter().map(item_to_rss).collect();

    let channel = ChannelBuilder::default()
        .title(doc.channel.title.clone())
        .link(doc.channel.url.clone())
        .description(doc.channel.description.clone())
        .language(doc.channel.language.clone())
        .generator(GENERATOR.to_string())
        .last_build_date(doc.last_build_date().map(|d| d.to_rfc2822()))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| anyhow!("RSS validation failed: {e}"))?;
    Ok(channel.to_string())
}

fn item_to_rss(item: &FeedItem) -> rss::Item {
    let description = (!item.description.is_empty()).then(|| item.description.clone());

    ItemBuilder::default()
        .title(item.title.clone())
        .link(item.url.clone())
        .guid(
            GuidBuilder::default()
                .permalink(true)
                .value(item.guid.clone())
                .build(),
        )
        .pub_date(item.date.to_rfc2822())
        .description(description)
        .content(item.content.clone())
        .build()
}

/// Collapse indentation and line breaks of serialized XML.
///
/// Only lines are trimmed; whitespace inside a line is kept.
pub fn minify_xml(content: &[u8], enabled: bool) -> Cow<'_, [u8]> {
    if enabled {
        let xml_str = std::str::from_utf8(content).unwrap_or("");
        let minified = xml_str
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("");
        Cow::Owned(minified.into_bytes())
    } else {
        Cow::Borrowed(content)
    }
}

/// A fully written temporary file waiting to replace its target.
///
/// The temporary file lives in the target's directory, so the final rename
/// is atomic and a reader never sees a partially written feed.
///
/// Dropping it without [`StagedFile::persist`] removes the temporary file
/// and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    /// Write `bytes` to a temporary file next to `path`.
    pub fn stage(path: &Path, bytes: &[u8]) -> Result<Self> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temp file in `{}`", parent.display()))?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        Ok(Self {
            tmp,
            path: path.to_path_buf(),
        })
    }

    /// Rename the temporary file over the target.
    pub fn persist(self) -> Result<()> {
        self.tmp
            .persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to write `{}`", self.path.display()))?;
        Ok(())
    }
}
