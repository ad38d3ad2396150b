//! `[feed]` section configuration.

use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::feed::DEFAULT_LIMIT;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Output path of the default-language feed, relative to `build.output`.
    pub path: PathBuf,
    /// Channel title. Falls back to "<author>'s Blog RSS Feed", then `site.title`.
    pub title: Option<String>,
    /// Maximum number of items per feed.
    pub limit: usize,
    pub minify: bool,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            path: "rss.xml".into(),
            title: None,
            limit: DEFAULT_LIMIT,
            minify: false,
        }
    }
}

pub struct FeedSectionFields {
    pub path: FieldPath,
    pub title: FieldPath,
    pub limit: FieldPath,
}

impl FeedSection {
    pub const FIELDS: FeedSectionFields = FeedSectionFields {
        path: FieldPath::new("feed.path"),
        title: FieldPath::new("feed.title"),
        limit: FieldPath::new("feed.limit"),
    };

    /// Explicit, non-blank channel title.
    pub fn explicit_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.limit == 0 {
            diag.error_with_hint(
                Self::FIELDS.limit,
                "feed would never contain any item",
                format!("remove {} to use the default of {DEFAULT_LIMIT}", Self::FIELDS.limit),
            );
        }

        if self.path.is_absolute() {
            diag.error_with_hint(
                Self::FIELDS.path,
                format!("`{}` must be relative to the output directory", self.path.display()),
                "use format like \"rss.xml\"",
            );
        } else if self.path.components().any(|c| c == Component::ParentDir) {
            diag.error_with_hint(
                Self::FIELDS.path,
                format!("`{}` escapes the output directory", self.path.display()),
                "remove `..` components",
            );
        } else if self.path.file_name().is_none() {
            diag.error(Self::FIELDS.path, "path must name a file");
        }

        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            diag.warn(Self::FIELDS.title, "blank title is ignored");
        }
    }
}
