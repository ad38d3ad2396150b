//! `[site]` section configuration.
//!
//! ```toml
//! [site]
//! url = "https://example.com"
//! title = "My Blog"
//! description = "A personal blog"
//! author = "Alice"
//! language = "en"
//! languages = ["en", "fr"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Canonical origin, e.g. "https://example.com" or "https://example.com/blog".
    pub url: Option<String>,
    pub title: String,
    pub description: String,
    pub author: String,
    /// Default language key. Its feed is written at the output root.
    pub language: String,
    /// Language partitions to syndicate.
    pub languages: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: None,
            title: String::new(),
            description: String::new(),
            author: String::new(),
            language: "en".into(),
            languages: vec!["en".into()],
        }
    }
}

pub struct SiteSectionFields {
    pub url: FieldPath,
    pub title: FieldPath,
    pub language: FieldPath,
    pub languages: FieldPath,
}

impl SiteSection {
    pub const FIELDS: SiteSectionFields = SiteSectionFields {
        url: FieldPath::new("site.url"),
        title: FieldPath::new("site.title"),
        language: FieldPath::new("site.language"),
        languages: FieldPath::new("site.languages"),
    };

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` is set, parses, uses http/https and has a host
    /// - `title` is non-empty unless the feed title is set explicitly
    /// - `language` is one of `languages`
    pub fn validate(&self, has_feed_title: bool, diag: &mut ConfigDiagnostics) {
        match &self.url {
            None => diag.error_with_hint(
                Self::FIELDS.url,
                format!("{} is not configured", Self::FIELDS.url),
                format!("set {}, e.g.: \"https://example.com\"", Self::FIELDS.url),
            ),
            Some(url_str) => match url::Url::parse(url_str) {
                Ok(parsed) => {
                    if !matches!(parsed.scheme(), "http" | "https") {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            format!(
                                "scheme '{}' not supported, must be http or https",
                                parsed.scheme()
                            ),
                            "use format like https://example.com",
                        );
                    }
                    if parsed.host_str().is_none() {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            "URL must have a valid host",
                            "use format like https://example.com",
                        );
                    }
                    if parsed.query().is_some() || parsed.fragment().is_some() {
                        diag.error(
                            Self::FIELDS.url,
                            "URL must not carry a query or fragment",
                        );
                    }
                }
                Err(e) => diag.error_with_hint(
                    Self::FIELDS.url,
                    format!("invalid URL: {e}"),
                    "use format like https://example.com",
                ),
            },
        }

        if self.title.trim().is_empty() && !has_feed_title {
            diag.error_with_hint(
                Self::FIELDS.title,
                "feed channel would have an empty title",
                format!("set {} or `feed.title`", Self::FIELDS.title),
            );
        }

        if self.languages.is_empty() {
            diag.error(Self::FIELDS.languages, "at least one language is required");
        } else if !self.languages.contains(&self.language) {
            diag.error_with_hint(
                Self::FIELDS.language,
                format!("default language `{}` is not listed", self.language),
                format!("add it to {}", Self::FIELDS.languages),
            );
        }

        let mut seen = Vec::with_capacity(self.languages.len());
        for lang in &self.languages {
            if lang.is_empty()
                || matches!(lang.as_str(), "." | "..")
                || lang.contains(['/', '\\'])
            {
                diag.error(
                    Self::FIELDS.languages,
                    format!("`{lang}` is not a valid language key"),
                );
            } else if seen.contains(&lang) {
                diag.warn(Self::FIELDS.languages, format!("`{lang}` is listed twice"));
            }
            seen.push(lang);
        }
    }
}
