//! Site configuration management for `postfeed.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site], [feed], [build]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # Config file lookup, path normalization
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section   | Purpose                                            |
//! |-----------|----------------------------------------------------|
//! | `[site]`  | Canonical origin, title, author, languages         |
//! | `[feed]`  | Feed output path, channel title, item limit        |
//! | `[build]` | Content snapshot, output directory, input ceiling  |

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, normalize_path};

pub use section::{BuildSection, FeedSection, SiteSection};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli},
    log,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing postfeed.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub feed: FeedSection,

    #[serde(default)]
    pub build: BuildSection,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory; relative paths in the file resolve
    /// against it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        config.finalize(cli.command.build_args());
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve paths against the root and apply CLI overrides.
    fn finalize(&mut self, args: &BuildArgs) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.apply_build_args(args);
        self.normalize_paths(&root);
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        // Set verbose mode globally
        crate::logger::set_verbose(args.verbose);

        // CLI paths are relative to cwd, not to the project root
        let content = args.content.as_deref().map(normalize_path);
        let output = args.output.as_deref().map(normalize_path);
        Self::update_option(&mut self.build.content, content.as_ref());
        Self::update_option(&mut self.build.output, output.as_ref());
        Self::update_option(&mut self.feed.limit, args.limit.as_ref());

        if let Some(ref url) = args.site_url {
            self.site.url = Some(url.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize all paths relative to root directory.
    ///
    /// `feed.path` stays relative; it is resolved per language by
    /// [`SiteConfig::feed_path`].
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.build.content = normalize_path(&root.join(&self.build.content));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.root = root;
    }

    // ========================================================================
    // accessors
    // ========================================================================

    /// Canonical origin: `site.url` without trailing `/`.
    pub fn origin(&self) -> &str {
        self.site
            .url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/')
    }

    /// Channel title: `feed.title`, else "<author>'s Blog RSS Feed", else
    /// `site.title`.
    pub fn feed_title(&self) -> String {
        if let Some(title) = self.feed.explicit_title() {
            return title.to_string();
        }
        let author = self.site.author.trim();
        if author.is_empty() {
            self.site.title.clone()
        } else {
            format!("{author}'s Blog RSS Feed")
        }
    }

    pub fn is_default_language(&self, lang: &str) -> bool {
        self.site.language == lang
    }

    /// Output file of one language partition's feed.
    ///
    /// ```text
    /// en (default) → public/rss.xml
    /// fr           → public/fr/rss.xml
    /// ```
    pub fn feed_path(&self, lang: &str) -> PathBuf {
        if self.is_default_language(lang) {
            self.build.output.join(&self.feed.path)
        } else {
            self.build.output.join(lang).join(&self.feed.path)
        }
    }

    /// Path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.site
            .validate(self.feed.explicit_title().is_some(), &mut diag);
        self.feed.validate(&mut diag);
        self.build.validate(&mut diag);

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, filling `site.url` and `site.title` when `extra` leaves
/// them out. Panics if there are unknown fields (to catch config typos in
/// tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let (mut parsed, ignored) = SiteConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    if parsed.site.url.is_none() {
        parsed.site.url = Some("https://example.com".into());
    }
    if parsed.site.title.is_empty() {
        parsed.site.title = "Test".into();
    }
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        // Invalid TOML syntax - unclosed bracket
        assert!(SiteConfig::parse_with_ignored("[site\ntitle = \"My Blog\"").is_err());
    }

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert_eq!(config.site.title, "");
        assert_eq!(config.feed.path, PathBuf::from("rss.xml"));
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.site.title, "Test");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[site]\ntitle = \"Test\"\nlanguages = [\"en\"]\n[feed]\nlimit = 5";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_origin_trims_trailing_slash() {
        let config = test_parse_config("[site]\nurl = \"https://example.com/blog/\"");
        assert_eq!(config.origin(), "https://example.com/blog");
    }

    #[test]
    fn test_feed_title_fallbacks() {
        let config = test_parse_config("[site]\ntitle = \"My Blog\"");
        assert_eq!(config.feed_title(), "My Blog");

        let config = test_parse_config("[site]\nauthor = \"Dan Abramov\"");
        assert_eq!(config.feed_title(), "Dan Abramov's Blog RSS Feed");

        let config = test_parse_config("[site]\nauthor = \"Dan\"\n[feed]\ntitle = \"Overreacted\"");
        assert_eq!(config.feed_title(), "Overreacted");
    }

    #[test]
    fn test_feed_path_per_language() {
        let mut config = test_parse_config("[site]\nlanguages = [\"en\", \"fr\"]");
        config.build.output = PathBuf::from("/site/public");

        assert_eq!(config.feed_path("en"), PathBuf::from("/site/public/rss.xml"));
        assert_eq!(config.feed_path("fr"), PathBuf::from("/site/public/fr/rss.xml"));
    }

    #[test]
    fn test_apply_build_args_overrides() {
        let mut config = test_parse_config("[feed]\nlimit = 10");
        let args = BuildArgs {
            site_url: Some("https://other.org".into()),
            limit: Some(3),
            ..Default::default()
        };
        config.apply_build_args(&args);

        assert_eq!(config.origin(), "https://other.org");
        assert_eq!(config.feed.limit, 3);
        assert_eq!(config.build.content, PathBuf::from("content"));
    }

    #[test]
    fn test_finalize_resolves_against_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();

        let mut config = test_parse_config("");
        config.config_path = dir.path().join("postfeed.toml");
        config.finalize(&BuildArgs::default());

        let root = normalize_path(dir.path());
        assert_eq!(config.root, root);
        assert_eq!(config.build.content, root.join("content"));
        assert_eq!(config.build.output, root.join("public"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_parse_config("[site]\nurl = \"ftp://x\"\n[feed]\nlimit = 0");
        config.build.content = dir.path().to_path_buf();
        config.build.output = dir.path().with_extension("out");

        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err:?}");
        };
        assert_eq!(diag.len(), 2);
    }
}
