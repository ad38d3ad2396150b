//! In-memory content store built from a snapshot of rendered documents.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use super::{PostRecord, split_frontmatter};
use crate::config::SiteConfig;
use crate::feed::FeedError;
use crate::utils::date::DateTimeUtc;
use crate::{debug, log};

/// Immutable snapshot of every rendered post, all languages.
///
/// Records keep the order they were loaded in (sorted by source path), so
/// re-listing a partition always yields the same sequence.
#[derive(Debug, Default, Clone)]
pub struct PostStore {
    posts: Vec<PostRecord>,
}

impl PostStore {
    /// Build a store from already materialized records.
    pub fn new(posts: Vec<PostRecord>) -> Self {
        Self { posts }
    }

    /// Lazily list the posts of one language partition.
    ///
    /// Matching is exact: `"en"` never matches `"en-US"`. An unknown
    /// language yields an empty iterator. The iterator is `Clone`, so it can
    /// be restarted from any point.
    pub fn list_posts<'a>(
        &'a self,
        lang: &'a str,
    ) -> impl Iterator<Item = &'a PostRecord> + Clone + 'a {
        self.posts.iter().filter(move |post| post.lang == lang)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Load every `.html`/`.htm` document below `build.content`.
    ///
    /// Files starting with `_` or `.` are skipped. Drafts are skipped unless
    /// `build.drafts` is set.
    pub fn load(config: &SiteConfig) -> Result<Self> {
        let content_dir = &config.build.content;
        if !content_dir.is_dir() {
            bail!("content directory `{}` not found", content_dir.display());
        }

        let mut posts = Vec::new();
        let mut seen = FxHashSet::default();
        let mut total_bytes: u64 = 0;
        let mut drafts = 0usize;

        let files = WalkDir::new(content_dir)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| is_post_file(path));

        for path in files {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;

            total_bytes += source.len() as u64;
            if total_bytes > config.build.max_input_bytes {
                return Err(FeedError::OversizedInput {
                    size: total_bytes,
                    limit: config.build.max_input_bytes,
                }
                .into());
            }

            let rel = path.strip_prefix(content_dir).unwrap_or(&path);
            let Some(post) = load_post(&source, rel, config)
                .with_context(|| format!("failed to load `{}`", rel.display()))?
            else {
                drafts += 1;
                continue;
            };

            if !seen.insert((post.lang.clone(), post.slug.clone())) {
                bail!(
                    "duplicate slug `{}` for language `{}` (from `{}`)",
                    post.slug,
                    post.lang,
                    rel.display()
                );
            }

            debug!("load"; "{} -> {}:{}", rel.display(), post.lang, post.slug);
            posts.push(post);
        }

        if drafts > 0 {
            log!("load"; "skipped {} draft{}", drafts, if drafts == 1 { "" } else { "s" });
        }

        Ok(Self::new(posts))
    }
}

/// Parse one rendered document. Returns `None` for skipped drafts.
fn load_post(source: &str, rel: &Path, config: &SiteConfig) -> Result<Option<PostRecord>> {
    let (meta, body) = split_frontmatter(source)?;

    if meta.draft && !config.build.drafts {
        return Ok(None);
    }

    let date = meta
        .date
        .as_deref()
        .map(str::parse::<DateTimeUtc>)
        .transpose()?;

    let (path_slug, path_lang) = slug_from_path(rel, &config.site.languages);
    let lang = meta
        .lang
        .clone()
        .or(path_lang)
        .unwrap_or_else(|| config.site.language.clone());

    let slug = match meta.slug.as_deref() {
        Some(slug) => slug.trim_matches('/').to_string(),
        None if lang != config.site.language => format!("{lang}/{path_slug}"),
        None => path_slug,
    };

    Ok(Some(PostRecord::from_meta(meta, date, slug, lang, body)))
}

/// Derive the slug and an optional language suffix from a relative path.
///
/// | Path                    | Slug          | Language |
/// |-------------------------|---------------|----------|
/// | `hello-world.html`      | `hello-world` | -        |
/// | `hello-world/index.html`| `hello-world` | -        |
/// | `hello/index.fr.html`   | `hello`       | `fr`     |
/// | `2019/intro.fr.html`    | `2019/intro`  | `fr`     |
///
/// A suffix only counts as a language when it is listed in `languages`.
fn slug_from_path(rel: &Path, languages: &[String]) -> (String, Option<String>) {
    let mut parts: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (stem, lang) = match stem.rsplit_once('.') {
        Some((base, suffix)) if languages.iter().any(|l| l == suffix) => {
            (base.to_string(), Some(suffix.to_string()))
        }
        _ => (stem, None),
    };

    if stem != "index" || parts.is_empty() {
        parts.push(stem);
    }

    (parts.join("/"), lang)
}

fn is_post_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    is_html && !name.starts_with(['_', '.'])
}
