//! Post metadata from the frontmatter of a rendered document.

use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Frontmatter fields recognized in rendered posts.
///
/// | Field     | Type     | Description                              |
/// |-----------|----------|------------------------------------------|
/// | `title`   | `String` | Post title                               |
/// | `date`    | `String` | Publish date (`YYYY-MM-DD` or RFC 3339)  |
/// | `spoiler` | `String` | Short teaser used as feed description    |
/// | `slug`    | `String` | URL path override                        |
/// | `lang`    | `String` | Language key override                    |
/// | `draft`   | `bool`   | Excluded from feeds unless drafts on     |
///
/// Any other field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostMeta {
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: Option<String>,
    pub spoiler: Option<String>,
    pub slug: Option<String>,
    #[serde(alias = "langKey")]
    pub lang: Option<String>,
    pub draft: bool,
}

/// Accept both quoted strings and bare TOML date literals.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<toml::Value> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        toml::Value::String(s) => s,
        toml::Value::Datetime(dt) => dt.to_string(),
        other => other.to_string(),
    }))
}

/// Split a rendered document into its frontmatter metadata and HTML body.
///
/// Supports TOML (`+++`) and simple YAML-like (`---`) frontmatter.
/// A document without frontmatter yields default metadata and the
/// whole input as body.
pub fn split_frontmatter(content: &str) -> Result<(PostMeta, &str)> {
    match detect_frontmatter(content) {
        Some((fm, body, true)) => {
            let meta = toml::from_str(fm).map_err(|e| anyhow!("invalid TOML frontmatter: {e}"))?;
            Ok((meta, body))
        }
        Some((fm, body, false)) => Ok((parse_yaml_like(fm), body)),
        None => Ok((PostMeta::default(), content)),
    }
}

/// Detect and extract frontmatter.
/// Returns `(frontmatter, body, is_toml)` if found.
fn detect_frontmatter(content: &str) -> Option<(&str, &str, bool)> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    for (fence, is_toml) in [("---", false), ("+++", true)] {
        if trimmed.starts_with(fence)
            && let Some(end) = trimmed[3..].find(&format!("\n{fence}"))
        {
            let fm = trimmed[3..3 + end].trim();
            let body = trimmed[3 + end + 4..].trim_start_matches(['\r', '\n']);
            return Some((fm, body, is_toml));
        }
    }

    None
}

/// Parse simple YAML-like frontmatter (`key: value` per line).
fn parse_yaml_like(content: &str) -> PostMeta {
    let mut meta = PostMeta::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());

        match key.trim().to_ascii_lowercase().as_str() {
            "title" => meta.title = Some(value.to_string()),
            "date" => meta.date = Some(value.to_string()),
            "spoiler" => meta.spoiler = Some(value.to_string()),
            "slug" => meta.slug = Some(value.to_string()),
            "lang" | "langkey" => meta.lang = Some(value.to_string()),
            "draft" => meta.draft = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }

    meta
}

/// Strip one level of matching single or double quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
