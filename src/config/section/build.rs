//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! content = "content"            # Rendered documents (relative to site root)
//! output = "public"              # Where feeds are written (relative to site root)
//! drafts = false                 # Syndicate draft posts too
//! max_input_bytes = 67108864     # Ceiling on the combined snapshot size
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Default ceiling on the combined size of the content snapshot (64 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub content: PathBuf,
    pub output: PathBuf,
    pub drafts: bool,
    pub max_input_bytes: u64,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            content: "content".into(),
            output: "public".into(),
            drafts: false,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

pub struct BuildSectionFields {
    pub content: FieldPath,
    pub output: FieldPath,
    pub max_input_bytes: FieldPath,
}

impl BuildSection {
    pub const FIELDS: BuildSectionFields = BuildSectionFields {
        content: FieldPath::new("build.content"),
        output: FieldPath::new("build.output"),
        max_input_bytes: FieldPath::new("build.max_input_bytes"),
    };

    /// Validate after path normalization.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.content.is_dir() {
            diag.error_with_hint(
                Self::FIELDS.content,
                format!("directory `{}` not found", self.content.display()),
                "point it at the rendered posts, or pass --content",
            );
        }

        if self.output.starts_with(&self.content) {
            diag.error(
                Self::FIELDS.output,
                "output directory must not live inside the content directory",
            );
        }

        if self.max_input_bytes == 0 {
            diag.error(Self::FIELDS.max_input_bytes, "must be greater than 0");
        }
    }
}
