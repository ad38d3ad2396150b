//! Feed pipeline error types.

use thiserror::Error;

/// Errors raised while turning posts into a feed document.
///
/// All variants except `MalformedReference` abort feed generation.
/// `MalformedReference` is recovered from by embedding the post body
/// unabsolutized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("post `{slug}` is missing required field `{field}`")]
    MissingField { slug: String, field: &'static str },

    #[error("feed channel has an empty `{field}`")]
    EmptyChannel { field: &'static str },

    #[error("unterminated `{attr}` reference at byte {offset}")]
    MalformedReference { offset: usize, attr: &'static str },

    #[error("duplicate feed guid `{guid}`")]
    DuplicateGuid { guid: String },

    #[error("content snapshot is {size} bytes, over the {limit} byte limit")]
    OversizedInput { size: u64, limit: u64 },
}
