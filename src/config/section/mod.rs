//! Configuration section definitions.
//!
//! Each module corresponds to a section in `postfeed.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `site`  | `[site]`     | Canonical origin, metadata, languages    |
//! | `feed`  | `[feed]`     | Feed path, title, item limit, minify     |
//! | `build` | `[build]`    | Content snapshot and output directories  |

mod build;
mod feed;
mod site;

pub use build::BuildSection;
pub use feed::FeedSection;
pub use site::SiteSection;
