//! Shared helpers with no pipeline knowledge.

pub mod date;
pub mod html;
