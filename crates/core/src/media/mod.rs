//! Media kinds, the extension-based media predicate and target formats.
//!
//! The predicate is configuration, not algorithm: a [`MediaFilter`] starts from
//! the default extension set of a [`MediaKind`] and may be extended or replaced
//! from the `[media]` config section.

mod types;

pub use types::{MediaFilter, MediaKind, TargetFormat};
