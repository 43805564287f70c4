//! Wordtrail Content — dialog scripts and challenge sets read from a
//! content directory.
//!
//! Layout under the content root:
//!
//! - `dialog/<schema>.{json,yaml,yml}`: one scene with its dialog lines.
//! - `quiz/<schema>.{json,yaml,yml}`: the challenge set for the schema.

pub mod documents;
pub mod fs_repository;

pub use fs_repository::FsContentRepository;
