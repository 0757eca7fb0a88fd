//! Core copy operations.
//!
//! [`file_copy`] and [`link_copy`] are the leaf operations; [`dir_copy`]
//! scans a tree and drives both of them over the scanned entries.

mod dir;
mod file;
mod link;
pub(crate) mod utils;

// Re-export public API
pub use dir::dir_copy;
pub use file::file_copy;
pub use link::link_copy;
