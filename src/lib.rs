//! # treecopy
//!
//! Link-aware copying of files, symbolic links and whole directory trees.
//!
//! ## Core Features
//!
//! - **Batch operations**: every operation takes index-aligned lists of
//!   sources and destinations and returns the normalized destinations
//! - **Symlink aware**: links are recreated with their exact target string,
//!   including relative and dangling targets, and are never followed while
//!   walking a tree
//! - **Special files**: FIFOs, sockets and device nodes are recreated rather
//!   than read
//! - **Atomic file writes**: file content goes to a temp file that is renamed
//!   into place, so a destination is never half-written
//! - **Clean overwrite**: a directory copy with `overwrite` first removes the
//!   old destination tree, so no stale entries survive
//! - **Fail-fast**: inputs are validated for the whole batch before anything
//!   is written, and the first failing element stops the call
//!
//! ## Function API
//!
//! ```no_run
//! use treecopy::{dir_copy, file_copy, link_copy, CopyOptions};
//!
//! let options = CopyOptions::default();
//!
//! file_copy(&["a.txt", "b.txt"], &["out/a.txt", "out/b.txt"], &options)?;
//! link_copy(&["latest"], &["out/latest"], &options)?;
//! dir_copy(&["project"], &["backup/project"], &options.clone().with_overwrite())?;
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Builder API
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! // Picks file, link or directory copy from what "src" is
//! let dst = CopyBuilder::new("src", "dst").overwrite().run()?;
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ## Copy Order
//!
//! A directory copy scans its source once and then creates directories,
//! copies file-like entries, and recreates symlinks, in that order. Every
//! directory therefore exists before anything is placed inside it.
//!
//! ## Error Policy
//!
//! | Stage | Behaviour |
//! |-------|-----------|
//! | Validation | Whole batch checked first, nothing written on failure |
//! | Copying | Elements processed in order, first failure returned |
//!
//! Work completed for earlier elements is left in place; there is no
//! rollback.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod kind;
mod options;
mod utils;

pub use builder::CopyBuilder;
pub use copy::{dir_copy, file_copy, link_copy};
pub use error::{Error, IoOp, Result, is_no_space_error};
pub use kind::{CopyAs, PathKind};
pub use options::CopyOptions;
pub use utils::path::normalize;
