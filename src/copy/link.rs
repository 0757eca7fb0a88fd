//! Symlink copy operations.
//!
//! A symlink is copied by reading its recorded target and creating a new
//! link with the identical target string. The target is never resolved, so
//! relative and dangling targets survive unchanged.

use crate::error::{Error, IoOp, IoResultExt, Result};
use crate::options::CopyOptions;
use crate::utils::path::{check_not_empty, normalize_all, safe_path};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::utils::{is_escaping_symlink, is_symlink, remove_existing, symlink};

/// Recreate symlinks at new paths, pointing at the same targets.
///
/// Every entry of `paths` must itself be a symlink; it is inspected, never
/// followed.
///
/// # Conflicts
///
/// - `overwrite` on: a destination that is already a symlink is removed
///   first. Any other kind of entry is left alone and reported as
///   [`Error::AlreadyExists`].
/// - `overwrite` off: a destination symlink that already has the exact same
///   target is accepted as is; anything else at the destination is
///   [`Error::AlreadyExists`].
///
/// # Returns
///
/// The normalized destination paths.
///
/// # Errors
///
/// Checked for the whole batch before anything is written:
/// - An empty path ([`Error::EmptyPath`])
/// - Batch lengths differ ([`Error::LengthMismatch`])
/// - A source is not a symlink ([`Error::NotASymlink`])
/// - A target escapes upward and `reject_escaping_links` is set
///   ([`Error::EscapingSymlink`])
///
/// Then, per element in order, stopping at the first failure:
/// - Destination conflict ([`Error::AlreadyExists`])
/// - Link creation or removal fails ([`Error::Io`])
///
/// # Example
///
/// ```no_run
/// use treecopy::{link_copy, CopyOptions};
///
/// link_copy(&["current"], &["current.bak"], &CopyOptions::default())?;
/// # Ok::<(), treecopy::Error>(())
/// ```
pub fn link_copy<P: AsRef<Path>, Q: AsRef<Path>>(
    paths: &[P],
    new_paths: &[Q],
    options: &CopyOptions,
) -> Result<Vec<PathBuf>> {
    check_not_empty(paths)?;
    check_not_empty(new_paths)?;

    let sources = normalize_all(paths)?;
    let destinations = normalize_all(new_paths)?;

    if sources.len() != destinations.len() {
        return Err(Error::LengthMismatch {
            sources: sources.len(),
            destinations: destinations.len(),
        });
    }

    if let Some(src) = sources.iter().find(|src| !is_symlink(src)) {
        return Err(Error::NotASymlink(src.clone()));
    }

    let targets = read_targets(&sources, options)?;
    create_links(&targets, &destinations, options)?;
    Ok(destinations)
}

/// Read the recorded target of every link, rejecting escaping targets when
/// configured. Nothing is written.
pub(crate) fn read_targets(sources: &[PathBuf], options: &CopyOptions) -> Result<Vec<PathBuf>> {
    sources
        .iter()
        .map(|src| {
            let target = fs::read_link(src).with_op(IoOp::ReadLink, src)?;
            if options.reject_escaping_links
                && target.is_relative()
                && is_escaping_symlink(&target)
            {
                return Err(Error::EscapingSymlink {
                    link: src.clone(),
                    target,
                });
            }
            Ok(target)
        })
        .collect()
}

/// Create one link per (target, destination) pair in order, stopping at the
/// first failure.
pub(crate) fn create_links(
    targets: &[PathBuf],
    destinations: &[PathBuf],
    options: &CopyOptions,
) -> Result<()> {
    for (target, dst) in targets.iter().zip(destinations) {
        create_one_link(target, dst, options)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(links = destinations.len(), "link batch copied");

    Ok(())
}

fn create_one_link(target: &Path, dst: &Path, options: &CopyOptions) -> Result<()> {
    let safe_dst = safe_path(dst);

    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.file_type().is_symlink() => {
            if options.overwrite {
                remove_existing(&safe_dst, &meta).with_op(IoOp::Remove, dst)?;
            } else if fs::read_link(dst).ok().as_deref() == Some(target) {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    dst = %dst.display(),
                    target = %target.display(),
                    "link already in place"
                );
                return Ok(());
            } else {
                return Err(Error::AlreadyExists(dst.to_path_buf()));
            }
        }
        Ok(_) => return Err(Error::AlreadyExists(dst.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(IoOp::Stat, dst, e)),
    }

    match symlink(target, &safe_dst) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::AlreadyExists(dst.to_path_buf()));
        }
        Err(e) => return Err(Error::io(IoOp::CreateLink, dst, e)),
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(dst = %dst.display(), target = %target.display(), "created link");

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
