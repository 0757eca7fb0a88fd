//! Directory copy operations.
//!
//! This module copies directory trees recursively. A tree is scanned once,
//! without following symlinks, into three lists (directories, file-like
//! entries, symlinks) of paths relative to the scanned root. The copy then
//! runs in a fixed order:
//!
//! 1. Create the directory structure
//! 2. Copy file-like entries through [`file_copy`](crate::file_copy)'s routine
//! 3. Recreate symlinks through [`link_copy`](crate::link_copy)'s routine
//! 4. Apply directory permissions, deepest first, so a read-only source
//!    directory does not block writes into its copy

use crate::error::{Error, IoOp, IoResultExt, Result};
use crate::kind::{CopyAs, PathKind};
use crate::options::CopyOptions;
use crate::utils::path::{
    check_not_empty, normalize_all, resolve_entry, resolve_existing, safe_path,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::file::copy_files;
use super::link::{create_links, read_targets};
use super::utils::remove_existing;

/// Result of scanning a directory tree.
///
/// Every path is relative to the scanned root. `dirs` starts with the empty
/// path, which stands for the root itself, and lists parents before their
/// children. Entries are sorted by name within each directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TreeListing {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub links: Vec<PathBuf>,
}

impl TreeListing {
    /// Map each relative path of `rel_paths` under `root`.
    fn under(root: &Path, rel_paths: &[PathBuf]) -> Vec<PathBuf> {
        rel_paths.iter().map(|rel| join_rel(root, rel)).collect()
    }
}

/// Join a relative path onto a root, mapping the empty path to the root
/// itself rather than to `root/`.
fn join_rel(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Copy directory trees recursively.
///
/// Each source tree is reproduced at the index-aligned destination: every
/// subdirectory is created, files (and FIFOs, sockets, device nodes) are
/// copied, and symlinks are recreated with their original targets. Symlinks
/// inside the tree are never followed; a link to a directory is copied as a
/// link. Hidden entries are included.
///
/// # Overwrite
///
/// With `overwrite` on, whatever exists at a destination is deleted before
/// its tree is copied, so the result holds exactly the source tree. A
/// destination that is the source, lies inside it, or contains it is
/// rejected up front, so the source is never deleted. With `overwrite` off,
/// an existing destination directory is merged into and any colliding file
/// or link fails the call with [`Error::AlreadyExists`]; a destination inside
/// the source is allowed since the source is scanned before anything is
/// created.
///
/// # Returns
///
/// The normalized destination roots.
///
/// # Errors
///
/// Checked for the whole batch before anything is written:
/// - An empty path ([`Error::EmptyPath`])
/// - Batch lengths differ ([`Error::LengthMismatch`])
/// - A source is not a directory ([`Error::NotADirectory`])
/// - A destination resolves to its source, or nests with it in either
///   direction while `overwrite` is on ([`Error::OverlappingPaths`])
///
/// Then, per tree in order, stopping at the first failure:
/// - The tree is deeper than `max_depth` ([`Error::MaxDepthExceeded`])
/// - A link target escapes upward and `reject_escaping_links` is set
///   ([`Error::EscapingSymlink`])
/// - A destination entry exists and `overwrite` is off ([`Error::AlreadyExists`])
/// - IO operations fail ([`Error::Io`], [`Error::TempFile`], [`Error::Persist`])
///
/// # Example
///
/// ```no_run
/// use treecopy::{dir_copy, CopyOptions};
///
/// let roots = dir_copy(&["site"], &["site.bak"], &CopyOptions::default().with_overwrite())?;
/// println!("copied to {}", roots[0].display());
/// # Ok::<(), treecopy::Error>(())
/// ```
pub fn dir_copy<P: AsRef<Path>, Q: AsRef<Path>>(
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

    // A symlink given as the root counts as the directory it points to
    if let Some(src) = sources.iter().find(|src| !src.is_dir()) {
        return Err(Error::NotADirectory(src.clone()));
    }

    for (src, dst) in sources.iter().zip(&destinations) {
        check_overlap(src, dst, options)?;
    }

    for (src, dst) in sources.iter().zip(&destinations) {
        copy_tree(src, dst, options)?;
    }

    Ok(destinations)
}

/// Reject a destination that would make the copy destroy or read its own
/// output. Paths are compared as resolved on the filesystem, since the
/// normalized forms keep `..` and symlinks.
///
/// Without `overwrite` only the same directory is rejected. With it, any
/// nesting in either direction is rejected: the pre-clean would delete the
/// source or a part of it.
fn check_overlap(src: &Path, dst: &Path, options: &CopyOptions) -> Result<()> {
    let real_src = resolve_existing(src)?;
    let real_dst = resolve_entry(dst)?;

    let overlaps = if options.overwrite {
        real_src.starts_with(&real_dst) || real_dst.starts_with(&real_src)
    } else {
        real_src == real_dst
    };

    if overlaps {
        return Err(Error::OverlappingPaths {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    Ok(())
}

/// Copy one tree. Both paths are normalized and `src` is a directory.
fn copy_tree(src: &Path, dst: &Path, options: &CopyOptions) -> Result<()> {
    if options.overwrite {
        clear_destination(dst)?;
    }

    let listing = scan_tree(src, options)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        src = %src.display(),
        dst = %dst.display(),
        dirs = listing.dirs.len(),
        files = listing.files.len(),
        links = listing.links.len(),
        "scanned tree"
    );

    // Phase 1: directories, parents before children
    let dst_dirs = TreeListing::under(dst, &listing.dirs);
    for dir in &dst_dirs {
        fs::create_dir_all(safe_path(dir)).with_op(IoOp::CreateDir, dir)?;
    }

    // Phase 2: files and special files
    if !listing.files.is_empty() {
        let src_files = TreeListing::under(src, &listing.files);
        let dst_files = TreeListing::under(dst, &listing.files);
        copy_files(&src_files, &dst_files, options)?;
    }

    // Phase 3: symlinks, once every parent directory exists
    if !listing.links.is_empty() {
        let src_links = TreeListing::under(src, &listing.links);
        let dst_links = TreeListing::under(dst, &listing.links);
        let targets = read_targets(&src_links, options)?;
        create_links(&targets, &dst_links, options)?;
    }

    // Phase 4: directory permissions, children before parents
    if options.preserve_permissions {
        let src_dirs = TreeListing::under(src, &listing.dirs);
        for (src_dir, dst_dir) in src_dirs.iter().zip(&dst_dirs).rev() {
            copy_dir_permissions(src_dir, dst_dir, options);
        }
    }

    Ok(())
}

/// Remove whatever sits at `dst`. A symlink is removed itself, never the
/// directory it points to.
fn clear_destination(dst: &Path) -> Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(meta) => {
            remove_existing(&safe_path(dst), &meta).with_op(IoOp::Remove, dst)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(dst = %dst.display(), "removed existing destination");

            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(IoOp::Stat, dst, e)),
    }
}

fn copy_dir_permissions(src: &Path, dst: &Path, options: &CopyOptions) {
    match fs::metadata(src) {
        Ok(metadata) => {
            if let Err(e) = fs::set_permissions(safe_path(dst), metadata.permissions()) {
                options.warn(&format!(
                    "Failed to set permissions on {}: {}",
                    dst.display(),
                    e
                ));
            }
        }
        Err(e) => {
            options.warn(&format!(
                "Failed to read metadata from {}: {}",
                src.display(),
                e
            ));
        }
    }
}

/// Scan the tree rooted at `root` in a single pass without following
/// symlinks below the root.
pub(crate) fn scan_tree(root: &Path, options: &CopyOptions) -> Result<TreeListing> {
    let mut listing = TreeListing::default();
    collect_entries(root, Path::new(""), &mut listing, options, 0)?;
    Ok(listing)
}

fn collect_entries(
    root: &Path,
    rel: &Path,
    listing: &mut TreeListing,
    options: &CopyOptions,
    depth: usize,
) -> Result<()> {
    let dir = join_rel(root, rel);

    if let Some(max_depth) = options.max_depth {
        if depth > max_depth {
            return Err(Error::MaxDepthExceeded {
                path: dir,
                max_depth,
            });
        }
    }

    listing.dirs.push(rel.to_path_buf());

    let mut entries = fs::read_dir(&dir)
        .and_then(|iter| iter.collect::<io::Result<Vec<_>>>())
        .with_op(IoOp::ReadDir, &dir)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let child = rel.join(entry.file_name());
        // DirEntry::file_type does not follow symlinks
        let file_type = entry.file_type().with_op(IoOp::Stat, &entry.path())?;

        match PathKind::from_file_type(file_type).copy_as() {
            CopyAs::Directory => collect_entries(root, &child, listing, options, depth + 1)?,
            CopyAs::Link => listing.links.push(child),
            CopyAs::File => listing.files.push(child),
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
