//! File copy operations.
//!
//! [`file_copy`] copies the content of regular files and recreates special
//! files (FIFOs, sockets, device nodes) at new paths. Regular files are
//! written through a temp file in the destination directory and renamed into
//! place, so a destination is never observed half-written.

use crate::error::{Error, IoOp, IoResultExt, Result};
use crate::kind::PathKind;
use crate::options::CopyOptions;
use crate::utils::path::{check_not_empty, file_name, normalize_all, safe_path};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use super::utils::{copy_file_contents, make_node, remove_existing};

/// Copy files to new paths.
///
/// `paths` and `new_paths` are index-aligned. As a convenience, when a single
/// destination is given and it is an existing directory, every source is
/// copied into it under its own file name.
///
/// Symlinks among `paths` are followed: the content of their target is
/// copied. Use [`link_copy`](crate::link_copy) to copy the link itself.
///
/// # Returns
///
/// The normalized destination paths, one per source.
///
/// # Errors
///
/// Checked for the whole batch before anything is written:
/// - An empty path ([`Error::EmptyPath`])
/// - Batch lengths differ ([`Error::LengthMismatch`])
/// - A source is a directory ([`Error::IsADirectory`])
///
/// Then, per element in order, stopping at the first failure:
/// - Source does not exist ([`Error::SourceNotFound`])
/// - Destination exists and `overwrite` is off ([`Error::AlreadyExists`])
/// - IO operations fail ([`Error::Io`], [`Error::TempFile`], [`Error::Persist`])
///
/// # Example
///
/// ```no_run
/// use treecopy::{file_copy, CopyOptions};
///
/// let copied = file_copy(&["notes.txt"], &["backup/notes.txt"], &CopyOptions::default())?;
/// assert_eq!(copied.len(), 1);
/// # Ok::<(), treecopy::Error>(())
/// ```
pub fn file_copy<P: AsRef<Path>, Q: AsRef<Path>>(
    paths: &[P],
    new_paths: &[Q],
    options: &CopyOptions,
) -> Result<Vec<PathBuf>> {
    check_not_empty(paths)?;
    check_not_empty(new_paths)?;

    let sources = normalize_all(paths)?;
    let mut destinations = normalize_all(new_paths)?;

    if destinations.len() == 1 && destinations[0].is_dir() {
        let dir = destinations.remove(0);
        destinations = sources.iter().map(|src| dir.join(file_name(src))).collect();
    } else if sources.len() != destinations.len() {
        return Err(Error::LengthMismatch {
            sources: sources.len(),
            destinations: destinations.len(),
        });
    }

    if let Some(dir) = sources.iter().find(|src| src.is_dir()) {
        return Err(Error::IsADirectory(dir.clone()));
    }

    copy_files(&sources, &destinations, options)?;
    Ok(destinations)
}

/// Copy index-aligned, already normalized pairs in order, stopping at the
/// first failure. Returns the number of content bytes written.
pub(crate) fn copy_files(
    sources: &[PathBuf],
    destinations: &[PathBuf],
    options: &CopyOptions,
) -> Result<u64> {
    let mut bytes_copied = 0u64;
    for (src, dst) in sources.iter().zip(destinations) {
        bytes_copied += copy_one_file(src, dst, options)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(files = sources.len(), bytes_copied, "file batch copied");

    Ok(bytes_copied)
}

/// Copy a single file. Returns the number of content bytes written, which is
/// zero for special files.
pub(crate) fn copy_one_file(src: &Path, dst: &Path, options: &CopyOptions) -> Result<u64> {
    let src_meta = match fs::metadata(src) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(src.to_path_buf()));
        }
        Err(e) => return Err(Error::io(IoOp::Stat, src, e)),
    };

    if src_meta.is_dir() {
        return Err(Error::IsADirectory(src.to_path_buf()));
    }

    let kind = PathKind::from_file_type(src_meta.file_type());

    // One symlink_metadata call detects existence and type without following
    match fs::symlink_metadata(dst) {
        Ok(dst_meta) => {
            if !options.overwrite {
                return Err(Error::AlreadyExists(dst.to_path_buf()));
            }
            // A rename cannot replace a directory and mknod needs a free name;
            // anything else is replaced atomically by persist() below
            if dst_meta.is_dir() || kind.is_special() {
                remove_existing(&safe_path(dst), &dst_meta).with_op(IoOp::Remove, dst)?;
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(IoOp::Stat, dst, e)),
    }

    if kind.is_special() {
        copy_special(dst, &src_meta, options)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            src = %src.display(),
            dst = %dst.display(),
            ?kind,
            "recreated special file"
        );

        return Ok(0);
    }

    let bytes = copy_regular(src, dst, &src_meta, options)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(src = %src.display(), dst = %dst.display(), bytes, "copied file");

    Ok(bytes)
}

fn copy_special(dst: &Path, src_meta: &fs::Metadata, options: &CopyOptions) -> Result<()> {
    let safe_dst = safe_path(dst);
    match make_node(&safe_dst, src_meta) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::AlreadyExists(dst.to_path_buf()));
        }
        Err(e) => return Err(Error::io(IoOp::CreateNode, dst, e)),
    }

    if options.preserve_permissions {
        if let Err(e) = fs::set_permissions(&safe_dst, src_meta.permissions()) {
            options.warn(&format!(
                "Failed to set permissions on {}: {}",
                dst.display(),
                e
            ));
        }
    }

    Ok(())
}

fn copy_regular(
    src: &Path,
    dst: &Path,
    src_meta: &fs::Metadata,
    options: &CopyOptions,
) -> Result<u64> {
    let src_file = File::open(src).with_op(IoOp::CopyContent, src)?;

    // Temp file lives next to the destination so the final rename stays on
    // one filesystem
    let dst_parent = dst.parent().unwrap_or(Path::new("."));
    let safe_dst_parent = safe_path(dst_parent);

    let temp_file = if options.preserve_permissions {
        tempfile::NamedTempFile::new_in(&safe_dst_parent)
    } else {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // 0o666 before umask, like a plain create
            tempfile::Builder::new()
                .permissions(fs::Permissions::from_mode(0o666))
                .tempfile_in(&safe_dst_parent)
        }
        #[cfg(not(unix))]
        {
            tempfile::NamedTempFile::new_in(&safe_dst_parent)
        }
    }
    .map_err(|e| Error::TempFile {
        path: dst_parent.to_path_buf(),
        source: e,
    })?;

    let bytes_copied = copy_file_contents(&src_file, temp_file.as_file(), src_meta.len())
        .with_op(IoOp::CopyContent, dst)?;

    if options.fsync {
        temp_file
            .as_file()
            .sync_all()
            .with_op(IoOp::CopyContent, dst)?;
    }

    if options.preserve_permissions {
        fs::set_permissions(temp_file.path(), src_meta.permissions())
            .with_op(IoOp::SetPermissions, dst)?;
    }

    let safe_dst = safe_path(dst);

    // - overwrite: persist() replaces anything created since the check above
    // - otherwise: persist_noclobber() refuses to replace it
    if options.overwrite {
        temp_file.persist(&safe_dst).map_err(|e| Error::Persist {
            path: dst.to_path_buf(),
            source: e.error,
        })?;
    } else {
        temp_file.persist_noclobber(&safe_dst).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                Error::AlreadyExists(dst.to_path_buf())
            } else {
                Error::Persist {
                    path: dst.to_path_buf(),
                    source: e.error,
                }
            }
        })?;
    }

    Ok(bytes_copied)
}

// =============================================================================
// Tests
// =============================================================================
