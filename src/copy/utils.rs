//! Utility functions for file copy operations.
//!
//! This module contains helper functions used by the file, link and
//! directory copy operations, including symlink handling, special file
//! recreation, and platform-specific utilities.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

// =============================================================================
// File content copying
// =============================================================================

/// Efficiently copy file contents using the best available method.
///
/// On Linux 4.5+, uses `copy_file_range` for zero-copy kernel-to-kernel transfer.
/// Falls back to `std::io::copy` on other platforms or on error.
pub(crate) fn copy_file_contents(
    src: &std::fs::File,
    dst: &std::fs::File,
    len: u64,
) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::io::BufReader;
        let _ = len;
        io::copy(&mut BufReader::new(src), &mut &*dst)
    }
}

/// Linux-specific: copy using copy_file_range(2) syscall.
///
/// Falls back to io::copy if copy_file_range is unavailable for this pair of
/// files (e.g., cross-filesystem on old kernels).
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &std::fs::File, dst: &std::fs::File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();
    let mut remaining = len;
    let mut copied: u64 = 0;

    while remaining > 0 {
        // 128MB chunks
        let chunk_size = remaining.min(128 * 1024 * 1024) as usize;

        // SAFETY: both descriptors are owned by live `File`s and null offsets
        // mean "use and advance the current file position".
        let result = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dst_fd,
                std::ptr::null_mut(),
                chunk_size,
                0,
            )
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            // Fall back to a userspace copy only before any byte moved, so
            // the file position is still at the start:
            // - EXDEV: different filesystems on kernels older than 5.3
            // - ENOSYS: kernel without copy_file_range
            // - EINVAL: filesystem refuses this pair of files
            // - EOPNOTSUPP: filesystem (e.g. some FUSE or network mounts)
            //   does not implement it
            if copied == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV)
                        | Some(libc::ENOSYS)
                        | Some(libc::EINVAL)
                        | Some(libc::EOPNOTSUPP)
                )
            {
                use std::io::BufReader;
                return io::copy(&mut BufReader::new(src), &mut &*dst);
            }
            return Err(err);
        }

        if result == 0 {
            // Source shrank while copying
            break;
        }

        let bytes_copied = result as u64;
        copied += bytes_copied;
        remaining = remaining.saturating_sub(bytes_copied);
    }

    Ok(copied)
}

// =============================================================================
// Special files
// =============================================================================

/// Recreate a FIFO, socket or device node at `path` with the type, mode and
/// device number recorded in `meta`.
///
/// Device nodes need `CAP_MKNOD`; without it the call fails with
/// `PermissionDenied` like `mknod(1)` does.
#[cfg(unix)]
pub(crate) fn make_node(path: &Path, meta: &Metadata) -> io::Result<()> {
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    if meta.file_type().is_fifo() {
        return make_fifo(path, meta.mode() & 0o7777);
    }

    let path_c = c_path(path)?;
    // SAFETY: `path_c` is a valid NUL-terminated string that outlives the call.
    let result = unsafe {
        libc::mknod(
            path_c.as_ptr(),
            meta.mode() as libc::mode_t,
            meta.rdev() as libc::dev_t,
        )
    };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn make_node(_path: &Path, _meta: &Metadata) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Special files not supported on this platform",
    ))
}

/// Create a named pipe with the given permission bits.
#[cfg(unix)]
pub(crate) fn make_fifo(path: &Path, mode: u32) -> io::Result<()> {
    let path_c = c_path(path)?;
    // SAFETY: `path_c` is a valid NUL-terminated string that outlives the call.
    let result = unsafe { libc::mkfifo(path_c.as_ptr(), mode as libc::mode_t) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn c_path(path: &Path) -> io::Result<std::ffi::CString> {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains interior NUL"))
}

// =============================================================================
// Symlink utilities
// =============================================================================

/// Helper to check if path is a symlink without following it
#[inline]
pub(crate) fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Check if a symlink target contains ".." components that could escape upward
#[inline]
pub(crate) fn is_escaping_symlink(target: &Path) -> bool {
    use std::path::Component;
    target
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

#[cfg(unix)]
pub(crate) use std::os::unix::fs::symlink;

/// Create a symlink on Windows, picking the directory or file flavour from
/// what the target currently is. Dangling targets become file links.
#[cfg(windows)]
pub(crate) fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Symlinks not supported on this platform",
    ))
}

// =============================================================================
// Removal
// =============================================================================

/// Remove an existing file, symlink, special file or directory at the given
/// path. `meta` must come from `symlink_metadata` so links are removed
/// rather than followed.
#[inline]
pub(crate) fn remove_existing(path: &Path, meta: &Metadata) -> io::Result<()> {
    if meta.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        remove_link_or_file(path)
    }
}

/// Remove a non-directory entry. Windows directory symlinks need
/// `remove_dir`; everywhere else `remove_file` covers links and nodes.
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        #[cfg(windows)]
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && is_symlink(path) => {
            fs::remove_dir(path)
        }
        other => other,
    }
}

// =============================================================================
// Tests
// =============================================================================
