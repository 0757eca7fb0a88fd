//! Path normalization and cross-platform path helpers.
//!
//! Normalization here is purely lexical: `~` expansion, conversion to an
//! absolute path against the working directory, and removal of `.` segments
//! and redundant separators. `..` segments are kept as written because
//! resolving them without the filesystem would be wrong across symlinks.

use crate::error::{Error, IoOp, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Home directory used for `~` expansion.
fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let var = std::env::var_os("USERPROFILE");
    #[cfg(not(windows))]
    let var = std::env::var_os("HOME");

    var.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Replace a leading `~` segment with the user's home directory.
///
/// Only a bare `~` first segment is expanded; `~user` forms and paths
/// without a leading tilde are returned unchanged, as is everything when the
/// home directory is unknown.
pub(crate) fn expand(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match home_dir() {
            Some(home) => {
                let rest = components.as_path();
                if rest.as_os_str().is_empty() {
                    home
                } else {
                    home.join(rest)
                }
            }
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Lexically clean a path: drop `.` segments, repeated and trailing
/// separators. Never touches the filesystem.
pub(crate) fn tidy(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() && !path.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Expand, absolutize and tidy a path.
///
/// The result is idempotent: normalizing a normalized path returns it
/// unchanged.
///
/// # Errors
///
/// Fails only when a relative path is given and the current working
/// directory cannot be determined.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// let once = treecopy::normalize(Path::new("/tmp/./a//b/")).unwrap();
/// assert_eq!(once, Path::new("/tmp/a/b"));
/// assert_eq!(treecopy::normalize(&once).unwrap(), once);
/// ```
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let expanded = expand(path);
    let absolute =
        std::path::absolute(&expanded).map_err(|e| Error::io(IoOp::Resolve, &expanded, e))?;
    Ok(tidy(&absolute))
}

/// Resolve `path` against the filesystem as far as it exists.
///
/// The deepest existing ancestor is canonicalized (following symlinks and
/// `..`); the missing remainder is appended lexically, where popping on `..`
/// is exact because no missing component can be a symlink.
pub(crate) fn resolve_existing(path: &Path) -> Result<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path;

    let mut resolved = loop {
        match fs::canonicalize(current) {
            Ok(resolved) => break resolved,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                match (current.parent(), current.components().next_back()) {
                    (Some(parent), Some(last)) => {
                        missing.push(last);
                        current = parent;
                    }
                    _ => return Err(Error::io(IoOp::Resolve, path, e)),
                }
            }
            Err(e) => return Err(Error::io(IoOp::Resolve, path, e)),
        }
    };

    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Resolve the entry named by `path` without following it: its parent is
/// resolved with [`resolve_existing`] and the final name appended. A path
/// ending in `..` names a directory and is resolved whole.
pub(crate) fn resolve_entry(path: &Path) -> Result<PathBuf> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve_existing(parent)?.join(name)),
        _ => resolve_existing(path),
    }
}

/// Normalize every path in a batch, failing on the first error.
pub(crate) fn normalize_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    paths.iter().map(|p| normalize(p.as_ref())).collect()
}

/// Reject empty paths up front; they have no sensible normalization.
pub(crate) fn check_not_empty<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    match paths.iter().position(|p| p.as_ref().as_os_str().is_empty()) {
        Some(index) => Err(Error::EmptyPath { index }),
        None => Ok(()),
    }
}

/// File name of a path, falling back to the whole path for roots.
pub(crate) fn file_name(path: &Path) -> OsString {
    path.file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| path.as_os_str().to_os_string())
}

/// Convert a path to an extended-length path format on Windows.
///
/// Absolute paths like `C:\path` become `\\?\C:\path`, UNC paths like
/// `\\server\share` become `\\?\UNC\server\share`.
#[cfg(windows)]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    let path_str = path.as_os_str().to_string_lossy();
    if path_str.starts_with(r"\\?\") {
        return path.to_path_buf();
    }

    if let Some(without_prefix) = path_str.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{}", without_prefix));
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    };

    PathBuf::from(format!(r"\\?\{}", absolute_path.display()))
}

/// Convert a path for safe use with file operations.
///
/// On non-Windows platforms, this simply returns a clone of the input path.
#[cfg(not(windows))]
pub(crate) fn safe_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
