//! Error types for treecopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur during copy operations, and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Precondition | [`Error::EmptyPath`], [`Error::LengthMismatch`], [`Error::NotADirectory`], [`Error::NotASymlink`], [`Error::IsADirectory`], [`Error::OverlappingPaths`], [`Error::EscapingSymlink`], [`Error::MaxDepthExceeded`] |
//! | Conflict | [`Error::AlreadyExists`] |
//! | IO | [`Error::Io`], [`Error::SourceNotFound`], [`Error::TempFile`], [`Error::Persist`] |
//!
//! Precondition errors are raised before the filesystem is touched. Conflict
//! and IO errors stop the batch at the failing element; work done for
//! earlier elements is left in place.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for treecopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```
/// use std::io;
/// use treecopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// The filesystem operation that produced an [`Error::Io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IoOp {
    /// Reading metadata of a path
    Stat,
    /// Reading a directory listing
    ReadDir,
    /// Creating a directory
    CreateDir,
    /// Copying file content
    CopyContent,
    /// Creating a special file node (FIFO, socket, device)
    CreateNode,
    /// Reading a symlink target
    ReadLink,
    /// Creating a symlink
    CreateLink,
    /// Removing a file, link or directory
    Remove,
    /// Setting permissions
    SetPermissions,
    /// Resolving a path against the working directory
    Resolve,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stat => "stat",
            Self::ReadDir => "read directory",
            Self::CreateDir => "create directory",
            Self::CopyContent => "copy content of",
            Self::CreateNode => "create node",
            Self::ReadLink => "read link",
            Self::CreateLink => "create link",
            Self::Remove => "remove",
            Self::SetPermissions => "set permissions on",
            Self::Resolve => "resolve",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during copy operations.
///
/// All errors include relevant path information to aid debugging.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error during a filesystem operation
    #[error("failed to {op} {path}: {source}")]
    Io {
        /// Operation that failed
        op: IoOp,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// An input path was empty
    #[error("Empty path at position {index}")]
    EmptyPath {
        /// Index of the offending path in its batch
        index: usize,
    },

    /// Source and destination batches have different lengths
    #[error("Got {sources} source paths but {destinations} destination paths")]
    LengthMismatch {
        /// Number of source paths
        sources: usize,
        /// Number of destination paths
        destinations: usize,
    },

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is not a directory
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Source is not a symbolic link
    #[error("Source is not a symlink: {0}")]
    NotASymlink(PathBuf),

    /// Source is a directory, use `dir_copy` instead
    #[error("Source is a directory, use dir_copy instead: {0}")]
    IsADirectory(PathBuf),

    /// Destination already exists
    #[error("Destination already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Destination resolves to the source, or nests with it under overwrite
    #[error("Destination {dst} overlaps source {src}")]
    OverlappingPaths {
        /// Source directory
        src: PathBuf,
        /// Destination directory
        dst: PathBuf,
    },

    /// Symlink target climbs out with `..` and escaping links are rejected
    #[error("Symlink {link} -> {target} escapes upward")]
    EscapingSymlink {
        /// The link being copied
        link: PathBuf,
        /// Its recorded target
        target: PathBuf,
    },

    /// Failed to create temporary file
    #[error("Failed to create temporary file in {path}: {source}")]
    TempFile {
        /// Directory where temp file creation was attempted
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Failed to persist temporary file
    #[error("Failed to persist temporary file to {path}: {source}")]
    Persist {
        /// Target path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Maximum directory depth exceeded
    #[error("Maximum depth {max_depth} exceeded at: {path}")]
    MaxDepthExceeded {
        /// The path where max depth was exceeded
        path: PathBuf,
        /// The configured maximum depth
        max_depth: usize,
    },
}

impl Error {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether this error was raised by input validation, before any
    /// filesystem mutation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyPath { .. }
                | Self::LengthMismatch { .. }
                | Self::NotADirectory(_)
                | Self::NotASymlink(_)
                | Self::IsADirectory(_)
                | Self::OverlappingPaths { .. }
                | Self::EscapingSymlink { .. }
                | Self::MaxDepthExceeded { .. }
        )
    }

    /// Whether this error reports an existing destination.
    pub fn is_already_exists(&self) -> bool {
        match self {
            Self::AlreadyExists(_) => true,
            Self::Io { source, .. } | Self::Persist { source, .. } => {
                source.kind() == io::ErrorKind::AlreadyExists
            }
            _ => false,
        }
    }

    /// Whether the underlying IO error was caused by a full disk.
    pub fn is_no_space(&self) -> bool {
        match self {
            Self::Io { source, .. }
            | Self::TempFile { source, .. }
            | Self::Persist { source, .. } => is_no_space_error(source),
            _ => false,
        }
    }
}

/// Attach an operation and path to a raw IO result.
pub(crate) trait IoResultExt<T> {
    fn with_op(self, op: IoOp, path: &std::path::Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_op(self, op: IoOp, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| Error::io(op, path, e))
    }
}
