//! Classification of filesystem entries.
//!
//! Every entry met while copying is tagged with a [`PathKind`]. The kind
//! decides which copy routine handles it via [`PathKind::copy_as`]:
//!
//! | Kind | Copied as |
//! |------|-----------|
//! | `Directory` | [`CopyAs::Directory`] |
//! | `Symlink` | [`CopyAs::Link`] |
//! | everything else | [`CopyAs::File`] |

use crate::error::{IoOp, IoResultExt, Result};
use std::fs::{self, FileType};
use std::path::Path;

/// Kind of a filesystem entry, read without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Regular file (hard links included)
    RegularFile,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Named pipe
    Fifo,
    /// Unix domain socket
    Socket,
    /// Character device
    CharDevice,
    /// Block device
    BlockDevice,
    /// Anything the platform does not let us identify
    Unknown,
}

/// How an entry of a given [`PathKind`] is reproduced at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyAs {
    /// Through the file copy routine
    File,
    /// Recreated as a directory and recursed into
    Directory,
    /// Recreated as a symlink with the same target
    Link,
}

impl PathKind {
    /// Classify a [`FileType`] obtained from `symlink_metadata` or a
    /// directory entry.
    pub fn from_file_type(ft: FileType) -> Self {
        if ft.is_symlink() {
            return Self::Symlink;
        }
        if ft.is_dir() {
            return Self::Directory;
        }
        if ft.is_file() {
            return Self::RegularFile;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if ft.is_fifo() {
                return Self::Fifo;
            }
            if ft.is_socket() {
                return Self::Socket;
            }
            if ft.is_char_device() {
                return Self::CharDevice;
            }
            if ft.is_block_device() {
                return Self::BlockDevice;
            }
        }

        Self::Unknown
    }

    /// Classify the entry at `path` without following a final symlink.
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::symlink_metadata(path).with_op(IoOp::Stat, path)?;
        Ok(Self::from_file_type(meta.file_type()))
    }

    /// Which copy routine reproduces this kind.
    pub fn copy_as(self) -> CopyAs {
        match self {
            Self::Directory => CopyAs::Directory,
            Self::Symlink => CopyAs::Link,
            Self::RegularFile
            | Self::Fifo
            | Self::Socket
            | Self::CharDevice
            | Self::BlockDevice
            | Self::Unknown => CopyAs::File,
        }
    }

    /// Kinds that are neither regular files, directories nor links.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            Self::Fifo | Self::Socket | Self::CharDevice | Self::BlockDevice
        )
    }
}
