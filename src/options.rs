//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`], shared by [`file_copy`](crate::file_copy),
//! [`link_copy`](crate::link_copy) and [`dir_copy`](crate::dir_copy).
//!
//! # Example
//!
//! ```
//! use treecopy::CopyOptions;
//!
//! let options = CopyOptions::default()
//!     .with_overwrite()
//!     .with_max_depth(64);
//! assert!(options.overwrite);
//! ```

/// Options for copy operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `overwrite` | `false` | Fail on existing destinations |
/// | `fsync` | `true` | Sync to disk after write |
/// | `preserve_permissions` | `true` | Copy permission bits |
/// | `reject_escaping_links` | `false` | Refuse link targets with `..` |
/// | `max_depth` | `None` | No depth limit |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Replace existing destinations (default: false)
    ///
    /// For files, the destination is removed and rewritten. For links, an
    /// existing destination link is removed first. For directories, the whole
    /// destination tree is deleted before copying.
    pub overwrite: bool,

    /// Whether to sync files to disk after writing (default: true)
    pub fsync: bool,

    /// Whether to copy permission bits of files and directories (default: true)
    pub preserve_permissions: bool,

    /// Refuse to copy symlinks whose relative target contains `..`
    /// (default: false)
    ///
    /// When set, such links make the call fail with
    /// [`Error::EscapingSymlink`](crate::Error::EscapingSymlink) before
    /// anything is written.
    pub reject_escaping_links: bool,

    /// Maximum directory depth to traverse (default: None = unlimited)
    pub max_depth: Option<usize>,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            fsync: true,
            preserve_permissions: true,
            reject_escaping_links: false,
            max_depth: None,
            warn_handler: None,
        }
    }
}

impl CopyOptions {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Replace existing destinations
    #[must_use]
    pub fn with_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Disable permission preservation
    ///
    /// New files and directories then get the default permissions for the
    /// process umask.
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }

    /// Set maximum directory depth
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Refuse symlinks that escape upward
    #[must_use]
    pub fn with_reject_escaping_links(mut self) -> Self {
        self.reject_escaping_links = true;
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }
}
