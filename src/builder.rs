//! Builder API for single-path copies.
//!
//! [`CopyBuilder`] copies one source to one destination and picks the right
//! operation from what the source is, so callers don't need to know whether
//! they hold a file, a symlink or a directory.
//!
//! # Examples
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! // Directory, file or symlink: dispatched automatically
//! let dst = CopyBuilder::new("config", "config.orig").run()?;
//! println!("copied to {}", dst.display());
//! # Ok::<(), treecopy::Error>(())
//! ```
//!
//! ```no_run
//! use treecopy::CopyBuilder;
//!
//! // Replace a previous copy entirely
//! CopyBuilder::new("assets", "build/assets")
//!     .overwrite()
//!     .no_fsync()
//!     .run()?;
//! # Ok::<(), treecopy::Error>(())
//! ```

use crate::copy::{dir_copy, file_copy, link_copy};
use crate::error::{Error, Result};
use crate::kind::{CopyAs, PathKind};
use crate::options::CopyOptions;
use crate::utils::path::{check_not_empty, normalize};
use std::path::{Path, PathBuf};

/// A builder for configuring and executing a single copy.
///
/// The source is classified without following a symlink at its own path:
///
/// | Source | Operation |
/// |--------|-----------|
/// | symlink | [`link_copy`] |
/// | directory | [`dir_copy`] |
/// | anything else | [`file_copy`] |
#[derive(Debug, Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    options: CopyOptions,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given source and destination paths.
    ///
    /// Uses default options (no overwrite, fsync, preserve permissions).
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            options: CopyOptions::default(),
        }
    }

    /// Replace whatever exists at the destination.
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.options = self.options.with_overwrite();
        self
    }

    /// Disable fsync after writing files.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.options = self.options.without_fsync();
        self
    }

    /// Don't copy permission bits.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.options = self.options.without_permissions();
        self
    }

    /// Limit how deep a directory copy may descend.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options = self.options.with_max_depth(depth);
        self
    }

    /// Fail on symlinks whose relative target contains `..`.
    #[must_use]
    pub fn reject_escaping_links(mut self) -> Self {
        self.options = self.options.with_reject_escaping_links();
        self
    }

    /// Route warnings to a custom handler.
    #[must_use]
    pub fn warn_handler(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Use a fully configured [`CopyOptions`].
    #[must_use]
    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// The options this builder will run with.
    pub fn get_options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute the copy.
    ///
    /// # Returns
    ///
    /// The normalized destination path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if the source does not exist, and
    /// otherwise whatever the dispatched operation returns.
    pub fn run(self) -> Result<PathBuf> {
        check_not_empty(&[&self.src])?;
        let src = normalize(&self.src)?;

        let kind = match PathKind::of(&src) {
            Ok(kind) => kind,
            Err(Error::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SourceNotFound(src));
            }
            Err(e) => return Err(e),
        };

        let copied = match kind.copy_as() {
            CopyAs::Link => link_copy(&[&src], &[&self.dst], &self.options)?,
            CopyAs::Directory => dir_copy(&[&src], &[&self.dst], &self.options)?,
            CopyAs::File => file_copy(&[&src], &[&self.dst], &self.options)?,
        };

        copied
            .into_iter()
            .next()
            .ok_or(Error::LengthMismatch {
                sources: 1,
                destinations: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_builder_defaults() {
        let builder = CopyBuilder::new("src", "dst");
        assert!(!builder.get_options().overwrite);
        assert!(builder.get_options().fsync);
    }

    #[test]
    fn test_builder_chain() {
        let builder = CopyBuilder::new("src", "dst")
            .overwrite()
            .no_fsync()
            .no_permissions()
            .max_depth(4)
            .reject_escaping_links();
        let options = builder.get_options();
        assert!(options.overwrite);
        assert!(!options.fsync);
        assert!(!options.preserve_permissions);
        assert_eq!(options.max_depth, Some(4));
        assert!(options.reject_escaping_links);
    }

    #[test]
    fn test_builder_copies_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "payload").unwrap();

        let out = CopyBuilder::new(&src, &dst).run().unwrap();

        assert_eq!(out, dst);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn test_builder_copies_directory() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/f"), "f").unwrap();

        let dst = dir.path().join("tree2");
        CopyBuilder::new(&src, &dst).run().unwrap();

        assert_eq!(fs::read_to_string(dst.join("nested/f")).unwrap(), "f");
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_copies_symlink_as_link() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let target = dir.path().join("target_dir");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        symlink("target_dir", &link).unwrap();

        let dst = dir.path().join("link2");
        CopyBuilder::new(&link, &dst).run().unwrap();

        assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&dst).unwrap(), Path::new("target_dir"));
    }

    #[test]
    fn test_builder_source_not_found() {
        let dir = tempdir().unwrap();
        let result = CopyBuilder::new(dir.path().join("missing"), dir.path().join("out")).run();
        assert!(matches!(result, Err(Error::SourceNotFound(_))));
    }

    #[test]
    fn test_builder_empty_source() {
        let result = CopyBuilder::new("", "out").run();
        assert!(matches!(result, Err(Error::EmptyPath { index: 0 })));
    }
}
