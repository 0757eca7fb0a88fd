//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// What a tree entry looks like, independent of where the tree lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
    Special,
}

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Path of `rel` inside the source directory.
    pub fn src_path(&self, rel: &str) -> PathBuf {
        self.src.path().join(rel)
    }

    /// Path of `rel` inside the destination directory.
    pub fn dst_path(&self, rel: &str) -> PathBuf {
        self.dst.path().join(rel)
    }

    /// Write a file below the source directory, creating parents.
    pub fn write_src(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.src_path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Build the tree `a/`, `a/b/`, `a/x`, `a/b/y` and, on unix,
    /// `a/lnk -> ../somewhere`. Returns the path of `a`.
    pub fn create_sample_tree(&self) -> PathBuf {
        let a = self.src_path("a");
        fs::create_dir_all(a.join("b")).expect("Failed to create directory");
        fs::write(a.join("x"), "content of x").expect("Failed to write file");
        fs::write(a.join("b").join("y"), "content of y").expect("Failed to write file");

        #[cfg(unix)]
        std::os::unix::fs::symlink("../somewhere", a.join("lnk"))
            .expect("Failed to create symlink");

        a
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Describe every entry below `root` (root excluded), keyed by relative path.
/// Symlinks are recorded, never followed.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Node> {
    let mut out = BTreeMap::new();
    walk(root, Path::new(""), &mut out);
    out
}

fn walk(root: &Path, rel: &Path, out: &mut BTreeMap<PathBuf, Node>) {
    for entry in fs::read_dir(root.join(rel)).expect("Failed to read directory") {
        let entry = entry.expect("Failed to read entry");
        let child = rel.join(entry.file_name());
        let ft = entry.file_type().expect("Failed to read file type");
        if ft.is_symlink() {
            let target = fs::read_link(entry.path()).expect("Failed to read link");
            out.insert(child, Node::Link(target));
        } else if ft.is_dir() {
            out.insert(child.clone(), Node::Dir);
            walk(root, &child, out);
        } else if ft.is_file() {
            let content = fs::read(entry.path()).expect("Failed to read file");
            out.insert(child, Node::File(content));
        } else {
            out.insert(child, Node::Special);
        }
    }
}

/// Create a named pipe for tests.
#[cfg(unix)]
pub fn mkfifo(path: &Path) {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_c = CString::new(path.as_os_str().as_bytes()).expect("path contains interior NUL");
    // SAFETY: `path_c` is a valid NUL-terminated string that outlives the call.
    let result = unsafe { libc::mkfifo(path_c.as_ptr(), 0o644) };
    assert_eq!(result, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}
