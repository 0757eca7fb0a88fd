//! Batch validation and failure policy integration tests.
//!
//! These tests pin down how a batch call behaves:
//! - Preconditions are checked for every element before anything is written
//! - Copying stops at the first failing element (fail-fast)
//! - Work finished for earlier elements stays in place
//! - Returned paths are normalized destinations

mod common;

use common::TestFixture;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use treecopy::{CopyOptions, Error, dir_copy, file_copy, link_copy, normalize};

#[derive(Debug, Clone, Copy)]
enum Op {
    File,
    Link,
    Dir,
}

fn run(
    op: Op,
    srcs: &[PathBuf],
    dsts: &[PathBuf],
    options: &CopyOptions,
) -> treecopy::Result<Vec<PathBuf>> {
    match op {
        Op::File => file_copy(srcs, dsts, options),
        Op::Link => link_copy(srcs, dsts, options),
        Op::Dir => dir_copy(srcs, dsts, options),
    }
}

#[rstest]
#[case::file(Op::File)]
#[case::link(Op::Link)]
#[case::dir(Op::Dir)]
fn test_empty_destination_is_rejected(#[case] op: Op) {
    let fx = TestFixture::new();
    let src = fx.write_src("f", "f");

    let result = run(op, &[src], &[PathBuf::new()], &CopyOptions::default());

    assert!(matches!(result, Err(Error::EmptyPath { index: 0 })));
}

#[rstest]
#[case::link(Op::Link)]
#[case::dir(Op::Dir)]
fn test_length_mismatch_is_rejected(#[case] op: Op) {
    let fx = TestFixture::new();
    let srcs = vec![fx.src_path("a"), fx.src_path("b")];
    let dsts = vec![fx.dst_path("a")];

    let result = run(op, &srcs, &dsts, &CopyOptions::default());

    assert!(matches!(
        result,
        Err(Error::LengthMismatch {
            sources: 2,
            destinations: 1
        })
    ));
    assert!(!fx.dst_path("a").exists());
}

#[rstest]
#[case::no_overwrite(false)]
#[case::overwrite(true)]
fn test_file_overwrite_guard(#[case] overwrite: bool) {
    let fx = TestFixture::new();
    let src = fx.write_src("s", "from source");
    let dst = fx.dst_path("d");
    fs::write(&dst, "already here").unwrap();

    let mut options = CopyOptions::default();
    options.overwrite = overwrite;
    let result = file_copy(&[&src], &[&dst], &options);

    if overwrite {
        result.unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "from source");
    } else {
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "already here");
    }
}

#[rstest]
#[case::empty("")]
#[case::text("hello\n")]
#[case::binary("\u{0}\u{1}\u{2}binary\u{ff}")]
fn test_file_round_trip(#[case] content: &str) {
    let fx = TestFixture::new();
    let src = fx.write_src("f", content);
    let dst = fx.dst_path("g");

    file_copy(&[&src], &[&dst], &CopyOptions::default()).unwrap();

    assert_eq!(fs::read(&dst).unwrap(), fs::read(&src).unwrap());
}

#[test]
fn test_file_batch_stops_at_first_failure() {
    let fx = TestFixture::new();
    let srcs = vec![
        fx.write_src("one", "1"),
        fx.src_path("missing"),
        fx.write_src("three", "3"),
    ];
    let dsts = vec![fx.dst_path("one"), fx.dst_path("two"), fx.dst_path("three")];

    let result = file_copy(&srcs, &dsts, &CopyOptions::default());

    assert!(matches!(result, Err(Error::SourceNotFound(ref p)) if p == &srcs[1]));
    assert_eq!(fs::read_to_string(&dsts[0]).unwrap(), "1");
    assert!(!dsts[1].exists());
    assert!(!dsts[2].exists());
}

#[test]
fn test_dir_batch_stops_at_first_failing_tree() {
    let fx = TestFixture::new();
    fx.write_src("t1/f", "1");
    fx.write_src("t2/f", "2");
    fx.write_src("t3/f", "3");
    let srcs = vec![fx.src_path("t1"), fx.src_path("t2"), fx.src_path("t3")];
    let dsts = vec![fx.dst_path("t1"), fx.dst_path("t2"), fx.dst_path("t3")];
    fs::create_dir_all(&dsts[1]).unwrap();
    fs::write(dsts[1].join("f"), "blocker").unwrap();

    let result = dir_copy(&srcs, &dsts, &CopyOptions::default());

    assert!(matches!(result, Err(ref e) if e.is_already_exists()));
    assert_eq!(fs::read_to_string(dsts[0].join("f")).unwrap(), "1");
    assert_eq!(fs::read_to_string(dsts[1].join("f")).unwrap(), "blocker");
    assert!(!dsts[2].exists());
}

#[test]
fn test_returned_paths_are_normalized() {
    let fx = TestFixture::new();
    let src = fx.write_src("f", "f");
    let messy = fx.dst.path().join(".").join("sub").join("..").join("g");
    fs::create_dir(fx.dst_path("sub")).unwrap();

    let copied = file_copy(&[&src], &[&messy], &CopyOptions::default()).unwrap();

    assert_eq!(copied, vec![normalize(&messy).unwrap()]);
    assert!(!copied[0].to_string_lossy().contains("/./"));
    assert!(copied[0].is_absolute());
}

#[test]
fn test_single_destination_directory_broadcast() {
    let fx = TestFixture::new();
    let srcs = vec![fx.write_src("a", "a"), fx.write_src("b", "b")];

    let copied = file_copy(&srcs, &[fx.dst.path()], &CopyOptions::default()).unwrap();

    assert_eq!(copied, vec![fx.dst_path("a"), fx.dst_path("b")]);
    assert_eq!(fs::read_to_string(fx.dst_path("b")).unwrap(), "b");
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use std::path::Path;

    #[test]
    fn test_link_copy_validates_all_sources_first() {
        let fx = TestFixture::new();
        let good = fx.src_path("good");
        symlink("anywhere", &good).unwrap();
        let plain = fx.write_src("plain", "x");

        let result = link_copy(
            &[&good, &plain],
            &[fx.dst_path("good"), fx.dst_path("plain")],
            &CopyOptions::default(),
        );

        assert!(matches!(result, Err(ref e) if e.is_precondition()));
        assert!(fs::symlink_metadata(fx.dst_path("good")).is_err());
    }

    #[test]
    fn test_link_batch_stops_at_first_conflict() {
        let fx = TestFixture::new();
        let names = ["l0", "l1", "l2"];
        let srcs: Vec<_> = names.iter().map(|n| fx.src_path(n)).collect();
        for (src, n) in srcs.iter().zip(names) {
            symlink(format!("target-{n}"), src).unwrap();
        }
        let dsts: Vec<_> = names.iter().map(|n| fx.dst_path(n)).collect();
        symlink("something-else", &dsts[1]).unwrap();

        let result = link_copy(&srcs, &dsts, &CopyOptions::default());

        assert!(matches!(result, Err(Error::AlreadyExists(ref p)) if p == &dsts[1]));
        assert_eq!(fs::read_link(&dsts[0]).unwrap(), Path::new("target-l0"));
        assert_eq!(fs::read_link(&dsts[1]).unwrap(), Path::new("something-else"));
        assert!(fs::symlink_metadata(&dsts[2]).is_err());
    }

    #[test]
    fn test_dangling_link_target_preserved() {
        let fx = TestFixture::new();
        let link = fx.src_path("l");
        symlink("no/such/target", &link).unwrap();

        let copied = link_copy(&[&link], &[fx.dst_path("l2")], &CopyOptions::default()).unwrap();

        assert_eq!(fs::read_link(&copied[0]).unwrap(), Path::new("no/such/target"));
    }
}
