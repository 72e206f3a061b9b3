use std::path::Path;
use std::sync::Arc;

use checksums::RollingChecksum;
use checksums::strong::Sha1;
use index::{BLOCK_SIZE, BlockIndex, IndexBuilder, IndexError, NodeKind};
use test_support::{FixtureTree, patterned_bytes};

#[test]
fn ten_thousand_bytes_make_two_blocks() {
    let fixture = FixtureTree::new().expect("fixture");
    let data = patterned_bytes(10_000, 1);
    fixture.write("big.bin", &data).expect("write");

    let tree = IndexBuilder::new(fixture.root()).build().expect("index");
    let file = tree.find(Path::new("big.bin")).expect("file");
    let ranges: Vec<_> = file.blocks().filter_map(|b| b.block_range()).collect();
    assert_eq!(ranges, [(0, 8192), (8192, 1808)]);

    let mut weak = RollingChecksum::new();
    weak.update(&data[..BLOCK_SIZE]);
    let first = file.blocks().next().and_then(|b| b.as_block().copied()).expect("block");
    assert_eq!(first.weak(), weak.value());
    assert_eq!(file.strong(), Sha1::digest(&data));
}

#[test]
fn single_file_root_has_no_enclosing_dir() {
    let fixture = FixtureTree::new().expect("fixture");
    let path = fixture.write("solo.dat", patterned_bytes(20_000, 2)).expect("write");

    let tree = IndexBuilder::new(&path).build().expect("index");
    assert_eq!(tree.root().kind(), NodeKind::File);
    assert_eq!(tree.root().name(), Some("solo.dat"));
    assert_eq!(tree.root().blocks().count(), 3);
    assert!(tree.root().parent().is_none());
}

#[test]
fn identical_content_keeps_both_files() {
    let fixture = FixtureTree::new().expect("fixture");
    let data = patterned_bytes(9_000, 5);
    fixture.write("a.txt", &data).expect("write a");
    fixture.write("b.txt", &data).expect("write b");

    let tree = Arc::new(IndexBuilder::new(fixture.root()).build().expect("index"));
    let a = tree.find(Path::new("a.txt")).expect("a");
    let b = tree.find(Path::new("b.txt")).expect("b");
    assert_eq!(a.strong(), b.strong());
    let a_blocks: Vec<_> = a.blocks().map(|n| n.strong()).collect();
    let b_blocks: Vec<_> = b.blocks().map(|n| n.strong()).collect();
    assert_eq!(a_blocks, b_blocks);

    let index = BlockIndex::new(Arc::clone(&tree));
    assert_eq!(index.files_with(&a.strong()).count(), 2);
    assert_ne!(a.id(), b.id());
}

#[test]
fn reindexing_is_deterministic() {
    let fixture = FixtureTree::new().expect("fixture");
    fixture.write("x/one.txt", b"one").expect("write");
    fixture.write("x/y/two.txt", b"two").expect("write");
    fixture.write("three.txt", patterned_bytes(30_000, 3)).expect("write");

    let first = IndexBuilder::new(fixture.root()).build().expect("first");
    let second = IndexBuilder::new(fixture.root()).parallel(false).build().expect("second");
    assert_eq!(first.root().strong(), second.root().strong());
    assert_eq!(first, second);
}

#[test]
fn dir_hash_ignores_creation_order() {
    let left = FixtureTree::new().expect("fixture");
    let right = FixtureTree::new().expect("fixture");
    for name in ["c", "a", "b"] {
        left.write(format!("d/{name}.txt"), name).expect("write");
    }
    for name in ["b", "c", "a"] {
        right.write(format!("d/{name}.txt"), name).expect("write");
    }

    let left = IndexBuilder::new(left.root()).build().expect("left");
    let right = IndexBuilder::new(right.root()).build().expect("right");
    assert_eq!(left.root().strong(), right.root().strong());
}

#[test]
fn content_change_propagates_to_root() {
    let fixture = FixtureTree::new().expect("fixture");
    fixture.write("deep/er/file.txt", b"before").expect("write");
    let before = IndexBuilder::new(fixture.root()).build().expect("before");

    fixture.write("deep/er/file.txt", b"after").expect("rewrite");
    let after = IndexBuilder::new(fixture.root()).build().expect("after");

    assert_ne!(before.root().strong(), after.root().strong());
    let deep = |tree: &index::IndexTree| tree.find(Path::new("deep")).map(|n| n.strong());
    assert_ne!(deep(&before), deep(&after));
}

#[test]
fn skip_prefix_hides_top_level_entries_only() {
    let fixture = FixtureTree::new().expect("fixture");
    fixture.write("_reloc123", b"staged").expect("write");
    fixture.write("keep/_reloc456", b"nested").expect("write");

    let tree = IndexBuilder::new(fixture.root())
        .skip_prefix("_reloc")
        .build()
        .expect("index");
    assert!(tree.find(Path::new("_reloc123")).is_none());
    assert!(tree.find(Path::new("keep/_reloc456")).is_some());
}

#[test]
fn missing_root_reports_path() {
    let fixture = FixtureTree::new().expect("fixture");
    let missing = fixture.path("nope");
    let error = IndexBuilder::new(&missing).build().unwrap_err();
    assert!(matches!(error, IndexError::RootMetadata { .. }));
    assert_eq!(error.path(), missing);
}

#[cfg(unix)]
#[test]
fn symlinks_are_skipped() {
    let fixture = FixtureTree::new().expect("fixture");
    let target = fixture.write("real.txt", b"data").expect("write");
    std::os::unix::fs::symlink(&target, fixture.path("link.txt")).expect("symlink");

    let tree = IndexBuilder::new(fixture.root()).build().expect("index");
    assert!(tree.find(Path::new("link.txt")).is_none());
    assert_eq!(tree.file_count(), 1);

    let error = IndexBuilder::new(fixture.path("link.txt")).build().unwrap_err();
    assert!(matches!(error, IndexError::UnsupportedRoot { .. }));
}

#[cfg(unix)]
#[test]
fn modes_are_recorded() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = FixtureTree::new().expect("fixture");
    let path = fixture.write("script.sh", b"#!/bin/sh\n").expect("write");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).expect("chmod");

    let tree = IndexBuilder::new(fixture.root()).build().expect("index");
    let file = tree.find(Path::new("script.sh")).and_then(|n| n.as_file().cloned());
    assert_eq!(file.map(|f| f.mode()), Some(0o750));
}

#[cfg(unix)]
#[test]
fn non_utf8_names_abort_the_build() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = FixtureTree::new().expect("fixture");
    let name = OsStr::from_bytes(b"bad\xff.txt");
    if std::fs::write(fixture.root().join(name), b"x").is_err() {
        // Some filesystems refuse invalid UTF-8 names outright.
        return;
    }

    let error = IndexBuilder::new(fixture.root()).build().unwrap_err();
    assert!(matches!(error, IndexError::InvalidName { .. }));
}
