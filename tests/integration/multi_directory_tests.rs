use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
}

#[test]
fn test_duplicates_across_roots() {
    let left = tempdir().unwrap();
    let right = tempdir().unwrap();
    let a = left.path().join("photo.jpg");
    let b = right.path().join("copy.jpg");
    fs::write(&a, b"jpeg bytes").unwrap();
    fs::write(&b, b"jpeg bytes").unwrap();

    let (groups, summary) = finder()
        .find_duplicates(&[left.path().to_path_buf(), right.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b]);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_root_order_decides_file_order() {
    let left = tempdir().unwrap();
    let right = tempdir().unwrap();
    let a = left.path().join("a");
    let b = right.path().join("b");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let (groups, _) = finder()
        .find_duplicates(&[right.path().to_path_buf(), left.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups[0].paths(), vec![b, a]);
}

#[test]
fn test_file_roots_have_depth_zero() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"root file").unwrap();
    fs::write(&b, b"root file").unwrap();

    let (groups, _) = finder().find_duplicates(&[a.clone(), b.clone()]).unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().all(|f| f.depth == 0));
    assert_eq!(groups[0].paths(), vec![a, b]);
}

#[test]
fn test_missing_second_root_fails_before_walking() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();
    let missing: PathBuf = dir.path().join("missing");

    let result = finder().find_duplicates(&[dir.path().to_path_buf(), missing.clone()]);

    match result {
        Err(FinderError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got {:?}", other),
    }
}

#[test]
fn test_nested_root_does_not_duplicate_its_files() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("unique.txt"), b"only copy").unwrap();

    for roots in [
        vec![dir.path().to_path_buf(), sub.clone()],
        vec![sub.clone(), dir.path().to_path_buf()],
    ] {
        for threads in [1, 4] {
            let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(threads));
            let (groups, summary) = finder.find_duplicates(&roots).unwrap();

            assert!(groups.is_empty());
            assert_eq!(summary.total_files, 1);
        }
    }
}

#[test]
fn test_nested_root_keeps_real_duplicates() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let a = dir.path().join("a.txt");
    let b = sub.join("b.txt");
    fs::write(&a, b"shared").unwrap();
    fs::write(&b, b"shared").unwrap();

    let (groups, summary) = finder()
        .find_duplicates(&[sub.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b]);
    assert_eq!(summary.total_files, 2);
}
