use dupfind::duplicates::{DuplicateFinder, FinderConfig};
use dupfind::scanner::Candidate;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_vanished_first_file_is_omitted() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("a_gone");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    fs::write(&b, b"same").unwrap();
    fs::write(&c, b"same").unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(1));
    let (groups, summary) = finder
        .find_duplicates_from_candidates(vec![
            Candidate::new(&gone, 4, 1),
            Candidate::new(&b, 4, 1),
            Candidate::new(&c, 4, 1),
        ])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![b, c]);
    assert_eq!(summary.digest_failures, 1);
    assert_eq!(summary.digested, 2);
}

#[test]
fn test_all_files_vanished() {
    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
    let (groups, summary) = finder
        .find_duplicates_from_candidates(vec![
            Candidate::new("nonexistent_1.txt", 100, 1),
            Candidate::new("nonexistent_2.txt", 100, 1),
        ])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.digest_failures, 2);
    assert!(summary.has_errors());
}

#[test]
fn test_unique_sizes_are_never_opened() {
    // None of these files exist; with distinct sizes none is ever read.
    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(1));
    let (groups, summary) = finder
        .find_duplicates_from_candidates(vec![
            Candidate::new("missing_1", 1, 1),
            Candidate::new("missing_2", 2, 1),
            Candidate::new("missing_3", 3, 1),
        ])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.digest_failures, 0);
    assert_eq!(summary.unique_sizes, 3);
    assert!(!summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden"), b"dup").unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Running as root ignores permissions; nothing to check then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(1));
    let result = finder.find_duplicates(&[dir.path().to_path_buf()]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.scan_errors.len(), 1);
}
