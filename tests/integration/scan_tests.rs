use dupfind::config::ScanConfig;
use dupfind::duplicates::{DuplicateFinder, FinderConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn streaming() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
}

fn with_scan_config(config: ScanConfig) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(1)
            .with_scan_config(config),
    )
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (groups, summary) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_pair_found_and_odd_size_never_read() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"xxxxxxxxxx");
    let b = write(dir.path(), "b", b"xxxxxxxxxx");
    write(dir.path(), "c", b"yyyyyyyyyyyyyyyyyyyy");

    let (groups, summary) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b]);
    assert_eq!(groups[0].size, 10);
    assert_eq!(summary.digested, 2);
    assert_eq!(summary.unique_sizes, 1);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"xxxxxxxxxx");
    write(dir.path(), "b", b"zzzzzzzzzz");

    let (groups, summary) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.digested, 2);
}

#[test]
fn test_three_identical_files() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"hello");
    let b = write(dir.path(), "b", b"hello");
    let c = write(dir.path(), "c", b"hello");

    let (groups, summary) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b, c]);
    // One digest per file: the first one is read only once.
    assert_eq!(summary.digested, 3);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_nested_directories() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "top.txt", b"nested dup");
    let deep = write(dir.path(), "one/two/three/deep.txt", b"nested dup");

    let (groups, _) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].paths().contains(&top));
    assert!(groups[0].paths().contains(&deep));
}

#[test]
fn test_min_depth_rejects_root_file() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "lonely.txt", b"content");

    let (groups, summary) = with_scan_config(ScanConfig::parse(1, None, None).unwrap())
        .find_duplicates(&[file])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.accepted, 0);
}

#[test]
fn test_min_depth_skips_shallow_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "shallow", b"same");
    let deep_a = write(dir.path(), "sub/a", b"same");
    let deep_b = write(dir.path(), "sub/b", b"same");

    let (groups, summary) = with_scan_config(ScanConfig::parse(2, None, None).unwrap())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![deep_a, deep_b]);
    assert_eq!(summary.rejected, 1);
}

#[test]
fn test_max_depth_limits_descent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "sub/deeper/b", b"same");

    let (groups, summary) = with_scan_config(ScanConfig::parse(0, Some(2), None).unwrap())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_size_filter_less_or_equal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "big_a", &[1u8; 2048]);
    write(dir.path(), "big_b", &[1u8; 2048]);
    let small_a = write(dir.path(), "small_a", &[2u8; 1024]);
    let small_b = write(dir.path(), "small_b", &[2u8; 1024]);

    let (groups, summary) = with_scan_config(ScanConfig::parse(0, None, Some("-1k")).unwrap())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![small_a, small_b]);
    assert_eq!(summary.rejected, 2);
}

#[test]
fn test_size_filter_exact() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"12345678");
    let b = write(dir.path(), "b", b"12345678");
    write(dir.path(), "c", b"123");
    write(dir.path(), "d", b"123");

    let (groups, _) = with_scan_config(ScanConfig::parse(0, None, Some("4w")).unwrap())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![a, b]);
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let (groups, _) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(
            dir.path(),
            &format!("d{}/f{i}", i % 4),
            format!("content-{}", i % 5).as_bytes(),
        );
    }
    let roots = [dir.path().to_path_buf()];

    let (first, _) = streaming().find_duplicates(&roots).unwrap();
    let (second, _) = streaming().find_duplicates(&roots).unwrap();
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(8));
    let (third, _) = parallel.find_duplicates(&roots).unwrap();

    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn test_groups_in_order_of_first_digest() {
    let dir = tempdir().unwrap();
    let a1 = write(dir.path(), "a1", b"aaaa");
    let b1 = write(dir.path(), "b1", b"bb");
    let a2 = write(dir.path(), "c_a2", b"aaaa");
    let b2 = write(dir.path(), "d_b2", b"bb");

    let (groups, _) = streaming()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].paths(), vec![a1, a2]);
    assert_eq!(groups[1].paths(), vec![b1, b2]);
}
