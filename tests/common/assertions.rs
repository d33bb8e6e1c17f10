//! Assertions over a mirrored directory tree

use std::path::Path;

/// Every regular file under `root`, relative and `/`-separated, sorted
pub fn mirrored_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}

/// Assert that `relative` under `root` holds exactly `expected`
pub fn assert_mirrored(root: &Path, relative: &str, expected: &[u8]) {
    let path = root.join(relative);
    let actual = std::fs::read(&path)
        .unwrap_or_else(|e| panic!("{} not mirrored: {}", path.display(), e));
    assert_eq!(actual, expected, "unexpected content in {}", path.display());
}

/// Assert that no in-progress files were left behind
pub fn assert_no_partial_files(root: &Path) {
    let partial: Vec<_> = mirrored_files(root)
        .into_iter()
        .filter(|name| name.ends_with(".part"))
        .collect();
    assert!(partial.is_empty(), "partial files left: {partial:?}");
}
