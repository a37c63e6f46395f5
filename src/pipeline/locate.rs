//! Image discovery in the source directory

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{BatchScaleError, Result};
use crate::processing::formats::is_supported_source;

/// Enumerate candidate image files directly inside `source_dir`.
///
/// Only regular files whose extension matches the case-sensitive
/// allow-list qualify; subdirectories are not entered. The returned order
/// is whatever the filesystem yields and carries no meaning downstream.
pub async fn find_images(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(source_dir)
        .await
        .map_err(|_| BatchScaleError::directory_not_found(source_dir))?;
    if !metadata.is_dir() {
        return Err(BatchScaleError::directory_not_found(source_dir));
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(source_dir)
        .await
        .map_err(|_| BatchScaleError::directory_not_found(source_dir))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|_| BatchScaleError::directory_not_found(source_dir))?
    {
        let path = entry.path();
        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_file() && is_supported_source(&path) {
            files.push(path);
        }
    }

    debug!("Discovered {} image files in {:?}", files.len(), source_dir);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name))
            .unwrap()
            .write_all(b"stub")
            .unwrap();
    }

    #[tokio::test]
    async fn test_finds_only_supported_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "b.jpg");
        touch(dir.path(), "c.jpeg");
        touch(dir.path(), "d.gif");
        touch(dir.path(), "e.txt");
        touch(dir.path(), "noext");

        let mut found: Vec<_> = find_images(dir.path())
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();

        assert_eq!(found, vec!["a.png", "b.jpg", "c.jpeg"]);
    }

    #[tokio::test]
    async fn test_extension_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "upper.PNG");
        touch(dir.path(), "mixed.Jpg");
        touch(dir.path(), "lower.png");

        let found = find_images(dir.path()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("lower.png"));
    }

    #[tokio::test]
    async fn test_does_not_recurse() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.png");

        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        touch(&sub, "deep.png");

        let found = find_images(dir.path()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("top.png"));
    }

    #[tokio::test]
    async fn test_empty_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let found = find_images(dir.path()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = find_images(&missing).await.unwrap_err();
        assert!(matches!(err, BatchScaleError::DirectoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_file_as_source_dir_fails() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.png");

        let err = find_images(&dir.path().join("file.png")).await.unwrap_err();
        assert!(matches!(err, BatchScaleError::DirectoryNotFound { .. }));
    }
}
