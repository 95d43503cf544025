//! Directory walker for file discovery

use std::path::Path;
use walkdir::WalkDir;

use super::{DiscoveredFile, DiscoveryError, Result};

/// Options for file discovery
#[derive(Debug, Clone, Default)]
pub struct FileDiscoveryOptions {
    /// Descend into directory arguments
    pub recursive: bool,
    /// Follow symbolic links
    pub follow_links: bool,
}

impl FileDiscoveryOptions {
    /// Create new options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recursive processing
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Expand `paths` into a flat file list.
///
/// Files found inside a directory are sorted by name. Duplicate paths are
/// kept only once, at their first position.
pub fn discover<P: AsRef<Path>>(
    paths: &[P],
    options: &FileDiscoveryOptions,
) -> Result<Vec<DiscoveredFile>> {
    let mut files: Vec<DiscoveredFile> = Vec::new();

    for path in paths {
        let path: &Path = path.as_ref();
        if !path.is_dir() {
            let size = path.metadata().map(|m| m.len()).unwrap_or(0);
            push_unique(&mut files, DiscoveredFile {
                path: path.to_path_buf(),
                size,
            });
            continue;
        }

        if !options.recursive {
            return Err(DiscoveryError::Directory(path.to_path_buf()));
        }

        let walker = WalkDir::new(path)
            .follow_links(options.follow_links)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => push_unique(&mut files, DiscoveredFile {
                    path: entry.path().to_path_buf(),
                    size: metadata.len(),
                }),
                Err(e) => {
                    // Skip files we can't read metadata for
                    log::warn!("Failed to read metadata for {:?}: {}", entry.path(), e);
                }
            }
        }
    }

    log::debug!("Discovered {} file(s)", files.len());
    Ok(files)
}

fn push_unique(files: &mut Vec<DiscoveredFile>, file: DiscoveredFile) {
    if !files.iter().any(|f| f.path == file.path) {
        files.push(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::write(base.join("b.bin"), b"bbbb").unwrap();
        fs::write(base.join("a.txt"), b"aa").unwrap();

        let subdir = base.join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("nested.dat"), b"nested").unwrap();

        dir
    }

    #[test]
    fn test_recursive_discovery_is_sorted() {
        let dir = create_test_directory();
        let options = FileDiscoveryOptions::new().with_recursive(true);

        let files = discover(&[dir.path()], &options).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                Path::new("a.txt").to_path_buf(),
                Path::new("b.bin").to_path_buf(),
                Path::new("subdir").join("nested.dat"),
            ]
        );
        assert_eq!(files[1].size, 4);
    }

    #[test]
    fn test_directory_without_recursive_is_an_error() {
        let dir = create_test_directory();
        let err = discover(&[dir.path()], &FileDiscoveryOptions::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Directory(_)));
        assert!(err.to_string().contains("--recursive"));
    }

    #[test]
    fn test_missing_files_pass_through() {
        let dir = create_test_directory();
        let missing = dir.path().join("missing.bin");
        let file = dir.path().join("a.txt");

        let files = discover(&[&missing, &file, &missing], &FileDiscoveryOptions::new()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, missing);
        assert_eq!(files[0].size, 0);
        assert_eq!(files[1].size, 2);
    }
}
