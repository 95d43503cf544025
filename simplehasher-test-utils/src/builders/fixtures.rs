//! Temporary directories populated with deterministic files

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `len` bytes of the repeating pattern `(i * 7 + 3) mod 256`
pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(7).wrapping_add(3) & 0xff) as u8).collect()
}

/// A temporary directory that is removed on drop.
///
/// Every helper returns the absolute path of what it created so tests can
/// feed it straight into a request.
pub struct FixtureDir {
    dir: TempDir,
    files: Vec<PathBuf>,
}

impl FixtureDir {
    /// Create an empty fixture directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create fixture directory"),
            files: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Files created so far, in creation order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Write `contents` to `name`, creating parent directories
    pub fn add_file(&mut self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create fixture subdirectory");
        }
        std::fs::write(&path, contents).expect("failed to write fixture file");
        self.files.push(path.clone());
        path
    }

    /// Write `len` bytes of [`pattern_bytes`] to `name`
    pub fn add_pattern_file(&mut self, name: &str, len: usize) -> PathBuf {
        self.add_file(name, &pattern_bytes(len))
    }

    /// A path inside the fixture that does not exist
    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Builder form of [`FixtureDir::add_file`]
    pub fn with_file(mut self, name: &str, contents: &[u8]) -> Self {
        self.add_file(name, contents);
        self
    }

    /// Builder adding `count` pattern files `file_<i>.bin` of `len` bytes each
    pub fn with_pattern_files(mut self, count: usize, len: usize) -> Self {
        for i in 0..count {
            self.add_pattern_file(&format!("file_{i}.bin"), len);
        }
        self
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_bytes() {
        assert_eq!(pattern_bytes(4), vec![3, 10, 17, 24]);
        assert_eq!(pattern_bytes(300)[256], 3);
    }

    #[test]
    fn test_fixture_files() {
        let mut fixture = FixtureDir::new().with_pattern_files(2, 100);
        let nested = fixture.add_file("sub/dir/x.txt", b"x");

        assert_eq!(fixture.files().len(), 3);
        assert_eq!(std::fs::read(&fixture.files()[0]).unwrap(), pattern_bytes(100));
        assert_eq!(std::fs::read(nested).unwrap(), b"x");
        assert!(!fixture.missing("nope.bin").exists());
    }
}
