//! `<ALGO>SUMS.txt` checksum files
//!
//! Files use the conventional `sha256sum` layout, one entry per line:
//! `<hex digest> *<name>` (binary mode, which is what we write) or
//! `<hex digest>  <name>` (text mode, accepted when reading). The algorithm
//! is never stored in the file; it comes from the file name.
//!
//! As with GNU coreutils, a name holding a backslash or line break is written
//! escaped (`\\`, `\n`, `\r`) and the line is prefixed with a single `\`.

use crate::error::{IoError, ValidationError};
use crate::hashing::HashAlgorithm;
use crate::scheduler::DigestResults;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Name used for content that did not come from a file
const MEMORY_ORIGIN: &str = "-";

/// One line of a checksum file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumsEntry {
    /// File name as written in the checksum file
    pub name: String,
    /// Location of the file; relative names are resolved against the
    /// checksum file's directory by [`read_sums_file`]
    pub path: PathBuf,
    /// Lowercase hex digest without whitespace
    pub expected: String,
}

/// A parsed checksum file
#[derive(Debug, Clone)]
pub struct SumsFile {
    pub path: PathBuf,
    pub algorithm: HashAlgorithm,
    pub entries: Vec<SumsEntry>,
}

/// Strip the word separators from a rendered digest and lowercase it
pub fn compact_digest(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Format one binary-mode entry, newline included
pub fn format_line(digest: &str, name: &str) -> String {
    if name.contains(['\\', '\n', '\r']) {
        format!("\\{} *{}\n", compact_digest(digest), escape_name(name))
    } else {
        format!("{} *{name}\n", compact_digest(digest))
    }
}

fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape_name(name: &str) -> std::result::Result<String, String> {
    let mut unescaped = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some(other) => return Err(format!("unknown escape '\\{other}' in file name")),
            None => return Err("file name ends with a lone '\\'".to_string()),
        }
    }
    Ok(unescaped)
}

/// Algorithm named by a checksum file, e.g. `SHA256SUMS.txt` or `MD5SUMS`
pub fn algorithm_from_file_name(path: &Path) -> Option<HashAlgorithm> {
    let file_name = path.file_name()?.to_str()?.to_ascii_uppercase();
    let stem = file_name.strip_suffix(".TXT").unwrap_or(&file_name);
    let algorithm = stem.strip_suffix("SUMS")?;
    algorithm.parse().ok()
}

/// Render every `algorithm` digest in `results` as checksum file content.
/// Names are relative to `base_dir` when the file lives below it.
pub fn render_sums(algorithm: HashAlgorithm, results: &DigestResults, base_dir: &Path) -> String {
    let canonical_base = base_dir.canonicalize().ok();
    results
        .by_algorithm(algorithm)
        .into_iter()
        .map(|(path, digest)| {
            let name = entry_name(path, base_dir, canonical_base.as_deref());
            format_line(digest, &name)
        })
        .collect()
}

fn entry_name(path: &Path, base_dir: &Path, canonical_base: Option<&Path>) -> String {
    if let Ok(relative) = path.strip_prefix(base_dir) {
        return relative.to_string_lossy().into_owned();
    }
    if let (Some(base), Ok(canonical)) = (canonical_base, path.canonicalize()) {
        if let Ok(relative) = canonical.strip_prefix(base) {
            return relative.to_string_lossy().into_owned();
        }
    }
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Write one `<ALGO>SUMS.txt` per algorithm present in `results` into `dir`.
/// Returns the files written, in algorithm display order.
pub fn write_sums_files(dir: &Path, results: &DigestResults) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| IoError::from_std(e).with_path(dir))?;

    let mut written = Vec::new();
    for algorithm in results.algorithms() {
        let target = dir.join(algorithm.sums_file_name());
        let content = render_sums(algorithm, results, dir);
        std::fs::write(&target, content).map_err(|e| IoError::from_std(e).with_path(&target))?;
        log::debug!("Wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

/// Parse checksum content for `algorithm`. Blank lines and `#` comments are
/// skipped; entry paths are taken verbatim.
pub fn parse_sums(content: &str, algorithm: HashAlgorithm) -> Result<Vec<SumsEntry>> {
    parse_lines(content, algorithm, Path::new(MEMORY_ORIGIN))
}

fn parse_lines(content: &str, algorithm: HashAlgorithm, origin: &Path) -> Result<Vec<SumsEntry>> {
    let mut entries = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let entry = parse_line(line, algorithm).map_err(|reason| {
            Error::Validation(ValidationError::malformed_checksum_line(
                origin,
                index + 1,
                &reason,
            ))
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_line(line: &str, algorithm: HashAlgorithm) -> std::result::Result<SumsEntry, String> {
    let (escaped, line) = match line.strip_prefix('\\') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    let (digest, rest) = line
        .split_once(' ')
        .ok_or_else(|| "expected '<digest> *<name>'".to_string())?;

    // Binary mode marks the name with '*', text mode with a second space
    let name = rest
        .strip_prefix('*')
        .or_else(|| rest.strip_prefix(' '))
        .unwrap_or(rest);
    if name.is_empty() {
        return Err("missing file name".to_string());
    }

    if !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("digest '{digest}' is not hexadecimal"));
    }
    if digest.len() != algorithm.hex_len() {
        return Err(format!(
            "{algorithm} digest must be {} hex characters, found {}",
            algorithm.hex_len(),
            digest.len()
        ));
    }

    let name = if escaped {
        unescape_name(name)?
    } else {
        name.to_string()
    };

    Ok(SumsEntry {
        path: PathBuf::from(&name),
        name,
        expected: digest.to_ascii_lowercase(),
    })
}

/// Load a checksum file, taking the algorithm from its name and resolving
/// relative entries against its directory
pub fn read_sums_file(path: &Path) -> Result<SumsFile> {
    let algorithm = algorithm_from_file_name(path)
        .ok_or_else(|| Error::Validation(ValidationError::unrecognized_checksum_file(path)))?;
    let content =
        std::fs::read_to_string(path).map_err(|e| IoError::from_std(e).with_path(path))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut entries = parse_lines(&content, algorithm, path)?;
    for entry in &mut entries {
        if entry.path.is_relative() {
            entry.path = base_dir.join(&entry.path);
        }
    }

    log::debug!(
        "Read {} {algorithm} entries from {}",
        entries.len(),
        path.display()
    );
    Ok(SumsFile {
        path: path.to_path_buf(),
        algorithm,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MD5_EMPTY: &str = "d41d8cd98f00b204e9800998ecf8427e";

    #[test]
    fn test_compact_digest() {
        assert_eq!(
            compact_digest("24F0130C63AC9332 16166e76b1bb925f\tf373de2d49584e7a"),
            "24f0130c63ac933216166e76b1bb925ff373de2d49584e7a"
        );
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("d41d8cd9 8f00b204 e9800998 ecf8427e", "empty.bin"),
            format!("{MD5_EMPTY} *empty.bin\n")
        );
    }

    #[test]
    fn test_escaped_names() {
        let content = format!("\\{MD5_EMPTY}  a\\\\b\n\\{MD5_EMPTY} *two\\nlines\n");
        let entries = parse_sums(&content, HashAlgorithm::MD5).unwrap();
        assert_eq!(entries[0].name, "a\\b");
        assert_eq!(entries[0].expected, MD5_EMPTY);
        assert_eq!(entries[1].name, "two\nlines");

        let line = format_line(MD5_EMPTY, "two\nlines");
        assert_eq!(line, format!("\\{MD5_EMPTY} *two\\nlines\n"));
        assert_eq!(parse_sums(&line, HashAlgorithm::MD5).unwrap()[0].name, "two\nlines");

        assert!(parse_sums(&format!("\\{MD5_EMPTY} *bad\\q"), HashAlgorithm::MD5).is_err());
    }

    #[test]
    fn test_algorithm_from_file_name() {
        let cases = [
            ("MD5SUMS.txt", Some(HashAlgorithm::MD5)),
            ("/tmp/SHA256SUMS", Some(HashAlgorithm::SHA256)),
            ("sha512sums.TXT", Some(HashAlgorithm::SHA512)),
            ("TIGERSUMS.txt", Some(HashAlgorithm::Tiger)),
            ("SHA-1SUMS.txt", Some(HashAlgorithm::SHA1)),
            ("CRC32SUMS.txt", None),
            ("notes.txt", None),
        ];
        for (name, expected) in cases {
            assert_eq!(algorithm_from_file_name(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_parse_binary_and_text_mode() {
        let content = format!(
            "{MD5_EMPTY} *a.bin\n\n# comment\n{}  dir/b c.txt\r\n",
            MD5_EMPTY.to_uppercase()
        );
        let entries = parse_sums(&content, HashAlgorithm::MD5).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.bin");
        assert_eq!(entries[1].name, "dir/b c.txt");
        assert_eq!(entries[1].expected, MD5_EMPTY);
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        let wrong_length = parse_sums("abcd *a.bin\n", HashAlgorithm::MD5).unwrap_err();
        assert!(wrong_length.to_string().contains("32 hex characters"));

        let bad_hex = format!("{} *a.bin", "z".repeat(32));
        let error = parse_sums(&format!("{MD5_EMPTY} *ok\n{bad_hex}\n"), HashAlgorithm::MD5)
            .unwrap_err();
        assert!(error.to_string().contains("line 2"));

        assert!(parse_sums(MD5_EMPTY, HashAlgorithm::MD5).is_err());
        assert!(parse_sums(&format!("{MD5_EMPTY} *"), HashAlgorithm::MD5).is_err());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join("data.bin");
        std::fs::write(&data_path, b"abc").unwrap();

        let mut results = DigestResults::new();
        for algorithm in [HashAlgorithm::SHA1, HashAlgorithm::Tiger] {
            results.insert(&data_path, algorithm, algorithm.hash_bytes(b"abc"));
        }

        let written = write_sums_files(dir.path(), &results).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("SHA1SUMS.txt"), dir.path().join("TIGERSUMS.txt")]
        );

        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(
            content,
            "a9993e364706816aba3e25717850c26c9cd0d89d *data.bin\n"
        );

        let tiger = read_sums_file(&written[1]).unwrap();
        assert_eq!(tiger.algorithm, HashAlgorithm::Tiger);
        assert_eq!(tiger.entries.len(), 1);
        assert_eq!(tiger.entries[0].path, data_path);
        assert_eq!(
            tiger.entries[0].expected,
            compact_digest(&HashAlgorithm::Tiger.hash_bytes(b"abc"))
        );
    }

    #[test]
    fn test_files_outside_directory_use_absolute_names() {
        let outside = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let data_path = outside.path().join("x.bin");

        let mut results = DigestResults::new();
        results.insert(&data_path, HashAlgorithm::MD5, MD5_EMPTY);

        let content = render_sums(HashAlgorithm::MD5, &results, target.path());
        assert_eq!(content, format!("{MD5_EMPTY} *{}\n", data_path.display()));
    }

    #[test]
    fn test_read_unrecognized_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("checksums.txt");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            read_sums_file(&path),
            Err(Error::Validation(ValidationError::UnrecognizedChecksumFile { .. }))
        ));
    }
}
