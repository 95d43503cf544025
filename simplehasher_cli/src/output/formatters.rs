use super::OutputFormatter;
use anyhow::Result;
use colored::*;
use simplehasher_core::BatchReport;
use simplehasher_core::sums::compact_digest;
use serde_json::{Value, json};

/// Text formatter for human-readable output.
///
/// One line per digest in BSD tag style, `ALGO (path) = digest`, keeping the
/// algorithm's word grouping.
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();

        for (path, algorithm, digest) in report.results.iter() {
            let algo_str = self.colorize(algorithm.name(), |s| s.yellow());
            let hash_str = self.colorize(digest, |s| s.cyan());
            output.push_str(&format!("{algo_str} ({}) = {hash_str}\n", path.display()));
        }

        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let results: Vec<Value> = report
            .results
            .iter()
            .map(|(path, algorithm, digest)| {
                json!({
                    "path": path.to_string_lossy(),
                    "algorithm": algorithm,
                    "digest": compact_digest(digest),
                    "words": digest,
                })
            })
            .collect();

        let errors: Vec<Value> = report
            .errors
            .iter()
            .map(|(path, message)| {
                json!({
                    "path": path.to_string_lossy(),
                    "message": message,
                })
            })
            .collect();

        let document = json!({
            "results": results,
            "errors": errors,
            "total_tasks": report.total_tasks,
            "completed_tasks": report.completed_tasks,
            "failed_tasks": report.failed_tasks,
            "cancelled": report.cancelled,
            "elapsed_ms": report.elapsed.as_millis() as u64,
        });

        if self.pretty {
            Ok(serde_json::to_string_pretty(&document)? + "\n")
        } else {
            Ok(serde_json::to_string(&document)? + "\n")
        }
    }
}

/// CSV formatter for tabular output
#[derive(Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn get_headers() -> Vec<&'static str> {
        vec!["path", "algorithm", "digest"]
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(Self::get_headers())?;

        for (path, algorithm, digest) in report.results.iter() {
            wtr.write_record([
                &*path.to_string_lossy(),
                algorithm.name(),
                compact_digest(digest).as_str(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplehasher_core::{DigestResults, HashAlgorithm};
    use std::path::PathBuf;
    use std::time::Duration;

    fn sample_report() -> BatchReport {
        let mut results = DigestResults::new();
        results.insert(
            "dir/abc.txt",
            HashAlgorithm::MD5,
            HashAlgorithm::MD5.hash_bytes(b"abc"),
        );
        results.insert(
            "dir/abc.txt",
            HashAlgorithm::SHA1,
            HashAlgorithm::SHA1.hash_bytes(b"abc"),
        );

        let mut report = BatchReport {
            results,
            total_tasks: 3,
            completed_tasks: 2,
            failed_tasks: 1,
            elapsed: Duration::from_millis(42),
            ..BatchReport::default()
        };
        report
            .errors
            .insert(PathBuf::from("gone.bin"), "not found".to_string());
        report
    }

    #[test]
    fn test_text_formatter() {
        let output = TextFormatter::new(false)
            .format_report(&sample_report())
            .unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("MD5 (dir/abc.txt) = "));
        assert!(lines[1].starts_with("SHA-1 (dir/abc.txt) = "));
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter::new(false)
            .format_report(&sample_report())
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["results"][0]["algorithm"], "MD5");
        assert_eq!(
            value["results"][0]["digest"],
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(value["errors"][0]["path"], "gone.bin");
        assert_eq!(value["failed_tasks"], 1);
        assert_eq!(value["cancelled"], false);
        assert_eq!(value["elapsed_ms"], 42);
    }

    #[test]
    fn test_csv_formatter() {
        let output = CsvFormatter::new().format_report(&sample_report()).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("path,algorithm,digest"));
        assert_eq!(
            lines.next(),
            Some("dir/abc.txt,MD5,900150983cd24fb0d6963f7d28e17f72")
        );
        assert_eq!(
            lines.next(),
            Some("dir/abc.txt,SHA-1,a9993e364706816aba3e25717850c26c9cd0d89d")
        );
        assert_eq!(lines.next(), None);
    }
}
