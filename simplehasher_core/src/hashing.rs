//! Digest calculation
//!
//! Every algorithm implements the block-level [`Digest`] contract; the
//! [`HashAlgorithm`] enum is the identifier used everywhere else (requests,
//! results, checksum files) and acts as the factory for digest instances.

use crate::progress::{NullProvider, ProgressProvider};
use crate::scheduler::task::{ComputationTask, ProviderObserver, TaskOutcome};
use crate::{
    Error, Result,
    error::{InternalError, ValidationError},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub mod algorithms;
pub(crate) mod padding;
mod stream;
pub mod traits;

pub use stream::BlockStream;
pub use traits::{Digest, StreamingHasher};

use algorithms::{Md5, Sha1, Sha256Engine, Sha512Engine, Tiger};

/// Hash algorithms supported by the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[serde(rename = "MD5")]
    MD5,
    /// SHA-1 (160-bit)
    #[serde(rename = "SHA-1")]
    SHA1,
    /// SHA-224 (224-bit, truncated SHA-256)
    #[serde(rename = "SHA-224")]
    SHA224,
    /// SHA-256 (256-bit)
    #[serde(rename = "SHA-256")]
    SHA256,
    /// SHA-384 (384-bit, truncated SHA-512)
    #[serde(rename = "SHA-384")]
    SHA384,
    /// SHA-512 (512-bit)
    #[serde(rename = "SHA-512")]
    SHA512,
    /// Tiger (192-bit)
    #[serde(rename = "Tiger")]
    Tiger,
}

impl HashAlgorithm {
    /// Every supported algorithm, in display order
    pub const ALL: [HashAlgorithm; 7] = [
        HashAlgorithm::MD5,
        HashAlgorithm::SHA1,
        HashAlgorithm::SHA224,
        HashAlgorithm::SHA256,
        HashAlgorithm::SHA384,
        HashAlgorithm::SHA512,
        HashAlgorithm::Tiger,
    ];

    /// Stable identifier, identical to [`Digest::name`]
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::MD5 => "MD5",
            HashAlgorithm::SHA1 => "SHA-1",
            HashAlgorithm::SHA224 => "SHA-224",
            HashAlgorithm::SHA256 => "SHA-256",
            HashAlgorithm::SHA384 => "SHA-384",
            HashAlgorithm::SHA512 => "SHA-512",
            HashAlgorithm::Tiger => "Tiger",
        }
    }

    /// Create a fresh digest instance
    pub fn create_digest(&self) -> Box<dyn Digest> {
        match self {
            HashAlgorithm::MD5 => Box::new(Md5::new()),
            HashAlgorithm::SHA1 => Box::new(Sha1::new()),
            HashAlgorithm::SHA224 => Box::new(Sha256Engine::sha224()),
            HashAlgorithm::SHA256 => Box::new(Sha256Engine::sha256()),
            HashAlgorithm::SHA384 => Box::new(Sha512Engine::sha384()),
            HashAlgorithm::SHA512 => Box::new(Sha512Engine::sha512()),
            HashAlgorithm::Tiger => Box::new(Tiger::new()),
        }
    }

    /// Create a streaming hasher accepting arbitrary chunk sizes
    pub fn create_hasher(&self) -> Box<dyn StreamingHasher> {
        Box::new(BlockStream::new(self.create_digest()))
    }

    /// Native block size in bytes
    pub fn block_size(&self) -> usize {
        match self {
            HashAlgorithm::SHA384 | HashAlgorithm::SHA512 => 128,
            _ => 64,
        }
    }

    /// Digest length in hexadecimal characters, whitespace excluded
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::MD5 => 32,
            HashAlgorithm::SHA1 => 40,
            HashAlgorithm::SHA224 => 56,
            HashAlgorithm::SHA256 => 64,
            HashAlgorithm::SHA384 => 96,
            HashAlgorithm::SHA512 => 128,
            HashAlgorithm::Tiger => 48,
        }
    }

    /// Name of the checksum file holding this algorithm's digests,
    /// e.g. `SHA256SUMS.txt`
    pub fn sums_file_name(&self) -> String {
        format!("{}SUMS.txt", self.name().replace('-', "").to_uppercase())
    }

    /// Hash an in-memory buffer and return the rendered digest
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        let mut hasher = self.create_hasher();
        hasher.update(data);
        hasher.finalize()
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = Error;

    /// Case-insensitive; the hyphen in `SHA-xxx` is optional
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().replace('-', "").to_lowercase();
        match normalized.as_str() {
            "md5" => Ok(HashAlgorithm::MD5),
            "sha1" => Ok(HashAlgorithm::SHA1),
            "sha224" => Ok(HashAlgorithm::SHA224),
            "sha256" => Ok(HashAlgorithm::SHA256),
            "sha384" => Ok(HashAlgorithm::SHA384),
            "sha512" => Ok(HashAlgorithm::SHA512),
            "tiger" => Ok(HashAlgorithm::Tiger),
            _ => Err(Error::Validation(ValidationError::unknown_algorithm(s))),
        }
    }
}

/// Result of hash calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashResult {
    pub algorithm: HashAlgorithm,
    pub hash: String,
    pub input_size: u64,
    pub duration: Duration,
}

/// Single-digest convenience API over the same block pipeline the scheduler
/// uses
#[derive(Debug, Clone)]
pub struct HashCalculator {
    read_buffer_size: usize,
}

impl HashCalculator {
    /// Create a new hash calculator with the default read buffer
    pub fn new() -> Self {
        Self::with_read_buffer(crate::DEFAULT_READ_BUFFER_SIZE)
    }

    /// Create a calculator reading files in chunks of about `read_buffer_size`
    /// bytes (rounded down to whole blocks)
    pub fn with_read_buffer(read_buffer_size: usize) -> Self {
        Self { read_buffer_size }
    }

    /// Calculate hash for byte data
    pub fn calculate_bytes(&self, algorithm: HashAlgorithm, data: &[u8]) -> HashResult {
        let start_time = Instant::now();
        let hash = algorithm.hash_bytes(data);

        HashResult {
            algorithm,
            hash,
            input_size: data.len() as u64,
            duration: start_time.elapsed(),
        }
    }

    /// Calculate hash for a file, streaming it block by block
    pub async fn calculate_file(
        &self,
        file_path: &Path,
        algorithm: HashAlgorithm,
    ) -> Result<HashResult> {
        self.calculate_file_with_progress(file_path, algorithm, Arc::new(NullProvider))
            .await
    }

    /// Calculate hash for a file, reporting `TaskProgress` updates
    pub async fn calculate_file_with_progress(
        &self,
        file_path: &Path,
        algorithm: HashAlgorithm,
        progress_provider: Arc<dyn ProgressProvider>,
    ) -> Result<HashResult> {
        let start_time = Instant::now();
        let mut task = ComputationTask::new(file_path.to_path_buf(), algorithm);
        let read_buffer_size = self.read_buffer_size;

        let outcome = tokio::task::spawn_blocking(move || {
            let observer = ProviderObserver::new(progress_provider);
            task.run(read_buffer_size, &CancellationToken::new(), &observer)
        })
        .await
        .map_err(|e| {
            Error::Internal(InternalError::worker_failed(
                format!("{algorithm} of {}", file_path.display()),
                e.to_string(),
            ))
        })?;

        match outcome {
            TaskOutcome::Done { digest, bytes } => Ok(HashResult {
                algorithm,
                hash: digest,
                input_size: bytes,
                duration: start_time.elapsed(),
            }),
            TaskOutcome::Failed(error) => Err(error),
            TaskOutcome::Cancelled => Err(Error::Internal(InternalError::assertion(
                "uncancellable task reported cancellation",
            ))),
        }
    }
}

impl Default for HashCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    const EMPTY_VECTORS: [(HashAlgorithm, &str); 7] = [
        (HashAlgorithm::MD5, "d41d8cd98f00b204e9800998ecf8427e"),
        (HashAlgorithm::SHA1, "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
        (
            HashAlgorithm::SHA224,
            "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f",
        ),
        (
            HashAlgorithm::SHA256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ),
        (
            HashAlgorithm::SHA384,
            "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b",
        ),
        (
            HashAlgorithm::SHA512,
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
        ),
        (
            HashAlgorithm::Tiger,
            "24f0130c63ac933216166e76b1bb925ff373de2d49584e7a",
        ),
    ];

    fn compact(value: &str) -> String {
        value.split_whitespace().collect()
    }

    /// Absorb `data` as full blocks followed by one final short block
    fn absorb_all(digest: &mut dyn Digest, data: &[u8]) {
        let block_size = digest.block_size();
        let mut total = 0u64;
        let mut chunks = data.chunks_exact(block_size);
        for chunk in &mut chunks {
            total += chunk.len() as u64;
            digest.absorb(chunk, total);
        }
        let tail = chunks.remainder();
        digest.absorb(tail, total + tail.len() as u64);
    }

    #[test]
    fn test_empty_input_vectors() {
        for (algorithm, expected) in EMPTY_VECTORS {
            let mut digest = algorithm.create_digest();
            digest.absorb(&[], 0);
            assert_eq!(compact(&digest.value()), expected, "{algorithm} empty vector");
            assert_eq!(compact(&algorithm.hash_bytes(b"")), expected);
        }
    }

    #[test]
    fn test_fox_vectors() {
        let fox = b"The quick brown fox jumps over the lazy dog";
        let cases = [
            (HashAlgorithm::MD5, "9e107d9d372bb6826bd81d3542a419d6"),
            (HashAlgorithm::SHA1, "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"),
            (
                HashAlgorithm::SHA256,
                "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
            ),
            (
                HashAlgorithm::Tiger,
                "f044e6721ea4126d624cb4f7e2f0b61775b0c5d2d56df085",
            ),
        ];
        for (algorithm, expected) in cases {
            assert_eq!(compact(&algorithm.hash_bytes(fox)), expected);
        }
    }

    #[test]
    fn test_digest_names_match_enum() {
        for algorithm in HashAlgorithm::ALL {
            let digest = algorithm.create_digest();
            assert_eq!(digest.name(), algorithm.name());
            assert_eq!(digest.block_size(), algorithm.block_size());
        }
    }

    #[test]
    fn test_rendered_length_matches_hex_len() {
        for algorithm in HashAlgorithm::ALL {
            assert_eq!(
                compact(&algorithm.hash_bytes(b"abc")).len(),
                algorithm.hex_len(),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn test_word_widths() {
        let word_len = |a: HashAlgorithm| {
            a.hash_bytes(b"x")
                .split(' ')
                .map(str::len)
                .collect::<Vec<_>>()
        };
        assert_eq!(word_len(HashAlgorithm::SHA1), vec![8; 5]);
        assert_eq!(word_len(HashAlgorithm::SHA224), vec![8; 7]);
        assert_eq!(word_len(HashAlgorithm::SHA384), vec![16; 6]);
        assert_eq!(word_len(HashAlgorithm::Tiger), vec![16; 3]);
    }

    #[test]
    fn test_reset_matches_fresh_instance() {
        let data = b"reset must restore the initial chaining variables";
        for algorithm in HashAlgorithm::ALL {
            let mut reused = algorithm.create_digest();
            absorb_all(reused.as_mut(), b"some unrelated earlier input of moderate size");
            reused.reset();
            reused.reset();
            absorb_all(reused.as_mut(), data);

            let mut fresh = algorithm.create_digest();
            absorb_all(fresh.as_mut(), data);

            assert_eq!(reused.value(), fresh.value(), "{algorithm}");
        }
    }

    #[test]
    fn test_block_multiple_requires_empty_final_absorb() {
        let data = vec![0x5au8; 128];
        for algorithm in HashAlgorithm::ALL {
            let mut digest = algorithm.create_digest();
            absorb_all(digest.as_mut(), &data);
            assert_eq!(digest.value(), algorithm.hash_bytes(&data));
        }
    }

    #[test]
    fn test_display_and_from_str() {
        for algorithm in HashAlgorithm::ALL {
            let parsed = HashAlgorithm::from_str(&algorithm.to_string()).unwrap();
            assert_eq!(parsed, algorithm);
        }
        assert_eq!(HashAlgorithm::from_str("sha256").unwrap(), HashAlgorithm::SHA256);
        assert_eq!(HashAlgorithm::from_str("Sha-512").unwrap(), HashAlgorithm::SHA512);
        assert_eq!(HashAlgorithm::from_str("TIGER").unwrap(), HashAlgorithm::Tiger);
        assert!(HashAlgorithm::from_str("crc32").is_err());
    }

    #[test]
    fn test_sums_file_names() {
        assert_eq!(HashAlgorithm::MD5.sums_file_name(), "MD5SUMS.txt");
        assert_eq!(HashAlgorithm::SHA1.sums_file_name(), "SHA1SUMS.txt");
        assert_eq!(HashAlgorithm::SHA384.sums_file_name(), "SHA384SUMS.txt");
        assert_eq!(HashAlgorithm::Tiger.sums_file_name(), "TIGERSUMS.txt");
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&HashAlgorithm::SHA224).unwrap();
        assert_eq!(json, "\"SHA-224\"");
        let back: HashAlgorithm = serde_json::from_str("\"Tiger\"").unwrap();
        assert_eq!(back, HashAlgorithm::Tiger);
    }

    #[test]
    fn test_calculate_bytes() {
        let calculator = HashCalculator::new();
        let result = calculator.calculate_bytes(HashAlgorithm::MD5, b"abc");
        assert_eq!(compact(&result.hash), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(result.algorithm, HashAlgorithm::MD5);
        assert_eq!(result.input_size, 3);
    }

    #[tokio::test]
    async fn test_calculate_file_matches_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pattern.bin");
        let data: Vec<u8> = (0..1000u32).map(|i| ((i * 7 + 3) & 0xff) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        // Small buffer so the file spans many reads
        let calculator = HashCalculator::with_read_buffer(200);
        let result = calculator
            .calculate_file(&path, HashAlgorithm::SHA256)
            .await
            .unwrap();

        assert_eq!(
            compact(&result.hash),
            "1e9bc38cbf860b9ec31918b065f9b52476c549a782e0e7990bed8ce3868d2371"
        );
        assert_eq!(result.input_size, 1000);

        let tiger = calculator
            .calculate_file(&path, HashAlgorithm::Tiger)
            .await
            .unwrap();
        assert_eq!(tiger.hash, "4af1fb97ef16b575 d31266a83d160152 eb33afdf536793f5");
    }

    #[tokio::test]
    async fn test_calculate_file_missing() {
        let calculator = HashCalculator::new();
        let error = calculator
            .calculate_file(Path::new("/definitely/not/here.bin"), HashAlgorithm::MD5)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }

    proptest! {
        #[test]
        fn prop_streaming_equivalence(
            data in proptest::collection::vec(any::<u8>(), 0..600),
            cuts in proptest::collection::vec(0usize..600, 0..8),
        ) {
            let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(data.len())).collect();
            cuts.sort_unstable();

            for algorithm in HashAlgorithm::ALL {
                let mut whole = algorithm.create_digest();
                absorb_all(whole.as_mut(), &data);

                let mut hasher = algorithm.create_hasher();
                let mut start = 0;
                for &cut in &cuts {
                    hasher.update(&data[start..cut]);
                    start = cut;
                }
                hasher.update(&data[start..]);

                prop_assert_eq!(hasher.finalize(), whole.value());
            }
        }
    }
}
