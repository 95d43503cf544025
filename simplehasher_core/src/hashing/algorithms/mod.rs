//! Digest algorithm implementations

pub(crate) mod md5;
pub(crate) mod sha1;
pub(crate) mod sha256;
pub(crate) mod sha512;
pub(crate) mod tiger;

pub use md5::Md5;
pub use sha1::Sha1;
pub use sha256::{SHA224, SHA256, Sha256Engine, Sha256Variant};
pub use sha512::{SHA384, SHA512, Sha512Engine, Sha512Variant};
pub use tiger::Tiger;

/// Render 32-bit words as 8-digit hex groups separated by spaces
pub(crate) fn render_words32(words: &[u32]) -> String {
    words
        .iter()
        .map(|w| format!("{w:08x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render 64-bit words as 16-digit hex groups separated by spaces
pub(crate) fn render_words64(words: &[u64]) -> String {
    words
        .iter()
        .map(|w| format!("{w:016x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
