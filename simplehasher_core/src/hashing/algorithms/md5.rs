//! MD5 digest (RFC 1321)

use super::render_words32;
use crate::hashing::padding::{MD5_PADDING, absorb_block};
use crate::hashing::traits::Digest;

const BLOCK_SIZE: usize = 64;

const INIT: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// `floor(abs(sin(i + 1)) * 2^32)`
const K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Message word consumed by each step
const ACCESS_ORDER: [usize; 64] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, //
    1, 6, 11, 0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, //
    5, 8, 11, 14, 1, 4, 7, 10, 13, 0, 3, 6, 9, 12, 15, 2, //
    0, 7, 14, 5, 12, 3, 10, 1, 8, 15, 6, 13, 4, 11, 2, 9,
];

/// Left-rotation amount of each step
const SHIFTS: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// MD5 chaining state
#[derive(Debug, Clone)]
pub struct Md5 {
    state: [u32; 4],
}

impl Md5 {
    pub fn new() -> Self {
        Self { state: INIT }
    }
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

fn compress(state: &mut [u32; 4], block: &[u8; BLOCK_SIZE]) {
    let mut x = [0u32; 16];
    for (word, bytes) in x.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;

    for step in 0..64 {
        let f = match step / 16 {
            0 => (b & c) | (!b & d),
            1 => (b & d) | (c & !d),
            2 => b ^ c ^ d,
            _ => c ^ (b | !d),
        };

        let rotated = a
            .wrapping_add(f)
            .wrapping_add(K[step])
            .wrapping_add(x[ACCESS_ORDER[step]])
            .rotate_left(SHIFTS[step]);

        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}

impl Digest for Md5 {
    fn reset(&mut self) {
        self.state = INIT;
    }

    fn absorb(&mut self, block: &[u8], total_len: u64) {
        absorb_block::<BLOCK_SIZE>(&MD5_PADDING, block, total_len, |b| {
            compress(&mut self.state, b)
        });
    }

    /// Words are byte-swapped so the joined output reads as the
    /// conventional little-endian byte string.
    fn value(&self) -> String {
        render_words32(&self.state.map(u32::swap_bytes))
    }

    fn name(&self) -> &'static str {
        "MD5"
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(data: &[u8]) -> String {
        let mut md5 = Md5::new();
        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        let mut total = 0u64;
        for chunk in &mut chunks {
            total += BLOCK_SIZE as u64;
            md5.absorb(chunk, total);
        }
        let tail = chunks.remainder();
        md5.absorb(tail, total + tail.len() as u64);
        md5.value().replace(' ', "")
    }

    #[test]
    fn test_rfc1321_vectors() {
        assert_eq!(digest_of(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest_of(b"a"), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(digest_of(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            digest_of(b"message digest"),
            "f96b697d7cb7938d525a2f31aaf161d0"
        );
        assert_eq!(
            digest_of(
                b"12345678901234567890123456789012345678901234567890123456789012345678901234567890"
            ),
            "57edf4a22be3c955ac49da2e2107b67a"
        );
    }

    #[test]
    fn test_value_is_word_grouped() {
        let mut md5 = Md5::new();
        md5.absorb(b"", 0);
        assert_eq!(md5.value(), "d41d8cd9 8f00b204 e9800998 ecf8427e");
    }
}
