//! Tiger digest (Anderson & Biham, 1996)
//!
//! 192-bit state, 64-byte blocks, three passes of S-box rounds with a key
//! schedule between them. The S-boxes are not hard-coded: they are derived
//! once per process by [`table::shared`].

pub(crate) mod table;

use super::render_words64;
use crate::hashing::padding::{TIGER_PADDING, absorb_block};
use crate::hashing::traits::Digest;
use table::TABLE_SIZE;

const BLOCK_SIZE: usize = 64;

pub(crate) const INIT: [u64; 3] = [0x0123456789abcdef, 0xfedcba9876543210, 0xf096a5b4c3b2e187];

/// Tiger chaining state plus a reference to the process-wide S-boxes
#[derive(Clone)]
pub struct Tiger {
    table: &'static [u64; TABLE_SIZE],
    state: [u64; 3],
}

impl std::fmt::Debug for Tiger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tiger").field("state", &self.state).finish()
    }
}

impl Tiger {
    pub fn new() -> Self {
        Self {
            table: table::shared(),
            state: INIT,
        }
    }
}

impl Default for Tiger {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn byte(x: u64, index: usize) -> usize {
    ((x >> (8 * index)) & 0xff) as usize
}

fn key_schedule(x: &mut [u64; 8]) {
    x[0] = x[0].wrapping_sub(x[7] ^ 0xa5a5a5a5a5a5a5a5);
    x[1] ^= x[0];
    x[2] = x[2].wrapping_add(x[1]);
    x[3] = x[3].wrapping_sub(x[2] ^ (!x[1] << 19));
    x[4] ^= x[3];
    x[5] = x[5].wrapping_add(x[4]);
    x[6] = x[6].wrapping_sub(x[5] ^ (!x[4] >> 23));
    x[7] ^= x[6];
    x[0] = x[0].wrapping_add(x[7]);
    x[1] = x[1].wrapping_sub(x[0] ^ (!x[7] << 19));
    x[2] ^= x[1];
    x[3] = x[3].wrapping_add(x[2]);
    x[4] = x[4].wrapping_sub(x[3] ^ (!x[2] >> 23));
    x[5] ^= x[4];
    x[6] = x[6].wrapping_add(x[5]);
    x[7] = x[7].wrapping_sub(x[6] ^ 0x0123456789abcdef);
}

/// One Tiger compression over `block`, using `t` as the four S-boxes
/// (`t[0..256]`, `t[256..512]`, `t[512..768]`, `t[768..1024]`).
pub(crate) fn compress(t: &[u64; TABLE_SIZE], state: &mut [u64; 3], block: &[u8; BLOCK_SIZE]) {
    let mut x = [0u64; 8];
    for (word, bytes) in x.iter_mut().zip(block.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        *word = u64::from_le_bytes(buf);
    }

    let [mut a, mut b, mut c] = *state;

    for (pass, mul) in [5u64, 7, 9].into_iter().enumerate() {
        if pass > 0 {
            key_schedule(&mut x);
        }
        for &word in &x {
            c ^= word;
            a = a.wrapping_sub(
                t[byte(c, 0)] ^ t[256 + byte(c, 2)] ^ t[512 + byte(c, 4)] ^ t[768 + byte(c, 6)],
            );
            b = b.wrapping_add(
                t[768 + byte(c, 1)] ^ t[512 + byte(c, 3)] ^ t[256 + byte(c, 5)] ^ t[byte(c, 7)],
            );
            b = b.wrapping_mul(mul);
            (a, b, c) = (b, c, a);
        }
    }

    // 24 rounds rotate the roles back into place
    *state = [
        a ^ state[0],
        b.wrapping_sub(state[1]),
        c.wrapping_add(state[2]),
    ];
}

impl Digest for Tiger {
    fn reset(&mut self) {
        self.state = INIT;
    }

    fn absorb(&mut self, block: &[u8], total_len: u64) {
        let table = self.table;
        absorb_block::<BLOCK_SIZE>(&TIGER_PADDING, block, total_len, |b| {
            compress(table, &mut self.state, b)
        });
    }

    /// Register words in the byte order published with the reference
    /// test vectors.
    fn value(&self) -> String {
        render_words64(&self.state)
    }

    fn name(&self) -> &'static str {
        "Tiger"
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiger(data: &[u8]) -> String {
        let mut digest = Tiger::new();
        let mut total = 0u64;
        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            total += BLOCK_SIZE as u64;
            digest.absorb(chunk, total);
        }
        let tail = chunks.remainder();
        digest.absorb(tail, total + tail.len() as u64);
        digest.value()
    }

    #[test]
    fn test_reference_vectors() {
        let cases: Vec<(&[u8], &str)> = vec![
            (b"", "24f0130c63ac9332 16166e76b1bb925f f373de2d49584e7a"),
            (b"abc", "f258c1e88414ab2a 527ab541ffc5b8bf 935f7b951c132951"),
            (b"Tiger", "9f00f599072300dd 276abb38c8eb6dec 37790c116f9d2bdf"),
            (
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
                "ee8375a180a6ce8d 5186363c8aa32b50 cca849dcccfb0f89",
            ),
            (
                b"The quick brown fox jumps over the lazy dog",
                "f044e6721ea4126d 624cb4f7e2f0b617 75b0c5d2d56df085",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(tiger(input), expected, "Tiger mismatch for {input:?}");
        }
    }

    #[test]
    fn test_padding_boundaries() {
        assert_eq!(
            tiger(&[b'a'; 55]),
            "fb9bf37f4f5603ec 1af2cd3eabb548a8 e3627a9a5471a31e"
        );
        assert_eq!(
            tiger(&[b'a'; 56]),
            "f70069e991d7fd45 10f8863a92c226ec c9160ce545fb679a"
        );
        assert_eq!(
            tiger(&[b'a'; 64]),
            "ed92eabb13f30375 6843cc3f5d0ca9dc 6eb76f36df577423"
        );
    }
}
