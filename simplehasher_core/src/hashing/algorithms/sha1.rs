//! SHA-1 digest (FIPS 180-4)

use super::render_words32;
use crate::hashing::padding::{SHA_PADDING, absorb_block};
use crate::hashing::traits::Digest;

const BLOCK_SIZE: usize = 64;

const INIT: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

const K: [u32; 4] = [0x5a827999, 0x6ed9eba1, 0x8f1bbcdc, 0xca62c1d6];

/// SHA-1 chaining state
#[derive(Debug, Clone)]
pub struct Sha1 {
    state: [u32; 5],
}

impl Sha1 {
    pub fn new() -> Self {
        Self { state: INIT }
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

fn compress(state: &mut [u32; 5], block: &[u8; BLOCK_SIZE]) {
    let mut w = [0u32; 80];
    for (word, bytes) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for t in 16..80 {
        w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;

    for (t, &word) in w.iter().enumerate() {
        let (f, k) = match t / 20 {
            0 => ((b & c) | (!b & d), K[0]),
            1 => (b ^ c ^ d, K[1]),
            2 => ((b & c) | (b & d) | (c & d), K[2]),
            _ => (b ^ c ^ d, K[3]),
        };

        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e]) {
        *s = s.wrapping_add(v);
    }
}

impl Digest for Sha1 {
    fn reset(&mut self) {
        self.state = INIT;
    }

    fn absorb(&mut self, block: &[u8], total_len: u64) {
        absorb_block::<BLOCK_SIZE>(&SHA_PADDING, block, total_len, |b| {
            compress(&mut self.state, b)
        });
    }

    fn value(&self) -> String {
        render_words32(&self.state)
    }

    fn name(&self) -> &'static str {
        "SHA-1"
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abc_single_block() {
        let mut sha1 = Sha1::new();
        sha1.absorb(b"abc", 3);
        assert_eq!(
            sha1.value(),
            "a9993e36 4706816a ba3e2571 7850c26c 9cd0d89d"
        );
    }

    #[test]
    fn test_two_block_message() {
        // 56 bytes: padding spills into a second block
        let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        let mut sha1 = Sha1::new();
        sha1.absorb(msg, msg.len() as u64);
        assert_eq!(
            sha1.value().replace(' ', ""),
            "84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
    }
}
