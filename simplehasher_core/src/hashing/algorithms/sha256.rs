//! 32-bit SHA-2 engine shared by SHA-224 and SHA-256

use super::render_words32;
use crate::hashing::padding::{SHA_PADDING, absorb_block};
use crate::hashing::traits::Digest;

const BLOCK_SIZE: usize = 64;

const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Constant set selecting SHA-224 or SHA-256
#[derive(Debug)]
pub struct Sha256Variant {
    pub name: &'static str,
    pub init: [u32; 8],
    /// Number of state words rendered by `value()`
    pub output_words: usize,
}

pub static SHA224: Sha256Variant = Sha256Variant {
    name: "SHA-224",
    init: [
        0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939, 0xffc00b31, 0x68581511, 0x64f98fa7,
        0xbefa4fa4,
    ],
    output_words: 7,
};

pub static SHA256: Sha256Variant = Sha256Variant {
    name: "SHA-256",
    init: [
        0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab,
        0x5be0cd19,
    ],
    output_words: 8,
};

/// SHA-224/256 compression engine parameterized by its constant set
#[derive(Debug, Clone)]
pub struct Sha256Engine {
    variant: &'static Sha256Variant,
    state: [u32; 8],
}

impl Sha256Engine {
    pub fn new(variant: &'static Sha256Variant) -> Self {
        Self {
            variant,
            state: variant.init,
        }
    }

    pub fn sha224() -> Self {
        Self::new(&SHA224)
    }

    pub fn sha256() -> Self {
        Self::new(&SHA256)
    }
}

fn compress(state: &mut [u32; 8], block: &[u8; BLOCK_SIZE]) {
    let mut w = [0u32; 64];
    for (word, bytes) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for t in 16..64 {
        let s0 = w[t - 15].rotate_right(7) ^ w[t - 15].rotate_right(18) ^ (w[t - 15] >> 3);
        let s1 = w[t - 2].rotate_right(17) ^ w[t - 2].rotate_right(19) ^ (w[t - 2] >> 10);
        w[t] = w[t - 16]
            .wrapping_add(s0)
            .wrapping_add(w[t - 7])
            .wrapping_add(s1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..64 {
        let sigma1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let ch = (e & f) ^ (!e & g);
        let t1 = h
            .wrapping_add(sigma1)
            .wrapping_add(ch)
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let sigma0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let maj = (a & b) ^ (a & c) ^ (b & c);
        let t2 = sigma0.wrapping_add(maj);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
}

impl Digest for Sha256Engine {
    fn reset(&mut self) {
        self.state = self.variant.init;
    }

    fn absorb(&mut self, block: &[u8], total_len: u64) {
        absorb_block::<BLOCK_SIZE>(&SHA_PADDING, block, total_len, |b| {
            compress(&mut self.state, b)
        });
    }

    fn value(&self) -> String {
        render_words32(&self.state[..self.variant.output_words])
    }

    fn name(&self) -> &'static str {
        self.variant.name
    }

    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha224_truncates_to_seven_words() {
        let mut sha = Sha256Engine::sha224();
        sha.absorb(b"abc", 3);
        let value = sha.value();
        assert_eq!(value.split(' ').count(), 7);
        assert_eq!(
            value.replace(' ', ""),
            "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"
        );
    }

    #[test]
    fn test_sha256_abc() {
        let mut sha = Sha256Engine::sha256();
        sha.absorb(b"abc", 3);
        assert_eq!(
            sha.value(),
            "ba7816bf 8f01cfea 414140de 5dae2223 b00361a3 96177a9c b410ff61 f20015ad"
        );
    }

    #[test]
    fn test_variants_share_engine_but_not_state() {
        let a = Sha256Engine::sha224();
        let b = Sha256Engine::sha256();
        assert_ne!(a.state, b.state);
        assert_eq!(a.block_size(), b.block_size());
    }
}
