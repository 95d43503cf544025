//! Arbitrary-chunk streaming on top of the block-level [`Digest`] contract

use super::traits::{Digest, StreamingHasher};

/// Buffers partial blocks so callers can feed data in any chunk size.
///
/// The final short (possibly empty) block is always absorbed by
/// [`StreamingHasher::finalize`], so inputs that end on a block boundary still
/// get their length-only padding block.
pub struct BlockStream {
    digest: Box<dyn Digest>,
    buffer: Vec<u8>,
    total_len: u64,
}

impl BlockStream {
    pub fn new(digest: Box<dyn Digest>) -> Self {
        let block_size = digest.block_size();
        Self {
            digest,
            buffer: Vec::with_capacity(block_size),
            total_len: 0,
        }
    }

    /// Bytes accepted so far
    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    fn absorb_full(&mut self, block: &[u8]) {
        self.total_len += block.len() as u64;
        self.digest.absorb(block, self.total_len);
    }
}

impl StreamingHasher for BlockStream {
    fn update(&mut self, mut data: &[u8]) {
        let block_size = self.digest.block_size();

        if !self.buffer.is_empty() {
            let wanted = block_size - self.buffer.len();
            let take = wanted.min(data.len());
            self.buffer.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.buffer.len() < block_size {
                return;
            }
            self.total_len += block_size as u64;
            self.digest.absorb(&self.buffer, self.total_len);
            self.buffer.clear();
        }

        let mut blocks = data.chunks_exact(block_size);
        for block in &mut blocks {
            self.absorb_full(block);
        }
        self.buffer.extend_from_slice(blocks.remainder());
    }

    fn finalize(mut self: Box<Self>) -> String {
        self.total_len += self.buffer.len() as u64;
        self.digest.absorb(&self.buffer, self.total_len);
        self.digest.value()
    }
}
