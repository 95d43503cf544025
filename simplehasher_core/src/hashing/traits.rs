//! Core traits shared by every digest algorithm

/// Block-level digest contract implemented by every algorithm.
///
/// A digest consumes its input one native block at a time. Passing a block
/// shorter than [`Digest::block_size`] finalizes the computation: the tail is
/// padded, the total length is appended, and after that only
/// [`Digest::value`] and [`Digest::reset`] are meaningful.
pub trait Digest: Send {
    /// Restore the algorithm's initial chaining state
    fn reset(&mut self);

    /// Absorb one block.
    ///
    /// `total_len` is the number of message bytes absorbed so far, this block
    /// included. A full block is compressed directly; a shorter (possibly
    /// empty) block is treated as the final chunk.
    ///
    /// # Panics
    ///
    /// Panics if `block` is longer than the algorithm's block size.
    fn absorb(&mut self, block: &[u8], total_len: u64);

    /// Render the chaining state as space separated hexadecimal words
    fn value(&self) -> String;

    /// Stable algorithm identifier, e.g. `SHA-256`
    fn name(&self) -> &'static str;

    /// Native block size in bytes (64 or 128)
    fn block_size(&self) -> usize;
}

/// Trait for streaming hash calculation
pub trait StreamingHasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash calculation and return the result
    fn finalize(self: Box<Self>) -> String;
}
