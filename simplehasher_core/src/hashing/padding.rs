//! Merkle–Damgård style finalization shared by all algorithms

/// Byte order of the trailing length field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LengthOrder {
    BigEndian,
    LittleEndian,
}

/// Padding convention of one algorithm family
#[derive(Debug, Clone, Copy)]
pub(crate) struct Padding {
    delimiter: u8,
    order: LengthOrder,
}

/// MD5: `0x80` delimiter, little-endian bit length
pub(crate) const MD5_PADDING: Padding = Padding {
    delimiter: 0x80,
    order: LengthOrder::LittleEndian,
};

/// SHA family: `0x80` delimiter, big-endian bit length
pub(crate) const SHA_PADDING: Padding = Padding {
    delimiter: 0x80,
    order: LengthOrder::BigEndian,
};

/// Tiger: `0x01` delimiter, little-endian bit length
pub(crate) const TIGER_PADDING: Padding = Padding {
    delimiter: 0x01,
    order: LengthOrder::LittleEndian,
};

impl Padding {
    /// Width of the length field: 16 bytes for 128-byte blocks, 8 otherwise
    const fn length_field<const N: usize>() -> usize {
        if N >= 128 { 16 } else { 8 }
    }

    /// Pad the final chunk and hand the resulting one or two blocks to
    /// `compress`.
    pub(crate) fn finish<const N: usize>(
        &self,
        tail: &[u8],
        total_len: u64,
        mut compress: impl FnMut(&[u8; N]),
    ) {
        debug_assert!(tail.len() < N);

        let mut block = [0u8; N];
        block[..tail.len()].copy_from_slice(tail);
        block[tail.len()] = self.delimiter;

        if tail.len() >= N - Self::length_field::<N>() {
            compress(&block);
            block = [0u8; N];
        }

        self.write_length(&mut block, total_len);
        compress(&block);
    }

    fn write_length<const N: usize>(&self, block: &mut [u8; N], total_len: u64) {
        let bits = u128::from(total_len) * 8;
        let low = bits as u64;
        match self.order {
            LengthOrder::LittleEndian => {
                block[N - 8..].copy_from_slice(&low.to_le_bytes());
            }
            LengthOrder::BigEndian => {
                block[N - 8..].copy_from_slice(&low.to_be_bytes());
                if Self::length_field::<N>() == 16 {
                    let high = (bits >> 64) as u64;
                    block[N - 16..N - 8].copy_from_slice(&high.to_be_bytes());
                }
            }
        }
    }
}

/// Shared `absorb` dispatch: compress a full block directly, finalize
/// anything shorter.
///
/// # Panics
///
/// Panics if `block` exceeds `N` bytes.
pub(crate) fn absorb_block<const N: usize>(
    padding: &Padding,
    block: &[u8],
    total_len: u64,
    mut compress: impl FnMut(&[u8; N]),
) {
    assert!(
        block.len() <= N,
        "absorb called with {} bytes, block size is {N}",
        block.len()
    );

    match <&[u8; N]>::try_from(block) {
        Ok(full) => compress(full),
        Err(_) => padding.finish::<N>(block, total_len, compress),
    }
}
