//! Tiger S-box generation
//!
//! The four 256-entry S-boxes are bootstrapped from an identity-like table
//! by repeatedly hashing a fixed seed through the table under construction,
//! then permuting byte columns according to the resulting state.

use super::{INIT, compress};
use once_cell::sync::Lazy;

pub(crate) const TABLE_SIZE: usize = 1024;

/// Number of generation passes used by the reference algorithm
pub(crate) const PASSES: usize = 5;

pub(crate) const SEED: &[u8; 64] = b"Tiger - A Fast New Hash Function, by Ross Anderson and Eli Biham";

static TABLE: Lazy<Box<[u64; TABLE_SIZE]>> = Lazy::new(|| {
    log::debug!("Generating Tiger S-boxes ({PASSES} passes)");
    generate(SEED, PASSES)
});

/// Process-wide S-boxes, generated on first use
pub(crate) fn shared() -> &'static [u64; TABLE_SIZE] {
    &TABLE
}

/// Swap byte column `col` between entries `i` and `j`
fn swap_column(table: &mut [u64; TABLE_SIZE], i: usize, j: usize, col: usize) {
    let mask = 0xffu64 << (8 * col);
    let bi = table[i] & mask;
    let bj = table[j] & mask;
    table[i] = (table[i] & !mask) | bj;
    table[j] = (table[j] & !mask) | bi;
}

/// Derive a table from `seed`. Deterministic in `(seed, passes)`.
pub(crate) fn generate(seed: &[u8; 64], passes: usize) -> Box<[u64; TABLE_SIZE]> {
    let mut table = Box::new([0u64; TABLE_SIZE]);
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (i as u64 & 0xff) * 0x0101_0101_0101_0101;
    }

    let mut state = INIT;
    let mut abc = 2;

    for _ in 0..passes {
        for i in 0..256 {
            for sbox in (0..TABLE_SIZE).step_by(256) {
                abc += 1;
                if abc == 3 {
                    abc = 0;
                    compress(&table, &mut state, seed);
                }
                for col in 0..8 {
                    let j = super::byte(state[abc], col);
                    swap_column(&mut table, sbox + i, sbox + j, col);
                }
            }
        }
    }

    table
}
