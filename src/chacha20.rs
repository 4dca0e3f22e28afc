//! ChaCha20: the ARX (add-rotate-XOR) keystream permutation.
//!
//! Implements the RFC 7539 ChaCha20 block function: a 16-word state
//! assembled from {constant, key, counter, nonce}, mixed by 20 rounds of
//! quarter-round operations, then added to the initial state and
//! serialized little-endian into one 64-byte keystream block. The
//! permutation is built only from wrapping addition, rotation, and XOR;
//! there are no lookup tables and no data-dependent branches.
//!
//! The 16-word state is held as actual `u32` words assembled explicitly
//! from little-endian byte groups, never as a flat byte array indexed as
//! if it held words.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CipherError;
use crate::keystream::{block_counter, BlockSource};

/// The ASCII bytes `"expand 32-byte k"` as four little-endian 32-bit words.
const CONSTANT: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Double rounds applied per block (20 quarter-round rounds total).
const DOUBLE_ROUNDS: usize = 10;

/// ChaCha20 keyed permutation over (key, nonce).
///
/// A pure function of (key, counter, nonce): block *i* is computed from
/// the state `[constant | key | i | nonce]` alone, so blocks can be
/// produced in any order. Key words are zeroized when the value is
/// dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ChaCha20 {
    key: [u32; 8],
    nonce: [u32; 3],
}

impl ChaCha20 {
    /// Key length in bytes (256-bit key).
    pub const KEY_LEN: usize = 32;
    /// Nonce length in bytes (96-bit nonce).
    pub const NONCE_LEN: usize = 12;
    /// Keystream block length in bytes.
    pub const BLOCK_LEN: usize = 64;

    /// Creates the permutation from raw key and nonce bytes.
    ///
    /// # Parameters
    /// - `key`: exactly 32 bytes of secret key material.
    /// - `nonce`: exactly 12 bytes, unique per key (see the crate-level
    ///   nonce discussion).
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKeyLength`] or
    /// [`CipherError::InvalidNonceLength`]; material is never truncated
    /// or padded to fit.
    pub fn new(key: &[u8], nonce: &[u8]) -> Result<Self, CipherError> {
        if key.len() != Self::KEY_LEN {
            return Err(CipherError::InvalidKeyLength {
                expected: Self::KEY_LEN,
                actual: key.len(),
            });
        }
        if nonce.len() != Self::NONCE_LEN {
            return Err(CipherError::InvalidNonceLength {
                expected: Self::NONCE_LEN,
                actual: nonce.len(),
            });
        }
        Ok(ChaCha20 {
            key: words_from_le_bytes(key),
            nonce: words_from_le_bytes(nonce),
        })
    }

    /// Assembles the 16-word initial state for one block.
    ///
    /// Layout: words 0-3 constant, 4-11 key, 12 counter, 13-15 nonce.
    fn initial_state(&self, counter: u32) -> [u32; 16] {
        let c = &CONSTANT;
        let k = &self.key;
        let n = &self.nonce;
        [
            c[0], c[1], c[2], c[3], //
            k[0], k[1], k[2], k[3], //
            k[4], k[5], k[6], k[7], //
            counter, n[0], n[1], n[2], //
        ]
    }
}

impl BlockSource<64> for ChaCha20 {
    /// Computes the 64-byte keystream block at `index`.
    ///
    /// Applies 10 double rounds (column then diagonal quarter-rounds) to
    /// a working copy of the initial state, adds the initial state back
    /// word by word, and serializes each word little-endian.
    fn block(&self, index: u64) -> Result<[u8; 64], CipherError> {
        let counter = block_counter(index)?;
        let initial = self.initial_state(counter);
        let mut state = initial;

        for _ in 0..DOUBLE_ROUNDS {
            // Column rounds
            quarter_round_at(&mut state, 0, 4, 8, 12);
            quarter_round_at(&mut state, 1, 5, 9, 13);
            quarter_round_at(&mut state, 2, 6, 10, 14);
            quarter_round_at(&mut state, 3, 7, 11, 15);
            // Diagonal rounds
            quarter_round_at(&mut state, 0, 5, 10, 15);
            quarter_round_at(&mut state, 1, 6, 11, 12);
            quarter_round_at(&mut state, 2, 7, 8, 13);
            quarter_round_at(&mut state, 3, 4, 9, 14);
        }

        let mut block = [0u8; 64];
        for ((out, word), init) in block.chunks_exact_mut(4).zip(state).zip(initial) {
            out.copy_from_slice(&word.wrapping_add(init).to_le_bytes());
        }
        Ok(block)
    }
}

/// One-shot keystream block: the low-level entry point shared by the
/// streaming engine and parallel callers that claim their own indices.
///
/// Deterministic: fixed (key, nonce, counter) always yields the same 64
/// bytes, and no block depends on any other having been computed.
///
/// # Errors
/// Returns [`CipherError::InvalidKeyLength`] /
/// [`CipherError::InvalidNonceLength`] on bad material and
/// [`CipherError::CounterOverflow`] if `counter > u32::MAX`.
///
/// # Examples
///
/// ```
/// use ctrcipher::keystream_block;
///
/// let block = keystream_block(&[0u8; 32], &[0u8; 12], 0).unwrap();
/// assert_eq!(block.len(), 64);
/// ```
pub fn keystream_block(key: &[u8], nonce: &[u8], counter: u64) -> Result<[u8; 64], CipherError> {
    ChaCha20::new(key, nonce)?.block(counter)
}

/// Packs little-endian byte groups into `W` 32-bit words.
///
/// The caller guarantees `bytes.len() == 4 * W`.
fn words_from_le_bytes<const W: usize>(bytes: &[u8]) -> [u32; W] {
    let mut words = [0u32; W];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
    }
    words
}

/// The ChaCha quarter-round on four words.
///
/// `a += b; d ^= a; d <<<= 16; c += d; b ^= c; b <<<= 12;`
/// `a += b; d ^= a; d <<<= 8;  c += d; b ^= c; b <<<= 7;`
///
/// Additions are modulo 2^32 and rotations are 32-bit circular left
/// rotations; the order and the rotation amounts 16, 12, 8, 7 are fixed.
fn quarter_round(a: &mut u32, b: &mut u32, c: &mut u32, d: &mut u32) {
    *a = a.wrapping_add(*b);
    *d ^= *a;
    *d = d.rotate_left(16);

    *c = c.wrapping_add(*d);
    *b ^= *c;
    *b = b.rotate_left(12);

    *a = a.wrapping_add(*b);
    *d ^= *a;
    *d = d.rotate_left(8);

    *c = c.wrapping_add(*d);
    *b ^= *c;
    *b = b.rotate_left(7);
}

/// Applies the quarter-round to state words `a`, `b`, `c`, `d` in place.
fn quarter_round_at(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    let (mut va, mut vb, mut vc, mut vd) = (state[a], state[b], state[c], state[d]);
    quarter_round(&mut va, &mut vb, &mut vc, &mut vd);
    state[a] = va;
    state[b] = vb;
    state[c] = vc;
    state[d] = vd;
}
