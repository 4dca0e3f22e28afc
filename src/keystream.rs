//! Keystream generation and the streaming XOR engine.
//!
//! A [`BlockSource`] turns a block index into one fixed-size keystream
//! block. On top of that capability this module builds the counter-block
//! sequencer (index validation against the 32-bit counter space), the
//! lazy seekable [`Keystream`] generator, and the single XOR path shared
//! by every cipher variant: encryption and decryption are the same
//! operation, and only the block-filling function differs between
//! ChaCha20 and counter mode over a block cipher.

use rayon::prelude::*;

use crate::error::CipherError;

/// Block count above which the XOR engine fans blocks out across the
/// rayon pool instead of walking them serially.
const PAR_BLOCKS_THRESHOLD: usize = 256;

/// A keyed permutation that fills one keystream block per block index.
///
/// Implementations must be pure: for a fixed source, `block(i)` returns
/// bit-identical output on every call, and computing block *i* must not
/// depend on whether blocks `0..i` were ever produced. Those two
/// properties are what make seeking and parallel block computation
/// well-defined.
///
/// `BLOCK_LEN` is the keystream block size in bytes: 64 for ChaCha20,
/// 16 for counter mode over a 128-bit block cipher.
pub trait BlockSource<const BLOCK_LEN: usize> {
    /// Computes the keystream block at `index`.
    ///
    /// # Errors
    /// Returns [`CipherError::CounterOverflow`] if `index` does not fit
    /// the 32-bit counter word.
    fn block(&self, index: u64) -> Result<[u8; BLOCK_LEN], CipherError>;
}

/// Builds the 32-bit counter word for block `index`.
///
/// Indices past `u32::MAX` are out of counter range and fatal to the
/// session; the counter is never wrapped or truncated.
///
/// # Errors
/// Returns [`CipherError::CounterOverflow`] if `index > u32::MAX`.
pub(crate) fn block_counter(index: u64) -> Result<u32, CipherError> {
    u32::try_from(index).map_err(|_| CipherError::CounterOverflow(index))
}

/// Lazy sequence of keystream blocks over a [`BlockSource`].
///
/// Tracks the next block index as a `u64` so that the out-of-range
/// condition is representable. The sequence is bounded only by the
/// counter limit: once the position passes `u32::MAX` every further
/// block request fails, and since the position only grows the
/// exhaustion is terminal.
///
/// Because each block is a pure function of its index, [`seek`](Self::seek)
/// reproduces bit-identical output to sequential generation from 0.
pub struct Keystream<S, const BLOCK_LEN: usize> {
    source: S,
    position: u64,
}

impl<S: BlockSource<BLOCK_LEN>, const BLOCK_LEN: usize> Keystream<S, BLOCK_LEN> {
    /// Creates a keystream positioned at block 0.
    pub fn new(source: S) -> Self {
        Keystream {
            source,
            position: 0,
        }
    }

    /// Returns the next block index to be produced.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Repositions the keystream at `block_index`.
    ///
    /// Seeking does not validate the index; an out-of-range position
    /// surfaces as [`CipherError::CounterOverflow`] on the next block
    /// request.
    pub fn seek(&mut self, block_index: u64) {
        self.position = block_index;
    }

    /// Produces the block at the current position and advances by one.
    ///
    /// # Errors
    /// Returns [`CipherError::CounterOverflow`] once the position has
    /// passed the 32-bit counter space. The position is not advanced on
    /// failure.
    pub fn next_block(&mut self) -> Result<[u8; BLOCK_LEN], CipherError> {
        let block = self.source.block(self.position)?;
        self.position += 1;
        Ok(block)
    }

    /// Borrows the underlying block source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: BlockSource<BLOCK_LEN>, const BLOCK_LEN: usize> Iterator for Keystream<S, BLOCK_LEN> {
    type Item = [u8; BLOCK_LEN];

    /// Yields keystream blocks until the counter limit; the sequence
    /// ends (returns `None`) at block index `u32::MAX + 1`.
    fn next(&mut self) -> Option<[u8; BLOCK_LEN]> {
        self.next_block().ok()
    }
}

/// XORs `keystream` into `buf`, stopping at the shorter of the two.
///
/// The truncated final chunk of a stream uses only the first
/// `buf.len()` bytes of its keystream block; the rest is discarded.
fn xor_into(buf: &mut [u8], keystream: &[u8]) {
    for (b, k) in buf.iter_mut().zip(keystream) {
        *b ^= *k;
    }
}

/// The streaming XOR engine: transforms `buf` in place against the
/// keystream starting at the stream's current block position.
///
/// Partitions `buf` into `ceil(len / BLOCK_LEN)` chunks, XORs chunk *i*
/// against keystream block `position + i`, and advances the position by
/// the number of chunks consumed. Output placement always follows block
/// index: chunk *i* lands at byte offset `i * BLOCK_LEN`, independent of
/// computation order. Above [`PAR_BLOCKS_THRESHOLD`] blocks the chunks
/// are computed on the rayon pool; serial and parallel paths are
/// bit-identical.
///
/// The whole block range is validated against the counter limit before
/// any byte is written, so a failing call leaves `buf` untouched and the
/// position unchanged. Empty input consumes no blocks.
///
/// # Errors
/// Returns [`CipherError::CounterOverflow`] if any block of the range
/// would exceed the 32-bit counter space.
pub(crate) fn xor_stream<S, const BLOCK_LEN: usize>(
    keystream: &mut Keystream<S, BLOCK_LEN>,
    buf: &mut [u8],
) -> Result<(), CipherError>
where
    S: BlockSource<BLOCK_LEN> + Sync,
{
    if buf.is_empty() {
        return Ok(());
    }

    let blocks = buf.len().div_ceil(BLOCK_LEN) as u64;
    let start = keystream.position;
    let last = start
        .checked_add(blocks - 1)
        .ok_or(CipherError::CounterOverflow(u64::MAX))?;
    block_counter(last)?;

    let source = &keystream.source;
    if blocks as usize > PAR_BLOCKS_THRESHOLD {
        buf.par_chunks_mut(BLOCK_LEN)
            .enumerate()
            .try_for_each(|(i, chunk)| {
                let block = source.block(start + i as u64)?;
                xor_into(chunk, &block);
                Ok(())
            })?;
    } else {
        for (i, chunk) in buf.chunks_mut(BLOCK_LEN).enumerate() {
            let block = source.block(start + i as u64)?;
            xor_into(chunk, &block);
        }
    }

    keystream.position = start + blocks;
    Ok(())
}
