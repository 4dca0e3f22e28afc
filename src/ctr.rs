//! Counter mode over an opaque block-cipher permutation.
//!
//! [`CtrMode`] turns any fixed-block permutation into a [`BlockSource`]
//! satisfying the same streaming contract as the ChaCha20 permutation:
//! block *i* is the encryption of a counter block derived from (nonce,
//! *i*), so the XOR engine is shared unchanged and only the
//! block-filling function differs.
//!
//! The block cipher itself is a consumed capability, not reimplemented
//! here; [`Aes128Block`] adapts the `aes` crate to it.

use aes::cipher::{BlockEncrypt, KeyInit};

use crate::error::CipherError;
use crate::keystream::{block_counter, BlockSource};

/// Block length in bytes of the counter-mode permutation (128-bit blocks).
pub(crate) const CTR_BLOCK_LEN: usize = 16;

/// Nonce length in bytes; the remaining 4 bytes of the counter block
/// carry the big-endian 32-bit counter.
pub(crate) const CTR_NONCE_LEN: usize = 12;

/// An opaque 128-bit block permutation.
///
/// The single operation a counter-mode stream needs from a block cipher.
/// Implementations must be deterministic; key handling stays behind the
/// capability.
pub trait BlockCipher {
    /// Encrypts one 16-byte block under the cipher's key.
    fn encrypt_block(&self, block: [u8; CTR_BLOCK_LEN]) -> [u8; CTR_BLOCK_LEN];
}

/// Counter mode over a [`BlockCipher`].
///
/// The counter block for index *i* is the 12-byte nonce followed by *i*
/// as a big-endian 32-bit word. Within the 32-bit counter range this is
/// the NIST SP 800-38A incrementing-counter construction restricted to a
/// fixed nonce prefix.
pub struct CtrMode<C> {
    cipher: C,
    nonce: [u8; CTR_NONCE_LEN],
}

impl<C: BlockCipher> CtrMode<C> {
    /// Wraps `cipher` in counter mode under `nonce`.
    ///
    /// # Parameters
    /// - `cipher`: the block permutation capability.
    /// - `nonce`: exactly 12 bytes, unique per key (see the crate-level
    ///   nonce discussion).
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidNonceLength`] for any other nonce
    /// length; the nonce is never truncated or padded.
    pub fn new(cipher: C, nonce: &[u8]) -> Result<Self, CipherError> {
        let nonce: [u8; CTR_NONCE_LEN] =
            nonce
                .try_into()
                .map_err(|_| CipherError::InvalidNonceLength {
                    expected: CTR_NONCE_LEN,
                    actual: nonce.len(),
                })?;
        Ok(CtrMode { cipher, nonce })
    }

    /// Builds the counter block for `counter`: nonce ‖ counter (BE).
    fn counter_block(&self, counter: u32) -> [u8; CTR_BLOCK_LEN] {
        let mut block = [0u8; CTR_BLOCK_LEN];
        block[..CTR_NONCE_LEN].copy_from_slice(&self.nonce);
        block[CTR_NONCE_LEN..].copy_from_slice(&counter.to_be_bytes());
        block
    }
}

impl<C: BlockCipher> BlockSource<16> for CtrMode<C> {
    /// Keystream block at `index`: the encrypted counter block.
    fn block(&self, index: u64) -> Result<[u8; 16], CipherError> {
        let counter = block_counter(index)?;
        Ok(self.cipher.encrypt_block(self.counter_block(counter)))
    }
}

/// AES-128 block permutation backed by the `aes` crate.
pub struct Aes128Block {
    inner: aes::Aes128,
}

impl Aes128Block {
    /// Key length in bytes (128-bit key).
    pub const KEY_LEN: usize = 16;

    /// Builds the permutation from raw key bytes.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKeyLength`] unless `key` is exactly
    /// 16 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; Self::KEY_LEN] =
            key.try_into().map_err(|_| CipherError::InvalidKeyLength {
                expected: Self::KEY_LEN,
                actual: key.len(),
            })?;
        Ok(Aes128Block {
            inner: aes::Aes128::new(&key.into()),
        })
    }
}

impl BlockCipher for Aes128Block {
    fn encrypt_block(&self, block: [u8; CTR_BLOCK_LEN]) -> [u8; CTR_BLOCK_LEN] {
        let mut block = aes::Block::from(block);
        self.inner.encrypt_block(&mut block);
        block.into()
    }
}
