//! Session: the (key, nonce, counter) binding behind `encrypt`/`decrypt`.
//!
//! A [`Session`] owns a [`Keystream`] — the block source plus the next
//! block index — and drives the streaming XOR engine over it. One
//! session covers one logical encrypt-or-decrypt stream; every
//! independent message under the same key needs a fresh nonce and a
//! fresh session.

use rand::random;

use crate::chacha20::ChaCha20;
use crate::ctr::{Aes128Block, BlockCipher, CtrMode};
use crate::error::CipherError;
use crate::keystream::{xor_stream, BlockSource, Keystream};

/// A ChaCha20 session (64-byte keystream blocks).
pub type ChaCha20Session = Session<ChaCha20, 64>;

/// An AES-128 counter-mode session (16-byte keystream blocks).
pub type Aes128CtrSession = Session<CtrMode<Aes128Block>, 16>;

/// Stream-cipher session: a block source bound to a monotonically
/// advancing block counter.
///
/// # Lifecycle
///
/// `Created → Streaming → Exhausted | Closed`. A session starts at block
/// 0, advances its counter as [`encrypt`](Self::encrypt) /
/// [`decrypt`](Self::decrypt) consume blocks, and is dropped when the
/// stream ends (`Closed`). If the counter would pass `u32::MAX` the call
/// fails with [`CipherError::CounterOverflow`] and the session is
/// `Exhausted`: the position only grows, so every later call fails the
/// same way, and a fresh session (fresh nonce) is required to continue.
///
/// Successive calls on one session continue the keystream where the
/// previous call stopped — the counter is never rewound implicitly. To
/// decrypt, supply a session at the same starting counter that
/// encrypted the data (a new session, or [`seek`](Self::seek)).
///
/// # Nonce uniqueness
///
/// A (key, nonce) pair must never key two different messages. The
/// keystream depends only on (key, nonce, counter), so two messages
/// encrypted under the same pair share keystream bytes, and the XOR of
/// the two ciphertexts equals the XOR of the two plaintexts — the
/// keystream cancels out entirely. The engine cannot detect reuse; the
/// caller owns this invariant.
///
/// # Concurrency
///
/// A session is exclusively owned: the streaming methods take
/// `&mut self`, so a single caller advances the counter and no locking
/// is needed. Internally, large buffers are split across a thread pool —
/// each worker computes blocks for a disjoint, pre-claimed index range
/// and writes at the offset its block index dictates, never at
/// completion order.
pub struct Session<S, const BLOCK_LEN: usize> {
    keystream: Keystream<S, BLOCK_LEN>,
}

impl ChaCha20Session {
    /// Creates a ChaCha20 session starting at block 0.
    ///
    /// # Parameters
    /// - `key`: exactly 32 bytes.
    /// - `nonce`: exactly 12 bytes, unique per key.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKeyLength`] or
    /// [`CipherError::InvalidNonceLength`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrcipher::Session;
    ///
    /// let key = [7u8; 32];
    /// let nonce = [1u8; 12];
    ///
    /// let mut encryptor = Session::chacha20(&key, &nonce).unwrap();
    /// let ciphertext = encryptor.encrypt(b"attack at dawn").unwrap();
    /// assert_ne!(&ciphertext, b"attack at dawn");
    ///
    /// let mut decryptor = Session::chacha20(&key, &nonce).unwrap();
    /// assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"attack at dawn");
    /// ```
    ///
    /// ```
    /// use ctrcipher::Session;
    ///
    /// assert!(Session::chacha20(&[0u8; 31], &[0u8; 12]).is_err());
    /// ```
    pub fn chacha20(key: &[u8], nonce: &[u8]) -> Result<Self, CipherError> {
        Ok(Session {
            keystream: Keystream::new(ChaCha20::new(key, nonce)?),
        })
    }
}

impl<C: BlockCipher> Session<CtrMode<C>, 16> {
    /// Creates a counter-mode session over any block-cipher permutation,
    /// starting at block 0.
    ///
    /// # Parameters
    /// - `cipher`: the block permutation capability.
    /// - `nonce`: exactly 12 bytes, unique per key.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidNonceLength`].
    pub fn counter_mode(cipher: C, nonce: &[u8]) -> Result<Self, CipherError> {
        Ok(Session {
            keystream: Keystream::new(CtrMode::new(cipher, nonce)?),
        })
    }
}

impl Aes128CtrSession {
    /// Creates an AES-128 counter-mode session starting at block 0.
    ///
    /// # Parameters
    /// - `key`: exactly 16 bytes.
    /// - `nonce`: exactly 12 bytes, unique per key.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidKeyLength`] or
    /// [`CipherError::InvalidNonceLength`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrcipher::Session;
    ///
    /// let mut encryptor = Session::aes128_ctr(&[9u8; 16], &[4u8; 12]).unwrap();
    /// let ciphertext = encryptor.encrypt(b"same contract").unwrap();
    ///
    /// let mut decryptor = Session::aes128_ctr(&[9u8; 16], &[4u8; 12]).unwrap();
    /// assert_eq!(decryptor.decrypt(&ciphertext).unwrap(), b"same contract");
    /// ```
    pub fn aes128_ctr(key: &[u8], nonce: &[u8]) -> Result<Self, CipherError> {
        Self::counter_mode(Aes128Block::new(key)?, nonce)
    }
}

impl<S, const BLOCK_LEN: usize> Session<S, BLOCK_LEN>
where
    S: BlockSource<BLOCK_LEN> + Sync,
{
    /// Encrypts `plaintext`, advancing the session counter by the number
    /// of blocks consumed.
    ///
    /// Output length always equals input length; no padding is
    /// introduced. Empty input yields empty output and consumes no
    /// blocks.
    ///
    /// # Errors
    /// Returns [`CipherError::CounterOverflow`] if the input would drive
    /// the counter past `u32::MAX`. The session state and the returned
    /// buffer are untouched on failure.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = plaintext.to_vec();
        self.apply_keystream(&mut out)?;
        Ok(out)
    }

    /// Decrypts `ciphertext`: the identical XOR operation as
    /// [`encrypt`](Self::encrypt).
    ///
    /// The session must be at the same starting counter the encrypting
    /// session used for these bytes.
    ///
    /// # Errors
    /// As for [`encrypt`](Self::encrypt).
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.encrypt(ciphertext)
    }

    /// XORs the keystream into `buf` in place — the allocation-free core
    /// of [`encrypt`](Self::encrypt) / [`decrypt`](Self::decrypt).
    ///
    /// # Errors
    /// As for [`encrypt`](Self::encrypt); `buf` is untouched on failure.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<(), CipherError> {
        xor_stream(&mut self.keystream, buf)
    }

    /// Repositions the session at `block_index`.
    ///
    /// Each block is a pure function of its index, so seeking reproduces
    /// bit-identical keystream to sequential generation — this is what
    /// makes random access and decrypt-from-a-known-counter work.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrcipher::Session;
    ///
    /// let key = [7u8; 32];
    /// let nonce = [1u8; 12];
    /// let mut session = Session::chacha20(&key, &nonce).unwrap();
    /// let full = session.encrypt(&[0u8; 128]).unwrap();
    ///
    /// // Re-derive the second block directly.
    /// session.seek(1);
    /// assert_eq!(session.encrypt(&[0u8; 64]).unwrap(), &full[64..]);
    /// ```
    pub fn seek(&mut self, block_index: u64) {
        self.keystream.seek(block_index);
    }

    /// Returns the next block index this session will consume.
    pub fn position(&self) -> u64 {
        self.keystream.position()
    }
}

/// Generates a fresh random 32-byte key from the OS-seeded CSPRNG.
pub fn generate_key() -> [u8; 32] {
    random()
}

/// Generates a fresh random 12-byte nonce from the OS-seeded CSPRNG.
///
/// Randomness makes accidental nonce reuse under one key vanishingly
/// unlikely; the uniqueness contract still belongs to the caller.
pub fn generate_nonce() -> [u8; 12] {
    random()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_continues_across_calls() {
        let key = [1u8; 32];
        let nonce = [2u8; 12];

        let mut whole = Session::chacha20(&key, &nonce).unwrap();
        let expected = whole.encrypt(&[0u8; 200]).unwrap();

        let mut split = Session::chacha20(&key, &nonce).unwrap();
        let mut got = split.encrypt(&[0u8; 80]).unwrap();
        got.extend(split.encrypt(&[0u8; 120]).unwrap());
        assert_eq!(got, expected);
    }

    #[test]
    fn test_partial_final_block_advances_whole_block() {
        let mut session = Session::chacha20(&[1u8; 32], &[2u8; 12]).unwrap();
        session.encrypt(&[0u8; 65]).unwrap();
        assert_eq!(session.position(), 2);
    }

    #[test]
    fn test_empty_input_does_not_advance() {
        let mut session = Session::chacha20(&[1u8; 32], &[2u8; 12]).unwrap();
        assert_eq!(session.encrypt(&[]).unwrap(), Vec::<u8>::new());
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_exhausted_session_stays_exhausted() {
        let mut session = Session::chacha20(&[1u8; 32], &[2u8; 12]).unwrap();
        session.seek(u32::MAX as u64);
        let err = session.encrypt(&[0u8; 128]).unwrap_err();
        assert_eq!(err, CipherError::CounterOverflow(u32::MAX as u64 + 1));
        // Still refused after the failed call.
        assert!(session.encrypt(&[0u8; 128]).is_err());
    }

    #[test]
    fn test_last_block_is_usable() {
        let mut session = Session::chacha20(&[1u8; 32], &[2u8; 12]).unwrap();
        session.seek(u32::MAX as u64);
        assert_eq!(session.encrypt(&[0u8; 64]).unwrap().len(), 64);
        assert!(session.encrypt(&[0u8; 1]).is_err());
    }

    #[test]
    fn test_generated_material_lengths() {
        assert_eq!(generate_key().len(), 32);
        assert_eq!(generate_nonce().len(), 12);
    }

    #[test]
    fn test_generated_nonces_differ() {
        // 96 bits of OS randomness; a collision here means the RNG is wired wrong.
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
