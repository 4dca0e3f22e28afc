//! ctrcipher: counter-mode stream-cipher engine.
//!
//! Turns a fixed-size keyed permutation into an unbounded keystream and
//! XORs that keystream against arbitrary-length data. Two constructions
//! share one architecture: a from-scratch ChaCha20 (RFC 7539) ARX
//! permutation, and generic counter mode over an opaque block-cipher
//! permutation (AES-128 via the `aes` crate). Encryption and decryption
//! are the same XOR operation.
//!
//! # Architecture
//!
//! ```text
//! ChaCha20 / CtrMode<BlockCipher>   (permutation — fills one keystream block
//!     ↓ BlockSource                  from (key, nonce, block index))
//! Keystream                         (lazy, seekable block sequence; validates
//!     ↓                              indices against the 32-bit counter space)
//! Session                           (counter ownership + streaming XOR engine;
//!                                    encrypt == decrypt)
//! ```
//!
//! Block *i* of a stream depends only on (key, nonce, *i*), which makes
//! seeking well-defined and block computation embarrassingly parallel;
//! large buffers are transparently fanned out across a thread pool with
//! placement by block index.
//!
//! # Nonce uniqueness
//!
//! A (key, nonce) pair must never be used for two messages: the XOR of
//! two ciphertexts sharing a keystream is the XOR of the two plaintexts.
//! See [`Session`] for the full contract. This crate provides raw
//! keystream encryption only — no authentication tag; ciphertexts are
//! malleable by design and need an external integrity layer if tampering
//! matters.
//!
//! # Examples
//!
//! Encrypt and decrypt with ChaCha20:
//!
//! ```
//! use ctrcipher::{generate_key, generate_nonce, Session};
//!
//! let key = generate_key();
//! let nonce = generate_nonce();
//!
//! let mut encryptor = Session::chacha20(&key, &nonce).unwrap();
//! let ciphertext = encryptor.encrypt(b"counter mode, one block at a time").unwrap();
//! assert_eq!(ciphertext.len(), 33);
//!
//! let mut decryptor = Session::chacha20(&key, &nonce).unwrap();
//! assert_eq!(
//!     decryptor.decrypt(&ciphertext).unwrap(),
//!     b"counter mode, one block at a time"
//! );
//! ```
//!
//! The same streaming contract over a block cipher:
//!
//! ```
//! use ctrcipher::Session;
//!
//! let mut session = Session::aes128_ctr(&[0u8; 16], &[0u8; 12]).unwrap();
//! let ciphertext = session.encrypt(b"no padding, same length out").unwrap();
//! assert_eq!(ciphertext.len(), 27);
//! ```

#![deny(clippy::all)]

pub mod error;

mod chacha20;
mod ctr;
mod keystream;
mod session;

pub use chacha20::{keystream_block, ChaCha20};
pub use ctr::{Aes128Block, BlockCipher, CtrMode};
pub use keystream::{BlockSource, Keystream};
pub use session::{
    generate_key, generate_nonce, Aes128CtrSession, ChaCha20Session, Session,
};
