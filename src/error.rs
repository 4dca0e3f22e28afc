//! Error types for the ctrcipher library.

use thiserror::Error;

/// Errors produced by the ctrcipher library.
///
/// Every error is returned to the immediate caller; the engine never
/// retries and never silently truncates, pads, or wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Key length does not match the cipher's fixed key size.
    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes.
        expected: usize,
        /// Length of the key that was supplied.
        actual: usize,
    },
    /// Nonce length does not match the cipher's fixed nonce size.
    #[error("Invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength {
        /// Required nonce length in bytes.
        expected: usize,
        /// Length of the nonce that was supplied.
        actual: usize,
    },
    /// Block index exceeds the 32-bit counter space.
    ///
    /// Fatal to the session: the same (key, nonce) pair must not produce
    /// any further keystream. A fresh session with a fresh nonce is
    /// required to continue.
    #[error("Counter overflow: block index {0} exceeds the 32-bit counter space")]
    CounterOverflow(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_key_length() {
        let err = CipherError::InvalidKeyLength {
            expected: 32,
            actual: 16,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid key length: expected 32 bytes, got 16"
        );
    }

    #[test]
    fn test_display_invalid_nonce_length() {
        let err = CipherError::InvalidNonceLength {
            expected: 12,
            actual: 0,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid nonce length: expected 12 bytes, got 0"
        );
    }

    #[test]
    fn test_display_counter_overflow() {
        let err = CipherError::CounterOverflow(1 << 32);
        assert_eq!(
            format!("{}", err),
            "Counter overflow: block index 4294967296 exceeds the 32-bit counter space"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            CipherError::CounterOverflow(42),
            CipherError::CounterOverflow(42)
        );
        assert_ne!(
            CipherError::CounterOverflow(42),
            CipherError::CounterOverflow(43)
        );
        assert_ne!(
            CipherError::InvalidKeyLength {
                expected: 32,
                actual: 31,
            },
            CipherError::InvalidNonceLength {
                expected: 32,
                actual: 31,
            }
        );
    }

    #[test]
    fn test_error_clone() {
        let err = CipherError::InvalidNonceLength {
            expected: 12,
            actual: 8,
        };
        assert_eq!(err, err.clone());
    }
}
