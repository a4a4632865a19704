// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cryptographic error types
//!
//! This module defines error types for the crypto engine contract.

use core::fmt;

/// Error type for cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key format or size
    InvalidKey,
    /// Signature verification failed
    InvalidSignature,
    /// Algorithm not supported by this engine
    UnsupportedAlgorithm,
    /// MAC verification failed
    AuthenticationFailed,
    /// Key derivation failed
    KeyDerivationFailed,
    /// No free key slot
    KeySlotsExhausted,
    /// Key handle does not name a live key
    InvalidKeyHandle,
    /// Key used for a purpose it was not derived for
    KeyUsageMismatch,
    /// Input or output length invalid for the operation
    InvalidLength,
    /// Internal error (should not occur)
    InternalError,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0C01,
            Self::InvalidSignature => 0x0C02,
            Self::UnsupportedAlgorithm => 0x0C03,
            Self::AuthenticationFailed => 0x0C04,
            Self::KeyDerivationFailed => 0x0C05,
            Self::KeySlotsExhausted => 0x0C06,
            Self::InvalidKeyHandle => 0x0C07,
            Self::KeyUsageMismatch => 0x0C08,
            Self::InvalidLength => 0x0C09,
            Self::InternalError => 0x0CFF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidKey => "invalid key",
            Self::InvalidSignature => "invalid signature",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::AuthenticationFailed => "authentication failed",
            Self::KeyDerivationFailed => "key derivation failed",
            Self::KeySlotsExhausted => "key slots exhausted",
            Self::InvalidKeyHandle => "invalid key handle",
            Self::KeyUsageMismatch => "key usage mismatch",
            Self::InvalidLength => "invalid length",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CryptoError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<CryptoError> for sp_common::Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::AuthenticationFailed => Self::MacMismatch,
            CryptoError::KeyDerivationFailed
            | CryptoError::KeySlotsExhausted
            | CryptoError::KeyUsageMismatch => Self::KeyDerivationFailed,
            // Signature callers map to the certificate or image variant themselves
            CryptoError::InvalidKey
            | CryptoError::InvalidSignature
            | CryptoError::UnsupportedAlgorithm
            | CryptoError::InvalidKeyHandle
            | CryptoError::InvalidLength
            | CryptoError::InternalError => Self::CryptoEngineFailure,
        }
    }
}

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
