// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Crypto engine contract
//!
//! The boot core consumes cryptography only through [`CryptoEngine`]. On
//! silicon the engine is the security coprocessor, which keeps derived keys
//! inside its own asset store and hands out opaque [`KeyHandle`]s. Host
//! builds use the software engine in `soft`.
//!
//! # Design Principles
//!
//! 1. **Opaque keys**: derived key material never crosses this interface
//! 2. **Shared access**: every method takes `&self`, so scope guards holding
//!    the engine can release resources on any exit path
//! 3. **Fail closed**: unsupported algorithms return errors, never success

use sp_common::{EcCurve, HashAlgorithm, MacAlgorithm};

use crate::error::CryptoResult;
use crate::hash::Digest;

/// Opaque reference to a key held by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(u32);

impl KeyHandle {
    /// Wrap an engine-specific key id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Engine-specific key id
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Parent of a key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Device root secret provisioned in the trust anchor
    DeviceRoot,
    /// A previously derived key-derivation key
    Derived(KeyHandle),
}

/// Single purpose a derived key may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    /// Key-derivation key
    Kdk,
    /// Message authentication with the given algorithm
    Mac(MacAlgorithm),
    /// AES decryption
    Encryption,
}

impl KeyUsage {
    /// Domain separation tag mixed into derivation
    #[must_use]
    pub const fn tag(self) -> u32 {
        match self {
            Self::Kdk => 0x4B44_4B00,
            Self::Mac(alg) => 0x4D41_4300 | alg.as_u32(),
            Self::Encryption => 0x454E_4300,
        }
    }

    /// Length of the derived key in bytes
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Kdk | Self::Encryption => 32,
            Self::Mac(alg) => alg.key_len(),
        }
    }
}

/// Borrowed view of a public key
#[derive(Debug, Clone, Copy)]
pub enum PublicKeyRef<'a> {
    /// EC point with big-endian affine coordinates
    Ec {
        /// Curve
        curve: EcCurve,
        /// X coordinate
        x: &'a [u8],
        /// Y coordinate
        y: &'a [u8],
    },
    /// RSA modulus and public exponent, big-endian
    Rsa {
        /// Modulus
        modulus: &'a [u8],
        /// Public exponent
        exponent: &'a [u8],
    },
}

/// Borrowed view of a signature
#[derive(Debug, Clone, Copy)]
pub enum SignatureRef<'a> {
    /// ECDSA scalars, big-endian
    Ec {
        /// r scalar
        r: &'a [u8],
        /// s scalar
        s: &'a [u8],
    },
    /// RSA signature, big-endian
    Rsa {
        /// Signature bytes
        signature: &'a [u8],
    },
}

/// Incremental hash in progress
pub trait HashContext {
    /// Absorb `data`
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the update.
    fn update(&mut self, data: &[u8]) -> CryptoResult<()>;

    /// Finish and return the digest
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to finalize.
    fn finalize(self) -> CryptoResult<Digest>;

    /// Abandon the hash and release engine resources
    fn abort(self);
}

/// AES decryption in progress
pub trait DecryptContext {
    /// Decrypt `data` in place, continuing the keystream
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the update.
    fn update(&mut self, data: &mut [u8]) -> CryptoResult<()>;

    /// Finish decryption and release engine resources
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to finalize.
    fn finalize(self) -> CryptoResult<()>;
}

/// Crypto primitives consumed by the boot core
pub trait CryptoEngine {
    /// Hash context type
    type Hash: HashContext;
    /// Decrypt context type
    type Decrypt: DecryptContext;

    /// Start a hash
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot allocate a context.
    fn hash_init(&self, algorithm: HashAlgorithm) -> CryptoResult<Self::Hash>;

    /// Start AES decryption with an encryption key
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a live encryption key.
    fn aes_decrypt_init(&self, key: KeyHandle, iv: &[u8; 16]) -> CryptoResult<Self::Decrypt>;

    /// Derive a single-purpose key from `source` and a domain-separation label
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not a live KDK or derivation fails.
    fn derive_key(&self, source: KeySource, usage: KeyUsage, label: &[u8]) -> CryptoResult<KeyHandle>;

    /// Destroy a derived key
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not live or the engine fails to erase it.
    fn delete_key(&self, key: KeyHandle) -> CryptoResult<()>;

    /// Verify a MAC over `data`
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::AuthenticationFailed` on mismatch.
    fn mac_verify(&self, algorithm: MacAlgorithm, key: KeyHandle, data: &[u8], tag: &[u8]) -> CryptoResult<()>;

    /// Verify a signature over `message` hashed with `hash`
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidSignature` on mismatch, or an error for
    /// malformed keys and unsupported schemes.
    fn verify_signature(
        &self,
        key: PublicKeyRef<'_>,
        hash: HashAlgorithm,
        signature: SignatureRef<'_>,
        message: &[u8],
    ) -> CryptoResult<()>;

    /// Compare two byte strings in constant time
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        constant_time_eq(a, b)
    }
}

/// Constant-time comparison for security-critical operations
///
/// Slices of different length compare unequal.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}
