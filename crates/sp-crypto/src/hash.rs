// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! SHA-2 hashing
//!
//! One incremental hasher covering the three digest sizes the image format
//! allows, plus a one-shot helper.

use sha2::{Digest as _, Sha256, Sha384, Sha512};
use sp_common::constants::MAX_DIGEST_SIZE;
use sp_common::HashAlgorithm;

use crate::traits::constant_time_eq;

/// Hash output of up to [`MAX_DIGEST_SIZE`] bytes
#[derive(Clone, Copy)]
pub struct Digest {
    bytes: [u8; MAX_DIGEST_SIZE],
    len: usize,
}

impl Digest {
    /// Copy a digest from `bytes`
    ///
    /// Returns `None` if `bytes` is longer than [`MAX_DIGEST_SIZE`].
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_DIGEST_SIZE {
            return None;
        }
        let mut out = [0u8; MAX_DIGEST_SIZE];
        out[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            bytes: out,
            len: bytes.len(),
        })
    }

    /// Digest bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Digest length in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false for a finalized digest
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Compare against an expected value in constant time
    #[must_use]
    pub fn matches(&self, expected: &[u8]) -> bool {
        constant_time_eq(self.as_bytes(), expected)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for Digest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Digest(")?;
        for byte in self.as_bytes().iter().take(8) {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...)")
    }
}

/// Incremental SHA-2 hasher
#[derive(Clone)]
pub enum Hasher {
    /// SHA-256 state
    Sha256(Sha256),
    /// SHA-384 state
    Sha384(Sha384),
    /// SHA-512 state
    Sha512(Sha512),
}

impl Hasher {
    /// Start a new hash
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    /// Algorithm of this hasher
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha256(_) => HashAlgorithm::Sha256,
            Self::Sha384(_) => HashAlgorithm::Sha384,
            Self::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    /// Absorb `data`
    pub fn absorb(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Finish and return the digest
    #[must_use]
    pub fn finish(self) -> Digest {
        let mut bytes = [0u8; MAX_DIGEST_SIZE];
        let len = match self {
            Self::Sha256(h) => {
                bytes[..32].copy_from_slice(&h.finalize());
                32
            }
            Self::Sha384(h) => {
                bytes[..48].copy_from_slice(&h.finalize());
                48
            }
            Self::Sha512(h) => {
                bytes[..64].copy_from_slice(&h.finalize());
                64
            }
        };
        Digest { bytes, len }
    }
}

/// Hash `data` in one shot
#[must_use]
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Digest {
    let mut hasher = Hasher::new(algorithm);
    hasher.absorb(data);
    hasher.finish()
}
