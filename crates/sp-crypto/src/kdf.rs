// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Key derivation
//!
//! HKDF-SHA-256 with the parent key as input keying material. The info
//! string is the caller's domain-separation label followed by the key usage
//! tag, so a label reused for two purposes still yields unrelated keys.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::traits::KeyUsage;

/// Maximum label length accepted by [`derive`]
pub const MAX_LABEL_LEN: usize = 64;

/// Derive `out.len()` bytes for `usage` from `parent` and `label`
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivationFailed` if the label is too long or
/// the output exceeds what HKDF-SHA-256 can produce.
pub fn derive(parent: &[u8], usage: KeyUsage, label: &[u8], out: &mut [u8]) -> CryptoResult<()> {
    if label.len() > MAX_LABEL_LEN {
        return Err(CryptoError::KeyDerivationFailed);
    }
    let mut info = [0u8; MAX_LABEL_LEN + 4];
    info[..label.len()].copy_from_slice(label);
    info[label.len()..label.len() + 4].copy_from_slice(&usage.tag().to_le_bytes());

    Hkdf::<Sha256>::new(None, parent)
        .expand(&info[..label.len() + 4], out)
        .map_err(|_| CryptoError::KeyDerivationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_common::MacAlgorithm;

    #[test]
    fn test_usage_separates_keys() {
        let root = [7u8; 32];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        derive(&root, KeyUsage::Kdk, b"label", &mut a).unwrap();
        derive(&root, KeyUsage::Encryption, b"label", &mut b).unwrap();
        assert_ne!(a, b);
        derive(&root, KeyUsage::Mac(MacAlgorithm::HmacSha256), b"label", &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let mut a = [0u8; 48];
        let mut b = [0u8; 48];
        derive(b"parent", KeyUsage::Kdk, b"SP_BL2", &mut a).unwrap();
        derive(b"parent", KeyUsage::Kdk, b"SP_BL2", &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_long_label() {
        let mut out = [0u8; 32];
        let label = [b'a'; MAX_LABEL_LEN + 1];
        assert_eq!(
            derive(b"k", KeyUsage::Kdk, &label, &mut out),
            Err(CryptoError::KeyDerivationFailed)
        );
    }
}
