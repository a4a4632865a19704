// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Message authentication codes
//!
//! The HMAC-SHA-2 family. AES-CMAC identifiers are recognised but not
//! implemented in software and fail closed.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use sp_common::MacAlgorithm;

use crate::error::{CryptoError, CryptoResult};

/// Compute a MAC into `out`, returning the tag length
///
/// # Errors
///
/// Returns `CryptoError::InvalidLength` if `out` is shorter than the tag,
/// or `CryptoError::UnsupportedAlgorithm` for AES-CMAC.
pub fn compute(algorithm: MacAlgorithm, key: &[u8], data: &[u8], out: &mut [u8]) -> CryptoResult<usize> {
    let len = algorithm.tag_len();
    let dst = out.get_mut(..len).ok_or(CryptoError::InvalidLength)?;
    match algorithm {
        MacAlgorithm::HmacSha256 => {
            let mut m = Hmac::<Sha256>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            dst.copy_from_slice(&m.finalize().into_bytes());
        }
        MacAlgorithm::HmacSha384 => {
            let mut m = Hmac::<Sha384>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            dst.copy_from_slice(&m.finalize().into_bytes());
        }
        MacAlgorithm::HmacSha512 => {
            let mut m = Hmac::<Sha512>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            dst.copy_from_slice(&m.finalize().into_bytes());
        }
        MacAlgorithm::AesCmac => return Err(CryptoError::UnsupportedAlgorithm),
    }
    Ok(len)
}

/// Verify `tag` over `data` in constant time
///
/// `tag` may be a larger fixed-size field; only the leading tag-length bytes
/// are compared.
///
/// # Errors
///
/// Returns `CryptoError::AuthenticationFailed` on mismatch.
pub fn verify(algorithm: MacAlgorithm, key: &[u8], data: &[u8], tag: &[u8]) -> CryptoResult<()> {
    let expected = tag
        .get(..algorithm.tag_len())
        .ok_or(CryptoError::InvalidLength)?;
    let fail = |_| CryptoError::AuthenticationFailed;
    match algorithm {
        MacAlgorithm::HmacSha256 => {
            let mut m = Hmac::<Sha256>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            m.verify_slice(expected).map_err(fail)
        }
        MacAlgorithm::HmacSha384 => {
            let mut m = Hmac::<Sha384>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            m.verify_slice(expected).map_err(fail)
        }
        MacAlgorithm::HmacSha512 => {
            let mut m = Hmac::<Sha512>::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
            m.update(data);
            m.verify_slice(expected).map_err(fail)
        }
        MacAlgorithm::AesCmac => Err(CryptoError::UnsupportedAlgorithm),
    }
}
