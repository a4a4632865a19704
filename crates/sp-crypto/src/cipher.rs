// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES-256-CTR
//!
//! One keystream runs across the whole image: the secret header info first,
//! then every load region in table order.

use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::{CryptoError, CryptoResult};
use crate::traits::DecryptContext;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// AES key size in bytes
pub const AES_KEY_SIZE: usize = 32;

/// CTR keystream position over an image
pub struct CtrStream {
    inner: Aes256Ctr,
}

impl CtrStream {
    /// Start a keystream at `iv`
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if `key` is not 32 bytes.
    pub fn new(key: &[u8], iv: &[u8; 16]) -> CryptoResult<Self> {
        let inner = Aes256Ctr::new_from_slices(key, iv).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { inner })
    }

    /// XOR the next `data.len()` keystream bytes into `data`
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidLength` if the counter would wrap.
    pub fn apply(&mut self, data: &mut [u8]) -> CryptoResult<()> {
        self.inner
            .try_apply_keystream(data)
            .map_err(|_| CryptoError::InvalidLength)
    }
}

impl DecryptContext for CtrStream {
    fn update(&mut self, data: &mut [u8]) -> CryptoResult<()> {
        self.apply(data)
    }

    fn finalize(self) -> CryptoResult<()> {
        Ok(())
    }
}

/// Encrypt or decrypt consecutive `parts` with one keystream
///
/// # Errors
///
/// See [`CtrStream::new`] and [`CtrStream::apply`].
pub fn apply_keystream(key: &[u8], iv: &[u8; 16], parts: &mut [&mut [u8]]) -> CryptoResult<()> {
    let mut stream = CtrStream::new(key, iv)?;
    for part in parts.iter_mut() {
        stream.apply(part)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stream_matches_whole() {
        let key = [0x42u8; 32];
        let iv = [0x01u8; 16];
        let mut whole = [0u8; 100];
        apply_keystream(&key, &iv, &mut [&mut whole[..]]).unwrap();

        let mut a = [0u8; 37];
        let mut b = [0u8; 63];
        apply_keystream(&key, &iv, &mut [&mut a[..], &mut b[..]]).unwrap();
        assert_eq!(whole[..37], a);
        assert_eq!(whole[37..], b);
    }

    #[test]
    fn test_round_trip() {
        let key = [9u8; 32];
        let iv = [3u8; 16];
        let mut data = *b"load region payload";
        apply_keystream(&key, &iv, &mut [&mut data[..]]).unwrap();
        assert_ne!(&data, b"load region payload");
        let mut ctx = CtrStream::new(&key, &iv).unwrap();
        ctx.update(&mut data).unwrap();
        ctx.finalize().unwrap();
        assert_eq!(&data, b"load region payload");
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(CtrStream::new(&[0u8; 16], &[0u8; 16]).is_err());
    }
}
