// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Software crypto engine
//!
//! Implements [`CryptoEngine`] with RustCrypto primitives. Derived keys live
//! in a small slot table and are wiped when deleted or when the engine is
//! dropped.

use core::cell::RefCell;

use sp_common::{HashAlgorithm, MacAlgorithm};

use crate::cipher::CtrStream;
use crate::error::{CryptoError, CryptoResult};
use crate::hash::{self, Digest, Hasher};
use crate::kdf;
use crate::mac;
use crate::signature;
use crate::traits::{CryptoEngine, HashContext, KeyHandle, KeySource, KeyUsage, PublicKeyRef, SignatureRef};
use crate::zeroize_utils::SecureBuffer;

/// Number of simultaneously live derived keys
pub const MAX_KEY_SLOTS: usize = 8;

/// Size of the device root secret
pub const ROOT_SECRET_SIZE: usize = 32;

struct KeySlot {
    usage: KeyUsage,
    material: SecureBuffer<64>,
}

/// Software implementation of the crypto engine contract
pub struct SoftCrypto {
    root: SecureBuffer<ROOT_SECRET_SIZE>,
    slots: RefCell<[Option<KeySlot>; MAX_KEY_SLOTS]>,
}

impl SoftCrypto {
    /// Create an engine around the device root secret
    #[must_use]
    pub fn new(root_secret: &[u8; ROOT_SECRET_SIZE]) -> Self {
        const EMPTY: Option<KeySlot> = None;
        Self {
            root: SecureBuffer::from_array(root_secret),
            slots: RefCell::new([EMPTY; MAX_KEY_SLOTS]),
        }
    }

    /// Number of derived keys not yet deleted
    #[must_use]
    pub fn live_keys(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.is_some()).count()
    }

    fn slot_index(key: KeyHandle) -> CryptoResult<usize> {
        let index = key.id() as usize;
        if index < MAX_KEY_SLOTS {
            Ok(index)
        } else {
            Err(CryptoError::InvalidKeyHandle)
        }
    }

    /// Run `f` over the material of a live key with the expected usage
    fn with_key<T>(
        &self,
        key: KeyHandle,
        check: impl Fn(KeyUsage) -> bool,
        f: impl FnOnce(&[u8]) -> CryptoResult<T>,
    ) -> CryptoResult<T> {
        let slots = self.slots.borrow();
        let slot = slots[Self::slot_index(key)?]
            .as_ref()
            .ok_or(CryptoError::InvalidKeyHandle)?;
        if !check(slot.usage) {
            return Err(CryptoError::KeyUsageMismatch);
        }
        f(slot.material.as_slice())
    }
}

impl HashContext for Hasher {
    fn update(&mut self, data: &[u8]) -> CryptoResult<()> {
        self.absorb(data);
        Ok(())
    }

    fn finalize(self) -> CryptoResult<Digest> {
        Ok(self.finish())
    }

    fn abort(self) {}
}

impl CryptoEngine for SoftCrypto {
    type Hash = Hasher;
    type Decrypt = CtrStream;

    fn hash_init(&self, algorithm: HashAlgorithm) -> CryptoResult<Hasher> {
        Ok(Hasher::new(algorithm))
    }

    fn aes_decrypt_init(&self, key: KeyHandle, iv: &[u8; 16]) -> CryptoResult<CtrStream> {
        self.with_key(
            key,
            |usage| usage == KeyUsage::Encryption,
            |material| CtrStream::new(material, iv),
        )
    }

    fn derive_key(&self, source: KeySource, usage: KeyUsage, label: &[u8]) -> CryptoResult<KeyHandle> {
        let mut material =
            SecureBuffer::<64>::zeroed(usage.key_len()).ok_or(CryptoError::KeyDerivationFailed)?;
        match source {
            KeySource::DeviceRoot => {
                kdf::derive(self.root.as_slice(), usage, label, material.as_mut_slice())?;
            }
            KeySource::Derived(parent) => self.with_key(
                parent,
                |u| u == KeyUsage::Kdk,
                |parent| kdf::derive(parent, usage, label, material.as_mut_slice()),
            )?,
        }

        let mut slots = self.slots.borrow_mut();
        let index = slots
            .iter()
            .position(Option::is_none)
            .ok_or(CryptoError::KeySlotsExhausted)?;
        slots[index] = Some(KeySlot { usage, material });
        let id = u32::try_from(index).map_err(|_| CryptoError::InternalError)?;
        Ok(KeyHandle::new(id))
    }

    fn delete_key(&self, key: KeyHandle) -> CryptoResult<()> {
        let mut slots = self.slots.borrow_mut();
        // Dropping the slot wipes its material
        slots[Self::slot_index(key)?]
            .take()
            .map(drop)
            .ok_or(CryptoError::InvalidKeyHandle)
    }

    fn mac_verify(&self, algorithm: MacAlgorithm, key: KeyHandle, data: &[u8], tag: &[u8]) -> CryptoResult<()> {
        self.with_key(
            key,
            |usage| usage == KeyUsage::Mac(algorithm),
            |material| mac::verify(algorithm, material, data, tag),
        )
    }

    fn verify_signature(
        &self,
        key: PublicKeyRef<'_>,
        algorithm: HashAlgorithm,
        sig: SignatureRef<'_>,
        message: &[u8],
    ) -> CryptoResult<()> {
        let digest = hash::digest(algorithm, message);
        signature::verify_prehash(key, sig, digest.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DecryptContext;

    const ROOT: [u8; 32] = [0xA5; 32];

    #[test]
    fn test_derive_and_delete() {
        let engine = SoftCrypto::new(&ROOT);
        let kdk = engine.derive_key(KeySource::DeviceRoot, KeyUsage::Kdk, b"SP_BL2_KDK").unwrap();
        let enc = engine
            .derive_key(KeySource::Derived(kdk), KeyUsage::Encryption, b"SP_BL2_ENC")
            .unwrap();
        assert_eq!(engine.live_keys(), 2);
        assert!(engine.delete_key(enc).is_ok());
        assert!(engine.delete_key(kdk).is_ok());
        assert_eq!(engine.live_keys(), 0);
        assert_eq!(engine.delete_key(kdk), Err(CryptoError::InvalidKeyHandle));
    }

    #[test]
    fn test_usage_enforced() {
        let engine = SoftCrypto::new(&ROOT);
        let enc = engine.derive_key(KeySource::DeviceRoot, KeyUsage::Encryption, b"x").unwrap();
        assert_eq!(
            engine.derive_key(KeySource::Derived(enc), KeyUsage::Kdk, b"y"),
            Err(CryptoError::KeyUsageMismatch)
        );
        assert_eq!(
            engine.mac_verify(MacAlgorithm::HmacSha256, enc, b"data", &[0u8; 32]),
            Err(CryptoError::KeyUsageMismatch)
        );
    }

    #[test]
    fn test_matches_public_primitives() {
        let engine = SoftCrypto::new(&ROOT);
        let alg = MacAlgorithm::HmacSha384;
        let kdk = engine.derive_key(KeySource::DeviceRoot, KeyUsage::Kdk, b"kdk").unwrap();
        let mack = engine
            .derive_key(KeySource::Derived(kdk), KeyUsage::Mac(alg), b"mac")
            .unwrap();
        let enck = engine
            .derive_key(KeySource::Derived(kdk), KeyUsage::Encryption, b"enc")
            .unwrap();

        let mut kdk_bytes = [0u8; 32];
        kdf::derive(&ROOT, KeyUsage::Kdk, b"kdk", &mut kdk_bytes).unwrap();
        let mut mac_bytes = [0u8; 48];
        kdf::derive(&kdk_bytes, KeyUsage::Mac(alg), b"mac", &mut mac_bytes).unwrap();
        let mut enc_bytes = [0u8; 32];
        kdf::derive(&kdk_bytes, KeyUsage::Encryption, b"enc", &mut enc_bytes).unwrap();

        let mut tag = [0u8; 64];
        mac::compute(alg, &mac_bytes, b"header", &mut tag).unwrap();
        assert!(engine.mac_verify(alg, mack, b"header", &tag).is_ok());

        let iv = [7u8; 16];
        let mut data = *b"secret info";
        crate::cipher::apply_keystream(&enc_bytes, &iv, &mut [&mut data[..]]).unwrap();
        let mut ctx = engine.aes_decrypt_init(enck, &iv).unwrap();
        ctx.update(&mut data).unwrap();
        ctx.finalize().unwrap();
        assert_eq!(&data, b"secret info");
    }

    #[test]
    fn test_slots_exhausted() {
        let engine = SoftCrypto::new(&ROOT);
        for _ in 0..MAX_KEY_SLOTS {
            engine.derive_key(KeySource::DeviceRoot, KeyUsage::Kdk, b"k").unwrap();
        }
        assert_eq!(
            engine.derive_key(KeySource::DeviceRoot, KeyUsage::Kdk, b"k"),
            Err(CryptoError::KeySlotsExhausted)
        );
    }
}
