// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Firmware Image Loader
//!
//! Loads one image class from the flash filesystem into memory.
//!
//! # Load Process
//!
//! 1. Locate the image file and read its header
//! 2. Validate header structure
//! 3. Verify the signing certificate against the issuing CA
//! 4. Encrypted images: derive keys, check the header MAC, decrypt the
//!    secret info
//! 5. Verify the image info signature
//! 6. Copy each load region into memory, hashing (and decrypting) on the way
//! 7. Compare the final digests
//! 8. Destroy derived keys
//!
//! Any failure is terminal for the boot attempt. From step 4 onward every
//! acquired resource sits in a guard, so early returns zero the regions
//! written so far, abort open hash contexts, destroy derived keys and wipe
//! the header.

use heapless::Vec;

use sp_common::constants::{IMAGE_FILE_HEADER_SIZE, MAX_LOAD_REGIONS};
use sp_common::log::LogSink;
use sp_common::{
    log_error, log_info, log_warn, Designation, Error, HashAlgorithm, ImageType, MacAlgorithm,
    MemoryMap, RegionId, Result, SecurityOverrides,
};
use sp_crypto::{CryptoEngine, DecryptContext, Digest, HashContext, KeyHandle, KeySource, KeyUsage};
use sp_hal::{SpiFlash, TargetMemory};

use crate::boot_log::BootStage;
use crate::certificates::{verify_certificate, Certificate};
use crate::flash_fs::FlashFs;
use crate::image::ImageFileHeader;

// ============================================================================
// Image Profiles
// ============================================================================

/// Per-class loading parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProfile {
    /// Image class
    pub image_type: ImageType,
    /// Region holding the image file
    pub region: RegionId,
    /// Designation the issuing CA must carry
    pub designation: Designation,
    /// Label of the key-derivation key
    pub kdk_label: &'static [u8],
    /// Label of the MAC key
    pub mac_label: &'static [u8],
    /// Label of the encryption key
    pub enc_label: &'static [u8],
}

impl ImageProfile {
    /// Profile for `image_type`, if this stage can load it
    #[must_use]
    pub const fn for_image(image_type: ImageType) -> Option<Self> {
        let (region, designation, kdk_label, mac_label, enc_label): (_, _, &[u8], &[u8], &[u8]) =
            match image_type {
                ImageType::SpBl2 => (
                    RegionId::SpBl2,
                    Designation::BL2_CA,
                    b"SP_BL2_KDK",
                    b"SP_BL2_MAC",
                    b"SP_BL2_ENC",
                ),
                ImageType::MachineMinion => (
                    RegionId::MachineMinion,
                    Designation::MACHINE_MINION_CA,
                    b"MACHINE_MINION_KDK",
                    b"MACHINE_MINION_MAC",
                    b"MACHINE_MINION_ENC",
                ),
                ImageType::MasterMinion => (
                    RegionId::MasterMinion,
                    Designation::MASTER_MINION_CA,
                    b"MASTER_MINION_KDK",
                    b"MASTER_MINION_MAC",
                    b"MASTER_MINION_ENC",
                ),
                ImageType::WorkerMinion => (
                    RegionId::WorkerMinion,
                    Designation::WORKER_MINION_CA,
                    b"WORKER_MINION_KDK",
                    b"WORKER_MINION_MAC",
                    b"WORKER_MINION_ENC",
                ),
                ImageType::MaxionBl1 => (
                    RegionId::MaxionBl1,
                    Designation::MAXION_BL1_CA,
                    b"MAXION_BL1_KDK",
                    b"MAXION_BL1_MAC",
                    b"MAXION_BL1_ENC",
                ),
                // Loaded by ROM, never by this stage
                ImageType::SpBl1 => return None,
            };
        Some(Self {
            image_type,
            region,
            designation,
            kdk_label,
            mac_label,
            enc_label,
        })
    }
}

/// Result of a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    /// Image class
    pub image_type: ImageType,
    /// Entry point
    pub exec_address: u64,
    /// Code and data bytes copied from flash
    pub total_loaded: u64,
    /// Whether the image was encrypted
    pub encrypted: bool,
}

// ============================================================================
// Scope Guards
// ============================================================================

/// Derived keys, destroyed on drop
struct KeyRing<'e, E: CryptoEngine> {
    engine: &'e E,
    kdk: Option<KeyHandle>,
    mac: Option<KeyHandle>,
    enc: Option<KeyHandle>,
}

impl<'e, E: CryptoEngine> KeyRing<'e, E> {
    fn new(engine: &'e E) -> Self {
        Self {
            engine,
            kdk: None,
            mac: None,
            enc: None,
        }
    }

    fn derive(&self, source: KeySource, usage: KeyUsage, label: &[u8]) -> Result<KeyHandle> {
        self.engine
            .derive_key(source, usage, label)
            .map_err(|_| Error::KeyDerivationFailed)
    }

    /// Destroy ENC, MAC then KDK; attempts every key even after a failure
    fn release(&mut self) -> Result<()> {
        let mut failed = false;
        for key in [self.enc.take(), self.mac.take(), self.kdk.take()].into_iter().flatten() {
            failed |= self.engine.delete_key(key).is_err();
        }
        if failed {
            Err(Error::KeyDeleteFailed)
        } else {
            Ok(())
        }
    }
}

impl<E: CryptoEngine> Drop for KeyRing<'_, E> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Running hash, aborted unless finished
struct HashGuard<H: HashContext>(Option<H>);

impl<H: HashContext> HashGuard<H> {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.0
            .as_mut()
            .ok_or(Error::HashEngineFailure)?
            .update(data)
            .map_err(|_| Error::HashEngineFailure)
    }

    fn finish(mut self) -> Result<Digest> {
        self.0
            .take()
            .ok_or(Error::HashEngineFailure)?
            .finalize()
            .map_err(|_| Error::HashEngineFailure)
    }
}

impl<H: HashContext> Drop for HashGuard<H> {
    fn drop(&mut self) {
        if let Some(ctx) = self.0.take() {
            ctx.abort();
        }
    }
}

/// Streaming decryption, finalized on drop if still open
struct DecryptGuard<D: DecryptContext>(Option<D>);

impl<D: DecryptContext> DecryptGuard<D> {
    fn update(&mut self, data: &mut [u8]) -> Result<()> {
        self.0
            .as_mut()
            .ok_or(Error::CipherFailure)?
            .update(data)
            .map_err(|_| Error::CipherFailure)
    }

    fn finish(mut self) -> Result<()> {
        self.0
            .take()
            .ok_or(Error::CipherFailure)?
            .finalize()
            .map_err(|_| Error::CipherFailure)
    }
}

impl<D: DecryptContext> Drop for DecryptGuard<D> {
    fn drop(&mut self) {
        if let Some(ctx) = self.0.take() {
            let _ = ctx.finalize();
        }
    }
}

/// Destination ranges, zeroed on drop unless disarmed
struct ScrubGuard<'m, M: TargetMemory> {
    memory: &'m mut M,
    regions: Vec<(u64, usize), MAX_LOAD_REGIONS>,
    armed: bool,
}

impl<'m, M: TargetMemory> ScrubGuard<'m, M> {
    fn new(memory: &'m mut M) -> Self {
        Self {
            memory,
            regions: Vec::new(),
            armed: true,
        }
    }

    /// Record a range before anything is written to it
    fn record(&mut self, address: u64, len: usize) -> Result<()> {
        self.regions
            .push((address, len))
            .map_err(|_| Error::InvalidLoadRegion)
    }

    fn window(&mut self, address: u64, len: usize) -> Result<&mut [u8]> {
        Ok(self.memory.window_mut(address, len)?)
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<M: TargetMemory> Drop for ScrubGuard<'_, M> {
    fn drop(&mut self) {
        if self.armed {
            for &(address, len) in &self.regions {
                let _ = self.memory.zero(address, len);
            }
        }
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Image loader for one boot attempt
pub struct FirmwareLoader<'a, E: CryptoEngine, L: LogSink> {
    engine: &'a E,
    issuing_ca: &'a Certificate,
    memory_map: MemoryMap,
    overrides: SecurityOverrides,
    log: &'a mut L,
    stage: BootStage,
}

impl<'a, E: CryptoEngine, L: LogSink> FirmwareLoader<'a, E, L> {
    /// Create a loader trusting images signed under `issuing_ca`
    pub fn new(
        engine: &'a E,
        issuing_ca: &'a Certificate,
        memory_map: MemoryMap,
        overrides: SecurityOverrides,
        log: &'a mut L,
    ) -> Self {
        Self {
            engine,
            issuing_ca,
            memory_map,
            overrides,
            log,
            stage: BootStage::Locate,
        }
    }

    /// Stage reached by the last load; on failure, the stage that failed
    #[must_use]
    pub const fn stage(&self) -> BootStage {
        self.stage
    }

    /// Load `image_type` from `fs` into `memory`
    pub fn load<F: SpiFlash, M: TargetMemory>(
        &mut self,
        fs: &mut FlashFs<'_, F>,
        memory: &mut M,
        image_type: ImageType,
    ) -> Result<LoadedImage> {
        self.stage = BootStage::Locate;
        let result = self.load_image(fs, memory, image_type);
        match &result {
            Ok(image) => log_info!(
                self.log,
                "loader",
                "{} loaded: {} bytes, entry {:#x}",
                image_type,
                image.total_loaded,
                image.exec_address
            ),
            Err(e) => log_error!(self.log, "loader", "{} load failed at {:?}: {}", image_type, self.stage, e),
        }
        result
    }

    fn load_image<F: SpiFlash, M: TargetMemory>(
        &mut self,
        fs: &mut FlashFs<'_, F>,
        memory: &mut M,
        image_type: ImageType,
    ) -> Result<LoadedImage> {
        let profile = ImageProfile::for_image(image_type).ok_or(Error::UnsupportedImageType)?;

        // Locate
        let file_size = fs.get_file_size(profile.region)?;
        if (file_size as usize) < IMAGE_FILE_HEADER_SIZE {
            return Err(Error::ImageTooSmall);
        }
        let mut header = ImageFileHeader::new();
        fs.read_file(profile.region, 0, header.as_mut_bytes())?;

        // Structural
        self.stage = BootStage::Structural;
        let public = header.validate_fields(image_type, file_size)?;

        // Chain
        self.stage = BootStage::ImageCertificate;
        let cert = header.certificate()?;
        if self.overrides.trust_anchor_disabled {
            log_warn!(self.log, "loader", "Image CRT IGN");
        } else {
            verify_certificate(
                self.engine,
                &cert,
                Some(self.issuing_ca),
                profile.designation,
                self.overrides,
                self.log,
            )?;
        }

        // Decrypt
        self.stage = BootStage::Decrypt;
        let encrypted = header.is_encrypted();
        let mut keys = KeyRing::new(self.engine);
        let mut decrypt = None;
        if encrypted {
            if self.overrides.trust_anchor_disabled {
                return Err(Error::TrustAnchorDisabled);
            }
            let mac_alg = MacAlgorithm::from_u32(header.mac_type()).ok_or(Error::UnsupportedMacType)?;
            let kdk = keys.derive(KeySource::DeviceRoot, KeyUsage::Kdk, profile.kdk_label)?;
            keys.kdk = Some(kdk);
            let mac_key = keys.derive(KeySource::Derived(kdk), KeyUsage::Mac(mac_alg), profile.mac_label)?;
            keys.mac = Some(mac_key);
            self.engine
                .mac_verify(mac_alg, mac_key, header.mac_covered_bytes(), header.mac())?;
            let enc_key = keys.derive(KeySource::Derived(kdk), KeyUsage::Encryption, profile.enc_label)?;
            keys.enc = Some(enc_key);

            let ctx = self
                .engine
                .aes_decrypt_init(enc_key, header.iv()?)
                .map_err(|_| Error::CipherFailure)?;
            let mut guard = DecryptGuard(Some(ctx));
            guard.update(header.secret_info_bytes_mut())?;
            decrypt = Some(guard);
        }

        // Signature
        self.stage = BootStage::Signature;
        if self.overrides.skip_signatures() {
            log_warn!(self.log, "loader", "Image SIG IGN");
        } else {
            let signature = header.info_signature()?;
            let key = cert.info.subject_public_key.as_verify_ref()?;
            self.engine
                .verify_signature(key, signature.hash()?, signature.as_verify_ref()?, header.image_info_bytes())
                .map_err(|_| Error::ImageSignatureInvalid)?;
        }
        let secret = header.secret_info()?;

        // Load regions
        self.stage = BootStage::LoadRegions;
        let hash_alg = HashAlgorithm::from_u32(public.hash_algorithm).ok_or(Error::UnsupportedHashAlgorithm)?;
        let mut scrub = ScrubGuard::new(memory);
        let mut encrypted_hash = if encrypted {
            Some(HashGuard(Some(self.engine.hash_init(hash_alg).map_err(|_| Error::HashEngineFailure)?)))
        } else {
            None
        };
        let mut plain_hash = if self.overrides.trust_anchor_disabled {
            None
        } else {
            Some(HashGuard(Some(self.engine.hash_init(hash_alg).map_err(|_| Error::HashEngineFailure)?)))
        };

        let mut total_loaded: u64 = 0;
        for region in &secret.load_regions {
            let source = (IMAGE_FILE_HEADER_SIZE as u32)
                .checked_add(region.region_offset)
                .ok_or(Error::InvalidLoadRegion)?;
            let address = self
                .memory_map
                .resolve(region.load_address, u64::from(region.memory_size))?;
            let memory_size = region.memory_size as usize;
            let load_size = region.load_size as usize;
            scrub.record(address, memory_size)?;

            let window = scrub.window(address, memory_size)?;
            let (data, tail) = window.split_at_mut(load_size);
            if !data.is_empty() {
                fs.read_file(profile.region, source, data)?;
                if let Some(h) = encrypted_hash.as_mut() {
                    h.update(data)?;
                }
                if let Some(d) = decrypt.as_mut() {
                    d.update(data)?;
                }
                if let Some(h) = plain_hash.as_mut() {
                    h.update(data)?;
                }
            }
            tail.fill(0);
            total_loaded += u64::from(region.load_size);
        }

        // Integrity
        self.stage = BootStage::Integrity;
        if let Some(h) = encrypted_hash.take() {
            let digest = h.finish()?;
            let expected = &header.encrypted_hash()[..digest.len()];
            if !self.engine.constant_time_compare(digest.as_bytes(), expected) {
                return Err(Error::EncryptedHashMismatch);
            }
        }
        if let Some(d) = decrypt.take() {
            d.finish()?;
        }
        if self.overrides.skip_signatures() {
            log_warn!(self.log, "loader", "Image HASH IGN");
        } else {
            let digest = plain_hash.take().ok_or(Error::HashEngineFailure)?.finish()?;
            let expected = &public.code_and_data_hash[..digest.len()];
            if !self.engine.constant_time_compare(digest.as_bytes(), expected) {
                return Err(Error::HashMismatch);
            }
        }

        // Cleanup; a key that cannot be destroyed fails the load
        self.stage = BootStage::Cleanup;
        keys.release()?;
        scrub.disarm();

        Ok(LoadedImage {
            image_type,
            exec_address: secret.exec_address,
            total_loaded,
            encrypted,
        })
    }
}
