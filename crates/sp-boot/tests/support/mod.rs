// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Fixtures for the boot integration tests
//!
//! Builds a three-level P-256 PKI, signed and optionally encrypted image
//! files, and flash images laid out with two partitions.

#![allow(dead_code)]

use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::SigningKey;
use sp_boot::certificates::{CertificateInfo, NameSequence, PublicKey, Signature, IS_CA};
use sp_boot::flash_fs::{FileInfo, RegionInfo};
use sp_boot::image::{flags, ImageHeaderBuilder, LoadRegion, PublicInfo, SecretInfo};
use sp_boot::{Certificate, CertificateChain, ImageFileHeader, ImageProfile, Partition};
use sp_common::constants::{
    CERTIFICATE_HEADER_TAG, CERTIFICATE_INFO_SIZE, CERTIFICATE_VERSION_TAG, FILE_INFO_SIZE,
    FLASH_PAGE_SIZE, HASH_CAPACITY, IMAGE_FILE_HEADER_SIZE, IMAGE_INFO_HEADER_TAG,
    KEY_IDENTIFIER_SIZE, PARTITION_HEADER_SIZE, REGION_INFO_SIZE,
};
use sp_common::{Designation, EcCurve, HashAlgorithm, ImageType, KeyType, MacAlgorithm, RegionId};
use sp_crypto::cipher::CtrStream;
use sp_crypto::hash::{digest, Hasher};
use sp_crypto::{
    CryptoEngine, CryptoError, CryptoResult, KeyHandle, KeySource, KeyUsage, PublicKeyRef,
    SignatureRef, SoftCrypto,
};

/// Device root secret of the simulated trust anchor
pub const ROOT_SECRET: [u8; 32] = [0x5A; 32];

/// Cached DDR address images are linked at
pub const LOAD_BASE: u64 = 0x80_0000_0000;

/// Uncached alias the loader writes through
pub const MEMORY_BASE: u64 = 0xC0_0000_0000;

/// Simulated DDR size
pub const MEMORY_SIZE: usize = 0x4000;

/// Simulated flash: two partitions of eight pages
pub const FLASH_SIZE: usize = 16 * FLASH_PAGE_SIZE as usize;

/// First page of the SP BL2 region inside a partition
pub const BL2_PAGE: u32 = 1;

/// Pages reserved for the SP BL2 region
pub const BL2_PAGES: u32 = 4;

/// Entry point of every test image
pub const EXEC_ADDRESS: u64 = LOAD_BASE + 0x100;

// ============================================================================
// PKI
// ============================================================================

/// Root, issuing and image signing keys with their certificates
pub struct Pki {
    pub root_key: SigningKey,
    pub issuing_key: SigningKey,
    pub image_key: SigningKey,
    pub root: Certificate,
    pub issuing: Certificate,
    pub image_cert: Certificate,
}

impl Pki {
    pub fn new() -> Self {
        let root_key = signing_key(0x11);
        let issuing_key = signing_key(0x22);
        let image_key = signing_key(0x33);

        let root = issue(CertFields {
            subject: b"SP Root CA",
            subject_key: &root_key,
            issuer: b"SP Root CA",
            issuer_key: &root_key,
            is_ca: IS_CA,
            designation: Designation::ROOT_CA | Designation::ISSUING_CA,
        });
        let issuing = issue(CertFields {
            subject: b"SP Issuing CA",
            subject_key: &issuing_key,
            issuer: b"SP Root CA",
            issuer_key: &root_key,
            is_ca: IS_CA,
            designation: Designation::ISSUING_CA
                | Designation::BL2_CA
                | Designation::MACHINE_MINION_CA
                | Designation::MASTER_MINION_CA,
        });
        let image_cert = issue(CertFields {
            subject: b"SP BL2 signer",
            subject_key: &image_key,
            issuer: b"SP Issuing CA",
            issuer_key: &issuing_key,
            is_ca: 0,
            designation: Designation::NONE,
        });

        Self {
            root_key,
            issuing_key,
            image_key,
            root,
            issuing,
            image_cert,
        }
    }

    /// Chain as forwarded by the prior stage
    pub fn chain(&self) -> CertificateChain {
        CertificateChain {
            root: self.root.clone(),
            issuing: self.issuing.clone(),
        }
    }

    /// Provisioned SHA-512 of the root certificate
    pub fn root_pin(&self) -> [u8; 64] {
        let mut pin = [0u8; 64];
        pin.copy_from_slice(digest(HashAlgorithm::Sha512, self.root.as_bytes()).as_bytes());
        pin
    }
}

/// Fields that vary between test certificates
pub struct CertFields<'a> {
    pub subject: &'a [u8],
    pub subject_key: &'a SigningKey,
    pub issuer: &'a [u8],
    pub issuer_key: &'a SigningKey,
    pub is_ca: u32,
    pub designation: Designation,
}

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32].into()).unwrap()
}

pub fn public_key(key: &SigningKey) -> PublicKey {
    let point = key.verifying_key().to_encoded_point(false);
    PublicKey::ec(EcCurve::P256, point.x().unwrap(), point.y().unwrap())
}

/// Key identifier derived from a subject name
pub fn key_identifier(name: &[u8]) -> [u8; KEY_IDENTIFIER_SIZE] {
    let mut id = [0u8; KEY_IDENTIFIER_SIZE];
    id.copy_from_slice(&digest(HashAlgorithm::Sha256, name).as_bytes()[..KEY_IDENTIFIER_SIZE]);
    id
}

/// ECDSA P-256 over SHA-256 of `message`
pub fn sign(key: &SigningKey, message: &[u8]) -> Signature {
    let d = digest(HashAlgorithm::Sha256, message);
    let sig: p256::ecdsa::Signature = key.sign_prehash(d.as_bytes()).unwrap();
    let (r, s) = sig.split_bytes();
    Signature::ec(HashAlgorithm::Sha256, EcCurve::P256, &r, &s)
}

pub fn issue(fields: CertFields<'_>) -> Certificate {
    let info = CertificateInfo {
        header_tag: CERTIFICATE_HEADER_TAG,
        version_tag: CERTIFICATE_VERSION_TAG,
        hash_algorithm: HashAlgorithm::Sha256.as_u32(),
        signing_key_type: KeyType::Ec.as_u32(),
        signing_key_param: EcCurve::P256.as_u32(),
        subject_public_key: public_key(fields.subject_key),
        subject: NameSequence::with_common_name(fields.subject),
        issuer: NameSequence::with_common_name(fields.issuer),
        subject_key_identifier: key_identifier(fields.subject),
        issuer_key_identifier: key_identifier(fields.issuer),
        is_ca: fields.is_ca,
        designation: fields.designation.bits(),
    };
    let mut raw = [0u8; CERTIFICATE_INFO_SIZE];
    info.encode(&mut raw).unwrap();
    Certificate::from_parts(&info, &sign(fields.issuer_key, &raw)).unwrap()
}

/// Flip one byte of a certificate at `offset` without re-signing it
pub fn tamper(cert: &Certificate, offset: usize) -> Certificate {
    let mut raw = *cert.as_bytes();
    raw[offset] ^= 0x01;
    Certificate::decode(&raw).unwrap()
}

// ============================================================================
// Images
// ============================================================================

/// Deterministic code/data bytes
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

/// Image file builder
pub struct ImageBuilder<'p> {
    pki: &'p Pki,
    image_type: ImageType,
    payload: Vec<u8>,
    regions: Vec<LoadRegion>,
    mac: Option<MacAlgorithm>,
    iv: [u8; 16],
}

impl<'p> ImageBuilder<'p> {
    /// Image loading all of `payload` at [`LOAD_BASE`]
    pub fn new(pki: &'p Pki, image_type: ImageType, payload: Vec<u8>) -> Self {
        let region = LoadRegion {
            region_offset: 0,
            load_size: payload.len() as u32,
            load_address: LOAD_BASE,
            memory_size: payload.len() as u32,
        };
        Self {
            pki,
            image_type,
            payload,
            regions: vec![region],
            mac: None,
            iv: [0x0C; 16],
        }
    }

    pub fn regions(mut self, regions: &[LoadRegion]) -> Self {
        self.regions = regions.to_vec();
        self
    }

    pub fn encrypted(mut self, mac: MacAlgorithm) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Header followed by code and data
    pub fn build(&self) -> Vec<u8> {
        let profile = ImageProfile::for_image(self.image_type).unwrap();

        let mut plain = Hasher::new(HashAlgorithm::Sha256);
        for r in &self.regions {
            plain.absorb(self.source(r, &self.payload));
        }
        let mut public = PublicInfo {
            header_tag: IMAGE_INFO_HEADER_TAG,
            image_type: self.image_type.as_u32(),
            code_and_data_size: self.payload.len() as u32,
            hash_algorithm: HashAlgorithm::Sha256.as_u32(),
            code_and_data_hash: [0u8; HASH_CAPACITY],
        };
        let hash = plain.finish();
        public.code_and_data_hash[..hash.len()].copy_from_slice(hash.as_bytes());

        let mut secret = SecretInfo::default();
        secret.exec_address = EXEC_ADDRESS;
        for r in &self.regions {
            secret.load_regions.push(*r).unwrap();
        }

        let mut header = ImageFileHeader::new();
        let mut body = self.payload.clone();
        {
            let mut b = ImageHeaderBuilder::new(&mut header);
            let flag_bits = if self.mac.is_some() { flags::ENCRYPTED } else { 0 };
            let mac_type = self.mac.map_or(0, MacAlgorithm::as_u32);
            b.prologue(flag_bits, mac_type, &self.iv)
                .certificate(&self.pki.image_cert)
                .info(&public, &secret)
                .unwrap();
        }
        let signature = sign(&self.pki.image_key, header.image_info_bytes());
        let mut b = ImageHeaderBuilder::new(&mut header);
        b.info_signature(&signature).unwrap();

        if let Some(mac_alg) = self.mac {
            let keys = ImageKeys::derive(&profile, mac_alg);
            let mut stream = CtrStream::new(&keys.enc, &self.iv).unwrap();
            stream.apply(b.secret_info_bytes_mut()).unwrap();

            let mut enc_hash = Hasher::new(HashAlgorithm::Sha256);
            for r in &self.regions {
                let start = r.region_offset as usize;
                let window = &mut body[start..start + r.load_size as usize];
                stream.apply(window).unwrap();
                enc_hash.absorb(window);
            }
            b.encrypted_hash(enc_hash.finish().as_bytes());

            let mut tag = [0u8; 64];
            let n = sp_crypto::mac::compute(mac_alg, &keys.mac, b.mac_covered_bytes(), &mut tag).unwrap();
            b.mac(&tag[..n]);
        }

        let mut file = header.as_bytes().to_vec();
        file.extend_from_slice(&body);
        file
    }

    fn source<'b>(&self, region: &LoadRegion, data: &'b [u8]) -> &'b [u8] {
        let start = region.region_offset as usize;
        &data[start..start + region.load_size as usize]
    }
}

/// Image keys as the trust anchor derives them
pub struct ImageKeys {
    pub mac: Vec<u8>,
    pub enc: [u8; 32],
}

impl ImageKeys {
    pub fn derive(profile: &ImageProfile, mac_alg: MacAlgorithm) -> Self {
        let mut kdk = [0u8; 32];
        sp_crypto::kdf::derive(&ROOT_SECRET, KeyUsage::Kdk, profile.kdk_label, &mut kdk).unwrap();
        let mac_usage = KeyUsage::Mac(mac_alg);
        let mut mac = vec![0u8; mac_usage.key_len()];
        sp_crypto::kdf::derive(&kdk, mac_usage, profile.mac_label, &mut mac).unwrap();
        let mut enc = [0u8; 32];
        sp_crypto::kdf::derive(&kdk, KeyUsage::Encryption, profile.enc_label, &mut enc).unwrap();
        Self { mac, enc }
    }
}

/// Byte offset of code/data byte `index` inside an image file
pub const fn body_offset(index: usize) -> usize {
    IMAGE_FILE_HEADER_SIZE + index
}

// ============================================================================
// Flash
// ============================================================================

/// Erased flash with partition tables and files placed on top
pub struct FlashBuilder {
    data: Vec<u8>,
}

impl FlashBuilder {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; FLASH_SIZE],
        }
    }

    pub fn table(mut self, partition: Partition, regions: &[RegionInfo]) -> Self {
        let base = partition.base(FLASH_SIZE as u32) as usize;
        self.data[base..base + PARTITION_HEADER_SIZE].copy_from_slice(&(regions.len() as u32).to_le_bytes());
        for (i, region) in regions.iter().enumerate() {
            let at = base + PARTITION_HEADER_SIZE + i * REGION_INFO_SIZE;
            region.encode(&mut self.data[at..at + REGION_INFO_SIZE]).unwrap();
        }
        self
    }

    pub fn file(mut self, partition: Partition, page: u32, contents: &[u8]) -> Self {
        let at = (partition.base(FLASH_SIZE as u32) + page * FLASH_PAGE_SIZE) as usize;
        FileInfo::new(contents.len() as u32)
            .encode(&mut self.data[at..at + FILE_INFO_SIZE])
            .unwrap();
        self.data[at + FILE_INFO_SIZE..at + FILE_INFO_SIZE + contents.len()].copy_from_slice(contents);
        self
    }

    /// Table and file for SP BL2 in `partition`
    pub fn bl2(self, partition: Partition, image: &[u8]) -> Self {
        self.table(partition, &[RegionInfo::new(RegionId::SpBl2, BL2_PAGE, BL2_PAGES)])
            .file(partition, BL2_PAGE, image)
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Flash address of image byte `offset` stored as SP BL2 in `partition`
pub fn bl2_address(partition: Partition, offset: usize) -> usize {
    (partition.base(FLASH_SIZE as u32) + BL2_PAGE * FLASH_PAGE_SIZE) as usize + FILE_INFO_SIZE + offset
}

// ============================================================================
// Engines
// ============================================================================

/// Engine whose key deletion always reports failure
pub struct StickyKeys(pub SoftCrypto);

impl CryptoEngine for StickyKeys {
    type Hash = <SoftCrypto as CryptoEngine>::Hash;
    type Decrypt = <SoftCrypto as CryptoEngine>::Decrypt;

    fn hash_init(&self, algorithm: HashAlgorithm) -> CryptoResult<Self::Hash> {
        self.0.hash_init(algorithm)
    }

    fn aes_decrypt_init(&self, key: KeyHandle, iv: &[u8; 16]) -> CryptoResult<Self::Decrypt> {
        self.0.aes_decrypt_init(key, iv)
    }

    fn derive_key(&self, source: KeySource, usage: KeyUsage, label: &[u8]) -> CryptoResult<KeyHandle> {
        self.0.derive_key(source, usage, label)
    }

    fn delete_key(&self, key: KeyHandle) -> CryptoResult<()> {
        self.0.delete_key(key)?;
        Err(CryptoError::InternalError)
    }

    fn mac_verify(&self, algorithm: MacAlgorithm, key: KeyHandle, data: &[u8], tag: &[u8]) -> CryptoResult<()> {
        self.0.mac_verify(algorithm, key, data, tag)
    }

    fn verify_signature(
        &self,
        key: PublicKeyRef<'_>,
        hash: HashAlgorithm,
        signature: SignatureRef<'_>,
        message: &[u8],
    ) -> CryptoResult<()> {
        self.0.verify_signature(key, hash, signature, message)
    }
}
