// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Firmware Image Format
//!
//! # Header Layout
//!
//! ```text
//! 0x0000  u32   file_header_tag      "IMGF"
//! 0x0004  u32   flags
//! 0x0008  u32   mac_type
//! 0x000C  [16]  iv
//! 0x001C  Certificate                signing certificate (1888 bytes)
//! 0x077C  PublicInfo                 always clear (80 bytes)
//! 0x07CC  SecretInfo                 clear or encrypted (208 bytes)
//! 0x089C  Signature                  over PublicInfo + clear SecretInfo
//! 0x0AB4  [64]  encrypted_code_and_data_hash
//! 0x0AF4  [64]  mac                  over bytes 0x0000..0x0AF4
//! 0x0B34  code and data
//! ```
//!
//! The header is kept as raw bytes so the MAC, the signature and in-place
//! decryption all operate on exactly what was read from flash. The buffer
//! is wiped when the header is dropped.

use heapless::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};

use sp_common::codec::{Reader, Writer};
use sp_common::constants::{
    CERTIFICATE_SIZE, HASH_CAPACITY, IMAGE_FILE_HEADER_SIZE, IMAGE_FILE_HEADER_TAG,
    IMAGE_HEADER_INFO_SIZE, IMAGE_INFO_HEADER_TAG, IV_SIZE, LOAD_REGION_SIZE, MAX_LOAD_REGIONS,
    PUBLIC_INFO_SIZE, SECRET_INFO_SIZE, SIGNATURE_SIZE,
};
use sp_common::{Error, ImageType, Result};

use crate::certificates::{Certificate, Signature};

/// Image header flags
pub mod flags {
    /// Secret info and code/data are encrypted
    pub const ENCRYPTED: u32 = 1 << 0;
}

// Field offsets inside the header
const FLAGS_OFFSET: usize = 4;
const MAC_TYPE_OFFSET: usize = 8;
const IV_OFFSET: usize = 12;
const CERTIFICATE_OFFSET: usize = IV_OFFSET + IV_SIZE;
const PUBLIC_INFO_OFFSET: usize = CERTIFICATE_OFFSET + CERTIFICATE_SIZE;
const SECRET_INFO_OFFSET: usize = PUBLIC_INFO_OFFSET + PUBLIC_INFO_SIZE;
const INFO_SIGNATURE_OFFSET: usize = SECRET_INFO_OFFSET + SECRET_INFO_SIZE;
const ENCRYPTED_HASH_OFFSET: usize = INFO_SIGNATURE_OFFSET + SIGNATURE_SIZE;
const MAC_OFFSET: usize = ENCRYPTED_HASH_OFFSET + HASH_CAPACITY;

const _: () = assert!(MAC_OFFSET == IMAGE_HEADER_INFO_SIZE);

// ============================================================================
// Image Info
// ============================================================================

/// Clear part of the image info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInfo {
    /// Must equal [`IMAGE_INFO_HEADER_TAG`]
    pub header_tag: u32,
    /// Raw [`ImageType`]
    pub image_type: u32,
    /// Bytes of code and data following the header
    pub code_and_data_size: u32,
    /// Raw hash algorithm of `code_and_data_hash`
    pub hash_algorithm: u32,
    /// Digest of the clear code and data, left-aligned
    pub code_and_data_hash: [u8; HASH_CAPACITY],
}

impl PublicInfo {
    /// Decode the public info record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Ok(Self {
            header_tag: r.u32()?,
            image_type: r.u32()?,
            code_and_data_size: r.u32()?,
            hash_algorithm: r.u32()?,
            code_and_data_hash: r.array()?,
        })
    }

    /// Encode the public info record
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let mut w = Writer::new(out);
        w.u32(self.header_tag)?;
        w.u32(self.image_type)?;
        w.u32(self.code_and_data_size)?;
        w.u32(self.hash_algorithm)?;
        w.bytes(&self.code_and_data_hash)
    }
}

/// One code/data region to place in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Zeroize)]
pub struct LoadRegion {
    /// Source offset relative to the end of the header
    pub region_offset: u32,
    /// Bytes copied from flash
    pub load_size: u32,
    /// Destination address
    pub load_address: u64,
    /// Destination size, the tail past `load_size` is zero-filled
    pub memory_size: u32,
}

impl LoadRegion {
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let region = Self {
            region_offset: r.u32()?,
            load_size: r.u32()?,
            load_address: r.u64()?,
            memory_size: r.u32()?,
        };
        r.skip(4)?;
        Ok(region)
    }

    fn write(&self, w: &mut Writer<'_>) -> Result<()> {
        w.u32(self.region_offset)?;
        w.u32(self.load_size)?;
        w.u64(self.load_address)?;
        w.u32(self.memory_size)?;
        w.zeros(4)
    }
}

/// Part of the image info that may be encrypted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecretInfo {
    /// Entry point of the loaded image
    pub exec_address: u64,
    /// Regions in load order
    pub load_regions: Vec<LoadRegion, MAX_LOAD_REGIONS>,
}

impl Zeroize for SecretInfo {
    fn zeroize(&mut self) {
        self.exec_address.zeroize();
        for region in &mut self.load_regions {
            region.zeroize();
        }
        self.load_regions.clear();
    }
}

impl Drop for SecretInfo {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for SecretInfo {}

impl SecretInfo {
    /// Decode and validate the secret info record
    ///
    /// Fails if the region count exceeds [`MAX_LOAD_REGIONS`] or a region
    /// loads more than its memory size.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let exec_address = r.u64()?;
        let count = r.u32()? as usize;
        r.skip(4)?;
        if count > MAX_LOAD_REGIONS {
            return Err(Error::InvalidLoadRegion);
        }
        let mut load_regions = Vec::new();
        for _ in 0..count {
            let region = LoadRegion::read(&mut r)?;
            if region.load_size > region.memory_size {
                return Err(Error::InvalidLoadRegion);
            }
            load_regions.push(region).map_err(|_| Error::InvalidLoadRegion)?;
        }
        Ok(Self {
            exec_address,
            load_regions,
        })
    }

    /// Encode the secret info record, padding unused region slots
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let mut w = Writer::new(out);
        w.u64(self.exec_address)?;
        w.u32(self.load_regions.len() as u32)?;
        w.zeros(4)?;
        for region in &self.load_regions {
            region.write(&mut w)?;
        }
        w.zeros((MAX_LOAD_REGIONS - self.load_regions.len()) * LOAD_REGION_SIZE)
    }
}

// ============================================================================
// Image File Header
// ============================================================================

/// Raw image file header
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ImageFileHeader {
    raw: [u8; IMAGE_FILE_HEADER_SIZE],
}

impl ImageFileHeader {
    /// Zeroed header to read into
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: [0u8; IMAGE_FILE_HEADER_SIZE],
        }
    }

    /// Header from encoded bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut header = Self::new();
        let src = bytes
            .get(..IMAGE_FILE_HEADER_SIZE)
            .ok_or(Error::TruncatedRecord)?;
        header.raw.copy_from_slice(src);
        Ok(header)
    }

    /// Encoded header
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; IMAGE_FILE_HEADER_SIZE] {
        &self.raw
    }

    /// Mutable encoded header
    pub fn as_mut_bytes(&mut self) -> &mut [u8; IMAGE_FILE_HEADER_SIZE] {
        &mut self.raw
    }

    fn word(&self, offset: usize) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.raw[offset..offset + 4]);
        u32::from_le_bytes(b)
    }

    /// File header tag
    #[must_use]
    pub fn file_header_tag(&self) -> u32 {
        self.word(0)
    }

    /// Flag bits, see [`flags`]
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.word(FLAGS_OFFSET)
    }

    /// Whether secret info and code/data are encrypted
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.flags() & flags::ENCRYPTED != 0
    }

    /// Raw MAC algorithm id
    #[must_use]
    pub fn mac_type(&self) -> u32 {
        self.word(MAC_TYPE_OFFSET)
    }

    /// Initialization vector for decryption, borrowed from the header
    pub fn iv(&self) -> Result<&[u8; IV_SIZE]> {
        self.raw[IV_OFFSET..CERTIFICATE_OFFSET]
            .try_into()
            .map_err(|_| Error::TruncatedRecord)
    }

    /// Decode the embedded signing certificate
    pub fn certificate(&self) -> Result<Certificate> {
        Certificate::decode(&self.raw[CERTIFICATE_OFFSET..PUBLIC_INFO_OFFSET])
    }

    /// Decode the public info
    pub fn public_info(&self) -> Result<PublicInfo> {
        PublicInfo::decode(&self.raw[PUBLIC_INFO_OFFSET..SECRET_INFO_OFFSET])
    }

    /// Decode the secret info (only meaningful once decrypted)
    pub fn secret_info(&self) -> Result<SecretInfo> {
        SecretInfo::decode(&self.raw[SECRET_INFO_OFFSET..INFO_SIGNATURE_OFFSET])
    }

    /// Secret info bytes, decrypted in place
    pub fn secret_info_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.raw[SECRET_INFO_OFFSET..INFO_SIGNATURE_OFFSET]
    }

    /// Public plus secret info, the message of the image signature
    #[must_use]
    pub fn image_info_bytes(&self) -> &[u8] {
        &self.raw[PUBLIC_INFO_OFFSET..INFO_SIGNATURE_OFFSET]
    }

    /// Decode the image signature
    pub fn info_signature(&self) -> Result<Signature> {
        Signature::decode(&self.raw[INFO_SIGNATURE_OFFSET..ENCRYPTED_HASH_OFFSET])
    }

    /// Expected digest of the encrypted code and data
    #[must_use]
    pub fn encrypted_hash(&self) -> &[u8] {
        &self.raw[ENCRYPTED_HASH_OFFSET..MAC_OFFSET]
    }

    /// Bytes covered by the MAC
    #[must_use]
    pub fn mac_covered_bytes(&self) -> &[u8] {
        &self.raw[..MAC_OFFSET]
    }

    /// Header MAC, left-aligned
    #[must_use]
    pub fn mac(&self) -> &[u8] {
        &self.raw[MAC_OFFSET..]
    }

    /// Structural checks, in order: file tag, image tag, image type and
    /// total size
    pub fn validate_fields(&self, expected: ImageType, file_size: u32) -> Result<PublicInfo> {
        if self.file_header_tag() != IMAGE_FILE_HEADER_TAG {
            return Err(Error::InvalidFileHeaderTag);
        }
        let public = self.public_info()?;
        if public.header_tag != IMAGE_INFO_HEADER_TAG {
            return Err(Error::InvalidImageHeaderTag);
        }
        if public.image_type != expected.as_u32() {
            return Err(Error::UnexpectedImageType);
        }
        let total = (IMAGE_FILE_HEADER_SIZE as u32)
            .checked_add(public.code_and_data_size)
            .ok_or(Error::ImageSizeMismatch)?;
        if total != file_size {
            return Err(Error::ImageSizeMismatch);
        }
        Ok(public)
    }
}

impl Default for ImageFileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer for the header fields, used to produce images
pub struct ImageHeaderBuilder<'a> {
    raw: &'a mut [u8; IMAGE_FILE_HEADER_SIZE],
}

impl<'a> ImageHeaderBuilder<'a> {
    /// Build into `header`
    pub fn new(header: &'a mut ImageFileHeader) -> Self {
        Self {
            raw: header.as_mut_bytes(),
        }
    }

    /// Set tag, flags, MAC type and IV
    pub fn prologue(&mut self, flags: u32, mac_type: u32, iv: &[u8; IV_SIZE]) -> &mut Self {
        self.raw[..4].copy_from_slice(&IMAGE_FILE_HEADER_TAG.to_le_bytes());
        self.raw[FLAGS_OFFSET..MAC_TYPE_OFFSET].copy_from_slice(&flags.to_le_bytes());
        self.raw[MAC_TYPE_OFFSET..IV_OFFSET].copy_from_slice(&mac_type.to_le_bytes());
        self.raw[IV_OFFSET..CERTIFICATE_OFFSET].copy_from_slice(iv);
        self
    }

    /// Embed the signing certificate
    pub fn certificate(&mut self, cert: &Certificate) -> &mut Self {
        self.raw[CERTIFICATE_OFFSET..PUBLIC_INFO_OFFSET].copy_from_slice(cert.as_bytes());
        self
    }

    /// Set the public and clear secret info
    pub fn info(&mut self, public: &PublicInfo, secret: &SecretInfo) -> Result<&mut Self> {
        public.encode(&mut self.raw[PUBLIC_INFO_OFFSET..SECRET_INFO_OFFSET])?;
        secret.encode(&mut self.raw[SECRET_INFO_OFFSET..INFO_SIGNATURE_OFFSET])?;
        Ok(self)
    }

    /// Set the image signature
    pub fn info_signature(&mut self, signature: &Signature) -> Result<&mut Self> {
        signature.encode(&mut self.raw[INFO_SIGNATURE_OFFSET..ENCRYPTED_HASH_OFFSET])?;
        Ok(self)
    }

    /// Set the expected digest of the encrypted code and data
    pub fn encrypted_hash(&mut self, digest: &[u8]) -> &mut Self {
        let field = &mut self.raw[ENCRYPTED_HASH_OFFSET..MAC_OFFSET];
        field.fill(0);
        field[..digest.len()].copy_from_slice(digest);
        self
    }

    /// Secret info bytes, to encrypt in place after signing
    pub fn secret_info_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.raw[SECRET_INFO_OFFSET..INFO_SIGNATURE_OFFSET]
    }

    /// Bytes covered by the MAC
    pub fn mac_covered_bytes(&self) -> &[u8] {
        &self.raw[..MAC_OFFSET]
    }

    /// Set the header MAC
    pub fn mac(&mut self, tag: &[u8]) -> &mut Self {
        let field = &mut self.raw[MAC_OFFSET..];
        field.fill(0);
        field[..tag.len()].copy_from_slice(tag);
        self
    }
}
