// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Boot Failure Log
//!
//! Records why a boot attempt halted. Entries are kept as CRC-protected
//! 32-byte records in a circular buffer so they can be exported verbatim to
//! whatever persists them (scratch RAM handed to the next attempt, or a
//! debug channel).
//!
//! # Entry Format
//!
//! ```text
//! Offset  Size  Description
//! 0x00    4     Magic (0x4C4F_4745 "LOGE")
//! 0x04    4     Boot attempt
//! 0x08    1     Boot stage
//! 0x09    1     Error category
//! 0x0A    2     Error code
//! 0x0C    1     Active partition (0xFF if none)
//! 0x0D    1     Image type
//! 0x0E    1     Override flags
//! 0x0F    13    Reserved
//! 0x1C    4     CRC-32 of bytes 0x00..0x1C
//! ```

use sp_common::codec::{crc32, Reader, Writer};
use sp_common::{Error, ErrorKind, ImageType, Result, SecurityOverrides};

use crate::flash_fs::Partition;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of log entries (circular buffer)
pub const MAX_LOG_ENTRIES: usize = 16;

/// Size of each log entry in bytes
pub const LOG_ENTRY_SIZE: usize = 32;

/// Offset of the CRC inside an entry
const CRC_OFFSET: usize = LOG_ENTRY_SIZE - 4;

/// Partition byte when no partition was selected
const NO_PARTITION: u8 = 0xFF;

/// Override flag bits
pub mod override_flags {
    /// Trust anchor disabled by fuse
    pub const TRUST_ANCHOR_DISABLED: u8 = 1 << 0;
    /// Signature checks disabled by chicken bit
    pub const SIGNATURES_IGNORED: u8 = 1 << 1;
}

// ============================================================================
// Boot Stage
// ============================================================================

/// Boot stage where a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootStage {
    /// Filesystem init and partition failover
    FsInit = 0,
    /// Carried-over certificate chain
    ChainVerify = 1,
    /// Locating and reading the image header
    Locate = 2,
    /// Header structure
    Structural = 3,
    /// Image signing certificate
    ImageCertificate = 4,
    /// Key derivation, MAC and secret info decryption
    Decrypt = 5,
    /// Image info signature
    Signature = 6,
    /// Copying regions into memory
    LoadRegions = 7,
    /// Final hash comparison
    Integrity = 8,
    /// Key destruction
    Cleanup = 9,
    /// Transfer of control
    Handoff = 10,
    /// Unknown stage
    Unknown = 255,
}

impl From<u8> for BootStage {
    fn from(value: u8) -> Self {
        match value {
            0 => BootStage::FsInit,
            1 => BootStage::ChainVerify,
            2 => BootStage::Locate,
            3 => BootStage::Structural,
            4 => BootStage::ImageCertificate,
            5 => BootStage::Decrypt,
            6 => BootStage::Signature,
            7 => BootStage::LoadRegions,
            8 => BootStage::Integrity,
            9 => BootStage::Cleanup,
            10 => BootStage::Handoff,
            _ => BootStage::Unknown,
        }
    }
}

// ============================================================================
// Error Category
// ============================================================================

/// Coarse failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCategory {
    /// No error
    None = 0,
    /// Flash corruption or out-of-range access
    Storage = 1,
    /// Malformed record
    Format = 2,
    /// Chain or signature failure
    Trust = 3,
    /// MAC or hash mismatch
    Integrity = 4,
    /// Unknown category
    Unknown = 255,
}

impl From<u8> for ErrorCategory {
    fn from(value: u8) -> Self {
        match value {
            0 => ErrorCategory::None,
            1 => ErrorCategory::Storage,
            2 => ErrorCategory::Format,
            3 => ErrorCategory::Trust,
            4 => ErrorCategory::Integrity,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl From<ErrorKind> for ErrorCategory {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::StorageCorruption => ErrorCategory::Storage,
            ErrorKind::Format => ErrorCategory::Format,
            ErrorKind::Trust => ErrorCategory::Trust,
            ErrorKind::CryptoIntegrity => ErrorCategory::Integrity,
        }
    }
}

// ============================================================================
// Boot Log Entry
// ============================================================================

/// A single boot log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootLogEntry {
    /// Boot attempt counter
    pub boot_attempt: u32,
    /// Boot stage where failure occurred
    pub stage: BootStage,
    /// Error category
    pub category: ErrorCategory,
    /// Specific error code (from `sp_common::Error`)
    pub error_code: u16,
    /// Partition in use, if one was selected
    pub partition: Option<Partition>,
    /// Raw image type being loaded
    pub image_type: u8,
    /// See [`override_flags`]
    pub overrides: u8,
}

impl BootLogEntry {
    /// Entry magic value
    const ENTRY_MAGIC: u32 = 0x4C4F_4745; // "LOGE"

    /// Create a log entry for a boot failure
    #[must_use]
    pub fn for_failure(boot_attempt: u32, stage: BootStage, error: Error) -> Self {
        Self {
            boot_attempt,
            stage,
            category: ErrorCategory::from(error.kind()),
            error_code: error.code(),
            partition: None,
            image_type: 0,
            overrides: 0,
        }
    }

    /// Attach the partition and image being loaded
    #[must_use]
    pub fn with_target(mut self, partition: Option<Partition>, image: ImageType) -> Self {
        self.partition = partition;
        self.image_type = image.as_u32() as u8;
        self
    }

    /// Attach the active security overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: SecurityOverrides) -> Self {
        self.overrides = 0;
        if overrides.trust_anchor_disabled {
            self.overrides |= override_flags::TRUST_ANCHOR_DISABLED;
        }
        if overrides.ignore_signatures {
            self.overrides |= override_flags::SIGNATURES_IGNORED;
        }
        self
    }

    /// Encode with magic and CRC
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let record = out.get_mut(..LOG_ENTRY_SIZE).ok_or(Error::TruncatedRecord)?;
        let mut w = Writer::new(&mut record[..CRC_OFFSET]);
        w.u32(Self::ENTRY_MAGIC)?;
        w.u32(self.boot_attempt)?;
        w.bytes(&[self.stage as u8, self.category as u8])?;
        w.bytes(&self.error_code.to_le_bytes())?;
        w.bytes(&[
            self.partition.map_or(NO_PARTITION, |p| p as u8),
            self.image_type,
            self.overrides,
        ])?;
        w.zeros(CRC_OFFSET - w.position())?;
        let crc = crc32(&record[..CRC_OFFSET]);
        record[CRC_OFFSET..].copy_from_slice(&crc.to_le_bytes());
        Ok(())
    }

    /// Decode an entry, checking magic and CRC
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let record = bytes.get(..LOG_ENTRY_SIZE).ok_or(Error::TruncatedRecord)?;
        if !Self::is_valid(record) {
            return Err(Error::TruncatedRecord);
        }
        let mut r = Reader::new(record);
        r.skip(4)?;
        let boot_attempt = r.u32()?;
        let [stage, category, code_lo, code_hi, partition, image_type, overrides] = r.array::<7>()?;
        Ok(Self {
            boot_attempt,
            stage: BootStage::from(stage),
            category: ErrorCategory::from(category),
            error_code: u16::from_le_bytes([code_lo, code_hi]),
            partition: (partition != NO_PARTITION).then(|| Partition::from(partition)),
            image_type,
            overrides,
        })
    }

    /// Check magic and CRC of an encoded entry
    #[must_use]
    pub fn is_valid(record: &[u8]) -> bool {
        let Some(record) = record.get(..LOG_ENTRY_SIZE) else {
            return false;
        };
        let magic = Reader::new(record).u32().ok();
        let stored = Reader::new(&record[CRC_OFFSET..]).u32().ok();
        magic == Some(Self::ENTRY_MAGIC) && stored == Some(crc32(&record[..CRC_OFFSET]))
    }
}

// ============================================================================
// Boot Log Manager
// ============================================================================

/// Circular log of encoded failure entries
pub struct BootLog {
    entries: [[u8; LOG_ENTRY_SIZE]; MAX_LOG_ENTRIES],
    total_entries: u32,
    write_index: usize,
}

impl BootLog {
    /// Create an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [[0u8; LOG_ENTRY_SIZE]; MAX_LOG_ENTRIES],
            total_entries: 0,
            write_index: 0,
        }
    }

    /// Append an entry, overwriting the oldest when full
    pub fn record(&mut self, entry: &BootLogEntry) -> Result<()> {
        entry.encode(&mut self.entries[self.write_index])?;
        self.write_index = (self.write_index + 1) % MAX_LOG_ENTRIES;
        self.total_entries = self.total_entries.saturating_add(1);
        Ok(())
    }

    /// Log a failure at `stage`
    pub fn log_failure(&mut self, boot_attempt: u32, stage: BootStage, error: Error) -> Result<()> {
        self.record(&BootLogEntry::for_failure(boot_attempt, stage, error))
    }

    /// Get the most recent log entry
    #[must_use]
    pub fn get_latest(&self) -> Option<BootLogEntry> {
        self.get_entry(0)
    }

    /// Get log entry by index (0 = most recent)
    #[must_use]
    pub fn get_entry(&self, index: usize) -> Option<BootLogEntry> {
        if index >= self.entry_count() {
            return None;
        }
        let slot = (self.write_index + MAX_LOG_ENTRIES - 1 - index) % MAX_LOG_ENTRIES;
        BootLogEntry::decode(&self.entries[slot]).ok()
    }

    /// Get total number of failures logged
    #[must_use]
    pub const fn total_failures(&self) -> u32 {
        self.total_entries
    }

    /// Get number of entries currently stored
    #[must_use]
    pub fn entry_count(&self) -> usize {
        (self.total_entries as usize).min(MAX_LOG_ENTRIES)
    }

    /// Export entries, most recent first; returns bytes written
    pub fn export(&self, buffer: &mut [u8]) -> usize {
        let count = self.entry_count().min(buffer.len() / LOG_ENTRY_SIZE);
        for (i, chunk) in buffer.chunks_exact_mut(LOG_ENTRY_SIZE).take(count).enumerate() {
            let slot = (self.write_index + MAX_LOG_ENTRIES - 1 - i) % MAX_LOG_ENTRIES;
            chunk.copy_from_slice(&self.entries[slot]);
        }
        count * LOG_ENTRY_SIZE
    }
}

impl Default for BootLog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_stage_conversion() {
        assert_eq!(BootStage::from(0), BootStage::FsInit);
        assert_eq!(BootStage::from(8), BootStage::Integrity);
        assert_eq!(BootStage::from(200), BootStage::Unknown);
    }

    #[test]
    fn test_error_category_conversion() {
        assert_eq!(ErrorCategory::from(0), ErrorCategory::None);
        assert_eq!(ErrorCategory::from(4), ErrorCategory::Integrity);
        assert_eq!(ErrorCategory::from(200), ErrorCategory::Unknown);
        assert_eq!(ErrorCategory::from(Error::HashMismatch.kind()), ErrorCategory::Integrity);
        assert_eq!(ErrorCategory::from(Error::IssuerMismatch.kind()), ErrorCategory::Trust);
    }

    #[test]
    fn test_entry_encoding() {
        let entry = BootLogEntry::for_failure(3, BootStage::Signature, Error::ImageSignatureInvalid)
            .with_target(Some(Partition::Secondary), ImageType::SpBl2)
            .with_overrides(SecurityOverrides {
                trust_anchor_disabled: false,
                ignore_signatures: true,
            });
        let mut raw = [0u8; LOG_ENTRY_SIZE];
        entry.encode(&mut raw).unwrap();
        assert!(BootLogEntry::is_valid(&raw));
        assert_eq!(BootLogEntry::decode(&raw), Ok(entry));
        assert_eq!(entry.overrides, override_flags::SIGNATURES_IGNORED);

        raw[10] ^= 1;
        assert!(!BootLogEntry::is_valid(&raw));
        assert!(BootLogEntry::decode(&raw).is_err());
    }

    #[test]
    fn test_boot_log_ring() {
        let mut log = BootLog::new();
        assert!(log.get_latest().is_none());

        for attempt in 0..(MAX_LOG_ENTRIES as u32 + 2) {
            log.log_failure(attempt, BootStage::Locate, Error::ImageTooSmall).unwrap();
        }
        assert_eq!(log.total_failures(), MAX_LOG_ENTRIES as u32 + 2);
        assert_eq!(log.entry_count(), MAX_LOG_ENTRIES);
        assert_eq!(log.get_latest().map(|e| e.boot_attempt), Some(MAX_LOG_ENTRIES as u32 + 1));
        assert_eq!(
            log.get_entry(MAX_LOG_ENTRIES - 1).map(|e| e.boot_attempt),
            Some(2)
        );
        assert!(log.get_entry(MAX_LOG_ENTRIES).is_none());
    }

    #[test]
    fn test_export() {
        let mut log = BootLog::new();
        log.log_failure(1, BootStage::FsInit, Error::NoValidPartition).unwrap();
        log.log_failure(2, BootStage::Integrity, Error::HashMismatch).unwrap();

        let mut buffer = [0u8; 3 * LOG_ENTRY_SIZE];
        assert_eq!(log.export(&mut buffer), 2 * LOG_ENTRY_SIZE);
        let first = BootLogEntry::decode(&buffer).unwrap();
        assert_eq!(first.error_code, Error::HashMismatch.code());
        assert_eq!(first.partition, None);

        let mut small = [0u8; LOG_ENTRY_SIZE + 5];
        assert_eq!(log.export(&mut small), LOG_ENTRY_SIZE);
    }
}
