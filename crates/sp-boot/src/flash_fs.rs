// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Redundant Flash Filesystem
//!
//! Maps a logical file onto a region inside one of two redundant partitions.
//!
//! # Flash Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Partition 0 (primary)                     flash_size/2  │
//! │    0x0000  u32 regions_count                             │
//! │    0x0004  RegionInfo[regions_count]   (16 bytes each)   │
//! │    offset * 4096:  FileInfo (16 bytes) + payload         │
//! ├──────────────────────────────────────────────────────────┤
//! │  Partition 1 (secondary)                   flash_size/2  │
//! │    same layout, independent region table                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Recovery
//!
//! Corruption is only recovered at [`FlashFs::init`]: a partition whose
//! table fails the scan is dropped and, if it was active, the other copy
//! takes over. Corruption found later fails that one read.

use heapless::Vec;
use sp_common::codec::{crc32, Reader, Writer};
use sp_common::constants::{
    FILE_INFO_SIZE, FILE_INFO_TAG, FLASH_PAGE_SIZE, MAX_REGIONS, PARTITION_COUNT,
    PARTITION_HEADER_SIZE, REGION_INFO_SIZE,
};
use sp_common::log::LogSink;
use sp_common::{log_error, log_info, log_warn, Error, RegionId, Result, ScanPolicy};
use sp_hal::SpiFlash;

/// Number of region ids a file cache slot exists for
const CACHE_SLOTS: usize = RegionId::ALL.len();

// ============================================================================
// Partition Identification
// ============================================================================

/// Partition identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Partition {
    /// First half of flash
    Primary = 0,
    /// Second half of flash
    Secondary = 1,
}

impl Partition {
    /// Get the other partition
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Partition::Primary => Partition::Secondary,
            Partition::Secondary => Partition::Primary,
        }
    }

    /// Index into the descriptor's partition array
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Flash address of the partition for a device of `flash_size` bytes
    #[must_use]
    pub const fn base(self, flash_size: u32) -> u32 {
        match self {
            Partition::Primary => 0,
            Partition::Secondary => flash_size / 2,
        }
    }
}

impl From<u8> for Partition {
    fn from(value: u8) -> Self {
        match value {
            0 => Partition::Primary,
            _ => Partition::Secondary,
        }
    }
}

// ============================================================================
// On-Flash Records
// ============================================================================

/// Region table record
///
/// Offsets and sizes are in flash pages relative to the partition base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    /// Raw region id (unknown ids are carried but never resolved)
    pub region_id: u32,
    /// First page of the region
    pub region_offset: u32,
    /// Pages reserved for the region
    pub region_reserved_size: u32,
    /// CRC-32 over the three fields above
    pub region_info_checksum: u32,
}

impl RegionInfo {
    /// Build a record with a correct checksum
    #[must_use]
    pub fn new(id: RegionId, offset: u32, reserved_size: u32) -> Self {
        let mut info = Self {
            region_id: id.as_u32(),
            region_offset: offset,
            region_reserved_size: reserved_size,
            region_info_checksum: 0,
        };
        info.region_info_checksum = info.compute_checksum();
        info
    }

    fn prefix(&self) -> [u8; REGION_INFO_SIZE - 4] {
        let mut out = [0u8; REGION_INFO_SIZE - 4];
        out[0..4].copy_from_slice(&self.region_id.to_le_bytes());
        out[4..8].copy_from_slice(&self.region_offset.to_le_bytes());
        out[8..12].copy_from_slice(&self.region_reserved_size.to_le_bytes());
        out
    }

    /// CRC-32 over every field preceding the checksum
    #[must_use]
    pub fn compute_checksum(&self) -> u32 {
        crc32(&self.prefix())
    }

    /// Decode a record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Ok(Self {
            region_id: r.u32()?,
            region_offset: r.u32()?,
            region_reserved_size: r.u32()?,
            region_info_checksum: r.u32()?,
        })
    }

    /// Encode a record
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let mut w = Writer::new(out);
        w.bytes(&self.prefix())?;
        w.u32(self.region_info_checksum)
    }

    /// Check the checksum and that the region lies inside a partition of
    /// `partition_pages` pages
    pub fn validate(&self, partition_pages: u32) -> Result<()> {
        if self.compute_checksum() != self.region_info_checksum {
            return Err(Error::RegionChecksumMismatch);
        }
        // Page 0 holds the region table
        if self.region_offset == 0 || self.region_offset >= partition_pages {
            return Err(Error::RegionOffsetInvalid);
        }
        if self.region_reserved_size == 0 {
            return Err(Error::RegionSizeInvalid);
        }
        let end = self
            .region_offset
            .checked_add(self.region_reserved_size)
            .ok_or(Error::RegionOutOfBounds)?;
        if end > partition_pages {
            return Err(Error::RegionOutOfBounds);
        }
        Ok(())
    }
}

/// Header in front of every file payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileInfo {
    /// Must equal [`FILE_INFO_TAG`]
    pub tag: u32,
    /// Must equal the encoded size of this header
    pub header_size: u32,
    /// Payload bytes following the header
    pub payload_size: u32,
    /// CRC-32 over the three fields above
    pub header_crc: u32,
}

impl FileInfo {
    /// Unloaded cache slot
    pub const EMPTY: Self = Self {
        tag: 0,
        header_size: 0,
        payload_size: 0,
        header_crc: 0,
    };

    /// Build a header with a correct checksum
    #[must_use]
    pub fn new(payload_size: u32) -> Self {
        let mut info = Self {
            tag: FILE_INFO_TAG,
            header_size: FILE_INFO_SIZE as u32,
            payload_size,
            header_crc: 0,
        };
        info.header_crc = info.compute_checksum();
        info
    }

    fn prefix(&self) -> [u8; FILE_INFO_SIZE - 4] {
        let mut out = [0u8; FILE_INFO_SIZE - 4];
        out[0..4].copy_from_slice(&self.tag.to_le_bytes());
        out[4..8].copy_from_slice(&self.header_size.to_le_bytes());
        out[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        out
    }

    /// CRC-32 over every field preceding the checksum
    #[must_use]
    pub fn compute_checksum(&self) -> u32 {
        crc32(&self.prefix())
    }

    /// Check whether this cache slot has been loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Decode a header
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Ok(Self {
            tag: r.u32()?,
            header_size: r.u32()?,
            payload_size: r.u32()?,
            header_crc: r.u32()?,
        })
    }

    /// Encode a header
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let mut w = Writer::new(out);
        w.bytes(&self.prefix())?;
        w.u32(self.header_crc)
    }

    /// Validate against a region of `region_size` bytes
    ///
    /// Checks run in order: tag, header size, checksum, payload fit.
    pub fn validate(&self, region_size: u32) -> Result<()> {
        if self.tag != FILE_INFO_TAG {
            return Err(Error::FileTagInvalid);
        }
        if self.header_size as usize != FILE_INFO_SIZE {
            return Err(Error::FileHeaderSizeInvalid);
        }
        if self.compute_checksum() != self.header_crc {
            return Err(Error::FileChecksumMismatch);
        }
        let capacity = region_size
            .checked_sub(self.header_size)
            .ok_or(Error::FileSizeInvalid)?;
        if self.payload_size > capacity {
            return Err(Error::FileSizeInvalid);
        }
        Ok(())
    }
}

// ============================================================================
// Partition State
// ============================================================================

/// Region table of one partition plus its scan result
#[derive(Debug, Clone, Default)]
pub struct PartitionInfo {
    /// Records in table order
    pub regions: Vec<RegionInfo, MAX_REGIONS>,
    /// Resolved table index per region id
    resolved: [Option<u8>; CACHE_SLOTS],
    /// Whether the partition may be used
    pub valid: bool,
}

impl PartitionInfo {
    /// Partition with an unreadable or missing table
    #[must_use]
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Partition holding `regions`, pending a scan
    pub fn new(regions: &[RegionInfo]) -> Result<Self> {
        let regions = Vec::from_slice(regions).map_err(|()| Error::RegionTableInvalid)?;
        Ok(Self {
            regions,
            resolved: [None; CACHE_SLOTS],
            valid: true,
        })
    }

    /// Read a partition's region table at `base`
    pub fn read<F: SpiFlash>(flash: &F, base: u32) -> Result<Self> {
        let count = flash.read_u32(base)? as usize;
        if count > MAX_REGIONS {
            return Err(Error::RegionTableInvalid);
        }
        let mut regions: Vec<RegionInfo, MAX_REGIONS> = Vec::new();
        let mut record = [0u8; REGION_INFO_SIZE];
        for i in 0..count {
            let address = base
                .checked_add((PARTITION_HEADER_SIZE + i * REGION_INFO_SIZE) as u32)
                .ok_or(Error::RegionTableInvalid)?;
            flash.read(address, &mut record)?;
            regions
                .push(RegionInfo::decode(&record)?)
                .map_err(|_| Error::RegionTableInvalid)?;
        }
        Self::new(&regions)
    }

    /// Validate tracked records and resolve region ids
    ///
    /// Untracked and unknown ids are skipped. When an id occurs more than
    /// once the last record wins.
    pub fn scan(&mut self, policy: &ScanPolicy, partition_pages: u32) -> Result<()> {
        self.resolved = [None; CACHE_SLOTS];
        for (index, region) in self.regions.iter().enumerate() {
            let Some(id) = RegionId::from_u32(region.region_id) else {
                continue;
            };
            if !policy.tracks(id) {
                continue;
            }
            region.validate(partition_pages)?;
            self.resolved[id.index()] = Some(index as u8);
        }
        if self.resolved[policy.required.index()].is_none() {
            return Err(Error::RegionNotFound);
        }
        Ok(())
    }

    /// Resolved record for `id`
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&RegionInfo> {
        self.resolved[id.index()].and_then(|i| self.regions.get(usize::from(i)))
    }
}

/// Filesystem descriptor handed down by the prior boot stage
#[derive(Debug, Clone)]
pub struct FlashFsDescriptor {
    /// Total flash size in bytes
    pub flash_size: u32,
    /// Partition to read files from
    pub active_partition: Partition,
    /// Whether the non-active partition is a usable fallback
    pub other_partition_valid: bool,
    /// Both partitions
    pub partitions: [PartitionInfo; PARTITION_COUNT],
}

impl FlashFsDescriptor {
    /// Build a descriptor by reading both region tables from flash
    ///
    /// A table that cannot be read or holds too many records leaves its
    /// partition invalid.
    #[must_use]
    pub fn from_flash<F: SpiFlash>(flash: &F, active: Partition) -> Self {
        let flash_size = flash.size();
        let read = |p: Partition| {
            PartitionInfo::read(flash, p.base(flash_size)).unwrap_or_else(|_| PartitionInfo::invalid())
        };
        let partitions = [read(Partition::Primary), read(Partition::Secondary)];
        let other_partition_valid = partitions[active.other().index()].valid;
        Self {
            flash_size,
            active_partition: active,
            other_partition_valid,
            partitions,
        }
    }

    /// Size of one partition in bytes
    #[must_use]
    pub const fn partition_size(&self) -> u32 {
        self.flash_size / 2
    }

    /// Active partition state
    #[must_use]
    pub fn active(&self) -> &PartitionInfo {
        &self.partitions[self.active_partition.index()]
    }

    /// Rescan both partitions and settle the active one
    fn recover<L: LogSink>(&mut self, policy: &ScanPolicy, log: &mut L) -> Result<()> {
        let pages = self.partition_size() / FLASH_PAGE_SIZE;
        for partition in [Partition::Primary, Partition::Secondary] {
            let info = &mut self.partitions[partition.index()];
            if !info.valid {
                continue;
            }
            if let Err(e) = info.scan(policy, pages) {
                log_warn!(log, "flash_fs", "partition {} invalid: {}", partition.index(), e);
                info.valid = false;
                if self.other_partition_valid && self.active_partition == partition {
                    self.active_partition = partition.other();
                    log_warn!(log, "flash_fs", "failing over to partition {}", partition.other().index());
                }
                self.other_partition_valid = false;
            }
        }

        if !self.active().valid {
            log_error!(log, "flash_fs", "no valid partition");
            return Err(Error::NoValidPartition);
        }
        Ok(())
    }
}

// ============================================================================
// Filesystem Context
// ============================================================================

/// Filesystem handle used by the loader
///
/// Holds the validated descriptor and one memoized [`FileInfo`] per region
/// id. A handle is built once per boot; nothing here is re-entrant.
pub struct FlashFs<'f, F: SpiFlash> {
    flash: &'f F,
    descriptor: Option<FlashFsDescriptor>,
    file_cache: [FileInfo; CACHE_SLOTS],
}

impl<'f, F: SpiFlash> FlashFs<'f, F> {
    /// Create an uninitialized filesystem over `flash`
    #[must_use]
    pub fn new(flash: &'f F) -> Self {
        Self {
            flash,
            descriptor: None,
            file_cache: [FileInfo::EMPTY; CACHE_SLOTS],
        }
    }

    /// Validate `descriptor` and make it current
    ///
    /// Returns the partition files will be read from. On failure the
    /// filesystem stays uninitialized.
    pub fn init<L: LogSink>(
        &mut self,
        descriptor: FlashFsDescriptor,
        policy: &ScanPolicy,
        log: &mut L,
    ) -> Result<Partition> {
        self.descriptor = None;
        self.file_cache = [FileInfo::EMPTY; CACHE_SLOTS];

        if descriptor.flash_size < 2 * FLASH_PAGE_SIZE {
            return Err(Error::InvalidParameter);
        }
        let mut descriptor = descriptor;
        descriptor.recover(policy, log)?;

        let active = descriptor.active_partition;
        log_info!(log, "flash_fs", "using partition {}", active.index());
        self.descriptor = Some(descriptor);
        Ok(active)
    }

    /// Validated descriptor, if initialized
    #[must_use]
    pub fn descriptor(&self) -> Option<&FlashFsDescriptor> {
        self.descriptor.as_ref()
    }

    /// Partition files are read from, if initialized
    #[must_use]
    pub fn active_partition(&self) -> Option<Partition> {
        self.descriptor.as_ref().map(|d| d.active_partition)
    }

    /// Payload size of the file in region `id`
    pub fn get_file_size(&mut self, id: RegionId) -> Result<u32> {
        self.load_file_info(id).map(|(info, _)| info.payload_size)
    }

    /// Read `buffer.len()` payload bytes starting at `offset`
    ///
    /// On failure `buffer` is zeroed.
    pub fn read_file(&mut self, id: RegionId, offset: u32, buffer: &mut [u8]) -> Result<()> {
        let result = self.read_checked(id, offset, buffer);
        if result.is_err() {
            buffer.fill(0);
        }
        result
    }

    fn read_checked(&mut self, id: RegionId, offset: u32, buffer: &mut [u8]) -> Result<()> {
        if buffer.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let (info, data_address) = self.load_file_info(id)?;
        if offset >= info.payload_size {
            return Err(Error::ReadOutOfRange);
        }
        let len = u32::try_from(buffer.len()).map_err(|_| Error::ReadOutOfRange)?;
        let end = offset.checked_add(len).ok_or(Error::ReadOutOfRange)?;
        if end > info.payload_size {
            return Err(Error::ReadOutOfRange);
        }
        let address = data_address
            .checked_add(offset)
            .ok_or(Error::ReadOutOfRange)?;
        self.flash.read(address, buffer)?;
        Ok(())
    }

    /// Resolve region `id`, load its header once, and return the header
    /// with the flash address of the payload
    fn load_file_info(&mut self, id: RegionId) -> Result<(FileInfo, u32)> {
        let descriptor = self
            .descriptor
            .as_ref()
            .ok_or(Error::FilesystemNotInitialized)?;
        let region = descriptor.active().region(id).ok_or(Error::RegionNotFound)?;
        let partition_base = descriptor
            .active_partition
            .base(descriptor.flash_size);

        let region_address = region
            .region_offset
            .checked_mul(FLASH_PAGE_SIZE)
            .and_then(|o| o.checked_add(partition_base))
            .ok_or(Error::RegionOutOfBounds)?;
        let region_size = region
            .region_reserved_size
            .checked_mul(FLASH_PAGE_SIZE)
            .ok_or(Error::RegionOutOfBounds)?;

        let slot = &mut self.file_cache[id.index()];
        if slot.is_empty() {
            let mut raw = [0u8; FILE_INFO_SIZE];
            self.flash.read(region_address, &mut raw)?;
            *slot = FileInfo::decode(&raw)?;
        }
        if let Err(e) = slot.validate(region_size) {
            *slot = FileInfo::EMPTY;
            return Err(e);
        }

        let data_address = region_address
            .checked_add(FILE_INFO_SIZE as u32)
            .ok_or(Error::RegionOutOfBounds)?;
        Ok((*slot, data_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_common::log::LogBuffer;
    use sp_hal::MemFlash;

    const FLASH_SIZE: usize = 16 * FLASH_PAGE_SIZE as usize;

    fn write_table(flash: &mut [u8], base: usize, regions: &[RegionInfo]) {
        flash[base..base + 4].copy_from_slice(&(regions.len() as u32).to_le_bytes());
        for (i, r) in regions.iter().enumerate() {
            let at = base + PARTITION_HEADER_SIZE + i * REGION_INFO_SIZE;
            r.encode(&mut flash[at..at + REGION_INFO_SIZE]).unwrap();
        }
    }

    fn write_file(flash: &mut [u8], at: usize, payload: &[u8]) {
        FileInfo::new(payload.len() as u32)
            .encode(&mut flash[at..at + FILE_INFO_SIZE])
            .unwrap();
        flash[at + FILE_INFO_SIZE..at + FILE_INFO_SIZE + payload.len()].copy_from_slice(payload);
    }

    #[test]
    fn test_region_validate() {
        let r = RegionInfo::new(RegionId::SpBl2, 1, 4);
        assert!(r.validate(8).is_ok());
        assert_eq!(RegionInfo::new(RegionId::SpBl2, 0, 4).validate(8), Err(Error::RegionOffsetInvalid));
        assert_eq!(RegionInfo::new(RegionId::SpBl2, 8, 1).validate(8), Err(Error::RegionOffsetInvalid));
        assert_eq!(RegionInfo::new(RegionId::SpBl2, 1, 0).validate(8), Err(Error::RegionSizeInvalid));
        assert_eq!(RegionInfo::new(RegionId::SpBl2, 5, 4).validate(8), Err(Error::RegionOutOfBounds));
        assert_eq!(
            RegionInfo::new(RegionId::SpBl2, 1, u32::MAX).validate(8),
            Err(Error::RegionOutOfBounds)
        );

        let mut bad = r;
        bad.region_reserved_size = 3;
        assert_eq!(bad.validate(8), Err(Error::RegionChecksumMismatch));
    }

    #[test]
    fn test_file_info_validate_order() {
        let good = FileInfo::new(100);
        assert!(good.validate(FLASH_PAGE_SIZE).is_ok());

        let mut wrong_tag = good;
        wrong_tag.tag = 0;
        wrong_tag.header_size = 0;
        assert_eq!(wrong_tag.validate(FLASH_PAGE_SIZE), Err(Error::FileTagInvalid));

        let mut wrong_size = good;
        wrong_size.header_size = 20;
        assert_eq!(wrong_size.validate(FLASH_PAGE_SIZE), Err(Error::FileHeaderSizeInvalid));

        let mut wrong_crc = good;
        wrong_crc.payload_size = 101;
        assert_eq!(wrong_crc.validate(FLASH_PAGE_SIZE), Err(Error::FileChecksumMismatch));

        assert_eq!(FileInfo::new(FLASH_PAGE_SIZE - 15).validate(FLASH_PAGE_SIZE), Err(Error::FileSizeInvalid));
        assert!(FileInfo::new(FLASH_PAGE_SIZE - 16).validate(FLASH_PAGE_SIZE).is_ok());
    }

    #[test]
    fn test_scan_last_entry_wins_and_skips_unknown() {
        let mut stale = RegionInfo::new(RegionId::SpBl2, 1, 1);
        stale.region_info_checksum ^= 1;
        let unknown = RegionInfo {
            region_id: 0x99,
            region_offset: 0,
            region_reserved_size: 0,
            region_info_checksum: 0,
        };
        let untracked = RegionInfo::new(RegionId::DramTraining, 0, 0);
        let good = RegionInfo::new(RegionId::SpBl2, 2, 2);

        // Corrupt tracked record fails the scan even if superseded
        let mut p = PartitionInfo::new(&[stale, good]).unwrap();
        assert_eq!(p.scan(&ScanPolicy::SP_BL1, 8), Err(Error::RegionChecksumMismatch));

        let first = RegionInfo::new(RegionId::SpBl2, 1, 1);
        let mut p = PartitionInfo::new(&[unknown, first, untracked, good]).unwrap();
        assert!(p.scan(&ScanPolicy::SP_BL1, 8).is_ok());
        assert_eq!(p.region(RegionId::SpBl2), Some(&good));
        assert_eq!(p.region(RegionId::DramTraining), None);
    }

    #[test]
    fn test_scan_requires_region() {
        let mut p = PartitionInfo::new(&[RegionInfo::new(RegionId::BootCounters, 1, 1)]).unwrap();
        assert_eq!(p.scan(&ScanPolicy::SP_BL1, 8), Err(Error::RegionNotFound));
    }

    #[test]
    fn test_table_too_large() {
        let regions = [RegionInfo::new(RegionId::SpBl2, 1, 1); MAX_REGIONS + 1];
        assert_eq!(PartitionInfo::new(&regions).err(), Some(Error::RegionTableInvalid));

        let mut flash = [0u8; FLASH_SIZE];
        flash[0..4].copy_from_slice(&(MAX_REGIONS as u32 + 1).to_le_bytes());
        let d = FlashFsDescriptor::from_flash(&MemFlash::new(&flash), Partition::Primary);
        assert!(!d.partitions[0].valid);
    }

    #[test]
    fn test_read_file_cached_header() {
        let mut flash = [0u8; FLASH_SIZE];
        write_table(&mut flash, 0, &[RegionInfo::new(RegionId::SpBl2, 1, 2)]);
        write_file(&mut flash, FLASH_PAGE_SIZE as usize, b"payload");

        let dev = MemFlash::new(&flash);
        let mut log = LogBuffer::new();
        let mut fs = FlashFs::new(&dev);
        assert_eq!(fs.get_file_size(RegionId::SpBl2), Err(Error::FilesystemNotInitialized));

        let d = FlashFsDescriptor::from_flash(&dev, Partition::Primary);
        assert_eq!(fs.init(d, &ScanPolicy::SP_BL1, &mut log), Ok(Partition::Primary));
        assert_eq!(fs.get_file_size(RegionId::SpBl2), Ok(7));
        assert!(!fs.file_cache[RegionId::SpBl2.index()].is_empty());

        let mut buf = [0u8; 4];
        fs.read_file(RegionId::SpBl2, 3, &mut buf).unwrap();
        assert_eq!(&buf, b"load");
        assert_eq!(fs.get_file_size(RegionId::SpBl1), Err(Error::RegionNotFound));
    }

    #[test]
    fn test_corrupt_file_info_fails_read_only() {
        let mut flash = [0u8; FLASH_SIZE];
        write_table(&mut flash, 0, &[RegionInfo::new(RegionId::SpBl2, 1, 2)]);
        write_file(&mut flash, FLASH_PAGE_SIZE as usize, b"payload!");
        flash[FLASH_PAGE_SIZE as usize] ^= 0x01;

        let dev = MemFlash::new(&flash);
        let mut fs = FlashFs::new(&dev);
        let d = FlashFsDescriptor::from_flash(&dev, Partition::Primary);
        assert_eq!(fs.init(d, &ScanPolicy::SP_BL1, &mut LogBuffer::new()), Ok(Partition::Primary));

        for _ in 0..2 {
            let mut buf = [0xAAu8; 8];
            assert_eq!(fs.read_file(RegionId::SpBl2, 0, &mut buf), Err(Error::FileTagInvalid));
            assert_eq!(buf, [0u8; 8]);
            assert!(fs.file_cache[RegionId::SpBl2.index()].is_empty());
        }
        assert_eq!(fs.active_partition(), Some(Partition::Primary));
        assert_eq!(fs.get_file_size(RegionId::SpBl2), Err(Error::FileTagInvalid));
    }

    #[test]
    fn test_stale_cached_header_is_reloaded() {
        let mut flash = [0u8; FLASH_SIZE];
        write_table(&mut flash, 0, &[RegionInfo::new(RegionId::SpBl2, 1, 2)]);
        write_file(&mut flash, FLASH_PAGE_SIZE as usize, b"payload");

        let dev = MemFlash::new(&flash);
        let mut fs = FlashFs::new(&dev);
        let d = FlashFsDescriptor::from_flash(&dev, Partition::Primary);
        fs.init(d, &ScanPolicy::SP_BL1, &mut LogBuffer::new()).unwrap();

        let mut stale = FileInfo::new(7);
        stale.payload_size = 3;
        fs.file_cache[RegionId::SpBl2.index()] = stale;

        let mut buf = [0xAAu8; 2];
        assert_eq!(fs.read_file(RegionId::SpBl2, 0, &mut buf), Err(Error::FileChecksumMismatch));
        assert_eq!(buf, [0u8; 2]);
        assert!(fs.file_cache[RegionId::SpBl2.index()].is_empty());

        fs.read_file(RegionId::SpBl2, 0, &mut buf).unwrap();
        assert_eq!(&buf, b"pa");
    }

    #[test]
    fn test_clean_init_keeps_fallback() {
        let mut flash = [0u8; FLASH_SIZE];
        let half = FLASH_SIZE / 2;
        for base in [0, half] {
            write_table(&mut flash, base, &[RegionInfo::new(RegionId::SpBl2, 1, 2)]);
            write_file(&mut flash, base + FLASH_PAGE_SIZE as usize, b"payload");
        }

        let dev = MemFlash::new(&flash);
        let mut fs = FlashFs::new(&dev);
        let d = FlashFsDescriptor::from_flash(&dev, Partition::Primary);
        assert!(d.other_partition_valid);
        assert_eq!(fs.init(d, &ScanPolicy::SP_BL1, &mut LogBuffer::new()), Ok(Partition::Primary));

        let d = fs.descriptor().unwrap();
        assert!(d.partitions[0].valid);
        assert!(d.partitions[1].valid);
        assert!(d.other_partition_valid);
    }

    #[test]
    fn test_failed_fallback_clears_flag() {
        let mut flash = [0u8; FLASH_SIZE];
        let half = FLASH_SIZE / 2;
        write_table(&mut flash, 0, &[RegionInfo::new(RegionId::SpBl2, 1, 2)]);
        write_file(&mut flash, FLASH_PAGE_SIZE as usize, b"payload");
        let mut bad = RegionInfo::new(RegionId::SpBl2, 1, 2);
        bad.region_info_checksum ^= 1;
        write_table(&mut flash, half, &[bad]);

        let dev = MemFlash::new(&flash);
        let mut fs = FlashFs::new(&dev);
        let d = FlashFsDescriptor::from_flash(&dev, Partition::Primary);
        assert!(d.other_partition_valid);
        assert_eq!(fs.init(d, &ScanPolicy::SP_BL1, &mut LogBuffer::new()), Ok(Partition::Primary));

        let d = fs.descriptor().unwrap();
        assert!(!d.partitions[1].valid);
        assert!(!d.other_partition_valid);
    }

    #[test]
    fn test_partition_other() {
        assert_eq!(Partition::Primary.other(), Partition::Secondary);
        assert_eq!(Partition::from(1), Partition::Secondary);
        assert_eq!(Partition::Secondary.base(0x2_0000), 0x1_0000);
    }
}
