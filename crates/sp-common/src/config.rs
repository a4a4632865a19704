// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Boot configuration
//!
//! Everything here is either fixed at build time or handed down in memory by
//! the prior boot stage. Nothing is read back from flash.

use crate::errors::{Error, Result};
use crate::types::{ImageType, RegionId};

/// Debug relaxations of the security checks
///
/// Both flags come from fuses. Each disabled check is still logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityOverrides {
    /// Hardware trust anchor is disabled: chain validation is skipped and no
    /// keys can be derived
    pub trust_anchor_disabled: bool,
    /// Signature check chicken bit is set
    pub ignore_signatures: bool,
}

impl SecurityOverrides {
    /// All checks enforced
    pub const ENFORCING: Self = Self {
        trust_anchor_disabled: false,
        ignore_signatures: false,
    };

    /// Whether signature and final hash checks are replaced by log lines
    #[must_use]
    pub const fn skip_signatures(&self) -> bool {
        self.trust_anchor_disabled || self.ignore_signatures
    }
}

impl Default for SecurityOverrides {
    fn default() -> Self {
        Self::ENFORCING
    }
}

/// A physical address window that images may be loaded into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadWindow {
    /// First address of the window
    pub base: u64,
    /// Window size in bytes
    pub size: u64,
    /// Bits OR-ed into addresses in this window before writing
    pub remap_or: u64,
}

impl LoadWindow {
    /// Check whether `[start, end)` lies inside this window
    #[must_use]
    pub const fn contains(&self, start: u64, end: u64) -> bool {
        start >= self.base && end - self.base <= self.size
    }
}

/// Cached DDR window, written through its uncached alias
pub const DDR_CACHED: LoadWindow = LoadWindow {
    base: 0x80_0000_0000,
    size: 0x40_0000_0000,
    remap_or: 0x40_0000_0000,
};

/// Uncached DDR window
pub const DDR_UNCACHED: LoadWindow = LoadWindow {
    base: 0xC0_0000_0000,
    size: 0x40_0000_0000,
    remap_or: 0,
};

/// Set of permitted load windows
#[derive(Debug, Clone, Copy)]
pub struct MemoryMap {
    /// Windows in lookup order
    pub windows: &'static [LoadWindow],
}

impl MemoryMap {
    /// DDR only
    pub const DDR: Self = Self {
        windows: &[DDR_CACHED, DDR_UNCACHED],
    };

    /// Validate a destination range and return the address to write through
    ///
    /// The range `[address, address + size)` must be non-empty, must not
    /// overflow and must fit entirely inside one window.
    pub fn resolve(&self, address: u64, size: u64) -> Result<u64> {
        if size == 0 {
            return Err(Error::InvalidLoadAddress);
        }
        let end = address.checked_add(size).ok_or(Error::InvalidLoadAddress)?;
        self.windows
            .iter()
            .find(|w| w.contains(address, end))
            .map(|w| address | w.remap_or)
            .ok_or(Error::InvalidLoadAddress)
    }
}

/// Which regions a partition scan validates
#[derive(Debug, Clone, Copy)]
pub struct ScanPolicy {
    /// Region ids whose records are checked; others are skipped
    pub tracked: &'static [RegionId],
    /// Region that must be present for the partition to stay valid
    pub required: RegionId,
}

impl ScanPolicy {
    /// First-stage loader: only the second-stage image matters
    pub const SP_BL1: Self = Self {
        tracked: &[RegionId::SpBl2],
        required: RegionId::SpBl2,
    };

    /// Check whether records with `id` are validated
    #[must_use]
    pub fn tracks(&self, id: RegionId) -> bool {
        self.tracked.contains(&id) || id == self.required
    }
}

/// Aggregate boot configuration
#[derive(Debug, Clone, Copy)]
pub struct BootConfig {
    /// Image class this stage loads
    pub image: ImageType,
    /// Partition scan policy
    pub scan: ScanPolicy,
    /// Permitted destination windows
    pub memory: MemoryMap,
}

impl BootConfig {
    /// First-stage loader loading SP BL2 into DDR
    pub const DEFAULT: Self = Self {
        image: ImageType::SpBl2,
        scan: ScanPolicy::SP_BL1,
        memory: MemoryMap::DDR,
    };
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_signatures() {
        assert!(!SecurityOverrides::ENFORCING.skip_signatures());
        let chicken = SecurityOverrides {
            ignore_signatures: true,
            ..SecurityOverrides::ENFORCING
        };
        assert!(chicken.skip_signatures());
        let no_anchor = SecurityOverrides {
            trust_anchor_disabled: true,
            ..SecurityOverrides::ENFORCING
        };
        assert!(no_anchor.skip_signatures());
    }

    #[test]
    fn test_cached_ddr_remapped() {
        let map = MemoryMap::DDR;
        assert_eq!(map.resolve(0x80_0000_1000, 0x100), Ok(0xC0_0000_1000));
        assert_eq!(map.resolve(0xC0_0000_1000, 0x100), Ok(0xC0_0000_1000));
    }

    #[test]
    fn test_resolve_rejects() {
        let map = MemoryMap::DDR;
        assert_eq!(map.resolve(0x80_0000_0000, 0), Err(Error::InvalidLoadAddress));
        assert_eq!(map.resolve(0x1000, 0x100), Err(Error::InvalidLoadAddress));
        assert_eq!(map.resolve(u64::MAX, 2), Err(Error::InvalidLoadAddress));
        // Straddles the end of the cached window
        assert_eq!(
            map.resolve(0xBF_FFFF_FF00, 0x200),
            Err(Error::InvalidLoadAddress)
        );
        // Exactly fills the uncached window
        assert!(map.resolve(0xC0_0000_0000, 0x40_0000_0000).is_ok());
    }

    #[test]
    fn test_scan_policy_tracks_required() {
        let policy = ScanPolicy {
            tracked: &[],
            required: RegionId::SpBl2,
        };
        assert!(policy.tracks(RegionId::SpBl2));
        assert!(!policy.tracks(RegionId::DramTraining));
    }
}
