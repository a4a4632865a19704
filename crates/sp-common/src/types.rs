// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Algorithm, region and image identifiers
//!
//! Every identifier here is stored on flash as a little-endian `u32`. Raw
//! values that do not name a known variant decode to `None`; callers turn
//! that into the format error appropriate for the field.

use core::fmt;

/// Hash algorithm identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256 = 1,
    /// SHA-384
    Sha384 = 2,
    /// SHA-512
    Sha512 = 3,
}

impl HashAlgorithm {
    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Sha256),
            2 => Some(Self::Sha384),
            3 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Digest length in bytes
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Get the algorithm name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asymmetric key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KeyType {
    /// Elliptic curve key
    Ec = 1,
    /// RSA key
    Rsa = 2,
}

impl KeyType {
    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Ec),
            2 => Some(Self::Rsa),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Elliptic curve identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EcCurve {
    /// NIST P-256
    P256 = 1,
    /// NIST P-384
    P384 = 2,
    /// NIST P-521
    P521 = 3,
}

impl EcCurve {
    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::P256),
            2 => Some(Self::P384),
            3 => Some(Self::P521),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size of a field element or scalar in bytes
    #[must_use]
    pub const fn coordinate_size(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

/// RSA modulus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RsaKeySize {
    /// 2048-bit modulus
    Rsa2048 = 2048,
    /// 3072-bit modulus
    Rsa3072 = 3072,
    /// 4096-bit modulus
    Rsa4096 = 4096,
}

impl RsaKeySize {
    /// Decode from the raw on-flash value (modulus size in bits)
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            2048 => Some(Self::Rsa2048),
            3072 => Some(Self::Rsa3072),
            4096 => Some(Self::Rsa4096),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Modulus (and signature) size in bytes
    #[must_use]
    pub const fn modulus_size(self) -> usize {
        (self as usize) / 8
    }
}

/// MAC algorithm used to authenticate an encrypted image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MacAlgorithm {
    /// HMAC-SHA-256
    HmacSha256 = 1,
    /// HMAC-SHA-384
    HmacSha384 = 2,
    /// HMAC-SHA-512
    HmacSha512 = 3,
    /// AES-CMAC
    AesCmac = 4,
}

impl MacAlgorithm {
    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::HmacSha256),
            2 => Some(Self::HmacSha384),
            3 => Some(Self::HmacSha512),
            4 => Some(Self::AesCmac),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Tag length in bytes
    #[must_use]
    pub const fn tag_len(self) -> usize {
        match self {
            Self::HmacSha256 => 32,
            Self::HmacSha384 => 48,
            Self::HmacSha512 => 64,
            Self::AesCmac => 16,
        }
    }

    /// Length of the key derived for this MAC in bytes
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::HmacSha256 | Self::AesCmac => 32,
            Self::HmacSha384 => 48,
            Self::HmacSha512 => 64,
        }
    }
}

/// Flash region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RegionId {
    /// Partition priority designator
    PriorityDesignator = 1,
    /// Boot attempt counters
    BootCounters = 2,
    /// Board configuration data
    ConfigurationData = 3,
    /// Security engine firmware
    SecurityFirmware = 4,
    /// Service processor root and issuing certificates
    SpCertificates = 5,
    /// Service processor first-stage loader
    SpBl1 = 6,
    /// Service processor second-stage loader
    SpBl2 = 7,
    /// DRAM training data
    DramTraining = 8,
    /// Software root and issuing certificates
    SwCertificates = 9,
    /// Machine minion firmware
    MachineMinion = 10,
    /// Master minion firmware
    MasterMinion = 11,
    /// Worker minion firmware
    WorkerMinion = 12,
    /// Maxion first-stage loader
    MaxionBl1 = 13,
}

impl RegionId {
    /// Every known region, in id order
    pub const ALL: [Self; 13] = [
        Self::PriorityDesignator,
        Self::BootCounters,
        Self::ConfigurationData,
        Self::SecurityFirmware,
        Self::SpCertificates,
        Self::SpBl1,
        Self::SpBl2,
        Self::DramTraining,
        Self::SwCertificates,
        Self::MachineMinion,
        Self::MasterMinion,
        Self::WorkerMinion,
        Self::MaxionBl1,
    ];

    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::PriorityDesignator),
            2 => Some(Self::BootCounters),
            3 => Some(Self::ConfigurationData),
            4 => Some(Self::SecurityFirmware),
            5 => Some(Self::SpCertificates),
            6 => Some(Self::SpBl1),
            7 => Some(Self::SpBl2),
            8 => Some(Self::DramTraining),
            9 => Some(Self::SwCertificates),
            10 => Some(Self::MachineMinion),
            11 => Some(Self::MasterMinion),
            12 => Some(Self::WorkerMinion),
            13 => Some(Self::MaxionBl1),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Dense index into per-region tables
    #[must_use]
    pub const fn index(self) -> usize {
        (self as usize) - 1
    }
}

/// Firmware image type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ImageType {
    /// Service processor first-stage loader
    SpBl1 = 1,
    /// Service processor second-stage loader
    SpBl2 = 2,
    /// Machine minion firmware
    MachineMinion = 3,
    /// Master minion firmware
    MasterMinion = 4,
    /// Worker minion firmware
    WorkerMinion = 5,
    /// Maxion first-stage loader
    MaxionBl1 = 6,
}

impl ImageType {
    /// Decode from the raw on-flash value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::SpBl1),
            2 => Some(Self::SpBl2),
            3 => Some(Self::MachineMinion),
            4 => Some(Self::MasterMinion),
            5 => Some(Self::WorkerMinion),
            6 => Some(Self::MaxionBl1),
            _ => None,
        }
    }

    /// Raw on-flash value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Get the image type name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpBl1 => "SP BL1",
            Self::SpBl2 => "SP BL2",
            Self::MachineMinion => "MACHINE MINION",
            Self::MasterMinion => "MASTER MINION",
            Self::WorkerMinion => "WORKER MINION",
            Self::MaxionBl1 => "MAXION BL1",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Certificate designation flags
///
/// A CA certificate authorizes an image class only if its designation
/// carries the corresponding bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Designation(u32);

impl Designation {
    /// No designation
    pub const NONE: Self = Self(0);
    /// Root CA
    pub const ROOT_CA: Self = Self(1 << 0);
    /// Issuing CA
    pub const ISSUING_CA: Self = Self(1 << 1);
    /// May sign SP BL1 images
    pub const BL1_CA: Self = Self(1 << 2);
    /// May sign SP BL2 images
    pub const BL2_CA: Self = Self(1 << 3);
    /// May sign machine minion images
    pub const MACHINE_MINION_CA: Self = Self(1 << 4);
    /// May sign master minion images
    pub const MASTER_MINION_CA: Self = Self(1 << 5);
    /// May sign worker minion images
    pub const WORKER_MINION_CA: Self = Self(1 << 6);
    /// May sign Maxion BL1 images
    pub const MAXION_BL1_CA: Self = Self(1 << 7);

    /// Create from raw bits
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check that every bit in `required` is set
    #[must_use]
    pub const fn contains(self, required: Self) -> bool {
        (self.0 & required.0) == required.0
    }

    /// Union of two flag sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for Designation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Designation({:#010x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_round_trip() {
        for id in RegionId::ALL {
            assert_eq!(RegionId::from_u32(id.as_u32()), Some(id));
        }
        assert_eq!(RegionId::from_u32(0), None);
        assert_eq!(RegionId::from_u32(0xFFFF_FFFF), None);
    }

    #[test]
    fn test_region_index_dense() {
        for (i, id) in RegionId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_designation_contains() {
        let ca = Designation::ISSUING_CA | Designation::BL2_CA;
        assert!(ca.contains(Designation::BL2_CA));
        assert!(ca.contains(Designation::NONE));
        assert!(!ca.contains(Designation::BL1_CA));
        assert!(!ca.contains(Designation::BL2_CA | Designation::ROOT_CA));
    }

    #[test]
    fn test_sizes() {
        assert_eq!(HashAlgorithm::Sha384.digest_len(), 48);
        assert_eq!(EcCurve::P521.coordinate_size(), 66);
        assert_eq!(RsaKeySize::Rsa4096.modulus_size(), 512);
        assert_eq!(MacAlgorithm::AesCmac.tag_len(), 16);
        assert_eq!(MacAlgorithm::from_u32(0), None);
    }
}
