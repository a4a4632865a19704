// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Boot chain constants
//!
//! Tags, capacities and encoded record sizes. All on-flash records are
//! little-endian.

// =============================================================================
// Flash Layout
// =============================================================================

/// Flash page size in bytes; region offsets and sizes count pages
pub const FLASH_PAGE_SIZE: u32 = 4096;

/// Number of redundant partitions
pub const PARTITION_COUNT: usize = 2;

/// Maximum number of region records in a partition table
pub const MAX_REGIONS: usize = 16;

/// Encoded size of the partition table count field
pub const PARTITION_HEADER_SIZE: usize = 4;

/// Encoded size of a region record
pub const REGION_INFO_SIZE: usize = 16;

/// File header tag ("FILE" little-endian)
pub const FILE_INFO_TAG: u32 = 0x454C_4946;

/// Encoded size of a file header
pub const FILE_INFO_SIZE: usize = 16;

// =============================================================================
// Certificates
// =============================================================================

/// Certificate header tag ("CERT")
pub const CERTIFICATE_HEADER_TAG: u32 = 0x5452_4543;

/// Supported certificate version tag
pub const CERTIFICATE_VERSION_TAG: u32 = 0x0001_0000;

/// Capacity of the long name fields
pub const NAME_FIELD_CAPACITY: usize = 64;

/// Capacity of the serial number name field
pub const SERIAL_NUMBER_CAPACITY: usize = 32;

/// Key identifier length (SHA-1 sized)
pub const KEY_IDENTIFIER_SIZE: usize = 20;

/// Capacity of an EC coordinate or scalar
pub const EC_COORDINATE_CAPACITY: usize = 66;

/// Capacity of an RSA modulus or signature
pub const RSA_MODULUS_CAPACITY: usize = 512;

/// Capacity of an RSA public exponent
pub const RSA_EXPONENT_CAPACITY: usize = 4;

/// Size of the algorithm-specific key or signature body
pub const KEY_BODY_SIZE: usize = 528;

/// Encoded size of a name sequence
pub const NAME_SEQUENCE_SIZE: usize = 376;

/// Encoded size of a public key
pub const PUBLIC_KEY_SIZE: usize = 532;

/// Encoded size of a signature
pub const SIGNATURE_SIZE: usize = 536;

/// Encoded size of the signed certificate info
pub const CERTIFICATE_INFO_SIZE: usize = 1352;

/// Encoded size of a certificate (info plus signature)
pub const CERTIFICATE_SIZE: usize = CERTIFICATE_INFO_SIZE + SIGNATURE_SIZE;

// =============================================================================
// Firmware Images
// =============================================================================

/// Image file header tag ("IMGF")
pub const IMAGE_FILE_HEADER_TAG: u32 = 0x4647_4D49;

/// Image info header tag ("INFO")
pub const IMAGE_INFO_HEADER_TAG: u32 = 0x4F46_4E49;

/// Encryption IV size
pub const IV_SIZE: usize = 16;

/// Capacity of a hash or MAC value
pub const HASH_CAPACITY: usize = 64;

/// Maximum number of load regions per image
pub const MAX_LOAD_REGIONS: usize = 8;

/// Encoded size of a load region
pub const LOAD_REGION_SIZE: usize = 24;

/// Encoded size of the public image info
pub const PUBLIC_INFO_SIZE: usize = 80;

/// Encoded size of the secret image info
pub const SECRET_INFO_SIZE: usize = 16 + MAX_LOAD_REGIONS * LOAD_REGION_SIZE;

/// Encoded size of the signed image info
pub const IMAGE_INFO_SIZE: usize = PUBLIC_INFO_SIZE + SECRET_INFO_SIZE;

/// Encoded size of the MAC-covered header info
pub const IMAGE_HEADER_INFO_SIZE: usize =
    12 + IV_SIZE + CERTIFICATE_SIZE + IMAGE_INFO_SIZE + SIGNATURE_SIZE + HASH_CAPACITY;

/// Encoded size of an image file header
pub const IMAGE_FILE_HEADER_SIZE: usize = IMAGE_HEADER_INFO_SIZE + HASH_CAPACITY;

/// Maximum digest size (SHA-512)
pub const MAX_DIGEST_SIZE: usize = 64;
