// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for the service processor boot chain
//!
//! This module defines the unified error type used throughout the boot
//! pipeline. Every variant belongs to exactly one [`ErrorKind`], so callers
//! can match on the broad failure class (storage, format, trust, crypto
//! integrity) while diagnostics still see the precise cause.

use core::fmt;

/// Result type alias for boot chain operations
pub type Result<T> = core::result::Result<T, Error>;

/// Broad failure class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// Bad checksum, out-of-range offset or size, overflow in region
    /// arithmetic, or an I/O failure. Recoverable only by partition failover
    /// at filesystem init.
    StorageCorruption = 1,
    /// Wrong tag, wrong size, malformed lengths. Never retried.
    Format = 2,
    /// Chain validation or signature mismatch. Indicates a potential attack.
    Trust = 3,
    /// MAC or hash mismatch, or a failure inside the crypto engine.
    CryptoIntegrity = 4,
}

impl ErrorKind {
    /// Get the kind name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StorageCorruption => "storage",
            Self::Format => "format",
            Self::Trust => "trust",
            Self::CryptoIntegrity => "integrity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the boot chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Storage Errors (0x01xx)
    // =========================================================================
    /// Underlying flash read failed
    FlashReadFailed,
    /// Region record CRC does not match its contents
    RegionChecksumMismatch,
    /// Region offset is zero or beyond the partition
    RegionOffsetInvalid,
    /// Region reserved size is zero
    RegionSizeInvalid,
    /// Region end overflows or lies beyond the partition
    RegionOutOfBounds,
    /// Region table count exceeds the table capacity
    RegionTableInvalid,
    /// Requested region is not present in the active partition
    RegionNotFound,
    /// No valid partition remains after rescanning
    NoValidPartition,
    /// File header tag is wrong
    FileTagInvalid,
    /// File header declares the wrong header size
    FileHeaderSizeInvalid,
    /// File header CRC does not match
    FileChecksumMismatch,
    /// File payload does not fit in its region
    FileSizeInvalid,
    /// Read offset or length outside the file payload
    ReadOutOfRange,
    /// Filesystem used before a successful init
    FilesystemNotInitialized,
    /// Destination memory could not be accessed
    MemoryAccessFailed,
    /// Fuse read failed
    FuseReadFailed,

    // =========================================================================
    // Format Errors (0x02xx)
    // =========================================================================
    /// Invalid parameter provided
    InvalidParameter,
    /// Record shorter than its encoded size
    TruncatedRecord,
    /// Image file header tag is wrong
    InvalidFileHeaderTag,
    /// Image header tag is wrong
    InvalidImageHeaderTag,
    /// Image type does not match the requested image
    UnexpectedImageType,
    /// No load profile exists for this image type
    UnsupportedImageType,
    /// Header size plus code size does not equal the file size
    ImageSizeMismatch,
    /// Image file is smaller than its header
    ImageTooSmall,
    /// Certificate header tag is wrong
    InvalidCertificateTag,
    /// Certificate version tag is wrong
    InvalidCertificateVersion,
    /// Signature parameters are out of range
    InvalidSignatureParams,
    /// Signature algorithm does not match the certificate
    SignatureAlgorithmMismatch,
    /// Signing key type is not EC or RSA
    InvalidSigningKeyType,
    /// Public key parameters are out of range
    InvalidPublicKeyParams,
    /// Name sequence has an oversized field or empty common name
    InvalidNameSequence,
    /// Hash algorithm identifier is not supported
    UnsupportedHashAlgorithm,
    /// MAC type identifier is not supported
    UnsupportedMacType,
    /// Load region table entry is malformed
    InvalidLoadRegion,
    /// Load destination lies outside every permitted window
    InvalidLoadAddress,

    // =========================================================================
    // Trust Errors (0x03xx)
    // =========================================================================
    /// Parent certificate is not a CA
    ParentNotCa,
    /// Parent certificate lacks a required designation
    DesignationMismatch,
    /// Issuer key identifier does not match the parent subject key identifier
    KeyIdentifierMismatch,
    /// Issuer name does not match the parent subject name
    IssuerMismatch,
    /// Certificate signature verification failed
    CertificateSignatureInvalid,
    /// Image info signature verification failed
    ImageSignatureInvalid,
    /// Root certificate does not match its provisioned pin
    RootCertificateMismatch,
    /// Operation requires the hardware trust anchor, which is disabled
    TrustAnchorDisabled,

    // =========================================================================
    // Crypto Integrity Errors (0x04xx)
    // =========================================================================
    /// Header MAC verification failed
    MacMismatch,
    /// Hash of the encrypted code and data does not match
    EncryptedHashMismatch,
    /// Hash of the plaintext code and data does not match
    HashMismatch,
    /// Key derivation failed
    KeyDerivationFailed,
    /// Destroying a derived key failed
    KeyDeleteFailed,
    /// Hash engine failure
    HashEngineFailure,
    /// Symmetric cipher failure
    CipherFailure,
    /// Generic crypto engine failure
    CryptoEngineFailure,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Storage corruption
    /// - 0x02xx: Format / structural
    /// - 0x03xx: Trust failure
    /// - 0x04xx: Crypto integrity
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Storage errors (0x01xx)
            Self::FlashReadFailed => 0x0101,
            Self::RegionChecksumMismatch => 0x0102,
            Self::RegionOffsetInvalid => 0x0103,
            Self::RegionSizeInvalid => 0x0104,
            Self::RegionOutOfBounds => 0x0105,
            Self::RegionTableInvalid => 0x0106,
            Self::RegionNotFound => 0x0107,
            Self::NoValidPartition => 0x0108,
            Self::FileTagInvalid => 0x0109,
            Self::FileHeaderSizeInvalid => 0x010A,
            Self::FileChecksumMismatch => 0x010B,
            Self::FileSizeInvalid => 0x010C,
            Self::ReadOutOfRange => 0x010D,
            Self::FilesystemNotInitialized => 0x010E,
            Self::MemoryAccessFailed => 0x010F,
            Self::FuseReadFailed => 0x0110,

            // Format errors (0x02xx)
            Self::InvalidParameter => 0x0201,
            Self::TruncatedRecord => 0x0202,
            Self::InvalidFileHeaderTag => 0x0203,
            Self::InvalidImageHeaderTag => 0x0204,
            Self::UnexpectedImageType => 0x0205,
            Self::UnsupportedImageType => 0x0206,
            Self::ImageSizeMismatch => 0x0207,
            Self::ImageTooSmall => 0x0208,
            Self::InvalidCertificateTag => 0x0209,
            Self::InvalidCertificateVersion => 0x020A,
            Self::InvalidSignatureParams => 0x020B,
            Self::SignatureAlgorithmMismatch => 0x020C,
            Self::InvalidSigningKeyType => 0x020D,
            Self::InvalidPublicKeyParams => 0x020E,
            Self::InvalidNameSequence => 0x020F,
            Self::UnsupportedHashAlgorithm => 0x0210,
            Self::UnsupportedMacType => 0x0211,
            Self::InvalidLoadRegion => 0x0212,
            Self::InvalidLoadAddress => 0x0213,

            // Trust errors (0x03xx)
            Self::ParentNotCa => 0x0301,
            Self::DesignationMismatch => 0x0302,
            Self::KeyIdentifierMismatch => 0x0303,
            Self::IssuerMismatch => 0x0304,
            Self::CertificateSignatureInvalid => 0x0305,
            Self::ImageSignatureInvalid => 0x0306,
            Self::RootCertificateMismatch => 0x0307,
            Self::TrustAnchorDisabled => 0x0308,

            // Crypto integrity errors (0x04xx)
            Self::MacMismatch => 0x0401,
            Self::EncryptedHashMismatch => 0x0402,
            Self::HashMismatch => 0x0403,
            Self::KeyDerivationFailed => 0x0404,
            Self::KeyDeleteFailed => 0x0405,
            Self::HashEngineFailure => 0x0406,
            Self::CipherFailure => 0x0407,
            Self::CryptoEngineFailure => 0x0408,
        }
    }

    /// Get the failure class of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self.code() >> 8 {
            0x01 => ErrorKind::StorageCorruption,
            0x02 => ErrorKind::Format,
            0x03 => ErrorKind::Trust,
            _ => ErrorKind::CryptoIntegrity,
        }
    }

    /// Check if this error may indicate tampering rather than a hardware fault
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Trust | ErrorKind::CryptoIntegrity)
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::FlashReadFailed => "flash read failed",
            Self::RegionChecksumMismatch => "region CRC mismatch",
            Self::RegionOffsetInvalid => "invalid region offset",
            Self::RegionSizeInvalid => "region has zero size",
            Self::RegionOutOfBounds => "region exceeds partition",
            Self::RegionTableInvalid => "invalid region table",
            Self::RegionNotFound => "region not found",
            Self::NoValidPartition => "no valid partition",
            Self::FileTagInvalid => "invalid file info tag",
            Self::FileHeaderSizeInvalid => "invalid file info size",
            Self::FileChecksumMismatch => "file info CRC mismatch",
            Self::FileSizeInvalid => "invalid file size",
            Self::ReadOutOfRange => "read outside file",
            Self::FilesystemNotInitialized => "filesystem not initialized",
            Self::MemoryAccessFailed => "memory access failed",
            Self::FuseReadFailed => "fuse read failed",
            Self::InvalidParameter => "invalid parameter",
            Self::TruncatedRecord => "truncated record",
            Self::InvalidFileHeaderTag => "invalid file header tag",
            Self::InvalidImageHeaderTag => "invalid image header tag",
            Self::UnexpectedImageType => "unexpected image type",
            Self::UnsupportedImageType => "unsupported image type",
            Self::ImageSizeMismatch => "image size mismatch",
            Self::ImageTooSmall => "image file too small",
            Self::InvalidCertificateTag => "invalid certificate tag",
            Self::InvalidCertificateVersion => "invalid certificate version",
            Self::InvalidSignatureParams => "invalid signature parameters",
            Self::SignatureAlgorithmMismatch => "signature algorithm mismatch",
            Self::InvalidSigningKeyType => "invalid signing key type",
            Self::InvalidPublicKeyParams => "invalid public key parameters",
            Self::InvalidNameSequence => "invalid name sequence",
            Self::UnsupportedHashAlgorithm => "unsupported hash algorithm",
            Self::UnsupportedMacType => "unsupported MAC type",
            Self::InvalidLoadRegion => "invalid load region",
            Self::InvalidLoadAddress => "invalid load address",
            Self::ParentNotCa => "parent certificate is not a CA",
            Self::DesignationMismatch => "designation mismatch",
            Self::KeyIdentifierMismatch => "key identifier mismatch",
            Self::IssuerMismatch => "issuer mismatch",
            Self::CertificateSignatureInvalid => "certificate signature invalid",
            Self::ImageSignatureInvalid => "image signature invalid",
            Self::RootCertificateMismatch => "root certificate mismatch",
            Self::TrustAnchorDisabled => "trust anchor disabled",
            Self::MacMismatch => "MAC mismatch",
            Self::EncryptedHashMismatch => "encrypted hash mismatch",
            Self::HashMismatch => "hash mismatch",
            Self::KeyDerivationFailed => "key derivation failed",
            Self::KeyDeleteFailed => "key delete failed",
            Self::HashEngineFailure => "hash engine failure",
            Self::CipherFailure => "cipher failure",
            Self::CryptoEngineFailure => "crypto engine failure",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_code_category() {
        assert_eq!(Error::RegionChecksumMismatch.kind(), ErrorKind::StorageCorruption);
        assert_eq!(Error::ReadOutOfRange.kind(), ErrorKind::StorageCorruption);
        assert_eq!(Error::InvalidNameSequence.kind(), ErrorKind::Format);
        assert_eq!(Error::IssuerMismatch.kind(), ErrorKind::Trust);
        assert_eq!(Error::EncryptedHashMismatch.kind(), ErrorKind::CryptoIntegrity);
    }

    #[test]
    fn test_security_errors() {
        assert!(Error::ImageSignatureInvalid.is_security_error());
        assert!(Error::MacMismatch.is_security_error());
        assert!(!Error::FlashReadFailed.is_security_error());
        assert!(!Error::InvalidFileHeaderTag.is_security_error());
    }

    #[test]
    fn test_codes_unique() {
        let all = [
            Error::FlashReadFailed,
            Error::RegionChecksumMismatch,
            Error::RegionOffsetInvalid,
            Error::RegionSizeInvalid,
            Error::RegionOutOfBounds,
            Error::RegionTableInvalid,
            Error::RegionNotFound,
            Error::NoValidPartition,
            Error::FileTagInvalid,
            Error::FileHeaderSizeInvalid,
            Error::FileChecksumMismatch,
            Error::FileSizeInvalid,
            Error::ReadOutOfRange,
            Error::FilesystemNotInitialized,
            Error::MemoryAccessFailed,
            Error::FuseReadFailed,
            Error::InvalidParameter,
            Error::TruncatedRecord,
            Error::InvalidFileHeaderTag,
            Error::InvalidImageHeaderTag,
            Error::UnexpectedImageType,
            Error::UnsupportedImageType,
            Error::ImageSizeMismatch,
            Error::ImageTooSmall,
            Error::InvalidCertificateTag,
            Error::InvalidCertificateVersion,
            Error::InvalidSignatureParams,
            Error::SignatureAlgorithmMismatch,
            Error::InvalidSigningKeyType,
            Error::InvalidPublicKeyParams,
            Error::InvalidNameSequence,
            Error::UnsupportedHashAlgorithm,
            Error::UnsupportedMacType,
            Error::InvalidLoadRegion,
            Error::InvalidLoadAddress,
            Error::ParentNotCa,
            Error::DesignationMismatch,
            Error::KeyIdentifierMismatch,
            Error::IssuerMismatch,
            Error::CertificateSignatureInvalid,
            Error::ImageSignatureInvalid,
            Error::RootCertificateMismatch,
            Error::TrustAnchorDisabled,
            Error::MacMismatch,
            Error::EncryptedHashMismatch,
            Error::HashMismatch,
            Error::KeyDerivationFailed,
            Error::KeyDeleteFailed,
            Error::HashEngineFailure,
            Error::CipherFailure,
            Error::CryptoEngineFailure,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a:?} and {b:?} share a code");
            }
        }
    }
}
