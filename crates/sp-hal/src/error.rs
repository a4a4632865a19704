// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Controller not initialized
    NotInitialized,
    /// SPI transfer failed
    SpiError,
    /// Flash read failed
    FlashReadFailed,
    /// Flash address out of bounds
    FlashOutOfBounds,
    /// Flash operation timeout
    FlashTimeout,
    /// Target memory range not mapped
    MemoryOutOfBounds,
    /// Target memory access fault
    MemoryFault,
    /// Fuse read failed
    FuseReadFailed,
    /// Invalid parameter
    InvalidParameter,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotInitialized => 0x0801,
            Self::SpiError => 0x0850,
            Self::FlashReadFailed => 0x0810,
            Self::FlashOutOfBounds => 0x0812,
            Self::FlashTimeout => 0x0816,
            Self::MemoryOutOfBounds => 0x0820,
            Self::MemoryFault => 0x0821,
            Self::FuseReadFailed => 0x0830,
            Self::InvalidParameter => 0x08F0,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::SpiError => "SPI error",
            Self::FlashReadFailed => "flash read failed",
            Self::FlashOutOfBounds => "flash address out of bounds",
            Self::FlashTimeout => "flash operation timeout",
            Self::MemoryOutOfBounds => "memory range not mapped",
            Self::MemoryFault => "memory access fault",
            Self::FuseReadFailed => "fuse read failed",
            Self::InvalidParameter => "invalid parameter",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<HalError> for sp_common::Error {
    fn from(e: HalError) -> Self {
        match e {
            HalError::NotInitialized
            | HalError::SpiError
            | HalError::FlashReadFailed
            | HalError::FlashOutOfBounds
            | HalError::FlashTimeout => Self::FlashReadFailed,
            HalError::MemoryOutOfBounds | HalError::MemoryFault => Self::MemoryAccessFailed,
            HalError::FuseReadFailed => Self::FuseReadFailed,
            HalError::InvalidParameter => Self::InvalidParameter,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
