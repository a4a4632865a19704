// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL trait definitions
//!
//! The boot chain only reads flash, writes target memory and samples a few
//! fuses. Everything else stays in the board support code.

use sp_common::SecurityOverrides;

use crate::error::HalResult;

/// Read-only SPI flash access
pub trait SpiFlash {
    /// Total flash size in bytes
    fn size(&self) -> u32;

    /// Read `buffer.len()` bytes starting at `address`
    ///
    /// # Errors
    ///
    /// Returns an error if the range is outside the device or the transfer
    /// fails. The buffer contents are unspecified on error.
    fn read(&self, address: u32, buffer: &mut [u8]) -> HalResult<()>;

    /// Read a little-endian `u32` at `address`
    fn read_u32(&self, address: u32) -> HalResult<u32> {
        let mut word = [0u8; 4];
        self.read(address, &mut word)?;
        Ok(u32::from_le_bytes(word))
    }
}

/// Destination memory that images are loaded into
pub trait TargetMemory {
    /// Borrow `len` bytes of target memory starting at physical `address`
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the range is not backed by memory.
    fn window_mut(&mut self, address: u64, len: usize) -> HalResult<&mut [u8]>;

    /// Zero `len` bytes starting at `address`
    fn zero(&mut self, address: u64, len: usize) -> HalResult<()> {
        self.window_mut(address, len)?.fill(0);
        Ok(())
    }
}

/// One-time-programmable security fuses
pub trait FuseInterface {
    /// Read the signature-check chicken bit
    fn signature_check_disabled(&self) -> HalResult<bool>;

    /// Whether the hardware trust anchor is disabled
    fn trust_anchor_disabled(&self) -> bool;

    /// Collect the security overrides
    ///
    /// A chicken bit that cannot be read counts as not set.
    fn security_overrides(&self) -> SecurityOverrides {
        SecurityOverrides {
            trust_anchor_disabled: self.trust_anchor_disabled(),
            ignore_signatures: self.signature_check_disabled().unwrap_or(false),
        }
    }
}
