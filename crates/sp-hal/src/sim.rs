// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! In-memory backends for host builds and tests

use crate::error::{HalError, HalResult};
use crate::traits::{FuseInterface, SpiFlash, TargetMemory};

/// Flash backed by a byte slice
#[derive(Debug, Clone, Copy)]
pub struct MemFlash<'a> {
    data: &'a [u8],
}

impl<'a> MemFlash<'a> {
    /// Wrap a flash image
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl SpiFlash for MemFlash<'_> {
    fn size(&self) -> u32 {
        u32::try_from(self.data.len()).unwrap_or(u32::MAX)
    }

    fn read(&self, address: u32, buffer: &mut [u8]) -> HalResult<()> {
        let start = address as usize;
        let end = start
            .checked_add(buffer.len())
            .ok_or(HalError::FlashOutOfBounds)?;
        let src = self
            .data
            .get(start..end)
            .ok_or(HalError::FlashOutOfBounds)?;
        buffer.copy_from_slice(src);
        Ok(())
    }
}

/// Target memory backed by a byte slice mapped at `base`
#[derive(Debug)]
pub struct MemWindow<'a> {
    base: u64,
    data: &'a mut [u8],
}

impl<'a> MemWindow<'a> {
    /// Map `data` at physical address `base`
    pub fn new(base: u64, data: &'a mut [u8]) -> Self {
        Self { base, data }
    }

    /// Physical base address
    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Backing bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.data
    }
}

impl TargetMemory for MemWindow<'_> {
    fn window_mut(&mut self, address: u64, len: usize) -> HalResult<&mut [u8]> {
        let offset = address
            .checked_sub(self.base)
            .ok_or(HalError::MemoryOutOfBounds)?;
        let start = usize::try_from(offset).map_err(|_| HalError::MemoryOutOfBounds)?;
        let end = start.checked_add(len).ok_or(HalError::MemoryOutOfBounds)?;
        self.data
            .get_mut(start..end)
            .ok_or(HalError::MemoryOutOfBounds)
    }
}

/// Fixed fuse values
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFuses {
    /// Chicken bit value, or `None` to simulate a failed read
    pub signature_check_disabled: Option<bool>,
    /// Trust anchor disable fuse
    pub trust_anchor_disabled: bool,
}

impl StaticFuses {
    /// Production fuses: everything enforced
    pub const SECURE: Self = Self {
        signature_check_disabled: Some(false),
        trust_anchor_disabled: false,
    };
}

impl FuseInterface for StaticFuses {
    fn signature_check_disabled(&self) -> HalResult<bool> {
        self.signature_check_disabled.ok_or(HalError::FuseReadFailed)
    }

    fn trust_anchor_disabled(&self) -> bool {
        self.trust_anchor_disabled
    }
}
