// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Secure memory utilities
//!
//! Key material handled by the software engine lives in [`SecureBuffer`]s,
//! which are wiped when dropped.

use core::sync::atomic::{compiler_fence, Ordering};
use zeroize::Zeroize;

/// Securely zero memory, preventing compiler optimization
#[inline(never)]
pub fn secure_zero(data: &mut [u8]) {
    data.zeroize();
    // Keep the wipe ordered before whatever reuses the memory
    compiler_fence(Ordering::SeqCst);
}

/// Secure buffer that zeroizes on drop
///
/// Holds up to `N` bytes of which the first `len` are meaningful.
pub struct SecureBuffer<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> SecureBuffer<N> {
    /// Create a new zeroed secure buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            len: 0,
        }
    }

    /// Create a full buffer from an array
    #[must_use]
    pub fn from_array(bytes: &[u8; N]) -> Self {
        let mut buf = Self::new();
        buf.data.copy_from_slice(bytes);
        buf.len = N;
        buf
    }

    /// Create a buffer of `len` zero bytes to be filled in place
    ///
    /// Returns `None` if `len` exceeds `N`.
    #[must_use]
    pub fn zeroed(len: usize) -> Option<Self> {
        if len > N {
            return None;
        }
        let mut buf = Self::new();
        buf.len = len;
        Some(buf)
    }

    /// Get the data as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Get the data as a mutable slice
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    /// Number of meaningful bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for SecureBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Zeroize for SecureBuffer<N> {
    fn zeroize(&mut self) {
        secure_zero(&mut self.data);
        self.len = 0;
    }
}

impl<const N: usize> Drop for SecureBuffer<N> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Check if all bytes are zero
#[must_use]
pub fn is_zero(data: &[u8]) -> bool {
    data.iter().fold(0u8, |acc, &b| acc | b) == 0
}
