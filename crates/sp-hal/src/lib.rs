// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for the service processor boot chain
//!
//! The boot core talks to hardware only through the traits in [`traits`]:
//!
//! - [`SpiFlash`]: read-only access to the boot flash
//! - [`TargetMemory`]: destination memory for loaded images
//! - [`FuseInterface`]: security override fuses
//!
//! The `sim` feature adds in-memory implementations used by host builds and
//! the test suites.

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

cfg_if::cfg_if! {
    if #[cfg(any(test, feature = "sim"))] {
        pub mod sim;
        pub use sim::{MemFlash, MemWindow, StaticFuses};
    }
}

// Re-export main traits
pub use error::{HalError, HalResult};
pub use traits::*;
