// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Service Processor Boot Common Library
//!
//! This crate provides the error type, logging, configuration, algorithm
//! identifiers and wire codecs shared by every stage of the service
//! processor boot chain.
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging support for embedded debugging
//!
//! # Security
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections. On-flash records are decoded field by field from
//! little-endian bytes, never by reinterpreting memory.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod constants;
pub mod errors;
pub mod log;
pub mod types;

// Re-export commonly used items
pub use config::{BootConfig, MemoryMap, ScanPolicy, SecurityOverrides};
pub use errors::{Error, ErrorKind, Result};
pub use types::*;
