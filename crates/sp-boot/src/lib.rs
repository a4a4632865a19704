// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Service Processor Early-Boot Trust Chain
//!
//! This crate provides the second-stage loading path of the service
//! processor:
//!
//! - **Flash FS**: region-as-file reads over two redundant partitions
//! - **Certificates**: certificate and carried-over chain verification
//! - **Image**: firmware image header format
//! - **Loader**: authenticated, optionally encrypted image loading
//! - **Boot Log**: boot failure records
//! - **Sequencer**: one boot attempt from prior-stage data to jump or halt

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod boot_log;
pub mod certificates;
pub mod flash_fs;
pub mod image;
pub mod loader;
pub mod sequencer;

pub use boot_log::{BootLog, BootLogEntry, BootStage, ErrorCategory};
pub use certificates::{verify_certificate, Certificate, CertificateChain};
pub use flash_fs::{FlashFs, FlashFsDescriptor, Partition};
pub use image::ImageFileHeader;
pub use loader::{FirmwareLoader, ImageProfile, LoadedImage};
pub use sequencer::{halt, BootDecision, BootSequencer, PriorStageData};
