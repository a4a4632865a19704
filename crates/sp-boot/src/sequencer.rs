// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Boot Sequencer
//!
//! Runs one boot attempt: copies what the prior stage handed down, verifies
//! the carried-over certificate chain, brings up the filesystem and loads
//! the configured image. The outcome is a [`BootDecision`]; the platform
//! entry point either jumps to the image or calls [`halt`].

use sp_common::log::LogSink;
use sp_common::{log_error, log_info, log_warn, BootConfig, Error, SecurityOverrides};
use sp_crypto::CryptoEngine;
use sp_hal::{FuseInterface, SpiFlash, TargetMemory};

use crate::boot_log::{BootLog, BootLogEntry, BootStage};
use crate::certificates::CertificateChain;
use crate::flash_fs::{FlashFs, FlashFsDescriptor, Partition};
use crate::loader::FirmwareLoader;

/// Data forwarded by the prior boot stage
#[derive(Debug, Clone)]
pub struct PriorStageData {
    /// Filesystem descriptor with the declared active partition
    pub descriptor: FlashFsDescriptor,
    /// Root and issuing CA
    pub certificates: CertificateChain,
    /// Provisioned SHA-512 of the root certificate
    pub root_pin: Option<[u8; 64]>,
    /// Boot attempt counter
    pub boot_attempt: u32,
}

/// Outcome of a boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootDecision {
    /// Transfer control to the loaded image
    Jump {
        /// Entry point
        entry: u64,
        /// Partition the image came from
        partition: Partition,
    },
    /// Stop and wait for external reset
    Halt {
        /// Stage that failed
        stage: BootStage,
        /// Why it failed
        error: Error,
    },
}

/// Boot sequencer over the platform collaborators
pub struct BootSequencer<'a, F, M, U, E, L>
where
    F: SpiFlash,
    M: TargetMemory,
    U: FuseInterface,
    E: CryptoEngine,
    L: LogSink,
{
    flash: &'a F,
    memory: &'a mut M,
    fuses: &'a U,
    engine: &'a E,
    config: BootConfig,
    log: &'a mut L,
    boot_log: BootLog,
}

impl<'a, F, M, U, E, L> BootSequencer<'a, F, M, U, E, L>
where
    F: SpiFlash,
    M: TargetMemory,
    U: FuseInterface,
    E: CryptoEngine,
    L: LogSink,
{
    /// Create a sequencer
    pub fn new(
        flash: &'a F,
        memory: &'a mut M,
        fuses: &'a U,
        engine: &'a E,
        config: BootConfig,
        log: &'a mut L,
    ) -> Self {
        Self {
            flash,
            memory,
            fuses,
            engine,
            config,
            log,
            boot_log: BootLog::new(),
        }
    }

    /// Failures recorded by this sequencer
    #[must_use]
    pub fn boot_log(&self) -> &BootLog {
        &self.boot_log
    }

    /// Run one boot attempt
    pub fn run(&mut self, prior: &PriorStageData) -> BootDecision {
        let overrides = self.fuses.security_overrides();
        if overrides.trust_anchor_disabled {
            log_warn!(self.log, "boot", "trust anchor disabled");
        }
        if overrides.ignore_signatures {
            log_warn!(self.log, "boot", "signature checks disabled");
        }

        let mut fs = FlashFs::new(self.flash);
        // Work on a private copy of the forwarded data
        match self.attempt(prior.clone(), overrides, &mut fs) {
            Ok(decision) => decision,
            Err((stage, error)) => {
                log_error!(self.log, "boot", "halting at {:?}: {}", stage, error);
                let entry = BootLogEntry::for_failure(prior.boot_attempt, stage, error)
                    .with_target(fs.active_partition(), self.config.image)
                    .with_overrides(overrides);
                if self.boot_log.record(&entry).is_err() {
                    log_error!(self.log, "boot", "boot log write failed");
                }
                BootDecision::Halt { stage, error }
            }
        }
    }

    fn attempt(
        &mut self,
        data: PriorStageData,
        overrides: SecurityOverrides,
        fs: &mut FlashFs<'a, F>,
    ) -> core::result::Result<BootDecision, (BootStage, Error)> {
        let PriorStageData {
            descriptor,
            certificates,
            root_pin,
            ..
        } = data;

        if overrides.trust_anchor_disabled {
            log_warn!(self.log, "boot", "CRT CHAIN IGN");
        } else {
            certificates
                .verify(self.engine, root_pin.as_ref(), overrides, self.log)
                .map_err(|e| (BootStage::ChainVerify, e))?;
        }

        let partition = fs
            .init(descriptor, &self.config.scan, self.log)
            .map_err(|e| (BootStage::FsInit, e))?;

        let mut loader = FirmwareLoader::new(
            self.engine,
            certificates.issuing_ca(),
            self.config.memory,
            overrides,
            self.log,
        );
        let image = loader
            .load(fs, self.memory, self.config.image)
            .map_err(|e| (loader.stage(), e))?;

        log_info!(
            self.log,
            "boot",
            "jumping to {:#x} from partition {}",
            image.exec_address,
            partition.index()
        );
        Ok(BootDecision::Jump {
            entry: image.exec_address,
            partition,
        })
    }
}

/// Wait for external reset
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
