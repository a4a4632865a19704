// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Service Processor Crypto Layer
//!
//! This crate defines the crypto engine contract consumed by the boot chain
//! and a software engine built on RustCrypto primitives.
//!
//! # Supported Algorithms
//!
//! ## Hash Functions
//! - SHA-256, SHA-384, SHA-512
//!
//! ## Message Authentication
//! - HMAC-SHA-256, HMAC-SHA-384, HMAC-SHA-512
//! - AES-CMAC *(identifier only; the software engine fails closed)*
//!
//! ## Key Derivation
//! - HKDF-SHA-256 with label and usage separation
//!
//! ## Ciphers
//! - AES-256-CTR
//!
//! ## Signatures
//! - ECDSA P-256, P-384
//! - ECDSA P-521, RSA *(parameters only; verification fails closed)*
//!
//! # Security Requirements
//!
//! - Derived keys stay behind opaque handles
//! - Key material is zeroized when released
//! - MAC, hash and identifier comparisons are constant time

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod error;
pub mod traits;
pub mod zeroize_utils;

pub mod cipher;
pub mod hash;
pub mod kdf;
pub mod mac;
pub mod signature;

#[cfg(feature = "soft")]
pub mod soft;

// Re-export commonly used items
pub use error::{CryptoError, CryptoResult};
pub use hash::Digest;
pub use traits::{
    constant_time_eq, CryptoEngine, DecryptContext, HashContext, KeyHandle, KeySource, KeyUsage,
    PublicKeyRef, SignatureRef,
};

#[cfg(feature = "soft")]
pub use soft::SoftCrypto;
