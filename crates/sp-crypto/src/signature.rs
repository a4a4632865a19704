// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! ECDSA verification over P-256 and P-384
//!
//! Coordinates and scalars arrive big-endian with leading zero bytes
//! possibly stripped, so each is left-padded to the curve size first.
//! P-521 and RSA parameters are accepted by the certificate format but
//! have no software verifier here; they fail closed.

use p256::ecdsa::signature::hazmat::PrehashVerifier;
use sp_common::EcCurve;

use crate::error::{CryptoError, CryptoResult};
use crate::traits::{PublicKeyRef, SignatureRef};

fn left_pad<const N: usize>(src: &[u8]) -> CryptoResult<[u8; N]> {
    if src.is_empty() || src.len() > N {
        return Err(CryptoError::InvalidLength);
    }
    let mut out = [0u8; N];
    out[N - src.len()..].copy_from_slice(src);
    Ok(out)
}

fn verify_p256(x: &[u8], y: &[u8], r: &[u8], s: &[u8], prehash: &[u8]) -> CryptoResult<()> {
    use p256::ecdsa::{Signature, VerifyingKey};
    use p256::{EncodedPoint, FieldBytes};

    let x = FieldBytes::clone_from_slice(&left_pad::<32>(x).map_err(|_| CryptoError::InvalidKey)?);
    let y = FieldBytes::clone_from_slice(&left_pad::<32>(y).map_err(|_| CryptoError::InvalidKey)?);
    let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
    let key = VerifyingKey::from_encoded_point(&point).map_err(|_| CryptoError::InvalidKey)?;

    let r = FieldBytes::clone_from_slice(&left_pad::<32>(r).map_err(|_| CryptoError::InvalidSignature)?);
    let s = FieldBytes::clone_from_slice(&left_pad::<32>(s).map_err(|_| CryptoError::InvalidSignature)?);
    let sig = Signature::from_scalars(r, s).map_err(|_| CryptoError::InvalidSignature)?;

    key.verify_prehash(prehash, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

fn verify_p384(x: &[u8], y: &[u8], r: &[u8], s: &[u8], prehash: &[u8]) -> CryptoResult<()> {
    use p384::ecdsa::{Signature, VerifyingKey};
    use p384::{EncodedPoint, FieldBytes};

    let x = FieldBytes::clone_from_slice(&left_pad::<48>(x).map_err(|_| CryptoError::InvalidKey)?);
    let y = FieldBytes::clone_from_slice(&left_pad::<48>(y).map_err(|_| CryptoError::InvalidKey)?);
    let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
    let key = VerifyingKey::from_encoded_point(&point).map_err(|_| CryptoError::InvalidKey)?;

    let r = FieldBytes::clone_from_slice(&left_pad::<48>(r).map_err(|_| CryptoError::InvalidSignature)?);
    let s = FieldBytes::clone_from_slice(&left_pad::<48>(s).map_err(|_| CryptoError::InvalidSignature)?);
    let sig = Signature::from_scalars(r, s).map_err(|_| CryptoError::InvalidSignature)?;

    key.verify_prehash(prehash, &sig)
        .map_err(|_| CryptoError::InvalidSignature)
}

/// Verify `signature` over an already computed digest
///
/// # Errors
///
/// - `CryptoError::InvalidKey` if the point is not on the curve
/// - `CryptoError::InvalidSignature` if verification fails or the key and
///   signature types disagree
/// - `CryptoError::UnsupportedAlgorithm` for P-521 and RSA
pub fn verify_prehash(key: PublicKeyRef<'_>, signature: SignatureRef<'_>, prehash: &[u8]) -> CryptoResult<()> {
    match (key, signature) {
        (PublicKeyRef::Ec { curve: EcCurve::P256, x, y }, SignatureRef::Ec { r, s }) => {
            verify_p256(x, y, r, s, prehash)
        }
        (PublicKeyRef::Ec { curve: EcCurve::P384, x, y }, SignatureRef::Ec { r, s }) => {
            verify_p384(x, y, r, s, prehash)
        }
        (PublicKeyRef::Ec { curve: EcCurve::P521, .. }, SignatureRef::Ec { .. })
        | (PublicKeyRef::Rsa { .. }, SignatureRef::Rsa { .. }) => Err(CryptoError::UnsupportedAlgorithm),
        _ => Err(CryptoError::InvalidSignature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::signature::hazmat::PrehashSigner;

    fn p256_fixture(prehash: &[u8]) -> ([u8; 32], [u8; 32], p256::ecdsa::Signature) {
        let sk = p256::ecdsa::SigningKey::from_bytes(&[0x11u8; 32].into()).unwrap();
        let point = sk.verifying_key().to_encoded_point(false);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(point.x().unwrap());
        y.copy_from_slice(point.y().unwrap());
        let sig: p256::ecdsa::Signature = sk.sign_prehash(prehash).unwrap();
        (x, y, sig)
    }

    #[test]
    fn test_p256_verify() {
        let prehash = [0x5Au8; 32];
        let (x, y, sig) = p256_fixture(&prehash);
        let (r, s) = sig.split_bytes();
        let key = PublicKeyRef::Ec { curve: EcCurve::P256, x: &x, y: &y };
        assert!(verify_prehash(key, SignatureRef::Ec { r: &r, s: &s }, &prehash).is_ok());

        let mut bad = prehash;
        bad[0] ^= 1;
        assert_eq!(
            verify_prehash(key, SignatureRef::Ec { r: &r, s: &s }, &bad),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let key = PublicKeyRef::Ec { curve: EcCurve::P256, x: &[1u8; 32], y: &[2u8; 32] };
        let sig = SignatureRef::Ec { r: &[1u8; 32], s: &[1u8; 32] };
        assert_eq!(verify_prehash(key, sig, &[0u8; 32]), Err(CryptoError::InvalidKey));
    }

    #[test]
    fn test_unsupported_fail_closed() {
        let p521 = PublicKeyRef::Ec { curve: EcCurve::P521, x: &[1u8; 66], y: &[1u8; 66] };
        let sig = SignatureRef::Ec { r: &[1u8; 66], s: &[1u8; 66] };
        assert_eq!(verify_prehash(p521, sig, &[0u8; 64]), Err(CryptoError::UnsupportedAlgorithm));

        let rsa = PublicKeyRef::Rsa { modulus: &[0xFFu8; 256], exponent: &[1, 0, 1] };
        let rsa_sig = SignatureRef::Rsa { signature: &[0u8; 256] };
        assert_eq!(verify_prehash(rsa, rsa_sig, &[0u8; 32]), Err(CryptoError::UnsupportedAlgorithm));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let key = PublicKeyRef::Ec { curve: EcCurve::P256, x: &[1u8; 32], y: &[2u8; 32] };
        let sig = SignatureRef::Rsa { signature: &[0u8; 256] };
        assert_eq!(verify_prehash(key, sig, &[0u8; 32]), Err(CryptoError::InvalidSignature));
    }

    #[test]
    fn test_left_pad() {
        assert_eq!(left_pad::<4>(&[1, 2]), Ok([0, 0, 1, 2]));
        assert!(left_pad::<4>(&[1, 2, 3, 4, 5]).is_err());
        assert!(left_pad::<4>(&[]).is_err());
    }
}
