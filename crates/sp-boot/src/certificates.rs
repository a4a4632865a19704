// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Certificate Chain Verification
//!
//! Certificates are fixed-size little-endian records (see [`Certificate`]).
//! A certificate is checked in two steps:
//!
//! 1. **Basic check** - tags, algorithm agreement between the certificate and
//!    its detached signature, key parameters and name sequence bounds
//! 2. **Enhanced check** - only with a parent: the parent must be a CA
//!    designated for the required class, identifiers and names must link,
//!    and the parent key must verify the signature over the info bytes
//!
//! Any failing sub-check aborts verification.

use sp_common::codec::{Reader, Writer};
use sp_common::constants::{
    CERTIFICATE_HEADER_TAG, CERTIFICATE_INFO_SIZE, CERTIFICATE_SIZE, CERTIFICATE_VERSION_TAG,
    EC_COORDINATE_CAPACITY, KEY_BODY_SIZE, KEY_IDENTIFIER_SIZE, NAME_FIELD_CAPACITY,
    NAME_SEQUENCE_SIZE, RSA_EXPONENT_CAPACITY, RSA_MODULUS_CAPACITY, SERIAL_NUMBER_CAPACITY,
};
use sp_common::log::LogSink;
use sp_common::{
    log_warn, Designation, EcCurve, Error, HashAlgorithm, KeyType, Result, RsaKeySize,
    SecurityOverrides,
};
use sp_crypto::{CryptoEngine, HashContext, PublicKeyRef, SignatureRef};

/// Bytes used by an EC key or signature inside the 528-byte body
const EC_BODY_USED: usize = 12 + 2 * EC_COORDINATE_CAPACITY;

/// Bytes used by an RSA signature inside the 528-byte body
const RSA_SIGNATURE_BODY_USED: usize = 8 + RSA_MODULUS_CAPACITY;

/// Value of `is_ca` for CA certificates
pub const IS_CA: u32 = 1;

/// Take a length-prefixed value, failing if the length exceeds the storage
fn sized(bytes: &[u8], size: u32) -> Option<&[u8]> {
    bytes.get(..size as usize)
}

// ============================================================================
// Names
// ============================================================================

/// One length-prefixed name field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameField<const N: usize> {
    /// Declared length
    pub length: u32,
    /// Storage, meaningful up to `length`
    pub bytes: [u8; N],
}

impl<const N: usize> NameField<N> {
    /// Field holding `value`, truncated to the capacity
    #[must_use]
    pub fn new(value: &[u8]) -> Self {
        let len = value.len().min(N);
        let mut bytes = [0u8; N];
        bytes[..len].copy_from_slice(&value[..len]);
        Self {
            length: len as u32,
            bytes,
        }
    }

    /// Declared value, or `None` if the length is out of bounds
    #[must_use]
    pub fn value(&self) -> Option<&[u8]> {
        sized(&self.bytes, self.length)
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            length: r.u32()?,
            bytes: r.array()?,
        })
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<()> {
        w.u32(self.length)?;
        w.bytes(&self.bytes)
    }
}

/// Subject or issuer distinguished name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameSequence {
    /// Organization
    pub organization: NameField<NAME_FIELD_CAPACITY>,
    /// Organizational unit
    pub organizational_unit: NameField<NAME_FIELD_CAPACITY>,
    /// City
    pub city: NameField<NAME_FIELD_CAPACITY>,
    /// State
    pub state: NameField<NAME_FIELD_CAPACITY>,
    /// Common name, must be non-empty
    pub common_name: NameField<NAME_FIELD_CAPACITY>,
    /// Serial number
    pub serial_number: NameField<SERIAL_NUMBER_CAPACITY>,
}

impl NameSequence {
    /// Name with only a common name set
    #[must_use]
    pub fn with_common_name(common_name: &[u8]) -> Self {
        let empty = NameField::new(&[]);
        Self {
            organization: empty,
            organizational_unit: empty,
            city: empty,
            state: empty,
            common_name: NameField::new(common_name),
            serial_number: NameField::new(&[]),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            organization: NameField::decode(r)?,
            organizational_unit: NameField::decode(r)?,
            city: NameField::decode(r)?,
            state: NameField::decode(r)?,
            common_name: NameField::decode(r)?,
            serial_number: NameField::decode(r)?,
        })
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<()> {
        self.organization.encode(w)?;
        self.organizational_unit.encode(w)?;
        self.city.encode(w)?;
        self.state.encode(w)?;
        self.common_name.encode(w)?;
        self.serial_number.encode(w)
    }

    /// Encoded form, used for constant-time comparison
    pub fn to_bytes(&self) -> Result<[u8; NAME_SEQUENCE_SIZE]> {
        let mut out = [0u8; NAME_SEQUENCE_SIZE];
        self.encode(&mut Writer::new(&mut out))?;
        Ok(out)
    }

    /// Check field lengths and the common name
    pub fn validate(&self) -> Result<()> {
        let in_bounds = self.organization.value().is_some()
            && self.organizational_unit.value().is_some()
            && self.city.value().is_some()
            && self.state.value().is_some()
            && self.common_name.value().is_some()
            && self.serial_number.value().is_some();
        if !in_bounds || self.common_name.length == 0 {
            return Err(Error::InvalidNameSequence);
        }
        Ok(())
    }
}

// ============================================================================
// Keys and Signatures
// ============================================================================

/// EC public key body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcPublicKey {
    /// Raw curve id
    pub curve: u32,
    /// Meaningful bytes of `x`
    pub x_size: u32,
    /// Meaningful bytes of `y`
    pub y_size: u32,
    /// Big-endian X coordinate
    pub x: [u8; EC_COORDINATE_CAPACITY],
    /// Big-endian Y coordinate
    pub y: [u8; EC_COORDINATE_CAPACITY],
}

/// RSA public key body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Raw key size in bits
    pub key_size: u32,
    /// Meaningful bytes of `modulus`
    pub modulus_size: u32,
    /// Meaningful bytes of `exponent`
    pub exponent_size: u32,
    /// Big-endian modulus
    pub modulus: [u8; RSA_MODULUS_CAPACITY],
    /// Big-endian public exponent
    pub exponent: [u8; RSA_EXPONENT_CAPACITY],
}

/// Subject public key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKey {
    /// Elliptic curve key
    Ec(EcPublicKey),
    /// RSA key
    Rsa(RsaPublicKey),
    /// Unrecognized key type (never valid)
    Unknown(u32),
}

fn coordinate_ok(curve: EcCurve, size: u32) -> bool {
    size != 0 && size as usize <= curve.coordinate_size()
}

impl PublicKey {
    /// Uncompressed EC key from big-endian coordinates
    #[must_use]
    pub fn ec(curve: EcCurve, x: &[u8], y: &[u8]) -> Self {
        let mut key = EcPublicKey {
            curve: curve.as_u32(),
            x_size: x.len() as u32,
            y_size: y.len() as u32,
            x: [0u8; EC_COORDINATE_CAPACITY],
            y: [0u8; EC_COORDINATE_CAPACITY],
        };
        key.x[..x.len()].copy_from_slice(x);
        key.y[..y.len()].copy_from_slice(y);
        PublicKey::Ec(key)
    }

    /// Raw key type
    #[must_use]
    pub const fn key_type(&self) -> u32 {
        match self {
            PublicKey::Ec(_) => KeyType::Ec.as_u32(),
            PublicKey::Rsa(_) => KeyType::Rsa.as_u32(),
            PublicKey::Unknown(t) => *t,
        }
    }

    /// Check curve/key size and component sizes
    pub fn validate_params(&self) -> Result<()> {
        let ok = match self {
            PublicKey::Ec(k) => EcCurve::from_u32(k.curve)
                .is_some_and(|c| coordinate_ok(c, k.x_size) && coordinate_ok(c, k.y_size)),
            PublicKey::Rsa(k) => RsaKeySize::from_u32(k.key_size).is_some_and(|s| {
                k.modulus_size as usize == s.modulus_size()
                    && k.exponent_size != 0
                    && k.exponent_size as usize <= RSA_EXPONENT_CAPACITY
            }),
            PublicKey::Unknown(_) => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidPublicKeyParams)
        }
    }

    /// Borrow the key for the crypto engine
    pub fn as_verify_ref(&self) -> Result<PublicKeyRef<'_>> {
        self.validate_params()?;
        match self {
            PublicKey::Ec(k) => Ok(PublicKeyRef::Ec {
                curve: EcCurve::from_u32(k.curve).ok_or(Error::InvalidPublicKeyParams)?,
                x: sized(&k.x, k.x_size).ok_or(Error::InvalidPublicKeyParams)?,
                y: sized(&k.y, k.y_size).ok_or(Error::InvalidPublicKeyParams)?,
            }),
            PublicKey::Rsa(k) => Ok(PublicKeyRef::Rsa {
                modulus: sized(&k.modulus, k.modulus_size).ok_or(Error::InvalidPublicKeyParams)?,
                exponent: sized(&k.exponent, k.exponent_size).ok_or(Error::InvalidPublicKeyParams)?,
            }),
            PublicKey::Unknown(_) => Err(Error::InvalidPublicKeyParams),
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let key_type = r.u32()?;
        let body = r.take(KEY_BODY_SIZE)?;
        let mut b = Reader::new(body);
        Ok(match KeyType::from_u32(key_type) {
            Some(KeyType::Ec) => PublicKey::Ec(EcPublicKey {
                curve: b.u32()?,
                x_size: b.u32()?,
                y_size: b.u32()?,
                x: b.array()?,
                y: b.array()?,
            }),
            Some(KeyType::Rsa) => PublicKey::Rsa(RsaPublicKey {
                key_size: b.u32()?,
                modulus_size: b.u32()?,
                exponent_size: b.u32()?,
                modulus: b.array()?,
                exponent: b.array()?,
            }),
            None => PublicKey::Unknown(key_type),
        })
    }

    fn encode(&self, w: &mut Writer<'_>) -> Result<()> {
        w.u32(self.key_type())?;
        match self {
            PublicKey::Ec(k) => {
                w.u32(k.curve)?;
                w.u32(k.x_size)?;
                w.u32(k.y_size)?;
                w.bytes(&k.x)?;
                w.bytes(&k.y)?;
                w.zeros(KEY_BODY_SIZE - EC_BODY_USED)
            }
            PublicKey::Rsa(k) => {
                w.u32(k.key_size)?;
                w.u32(k.modulus_size)?;
                w.u32(k.exponent_size)?;
                w.bytes(&k.modulus)?;
                w.bytes(&k.exponent)
            }
            PublicKey::Unknown(_) => w.zeros(KEY_BODY_SIZE),
        }
    }
}

/// EC signature body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcSignature {
    /// Raw curve id
    pub curve: u32,
    /// Meaningful bytes of `r`
    pub r_size: u32,
    /// Meaningful bytes of `s`
    pub s_size: u32,
    /// Big-endian r scalar
    pub r: [u8; EC_COORDINATE_CAPACITY],
    /// Big-endian s scalar
    pub s: [u8; EC_COORDINATE_CAPACITY],
}

/// RSA signature body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaSignature {
    /// Raw key size in bits
    pub key_size: u32,
    /// Meaningful bytes of `signature`
    pub signature_size: u32,
    /// Big-endian signature
    pub signature: [u8; RSA_MODULUS_CAPACITY],
}

/// Signature body by key type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureBody {
    /// ECDSA signature
    Ec(EcSignature),
    /// RSA signature
    Rsa(RsaSignature),
    /// Unrecognized key type (never valid)
    Unknown,
}

/// Detached signature with its declared algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Raw hash algorithm id
    pub hash_algorithm: u32,
    /// Raw key type
    pub key_type: u32,
    /// Key-type specific body
    pub body: SignatureBody,
}

impl Signature {
    /// ECDSA signature from big-endian scalars
    #[must_use]
    pub fn ec(hash: HashAlgorithm, curve: EcCurve, r: &[u8], s: &[u8]) -> Self {
        let mut sig = EcSignature {
            curve: curve.as_u32(),
            r_size: r.len() as u32,
            s_size: s.len() as u32,
            r: [0u8; EC_COORDINATE_CAPACITY],
            s: [0u8; EC_COORDINATE_CAPACITY],
        };
        sig.r[..r.len()].copy_from_slice(r);
        sig.s[..s.len()].copy_from_slice(s);
        Self {
            hash_algorithm: hash.as_u32(),
            key_type: KeyType::Ec.as_u32(),
            body: SignatureBody::Ec(sig),
        }
    }

    /// Declared hash algorithm
    pub fn hash(&self) -> Result<HashAlgorithm> {
        HashAlgorithm::from_u32(self.hash_algorithm).ok_or(Error::InvalidSignatureParams)
    }

    /// Curve id (EC) or key size (RSA)
    #[must_use]
    pub const fn curve_or_size(&self) -> Option<u32> {
        match &self.body {
            SignatureBody::Ec(s) => Some(s.curve),
            SignatureBody::Rsa(s) => Some(s.key_size),
            SignatureBody::Unknown => None,
        }
    }

    /// Check the declared algorithms and component sizes
    pub fn validate_params(&self) -> Result<()> {
        let ok = HashAlgorithm::from_u32(self.hash_algorithm).is_some()
            && match &self.body {
                SignatureBody::Ec(s) => EcCurve::from_u32(s.curve)
                    .is_some_and(|c| coordinate_ok(c, s.r_size) && coordinate_ok(c, s.s_size)),
                SignatureBody::Rsa(s) => RsaKeySize::from_u32(s.key_size)
                    .is_some_and(|k| s.signature_size as usize == k.modulus_size()),
                SignatureBody::Unknown => false,
            };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidSignatureParams)
        }
    }

    /// Borrow the signature for the crypto engine
    pub fn as_verify_ref(&self) -> Result<SignatureRef<'_>> {
        self.validate_params()?;
        match &self.body {
            SignatureBody::Ec(s) => Ok(SignatureRef::Ec {
                r: sized(&s.r, s.r_size).ok_or(Error::InvalidSignatureParams)?,
                s: sized(&s.s, s.s_size).ok_or(Error::InvalidSignatureParams)?,
            }),
            SignatureBody::Rsa(s) => Ok(SignatureRef::Rsa {
                signature: sized(&s.signature, s.signature_size)
                    .ok_or(Error::InvalidSignatureParams)?,
            }),
            SignatureBody::Unknown => Err(Error::InvalidSignatureParams),
        }
    }

    /// Decode a signature record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Reader::new(bytes))
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let hash_algorithm = r.u32()?;
        let key_type = r.u32()?;
        let mut b = Reader::new(r.take(KEY_BODY_SIZE)?);
        let body = match KeyType::from_u32(key_type) {
            Some(KeyType::Ec) => SignatureBody::Ec(EcSignature {
                curve: b.u32()?,
                r_size: b.u32()?,
                s_size: b.u32()?,
                r: b.array()?,
                s: b.array()?,
            }),
            Some(KeyType::Rsa) => SignatureBody::Rsa(RsaSignature {
                key_size: b.u32()?,
                signature_size: b.u32()?,
                signature: b.array()?,
            }),
            None => SignatureBody::Unknown,
        };
        Ok(Self {
            hash_algorithm,
            key_type,
            body,
        })
    }

    /// Encode a signature record
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        self.write(&mut Writer::new(out))
    }

    fn write(&self, w: &mut Writer<'_>) -> Result<()> {
        w.u32(self.hash_algorithm)?;
        w.u32(self.key_type)?;
        match &self.body {
            SignatureBody::Ec(s) => {
                w.u32(s.curve)?;
                w.u32(s.r_size)?;
                w.u32(s.s_size)?;
                w.bytes(&s.r)?;
                w.bytes(&s.s)?;
                w.zeros(KEY_BODY_SIZE - EC_BODY_USED)
            }
            SignatureBody::Rsa(s) => {
                w.u32(s.key_size)?;
                w.u32(s.signature_size)?;
                w.bytes(&s.signature)?;
                w.zeros(KEY_BODY_SIZE - RSA_SIGNATURE_BODY_USED)
            }
            SignatureBody::Unknown => w.zeros(KEY_BODY_SIZE),
        }
    }
}

// ============================================================================
// Certificates
// ============================================================================

/// Signed part of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Must equal [`CERTIFICATE_HEADER_TAG`]
    pub header_tag: u32,
    /// Must equal [`CERTIFICATE_VERSION_TAG`]
    pub version_tag: u32,
    /// Hash algorithm the issuer signed with
    pub hash_algorithm: u32,
    /// Key type the issuer signed with
    pub signing_key_type: u32,
    /// Issuer curve id (EC) or key size (RSA)
    pub signing_key_param: u32,
    /// Key certified by this certificate
    pub subject_public_key: PublicKey,
    /// Subject name
    pub subject: NameSequence,
    /// Issuer name
    pub issuer: NameSequence,
    /// Identifier of the subject key
    pub subject_key_identifier: [u8; KEY_IDENTIFIER_SIZE],
    /// Identifier of the issuer key
    pub issuer_key_identifier: [u8; KEY_IDENTIFIER_SIZE],
    /// [`IS_CA`] for CA certificates
    pub is_ca: u32,
    /// Raw [`Designation`] bits
    pub designation: u32,
}

impl CertificateInfo {
    /// Decode the info record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Ok(Self {
            header_tag: r.u32()?,
            version_tag: r.u32()?,
            hash_algorithm: r.u32()?,
            signing_key_type: r.u32()?,
            signing_key_param: r.u32()?,
            subject_public_key: PublicKey::decode(&mut r)?,
            subject: NameSequence::decode(&mut r)?,
            issuer: NameSequence::decode(&mut r)?,
            subject_key_identifier: r.array()?,
            issuer_key_identifier: r.array()?,
            is_ca: r.u32()?,
            designation: r.u32()?,
        })
    }

    /// Encode the info record
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        let mut w = Writer::new(out);
        w.u32(self.header_tag)?;
        w.u32(self.version_tag)?;
        w.u32(self.hash_algorithm)?;
        w.u32(self.signing_key_type)?;
        w.u32(self.signing_key_param)?;
        self.subject_public_key.encode(&mut w)?;
        self.subject.encode(&mut w)?;
        self.issuer.encode(&mut w)?;
        w.bytes(&self.subject_key_identifier)?;
        w.bytes(&self.issuer_key_identifier)?;
        w.u32(self.is_ca)?;
        w.u32(self.designation)
    }

    /// Designation flags
    #[must_use]
    pub const fn designation(&self) -> Designation {
        Designation::from_bits(self.designation)
    }
}

/// Certificate with its detached signature
///
/// The encoded bytes are retained so the signature is checked over exactly
/// what was stored.
#[derive(Clone)]
pub struct Certificate {
    /// Decoded info
    pub info: CertificateInfo,
    /// Detached signature over the info bytes
    pub signature: Signature,
    raw: [u8; CERTIFICATE_SIZE],
}

impl Certificate {
    /// Decode a certificate from the first [`CERTIFICATE_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; CERTIFICATE_SIZE] = bytes
            .get(..CERTIFICATE_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(Error::TruncatedRecord)?;
        Ok(Self {
            info: CertificateInfo::decode(&raw[..CERTIFICATE_INFO_SIZE])?,
            signature: Signature::decode(&raw[CERTIFICATE_INFO_SIZE..])?,
            raw,
        })
    }

    /// Assemble a certificate from its parts
    pub fn from_parts(info: &CertificateInfo, signature: &Signature) -> Result<Self> {
        let mut raw = [0u8; CERTIFICATE_SIZE];
        info.encode(&mut raw[..CERTIFICATE_INFO_SIZE])?;
        signature.encode(&mut raw[CERTIFICATE_INFO_SIZE..])?;
        Self::decode(&raw)
    }

    /// Encoded certificate
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; CERTIFICATE_SIZE] {
        &self.raw
    }

    /// Encoded info record, the signed message
    #[must_use]
    pub fn info_bytes(&self) -> &[u8] {
        &self.raw[..CERTIFICATE_INFO_SIZE]
    }

    /// Self-contained checks
    pub fn basic_check(&self) -> Result<()> {
        let info = &self.info;
        if info.header_tag != CERTIFICATE_HEADER_TAG {
            return Err(Error::InvalidCertificateTag);
        }
        if info.version_tag != CERTIFICATE_VERSION_TAG {
            return Err(Error::InvalidCertificateVersion);
        }
        self.signature.validate_params()?;
        if self.signature.hash_algorithm != info.hash_algorithm
            || self.signature.key_type != info.signing_key_type
        {
            return Err(Error::SignatureAlgorithmMismatch);
        }
        match KeyType::from_u32(info.signing_key_type) {
            Some(KeyType::Ec | KeyType::Rsa) => {
                if self.signature.curve_or_size() != Some(info.signing_key_param) {
                    return Err(Error::SignatureAlgorithmMismatch);
                }
            }
            None => return Err(Error::InvalidSigningKeyType),
        }
        info.subject_public_key.validate_params()?;
        info.subject.validate()?;
        info.issuer.validate()
    }
}

impl core::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Certificate")
            .field("info", &self.info)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Verify `cert`, optionally against `parent`
///
/// `required` names the designation bits the parent must carry. Without a
/// parent only the basic check runs.
pub fn verify_certificate<E: CryptoEngine, L: LogSink>(
    engine: &E,
    cert: &Certificate,
    parent: Option<&Certificate>,
    required: Designation,
    overrides: SecurityOverrides,
    log: &mut L,
) -> Result<()> {
    cert.basic_check()?;
    let Some(parent) = parent else {
        return Ok(());
    };

    if parent.info.is_ca != IS_CA {
        return Err(Error::ParentNotCa);
    }
    if !parent.info.designation().contains(required) {
        return Err(Error::DesignationMismatch);
    }
    if !engine.constant_time_compare(
        &cert.info.issuer_key_identifier,
        &parent.info.subject_key_identifier,
    ) {
        return Err(Error::KeyIdentifierMismatch);
    }
    if !engine.constant_time_compare(&cert.info.issuer.to_bytes()?, &parent.info.subject.to_bytes()?) {
        return Err(Error::IssuerMismatch);
    }

    if overrides.skip_signatures() {
        log_warn!(log, "crt", "CRT SIG IGN");
        return Ok(());
    }
    let key = parent.info.subject_public_key.as_verify_ref()?;
    let signature = cert.signature.as_verify_ref()?;
    engine
        .verify_signature(key, cert.signature.hash()?, signature, cert.info_bytes())
        .map_err(|_| Error::CertificateSignatureInvalid)
}

/// Root and issuing CA carried over from the prior boot stage
#[derive(Debug, Clone)]
pub struct CertificateChain {
    /// Pre-provisioned root
    pub root: Certificate,
    /// Issuing CA signed by the root
    pub issuing: Certificate,
}

impl CertificateChain {
    /// Verify the chain
    ///
    /// The root passes the basic check and, when `root_pin` is provisioned,
    /// its SHA-512 must equal the pin. The issuing CA is then verified
    /// against the root.
    pub fn verify<E: CryptoEngine, L: LogSink>(
        &self,
        engine: &E,
        root_pin: Option<&[u8; 64]>,
        overrides: SecurityOverrides,
        log: &mut L,
    ) -> Result<()> {
        verify_certificate(engine, &self.root, None, Designation::ROOT_CA, overrides, log)?;
        if let Some(pin) = root_pin {
            let mut ctx = engine.hash_init(HashAlgorithm::Sha512)?;
            ctx.update(self.root.as_bytes())?;
            let digest = ctx.finalize()?;
            if !engine.constant_time_compare(digest.as_bytes(), pin) {
                return Err(Error::RootCertificateMismatch);
            }
        }
        verify_certificate(
            engine,
            &self.issuing,
            Some(&self.root),
            Designation::ISSUING_CA,
            overrides,
            log,
        )
    }

    /// CA that signs image certificates
    #[must_use]
    pub fn issuing_ca(&self) -> &Certificate {
        &self.issuing
    }
}
