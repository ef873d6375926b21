//! Asymmetric key material.
//!
//! This module contains [`AsymmetricKeyPair`], a key of one of the supported
//! families RSA, DSA, and ECDSA, either with or without its private part. It
//! converts between the various DER encodings of keys and an OpenSSL key
//! handle that is used for the actual signing and verification.
//!
//! The following encodings are supported:
//!
//! * the algorithm specific private key formats, i.e., `RSAPrivateKey` from
//!   [RFC 8017], the OpenSSL DSA private key sequence, and `ECPrivateKey`
//!   from [RFC 5915],
//! * `PrivateKeyInfo` from [RFC 5208] (PKCS #8),
//! * `SubjectPublicKeyInfo` from [RFC 5280] and the bare public key bits
//!   contained in it.
//!
//! [RFC 5208]: https://tools.ietf.org/html/rfc5208
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280
//! [RFC 5915]: https://tools.ietf.org/html/rfc5915
//! [RFC 8017]: https://tools.ietf.org/html/rfc8017

use std::fmt;
use std::sync::{Mutex, OnceLock};
use bcder::{decode, encode};
use bcder::{BitString, Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::{PrimitiveContent, Values};
use bytes::Bytes;
use log::debug;
use openssl::bn::{BigNum, BigNumContext};
use openssl::dsa::Dsa;
use openssl::ec::{EcGroup, EcKey as OpenSslEcKey, EcPoint, PointConversionForm};
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Private, Public};
use openssl::rsa::Rsa;
use crate::oid;
use crate::error::Error;
use crate::util::int::UnsignedInt;
use crate::x509::{decode_der, to_oid, AlgorithmIdentifier};
use super::digest;


//------------ KeyAlgorithm --------------------------------------------------

/// The family of an asymmetric key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
}

impl KeyAlgorithm {
    /// Returns the object identifier of the public key algorithm.
    pub fn oid(self) -> &'static bcder::ConstOid {
        match self {
            KeyAlgorithm::Rsa => &oid::RSA_ENCRYPTION,
            KeyAlgorithm::Dsa => &oid::DSA,
            KeyAlgorithm::Ecdsa => &oid::EC_PUBLIC_KEY,
        }
    }

    pub fn from_oid<T: AsRef<[u8]>>(id: &Oid<T>) -> Option<Self> {
        if *id == oid::RSA_ENCRYPTION {
            Some(KeyAlgorithm::Rsa)
        }
        else if *id == oid::DSA {
            Some(KeyAlgorithm::Dsa)
        }
        else if *id == oid::EC_PUBLIC_KEY {
            Some(KeyAlgorithm::Ecdsa)
        }
        else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Dsa => "DSA",
            KeyAlgorithm::Ecdsa => "ECDSA",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ EcCurve -------------------------------------------------------

/// The named curves supported for ECDSA.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    pub fn oid(self) -> &'static bcder::ConstOid {
        match self {
            EcCurve::P256 => &oid::SECP256R1,
            EcCurve::P384 => &oid::SECP384R1,
            EcCurve::P521 => &oid::SECP521R1,
        }
    }

    pub fn from_oid<T: AsRef<[u8]>>(id: &Oid<T>) -> Option<Self> {
        [EcCurve::P256, EcCurve::P384, EcCurve::P521].into_iter().find(
            |curve| id == curve.oid()
        )
    }

    pub fn nid(self) -> Nid {
        match self {
            EcCurve::P256 => Nid::X9_62_PRIME256V1,
            EcCurve::P384 => Nid::SECP384R1,
            EcCurve::P521 => Nid::SECP521R1,
        }
    }

    pub fn from_nid(nid: Nid) -> Option<Self> {
        [EcCurve::P256, EcCurve::P384, EcCurve::P521].into_iter().find(
            |curve| curve.nid() == nid
        )
    }

    /// Returns the length of a coordinate in octets.
    pub fn coordinate_len(self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }
}


//------------ RsaKey --------------------------------------------------------

/// The components of an RSA key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RsaKey {
    pub modulus: UnsignedInt,
    pub public_exponent: UnsignedInt,
    pub private: Option<RsaPrivateKey>,
}

/// The private components of an RSA key.
#[derive(Clone, Eq, PartialEq)]
pub struct RsaPrivateKey {
    pub private_exponent: UnsignedInt,
    pub prime1: UnsignedInt,
    pub prime2: UnsignedInt,
    pub exponent1: UnsignedInt,
    pub exponent2: UnsignedInt,
    pub coefficient: UnsignedInt,
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RsaPrivateKey(..)")
    }
}

impl RsaKey {
    /// Creates a key from the integers of an `RSAPrivateKey`.
    ///
    /// ```txt
    /// RSAPrivateKey ::= SEQUENCE {
    ///     version           Version,
    ///     modulus           INTEGER,  -- n
    ///     publicExponent    INTEGER,  -- e
    ///     privateExponent   INTEGER,  -- d
    ///     prime1            INTEGER,  -- p
    ///     prime2            INTEGER,  -- q
    ///     exponent1         INTEGER,  -- d mod (p-1)
    ///     exponent2         INTEGER,  -- d mod (q-1)
    ///     coefficient       INTEGER,  -- (inverse of q) mod p
    ///     otherPrimeInfos   OtherPrimeInfos OPTIONAL
    /// }
    /// ```
    ///
    /// The `ints` must not include the version.
    fn from_private_ints(ints: Vec<UnsignedInt>) -> Result<Self, Error> {
        let mut ints = ints.into_iter();
        match (
            ints.next(), ints.next(), ints.next(), ints.next(),
            ints.next(), ints.next(), ints.next(), ints.next(), ints.next(),
        ) {
            (
                Some(modulus), Some(public_exponent), Some(private_exponent),
                Some(prime1), Some(prime2), Some(exponent1), Some(exponent2),
                Some(coefficient), None
            ) => {
                Ok(RsaKey {
                    modulus, public_exponent,
                    private: Some(RsaPrivateKey {
                        private_exponent, prime1, prime2, exponent1,
                        exponent2, coefficient
                    })
                })
            }
            _ => Err(Error::malformed("invalid RSA private key"))
        }
    }

    /// Takes an `RSAPublicKey` value.
    ///
    /// ```txt
    /// RSAPublicKey ::= SEQUENCE {
    ///     modulus           INTEGER,  -- n
    ///     publicExponent    INTEGER   -- e
    /// }
    /// ```
    pub fn take_public_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(RsaKey {
                modulus: UnsignedInt::take_from(cons)?,
                public_exponent: UnsignedInt::take_from(cons)?,
                private: None,
            })
        })
    }

    pub fn encode_public(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.modulus.encode_ref(),
            self.public_exponent.encode_ref(),
        ))
    }

    fn encode_private<'a>(
        &'a self, private: &'a RsaPrivateKey
    ) -> impl encode::Values + 'a {
        encode::sequence((
            0u8.encode(),
            self.modulus.encode_ref(),
            self.public_exponent.encode_ref(),
            private.private_exponent.encode_ref(),
            private.prime1.encode_ref(),
            private.prime2.encode_ref(),
            private.exponent1.encode_ref(),
            private.exponent2.encode_ref(),
            private.coefficient.encode_ref(),
        ))
    }
}


//------------ DsaKey --------------------------------------------------------

/// The components of a DSA key.
///
/// A private key may lack the public value `y`. It is then derived from the
/// private value `x` whenever it is needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DsaKey {
    pub p: UnsignedInt,
    pub q: UnsignedInt,
    pub g: UnsignedInt,
    pub y: Option<UnsignedInt>,
    pub x: Option<UnsignedInt>,
    pub seed: Option<DsaSeed>,
}

/// The seed and counter used when generating the DSA domain parameters.
///
/// Neither the DER key formats nor OpenSSL provide these values, so no
/// decoder or generator fills them in. Callers that know them can add them
/// to a key for use in its CNG key blob.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DsaSeed {
    pub seed: Bytes,
    pub counter: u32,
}

impl DsaKey {
    /// Takes the `Dss-Parms` from the algorithm identifier parameters.
    ///
    /// ```txt
    /// Dss-Parms  ::=  SEQUENCE  {
    ///     p             INTEGER,
    ///     q             INTEGER,
    ///     g             INTEGER  }
    /// ```
    fn take_params_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(DsaKey {
                p: UnsignedInt::take_from(cons)?,
                q: UnsignedInt::take_from(cons)?,
                g: UnsignedInt::take_from(cons)?,
                y: None, x: None, seed: None,
            })
        })
    }

    fn params_from_algorithm(alg: &AlgorithmIdentifier) -> Result<Self, Error> {
        match alg.parameters() {
            Some(params) => {
                decode_der(params.as_slice(), Self::take_params_from)
            }
            None => Err(Error::malformed("missing DSA parameters")),
        }
    }

    /// Creates a key from the OpenSSL private key sequence.
    ///
    /// This is the sequence of the integers version, p, q, g, y, and x. The
    /// `ints` must not include the version.
    fn from_private_ints(ints: Vec<UnsignedInt>) -> Result<Self, Error> {
        let mut ints = ints.into_iter();
        match (
            ints.next(), ints.next(), ints.next(), ints.next(), ints.next(),
            ints.next()
        ) {
            (Some(p), Some(q), Some(g), Some(y), Some(x), None) => {
                Ok(DsaKey {
                    p, q, g, y: Some(y), x: Some(x), seed: None
                })
            }
            _ => Err(Error::malformed("invalid DSA private key"))
        }
    }

    /// Returns the public value.
    ///
    /// If only the private value is known, the public value is calculated
    /// as `g^x mod p` every time this method is called.
    pub fn public_value(&self) -> Result<UnsignedInt, Error> {
        if let Some(ref y) = self.y {
            return Ok(y.clone())
        }
        let x = self.x.as_ref().ok_or(Error::State(
            "DSA key has neither public nor private value"
        ))?;
        let (g, x, p) = (
            self.g.to_bignum()?, x.to_bignum()?, self.p.to_bignum()?
        );
        let mut ctx = BigNumContext::new()?;
        let mut y = BigNum::new()?;
        y.mod_exp(&*g, &*x, &*p, &mut ctx)?;
        Ok(UnsignedInt::from_bignum(&y))
    }

    fn encode_params(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.p.encode_ref(),
            self.q.encode_ref(),
            self.g.encode_ref(),
        ))
    }
}


//------------ EcParameters --------------------------------------------------

/// The domain parameters of an elliptic curve key.
///
/// ```txt
/// ECParameters ::= CHOICE {
///     namedCurve         OBJECT IDENTIFIER
///     implicitCurve      NULL
///     specifiedCurve     SpecifiedECDomain }
/// ```
///
/// The implicit curve is not supported.
#[derive(Clone, Debug)]
pub enum EcParameters {
    Named(Oid),
    Specified(Captured),
}

impl EcParameters {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        if let Some(id) = Oid::take_opt_from(cons)? {
            return Ok(EcParameters::Named(id))
        }
        cons.capture(|cons| {
            cons.take_sequence(|cons| cons.skip_all())
        }).map(EcParameters::Specified)
    }

    fn from_algorithm(alg: &AlgorithmIdentifier) -> Result<Self, Error> {
        match alg.parameters() {
            Some(params) => decode_der(params.as_slice(), Self::take_from),
            None => Err(Error::malformed("missing EC parameters")),
        }
    }

    /// Returns the named curve if the parameters name a supported one.
    pub fn curve(&self) -> Option<EcCurve> {
        match *self {
            EcParameters::Named(ref id) => EcCurve::from_oid(id),
            EcParameters::Specified(_) => None,
        }
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        match *self {
            EcParameters::Named(ref id) => {
                encode::Choice2::One(id.encode_ref())
            }
            EcParameters::Specified(ref params) => {
                encode::Choice2::Two(params)
            }
        }
    }

    fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }

    /// Creates the OpenSSL group for these parameters.
    fn group(&self) -> Result<EcGroup, Error> {
        match *self {
            EcParameters::Named(ref id) => {
                match EcCurve::from_oid(id) {
                    Some(curve) => {
                        EcGroup::from_curve_name(curve.nid()).map_err(
                            Into::into
                        )
                    }
                    None => Err(Error::unsupported(id))
                }
            }
            EcParameters::Specified(ref params) => {
                SpecifiedCurve::decode(params)?.group()
            }
        }
    }
}

impl PartialEq for EcParameters {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EcParameters::Named(left), EcParameters::Named(right)) => {
                left == right
            }
            (
                EcParameters::Specified(left), EcParameters::Specified(right)
            ) => {
                left.as_slice() == right.as_slice()
            }
            _ => false
        }
    }
}

impl Eq for EcParameters { }


//------------ SpecifiedCurve ------------------------------------------------

/// An explicitly specified prime field curve.
///
/// ```txt
/// SpecifiedECDomain ::= SEQUENCE {
///     version   SpecifiedECDomainVersion(ecdpVer1 | ecdpVer2 | ecdpVer3),
///     fieldID   FieldID {{FieldTypes}},
///     curve     Curve,
///     base      ECPoint,
///     order     INTEGER,
///     cofactor  INTEGER OPTIONAL,
///     hash      HashAlgorithm OPTIONAL,
///     ...
/// }
/// FieldID ::= SEQUENCE { fieldType OBJECT IDENTIFIER, parameters ANY }
/// Curve ::= SEQUENCE { a OCTET STRING, b OCTET STRING, seed BIT STRING OPTIONAL }
/// ```
struct SpecifiedCurve {
    prime: UnsignedInt,
    a: Bytes,
    b: Bytes,
    base: Bytes,
    order: UnsignedInt,
    cofactor: UnsignedInt,
}

impl SpecifiedCurve {
    fn decode(params: &Captured) -> Result<Self, Error> {
        decode_der(params.as_slice(), |cons| {
            cons.take_sequence(|cons| {
                let _version = cons.take_u8()?;
                let prime = cons.take_sequence(|cons| {
                    let field = Oid::take_from(cons)?;
                    if field != oid::PRIME_FIELD {
                        return Err(cons.content_err(
                            "only prime field curves are supported"
                        ))
                    }
                    UnsignedInt::take_from(cons)
                })?;
                let (a, b) = cons.take_sequence(|cons| {
                    let a = OctetString::take_from(cons)?.into_bytes();
                    let b = OctetString::take_from(cons)?.into_bytes();
                    cons.take_opt_value_if(
                        Tag::BIT_STRING, BitString::from_content
                    )?;
                    Ok((a, b))
                })?;
                let base = OctetString::take_from(cons)?.into_bytes();
                let order = UnsignedInt::take_from(cons)?;
                let cofactor = UnsignedInt::take_opt_from(cons)?.unwrap_or_else(
                    || UnsignedInt::from(1u64)
                );
                cons.skip_all()?;
                Ok(SpecifiedCurve { prime, a, b, base, order, cofactor })
            })
        })
    }

    fn group(&self) -> Result<EcGroup, Error> {
        let mut ctx = BigNumContext::new()?;
        let mut group = EcGroup::from_components(
            self.prime.to_bignum()?,
            BigNum::from_slice(&self.a)?,
            BigNum::from_slice(&self.b)?,
            &mut ctx,
        )?;
        let base = EcPoint::from_bytes(&group, &self.base, &mut ctx)?;
        group.set_generator(
            base, self.order.to_bignum()?, self.cofactor.to_bignum()?
        )?;
        Ok(group)
    }
}

//------------ EcKey ---------------------------------------------------------

/// The components of an elliptic curve key.
///
/// The coordinates of the public point and the private scalar are kept as
/// big-endian octets of the length required by the curve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EcKey {
    pub parameters: EcParameters,
    pub x: Bytes,
    pub y: Bytes,
    pub d: Option<Bytes>,
}

impl EcKey {
    /// Creates a key from an uncompressed public point.
    ///
    /// The point must start with 0x04 followed by X and Y of equal length.
    fn from_point(
        parameters: EcParameters, point: &[u8], d: Option<Bytes>
    ) -> Result<Self, Error> {
        match point.split_first() {
            Some((0x04, coords)) if !coords.is_empty()
                && coords.len() % 2 == 0 =>
            {
                let (x, y) = coords.split_at(coords.len() / 2);
                Ok(EcKey {
                    parameters,
                    x: Bytes::copy_from_slice(x),
                    y: Bytes::copy_from_slice(y),
                    d
                })
            }
            Some((0x02, _)) | Some((0x03, _)) => {
                Err(Error::malformed("compressed EC points are not supported"))
            }
            _ => Err(Error::malformed("invalid EC public point"))
        }
    }

    /// Creates a key from the private scalar only.
    ///
    /// The public point is calculated by multiplying the generator.
    fn from_scalar(parameters: EcParameters, d: Bytes) -> Result<Self, Error> {
        let group = parameters.group()?;
        let ctx = BigNumContext::new()?;
        let mut point = EcPoint::new(&group)?;
        let scalar = BigNum::from_slice(&d)?;
        point.mul_generator(&group, &*scalar, &ctx)?;
        let point = point_bytes(&group, &point)?;
        debug!("derived EC public point from private key");
        Self::from_point(parameters, &point, Some(d))
    }

    /// Returns the uncompressed public point.
    pub fn point(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.x.len() + self.y.len() + 1);
        res.push(0x04);
        res.extend_from_slice(&self.x);
        res.extend_from_slice(&self.y);
        res
    }

    /// Takes the content of an `ECPrivateKey` after the version and the
    /// private key.
    ///
    /// ```txt
    /// ECPrivateKey ::= SEQUENCE {
    ///     version        INTEGER { ecPrivkeyVer1(1) } (ecPrivkeyVer1),
    ///     privateKey     OCTET STRING,
    ///     parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
    ///     publicKey  [1] BIT STRING OPTIONAL
    /// }
    /// ```
    fn take_private_fields<S: decode::Source>(
        d: Bytes, cons: &mut decode::Constructed<S>
    ) -> Result<RawEcPrivateKey, DecodeError<S::Error>> {
        let parameters = cons.take_opt_constructed_if(
            Tag::CTX_0, EcParameters::take_from
        )?;
        let point = cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
            BitString::take_from(cons).map(|bits| bits.octet_bytes())
        })?;
        Ok(RawEcPrivateKey { d, parameters, point })
    }

    fn take_private_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<RawEcPrivateKey, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            cons.skip_u8_if(1)?;
            let d = OctetString::take_from(cons)?.into_bytes();
            Self::take_private_fields(d, cons)
        })
    }

    /// Encodes the `ECPrivateKey`, optionally with the parameters.
    fn encode_private<'a>(
        &'a self, d: &'a [u8], with_params: bool
    ) -> impl encode::Values + 'a {
        encode::sequence((
            1u8.encode(),
            OctetString::encode_slice(d),
            if with_params {
                Some(encode::sequence_as(
                    Tag::CTX_0, self.parameters.encode_ref()
                ))
            }
            else {
                None
            },
            encode::sequence_as(
                Tag::CTX_1, BitString::encode_slice(self.point(), 0)
            ),
        ))
    }
}

/// The decoded parts of an `ECPrivateKey`.
struct RawEcPrivateKey {
    d: Bytes,
    parameters: Option<EcParameters>,
    point: Option<Bytes>,
}

impl RawEcPrivateKey {
    /// Converts into a key.
    ///
    /// Parameters inside the private key override `outer` ones.
    fn into_key(self, outer: Option<EcParameters>) -> Result<EcKey, Error> {
        let parameters = match self.parameters.or(outer) {
            Some(parameters) => parameters,
            None => return Err(Error::malformed("missing EC parameters")),
        };
        match self.point {
            Some(point) => EcKey::from_point(parameters, &point, Some(self.d)),
            None => EcKey::from_scalar(parameters, self.d),
        }
    }
}

fn point_bytes(
    group: &openssl::ec::EcGroupRef, point: &openssl::ec::EcPointRef
) -> Result<Vec<u8>, Error> {
    let mut ctx = BigNumContext::new()?;
    point.to_bytes(
        group, PointConversionForm::UNCOMPRESSED, &mut ctx
    ).map_err(Into::into)
}


//------------ KeyMaterial ---------------------------------------------------

/// The components of a key of one of the supported families.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyMaterial {
    Rsa(RsaKey),
    Dsa(DsaKey),
    Ecdsa(EcKey),
}

impl KeyMaterial {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match *self {
            KeyMaterial::Rsa(_) => KeyAlgorithm::Rsa,
            KeyMaterial::Dsa(_) => KeyAlgorithm::Dsa,
            KeyMaterial::Ecdsa(_) => KeyAlgorithm::Ecdsa,
        }
    }

    pub fn is_public_only(&self) -> bool {
        match *self {
            KeyMaterial::Rsa(ref key) => key.private.is_none(),
            KeyMaterial::Dsa(ref key) => key.x.is_none(),
            KeyMaterial::Ecdsa(ref key) => key.d.is_none(),
        }
    }

    /// Returns a copy with all private parts removed.
    pub fn to_public(&self) -> Result<Self, Error> {
        Ok(match *self {
            KeyMaterial::Rsa(ref key) => {
                KeyMaterial::Rsa(RsaKey { private: None, ..key.clone() })
            }
            KeyMaterial::Dsa(ref key) => {
                KeyMaterial::Dsa(DsaKey {
                    y: Some(key.public_value()?),
                    x: None,
                    ..key.clone()
                })
            }
            KeyMaterial::Ecdsa(ref key) => {
                KeyMaterial::Ecdsa(EcKey { d: None, ..key.clone() })
            }
        })
    }
}


//------------ NativeKey -----------------------------------------------------

/// An OpenSSL key handle.
#[derive(Clone)]
pub enum NativeKey {
    Private(PKey<Private>),
    Public(PKey<Public>),
}

impl NativeKey {
    pub fn id(&self) -> Id {
        match *self {
            NativeKey::Private(ref key) => key.id(),
            NativeKey::Public(ref key) => key.id(),
        }
    }

    pub fn bits(&self) -> u32 {
        match *self {
            NativeKey::Private(ref key) => key.bits(),
            NativeKey::Public(ref key) => key.bits(),
        }
    }
}

impl fmt::Debug for NativeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NativeKey::Private(_) => f.write_str("NativeKey::Private(..)"),
            NativeKey::Public(_) => f.write_str("NativeKey::Public(..)"),
        }
    }
}


//------------ AsymmetricKeyPair ---------------------------------------------

/// An asymmetric key with or without its private part.
///
/// The key components are decoded once and immutable afterwards. The
/// OpenSSL key handle needed for signing and verifying is created from them
/// on first use and then kept until the key is disposed of. Creation happens
/// exactly once even if the value is shared between threads.
pub struct AsymmetricKeyPair {
    material: KeyMaterial,
    native: OnceLock<NativeKey>,
    init: Mutex<()>,
    disposed: bool,
}

/// # Creation
///
impl AsymmetricKeyPair {
    pub fn new(material: KeyMaterial) -> Self {
        AsymmetricKeyPair {
            material,
            native: OnceLock::new(),
            init: Mutex::new(()),
            disposed: false,
        }
    }

    fn with_native(material: KeyMaterial, native: NativeKey) -> Self {
        let res = Self::new(material);
        let _ = res.native.set(native);
        res
    }

    /// Generates a new RSA key with the given modulus size.
    pub fn generate_rsa(bits: u32) -> Result<Self, Error> {
        Self::from_private_pkey(PKey::from_rsa(Rsa::generate(bits)?)?)
    }

    /// Generates a new DSA key with the given size of p.
    pub fn generate_dsa(bits: u32) -> Result<Self, Error> {
        Self::from_private_pkey(PKey::from_dsa(Dsa::generate(bits)?)?)
    }

    /// Generates a new ECDSA key on the given curve.
    pub fn generate_ecdsa(curve: EcCurve) -> Result<Self, Error> {
        let group = EcGroup::from_curve_name(curve.nid())?;
        Self::from_private_pkey(
            PKey::from_ec_key(OpenSslEcKey::generate(&group)?)?
        )
    }

    /// Creates a key from an OpenSSL private key.
    pub fn from_private_pkey(pkey: PKey<Private>) -> Result<Self, Error> {
        let material = match pkey.id() {
            Id::RSA => {
                let rsa = pkey.rsa()?;
                let private = match (
                    rsa.p(), rsa.q(), rsa.dmp1(), rsa.dmq1(), rsa.iqmp()
                ) {
                    (Some(p), Some(q), Some(dp), Some(dq), Some(qi)) => {
                        RsaPrivateKey {
                            private_exponent: UnsignedInt::from_bignum(
                                rsa.d()
                            ),
                            prime1: UnsignedInt::from_bignum(p),
                            prime2: UnsignedInt::from_bignum(q),
                            exponent1: UnsignedInt::from_bignum(dp),
                            exponent2: UnsignedInt::from_bignum(dq),
                            coefficient: UnsignedInt::from_bignum(qi),
                        }
                    }
                    _ => {
                        return Err(Error::unsupported(
                            "RSA key without CRT parameters"
                        ))
                    }
                };
                KeyMaterial::Rsa(RsaKey {
                    modulus: UnsignedInt::from_bignum(rsa.n()),
                    public_exponent: UnsignedInt::from_bignum(rsa.e()),
                    private: Some(private),
                })
            }
            Id::DSA => {
                let dsa = pkey.dsa()?;
                KeyMaterial::Dsa(DsaKey {
                    p: UnsignedInt::from_bignum(dsa.p()),
                    q: UnsignedInt::from_bignum(dsa.q()),
                    g: UnsignedInt::from_bignum(dsa.g()),
                    y: Some(UnsignedInt::from_bignum(dsa.pub_key())),
                    x: Some(UnsignedInt::from_bignum(dsa.priv_key())),
                    seed: None,
                })
            }
            Id::EC => {
                let ec = pkey.ec_key()?;
                let (parameters, len) = native_curve(ec.group())?;
                let point = point_bytes(ec.group(), ec.public_key())?;
                let d = ec.private_key().to_vec_padded(len as i32)?;
                KeyMaterial::Ecdsa(
                    EcKey::from_point(parameters, &point, Some(d.into()))?
                )
            }
            other => {
                return Err(Error::unsupported(
                    format!("key type {}", other.as_raw())
                ))
            }
        };
        Ok(Self::with_native(material, NativeKey::Private(pkey)))
    }

    /// Creates a key from an OpenSSL public key.
    pub fn from_public_pkey(pkey: PKey<Public>) -> Result<Self, Error> {
        let material = match pkey.id() {
            Id::RSA => {
                let rsa = pkey.rsa()?;
                KeyMaterial::Rsa(RsaKey {
                    modulus: UnsignedInt::from_bignum(rsa.n()),
                    public_exponent: UnsignedInt::from_bignum(rsa.e()),
                    private: None,
                })
            }
            Id::DSA => {
                let dsa = pkey.dsa()?;
                KeyMaterial::Dsa(DsaKey {
                    p: UnsignedInt::from_bignum(dsa.p()),
                    q: UnsignedInt::from_bignum(dsa.q()),
                    g: UnsignedInt::from_bignum(dsa.g()),
                    y: Some(UnsignedInt::from_bignum(dsa.pub_key())),
                    x: None,
                    seed: None,
                })
            }
            Id::EC => {
                let ec = pkey.ec_key()?;
                let (parameters, _) = native_curve(ec.group())?;
                let point = point_bytes(ec.group(), ec.public_key())?;
                KeyMaterial::Ecdsa(EcKey::from_point(parameters, &point, None)?)
            }
            other => {
                return Err(Error::unsupported(
                    format!("key type {}", other.as_raw())
                ))
            }
        };
        Ok(Self::with_native(material, NativeKey::Public(pkey)))
    }
}

/// Returns the parameters and coordinate length of an OpenSSL group.
fn native_curve(
    group: &openssl::ec::EcGroupRef
) -> Result<(EcParameters, usize), Error> {
    match group.curve_name().and_then(EcCurve::from_nid) {
        Some(curve) => {
            Ok((
                EcParameters::Named(to_oid(curve.oid())),
                curve.coordinate_len()
            ))
        }
        None => Err(Error::unsupported("unnamed EC curve"))
    }
}


/// # Decoding
///
impl AsymmetricKeyPair {
    /// Decodes a private key in any of the supported formats.
    ///
    /// The format is determined from the field following the version:
    /// a SEQUENCE is the algorithm identifier of a PKCS #8
    /// `PrivateKeyInfo`, an OCTET STRING is the private key of an
    /// `ECPrivateKey`, and otherwise the number of INTEGERs determines
    /// whether this is an RSA or DSA private key.
    pub fn decode_private_key(der: &[u8]) -> Result<Self, Error> {
        let container = decode_der(der, |cons| {
            cons.take_sequence(PrivateKeyContainer::from_constructed)
        })?;
        container.into_material().map(Self::new)
    }

    /// Decodes a private key expecting a certain algorithm.
    pub fn decode_private_key_for(
        der: &[u8], expected: KeyAlgorithm
    ) -> Result<Self, Error> {
        let res = Self::decode_private_key(der)?;
        if res.algorithm() != expected {
            return Err(Error::mismatch(
                expected.name(), res.algorithm().oid()
            ))
        }
        Ok(res)
    }

    /// Decodes a `SubjectPublicKeyInfo`.
    ///
    /// ```txt
    /// SubjectPublicKeyInfo  ::=  SEQUENCE  {
    ///     algorithm            AlgorithmIdentifier,
    ///     subjectPublicKey     BIT STRING  }
    /// ```
    pub fn decode_public_key(der: &[u8]) -> Result<Self, Error> {
        let (alg, bits) = decode_der(der, |cons| {
            cons.take_sequence(|cons| {
                Ok((
                    AlgorithmIdentifier::take_from(cons)?,
                    BitString::take_from(cons)?.octet_bytes(),
                ))
            })
        })?;
        Self::from_public_key_parts(&alg, &bits)
    }

    /// Decodes a `SubjectPublicKeyInfo` expecting a certain algorithm.
    pub fn decode_public_key_for(
        der: &[u8], expected: KeyAlgorithm
    ) -> Result<Self, Error> {
        let res = Self::decode_public_key(der)?;
        if res.algorithm() != expected {
            return Err(Error::mismatch(
                expected.name(), res.algorithm().oid()
            ))
        }
        Ok(res)
    }

    /// Creates a public key from an algorithm identifier and key bits.
    ///
    /// For RSA, the key bits are an `RSAPublicKey`. For DSA, the algorithm
    /// parameters carry p, q, and g while the key bits are the INTEGER y.
    /// For ECDSA, the parameters name or specify the curve and the key bits
    /// are the uncompressed public point.
    pub fn from_public_key_parts(
        alg: &AlgorithmIdentifier, bits: &[u8]
    ) -> Result<Self, Error> {
        let family = match KeyAlgorithm::from_oid(alg.algorithm()) {
            Some(family) => family,
            None => return Err(Error::unsupported(alg.algorithm()))
        };
        let material = match family {
            KeyAlgorithm::Rsa => {
                KeyMaterial::Rsa(decode_der(bits, RsaKey::take_public_from)?)
            }
            KeyAlgorithm::Dsa => {
                let mut key = DsaKey::params_from_algorithm(alg)?;
                key.y = Some(decode_der(bits, UnsignedInt::take_from)?);
                KeyMaterial::Dsa(key)
            }
            KeyAlgorithm::Ecdsa => {
                KeyMaterial::Ecdsa(EcKey::from_point(
                    EcParameters::from_algorithm(alg)?, bits, None
                )?)
            }
        };
        Ok(Self::new(material))
    }

    /// Decodes a bare PKCS #1 `RSAPublicKey`.
    pub fn decode_rsa_public_key(der: &[u8]) -> Result<Self, Error> {
        decode_der(der, RsaKey::take_public_from).map(|key| {
            Self::new(KeyMaterial::Rsa(key))
        })
    }
}


//------------ PrivateKeyContainer -------------------------------------------

/// The outer layer of a private key of unknown format.
enum PrivateKeyContainer {
    /// A PKCS #8 `PrivateKeyInfo`.
    ///
    /// ```txt
    /// PrivateKeyInfo ::= SEQUENCE {
    ///     version                   Version,
    ///     privateKeyAlgorithm       AlgorithmIdentifier,
    ///     privateKey                OCTET STRING,
    ///     attributes           [0]  IMPLICIT Attributes OPTIONAL }
    /// ```
    Pkcs8 {
        algorithm: AlgorithmIdentifier,
        payload: Bytes,
    },

    /// An `ECPrivateKey`.
    Ec(RawEcPrivateKey),

    /// A sequence of INTEGERs, excluding the version.
    Integers(Vec<UnsignedInt>),
}

impl PrivateKeyContainer {
    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let _version = cons.take_u8()?;
        if let Some(algorithm) = cons.take_opt_sequence(
            AlgorithmIdentifier::from_constructed
        )? {
            let payload = OctetString::take_from(cons)?.into_bytes();
            // Attributes and, for version 2, the public key.
            cons.skip_all()?;
            return Ok(PrivateKeyContainer::Pkcs8 { algorithm, payload })
        }
        if let Some(d) = OctetString::take_opt_from(cons)? {
            return EcKey::take_private_fields(
                d.into_bytes(), cons
            ).map(PrivateKeyContainer::Ec)
        }
        take_integers(cons).map(PrivateKeyContainer::Integers)
    }

    fn into_material(self) -> Result<KeyMaterial, Error> {
        match self {
            PrivateKeyContainer::Pkcs8 { algorithm, payload } => {
                Self::pkcs8_material(&algorithm, &payload)
            }
            PrivateKeyContainer::Ec(raw) => {
                raw.into_key(None).map(KeyMaterial::Ecdsa)
            }
            PrivateKeyContainer::Integers(ints) => {
                match ints.len() {
                    8 => RsaKey::from_private_ints(ints).map(KeyMaterial::Rsa),
                    5 => DsaKey::from_private_ints(ints).map(KeyMaterial::Dsa),
                    _ => Err(Error::malformed("unknown private key format"))
                }
            }
        }
    }

    fn pkcs8_material(
        algorithm: &AlgorithmIdentifier, payload: &[u8]
    ) -> Result<KeyMaterial, Error> {
        match KeyAlgorithm::from_oid(algorithm.algorithm()) {
            Some(KeyAlgorithm::Rsa) => {
                let ints = decode_der(payload, |cons| {
                    cons.take_sequence(|cons| {
                        cons.skip_u8_if(0)?;
                        take_integers(cons)
                    })
                })?;
                RsaKey::from_private_ints(ints).map(KeyMaterial::Rsa)
            }
            Some(KeyAlgorithm::Dsa) => {
                let mut key = DsaKey::params_from_algorithm(algorithm)?;
                key.x = Some(decode_der(payload, UnsignedInt::take_from)?);
                Ok(KeyMaterial::Dsa(key))
            }
            Some(KeyAlgorithm::Ecdsa) => {
                let outer = EcParameters::from_algorithm(algorithm)?;
                decode_der(payload, EcKey::take_private_from)?.into_key(
                    Some(outer)
                ).map(KeyMaterial::Ecdsa)
            }
            None => Err(Error::unsupported(algorithm.algorithm()))
        }
    }
}

/// Takes all remaining values as INTEGERs.
fn take_integers<S: decode::Source>(
    cons: &mut decode::Constructed<S>
) -> Result<Vec<UnsignedInt>, DecodeError<S::Error>> {
    let mut res = Vec::new();
    while let Some(value) = UnsignedInt::take_opt_from(cons)? {
        res.push(value)
    }
    Ok(res)
}


/// # Encoding
///
impl AsymmetricKeyPair {
    /// Returns the algorithm specific private key encoding.
    ///
    /// This is an `RSAPrivateKey` for RSA, the OpenSSL private key
    /// sequence for DSA, and an `ECPrivateKey` with parameters for ECDSA.
    pub fn to_pkcs1(&self) -> Result<Bytes, Error> {
        Ok(match self.material {
            KeyMaterial::Rsa(ref key) => {
                let private = key.private.as_ref().ok_or(PUBLIC_ONLY)?;
                captured(key.encode_private(private))
            }
            KeyMaterial::Dsa(ref key) => {
                let x = key.x.as_ref().ok_or(PUBLIC_ONLY)?;
                let y = key.public_value()?;
                captured(encode::sequence((
                    0u8.encode(),
                    key.p.encode_ref(),
                    key.q.encode_ref(),
                    key.g.encode_ref(),
                    y.encode_ref(),
                    x.encode_ref(),
                )))
            }
            KeyMaterial::Ecdsa(ref key) => {
                let d = key.d.as_ref().ok_or(PUBLIC_ONLY)?;
                captured(key.encode_private(d, true))
            }
        })
    }

    /// Returns the PKCS #8 `PrivateKeyInfo` encoding.
    pub fn to_pkcs8(&self) -> Result<Bytes, Error> {
        let (algorithm, payload) = match self.material {
            KeyMaterial::Rsa(ref key) => {
                let private = key.private.as_ref().ok_or(PUBLIC_ONLY)?;
                (
                    AlgorithmIdentifier::with_null(&oid::RSA_ENCRYPTION),
                    captured(key.encode_private(private))
                )
            }
            KeyMaterial::Dsa(ref key) => {
                let x = key.x.as_ref().ok_or(PUBLIC_ONLY)?;
                (self.algorithm_identifier(), captured(x.encode_ref()))
            }
            KeyMaterial::Ecdsa(ref key) => {
                let d = key.d.as_ref().ok_or(PUBLIC_ONLY)?;
                (
                    self.algorithm_identifier(),
                    captured(key.encode_private(d, false))
                )
            }
        };
        Ok(captured(encode::sequence((
            0u8.encode(),
            algorithm.encode_ref(),
            OctetString::encode_slice(payload),
        ))))
    }

    /// Returns the algorithm identifier of the public key.
    pub fn algorithm_identifier(&self) -> AlgorithmIdentifier {
        match self.material {
            KeyMaterial::Rsa(_) => {
                AlgorithmIdentifier::with_null(&oid::RSA_ENCRYPTION)
            }
            KeyMaterial::Dsa(ref key) => {
                AlgorithmIdentifier::new(
                    to_oid(&oid::DSA),
                    Some(Captured::from_values(
                        Mode::Der, key.encode_params()
                    ))
                )
            }
            KeyMaterial::Ecdsa(ref key) => {
                AlgorithmIdentifier::new(
                    to_oid(&oid::EC_PUBLIC_KEY),
                    Some(key.parameters.to_captured())
                )
            }
        }
    }

    /// Returns the content of the subject public key bit string.
    pub fn public_key_bits(&self) -> Result<Bytes, Error> {
        Ok(match self.material {
            KeyMaterial::Rsa(ref key) => captured(key.encode_public()),
            KeyMaterial::Dsa(ref key) => {
                captured(key.public_value()?.encode())
            }
            KeyMaterial::Ecdsa(ref key) => key.point().into(),
        })
    }

    /// Returns the `SubjectPublicKeyInfo` encoding.
    pub fn to_public_key_info(&self) -> Result<Bytes, Error> {
        let bits = self.public_key_bits()?;
        Ok(captured(encode::sequence((
            self.algorithm_identifier().encode_ref(),
            BitString::encode_slice(bits, 0),
        ))))
    }

    /// Encodes the key.
    ///
    /// Keys with a private part are encoded as PKCS #8, public keys as
    /// `SubjectPublicKeyInfo`.
    pub fn encode(&self) -> Result<Bytes, Error> {
        if self.is_public_only() {
            self.to_public_key_info()
        }
        else {
            self.to_pkcs8()
        }
    }

    /// Returns the key identifier.
    ///
    /// This is the SHA-1 hash over the public key bits.
    pub fn key_identifier(&self) -> Result<Vec<u8>, Error> {
        Ok(digest::sha1(&self.public_key_bits()?))
    }

    /// Returns a new value with the public part of this key only.
    pub fn to_public(&self) -> Result<Self, Error> {
        self.material.to_public().map(Self::new)
    }
}

const PUBLIC_ONLY: Error = Error::State("key has no private part");

fn captured<V: Values>(values: V) -> Bytes {
    Captured::from_values(Mode::Der, values).into_bytes()
}


/// # Access to the Key
///
impl AsymmetricKeyPair {
    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.material.algorithm()
    }

    pub fn algorithm_oid(&self) -> &'static bcder::ConstOid {
        self.algorithm().oid()
    }

    pub fn is_public_only(&self) -> bool {
        self.material.is_public_only()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns the size of the key in bits.
    pub fn key_size(&self) -> usize {
        match self.material {
            KeyMaterial::Rsa(ref key) => key.modulus.bit_len(),
            KeyMaterial::Dsa(ref key) => key.p.bit_len(),
            KeyMaterial::Ecdsa(ref key) => {
                match key.parameters.curve() {
                    Some(EcCurve::P521) => 521,
                    _ => key.x.len() * 8,
                }
            }
        }
    }

    /// Returns the OpenSSL key handle.
    ///
    /// The handle is created on first use and cached afterwards.
    pub fn asymmetric_key(&self) -> Result<&NativeKey, Error> {
        if self.disposed {
            return Err(Error::State("key has been disposed"))
        }
        if let Some(native) = self.native.get() {
            return Ok(native)
        }
        let _guard = self.init.lock().map_err(|_| {
            Error::State("key initialization poisoned")
        })?;
        if let Some(native) = self.native.get() {
            return Ok(native)
        }
        let native = self.create_native()?;
        Ok(self.native.get_or_init(|| native))
    }

    /// Releases the key handle.
    ///
    /// Any later attempt to use the key for signing or verification fails.
    pub fn dispose(&mut self) {
        self.native.take();
        self.disposed = true;
    }

    fn create_native(&self) -> Result<NativeKey, Error> {
        debug!("creating {} key handle", self.algorithm());
        match self.material {
            KeyMaterial::Rsa(ref key) => {
                match key.private {
                    Some(ref private) => {
                        let rsa = Rsa::from_private_components(
                            key.modulus.to_bignum()?,
                            key.public_exponent.to_bignum()?,
                            private.private_exponent.to_bignum()?,
                            private.prime1.to_bignum()?,
                            private.prime2.to_bignum()?,
                            private.exponent1.to_bignum()?,
                            private.exponent2.to_bignum()?,
                            private.coefficient.to_bignum()?,
                        )?;
                        Ok(NativeKey::Private(PKey::from_rsa(rsa)?))
                    }
                    None => {
                        let rsa = Rsa::from_public_components(
                            key.modulus.to_bignum()?,
                            key.public_exponent.to_bignum()?,
                        )?;
                        Ok(NativeKey::Public(PKey::from_rsa(rsa)?))
                    }
                }
            }
            KeyMaterial::Dsa(ref key) => {
                let y = key.public_value()?.to_bignum()?;
                match key.x {
                    Some(ref x) => {
                        let dsa = Dsa::from_private_components(
                            key.p.to_bignum()?, key.q.to_bignum()?,
                            key.g.to_bignum()?, x.to_bignum()?, y,
                        )?;
                        Ok(NativeKey::Private(PKey::from_dsa(dsa)?))
                    }
                    None => {
                        let dsa = Dsa::from_public_components(
                            key.p.to_bignum()?, key.q.to_bignum()?,
                            key.g.to_bignum()?, y,
                        )?;
                        Ok(NativeKey::Public(PKey::from_dsa(dsa)?))
                    }
                }
            }
            KeyMaterial::Ecdsa(ref key) => {
                let group = key.parameters.group()?;
                let mut ctx = BigNumContext::new()?;
                let point = EcPoint::from_bytes(&group, &key.point(), &mut ctx)?;
                match key.d {
                    Some(ref d) => {
                        let d = BigNum::from_slice(d)?;
                        let ec = OpenSslEcKey::from_private_components(
                            &group, &*d, &point
                        )?;
                        ec.check_key()?;
                        Ok(NativeKey::Private(PKey::from_ec_key(ec)?))
                    }
                    None => {
                        let ec = OpenSslEcKey::from_public_key(
                            &group, &point
                        )?;
                        Ok(NativeKey::Public(PKey::from_ec_key(ec)?))
                    }
                }
            }
        }
    }
}


//--- Clone, PartialEq, and Debug

impl Clone for AsymmetricKeyPair {
    fn clone(&self) -> Self {
        let res = AsymmetricKeyPair {
            material: self.material.clone(),
            native: OnceLock::new(),
            init: Mutex::new(()),
            disposed: self.disposed,
        };
        if let Some(native) = self.native.get() {
            let _ = res.native.set(native.clone());
        }
        res
    }
}

impl PartialEq for AsymmetricKeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.material == other.material
    }
}

impl Eq for AsymmetricKeyPair { }

impl fmt::Debug for AsymmetricKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AsymmetricKeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_only", &self.is_public_only())
            .field("disposed", &self.disposed)
            .finish()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rsa_pkcs1_to_pkcs8() {
        let key = AsymmetricKeyPair::generate_rsa(2048).unwrap();
        let pkcs1 = key.to_pkcs1().unwrap();
        let from_pkcs1 = AsymmetricKeyPair::decode_private_key(&pkcs1)
            .unwrap();
        assert_eq!(from_pkcs1, key);
        let pkcs8 = from_pkcs1.to_pkcs8().unwrap();
        let from_pkcs8 = AsymmetricKeyPair::decode_private_key(&pkcs8)
            .unwrap();
        assert_eq!(from_pkcs8, key);
        assert_eq!(from_pkcs8.key_size(), 2048);
    }

    #[test]
    fn pkcs8_matches_openssl() {
        let key = AsymmetricKeyPair::generate_rsa(2048).unwrap();
        let pkey = match key.asymmetric_key().unwrap() {
            NativeKey::Private(pkey) => pkey.clone(),
            NativeKey::Public(_) => panic!("public key")
        };
        let openssl = pkey.private_key_to_pkcs8().unwrap();
        assert_eq!(key.to_pkcs8().unwrap().as_ref(), openssl.as_slice());
        assert_eq!(
            key.to_pkcs1().unwrap().as_ref(),
            pkey.rsa().unwrap().private_key_to_der().unwrap().as_slice()
        );
        assert_eq!(
            key.to_public_key_info().unwrap().as_ref(),
            pkey.public_key_to_der().unwrap().as_slice()
        );
    }

    #[test]
    fn dsa_derives_public_value() {
        let key = AsymmetricKeyPair::generate_dsa(1024).unwrap();
        let pkcs8 = key.to_pkcs8().unwrap();
        let decoded = AsymmetricKeyPair::decode_private_key(&pkcs8).unwrap();
        let dsa = match decoded.material() {
            KeyMaterial::Dsa(dsa) => dsa.clone(),
            _ => panic!("not DSA")
        };
        assert!(dsa.y.is_none());
        let original = match key.material() {
            KeyMaterial::Dsa(dsa) => dsa.clone(),
            _ => panic!("not DSA")
        };
        assert_eq!(dsa.public_value().unwrap(), original.y.unwrap());
        assert_eq!(
            decoded.to_public_key_info().unwrap(),
            key.to_public_key_info().unwrap()
        );
    }

    #[test]
    fn ec_private_without_public_point() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let d = match key.material() {
            KeyMaterial::Ecdsa(ec) => ec.d.clone().unwrap(),
            _ => panic!("not EC")
        };
        let sec1 = captured(encode::sequence((
            1u8.encode(),
            OctetString::encode_slice(d.as_ref()),
            encode::sequence_as(Tag::CTX_0, oid::SECP256R1.encode()),
        )));
        let decoded = AsymmetricKeyPair::decode_private_key(&sec1).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn ec_point_formats() {
        let params = EcParameters::Named(to_oid(&oid::SECP256R1));
        let mut point = vec![0x04];
        point.extend_from_slice(&[1; 64]);
        let key = EcKey::from_point(params.clone(), &point, None).unwrap();
        assert_eq!(key.x.len(), 32);
        assert_eq!(key.point(), point);

        point[0] = 0x02;
        assert!(EcKey::from_point(params.clone(), &point, None).is_err());
        assert!(EcKey::from_point(params, &[0x04, 1, 2, 3], None).is_err());
    }

    #[test]
    fn algorithm_mismatch() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P384).unwrap();
        let pkcs8 = key.to_pkcs8().unwrap();
        assert!(matches!(
            AsymmetricKeyPair::decode_private_key_for(
                &pkcs8, KeyAlgorithm::Rsa
            ),
            Err(Error::AlgorithmMismatch { .. })
        ));
        assert!(
            AsymmetricKeyPair::decode_private_key_for(
                &pkcs8, KeyAlgorithm::Ecdsa
            ).is_ok()
        );
        let spki = key.to_public_key_info().unwrap();
        assert!(matches!(
            AsymmetricKeyPair::decode_public_key_for(
                &spki, KeyAlgorithm::Dsa
            ),
            Err(Error::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn public_only_key() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P521).unwrap();
        let public = AsymmetricKeyPair::decode_public_key(
            &key.to_public_key_info().unwrap()
        ).unwrap();
        assert!(public.is_public_only());
        assert_eq!(public.key_size(), 521);
        assert!(matches!(public.to_pkcs8(), Err(Error::State(_))));
        assert!(matches!(
            public.asymmetric_key().unwrap(), NativeKey::Public(_)
        ));
        assert_eq!(public.encode().unwrap(), key.to_public_key_info().unwrap());
        assert_eq!(
            public.key_identifier().unwrap(), key.key_identifier().unwrap()
        );
    }

    #[test]
    fn handle_is_memoized_and_disposed() {
        let mut key = AsymmetricKeyPair::decode_private_key(
            &AsymmetricKeyPair::generate_rsa(1024).unwrap().to_pkcs1()
                .unwrap()
        ).unwrap();
        let first = key.asymmetric_key().unwrap() as *const NativeKey;
        let second = key.asymmetric_key().unwrap() as *const NativeKey;
        assert_eq!(first, second);
        key.dispose();
        assert!(key.is_disposed());
        assert!(matches!(key.asymmetric_key(), Err(Error::State(_))));
    }

    #[test]
    fn handle_created_once_across_threads() {
        let key = AsymmetricKeyPair::decode_private_key(
            &AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap()
                .to_pkcs8().unwrap()
        ).unwrap();
        let addrs: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4).map(|_| {
                scope.spawn(|| {
                    key.asymmetric_key().unwrap() as *const NativeKey as usize
                })
            }).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addrs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn malformed_private_keys() {
        assert!(AsymmetricKeyPair::decode_private_key(b"").is_err());
        // SEQUENCE { INTEGER 0, INTEGER 1, INTEGER 2 }
        assert!(
            AsymmetricKeyPair::decode_private_key(
                b"\x30\x09\x02\x01\x00\x02\x01\x01\x02\x01\x02"
            ).unwrap_err().is_malformed()
        );
    }
}
