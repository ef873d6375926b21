//! Certificate Revocation Lists.
//!
//! This module implements the CRLs of the Internet X.509 profile defined
//! in RFC 5280 via the type [`Crl`]. A CRL is decoded once from its DER
//! encoding and is immutable afterwards. New CRLs are created through the
//! [`CrlBuilder`].
//!
//! ```txt
//! CertificateList  ::=  SEQUENCE  {
//!      tbsCertList          TBSCertList,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING  }
//!
//! TBSCertList  ::=  SEQUENCE  {
//!      version                 Version OPTIONAL,
//!      signature               AlgorithmIdentifier,
//!      issuer                  Name,
//!      thisUpdate              Time,
//!      nextUpdate              Time OPTIONAL,
//!      revokedCertificates     SEQUENCE OF SEQUENCE  {
//!           userCertificate         CertificateSerialNumber,
//!           revocationDate          Time,
//!           crlEntryExtensions      Extensions OPTIONAL
//!      }  OPTIONAL,
//!      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL  }
//! ```

pub use self::builder::CrlBuilder;
pub use self::dump::DumpOptions;

pub mod builder;
pub mod dump;

use std::collections::HashSet;
use std::fmt;
use bcder::{decode, encode};
use bcder::{Captured, Mode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use log::trace;
use crate::oid;
use crate::crypto::digest;
use crate::crypto::keys::AsymmetricKeyPair;
use crate::error::Error;
use crate::ext::{
    AuthorityKeyIdentifier, CertificateIssuer, CrlNumber, Extension,
    ExtensionCodec, ExtensionRegistry, Extensions, FreshestCrl,
    InvalidityDate, IssuingDistributionPoint, NextCrlPublish, ReasonCode,
};
use crate::ext::CrlReason;
use crate::util::hex::{self, HexError};
use crate::util::int::UnsignedInt;
use crate::util::pem;
use crate::x509::{decode_der, AlgorithmIdentifier, Name, SignedData, Time};


//------------ CrlType -------------------------------------------------------

/// Whether a CRL is a complete or a delta CRL.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrlType {
    /// A complete CRL.
    #[default]
    Base,

    /// A CRL with a Delta CRL Indicator extension.
    Delta,
}

impl fmt::Display for CrlType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            CrlType::Base => "Base",
            CrlType::Delta => "Delta",
        })
    }
}


//------------ Crl -----------------------------------------------------------

/// A certificate revocation list.
///
/// A value of this type is the result of decoding a DER encoded CRL. The
/// type of the CRL, its number and its thumbprint are determined while
/// decoding.
#[derive(Clone, Debug)]
pub struct Crl {
    /// The complete encoded CRL.
    raw: Bytes,

    /// The outer structure of the CRL.
    signed_data: SignedData,

    /// The version number, i.e., 1 or 2.
    version: u8,

    /// The name of the issuer.
    issuer: Name,

    /// The time this version of the CRL was created.
    this_update: Time,

    /// The time the next version of the CRL will be created.
    ///
    /// If this is missing, the CRL never expires.
    next_update: Option<Time>,

    /// The list of revoked certificates in the order they appear.
    entries: Vec<CrlEntry>,

    /// The CRL extensions.
    extensions: Extensions,

    crl_type: CrlType,
    crl_number: UnsignedInt,

    /// The SHA-256 hash of `raw` as upper case hex.
    thumbprint: String,

    /// An optional cache of the serial numbers in the CRL.
    serials: Option<HashSet<UnsignedInt>>,
}

/// # Decoding and Encoding
///
impl Crl {
    /// Decodes a DER encoded CRL using the built-in extensions.
    pub fn decode(der: &[u8]) -> Result<Self, Error> {
        Self::decode_with(der, ExtensionRegistry::global())
    }

    /// Decodes a CRL that is either DER or PEM encoded.
    pub fn decode_any(input: &[u8]) -> Result<Self, Error> {
        let der = pem::to_der(input).map_err(|err| {
            Error::malformed(err.to_string())
        })?;
        Self::decode(&der)
    }

    /// Decodes a DER encoded CRL resolving extensions through `registry`.
    pub fn decode_with(
        der: &[u8], registry: &ExtensionRegistry
    ) -> Result<Self, Error> {
        let signed_data = decode_der(der, SignedData::take_from)?;
        let tbs = decode_der(signed_data.data().as_slice(), |cons| {
            cons.take_sequence(|cons| {
                let mut decoder = TbsDecoder::new(
                    signed_data.algorithm(), registry
                );
                let mut state = State::Start;
                while state != State::Done {
                    let next = decoder.step(state, cons)?;
                    trace!("CRL decoder: {:?} -> {:?}", state, next);
                    state = next;
                }
                Ok(decoder)
            })
        })?.finish()?;

        let crl_type = if tbs.extensions.contains(
            &oid::CE_DELTA_CRL_INDICATOR
        ) {
            CrlType::Delta
        }
        else {
            CrlType::Base
        };
        let crl_number = tbs.extensions.find::<CrlNumber>().map(|number| {
            number.number().clone()
        }).unwrap_or_default();

        Ok(Crl {
            raw: Bytes::copy_from_slice(der),
            signed_data,
            version: tbs.version,
            issuer: tbs.issuer,
            this_update: tbs.this_update,
            next_update: tbs.next_update,
            entries: tbs.entries,
            extensions: tbs.extensions,
            crl_type,
            crl_number,
            thumbprint: hex::encode_string(&digest::sha256(der)),
            serials: None,
        })
    }

    /// Returns the complete encoded CRL.
    pub fn as_slice(&self) -> &[u8] {
        self.raw.as_ref()
    }

    pub fn to_bytes(&self) -> Bytes {
        self.raw.clone()
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }
}

/// # Data Access
///
impl Crl {
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the outer signature algorithm.
    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        self.signed_data.algorithm()
    }

    pub fn signature(&self) -> &Bytes {
        self.signed_data.signature()
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn this_update(&self) -> Time {
        self.this_update
    }

    pub fn next_update(&self) -> Option<Time> {
        self.next_update
    }

    pub fn entries(&self) -> &[CrlEntry] {
        &self.entries
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn crl_type(&self) -> CrlType {
        self.crl_type
    }

    /// Returns the CRL number.
    ///
    /// This is zero if the CRL doesn’t have a CRL Number extension.
    pub fn crl_number(&self) -> &UnsignedInt {
        &self.crl_number
    }

    /// Returns the SHA-256 hash of the encoded CRL as upper case hex.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn authority_key_identifier(&self) -> Option<&AuthorityKeyIdentifier> {
        self.extensions.find()
    }

    pub fn issuing_distribution_point(
        &self
    ) -> Option<&IssuingDistributionPoint> {
        self.extensions.find()
    }

    pub fn freshest_crl(&self) -> Option<&FreshestCrl> {
        self.extensions.find()
    }
}

/// # Queries
///
impl Crl {
    /// Caches the serial numbers in the CRL.
    ///
    /// Doing this will speed up calls to `contains` later on at the price
    /// of additional memory consumption.
    pub fn cache_serials(&mut self) {
        self.serials = Some(
            self.entries.iter().map(|entry| entry.serial.clone()).collect()
        );
    }

    /// Returns whether the given serial number is on this revocation list.
    pub fn contains(&self, serial: &UnsignedInt) -> bool {
        match self.serials {
            Some(ref set) => set.contains(serial),
            None => self.entries.iter().any(|entry| entry.serial == *serial)
        }
    }

    /// Returns whether the serial number given in hex is on the list.
    pub fn certificate_in_crl(&self, serial: &str) -> Result<bool, HexError> {
        serial.parse::<UnsignedInt>().map(|serial| self.contains(&serial))
    }

    /// Returns the entry for the given serial number if there is one.
    pub fn entry(&self, serial: &UnsignedInt) -> Option<&CrlEntry> {
        self.entries.iter().find(|entry| entry.serial == *serial)
    }

    /// Returns the time the next CRL will be published.
    ///
    /// This is the time of the Next CRL Publish extension if present or
    /// the next update time otherwise.
    pub fn next_publish(&self) -> Option<Time> {
        match self.extensions.find::<NextCrlPublish>() {
            Some(ext) => Some(ext.time()),
            None => self.next_update,
        }
    }

    /// Returns whether there is a delta CRL for this CRL.
    pub fn has_delta(&self) -> bool {
        self.crl_type == CrlType::Base
            && self.extensions.contains(&oid::CE_FRESHEST_CRL)
    }

    /// Verifies the signature of the CRL with the issuer’s public key.
    ///
    /// The signature is checked over the signed octets as they were
    /// received.
    pub fn verify_signature(
        &self, issuer_key: &AsymmetricKeyPair
    ) -> Result<bool, Error> {
        self.signed_data.verify_signature(issuer_key)
    }
}

impl PartialEq for Crl {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Crl { }

impl fmt::Display for Crl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.dump(&DumpOptions::default(), f)
    }
}


//------------ State ---------------------------------------------------------

/// The states of the TBSCertList decoder.
///
/// Each state consumes at most one element. The optional elements at the
/// end are recognized by their tags only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Start,
    SignatureAlgorithm,
    Issuer,
    ThisUpdate,
    NextUpdate,
    RevokedCertificates,
    Extensions,
    Done,
}


//------------ TbsDecoder ----------------------------------------------------

/// Collects the fields of a TBSCertList while walking through its states.
struct TbsDecoder<'a> {
    outer: &'a AlgorithmIdentifier,
    registry: &'a ExtensionRegistry,
    version: u8,
    issuer: Option<Name>,
    this_update: Option<Time>,
    next_update: Option<Time>,
    entries: Vec<CrlEntry>,
    extensions: Extensions,

    /// A fatal error that isn’t an encoding error.
    error: Option<Error>,
}

/// The decoded fields of a TBSCertList.
struct TbsCertList {
    version: u8,
    issuer: Name,
    this_update: Time,
    next_update: Option<Time>,
    entries: Vec<CrlEntry>,
    extensions: Extensions,
}

impl<'a> TbsDecoder<'a> {
    fn new(
        outer: &'a AlgorithmIdentifier, registry: &'a ExtensionRegistry
    ) -> Self {
        TbsDecoder {
            outer,
            registry,
            version: 1,
            issuer: None,
            this_update: None,
            next_update: None,
            entries: Vec::new(),
            extensions: Extensions::new(),
            error: None,
        }
    }

    /// Processes `state` and returns the next state.
    fn step<S: decode::Source>(
        &mut self, state: State, cons: &mut decode::Constructed<S>
    ) -> Result<State, DecodeError<S::Error>> {
        match state {
            State::Start => {
                self.version = match cons.take_opt_primitive_if(
                    Tag::INTEGER, |prim| prim.to_u8()
                )? {
                    Some(version) if version <= 1 => version + 1,
                    Some(_) => {
                        return Err(cons.content_err("invalid CRL version"))
                    }
                    None => 1
                };
                Ok(State::SignatureAlgorithm)
            }
            State::SignatureAlgorithm => {
                let inner = AlgorithmIdentifier::take_from(cons)?;
                if inner.algorithm() != self.outer.algorithm() {
                    self.error = Some(Error::InconsistentSignatureAlgorithm {
                        outer: self.outer.algorithm().clone(),
                        inner: inner.algorithm().clone(),
                    });
                    cons.skip_all()?;
                    return Ok(State::Done)
                }
                Ok(State::Issuer)
            }
            State::Issuer => {
                self.issuer = Some(Name::take_from(cons)?);
                Ok(State::ThisUpdate)
            }
            State::ThisUpdate => {
                self.this_update = Some(Time::take_from(cons)?);
                Ok(State::NextUpdate)
            }
            State::NextUpdate => {
                self.next_update = Time::take_opt_from(cons)?;
                Ok(State::RevokedCertificates)
            }
            State::RevokedCertificates => {
                let registry = self.registry;
                if let Some(entries) = cons.take_opt_sequence(|cons| {
                    let mut entries = Vec::new();
                    while let Some(entry) = CrlEntry::take_opt_from(
                        cons, registry
                    )? {
                        entries.push(entry)
                    }
                    Ok(entries)
                })? {
                    self.entries = entries
                }
                Ok(State::Extensions)
            }
            State::Extensions => {
                let registry = self.registry;
                if let Some(extensions) = cons.take_opt_constructed_if(
                    Tag::CTX_0, |cons| Extensions::take_from(cons, registry)
                )? {
                    self.extensions = extensions
                }
                Ok(State::Done)
            }
            State::Done => Ok(State::Done)
        }
    }

    fn finish(self) -> Result<TbsCertList, Error> {
        if let Some(err) = self.error {
            return Err(err)
        }
        match (self.issuer, self.this_update) {
            (Some(issuer), Some(this_update)) => {
                Ok(TbsCertList {
                    version: self.version,
                    issuer,
                    this_update,
                    next_update: self.next_update,
                    entries: self.entries,
                    extensions: self.extensions,
                })
            }
            _ => Err(Error::malformed("incomplete CRL"))
        }
    }
}


//------------ CrlEntry ------------------------------------------------------

/// An entry in the revoked certificates list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrlEntry {
    /// The serial number of the revoked certificate.
    pub serial: UnsignedInt,

    /// The time of revocation.
    pub revocation_date: Time,

    /// The CRL entry extensions.
    pub extensions: Extensions,
}

impl CrlEntry {
    pub fn new(serial: UnsignedInt, revocation_date: Time) -> Self {
        CrlEntry { serial, revocation_date, extensions: Extensions::new() }
    }

    /// Adds a Reason Code extension to the entry.
    pub fn with_reason(mut self, reason: CrlReason) -> Self {
        self.extensions.push(Extension::new(&ReasonCode::new(reason), false));
        self
    }

    /// Adds an extension to the entry.
    pub fn with_extension<C: ExtensionCodec>(
        mut self, value: &C, critical: bool
    ) -> Self {
        self.extensions.push(Extension::new(value, critical));
        self
    }

    pub fn reason(&self) -> Option<CrlReason> {
        self.extensions.find::<ReasonCode>().map(ReasonCode::reason)
    }

    pub fn invalidity_date(&self) -> Option<Time> {
        self.extensions.find::<InvalidityDate>().map(InvalidityDate::time)
    }

    pub fn certificate_issuer(&self) -> Option<&CertificateIssuer> {
        self.extensions.find()
    }

    /// Takes a single CRL entry from the beginning of a constructed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| Self::from_constructed(cons, registry))
    }

    /// Takes an optional CRL entry from the beginning of a contructed value.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| Self::from_constructed(cons, registry))
    }

    /// Parses the content of a CRL entry.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(CrlEntry {
            serial: UnsignedInt::take_from(cons)?,
            revocation_date: Time::take_from(cons)?,
            extensions: cons.take_opt_sequence(|cons| {
                Extensions::take_content_from(cons, registry)
            })?.unwrap_or_default(),
        })
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.serial.encode_ref(),
            self.revocation_date.encode_varied(),
            if self.extensions.is_empty() {
                None
            }
            else {
                Some(self.extensions.encode_ref())
            }
        )))
    }
}


//============ Tests =========================================================
