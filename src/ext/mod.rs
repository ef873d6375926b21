//! Certificate and CRL extensions.
//!
//! Each extension is an object identifier, a criticality flag, and an
//! OCTET STRING containing the DER encoded extension value:
//!
//! ```txt
//! Extension  ::=  SEQUENCE  {
//!      extnID      OBJECT IDENTIFIER,
//!      critical    BOOLEAN DEFAULT FALSE,
//!      extnValue   OCTET STRING }
//! ```
//!
//! The [`Extension`] type keeps all three as received together with the
//! decoded value. Which type the value is decoded into is determined by an
//! [`ExtensionRegistry`] that maps object identifiers to decoder functions.
//! Extensions unknown to the registry or failing to decode as their
//! registered type are kept as [`ExtensionValue::Opaque`].
//!
//! All extension types implement [`ExtensionCodec`] which converts between
//! the typed value and the raw extension value.

pub use self::aia::{AccessDescription, AuthorityInfoAccess};
pub use self::aki::AuthorityKeyIdentifier;
pub use self::constraints::{GeneralSubtree, NameConstraints};
pub use self::dp::{
    CrlDistributionPoints, DistributionPoint, DistributionPointName,
    FreshestCrl, IssuingDistributionPoint, ReasonFlags,
};
pub use self::locator::ServiceLocator;
pub use self::name::{GeneralName, GeneralNames};
pub use self::policy::{ApplicationPolicyMappings, PolicyMapping};
pub use self::simple::{
    CertificateIssuer, CrlNumber, CrlReason, DeltaCrlIndicator,
    InvalidityDate, IssuerAltName, NextCrlPublish, ReasonCode,
    SubjectAltName, SubjectKeyIdentifier,
};

pub mod aia;
pub mod aki;
pub mod constraints;
pub mod dp;
pub mod locator;
pub mod name;
pub mod policy;
pub mod simple;

use std::{any, fmt};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use bcder::{decode, encode};
use bcder::{Captured, ConstOid, Mode, OctetString, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use log::warn;
use crate::oid;
use crate::error::Error;
use crate::util::hex;
use crate::x509::to_oid;


//------------ ExtensionCodec ------------------------------------------------

/// A type that is the value of a specific extension.
pub trait ExtensionCodec: ExtensionVariant + Clone {
    /// The object identifier of the extension.
    const OID: ConstOid;

    /// Decodes the content of the extension’s OCTET STRING.
    fn decode_value(value: &[u8]) -> Result<Self, Error>;

    /// Encodes the value into the content of the OCTET STRING.
    fn encode_value(&self) -> Captured;

    /// Creates a complete extension from the value.
    ///
    /// The raw value of the extension will be the encoded value.
    fn to_extension(&self, critical: bool) -> Extension {
        Extension {
            oid: to_oid(&Self::OID),
            critical,
            raw: self.encode_value().into_bytes(),
            value: self.clone().into(),
        }
    }
}

/// A type that appears as a variant of [`ExtensionValue`].
pub trait ExtensionVariant: Sized + Into<ExtensionValue> {
    fn from_value(value: &ExtensionValue) -> Option<&Self>;
}

/// Decodes the value of an extension for the registry.
pub fn decode_as<C: ExtensionCodec>(
    value: &[u8]
) -> Result<ExtensionValue, Error> {
    C::decode_value(value).map(Into::into)
}


//------------ CustomExtension -----------------------------------------------

/// The value of an extension registered outside of this crate.
pub trait CustomExtension: fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn any::Any;
}


//------------ ExtensionValue ------------------------------------------------

macro_rules! extension_values {
    ( $( $(#[$attr:meta])* $variant:ident, )* ) => {
        /// The decoded value of an extension.
        #[derive(Clone, Debug)]
        pub enum ExtensionValue {
            $(
                $(#[$attr])*
                $variant($variant),
            )*

            /// An extension decoded by a decoder registered by the user.
            Custom(Arc<dyn CustomExtension>),

            /// An extension without a decoder or that failed to decode.
            ///
            /// The extension’s raw value is still available.
            Opaque,
        }

        $(
            impl From<$variant> for ExtensionValue {
                fn from(value: $variant) -> Self {
                    ExtensionValue::$variant(value)
                }
            }

            impl ExtensionVariant for $variant {
                fn from_value(value: &ExtensionValue) -> Option<&Self> {
                    match *value {
                        ExtensionValue::$variant(ref inner) => Some(inner),
                        _ => None
                    }
                }
            }
        )*

        impl fmt::Display for ExtensionValue {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match *self {
                    $(
                        ExtensionValue::$variant(ref inner) => inner.fmt(f),
                    )*
                    ExtensionValue::Custom(ref inner) => {
                        fmt::Display::fmt(inner.as_ref(), f)
                    }
                    ExtensionValue::Opaque => f.write_str("<opaque>"),
                }
            }
        }
    }
}

extension_values! {
    AuthorityKeyIdentifier,
    SubjectKeyIdentifier,
    SubjectAltName,
    IssuerAltName,
    NameConstraints,
    CrlDistributionPoints,
    FreshestCrl,
    IssuingDistributionPoint,
    AuthorityInfoAccess,
    ApplicationPolicyMappings,
    ServiceLocator,
    CrlNumber,
    DeltaCrlIndicator,
    NextCrlPublish,
    /// The reason code of a CRL entry.
    ReasonCode,
    InvalidityDate,
    CertificateIssuer,
}

impl ExtensionValue {
    pub fn is_opaque(&self) -> bool {
        matches!(*self, ExtensionValue::Opaque)
    }
}


//------------ ExtensionRegistry ---------------------------------------------

/// A function decoding the raw value of an extension.
pub type DecodeFn = fn(&[u8]) -> Result<ExtensionValue, Error>;

/// The table of known extensions.
///
/// The default registry knows all extensions implemented by this crate.
/// Additional decoders can be added via [`register`][Self::register], also
/// replacing the built-in ones.
#[derive(Clone, Debug)]
pub struct ExtensionRegistry {
    decoders: HashMap<Oid, DecodeFn>,
}

impl ExtensionRegistry {
    /// Creates a registry without any decoders.
    pub fn empty() -> Self {
        ExtensionRegistry { decoders: HashMap::new() }
    }

    /// Returns a shared registry with the built-in decoders.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ExtensionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }

    pub fn register(&mut self, oid: Oid, decoder: DecodeFn) {
        self.decoders.insert(oid, decoder);
    }

    /// Registers an extension type of this crate.
    pub fn register_codec<C: ExtensionCodec>(&mut self) {
        self.register(to_oid(&C::OID), decode_as::<C>)
    }

    pub fn contains(&self, oid: &Oid) -> bool {
        self.decoders.contains_key(oid)
    }

    /// Decodes an extension value strictly.
    ///
    /// Returns `Ok(ExtensionValue::Opaque)` if there is no decoder for
    /// `oid`.
    pub fn decode_value(
        &self, oid: &Oid, value: &[u8]
    ) -> Result<ExtensionValue, Error> {
        match self.decoders.get(oid) {
            Some(decoder) => decoder(value),
            None => Ok(ExtensionValue::Opaque),
        }
    }

    /// Creates an extension from its raw components.
    ///
    /// If the value fails to decode, the extension is kept as an opaque
    /// extension. This never fails.
    pub fn resolve(&self, oid: Oid, critical: bool, raw: Bytes) -> Extension {
        let value = match self.decode_value(&oid, &raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "Failed to decode extension {}, keeping it opaque: {}",
                    oid, err
                );
                ExtensionValue::Opaque
            }
        };
        Extension { oid, critical, raw, value }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        let mut res = Self::empty();
        res.register_codec::<AuthorityKeyIdentifier>();
        res.register_codec::<SubjectKeyIdentifier>();
        res.register_codec::<SubjectAltName>();
        res.register_codec::<IssuerAltName>();
        res.register_codec::<NameConstraints>();
        res.register_codec::<CrlDistributionPoints>();
        res.register_codec::<FreshestCrl>();
        res.register_codec::<IssuingDistributionPoint>();
        res.register_codec::<AuthorityInfoAccess>();
        res.register_codec::<ApplicationPolicyMappings>();
        res.register_codec::<ServiceLocator>();
        res.register_codec::<CrlNumber>();
        res.register_codec::<DeltaCrlIndicator>();
        res.register_codec::<NextCrlPublish>();
        res.register_codec::<ReasonCode>();
        res.register_codec::<InvalidityDate>();
        res.register_codec::<CertificateIssuer>();
        res
    }
}


//------------ Extension -----------------------------------------------------

/// A single extension.
#[derive(Clone, Debug)]
pub struct Extension {
    oid: Oid,
    critical: bool,
    raw: Bytes,
    value: ExtensionValue,
}

impl Extension {
    /// Creates an extension from a typed value.
    pub fn new<C: ExtensionCodec>(value: &C, critical: bool) -> Self {
        value.to_extension(critical)
    }

    /// Creates an opaque extension from its raw value.
    pub fn opaque(oid: Oid, critical: bool, raw: Bytes) -> Self {
        Extension { oid, critical, raw, value: ExtensionValue::Opaque }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the content of the extension value OCTET STRING.
    pub fn raw_value(&self) -> &Bytes {
        &self.raw
    }

    pub fn value(&self) -> &ExtensionValue {
        &self.value
    }

    /// Returns the typed value if the extension is of type `C`.
    pub fn typed<C: ExtensionVariant>(&self) -> Option<&C> {
        C::from_value(&self.value)
    }

    /// Returns the value of a custom extension of type `T`.
    pub fn custom<T: any::Any>(&self) -> Option<&T> {
        match self.value {
            ExtensionValue::Custom(ref value) => {
                value.as_any().downcast_ref()
            }
            _ => None
        }
    }

    /// Decodes the raw value as an extension of type `C`.
    ///
    /// Unlike the registry, this returns decoding errors.
    pub fn decode_as<C: ExtensionCodec>(&self) -> Result<C, Error> {
        C::decode_value(&self.raw)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Self, DecodeError<S::Error>> {
        match Self::take_opt_from(cons, registry)? {
            Some(res) => Ok(res),
            None => Err(cons.content_err("missing extension")),
        }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            let oid = Oid::take_from(cons)?;
            let critical = cons.take_opt_bool()?.unwrap_or(false);
            let raw = OctetString::take_from(cons)?.into_bytes();
            Ok(registry.resolve(oid, critical, raw))
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.oid.encode_ref(),
            if self.critical {
                Some(self.critical.encode())
            }
            else {
                None
            },
            OctetString::encode_slice(self.raw.as_ref()),
        ))
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid
            && self.critical == other.critical
            && self.raw == other.raw
    }
}

impl Eq for Extension { }

/// Displays the extension name followed by the indented value.
impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match oid::long_name(&self.oid) {
            Some(name) => write!(f, "{} ({})", name, self.oid)?,
            None => write!(f, "{}", self.oid)?,
        }
        if self.critical {
            f.write_str(" critical")?;
        }
        f.write_str(":")?;
        let value = match self.value {
            ExtensionValue::Opaque => hex::encode_string(&self.raw),
            ref value => value.to_string(),
        };
        for line in value.lines() {
            write!(f, "\n    {}", line)?;
        }
        Ok(())
    }
}


//------------ Extensions ----------------------------------------------------

/// A sequence of extensions.
///
/// ```txt
/// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Extensions(Vec<Extension>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extension.
    ///
    /// An existing extension with the same object identifier is replaced.
    pub fn push(&mut self, ext: Extension) {
        match self.0.iter_mut().find(|item| item.oid == ext.oid) {
            Some(item) => *item = ext,
            None => self.0.push(ext),
        }
    }

    pub fn get(&self, oid: &ConstOid) -> Option<&Extension> {
        self.0.iter().find(|ext| ext.oid == *oid)
    }

    pub fn contains(&self, oid: &ConstOid) -> bool {
        self.get(oid).is_some()
    }

    /// Returns the first extension value of type `C`.
    pub fn find<C: ExtensionCodec>(&self) -> Option<&C> {
        self.get(&C::OID).and_then(Extension::typed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Takes the extensions from the content of the sequence.
    ///
    /// Duplicate extensions are rejected.
    pub fn take_content_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res: Vec<Extension> = Vec::new();
        while let Some(ext) = Extension::take_opt_from(cons, registry)? {
            if res.iter().any(|item| item.oid == ext.oid) {
                return Err(cons.content_err("duplicate extension"))
            }
            res.push(ext)
        }
        Ok(Extensions(res))
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        registry: &ExtensionRegistry,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| Self::take_content_from(cons, registry))
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence(
            self.0.iter().map(Extension::to_captured).collect::<Vec<_>>()
        )
    }
}

impl From<Vec<Extension>> for Extensions {
    fn from(src: Vec<Extension>) -> Self {
        let mut res = Extensions::new();
        for ext in src {
            res.push(ext)
        }
        res
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a Extension;
    type IntoIter = std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}


//============ Tests =========================================================
