//! Extensions with a single value.

use std::fmt;
use bcder::{Captured, ConstOid, Mode, OctetString, Tag};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::oid;
use crate::crypto::keys::AsymmetricKeyPair;
use crate::error::Error;
use crate::util::hex;
use crate::util::int::UnsignedInt;
use crate::x509::{decode_der, Time};
use super::ExtensionCodec;
use super::name::GeneralNames;


//------------ SubjectKeyIdentifier ------------------------------------------

/// The key identifier of the certificate’s subject key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectKeyIdentifier(Bytes);

impl SubjectKeyIdentifier {
    pub fn new(key_id: Bytes) -> Self {
        SubjectKeyIdentifier(key_id)
    }

    /// Creates the identifier as the SHA-1 hash of the public key bits.
    pub fn from_key(key: &AsymmetricKeyPair) -> Result<Self, Error> {
        key.key_identifier().map(|id| Self::new(id.into()))
    }

    pub fn key_id(&self) -> &Bytes {
        &self.0
    }
}

impl ExtensionCodec for SubjectKeyIdentifier {
    const OID: ConstOid = oid::CE_SUBJECT_KEY_IDENTIFIER;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            OctetString::take_from(cons).map(|id| Self(id.into_bytes()))
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(
            Mode::Der, OctetString::encode_slice(self.0.as_ref())
        )
    }
}

impl fmt::Display for SubjectKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode_string(&self.0))
    }
}


//------------ Extensions containing GeneralNames ----------------------------

macro_rules! general_names_extension {
    ( $(#[$attr:meta])* $name:ident, $oid:expr ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub struct $name(GeneralNames);

        impl $name {
            pub fn new(names: GeneralNames) -> Self {
                $name(names)
            }

            pub fn names(&self) -> &GeneralNames {
                &self.0
            }
        }

        impl ExtensionCodec for $name {
            const OID: ConstOid = $oid;

            fn decode_value(value: &[u8]) -> Result<Self, Error> {
                decode_der(value, GeneralNames::take_from).map($name)
            }

            fn encode_value(&self) -> Captured {
                Captured::from_values(Mode::Der, self.0.encode_ref())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                for name in self.0.iter() {
                    writeln!(f, "{}", name)?;
                }
                Ok(())
            }
        }
    }
}

general_names_extension!(
    /// Alternative names of the subject.
    SubjectAltName, oid::CE_SUBJECT_ALT_NAME
);

general_names_extension!(
    /// Alternative names of the issuer.
    IssuerAltName, oid::CE_ISSUER_ALT_NAME
);

general_names_extension!(
    /// The issuer of a certificate on an indirect CRL.
    ///
    /// This is a CRL entry extension.
    CertificateIssuer, oid::CE_CERTIFICATE_ISSUER
);


//------------ CrlNumber and DeltaCrlIndicator -------------------------------

macro_rules! number_extension {
    ( $(#[$attr:meta])* $name:ident, $oid:expr ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub struct $name(UnsignedInt);

        impl $name {
            pub fn new(number: UnsignedInt) -> Self {
                $name(number)
            }

            pub fn number(&self) -> &UnsignedInt {
                &self.0
            }
        }

        impl ExtensionCodec for $name {
            const OID: ConstOid = $oid;

            fn decode_value(value: &[u8]) -> Result<Self, Error> {
                decode_der(value, UnsignedInt::take_from).map($name)
            }

            fn encode_value(&self) -> Captured {
                Captured::from_values(Mode::Der, self.0.encode_ref())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    }
}

number_extension!(
    /// The sequence number of a CRL.
    CrlNumber, oid::CE_CRL_NUMBER
);

number_extension!(
    /// The CRL number of the base CRL a delta CRL updates.
    DeltaCrlIndicator, oid::CE_DELTA_CRL_INDICATOR
);


//------------ NextCrlPublish ------------------------------------------------

/// The time the issuer will publish the next CRL.
///
/// This is a private Microsoft extension. Different from the next update
/// field of the CRL, it gives the time a new CRL will be available while
/// the current one is still valid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NextCrlPublish(Time);

impl NextCrlPublish {
    pub fn new(time: Time) -> Self {
        NextCrlPublish(time)
    }

    pub fn time(&self) -> Time {
        self.0
    }
}

impl ExtensionCodec for NextCrlPublish {
    const OID: ConstOid = oid::MS_CRL_NEXT_PUBLISH;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, Time::take_from).map(NextCrlPublish)
    }

    fn encode_value(&self) -> Captured {
        self.0.to_captured()
    }
}

impl fmt::Display for NextCrlPublish {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ InvalidityDate ------------------------------------------------

/// The time a key is known or suspected to have been compromised.
///
/// This is a CRL entry extension. It is always a GeneralizedTime.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidityDate(Time);

impl InvalidityDate {
    pub fn new(time: Time) -> Self {
        InvalidityDate(time)
    }

    pub fn time(&self) -> Time {
        self.0
    }
}

impl ExtensionCodec for InvalidityDate {
    const OID: ConstOid = oid::CE_INVALIDITY_DATE;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, Time::take_from).map(InvalidityDate)
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, self.0.encode_generalized())
    }
}

impl fmt::Display for InvalidityDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ CrlReason -----------------------------------------------------

/// The reason a certificate was revoked.
///
/// Value 7 is not used.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrlReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl CrlReason {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CrlReason::Unspecified),
            1 => Some(CrlReason::KeyCompromise),
            2 => Some(CrlReason::CaCompromise),
            3 => Some(CrlReason::AffiliationChanged),
            4 => Some(CrlReason::Superseded),
            5 => Some(CrlReason::CessationOfOperation),
            6 => Some(CrlReason::CertificateHold),
            8 => Some(CrlReason::RemoveFromCrl),
            9 => Some(CrlReason::PrivilegeWithdrawn),
            10 => Some(CrlReason::AaCompromise),
            _ => None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CrlReason::Unspecified => "Unspecified",
            CrlReason::KeyCompromise => "Key Compromise",
            CrlReason::CaCompromise => "CA Compromise",
            CrlReason::AffiliationChanged => "Affiliation Changed",
            CrlReason::Superseded => "Superseded",
            CrlReason::CessationOfOperation => "Cessation of Operation",
            CrlReason::CertificateHold => "Certificate Hold",
            CrlReason::RemoveFromCrl => "Remove From CRL",
            CrlReason::PrivilegeWithdrawn => "Privilege Withdrawn",
            CrlReason::AaCompromise => "AA Compromise",
        }
    }
}

impl fmt::Display for CrlReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name(), *self as u8)
    }
}


//------------ ReasonCode ----------------------------------------------------

/// The CRL entry extension carrying the revocation reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReasonCode(CrlReason);

impl ReasonCode {
    pub fn new(reason: CrlReason) -> Self {
        ReasonCode(reason)
    }

    pub fn reason(&self) -> CrlReason {
        self.0
    }
}

impl ExtensionCodec for ReasonCode {
    const OID: ConstOid = oid::CE_CRL_REASONS;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_primitive_if(Tag::ENUMERATED, |prim| {
                let value = prim.to_u8()?;
                CrlReason::from_u8(value).ok_or_else(|| {
                    prim.content_err("invalid CRL reason")
                })
            })
        }).map(ReasonCode)
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(
            Mode::Der, (self.0 as u8).encode_as(Tag::ENUMERATED)
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//============ Tests =========================================================
