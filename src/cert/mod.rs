//! X.509 certificates.
//!
//! Only as much of a certificate is supported as is necessary to serve as
//! the issuer of CRLs and extensions: the names, the serial number, the
//! public key, and the extensions. There is no path validation.
//!
//! ```txt
//! TBSCertificate  ::=  SEQUENCE  {
//!      version         [0]  EXPLICIT Version DEFAULT v1,
//!      serialNumber         CertificateSerialNumber,
//!      signature            AlgorithmIdentifier,
//!      issuer               Name,
//!      validity             Validity,
//!      subject              Name,
//!      subjectPublicKeyInfo SubjectPublicKeyInfo,
//!      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
//!      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
//!      extensions      [3]  EXPLICIT Extensions OPTIONAL }
//! ```

pub use self::builder::CertBuilder;

pub mod builder;

use bcder::encode;
use bcder::{BitString, Captured, Tag};
use crate::crypto::keys::AsymmetricKeyPair;
use crate::crypto::digest;
use crate::error::Error;
use crate::ext::{Extensions, ExtensionRegistry, SubjectAltName};
use crate::util::int::UnsignedInt;
use crate::x509::{
    decode_der, AlgorithmIdentifier, Name, SignedData, Validity
};


//------------ Certificate ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct Certificate {
    /// The outer structure with the exact signed octets.
    signed_data: SignedData,

    /// The version number, i.e., 1, 2, or 3.
    version: u8,

    serial_number: UnsignedInt,
    issuer: Name,
    validity: Validity,
    subject: Name,

    /// The encoded SubjectPublicKeyInfo.
    public_key_info: Captured,

    extensions: Extensions,
}

/// # Decoding and Encoding
///
impl Certificate {
    /// Decodes a DER encoded certificate using the built-in extensions.
    pub fn decode(der: &[u8]) -> Result<Self, Error> {
        Self::decode_with(der, ExtensionRegistry::global())
    }

    /// Decodes a DER encoded certificate with the given extensions.
    pub fn decode_with(
        der: &[u8], registry: &ExtensionRegistry
    ) -> Result<Self, Error> {
        let signed_data = decode_der(der, SignedData::take_from)?;
        decode_der(signed_data.data().as_slice(), |cons| {
            cons.take_sequence(|cons| {
                let version = match cons.take_opt_constructed_if(
                    Tag::CTX_0, |cons| cons.take_u8()
                )? {
                    Some(version) if version <= 2 => version + 1,
                    Some(_) => {
                        return Err(cons.content_err(
                            "invalid certificate version"
                        ))
                    }
                    None => 1,
                };
                let serial_number = UnsignedInt::take_from(cons)?;
                let signature = AlgorithmIdentifier::take_from(cons)?;
                if signature.algorithm() != signed_data.algorithm().algorithm() {
                    return Err(cons.content_err(
                        "signature algorithm mismatch"
                    ))
                }
                let issuer = Name::take_from(cons)?;
                let validity = Validity::take_from(cons)?;
                let subject = Name::take_from(cons)?;
                let public_key_info = cons.capture_one()?;

                // Unique identifiers are skipped.
                cons.take_opt_value_if(Tag::CTX_1, BitString::from_content)?;
                cons.take_opt_value_if(Tag::CTX_2, BitString::from_content)?;

                let extensions = cons.take_opt_constructed_if(
                    Tag::CTX_3, |cons| Extensions::take_from(cons, registry)
                )?.unwrap_or_default();

                Ok(Certificate {
                    signed_data: signed_data.clone(),
                    version,
                    serial_number,
                    issuer,
                    validity,
                    subject,
                    public_key_info,
                    extensions,
                })
            })
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        self.signed_data.encode_ref()
    }

    pub fn to_captured(&self) -> Captured {
        self.signed_data.to_captured()
    }
}

/// # Data Access
///
impl Certificate {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn serial_number(&self) -> &UnsignedInt {
        &self.serial_number
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        self.signed_data.algorithm()
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn subject(&self) -> &Name {
        &self.subject
    }

    /// Returns the encoded SubjectPublicKeyInfo.
    pub fn public_key_info(&self) -> &Captured {
        &self.public_key_info
    }

    /// Returns the public key of the certificate’s subject.
    pub fn public_key(&self) -> Result<AsymmetricKeyPair, Error> {
        AsymmetricKeyPair::decode_public_key(
            self.public_key_info.as_slice()
        )
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn subject_alt_name(&self) -> Option<&SubjectAltName> {
        self.extensions.find()
    }

    /// Returns the SHA-1 hash over the complete encoded certificate.
    pub fn sha1_thumbprint(&self) -> Vec<u8> {
        digest::sha1(self.to_captured().as_slice())
    }

    /// Verifies the certificate’s signature with the issuer’s key.
    pub fn verify_signature(
        &self, issuer_key: &AsymmetricKeyPair
    ) -> Result<bool, Error> {
        self.signed_data.verify_signature(issuer_key)
    }

    /// Returns whether the certificate claims to be self-signed.
    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.signed_data == other.signed_data
    }
}

impl Eq for Certificate { }


//============ Tests =========================================================
