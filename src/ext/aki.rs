//! The Authority Key Identifier extension.
//!
//! ```txt
//! AuthorityKeyIdentifier ::= SEQUENCE {
//!      keyIdentifier             [0] KeyIdentifier           OPTIONAL,
//!      authorityCertIssuer       [1] GeneralNames            OPTIONAL,
//!      authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL }
//! ```

use std::fmt;
use bcder::encode;
use bcder::{Captured, ConstOid, Mode, OctetString, Tag};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use log::debug;
use crate::oid;
use crate::cert::Certificate;
use crate::crypto::digest;
use crate::crypto::keys::AsymmetricKeyPair;
use crate::error::Error;
use crate::util::hex;
use crate::util::int::UnsignedInt;
use crate::x509::decode_der;
use super::ExtensionCodec;
use super::name::GeneralNames;


//------------ AuthorityKeyIdentifier ----------------------------------------

/// Identifies the key used to sign a certificate or CRL.
///
/// All three components are optional.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthorityKeyIdentifier {
    pub key_id: Option<Bytes>,
    pub issuer: Option<GeneralNames>,
    pub serial: Option<UnsignedInt>,
}

impl AuthorityKeyIdentifier {
    /// Creates the identifier with only the key identifier of `key`.
    pub fn from_key(key: &AsymmetricKeyPair) -> Result<Self, Error> {
        Ok(AuthorityKeyIdentifier {
            key_id: Some(key.key_identifier()?.into()),
            issuer: None,
            serial: None,
        })
    }

    /// Derives the identifier from the issuer’s certificate.
    ///
    /// The key identifier is the SHA-1 hash of the certificate’s public
    /// key bits. The names are taken from its Subject Alternative Name
    /// extension. If there is no such extension, names are left out even
    /// if requested. The serial number is that of the certificate.
    pub fn from_issuer(
        issuer: &Certificate,
        key_id: bool,
        names: bool,
        serial: bool,
    ) -> Result<Self, Error> {
        let key_id = if key_id {
            Some(digest::sha1(&issuer.public_key()?.public_key_bits()?).into())
        }
        else {
            None
        };
        let names = if names {
            let san = issuer.subject_alt_name().map(|san| {
                san.names().clone()
            });
            if san.is_none() {
                debug!(
                    "Issuer {} has no Subject Alternative Name, \
                     leaving out authority certificate issuer.",
                    issuer.subject()
                );
            }
            san
        }
        else {
            None
        };
        Ok(AuthorityKeyIdentifier {
            key_id,
            issuer: names,
            serial: if serial {
                Some(issuer.serial_number().clone())
            }
            else {
                None
            }
        })
    }
}

impl ExtensionCodec for AuthorityKeyIdentifier {
    const OID: ConstOid = oid::CE_AUTHORITY_KEY_IDENTIFIER;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_sequence(|cons| {
                Ok(AuthorityKeyIdentifier {
                    key_id: cons.take_opt_primitive_if(
                        Tag::CTX_0, |prim| prim.take_all()
                    )?,
                    issuer: cons.take_opt_constructed_if(
                        Tag::CTX_1, GeneralNames::take_content_from
                    )?,
                    serial: cons.take_opt_primitive_if(
                        Tag::CTX_2, UnsignedInt::from_primitive
                    )?,
                })
            })
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.key_id.as_ref().map(|id| {
                OctetString::encode_slice_as(id.as_ref(), Tag::CTX_0)
            }),
            self.issuer.as_ref().map(|names| {
                names.encode_ref_as(Tag::CTX_1)
            }),
            self.serial.as_ref().map(|serial| {
                serial.encode_ref_as(Tag::CTX_2)
            }),
        )))
    }
}

impl fmt::Display for AuthorityKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref id) = self.key_id {
            writeln!(f, "KeyID={}", hex::encode_string(id))?;
        }
        if let Some(ref names) = self.issuer {
            writeln!(f, "Certificate Issuer:")?;
            for name in names.iter() {
                writeln!(f, "    {}", name)?;
            }
        }
        if let Some(ref serial) = self.serial {
            writeln!(f, "Certificate SerialNumber={}", serial)?;
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::cert::CertBuilder;
    use crate::crypto::keys::EcCurve;
    use crate::crypto::signature::SignatureEngine;
    use crate::ext::name::GeneralName;
    use crate::ext::SubjectAltName;
    use crate::x509::{Name, Time, Validity};

    fn issuer_cert(
        key: &AsymmetricKeyPair, with_san: bool
    ) -> Certificate {
        let mut builder = CertBuilder::new(
            UnsignedInt::from_be_slice(b"\x01\x02\x03"),
            Name::from_common_name("Issuer"),
            Validity::new(
                Time::from_ymd_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Time::from_ymd_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            )
        );
        if with_san {
            builder.extension(
                &SubjectAltName::new(GeneralNames::new(vec![
                    GeneralName::Uri("http://ca.example/".into())
                ])),
                false
            );
        }
        builder.sign(key, &SignatureEngine::new(key)).unwrap()
    }

    #[test]
    fn encode_all_components() {
        let aki = AuthorityKeyIdentifier {
            key_id: Some(Bytes::from_static(b"\x01\x02")),
            issuer: Some(GeneralNames::new(vec![
                GeneralName::Dns("a".into())
            ])),
            serial: Some(UnsignedInt::from(0x80u64)),
        };
        let der = aki.encode_value();
        assert_eq!(
            der.as_slice(),
            b"\x30\x0d\x80\x02\x01\x02\xa1\x03\x82\x01a\x82\x02\x00\x80"
        );
        assert_eq!(
            AuthorityKeyIdentifier::decode_value(der.as_slice()).unwrap(),
            aki
        );
        assert_eq!(
            aki.to_string(),
            "KeyID=0102\nCertificate Issuer:\n    DNS Name=a\n\
             Certificate SerialNumber=80\n"
        );
    }

    #[test]
    fn empty_identifier() {
        let aki = AuthorityKeyIdentifier::default();
        assert_eq!(aki.encode_value().as_slice(), b"\x30\x00");
        assert_eq!(
            AuthorityKeyIdentifier::decode_value(b"\x30\x00").unwrap(), aki
        );
        assert!(AuthorityKeyIdentifier::decode_value(b"\x04\x00").is_err());
    }

    #[test]
    fn from_issuer() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let cert = issuer_cert(&key, true);
        let aki = AuthorityKeyIdentifier::from_issuer(
            &cert, true, true, true
        ).unwrap();
        assert_eq!(
            aki.key_id.as_deref(),
            Some(key.key_identifier().unwrap().as_slice())
        );
        assert_eq!(aki.issuer.as_ref().map(GeneralNames::len), Some(1));
        assert_eq!(
            aki.serial, Some(UnsignedInt::from_be_slice(b"\x01\x02\x03"))
        );
        assert_eq!(aki, AuthorityKeyIdentifier::from_issuer(
            &cert, true, true, true
        ).unwrap());
    }

    #[test]
    fn names_dropped_without_san() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let cert = issuer_cert(&key, false);
        let aki = AuthorityKeyIdentifier::from_issuer(
            &cert, false, true, false
        ).unwrap();
        assert_eq!(aki, AuthorityKeyIdentifier::default());
    }
}
