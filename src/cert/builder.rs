//! Creating certificates.

use bcder::encode;
use bcder::{Captured, Mode, Tag};
use bcder::encode::PrimitiveContent;
use crate::crypto::keys::AsymmetricKeyPair;
use crate::crypto::signature::SignatureEngine;
use crate::error::Error;
use crate::ext::{Extension, ExtensionCodec, Extensions};
use crate::util::int::UnsignedInt;
use crate::x509::{decode_der, Name, SignedData, Validity};
use super::Certificate;


//------------ CertBuilder ---------------------------------------------------

/// Collects the content of a version 3 certificate.
///
/// The issuer defaults to the subject, i.e., the certificate will be
/// self-issued unless [`issuer`][Self::issuer] is called.
#[derive(Clone, Debug)]
pub struct CertBuilder {
    serial_number: UnsignedInt,

    /// The issuer if different from the subject.
    issuer: Option<Name>,

    validity: Validity,
    subject: Name,
    extensions: Extensions,
}

impl CertBuilder {
    pub fn new(
        serial_number: UnsignedInt,
        subject: Name,
        validity: Validity,
    ) -> Self {
        CertBuilder {
            serial_number,
            issuer: None,
            validity,
            subject,
            extensions: Extensions::new(),
        }
    }

    pub fn issuer(&mut self, name: Name) -> &mut Self {
        self.issuer = Some(name);
        self
    }

    /// Adds a typed extension.
    pub fn extension<C: ExtensionCodec>(
        &mut self, value: &C, critical: bool
    ) -> &mut Self {
        self.extensions.push(value.to_extension(critical));
        self
    }

    /// Adds an already assembled extension.
    pub fn raw_extension(&mut self, ext: Extension) -> &mut Self {
        self.extensions.push(ext);
        self
    }

    /// Signs the certificate.
    ///
    /// The certificate will contain the public key of `subject_key`. The
    /// signature is created by `engine` whose key is the issuer’s key.
    pub fn sign(
        self,
        subject_key: &AsymmetricKeyPair,
        engine: &SignatureEngine,
    ) -> Result<Certificate, Error> {
        let algorithm = engine.algorithm_identifier(false)?;
        let public_key_info = decode_der(
            &subject_key.to_public_key_info()?, |cons| cons.capture_one()
        )?;
        let issuer = self.issuer.as_ref().unwrap_or(&self.subject);
        let tbs = Captured::from_values(Mode::Der, encode::sequence((
            encode::sequence_as(Tag::CTX_0, 2u8.encode()),
            self.serial_number.encode_ref(),
            algorithm.encode_ref(),
            issuer.encode_ref(),
            self.validity.encode(),
            self.subject.encode_ref(),
            public_key_info,
            if self.extensions.is_empty() {
                None
            }
            else {
                Some(encode::sequence_as(
                    Tag::CTX_3, self.extensions.encode_ref()
                ))
            },
        )));
        let signed = SignedData::sign(tbs, engine, false)?;
        Certificate::decode(signed.to_captured().as_slice())
    }
}
