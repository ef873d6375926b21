//! Creating CRLs.

use bcder::encode;
use bcder::{Captured, Mode, Tag};
use bcder::encode::PrimitiveContent;
use crate::crypto::signature::SignatureEngine;
use crate::error::Error;
use crate::ext::{CrlNumber, Extension, ExtensionCodec, Extensions};
use crate::util::int::UnsignedInt;
use crate::x509::{Name, SignedData, Time};
use super::{Crl, CrlEntry};


//------------ CrlBuilder ----------------------------------------------------

/// Collects the content of a CRL.
///
/// The builder creates version 2 CRLs unless told otherwise. Optional
/// parts are left out of the encoding when they are empty: there is no
/// next update unless one is set, no revoked certificates sequence if
/// there are no entries, and no extensions field without extensions.
#[derive(Clone, Debug)]
pub struct CrlBuilder {
    version: u8,
    issuer: Name,
    this_update: Time,
    next_update: Option<Time>,
    entries: Vec<CrlEntry>,
    extensions: Extensions,

    /// Use the explicit curve form for ECDSA signature algorithms.
    alternate_ecdsa: bool,
}

impl CrlBuilder {
    pub fn new(issuer: Name, this_update: Time) -> Self {
        CrlBuilder {
            version: 2,
            issuer,
            this_update,
            next_update: None,
            entries: Vec::new(),
            extensions: Extensions::new(),
            alternate_ecdsa: false,
        }
    }

    /// Sets the version of the CRL.
    ///
    /// Only versions 1 and 2 exist. A version 1 CRL has no version field.
    pub fn version(&mut self, version: u8) -> &mut Self {
        self.version = version;
        self
    }

    pub fn next_update(&mut self, next_update: Option<Time>) -> &mut Self {
        self.next_update = next_update;
        self
    }

    /// Adds a revoked certificate.
    pub fn revoke(&mut self, entry: CrlEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Adds a typed CRL extension.
    pub fn extension<C: ExtensionCodec>(
        &mut self, value: &C, critical: bool
    ) -> &mut Self {
        self.extensions.push(value.to_extension(critical));
        self
    }

    pub fn raw_extension(&mut self, ext: Extension) -> &mut Self {
        self.extensions.push(ext);
        self
    }

    /// Adds a CRL Number extension.
    pub fn crl_number(&mut self, number: impl Into<UnsignedInt>) -> &mut Self {
        self.extension(&CrlNumber::new(number.into()), false)
    }

    pub fn alternate_ecdsa(&mut self, alternate: bool) -> &mut Self {
        self.alternate_ecdsa = alternate;
        self
    }

    /// Returns the encoded TBSCertList signed by `engine`.
    fn tbs(&self, engine: &SignatureEngine) -> Result<Captured, Error> {
        let version = match self.version {
            1 => None,
            2 => Some(1u8.encode()),
            _ => return Err(Error::State("invalid CRL version")),
        };
        let algorithm = engine.algorithm_identifier(self.alternate_ecdsa)?;
        Ok(Captured::from_values(Mode::Der, encode::sequence((
            version,
            algorithm.encode_ref(),
            self.issuer.encode_ref(),
            self.this_update.encode_varied(),
            self.next_update.map(Time::encode_varied),
            if self.entries.is_empty() {
                None
            }
            else {
                Some(encode::sequence(
                    self.entries.iter().map(CrlEntry::to_captured)
                        .collect::<Vec<_>>()
                ))
            },
            if self.extensions.is_empty() {
                None
            }
            else {
                Some(encode::sequence_as(
                    Tag::CTX_0, self.extensions.encode_ref()
                ))
            },
        ))))
    }

    /// Signs the CRL with the key of `engine`.
    ///
    /// The CRL is encoded and decoded again, so the result is exactly what
    /// a relying party would see.
    pub fn sign(self, engine: &SignatureEngine) -> Result<Crl, Error> {
        let tbs = self.tbs(engine)?;
        let signed = SignedData::sign(tbs, engine, self.alternate_ecdsa)?;
        Crl::decode(signed.to_captured().as_slice())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::keys::{AsymmetricKeyPair, EcCurve};
    use crate::crl::CrlType;

    fn time(year: i32) -> Time {
        Time::from_ymd_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn builder(year: i32) -> CrlBuilder {
        CrlBuilder::new(Name::from_common_name("A"), time(year))
    }

    #[test]
    fn version_one() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let mut builder = builder(2023);
        builder.version(1).revoke(
            CrlEntry::new(UnsignedInt::from(3u64), time(2022))
        );
        let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
        assert_eq!(crl.version(), 1);
        assert_eq!(crl.crl_number(), &UnsignedInt::default());
        assert_eq!(crl.crl_type(), CrlType::Base);
        assert!(crl.extensions().is_empty());
        assert!(crl.next_update().is_none());
    }

    #[test]
    fn invalid_version() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let mut builder = builder(2023);
        builder.version(3);
        assert!(matches!(
            builder.sign(&SignatureEngine::new(&key)),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn generalized_time_after_2049() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let mut builder = builder(2049);
        builder.next_update(Some(time(2051))).crl_number(9u64);
        let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
        assert_eq!(crl.this_update(), time(2049));
        assert_eq!(crl.next_update(), Some(time(2051)));
        assert_eq!(crl.crl_number(), &UnsignedInt::from(9u64));
    }
}
