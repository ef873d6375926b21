//! The OCSP Service Locator extension.
//!
//! ```txt
//! ServiceLocator ::= SEQUENCE {
//!     issuer    Name,
//!     locator   AuthorityInfoAccessSyntax OPTIONAL }
//! ```
//!
//! The extension is placed in OCSP requests. It tells a responder where
//! to forward a request it cannot answer itself.

use std::fmt;
use bcder::encode;
use bcder::{Captured, ConstOid, Mode};
use crate::oid;
use crate::cert::Certificate;
use crate::error::Error;
use crate::x509::{decode_der, Name};
use super::ExtensionCodec;
use super::aia::AuthorityInfoAccess;


//------------ ServiceLocator ------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceLocator {
    pub issuer: Name,
    pub locator: Option<AuthorityInfoAccess>,
}

impl ServiceLocator {
    pub fn new(issuer: Name, locator: Option<AuthorityInfoAccess>) -> Self {
        ServiceLocator { issuer, locator }
    }

    /// Creates the locator for the status of `cert`.
    ///
    /// This is the certificate’s issuer together with the content of its
    /// Authority Information Access extension if present.
    pub fn from_certificate(cert: &Certificate) -> Self {
        ServiceLocator {
            issuer: cert.issuer().clone(),
            locator: cert.extensions().find::<AuthorityInfoAccess>().cloned(),
        }
    }
}

impl ExtensionCodec for ServiceLocator {
    const OID: ConstOid = oid::PKIX_OCSP_SERVICE_LOCATOR;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_sequence(|cons| {
                Ok(ServiceLocator {
                    issuer: Name::take_from(cons)?,
                    locator: AuthorityInfoAccess::take_opt_from(cons)?,
                })
            })
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.issuer.encode_ref(),
            self.locator.as_ref().map(AuthorityInfoAccess::encode_ref),
        )))
    }
}

impl fmt::Display for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Issuer: {}", self.issuer)?;
        if let Some(ref locator) = self.locator {
            writeln!(f, "Locator:")?;
            for line in locator.to_string().lines() {
                writeln!(f, "    {}", line)?;
            }
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::cert::CertBuilder;
    use crate::crypto::keys::{AsymmetricKeyPair, EcCurve};
    use crate::crypto::signature::SignatureEngine;
    use crate::ext::aia::AccessDescription;
    use crate::util::int::UnsignedInt;
    use crate::x509::{Time, Validity};

    #[test]
    fn round_trip() {
        let issuer = Name::from_common_name("CA");
        let locator = ServiceLocator::new(
            issuer.clone(),
            Some(AuthorityInfoAccess::new(vec![
                AccessDescription::ocsp("http://o")
            ]))
        );
        let der = locator.encode_value();
        let mut expected = vec![0x30, 0x27];
        expected.extend_from_slice(issuer.as_slice());
        expected.extend_from_slice(
            b"\x30\x16\x30\x14\x06\x08\x2b\x06\x01\x05\x05\x07\x30\x01\
              \x86\x08http://o"
        );
        assert_eq!(der.as_slice(), expected.as_slice());
        let decoded = ServiceLocator::decode_value(der.as_slice()).unwrap();
        assert_eq!(decoded, locator);
        assert_eq!(
            decoded.to_string(),
            concat!(
                "Issuer: CN=CA\n",
                "Locator:\n",
                "    [1]Authority Info Access\n",
                "        Access Method=On-line Certificate Status Protocol ",
                "(1.3.6.1.5.5.7.48.1)\n",
                "        Alternative Name:\n",
                "            URL=http://o\n",
            )
        );
    }

    #[test]
    fn without_locator() {
        let locator = ServiceLocator::new(Name::from_common_name("CA"), None);
        let der = locator.encode_value();
        assert_eq!(
            ServiceLocator::decode_value(der.as_slice()).unwrap(), locator
        );
    }

    #[test]
    fn from_certificate() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let aia = AuthorityInfoAccess::new(vec![
            AccessDescription::ca_issuers("http://c/ca.cer")
        ]);
        let mut builder = CertBuilder::new(
            UnsignedInt::from(7u64),
            Name::from_common_name("EE"),
            Validity::new(
                Time::from_ymd_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Time::from_ymd_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            )
        );
        builder.issuer(Name::from_common_name("CA")).extension(&aia, false);
        let cert = builder.sign(&key, &SignatureEngine::new(&key)).unwrap();
        let locator = ServiceLocator::from_certificate(&cert);
        assert_eq!(locator.issuer, Name::from_common_name("CA"));
        assert_eq!(locator.locator, Some(aia));
    }
}
