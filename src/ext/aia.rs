//! The Authority Information Access extension.
//!
//! ```txt
//! AuthorityInfoAccessSyntax  ::=
//!         SEQUENCE SIZE (1..MAX) OF AccessDescription
//!
//! AccessDescription  ::=  SEQUENCE {
//!         accessMethod          OBJECT IDENTIFIER,
//!         accessLocation        GeneralName  }
//! ```

use std::fmt;
use bcder::{decode, encode};
use bcder::{Captured, ConstOid, Mode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::error::Error;
use crate::x509::{decode_der, to_oid};
use super::ExtensionCodec;
use super::name::GeneralName;


//------------ AccessDescription ---------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessDescription {
    pub method: Oid,
    pub location: GeneralName,
}

impl AccessDescription {
    pub fn new(method: Oid, location: GeneralName) -> Self {
        AccessDescription { method, location }
    }

    /// Creates a description pointing to the issuer certificate at `uri`.
    pub fn ca_issuers(uri: impl Into<String>) -> Self {
        Self::new(to_oid(&oid::AD_CA_ISSUERS), GeneralName::Uri(uri.into()))
    }

    /// Creates a description pointing to an OCSP responder at `uri`.
    pub fn ocsp(uri: impl Into<String>) -> Self {
        Self::new(to_oid(&oid::AD_OCSP), GeneralName::Uri(uri.into()))
    }

    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(AccessDescription {
                method: Oid::take_from(cons)?,
                location: GeneralName::take_from(cons)?,
            })
        })
    }

    fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.method.encode_ref(),
            self.location.to_captured(),
        )))
    }
}


//------------ AuthorityInfoAccess -------------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuthorityInfoAccess(Vec<AccessDescription>);

impl AuthorityInfoAccess {
    pub fn new(descriptions: Vec<AccessDescription>) -> Self {
        AuthorityInfoAccess(descriptions)
    }

    pub fn descriptions(&self) -> &[AccessDescription] {
        &self.0
    }

    /// Returns the locations of the given access method.
    pub fn locations<'a>(
        &'a self, method: &'a ConstOid
    ) -> impl Iterator<Item = &'a GeneralName> + 'a {
        self.0.iter().filter(move |item| item.method == *method).map(|item| {
            &item.location
        })
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::take_content_from)
    }

    /// Takes the syntax if the next value is a sequence.
    ///
    /// This is used by the Service Locator extension.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(Self::take_content_from)
    }

    fn take_content_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(item) = AccessDescription::take_opt_from(cons)? {
            res.push(item)
        }
        if res.is_empty() {
            return Err(cons.content_err(
                "empty authority information access"
            ))
        }
        Ok(AuthorityInfoAccess(res))
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::sequence(
            self.0.iter().map(
                AccessDescription::to_captured
            ).collect::<Vec<_>>()
        )
    }
}

impl ExtensionCodec for AuthorityInfoAccess {
    const OID: ConstOid = oid::PE_AUTHORITY_INFO_ACCESS;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, Self::take_from)
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }
}

impl fmt::Display for AuthorityInfoAccess {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            writeln!(f, "[{}]Authority Info Access", i + 1)?;
            match oid::long_name(&item.method) {
                Some(name) => {
                    writeln!(f, "    Access Method={} ({})", name, item.method)?
                }
                None => writeln!(f, "    Access Method={}", item.method)?,
            }
            writeln!(f, "    Alternative Name:")?;
            writeln!(f, "        {}", item.location)?;
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        let aia = AuthorityInfoAccess::new(vec![
            AccessDescription::ocsp("http://o"),
            AccessDescription::ca_issuers("http://c"),
        ]);
        let der = aia.encode_value();
        assert_eq!(
            der.as_slice(),
            b"\x30\x2c\
              \x30\x14\x06\x08\x2b\x06\x01\x05\x05\x07\x30\x01\
                      \x86\x08http://o\
              \x30\x14\x06\x08\x2b\x06\x01\x05\x05\x07\x30\x02\
                      \x86\x08http://c"
        );
        let decoded = AuthorityInfoAccess::decode_value(
            der.as_slice()
        ).unwrap();
        assert_eq!(decoded, aia);
        assert_eq!(
            decoded.locations(&oid::AD_CA_ISSUERS).collect::<Vec<_>>(),
            [&GeneralName::Uri("http://c".into())]
        );
        assert!(decoded.to_string().starts_with(
            "[1]Authority Info Access\n    Access Method=On-line \
             Certificate Status Protocol (1.3.6.1.5.5.7.48.1)\n"
        ));
    }

    #[test]
    fn empty_rejected() {
        assert!(AuthorityInfoAccess::decode_value(b"\x30\x00").is_err());
    }
}
