//! The Application Policy Mappings extension.
//!
//! This is a Microsoft extension with the same syntax as Policy Mappings:
//!
//! ```txt
//! PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
//!      issuerDomainPolicy      CertPolicyId,
//!      subjectDomainPolicy     CertPolicyId }
//! ```

use std::fmt;
use bcder::encode;
use bcder::{Captured, ConstOid, Mode, Oid};
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::error::Error;
use crate::x509::decode_der;
use super::ExtensionCodec;


//------------ PolicyMapping -------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyMapping {
    pub issuer_domain: Oid,
    pub subject_domain: Oid,
}

impl PolicyMapping {
    pub fn new(issuer_domain: Oid, subject_domain: Oid) -> Self {
        PolicyMapping { issuer_domain, subject_domain }
    }

    fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.issuer_domain.encode_ref(),
            self.subject_domain.encode_ref(),
        ))
    }
}


//------------ ApplicationPolicyMappings -------------------------------------

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ApplicationPolicyMappings(Vec<PolicyMapping>);

impl ApplicationPolicyMappings {
    pub fn new(mappings: Vec<PolicyMapping>) -> Self {
        ApplicationPolicyMappings(mappings)
    }

    pub fn mappings(&self) -> &[PolicyMapping] {
        &self.0
    }
}

impl ExtensionCodec for ApplicationPolicyMappings {
    const OID: ConstOid = oid::MS_APPLICATION_POLICY_MAPPINGS;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_sequence(|cons| {
                let mut res = Vec::new();
                while let Some(mapping) = cons.take_opt_sequence(|cons| {
                    Ok(PolicyMapping {
                        issuer_domain: Oid::take_from(cons)?,
                        subject_domain: Oid::take_from(cons)?,
                    })
                })? {
                    res.push(mapping)
                }
                Ok(ApplicationPolicyMappings(res))
            })
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence(
            self.0.iter().map(|mapping| {
                Captured::from_values(Mode::Der, mapping.encode_ref())
            }).collect::<Vec<_>>()
        ))
    }
}

impl fmt::Display for ApplicationPolicyMappings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, mapping) in self.0.iter().enumerate() {
            writeln!(f, "[{}]Application Policy Mapping:", i + 1)?;
            writeln!(f, "    Issuer Domain={}", mapping.issuer_domain)?;
            writeln!(f, "    Subject Domain={}", mapping.subject_domain)?;
        }
        Ok(())
    }
}


//============ Tests =========================================================
