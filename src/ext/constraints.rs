//! The Name Constraints extension.
//!
//! ```txt
//! NameConstraints ::= SEQUENCE {
//!      permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
//!      excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }
//!
//! GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree
//!
//! GeneralSubtree ::= SEQUENCE {
//!      base                    GeneralName,
//!      minimum         [0]     BaseDistance DEFAULT 0,
//!      maximum         [1]     BaseDistance OPTIONAL }
//! ```

use std::fmt;
use bcder::{decode, encode};
use bcder::{Captured, ConstOid, Mode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::error::Error;
use crate::x509::decode_der;
use super::ExtensionCodec;
use super::name::GeneralName;


//------------ GeneralSubtree ------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneralSubtree {
    pub base: GeneralName,
    pub minimum: u64,
    pub maximum: Option<u64>,
}

impl GeneralSubtree {
    pub fn new(base: GeneralName) -> Self {
        GeneralSubtree { base, minimum: 0, maximum: None }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(GeneralSubtree {
                base: GeneralName::take_from(cons)?,
                minimum: cons.take_opt_primitive_if(
                    Tag::CTX_0, |prim| prim.to_u64()
                )?.unwrap_or(0),
                maximum: cons.take_opt_primitive_if(
                    Tag::CTX_1, |prim| prim.to_u64()
                )?,
            })
        })
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.base.to_captured(),
            if self.minimum != 0 {
                Some(self.minimum.encode_as(Tag::CTX_0))
            }
            else {
                None
            },
            self.maximum.map(|max| max.encode_as(Tag::CTX_1)),
        )))
    }
}

impl fmt::Display for GeneralSubtree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (min {}, ", self.base, self.minimum)?;
        match self.maximum {
            Some(max) => write!(f, "max {})", max),
            None => f.write_str("max unbounded)"),
        }
    }
}


//------------ NameConstraints -----------------------------------------------

/// Restricts the names of certificates issued below a CA.
///
/// Subtrees based on a registered ID aren’t allowed. They are accepted
/// when decoding but dropped when encoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NameConstraints {
    pub permitted: Vec<GeneralSubtree>,
    pub excluded: Vec<GeneralSubtree>,
}

impl NameConstraints {
    pub fn new(
        permitted: Vec<GeneralSubtree>, excluded: Vec<GeneralSubtree>
    ) -> Self {
        NameConstraints { permitted, excluded }
    }

    fn take_subtrees<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<GeneralSubtree>, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(subtree) = GeneralSubtree::take_opt_from(cons)? {
            res.push(subtree)
        }
        if res.is_empty() {
            return Err(cons.content_err("empty general subtrees"))
        }
        Ok(res)
    }

    fn encode_subtrees(
        subtrees: &[GeneralSubtree], tag: Tag
    ) -> Option<impl encode::Values> {
        let content: Vec<_> = subtrees.iter().filter(|subtree| {
            !subtree.base.is_registered_id()
        }).map(GeneralSubtree::to_captured).collect();
        if content.is_empty() {
            None
        }
        else {
            Some(encode::sequence_as(tag, content))
        }
    }

    fn fmt_subtrees(
        f: &mut fmt::Formatter, label: &str, subtrees: &[GeneralSubtree]
    ) -> fmt::Result {
        writeln!(f, "{}:", label)?;
        if subtrees.is_empty() {
            return writeln!(f, "    None")
        }
        for subtree in subtrees {
            writeln!(f, "    {}", subtree)?;
        }
        Ok(())
    }
}

impl ExtensionCodec for NameConstraints {
    const OID: ConstOid = oid::CE_NAME_CONSTRAINTS;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_sequence(|cons| {
                Ok(NameConstraints {
                    permitted: cons.take_opt_constructed_if(
                        Tag::CTX_0, Self::take_subtrees
                    )?.unwrap_or_default(),
                    excluded: cons.take_opt_constructed_if(
                        Tag::CTX_1, Self::take_subtrees
                    )?.unwrap_or_default(),
                })
            })
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            Self::encode_subtrees(&self.permitted, Tag::CTX_0),
            Self::encode_subtrees(&self.excluded, Tag::CTX_1),
        )))
    }
}

impl fmt::Display for NameConstraints {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Self::fmt_subtrees(f, "Permitted", &self.permitted)?;
        Self::fmt_subtrees(f, "Excluded", &self.excluded)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Oid;
    use bytes::Bytes;

    #[test]
    fn round_trip() {
        let constraints = NameConstraints::new(
            vec![GeneralSubtree::new(GeneralName::Dns("example.com".into()))],
            vec![GeneralSubtree {
                base: GeneralName::IpAddress(Bytes::from_static(
                    b"\xc0\x00\x02\x00\xff\xff\xff\x00"
                )),
                minimum: 1,
                maximum: Some(4),
            }],
        );
        let der = constraints.encode_value();
        assert_eq!(
            der.as_slice(),
            b"\x30\x25\
              \xa0\x0f\x30\x0d\x82\x0bexample.com\
              \xa1\x12\x30\x10\x87\x08\xc0\x00\x02\x00\xff\xff\xff\x00\
              \x80\x01\x01\x81\x01\x04"
        );
        let decoded = NameConstraints::decode_value(der.as_slice()).unwrap();
        assert_eq!(decoded, constraints);
        assert_eq!(
            decoded.to_string(),
            "Permitted:\n    DNS Name=example.com (min 0, max unbounded)\n\
             Excluded:\n    IP Address=C0000200FFFFFF00 (min 1, max 4)\n"
        );
    }

    #[test]
    fn registered_id_filtered() {
        let id = Oid(Bytes::from_static(b"\x2a\x03"));
        let constraints = NameConstraints::new(
            vec![GeneralSubtree::new(GeneralName::RegisteredId(id))],
            vec![GeneralSubtree::new(GeneralName::Dns("x".into()))],
        );
        let der = constraints.encode_value();
        assert_eq!(der.as_slice(), b"\x30\x07\xa1\x05\x30\x03\x82\x01x");

        // ... but accepted when decoding.
        let decoded = NameConstraints::decode_value(
            b"\x30\x08\xa0\x06\x30\x04\x88\x02\x2a\x03"
        ).unwrap();
        assert!(decoded.permitted[0].base.is_registered_id());
        assert!(decoded.excluded.is_empty());
    }

    #[test]
    fn empty_subtrees_rejected() {
        assert!(NameConstraints::decode_value(b"\x30\x02\xa0\x00").is_err());
        assert_eq!(
            NameConstraints::decode_value(b"\x30\x00").unwrap(),
            NameConstraints::default()
        );
    }
}
