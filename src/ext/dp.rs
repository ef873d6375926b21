//! Distribution point extensions.
//!
//! ```txt
//! CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint
//!
//! DistributionPoint ::= SEQUENCE {
//!      distributionPoint       [0]     DistributionPointName OPTIONAL,
//!      reasons                 [1]     ReasonFlags OPTIONAL,
//!      cRLIssuer               [2]     GeneralNames OPTIONAL }
//!
//! DistributionPointName ::= CHOICE {
//!      fullName                [0]     GeneralNames,
//!      nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }
//!
//! IssuingDistributionPoint ::= SEQUENCE {
//!      distributionPoint          [0] DistributionPointName OPTIONAL,
//!      onlyContainsUserCerts      [1] BOOLEAN DEFAULT FALSE,
//!      onlyContainsCACerts        [2] BOOLEAN DEFAULT FALSE,
//!      onlySomeReasons            [3] ReasonFlags OPTIONAL,
//!      indirectCRL                [4] BOOLEAN DEFAULT FALSE,
//!      onlyContainsAttributeCerts [5] BOOLEAN DEFAULT FALSE }
//! ```
//!
//! The distribution point name is a CHOICE and thus explicitly tagged.

use std::{fmt, ops};
use bcder::{decode, encode};
use bcder::{BitString, Captured, ConstOid, Mode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use crate::oid;
use crate::error::Error;
use crate::util::hex;
use crate::x509::decode_der;
use super::ExtensionCodec;
use super::name::GeneralNames;


//------------ ReasonFlags ---------------------------------------------------

/// The set of revocation reasons covered by a distribution point.
///
/// Bit _n_ of the value is the named bit _n_ of the BIT STRING. Bits
/// beyond the nine defined reasons are kept so the value encodes back to
/// what was decoded.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReasonFlags(u32);

impl ReasonFlags {
    pub const UNUSED: Self = ReasonFlags(1 << 0);
    pub const KEY_COMPROMISE: Self = ReasonFlags(1 << 1);
    pub const CA_COMPROMISE: Self = ReasonFlags(1 << 2);
    pub const AFFILIATION_CHANGED: Self = ReasonFlags(1 << 3);
    pub const SUPERSEDED: Self = ReasonFlags(1 << 4);
    pub const CESSATION_OF_OPERATION: Self = ReasonFlags(1 << 5);
    pub const CERTIFICATE_HOLD: Self = ReasonFlags(1 << 6);
    pub const PRIVILEGE_WITHDRAWN: Self = ReasonFlags(1 << 7);
    pub const AA_COMPROMISE: Self = ReasonFlags(1 << 8);

    const NAMES: [&'static str; 9] = [
        "Unused",
        "Key Compromise",
        "CA Compromise",
        "Affiliation Changed",
        "Superseded",
        "Cessation of Operation",
        "Certificate Hold",
        "Privilege Withdrawn",
        "AA Compromise",
    ];

    pub fn from_bits(bits: u32) -> Self {
        ReasonFlags(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::BIT_STRING, Self::from_content)
    }

    /// Parses the content of the bit string.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let bits = BitString::from_content(content)?;
        let mut res = 0u32;
        for i in 0..bits.bit_len() {
            if !bits.bit(i) {
                continue
            }
            if i >= 32 {
                return Err(content.content_err("too many reason flags"))
            }
            res |= 1 << i;
        }
        Ok(ReasonFlags(res))
    }

    /// Returns the octets and number of unused bits of the DER encoding.
    ///
    /// Trailing zero bits are removed as required for named bit lists.
    fn to_bit_string(self) -> (Vec<u8>, u8) {
        if self.0 == 0 {
            return (Vec::new(), 0)
        }
        let highest = 31 - self.0.leading_zeros() as usize;
        let mut octets = vec![0u8; highest / 8 + 1];
        for i in 0..=highest {
            if self.0 & (1 << i) != 0 {
                octets[i / 8] |= 0x80 >> (i % 8);
            }
        }
        (octets, 7 - (highest % 8) as u8)
    }

    pub fn encode(self) -> impl encode::Values {
        self.encode_as(Tag::BIT_STRING)
    }

    pub fn encode_as(self, tag: Tag) -> impl encode::Values {
        let (octets, unused) = self.to_bit_string();
        BitString::encode_slice_as(octets, unused, tag)
    }
}

impl ops::BitOr for ReasonFlags {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        ReasonFlags(self.0 | other.0)
    }
}

impl ops::BitOrAssign for ReasonFlags {
    fn bitor_assign(&mut self, other: Self) {
        self.0 |= other.0
    }
}

impl fmt::Display for ReasonFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for i in 0..32 {
            if self.0 & (1 << i) == 0 {
                continue
            }
            if !first {
                f.write_str(", ")?;
            }
            match Self::NAMES.get(i) {
                Some(name) => f.write_str(name)?,
                None => write!(f, "Bit {}", i)?,
            }
            first = false;
        }
        if first {
            f.write_str("None")?;
        }
        Ok(())
    }
}


//------------ DistributionPointName -----------------------------------------

#[derive(Clone, Debug)]
pub enum DistributionPointName {
    FullName(GeneralNames),

    /// The encoded content of the relative distinguished name.
    RelativeToIssuer(Captured),
}

impl DistributionPointName {
    /// Takes the name from the content of the explicit `[0]` tag.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::CTX_0 {
                GeneralNames::take_content_from(
                    content.as_constructed()?
                ).map(DistributionPointName::FullName)
            }
            else if tag == Tag::CTX_1 {
                content.as_constructed()?.capture_all().map(
                    DistributionPointName::RelativeToIssuer
                )
            }
            else {
                Err(content.content_err("invalid distribution point name"))
            }
        })
    }

    pub fn full_name(&self) -> Option<&GeneralNames> {
        match *self {
            DistributionPointName::FullName(ref names) => Some(names),
            _ => None
        }
    }

    /// Returns the name including the explicit `[0]` tag.
    pub fn to_captured(&self) -> Captured {
        match *self {
            DistributionPointName::FullName(ref names) => {
                Captured::from_values(
                    Mode::Der,
                    encode::sequence_as(
                        Tag::CTX_0, names.encode_ref_as(Tag::CTX_0)
                    )
                )
            }
            DistributionPointName::RelativeToIssuer(ref rdn) => {
                Captured::from_values(
                    Mode::Der,
                    encode::sequence_as(
                        Tag::CTX_0, encode::sequence_as(Tag::CTX_1, rdn)
                    )
                )
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: &str) -> fmt::Result {
        writeln!(f, "{}Distribution Point Name:", indent)?;
        match *self {
            DistributionPointName::FullName(ref names) => {
                writeln!(f, "{}    Full Name:", indent)?;
                for name in names.iter() {
                    writeln!(f, "{}        {}", indent, name)?;
                }
            }
            DistributionPointName::RelativeToIssuer(ref rdn) => {
                writeln!(
                    f, "{}    Name Relative to Issuer: {}",
                    indent, hex::encode_string(rdn.as_slice())
                )?;
            }
        }
        Ok(())
    }
}

impl PartialEq for DistributionPointName {
    fn eq(&self, other: &Self) -> bool {
        self.to_captured().as_slice() == other.to_captured().as_slice()
    }
}

impl Eq for DistributionPointName { }


//------------ DistributionPoint ---------------------------------------------

/// A single place to obtain CRLs.
///
/// All fields are optional. If none of them is present, the point still
/// encodes as an empty sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DistributionPoint {
    pub name: Option<DistributionPointName>,
    pub reasons: Option<ReasonFlags>,
    pub crl_issuer: Option<GeneralNames>,
}

impl DistributionPoint {
    /// Creates a point with a single full name.
    pub fn from_names(names: GeneralNames) -> Self {
        DistributionPoint {
            name: Some(DistributionPointName::FullName(names)),
            reasons: None,
            crl_issuer: None,
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        match Self::take_opt_from(cons)? {
            Some(res) => Ok(res),
            None => Err(cons.content_err("missing distribution point")),
        }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(DistributionPoint {
                name: cons.take_opt_constructed_if(
                    Tag::CTX_0, DistributionPointName::take_from
                )?,
                reasons: cons.take_opt_value_if(
                    Tag::CTX_1, ReasonFlags::from_content
                )?,
                crl_issuer: cons.take_opt_constructed_if(
                    Tag::CTX_2, GeneralNames::take_content_from
                )?,
            })
        })
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.name.as_ref().map(DistributionPointName::to_captured),
            self.reasons.map(|reasons| reasons.encode_as(Tag::CTX_1)),
            self.crl_issuer.as_ref().map(|names| {
                names.encode_ref_as(Tag::CTX_2)
            }),
        )))
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: &str) -> fmt::Result {
        if let Some(ref name) = self.name {
            name.fmt_indented(f, indent)?;
        }
        if let Some(reasons) = self.reasons {
            writeln!(f, "{}CRL Reasons={}", indent, reasons)?;
        }
        if let Some(ref issuer) = self.crl_issuer {
            writeln!(f, "{}CRL Issuer:", indent)?;
            for name in issuer.iter() {
                writeln!(f, "{}    {}", indent, name)?;
            }
        }
        Ok(())
    }
}


//------------ CrlDistributionPoints and FreshestCrl -------------------------

macro_rules! distribution_points_extension {
    ( $(#[$attr:meta])* $name:ident, $oid:expr, $label:expr ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Default, Eq, PartialEq)]
        pub struct $name(Vec<DistributionPoint>);

        impl $name {
            pub fn new(points: Vec<DistributionPoint>) -> Self {
                $name(points)
            }

            pub fn points(&self) -> &[DistributionPoint] {
                &self.0
            }

            /// Returns all URIs of all full names.
            pub fn uris(&self) -> impl Iterator<Item = &str> {
                self.0.iter().filter_map(|point| {
                    point.name.as_ref().and_then(|name| name.full_name())
                }).flat_map(|names| names.iter()).filter_map(|name| {
                    match *name {
                        super::name::GeneralName::Uri(ref uri) => {
                            Some(uri.as_str())
                        }
                        _ => None
                    }
                })
            }
        }

        impl ExtensionCodec for $name {
            const OID: ConstOid = $oid;

            fn decode_value(value: &[u8]) -> Result<Self, Error> {
                decode_der(value, |cons| {
                    cons.take_sequence(|cons| {
                        let mut res = Vec::new();
                        while let Some(point) =
                            DistributionPoint::take_opt_from(cons)?
                        {
                            res.push(point)
                        }
                        if res.is_empty() {
                            return Err(cons.content_err(
                                "empty distribution points"
                            ))
                        }
                        Ok($name(res))
                    })
                })
            }

            fn encode_value(&self) -> Captured {
                Captured::from_values(Mode::Der, encode::sequence(
                    self.0.iter().map(
                        DistributionPoint::to_captured
                    ).collect::<Vec<_>>()
                ))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                for (i, point) in self.0.iter().enumerate() {
                    writeln!(f, "[{}]{}", i + 1, $label)?;
                    point.fmt_indented(f, "    ")?;
                }
                Ok(())
            }
        }
    }
}

distribution_points_extension!(
    /// Where to obtain the CRLs covering a certificate.
    CrlDistributionPoints, oid::CE_CRL_DISTRIBUTION_POINTS,
    "CRL Distribution Point"
);

distribution_points_extension!(
    /// Where to obtain delta CRLs.
    FreshestCrl, oid::CE_FRESHEST_CRL, "Freshest CRL"
);


//------------ IssuingDistributionPoint --------------------------------------

/// The scope of a CRL.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IssuingDistributionPoint {
    pub name: Option<DistributionPointName>,
    pub only_user_certs: bool,
    pub only_ca_certs: bool,
    pub only_some_reasons: Option<ReasonFlags>,
    pub indirect_crl: bool,
    pub only_attribute_certs: bool,
}

impl IssuingDistributionPoint {
    fn take_bool<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        tag: Tag,
    ) -> Result<bool, DecodeError<S::Error>> {
        cons.take_opt_primitive_if(tag, |prim| prim.to_bool()).map(|res| {
            res.unwrap_or(false)
        })
    }

    /// Takes the reason flags.
    ///
    /// They are encoded with an explicit tag but the implicitly tagged
    /// form is accepted, too.
    fn take_reasons<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
    ) -> Result<Option<ReasonFlags>, DecodeError<S::Error>> {
        cons.take_opt_value_if(Tag::CTX_3, |content| {
            if let decode::Content::Constructed(ref mut inner) = *content {
                return ReasonFlags::take_from(inner)
            }
            ReasonFlags::from_content(content)
        })
    }

    fn encode_bool(value: bool, tag: Tag) -> Option<impl encode::Values> {
        if value {
            Some(value.encode_as(tag))
        }
        else {
            None
        }
    }
}

impl ExtensionCodec for IssuingDistributionPoint {
    const OID: ConstOid = oid::CE_ISSUING_DISTRIBUTION_POINT;

    fn decode_value(value: &[u8]) -> Result<Self, Error> {
        decode_der(value, |cons| {
            cons.take_sequence(|cons| {
                Ok(IssuingDistributionPoint {
                    name: cons.take_opt_constructed_if(
                        Tag::CTX_0, DistributionPointName::take_from
                    )?,
                    only_user_certs: Self::take_bool(cons, Tag::CTX_1)?,
                    only_ca_certs: Self::take_bool(cons, Tag::CTX_2)?,
                    only_some_reasons: Self::take_reasons(cons)?,
                    indirect_crl: Self::take_bool(cons, Tag::CTX_4)?,
                    only_attribute_certs: Self::take_bool(cons, Tag::CTX_5)?,
                })
            })
        })
    }

    fn encode_value(&self) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence((
            self.name.as_ref().map(DistributionPointName::to_captured),
            Self::encode_bool(self.only_user_certs, Tag::CTX_1),
            Self::encode_bool(self.only_ca_certs, Tag::CTX_2),
            self.only_some_reasons.map(|reasons| {
                encode::sequence_as(Tag::CTX_3, reasons.encode())
            }),
            Self::encode_bool(self.indirect_crl, Tag::CTX_4),
            Self::encode_bool(self.only_attribute_certs, Tag::CTX_5),
        )))
    }
}

impl fmt::Display for IssuingDistributionPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn yes_no(value: bool) -> &'static str {
            if value { "Yes" } else { "No" }
        }

        if let Some(ref name) = self.name {
            name.fmt_indented(f, "")?;
        }
        writeln!(f, "Only Contains User Certs={}", yes_no(self.only_user_certs))?;
        writeln!(f, "Only Contains CA Certs={}", yes_no(self.only_ca_certs))?;
        if let Some(reasons) = self.only_some_reasons {
            writeln!(f, "Only Some Reasons={}", reasons)?;
        }
        writeln!(f, "Indirect CRL={}", yes_no(self.indirect_crl))?;
        writeln!(
            f, "Only Contains Attribute Certs={}",
            yes_no(self.only_attribute_certs)
        )
    }
}


//============ Tests =========================================================
