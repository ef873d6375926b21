//! General names.
//!
//! Many extensions refer to entities through general names:
//!
//! ```txt
//! GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
//!
//! GeneralName ::= CHOICE {
//!      otherName                       [0]     OtherName,
//!      rfc822Name                      [1]     IA5String,
//!      dNSName                         [2]     IA5String,
//!      x400Address                     [3]     ORAddress,
//!      directoryName                   [4]     Name,
//!      ediPartyName                    [5]     EDIPartyName,
//!      uniformResourceIdentifier       [6]     IA5String,
//!      iPAddress                       [7]     OCTET STRING,
//!      registeredID                    [8]     OBJECT IDENTIFIER }
//! ```
//!
//! The module is tagged implicitly. Since `Name` is a CHOICE, the
//! directory name is explicitly tagged nevertheless.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use bcder::{decode, encode, Captured, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use crate::util::hex;
use crate::x509::Name;


//------------ GeneralName ---------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GeneralName {
    /// The content of an `OtherName`.
    Other(CapturedContent),
    Rfc822(String),
    Dns(String),
    /// The content of an `ORAddress`.
    X400(CapturedContent),
    Directory(Name),
    /// The content of an `EDIPartyName`.
    EdiParty(CapturedContent),
    Uri(String),
    IpAddress(Bytes),
    RegisteredId(Oid),
}

impl GeneralName {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        match Self::take_opt_from(cons)? {
            Some(name) => Ok(name),
            None => Err(cons.content_err("missing general name")),
        }
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::CTX_0 {
                CapturedContent::from_content(content).map(GeneralName::Other)
            }
            else if tag == Tag::CTX_1 {
                ia5_string(content).map(GeneralName::Rfc822)
            }
            else if tag == Tag::CTX_2 {
                ia5_string(content).map(GeneralName::Dns)
            }
            else if tag == Tag::CTX_3 {
                CapturedContent::from_content(content).map(GeneralName::X400)
            }
            else if tag == Tag::CTX_4 {
                Name::take_from(
                    content.as_constructed()?
                ).map(GeneralName::Directory)
            }
            else if tag == Tag::CTX_5 {
                CapturedContent::from_content(content).map(
                    GeneralName::EdiParty
                )
            }
            else if tag == Tag::CTX_6 {
                ia5_string(content).map(GeneralName::Uri)
            }
            else if tag == Tag::ctx(7) {
                Ok(GeneralName::IpAddress(content.as_primitive()?.take_all()?))
            }
            else if tag == Tag::ctx(8) {
                Oid::from_primitive(
                    content.as_primitive()?
                ).map(GeneralName::RegisteredId)
            }
            else {
                Err(content.content_err("invalid general name"))
            }
        })
    }

    /// Returns the complete encoding of the name.
    pub fn to_captured(&self) -> Captured {
        match *self {
            GeneralName::Other(ref content) => content.encode_as(Tag::CTX_0),
            GeneralName::Rfc822(ref s) => ia5_encode(s, Tag::CTX_1),
            GeneralName::Dns(ref s) => ia5_encode(s, Tag::CTX_2),
            GeneralName::X400(ref content) => content.encode_as(Tag::CTX_3),
            GeneralName::Directory(ref name) => {
                Captured::from_values(
                    Mode::Der, encode::sequence_as(Tag::CTX_4, name.encode_ref())
                )
            }
            GeneralName::EdiParty(ref content) => {
                content.encode_as(Tag::CTX_5)
            }
            GeneralName::Uri(ref s) => ia5_encode(s, Tag::CTX_6),
            GeneralName::IpAddress(ref addr) => {
                Captured::from_values(
                    Mode::Der,
                    OctetString::encode_slice_as(addr.as_ref(), Tag::ctx(7))
                )
            }
            GeneralName::RegisteredId(ref id) => {
                Captured::from_values(
                    Mode::Der, id.encode_ref_as(Tag::ctx(8))
                )
            }
        }
    }

    pub fn is_registered_id(&self) -> bool {
        matches!(*self, GeneralName::RegisteredId(_))
    }
}

fn ia5_string<S: decode::Source>(
    content: &mut decode::Content<S>
) -> Result<String, DecodeError<S::Error>> {
    let prim = content.as_primitive()?;
    let bytes = prim.take_all()?;
    if !bytes.is_ascii() {
        return Err(prim.content_err("invalid IA5String"))
    }
    String::from_utf8(bytes.to_vec()).map_err(|_| {
        prim.content_err("invalid IA5String")
    })
}

fn ia5_encode(s: &str, tag: Tag) -> Captured {
    Captured::from_values(Mode::Der, s.as_bytes().encode_as(tag))
}


//--- Display

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GeneralName::Other(ref content) => {
                write!(f, "Other Name:{}", content)
            }
            GeneralName::Rfc822(ref s) => write!(f, "RFC822 Name={}", s),
            GeneralName::Dns(ref s) => write!(f, "DNS Name={}", s),
            GeneralName::X400(ref content) => {
                write!(f, "X400 Address:{}", content)
            }
            GeneralName::Directory(ref name) => {
                write!(f, "Directory Address:{}", name)
            }
            GeneralName::EdiParty(ref content) => {
                write!(f, "EDI Party Name:{}", content)
            }
            GeneralName::Uri(ref s) => write!(f, "URL={}", s),
            GeneralName::IpAddress(ref addr) => {
                f.write_str("IP Address=")?;
                if let Ok(octets) = <[u8; 4]>::try_from(addr.as_ref()) {
                    write!(f, "{}", Ipv4Addr::from(octets))
                }
                else if let Ok(octets) = <[u8; 16]>::try_from(addr.as_ref()) {
                    write!(f, "{}", Ipv6Addr::from(octets))
                }
                else {
                    // Name constraints use address and mask.
                    f.write_str(&hex::encode_string(addr))
                }
            }
            GeneralName::RegisteredId(ref id) => {
                write!(f, "Registered ID={}", id)
            }
        }
    }
}


//------------ GeneralNames --------------------------------------------------

/// A non-empty sequence of general names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneralNames(Vec<GeneralName>);

impl GeneralNames {
    pub fn new(names: Vec<GeneralName>) -> Self {
        GeneralNames(names)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::take_content_from)
    }

    /// Takes the names from the content of the sequence.
    ///
    /// This is used where the sequence is implicitly tagged.
    pub fn take_content_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = Vec::new();
        while let Some(name) = GeneralName::take_opt_from(cons)? {
            res.push(name)
        }
        if res.is_empty() {
            return Err(cons.content_err("empty general names"))
        }
        Ok(GeneralNames(res))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the encoded names without the surrounding sequence.
    pub fn content(&self) -> Vec<Captured> {
        self.0.iter().map(GeneralName::to_captured).collect()
    }

    pub fn encode_ref(&self) -> impl encode::Values {
        encode::sequence(self.content())
    }

    pub fn encode_ref_as(&self, tag: Tag) -> impl encode::Values {
        encode::sequence_as(tag, self.content())
    }
}

impl From<Vec<GeneralName>> for GeneralNames {
    fn from(names: Vec<GeneralName>) -> Self {
        GeneralNames(names)
    }
}

impl fmt::Display for GeneralNames {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            name.fmt(f)?;
        }
        Ok(())
    }
}


//------------ CapturedContent -----------------------------------------------

/// The encoded content of a constructed value kept for re-encoding.
///
/// Used for the name choices that are kept opaque.
#[derive(Clone, Debug)]
pub struct CapturedContent(Captured);

impl CapturedContent {
    fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        content.as_constructed()?.capture_all().map(CapturedContent)
    }

    fn encode_as(&self, tag: Tag) -> Captured {
        Captured::from_values(Mode::Der, encode::sequence_as(tag, &self.0))
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl PartialEq for CapturedContent {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl Eq for CapturedContent { }

impl fmt::Display for CapturedContent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode_string(self.0.as_slice()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn round_trip(der: &[u8]) -> GeneralNames {
        let names = Mode::Der.decode(der, GeneralNames::take_from).unwrap();
        let encoded = Captured::from_values(Mode::Der, names.encode_ref());
        assert_eq!(encoded.as_slice(), der);
        names
    }

    #[test]
    fn decode_names() {
        let names = round_trip(
            b"\x30\x1c\
              \x82\x0bexample.com\
              \x86\x07http://\
              \x87\x04\xc0\x00\x02\x01"
        );
        let names: Vec<_> = names.iter().cloned().collect();
        assert_eq!(names[0], GeneralName::Dns("example.com".into()));
        assert_eq!(names[1], GeneralName::Uri("http://".into()));
        assert_eq!(names[1].to_string(), "URL=http://");
        assert_eq!(names[2].to_string(), "IP Address=192.0.2.1");
    }

    #[test]
    fn directory_name() {
        let name = Name::from_common_name("Test");
        let names = GeneralNames::new(
            vec![GeneralName::Directory(name.clone())]
        );
        let der = Captured::from_values(Mode::Der, names.encode_ref());
        assert_eq!(der.as_slice()[2], 0xa4);
        let decoded = round_trip(der.as_slice());
        assert_eq!(decoded, names);
        assert_eq!(decoded.to_string(), "Directory Address:CN=Test");
    }

    #[test]
    fn registered_id_and_other() {
        // [8] 1.2.3, [0] { OID 1.2.3 [0] { NULL } }
        let names = round_trip(
            b"\x30\x0e\x88\x02\x2a\x03\
              \xa0\x08\x06\x02\x2a\x03\xa0\x02\x05\x00"
        );
        assert!(names.iter().next().unwrap().is_registered_id());
    }

    #[test]
    fn empty_names_rejected() {
        assert!(
            Mode::Der.decode(b"\x30\x00".as_ref(), GeneralNames::take_from)
                .is_err()
        );
        assert!(
            Mode::Der.decode(
                b"\x30\x03\x89\x01\x00".as_ref(), GeneralNames::take_from
            ).is_err()
        );
    }
}
