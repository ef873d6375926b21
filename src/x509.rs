//! Types common to all things X.509.

use std::{fmt, io, ops};
use std::convert::Infallible;
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{BitString, Captured, ConstOid, Mode, Oid, Tag};
use bcder::decode::{DecodeError, Pos, Source as _};
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use chrono::{Datelike, DateTime, TimeDelta, TimeZone, Timelike, Utc};
use crate::oid;
use crate::crypto::keys::AsymmetricKeyPair;
use crate::crypto::signature::SignatureEngine;
use crate::error::Error;
use crate::util::hex;


//------------ Functions -----------------------------------------------------

/// Decodes a complete DER value with the given function.
///
/// This is the entry point for all decoders that start from a slice. The
/// slice must contain exactly one value. Any data following it is an
/// error.
pub fn decode_der<'a, F, T>(data: &'a [u8], op: F) -> Result<T, Error>
where
    F: FnOnce(
        &mut decode::Constructed<decode::SliceSource<'a>>
    ) -> Result<T, DecodeError<Infallible>>
{
    // A top-level decode doesn’t check for trailing data, so measure the
    // first value before decoding it.
    let len = Mode::Der.decode(data, |cons| cons.capture_one())?.len();
    if len != data.len() {
        return Err(Error::Malformed(
            DecodeError::content("trailing data", Pos::from(len))
        ))
    }
    Mode::Der.decode(data, op).map_err(Into::into)
}


//------------ Name ----------------------------------------------------------

/// An X.500 distinguished name.
///
/// The name is kept in its encoded form. It is checked for structural
/// correctness when decoded but the attribute values are only interpreted
/// when the name is displayed.
#[derive(Clone, Debug)]
pub struct Name(Captured);

impl Name {
    pub fn from_captured(captured: Captured) -> Self {
        Name(captured)
    }

    /// Creates a name with one attribute per relative distinguished name.
    ///
    /// The attributes are given in encoding order, i.e., the least specific
    /// attribute first. Country names are encoded as PrintableString, all
    /// others as UTF8String.
    pub fn from_attributes(attrs: &[(ConstOid, &str)]) -> Self {
        let rdns: Vec<_> = attrs.iter().map(|(id, value)| {
            let tag = if *id == oid::AT_COUNTRY_NAME {
                Tag::PRINTABLE_STRING
            }
            else {
                Tag::UTF8_STRING
            };
            Captured::from_values(Mode::Der, encode::set(
                encode::sequence((
                    id.encode_ref(),
                    value.as_bytes().encode_as(tag),
                ))
            ))
        }).collect();
        Name(Captured::from_values(Mode::Der, encode::sequence(rdns)))
    }

    /// Creates a name consisting of a single common name.
    pub fn from_common_name(cn: &str) -> Self {
        Self::from_attributes(&[(oid::AT_COMMON_NAME, cn)])
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.capture(|cons| {
            cons.take_sequence(|cons| { // RDNSequence
                while let Some(()) = cons.take_opt_set(|cons| {
                    let mut empty_set = true;
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        empty_set = false;
                        Oid::skip_in(cons)?;
                        if cons.skip_one()?.is_none() {
                            return Err(cons.content_err(
                                "missing attribute value in name"
                            ))
                        }
                        Ok(())
                    })? { }
                    if empty_set {
                        return Err(cons.content_err(
                            "empty relative distinguished name"
                        ));
                    }
                    Ok(())
                })? { }
                Ok(())
            })
        }).map(Name)
    }

    /// Returns all attributes of the name in encoding order.
    pub fn attributes(&self) -> Vec<(Oid, String)> {
        let mut res = Vec::new();
        let _ = self.0.clone().decode(|cons| {
            cons.take_sequence(|cons| {
                while let Some(()) = cons.take_opt_set(|cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        let id = Oid::take_from(cons)?;
                        let value = cons.take_value(|tag, content| {
                            let bytes = match content.as_primitive() {
                                Ok(prim) => prim.take_all()?,
                                Err(_) => Bytes::new(),
                            };
                            Ok(directory_string(tag, &bytes))
                        })?;
                        res.push((id, value));
                        Ok(())
                    })? { }
                    Ok(())
                })? { }
                Ok(())
            })
        });
        res
    }

    /// Returns the value of the first common name attribute, if any.
    pub fn common_name(&self) -> Option<String> {
        self.attributes().into_iter().find_map(|(id, value)| {
            if id == oid::AT_COMMON_NAME { Some(value) } else { None }
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        &self.0
    }
}

/// Converts the content of a directory string into a Rust string.
fn directory_string(tag: Tag, bytes: &[u8]) -> String {
    if tag == Tag::BMP_STRING {
        let units: Vec<u16> = bytes.chunks(2).map(|pair| {
            u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)])
        }).collect();
        String::from_utf16_lossy(&units)
    }
    else if tag == Tag::UNIVERSAL_STRING {
        bytes.chunks(4).filter_map(|quad| {
            if quad.len() == 4 {
                char::from_u32(u32::from_be_bytes(
                    [quad[0], quad[1], quad[2], quad[3]]
                ))
            }
            else {
                None
            }
        }).collect()
    }
    else if tag == Tag::TELETEX_STRING {
        bytes.iter().map(|&ch| char::from(ch)).collect()
    }
    else if tag == Tag::UTF8_STRING || tag == Tag::PRINTABLE_STRING
        || tag == Tag::IA5_STRING || tag == Tag::NUMERIC_STRING
        || tag == Tag::VISIBLE_STRING
    {
        String::from_utf8_lossy(bytes).into_owned()
    }
    else {
        format!("#{}", hex::encode_string(bytes))
    }
}

//--- PartialEq and Eq

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl Eq for Name {}

//--- Display

/// Displays the name with the most specific attribute first.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (id, value) in self.attributes().iter().rev() {
            if first {
                first = false;
            }
            else {
                f.write_str(", ")?;
            }
            match oid::short_name(id) {
                Some(name) => write!(f, "{}={}", name, value)?,
                None => write!(f, "OID.{}={}", id, value)?,
            }
        }
        Ok(())
    }
}


//------------ AlgorithmIdentifier -------------------------------------------

/// An algorithm identifier with optional parameters.
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The parameters are kept as raw DER. If they are absent, they are not
/// encoded at all which is different from a NULL parameter.
#[derive(Clone, Debug)]
pub struct AlgorithmIdentifier {
    algorithm: Oid,
    parameters: Option<Captured>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: Oid, parameters: Option<Captured>) -> Self {
        AlgorithmIdentifier { algorithm, parameters }
    }

    /// Creates an identifier without parameters.
    pub fn from_oid(algorithm: &ConstOid) -> Self {
        Self::new(to_oid(algorithm), None)
    }

    /// Creates an identifier with a NULL parameter.
    pub fn with_null(algorithm: &ConstOid) -> Self {
        Self::new(
            to_oid(algorithm),
            Some(Captured::from_values(Mode::Der, ().encode()))
        )
    }

    pub fn algorithm(&self) -> &Oid {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&Captured> {
        self.parameters.as_ref()
    }

    /// Returns whether the parameters are either absent or NULL.
    pub fn has_empty_parameters(&self) -> bool {
        match self.parameters {
            Some(ref params) => params.as_slice() == b"\x05\x00",
            None => true
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let algorithm = Oid::take_from(cons)?;
        let parameters = cons.capture_all()?;
        Ok(AlgorithmIdentifier {
            algorithm,
            parameters: if parameters.is_empty() {
                None
            }
            else {
                Some(parameters)
            }
        })
    }

    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        decode_der(data, Self::take_from)
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            self.algorithm.encode_ref(),
            self.parameters.as_ref(),
        ))
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }
}

impl PartialEq for AlgorithmIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
            && self.parameters.as_ref().map(Captured::as_slice)
                == other.parameters.as_ref().map(Captured::as_slice)
    }
}

impl Eq for AlgorithmIdentifier { }

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match oid::long_name(&self.algorithm) {
            Some(name) => write!(f, "{} ({})", name, self.algorithm),
            None => write!(f, "{}", self.algorithm),
        }
    }
}

/// Converts a constant object identifier into an owned one.
pub fn to_oid(oid: &ConstOid) -> Oid {
    Oid(Bytes::from_static(oid.0))
}


//------------ SignedData ----------------------------------------------------

/// The signed envelope shared by certificates and CRLs.
///
/// ```txt
/// SEQUENCE {
///     tbs                 ANY,
///     signatureAlgorithm  AlgorithmIdentifier,
///     signatureValue      BIT STRING }
/// ```
///
/// The signed content is kept as captured so signatures are verified over
/// the exact octets received.
#[derive(Clone, Debug)]
pub struct SignedData {
    data: Captured,
    algorithm: AlgorithmIdentifier,
    signature: Bytes,
}

impl SignedData {
    pub fn new(
        data: Captured, algorithm: AlgorithmIdentifier, signature: Bytes
    ) -> Self {
        SignedData { data, algorithm, signature }
    }

    /// Signs `data` with the key and algorithm of `engine`.
    pub fn sign(
        data: Captured, engine: &SignatureEngine, alternate_ecdsa: bool,
    ) -> Result<Self, Error> {
        let signature = engine.sign_data(data.as_slice())?;
        Ok(SignedData {
            data,
            algorithm: engine.algorithm_identifier(alternate_ecdsa)?,
            signature: signature.into(),
        })
    }

    pub fn data(&self) -> &Captured {
        &self.data
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    pub fn signature(&self) -> &Bytes {
        &self.signature
    }

    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        decode_der(data, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(SignedData {
            data: cons.capture_one()?,
            algorithm: AlgorithmIdentifier::take_from(cons)?,
            signature: BitString::take_from(cons)?.octet_bytes(),
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            &self.data,
            self.algorithm.encode_ref(),
            BitString::encode_slice(self.signature.as_ref(), 0),
        ))
    }

    pub fn to_captured(&self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_ref())
    }

    /// Verifies the signature with the given public key.
    ///
    /// Returns `Ok(false)` if the signature doesn’t match and an error if
    /// the algorithm cannot be used with the key.
    pub fn verify_signature(
        &self, key: &AsymmetricKeyPair
    ) -> Result<bool, Error> {
        SignatureEngine::from_algorithm_identifier(
            key, &self.algorithm
        )?.verify_data(self.data.as_slice(), &self.signature)
    }
}

impl PartialEq for SignedData {
    fn eq(&self, other: &Self) -> bool {
        self.data.as_slice() == other.data.as_slice()
            && self.algorithm == other.algorithm
            && self.signature == other.signature
    }
}

impl Eq for SignedData { }


//------------ Time ----------------------------------------------------------

/// A point in time as used in certificates and CRLs.
///
/// This is the choice of UTCTime and GeneralizedTime. Only the forms
/// required by RFC 5280 are accepted: seconds are present, there are no
/// fractions and the time zone is always `Z`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Creates a time from its components.
    ///
    /// Returns `None` if the components don’t describe a valid time.
    pub fn from_ymd_hms(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec).single().map(
            Time
        )
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        match Self::take_opt_from(cons)? {
            Some(time) => Ok(time),
            None => Err(cons.content_err("missing time value")),
        }
    }

    /// Takes a time value if the next value has one of the time tags.
    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        if let Some(res) = cons.take_opt_primitive_if(
            Tag::UTC_TIME, |prim| Self::from_primitive(prim, false)
        )? {
            return Ok(Some(res))
        }
        cons.take_opt_primitive_if(
            Tag::GENERALIZED_TIME, |prim| Self::from_primitive(prim, true)
        )
    }

    fn from_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>,
        generalized: bool,
    ) -> Result<Self, DecodeError<S::Error>> {
        let year = if generalized {
            read_digits(prim, 4)? as i32
        }
        else {
            // RFC 5280 4.1.2.5.1: YY >= 50 is 19YY.
            match read_digits(prim, 2)? as i32 {
                year if year >= 50 => year + 1900,
                year => year + 2000,
            }
        };
        let month = read_digits(prim, 2)?;
        let day = read_digits(prim, 2)?;
        let hour = read_digits(prim, 2)?;
        let min = read_digits(prim, 2)?;
        let sec = read_digits(prim, 2)?;
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err("malformed time value"))
        }
        Self::from_ymd_hms(year, month, day, hour, min, sec).ok_or_else(|| {
            prim.content_err("malformed time value")
        })
    }

    /// Returns an encoder using UTCTime for years before 2050.
    pub fn encode_varied(self) -> impl encode::Values {
        if self.0.year() < 1950 || self.0.year() > 2049 {
            (None, Some(GeneralizedTime(self).encode()))
        }
        else {
            (Some(UtcTime(self).encode()), None)
        }
    }

    /// Returns an encoder that always uses GeneralizedTime.
    pub fn encode_generalized(self) -> impl encode::Values {
        GeneralizedTime(self).encode()
    }

    pub fn to_captured(self) -> Captured {
        Captured::from_values(Mode::Der, self.encode_varied())
    }
}

fn read_digits<S: decode::Source>(
    source: &mut S, count: usize
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..count {
        let ch = source.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(source.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//--- Deref, From, and FromStr

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl FromStr for Time {
    type Err = chrono::format::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FromStr::from_str(s).map(Time)
    }
}


//--- Add and Sub

impl ops::Add<TimeDelta> for Time {
    type Output = Self;

    fn add(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 + duration)
    }
}

impl ops::Sub<TimeDelta> for Time {
    type Output = Self;

    fn sub(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 - duration)
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}


//------------ UtcTime and GeneralizedTime -----------------------------------

struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}

struct GeneralizedTime(Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ Validity ------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }

    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.not_before.encode_varied(),
            self.not_after.encode_varied(),
        ))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::encode::Values;

    #[test]
    fn name_display_and_equality() {
        let name = Name::from_attributes(&[
            (oid::AT_COUNTRY_NAME, "NL"),
            (oid::AT_ORGANIZATION_NAME, "Example"),
            (oid::AT_COMMON_NAME, "Example CA"),
        ]);
        assert_eq!(name.to_string(), "CN=Example CA, O=Example, C=NL");
        assert_eq!(name.common_name().as_deref(), Some("Example CA"));

        let decoded = decode_der(name.as_slice(), Name::take_from).unwrap();
        assert_eq!(decoded, name);
        assert_ne!(decoded, Name::from_common_name("Other"));
    }

    #[test]
    fn decode_der_rejects_trailing_data() {
        let name = Name::from_common_name("A");
        let mut der = name.as_slice().to_vec();
        assert!(decode_der(&der, Name::take_from).is_ok());
        der.push(0);
        let err = decode_der(&der, Name::take_from).unwrap_err();
        assert!(err.is_malformed());
        der.pop();
        der.extend_from_slice(b"\x05\x00");
        assert!(decode_der(&der, Name::take_from).is_err());
        assert!(decode_der(b"", Name::take_from).is_err());
    }

    #[test]
    fn name_rejects_empty_rdn() {
        assert!(
            decode_der(b"\x30\x02\x31\x00", Name::take_from).is_err()
        );
        // An empty sequence is a valid, empty name.
        let empty = decode_der(b"\x30\x00", Name::take_from).unwrap();
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn algorithm_identifier_parameters() {
        let null = AlgorithmIdentifier::with_null(
            &oid::SHA256_WITH_RSA_ENCRYPTION
        );
        let captured = null.to_captured();
        assert_eq!(
            captured.as_slice(),
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"
        );
        let decoded = AlgorithmIdentifier::decode(captured.as_slice())
            .unwrap();
        assert_eq!(decoded, null);
        assert!(decoded.has_empty_parameters());

        let absent = AlgorithmIdentifier::from_oid(&oid::ECDSA_WITH_SHA256);
        let decoded = AlgorithmIdentifier::decode(
            absent.to_captured().as_slice()
        ).unwrap();
        assert!(decoded.parameters().is_none());
        assert_ne!(decoded, null);
    }

    #[test]
    fn time_choice() {
        let time = Time::from_ymd_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let mut target = Vec::new();
        time.encode_varied().write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x17\x0d230101000000Z");
        assert_eq!(
            decode_der(&target, Time::take_from).unwrap(), time
        );

        let late = Time::from_ymd_hms(2050, 6, 1, 12, 30, 0).unwrap();
        let captured = late.to_captured();
        assert_eq!(captured.as_slice(), b"\x18\x0f20500601123000Z");
        assert_eq!(
            decode_der(captured.as_slice(), Time::take_from).unwrap(), late
        );

        // UTCTime years of 50 and later are in the twentieth century.
        let old = decode_der(b"\x17\x0d500101000000Z", Time::take_from)
            .unwrap();
        assert_eq!(old.year(), 1950);

        assert!(
            decode_der(b"\x17\x0d230101000000+", Time::take_from).is_err()
        );
        assert!(
            decode_der(b"\x17\x0d231301000000Z", Time::take_from).is_err()
        );
        assert_eq!(time.to_string(), "2023-01-01 00:00:00 UTC");
    }
}
