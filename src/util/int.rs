//! Positive big integers as used in DER.
//!
//! Key components and serial numbers are arbitrary size positive integers.
//! DER encodes them as two’s complement INTEGER values which means that a
//! zero octet has to be prepended whenever the most significant octet has
//! its left-most bit set. This module keeps the plain big-endian magnitude
//! and deals with the extra octet only at the encoding boundary.

use std::{cmp, fmt, io};
use std::str::FromStr;
use bcder::{decode, Mode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use bytes::Bytes;
use openssl::bn::{BigNum, BigNumRef};
use openssl::error::ErrorStack;
use super::hex;


//------------ UnsignedInt ---------------------------------------------------

/// A positive integer of arbitrary size.
///
/// The value holds the big-endian magnitude without any leading zero
/// octets. Zero is represented by an empty magnitude.
#[derive(Clone, Default, Eq, Hash, PartialEq)]
pub struct UnsignedInt(Bytes);

impl UnsignedInt {
    /// Creates a value from a big-endian octet sequence.
    ///
    /// Leading zero octets are dropped.
    pub fn from_be_slice(slice: &[u8]) -> Self {
        Self::from_be_bytes(Bytes::copy_from_slice(slice))
    }

    /// Creates a value from big-endian octets in a bytes value.
    pub fn from_be_bytes(bytes: Bytes) -> Self {
        let start = bytes.iter().position(|&ch| ch != 0).unwrap_or(
            bytes.len()
        );
        UnsignedInt(bytes.slice(start..))
    }

    /// Creates a value from its little-endian octets.
    pub fn from_le_slice(slice: &[u8]) -> Self {
        let mut vec = slice.to_vec();
        vec.reverse();
        Self::from_be_bytes(vec.into())
    }

    pub fn from_bignum(num: &BigNumRef) -> Self {
        Self::from_be_bytes(num.to_vec().into())
    }

    pub fn to_bignum(&self) -> Result<BigNum, ErrorStack> {
        BigNum::from_slice(&self.0)
    }

    /// Returns the big-endian magnitude without leading zeros.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns the magnitude as a bytes value.
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Returns the magnitude left-padded with zeros to `len` octets.
    ///
    /// If the magnitude is longer than `len`, it is returned unchanged.
    pub fn to_be_padded(&self, len: usize) -> Vec<u8> {
        let mut res = vec![0; len.saturating_sub(self.0.len())];
        res.extend_from_slice(&self.0);
        res
    }

    /// Returns the content octets of the DER INTEGER for this value.
    ///
    /// This is the magnitude with a zero octet prepended if its first octet
    /// has the left-most bit set, or a single zero octet for zero.
    pub fn to_der_content(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.0.len() + 1);
        if self.needs_padding() {
            res.push(0);
        }
        res.extend_from_slice(&self.0);
        res
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of octets of the magnitude.
    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    /// Returns the number of significant bits.
    pub fn bit_len(&self) -> usize {
        match self.0.first() {
            Some(first) => {
                self.0.len() * 8 - first.leading_zeros() as usize
            }
            None => 0
        }
    }

    /// Converts the value into a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None
        }
        Some(self.0.iter().fold(0u64, |res, &ch| res << 8 | u64::from(ch)))
    }

    fn needs_padding(&self) -> bool {
        match self.0.first() {
            Some(first) => first & 0x80 != 0,
            None => true
        }
    }

    /// Takes an INTEGER from the beginning of a constructed value.
    ///
    /// The content is interpreted as a big-endian magnitude. A redundant
    /// leading zero octet is accepted and dropped. Values with the
    /// left-most bit set are not rejected but read as their unsigned
    /// magnitude since there are serial numbers like that in the wild.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::INTEGER, Self::from_primitive)
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_primitive_if(Tag::INTEGER, Self::from_primitive)
    }

    pub fn from_primitive<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let bytes = prim.take_all()?;
        if bytes.is_empty() {
            return Err(prim.content_err("empty integer"))
        }
        Ok(Self::from_be_bytes(bytes))
    }
}


//--- From and FromStr

impl From<u64> for UnsignedInt {
    fn from(value: u64) -> Self {
        Self::from_be_slice(&value.to_be_bytes())
    }
}

impl From<&[u8]> for UnsignedInt {
    fn from(slice: &[u8]) -> Self {
        Self::from_be_slice(slice)
    }
}

impl FromStr for UnsignedInt {
    type Err = hex::HexError;

    /// Parses a value from a hex string such as `"01"` or `"7F:FF"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s).map(|vec| Self::from_be_bytes(vec.into()))
    }
}


//--- PartialOrd and Ord

impl PartialOrd for UnsignedInt {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnsignedInt {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}


//--- Display and Debug

impl fmt::Display for UnsignedInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("00")
        }
        f.write_str(&hex::encode_string(&self.0))
    }
}

impl fmt::Debug for UnsignedInt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UnsignedInt({})", self)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for UnsignedInt {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self, _mode: Mode) -> usize {
        if self.needs_padding() {
            self.0.len() + 1
        }
        else {
            self.0.len()
        }
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        if self.needs_padding() {
            target.write_all(&[0])?;
        }
        target.write_all(&self.0)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for UnsignedInt {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UnsignedInt {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UnsignedInt::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::encode::Values;

    fn encoded(value: &UnsignedInt) -> Vec<u8> {
        let mut target = Vec::new();
        value.encode_ref().write_encoded(Mode::Der, &mut target).unwrap();
        target
    }

    fn decoded(data: &[u8]) -> UnsignedInt {
        Mode::Der.decode(data, UnsignedInt::take_from).unwrap()
    }

    #[test]
    fn strip_leading_zero() {
        let value = decoded(b"\x02\x03\x00\x81\x02");
        assert_eq!(value.as_slice(), b"\x81\x02");
        assert_eq!(encoded(&value), b"\x02\x03\x00\x81\x02");

        let value = decoded(b"\x02\x02\x00\x01");
        assert_eq!(value.as_slice(), b"\x01");
        assert_eq!(encoded(&value), b"\x02\x01\x01");
    }

    #[test]
    fn high_bit_without_padding() {
        let value = decoded(b"\x02\x02\xff\x01");
        assert_eq!(value.as_slice(), b"\xff\x01");
        assert_eq!(encoded(&value), b"\x02\x03\x00\xff\x01");
    }

    #[test]
    fn zero() {
        let value = decoded(b"\x02\x01\x00");
        assert!(value.is_zero());
        assert_eq!(encoded(&value), b"\x02\x01\x00");
        assert_eq!(value.to_string(), "00");
        assert_eq!(value.to_u64(), Some(0));
        assert_eq!(value.to_der_content(), vec![0]);
        assert!(
            Mode::Der.decode(
                b"\x02\x00".as_ref(), UnsignedInt::take_from
            ).is_err()
        );
    }

    #[test]
    fn conversions() {
        let value = UnsignedInt::from(0x1_0203u64);
        assert_eq!(value.as_slice(), b"\x01\x02\x03");
        assert_eq!(value.to_string(), "010203");
        assert_eq!(value.to_u64(), Some(0x1_0203));
        assert_eq!(value.bit_len(), 17);
        assert_eq!(value.to_be_padded(5), vec![0, 0, 1, 2, 3]);
        assert_eq!(UnsignedInt::from_str("010203").unwrap(), value);
        assert_eq!(UnsignedInt::from_le_slice(b"\x03\x02\x01\x00"), value);
        assert_eq!(
            UnsignedInt::from_str("01").unwrap(), UnsignedInt::from(1u64)
        );
        assert!(UnsignedInt::from(1u64) < UnsignedInt::from(0x100u64));
        assert_eq!(
            UnsignedInt::from_be_slice(&[0xAB; 9]).to_u64(), None
        );
    }

    #[test]
    fn bignum() {
        let value = UnsignedInt::from(0xFF00u64);
        let num = value.to_bignum().unwrap();
        assert_eq!(UnsignedInt::from_bignum(&num), value);
    }
}
