//! Converting from and to hex strings.

use std::{error, fmt, str};


/// Encodes a octet sequence as a hex string.
///
/// The function uses `dest` as the buffer for encoding which therefore must
/// be exactly twice the length of `src`. It returns a reference to this
/// buffer as a `&str`.
///
/// # Panics
///
/// The function panics if `dest` is shorter than twice the length of `src`.
pub fn encode<'a>(src: &[u8], dest: &'a mut [u8]) -> &'a str {
    let dest = &mut dest[..src.len() * 2];
    for (s, d) in src.iter().zip(dest.chunks_mut(2)) {
        d.copy_from_slice(&encode_u8(*s));
    }
    // Only ever contains ASCII digits and letters.
    unsafe { str::from_utf8_unchecked(dest) }
}

/// Encodes an octet sequence as an uppercase hex string without separators.
pub fn encode_string(src: &[u8]) -> String {
    let mut res = String::with_capacity(src.len() * 2);
    for ch in src {
        let [hi, lo] = encode_u8(*ch);
        res.push(char::from(hi));
        res.push(char::from(lo));
    }
    res
}

pub fn encode_u8(ch: u8) -> [u8; 2] {
    [DIGITS[usize::from(ch >> 4)], DIGITS[usize::from(ch & 0x0F)]]
}

/// Decodes a hex string into an octet sequence.
///
/// Both upper and lower case digits are accepted. White space and colons
/// between octets are skipped. An odd number of digits is interpreted as if
/// there was a leading zero.
pub fn decode(src: &str) -> Result<Vec<u8>, HexError> {
    let digits = src.bytes().filter(|ch| {
        !ch.is_ascii_whitespace() && *ch != b':'
    }).map(decode_digit).collect::<Result<Vec<_>, _>>()?;
    let mut res = Vec::with_capacity(digits.len() / 2 + 1);
    let mut iter = digits.iter();
    if digits.len() % 2 == 1 {
        if let Some(first) = iter.next() {
            res.push(*first);
        }
    }
    while let (Some(hi), Some(lo)) = (iter.next(), iter.next()) {
        res.push(hi << 4 | lo);
    }
    Ok(res)
}

fn decode_digit(ch: u8) -> Result<u8, HexError> {
    match ch {
        b'0'..=b'9' => Ok(ch - b'0'),
        b'a'..=b'f' => Ok(ch - b'a' + 10),
        b'A'..=b'F' => Ok(ch - b'A' + 10),
        _ => Err(HexError(ch))
    }
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//------------ HexError ------------------------------------------------------

/// A string contained a character that isn’t a hex digit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HexError(u8);

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid hex digit {:?}", char::from(self.0))
    }
}

impl error::Error for HexError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_upper() {
        assert_eq!(encode_string(b"\x01\xab\xff"), "01ABFF");
        let mut buf = [0u8; 4];
        assert_eq!(encode(b"\x0f\xa0", &mut buf), "0FA0");
    }

    #[test]
    fn decode_variants() {
        assert_eq!(decode("01").unwrap(), vec![1]);
        assert_eq!(decode("1").unwrap(), vec![1]);
        assert_eq!(decode("ab:CD 0e").unwrap(), vec![0xab, 0xcd, 0x0e]);
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode("0x"), Err(HexError(b'x')));
    }
}
