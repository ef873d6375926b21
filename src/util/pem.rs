//! PEM armour at the boundary of the crate.
//!
//! All decoders in this crate operate on DER. Text input in the form of
//! [RFC 7468] armour, or just the Base 64 body without it, is converted to
//! DER through the functions in this module.
//!
//! [RFC 7468]: https://tools.ietf.org/html/rfc7468

use std::{error, fmt, str};
use super::base64;

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DASHES: &str = "-----";


//------------ Pem -----------------------------------------------------------

/// A labelled block of PEM data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pem {
    label: String,
    data: Vec<u8>,
}

impl Pem {
    pub fn new(label: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Pem { label: label.into(), data: data.into() }
    }

    /// Parses the first PEM block found in `input`.
    ///
    /// Any text before the begin line is ignored.
    pub fn parse(input: &[u8]) -> Result<Self, PemError> {
        let start = find(input, BEGIN.as_bytes()).ok_or(
            PemError::HeaderNotFound
        )? + BEGIN.len();
        let label_len = find(&input[start..], DASHES.as_bytes()).ok_or(
            PemError::InvalidHeader
        )?;
        let label = str::from_utf8(&input[start..start + label_len]).map_err(
            |_| PemError::InvalidHeader
        )?.trim().to_string();
        let body_start = start + label_len + DASHES.len();
        let body_len = find(&input[body_start..], END.as_bytes()).ok_or(
            PemError::FooterNotFound
        )?;
        let data = base64::Pem.decode(
            &input[body_start..body_start + body_len]
        ).map_err(PemError::Base64)?;
        Ok(Pem { label, data })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Display for Pem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}{}{}", BEGIN, self.label, DASHES)?;
        let encoded = base64::Pem.encode(&self.data);
        for line in encoded.as_bytes().chunks(64) {
            // Base 64 output is ASCII.
            writeln!(f, "{}", str::from_utf8(line).map_err(|_| fmt::Error)?)?;
        }
        write!(f, "{}{}{}", END, self.label, DASHES)
    }
}


//------------ Functions -----------------------------------------------------

/// Converts input that may be DER, PEM or bare Base 64 into DER.
///
/// Input starting with a SEQUENCE tag is considered DER already and is
/// returned unchanged.
pub fn to_der(input: &[u8]) -> Result<Vec<u8>, PemError> {
    if input.first() == Some(&0x30) {
        return Ok(input.to_vec())
    }
    if find(input, BEGIN.as_bytes()).is_some() {
        return Pem::parse(input).map(Pem::into_data)
    }
    base64::Pem.decode(input).map_err(PemError::Base64)
}

fn find(buf: &[u8], needle: &[u8]) -> Option<usize> {
    buf.windows(needle.len()).position(|window| window == needle)
}


//------------ PemError ------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PemError {
    HeaderNotFound,
    InvalidHeader,
    FooterNotFound,
    Base64(base64::DecodeError),
}

impl fmt::Display for PemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PemError::HeaderNotFound => f.write_str("PEM header not found"),
            PemError::InvalidHeader => f.write_str("invalid PEM header"),
            PemError::FooterNotFound => f.write_str("PEM footer not found"),
            PemError::Base64(ref err) => {
                write!(f, "invalid Base 64 in PEM body: {}", err)
            }
        }
    }
}

impl error::Error for PemError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        let text = "garbage\n-----BEGIN X509 CRL-----\nMAMCAQE=\n\
                    -----END X509 CRL-----\n";
        let pem = Pem::parse(text.as_bytes()).unwrap();
        assert_eq!(pem.label(), "X509 CRL");
        assert_eq!(pem.data(), b"\x30\x03\x02\x01\x01");
        assert_eq!(
            pem.to_string(),
            "-----BEGIN X509 CRL-----\nMAMCAQE=\n-----END X509 CRL-----"
        );
    }

    #[test]
    fn missing_parts() {
        assert_eq!(
            Pem::parse(b"MAMCAQE="), Err(PemError::HeaderNotFound)
        );
        assert_eq!(
            Pem::parse(b"-----BEGIN CRL-----\nMAMCAQE=\n"),
            Err(PemError::FooterNotFound)
        );
    }

    #[test]
    fn der_pem_and_base64() {
        let der = b"\x30\x03\x02\x01\x01";
        assert_eq!(to_der(der).unwrap(), der.to_vec());
        assert_eq!(to_der(b"MAMCAQE=\n").unwrap(), der.to_vec());
        assert_eq!(
            to_der(Pem::new("CRL", der.to_vec()).to_string().as_bytes())
                .unwrap(),
            der.to_vec()
        );
    }
}
