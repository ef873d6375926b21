//! Handling of Base 64-encoded data.
//!
//! Because there are different dialects of Base 64 and applications again
//! place slight differences atop those, the module provides structs that
//! describe the flavors of Base 64 used within a certain context. That is,
//! you don’t have to remember how an application uses Base 64 exactly but
//! just pick your application.
use std::fmt;
use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, STANDARD};

pub use base64::DecodeError;


//------------ Pem -----------------------------------------------------------

/// The flavor used for the body of PEM armoured data.
///
/// This uses the standard alphabet with padding. When decoding, all ASCII
/// white space is skipped. Encoding happens without line breaks, wrapping
/// is left to the PEM writer.
pub struct Pem;

impl Pem {
    const ENGINE: GeneralPurpose = STANDARD;

    pub fn decode(self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let stripped: Vec<u8> = input.iter().copied().filter(|ch| {
            !ch.is_ascii_whitespace()
        }).collect();
        Self::ENGINE.decode(stripped)
    }

    pub fn encode(self, data: &[u8]) -> String {
        Self::ENGINE.encode(data)
    }
}


//------------ Serde --------------------------------------------------------

/// The flavor used for serialization of objects in this crate.
///
/// This flavor is used whenever Base 64 is used for serialization of
/// binary objects in this crate.
///
/// It uses the standard alphabet with padding and no white space allowed.
pub struct Serde;

impl Serde {
    const ENGINE: GeneralPurpose = STANDARD;

    pub fn decode(self, input: &str) -> Result<Vec<u8>, DecodeError> {
        Self::ENGINE.decode(input)
    }

    pub fn encode(self, data: &[u8]) -> String {
        Self::ENGINE.encode(data)
    }

    pub fn display(self, data: &[u8]) -> impl fmt::Display + '_ {
        base64::display::Base64Display::new(data, &Self::ENGINE)
    }
}


//============ Tests =========================================================
