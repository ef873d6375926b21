//! The error type of this crate.

use std::{error, fmt, io};
use std::convert::Infallible;
use bcder::Oid;
use bcder::decode::{ContentError, DecodeError, Pos};
use openssl::error::ErrorStack;


//------------ Error ---------------------------------------------------------

/// An error happened while decoding, encoding, signing or verifying.
///
/// None of these errors is transient. Repeating the failed operation with
/// the same input will fail in the same way.
#[derive(Debug)]
pub enum Error {
    /// The encoded data violates the expected grammar.
    ///
    /// The wrapped error contains the byte position of the violation if it
    /// is known.
    Malformed(DecodeError<Infallible>),

    /// The algorithm of a key does not match the expected family.
    AlgorithmMismatch {
        expected: &'static str,
        found: String,
    },

    /// An algorithm was recognized but isn’t supported.
    UnsupportedAlgorithm(String),

    /// The outer and inner signature algorithm of a CRL differ.
    InconsistentSignatureAlgorithm {
        outer: Oid,
        inner: Oid,
    },

    /// The operation is not possible in the current state of a value.
    State(&'static str),

    /// The underlying crypto library failed.
    Crypto(ErrorStack),
}

impl Error {
    /// Creates a malformed error without position from a message.
    pub fn malformed(err: impl Into<ContentError>) -> Self {
        Error::Malformed(DecodeError::content(err, Pos::from(0)))
    }

    pub fn mismatch(expected: &'static str, found: impl fmt::Display) -> Self {
        Error::AlgorithmMismatch { expected, found: found.to_string() }
    }

    pub fn unsupported(alg: impl fmt::Display) -> Self {
        Error::UnsupportedAlgorithm(alg.to_string())
    }

    /// Returns whether this is an error in the encoded data.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed(_))
    }
}


//--- From

impl From<DecodeError<Infallible>> for Error {
    fn from(err: DecodeError<Infallible>) -> Self {
        Error::Malformed(err)
    }
}

impl From<ErrorStack> for Error {
    fn from(err: ErrorStack) -> Self {
        Error::Crypto(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}


//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Malformed(ref err) => {
                write!(f, "malformed encoding: {}", err)
            }
            Error::AlgorithmMismatch { expected, ref found } => {
                write!(f, "expected {} key, found algorithm {}",
                    expected, found
                )
            }
            Error::UnsupportedAlgorithm(ref alg) => {
                write!(f, "unsupported algorithm {}", alg)
            }
            Error::InconsistentSignatureAlgorithm { ref outer, ref inner } => {
                write!(f,
                    "signature algorithm {} differs from \
                     signed algorithm {}",
                    outer, inner
                )
            }
            Error::State(msg) => f.write_str(msg),
            Error::Crypto(ref err) => write!(f, "crypto error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Malformed(ref err) => Some(err),
            Error::Crypto(ref err) => Some(err),
            _ => None
        }
    }
}


//============ Tests =========================================================
