//! Decoding, encoding, and signing of X.509 PKI objects.
//!
//! This crate contains a typed model of the artifacts of the Internet
//! X.509 Public Key Infrastructure profile defined in RFC 5280 beyond the
//! certificate itself:
//!
//! * [`crl`] decodes certificate revocation lists and creates new ones,
//! * [`ext`] provides codecs for certificate and CRL extensions together
//!   with an extensible registry that maps object identifiers to them,
//! * [`crypto`] contains RSA, DSA, and ECDSA key material in its various
//!   encodings as well as the signature engine used to sign and verify
//!   data and to determine the algorithm identifiers for signatures.
//!
//! A minimal certificate type lives in [`cert`]. It serves as the issuer
//! of CRLs and as the source of names and keys for some extensions.
//!
//! All decoding happens from DER encoded octet slices. PEM encoded data
//! can be converted via [`util::pem`].

pub use self::error::Error;

pub mod cert;
pub mod crl;
pub mod crypto;
pub mod error;
pub mod ext;
pub mod oid;
pub mod util;
pub mod x509;
