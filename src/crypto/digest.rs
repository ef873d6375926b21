//! Digest algorithm and operations.

use std::fmt;
use bcder::{decode, encode, Mode, Oid};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use openssl::hash::{hash, MessageDigest};
use openssl::md::{Md, MdRef};
use ring::digest;
use crate::oid;
use crate::error::Error;
use crate::x509::AlgorithmIdentifier;


//------------ HashAlgorithm -------------------------------------------------

/// The hash algorithms supported for signatures.
///
/// MD5 is supported for verifying legacy objects. All SHA variants are
/// calculated with *ring*, MD5 goes through OpenSSL.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// # Creating Digest Values
///
impl HashAlgorithm {
    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let alg = match self {
            HashAlgorithm::Md5 => {
                return Ok(hash(MessageDigest::md5(), data)?.to_vec())
            }
            HashAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            HashAlgorithm::Sha256 => &digest::SHA256,
            HashAlgorithm::Sha384 => &digest::SHA384,
            HashAlgorithm::Sha512 => &digest::SHA512,
        };
        Ok(digest::digest(alg, data).as_ref().to_vec())
    }

    /// Returns the length of a digest in octets.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Returns the OpenSSL message digest for this algorithm.
    pub fn md(self) -> &'static MdRef {
        match self {
            HashAlgorithm::Md5 => Md::md5(),
            HashAlgorithm::Sha1 => Md::sha1(),
            HashAlgorithm::Sha256 => Md::sha256(),
            HashAlgorithm::Sha384 => Md::sha384(),
            HashAlgorithm::Sha512 => Md::sha512(),
        }
    }

    /// Returns the hash algorithm for a digest of the given length.
    pub fn from_digest_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(HashAlgorithm::Md5),
            20 => Some(HashAlgorithm::Sha1),
            32 => Some(HashAlgorithm::Sha256),
            48 => Some(HashAlgorithm::Sha384),
            64 => Some(HashAlgorithm::Sha512),
            _ => None
        }
    }
}


/// # ASN.1 Values
///
/// Hash algorithms are identified through an algorithm identifier:
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The parameters should be NULL but may be absent. When encoding, we
/// always include the NULL.
impl HashAlgorithm {
    pub fn oid(self) -> &'static bcder::ConstOid {
        match self {
            HashAlgorithm::Md5 => &oid::MD5,
            HashAlgorithm::Sha1 => &oid::SHA1,
            HashAlgorithm::Sha256 => &oid::SHA256,
            HashAlgorithm::Sha384 => &oid::SHA384,
            HashAlgorithm::Sha512 => &oid::SHA512,
        }
    }

    pub fn from_oid<T: AsRef<[u8]>>(id: &Oid<T>) -> Option<Self> {
        [
            HashAlgorithm::Md5, HashAlgorithm::Sha1, HashAlgorithm::Sha256,
            HashAlgorithm::Sha384, HashAlgorithm::Sha512
        ].into_iter().find(|alg| id == alg.oid())
    }

    /// Takes a hash algorithm identifier.
    ///
    /// Unknown hash algorithms are a decoding error.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let id = Oid::take_from(cons)?;
            cons.take_opt_null()?;
            Self::from_oid(&id).ok_or_else(|| {
                cons.content_err("unsupported hash algorithm")
            })
        })
    }

    /// Resolves an already decoded algorithm identifier.
    pub fn from_algorithm_identifier(
        alg: &AlgorithmIdentifier
    ) -> Result<Self, Error> {
        Self::from_oid(alg.algorithm()).ok_or_else(|| {
            Error::unsupported(alg.algorithm())
        })
    }

    /// Provides an encoder for the algorithm identifier with NULL parameters.
    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.oid().encode(),
            ().encode(),
        ))
    }

    pub fn algorithm_identifier(self) -> AlgorithmIdentifier {
        AlgorithmIdentifier::with_null(self.oid())
    }

    /// Returns the encoded algorithm identifier.
    pub fn to_der(self) -> Vec<u8> {
        bcder::Captured::from_values(Mode::Der, self.encode()).to_vec()
    }
}


//--- Display

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        })
    }
}


//------------ Functions -----------------------------------------------------

/// Returns the SHA-1 digest of `data`.
///
/// This is used for key identifiers.
pub fn sha1(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data).as_ref().to_vec()
}

/// Returns the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}


//============ Tests =========================================================
