//! Export of public keys as CNG key blobs.
//!
//! The Windows Cryptography API: Next Generation imports public keys from
//! fixed-layout binary structures. All header fields are little-endian
//! 32 bit integers while the key components are big-endian and padded to
//! the lengths given in the header.

use log::debug;
use crate::error::Error;
use super::keys::{
    AsymmetricKeyPair, DsaKey, EcKey, KeyMaterial, RsaKey
};


//------------ Magic Numbers -------------------------------------------------

const RSA_PUBLIC_MAGIC: u32 = 0x3141_5352;
const DSA_PUBLIC_MAGIC: u32 = 0x4250_5344;
const DSA_PUBLIC_MAGIC_V2: u32 = 0x3242_5044;
const ECDSA_PUBLIC_P256_MAGIC: u32 = 0x3153_4345;
const ECDSA_PUBLIC_P384_MAGIC: u32 = 0x3353_4345;
const ECDSA_PUBLIC_P521_MAGIC: u32 = 0x3553_4345;

/// The hash algorithm values of the version 2 DSA blob.
const DSA_HASH_SHA1: u32 = 0;
const DSA_HASH_SHA256: u32 = 1;
const DSA_HASH_SHA512: u32 = 2;

/// The FIPS 186-3 standard version of the version 2 DSA blob.
const DSA_FIPS186_3: u32 = 1;

/// The size of seed and q in the legacy DSA blob.
const DSA_LEGACY_LEN: usize = 20;


//------------ AsymmetricKeyPair ---------------------------------------------

impl AsymmetricKeyPair {
    /// Returns the public key as a CNG key blob.
    pub fn crypto_api_blob(&self) -> Result<Vec<u8>, Error> {
        match *self.material() {
            KeyMaterial::Rsa(ref key) => Ok(rsa_blob(key)),
            KeyMaterial::Dsa(ref key) => dsa_blob(key),
            KeyMaterial::Ecdsa(ref key) => ecdsa_blob(key),
        }
    }
}


//------------ RSA -----------------------------------------------------------

/// Creates a `BCRYPT_RSAKEY_BLOB` with the public exponent and modulus.
fn rsa_blob(key: &RsaKey) -> Vec<u8> {
    let exponent = key.public_exponent.as_slice();
    let modulus = key.modulus.as_slice();
    let mut res = Vec::with_capacity(24 + exponent.len() + modulus.len());
    push_u32(&mut res, RSA_PUBLIC_MAGIC);
    push_u32(&mut res, key.modulus.bit_len() as u32);
    push_u32(&mut res, exponent.len() as u32);
    push_u32(&mut res, modulus.len() as u32);
    push_u32(&mut res, 0); // cbPrime1
    push_u32(&mut res, 0); // cbPrime2
    res.extend_from_slice(exponent);
    res.extend_from_slice(modulus);
    res
}


//------------ DSA -----------------------------------------------------------

/// Creates a DSA blob.
///
/// Keys of up to 1024 bits use `BCRYPT_DSA_KEY_BLOB` with its fixed size
/// seed and q. Larger keys use `BCRYPT_DSA_KEY_BLOB_V2`. If the seed used
/// for parameter generation is unknown, seed and counter are all 0xFF.
fn dsa_blob(key: &DsaKey) -> Result<Vec<u8>, Error> {
    let key_len = key.p.byte_len();
    let y = key.public_value()?;
    let mut res = Vec::new();
    if key_len <= 128 {
        if key.q.byte_len() > DSA_LEGACY_LEN {
            return Err(Error::malformed("DSA q too long for key size"))
        }
        push_u32(&mut res, DSA_PUBLIC_MAGIC);
        push_u32(&mut res, key_len as u32);
        push_seed(&mut res, key, DSA_LEGACY_LEN)?;
        res.extend_from_slice(&key.q.to_be_padded(DSA_LEGACY_LEN));
    }
    else {
        let group_len = key.q.byte_len();
        let hash = match group_len {
            20 => DSA_HASH_SHA1,
            32 => DSA_HASH_SHA256,
            64 => DSA_HASH_SHA512,
            _ => {
                return Err(Error::unsupported(
                    format!("DSA with {}-bit q", key.q.bit_len())
                ))
            }
        };
        let seed_len = match key.seed {
            Some(ref seed) => seed.seed.len(),
            None => group_len,
        };
        push_u32(&mut res, DSA_PUBLIC_MAGIC_V2);
        push_u32(&mut res, key_len as u32);
        push_u32(&mut res, hash);
        push_u32(&mut res, DSA_FIPS186_3);
        push_u32(&mut res, seed_len as u32);
        push_u32(&mut res, group_len as u32);
        push_seed(&mut res, key, seed_len)?;
        res.extend_from_slice(key.q.as_slice());
    }
    res.extend_from_slice(&key.p.to_be_padded(key_len));
    res.extend_from_slice(&key.g.to_be_padded(key_len));
    res.extend_from_slice(&y.to_be_padded(key_len));
    Ok(res)
}

/// Appends the big-endian counter and the seed.
///
/// Shorter seeds are padded with leading zeros to `seed_len`.
fn push_seed(
    res: &mut Vec<u8>, key: &DsaKey, seed_len: usize
) -> Result<(), Error> {
    match key.seed {
        Some(ref seed) => {
            if seed.seed.len() > seed_len {
                return Err(Error::State("DSA seed too long for key blob"))
            }
            res.extend_from_slice(&seed.counter.to_be_bytes());
            let pad = seed_len.saturating_sub(seed.seed.len());
            res.extend(std::iter::repeat(0).take(pad));
            res.extend_from_slice(&seed.seed);
        }
        None => {
            debug!("DSA key without seed, using 0xFF sentinel");
            res.extend(std::iter::repeat(0xFF).take(4 + seed_len));
        }
    }
    Ok(())
}


//------------ ECDSA ---------------------------------------------------------

/// Creates a `BCRYPT_ECCKEY_BLOB` with the public point.
///
/// Only the three named NIST curves have a magic number. The point is
/// appended without the leading 0x04.
fn ecdsa_blob(key: &EcKey) -> Result<Vec<u8>, Error> {
    use super::keys::EcCurve;

    let magic = match key.parameters.curve() {
        Some(EcCurve::P256) => ECDSA_PUBLIC_P256_MAGIC,
        Some(EcCurve::P384) => ECDSA_PUBLIC_P384_MAGIC,
        Some(EcCurve::P521) => ECDSA_PUBLIC_P521_MAGIC,
        None => {
            return Err(Error::unsupported(
                "CNG blob for explicitly specified curve"
            ))
        }
    };
    let mut res = Vec::with_capacity(8 + key.x.len() + key.y.len());
    push_u32(&mut res, magic);
    push_u32(&mut res, key.x.len() as u32);
    res.extend_from_slice(&key.x);
    res.extend_from_slice(&key.y);
    Ok(res)
}


//------------ Helpers -------------------------------------------------------

fn push_u32(res: &mut Vec<u8>, value: u32) {
    res.extend_from_slice(&value.to_le_bytes())
}


//============ Tests =========================================================
