//! Signature algorithms and operations.
//!
//! The [`SignatureEngine`] binds a key to a hash algorithm and padding
//! scheme. It creates and verifies signatures and converts between its
//! configuration and the signature algorithm identifier used in X.509
//! objects.

use bcder::{decode, encode, Captured, Mode, Tag};
use bcder::decode::DecodeError;
use bcder::encode::PrimitiveContent;
use log::debug;
use openssl::pkey::{HasPublic, PKey};
use openssl::pkey_ctx::PkeyCtx;
use openssl::rsa::Padding;
use openssl::sign::RsaPssSaltlen;
use crate::oid;
use crate::error::Error;
use crate::x509::{decode_der, to_oid, AlgorithmIdentifier};
use super::digest::HashAlgorithm;
use super::keys::{AsymmetricKeyPair, KeyAlgorithm, NativeKey};


//------------ PaddingScheme -------------------------------------------------

/// The padding used for RSA signatures.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaddingScheme {
    /// PKCS #1 version 1.5 padding.
    #[default]
    Pkcs1v15,

    /// RSASSA-PSS with MGF1 using the signature’s hash algorithm.
    Pss,
}


//------------ SignatureEngine -----------------------------------------------

/// Signs and verifies with a key.
///
/// The engine borrows the key for its lifetime. A newly created engine uses
/// SHA-256 with PKCS #1 v1.5 padding for RSA keys.
///
/// DSA signatures are always created and verified with SHA-1 regardless of
/// the configured hash algorithm. Consumers of DSA signed objects rely on
/// this.
#[derive(Clone, Debug)]
pub struct SignatureEngine<'a> {
    key: &'a AsymmetricKeyPair,
    hash: HashAlgorithm,
    padding: PaddingScheme,
    salt_len: Option<usize>,

    /// Is the “signature” just the hash of the data?
    null_signed: bool,
}

/// # Configuration
///
impl<'a> SignatureEngine<'a> {
    pub fn new(key: &'a AsymmetricKeyPair) -> Self {
        SignatureEngine {
            key,
            hash: HashAlgorithm::Sha256,
            padding: PaddingScheme::Pkcs1v15,
            salt_len: None,
            null_signed: false,
        }
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_padding(mut self, padding: PaddingScheme) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the PSS salt length.
    ///
    /// Without an explicit value, the salt is as long as the digest.
    pub fn with_salt_len(mut self, salt_len: usize) -> Self {
        self.salt_len = Some(salt_len);
        self
    }

    pub fn with_null_signed(mut self, null_signed: bool) -> Self {
        self.null_signed = null_signed;
        self
    }

    pub fn key(&self) -> &'a AsymmetricKeyPair {
        self.key
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Returns the hash algorithm actually used with the key.
    ///
    /// This is SHA-1 for DSA keys and the configured algorithm otherwise.
    pub fn effective_hash(&self) -> HashAlgorithm {
        if self.key.algorithm() == KeyAlgorithm::Dsa && !self.null_signed {
            HashAlgorithm::Sha1
        }
        else {
            self.hash
        }
    }

    /// Returns the padding scheme.
    ///
    /// This is only relevant for RSA keys.
    pub fn padding(&self) -> PaddingScheme {
        self.padding
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len.unwrap_or_else(|| self.hash.digest_len())
    }

    pub fn is_null_signed(&self) -> bool {
        self.null_signed
    }
}


/// # Signing and Verifying
///
impl<'a> SignatureEngine<'a> {
    /// Signs a digest.
    ///
    /// The digest must have been calculated with
    /// [`effective_hash`][Self::effective_hash]. This requires a private key.
    pub fn sign_hash(&self, digest: &[u8]) -> Result<Vec<u8>, Error> {
        if self.null_signed {
            return Ok(digest.to_vec())
        }
        let pkey = match self.key.asymmetric_key()? {
            NativeKey::Private(pkey) => pkey,
            NativeKey::Public(_) => {
                return Err(Error::State("signing requires a private key"))
            }
        };
        let mut ctx = PkeyCtx::new(pkey)?;
        ctx.sign_init()?;
        self.prepare(&mut ctx)?;
        let mut res = Vec::new();
        ctx.sign_to_vec(digest, &mut res)?;
        Ok(res)
    }

    /// Hashes and signs a message.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        self.sign_hash(&self.digest(data)?)
    }

    /// Verifies the signature of a digest.
    ///
    /// Returns `Ok(false)` if the signature doesn’t match. If the engine is
    /// null signed, the signature has to be identical to the digest.
    pub fn verify_hash(
        &self, digest: &[u8], signature: &[u8]
    ) -> Result<bool, Error> {
        if self.null_signed {
            return Ok(digest == signature)
        }
        match *self.key.asymmetric_key()? {
            NativeKey::Private(ref pkey) => {
                self.verify_with(pkey, digest, signature)
            }
            NativeKey::Public(ref pkey) => {
                self.verify_with(pkey, digest, signature)
            }
        }
    }

    /// Hashes a message and verifies its signature.
    pub fn verify_data(
        &self, data: &[u8], signature: &[u8]
    ) -> Result<bool, Error> {
        self.verify_hash(&self.digest(data)?, signature)
    }

    fn digest(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let hash = self.effective_hash();
        if hash != self.hash {
            debug!(
                "{} requested for DSA signature, using {} instead",
                self.hash, hash
            );
        }
        hash.digest(data)
    }

    fn verify_with<T: HasPublic>(
        &self, pkey: &PKey<T>, digest: &[u8], signature: &[u8]
    ) -> Result<bool, Error> {
        let mut ctx = PkeyCtx::new(pkey)?;
        ctx.verify_init()?;
        self.prepare(&mut ctx)?;
        // OpenSSL reports signatures it can’t parse or unpad as errors.
        match ctx.verify(digest, signature) {
            Ok(res) => Ok(res),
            Err(err) => {
                debug!("signature rejected by OpenSSL: {}", err);
                Ok(false)
            }
        }
    }

    fn prepare<T>(&self, ctx: &mut PkeyCtx<T>) -> Result<(), Error> {
        let md = self.effective_hash().md();
        ctx.set_signature_md(md)?;
        if self.key.algorithm() == KeyAlgorithm::Rsa {
            match self.padding {
                PaddingScheme::Pkcs1v15 => {
                    ctx.set_rsa_padding(Padding::PKCS1)?;
                }
                PaddingScheme::Pss => {
                    let salt_len = i32::try_from(self.salt_len()).map_err(|_| {
                        Error::State("RSASSA-PSS salt length too large")
                    })?;
                    ctx.set_rsa_padding(Padding::PKCS1_PSS)?;
                    ctx.set_rsa_pss_saltlen(RsaPssSaltlen::custom(salt_len))?;
                    ctx.set_rsa_mgf1_md(md)?;
                }
            }
        }
        Ok(())
    }
}


/// # Algorithm Identifiers
///
/// ```txt
/// RSASSA-PSS-params ::= SEQUENCE {
///     hashAlgorithm      [0] HashAlgorithm      DEFAULT sha1,
///     maskGenAlgorithm   [1] MaskGenAlgorithm   DEFAULT mgf1SHA1,
///     saltLength         [2] INTEGER            DEFAULT 20,
///     trailerField       [3] TrailerField       DEFAULT trailerFieldBC
/// }
/// ```
impl<'a> SignatureEngine<'a> {
    /// Creates an engine from a signature algorithm identifier.
    ///
    /// A plain hash algorithm results in a null signed engine. Fails if the
    /// algorithm is unknown or doesn’t fit the key.
    pub fn from_algorithm_identifier(
        key: &'a AsymmetricKeyPair, alg: &AlgorithmIdentifier
    ) -> Result<Self, Error> {
        let id = alg.algorithm();
        let res = Self::new(key);
        if let Some(hash) = HashAlgorithm::from_oid(id) {
            return Ok(res.with_hash(hash).with_null_signed(true))
        }
        let (family, res) = if *id == oid::RSASSA_PSS {
            let params = PssParams::from_algorithm(alg)?;
            (
                KeyAlgorithm::Rsa,
                res.with_hash(params.hash)
                    .with_padding(PaddingScheme::Pss)
                    .with_salt_len(params.salt_len)
            )
        }
        else if *id == oid::ECDSA_WITH_SPECIFIED {
            let hash = match alg.parameters() {
                Some(params) => {
                    decode_der(params.as_slice(), HashAlgorithm::take_from)?
                }
                None => {
                    return Err(Error::malformed(
                        "missing hash algorithm for specified ECDSA"
                    ))
                }
            };
            (KeyAlgorithm::Ecdsa, res.with_hash(hash))
        }
        else {
            match SIGNATURE_ALGORITHMS.iter().find(|item| *id == *item.0) {
                Some(&(_, family, hash)) => (family, res.with_hash(hash)),
                None => return Err(Error::unsupported(id))
            }
        };
        if key.algorithm() != family {
            return Err(Error::mismatch(family.name(), key.algorithm()))
        }
        Ok(res)
    }

    /// Returns the signature algorithm identifier for the engine.
    ///
    /// If `alternate_ecdsa` is `true`, ECDSA signatures use the
    /// ecdsa-with-Specified algorithm with the hash algorithm as the
    /// parameter.
    pub fn algorithm_identifier(
        &self, alternate_ecdsa: bool
    ) -> Result<AlgorithmIdentifier, Error> {
        if self.null_signed {
            return Ok(self.hash.algorithm_identifier())
        }
        let family = self.key.algorithm();
        if family == KeyAlgorithm::Rsa && self.padding == PaddingScheme::Pss {
            return Ok(AlgorithmIdentifier::new(
                to_oid(&oid::RSASSA_PSS),
                Some(PssParams {
                    hash: self.hash, salt_len: self.salt_len()
                }.to_captured())
            ))
        }
        if family == KeyAlgorithm::Ecdsa && alternate_ecdsa {
            return Ok(AlgorithmIdentifier::new(
                to_oid(&oid::ECDSA_WITH_SPECIFIED),
                Some(Captured::from_values(Mode::Der, self.hash.encode()))
            ))
        }
        let hash = self.effective_hash();
        let item = SIGNATURE_ALGORITHMS.iter().find(|item| {
            item.1 == family && item.2 == hash
        });
        match item {
            Some(&(id, KeyAlgorithm::Rsa, _)) => {
                Ok(AlgorithmIdentifier::with_null(id))
            }
            Some(&(id, _, _)) => Ok(AlgorithmIdentifier::from_oid(id)),
            None => {
                Err(Error::unsupported(format!("{} with {}", family, hash)))
            }
        }
    }
}

/// The signature algorithms identifying both key family and hash.
///
/// The first entry for a family and hash is the one used for encoding.
static SIGNATURE_ALGORITHMS: &[(
    &bcder::ConstOid, KeyAlgorithm, HashAlgorithm
)] = &[
    (&oid::MD5_WITH_RSA_ENCRYPTION, KeyAlgorithm::Rsa, HashAlgorithm::Md5),
    (&oid::SHA1_WITH_RSA_ENCRYPTION, KeyAlgorithm::Rsa, HashAlgorithm::Sha1),
    (
        &oid::SHA256_WITH_RSA_ENCRYPTION, KeyAlgorithm::Rsa,
        HashAlgorithm::Sha256
    ),
    (
        &oid::SHA384_WITH_RSA_ENCRYPTION, KeyAlgorithm::Rsa,
        HashAlgorithm::Sha384
    ),
    (
        &oid::SHA512_WITH_RSA_ENCRYPTION, KeyAlgorithm::Rsa,
        HashAlgorithm::Sha512
    ),
    (&oid::DSA_WITH_SHA1, KeyAlgorithm::Dsa, HashAlgorithm::Sha1),
    (&oid::DSA_WITH_SHA256, KeyAlgorithm::Dsa, HashAlgorithm::Sha256),
    (&oid::ECDSA_WITH_SHA1, KeyAlgorithm::Ecdsa, HashAlgorithm::Sha1),
    (&oid::ECDSA_WITH_SHA256, KeyAlgorithm::Ecdsa, HashAlgorithm::Sha256),
    (&oid::ECDSA_WITH_SHA384, KeyAlgorithm::Ecdsa, HashAlgorithm::Sha384),
    (&oid::ECDSA_WITH_SHA512, KeyAlgorithm::Ecdsa, HashAlgorithm::Sha512),
];


//------------ PssParams -----------------------------------------------------

/// The parameters of an RSASSA-PSS signature algorithm identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PssParams {
    hash: HashAlgorithm,
    salt_len: usize,
}

impl PssParams {
    const DEFAULT_SALT_LEN: usize = 20;

    fn from_algorithm(alg: &AlgorithmIdentifier) -> Result<Self, Error> {
        match alg.parameters() {
            Some(params) if !alg.has_empty_parameters() => {
                decode_der(params.as_slice(), Self::take_from)
            }
            _ => {
                Ok(PssParams {
                    hash: HashAlgorithm::Sha1,
                    salt_len: Self::DEFAULT_SALT_LEN,
                })
            }
        }
    }

    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let hash = cons.take_opt_constructed_if(
                Tag::CTX_0, HashAlgorithm::take_from
            )?.unwrap_or(HashAlgorithm::Sha1);
            let mgf_hash = cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
                cons.take_sequence(|cons| {
                    oid::MGF1.skip_if(cons)?;
                    HashAlgorithm::take_from(cons)
                })
            })?.unwrap_or(HashAlgorithm::Sha1);
            if mgf_hash != hash {
                return Err(cons.content_err(
                    "RSASSA-PSS with different MGF1 hash not supported"
                ))
            }
            let salt_len = cons.take_opt_constructed_if(Tag::CTX_2, |cons| {
                let len = cons.take_u64()?;
                i32::try_from(len).ok().and_then(|len| {
                    usize::try_from(len).ok()
                }).ok_or_else(|| {
                    cons.content_err("RSASSA-PSS salt length too large")
                })
            })?.unwrap_or(Self::DEFAULT_SALT_LEN);
            cons.take_opt_constructed_if(Tag::CTX_3, |cons| {
                cons.skip_u8_if(1)
            })?;
            Ok(PssParams { hash, salt_len })
        })
    }

    /// Encodes the parameters.
    ///
    /// The hash, mask generation, and salt length are always included,
    /// the trailer field is always left at its default.
    fn encode(self) -> impl encode::Values {
        encode::sequence((
            encode::sequence_as(Tag::CTX_0, self.hash.encode()),
            encode::sequence_as(Tag::CTX_1,
                encode::sequence((
                    oid::MGF1.encode(),
                    self.hash.encode(),
                ))
            ),
            encode::sequence_as(Tag::CTX_2, (self.salt_len as u64).encode()),
        ))
    }

    fn to_captured(self) -> Captured {
        Captured::from_values(Mode::Der, self.encode())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::crypto::keys::EcCurve;
    use super::*;

    fn rsa_key() -> AsymmetricKeyPair {
        AsymmetricKeyPair::generate_rsa(2048).unwrap()
    }

    #[test]
    fn rsa_pkcs1_sign_verify() {
        let key = rsa_key();
        for hash in [
            HashAlgorithm::Sha1, HashAlgorithm::Sha256,
            HashAlgorithm::Sha384, HashAlgorithm::Sha512,
        ] {
            let engine = SignatureEngine::new(&key).with_hash(hash);
            let sig = engine.sign_data(b"some data").unwrap();
            assert!(engine.verify_data(b"some data", &sig).unwrap());
            assert!(!engine.verify_data(b"other data", &sig).unwrap());
        }
    }

    #[test]
    fn rsa_pss_round_trip() {
        let key = rsa_key();
        for hash in [
            HashAlgorithm::Md5, HashAlgorithm::Sha1, HashAlgorithm::Sha256,
            HashAlgorithm::Sha384, HashAlgorithm::Sha512,
        ] {
            let engine = SignatureEngine::new(&key)
                .with_hash(hash)
                .with_padding(PaddingScheme::Pss);
            assert_eq!(engine.salt_len(), hash.digest_len());
            let alg = engine.algorithm_identifier(false).unwrap();
            assert_eq!(*alg.algorithm(), oid::RSASSA_PSS);

            let decoded = SignatureEngine::from_algorithm_identifier(
                &key, &alg
            ).unwrap();
            assert_eq!(decoded.hash(), hash);
            assert_eq!(decoded.padding(), PaddingScheme::Pss);
            assert_eq!(decoded.salt_len(), hash.digest_len());

            let sig = engine.sign_data(b"data").unwrap();
            assert!(decoded.verify_data(b"data", &sig).unwrap());
        }
    }

    #[test]
    fn pss_defaults() {
        let key = rsa_key();
        // SEQUENCE { OID rsassa-pss, SEQUENCE { } }
        let alg = AlgorithmIdentifier::decode(
            b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0a\x30\x00"
        ).unwrap();
        let engine = SignatureEngine::from_algorithm_identifier(
            &key, &alg
        ).unwrap();
        assert_eq!(engine.hash(), HashAlgorithm::Sha1);
        assert_eq!(engine.salt_len(), 20);
        assert_eq!(engine.padding(), PaddingScheme::Pss);
    }

    #[test]
    fn pss_encoding() {
        let key = rsa_key();
        let alg = SignatureEngine::new(&key)
            .with_hash(HashAlgorithm::Sha256)
            .with_padding(PaddingScheme::Pss)
            .algorithm_identifier(false).unwrap();
        assert_eq!(
            alg.parameters().unwrap().as_slice(),
            b"\x30\x34\
              \xa0\x0f\x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01\
              \x05\x00\
              \xa1\x1c\x30\x1a\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x08\
              \x30\x0d\x06\x09\x60\x86\x48\x01\x65\x03\x04\x02\x01\x05\x00\
              \xa2\x03\x02\x01\x20".as_ref()
        );
    }

    #[test]
    fn dsa_always_sha1() {
        let key = AsymmetricKeyPair::generate_dsa(1024).unwrap();
        let engine = SignatureEngine::new(&key)
            .with_hash(HashAlgorithm::Sha256);
        assert_eq!(engine.effective_hash(), HashAlgorithm::Sha1);
        let alg = engine.algorithm_identifier(false).unwrap();
        assert_eq!(*alg.algorithm(), oid::DSA_WITH_SHA1);
        assert!(alg.parameters().is_none());

        let sig = engine.sign_data(b"data").unwrap();
        let verifier = SignatureEngine::from_algorithm_identifier(
            &key, &alg
        ).unwrap();
        assert!(verifier.verify_data(b"data", &sig).unwrap());

        // dsa-with-sha256 is accepted but collapses to SHA-1 as well.
        let verifier = SignatureEngine::from_algorithm_identifier(
            &key, &AlgorithmIdentifier::from_oid(&oid::DSA_WITH_SHA256)
        ).unwrap();
        assert_eq!(verifier.hash(), HashAlgorithm::Sha256);
        assert_eq!(verifier.effective_hash(), HashAlgorithm::Sha1);
        assert!(verifier.verify_data(b"data", &sig).unwrap());
        assert_eq!(
            *verifier.algorithm_identifier(false).unwrap().algorithm(),
            oid::DSA_WITH_SHA1
        );
    }

    #[test]
    fn ecdsa_identifiers() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
        let engine = SignatureEngine::new(&key);
        let alg = engine.algorithm_identifier(false).unwrap();
        assert_eq!(*alg.algorithm(), oid::ECDSA_WITH_SHA256);
        assert!(alg.parameters().is_none());

        let alt = engine.algorithm_identifier(true).unwrap();
        assert_eq!(*alt.algorithm(), oid::ECDSA_WITH_SPECIFIED);
        let decoded = SignatureEngine::from_algorithm_identifier(
            &key, &alt
        ).unwrap();
        assert_eq!(decoded.hash(), HashAlgorithm::Sha256);

        let sig = engine.sign_data(b"data").unwrap();
        assert!(decoded.verify_data(b"data", &sig).unwrap());

        assert!(matches!(
            engine.with_hash(HashAlgorithm::Md5).algorithm_identifier(false),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn null_signed() {
        let key = rsa_key();
        let alg = HashAlgorithm::Sha256.algorithm_identifier();
        let engine = SignatureEngine::from_algorithm_identifier(
            &key, &alg
        ).unwrap();
        assert!(engine.is_null_signed());
        let digest = HashAlgorithm::Sha256.digest(b"data").unwrap();
        assert!(engine.verify_data(b"data", &digest).unwrap());
        assert!(!engine.verify_data(b"date", &digest).unwrap());
        assert_eq!(engine.sign_data(b"data").unwrap(), digest);
        assert_eq!(engine.algorithm_identifier(false).unwrap(), alg);
    }

    #[test]
    fn mismatch_and_unknown() {
        let key = rsa_key();
        let ecdsa = AlgorithmIdentifier::from_oid(&oid::ECDSA_WITH_SHA256);
        assert!(matches!(
            SignatureEngine::from_algorithm_identifier(&key, &ecdsa),
            Err(Error::AlgorithmMismatch { .. })
        ));
        let dsa256 = AlgorithmIdentifier::from_oid(&oid::DSA_WITH_SHA256);
        assert!(matches!(
            SignatureEngine::from_algorithm_identifier(&key, &dsa256),
            Err(Error::AlgorithmMismatch { .. })
        ));
        let unknown = AlgorithmIdentifier::from_oid(&oid::MGF1);
        assert!(matches!(
            SignatureEngine::from_algorithm_identifier(&key, &unknown),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn pss_salt_length_limits() {
        let key = rsa_key();
        // saltLength [2] INTEGER 0x80000000
        let alg = AlgorithmIdentifier::decode(
            b"\x30\x16\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0a\
              \x30\x09\xa2\x07\x02\x05\x00\x80\x00\x00\x00"
        ).unwrap();
        assert!(matches!(
            SignatureEngine::from_algorithm_identifier(&key, &alg),
            Err(Error::Malformed(_))
        ));

        // saltLength [2] INTEGER 0x7fffffff
        let alg = AlgorithmIdentifier::decode(
            b"\x30\x15\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0a\
              \x30\x08\xa2\x06\x02\x04\x7f\xff\xff\xff"
        ).unwrap();
        let engine = SignatureEngine::from_algorithm_identifier(
            &key, &alg
        ).unwrap();
        assert_eq!(engine.salt_len(), 0x7fff_ffff);

        let engine = SignatureEngine::new(&key)
            .with_padding(PaddingScheme::Pss)
            .with_salt_len(usize::MAX);
        assert!(matches!(
            engine.sign_data(b"data"), Err(Error::State(_))
        ));
    }

    #[test]
    fn public_key_cannot_sign() {
        let key = rsa_key().to_public().unwrap();
        assert!(matches!(
            SignatureEngine::new(&key).sign_data(b"data"),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn corrupted_signature() {
        let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P384).unwrap();
        let engine = SignatureEngine::new(&key)
            .with_hash(HashAlgorithm::Sha384);
        let mut sig = engine.sign_data(b"data").unwrap();
        let last = sig.len() - 1;
        sig[last] ^= 0x01;
        assert!(!engine.verify_data(b"data", &sig).unwrap());
        assert!(!engine.verify_data(b"data", b"garbage").unwrap());
    }
}
