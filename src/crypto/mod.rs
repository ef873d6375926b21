//! Keys, digests, and signatures.
//!

pub use self::digest::HashAlgorithm;
pub use self::keys::{
    AsymmetricKeyPair, DsaKey, DsaSeed, EcCurve, EcKey, EcParameters,
    KeyAlgorithm, KeyMaterial, NativeKey, RsaKey, RsaPrivateKey,
};
pub use self::signature::{PaddingScheme, SignatureEngine};

pub mod blob;
pub mod digest;
pub mod keys;
pub mod signature;
