//! Conversions between the encodings of key material.

use pkix_codec::crypto::{
    AsymmetricKeyPair, EcCurve, HashAlgorithm, KeyAlgorithm, SignatureEngine,
};
use pkix_codec::util::pem::{self, Pem};
use pkix_codec::Error;

fn keys() -> Vec<AsymmetricKeyPair> {
    vec![
        AsymmetricKeyPair::generate_rsa(2048).unwrap(),
        AsymmetricKeyPair::generate_dsa(1024).unwrap(),
        AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap(),
        AsymmetricKeyPair::generate_ecdsa(EcCurve::P384).unwrap(),
        AsymmetricKeyPair::generate_ecdsa(EcCurve::P521).unwrap(),
    ]
}

#[test]
fn private_key_forms() {
    for key in keys() {
        let pkcs1 = key.to_pkcs1().unwrap();
        let pkcs8 = key.to_pkcs8().unwrap();
        let from_pkcs1 = AsymmetricKeyPair::decode_private_key(&pkcs1)
            .unwrap();
        let from_pkcs8 = AsymmetricKeyPair::decode_private_key(&pkcs8)
            .unwrap();
        assert_eq!(from_pkcs1.algorithm(), key.algorithm());
        assert_eq!(from_pkcs8.algorithm(), key.algorithm());

        // Both forms must produce the same public key.
        let public = key.to_public_key_info().unwrap();
        assert_eq!(from_pkcs1.to_public_key_info().unwrap(), public);
        assert_eq!(from_pkcs8.to_public_key_info().unwrap(), public);
        assert_eq!(key.encode().unwrap(), pkcs8);
    }
}

#[test]
fn sign_with_decoded_key_verify_with_public() {
    for key in keys() {
        let decoded = AsymmetricKeyPair::decode_private_key(
            &key.to_pkcs8().unwrap()
        ).unwrap();
        let public = AsymmetricKeyPair::decode_public_key(
            &key.to_public_key_info().unwrap()
        ).unwrap();
        assert!(public.is_public_only());
        assert_eq!(public.encode().unwrap(), key.to_public_key_info().unwrap());

        let engine = SignatureEngine::new(&decoded)
            .with_hash(HashAlgorithm::Sha384);
        let signature = engine.sign_data(b"some data").unwrap();
        let alg = engine.algorithm_identifier(false).unwrap();
        let verifier = SignatureEngine::from_algorithm_identifier(
            &public, &alg
        ).unwrap();
        assert!(verifier.verify_data(b"some data", &signature).unwrap());
        assert!(!verifier.verify_data(b"other data", &signature).unwrap());
    }
}

#[test]
fn expected_algorithm() {
    let rsa = AsymmetricKeyPair::generate_rsa(2048).unwrap();
    let pkcs8 = rsa.to_pkcs8().unwrap();
    assert!(
        AsymmetricKeyPair::decode_private_key_for(&pkcs8, KeyAlgorithm::Rsa)
            .is_ok()
    );
    assert!(matches!(
        AsymmetricKeyPair::decode_private_key_for(&pkcs8, KeyAlgorithm::Dsa),
        Err(Error::AlgorithmMismatch { .. })
    ));
    let spki = rsa.to_public_key_info().unwrap();
    assert!(matches!(
        AsymmetricKeyPair::decode_public_key_for(&spki, KeyAlgorithm::Ecdsa),
        Err(Error::AlgorithmMismatch { .. })
    ));
}

#[test]
fn pem_armoured_key() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let pkcs8 = key.to_pkcs8().unwrap();
    let text = Pem::new("PRIVATE KEY", pkcs8.as_ref()).to_string();
    let der = pem::to_der(text.as_bytes()).unwrap();
    assert_eq!(der.as_slice(), pkcs8.as_ref());
    let decoded = AsymmetricKeyPair::decode_private_key(&der).unwrap();
    assert_eq!(decoded, key);
}

#[test]
fn key_blobs() {
    for key in keys() {
        let blob = key.crypto_api_blob().unwrap();
        let magic = &blob[..4];
        match key.algorithm() {
            KeyAlgorithm::Rsa => assert_eq!(magic, b"RSA1"),
            KeyAlgorithm::Dsa => assert_eq!(magic, b"DSPB"),
            KeyAlgorithm::Ecdsa => assert_eq!(&magic[..3], b"ECS"),
        }
        // The blob only depends on the public key.
        assert_eq!(key.to_public().unwrap().crypto_api_blob().unwrap(), blob);
    }
}

#[test]
fn garbage_is_malformed() {
    for input in [&b""[..], b"\x30\x00", b"\x30\x03\x02\x01\x00", b"\x04\x00"] {
        assert!(
            AsymmetricKeyPair::decode_private_key(input).unwrap_err()
                .is_malformed()
        );
    }
    assert!(
        AsymmetricKeyPair::decode_public_key(b"\x30\x00").unwrap_err()
            .is_malformed()
    );
}

#[test]
fn trailing_data_is_malformed() {
    for key in keys() {
        let mut pkcs8 = key.to_pkcs8().unwrap().to_vec();
        pkcs8.push(0);
        assert!(
            AsymmetricKeyPair::decode_private_key(&pkcs8).unwrap_err()
                .is_malformed()
        );
        let mut spki = key.to_public_key_info().unwrap().to_vec();
        spki.push(0);
        assert!(
            AsymmetricKeyPair::decode_public_key(&spki).unwrap_err()
                .is_malformed()
        );
    }
}

#[cfg(feature = "serde")]
#[test]
fn serde_algorithm() {
    assert_eq!(
        serde_json::to_string(&KeyAlgorithm::Ecdsa).unwrap(), "\"Ecdsa\""
    );
    assert_eq!(
        serde_json::from_str::<HashAlgorithm>("\"Sha256\"").unwrap(),
        HashAlgorithm::Sha256
    );
}
