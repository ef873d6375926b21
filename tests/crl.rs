//! Decoding of CRLs created with all kinds of keys and field combinations.

use pkix_codec::crl::{Crl, CrlBuilder, CrlEntry, CrlType};
use pkix_codec::crypto::{
    AsymmetricKeyPair, EcCurve, HashAlgorithm, PaddingScheme, SignatureEngine
};
use pkix_codec::ext::{
    AuthorityKeyIdentifier, CrlNumber, Extension, ExtensionRegistry,
    NextCrlPublish,
};
use pkix_codec::oid;
use pkix_codec::util::int::UnsignedInt;
use pkix_codec::util::pem::Pem;
use pkix_codec::x509::{to_oid, Name, Time};
use pkix_codec::Error;

fn time(year: i32, month: u32, day: u32) -> Time {
    Time::from_ymd_hms(year, month, day, 0, 0, 0).unwrap()
}

fn issuer() -> Name {
    Name::from_common_name("Test CA")
}

#[test]
fn optional_field_matrix() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    for next_update in [false, true] {
        for entries in [false, true] {
            for extensions in [false, true] {
                let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
                if next_update {
                    builder.next_update(Some(time(2023, 2, 1)));
                }
                if entries {
                    builder.revoke(CrlEntry::new(
                        UnsignedInt::from(1u64), time(2022, 12, 1)
                    ));
                    builder.revoke(CrlEntry::new(
                        UnsignedInt::from(2u64), time(2022, 12, 2)
                    ));
                }
                if extensions {
                    builder.crl_number(42u64);
                }
                let der = builder.sign(
                    &SignatureEngine::new(&key)
                ).unwrap().to_bytes();

                let crl = Crl::decode(&der).unwrap();
                assert_eq!(crl.crl_type(), CrlType::Base);
                assert_eq!(
                    crl.next_update(),
                    if next_update { Some(time(2023, 2, 1)) } else { None }
                );
                assert_eq!(
                    crl.crl_number(),
                    &UnsignedInt::from(if extensions { 42u64 } else { 0 })
                );
                assert_eq!(crl.entries().len(), if entries { 2 } else { 0 });
                assert_eq!(crl.extensions().len(), usize::from(extensions));
                assert_eq!(crl.this_update(), time(2023, 1, 1));
                assert!(crl.verify_signature(&key).unwrap());
            }
        }
    }
}

#[test]
fn base_crl_with_one_entry() {
    let key = AsymmetricKeyPair::generate_rsa(2048).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.revoke(CrlEntry::new(UnsignedInt::from(1u64), time(2023, 1, 1)))
        .crl_number(5u64);
    let der = builder.sign(&SignatureEngine::new(&key)).unwrap().to_bytes();

    let crl = Crl::decode(&der).unwrap();
    assert_eq!(crl.version(), 2);
    assert_eq!(crl.crl_number(), &UnsignedInt::from(5u64));
    assert_eq!(crl.crl_number().to_u64(), Some(5));
    assert_eq!(crl.entries().len(), 1);
    assert_eq!(crl.certificate_in_crl("01"), Ok(true));
    assert_eq!(crl.certificate_in_crl("02"), Ok(false));
    assert_eq!(
        *crl.signature_algorithm().algorithm(),
        oid::SHA256_WITH_RSA_ENCRYPTION
    );
    assert!(crl.verify_signature(&key.to_public().unwrap()).unwrap());
}

#[test]
fn delta_crl() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P384).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.crl_number(11u64).extension(
        &pkix_codec::ext::DeltaCrlIndicator::new(UnsignedInt::from(10u64)),
        true
    );
    let crl = builder.sign(
        &SignatureEngine::new(&key).with_hash(HashAlgorithm::Sha384)
    ).unwrap();
    assert_eq!(crl.crl_type(), CrlType::Delta);
    assert!(!crl.has_delta());
    assert_eq!(*crl.signature_algorithm().algorithm(), oid::ECDSA_WITH_SHA384);
}

#[test]
fn next_publish_prefers_extension() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.next_update(Some(time(2023, 3, 1)));
    let crl = builder.clone().sign(&SignatureEngine::new(&key)).unwrap();
    assert_eq!(crl.next_publish(), Some(time(2023, 3, 1)));

    builder.extension(&NextCrlPublish::new(time(2023, 2, 1)), false);
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
    assert_eq!(crl.next_publish(), Some(time(2023, 2, 1)));
    assert_eq!(crl.next_update(), Some(time(2023, 3, 1)));
}

#[test]
fn rsa_pss_signed() {
    let key = AsymmetricKeyPair::generate_rsa(2048).unwrap();
    let engine = SignatureEngine::new(&key)
        .with_hash(HashAlgorithm::Sha256)
        .with_padding(PaddingScheme::Pss);
    let crl = CrlBuilder::new(issuer(), time(2023, 1, 1)).sign(
        &engine
    ).unwrap();
    assert_eq!(*crl.signature_algorithm().algorithm(), oid::RSASSA_PSS);
    assert!(crl.verify_signature(&key).unwrap());
}

#[test]
fn dsa_signed_uses_sha1() {
    let key = AsymmetricKeyPair::generate_dsa(1024).unwrap();
    let engine = SignatureEngine::new(&key).with_hash(HashAlgorithm::Sha256);
    let crl = CrlBuilder::new(issuer(), time(2023, 1, 1)).sign(
        &engine
    ).unwrap();
    assert_eq!(*crl.signature_algorithm().algorithm(), oid::DSA_WITH_SHA1);
    assert!(crl.verify_signature(&key).unwrap());
}

#[test]
fn specified_ecdsa_signed() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.alternate_ecdsa(true);
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
    assert_eq!(
        *crl.signature_algorithm().algorithm(), oid::ECDSA_WITH_SPECIFIED
    );
    assert!(crl.verify_signature(&key).unwrap());
}

#[test]
fn wrong_key_fails_verification() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let other = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let crl = CrlBuilder::new(issuer(), time(2023, 1, 1)).sign(
        &SignatureEngine::new(&key)
    ).unwrap();
    assert!(!crl.verify_signature(&other).unwrap());

    let rsa = AsymmetricKeyPair::generate_rsa(2048).unwrap();
    assert!(matches!(
        crl.verify_signature(&rsa),
        Err(Error::AlgorithmMismatch { .. })
    ));
}

#[test]
fn thumbprint_is_deterministic() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let crl = CrlBuilder::new(issuer(), time(2023, 1, 1)).sign(
        &SignatureEngine::new(&key)
    ).unwrap();
    let first = Crl::decode(crl.as_slice()).unwrap();
    let second = Crl::decode(crl.as_slice()).unwrap();
    assert_eq!(first.thumbprint(), second.thumbprint());
    assert_eq!(first, second);
}

#[test]
fn pem_input() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let crl = CrlBuilder::new(issuer(), time(2023, 1, 1)).sign(
        &SignatureEngine::new(&key)
    ).unwrap();
    let pem = Pem::new("X509 CRL", crl.as_slice()).to_string();
    assert_eq!(Crl::decode_any(pem.as_bytes()).unwrap(), crl);
    assert_eq!(Crl::decode_any(crl.as_slice()).unwrap(), crl);
    assert!(Crl::decode_any(b"-----BEGIN X509 CRL-----\n").is_err());
}

#[test]
fn broken_extension_does_not_abort() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.raw_extension(Extension::opaque(
        to_oid(&oid::CE_AUTHORITY_KEY_IDENTIFIER), false, b"\x04\x00"[..].into()
    )).crl_number(3u64);
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
    let ext = crl.extensions().get(&oid::CE_AUTHORITY_KEY_IDENTIFIER).unwrap();
    assert!(ext.value().is_opaque());
    assert!(crl.authority_key_identifier().is_none());
    assert!(ext.decode_as::<AuthorityKeyIdentifier>().is_err());
    assert_eq!(crl.crl_number(), &UnsignedInt::from(3u64));
}

#[test]
fn empty_registry() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let mut builder = CrlBuilder::new(issuer(), time(2023, 1, 1));
    builder.crl_number(8u64);
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
    let crl = Crl::decode_with(
        crl.as_slice(), &ExtensionRegistry::empty()
    ).unwrap();
    assert!(crl.extensions().get(&oid::CE_CRL_NUMBER).unwrap()
        .value().is_opaque());
    assert!(crl.extensions().find::<CrlNumber>().is_none());
    assert_eq!(crl.crl_number(), &UnsignedInt::default());
}

#[cfg(feature = "serde")]
#[test]
fn serde_crl_type() {
    assert_eq!(serde_json::to_string(&CrlType::Delta).unwrap(), "\"Delta\"");
    assert_eq!(
        serde_json::from_str::<CrlType>("\"Base\"").unwrap(), CrlType::Base
    );
}
