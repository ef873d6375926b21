//! Extensions carried in certificates and CRLs.

use std::{any, fmt};
use std::sync::Arc;
use bcder::Oid;
use pkix_codec::cert::{CertBuilder, Certificate};
use pkix_codec::crl::{Crl, CrlBuilder};
use pkix_codec::crypto::{AsymmetricKeyPair, EcCurve, SignatureEngine};
use pkix_codec::ext::{
    AccessDescription, ApplicationPolicyMappings, AuthorityInfoAccess,
    AuthorityKeyIdentifier, CustomExtension, DistributionPointName,
    ExtensionCodec, ExtensionRegistry, ExtensionValue, GeneralName,
    GeneralNames, GeneralSubtree, IssuingDistributionPoint, NameConstraints,
    PolicyMapping, ReasonFlags, ServiceLocator, SubjectAltName,
};
use pkix_codec::util::int::UnsignedInt;
use pkix_codec::x509::{Name, Time, Validity};
use pkix_codec::Error;

fn time(year: i32) -> Time {
    Time::from_ymd_hms(year, 1, 1, 0, 0, 0).unwrap()
}

fn ca_certificate(key: &AsymmetricKeyPair) -> Certificate {
    let mut builder = CertBuilder::new(
        UnsignedInt::from(0x0102u64),
        Name::from_common_name("Test CA"),
        Validity::new(time(2023), time(2033)),
    );
    builder.issuer(
        Name::from_common_name("Root CA")
    ).extension(
        &SubjectAltName::new(GeneralNames::new(vec![
            GeneralName::Uri("http://ca.example/".into())
        ])),
        false
    ).extension(
        &AuthorityInfoAccess::new(vec![
            AccessDescription::ocsp("http://ocsp.example/"),
            AccessDescription::ca_issuers("http://ca.example/root.cer"),
        ]),
        false
    );
    builder.sign(key, &SignatureEngine::new(key)).unwrap()
}

#[test]
fn crl_with_scope_extensions() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let cert = ca_certificate(&key);
    let aki = AuthorityKeyIdentifier::from_issuer(
        &cert, true, true, true
    ).unwrap();
    let idp = IssuingDistributionPoint {
        name: Some(DistributionPointName::FullName(GeneralNames::new(vec![
            GeneralName::Uri("http://ca.example/ca.crl".into())
        ]))),
        only_user_certs: true,
        only_some_reasons: Some(
            ReasonFlags::KEY_COMPROMISE | ReasonFlags::CA_COMPROMISE
        ),
        .. Default::default()
    };

    let mut builder = CrlBuilder::new(cert.subject().clone(), time(2024));
    builder.extension(&aki, false)
        .extension(&idp, true)
        .crl_number(UnsignedInt::from(1u64));
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();
    let crl = Crl::decode(crl.as_slice()).unwrap();

    assert_eq!(crl.authority_key_identifier(), Some(&aki));
    assert_eq!(
        crl.authority_key_identifier().unwrap().key_id.as_deref(),
        Some(key.key_identifier().unwrap().as_slice())
    );
    assert_eq!(crl.issuing_distribution_point(), Some(&idp));
    assert!(crl.extensions().iter().any(|ext| ext.is_critical()));
    assert!(crl.verify_signature(&cert.public_key().unwrap()).unwrap());
}

#[test]
fn service_locator_from_certificate() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let cert = ca_certificate(&key);
    let locator = ServiceLocator::from_certificate(&cert);
    assert_eq!(locator.issuer, Name::from_common_name("Root CA"));
    assert_eq!(locator.locator.as_ref().unwrap().descriptions().len(), 2);

    let ext = locator.to_extension(false);
    let value = ExtensionRegistry::global().decode_value(
        ext.oid(), ext.raw_value()
    ).unwrap();
    match value {
        ExtensionValue::ServiceLocator(ref decoded) => {
            assert_eq!(decoded, &locator)
        }
        _ => panic!("not a service locator"),
    }
    assert!(ext.to_string().contains("URL=http://ocsp.example/"));
}

#[test]
fn certificate_constraints_and_mappings() {
    let key = AsymmetricKeyPair::generate_rsa(2048).unwrap();
    let constraints = NameConstraints::new(
        vec![GeneralSubtree::new(GeneralName::Dns(".example.com".into()))],
        Vec::new(),
    );
    let mappings = ApplicationPolicyMappings::new(vec![
        PolicyMapping::new(
            "1.3.6.1.5.5.7.3.1".parse().unwrap(),
            "1.3.6.1.5.5.7.3.2".parse().unwrap(),
        )
    ]);
    let mut builder = CertBuilder::new(
        UnsignedInt::from(7u64),
        Name::from_common_name("Constrained CA"),
        Validity::new(time(2023), time(2024)),
    );
    builder.extension(&constraints, true).extension(&mappings, false);
    let cert = builder.sign(&key, &SignatureEngine::new(&key)).unwrap();

    let cert = Certificate::decode(cert.to_captured().as_slice()).unwrap();
    assert_eq!(cert.extensions().find::<NameConstraints>(), Some(&constraints));
    assert_eq!(
        cert.extensions().find::<ApplicationPolicyMappings>(), Some(&mappings)
    );
    assert!(cert.verify_signature(&key).unwrap());
}

#[test]
fn trailing_data_in_extension_value() {
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let cert = ca_certificate(&key);
    let extensions = [
        AuthorityKeyIdentifier::from_issuer(
            &cert, true, false, false
        ).unwrap().to_extension(false),
        ServiceLocator::from_certificate(&cert).to_extension(false),
        NameConstraints::new(
            vec![GeneralSubtree::new(GeneralName::Dns(".example".into()))],
            Vec::new(),
        ).to_extension(true),
        IssuingDistributionPoint {
            only_some_reasons: Some(ReasonFlags::SUPERSEDED),
            .. Default::default()
        }.to_extension(true),
    ];
    let registry = ExtensionRegistry::global();
    for ext in extensions {
        assert!(!registry.decode_value(ext.oid(), ext.raw_value()).unwrap()
            .is_opaque());

        let mut value = ext.raw_value().to_vec();
        value.push(0);
        assert!(
            registry.decode_value(ext.oid(), &value).unwrap_err()
                .is_malformed()
        );
        let resolved = registry.resolve(
            ext.oid().clone(), ext.is_critical(), value.clone().into()
        );
        assert!(resolved.value().is_opaque());
        assert_eq!(resolved.raw_value().as_ref(), value.as_slice());
    }
}

#[derive(Debug)]
struct Motto(String);

impl fmt::Display for Motto {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl CustomExtension for Motto {
    fn as_any(&self) -> &dyn any::Any {
        self
    }
}

fn decode_motto(value: &[u8]) -> Result<ExtensionValue, Error> {
    match std::str::from_utf8(value) {
        Ok(motto) => Ok(ExtensionValue::Custom(Arc::new(Motto(motto.into())))),
        Err(_) => Err(Error::malformed("motto isn’t UTF-8")),
    }
}

#[test]
fn custom_extension_in_crl() {
    let id: Oid = "1.3.6.1.4.1.99999.7".parse().unwrap();
    let key = AsymmetricKeyPair::generate_ecdsa(EcCurve::P256).unwrap();
    let mut builder = CrlBuilder::new(Name::from_common_name("A"), time(2024));
    builder.raw_extension(pkix_codec::ext::Extension::opaque(
        id.clone(), false, b"carpe diem"[..].into()
    ));
    let crl = builder.sign(&SignatureEngine::new(&key)).unwrap();

    // Without registration, the extension stays opaque.
    let ext = crl.extensions().iter().next().unwrap();
    assert!(ext.value().is_opaque());

    let mut registry = ExtensionRegistry::default();
    registry.register(id, decode_motto);
    let crl = Crl::decode_with(crl.as_slice(), &registry).unwrap();
    let ext = crl.extensions().iter().next().unwrap();
    assert_eq!(ext.custom::<Motto>().unwrap().0, "carpe diem");
    assert!(crl.to_dump_string(
        &pkix_codec::crl::DumpOptions::verbose(None)
    ).contains("    1.3.6.1.4.1.99999.7:\n        carpe diem\n"));
}
