#![no_main]

use libfuzzer_sys::fuzz_target;
use pkix_codec::crl::Crl;
use pkix_codec::crypto::keys::AsymmetricKeyPair;
use pkix_codec::ext::ExtensionRegistry;
use pkix_codec::oid;
use pkix_codec::x509::to_oid;

const EXTENSIONS: &[bcder::ConstOid] = &[
    oid::CE_AUTHORITY_KEY_IDENTIFIER,
    oid::CE_NAME_CONSTRAINTS,
    oid::CE_CRL_DISTRIBUTION_POINTS,
    oid::CE_ISSUING_DISTRIBUTION_POINT,
    oid::MS_APPLICATION_POLICY_MAPPINGS,
    oid::PKIX_OCSP_SERVICE_LOCATOR,
];

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 4 {
        0 => { let _ = Crl::decode(data); },
        1 => { let _ = AsymmetricKeyPair::decode_private_key(data); },
        2 => { let _ = AsymmetricKeyPair::decode_public_key(data); },
        3 => {
            let (which, data) = match data.split_first() {
                Some((first, data)) => (*first as usize, data),
                None => return,
            };
            let oid = to_oid(&EXTENSIONS[which % EXTENSIONS.len()]);
            let _ = ExtensionRegistry::global().decode_value(&oid, data);
        }
        _ => panic!("what?"),
    }
});
