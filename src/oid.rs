//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.

use bcder::{ConstOid, Oid};


//------------ Hash Algorithms -----------------------------------------------

/// [RFC 1321](https://tools.ietf.org/html/rfc1321) `md5`
pub const MD5: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 2, 5]);

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `id-sha1`
pub const SHA1: ConstOid = Oid(&[43, 14, 3, 2, 26]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha256`
///
/// Identifies the SHA-256 one-way hash function.
pub const SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha384`
pub const SHA384: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 2]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha512`
pub const SHA512: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 3]);


//------------ Public Key Algorithms -----------------------------------------

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `id-dsa`
pub const DSA: ConstOid = Oid(&[42, 134, 72, 206, 56, 4, 1]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `ecPublicKey`.
///
/// Identifies public keys for elliptic curve cryptography.
pub const EC_PUBLIC_KEY: ConstOid = Oid(&[42, 134, 72, 206, 61, 2, 1]);

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `prime-field`
pub const PRIME_FIELD: ConstOid = Oid(&[42, 134, 72, 206, 61, 1, 1]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `secp256r1`.
///
/// Identifies the P-256 curve for elliptic curve cryptography.
pub const SECP256R1: ConstOid = Oid(&[42, 134, 72, 206, 61, 3, 1, 7]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `secp384r1`.
pub const SECP384R1: ConstOid = Oid(&[43, 129, 4, 0, 34]);

/// [RFC 5480](https://tools.ietf.org/html/rfc5480) `secp521r1`.
pub const SECP521R1: ConstOid = Oid(&[43, 129, 4, 0, 35]);


//------------ Signature Algorithms ------------------------------------------

pub const MD5_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 4]);
pub const SHA1_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 5]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);
pub const SHA384_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 12]);
pub const SHA512_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 13]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-RSASSA-PSS`
pub const RSASSA_PSS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 10]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-mgf1`
pub const MGF1: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 8]);

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `id-dsa-with-sha1`
pub const DSA_WITH_SHA1: ConstOid = Oid(&[42, 134, 72, 206, 56, 4, 3]);

/// [RFC 5758](https://tools.ietf.org/html/rfc5758) `id-dsa-with-sha256`
///
/// Recognized but not supported for signing.
pub const DSA_WITH_SHA256: ConstOid
    = Oid(&[96, 134, 72, 1, 101, 3, 4, 3, 2]);

pub const ECDSA_WITH_SHA1: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 1]);

/// [RFC 5758](https://tools.ietf.org/html/rfc5758) `ecdsa-with-SHA256`
///
/// Identifies the ECDSA signature algorithm with SHA-256.
pub const ECDSA_WITH_SHA256: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 4, 3, 2]);
pub const ECDSA_WITH_SHA384: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 4, 3, 3]);
pub const ECDSA_WITH_SHA512: ConstOid
    = Oid(&[42, 134, 72, 206, 61, 4, 3, 4]);

/// [X9.62] `ecdsa-with-Specified`
///
/// The hash algorithm is given as the parameters of the identifier.
pub const ECDSA_WITH_SPECIFIED: ConstOid = Oid(&[42, 134, 72, 206, 61, 4, 3]);


//------------ Name Attributes -----------------------------------------------

pub const AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]); // 2 5 4 3
pub const AT_SURNAME: ConstOid = Oid(&[85, 4, 4]);
pub const AT_SERIAL_NUMBER: ConstOid = Oid(&[85, 4, 5]); // 2 5 4 5
pub const AT_COUNTRY_NAME: ConstOid = Oid(&[85, 4, 6]);
pub const AT_LOCALITY_NAME: ConstOid = Oid(&[85, 4, 7]);
pub const AT_STATE_OR_PROVINCE_NAME: ConstOid = Oid(&[85, 4, 8]);
pub const AT_STREET_ADDRESS: ConstOid = Oid(&[85, 4, 9]);
pub const AT_ORGANIZATION_NAME: ConstOid = Oid(&[85, 4, 10]);
pub const AT_ORGANIZATIONAL_UNIT_NAME: ConstOid = Oid(&[85, 4, 11]);
pub const AT_TITLE: ConstOid = Oid(&[85, 4, 12]);
pub const AT_GIVEN_NAME: ConstOid = Oid(&[85, 4, 42]);
pub const AT_EMAIL_ADDRESS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 1]);
pub const AT_DOMAIN_COMPONENT: ConstOid
    = Oid(&[9, 146, 38, 137, 147, 242, 44, 100, 1, 25]);


//------------ Certificate and CRL Extensions --------------------------------

pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);
pub const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
pub const CE_SUBJECT_ALT_NAME: ConstOid = Oid(&[85, 29, 17]);
pub const CE_ISSUER_ALT_NAME: ConstOid = Oid(&[85, 29, 18]);
pub const CE_BASIC_CONSTRAINTS: ConstOid = Oid(&[85, 29, 19]);
pub const CE_CRL_NUMBER: ConstOid = Oid(&[85, 29, 20]);
pub const CE_CRL_REASONS: ConstOid = Oid(&[85, 29, 21]);
pub const CE_INVALIDITY_DATE: ConstOid = Oid(&[85, 29, 24]);
pub const CE_DELTA_CRL_INDICATOR: ConstOid = Oid(&[85, 29, 27]);
pub const CE_ISSUING_DISTRIBUTION_POINT: ConstOid = Oid(&[85, 29, 28]);
pub const CE_CERTIFICATE_ISSUER: ConstOid = Oid(&[85, 29, 29]);
pub const CE_NAME_CONSTRAINTS: ConstOid = Oid(&[85, 29, 30]);
pub const CE_CRL_DISTRIBUTION_POINTS: ConstOid = Oid(&[85, 29, 31]);
pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_FRESHEST_CRL: ConstOid = Oid(&[85, 29, 46]);

pub const PE_AUTHORITY_INFO_ACCESS: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 1, 1]);

pub const AD_OCSP: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 1]);
pub const AD_CA_ISSUERS: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 48, 2]);

/// [RFC 6960](https://tools.ietf.org/html/rfc6960) `id-pkix-ocsp-service-locator`
pub const PKIX_OCSP_SERVICE_LOCATOR: ConstOid
    = Oid(&[43, 6, 1, 5, 5, 7, 48, 1, 7]);

/// Microsoft `szOID_CERTSRV_CA_VERSION`, 1.3.6.1.4.1.311.21.1
pub const MS_CA_VERSION: ConstOid
    = Oid(&[43, 6, 1, 4, 1, 130, 55, 21, 1]);

/// Microsoft `szOID_CRL_NEXT_PUBLISH`, 1.3.6.1.4.1.311.21.4
pub const MS_CRL_NEXT_PUBLISH: ConstOid
    = Oid(&[43, 6, 1, 4, 1, 130, 55, 21, 4]);

/// Microsoft `szOID_APPLICATION_POLICY_MAPPINGS`, 1.3.6.1.4.1.311.21.11
pub const MS_APPLICATION_POLICY_MAPPINGS: ConstOid
    = Oid(&[43, 6, 1, 4, 1, 130, 55, 21, 11]);


//------------ Names ---------------------------------------------------------

/// Returns the short attribute type name used in string representations.
pub fn short_name<T: AsRef<[u8]>>(oid: &Oid<T>) -> Option<&'static str> {
    NAME_ATTRIBUTES.iter().find_map(|(id, name)| {
        if oid == id { Some(*name) } else { None }
    })
}

/// Returns a human readable name for algorithms and extensions.
pub fn long_name<T: AsRef<[u8]>>(oid: &Oid<T>) -> Option<&'static str> {
    LONG_NAMES.iter().find_map(|(id, name)| {
        if oid == id { Some(*name) } else { None }
    })
}

const NAME_ATTRIBUTES: &[(ConstOid, &str)] = &[
    (AT_COMMON_NAME, "CN"),
    (AT_SURNAME, "SN"),
    (AT_SERIAL_NUMBER, "SERIALNUMBER"),
    (AT_COUNTRY_NAME, "C"),
    (AT_LOCALITY_NAME, "L"),
    (AT_STATE_OR_PROVINCE_NAME, "S"),
    (AT_STREET_ADDRESS, "STREET"),
    (AT_ORGANIZATION_NAME, "O"),
    (AT_ORGANIZATIONAL_UNIT_NAME, "OU"),
    (AT_TITLE, "T"),
    (AT_GIVEN_NAME, "G"),
    (AT_EMAIL_ADDRESS, "E"),
    (AT_DOMAIN_COMPONENT, "DC"),
];

const LONG_NAMES: &[(ConstOid, &str)] = &[
    (MD5, "md5"),
    (SHA1, "sha1"),
    (SHA256, "sha256"),
    (SHA384, "sha384"),
    (SHA512, "sha512"),
    (RSA_ENCRYPTION, "RSA"),
    (DSA, "DSA"),
    (EC_PUBLIC_KEY, "ECC"),
    (MD5_WITH_RSA_ENCRYPTION, "md5RSA"),
    (SHA1_WITH_RSA_ENCRYPTION, "sha1RSA"),
    (SHA256_WITH_RSA_ENCRYPTION, "sha256RSA"),
    (SHA384_WITH_RSA_ENCRYPTION, "sha384RSA"),
    (SHA512_WITH_RSA_ENCRYPTION, "sha512RSA"),
    (RSASSA_PSS, "RSASSA-PSS"),
    (MGF1, "mgf1"),
    (DSA_WITH_SHA1, "sha1DSA"),
    (DSA_WITH_SHA256, "sha256DSA"),
    (ECDSA_WITH_SHA1, "sha1ECDSA"),
    (ECDSA_WITH_SHA256, "sha256ECDSA"),
    (ECDSA_WITH_SHA384, "sha384ECDSA"),
    (ECDSA_WITH_SHA512, "sha512ECDSA"),
    (ECDSA_WITH_SPECIFIED, "specifiedECDSA"),
    (SECP256R1, "nistP256"),
    (SECP384R1, "nistP384"),
    (SECP521R1, "nistP521"),
    (CE_SUBJECT_KEY_IDENTIFIER, "Subject Key Identifier"),
    (CE_KEY_USAGE, "Key Usage"),
    (CE_SUBJECT_ALT_NAME, "Subject Alternative Name"),
    (CE_ISSUER_ALT_NAME, "Issuer Alternative Name"),
    (CE_BASIC_CONSTRAINTS, "Basic Constraints"),
    (CE_CRL_NUMBER, "CRL Number"),
    (CE_CRL_REASONS, "CRL Reason Code"),
    (CE_INVALIDITY_DATE, "Invalidity Date"),
    (CE_DELTA_CRL_INDICATOR, "Delta CRL Indicator"),
    (CE_ISSUING_DISTRIBUTION_POINT, "Issuing Distribution Point"),
    (CE_CERTIFICATE_ISSUER, "Certificate Issuer"),
    (CE_NAME_CONSTRAINTS, "Name Constraints"),
    (CE_CRL_DISTRIBUTION_POINTS, "CRL Distribution Points"),
    (CE_AUTHORITY_KEY_IDENTIFIER, "Authority Key Identifier"),
    (CE_FRESHEST_CRL, "Freshest CRL"),
    (PE_AUTHORITY_INFO_ACCESS, "Authority Information Access"),
    (AD_OCSP, "On-line Certificate Status Protocol"),
    (AD_CA_ISSUERS, "Certification Authority Issuer"),
    (PKIX_OCSP_SERVICE_LOCATOR, "OCSP Service Locator"),
    (MS_CA_VERSION, "CA Version"),
    (MS_CRL_NEXT_PUBLISH, "Next CRL Publish"),
    (MS_APPLICATION_POLICY_MAPPINGS, "Application Policy Mappings"),
];


//============ Tests =========================================================
