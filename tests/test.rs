mod util;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use der::Decode;
use rsa::BigUint;
use rsa::RsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::pkcs1::DecodeRsaPrivateKey;
use tales_of_ssl::cert::SignatureAlgorithm;
use tales_of_ssl::cert::params::{CountryPolicy, IssuancePolicy, SubjectRequirements};
use tales_of_ssl::error::{CertError, CertErrorKind, ExchangeError};
use tales_of_ssl::exchange::{JsonSubmitter, JsonSupplier, Problem, Solution, solve};
use tales_of_ssl::{Certificate, build_certificate, issue_certificate};
use time::{Duration, OffsetDateTime};

pub type Result<T> = std::result::Result<T, CertError>;

fn build_kind(key: &str, requirements: &SubjectRequirements) -> CertErrorKind {
    build_certificate(key, requirements, &IssuancePolicy::default())
        .unwrap_err()
        .kind()
}

/// The example scenario: serial `0x1a2b` becomes 6699 and the CN is kept as is.
#[test]
fn builds_example_certificate() -> Result<()> {
    let requirements = util::requirements("example.com", "0x1a2b");
    let encoded = build_certificate(util::RSA_2048_PKCS1, &requirements, &IssuancePolicy::default())?;

    let der = STANDARD.decode(&encoded).unwrap();
    let cert = Certificate::from_der(&der)?;
    assert_eq!(cert.serial_number(), BigUint::from(6699u32));

    let subject = cert.subject()?;
    assert_eq!(subject.common_name, "example.com");
    assert_eq!(subject.country.as_deref(), Some("CI"));
    assert_eq!(cert.issuer()?, subject);
    Ok(())
}

#[test]
fn output_is_plain_der_x509() {
    let requirements = util::requirements("example.com", "0xff");
    let encoded =
        build_certificate(util::RSA_1024_PKCS1, &requirements, &IssuancePolicy::default()).unwrap();
    let der = STANDARD.decode(&encoded).unwrap();

    let parsed = x509_cert::Certificate::from_der(&der).expect("DER X.509 certificate");
    assert_eq!(parsed.tbs_certificate.version, x509_cert::Version::V3);
    assert!(parsed.tbs_certificate.extensions.is_none());
    let rdns = &parsed.tbs_certificate.subject.0;
    assert_eq!(rdns.len(), 2, "country and common name only");
    assert_eq!(parsed.tbs_certificate.issuer, parsed.tbs_certificate.subject);
}

#[test]
fn certificate_verifies_against_its_own_key() -> Result<()> {
    for (key, hash) in [
        (util::RSA_2048_PKCS1, SignatureAlgorithm::Sha256WithRsa),
        (util::RSA_2048_PKCS1, SignatureAlgorithm::Sha384WithRsa),
        (util::RSA_1024_PKCS1, SignatureAlgorithm::Sha512WithRsa),
    ] {
        let policy = IssuancePolicy::builder().signature_algorithm(hash).build();
        let cert = issue_certificate(key, &util::requirements("verify.example", "0x01"), &policy)?;
        assert_eq!(cert.signature_algorithm()?, hash);
        cert.verify_self_signed()?;
    }
    Ok(())
}

#[test]
fn tampered_certificate_fails_verification() -> Result<()> {
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("tamper.example", "0x02"),
        &IssuancePolicy::default(),
    )?;
    let mut tampered = cert.clone();
    tampered.inner.tbs_certificate.serial_number =
        x509_cert::serial_number::SerialNumber::new(&[0x03]).unwrap();

    let err = tampered.verify_self_signed().unwrap_err();
    assert_eq!(err.kind(), CertErrorKind::Verification);
    Ok(())
}

#[test]
fn embedded_key_is_the_supplied_key() -> Result<()> {
    let der = STANDARD.decode(util::RSA_2048_PKCS1.trim()).unwrap();
    let private = RsaPrivateKey::from_pkcs1_der(&der).unwrap();

    let cert = issue_certificate(
        util::RSA_2048_PKCS1,
        &util::requirements("keys.example", "0xabcdef"),
        &IssuancePolicy::default(),
    )?;
    let public = cert.public_key()?;
    assert_eq!(public.n(), private.n());
    assert_eq!(public.e(), private.e());
    Ok(())
}

#[test]
fn large_serials_keep_full_precision() -> Result<()> {
    // 159 bits, the widest a positive 20 octet INTEGER holds
    let hex = format!("7{}", "f".repeat(39));
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("big.example", &format!("0x{hex}")),
        &IssuancePolicy::default(),
    )?;
    assert_eq!(cert.serial_number().to_str_radix(16), hex);
    Ok(())
}

#[test]
fn repeated_builds_agree_on_identity() -> Result<()> {
    let requirements = util::requirements("twice.example", "0x1a2b3c");
    let policy = util::pinned_policy();
    let first = issue_certificate(util::RSA_1024_PKCS1, &requirements, &policy)?;
    let second = issue_certificate(util::RSA_1024_PKCS1, &requirements, &policy)?;

    assert_eq!(first.serial_number(), second.serial_number());
    assert_eq!(first.subject()?, second.subject()?);
    assert_eq!(first.issuer()?, second.issuer()?);
    first.verify_self_signed()?;
    second.verify_self_signed()?;
    Ok(())
}

#[test]
fn validity_window_is_explicit() -> Result<()> {
    let policy = util::pinned_policy();
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("validity.example", "0x10"),
        &policy,
    )?;
    let validity = cert.validity()?;
    assert_eq!(validity.not_before, policy.not_before.unwrap());
    assert_eq!(validity.not_after - validity.not_before, Duration::days(365));
    Ok(())
}

#[test]
fn default_validity_starts_now() -> Result<()> {
    let before = OffsetDateTime::now_utc() - Duration::seconds(1);
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("now.example", "0x11"),
        &IssuancePolicy::default(),
    )?;
    let after = OffsetDateTime::now_utc() + Duration::seconds(1);

    let validity = cert.validity()?;
    assert!(validity.not_before >= before && validity.not_before <= after);
    assert_eq!(validity.not_after - validity.not_before, Duration::days(365));
    Ok(())
}

#[test]
fn validity_past_2049_uses_generalized_time() -> Result<()> {
    let policy = IssuancePolicy::builder()
        .not_before(OffsetDateTime::from_unix_timestamp(2_500_000_000).unwrap())
        .validity_days(400)
        .build();
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("future.example", "0x12"),
        &policy,
    )?;
    assert!(matches!(
        cert.inner.tbs_certificate.validity.not_after,
        x509_cert::time::Time::GeneralTime(_)
    ));
    cert.verify_self_signed()?;
    Ok(())
}

#[test]
fn country_policy_controls_subject_country() -> Result<()> {
    let requirements = SubjectRequirements::builder()
        .domain("country.example")
        .serial_number("0x13")
        .country("tk")
        .build();

    let fixed = issue_certificate(util::RSA_1024_PKCS1, &requirements, &IssuancePolicy::default())?;
    assert_eq!(fixed.subject()?.country.as_deref(), Some("CI"));

    let policy = IssuancePolicy::builder()
        .country(CountryPolicy::FromRequirements {
            fallback: "CI".into(),
        })
        .build();
    let requested = issue_certificate(util::RSA_1024_PKCS1, &requirements, &policy)?;
    assert_eq!(requested.subject()?.country.as_deref(), Some("TK"));
    Ok(())
}

#[test]
fn domain_is_not_validated() -> Result<()> {
    for domain in ["not a hostname", "a,b=c", "ünïcode.example", "*.wild.example"] {
        let cert = issue_certificate(
            util::RSA_1024_PKCS1,
            &util::requirements(domain, "0x14"),
            &IssuancePolicy::default(),
        )?;
        assert_eq!(cert.subject()?.common_name, domain);
        cert.verify_self_signed()?;
    }
    Ok(())
}

#[test]
fn bad_serial_numbers_fail_with_serial_parse() {
    for serial in ["1a2b", "0x", "0xzz", "", "0x12 34"] {
        assert_eq!(
            build_kind(util::RSA_1024_PKCS1, &util::requirements("s.example", serial)),
            CertErrorKind::SerialParse,
            "serial {serial:?}"
        );
    }
}

#[test]
fn serial_is_checked_before_the_key() {
    assert_eq!(
        build_kind("!!!", &util::requirements("s.example", "nope")),
        CertErrorKind::SerialParse
    );
}

#[test]
fn invalid_base64_fails_with_key_decode() {
    let requirements = util::requirements("k.example", "0x01");
    for key in ["!!!!", "MIIC*wIBAAKBgQ", "abc"] {
        assert_eq!(build_kind(key, &requirements), CertErrorKind::KeyDecode, "key {key:?}");
    }
}

#[test]
fn line_wrapped_key_is_accepted() -> Result<()> {
    let flat = util::RSA_1024_PKCS1.trim();
    for separator in ["\n", "\r\n"] {
        let wrapped = flat
            .as_bytes()
            .chunks(64)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join(separator);
        assert!(wrapped.lines().count() > 1);

        let encoded = build_certificate(
            &format!("{wrapped}{separator}"),
            &util::requirements("wrapped.example", "0x15"),
            &IssuancePolicy::default(),
        )?;
        Certificate::from_base64(&encoded)?.verify_self_signed()?;
    }
    Ok(())
}

#[test]
fn configured_country_must_be_a_two_letter_code() {
    let requirements = util::requirements("cc.example", "0x16");
    for country in [
        CountryPolicy::Fixed("Tokelau Islands".into()),
        CountryPolicy::Fixed(String::new()),
        CountryPolicy::FromRequirements {
            fallback: String::new(),
        },
        CountryPolicy::FromRequirements {
            fallback: "Tokelau Islands".into(),
        },
    ] {
        let policy = IssuancePolicy::builder().country(country.clone()).build();
        let err = build_certificate(util::RSA_1024_PKCS1, &requirements, &policy).unwrap_err();
        assert_eq!(err.kind(), CertErrorKind::InvalidPolicy, "{country:?}");
    }
}

#[test]
fn non_pkcs1_keys_fail_with_key_parse() {
    let requirements = util::requirements("k.example", "0x01");
    let garbage = STANDARD.encode(b"definitely not a key");
    for key in [garbage.as_str(), util::RSA_2048_PKCS8, util::EC_P256_SEC1] {
        assert_eq!(build_kind(key, &requirements), CertErrorKind::KeyParse);
    }
}

#[test]
fn truncated_key_fails_with_key_parse() {
    let der = STANDARD.decode(util::RSA_1024_PKCS1.trim()).unwrap();
    let truncated = STANDARD.encode(&der[..der.len() / 2]);
    assert_eq!(
        build_kind(&truncated, &util::requirements("k.example", "0x01")),
        CertErrorKind::KeyParse
    );
}

#[test]
fn small_key_fails_with_signing_error() {
    // A 512-bit modulus cannot hold a DigestInfo for SHA-512.
    let policy = IssuancePolicy::builder()
        .signature_algorithm(SignatureAlgorithm::Sha512WithRsa)
        .build();
    let err = build_certificate(
        util::RSA_512_PKCS1,
        &util::requirements("small.example", "0x01"),
        &policy,
    )
    .unwrap_err();
    assert_eq!(err.kind(), CertErrorKind::Signing);

    // SHA-256 still fits.
    let cert = issue_certificate(
        util::RSA_512_PKCS1,
        &util::requirements("small.example", "0x01"),
        &IssuancePolicy::default(),
    )
    .unwrap();
    cert.verify_self_signed().unwrap();
}

#[test]
fn invalid_policy_is_reported() {
    let policy = IssuancePolicy::builder().validity_days(-1).build();
    let err = build_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("policy.example", "0x01"),
        &policy,
    )
    .unwrap_err();
    assert_eq!(err.kind(), CertErrorKind::InvalidPolicy);
}

#[test]
fn pem_output_wraps_the_same_der() -> Result<()> {
    let cert = issue_certificate(
        util::RSA_1024_PKCS1,
        &util::requirements("pem.example", "0x01"),
        &IssuancePolicy::default(),
    )?;
    let pem = cert.to_pem()?;
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
    assert!(pem.trim_end().ends_with("-----END CERTIFICATE-----"));

    let reparsed = Certificate::from_base64(&cert.to_base64()?)?;
    assert_eq!(reparsed.to_der()?, cert.to_der()?);
    Ok(())
}

#[test]
fn solve_reads_problem_and_writes_solution() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut supplier = JsonSupplier::new(util::PROBLEM_JSON.as_bytes());
    let mut submitter = JsonSubmitter::new(Vec::new());
    let response = solve(&mut supplier, &mut submitter, &IssuancePolicy::default()).unwrap();
    assert_eq!(response, None);

    let written = submitter.into_inner();
    let solution: Solution = serde_json::from_slice(&written).unwrap();
    let cert = Certificate::from_base64(&solution.certificate).unwrap();
    cert.verify_self_signed().unwrap();

    let problem: Problem = serde_json::from_str(util::PROBLEM_JSON).unwrap();
    assert_eq!(cert.subject().unwrap().common_name, problem.required_data.domain);
    assert_eq!(cert.serial_number(), BigUint::from(0x1a2b_3c4d_5e6fu64));
}

#[test]
fn solve_submits_nothing_on_failure() {
    let problem = Problem {
        private_key: util::RSA_1024_PKCS1.to_string(),
        required_data: util::requirements("fail.example", "1234"),
    };
    let body = serde_json::to_vec(&problem).unwrap();
    let mut supplier = JsonSupplier::new(body.as_slice());
    let mut submitter = JsonSubmitter::new(Vec::new());

    let err = solve(&mut supplier, &mut submitter, &IssuancePolicy::default()).unwrap_err();
    match err {
        ExchangeError::Certificate(inner) => assert_eq!(inner.kind(), CertErrorKind::SerialParse),
        other => panic!("unexpected error: {other}"),
    }
    assert!(submitter.into_inner().is_empty());
}
