#![allow(dead_code)]

use tales_of_ssl::cert::params::{IssuancePolicy, SubjectRequirements};
use time::OffsetDateTime;

pub const RSA_2048_PKCS1: &str = include_str!("data/rsa2048_pkcs1.b64");
pub const RSA_2048_PKCS8: &str = include_str!("data/rsa2048_pkcs8.b64");
pub const RSA_1024_PKCS1: &str = include_str!("data/rsa1024_pkcs1.b64");
pub const RSA_512_PKCS1: &str = include_str!("data/rsa512_pkcs1.b64");
pub const EC_P256_SEC1: &str = include_str!("data/ec_p256.b64");
pub const PROBLEM_JSON: &str = include_str!("data/problem.json");

pub fn requirements(domain: &str, serial_number: &str) -> SubjectRequirements {
    SubjectRequirements::builder()
        .domain(domain)
        .serial_number(serial_number)
        .build()
}

/// A policy with a pinned start so validity can be compared exactly.
pub fn pinned_policy() -> IssuancePolicy {
    IssuancePolicy::builder()
        .not_before(OffsetDateTime::from_unix_timestamp(1_760_400_000).unwrap())
        .build()
}
