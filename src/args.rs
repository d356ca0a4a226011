//! Command Line argument parsing
#![allow(missing_docs)]

use std::path::PathBuf;

use bpaf::Bpaf;
use tales_of_ssl::cert::SignatureAlgorithm;
use tales_of_ssl::cert::params::{CountryPolicy, DEFAULT_COUNTRY, DEFAULT_VALIDITY_DAYS, IssuancePolicy};

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version)]
/// Build a self-signed certificate for a tales-of-ssl problem
pub struct Options {
    /// Problem JSON document (reads stdin when omitted)
    #[bpaf(short, long, argument("path/problem.json"))]
    pub problem: Option<PathBuf>,
    /// Where to write the solution JSON (stdout when omitted)
    #[bpaf(short, long, argument("path/solution.json"))]
    pub output: Option<PathBuf>,
    /// Also write the certificate as PEM
    #[bpaf(long, argument("path/cert.pem"))]
    pub pem: Option<PathBuf>,
    /// Certificate lifetime in days
    #[bpaf(long, fallback(DEFAULT_VALIDITY_DAYS), display_fallback)]
    pub validity_days: i64,
    /// Country Name placed in the subject
    #[bpaf(long, fallback(DEFAULT_COUNTRY.into()), display_fallback)]
    pub country: String,
    /// Use required_data.country when it is a two-letter code
    #[bpaf(long)]
    pub country_from_problem: bool,
    /// Signature digest: sha256, sha384 or sha512
    #[bpaf(long, argument::<String>("hash"), fallback("sha256".into()), display_fallback, parse(parse_hash))]
    pub hash: SignatureAlgorithm,
}

fn parse_hash(hash: String) -> Result<SignatureAlgorithm, String> {
    hash.parse()
}

impl Options {
    /// Maps the flags onto an issuance policy.
    pub fn policy(&self) -> IssuancePolicy {
        let country = if self.country_from_problem {
            CountryPolicy::FromRequirements {
                fallback: self.country.clone(),
            }
        } else {
            CountryPolicy::Fixed(self.country.clone())
        };
        IssuancePolicy::builder()
            .country(country)
            .validity_days(self.validity_days)
            .signature_algorithm(self.hash)
            .build()
    }
}
