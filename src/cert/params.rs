use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, PrintableStringRef, SetOfVec, Utf8StringRef};
use der::{Tag, Tagged};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use crate::cert::SignatureAlgorithm;
use crate::error::CertError;

/// id-at-commonName
const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// id-at-countryName
const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");

/// The subject fields a problem requires in the issued certificate.
///
/// # Fields
/// * `domain` - Used verbatim as the Common Name.
/// * `serial_number` - `0x`-prefixed hex serial.
/// * `country` - Country as supplied; only consulted under
///   [`CountryPolicy::FromRequirements`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct SubjectRequirements {
    #[builder(into)]
    pub domain: String,
    #[builder(into)]
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub country: Option<String>,
}

/// Distinguished name of a certificate subject or issuer.
///
/// Only the attributes this crate issues are modelled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct DistinguishedName {
    #[builder(into)]
    pub common_name: String,
    #[builder(into)]
    pub country: Option<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509 `Name`, country first.
    ///
    /// Empty attributes are left out. Values use PrintableString when they
    /// fit its character set and UTF8String otherwise.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName, CertError> {
        let mut rdns = Vec::with_capacity(2);
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            rdns.push(single_attribute_rdn(COUNTRY_NAME, country)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(single_attribute_rdn(COMMON_NAME, &self.common_name)?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509 `Name`.
    ///
    /// Attributes other than CN and C are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self, CertError> {
        let mut dn = DistinguishedName::default();
        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                if attr.oid == COMMON_NAME {
                    dn.common_name = attribute_string(&attr.value)?;
                } else if attr.oid == COUNTRY_NAME {
                    dn.country = Some(attribute_string(&attr.value)?);
                }
            }
        }
        Ok(dn)
    }
}

fn single_attribute_rdn(oid: ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName, CertError> {
    let value = match PrintableStringRef::new(value) {
        Ok(printable) => Any::encode_from(&printable)?,
        Err(_) => Any::encode_from(&Utf8StringRef::new(value)?)?,
    };
    let attribute = AttributeTypeAndValue { oid, value };
    Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![attribute])?))
}

fn attribute_string(value: &Any) -> Result<String, CertError> {
    match value.tag() {
        Tag::PrintableString | Tag::Utf8String | Tag::Ia5String => std::str::from_utf8(value.value())
            .map(str::to_owned)
            .map_err(|e| CertError::Decoding(e.to_string())),
        other => Err(CertError::Decoding(format!(
            "unsupported directory string tag {other}"
        ))),
    }
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period of `days` starting at `not_before`.
    ///
    /// Returns `None` when the end would fall outside the representable range.
    pub fn starting_at(not_before: OffsetDateTime, days: i64) -> Option<Self> {
        let not_after = days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|secs| not_before.checked_add(Duration::seconds(secs)))?;
        Some(Self {
            not_before,
            not_after,
        })
    }
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Where the subject country attribute comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountryPolicy {
    /// Always use this two-letter code.
    Fixed(String),
    /// Use `required_data.country` when it is a two-letter code, else `fallback`.
    FromRequirements { fallback: String },
}

impl Default for CountryPolicy {
    fn default() -> Self {
        CountryPolicy::Fixed(DEFAULT_COUNTRY.to_string())
    }
}

impl CountryPolicy {
    /// Picks the country code for a certificate issued for `requirements`.
    ///
    /// The configured code, fixed or fallback, must itself be two ASCII
    /// letters, otherwise the policy is a [`CertError::InvalidPolicy`].
    pub fn resolve(&self, requirements: &SubjectRequirements) -> Result<String, CertError> {
        match self {
            CountryPolicy::Fixed(code) => configured_code(code),
            CountryPolicy::FromRequirements { fallback } => {
                let fallback = configured_code(fallback)?;
                match requirements.country.as_deref() {
                    Some(code) if is_country_code(code) => Ok(code.to_ascii_uppercase()),
                    requested => {
                        log::warn!("requested country {requested:?} is not a two-letter code, using {fallback}");
                        Ok(fallback)
                    }
                }
            }
        }
    }
}

fn configured_code(code: &str) -> Result<String, CertError> {
    if is_country_code(code) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(CertError::InvalidPolicy(format!(
            "country {code:?} is not a two-letter code"
        )))
    }
}

fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Country code used when nothing else is configured.
pub const DEFAULT_COUNTRY: &str = "CI";

/// Default certificate lifetime in days.
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Issuance choices not carried by the problem itself.
///
/// # Fields
/// * `country` - Source of the subject country attribute.
/// * `validity_days` - Lifetime of the certificate; must be positive.
/// * `not_before` - Pins the start of validity; the current time when unset.
/// * `signature_algorithm` - Digest used with the RSA signature.
#[derive(Clone, Debug, Builder)]
pub struct IssuancePolicy {
    #[builder(default)]
    pub country: CountryPolicy,
    #[builder(default = DEFAULT_VALIDITY_DAYS)]
    pub validity_days: i64,
    pub not_before: Option<OffsetDateTime>,
    #[builder(default)]
    pub signature_algorithm: SignatureAlgorithm,
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IssuancePolicy {
    /// Computes the validity window for a certificate issued now.
    pub fn validity(&self) -> Result<Validity, CertError> {
        if self.validity_days <= 0 {
            return Err(CertError::InvalidPolicy(format!(
                "validity must be at least one day, got {}",
                self.validity_days
            )));
        }
        let not_before = self.not_before.unwrap_or_else(OffsetDateTime::now_utc);
        Validity::starting_at(not_before, self.validity_days).ok_or_else(|| {
            CertError::InvalidPolicy(format!(
                "validity of {} days is out of range",
                self.validity_days
            ))
        })
    }
}
