use der::asn1::{GeneralizedTime, UtcTime};
use der::DateTime;
use rsa::BigUint;
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::Time;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::{DistinguishedName, Validity};
use crate::error::CertError;
use crate::serial::CertSerial;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - The unique identifier for the certificate.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
///
/// No extensions are emitted; the certificate carries subject identity only.
#[derive(Clone, Debug)]
pub struct TbsCertificate {
    pub serial_number: CertSerial,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key: SubjectPublicKeyInfoOwned,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner, CertError> {
        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: self.serial_number.to_serial_number()?,
            signature: self.signature_algorithm.into(),
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: None,
        })
    }

    /// Creates a `TbsCertificate` from a `TbsCertificateInner`.
    pub fn from_tbs_certificate_inner(inner: &TbsCertificateInner) -> Result<Self, CertError> {
        let signature_algorithm = SignatureAlgorithm::from_oid(&inner.signature.oid)?;

        Ok(Self {
            serial_number: BigUint::from_bytes_be(inner.serial_number.as_bytes()).into(),
            signature_algorithm,
            issuer: DistinguishedName::from_x509_name(&inner.issuer)?,
            validity: Validity {
                not_before: OffsetDateTime::from(inner.validity.not_before.to_system_time()),
                not_after: OffsetDateTime::from(inner.validity.not_after.to_system_time()),
            },
            subject: DistinguishedName::from_x509_name(&inner.subject)?,
            subject_public_key: inner.subject_public_key_info.clone(),
        })
    }
}

/// RFC 5280 §4.1.2.5: UTCTime through 2049, GeneralizedTime from 2050.
fn to_x509_time(at: OffsetDateTime) -> Result<Time, CertError> {
    let date_time = DateTime::from_system_time(at.into())
        .map_err(|e| CertError::InvalidPolicy(format!("{at} cannot be encoded: {e}")))?;
    if date_time.year() < 2050 {
        Ok(Time::UtcTime(UtcTime::from_date_time(date_time)?))
    } else {
        Ok(Time::GeneralTime(GeneralizedTime::from_date_time(date_time)))
    }
}
