use der::Encode;
use x509_cert::certificate::CertificateInner;

use crate::cert::params::{DistinguishedName, IssuancePolicy, SubjectRequirements, Validity};
use crate::cert::{Certificate, SignatureAlgorithm};
use crate::error::CertError;
use crate::key::KeyPair;
use crate::serial::CertSerial;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Returns the key whose public half goes into the issued certificate.
    fn subject_key(&self) -> &KeyPair;

    /// Issues a certificate for `subject`.
    ///
    /// # Arguments
    /// * `serial` - Serial number of the new certificate.
    /// * `subject` - Distinguished name of the new certificate.
    /// * `validity` - Its validity window.
    /// * `algorithm` - Digest used with the issuer's RSA key.
    ///
    /// # Returns
    /// The signed `Certificate`. No extensions are included.
    fn issue(
        &self,
        serial: CertSerial,
        subject: DistinguishedName,
        validity: Validity,
        algorithm: SignatureAlgorithm,
    ) -> Result<Certificate, CertError> {
        let tbs_cert = TbsCertificate {
            serial_number: serial,
            signature_algorithm: algorithm,
            issuer: self.issuer_name(),
            validity,
            subject,
            subject_public_key: self.subject_key().as_spki()?,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert_inner.to_der()?;
        let signature = self.signing_key().sign_data(&tbs_der, algorithm)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: algorithm.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Builds the self-signed certificate a problem asks for.
///
/// `private_key` is base64 text of a PKCS#1 RSA private key. Failures are
/// reported by stage: [`CertError::SerialParse`], [`CertError::KeyDecode`],
/// [`CertError::KeyParse`] or [`CertError::Signing`].
pub fn issue_certificate(
    private_key: &str,
    requirements: &SubjectRequirements,
    policy: &IssuancePolicy,
) -> Result<Certificate, CertError> {
    // The serial is checked before any key work is done.
    let serial = crate::serial::parse_serial_number(&requirements.serial_number)?;
    let key = KeyPair::from_base64_pkcs1(private_key)?;
    Certificate::new_self_signed(serial, requirements, &key, policy)
}

/// Like [`issue_certificate`], returning the base64 DER text for transport.
pub fn build_certificate(
    private_key: &str,
    requirements: &SubjectRequirements,
    policy: &IssuancePolicy,
) -> Result<String, CertError> {
    let certificate = issue_certificate(private_key, requirements, policy)?;
    let encoded = certificate.to_base64()?;
    log::debug!("encoded certificate as {} base64 characters", encoded.len());
    Ok(encoded)
}
