pub mod params;

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode, EncodePem};
use params::{DistinguishedName, IssuancePolicy, SubjectRequirements, Validity};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use x509_cert::certificate::CertificateInner;

use crate::error::CertError;
use crate::issuer::Issuer;
use crate::key::KeyPair;
use crate::serial::CertSerial;
use crate::tbs_certificate::TbsCertificate;

pub type Result<T> = std::result::Result<T, CertError>;

/// Represents the supported signature algorithms for certificates.
///
/// All are RSASSA-PKCS1-v1_5; they differ in the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    #[default]
    Sha256WithRsa,
    /// SHA-384 with RSA encryption.
    Sha384WithRsa,
    /// SHA-512 with RSA encryption.
    Sha512WithRsa,
}

impl SignatureAlgorithm {
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha256WithRsa => const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRsa => const_oid::db::rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRsa => const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        }
    }

    /// Maps a signature algorithm OID back to the enum.
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        [
            SignatureAlgorithm::Sha256WithRsa,
            SignatureAlgorithm::Sha384WithRsa,
            SignatureAlgorithm::Sha512WithRsa,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *oid)
        .ok_or_else(|| CertError::Decoding(format!("unsupported signature algorithm {oid}")))
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignatureAlgorithm::Sha256WithRsa => "sha256WithRSAEncryption",
            SignatureAlgorithm::Sha384WithRsa => "sha384WithRSAEncryption",
            SignatureAlgorithm::Sha512WithRsa => "sha512WithRSAEncryption",
        })
    }
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = String;

    /// Accepts the digest name, e.g. `sha256`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(SignatureAlgorithm::Sha256WithRsa),
            "sha384" | "sha-384" => Ok(SignatureAlgorithm::Sha384WithRsa),
            "sha512" | "sha-512" => Ok(SignatureAlgorithm::Sha512WithRsa),
            other => Err(format!("unknown signature hash {other:?}, expected sha256, sha384 or sha512")),
        }
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RFC 4055 requires explicit NULL parameters for the RSA algorithms.
    fn from(value: SignatureAlgorithm) -> Self {
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters: Some(der::asn1::Any::null()),
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER, base64 or PEM.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertError::Encoding(e.to_string()))
    }

    /// Encodes the DER form as standard base64, the transport encoding.
    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_der()?))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(der::pem::LineEnding::LF)
            .map_err(|e| CertError::Encoding(e.to_string()))
    }

    /// Parses a DER encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        x509_cert::Certificate::from_der(der)
            .map(|inner| Certificate { inner })
            .map_err(|e| CertError::Decoding(e.to_string()))
    }

    /// Parses base64 text holding a DER encoded certificate.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let der = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CertError::Decoding(e.to_string()))?;
        Self::from_der(&der)
    }

    pub fn serial_number(&self) -> BigUint {
        BigUint::from_bytes_be(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    pub fn subject(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> Result<DistinguishedName> {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    pub fn validity(&self) -> Result<Validity> {
        Ok(TbsCertificate::from_tbs_certificate_inner(&self.inner.tbs_certificate)?.validity)
    }

    pub fn signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::from_oid(&self.inner.signature_algorithm.oid)
    }

    /// Returns the RSA public key embedded in the certificate.
    pub fn public_key(&self) -> Result<RsaPublicKey> {
        let spki_der = self.inner.tbs_certificate.subject_public_key_info.to_der()?;
        RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| CertError::Decoding(e.to_string()))
    }

    /// Checks the signature against the certificate's own public key.
    ///
    /// The outer and inner signature algorithm identifiers must also agree.
    pub fn verify_self_signed(&self) -> Result<()> {
        let algorithm = self.signature_algorithm()?;
        if self.inner.tbs_certificate.signature != self.inner.signature_algorithm {
            return Err(CertError::Verification(
                "signature algorithm differs between TBS and certificate".to_string(),
            ));
        }

        let tbs_der = self.inner.tbs_certificate.to_der()?;
        let signature_bytes = self.inner.signature.as_bytes().ok_or_else(|| {
            CertError::Verification("signature has unused bits".to_string())
        })?;
        let signature = Signature::try_from(signature_bytes)
            .map_err(|e| CertError::Verification(e.to_string()))?;
        let public_key = self.public_key()?;

        let verified = match algorithm {
            SignatureAlgorithm::Sha256WithRsa => {
                VerifyingKey::<Sha256>::new(public_key).verify(&tbs_der, &signature)
            }
            SignatureAlgorithm::Sha384WithRsa => {
                VerifyingKey::<Sha384>::new(public_key).verify(&tbs_der, &signature)
            }
            SignatureAlgorithm::Sha512WithRsa => {
                VerifyingKey::<Sha512>::new(public_key).verify(&tbs_der, &signature)
            }
        };
        verified.map_err(|e| CertError::Verification(e.to_string()))
    }

    /// Creates a new self-signed certificate with `serial` for `requirements`.
    ///
    /// Subject and issuer are both built from the requirements and the
    /// policy's country; the key signs its own public half.
    pub fn new_self_signed(
        serial: CertSerial,
        requirements: &SubjectRequirements,
        key: &KeyPair,
        policy: &IssuancePolicy,
    ) -> Result<Self> {
        let subject = DistinguishedName {
            common_name: requirements.domain.clone(),
            country: Some(policy.country.resolve(requirements)?),
        };
        let validity = policy.validity()?;
        log::debug!(
            "self-signing serial 0x{} for {:?}, valid {} to {}",
            serial.to_hex(),
            subject.common_name,
            validity.not_before,
            validity.not_after
        );

        let self_issuer = SelfIssuer {
            name: subject.clone(),
            key,
        };
        self_issuer.issue(serial, subject, validity, policy.signature_algorithm)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }

    fn subject_key(&self) -> &KeyPair {
        self.key
    }
}
