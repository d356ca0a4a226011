//! Error types for certificate building and problem exchange.

use thiserror::Error;

/// Represents errors that can occur while building a certificate.
///
/// Each variant names the stage that failed so a caller can report it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertError {
    /// The private key text is not valid base64.
    #[error("Failed to decode private key: {0}")]
    KeyDecode(String),

    /// The decoded key is not a well-formed PKCS#1 RSA private key.
    #[error("Failed to parse RSA private key: {0}")]
    KeyParse(String),

    /// The serial number is missing its `0x` prefix or is not valid hex.
    #[error("Failed to parse serial number: {0}")]
    SerialParse(String),

    /// The RSA signing operation failed.
    #[error("Failed to sign certificate: {0}")]
    Signing(String),

    /// Error during DER or PEM encoding.
    #[error("Failed to encode data: {0}")]
    Encoding(String),

    /// Error while reading back an encoded certificate.
    #[error("Failed to decode certificate: {0}")]
    Decoding(String),

    /// The issuance policy cannot produce a usable certificate.
    #[error("Invalid issuance policy: {0}")]
    InvalidPolicy(String),

    /// The certificate signature does not verify against its own key.
    #[error("Signature verification failed: {0}")]
    Verification(String),
}

/// Discriminant of [`CertError`], for matching without the detail string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertErrorKind {
    KeyDecode,
    KeyParse,
    SerialParse,
    Signing,
    Encoding,
    Decoding,
    InvalidPolicy,
    Verification,
}

impl CertError {
    /// Returns the kind of failure without its context.
    pub fn kind(&self) -> CertErrorKind {
        match self {
            CertError::KeyDecode(_) => CertErrorKind::KeyDecode,
            CertError::KeyParse(_) => CertErrorKind::KeyParse,
            CertError::SerialParse(_) => CertErrorKind::SerialParse,
            CertError::Signing(_) => CertErrorKind::Signing,
            CertError::Encoding(_) => CertErrorKind::Encoding,
            CertError::Decoding(_) => CertErrorKind::Decoding,
            CertError::InvalidPolicy(_) => CertErrorKind::InvalidPolicy,
            CertError::Verification(_) => CertErrorKind::Verification,
        }
    }
}

impl From<der::Error> for CertError {
    /// Converts a `der::Error` into a `CertError`.
    fn from(err: der::Error) -> Self {
        CertError::Encoding(err.to_string())
    }
}

impl From<base64::DecodeError> for CertError {
    fn from(err: base64::DecodeError) -> Self {
        CertError::KeyDecode(err.to_string())
    }
}

impl From<rsa::Error> for CertError {
    fn from(err: rsa::Error) -> Self {
        CertError::KeyParse(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for CertError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        CertError::KeyParse(err.to_string())
    }
}

/// Errors raised while exchanging problem and solution documents.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Reading the problem or writing the solution failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document was not valid JSON or had the wrong shape.
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// The certificate could not be built.
    #[error(transparent)]
    Certificate(#[from] CertError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            CertError::SerialParse("x".into()).kind(),
            CertErrorKind::SerialParse
        );
        assert_eq!(
            CertError::from(der::Error::from(der::ErrorKind::Overflow)).kind(),
            CertErrorKind::Encoding
        );
    }

    #[test]
    fn exchange_error_keeps_certificate_kind() {
        let err = ExchangeError::from(CertError::Signing("too small".into()));
        match err {
            ExchangeError::Certificate(inner) => assert_eq!(inner.kind(), CertErrorKind::Signing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn exchange_error_displays_the_failed_stage() {
        let err = ExchangeError::from(CertError::KeyDecode("invalid byte 42".into()));
        assert_eq!(err.to_string(), "Failed to decode private key: invalid byte 42");
    }
}
