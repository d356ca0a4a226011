use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::CertError;

/// An RSA key pair loaded from supplied key material.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Decodes base64 text holding a PKCS#1 `RSAPrivateKey` DER document.
    ///
    /// Line breaks (`\r`, `\n`) and surrounding whitespace are ignored;
    /// anything else outside the standard alphabet is a [`CertError::KeyDecode`].
    pub fn from_base64_pkcs1(encoded: &str) -> Result<Self, CertError> {
        let unwrapped: Vec<u8> = encoded
            .trim()
            .bytes()
            .filter(|b| !matches!(b, b'\r' | b'\n'))
            .collect();
        let der = STANDARD.decode(unwrapped)?;
        log::debug!("decoded {} bytes of key material", der.len());
        Self::from_pkcs1_der(&der)
    }

    /// Parses a PKCS#1 DER encoded RSA private key.
    ///
    /// PKCS#8 wrapped keys and non-RSA keys are rejected.
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, CertError> {
        let private = RsaPrivateKey::from_pkcs1_der(der)?;
        private.validate()?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair {
            private: Box::new(private),
            public,
        })
    }

    /// Returns the public key as a `SubjectPublicKeyInfo`.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned, CertError> {
        SubjectPublicKeyInfoOwned::from_key(self.public.clone())
            .map_err(|e| CertError::Encoding(e.to_string()))
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 using the digest named by `algorithm`.
    ///
    /// The private key operation is blinded with randomness from the OS RNG.
    pub fn sign_data(&self, data: &[u8], algorithm: SignatureAlgorithm) -> Result<Vec<u8>, CertError> {
        let private = (*self.private).clone();
        let mut rng = rand_core::OsRng;
        let signature = match algorithm {
            SignatureAlgorithm::Sha256WithRsa => SigningKey::<Sha256>::new(private)
                .try_sign_with_rng(&mut rng, data)
                .map(|s| s.to_vec()),
            SignatureAlgorithm::Sha384WithRsa => SigningKey::<Sha384>::new(private)
                .try_sign_with_rng(&mut rng, data)
                .map(|s| s.to_vec()),
            SignatureAlgorithm::Sha512WithRsa => SigningKey::<Sha512>::new(private)
                .try_sign_with_rng(&mut rng, data)
                .map(|s| s.to_vec()),
        };
        signature.map_err(|e| CertError::Signing(format!("{algorithm}: {e}")))
    }
}
