//! # tales-of-ssl - Self-Signed Certificates From Supplied Keys
//!
//! Builds a self-signed X.509 certificate from an RSA private key handed
//! over as base64 PKCS#1 DER, with a subject made of a required domain
//! (Common Name), a `0x`-prefixed hex serial number and a country. The
//! result is returned as base64 DER, ready to submit to a verifier.
//!
//! Everything is pure Rust on the RustCrypto stack (`rsa`, `der`,
//! `x509-cert`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tales_of_ssl::cert::params::{IssuancePolicy, SubjectRequirements};
//! use tales_of_ssl::issuer::build_certificate;
//!
//! # fn main() -> Result<(), tales_of_ssl::error::CertError> {
//! # let private_key = String::new();
//! let requirements = SubjectRequirements::builder()
//!     .domain("example.com")
//!     .serial_number("0x1a2b")
//!     .build();
//!
//! let certificate = build_certificate(&private_key, &requirements, &IssuancePolicy::default())?;
//! println!("{certificate}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Issuance Policy
//!
//! Choices the problem does not carry live in
//! [`IssuancePolicy`](cert::params::IssuancePolicy): where the country
//! comes from (a fixed `CI` by default), the validity window (one year from
//! now by default) and the signature digest (SHA-256 by default).
//!
//! ## Error Handling
//!
//! Each failing stage has its own variant:
//!
//! ```rust
//! use tales_of_ssl::cert::params::{IssuancePolicy, SubjectRequirements};
//! use tales_of_ssl::error::CertError;
//! use tales_of_ssl::issuer::build_certificate;
//!
//! let requirements = SubjectRequirements::builder()
//!     .domain("example.com")
//!     .serial_number("0x1a2b")
//!     .build();
//!
//! match build_certificate("not base64!", &requirements, &IssuancePolicy::default()) {
//!     Ok(_) => unreachable!(),
//!     Err(CertError::KeyDecode(msg)) => println!("Failed to decode key: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: RSA key import and signing
//! - [`serial`]: Serial number parsing
//! - [`cert`]: Certificate encoding, decoding and inspection
//! - [`issuer`]: Certificate issuing and the `build_certificate` entry point
//! - [`exchange`]: Problem/solution documents and their collaborators
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod error;
pub mod exchange;
pub mod issuer;
pub mod key;
pub mod serial;
pub mod tbs_certificate;

pub use cert::Certificate;
pub use issuer::{build_certificate, issue_certificate};
