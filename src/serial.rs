//! Parsing of `0x`-prefixed hexadecimal certificate serial numbers.

use rsa::BigUint;
use x509_cert::serial_number::SerialNumber;

use crate::error::CertError;

/// The radix marker every serial number string must start with.
pub const SERIAL_PREFIX: &str = "0x";

/// A non-negative certificate serial number of arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertSerial(BigUint);

impl CertSerial {
    /// Returns the serial as an unsigned big integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Returns the serial as lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        self.0.to_str_radix(16)
    }

    /// Converts the serial into the X.509 `CertificateSerialNumber` form.
    ///
    /// RFC 5280 caps the encoded INTEGER at 20 octets; larger values are
    /// rejected here rather than producing a certificate verifiers refuse.
    pub fn to_serial_number(&self) -> Result<SerialNumber, CertError> {
        SerialNumber::new(&self.0.to_bytes_be()).map_err(|e| {
            CertError::SerialParse(format!(
                "serial 0x{} cannot be encoded: {e}",
                self.to_hex()
            ))
        })
    }
}

impl From<BigUint> for CertSerial {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

/// Parses a serial number such as `"0x1a2b"` into a [`CertSerial`].
///
/// The marker match is case-insensitive (`0X` is accepted). The remainder
/// must be non-empty and consist only of hex digits.
pub fn parse_serial_number(input: &str) -> Result<CertSerial, CertError> {
    let digits = input
        .get(..SERIAL_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(SERIAL_PREFIX))
        .map(|_| &input[SERIAL_PREFIX.len()..])
        .ok_or_else(|| {
            CertError::SerialParse(format!("{input:?} does not start with {SERIAL_PREFIX}"))
        })?;

    if digits.is_empty() {
        return Err(CertError::SerialParse(format!(
            "{input:?} has no digits after {SERIAL_PREFIX}"
        )));
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CertError::SerialParse(format!(
            "{input:?} contains non-hex character {bad:?}"
        )));
    }

    BigUint::parse_bytes(digits.as_bytes(), 16)
        .map(CertSerial)
        .ok_or_else(|| CertError::SerialParse(format!("{input:?} is not valid hex")))
}
