//! Problem and solution documents, and the seams to the services that
//! supply and verify them.
//!
//! Network transport is not part of this crate. A supplier or submitter
//! talking to a remote verifier is another implementation of
//! [`ProblemSupplier`] or [`SolutionSubmitter`]; the JSON implementations
//! here cover files, standard streams and in-memory buffers.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::cert::params::{IssuancePolicy, SubjectRequirements};
use crate::error::ExchangeError;
use crate::issuer::build_certificate;

/// A certificate problem: the key to use and the subject to issue for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Base64 PKCS#1 DER RSA private key.
    pub private_key: String,
    pub required_data: SubjectRequirements,
}

/// The document submitted back to the verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Base64 DER certificate.
    pub certificate: String,
}

/// Source of a [`Problem`].
pub trait ProblemSupplier {
    fn fetch_problem(&mut self) -> Result<Problem, ExchangeError>;
}

/// Consumer of a [`Solution`].
pub trait SolutionSubmitter {
    /// Delivers the solution, returning the verifier's response if the
    /// transport has one.
    fn submit(&mut self, solution: &Solution) -> Result<Option<String>, ExchangeError>;
}

/// Reads a single problem document from a reader.
pub struct JsonSupplier<R> {
    reader: R,
}

impl<R: Read> JsonSupplier<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> ProblemSupplier for JsonSupplier<R> {
    fn fetch_problem(&mut self) -> Result<Problem, ExchangeError> {
        let mut body = String::new();
        self.reader.read_to_string(&mut body)?;
        log::debug!("read {} byte problem document", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

/// Writes the solution document, newline terminated, to a writer.
pub struct JsonSubmitter<W> {
    writer: W,
}

impl<W: Write> JsonSubmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SolutionSubmitter for JsonSubmitter<W> {
    fn submit(&mut self, solution: &Solution) -> Result<Option<String>, ExchangeError> {
        serde_json::to_writer(&mut self.writer, solution)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(None)
    }
}

/// Runs one fetch, build, submit cycle.
///
/// Any failure aborts the run; nothing is submitted unless a certificate
/// was built.
pub fn solve<S, T>(
    supplier: &mut S,
    submitter: &mut T,
    policy: &IssuancePolicy,
) -> Result<Option<String>, ExchangeError>
where
    S: ProblemSupplier + ?Sized,
    T: SolutionSubmitter + ?Sized,
{
    let problem = supplier.fetch_problem()?;
    log::info!(
        "issuing certificate for {:?} with serial {}",
        problem.required_data.domain,
        problem.required_data.serial_number
    );

    let certificate = build_certificate(&problem.private_key, &problem.required_data, policy)?;
    let response = submitter.submit(&Solution { certificate })?;
    match &response {
        Some(body) => log::info!("verifier responded: {body}"),
        None => log::info!("solution submitted"),
    }
    Ok(response)
}
