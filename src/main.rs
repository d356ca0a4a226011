use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use tales_of_ssl::Certificate;
use tales_of_ssl::error::ExchangeError;
use tales_of_ssl::exchange::{
    JsonSubmitter, JsonSupplier, ProblemSupplier, Solution, SolutionSubmitter, solve,
};
mod args;

fn main() -> ExitCode {
    env_logger::init();
    let opts = args::options().run();
    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: &args::Options) -> Result<(), ExchangeError> {
    let policy = opts.policy();

    let mut supplier: Box<dyn ProblemSupplier> = match &opts.problem {
        Some(path) => Box::new(JsonSupplier::new(BufReader::new(File::open(path)?))),
        None => Box::new(JsonSupplier::new(io::stdin().lock())),
    };
    let mut submitter: Box<dyn SolutionSubmitter> = match &opts.output {
        Some(path) => Box::new(JsonSubmitter::new(BufWriter::new(File::create(path)?))),
        None => Box::new(JsonSubmitter::new(io::stdout().lock())),
    };

    match &opts.pem {
        Some(pem_path) => {
            let mut recorder = PemRecorder {
                inner: submitter.as_mut(),
                path: pem_path,
            };
            solve(supplier.as_mut(), &mut recorder, &policy)?;
        }
        None => {
            solve(supplier.as_mut(), submitter.as_mut(), &policy)?;
        }
    }
    Ok(())
}

/// Writes a PEM copy of the certificate before passing the solution on.
struct PemRecorder<'a> {
    inner: &'a mut dyn SolutionSubmitter,
    path: &'a Path,
}

impl SolutionSubmitter for PemRecorder<'_> {
    fn submit(&mut self, solution: &Solution) -> Result<Option<String>, ExchangeError> {
        let pem = Certificate::from_base64(&solution.certificate)?.to_pem()?;
        std::fs::write(self.path, pem)?;
        log::info!("wrote PEM certificate to {}", self.path.display());
        self.inner.submit(solution)
    }
}
