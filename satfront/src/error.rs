use std::io;

use thiserror::Error;

use satfront_cnf::ParseError;

/// Fatal errors ending a run with exit code 1.
#[derive(Error, Debug)]
pub enum Error {
    /// Command line parsing failed or printed help information.
    #[error(transparent)]
    Cli(#[from] clap::Error),
    /// `--version` was given, displays the bare version string.
    #[error("{}", env!("CARGO_PKG_VERSION"))]
    Version,
    /// Conflicting or invalid options.
    #[error("{0}")]
    Config(String),
    /// The input path does not exist or is not readable.
    #[error("can not access '{0}'")]
    Access(String),
    /// The input could not be opened or its decompressor could not be started.
    #[error("can not open '{0}'")]
    Open(String, #[source] io::Error),
    /// The input violates the DIMACS CNF format.
    #[error(transparent)]
    Format(#[from] ParseError),
    #[error("failed to initialize solver")]
    EngineInit,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Cli(err) if !err.use_stderr() => 0,
            Error::Version => 0,
            _ => 1,
        }
    }
}
