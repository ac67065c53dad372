//! Errors.
//!
//! Every failure is attributed to the stage of the invocation that
//! produced it.  None of them are recovered from: they propagate up
//! to `main`, which reports them and picks the exit status.

use std::path::PathBuf;

use crate::authority::SigningError;

/// The stage of an invocation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Input,
    Authority,
    Persistence,
}

impl Stage {
    /// Returns a summary of what failed.
    pub fn failure(&self) -> &'static str {
        match self {
            Stage::Configuration => "Invalid configuration",
            Stage::Input => "Invalid input",
            Stage::Authority => "Issuing the certificate failed",
            Stage::Persistence => "Saving the certificate failed",
        }
    }
}

/// Errors used in vpki.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The authority's address is not set.
    #[error("No {0} set; there is no authority to request a certificate from")]
    MissingAddress(&'static str),

    /// The authority's address is not a URL.
    #[error("{0} is not a valid URL: {1:?}")]
    InvalidAddress(&'static str, String,
                   #[source] Box<dyn std::error::Error + Send + Sync>),

    /// The home directory could not be determined.
    #[error("Cannot determine the home directory")]
    NoHomeDirectory,

    /// The token file could not be read, or is empty.
    #[error("Cannot read the token from {}", .0.display())]
    Token(PathBuf, #[source] std::io::Error),

    /// The HTTP client could not be set up.
    #[error("Cannot set up the connection to the authority")]
    Transport(#[source] reqwest::Error),

    /// The runtime driving the request could not be started.
    #[error("Cannot start the runtime")]
    Runtime(#[source] std::io::Error),

    /// The common name is empty.
    #[error("The common name must not be empty")]
    EmptyCommonName,

    /// The requested validity period is not a duration.
    #[error("Invalid duration {0:?}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    /// The requested validity period cannot be expressed to the
    /// authority.
    #[error("Invalid duration {0:?}: {1}")]
    UnsupportedDuration(String, &'static str),

    /// The certificate signing request could not be read.
    #[error("Cannot read the certificate signing request {}", .0.display())]
    SigningRequest(PathBuf, #[source] std::io::Error),

    /// The authority did not issue a certificate.
    #[error(transparent)]
    Authority(#[from] SigningError),

    /// An artifact could not be written.
    #[error("Cannot write {}", .0.display())]
    Persistence(PathBuf, #[source] std::io::Error),
}

impl Error {
    /// Returns the stage that failed.
    pub fn stage(&self) -> Stage {
        use Error::*;
        match self {
            MissingAddress(_)
                | InvalidAddress(..)
                | NoHomeDirectory
                | Token(..)
                | Transport(_)
                | Runtime(_) => Stage::Configuration,
            EmptyCommonName
                | InvalidDuration(..)
                | UnsupportedDuration(..)
                | SigningRequest(..) => Stage::Input,
            Authority(_) => Stage::Authority,
            Persistence(..) => Stage::Persistence,
        }
    }

    /// Returns the process exit status for this error.
    ///
    /// The values follow `sysexits.h`.
    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            Stage::Input => 65,
            Stage::Authority => 69,
            Stage::Persistence => 73,
            Stage::Configuration => 78,
        }
    }
}

/// A specialized Result type for vpki.
pub type Result<T, E = Error> = std::result::Result<T, E>;
