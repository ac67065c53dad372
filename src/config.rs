//! Configuration model.
//!
//! The configuration is assembled once at startup from the command
//! line, the environment, and the token file, and is immutable
//! thereafter.

use std::{
    fmt,
    fs,
    path::PathBuf,
    time::Duration,
};

use clap::parser::ValueSource;

use reqwest::Url;

use crate::{
    Error,
    Result,
    authority::IssuanceConfig,
    cli,
};

/// A secret token used to authenticate to the authority.
///
/// The token is never displayed: its `Debug` implementation redacts
/// the value, and it does not implement `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

impl Token {
    /// Wraps a token.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Token(token.into())
    }

    /// Reads the token from `path`.
    ///
    /// Surrounding whitespace, in particular a trailing newline, is
    /// removed.  An empty token is an error.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let raw = fs::read_to_string(&path)
            .map_err(|err| Error::Token(path.clone(), err))?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(Error::Token(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData,
                                    "the file is empty")));
        }
        Ok(Token::new(token))
    }

    /// Returns the secret.
    ///
    /// Only use this to authenticate a request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// The parts of the process environment vpki consults.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// The value of `VAULT_ADDR`, if set and not empty.
    pub address: Option<String>,

    /// The user's home directory.
    pub home: Option<PathBuf>,
}

impl Environment {
    /// Returns the current process's environment.
    pub fn from_process() -> Self {
        Environment {
            address: std::env::var(cli::ADDRESS_ENV).ok()
                .filter(|a| ! a.is_empty()),
            home: dirs::home_dir(),
        }
    }
}

/// Represents configuration at runtime.
#[derive(Debug)]
pub struct Config {
    /// The subject's common name.
    pub common_name: String,

    /// Artifacts are written to `<output_prefix>.crt` and
    /// `<output_prefix>.key`.
    pub output_prefix: String,

    /// Comma-separated DNS alternative names.
    pub alt_names: String,

    /// Comma-separated IP alternative names.
    pub ip_addresses: String,

    /// Comma-separated organizations.
    pub organization: String,

    /// If set, sign this certificate signing request instead of
    /// generating a key.
    pub csr: Option<PathBuf>,

    /// Everything the issuance client needs.
    pub issuance: IssuanceConfig,

    /// Be verbose.
    pub verbose: bool,

    /// Be quiet.
    pub quiet: bool,
}

impl Config {
    /// Assembles the configuration.
    ///
    /// `profile_source` is where clap took the value of `--profile`
    /// from.
    ///
    /// Nothing is read from disk before the authority's address is
    /// known to be set.
    pub fn new(c: &cli::VpkiCommand, profile_source: Option<ValueSource>,
               env: Environment)
               -> Result<Self>
    {
        let address = authority_address(env.address)?;
        let ttl = parse_ttl(&c.ttl, default_ttl())?;
        let home = env.home.ok_or(Error::NoHomeDirectory)?;
        let token = Token::from_file(home.join(cli::TOKEN_FILE))?;

        Ok(Config {
            common_name: c.common_name.clone(),
            output_prefix: c.output_prefix.clone()
                .unwrap_or_else(|| c.common_name.clone()),
            alt_names: c.alt.clone(),
            ip_addresses: c.ips.clone(),
            organization: c.org.clone(),
            csr: c.csr.clone(),
            issuance: IssuanceConfig {
                mount: c.mount.clone(),
                role: role(&c.profile, profile_source),
                address,
                token,
                ttl,
                insecure: c.insecure,
            },
            verbose: c.verbose,
            quiet: c.quiet,
        })
    }

    /// Returns the path of the certificate file.
    pub fn certificate_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.crt", self.output_prefix))
    }

    /// Returns the path of the private key file.
    pub fn key_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.key", self.output_prefix))
    }
}

/// Returns the default validity period.
pub fn default_ttl() -> Duration {
    Duration::from_secs(cli::DEFAULT_TTL_SECS)
}

/// Parses a validity period.
///
/// An empty string selects `default`.  Anything else must be a
/// duration like `24h` or `1h 30m`, otherwise this fails with
/// [`Error::InvalidDuration`].  Negative durations are not
/// durations.
///
/// The authority counts in whole seconds, and takes zero to mean the
/// role's default.  Zero and fractional durations are rejected with
/// [`Error::UnsupportedDuration`].
pub fn parse_ttl(ttl: &str, default: Duration) -> Result<Duration> {
    if ttl.is_empty() {
        return Ok(default);
    }

    let d = humantime::parse_duration(ttl)
        .map_err(|err| Error::InvalidDuration(ttl.into(), err))?;
    if d.is_zero() {
        return Err(Error::UnsupportedDuration(
            ttl.into(), "must not be zero"));
    }
    if d.subsec_nanos() != 0 {
        return Err(Error::UnsupportedDuration(
            ttl.into(), "must be a whole number of seconds"));
    }
    Ok(d)
}

/// Parses the authority's address.
fn authority_address(address: Option<String>) -> Result<Url> {
    let address = address.ok_or(Error::MissingAddress(cli::ADDRESS_ENV))?;
    let url = Url::parse(&address)
        .map_err(|err| Error::InvalidAddress(
            cli::ADDRESS_ENV, address.clone(), err.into()))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidAddress(
            cli::ADDRESS_ENV, address,
            "not a hierarchical URL".into()));
    }
    Ok(url)
}

/// Returns the role to use.
///
/// Handles the precedence of the various sources:
///
/// - If the flag is given, use the given value.
/// - If the command line flag is not given, then
///   - use the value from the environment (if any),
///   - or use the default value.
///
/// clap takes care of the precedence.  An explicitly empty value
/// selects the default.
fn role(profile: &str, source: Option<ValueSource>) -> String {
    match source {
        Some(ValueSource::DefaultValue) | None =>
            cli::DEFAULT_PROFILE.into(),
        _ if profile.is_empty() => cli::DEFAULT_PROFILE.into(),
        _ => profile.into(),
    }
}
