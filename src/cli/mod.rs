// XXX: The following comment should be an inner comment, but cannot
// until https://github.com/rust-lang/rust/issues/66920 is resolved.

/// Defines the command-line interface.
///
/// This module contains vpki's command-line interface, i.e. the clap
/// definitions and associated constants.
///
/// We also generate manual pages and shell completions from this
/// module.  To that end, `build.rs` includes this module, so all of
/// its dependencies must be also listed as build-dependencies.
/// Further, this module must be self-contained, i.e. it must not use
/// code from other parts of vpki.
///
/// # Interface guidelines
///
/// - Use the imperative mood in the first sentence documenting
///   arguments.
///
/// - The first line of the help texts MUST NOT end in a period.
///
/// - To include inline code fragments, like options or environment
///   variables, use back ticks: `--csr` or `VAULT_ADDR`.
// Workaround so that the above documentation is rendered somewhere in
// the API docs.
#[allow(dead_code)]
pub const USER_INTERFACE_GUIDELINES: () = ();

use std::path::PathBuf;

use clap::{Command, CommandFactory, Parser};

/// The environment variable holding the authority's base address.
pub const ADDRESS_ENV: &str = "VAULT_ADDR";

/// The environment variable holding the default role.
pub const PROFILE_ENV: &str = "VAULT_PKI_PROFILE";

/// The file, relative to the home directory, holding the token.
pub const TOKEN_FILE: &str = ".vault-token";

/// The default mount point of the PKI secrets engine.
pub const DEFAULT_MOUNT: &str = "pki";

/// The default role used for issuing certificates.
pub const DEFAULT_PROFILE: &str = "pki";

/// The default requested validity period.
pub const DEFAULT_TTL: &str = "8760h";

/// [`DEFAULT_TTL`] in seconds.
pub const DEFAULT_TTL_SECS: u64 = 8760 * 60 * 60;

/// Builds the top-level Clap command.
pub fn build() -> Command {
    VpkiCommand::command()
    // To improve readability limit the width of the text columns.
        .max_term_width(100)
}

/// Defines the CLI.
#[derive(Parser, Debug)]
#[clap(
    name = "vpki",
    version,
    about = "Obtain a certificate from a Vault PKI secrets engine",
    long_about = format!("\
Obtain a certificate from a Vault PKI secrets engine

By default, the authority generates a new private key and issues a \
certificate for COMMON_NAME.  The certificate is written to \
`OUTPUT_PREFIX.crt`, the private key to `OUTPUT_PREFIX.key`.  Both \
files are replaced.

If `--csr` is given, the certificate signing request in that file is \
sent to the authority instead, and only the signed certificate is \
returned.  It is appended to `OUTPUT_PREFIX.crt`; an existing file is \
never truncated in this mode.

The authority's address is taken from `{}`, which must be set.  The \
token used to authenticate is read from `$HOME/{}`.",
        ADDRESS_ENV, TOKEN_FILE),
    after_help = format!("\
Environment:
  {}  the authority's base address (required)
  {}  the role to use, overridden by `--profile`",
        ADDRESS_ENV, PROFILE_ENV),
    arg_required_else_help = true,
    disable_colored_help = true,
)]
pub struct VpkiCommand {
    #[clap(
        value_name = "COMMON_NAME",
        help = "Request a certificate for COMMON_NAME",
        long_help = "\
Request a certificate for COMMON_NAME.

COMMON_NAME is used as the subject's common name, and is always \
included in the DNS subject alternative names.",
    )]
    pub common_name: String,

    #[clap(
        value_name = "OUTPUT_PREFIX",
        help = "Write the results to OUTPUT_PREFIX.crt and OUTPUT_PREFIX.key",
        long_help = "\
Write the results to OUTPUT_PREFIX.crt and OUTPUT_PREFIX.key.

Defaults to COMMON_NAME.",
    )]
    pub output_prefix: Option<String>,

    #[clap(
        long = "mount",
        value_name = "MOUNT",
        default_value = DEFAULT_MOUNT,
        help = "Use the PKI secrets engine mounted at MOUNT",
    )]
    pub mount: String,

    #[clap(
        long = "profile",
        value_name = "PROFILE",
        env = PROFILE_ENV,
        default_value = DEFAULT_PROFILE,
        help = "Issue using the role PROFILE",
        long_help = format!("\
Issue using the role PROFILE.

If not given, the value of `{}` is used.  If that is not set either, \
the role `{}` is used.",
            PROFILE_ENV, DEFAULT_PROFILE),
    )]
    pub profile: String,

    #[clap(
        long = "ttl",
        value_name = "DURATION",
        allow_hyphen_values = true,
        default_value = DEFAULT_TTL,
        help = "Request a certificate valid for DURATION",
        long_help = "\
Request a certificate valid for DURATION.

DURATION is a sequence of numbers with units, e.g. `24h` or `90d`.  \
Supported units include `s`, `m`, `h`, `d`, and `w`.  The authority \
may refuse a validity period longer than the role permits.",
    )]
    pub ttl: String,

    #[clap(
        long = "alt",
        value_name = "NAMES",
        default_value = "",
        hide_default_value = true,
        help = "Add the comma-separated DNS NAMES as alternative names",
    )]
    pub alt: String,

    #[clap(
        long = "ips",
        value_name = "ADDRESSES",
        default_value = "",
        hide_default_value = true,
        help = "Add the comma-separated IP ADDRESSES as alternative names",
    )]
    pub ips: String,

    #[clap(
        long = "org",
        value_name = "ORGS",
        default_value = "",
        hide_default_value = true,
        help = "Set the subject's organization and organizational unit to ORGS",
        long_help = "\
Set the subject's organization and organizational unit to ORGS.

ORGS is a comma-separated list.  The same list is used for both \
fields.",
    )]
    pub org: String,

    #[clap(
        long = "csr",
        value_name = "FILE",
        help = "Sign the certificate signing request in FILE",
        long_help = "\
Sign the certificate signing request in FILE.

Instead of having the authority generate a new key, submit the \
certificate signing request in FILE for signing.  Only the \
certificate is written.",
    )]
    pub csr: Option<PathBuf>,

    #[clap(
        short = 'k',
        long = "insecure",
        help = "Don't verify the authority's TLS certificate",
        long_help = "\
Don't verify the authority's TLS certificate.

This makes the connection to the authority vulnerable to \
interception.  Only use this for testing.",
    )]
    pub insecure: bool,

    #[clap(
        short = 'v',
        long,
        help = "Be more verbose",
    )]
    pub verbose: bool,

    #[clap(
        short = 'q',
        long = "quiet",
        help = "Be more quiet",
        conflicts_with = "verbose",
    )]
    pub quiet: bool,
}
