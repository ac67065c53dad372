#![doc = include_str!("../README.md")]

use clap::FromArgMatches;

#[macro_use] mod macros;

mod authority;
mod cli;
mod commands;
mod common;
mod config;
mod error;
pub use error::{Error, Result};
pub mod output;
use output::print_error_chain;

mod vpki;
use vpki::Vpki;

fn main() {
    let matches = cli::build().get_matches();
    let c = match cli::VpkiCommand::from_arg_matches(&matches) {
        Ok(c) => c,
        Err(err) => err.exit(),
    };
    let profile_source = matches.value_source("profile");

    if let Err(err) = real_main(c, profile_source) {
        let code = err.exit_code();
        let stage = err.stage();
        let hint = match &err {
            Error::Authority(e) if e.is_client_side() => Some(format!(
                "Check that {} points to the authority, and that it is \
                 reachable.", cli::ADDRESS_ENV)),
            _ => None,
        };

        print_error_chain(&anyhow::Error::from(err).context(stage.failure()));
        if let Some(hint) = hint {
            weprintln!(initial_indent = "Hint: ", "{}", hint);
        }
        std::process::exit(code);
    }
}

fn real_main(c: cli::VpkiCommand,
             profile_source: Option<clap::parser::ValueSource>)
             -> Result<()>
{
    let config = config::Config::new(
        &c, profile_source, config::Environment::from_process())?;
    let vpki = Vpki::new(config);
    vpki.info(format_args!(
        "Using the role {:?} of the PKI engine mounted at {:?}",
        vpki.config.issuance.role, vpki.config.issuance.mount));

    commands::dispatch(vpki)
}
