//! Requests a certificate, and saves it.

use std::path::Path;

use crate::{
    Error,
    Result,
    Vpki,
    authority::{Client, IssuanceResult, Response},
    common::file::{Artifact, WritePolicy, write_artifacts},
    common::request::{CertificateRequestSpec, build_request},
    config::Config,
};

/// What to ask the authority for.
#[derive(Debug)]
enum Mode {
    /// Sign an existing certificate signing request.
    Sign {
        csr: Vec<u8>,
    },

    /// Generate a new key and certificate.
    Generate {
        spec: CertificateRequestSpec,
    },
}

pub fn dispatch(vpki: Vpki) -> Result<()> {
    let mode = prepare(&vpki)?;

    let client = Client::new(vpki.config.issuance.clone())
        .map_err(Error::Transport)?;
    if ! client.transport().verifies_certificates() {
        vpki.warn(format_args!(
            "Not verifying the authority's certificate.  The connection \
             to {} may be intercepted.",
            vpki.config.issuance.address));
    }

    let response = issue(&vpki, &client, &mode)?;
    for warning in &response.warnings {
        vpki.info(format_args!("The authority warns: {}", warning));
    }

    let (artifacts, policy) = artifacts(&vpki.config, &response.result);
    write_artifacts(&artifacts, policy)?;
    for a in &artifacts {
        vpki.info(format_args!("Wrote {}", a.path.display()));
    }

    Ok(())
}

/// Validates the input, and assembles the request.
///
/// This doesn't talk to the authority.
fn prepare(vpki: &Vpki) -> Result<Mode> {
    let config = &vpki.config;

    if let Some(path) = &config.csr {
        if config.common_name.is_empty() {
            return Err(Error::EmptyCommonName);
        }
        return Ok(Mode::Sign {
            csr: read_csr(path)?,
        });
    }

    let (spec, unparsed) = build_request(
        &config.common_name, &config.alt_names,
        &config.ip_addresses, &config.organization)?;
    for a in unparsed {
        vpki.warn(format_args!(
            "{:?} is not an IP address, requesting {} instead",
            a.0, std::net::Ipv4Addr::UNSPECIFIED));
    }

    Ok(Mode::Generate {
        spec,
    })
}

/// Reads a certificate signing request.
fn read_csr(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| Error::SigningRequest(path.to_path_buf(), err))
}

/// Performs the one request to the authority.
fn issue(vpki: &Vpki, client: &Client, mode: &Mode) -> Result<Response> {
    let config = client.config();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;

    let response = match mode {
        Mode::Sign { csr } => {
            vpki.info(format_args!(
                "Requesting a signature for {} from {}",
                vpki.config.common_name, client.endpoint("sign")));
            rt.block_on(client.sign(csr, &vpki.config.common_name,
                                    config.ttl))?
        }
        Mode::Generate { spec } => {
            vpki.info(format_args!(
                "Requesting a key and certificate for {} from {}",
                spec.common_name(), client.endpoint("issue")));
            rt.block_on(client.generate(spec))?
        }
    };

    Ok(response)
}

/// Maps what the authority issued to the files to write.
///
/// A signed certificate is appended to the certificate file.  A
/// generated certificate and key replace the certificate and key
/// files.
fn artifacts<'a>(config: &Config, result: &'a IssuanceResult)
                 -> (Vec<Artifact<'a>>, WritePolicy)
{
    let certificate =
        Artifact::certificate(config.certificate_file(), result.certificate());
    match result.private_key() {
        None => (vec![certificate], WritePolicy::Append),
        Some(key) => (
            vec![
                certificate,
                Artifact::private_key(config.key_file(), key),
            ],
            WritePolicy::Replace,
        ),
    }
}
