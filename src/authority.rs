//! The PKI authority.
//!
//! The authority is a Vault PKI secrets engine.  We talk to it using
//! its HTTP API: a JSON request is posted to
//! `<address>/v1/<mount>/<operation>/<role>`, and the result is
//! returned in the `data` member of the response.

use std::fmt;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::{
    common::request::CertificateRequestSpec,
    config::Token,
};

/// User agent for http communications.
pub const USER_AGENT: &str = concat!("vpki/", env!("CARGO_PKG_VERSION"));

/// The header carrying the token.
pub const TOKEN_HEADER: &str = "X-Vault-Token";

/// The label of PEM-encoded certificate signing requests.
const CSR_LABEL: &str = "CERTIFICATE REQUEST";

/// Everything needed to talk to the authority.
#[derive(Debug, Clone)]
pub struct IssuanceConfig {
    /// Where the PKI secrets engine is mounted, e.g. `pki` or
    /// `pki/intermediate`.
    pub mount: String,

    /// The role to issue the certificate under.
    pub role: String,

    /// The authority's base address.
    pub address: Url,

    /// Authenticates us to the authority.
    pub token: Token,

    /// The requested validity period.
    pub ttl: Duration,

    /// Whether to skip verifying the authority's TLS certificate.
    pub insecure: bool,
}

/// The configuration of the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    user_agent: &'static str,
    verify_certificates: bool,
}

impl Transport {
    /// Returns the transport configuration.
    ///
    /// The authority's certificate is verified unless `insecure` is
    /// set.
    pub fn new(insecure: bool) -> Self {
        Transport {
            user_agent: USER_AGENT,
            verify_certificates: ! insecure,
        }
    }

    /// Returns whether the authority's TLS certificate is verified.
    pub fn verifies_certificates(&self) -> bool {
        self.verify_certificates
    }

    /// Makes a http client.
    pub fn build(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent)
            .danger_accept_invalid_certs(! self.verify_certificates)
            .build()
    }
}

/// Errors returned by the authority, or while talking to it.
#[derive(thiserror::Error, Debug)]
pub enum SigningError {
    /// The request did not make it to the authority, or the response
    /// could not be read.
    #[error("Talking to the authority at {0} failed")]
    Transport(Url, #[source] reqwest::Error),

    /// The authority refused the request.
    #[error("{}", rejection(.status, .messages))]
    Rejected {
        status: StatusCode,
        messages: Vec<String>,
    },

    /// The authority's response lacks an artifact.
    #[error("The authority's response does not contain the {0}")]
    MissingArtifact(&'static str),
}

impl SigningError {
    /// Returns whether this is a local I/O problem, as opposed to the
    /// authority rejecting the request.
    pub fn is_client_side(&self) -> bool {
        matches!(self, SigningError::Transport(..))
    }
}

fn rejection(status: &StatusCode, messages: &[String]) -> String {
    let what = match *status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN =>
            "The authority rejected the token",
        s if s.is_server_error() =>
            "The authority failed to process the request",
        _ => "The authority rejected the request",
    };

    if messages.is_empty() {
        format!("{} ({})", what, status)
    } else {
        format!("{} ({}): {}", what, status, messages.join("; "))
    }
}

/// What the authority issued.
#[derive(Clone, PartialEq, Eq)]
pub enum IssuanceResult {
    /// A certificate for a signing request.
    Signed {
        certificate: Vec<u8>,
    },

    /// A certificate and its newly generated private key.
    Generated {
        certificate: Vec<u8>,
        private_key: Vec<u8>,
    },
}

impl fmt::Debug for IssuanceResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IssuanceResult::Signed { certificate } =>
                f.debug_struct("Signed")
                .field("certificate", &String::from_utf8_lossy(certificate))
                .finish(),
            IssuanceResult::Generated { certificate, .. } =>
                f.debug_struct("Generated")
                .field("certificate", &String::from_utf8_lossy(certificate))
                .field("private_key", &"<redacted>")
                .finish(),
        }
    }
}

impl IssuanceResult {
    /// Returns the certificate.
    pub fn certificate(&self) -> &[u8] {
        match self {
            IssuanceResult::Signed { certificate } => certificate.as_slice(),
            IssuanceResult::Generated { certificate, .. } =>
                certificate.as_slice(),
        }
    }

    /// Returns the private key, if one was generated.
    pub fn private_key(&self) -> Option<&[u8]> {
        match self {
            IssuanceResult::Signed { .. } => None,
            IssuanceResult::Generated { private_key, .. } =>
                Some(private_key.as_slice()),
        }
    }
}

/// The authority's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// What was issued.
    pub result: IssuanceResult,

    /// Warnings the authority attached to the response.
    pub warnings: Vec<String>,
}

/// Body of a request to sign a certificate signing request.
#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    csr: &'a str,
    common_name: &'a str,
    ttl: String,
    format: &'static str,
}

/// Body of a request to issue a new certificate.
#[derive(Debug, Serialize)]
struct IssueRequest<'a> {
    common_name: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    alt_names: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    ip_sans: String,
    ttl: String,
    format: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    organization: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    ou: String,
}

impl<'a> IssueRequest<'a> {
    fn new(spec: &'a CertificateRequestSpec, ttl: Duration) -> Self {
        IssueRequest {
            common_name: spec.common_name(),
            alt_names: spec.dns_names().join(","),
            ip_sans: spec.ip_addresses().iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(","),
            ttl: format_ttl(ttl),
            format: "pem",
            organization: spec.organization().join(","),
            ou: spec.organizational_unit().join(","),
        }
    }
}

/// A successful response.
#[derive(Debug, Default, Deserialize)]
struct Secret {
    #[serde(default)]
    data: Option<SecretData>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SecretData {
    #[serde(default)]
    certificate: Option<String>,
    #[serde(default)]
    private_key: Option<String>,
}

/// An error response.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Formats a validity period for the authority.
fn format_ttl(ttl: Duration) -> String {
    format!("{}s", ttl.as_secs())
}

/// Returns the signing request in PEM encoding.
///
/// Textual requests are passed through as is; anything else is
/// assumed to be DER encoded.
fn csr_to_pem(csr: &[u8]) -> String {
    match std::str::from_utf8(csr) {
        Ok(s) if s.contains("-----BEGIN") => s.to_string(),
        _ => pem::encode(&pem::Pem::new(CSR_LABEL, csr)),
    }
}

/// An authenticated handle to the authority.
pub struct Client {
    config: IssuanceConfig,
    transport: Transport,
    http: reqwest::Client,
}

impl Client {
    /// Returns a client for the configured authority.
    pub fn new(config: IssuanceConfig) -> reqwest::Result<Self> {
        let transport = Transport::new(config.insecure);
        let http = transport.build()?;
        Ok(Client {
            config,
            transport,
            http,
        })
    }

    /// Returns the transport configuration.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Returns the configuration.
    pub fn config(&self) -> &IssuanceConfig {
        &self.config
    }

    /// Returns the url of `operation` for the configured role.
    pub fn endpoint(&self, operation: &str) -> Url {
        let mut url = self.config.address.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("v1");
            segments.extend(
                self.config.mount.split('/').filter(|s| ! s.is_empty()));
            segments.push(operation).push(&self.config.role);
        }
        url
    }

    /// Has the authority sign a certificate signing request.
    ///
    /// `csr` may be PEM or DER encoded; it is not otherwise examined.
    pub async fn sign(&self, csr: &[u8], common_name: &str, ttl: Duration)
                      -> Result<Response, SigningError>
    {
        let csr = csr_to_pem(csr);
        let body = SignRequest {
            csr: &csr,
            common_name,
            ttl: format_ttl(ttl),
            format: "pem",
        };

        let (data, warnings) = self.post(self.endpoint("sign"), &body).await?;
        let certificate = data.certificate
            .ok_or(SigningError::MissingArtifact("certificate"))?;

        Ok(Response {
            result: IssuanceResult::Signed {
                certificate: certificate.into_bytes(),
            },
            warnings,
        })
    }

    /// Has the authority generate a new key, and issue a certificate
    /// for it.
    pub async fn generate(&self, spec: &CertificateRequestSpec)
                          -> Result<Response, SigningError>
    {
        let body = IssueRequest::new(spec, self.config.ttl);

        let (data, warnings) = self.post(self.endpoint("issue"), &body).await?;
        let certificate = data.certificate
            .ok_or(SigningError::MissingArtifact("certificate"))?;
        let private_key = data.private_key
            .ok_or(SigningError::MissingArtifact("private key"))?;

        Ok(Response {
            result: IssuanceResult::Generated {
                certificate: certificate.into_bytes(),
                private_key: private_key.into_bytes(),
            },
            warnings,
        })
    }

    /// Posts `body` to `url`, and returns the response's data and
    /// warnings.
    async fn post<B>(&self, url: Url, body: &B)
                     -> Result<(SecretData, Vec<String>), SigningError>
    where
        B: Serialize,
    {
        let e = |err| SigningError::Transport(url.clone(), err);

        let response = self.http.post(url.clone())
            .header(TOKEN_HEADER, self.config.token.expose())
            .json(body)
            .send()
            .await
            .map_err(e)?;

        let status = response.status();
        if ! status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let messages = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(r) => r.errors,
                Err(_) if body.trim().is_empty() => Vec::new(),
                Err(_) => vec![body.trim().to_string()],
            };
            return Err(SigningError::Rejected { status, messages });
        }

        let secret: Secret = response.json().await.map_err(e)?;
        Ok((secret.data.unwrap_or_default(),
            secret.warnings.unwrap_or_default()))
    }
}
