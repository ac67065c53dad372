//! Builds certificate requests from user input.

use std::net::{IpAddr, Ipv4Addr};

use crate::{
    Error,
    Result,
};

/// A description of the certificate to request.
///
/// This is not a PKCS#10 request: the authority generates the key
/// and the request.  This merely names the subject and the subject
/// alternative names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequestSpec {
    common_name: String,
    dns_names: Vec<String>,
    ip_addresses: Vec<IpAddr>,
    organization: Vec<String>,
    organizational_unit: Vec<String>,
}

impl CertificateRequestSpec {
    /// Returns the subject's common name.
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// Returns the DNS subject alternative names.
    ///
    /// The common name is always included.
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    /// Returns the IP subject alternative names.
    pub fn ip_addresses(&self) -> &[IpAddr] {
        &self.ip_addresses
    }

    /// Returns the subject's organizations.
    pub fn organization(&self) -> &[String] {
        &self.organization
    }

    /// Returns the subject's organizational units.
    pub fn organizational_unit(&self) -> &[String] {
        &self.organizational_unit
    }
}

/// An IP address that could not be parsed.
///
/// It has been replaced by the unspecified address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedAddress(pub String);

/// Splits a comma-separated list.
///
/// An empty string is the empty list.  Otherwise, every token is
/// kept verbatim, including empty ones.
fn split_csv(csv: &str) -> Vec<String> {
    if csv.is_empty() {
        Vec::new()
    } else {
        csv.split(',').map(Into::into).collect()
    }
}

/// Builds a request description.
///
/// `alt_names`, `ip_addresses`, and `organization` are
/// comma-separated lists.  The common name is appended to the
/// alternative names; duplicates are kept.
///
/// Tokens in `ip_addresses` that are not IP addresses are replaced by
/// the unspecified address `0.0.0.0`.  They are returned alongside
/// the request so that the caller can warn about them.
pub fn build_request(common_name: &str, alt_names: &str,
                     ip_addresses: &str, organization: &str)
                     -> Result<(CertificateRequestSpec, Vec<UnparsedAddress>)>
{
    if common_name.is_empty() {
        return Err(Error::EmptyCommonName);
    }

    let mut dns_names = split_csv(alt_names);
    dns_names.push(common_name.into());

    let mut unparsed = Vec::new();
    let ip_addresses = split_csv(ip_addresses).into_iter()
        .map(|a| a.parse::<IpAddr>().unwrap_or_else(|_| {
            unparsed.push(UnparsedAddress(a));
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        }))
        .collect();

    let organization = split_csv(organization);

    Ok((CertificateRequestSpec {
        common_name: common_name.into(),
        dns_names,
        ip_addresses,
        organizational_unit: organization.clone(),
        organization,
    }, unparsed))
}
