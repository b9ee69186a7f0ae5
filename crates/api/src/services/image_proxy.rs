use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use thiserror::Error;
use url::{Host, Url};

use crate::error::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// Host prefixes refused outright, whatever the host type.
const BLOCKED_PREFIXES: &[&str] = &["127.", "10.", "192.168.", "172."];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("No image URL specified.")]
    MissingUrl,

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("Only HTTPS image URLs are allowed.")]
    InsecureScheme,

    #[error("Local or private hosts are not allowed.")]
    PrivateHost,

    #[error("Domain is not allowed: {0}")]
    DomainNotAllowed(String),

    #[error("Failed to fetch image.")]
    Upstream(#[source] reqwest::Error),
}

impl From<ProxyError> for AppError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::MissingUrl | ProxyError::InvalidUrl(_) => AppError::BadRequest(e.to_string()),
            ProxyError::InsecureScheme
            | ProxyError::PrivateHost
            | ProxyError::DomainNotAllowed(_) => AppError::Forbidden(e.to_string()),
            ProxyError::Upstream(ref source) => {
                tracing::warn!("image proxy upstream failure: {source}");
                AppError::BadGateway(e.to_string())
            }
        }
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || BLOCKED_PREFIXES
            .iter()
            .any(|prefix| ip.to_string().starts_with(prefix))
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}

/// `host` is `domain` itself or one of its subdomains.
fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Accepts only HTTPS URLs on whitelisted, public hosts. Nothing is fetched here.
pub fn validate(raw: &str, allowed_domains: &[String]) -> Result<Url, ProxyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProxyError::MissingUrl);
    }
    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "https" {
        return Err(ProxyError::InsecureScheme);
    }

    let domain = match url.host() {
        None => return Err(ProxyError::InvalidUrl("missing host".into())),
        Some(Host::Ipv4(ip)) if is_private_v4(ip) => return Err(ProxyError::PrivateHost),
        Some(Host::Ipv6(ip)) if is_private_v6(ip) => return Err(ProxyError::PrivateHost),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            return Err(ProxyError::DomainNotAllowed(url.host_str().unwrap_or_default().into()))
        }
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_ascii_lowercase(),
    };

    if domain == "localhost"
        || domain.ends_with(".localhost")
        || BLOCKED_PREFIXES.iter().any(|prefix| domain.starts_with(prefix))
    {
        return Err(ProxyError::PrivateHost);
    }

    if !allowed_domains.iter().any(|allowed| matches_domain(&domain, allowed)) {
        return Err(ProxyError::DomainNotAllowed(domain));
    }

    Ok(url)
}

/// Outbound side of the image proxy.
#[derive(Clone)]
pub struct ImageProxy {
    client: reqwest::Client,
    allowed_domains: Vec<String>,
}

impl ImageProxy {
    pub fn new(allowed_domains: Vec<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            allowed_domains,
        })
    }

    pub fn validate(&self, raw: &str) -> Result<Url, ProxyError> {
        validate(raw, &self.allowed_domains)
    }

    pub async fn fetch(&self, url: Url) -> Result<reqwest::Response, ProxyError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(ProxyError::Upstream)
    }
}
