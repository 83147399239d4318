//! Synchronous HTTP retrieval over `ureq`.

use std::io::Read;
use std::time::Duration;

use courtsync_core::config::SyncConfig;

use crate::error::FetchError;
use crate::source::TableSource;

/// Hard upper bound on response bodies so a runaway upstream cannot exhaust
/// memory. Real ratings exports are a few hundred KiB.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// Plain GET against a single endpoint, with explicit timeout and payload
/// validation.
pub struct HttpSource {
    agent: ureq::Agent,
    url: String,
    min_payload_bytes: u64,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration, min_payload_bytes: u64) -> Self {
        let agent = ureq::builder().timeout(timeout).build();
        Self {
            agent,
            url: url.into(),
            min_payload_bytes,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.source_endpoint.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.min_payload_bytes,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TableSource for HttpSource {
    fn fetch_raw(&self) -> Result<Vec<u8>, FetchError> {
        log::debug!("GET {}", self.url);
        let response = self.agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(status, _) => FetchError::Status {
                status,
                url: self.url.clone(),
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: self.url.clone(),
                detail: transport.to_string(),
            },
        })?;

        let content_type = response.content_type().to_string();
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Transport {
                url: self.url.clone(),
                detail: e.to_string(),
            })?;

        validate_body(&body, &content_type, self.min_payload_bytes)?;
        log::info!("fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}

/// Reject bodies that cannot be real table data: HTML (an error or consent
/// page) and anything under the plausible minimum size.
fn validate_body(body: &[u8], content_type: &str, min_bytes: u64) -> Result<(), FetchError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    if essence.eq_ignore_ascii_case("text/html") {
        return Err(FetchError::ContentType {
            content_type: essence.to_string(),
        });
    }
    if (body.len() as u64) < min_bytes {
        return Err(FetchError::Undersized {
            got: body.len() as u64,
            min: min_bytes,
        });
    }
    Ok(())
}
