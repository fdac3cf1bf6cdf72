use crate::app::ports::FetcherPort;
use crate::error::{Result, ScraperError};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Blocking HTTP GET with a per-request timeout.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("partner_events/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FetcherPort for ReqwestFetcher {
    #[instrument(skip(self))]
    fn fetch_json(&self, url: &str) -> Result<Value> {
        info!("Fetching data from {}", url);
        let t0 = Instant::now();
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes()?;
        debug!(
            "Received {} bytes in {:.2}s",
            bytes.len(),
            t0.elapsed().as_secs_f64()
        );
        Ok(serde_json::from_slice(&bytes)?)
    }
}
