//! Reachability probe for the application under test

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{VerifyError, VerifyResult};

/// Polls the application's base URL until it answers
pub struct AppProbe {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl AppProbe {
    pub fn new(url: impl Into<String>) -> VerifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            interval: Duration::from_millis(250),
        })
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Any HTTP response counts as reachable; only transport errors retry
    pub async fn wait_until_reachable(&self, timeout: Duration) -> VerifyResult<u16> {
        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.client.get(&self.url).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if !resp.status().is_success() {
                        warn!("{} answered with {}", self.url, status);
                    }
                    info!("Application reachable at {} ({})", self.url, status);
                    return Ok(status);
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} ...", self.url);
                    }
                    // Connection refused is expected while the dev server starts
                    if !e.is_connect() {
                        warn!("Probe error: {}", e);
                    }
                }
            }

            if start.elapsed() + self.interval > timeout {
                break;
            }
            sleep(self.interval).await;
        }

        Err(VerifyError::Unreachable {
            url: self.url.clone(),
            attempts,
        })
    }
}
