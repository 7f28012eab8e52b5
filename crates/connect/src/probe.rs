use async_trait::async_trait;
use log::debug;
use std::time::Duration;

use mesfactures_core::connectivity::ReachabilityProbe;

/// Default timeout of one reachability check.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Considers the backend reachable when any HTTP response comes back.
///
/// Status codes are ignored: a 404 or 401 still proves the network path works.
pub struct HttpReachabilityProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpReachabilityProbe {
    pub fn new(url: &str) -> crate::Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> crate::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ReachabilityProbe for HttpReachabilityProbe {
    async fn is_reachable(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Backend unreachable at {}: {}", self.url, e);
                false
            }
        }
    }
}
