use anyhow::{Context, Result};
use reqwest::{blocking::Client, Url};
use retry::{delay::Fibonacci, retry_with_index, OperationResult};

use crate::{
    block::Block,
    config::{request_timeout::RequestTimeout, thread_delay::ThreadDelay},
};

use super::Oracle;

const RETRY_DELAY_MS: u64 = 100;
const RETRY_MAX_ATTEMPTS: u64 = 3;

/// Questions the reference `demo_api` (or any service exposing the same
/// `POST /validate` contract) over HTTP.
pub struct WebOracle {
    url: Url,
    client: Client,
    delay: ThreadDelay,
}

impl WebOracle {
    pub fn new(url: Url, timeout: RequestTimeout, delay: ThreadDelay) -> Result<Self> {
        let client = Client::builder()
            .timeout(*timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { url, client, delay })
    }
}

impl Oracle for WebOracle {
    fn ask(&self, prev: &Block, target: &Block) -> Result<bool> {
        std::thread::sleep(*self.delay);

        let mut body = prev.to_vec();
        body.extend_from_slice(target);
        let ciphertext_b64 = base64::encode(&body);

        let outcome = retry_with_index(Fibonacci::from_millis(RETRY_DELAY_MS), |attempt| {
            if attempt > RETRY_MAX_ATTEMPTS {
                return OperationResult::Err(anyhow::anyhow!(
                    "Exceeded {} retries questioning `{}`",
                    RETRY_MAX_ATTEMPTS,
                    self.url
                ));
            }

            match self
                .client
                .post(self.url.clone())
                .json(&serde_json::json!({ "ciphertext_b64": ciphertext_b64 }))
                .send()
            {
                Ok(response) => OperationResult::Ok(response.status().is_success()),
                Err(e) => OperationResult::Retry(anyhow::anyhow!(e)),
            }
        });

        outcome.map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}
