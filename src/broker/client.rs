use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::endpoint::BrokerEndpoint;
use super::retry::{Attempt, RetryError, RetryPolicy};

/// Anything that can report how many messages are waiting on a queue
#[async_trait]
pub trait QueueDepthSource: Send + Sync {
    async fn queue_depth(&self, queue: &str) -> Result<u64, BrokerError>;
}

/// Client for the broker's management API
#[derive(Debug, Clone)]
pub struct BrokerClient {
    http_client: reqwest::Client,
    endpoint: BrokerEndpoint,
    retry: RetryPolicy,
}

/// The part of the management API's queue info we read
#[derive(Debug, Deserialize)]
struct QueueInfo {
    messages_ready: u64,
}

impl BrokerClient {
    pub fn new(endpoint: BrokerEndpoint) -> Result<Self, BrokerError> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: BrokerEndpoint, timeout: Duration) -> Result<Self, BrokerError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &BrokerEndpoint {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch the number of ready messages on `queue`.
    ///
    /// 503 and 504 are retried per the retry policy. Any other non-200 status,
    /// a malformed body or a transport failure fails the call at once.
    pub async fn get_queue_depth(&self, queue: &str) -> Result<u64, BrokerError> {
        let url = self
            .endpoint
            .queue_url(queue)
            .map_err(|e| BrokerError::InvalidUrl {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?
            .to_string();

        let target = url.as_str();
        let result = self
            .retry
            .run(move |attempt| self.fetch_once(target, attempt))
            .await;

        match result {
            Ok(depth) => Ok(depth),
            Err(RetryError::Fatal(e)) => Err(e),
            Err(RetryError::Exhausted { attempts }) => {
                tracing::error!(
                    url = %url,
                    attempts,
                    "Could not succeed after {} attempts, giving up",
                    attempts
                );
                Err(BrokerError::RetryExhausted { url, attempts })
            }
        }
    }

    /// One request against the management API
    async fn fetch_once(&self, url: &str, attempt: u32) -> Attempt<u64, BrokerError> {
        tracing::debug!(url = %url, attempt, "Requesting queue info");

        let credentials = self.endpoint.credentials();
        let response = match self
            .http_client
            .get(url)
            .basic_auth(&credentials.username, credentials.password.as_ref())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Fatal(BrokerError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return match response.json::<QueueInfo>().await {
                Ok(info) => Attempt::Done(info.messages_ready),
                Err(e) => Attempt::Fatal(BrokerError::MalformedBody {
                    url: url.to_string(),
                    reason: e.to_string(),
                }),
            };
        }

        if is_transient(status) {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                attempt,
                "RabbitMQ is not available at the moment, retrying in {:?}",
                self.retry.backoff
            );
            return Attempt::Transient;
        }

        let body = crate::response::error_body(response).await;
        tracing::error!(
            url = %url,
            status = status.as_u16(),
            body = %body,
            "RabbitMQ rejected the request"
        );
        Attempt::Fatal(BrokerError::Rejected {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl QueueDepthSource for BrokerClient {
    async fn queue_depth(&self, queue: &str) -> Result<u64, BrokerError> {
        self.get_queue_depth(queue).await
    }
}

/// Statuses the broker returns while restarting or under maintenance
fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Could not contact RabbitMQ at {url}, exhausted retries after {attempts} attempts")]
    RetryExhausted { url: String, attempts: u32 },

    #[error("RabbitMQ at {url} returned {status}: {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Could not read queue info from {url}: {reason}")]
    MalformedBody { url: String, reason: String },

    #[error("Network error contacting {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Could not build management URL for queue {queue}: {reason}")]
    InvalidUrl { queue: String, reason: String },

    #[error("Could not create HTTP client: {0}")]
    Client(String),
}
