//! Client for the remote allocation optimizer.
//!
//! One call runs validate, send, await, normalize in a straight line. Every
//! failure comes back as an [`AllocationError`] whose kind tells the caller
//! what went wrong; nothing is retried here.

pub mod error;
pub mod normalize;
pub mod payload;
pub mod wire;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::types::{AllocationResult, CandidateFacility, Patient};

pub use error::{AllocationError, ErrorKind, ValidationError};
pub use normalize::adapt_optimization_response;
pub use payload::build_payload;
pub use wire::{OutboundPayload, RawOptimizationResponse};

pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
const BODY_PREVIEW_CHARS: usize = 180;

#[derive(Debug, Clone)]
pub struct AllocationAdapter {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl AllocationAdapter {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        let endpoint = endpoint.into();
        info!("optimizer endpoint configured: {endpoint}");
        Ok(Self {
            endpoint,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            client,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(config.resolved_endpoint(), &config.user_agent)?
            .with_timeout(Duration::from_millis(config.timeout_ms)))
    }

    /// Deadline for the whole exchange, from sending the request to reading
    /// the last byte of the reply. Shorter deadlines are honoured; anything
    /// above 8000 ms is capped.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(Duration::from_millis(DEFAULT_TIMEOUT_MS));
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Asks the optimizer for the best facility for `patient` among
    /// `candidates`. Coordinates are validated before anything is sent.
    pub async fn find_best_allocation(
        &self,
        patient: &Patient,
        candidates: &[CandidateFacility],
    ) -> Result<AllocationResult, AllocationError> {
        let outcome = self.allocate(patient, candidates).await;
        if let Err(error) = &outcome {
            warn!("allocation for {} failed ({}): {error}", patient.name, error.kind());
        }
        outcome
    }

    async fn allocate(
        &self,
        patient: &Patient,
        candidates: &[CandidateFacility],
    ) -> Result<AllocationResult, AllocationError> {
        let payload = build_payload(patient, candidates)?;
        info!(
            "requesting allocation for {} across {} facilities",
            patient.name,
            payload.facilities.len()
        );

        let (status, body) = self.exchange(&payload).await?;
        if !status.is_success() {
            return Err(AllocationError::Service {
                status: status.as_u16(),
                body_preview: body.chars().take(BODY_PREVIEW_CHARS).collect(),
            });
        }

        let raw: RawOptimizationResponse = serde_json::from_str(&body)
            .map_err(|e| AllocationError::MalformedResponse(e.to_string()))?;
        if !raw.success {
            return Err(AllocationError::optimization_failed(raw.message));
        }
        debug!(
            "optimizer answered with {} alternatives",
            raw.alternatives.as_ref().map_or(0, Vec::len)
        );

        adapt_optimization_response(&raw, patient)
    }

    /// Sends the payload and reads the reply under the deadline. When the
    /// timer wins, the request future is dropped, which closes its connection,
    /// so a late reply is never looked at.
    async fn exchange(
        &self,
        payload: &OutboundPayload,
    ) -> Result<(StatusCode, String), AllocationError> {
        let call = async {
            let response = self.client.post(&self.endpoint).json(payload).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(error)) => Err(self.classify(error)),
            Err(_elapsed) => Err(self.timeout_error()),
        }
    }

    fn classify(&self, error: reqwest::Error) -> AllocationError {
        if error.is_timeout() {
            self.timeout_error()
        } else {
            AllocationError::Connectivity(error.to_string())
        }
    }

    fn timeout_error(&self) -> AllocationError {
        AllocationError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}
