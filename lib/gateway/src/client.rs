//! reqwest-based implementation of the workflow backend.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use deal_desk_core::{Result, RunId};
use deal_desk_workflow::{
    BackendError, CreateRunRequest, SaveStepRequest, SiteCredential, StepId, WorkflowBackend,
    WorkflowRun,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use std::fmt;
use tracing::{debug, instrument, warn};

const WORKFLOW: &str = "workflow";
const RUNS: &str = "runs";

/// HTTP client for the investigation backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute URL that can carry
    /// a path, if the timeout is zero, or if the underlying HTTP client cannot
    /// be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| BackendError::InvalidEndpoint {
                reason: format!("'{}': {e}", config.base_url),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidEndpoint {
                reason: format!("'{}' cannot be used as a base URL", config.base_url),
            }
            .into());
        }

        if config.timeout_seconds == 0 {
            return Err(BackendError::InvalidEndpoint {
                reason: "timeout_seconds must be greater than zero".to_string(),
            }
            .into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Transport {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| BackendError::InvalidEndpoint {
                    reason: "base URL cannot carry a path".to_string(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(segments)?;
        let mut builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let request = builder.build().map_err(|e| BackendError::Transport {
            reason: e.to_string(),
        })?;
        debug!(method = %request.method(), url = %request.url(), "sending backend request");

        let response =
            self.client
                .execute(request)
                .await
                .map_err(|e| BackendError::Transport {
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "failed to read error response body");
                    String::new()
                }
            };
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let bytes = response.bytes().await.map_err(|e| BackendError::Transport {
            reason: e.to_string(),
        })?;
        let value = serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode {
            reason: e.to_string(),
        })?;
        Ok(value)
    }

    async fn run_request(&self, builder: RequestBuilder) -> Result<WorkflowRun, BackendError> {
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(BackendError::Decode {
                reason: "expected a run but the response was empty".to_string(),
            }
            .into());
        }
        Self::decode(response).await
    }
}

#[async_trait]
impl WorkflowBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_runs(&self) -> Result<Vec<WorkflowRun>, BackendError> {
        let builder = self.request(Method::GET, &[WORKFLOW, RUNS])?;
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let listed: Vec<JsonValue> = Self::decode(response).await?;
        let runs = listed
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                match serde_json::from_value::<WorkflowRun>(value) {
                    Ok(run) => Some(run),
                    Err(e) => {
                        warn!(index, error = %e, "skipping undecodable run in listing");
                        None
                    }
                }
            })
            .collect();
        Ok(runs)
    }

    #[instrument(skip(self, request), fields(label = %request.label))]
    async fn create_run(
        &self,
        request: &CreateRunRequest,
    ) -> Result<WorkflowRun, BackendError> {
        let builder = self.request(Method::POST, &[WORKFLOW, RUNS])?.json(request);
        self.run_request(builder).await
    }

    #[instrument(skip(self), fields(%run_id))]
    async fn fetch_run(&self, run_id: &RunId) -> Result<WorkflowRun, BackendError> {
        let builder = self.request(Method::GET, &[WORKFLOW, RUNS, run_id.as_str()])?;
        self.run_request(builder).await
    }

    #[instrument(skip(self, request), fields(%run_id, %step_id))]
    async fn save_step(
        &self,
        run_id: &RunId,
        step_id: StepId,
        request: &SaveStepRequest,
    ) -> Result<WorkflowRun, BackendError> {
        let builder = self
            .request(
                Method::PUT,
                &[WORKFLOW, RUNS, run_id.as_str(), "steps", step_id.as_str()],
            )?
            .json(request);
        self.run_request(builder).await
    }

    #[instrument(skip(self), fields(%run_id, %step_id))]
    async fn run_step(
        &self,
        run_id: &RunId,
        step_id: StepId,
    ) -> Result<WorkflowRun, BackendError> {
        let builder = self.request(
            Method::POST,
            &[WORKFLOW, RUNS, run_id.as_str(), "run_step", step_id.as_str()],
        )?;
        self.run_request(builder).await
    }

    #[instrument(skip(self, credential))]
    async fn save_credentials(
        &self,
        site: &str,
        credential: &SiteCredential,
    ) -> Result<(), BackendError> {
        let builder = self
            .request(Method::POST, &[WORKFLOW, "credentials", site])?
            .json(credential);
        self.send(builder).await?;
        Ok(())
    }
}
