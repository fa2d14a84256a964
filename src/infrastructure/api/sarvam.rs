//! Sarvam call-analytics job API adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{JobApi, JobInitError, JobStartError, StatusFetchError};
use crate::domain::analytics::{JobHandle, JobParameters, JobStatus};
use crate::domain::config::DEFAULT_BASE_URL;
use crate::domain::interval::Interval;

/// Header carrying the static API key on every call
const API_KEY_HEADER: &str = "API-Subscription-Key";

// Request/response types for the job API

#[derive(Debug, Deserialize)]
struct InitResponse {
    job_id: String,
    input_storage_path: String,
    output_storage_path: String,
}

#[derive(Debug, Serialize)]
struct StartJobRequest<'a> {
    job_id: &'a str,
    job_parameters: WireJobParameters<'a>,
}

#[derive(Debug, Serialize)]
struct WireJobParameters<'a> {
    model: &'a str,
    with_diarization: bool,
    num_speakers: u32,
    questions: Vec<WireQuestion<'a>>,
}

#[derive(Debug, Serialize)]
struct WireQuestion<'a> {
    id: &'a str,
    text: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    job_state: String,
}

/// Job API client for the Sarvam call-analytics endpoint.
///
/// Success codes follow the remote contract exactly: init is accepted
/// with 202, start and status with 200; anything else is surfaced with
/// the raw response body.
pub struct SarvamJobApi {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SarvamJobApi {
    /// Create a client against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL,
            Interval::default_request_timeout(),
        )
    }

    /// Create a client with a custom base URL and per-request timeout
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Interval,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: timeout.as_std(),
            client: reqwest::Client::new(),
        }
    }

    fn init_url(&self) -> String {
        format!("{}/job/init", self.base_url)
    }

    fn start_url(&self) -> String {
        format!("{}/job", self.base_url)
    }

    fn status_url(&self, job_id: &str) -> String {
        format!("{}/job/{}/status", self.base_url, job_id)
    }

    fn build_start_request<'a>(job_id: &'a str, params: &'a JobParameters) -> StartJobRequest<'a> {
        StartJobRequest {
            job_id,
            job_parameters: WireJobParameters {
                model: params.model,
                with_diarization: params.with_diarization,
                num_speakers: params.num_speakers,
                questions: params
                    .questions
                    .iter()
                    .map(|q| WireQuestion {
                        id: &q.id,
                        text: &q.text,
                        kind: q.kind.as_str(),
                        description: q.description.as_deref().unwrap_or(""),
                    })
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl JobApi for SarvamJobApi {
    async fn init(&self) -> Result<JobHandle, JobInitError> {
        let response = self
            .client
            .post(self.init_url())
            .timeout(self.timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| JobInitError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(JobInitError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let init: InitResponse = response
            .json()
            .await
            .map_err(|e| JobInitError::ParseError(e.to_string()))?;

        Ok(JobHandle::new(
            init.job_id,
            init.input_storage_path,
            init.output_storage_path,
        ))
    }

    async fn start(&self, job_id: &str, params: &JobParameters) -> Result<(), JobStartError> {
        let body = Self::build_start_request(job_id, params);

        let response = self
            .client
            .post(self.start_url())
            .timeout(self.timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| JobStartError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(JobStartError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, StatusFetchError> {
        let response = self
            .client
            .get(self.status_url(job_id))
            .timeout(self.timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| StatusFetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusFetchError::Unexpected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StatusResponse = response
            .json()
            .await
            .map_err(|e| StatusFetchError::ParseError(e.to_string()))?;

        Ok(JobStatus::new(parsed.job_state))
    }
}
