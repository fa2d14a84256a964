//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::interval::Interval;

/// Base endpoint of the call-analytics job API
pub const DEFAULT_BASE_URL: &str = "https://api.sarvam.ai/call-analytics";

/// Default speaker count when diarization is enabled
pub const DEFAULT_NUM_SPEAKERS: u32 = 2;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub poll_interval: Option<String>,
    pub request_timeout: Option<String>,
    pub status_retries: Option<u32>,
    pub diarization: Option<bool>,
    pub speakers: Option<u32>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            poll_interval: Some("10s".to_string()),
            request_timeout: Some("30s".to_string()),
            status_retries: Some(0),
            diarization: Some(false),
            speakers: Some(DEFAULT_NUM_SPEAKERS),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            base_url: other.base_url.or(self.base_url),
            poll_interval: other.poll_interval.or(self.poll_interval),
            request_timeout: other.request_timeout.or(self.request_timeout),
            status_retries: other.status_retries.or(self.status_retries),
            diarization: other.diarization.or(self.diarization),
            speakers: other.speakers.or(self.speakers),
        }
    }

    /// Get base URL, or the public endpoint if not set
    pub fn base_url_or_default(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Get poll interval as parsed Interval, or default if not set/invalid
    pub fn poll_interval_or_default(&self) -> Interval {
        self.poll_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Interval::default_poll_interval)
    }

    /// Get request timeout as parsed Interval, or default if not set/invalid
    pub fn request_timeout_or_default(&self) -> Interval {
        self.request_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Interval::default_request_timeout)
    }

    /// Get tolerated consecutive status-fetch failures, or 0 if not set
    pub fn status_retries_or_default(&self) -> u32 {
        self.status_retries.unwrap_or(0)
    }

    /// Get diarization setting, or false if not set
    pub fn diarization_or_default(&self) -> bool {
        self.diarization.unwrap_or(false)
    }

    /// Get speaker count, or 2 if not set
    pub fn speakers_or_default(&self) -> u32 {
        self.speakers.unwrap_or(DEFAULT_NUM_SPEAKERS)
    }
}
