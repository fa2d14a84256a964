//! Azure Data Lake (ADLS Gen2) store adapter
//!
//! File uploads and downloads address paths under the bound directory,
//! while listing addresses the filesystem root with a directory prefix;
//! the service authorizes and routes those two shapes differently, so
//! the split is kept explicit here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::application::ports::{ObjectStore, StorageError, UploadOutcome};
use crate::domain::interval::Interval;
use crate::domain::storage::{NamedBlob, StorageLocation};

/// Continuation header returned by paged listings
const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Header carrying the content type applied when a file is flushed
const CONTENT_TYPE_HEADER: &str = "x-ms-content-type";

#[derive(Debug, Deserialize)]
struct PathList {
    #[serde(default)]
    paths: Vec<PathEntry>,
}

#[derive(Debug, Deserialize)]
struct PathEntry {
    name: String,
    #[serde(rename = "isDirectory", default)]
    is_directory: Option<String>,
}

impl PathEntry {
    fn is_directory(&self) -> bool {
        self.is_directory.as_deref() == Some("true")
    }
}

/// SAS-authorized Data Lake store bound to one directory at a time.
///
/// Rebinding between the input and output phases of a run is supported;
/// rebinding while an operation is in flight is not.
pub struct DataLakeStore {
    client: reqwest::Client,
    timeout: Duration,
    location: Option<StorageLocation>,
}

impl DataLakeStore {
    /// Create an unbound store; `bind` must be called before use
    pub fn new(timeout: Interval) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: timeout.as_std(),
            location: None,
        }
    }

    /// Create a store already bound to a location
    pub fn bound(location: StorageLocation, timeout: Interval) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: timeout.as_std(),
            location: Some(location),
        }
    }

    fn location(&self) -> Result<&StorageLocation, StorageError> {
        self.location.as_ref().ok_or(StorageError::Unbound)
    }

    /// URL of one file under the bound directory, with extra query
    /// parameters ahead of the SAS token
    fn file_url(location: &StorageLocation, name: &str, extra_query: &str) -> String {
        let mut url = format!("{}/{}", location.endpoint(), location.filesystem());
        if !location.directory().is_empty() {
            url.push('/');
            url.push_str(location.directory());
        }
        url.push('/');
        url.push_str(name);
        append_query(&mut url, extra_query, location.sas_token());
        url
    }

    /// URL of the filesystem-level listing endpoint
    fn list_url(location: &StorageLocation, continuation: Option<&str>) -> String {
        let mut url = format!("{}/{}", location.endpoint(), location.filesystem());
        let mut query = String::from("resource=filesystem&recursive=true");
        if !location.directory().is_empty() {
            query.push_str("&directory=");
            query.push_str(&urlencoding::encode(location.directory()));
        }
        if let Some(token) = continuation {
            query.push_str("&continuation=");
            query.push_str(&urlencoding::encode(token));
        }
        append_query(&mut url, &query, location.sas_token());
        url
    }

    /// Create, append, and flush one file with overwrite semantics.
    async fn upload_one(
        client: &reqwest::Client,
        timeout: Duration,
        location: &StorageLocation,
        blob: &NamedBlob,
    ) -> Result<(), StorageError> {
        let transport = |e: reqwest::Error| StorageError::Transport(e.to_string());

        // Create (truncates any existing file)
        let create_url = Self::file_url(location, blob.name(), "resource=file");
        let response = client
            .put(&create_url)
            .timeout(timeout)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(transport)?;
        expect_status(response, reqwest::StatusCode::CREATED).await?;

        // Append the full content at position 0
        let append_url = Self::file_url(location, blob.name(), "action=append&position=0");
        let response = client
            .patch(&append_url)
            .timeout(timeout)
            .body(blob.data().to_vec())
            .send()
            .await
            .map_err(transport)?;
        expect_status(response, reqwest::StatusCode::ACCEPTED).await?;

        // Flush to commit, stamping the content type
        let flush_url = Self::file_url(
            location,
            blob.name(),
            &format!("action=flush&position={}", blob.size_bytes()),
        );
        let response = client
            .patch(&flush_url)
            .timeout(timeout)
            .header(CONTENT_TYPE_HEADER, blob.content_type())
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(transport)?;
        expect_status(response, reqwest::StatusCode::OK).await?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for DataLakeStore {
    fn bind(&mut self, location: StorageLocation) {
        self.location = Some(location);
    }

    async fn upload(&self, files: Vec<NamedBlob>) -> Vec<UploadOutcome> {
        let location = match self.location() {
            Ok(loc) => loc.clone(),
            Err(e) => {
                let detail = e.to_string();
                return files
                    .iter()
                    .map(|f| UploadOutcome::failure(f.name(), detail.clone()))
                    .collect();
            }
        };

        // Files go up concurrently; outcomes land in a shared vec under
        // a mutex and are re-ordered to input order afterwards.
        let outcomes: Arc<Mutex<Vec<(usize, UploadOutcome)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(files.len())));
        let mut tasks = JoinSet::new();

        for (index, blob) in files.into_iter().enumerate() {
            let client = self.client.clone();
            let location = location.clone();
            let outcomes = Arc::clone(&outcomes);
            let timeout = self.timeout;

            tasks.spawn(async move {
                let outcome = match Self::upload_one(&client, timeout, &location, &blob).await {
                    Ok(()) => UploadOutcome::success(blob.name()),
                    Err(e) => {
                        tracing::warn!(file = blob.name(), error = %e, "upload failed");
                        UploadOutcome::failure(blob.name(), e.to_string())
                    }
                };
                outcomes.lock().await.push((index, outcome));
            });
        }

        while tasks.join_next().await.is_some() {}

        let mut collected = std::mem::take(&mut *outcomes.lock().await);
        collected.sort_by_key(|(index, _)| *index);
        collected.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let location = self.location()?.clone();

        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let url = Self::list_url(&location, continuation.as_deref());
            let response = self
                .client
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| StorageError::Transport(e.to_string()))?;

            let status = response.status();
            if status != reqwest::StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(StorageError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            continuation = response
                .headers()
                .get(CONTINUATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(String::from);

            let page: PathList = response
                .json()
                .await
                .map_err(|e| StorageError::Transport(e.to_string()))?;

            names.extend(
                page.paths
                    .into_iter()
                    .filter(|p| !p.is_directory())
                    .filter_map(|p| p.name.rsplit('/').next().map(String::from)),
            );

            if continuation.is_none() {
                return Ok(names);
            }
        }
    }

    async fn download(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let location = self.location()?;

        let url = Self::file_url(location, name, "");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::ObjectNotFound {
                name: name.to_string(),
            });
        }
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn append_query(url: &mut String, extra: &str, sas_token: &str) {
    match (extra.is_empty(), sas_token.is_empty()) {
        (true, true) => {}
        (false, true) => {
            url.push('?');
            url.push_str(extra);
        }
        (true, false) => {
            url.push('?');
            url.push_str(sas_token);
        }
        (false, false) => {
            url.push('?');
            url.push_str(extra);
            url.push('&');
            url.push_str(sas_token);
        }
    }
}

async fn expect_status(
    response: reqwest::Response,
    expected: reqwest::StatusCode,
) -> Result<(), StorageError> {
    let status = response.status();
    if status == expected {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        body,
    })
}
