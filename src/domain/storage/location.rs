//! Storage location value object

use url::Url;

use crate::domain::error::MalformedLocationError;

/// Host marker for the flat blob endpoint
const BLOB_TIER_MARKER: &str = ".blob.";

/// Host marker for the hierarchical-namespace (Data Lake) endpoint
const DFS_TIER_MARKER: &str = ".dfs.";

/// Value object describing one SAS-scoped storage directory.
///
/// Parsed from the opaque, time-limited URLs the job API hands back
/// (`scheme://host/filesystem/dir...?sas-token`). The host is normalized
/// to the hierarchical-namespace endpoint because file operations require
/// it even when the API returns a blob-tier URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    endpoint: String,
    filesystem: String,
    directory: String,
    sas_token: String,
}

impl StorageLocation {
    /// Parse a storage URL into its components.
    ///
    /// The first path segment is the filesystem (container) name, the
    /// remaining segments form the directory, and the query string is
    /// kept verbatim as the SAS token. No expiry validation is done.
    pub fn parse(raw: &str) -> Result<Self, MalformedLocationError> {
        let parsed = Url::parse(raw).map_err(|e| MalformedLocationError {
            input: raw.to_string(),
            reason: e.to_string(),
        })?;

        let host = parsed.host_str().ok_or_else(|| MalformedLocationError {
            input: raw.to_string(),
            reason: "missing host".to_string(),
        })?;

        let mut authority = host.to_string();
        if let Some(port) = parsed.port() {
            authority.push_str(&format!(":{}", port));
        }

        let endpoint = format!("{}://{}", parsed.scheme(), authority)
            .replace(BLOB_TIER_MARKER, DFS_TIER_MARKER);

        let mut segments: Vec<&str> = parsed
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(MalformedLocationError {
                input: raw.to_string(),
                reason: "missing filesystem path segment".to_string(),
            });
        }

        let filesystem = segments.remove(0).to_string();
        let directory = segments.join("/");
        let sas_token = parsed.query().unwrap_or("").to_string();

        Ok(Self {
            endpoint,
            filesystem,
            directory,
            sas_token,
        })
    }

    /// Scheme + host, normalized to the hierarchical-namespace endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Filesystem (container) name
    pub fn filesystem(&self) -> &str {
        &self.filesystem
    }

    /// Directory path below the filesystem, no leading/trailing separators.
    /// Empty string means the filesystem root.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Raw SAS token query string, passed through verbatim
    pub fn sas_token(&self) -> &str {
        &self.sas_token
    }
}
