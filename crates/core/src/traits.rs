//! Object store operation surface
//!
//! Describes the bucket and object operations a provider-aware client
//! re-exposes, independent of the SDK that carries them out.

use std::fmt;
use std::path::Path;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use crate::error::{Error, Result};

/// Default page size for object listings
pub const DEFAULT_MAX_KEYS: i32 = 1000;

/// Default lifetime of a presigned URL
pub const DEFAULT_PRESIGN_EXPIRATION: Duration = Duration::from_secs(3600);

/// A bucket owned by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
}

impl BucketInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: None,
        }
    }
}

/// An object entry from a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectInfo {
    pub fn new(key: impl Into<String>, size_bytes: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes,
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }
}

/// Metadata the service returned for a mutating call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub delete_marker: bool,
}

/// Streaming object body; the caller reads it to the end or drops it
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// Result of fetching an object
pub struct ObjectData {
    pub content_length: Option<i64>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<Timestamp>,
    pub body: ObjectBody,
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectData")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .field("etag", &self.etag)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

/// Options for listing objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Only keys starting with this prefix
    pub prefix: String,
    /// Upper bound on returned keys; no continuation is followed
    pub max_keys: i32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            max_keys: DEFAULT_MAX_KEYS,
        }
    }
}

impl ListOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }
}

/// Object operation a presigned URL grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresignOperation {
    #[default]
    GetObject,
    PutObject,
    DeleteObject,
    HeadObject,
}

impl PresignOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresignOperation::GetObject => "get_object",
            PresignOperation::PutObject => "put_object",
            PresignOperation::DeleteObject => "delete_object",
            PresignOperation::HeadObject => "head_object",
        }
    }

    /// HTTP method the URL must be used with
    pub fn http_method(&self) -> &'static str {
        match self {
            PresignOperation::GetObject => "GET",
            PresignOperation::PutObject => "PUT",
            PresignOperation::DeleteObject => "DELETE",
            PresignOperation::HeadObject => "HEAD",
        }
    }
}

impl fmt::Display for PresignOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresignOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get_object" => Ok(PresignOperation::GetObject),
            "put_object" => Ok(PresignOperation::PutObject),
            "delete_object" => Ok(PresignOperation::DeleteObject),
            "head_object" => Ok(PresignOperation::HeadObject),
            _ => Err(Error::Config(format!(
                "Unsupported presign operation: {s}. Supported operations: get_object, put_object, delete_object, head_object"
            ))),
        }
    }
}

/// Bucket and object operations against one configured endpoint.
///
/// Every method is a single call into the storage client. Failures come back
/// as [`Error::Client`] without retries or reinterpretation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets owned by the account
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<OperationOutput>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<OperationOutput>;

    /// Upload a local file; `key` defaults to the file's base name
    async fn upload_file(&self, local_path: &Path, bucket: &str, key: Option<&str>) -> Result<()>;

    /// Download an object into a local file
    async fn download_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;

    /// List objects; at most `options.max_keys` entries, no pagination
    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectInfo>>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<OperationOutput>;

    /// Fetch an object; the body is streamed
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData>;

    /// Store `data` under `key`
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<OperationOutput>;

    /// Compute a time-limited signed URL locally
    async fn generate_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        operation: PresignOperation,
    ) -> Result<String>;
}
