//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3p-core.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::operation::create_bucket::builders::CreateBucketFluentBuilder;
use aws_sdk_s3::operation::list_objects_v2::builders::ListObjectsV2FluentBuilder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_smithy_types::error::display::DisplayErrorContext;
use bytes::Bytes;
use jiff::Timestamp;
use s3p_core::{
    BucketInfo, ClientConfig, Error, ListOptions, ObjectData, ObjectInfo, ObjectStore,
    OperationOutput, PresignOperation, Provider, Result, object_key_for,
};
use tokio::io::AsyncWriteExt;

/// Provider-aware S3 client
///
/// Owns exactly one SDK client built from a [`ClientConfig`]. The handle is
/// cheap to share by reference; no connections or files are held between calls.
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    config: ClientConfig,
}

impl S3Client {
    /// Create a client for a provider identifier.
    ///
    /// `endpoint_url` and `region_name` override the provider defaults. Fails
    /// with [`Error::UnsupportedProvider`] for unknown identifiers.
    pub fn new(
        provider_id: &str,
        access_key: &str,
        secret_key: &str,
        endpoint_url: Option<&str>,
        region_name: Option<&str>,
    ) -> Result<Self> {
        let config =
            ClientConfig::resolve(provider_id, access_key, secret_key, endpoint_url, region_name)?;
        Ok(Self::from_config(config))
    }

    /// Create a client from an already resolved configuration
    pub fn from_config(config: ClientConfig) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None, // session token
            None, // expiry
            "s3p-static-credentials",
        );

        // Built directly rather than through aws-config so nothing is read
        // from the environment or shared profile files.
        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region_name.clone()))
            .force_path_style(config.force_path_style);

        // Without an endpoint the SDK resolves the AWS endpoint for the region.
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        let s3_config = builder.build();

        tracing::debug!(
            provider = %config.provider,
            region = %config.region_name,
            endpoint = config.endpoint_url.as_deref().unwrap_or("<sdk default>"),
            signature = %config.signature_version,
            "Created S3 client"
        );

        Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            config,
        }
    }

    /// AWS S3 client for `region` (default us-east-1)
    pub fn aws(access_key: &str, secret_key: &str, region: Option<&str>) -> Self {
        Self::regional(Provider::Aws, access_key, secret_key, region)
    }

    /// Wasabi client using the endpoint host of `region` (default us-east-1)
    pub fn wasabi(access_key: &str, secret_key: &str, region: Option<&str>) -> Self {
        Self::regional(Provider::Wasabi, access_key, secret_key, region)
    }

    /// Backblaze B2 client for `region` (default us-west-000)
    pub fn backblaze(access_key: &str, secret_key: &str, region: Option<&str>) -> Self {
        Self::regional(Provider::Backblaze, access_key, secret_key, region)
    }

    /// DigitalOcean Spaces client for `region` (default nyc3)
    pub fn digitalocean(access_key: &str, secret_key: &str, region: Option<&str>) -> Self {
        Self::regional(Provider::DigitalOcean, access_key, secret_key, region)
    }

    fn regional(
        provider: Provider,
        access_key: &str,
        secret_key: &str,
        region: Option<&str>,
    ) -> Self {
        Self::from_config(ClientConfig::regional(
            provider, access_key, secret_key, region, None,
        ))
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn create_bucket_request(&self, bucket: &str) -> CreateBucketFluentBuilder {
        let request = self.inner.create_bucket().bucket(bucket);

        match self.config.location_constraint() {
            Some(region) => request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            ),
            None => request,
        }
    }

    fn list_objects_request(&self, bucket: &str, options: &ListOptions) -> ListObjectsV2FluentBuilder {
        self.inner
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&options.prefix)
            .max_keys(options.max_keys)
    }
}

/// Log and box a storage client failure without altering it
fn client_error<E>(operation: &'static str) -> impl FnOnce(E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |err| {
        tracing::debug!(operation, error = %DisplayErrorContext(&err), "Storage client call failed");
        Error::client(err)
    }
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<Timestamp> {
    Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling path a download is streamed into before the final rename.
///
/// Unique per process and call, so concurrent downloads to the same target
/// never share a part file.
fn part_path(local_path: &Path) -> PathBuf {
    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = local_path.as_os_str().to_owned();
    name.push(format!(".{}-{seq}.part", std::process::id()));
    PathBuf::from(name)
}

async fn write_body(body: ByteStream, path: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let reader = body.into_async_read();
    tokio::pin!(reader);
    tokio::io::copy(&mut reader, &mut file).await?;
    file.flush().await?;
    Ok(())
}

async fn write_and_rename(body: ByteStream, part: &Path, target: &Path) -> std::io::Result<()> {
    write_body(body, part).await?;
    tokio::fs::rename(part, target).await
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        tracing::debug!("list_buckets");
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(client_error("list_buckets"))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| BucketInfo {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b.creation_date().and_then(to_timestamp),
            })
            .collect();

        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<OperationOutput> {
        tracing::debug!(
            bucket,
            location_constraint = self.config.location_constraint(),
            "create_bucket"
        );
        let response = self
            .create_bucket_request(bucket)
            .send()
            .await
            .map_err(client_error("create_bucket"))?;

        Ok(OperationOutput {
            request_id: response.request_id().map(str::to_string),
            location: response.location().map(str::to_string),
            ..Default::default()
        })
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<OperationOutput> {
        tracing::debug!(bucket, "delete_bucket");
        let response = self
            .inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(client_error("delete_bucket"))?;

        Ok(OperationOutput {
            request_id: response.request_id().map(str::to_string),
            ..Default::default()
        })
    }

    /// Sent as a single `PutObject`, so files above the 5 GiB single-request
    /// limit are rejected by the server.
    async fn upload_file(&self, local_path: &Path, bucket: &str, key: Option<&str>) -> Result<()> {
        let key = object_key_for(local_path, key)?;
        tracing::debug!(path = %local_path.display(), bucket, key = %key, "upload_file");

        // Local read failures are I/O errors, not storage client errors.
        tokio::fs::metadata(local_path).await?;
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(std::io::Error::other)?;

        self.inner
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(client_error("upload_file"))?;

        Ok(())
    }

    async fn download_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        tracing::debug!(bucket, key, path = %local_path.display(), "download_file");
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(client_error("download_file"))?;

        let part = part_path(local_path);
        if let Err(e) = write_and_rename(response.body, &part, local_path).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(Error::Io(e));
        }

        Ok(())
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectInfo>> {
        tracing::debug!(bucket, prefix = %options.prefix, max_keys = options.max_keys, "list_objects");
        let response = self
            .list_objects_request(bucket, options)
            .send()
            .await
            .map_err(client_error("list_objects"))?;

        let objects = response
            .contents()
            .iter()
            .map(|object| ObjectInfo {
                key: object.key().unwrap_or_default().to_string(),
                size_bytes: object.size().unwrap_or(0),
                last_modified: object.last_modified().and_then(to_timestamp),
                etag: object.e_tag().map(trim_etag),
                storage_class: object.storage_class().map(|sc| sc.as_str().to_string()),
            })
            .collect();

        Ok(objects)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<OperationOutput> {
        tracing::debug!(bucket, key, "delete_object");
        let response = self
            .inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(client_error("delete_object"))?;

        Ok(OperationOutput {
            request_id: response.request_id().map(str::to_string),
            version_id: response.version_id().map(str::to_string),
            delete_marker: response.delete_marker().unwrap_or(false),
            ..Default::default()
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        tracing::debug!(bucket, key, "get_object");
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(client_error("get_object"))?;

        Ok(ObjectData {
            content_length: response.content_length(),
            content_type: response.content_type().map(str::to_string),
            etag: response.e_tag().map(trim_etag),
            last_modified: response.last_modified().and_then(to_timestamp),
            body: Box::pin(response.body.into_async_read()),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<OperationOutput> {
        tracing::debug!(bucket, key, size = data.len(), "put_object");
        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(client_error("put_object"))?;

        Ok(OperationOutput {
            request_id: response.request_id().map(str::to_string),
            etag: response.e_tag().map(trim_etag),
            version_id: response.version_id().map(str::to_string),
            ..Default::default()
        })
    }

    async fn generate_presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
        operation: PresignOperation,
    ) -> Result<String> {
        tracing::debug!(bucket, key, expires_secs = expires_in.as_secs(), %operation, "generate_presigned_url");
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(client_error("generate_presigned_url"))?;

        let request = match operation {
            PresignOperation::GetObject => self
                .inner
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(client_error("generate_presigned_url"))?,
            PresignOperation::PutObject => self
                .inner
                .put_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(client_error("generate_presigned_url"))?,
            PresignOperation::DeleteObject => self
                .inner
                .delete_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(client_error("generate_presigned_url"))?,
            PresignOperation::HeadObject => self
                .inner
                .head_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(client_error("generate_presigned_url"))?,
        };

        Ok(request.uri().to_string())
    }
}


#[cfg(test)]
mod loopback_tests {
    //! Drives the client against a canned HTTP responder on 127.0.0.1.

    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    const EMPTY_LISTING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>b</Name><Prefix>zzz</Prefix><KeyCount>0</KeyCount><MaxKeys>1000</MaxKeys><IsTruncated>false</IsTruncated></ListBucketResult>"#;

    /// Requests seen by the responder, as raw text
    type Seen = Arc<Mutex<Vec<String>>>;

    /// Serve `body` with status 200 to every request; returns a client
    /// pointed at the listener and the captured requests.
    async fn serve(body: &'static str) -> (S3Client, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let seen: Seen = Arc::default();

        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    if let Ok(request) = read_request(&mut stream).await {
                        log.lock().unwrap().push(request);
                        let _ = respond(&mut stream, body).await;
                    }
                });
            }
        });

        let config = ClientConfig::resolve("aws", "AKIDEXAMPLE", "secret", Some(&endpoint), None)
            .unwrap()
            .with_path_style(true);
        (S3Client::from_config(config), seen)
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(String::from_utf8_lossy(&buf).into_owned());
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        let chunked = head.contains("transfer-encoding: chunked");

        loop {
            let received = buf.len() - header_end;
            let done = match content_length {
                Some(len) => received >= len,
                None if chunked => buf.ends_with(b"\r\n\r\n") && received > 0,
                None => true,
            };
            if done {
                break;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    async fn respond(stream: &mut TcpStream, body: &str) -> std::io::Result<()> {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nETag: \"abc\"\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_list_objects_without_matches_is_empty() {
        let (client, seen) = serve(EMPTY_LISTING).await;

        let objects = client
            .list_objects("b", &ListOptions::with_prefix("zzz"))
            .await
            .unwrap();

        assert!(objects.is_empty());
        let requests = seen.lock().unwrap();
        assert!(requests[0].starts_with("GET /b?"));
        assert!(requests[0].contains("list-type=2"));
        assert!(requests[0].contains("prefix=zzz"));
    }

    #[tokio::test]
    async fn test_download_file_writes_target_and_drops_part() {
        let (client, _) = serve("payload").await;
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("out.txt");

        client.download_file("b", "k", &target).await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "payload");
        assert_eq!(entries(dir.path()), vec!["out.txt"]);
    }

    #[tokio::test]
    async fn test_download_file_cleans_part_when_rename_fails() {
        let (client, _) = serve("payload").await;
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("existing");
        std::fs::create_dir(&target).unwrap();

        let result = client.download_file("b", "k", &target).await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(entries(dir.path()), vec!["existing"]);
    }

    #[tokio::test]
    async fn test_get_object_streams_body() {
        let (client, _) = serve("payload").await;

        let mut data = client.get_object("b", "k").await.unwrap();
        let mut content = String::new();
        data.body.read_to_string(&mut content).await.unwrap();

        assert_eq!(content, "payload");
        assert_eq!(data.content_length, Some(7));
        assert_eq!(data.etag.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_upload_file_puts_file_under_base_name() {
        let (client, seen) = serve("").await;
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "payload").unwrap();

        client.upload_file(&file, "b", None).await.unwrap();

        let requests = seen.lock().unwrap();
        assert!(requests[0].starts_with("PUT /b/notes.txt"));
        assert!(requests[0].contains("payload"));
    }
}
