//! In-memory object store for command tests

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use s3p_core::{
    BucketInfo, Error, ListOptions, ObjectData, ObjectInfo, ObjectStore, OperationOutput,
    PresignOperation, Result, object_key_for,
};

#[derive(Debug)]
struct NoSuchBucket(String);

impl std::fmt::Display for NoSuchBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NoSuchBucket: {}", self.0)
    }
}

impl std::error::Error for NoSuchBucket {}

#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, Bytes>>>,
    /// Every call as "operation:args", in order
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_bucket(name: &str) -> Self {
        let store = Self::default();
        store
            .buckets
            .lock()
            .unwrap()
            .insert(name.to_string(), BTreeMap::new());
        store
    }

    pub fn insert(&self, bucket: &str, key: &str, data: &'static [u8]) {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), Bytes::from_static(data));
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.get(key).cloned())
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.lock().unwrap().contains_key(bucket)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_objects<T>(
        &self,
        bucket: &str,
        f: impl FnOnce(&mut BTreeMap<String, Bytes>) -> T,
    ) -> Result<T> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::client(NoSuchBucket(bucket.to_string())))?;
        Ok(f(objects))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.record("list_buckets".to_string());
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .keys()
            .map(BucketInfo::new)
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<OperationOutput> {
        self.record(format!("create_bucket:{bucket}"));
        self.buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), BTreeMap::new());
        Ok(OperationOutput {
            location: Some(format!("/{bucket}")),
            ..Default::default()
        })
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<OperationOutput> {
        self.record(format!("delete_bucket:{bucket}"));
        self.buckets
            .lock()
            .unwrap()
            .remove(bucket)
            .ok_or_else(|| Error::client(NoSuchBucket(bucket.to_string())))?;
        Ok(OperationOutput::default())
    }

    async fn upload_file(&self, local_path: &Path, bucket: &str, key: Option<&str>) -> Result<()> {
        let key = object_key_for(local_path, key)?;
        self.record(format!("upload_file:{bucket}/{key}"));
        let data = Bytes::from(std::fs::read(local_path)?);
        self.with_objects(bucket, |objects| {
            objects.insert(key, data);
        })
    }

    async fn download_file(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        self.record(format!("download_file:{bucket}/{key}"));
        let data = self
            .with_objects(bucket, |objects| objects.get(key).cloned())?
            .ok_or_else(|| Error::client(NoSuchBucket(format!("{bucket}/{key}"))))?;
        std::fs::write(local_path, &data)?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectInfo>> {
        self.record(format!(
            "list_objects:{bucket}:{}:{}",
            options.prefix, options.max_keys
        ));
        self.with_objects(bucket, |objects| {
            objects
                .iter()
                .filter(|(k, _)| k.starts_with(&options.prefix))
                .take(options.max_keys.max(0) as usize)
                .map(|(k, v)| ObjectInfo::new(k.clone(), v.len() as i64))
                .collect()
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<OperationOutput> {
        self.record(format!("delete_object:{bucket}/{key}"));
        self.with_objects(bucket, |objects| {
            objects.remove(key);
        })?;
        Ok(OperationOutput::default())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectData> {
        self.record(format!("get_object:{bucket}/{key}"));
        let data = self
            .with_objects(bucket, |objects| objects.get(key).cloned())?
            .ok_or_else(|| Error::client(NoSuchBucket(format!("{bucket}/{key}"))))?;
        Ok(ObjectData {
            content_length: Some(data.len() as i64),
            content_type: None,
            etag: None,
            last_modified: None,
            body: Box::pin(std::io::Cursor::new(data)),
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<OperationOutput> {
        self.record(format!("put_object:{bucket}/{key}"));
        self.with_objects(bucket, |objects| {
            objects.insert(key.to_string(), data);
        })?;
        Ok(OperationOutput {
            etag: Some("etag".to_string()),
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
        self.record(format!(
            "presign:{operation}:{bucket}/{key}:{}",
            expires_in.as_secs()
        ));
        Ok(format!(
            "https://example.com/{bucket}/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }
}
