//! Remote and local path handling

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// A `bucket[/key]` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    pub bucket: String,
    /// Empty when the path names only a bucket
    pub key: String,
}

impl RemotePath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse `bucket` or `bucket/key`. A leading `s3://` is accepted.
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.strip_prefix("s3://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::InvalidPath("Path cannot be empty".to_string()));
        }

        let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidPath(format!("Missing bucket name in '{path}'")));
        }

        Ok(Self::new(bucket, key))
    }

    /// Parse a path that must name an object
    pub fn parse_object(path: &str) -> Result<Self> {
        let parsed = Self::parse(path)?;
        if parsed.key.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Object key is required (bucket/key): '{path}'"
            )));
        }
        Ok(parsed)
    }

    pub fn is_bucket(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.key)
        }
    }
}

/// Object key for an upload: the explicit key, or the file's base name
pub fn object_key_for(local_path: &Path, key: Option<&str>) -> Result<String> {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    local_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::InvalidPath(format!(
                "Cannot derive an object key from '{}'",
                local_path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_only() {
        let p = RemotePath::parse("photos").unwrap();
        assert_eq!(p.bucket, "photos");
        assert!(p.is_bucket());
        assert_eq!(p.to_string(), "photos");
    }

    #[test]
    fn test_parse_bucket_and_key() {
        let p = RemotePath::parse("s3://photos/2024/cat.jpg").unwrap();
        assert_eq!(p.bucket, "photos");
        assert_eq!(p.key, "2024/cat.jpg");
        assert_eq!(p.to_string(), "photos/2024/cat.jpg");
    }

    #[test]
    fn test_parse_errors() {
        assert!(RemotePath::parse("").is_err());
        assert!(RemotePath::parse("/key").is_err());
        assert!(RemotePath::parse_object("bucket").is_err());
        assert!(RemotePath::parse_object("bucket/").is_err());
    }

    #[test]
    fn test_object_key_defaults_to_base_name() {
        let path = Path::new("/tmp/reports/q3.csv");
        assert_eq!(object_key_for(path, None).unwrap(), "q3.csv");
        assert_eq!(object_key_for(path, Some("")).unwrap(), "q3.csv");
        assert_eq!(
            object_key_for(path, Some("archive/q3.csv")).unwrap(),
            "archive/q3.csv"
        );
        assert!(object_key_for(Path::new("/"), None).is_err());
    }
}
