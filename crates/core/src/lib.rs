//! s3p-core: provider registry and client configuration
//!
//! This crate holds everything that decides *where* and *how* a client
//! connects:
//! - The static provider registry (AWS, Wasabi, Backblaze B2, DigitalOcean Spaces)
//! - Client configuration resolution and region-aware endpoints
//! - Named profiles
//! - The ObjectStore trait describing the re-exposed operations
//!
//! It does not depend on any S3 SDK; see `s3p-s3` for the implementation.

pub mod config;
pub mod error;
pub mod path;
pub mod profile;
pub mod provider;
pub mod traits;

pub use config::{AWS_DEFAULT_REGION, ClientConfig};
pub use error::{BoxError, Error, Result};
pub use path::{RemotePath, object_key_for};
pub use profile::{Profile, ProfileManager};
pub use provider::{Provider, ProviderConfig, SignatureVersion, resolve};
pub use traits::{
    BucketInfo, DEFAULT_MAX_KEYS, DEFAULT_PRESIGN_EXPIRATION, ListOptions, ObjectBody, ObjectData,
    ObjectInfo, ObjectStore, OperationOutput, PresignOperation,
};
