//! s3p-s3: aws-sdk-s3 backed client for s3p
//!
//! Builds one `aws_sdk_s3::Client` from a resolved `ClientConfig` and forwards
//! each operation to it.

pub mod client;

pub use client::S3Client;
