//! put and get commands - File transfers

use std::path::{Path, PathBuf};

use clap::Args;
use s3p_core::{ObjectStore, RemotePath, object_key_for};
use serde::Serialize;

use super::ConnectionArgs;
use super::object::parse_object_path;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, error_chain};

/// Arguments for the `put` command
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination (bucket or bucket/key); the key defaults to the file name
    pub target: String,
}

/// Arguments for the `get` command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object to download (bucket/key)
    pub source: String,

    /// Local destination file; defaults to the key's base name
    pub file: Option<PathBuf>,
}

#[derive(Serialize)]
struct TransferOutput {
    success: bool,
    bucket: String,
    key: String,
    file: String,
    size_bytes: u64,
}

pub async fn execute_put(args: PutArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let target = match RemotePath::parse(&args.target) {
        Ok(t) => t,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_put(&client, &args.file, &target, &formatter).await
}

pub async fn execute_get(args: GetArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let Some(source) = parse_object_path(&args.source, &formatter) else {
        return ExitCode::UsageError;
    };
    let file = match args.file {
        Some(f) => f,
        None => match Path::new(&source.key).file_name() {
            Some(name) => PathBuf::from(name),
            None => {
                formatter.error(&format!("Cannot derive a file name from '{source}'"));
                return ExitCode::UsageError;
            }
        },
    };
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_get(&client, &source, &file, &formatter).await
}

async fn run_put(store: &dyn ObjectStore, file: &Path, target: &RemotePath, formatter: &Formatter) -> ExitCode {
    let key = match object_key_for(file, Some(&target.key)) {
        Ok(k) => k,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let size = match tokio::fs::metadata(file).await {
        Ok(m) if m.is_file() => m.len(),
        Ok(_) => {
            formatter.error(&format!("Not a regular file: {}", file.display()));
            return ExitCode::UsageError;
        }
        Err(e) => {
            formatter.error(&format!("Cannot read '{}': {e}", file.display()));
            return ExitCode::NotFound;
        }
    };

    let pb = formatter.spinner(format!("Uploading {} to {}/{key}", file.display(), target.bucket));
    let result = store.upload_file(file, &target.bucket, Some(&key)).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            report_transfer(formatter, true, &target.bucket, &key, file, size);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to upload '{}': {}", file.display(), error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}

async fn run_get(store: &dyn ObjectStore, source: &RemotePath, file: &Path, formatter: &Formatter) -> ExitCode {
    if file.exists() {
        formatter.warning(&format!("Overwriting {}", file.display()));
    }

    let pb = formatter.spinner(format!("Downloading {source} to {}", file.display()));
    let result = store.download_file(&source.bucket, &source.key, file).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => {
            let size = tokio::fs::metadata(file).await.map(|m| m.len()).unwrap_or(0);
            report_transfer(formatter, false, &source.bucket, &source.key, file, size);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to download '{source}': {}", error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}

fn report_transfer(formatter: &Formatter, upload: bool, bucket: &str, key: &str, file: &Path, size: u64) {
    if formatter.is_json() {
        formatter.json(&TransferOutput {
            success: true,
            bucket: bucket.to_string(),
            key: key.to_string(),
            file: file.display().to_string(),
            size_bytes: size,
        });
    } else {
        let human = humansize::format_size(size, humansize::BINARY);
        let local = formatter.style_file(&file.display().to_string());
        let remote = formatter.style_file(&format!("{bucket}/{key}"));
        let (verb, from, to) = if upload {
            ("Uploaded", local, remote)
        } else {
            ("Downloaded", remote, local)
        };
        formatter.success(&format!("{verb} {from} -> {to} ({})", formatter.style_size(&human)));
    }
}
