//! ls, mb and rb commands - Bucket and listing operations

use clap::Args;
use s3p_core::{
    BucketInfo, DEFAULT_MAX_KEYS, ListOptions, ObjectInfo, ObjectStore, OperationOutput,
};
use serde::Serialize;

use super::ConnectionArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, error_chain};

/// Arguments for the `ls` command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Bucket to list; omit to list buckets
    pub bucket: Option<String>,

    /// Only list keys starting with this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Maximum number of keys to return (no pagination)
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_KEYS)]
    pub max_keys: i32,
}

/// Arguments for `mb` and `rb`
#[derive(Args, Debug)]
pub struct BucketArgs {
    /// Bucket name
    pub bucket: String,
}

#[derive(Serialize)]
struct BucketListOutput {
    buckets: Vec<BucketInfo>,
}

#[derive(Serialize)]
struct ObjectListOutput {
    bucket: String,
    prefix: String,
    objects: Vec<ObjectInfo>,
}

#[derive(Serialize)]
struct BucketOperationOutput {
    success: bool,
    bucket: String,
    #[serde(flatten)]
    response: OperationOutput,
}

pub async fn execute_ls(args: LsArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_ls(&client, args, &formatter).await
}

pub async fn execute_mb(args: BucketArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_mb(&client, &args.bucket, &formatter).await
}

pub async fn execute_rb(args: BucketArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_rb(&client, &args.bucket, &formatter).await
}

async fn run_ls(store: &dyn ObjectStore, args: LsArgs, formatter: &Formatter) -> ExitCode {
    match args.bucket {
        None => list_buckets(store, formatter).await,
        Some(bucket) => {
            let options = ListOptions {
                prefix: args.prefix,
                max_keys: args.max_keys,
            };
            list_objects(store, bucket, options, formatter).await
        }
    }
}

async fn list_buckets(store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let buckets = match store.list_buckets().await {
        Ok(b) => b,
        Err(e) => {
            formatter.error(&format!("Failed to list buckets: {}", error_chain(&e)));
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&BucketListOutput { buckets });
    } else if buckets.is_empty() {
        formatter.println("No buckets found.");
    } else {
        for bucket in &buckets {
            let date = bucket
                .creation_date
                .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            formatter.println(&format!(
                "{:<19} {}",
                formatter.style_date(&date),
                formatter.style_name(&bucket.name)
            ));
        }
    }

    ExitCode::Success
}

async fn list_objects(
    store: &dyn ObjectStore,
    bucket: String,
    options: ListOptions,
    formatter: &Formatter,
) -> ExitCode {
    let objects = match store.list_objects(&bucket, &options).await {
        Ok(o) => o,
        Err(e) => {
            formatter.error(&format!("Failed to list objects in '{bucket}': {}", error_chain(&e)));
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ObjectListOutput {
            bucket,
            prefix: options.prefix,
            objects,
        });
    } else if objects.is_empty() {
        formatter.println("No objects found.");
    } else {
        let rows = objects
            .iter()
            .map(|o| {
                vec![
                    o.last_modified
                        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default(),
                    humansize::format_size(o.size_bytes.max(0) as u64, humansize::BINARY),
                    o.key.clone(),
                ]
            })
            .collect();
        formatter.table(&[], rows);
    }

    ExitCode::Success
}

async fn run_mb(store: &dyn ObjectStore, bucket: &str, formatter: &Formatter) -> ExitCode {
    match store.create_bucket(bucket).await {
        Ok(response) => {
            if formatter.is_json() {
                formatter.json(&BucketOperationOutput {
                    success: true,
                    bucket: bucket.to_string(),
                    response,
                });
            } else {
                let styled = formatter.style_name(bucket);
                formatter.success(&format!("Bucket '{styled}' created."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to create bucket '{bucket}': {}", error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}

async fn run_rb(store: &dyn ObjectStore, bucket: &str, formatter: &Formatter) -> ExitCode {
    match store.delete_bucket(bucket).await {
        Ok(response) => {
            if formatter.is_json() {
                formatter.json(&BucketOperationOutput {
                    success: true,
                    bucket: bucket.to_string(),
                    response,
                });
            } else {
                let styled = formatter.style_name(bucket);
                formatter.success(&format!("Bucket '{styled}' removed."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to remove bucket '{bucket}': {}", error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}
