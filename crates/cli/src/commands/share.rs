//! share command - Generate presigned URLs
//!
//! Creates time-limited URLs for sharing objects without credentials. The URL
//! is signed locally; no request is sent.

use std::time::Duration;

use clap::Args;
use s3p_core::{ObjectStore, PresignOperation, RemotePath};
use serde::Serialize;

use super::ConnectionArgs;
use super::object::parse_object_path;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, error_chain};

/// Longest lifetime a SigV4 presigned URL may have
const MAX_EXPIRATION_SECS: u64 = 604800;

/// Generate presigned URLs for sharing objects
#[derive(Args, Debug)]
pub struct ShareArgs {
    /// Path to the object (bucket/key)
    pub path: String,

    /// Expiration time (e.g., 30m, 1h, 7d). Default: 1h
    #[arg(short, long, default_value = "1h")]
    pub expire: String,

    /// Operation the URL grants: get_object, put_object, delete_object, head_object
    #[arg(long, default_value = "get_object")]
    pub operation: String,
}

#[derive(Debug, Serialize)]
struct ShareOutput {
    url: String,
    path: String,
    operation: PresignOperation,
    method: String,
    expires_in: String,
    expires_secs: u64,
}

/// Execute the share command
pub async fn execute(args: ShareArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some(path) = parse_object_path(&args.path, &formatter) else {
        return ExitCode::UsageError;
    };

    let expires_secs = match parse_expiration(&args.expire) {
        Ok(secs) => secs,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    if expires_secs == 0 || expires_secs > MAX_EXPIRATION_SECS {
        formatter.error("Expiration must be between 1 second and 7 days (604800 seconds)");
        return ExitCode::UsageError;
    }

    let operation: PresignOperation = match args.operation.parse() {
        Ok(op) => op,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };

    run_share(&client, &path, expires_secs, operation, &formatter).await
}

async fn run_share(
    store: &dyn ObjectStore,
    path: &RemotePath,
    expires_secs: u64,
    operation: PresignOperation,
    formatter: &Formatter,
) -> ExitCode {
    let url = match store
        .generate_presigned_url(
            &path.bucket,
            &path.key,
            Duration::from_secs(expires_secs),
            operation,
        )
        .await
    {
        Ok(url) => url,
        Err(e) => {
            formatter.error(&format!("Failed to generate URL: {}", error_chain(&e)));
            return ExitCode::from(&e);
        }
    };

    let expires_human = format_duration(expires_secs);

    if formatter.is_json() {
        let output = ShareOutput {
            url,
            path: path.to_string(),
            operation,
            method: operation.http_method().to_string(),
            expires_in: expires_human,
            expires_secs,
        };
        formatter.json(&output);
    } else {
        formatter.println(&format!("Share URL ({operation}):"));
        formatter.println(&formatter.style_url(&url));
        formatter.println("");
        formatter.println(&format!("{} {expires_human}", formatter.style_key("Expires in:")));
        if operation == PresignOperation::PutObject {
            formatter.println("");
            formatter.println("Upload with: curl -X PUT -T <file> \"<url>\"");
        }
    }

    ExitCode::Success
}

/// Parse expiration string (e.g., "1h", "1d", "7d")
fn parse_expiration(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Expiration cannot be empty".to_string());
    }

    let (num_str, suffix) = if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
        let idx = s.len() - 1;
        (&s[..idx], &s[idx..])
    } else {
        (s, "s") // Default to seconds
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("Invalid expiration number: {num_str}"))?;

    let multiplier = match suffix.to_lowercase().as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 604800,
        _ => return Err(format!("Unknown expiration suffix: {suffix}")),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("Expiration too large: {s}"))
}

/// Format duration in human-readable form
fn format_duration(secs: u64) -> String {
    if secs >= 86400 {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{days}d {hours}h")
        } else {
            format!("{days} day(s)")
        }
    } else if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{hours} hour(s)")
        }
    } else if secs >= 60 {
        let mins = secs / 60;
        format!("{mins} minute(s)")
    } else {
        format!("{secs} second(s)")
    }
}
