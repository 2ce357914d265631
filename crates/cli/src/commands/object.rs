//! cat, pipe and rm commands - Single object operations

use bytes::Bytes;
use clap::Args;
use s3p_core::{ObjectStore, OperationOutput, RemotePath};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::ConnectionArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, error_chain};

/// Arguments naming one object
#[derive(Args, Debug)]
pub struct ObjectArgs {
    /// Object path (bucket/key)
    pub path: String,
}

#[derive(Serialize)]
struct ObjectOperationOutput {
    success: bool,
    bucket: String,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<usize>,
    #[serde(flatten)]
    response: OperationOutput,
}

pub async fn execute_cat(args: ObjectArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let Some(path) = parse_object_path(&args.path, &formatter) else {
        return ExitCode::UsageError;
    };
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_cat(&client, &path, &mut tokio::io::stdout(), &formatter).await
}

pub async fn execute_pipe(args: ObjectArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let Some(path) = parse_object_path(&args.path, &formatter) else {
        return ExitCode::UsageError;
    };
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_pipe(&client, &path, &mut tokio::io::stdin(), &formatter).await
}

pub async fn execute_rm(args: ObjectArgs, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let Some(path) = parse_object_path(&args.path, &formatter) else {
        return ExitCode::UsageError;
    };
    let client = match conn.connect(&formatter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    run_rm(&client, &path, &formatter).await
}

pub(super) fn parse_object_path(path: &str, formatter: &Formatter) -> Option<RemotePath> {
    match RemotePath::parse_object(path) {
        Ok(p) => Some(p),
        Err(e) => {
            formatter.error(&e.to_string());
            None
        }
    }
}

async fn run_cat<W>(store: &dyn ObjectStore, path: &RemotePath, out: &mut W, formatter: &Formatter) -> ExitCode
where
    W: AsyncWrite + Unpin,
{
    let mut data = match store.get_object(&path.bucket, &path.key).await {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to get '{path}': {}", error_chain(&e)));
            return ExitCode::from(&e);
        }
    };

    let copied = async {
        tokio::io::copy(&mut data.body, &mut *out).await?;
        out.flush().await
    }
    .await;

    match copied {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("Failed to read '{path}': {e}"));
            ExitCode::RemoteError
        }
    }
}

async fn run_pipe<R>(store: &dyn ObjectStore, path: &RemotePath, input: &mut R, formatter: &Formatter) -> ExitCode
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Err(e) = input.read_to_end(&mut buf).await {
        formatter.error(&format!("Failed to read input: {e}"));
        return ExitCode::GeneralError;
    }
    let size = buf.len();

    match store.put_object(&path.bucket, &path.key, Bytes::from(buf)).await {
        Ok(response) => {
            if formatter.is_json() {
                formatter.json(&ObjectOperationOutput {
                    success: true,
                    bucket: path.bucket.clone(),
                    key: path.key.clone(),
                    size_bytes: Some(size),
                    response,
                });
            } else {
                let human = humansize::format_size(size as u64, humansize::BINARY);
                formatter.success(&format!(
                    "Stored {} ({})",
                    formatter.style_file(&path.to_string()),
                    formatter.style_size(&human)
                ));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to put '{path}': {}", error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}

async fn run_rm(store: &dyn ObjectStore, path: &RemotePath, formatter: &Formatter) -> ExitCode {
    match store.delete_object(&path.bucket, &path.key).await {
        Ok(response) => {
            if formatter.is_json() {
                formatter.json(&ObjectOperationOutput {
                    success: true,
                    bucket: path.bucket.clone(),
                    key: path.key.clone(),
                    size_bytes: None,
                    response,
                });
            } else {
                formatter.success(&format!("Removed {}", formatter.style_file(&path.to_string())));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to remove '{path}': {}", error_chain(&e)));
            ExitCode::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MemoryStore;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_cat_streams_body() {
        let store = MemoryStore::with_bucket("docs");
        store.insert("docs", "readme.txt", b"hello world");

        let mut out = Vec::new();
        let path = RemotePath::new("docs", "readme.txt");
        let code = run_cat(&store, &path, &mut out, &quiet()).await;

        assert_eq!(code, ExitCode::Success);
        assert_eq!(out, b"hello world");
    }

    #[tokio::test]
    async fn test_cat_missing_object() {
        let store = MemoryStore::with_bucket("docs");
        let mut out = Vec::new();
        let path = RemotePath::new("docs", "absent");
        let code = run_cat(&store, &path, &mut out, &quiet()).await;
        assert_eq!(code, ExitCode::RemoteError);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_pipe_stores_input() {
        let store = MemoryStore::with_bucket("docs");
        let mut input: &[u8] = b"from stdin";
        let path = RemotePath::new("docs", "in.txt");

        let code = run_pipe(&store, &path, &mut input, &quiet()).await;
        assert_eq!(code, ExitCode::Success);
        assert_eq!(store.object("docs", "in.txt").as_deref(), Some(&b"from stdin"[..]));
    }

    #[tokio::test]
    async fn test_rm_deletes_object() {
        let store = MemoryStore::with_bucket("docs");
        store.insert("docs", "old.txt", b"x");

        let code = run_rm(&store, &RemotePath::new("docs", "old.txt"), &quiet()).await;
        assert_eq!(code, ExitCode::Success);
        assert!(store.object("docs", "old.txt").is_none());
        assert_eq!(store.calls(), vec!["delete_object:docs/old.txt"]);
    }

    #[test]
    fn test_parse_object_path_requires_key() {
        assert!(parse_object_path("bucket", &quiet()).is_none());
        let path = parse_object_path("bucket/a/b.txt", &quiet()).unwrap();
        assert_eq!(path.key, "a/b.txt");
    }
}
