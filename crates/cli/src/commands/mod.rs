//! Command-line interface definition and dispatch

mod bucket;
mod completions;
mod connection;
mod object;
mod profile;
mod providers;
mod share;
#[cfg(test)]
mod testing;
mod transfer;

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

pub use connection::ConnectionArgs;

/// Work with AWS S3, Wasabi, Backblaze B2 and DigitalOcean Spaces through one interface
#[derive(Parser, Debug)]
#[command(name = "s3p", version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show supported providers and their defaults (use --region to derive endpoints)
    Providers,

    /// Manage saved connection profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List buckets, or objects in a bucket
    Ls(bucket::LsArgs),

    /// Create a bucket
    Mb(bucket::BucketArgs),

    /// Remove an empty bucket
    Rb(bucket::BucketArgs),

    /// Upload a local file
    Put(transfer::PutArgs),

    /// Download an object to a local file
    Get(transfer::GetArgs),

    /// Write an object's content to stdout
    Cat(object::ObjectArgs),

    /// Store stdin as an object
    Pipe(object::ObjectArgs),

    /// Delete an object
    Rm(object::ObjectArgs),

    /// Generate a presigned URL for an object
    Share(share::ShareArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Cli {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

/// Run the parsed command line
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = cli.output_config();
    let conn = cli.connection;

    match cli.command {
        Commands::Providers => providers::execute(conn.region.as_deref(), output_config),
        Commands::Profile(cmd) => profile::execute(cmd, &conn, output_config),
        Commands::Ls(args) => bucket::execute_ls(args, &conn, output_config).await,
        Commands::Mb(args) => bucket::execute_mb(args, &conn, output_config).await,
        Commands::Rb(args) => bucket::execute_rb(args, &conn, output_config).await,
        Commands::Put(args) => transfer::execute_put(args, &conn, output_config).await,
        Commands::Get(args) => transfer::execute_get(args, &conn, output_config).await,
        Commands::Cat(args) => object::execute_cat(args, &conn, output_config).await,
        Commands::Pipe(args) => object::execute_pipe(args, &conn, output_config).await,
        Commands::Rm(args) => object::execute_rm(args, &conn, output_config).await,
        Commands::Share(args) => share::execute(args, &conn, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}
