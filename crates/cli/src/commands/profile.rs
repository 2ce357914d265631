//! Profile management commands
//!
//! Profiles save a provider, credentials and optional region/endpoint under a
//! name, so remote commands only need `--profile <name>`.

use clap::Subcommand;
use serde::Serialize;

use super::ConnectionArgs;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use s3p_core::{Error, Profile, ProfileManager, Provider};

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Save the connection flags (--provider, --access-key, ...) under a name
    Set(NameArg),

    /// List saved profiles
    List,

    /// Remove a profile
    Remove(NameArg),
}

#[derive(clap::Args, Debug)]
pub struct NameArg {
    /// Profile name
    pub name: String,
}

/// Profile information for output (without secrets)
#[derive(Debug, Serialize)]
struct ProfileInfo {
    name: String,
    provider: Provider,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    path_style: bool,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        let config = profile.client_config();
        Self {
            name: profile.name.clone(),
            provider: profile.provider,
            region: config.region_name,
            endpoint: config.endpoint_url,
            path_style: profile.path_style,
        }
    }
}

#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub fn execute(cmd: ProfileCommands, conn: &ConnectionArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match ProfileManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load profiles: {e}"));
            return ExitCode::GeneralError;
        }
    };

    match cmd {
        ProfileCommands::Set(args) => {
            execute_set(&args.name, conn, &manager, &formatter, |name| std::env::var(name).ok())
        }
        ProfileCommands::List => execute_list(&manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(&args.name, &manager, &formatter),
    }
}

fn execute_set(
    name: &str,
    conn: &ConnectionArgs,
    manager: &ProfileManager,
    formatter: &Formatter,
    env: impl Fn(&str) -> Option<String>,
) -> ExitCode {
    let provider: Provider = match conn.provider.as_deref().unwrap_or("aws").parse() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let (access_var, secret_var) = provider.credential_env_vars();
    let access_key = conn.access_key.clone().or_else(|| env(access_var));
    let secret_key = conn.secret_key.clone().or_else(|| env(secret_var));
    let (Some(access_key), Some(secret_key)) = (access_key, secret_key) else {
        formatter.error("Both --access-key and --secret-key are required");
        return ExitCode::UsageError;
    };

    let mut profile = Profile::new(name, provider, access_key, secret_key);
    profile.region = conn.region.clone();
    profile.endpoint = conn.endpoint.clone();
    profile.path_style = conn.path_style;

    match manager.set(profile) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: name.to_string(),
                    message: format!("Profile '{name}' saved successfully"),
                });
            } else {
                let styled = formatter.style_name(name);
                formatter.success(&format!("Profile '{styled}' saved ({provider})."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

fn execute_list(manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };
    let infos: Vec<ProfileInfo> = profiles.iter().map(ProfileInfo::from).collect();

    if formatter.is_json() {
        formatter.json(&ProfileListOutput { profiles: infos });
    } else if infos.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        for info in &infos {
            let name = formatter.style_name(&format!("{:<12}", info.name));
            let endpoint = formatter.style_url(info.endpoint.as_deref().unwrap_or("(SDK default)"));
            let region = formatter.style_date(&info.region);
            formatter.println(&format!(
                "{name} {:<13} {endpoint} (region: {region})",
                info.provider
            ));
        }
    }

    ExitCode::Success
}

fn execute_remove(name: &str, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(name) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: name.to_string(),
                    message: format!("Profile '{name}' removed successfully"),
                });
            } else {
                let styled = formatter.style_name(name);
                formatter.success(&format!("Profile '{styled}' removed."));
            }
            ExitCode::Success
        }
        Err(Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{name}' not found"));
            ExitCode::NotFound
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}
