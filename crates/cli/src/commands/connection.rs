//! Connection settings shared by every remote command
//!
//! Settings come from a saved profile or from flags. Credentials fall back to
//! `S3P_ACCESS_KEY`/`S3P_SECRET_KEY`, then to the provider's conventional
//! variables (`AWS_ACCESS_KEY_ID`, `WASABI_ACCESS_KEY`, `B2_ACCESS_KEY`,
//! `DO_ACCESS_KEY` and their secret counterparts).

use anyhow::{Context, bail};
use clap::Args;
use s3p_core::{ClientConfig, ProfileManager, Provider};
use s3p_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Use a saved profile
    #[arg(long, global = true, env = "S3P_PROFILE")]
    pub profile: Option<String>,

    /// Storage provider: aws, wasabi, backblaze, digitalocean (default: aws)
    #[arg(long, global = true, env = "S3P_PROVIDER")]
    pub provider: Option<String>,

    /// Access key ID
    #[arg(long, global = true, env = "S3P_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, global = true, env = "S3P_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Endpoint URL, overriding the provider default
    #[arg(long, global = true, env = "S3P_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Region, overriding the provider default
    #[arg(long, global = true, env = "S3P_REGION")]
    pub region: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, global = true)]
    pub path_style: bool,
}

impl ConnectionArgs {
    /// Build a client, reporting failures through `formatter`
    pub fn connect(&self, formatter: &Formatter) -> Result<S3Client, ExitCode> {
        let resolved = ProfileManager::new()
            .map_err(anyhow::Error::from)
            .and_then(|profiles| self.client_config(&profiles, |name| std::env::var(name).ok()));

        match resolved {
            Ok(config) => {
                tracing::debug!(profile = ?self.profile, ?config, "Resolved connection");
                Ok(S3Client::from_config(config))
            }
            Err(e) => {
                formatter.error(&format!("{e:#}"));
                Err(ExitCode::from(&e))
            }
        }
    }

    /// Resolve the effective client configuration.
    ///
    /// Explicit `--region`, `--endpoint` and `--path-style` also override the
    /// values stored in a profile.
    pub fn client_config(
        &self,
        profiles: &ProfileManager,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ClientConfig> {
        if let Some(name) = &self.profile {
            let mut profile = profiles
                .get(name)
                .with_context(|| format!("Failed to load profile '{name}'"))?;
            if self.region.is_some() {
                profile.region = self.region.clone();
            }
            if self.endpoint.is_some() {
                profile.endpoint = self.endpoint.clone();
            }
            profile.path_style |= self.path_style;
            return Ok(profile.client_config());
        }

        let provider: Provider = self.provider.as_deref().unwrap_or("aws").parse()?;
        let (access_var, secret_var) = provider.credential_env_vars();

        let Some(access_key) = self.access_key.clone().or_else(|| env(access_var)) else {
            bail!("Missing access key: use --access-key, S3P_ACCESS_KEY or {access_var}");
        };
        let Some(secret_key) = self.secret_key.clone().or_else(|| env(secret_var)) else {
            bail!("Missing secret key: use --secret-key, S3P_SECRET_KEY or {secret_var}");
        };

        Ok(ClientConfig::regional(
            provider,
            access_key,
            secret_key,
            self.region.as_deref(),
            self.endpoint.as_deref(),
        )
        .with_path_style(self.path_style))
    }
}
