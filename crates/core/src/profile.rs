//! Named connection profiles
//!
//! Profiles are stored as TOML in `$S3P_CONFIG_DIR/profiles.toml`, or under
//! the platform config directory when the variable is unset.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::provider::Provider;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "S3P_CONFIG_DIR";

const PROFILES_FILE: &str = "profiles.toml";

/// Saved connection settings for one provider account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip)]
    pub name: String,
    pub provider: Provider,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        provider: Provider,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: None,
            endpoint: None,
            path_style: false,
        }
    }

    /// Client configuration for this profile, with region-aware endpoints
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::regional(
            self.provider,
            self.access_key.clone(),
            self.secret_key.clone(),
            self.region.as_deref(),
            self.endpoint.as_deref(),
        )
        .with_path_style(self.path_style)
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("path_style", &self.path_style)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Reads and writes the profiles file
#[derive(Debug, Clone)]
pub struct ProfileManager {
    path: PathBuf,
}

impl ProfileManager {
    /// Use the default configuration directory
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|d| d.join("s3p"))
                .ok_or_else(|| Error::Config("Cannot determine config directory".to_string()))?,
        };
        Ok(Self::with_dir(dir))
    }

    /// Use an explicit configuration directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(PROFILES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles, sorted by name
    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.load()?.profiles.into_values().collect())
    }

    pub fn get(&self, name: &str) -> Result<Profile> {
        self.load()?
            .profiles
            .remove(name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or replace a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        if profile.name.is_empty() {
            return Err(Error::Config("Profile name cannot be empty".to_string()));
        }

        let mut file = self.load()?;
        tracing::debug!(profile = %profile.name, provider = %profile.provider, "Saving profile");
        file.profiles.insert(profile.name.clone(), profile);
        self.save(&file)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut file = self.load()?;
        if file.profiles.remove(name).is_none() {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        self.save(&file)
    }

    fn load(&self) -> Result<ProfilesFile> {
        if !self.path.exists() {
            return Ok(ProfilesFile::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut file: ProfilesFile = toml::from_str(&content)?;
        for (name, profile) in file.profiles.iter_mut() {
            profile.name = name.clone();
        }
        Ok(file)
    }

    fn save(&self, file: &ProfilesFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(file)?;
        std::fs::write(&self.path, content)?;

        // The file holds secret keys.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
