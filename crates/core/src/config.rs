//! Client configuration resolution
//!
//! A [`ClientConfig`] is derived once per client by overlaying caller-supplied
//! endpoint and region onto the provider's static defaults.

use std::fmt;

use crate::error::Result;
use crate::provider::{Provider, SignatureVersion};

/// Region AWS treats as the default; buckets there need no location constraint
pub const AWS_DEFAULT_REGION: &str = "us-east-1";

/// Effective settings for one storage client
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub provider: Provider,
    /// `None` only for AWS without an override (SDK endpoint resolution)
    pub endpoint_url: Option<String>,
    pub region_name: String,
    pub signature_version: SignatureVersion,
    pub access_key: String,
    pub secret_key: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
}

impl ClientConfig {
    /// Resolve configuration from a provider identifier.
    ///
    /// Explicit endpoint and region always win over the provider defaults.
    /// Empty strings are treated as "not supplied".
    pub fn resolve(
        provider_id: &str,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint_url: Option<&str>,
        region_name: Option<&str>,
    ) -> Result<Self> {
        let provider: Provider = provider_id.parse()?;
        Ok(Self::for_provider(
            provider,
            access_key,
            secret_key,
            endpoint_url,
            region_name,
        ))
    }

    /// Overlay overrides onto the static defaults of `provider`
    pub fn for_provider(
        provider: Provider,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint_url: Option<&str>,
        region_name: Option<&str>,
    ) -> Self {
        let defaults = provider.config();

        let endpoint_url = non_empty(endpoint_url)
            .map(str::to_string)
            .or_else(|| defaults.endpoint_url.map(str::to_string));
        let region_name = non_empty(region_name)
            .unwrap_or(defaults.region_name)
            .to_string();

        Self {
            provider,
            endpoint_url,
            region_name,
            signature_version: defaults.signature_version,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            force_path_style: false,
        }
    }

    /// Region-aware configuration.
    ///
    /// Uses the provider's default region when none is given and derives the
    /// endpoint for that region. An explicit endpoint still wins.
    pub fn regional(
        provider: Provider,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region_name: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let region = non_empty(region_name).unwrap_or(provider.default_region());
        let derived = provider.regional_endpoint(region);
        let endpoint = non_empty(endpoint_url).or(derived.as_deref());

        Self::for_provider(provider, access_key, secret_key, endpoint, Some(region))
    }

    pub fn with_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Location constraint required when creating a bucket.
    ///
    /// AWS rejects bucket creation outside us-east-1 without one; other
    /// providers never get it.
    pub fn location_constraint(&self) -> Option<&str> {
        if self.provider == Provider::Aws && self.region_name != AWS_DEFAULT_REGION {
            Some(&self.region_name)
        } else {
            None
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("provider", &self.provider)
            .field("endpoint_url", &self.endpoint_url)
            .field("region_name", &self.region_name)
            .field("signature_version", &self.signature_version)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
