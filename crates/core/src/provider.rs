//! Provider registry
//!
//! A closed, compile-time table mapping each supported S3-compatible vendor
//! to its default endpoint, region, and signature scheme.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Request signing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SignatureVersion {
    /// AWS Signature Version 4
    #[default]
    #[serde(rename = "s3v4")]
    V4,
}

impl SignatureVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureVersion::V4 => "s3v4",
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static defaults for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Default endpoint; `None` lets the SDK resolve the AWS global endpoint
    pub endpoint_url: Option<&'static str>,
    pub region_name: &'static str,
    pub signature_version: SignatureVersion,
}

const AWS: ProviderConfig = ProviderConfig {
    endpoint_url: None,
    region_name: "us-east-1",
    signature_version: SignatureVersion::V4,
};

const WASABI: ProviderConfig = ProviderConfig {
    endpoint_url: Some("https://s3.wasabisys.com"),
    region_name: "us-east-1",
    signature_version: SignatureVersion::V4,
};

const BACKBLAZE: ProviderConfig = ProviderConfig {
    endpoint_url: Some("https://s3.us-west-000.backblazeb2.com"),
    region_name: "us-west-000",
    signature_version: SignatureVersion::V4,
};

const DIGITALOCEAN: ProviderConfig = ProviderConfig {
    endpoint_url: Some("https://nyc3.digitaloceanspaces.com"),
    region_name: "nyc3",
    signature_version: SignatureVersion::V4,
};

/// Wasabi service regions with a dedicated endpoint host
const WASABI_REGION_ENDPOINTS: &[(&str, &str)] = &[
    ("us-east-1", "https://s3.wasabisys.com"),
    ("us-east-2", "https://s3.us-east-2.wasabisys.com"),
    ("us-west-1", "https://s3.us-west-1.wasabisys.com"),
    ("eu-central-1", "https://s3.eu-central-1.wasabisys.com"),
    ("ap-northeast-1", "https://s3.ap-northeast-1.wasabisys.com"),
];

/// A supported S3-compatible storage vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Wasabi,
    Backblaze,
    DigitalOcean,
}

impl Provider {
    /// Every provider, in registry order
    pub const ALL: [Provider; 4] = [
        Provider::Aws,
        Provider::Wasabi,
        Provider::Backblaze,
        Provider::DigitalOcean,
    ];

    /// Identifier used on the command line and in profiles
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Wasabi => "wasabi",
            Provider::Backblaze => "backblaze",
            Provider::DigitalOcean => "digitalocean",
        }
    }

    /// Human-readable vendor name
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS S3",
            Provider::Wasabi => "Wasabi",
            Provider::Backblaze => "Backblaze B2",
            Provider::DigitalOcean => "DigitalOcean Spaces",
        }
    }

    /// Static defaults for this provider
    pub fn config(&self) -> &'static ProviderConfig {
        match self {
            Provider::Aws => &AWS,
            Provider::Wasabi => &WASABI,
            Provider::Backblaze => &BACKBLAZE,
            Provider::DigitalOcean => &DIGITALOCEAN,
        }
    }

    pub fn default_region(&self) -> &'static str {
        self.config().region_name
    }

    /// Endpoint for a specific region.
    ///
    /// Wasabi only knows a fixed set of regions and falls back to its
    /// us-east-1 host. Backblaze and DigitalOcean interpolate the region into
    /// their hostname template without checking that such a region exists, so
    /// a misspelled region yields a well-formed but unreachable endpoint.
    pub fn regional_endpoint(&self, region: &str) -> Option<String> {
        match self {
            Provider::Aws => None,
            Provider::Wasabi => {
                let endpoint = WASABI_REGION_ENDPOINTS
                    .iter()
                    .find(|(name, _)| *name == region)
                    .map(|(_, url)| *url)
                    .unwrap_or(WASABI_REGION_ENDPOINTS[0].1);
                Some(endpoint.to_string())
            }
            Provider::Backblaze => Some(format!("https://s3.{region}.backblazeb2.com")),
            Provider::DigitalOcean => Some(format!("https://{region}.digitaloceanspaces.com")),
        }
    }

    /// Conventional environment variables holding (access key, secret key)
    pub fn credential_env_vars(&self) -> (&'static str, &'static str) {
        match self {
            Provider::Aws => ("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"),
            Provider::Wasabi => ("WASABI_ACCESS_KEY", "WASABI_SECRET_KEY"),
            Provider::Backblaze => ("B2_ACCESS_KEY", "B2_SECRET_KEY"),
            Provider::DigitalOcean => ("DO_ACCESS_KEY", "DO_SECRET_KEY"),
        }
    }

    /// Comma-separated identifiers of every supported provider
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Provider::id)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| Error::UnsupportedProvider {
                provider: s.to_string(),
            })
    }
}

/// Look up the static defaults for a provider identifier
pub fn resolve(provider_id: &str) -> Result<&'static ProviderConfig> {
    provider_id.parse::<Provider>().map(|p| p.config())
}
