//! providers command - Show the provider registry

use s3p_core::Provider;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Debug, Serialize)]
struct ProviderInfo {
    id: &'static str,
    name: &'static str,
    endpoint_url: Option<String>,
    region: String,
    signature_version: &'static str,
    credential_env: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct ProvidersOutput {
    providers: Vec<ProviderInfo>,
}

fn provider_info(provider: Provider, region: Option<&str>) -> ProviderInfo {
    let config = provider.config();
    let (access_var, secret_var) = provider.credential_env_vars();
    let (endpoint_url, region) = match region {
        Some(region) => (provider.regional_endpoint(region), region.to_string()),
        None => (
            config.endpoint_url.map(str::to_string),
            config.region_name.to_string(),
        ),
    };

    ProviderInfo {
        id: provider.id(),
        name: provider.display_name(),
        endpoint_url,
        region,
        signature_version: config.signature_version.as_str(),
        credential_env: [access_var, secret_var],
    }
}

/// List the registry; with a region, show the endpoint each provider derives for it
pub fn execute(region: Option<&str>, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let providers: Vec<ProviderInfo> = Provider::ALL
        .into_iter()
        .map(|p| provider_info(p, region))
        .collect();

    if formatter.is_json() {
        formatter.json(&ProvidersOutput { providers });
        return ExitCode::Success;
    }

    let rows = providers
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.to_string(),
                p.region.clone(),
                p.endpoint_url
                    .clone()
                    .unwrap_or_else(|| "(SDK default)".to_string()),
                format!("{} / {}", p.credential_env[0], p.credential_env[1]),
            ]
        })
        .collect();
    formatter.table(&["ID", "NAME", "REGION", "ENDPOINT", "CREDENTIALS"], rows);

    ExitCode::Success
}
