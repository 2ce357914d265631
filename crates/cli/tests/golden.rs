//! Golden tests for verifying JSON output format stability
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the s3p binary against an isolated config directory
fn s3p(config_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s3p"))
        .args(args)
        .env("S3P_CONFIG_DIR", config_dir.path())
        .env_remove("S3P_PROFILE")
        .env_remove("S3P_PROVIDER")
        .env_remove("S3P_REGION")
        .env_remove("S3P_ENDPOINT")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute s3p")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

fn stderr_json(output: &Output) -> serde_json::Value {
    let stderr = String::from_utf8_lossy(&output.stderr);
    serde_json::from_str(&stderr).expect("Error output should be valid JSON")
}

mod providers_tests {
    use super::*;

    #[test]
    fn test_providers_json() {
        let dir = TempDir::new().unwrap();
        let output = s3p(&dir, &["providers", "--json"]);
        assert!(output.status.success(), "Command should succeed");

        let json = stdout_json(&output);
        insta::assert_json_snapshot!("providers", json);
    }

    #[test]
    fn test_providers_for_region() {
        let dir = TempDir::new().unwrap();
        let output = s3p(&dir, &["providers", "--region", "sgp1", "--json"]);
        assert!(output.status.success(), "Command should succeed");

        let json = stdout_json(&output);
        let providers = json["providers"].as_array().unwrap();
        assert_eq!(providers.len(), 4);
        assert_eq!(
            providers[3]["endpoint_url"],
            "https://sgp1.digitaloceanspaces.com"
        );
        assert_eq!(providers[1]["endpoint_url"], "https://s3.wasabisys.com");
    }
}

mod profile_tests {
    use super::*;

    #[test]
    fn test_profile_list_empty_json() {
        let dir = TempDir::new().unwrap();
        let output = s3p(&dir, &["profile", "list", "--json"]);
        assert!(output.status.success(), "Command should succeed");

        insta::assert_json_snapshot!("profile_list_empty", stdout_json(&output));
    }

    #[test]
    fn test_profile_set_and_list_json() {
        let dir = TempDir::new().unwrap();
        let output = s3p(
            &dir,
            &[
                "profile",
                "set",
                "b2",
                "--provider",
                "backblaze",
                "--access-key",
                "keyid",
                "--secret-key",
                "appkey",
                "--region",
                "eu-central-003",
                "--json",
            ],
        );
        assert!(output.status.success(), "Command should succeed");
        assert_eq!(stdout_json(&output)["success"], true);

        let output = s3p(&dir, &["profile", "list", "--json"]);
        let json = stdout_json(&output);
        assert_eq!(json["profiles"][0]["name"], "b2");
        assert_eq!(
            json["profiles"][0]["endpoint"],
            "https://s3.eu-central-003.backblazeb2.com"
        );

        // Secrets never appear in output
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("appkey"));
    }

    #[test]
    fn test_profile_remove_not_found_json() {
        let dir = TempDir::new().unwrap();
        let output = s3p(&dir, &["profile", "remove", "ghost", "--json"]);

        assert!(!output.status.success(), "Command should fail");
        assert_eq!(output.status.code(), Some(5), "Exit code should be 5 (NOT_FOUND)");

        insta::assert_json_snapshot!("profile_remove_not_found", stderr_json(&output));
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_unsupported_provider_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let output = s3p(
            &dir,
            &[
                "ls",
                "--provider",
                "gcs",
                "--access-key",
                "a",
                "--secret-key",
                "s",
                "--json",
            ],
        );

        assert_eq!(output.status.code(), Some(2), "Exit code should be 2 (USAGE)");
        let json = stderr_json(&output);
        assert_eq!(
            json["error"],
            "Unsupported provider: gcs. Supported providers: aws, wasabi, backblaze, digitalocean"
        );
    }
}
