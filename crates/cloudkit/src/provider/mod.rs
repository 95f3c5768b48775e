//! Provider abstraction for cloud resource operations.
//!
//! The [`ProviderClient`] trait defines the interface each cloud is
//! driven through, allowing for different implementations (real vendor
//! CLI, mock for testing). Listing is filtered server-side where the
//! CLI supports it; callers re-apply the match policy client-side.

pub mod aws;
pub mod azure;
pub mod gcp;

use crate::error::{Error, Result};
use crate::types::{CloudResource, Provider};
use serde_json::Value;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Client trait for one cloud provider.
///
/// Every operation maps to one or more vendor CLI invocations. A
/// provider that is unavailable or unauthenticated is skipped by
/// callers, never treated as fatal. Empty listings are `Ok(vec![])`.
pub trait ProviderClient: Send + Sync {
    /// Which provider this client talks to.
    fn provider(&self) -> Provider;

    /// Check if the vendor CLI is installed.
    fn is_available(&self) -> bool;

    /// Check that credentials are present and accepted.
    fn check_auth(&self) -> Result<()>;

    /// List named build resources (images, snapshots, security groups,
    /// key pairs) whose name starts with `prefix`.
    fn list_resources(&self, prefix: &str) -> Result<Vec<CloudResource>>;

    /// List running/pending instances carrying the builder tag,
    /// independent of any name prefix.
    fn list_builder_instances(&self) -> Result<Vec<CloudResource>>;

    /// Look up a single image by exact name.
    fn find_image(&self, name: &str) -> Result<Option<CloudResource>>;

    /// Delete one resource. Individual failures are reported to the
    /// caller; they never abort a batch.
    fn delete(&self, resource: &CloudResource) -> Result<()>;
}

/// Get clients for all supported providers (real vendor CLIs).
pub fn default_clients() -> Vec<Box<dyn ProviderClient>> {
    vec![
        Box::new(aws::AwsClient::new()),
        Box::new(gcp::GcpClient::new()),
        Box::new(azure::AzureClient::new()),
    ]
}

/// Whether `bin` can be spawned at all.
pub(crate) fn binary_on_path(bin: &str) -> bool {
    Command::new(bin)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Run a vendor CLI command and return trimmed stdout.
pub(crate) fn run_capture(provider: Provider, bin: &str, args: &[&str]) -> Result<String> {
    log::debug!("{provider}: {bin} {}", args.join(" "));

    let output = Command::new(bin).args(args).output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::MissingDependency {
                tool: bin.to_string(),
            }
        } else {
            Error::Other(format!("failed to execute {bin}: {e}"))
        }
    })?;

    if !output.status.success() {
        return Err(Error::from_cli_stderr(
            provider,
            &String::from_utf8_lossy(&output.stderr),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a vendor CLI command and parse its stdout as JSON.
///
/// An empty stdout (some CLIs print nothing for empty listings) parses
/// as `Value::Null`.
pub(crate) fn run_json(provider: Provider, bin: &str, args: &[&str]) -> Result<Value> {
    let stdout = run_capture(provider, bin, args)?;
    if stdout.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&stdout).map_err(|e| Error::ParseFailure {
        provider,
        message: e.to_string(),
    })
}

/// Run a vendor CLI command for its side effect only.
pub(crate) fn run_checked(provider: Provider, bin: &str, args: &[&str]) -> Result<()> {
    run_capture(provider, bin, args).map(|_| ())
}
