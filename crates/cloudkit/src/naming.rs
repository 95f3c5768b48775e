//! Image naming and version-conflict policy.
//!
//! Images are published as `<base>-<provider>-v<version>` per provider.
//! Before a build starts, the configured name/version pair is checked
//! against every reachable provider and conflicts are resolved by an
//! explicit [`ConflictPolicy`] instead of ad-hoc per-command behavior.

use crate::error::{Error, Result};
use crate::provider::ProviderClient;
use crate::types::{CloudResource, Provider};
use semver::Version;

/// Ceiling on auto-increment attempts before giving up.
const MAX_BUMP_ATTEMPTS: u64 = 1000;

/// Full image name for one provider, e.g. `poc-nginx-image-aws-v1.0.0`.
///
/// GCP resource names only allow lowercase letters, digits and dashes,
/// so the version dots become dashes there (`-gcp-v1-0-0`).
pub fn image_name(base: &str, provider: Provider, version: &Version) -> String {
    let version = match provider {
        Provider::Gcp => version.to_string().replace('.', "-"),
        _ => version.to_string(),
    };
    format!("{}-{}-v{}", base, provider.name(), version)
}

/// What to do when the requested image name/version already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Report the conflict and fail
    Fail,
    /// Leave the existing image alone and skip the build
    Skip,
    /// Proceed; the existing image gets replaced at build time
    Overwrite,
    /// Bump the patch version until a free name is found
    AutoIncrement,
}

impl ConflictPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ConflictPolicy::Fail => "fail",
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::AutoIncrement => "auto-increment",
        }
    }
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Find existing images colliding with `base`/`version` on every
/// reachable provider.
///
/// Providers whose CLI is absent or unauthenticated are skipped with a
/// warning; a conflict there cannot be detected, which mirrors how the
/// subsequent build would behave anyway.
pub fn find_conflicts(
    clients: &[Box<dyn ProviderClient>],
    base: &str,
    version: &Version,
) -> Result<Vec<CloudResource>> {
    let mut conflicts = Vec::new();

    for client in clients {
        let provider = client.provider();
        if !client.is_available() {
            log::warn!("{provider}: CLI not installed, skipping duplicate check");
            continue;
        }
        if let Err(e) = client.check_auth() {
            log::warn!("{provider}: {e}, skipping duplicate check");
            continue;
        }

        let name = image_name(base, provider, version);
        if let Some(existing) = client.find_image(&name)? {
            conflicts.push(existing);
        }
    }

    Ok(conflicts)
}

/// Bump the patch component until no provider reports a conflict.
///
/// Returns the first free version at or after `start`.
pub fn next_free_version(
    clients: &[Box<dyn ProviderClient>],
    base: &str,
    start: &Version,
) -> Result<Version> {
    let mut candidate = start.clone();

    for _ in 0..MAX_BUMP_ATTEMPTS {
        if find_conflicts(clients, base, &candidate)?.is_empty() {
            return Ok(candidate);
        }
        candidate = Version::new(candidate.major, candidate.minor, candidate.patch + 1);
    }

    Err(Error::Other(format!(
        "no free version found for '{base}' after {MAX_BUMP_ATTEMPTS} attempts"
    )))
}
