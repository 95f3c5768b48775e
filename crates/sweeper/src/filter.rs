//! Match policy - which enumerated resources are sweepable.

use crate::context::RunConfig;
use cloudkit::{CloudResource, ResourceKind};

/// Whether the resource name (or its Name tag) starts with `prefix`.
/// Matching is case-sensitive.
pub fn matches_prefix(resource: &CloudResource, prefix: &str) -> bool {
    if resource.name.starts_with(prefix) {
        return true;
    }
    resource
        .tag("Name")
        .map(|v| v.starts_with(prefix))
        .unwrap_or(false)
}

/// Whether a resource is eligible for the cleanup plan.
///
/// Builder-owned instances match independently of the prefix; they are
/// leftovers from builds that never produced a named image.
pub fn eligible(resource: &CloudResource, cfg: &RunConfig) -> bool {
    if resource.kind == ResourceKind::Instance && resource.is_builder_owned() {
        return true;
    }
    matches_prefix(resource, &cfg.prefix)
}
