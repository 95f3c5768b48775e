//! Core types for cloud build resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tag key stamped on resources created during an image build.
pub const BUILDER_TAG_KEY: &str = "created-by";

/// Tag value identifying resources owned by the image builder.
pub const BUILDER_TAG_VALUE: &str = "bakectl-packer";

/// Cloud provider a resource lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    /// All supported providers, in sweep order.
    pub fn all() -> &'static [Provider] {
        &[Provider::Aws, Provider::Gcp, Provider::Azure]
    }

    /// Short lowercase name, used in image names ("foo-aws-v1.0.0").
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
            Provider::Azure => "azure",
        }
    }

    /// Vendor CLI binary this provider is driven through.
    pub fn cli_binary(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcloud",
            Provider::Azure => "az",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "aws" => Some(Provider::Aws),
            "gcp" => Some(Provider::Gcp),
            "azure" => Some(Provider::Azure),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of cloud resource the builder can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Instance,
    Image,
    Snapshot,
    SecurityGroup,
    KeyPair,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Image => "image",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::SecurityGroup => "security group",
            ResourceKind::KeyPair => "key pair",
        }
    }

    /// Position in the deletion order. Instances go first (they pin
    /// security groups), snapshots only after the images that own them.
    pub fn delete_rank(&self) -> u8 {
        match self {
            ResourceKind::Instance => 0,
            ResourceKind::Image => 1,
            ResourceKind::Snapshot => 2,
            ResourceKind::SecurityGroup => 3,
            ResourceKind::KeyPair => 4,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single resource returned by a provider listing.
///
/// Constructed fresh from each provider query and discarded at the end of
/// the run; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResource {
    pub provider: Provider,
    pub kind: ResourceKind,
    /// Provider-assigned identifier (AMI id, self-link name, ARM id).
    pub id: String,
    /// Human-facing name, the thing prefix matching runs against.
    pub name: String,
    /// Creation time where the provider reports one.
    pub created_at: Option<DateTime<Utc>>,
    /// Ids of resources this one depends on (snapshot -> owning image).
    pub parent_refs: BTreeSet<String>,
    /// Provider tags/labels, used for builder-ownership matching.
    pub tags: BTreeMap<String, String>,
    /// Placement needed for deletion (GCP zone, Azure resource group).
    pub location: Option<String>,
}

impl CloudResource {
    pub fn new(
        provider: Provider,
        kind: ResourceKind,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            kind,
            id: id.into(),
            name: name.into(),
            created_at: None,
            parent_refs: BTreeSet::new(),
            tags: BTreeMap::new(),
            location: None,
        }
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_refs.insert(parent_id.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Look up a tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether this resource carries the builder ownership marker.
    pub fn is_builder_owned(&self) -> bool {
        self.tag(BUILDER_TAG_KEY) == Some(BUILDER_TAG_VALUE)
    }

    /// Whether `other` is a parent of this resource.
    pub fn depends_on(&self, other: &CloudResource) -> bool {
        self.parent_refs.contains(&other.id)
    }
}

impl std::fmt::Display for CloudResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} ({})", self.provider, self.kind, self.name, self.id)
    }
}
