//! Typed clients for cloud provider CLIs.
//!
//! cloudkit wraps the vendor command-line tools (`aws`, `gcloud`, `az`)
//! behind the [`ProviderClient`] trait so callers enumerate and delete
//! build resources through one typed interface instead of assembling
//! shell strings per provider.

pub mod error;
pub mod naming;
pub mod provider;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use naming::{ConflictPolicy, image_name};
pub use provider::ProviderClient;
pub use types::{BUILDER_TAG_KEY, BUILDER_TAG_VALUE, CloudResource, Provider, ResourceKind};
