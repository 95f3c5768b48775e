//! Azure client backed by the `az` CLI.
//!
//! Managed image deletion covers the backing storage, so Azure yields
//! no separately swept snapshots. Network security groups map to the
//! security-group kind; key pairs do not exist as resources.

use crate::error::{Error, Result};
use crate::provider::{ProviderClient, binary_on_path, run_checked, run_json};
use crate::types::{BUILDER_TAG_KEY, BUILDER_TAG_VALUE, CloudResource, Provider, ResourceKind};
use serde_json::Value;
use std::collections::BTreeMap;

const BIN: &str = "az";

/// Client that executes `az` commands.
pub struct AzureClient {
    bin: String,
}

impl AzureClient {
    pub fn new() -> Self {
        Self {
            bin: BIN.to_string(),
        }
    }

    fn az_json(&self, args: &[&str]) -> Result<Value> {
        let mut full = args.to_vec();
        full.push("--output");
        full.push("json");
        run_json(Provider::Azure, &self.bin, &full)
    }
}

impl Default for AzureClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient for AzureClient {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn is_available(&self) -> bool {
        binary_on_path(&self.bin)
    }

    fn check_auth(&self) -> Result<()> {
        self.az_json(&["account", "show"]).map(|_| ())
    }

    fn list_resources(&self, prefix: &str) -> Result<Vec<CloudResource>> {
        let mut resources = Vec::new();

        // JMESPath prefix filtering happens server-side in the CLI.
        let query = format!("[?starts_with(name, '{}')]", jmes_literal(prefix));
        let json = self.az_json(&["image", "list", "--query", &query])?;
        resources.extend(resources_from_json(&json, ResourceKind::Image));

        let json = self.az_json(&["network", "nsg", "list", "--query", &query])?;
        resources.extend(resources_from_json(&json, ResourceKind::SecurityGroup));

        Ok(resources)
    }

    fn list_builder_instances(&self) -> Result<Vec<CloudResource>> {
        let query = format!("[?tags.\"{BUILDER_TAG_KEY}\" == '{BUILDER_TAG_VALUE}']");
        let json = self.az_json(&["vm", "list", "--show-details", "--query", &query])?;
        let instances = resources_from_json(&json, ResourceKind::Instance)
            .into_iter()
            .filter(|vm| {
                // --show-details exposes powerState; only live builders
                // are emergency-cleanup targets.
                vm.tag("powerState")
                    .map(|s| s.contains("running") || s.contains("starting"))
                    .unwrap_or(true)
            })
            .collect();
        Ok(instances)
    }

    fn find_image(&self, name: &str) -> Result<Option<CloudResource>> {
        let query = format!("[?name == '{}']", jmes_literal(name));
        let json = self.az_json(&["image", "list", "--query", &query])?;
        Ok(resources_from_json(&json, ResourceKind::Image)
            .into_iter()
            .next())
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        match resource.kind {
            ResourceKind::Image => run_checked(
                Provider::Azure,
                &self.bin,
                &["image", "delete", "--ids", &resource.id],
            ),
            ResourceKind::Instance => run_checked(
                Provider::Azure,
                &self.bin,
                &["vm", "delete", "--ids", &resource.id, "--yes"],
            ),
            ResourceKind::SecurityGroup => run_checked(
                Provider::Azure,
                &self.bin,
                &["network", "nsg", "delete", "--ids", &resource.id],
            ),
            ResourceKind::Snapshot | ResourceKind::KeyPair => Err(Error::Other(format!(
                "azure does not sweep {} resources",
                resource.kind
            ))),
        }
    }
}

/// Quote a value for embedding in a JMESPath raw string literal.
///
/// Raw string literals are single-quoted; embedded quotes and
/// backslashes must be backslash-escaped or the query breaks.
fn jmes_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(ToString::to_string)
}

/// Azure tags are a flat string map; powerState from `vm list -d` is
/// folded in as a pseudo-tag so instance filtering stays uniform.
fn tags_from_json(value: &Value) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    if let Some(map) = value.get("tags").and_then(Value::as_object) {
        for (k, v) in map {
            if let Some(v) = v.as_str() {
                tags.insert(k.clone(), v.to_string());
            }
        }
    }
    if let Some(state) = str_field(value, "powerState") {
        tags.insert("powerState".to_string(), state);
    }
    tags
}

fn resources_from_json(json: &Value, kind: ResourceKind) -> Vec<CloudResource> {
    let Some(items) = json.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let (id, name) = (str_field(item, "id")?, str_field(item, "name")?);
            let mut resource = CloudResource::new(Provider::Azure, kind, id, name);
            if let Some(group) = str_field(item, "resourceGroup") {
                resource = resource.with_location(group);
            }
            resource.tags = tags_from_json(item);
            Some(resource)
        })
        .collect()
}
