//! GCP client backed by the `gcloud` CLI.
//!
//! GCP images carry no separately swept snapshot and key pairs are not
//! first-class resources there; firewall rules stand in for security
//! groups.

use crate::error::{Error, ErrorCategory, Result};
use crate::provider::{ProviderClient, binary_on_path, run_checked, run_json};
use crate::types::{BUILDER_TAG_KEY, BUILDER_TAG_VALUE, CloudResource, Provider, ResourceKind};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

const BIN: &str = "gcloud";

/// Client that executes `gcloud compute` commands.
pub struct GcpClient {
    bin: String,
}

impl GcpClient {
    pub fn new() -> Self {
        Self {
            bin: BIN.to_string(),
        }
    }

    fn compute_json(&self, args: &[&str]) -> Result<Value> {
        let mut full = vec!["compute"];
        full.extend_from_slice(args);
        full.push("--format=json");
        run_json(Provider::Gcp, &self.bin, &full)
    }
}

impl Default for GcpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient for GcpClient {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    fn is_available(&self) -> bool {
        binary_on_path(&self.bin)
    }

    fn check_auth(&self) -> Result<()> {
        let json = run_json(
            Provider::Gcp,
            &self.bin,
            &["auth", "list", "--filter=status:ACTIVE", "--format=json"],
        )?;
        let active = json.as_array().map(Vec::len).unwrap_or(0);
        if active == 0 {
            return Err(Error::AuthMissing {
                provider: Provider::Gcp,
                message: "no active gcloud account".to_string(),
            });
        }
        Ok(())
    }

    fn list_resources(&self, prefix: &str) -> Result<Vec<CloudResource>> {
        let mut resources = Vec::new();

        let filter = format!("--filter=name:{prefix}*");
        let json = self.compute_json(&["images", "list", "--no-standard-images", &filter])?;
        resources.extend(images_from_json(&json));

        let json = self.compute_json(&["firewall-rules", "list", &filter])?;
        resources.extend(firewall_rules_from_json(&json));

        Ok(resources)
    }

    fn list_builder_instances(&self) -> Result<Vec<CloudResource>> {
        let filter = format!(
            "--filter=labels.{BUILDER_TAG_KEY}={BUILDER_TAG_VALUE} AND status:(RUNNING,PROVISIONING,STAGING)"
        );
        let json = self.compute_json(&["instances", "list", &filter])?;
        Ok(instances_from_json(&json))
    }

    fn find_image(&self, name: &str) -> Result<Option<CloudResource>> {
        match self.compute_json(&["images", "describe", name]) {
            Ok(json) => Ok(image_from_json(&json)),
            Err(e) if e.category() == ErrorCategory::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        let zone_flag;
        let mut args: Vec<&str> = vec!["compute"];
        match resource.kind {
            ResourceKind::Image => args.extend(["images", "delete", &resource.name]),
            ResourceKind::Snapshot => args.extend(["snapshots", "delete", &resource.name]),
            ResourceKind::SecurityGroup => {
                args.extend(["firewall-rules", "delete", &resource.name]);
            }
            ResourceKind::Instance => {
                args.extend(["instances", "delete", &resource.name]);
                if let Some(zone) = &resource.location {
                    zone_flag = format!("--zone={zone}");
                    args.push(&zone_flag);
                }
            }
            ResourceKind::KeyPair => {
                return Err(Error::Other(
                    "gcp has no standalone key pair resources".to_string(),
                ));
            }
        }
        args.push("--quiet");
        run_checked(Provider::Gcp, &self.bin, &args)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(ToString::to_string)
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn labels_from_json(value: &Value) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    if let Some(map) = value.get("labels").and_then(Value::as_object) {
        for (k, v) in map {
            if let Some(v) = v.as_str() {
                labels.insert(k.clone(), v.to_string());
            }
        }
    }
    labels
}

/// gcloud reports zones as resource URLs; the zone name is the last
/// path segment.
fn zone_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

fn image_from_json(img: &Value) -> Option<CloudResource> {
    let (id, name) = (str_field(img, "id")?, str_field(img, "name")?);
    let mut resource = CloudResource::new(Provider::Gcp, ResourceKind::Image, id, name);
    if let Some(at) = str_field(img, "creationTimestamp")
        .as_deref()
        .and_then(parse_time)
    {
        resource = resource.with_created_at(at);
    }
    resource.tags = labels_from_json(img);
    Some(resource)
}

fn images_from_json(json: &Value) -> Vec<CloudResource> {
    json.as_array()
        .map(|items| items.iter().filter_map(image_from_json).collect())
        .unwrap_or_default()
}

fn firewall_rules_from_json(json: &Value) -> Vec<CloudResource> {
    let Some(items) = json.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|rule| {
            let (id, name) = (str_field(rule, "id")?, str_field(rule, "name")?);
            Some(CloudResource::new(
                Provider::Gcp,
                ResourceKind::SecurityGroup,
                id,
                name,
            ))
        })
        .collect()
}

fn instances_from_json(json: &Value) -> Vec<CloudResource> {
    let Some(items) = json.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|inst| {
            let (id, name) = (str_field(inst, "id")?, str_field(inst, "name")?);
            let mut resource = CloudResource::new(Provider::Gcp, ResourceKind::Instance, id, name);
            if let Some(zone) = str_field(inst, "zone") {
                resource = resource.with_location(zone_from_url(&zone));
            }
            if let Some(at) = str_field(inst, "creationTimestamp")
                .as_deref()
                .and_then(parse_time)
            {
                resource = resource.with_created_at(at);
            }
            resource.tags = labels_from_json(inst);
            Some(resource)
        })
        .collect()
}
