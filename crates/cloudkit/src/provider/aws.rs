//! AWS client backed by the `aws` CLI.

use crate::error::Result;
use crate::provider::{ProviderClient, binary_on_path, run_checked, run_json};
use crate::types::{BUILDER_TAG_KEY, BUILDER_TAG_VALUE, CloudResource, Provider, ResourceKind};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

const BIN: &str = "aws";

/// Client that executes `aws ec2` commands.
pub struct AwsClient {
    bin: String,
}

impl AwsClient {
    pub fn new() -> Self {
        Self {
            bin: BIN.to_string(),
        }
    }

    fn ec2(&self, args: &[&str]) -> Result<Value> {
        let mut full = vec!["ec2"];
        full.extend_from_slice(args);
        full.push("--output");
        full.push("json");
        run_json(Provider::Aws, &self.bin, &full)
    }

    fn describe_images(&self, name_pattern: &str) -> Result<Value> {
        let filter = format!("Name=name,Values={name_pattern}");
        self.ec2(&["describe-images", "--owners", "self", "--filters", &filter])
    }
}

impl Default for AwsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient for AwsClient {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    fn is_available(&self) -> bool {
        binary_on_path(&self.bin)
    }

    fn check_auth(&self) -> Result<()> {
        run_json(
            Provider::Aws,
            &self.bin,
            &["sts", "get-caller-identity", "--output", "json"],
        )
        .map(|_| ())
    }

    fn list_resources(&self, prefix: &str) -> Result<Vec<CloudResource>> {
        let mut resources = Vec::new();

        // AMIs, plus the EBS snapshots registered under them. Snapshots
        // come out of the same listing via the block device mappings.
        let json = self.describe_images(&format!("{prefix}*"))?;
        resources.extend(images_from_json(&json));
        resources.extend(snapshots_from_images_json(&json));

        let filter = format!("Name=group-name,Values={prefix}*");
        let json = self.ec2(&["describe-security-groups", "--filters", &filter])?;
        resources.extend(security_groups_from_json(&json));

        let filter = format!("Name=key-name,Values={prefix}*");
        let json = self.ec2(&["describe-key-pairs", "--filters", &filter])?;
        resources.extend(key_pairs_from_json(&json));

        Ok(resources)
    }

    fn list_builder_instances(&self) -> Result<Vec<CloudResource>> {
        let tag_filter = format!("Name=tag:{BUILDER_TAG_KEY},Values={BUILDER_TAG_VALUE}");
        let json = self.ec2(&[
            "describe-instances",
            "--filters",
            &tag_filter,
            "Name=instance-state-name,Values=running,pending",
        ])?;
        Ok(instances_from_json(&json))
    }

    fn find_image(&self, name: &str) -> Result<Option<CloudResource>> {
        let json = self.describe_images(name)?;
        Ok(images_from_json(&json).into_iter().next())
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        match resource.kind {
            ResourceKind::Image => {
                self.ec2(&["deregister-image", "--image-id", &resource.id])?;
            }
            ResourceKind::Snapshot => {
                self.ec2(&["delete-snapshot", "--snapshot-id", &resource.id])?;
            }
            ResourceKind::Instance => {
                self.ec2(&["terminate-instances", "--instance-ids", &resource.id])?;
            }
            ResourceKind::SecurityGroup => {
                run_checked(
                    Provider::Aws,
                    &self.bin,
                    &["ec2", "delete-security-group", "--group-id", &resource.id],
                )?;
            }
            ResourceKind::KeyPair => {
                run_checked(
                    Provider::Aws,
                    &self.bin,
                    &["ec2", "delete-key-pair", "--key-pair-id", &resource.id],
                )?;
            }
        }
        Ok(())
    }
}

/// Borrow a JSON array field as a slice, empty when absent.
fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(ToString::to_string)
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// AWS tag arrays are `[{"Key": .., "Value": ..}]`.
fn tags_from_json(value: &Value) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for entry in array(value, "Tags") {
        if let (Some(k), Some(v)) = (str_field(entry, "Key"), str_field(entry, "Value")) {
            tags.insert(k, v);
        }
    }
    tags
}

fn images_from_json(json: &Value) -> Vec<CloudResource> {
    let mut images = Vec::new();
    for img in array(json, "Images") {
        let (Some(id), Some(name)) = (str_field(img, "ImageId"), str_field(img, "Name")) else {
            continue;
        };
        let mut resource = CloudResource::new(Provider::Aws, ResourceKind::Image, id, name);
        if let Some(at) = str_field(img, "CreationDate").as_deref().and_then(parse_time) {
            resource = resource.with_created_at(at);
        }
        resource.tags = tags_from_json(img);
        images.push(resource);
    }
    images
}

/// EBS snapshots backing each AMI in a describe-images listing.
///
/// Snapshots inherit the image name so prefix matching treats them the
/// same as the image they belong to.
fn snapshots_from_images_json(json: &Value) -> Vec<CloudResource> {
    let mut snapshots = Vec::new();
    for img in array(json, "Images") {
        let (Some(image_id), Some(image_name)) =
            (str_field(img, "ImageId"), str_field(img, "Name"))
        else {
            continue;
        };
        for mapping in array(img, "BlockDeviceMappings") {
            let Some(snapshot_id) = mapping
                .get("Ebs")
                .and_then(|ebs| ebs.get("SnapshotId"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            snapshots.push(
                CloudResource::new(
                    Provider::Aws,
                    ResourceKind::Snapshot,
                    snapshot_id,
                    image_name.clone(),
                )
                .with_parent(image_id.clone()),
            );
        }
    }
    snapshots
}

fn instances_from_json(json: &Value) -> Vec<CloudResource> {
    let mut instances = Vec::new();
    for reservation in array(json, "Reservations") {
        for inst in array(reservation, "Instances") {
            let Some(id) = str_field(inst, "InstanceId") else {
                continue;
            };
            let tags = tags_from_json(inst);
            let name = tags.get("Name").cloned().unwrap_or_else(|| id.clone());
            let mut resource = CloudResource::new(Provider::Aws, ResourceKind::Instance, id, name);
            if let Some(at) = str_field(inst, "LaunchTime").as_deref().and_then(parse_time) {
                resource = resource.with_created_at(at);
            }
            resource.tags = tags;
            instances.push(resource);
        }
    }
    instances
}

fn security_groups_from_json(json: &Value) -> Vec<CloudResource> {
    let mut groups = Vec::new();
    for sg in array(json, "SecurityGroups") {
        let (Some(id), Some(name)) = (str_field(sg, "GroupId"), str_field(sg, "GroupName")) else {
            continue;
        };
        groups.push(CloudResource::new(
            Provider::Aws,
            ResourceKind::SecurityGroup,
            id,
            name,
        ));
    }
    groups
}

fn key_pairs_from_json(json: &Value) -> Vec<CloudResource> {
    let mut pairs = Vec::new();
    for kp in array(json, "KeyPairs") {
        let (Some(id), Some(name)) = (str_field(kp, "KeyPairId"), str_field(kp, "KeyName")) else {
            continue;
        };
        pairs.push(CloudResource::new(
            Provider::Aws,
            ResourceKind::KeyPair,
            id,
            name,
        ));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn describe_images_fixture() -> Value {
        json!({
            "Images": [
                {
                    "ImageId": "ami-0abc",
                    "Name": "poc-nginx-image-aws-v1.0.0",
                    "CreationDate": "2026-05-01T12:30:00.000Z",
                    "Tags": [
                        {"Key": "created-by", "Value": "bakectl-packer"}
                    ],
                    "BlockDeviceMappings": [
                        {"DeviceName": "/dev/sda1", "Ebs": {"SnapshotId": "snap-0def"}},
                        {"DeviceName": "/dev/sdb", "VirtualName": "ephemeral0"}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_images_from_json() {
        let images = images_from_json(&describe_images_fixture());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "ami-0abc");
        assert_eq!(images[0].name, "poc-nginx-image-aws-v1.0.0");
        assert!(images[0].created_at.is_some());
        assert!(images[0].is_builder_owned());
    }

    #[test]
    fn test_snapshots_carry_parent_image_ref() {
        let snapshots = snapshots_from_images_json(&describe_images_fixture());
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, "snap-0def");
        assert_eq!(snapshots[0].name, "poc-nginx-image-aws-v1.0.0");
        assert!(snapshots[0].parent_refs.contains("ami-0abc"));
    }

    #[test]
    fn test_instances_from_json_uses_name_tag() {
        let json = json!({
            "Reservations": [{
                "Instances": [{
                    "InstanceId": "i-0123",
                    "LaunchTime": "2026-05-01T10:00:00+00:00",
                    "State": {"Name": "running"},
                    "Tags": [
                        {"Key": "Name", "Value": "Packer Builder"},
                        {"Key": "created-by", "Value": "bakectl-packer"}
                    ]
                }]
            }]
        });
        let instances = instances_from_json(&json);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].name, "Packer Builder");
        assert!(instances[0].is_builder_owned());
    }

    #[test]
    fn test_empty_listing_parses_to_no_resources() {
        let json = json!({"Images": []});
        assert!(images_from_json(&json).is_empty());
        assert!(snapshots_from_images_json(&json).is_empty());
    }

    #[test]
    fn test_key_pairs_and_security_groups() {
        let sg = json!({"SecurityGroups": [{"GroupId": "sg-1", "GroupName": "poc-nginx-image-build"}]});
        let kp = json!({"KeyPairs": [{"KeyPairId": "key-1", "KeyName": "poc-nginx-image-key"}]});
        assert_eq!(security_groups_from_json(&sg).len(), 1);
        assert_eq!(key_pairs_from_json(&kp).len(), 1);
    }
}
