use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Variables handed to Packer via `-var-file`.
///
/// This is the only state bakectl persists: a single human-edited JSON
/// file with the image name, version and per-provider identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVars {
    pub image_name: String,
    pub image_version: String,

    pub aws_region: String,
    pub aws_instance_type: String,

    pub gcp_project_id: String,
    pub gcp_zone: String,

    pub azure_resource_group: String,
    pub azure_location: String,
}

impl BuildVars {
    /// Starter file for the operator to edit before the first build.
    pub fn template() -> Self {
        Self {
            image_name: sweeper::DEFAULT_PREFIX.to_string(),
            image_version: "1.0.0".to_string(),
            aws_region: "us-east-1".to_string(),
            aws_instance_type: "t3.micro".to_string(),
            gcp_project_id: "your-project-id".to_string(),
            gcp_zone: "us-central1-a".to_string(),
            azure_resource_group: "your-resource-group".to_string(),
            azure_location: "eastus".to_string(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid variables file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Whether the file still carries unedited template placeholders.
    pub fn has_placeholders(&self) -> bool {
        self.gcp_project_id == "your-project-id"
            || self.azure_resource_group == "your-resource-group"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("variables.json");

        let mut vars = BuildVars::template();
        vars.image_name = "poc-nginx-image".to_string();
        vars.gcp_project_id = "acme-builds".to_string();
        vars.azure_resource_group = "acme-images".to_string();
        vars.save(&path).unwrap();

        let loaded = BuildVars::load(&path).unwrap();
        assert_eq!(loaded, vars);
        assert!(!loaded.has_placeholders());
    }

    #[test]
    fn test_template_has_placeholders() {
        assert!(BuildVars::template().has_placeholders());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("variables.json");
        fs::write(&path, "image_name = poc").unwrap();

        assert!(BuildVars::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(BuildVars::load(&dir.path().join("nope.json")).is_err());
    }
}
