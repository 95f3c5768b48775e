//! In-memory provider for engine tests.

use cloudkit::error::{Error, ErrorCategory};
use cloudkit::{CloudResource, Provider, ProviderClient, ResourceKind, Result};
use std::sync::Mutex;

/// Provider client over an in-memory resource set. Records delete
/// calls in order and can inject per-resource failures.
pub struct MockProvider {
    provider: Provider,
    available: bool,
    authenticated: bool,
    resources: Mutex<Vec<CloudResource>>,
    instances: Mutex<Vec<CloudResource>>,
    deleted: Mutex<Vec<String>>,
    failing: Mutex<Vec<String>>,
    gone: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            available: true,
            authenticated: true,
            resources: Mutex::new(Vec::new()),
            instances: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            gone: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Add a named resource to the provider's inventory.
    pub fn seed(&self, resource: CloudResource) {
        self.resources.lock().unwrap().push(resource);
    }

    /// Add an instance, visible only through the builder-tag listing.
    pub fn seed_instance(&self, instance: CloudResource) {
        self.instances.lock().unwrap().push(instance);
    }

    /// Make deleting `id` fail with a generic provider error.
    pub fn fail_delete(&self, id: &str) {
        self.failing.lock().unwrap().push(id.to_string());
    }

    /// Make deleting `id` report the resource as already gone.
    pub fn gone_on_delete(&self, id: &str) {
        self.gone.lock().unwrap().push(id.to_string());
    }

    /// Ids deleted so far, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl ProviderClient for MockProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn check_auth(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::AuthMissing {
                provider: self.provider,
                message: "no credentials configured".to_string(),
            })
        }
    }

    fn list_resources(&self, prefix: &str) -> Result<Vec<CloudResource>> {
        // Mimics server-side prefix filtering.
        Ok(self
            .resources
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn list_builder_instances(&self) -> Result<Vec<CloudResource>> {
        Ok(self
            .instances
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_builder_owned())
            .cloned()
            .collect())
    }

    fn find_image(&self, name: &str) -> Result<Option<CloudResource>> {
        Ok(self
            .resources
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.kind == ResourceKind::Image && r.name == name)
            .cloned())
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        if self.failing.lock().unwrap().contains(&resource.id) {
            return Err(Error::CommandFailed {
                provider: self.provider,
                message: format!("cannot delete {}", resource.id),
                category: ErrorCategory::Other,
            });
        }
        if self.gone.lock().unwrap().contains(&resource.id) {
            return Err(Error::CommandFailed {
                provider: self.provider,
                message: format!("{} was not found", resource.id),
                category: ErrorCategory::NotFound,
            });
        }

        self.deleted.lock().unwrap().push(resource.id.clone());
        self.resources
            .lock()
            .unwrap()
            .retain(|r| r.id != resource.id);
        self.instances
            .lock()
            .unwrap()
            .retain(|r| r.id != resource.id);
        Ok(())
    }
}
