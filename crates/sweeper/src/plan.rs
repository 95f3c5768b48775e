//! Cleanup plan - matched resources in deletion order.

use cloudkit::{CloudResource, Provider, ResourceKind};

/// Ordered sequence of resources marked for deletion, grouped by
/// provider then kind. Snapshots always sort after the images that own
/// them, so a snapshot's delete is attempted only once its parent
/// image's delete has been attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
    entries: Vec<CloudResource>,
}

impl CleanupPlan {
    /// Build a plan from matched resources.
    ///
    /// Duplicates (same provider and id) collapse to one entry, which
    /// keeps builder-owned instances that also match the prefix from
    /// being deleted twice.
    pub fn build(matched: Vec<CloudResource>) -> Self {
        let mut entries = matched;
        entries.sort_by(|a, b| {
            (a.provider, a.kind.delete_rank(), &a.name, &a.id)
                .cmp(&(b.provider, b.kind.delete_rank(), &b.name, &b.id))
        });
        entries.dedup_by(|a, b| a.provider == b.provider && a.id == b.id);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CloudResource] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CloudResource> {
        self.entries.iter()
    }

    /// Entries belonging to one provider, in deletion order.
    pub fn for_provider(&self, provider: Provider) -> impl Iterator<Item = &CloudResource> {
        self.entries.iter().filter(move |r| r.provider == provider)
    }

    /// Providers with at least one planned deletion, in sweep order.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers: Vec<Provider> = self.entries.iter().map(|r| r.provider).collect();
        providers.sort();
        providers.dedup();
        providers
    }

    /// Position of a resource id in the plan, for ordering checks.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.id == id)
    }

    /// Count of planned entries of one kind for one provider.
    pub fn count(&self, provider: Provider, kind: ResourceKind) -> usize {
        self.entries
            .iter()
            .filter(|r| r.provider == provider && r.kind == kind)
            .count()
    }
}
