//! Sweep execution - one delete call per planned resource, failures
//! recorded per resource, batch always runs to completion.

use crate::context::RunConfig;
use crate::filter;
use crate::gate::ConfirmationGate;
use crate::plan::CleanupPlan;
use cloudkit::{CloudResource, Provider, ProviderClient, ResourceKind, Result};
use std::collections::BTreeMap;

/// Outcome of one delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    /// Delete failed; carries the provider's error text
    Failed(String),
    /// Nothing to do (resource already gone)
    Skipped(String),
}

/// One resource paired with its delete outcome.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub resource: CloudResource,
    pub status: DeleteStatus,
}

/// Succeeded/failed/skipped tallies for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Per-provider result of an executed batch.
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub provider: Provider,
    pub outcomes: Vec<DeleteOutcome>,
}

impl SweepSummary {
    pub fn deleted(&self) -> usize {
        self.count(|s| matches!(s, DeleteStatus::Deleted))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DeleteStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DeleteStatus::Skipped(_)))
    }

    /// Whether every planned delete went through.
    pub fn fully_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Tallies per resource kind, in deletion order.
    pub fn by_kind(&self) -> BTreeMap<ResourceKind, KindCounts> {
        let mut counts: BTreeMap<ResourceKind, KindCounts> = BTreeMap::new();
        for outcome in &self.outcomes {
            let entry = counts.entry(outcome.resource.kind).or_default();
            match &outcome.status {
                DeleteStatus::Deleted => entry.deleted += 1,
                DeleteStatus::Failed(_) => entry.failed += 1,
                DeleteStatus::Skipped(_) => entry.skipped += 1,
            }
        }
        counts
    }

    fn count(&self, pred: impl Fn(&DeleteStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// How one provider's pass through the sweep ended.
#[derive(Debug)]
pub enum ProviderOutcome {
    /// Vendor CLI not installed; provider skipped
    SkippedUnavailable,
    /// Credentials absent or rejected; provider skipped
    SkippedUnauthenticated { reason: String },
    /// Listing returned no sweepable resources
    NothingMatched,
    /// Dry-run: plan surfaced, nothing prompted or deleted
    Planned { plan: CleanupPlan },
    /// Operator declined this provider's batch
    Declined { plan: CleanupPlan },
    /// Batch executed to completion
    Swept {
        plan: CleanupPlan,
        summary: SweepSummary,
    },
}

/// Enumerate a provider and keep only sweepable resources.
///
/// Listing is prefix-filtered server-side where the provider supports
/// it; the match policy is re-applied here regardless.
pub fn gather(client: &dyn ProviderClient, cfg: &RunConfig) -> Result<Vec<CloudResource>> {
    let mut matched = client.list_resources(&cfg.prefix)?;
    matched.extend(client.list_builder_instances()?);
    matched.retain(|r| filter::eligible(r, cfg));
    Ok(matched)
}

/// Attempt every planned delete for this client's provider.
///
/// Failures are recorded and the batch continues; a snapshot is
/// attempted even when its parent image's delete failed, since leaving
/// it behind would leak billable storage.
pub fn execute(client: &dyn ProviderClient, plan: &CleanupPlan) -> SweepSummary {
    let provider = client.provider();
    let mut outcomes = Vec::new();

    for resource in plan.for_provider(provider) {
        let status = match client.delete(resource) {
            Ok(()) => {
                log::info!("{provider}: deleted {} {}", resource.kind, resource.name);
                DeleteStatus::Deleted
            }
            Err(e) if e.category().is_already_gone() => {
                log::info!("{provider}: {} {} already gone", resource.kind, resource.name);
                DeleteStatus::Skipped(e.to_string())
            }
            Err(e) => {
                log::warn!(
                    "{provider}: failed to delete {} {}: {e}",
                    resource.kind,
                    resource.name
                );
                DeleteStatus::Failed(e.to_string())
            }
        };
        outcomes.push(DeleteOutcome {
            resource: resource.clone(),
            status,
        });
    }

    SweepSummary { provider, outcomes }
}

/// Run the full linear pass for one provider.
///
/// Returns `Err` only for provider failures that are neither a skip
/// condition nor an individual delete failure (e.g. unparseable CLI
/// output during enumeration).
pub fn sweep_provider(
    client: &dyn ProviderClient,
    cfg: &RunConfig,
    gate: &dyn ConfirmationGate,
) -> Result<ProviderOutcome> {
    let provider = client.provider();

    if !client.is_available() {
        log::info!(
            "{provider}: '{}' not installed, skipping",
            provider.cli_binary()
        );
        return Ok(ProviderOutcome::SkippedUnavailable);
    }
    if let Err(e) = client.check_auth() {
        if e.skips_provider() {
            return Ok(ProviderOutcome::SkippedUnauthenticated {
                reason: e.to_string(),
            });
        }
        return Err(e);
    }

    let matched = match gather(client, cfg) {
        Ok(matched) => matched,
        Err(e) if e.skips_provider() => {
            return Ok(ProviderOutcome::SkippedUnauthenticated {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let plan = CleanupPlan::build(matched);
    if plan.is_empty() {
        return Ok(ProviderOutcome::NothingMatched);
    }

    if cfg.dry_run {
        return Ok(ProviderOutcome::Planned { plan });
    }

    if !cfg.force_confirm && !gate.confirm(provider, &plan) {
        return Ok(ProviderOutcome::Declined { plan });
    }

    let summary = execute(client, &plan);
    Ok(ProviderOutcome::Swept { plan, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{AutoApprove, DenyAll};
    use crate::testutil::MockProvider;
    use cloudkit::{BUILDER_TAG_KEY, BUILDER_TAG_VALUE};

    fn aws_with_images() -> MockProvider {
        let mock = MockProvider::new(Provider::Aws);
        mock.seed(
            CloudResource::new(Provider::Aws, ResourceKind::Image, "ami-1", "poc-nginx-image-aws-v1.0.0"),
        );
        mock.seed(
            CloudResource::new(Provider::Aws, ResourceKind::Snapshot, "snap-1", "poc-nginx-image-aws-v1.0.0")
                .with_parent("ami-1"),
        );
        mock.seed(CloudResource::new(
            Provider::Aws,
            ResourceKind::Image,
            "ami-2",
            "other-image",
        ));
        mock
    }

    #[test]
    fn test_dry_run_plan_matches_scenario_and_deletes_nothing() {
        let mock = aws_with_images();
        let cfg = RunConfig::new("poc-nginx-image").dry_run(true);

        let outcome = sweep_provider(&mock, &cfg, &AutoApprove).unwrap();
        let ProviderOutcome::Planned { plan } = outcome else {
            panic!("expected Planned, got {outcome:?}");
        };

        let ids: Vec<&str> = plan.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ami-1", "snap-1"]);
        assert!(mock.deleted().is_empty());
    }

    #[test]
    fn test_dry_run_plan_identical_to_wet_run_plan() {
        let mock = aws_with_images();
        let dry = RunConfig::new("poc-nginx-image").dry_run(true);
        let wet = RunConfig::new("poc-nginx-image").force(true);

        let ProviderOutcome::Planned { plan: dry_plan } =
            sweep_provider(&mock, &dry, &AutoApprove).unwrap()
        else {
            panic!("expected Planned");
        };
        let ProviderOutcome::Swept { plan: wet_plan, .. } =
            sweep_provider(&mock, &wet, &AutoApprove).unwrap()
        else {
            panic!("expected Swept");
        };

        assert_eq!(dry_plan, wet_plan);
    }

    #[test]
    fn test_decline_aborts_provider_batch() {
        let mock = aws_with_images();
        let cfg = RunConfig::new("poc-nginx-image");

        let outcome = sweep_provider(&mock, &cfg, &DenyAll).unwrap();
        assert!(matches!(outcome, ProviderOutcome::Declined { .. }));
        assert!(mock.deleted().is_empty());
    }

    #[test]
    fn test_force_bypasses_gate() {
        let mock = aws_with_images();
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        // DenyAll would veto, but force mode never consults the gate.
        let outcome = sweep_provider(&mock, &cfg, &DenyAll).unwrap();
        assert!(matches!(outcome, ProviderOutcome::Swept { .. }));
        assert_eq!(mock.deleted(), vec!["ami-1", "snap-1"]);
    }

    #[test]
    fn test_unavailable_provider_is_skipped() {
        let mock = MockProvider::new(Provider::Gcp).unavailable();
        let cfg = RunConfig::default();

        let outcome = sweep_provider(&mock, &cfg, &AutoApprove).unwrap();
        assert!(matches!(outcome, ProviderOutcome::SkippedUnavailable));
    }

    #[test]
    fn test_unauthenticated_provider_is_skipped() {
        let mock = MockProvider::new(Provider::Azure).unauthenticated();
        let cfg = RunConfig::default();

        let outcome = sweep_provider(&mock, &cfg, &AutoApprove).unwrap();
        assert!(matches!(
            outcome,
            ProviderOutcome::SkippedUnauthenticated { .. }
        ));
    }

    #[test]
    fn test_delete_failure_does_not_stop_batch() {
        let mock = aws_with_images();
        mock.fail_delete("ami-1");
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        let ProviderOutcome::Swept { summary, .. } =
            sweep_provider(&mock, &cfg, &AutoApprove).unwrap()
        else {
            panic!("expected Swept");
        };

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.deleted(), 1);
        // Snapshot still attempted after its parent image failed.
        assert_eq!(mock.deleted(), vec!["snap-1"]);
        assert!(!summary.fully_succeeded());
    }

    #[test]
    fn test_already_gone_counts_as_skipped() {
        let mock = aws_with_images();
        mock.gone_on_delete("snap-1");
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        let ProviderOutcome::Swept { summary, .. } =
            sweep_provider(&mock, &cfg, &AutoApprove).unwrap()
        else {
            panic!("expected Swept");
        };

        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.deleted(), 1);
        assert!(summary.fully_succeeded());
    }

    #[test]
    fn test_second_sweep_converges_to_empty_plan() {
        let mock = aws_with_images();
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        let first = sweep_provider(&mock, &cfg, &AutoApprove).unwrap();
        assert!(matches!(first, ProviderOutcome::Swept { .. }));

        let second = sweep_provider(&mock, &cfg, &AutoApprove).unwrap();
        assert!(matches!(second, ProviderOutcome::NothingMatched));
    }

    #[test]
    fn test_builder_instance_swept_without_prefix_match() {
        let mock = MockProvider::new(Provider::Aws);
        mock.seed_instance(
            CloudResource::new(Provider::Aws, ResourceKind::Instance, "i-1", "Packer Builder")
                .with_tag(BUILDER_TAG_KEY, BUILDER_TAG_VALUE),
        );
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        let ProviderOutcome::Swept { summary, .. } =
            sweep_provider(&mock, &cfg, &AutoApprove).unwrap()
        else {
            panic!("expected Swept");
        };
        assert_eq!(summary.deleted(), 1);
    }

    #[test]
    fn test_summary_by_kind_tallies() {
        let mock = aws_with_images();
        mock.fail_delete("snap-1");
        let cfg = RunConfig::new("poc-nginx-image").force(true);

        let ProviderOutcome::Swept { summary, .. } =
            sweep_provider(&mock, &cfg, &AutoApprove).unwrap()
        else {
            panic!("expected Swept");
        };

        let by_kind = summary.by_kind();
        assert_eq!(by_kind[&ResourceKind::Image].deleted, 1);
        assert_eq!(by_kind[&ResourceKind::Snapshot].failed, 1);
    }
}
