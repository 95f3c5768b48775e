//! Confirmation gate - the one place a sweep waits on a human.

use crate::plan::CleanupPlan;
use cloudkit::Provider;

/// Decides whether a provider's batch of deletions may proceed.
///
/// The gate receives the full plan so interactive implementations can
/// show what is about to be deleted. Declining aborts that provider's
/// batch only, never the run; dry-run and force modes skip the gate
/// entirely.
pub trait ConfirmationGate {
    fn confirm(&self, provider: Provider, plan: &CleanupPlan) -> bool;
}

/// Gate that approves every batch.
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&self, _provider: Provider, _plan: &CleanupPlan) -> bool {
        true
    }
}

/// Gate that declines every batch.
pub struct DenyAll;

impl ConfirmationGate for DenyAll {
    fn confirm(&self, _provider: Provider, _plan: &CleanupPlan) -> bool {
        false
    }
}
