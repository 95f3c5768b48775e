//! Cloud resource sweeper.
//!
//! One linear pass per provider: enumerate, match, plan, confirm,
//! delete, report. Providers are independent; a provider that is
//! unavailable or unauthenticated is skipped without affecting the
//! others, and individual delete failures are recorded, never fatal.

pub mod context;
pub mod executor;
pub mod filter;
pub mod gate;
pub mod plan;

#[cfg(test)]
pub(crate) mod testutil;

pub use context::{DEFAULT_PREFIX, RunConfig};
pub use executor::{
    DeleteOutcome, DeleteStatus, KindCounts, ProviderOutcome, SweepSummary, execute, gather,
    sweep_provider,
};
pub use gate::{AutoApprove, ConfirmationGate, DenyAll};
pub use plan::CleanupPlan;
