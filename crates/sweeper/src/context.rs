//! Run configuration passed by reference into each sweep component.

/// Default name prefix swept when none is configured.
pub const DEFAULT_PREFIX: &str = "poc-nginx-image";

/// Configuration for one sweep invocation. Supplied once, immutable
/// for the duration of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Name/tag prefix that marks a resource as sweepable
    pub prefix: String,
    /// Surface the plan without prompting or deleting
    pub dry_run: bool,
    /// Delete without asking for confirmation
    pub force_confirm: bool,
}

impl RunConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dry_run: false,
            force_confirm: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force_confirm = force;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
