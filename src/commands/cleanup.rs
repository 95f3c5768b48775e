use crate::cli::CleanupArgs;
use crate::ui;
use anyhow::Result;
use cloudkit::Provider;
use cloudkit::provider::default_clients;
use sweeper::{
    AutoApprove, CleanupPlan, ConfirmationGate, ProviderOutcome, RunConfig, SweepSummary,
    sweep_provider,
};

/// Interactive gate: show the provider's batch, then ask.
struct PromptGate;

impl ConfirmationGate for PromptGate {
    fn confirm(&self, provider: Provider, plan: &CleanupPlan) -> bool {
        render_plan(provider, plan);
        dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete these {} {provider} resource(s)?",
                plan.for_provider(provider).count()
            ))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn run(args: CleanupArgs) -> Result<()> {
    ui::header("Resource Cleanup");
    ui::kv("prefix", &args.prefix);
    if args.dry_run {
        ui::info("Dry run - nothing will be deleted");
    }

    let cfg = RunConfig::new(args.prefix)
        .dry_run(args.dry_run)
        .force(args.force);
    let gate: Box<dyn ConfirmationGate> = if args.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(PromptGate)
    };

    let mut failures = 0usize;
    for client in default_clients() {
        let provider = client.provider();
        ui::section(&provider.to_string());

        match sweep_provider(client.as_ref(), &cfg, gate.as_ref()) {
            Ok(ProviderOutcome::SkippedUnavailable) => {
                ui::warn(&format!(
                    "'{}' not installed - skipping {provider}",
                    provider.cli_binary()
                ));
            }
            Ok(ProviderOutcome::SkippedUnauthenticated { reason }) => {
                ui::warn(&format!("skipping {provider}: {reason}"));
            }
            Ok(ProviderOutcome::NothingMatched) => {
                ui::info("no matching resources");
            }
            Ok(ProviderOutcome::Planned { plan }) => {
                render_plan(provider, &plan);
                ui::info(&format!(
                    "would delete {} resource(s)",
                    plan.for_provider(provider).count()
                ));
            }
            Ok(ProviderOutcome::Declined { .. }) => {
                ui::info("declined - provider batch skipped");
            }
            Ok(ProviderOutcome::Swept { summary, .. }) => {
                failures += summary.failed();
                render_summary(&summary);
            }
            Err(e) => {
                // Enumeration went wrong for this provider; the others
                // still get their pass.
                failures += 1;
                ui::error(&format!("{provider}: {e}"));
            }
        }
    }

    println!();
    if args.dry_run {
        ui::warn("Dry run - no changes made");
    } else if failures == 0 {
        ui::success("Cleanup completed fully");
    } else {
        // Partial failure is reportable, not fatal: exit stays 0.
        ui::warn(&format!("Cleanup completed with {failures} failure(s)"));
    }
    Ok(())
}

fn render_plan(provider: Provider, plan: &CleanupPlan) {
    for resource in plan.for_provider(provider) {
        ui::plan_entry(resource);
    }
}

fn render_summary(summary: &SweepSummary) {
    for outcome in &summary.outcomes {
        ui::outcome_entry(&outcome.resource, &outcome.status);
    }
    for (kind, counts) in summary.by_kind() {
        ui::kv(
            kind.name(),
            &format!(
                "{} deleted, {} failed, {} skipped",
                counts.deleted, counts.failed, counts.skipped
            ),
        );
    }
}
