use crate::cli::EmergencyArgs;
use crate::ui;
use anyhow::Result;
use cloudkit::provider::default_clients;
use sweeper::{CleanupPlan, execute};

/// Terminate running builder-owned instances everywhere, bypassing all
/// image/snapshot logic. This is the escape hatch for builds that died
/// before producing a named image.
pub fn run(args: EmergencyArgs) -> Result<()> {
    ui::header("Emergency Cleanup");
    ui::info("Targeting running builder-owned instances only");

    for client in default_clients() {
        let provider = client.provider();
        ui::section(&provider.to_string());

        if !client.is_available() {
            ui::warn(&format!(
                "'{}' not installed - skipping {provider}",
                provider.cli_binary()
            ));
            continue;
        }
        if let Err(e) = client.check_auth() {
            ui::warn(&format!("skipping {provider}: {e}"));
            continue;
        }

        let instances = match client.list_builder_instances() {
            Ok(instances) => instances,
            Err(e) => {
                ui::error(&format!("{provider}: {e}"));
                continue;
            }
        };

        let plan = CleanupPlan::build(instances);
        if plan.is_empty() {
            ui::info("no builder instances running");
            continue;
        }

        for resource in plan.iter() {
            ui::plan_entry(resource);
        }
        if args.dry_run {
            ui::info(&format!("would terminate {} instance(s)", plan.len()));
            continue;
        }

        if !args.force {
            let approved = dialoguer::Confirm::new()
                .with_prompt(format!(
                    "Terminate these {} {provider} instance(s)?",
                    plan.len()
                ))
                .default(false)
                .interact()
                .unwrap_or(false);
            if !approved {
                ui::info("declined - provider batch skipped");
                continue;
            }
        }

        let summary = execute(client.as_ref(), &plan);
        for outcome in &summary.outcomes {
            ui::outcome_entry(&outcome.resource, &outcome.status);
        }
    }

    println!();
    if args.dry_run {
        ui::warn("Dry run - no changes made");
    } else {
        ui::success("Emergency cleanup finished");
    }
    Ok(())
}
