use crate::cli::ValidateBuildArgs;
use crate::ui;
use anyhow::{Result, bail};
use cloudkit::ConflictPolicy;
use cloudkit::naming::{find_conflicts, next_free_version};
use cloudkit::provider::default_clients;

/// Check the configured name/version against every reachable provider
/// before a build, resolving conflicts per the configured policy.
pub fn run(args: ValidateBuildArgs) -> Result<()> {
    ui::header("Build Validation");
    ui::kv("image", &format!("{} v{}", args.name, args.version));

    let clients = default_clients();
    let conflicts = find_conflicts(&clients, &args.name, &args.version)?;

    if conflicts.is_empty() {
        ui::success(&format!(
            "{} v{} is free on all reachable providers",
            args.name, args.version
        ));
        return Ok(());
    }

    for conflict in &conflicts {
        ui::warn(&format!(
            "{}: image {} already exists",
            conflict.provider, conflict.name
        ));
    }

    match args.policy() {
        ConflictPolicy::Fail => {
            bail!(
                "{} v{} already exists; bump the version or pass --on-conflict",
                args.name,
                args.version
            );
        }
        ConflictPolicy::Skip => {
            ui::info("Keeping the existing image - skip the build for this version");
            Ok(())
        }
        ConflictPolicy::Overwrite => {
            ui::warn("Existing image will be replaced at build time");
            Ok(())
        }
        ConflictPolicy::AutoIncrement => {
            let free = next_free_version(&clients, &args.name, &args.version)?;
            ui::success(&format!("Next free version: {free}"));
            ui::info(&format!(
                "Set image_version to {free} in variables.json and rebuild"
            ));
            Ok(())
        }
    }
}
