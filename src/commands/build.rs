use crate::cli::BuildArgs;
use crate::config::BuildVars;
use crate::runner;
use crate::ui;
use anyhow::Result;
use cloudkit::Error;

pub fn run(args: BuildArgs) -> Result<()> {
    ui::header("Image Build");

    if !runner::command_exists("packer") {
        ui::info("Install packer from https://developer.hashicorp.com/packer");
        return Err(Error::MissingDependency {
            tool: "packer".to_string(),
        }
        .into());
    }
    if !args.template.exists() {
        return Err(Error::InvalidArgument(format!(
            "image template not found: {}",
            args.template.display()
        ))
        .into());
    }

    // First run: write a starter variables file and stop so the
    // operator can fill in their provider identifiers.
    if !args.vars_file.exists() {
        BuildVars::template().save(&args.vars_file)?;
        ui::success(&format!("Created {}", args.vars_file.display()));
        ui::info("Edit the variables file with your provider identifiers, then re-run the build");
        return Ok(());
    }

    let vars = BuildVars::load(&args.vars_file)?;
    if vars.has_placeholders() {
        ui::warn(&format!(
            "{} still contains template placeholders",
            args.vars_file.display()
        ));
    }
    ui::kv("image", &format!("{} v{}", vars.image_name, vars.image_version));
    ui::kv("template", &args.template.display().to_string());

    let var_file_flag = format!("-var-file={}", args.vars_file.display());
    let template = args.template.display().to_string();

    let status = runner::run("packer", &["validate", &var_file_flag, &template], &[])?;
    if !status.success() {
        return Err(Error::ValidationFailure(args.template.display().to_string()).into());
    }
    ui::success("Template validated");

    if args.validate_only {
        return Ok(());
    }

    let mut build_args = vec!["build".to_string(), var_file_flag];
    if let Some(filter) = args.platform.builder_filter() {
        build_args.push(format!("-only={filter}"));
    }
    build_args.push(template);

    let env: &[(&str, &str)] = if args.debug {
        &[("PACKER_LOG", "1")]
    } else {
        &[]
    };

    let arg_refs: Vec<&str> = build_args.iter().map(String::as_str).collect();
    let status = runner::run("packer", &arg_refs, env)?;
    if !status.success() {
        return Err(Error::BuildFailure(format!(
            "{} v{}",
            vars.image_name, vars.image_version
        ))
        .into());
    }

    println!();
    ui::success(&format!(
        "Built {} v{}",
        vars.image_name, vars.image_version
    ));
    Ok(())
}
