use crate::runner;
use crate::ui;
use anyhow::Result;
use cloudkit::provider::default_clients;
use colored::Colorize;

/// Credential environment consumed by the vendor CLIs. bakectl only
/// reports whether these are set; their values are never interpreted.
const CREDENTIAL_VARS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_DEFAULT_REGION",
    "GOOGLE_APPLICATION_CREDENTIALS",
    "ARM_CLIENT_ID",
    "ARM_CLIENT_SECRET",
    "ARM_TENANT_ID",
    "ARM_SUBSCRIPTION_ID",
];

pub fn run() -> Result<()> {
    ui::header("Doctor");

    ui::section("Build tool");
    if runner::command_exists("packer") {
        println!("  {} packer installed", "✓".green());
    } else {
        println!("  {} packer not found on PATH", "✗".red());
    }

    ui::section("Provider CLIs");
    for client in default_clients() {
        let provider = client.provider();
        let bin = provider.cli_binary();
        if !client.is_available() {
            println!("  {} {provider}: '{bin}' not installed", "✗".red());
            continue;
        }
        match client.check_auth() {
            Ok(()) => println!("  {} {provider}: authenticated", "✓".green()),
            Err(e) => println!("  {} {provider}: {e}", "○".yellow()),
        }
    }

    ui::section("Credential environment");
    for var in CREDENTIAL_VARS {
        if std::env::var_os(var).is_some() {
            println!("  {} {var} set", "✓".green());
        } else {
            println!("  {} {var} not set", "○".yellow());
        }
    }

    Ok(())
}
