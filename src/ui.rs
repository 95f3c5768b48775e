use cloudkit::CloudResource;
use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// One planned resource, aligned for plan listings.
pub fn plan_entry(resource: &CloudResource) {
    let age = resource
        .created_at
        .map(|t| t.format(" created %Y-%m-%d").to_string())
        .unwrap_or_default();
    println!(
        "  {} {:<14} {:<40} {}{}",
        "→".cyan(),
        resource.kind.to_string(),
        resource.name,
        resource.id.dimmed(),
        age.dimmed()
    );
}

/// Glyph + text for one delete outcome.
pub fn outcome_entry(resource: &CloudResource, status: &sweeper::DeleteStatus) {
    match status {
        sweeper::DeleteStatus::Deleted => {
            println!("  {} {} {}", "✓".green(), resource.kind, resource.name);
        }
        sweeper::DeleteStatus::Skipped(reason) => {
            println!(
                "  {} {} {} ({})",
                "○".yellow(),
                resource.kind,
                resource.name,
                reason.dimmed()
            );
        }
        sweeper::DeleteStatus::Failed(reason) => {
            println!(
                "  {} {} {}: {}",
                "✗".red(),
                resource.kind,
                resource.name,
                reason
            );
        }
    }
}
