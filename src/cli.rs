use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use cloudkit::ConflictPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bakectl")]
#[command(version)]
#[command(about = "Bake machine images with Packer and sweep up the leftovers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate and build machine images via Packer
    Build(BuildArgs),

    /// Delete build leftovers (images, snapshots, groups, key pairs)
    Cleanup(CleanupArgs),

    /// Terminate builder-owned instances, bypassing image logic
    EmergencyCleanup(EmergencyArgs),

    /// Check a name/version for conflicts with existing images
    ValidateBuild(ValidateBuildArgs),

    /// Check that packer and the provider CLIs are usable
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Build
// ============================================================================

#[derive(Parser)]
pub struct BuildArgs {
    /// Platform to build for
    #[arg(short, long, value_enum, default_value_t = Platform::All)]
    pub platform: Platform,

    /// Packer template to build from
    #[arg(short, long, default_value = "image.pkr.hcl")]
    pub template: PathBuf,

    /// Variables file passed to Packer (created from a template if absent)
    #[arg(long, default_value = "variables.json")]
    pub vars_file: PathBuf,

    /// Enable Packer debug logging (PACKER_LOG=1)
    #[arg(short, long)]
    pub debug: bool,

    /// Stop after template validation
    #[arg(long)]
    pub validate_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Aws,
    Gcp,
    Azure,
    All,
}

impl Platform {
    /// Packer `-only` source filter, none when building everything.
    pub fn builder_filter(&self) -> Option<&'static str> {
        match self {
            Platform::Aws => Some("amazon-ebs.*"),
            Platform::Gcp => Some("googlecompute.*"),
            Platform::Azure => Some("azure-arm.*"),
            Platform::All => None,
        }
    }
}

// ============================================================================
// Cleanup
// ============================================================================

#[derive(Parser)]
pub struct CleanupArgs {
    /// Name/tag prefix that marks resources as sweepable
    #[arg(long, default_value = sweeper::DEFAULT_PREFIX)]
    pub prefix: String,

    /// Show the plan without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete without confirmation prompts
    #[arg(short, long)]
    pub force: bool,

    /// Answer yes to all confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct EmergencyArgs {
    /// Show targeted instances without terminating them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Terminate without confirmation prompts
    #[arg(short, long)]
    pub force: bool,
}

// ============================================================================
// Validate-build
// ============================================================================

#[derive(Parser)]
// The user-facing --version arg below would otherwise collide with the
// auto flag added by propagate_version.
#[command(disable_version_flag = true)]
pub struct ValidateBuildArgs {
    /// Base image name (without provider/version suffix)
    #[arg(long)]
    pub name: String,

    /// Image version to check (semver)
    #[arg(long)]
    pub version: semver::Version,

    /// Shorthand for --on-conflict auto-increment
    #[arg(long)]
    pub auto_increment: bool,

    /// What to do when the image already exists
    #[arg(long, value_enum, default_value_t = ConflictPolicyArg::Fail)]
    pub on_conflict: ConflictPolicyArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicyArg {
    /// Report the conflict and exit non-zero
    Fail,
    /// Keep the existing image, skip the build
    Skip,
    /// Proceed and replace the image at build time
    Overwrite,
    /// Bump the patch version until a free name is found
    AutoIncrement,
}

impl ValidateBuildArgs {
    pub fn policy(&self) -> ConflictPolicy {
        if self.auto_increment {
            return ConflictPolicy::AutoIncrement;
        }
        match self.on_conflict {
            ConflictPolicyArg::Fail => ConflictPolicy::Fail,
            ConflictPolicyArg::Skip => ConflictPolicy::Skip,
            ConflictPolicyArg::Overwrite => ConflictPolicy::Overwrite,
            ConflictPolicyArg::AutoIncrement => ConflictPolicy::AutoIncrement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_build_accepts_version_arg() {
        let cli = Cli::try_parse_from([
            "bakectl",
            "validate-build",
            "--name",
            "foo",
            "--version",
            "1.0.0",
        ])
        .unwrap();
        match cli.command {
            Command::ValidateBuild(args) => {
                assert_eq!(args.name, "foo");
                assert_eq!(args.version, semver::Version::new(1, 0, 0));
            }
            _ => panic!("expected validate-build"),
        }
    }

    #[test]
    fn test_auto_increment_flag_overrides_policy() {
        let args = ValidateBuildArgs {
            name: "foo".to_string(),
            version: semver::Version::new(1, 0, 0),
            auto_increment: true,
            on_conflict: ConflictPolicyArg::Fail,
        };
        assert_eq!(args.policy(), ConflictPolicy::AutoIncrement);
    }

    #[test]
    fn test_platform_builder_filters() {
        assert_eq!(Platform::Aws.builder_filter(), Some("amazon-ebs.*"));
        assert_eq!(Platform::All.builder_filter(), None);
    }
}
