//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use berth::core::{RemoteBuild, ValidationPolicy};
use berth::util::ColorChoice;

/// berth - manage build configurations and their environment
#[derive(Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Validation level applied to every configuration: strict, warn, none
    #[arg(long, global = true, value_name = "LEVEL")]
    pub validation: Option<ValidationPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new configuration and make it current
    Init(InitArgs),

    /// Make a configuration current
    Use(UseArgs),

    /// Show a resolved configuration
    Show(ShowArgs),

    /// List configurations
    List(ListArgs),

    /// Delete a configuration
    Remove(RemoveArgs),

    /// Migrate a configuration to the current shape
    Sanitize(SanitizeArgs),

    /// Print the build environment
    Env(EnvArgs),

    /// Check authentication with the remote build service
    Auth(AuthArgs),

    /// Print the configuration JSON schema
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Configuration name
    pub name: String,

    /// Root of the source tree
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output directory name under <root>/src/out
    #[arg(long)]
    pub out: Option<String>,

    /// Remote build backend: none, reclient, siso
    #[arg(long, value_name = "BACKEND")]
    pub remote_build: Option<RemoteBuild>,

    /// Generator argument (repeatable)
    #[arg(long = "arg", short = 'a', value_name = "ARG")]
    pub args: Vec<String>,

    /// Inherit from another configuration
    #[arg(long, value_name = "NAME")]
    pub extends: Option<String>,

    /// Overwrite an existing configuration
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct UseArgs {
    /// Configuration name
    pub name: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Configuration name (defaults to the current one)
    pub name: Option<String>,

    /// Print the whole resolved document as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// Configuration name
    pub name: String,
}

#[derive(Args)]
pub struct SanitizeArgs {
    /// Configuration name (defaults to the current one)
    pub name: Option<String>,

    /// Write the changes back
    #[arg(long)]
    pub save: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Configuration name (defaults to the current one)
    pub name: Option<String>,

    /// Print as JSON
    #[arg(long, conflicts_with = "explain")]
    pub json: bool,

    /// Show which layer set each variable, omitting inherited ones
    #[arg(long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct AuthArgs {
    /// Configuration name (defaults to the current one)
    pub name: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_init_args() {
        let cli = parse(&[
            "berth",
            "init",
            "testing",
            "--root",
            "/src/electron",
            "--remote-build",
            "siso",
            "-a",
            "is_debug = false",
            "--arg",
            "symbol_level = 1",
        ]);
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.name, "testing");
        assert_eq!(args.root, Some(PathBuf::from("/src/electron")));
        assert_eq!(args.remote_build, Some(RemoteBuild::Siso));
        assert_eq!(args.args, vec!["is_debug = false", "symbol_level = 1"]);
        assert!(!args.force);
    }

    #[test]
    fn test_global_validation_flag() {
        let cli = parse(&["berth", "show", "--validation", "warn"]);
        assert_eq!(cli.validation, Some(ValidationPolicy::Warn));
        assert!(Cli::try_parse_from(["berth", "show", "--validation", "loose"]).is_err());
    }

    #[test]
    fn test_invalid_remote_build() {
        assert!(Cli::try_parse_from(["berth", "init", "x", "--remote-build", "goma"]).is_err());
    }

    #[test]
    fn test_env_flags_conflict() {
        assert!(Cli::try_parse_from(["berth", "env", "--json", "--explain"]).is_err());
    }
}
