use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helmwright")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Run helmfile release sets with managed EKS credentials", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Spec file (default: $HELMWRIGHT_SPEC or ./helmwright.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub spec: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the release set
    Apply(ApplyArgs),

    /// Show pending changes
    Diff(DiffArgs),

    /// Render manifests without deploying
    Template(TemplateArgs),

    /// Delete all releases and the generated kubeconfig
    Destroy,

    /// Print the built helmfile state
    Build(BuildArgs),

    /// Show the helmfile version
    Version,

    /// Diff and report which outputs are known only after apply
    Plan,

    /// Check the spec file without touching the cluster
    Validate,

    /// Remove a generated kubeconfig
    Cleanup {
        /// Kubeconfig to remove (default: the one recorded in state)
        path: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Set a release value (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Show secret values in the output
    #[arg(long)]
    pub show_secrets: bool,

    /// Run the implicit diff even for releases being installed
    #[arg(long)]
    pub diff_on_install: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Set a release value (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub set: Vec<(String, String)>,

    /// Lines of context around each change
    #[arg(long, default_value_t = helmkit::types::DEFAULT_CONTEXT_LINES)]
    pub context: usize,

    /// Show secret values in the output
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Write rendered manifests into this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Go template for per-release output directories
    #[arg(long, value_name = "TEMPLATE")]
    pub output_dir_template: Option<String>,

    /// Leave CRDs out of the rendered output
    #[arg(long)]
    pub skip_crds: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Inline values into the built state
    #[arg(long)]
    pub embed_values: bool,
}

/// Parse a `KEY=VALUE` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("image.tag=1.2.3").unwrap(),
            ("image.tag".to_string(), "1.2.3".to_string())
        );
        assert_eq!(
            parse_key_val("url=http://a?b=c").unwrap(),
            ("url".to_string(), "http://a?b=c".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_apply_flags() {
        let cli = Cli::parse_from([
            "helmwright",
            "-vv",
            "apply",
            "--set",
            "replicas=3",
            "--show-secrets",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.set, vec![("replicas".to_string(), "3".to_string())]);
                assert!(args.show_secrets);
                assert!(!args.diff_on_install);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_global_spec_after_subcommand() {
        let cli = Cli::parse_from(["helmwright", "diff", "--spec", "stack.toml"]);
        assert_eq!(cli.spec, Some(PathBuf::from("stack.toml")));
        match cli.command {
            Command::Diff(args) => assert_eq!(args.context, 3),
            _ => panic!("expected diff"),
        }
    }
}
