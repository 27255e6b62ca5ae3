//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use fwcfg_core::OutputFormat;
use std::path::PathBuf;

/// fwcfg - Resolve firmware feature-configuration overlays
#[derive(Parser, Debug)]
#[command(name = "fwcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory holding fwcfg.toml
    #[arg(short, long, global = true, env = "FWCFG_PROJECT", default_value = ".")]
    pub project: PathBuf,

    /// Defaults catalog, overriding the manifest
    #[arg(long, global = true, value_name = "PATH")]
    pub defaults: Option<PathBuf>,

    /// Overlay file (.h or .toml), overriding the manifest
    #[arg(long, global = true, value_name = "PATH")]
    pub overlay: Option<PathBuf>,

    /// Supply an allow-listed build-time value (repeatable)
    #[arg(short = 'D', long = "define", global = true, value_name = "KEY=VALUE")]
    pub defines: Vec<String>,

    /// Ignore process environment variables and build flags
    #[arg(long, global = true)]
    pub no_env: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve, validate and emit the final configuration
    ///
    /// Examples:
    ///   fwcfg resolve                          # Header to stdout
    ///   fwcfg resolve -o build/fwcfg.h         # Header to a file
    ///   fwcfg resolve --format json            # JSON with winning sources
    ///   fwcfg resolve -D MY_IP=192.168.1.99    # Supply an allow-listed value
    Resolve {
        /// Output format (defaults to the manifest's)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Write to this file instead of the manifest's path or stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Check exclusion groups and dependency rules
    Check,

    /// Show changed settings and all diagnostics
    Report {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show how each source contributed to one setting
    Explain {
        /// Setting identifier
        setting: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List catalog settings
    List {
        /// List exclusion groups, dependency rules and environment keys instead
        #[arg(long)]
        groups: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write a starter fwcfg.toml into the project directory
    Init,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Header,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Header => OutputFormat::Header,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_resolve_with_defines() {
        let cli = Cli::try_parse_from([
            "fwcfg", "resolve", "--format", "json", "-D", "MY_IP=10.0.0.1", "-D", "MY_GW=10.0.0.254",
        ])
        .unwrap();
        assert_eq!(cli.defines, vec!["MY_IP=10.0.0.1", "MY_GW=10.0.0.254"]);
        assert_eq!(
            cli.command,
            Commands::Resolve {
                format: Some(FormatArg::Json),
                output: None
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fwcfg", "check", "--no-env", "--verbose"]).unwrap();
        assert!(cli.no_env);
        assert!(cli.verbose);
        assert_eq!(cli.command, Commands::Check);
    }

    #[test]
    fn explain_requires_setting() {
        assert!(Cli::try_parse_from(["fwcfg", "explain"]).is_err());
    }
}
