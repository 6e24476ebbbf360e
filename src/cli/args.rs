use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, colored report
    Text,
    /// JSON document on stdout
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "javasema")]
#[command(about = "Expression-semantics analysis for Java sources", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the nearest .javasema.toml)
    #[arg(long, global = true, env = "JAVASEMA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    /// -v: Show analysis decisions
    /// -vv: Show per-node traces
    /// -vvv: Show everything, including tree-sitter lowering
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the statements of every method body for side effects
    SideEffects {
        /// Java source file
        path: PathBuf,

        /// Only report statements starting on this line
        #[arg(long)]
        line: Option<usize>,

        /// Treat writes to locals and local control flow as effect-free
        #[arg(long = "non-local")]
        non_local: bool,
    },

    /// Negate the conditions of if, while, do and for statements
    Negate {
        /// Java source file
        path: PathBuf,

        /// Only negate conditions starting on this line
        #[arg(long)]
        line: Option<usize>,

        /// Print the rewritten source instead of a report (requires --line)
        #[arg(long, requires = "line")]
        apply: bool,
    },

    /// Recognize counting for-loops
    Loops {
        /// Java source file
        path: PathBuf,
    },

    /// Describe switches and whether their breaks can be converted
    Switches {
        /// Java source file
        path: PathBuf,
    },

    /// Rewrite the breaks of the switch statement on a line and print the
    /// resulting source
    UnwrapBreaks {
        /// Java source file
        path: PathBuf,

        /// Line of the switch statement
        #[arg(long)]
        line: usize,
    },
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "javasema", "loops", "A.java", "--format", "json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbosity, 2);
        assert!(matches!(cli.command, Commands::Loops { .. }));
    }

    #[test]
    fn test_apply_requires_line() {
        assert!(Cli::try_parse_from(["javasema", "negate", "A.java", "--apply"]).is_err());
        let cli =
            Cli::try_parse_from(["javasema", "negate", "A.java", "--apply", "--line", "3"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Negate {
                apply: true,
                line: Some(3),
                ..
            }
        ));
    }
}
