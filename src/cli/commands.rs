//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - build: construct every action of a domain and write PDDL
//! - parse: parse a saved model answer
//! - validate: validate a saved model answer

use clap::{Parser, Subcommand};
use pddlsmith::validation::FeedbackMode;
use std::path::PathBuf;

/// pddlsmith - build PDDL action schemas with a language model
#[derive(Parser, Debug)]
#[command(name = "pddlsmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Construct all actions of a domain description
    Build {
        /// Domain description (YAML)
        domain: PathBuf,

        /// Write the PDDL domain here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum fixpoint passes
        #[arg(long)]
        max_iters: Option<usize>,

        /// Maximum model answers per action
        #[arg(long)]
        max_attempts: Option<usize>,

        /// Critique source for validated answers (none, model, human)
        #[arg(long)]
        feedback: Option<FeedbackMode>,

        /// Mirror symmetric preconditions
        #[arg(long)]
        mirror: bool,
    },

    /// Parse a saved model answer and print the action
    Parse {
        /// File holding the model answer
        file: PathBuf,

        /// Action name
        #[arg(short, long)]
        action: String,
    },

    /// Validate a saved model answer
    Validate {
        /// File holding the model answer
        file: PathBuf,

        /// Action name
        #[arg(short, long)]
        action: String,

        /// Domain description supplying types and action names
        #[arg(short, long)]
        domain: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["pddlsmith"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["pddlsmith", "parse", "out.md", "-a", "stack", "-v", "-c", "/tmp/p.yml"])
            .unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/tmp/p.yml")));
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["pddlsmith", "build", "blocks.yml"]).unwrap();
        match cli.command {
            Commands::Build {
                domain,
                output,
                max_iters,
                max_attempts,
                feedback,
                mirror,
            } => {
                assert_eq!(domain, PathBuf::from("blocks.yml"));
                assert!(output.is_none());
                assert!(max_iters.is_none());
                assert!(max_attempts.is_none());
                assert!(feedback.is_none());
                assert!(!mirror);
            }
            _ => panic!("Expected build command"),
        }
    }

    #[test]
    fn test_build_overrides() {
        let cli = Cli::try_parse_from([
            "pddlsmith",
            "build",
            "blocks.yml",
            "-o",
            "domain.pddl",
            "--max-iters",
            "3",
            "--max-attempts",
            "5",
            "--feedback",
            "model",
            "--mirror",
        ])
        .unwrap();
        match cli.command {
            Commands::Build {
                output,
                max_iters,
                max_attempts,
                feedback,
                mirror,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("domain.pddl")));
                assert_eq!(max_iters, Some(3));
                assert_eq!(max_attempts, Some(5));
                assert_eq!(feedback, Some(FeedbackMode::Model));
                assert!(mirror);
            }
            _ => panic!("Expected build command"),
        }
    }

    #[test]
    fn test_build_rejects_unknown_feedback() {
        assert!(Cli::try_parse_from(["pddlsmith", "build", "b.yml", "--feedback", "robot"]).is_err());
    }

    #[test]
    fn test_validate_with_domain() {
        let cli =
            Cli::try_parse_from(["pddlsmith", "validate", "out.md", "--action", "stack", "--domain", "b.yml"]).unwrap();
        match cli.command {
            Commands::Validate { file, action, domain } => {
                assert_eq!(file, PathBuf::from("out.md"));
                assert_eq!(action, "stack");
                assert_eq!(domain, Some(PathBuf::from("b.yml")));
            }
            _ => panic!("Expected validate command"),
        }
    }

    #[test]
    fn test_parse_requires_action() {
        assert!(Cli::try_parse_from(["pddlsmith", "parse", "out.md"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
