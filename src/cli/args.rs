//! Command-line argument parsing for NeuroTrix
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NeuroTrix - Brain MRI tumor classification with clinical recommendations
#[derive(Parser, Debug)]
#[command(name = "neurotrix")]
#[command(version)]
#[command(about = "Classify brain MRI scans and synthesize clinical recommendations", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults to ~/.neurotrix/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify an MRI image and print the analysis report as JSON
    Analyze {
        /// Path to the MRI image (PNG, JPEG, ...)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Patient name
        #[arg(long)]
        name: String,

        /// Patient age in years
        #[arg(long)]
        age: u32,

        /// Patient gender
        #[arg(long)]
        gender: String,

        /// Relevant medical history
        #[arg(long)]
        medical_history: Option<String>,

        /// Current symptoms
        #[arg(long)]
        symptoms: Option<String>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Load the classifier and report its state
    Status,

    /// Replace the weights artifact and reload the classifier
    Install {
        /// New weights file (.pth or .safetensors)
        #[arg(value_name = "WEIGHTS")]
        weights: PathBuf,
    },

    /// Display the effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    /// Default tracing filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "neurotrix=info,warn",
            Verbosity::VeryVerbose => "neurotrix=debug,info",
        }
    }
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_args() {
        let args = Args::parse_from([
            "neurotrix",
            "analyze",
            "scan.png",
            "--name",
            "Ada",
            "--age",
            "52",
            "--gender",
            "female",
            "--symptoms",
            "headaches",
        ]);
        match args.command {
            Commands::Analyze {
                image,
                age,
                symptoms,
                medical_history,
                ..
            } => {
                assert_eq!(image, PathBuf::from("scan.png"));
                assert_eq!(age, 52);
                assert_eq!(symptoms.as_deref(), Some("headaches"));
                assert!(medical_history.is_none());
            }
            other => panic!("Expected analyze, got {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Args::parse_from(["neurotrix", "status"]);
        assert_eq!(args.verbosity(), Verbosity::Normal);

        let args = Args::parse_from(["neurotrix", "-vv", "status"]);
        assert_eq!(args.verbosity(), Verbosity::VeryVerbose);

        let args = Args::parse_from(["neurotrix", "status", "-q"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_negative_age_rejected() {
        let parsed = Args::try_parse_from([
            "neurotrix", "analyze", "a.png", "--name", "x", "--age", "-3", "--gender", "f",
        ]);
        assert!(parsed.is_err());
    }
}
