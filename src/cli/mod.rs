//! CLI Module
//!
//! Command-line interface for the remixer.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::effects::EffectType;

/// Remixer - apply a named effect to an audio file and save it as WAV
#[derive(Parser, Debug)]
#[command(name = "remixer-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply an effect to an audio file
    #[command(name = "process")]
    Process {
        /// Input audio file (WAV, MP3)
        input: PathBuf,

        /// Effect slug or name (see `effects`)
        #[arg(short, long)]
        effect: EffectType,

        /// Output file (default: prefixed name next to the input)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Directory for the prefixed output file
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input size limit in MB (overrides the configuration)
        #[arg(long)]
        max_size_mb: Option<u64>,
    },

    /// List available effects
    #[command(name = "effects")]
    Effects,

    /// Print the parameters and graph of an effect as JSON
    #[command(name = "describe")]
    Describe {
        /// Effect slug or name
        #[arg(short, long)]
        effect: EffectType,
    },
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
    fn test_parse_process() {
        let cli = Cli::parse_from([
            "remixer-cli",
            "process",
            "song.mp3",
            "--effect",
            "8d",
            "--max-size-mb",
            "15",
        ]);
        match cli.command {
            Commands::Process {
                input,
                effect,
                max_size_mb,
                output,
                ..
            } => {
                assert_eq!(input, PathBuf::from("song.mp3"));
                assert_eq!(effect, EffectType::EightD);
                assert_eq!(max_size_mb, Some(15));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_effect_rejected() {
        let result = Cli::try_parse_from(["remixer-cli", "describe", "--effect", "chorus"]);
        assert!(result.is_err());
    }
}
