//! Remixer CLI
//!
//! Command-line interface for the remixer.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use remixer::cli::commands::{self, ProcessOptions};
use remixer::cli::{Cli, Commands};
use remixer::RemixError;

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Remixer v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = handle_command(cli.command) {
        // Full chain only in verbose logs
        debug!("{:#}", err);
        eprintln!("{}", user_message(&err));
        std::process::exit(1);
    }
}

fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<RemixError>() {
        Some(remix) => remix.friendly_message(),
        None => "Something went wrong. Run with --verbose for details.".to_string(),
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Process {
            input,
            effect,
            output,
            output_dir,
            config,
            max_size_mb,
        } => {
            let options = ProcessOptions {
                input: &input,
                effect,
                output: output.as_deref(),
                output_dir: output_dir.as_deref(),
                config: config.as_deref(),
                max_size_mb,
            };
            commands::process(&options)
                .with_context(|| format!("failed to process {}", input.display()))?;
        }
        Commands::Effects => commands::list_effects()?,
        Commands::Describe { effect } => commands::describe(effect)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_user_message_hides_decoder_detail() {
        let err = Err::<(), _>(RemixError::decode("symphonia: malformed frame header"))
            .context("failed to process song.mp3")
            .unwrap_err();

        let message = user_message(&err);
        assert_eq!(
            message,
            "This file could not be read as audio. Try another file."
        );
        assert!(!message.contains("symphonia"));
    }

    #[test]
    fn test_user_message_for_foreign_error() {
        let err = anyhow::anyhow!("disk on fire");
        assert!(!user_message(&err).contains("disk on fire"));
    }
}
