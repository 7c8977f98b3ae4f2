//! CLI for linkscope URL classification.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use linkscope_core::config;

use commands::{run_classify, run_completions, run_decompose, run_domains, run_man, run_relations};

/// Top-level CLI for linkscope.
#[derive(Debug, Parser)]
#[command(name = "linkscope", version)]
#[command(about = "linkscope: classify and canonicalize site URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Classify one or more URLs and print their canonical form.
    Classify {
        /// URLs to classify; each is reported on its own line.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print one JSON object per URL instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show how a URL splits into host, path and query components.
    Decompose {
        url: String,
    },

    /// Fetch names and related URLs for a classified URL.
    Relations {
        url: String,

        /// Also check whether the target has been deleted.
        #[arg(long)]
        liveness: bool,
    },

    /// List the registered domains and the adapter serving each.
    Domains,

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Classify { urls, json } => run_classify(&urls, json)?,
            CliCommand::Decompose { url } => run_decompose(&url)?,
            CliCommand::Relations { url, liveness } => run_relations(&cfg, &url, liveness).await?,
            CliCommand::Domains => run_domains()?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
