//! CLI for the QCW cache warmer.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use qcw_core::config::{self, ServerOverrides, WarmOverrides};
use std::path::PathBuf;

use commands::{run_check_users, run_completions, run_man, run_probe, run_warm};

/// Top-level CLI for the QCW cache warmer.
#[derive(Debug, Parser)]
#[command(name = "qcw", version)]
#[command(
    about = "QCW: warm QRS security rule caches by impersonating a list of users",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Connection flags shared by `warm` and `probe`.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Target server, e.g. https://qlik.corp.local (https is assumed without a scheme).
    #[arg(long)]
    pub url: String,

    /// QRS port (config default: 4242).
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding client.pem, client_key.pem and optionally root.pem.
    #[arg(long, value_name = "DIR")]
    pub cert_dir: Option<PathBuf>,

    /// Do not verify the server certificate.
    #[arg(long)]
    pub insecure: bool,

    /// Timeout for a single REST request.
    #[arg(long, value_name = "SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl ServerArgs {
    fn overrides(&self) -> ServerOverrides {
        ServerOverrides {
            url: self.url.clone(),
            port: self.port,
            cert_dir: self.cert_dir.clone(),
            insecure: self.insecure,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe the server, then warm the cache for every user in the file.
    Warm {
        #[command(flatten)]
        server: ServerArgs,

        /// File with one DOMAIN\user per line.
        #[arg(long, value_name = "FILE")]
        users: PathBuf,

        /// Number of concurrent workers (config default: 4).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,

        /// Suffix for the UserPrincipleName security clause, e.g. @corp.local.
        #[arg(long, value_name = "SUFFIX")]
        upn_suffix: Option<String>,

        /// Reset the security rule cache once before warming.
        #[arg(long)]
        clear_cache: bool,

        /// Also request the first page of the app table per user.
        #[arg(long, conflicts_with = "no_extended")]
        extended: bool,

        /// Skip the app table request even if the config file enables it.
        #[arg(long)]
        no_extended: bool,

        /// Stop taking new users after this many seconds.
        #[arg(long, value_name = "SECS")]
        deadline_secs: Option<u64>,
    },

    /// Check connectivity as the repository service account.
    Probe {
        #[command(flatten)]
        server: ServerArgs,

        /// Reset the security rule cache after a successful probe.
        #[arg(long)]
        clear_cache: bool,
    },

    /// Validate a user file without contacting the server.
    CheckUsers {
        /// Path to the user file.
        path: PathBuf,
    },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page.
    Man,
}

/// `--extended` / `--no-extended` as a tri-state; neither keeps the config value.
fn extended_override(extended: bool, no_extended: bool) -> Option<bool> {
    match (extended, no_extended) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(err) => {
                // --help and --version print to stdout and exit 0.
                if !err.use_stderr() {
                    err.exit();
                }
                let _ = err.print();
                std::process::exit(1);
            }
        };

        match cli.command {
            CliCommand::Warm {
                server,
                users,
                threads,
                upn_suffix,
                clear_cache,
                extended,
                no_extended,
                deadline_secs,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let overrides = WarmOverrides {
                    server: server.overrides(),
                    threads,
                    upn_suffix,
                    clear_cache,
                    users_file: users,
                    extended: extended_override(extended, no_extended),
                    deadline_secs,
                };
                run_warm(&cfg, &overrides).await?;
            }
            CliCommand::Probe {
                server,
                clear_cache,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_probe(&cfg, &server.overrides(), clear_cache).await?;
            }
            CliCommand::CheckUsers { path } => run_check_users(&path)?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
