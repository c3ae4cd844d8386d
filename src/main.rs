/*!
Main binary for xtream-probe.
*/

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::debug;
use std::io::{Write, stdout};
use std::path::PathBuf;

use xtream_probe::client::XtreamClient;
use xtream_probe::commands::{self, dump, fields, find, vod_info};
use xtream_probe::config;

/// Probe an Xtream-Codes style IPTV panel API and search JSON documents for
/// fields by key name.
#[derive(Parser)]
#[command(
    name = "xprobe",
    version,
    about,
    arg_required_else_help = true,
    long_about = None,
    disable_help_subcommand = true
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,
    /// Credential file (`key=value` lines with address, username, password)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Panel base URL, overriding the config file
    #[arg(long, global = true, value_name = "URL")]
    address: Option<String>,
    /// Panel username, overriding the config file
    #[arg(long, global = true)]
    username: Option<String>,
    /// Panel password, overriding the config file
    #[arg(long, global = true)]
    password: Option<String>,
}

impl Args {
    /// Builds a panel client from the config file and overrides.
    fn client(&self) -> Result<XtreamClient> {
        let credentials = config::resolve_credentials(
            self.config.as_deref(),
            self.address.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
        )
        .context("failed to load panel credentials")?;
        debug!("panel address: {}", credentials.address);
        Ok(XtreamClient::new(credentials)?)
    }
}

/// Available subcommands for `xprobe`
#[derive(Subcommand)]
enum Commands {
    /// Search a local JSON, YAML or TOML document for keys by name
    Find(find::FindArgs),
    /// List the fields of the first item of a stream listing
    Fields(fields::FieldsArgs),
    /// Inspect a VOD detail document for language-related fields
    VodInfo(vod_info::VodInfoArgs),
    /// Call one API action and print the first record it returns
    Dump(dump::DumpArgs),
    #[command(subcommand)]
    /// Generate additional documentation and/or completions
    Generate(GenerateCommand),
}

/// Generate shell completions and man page
#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate shell completions for the given shell to stdout.
    Shell { shell: clap_complete::Shell },
    /// Generate man pages into the output directory if specified, else the
    /// current directory.
    Man {
        /// The output directory to write the man pages.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Entry point for main binary.
///
/// Sets up logging from the verbosity flags (`RUST_LOG` still applies), then
/// runs the chosen subcommand. Any failure is reported once, with its causes,
/// and the process exits with status 1.
fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .parse_default_env()
        .init();

    let mut out = stdout().lock();
    match &args.command {
        Commands::Find(find_args) => find::run(find_args, &mut out)?,
        Commands::Fields(fields_args) => fields::run(&args.client()?, fields_args, &mut out)?,
        Commands::VodInfo(info_args) => vod_info::run(&args.client()?, info_args, &mut out)?,
        Commands::Dump(dump_args) => dump::run(&args.client()?, dump_args, &mut out)?,
        Commands::Generate(GenerateCommand::Shell { shell }) => {
            let mut cmd = Args::command();
            generate(*shell, &mut cmd, "xprobe", &mut out);
        }
        Commands::Generate(GenerateCommand::Man { output_dir }) => {
            let written = commands::generate::generate_man_pages(
                &Args::command(),
                output_dir.clone(),
            )?;
            for path in written {
                writeln!(out, "Generated: {}", path.display())?;
            }
        }
    }

    Ok(())
}
