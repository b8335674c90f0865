//! ChaosCrypt CLI - Chaotic image encryption tool.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid key, missing nonce, unknown algorithm)
  65  Data error (dimension mismatch, invalid image)
  66  Cannot read input file
  74  Cannot write output file
  75  Operation cancelled";

#[derive(Parser)]
#[command(name = "chaoscrypt")]
#[command(author, version, about = "Chaotic-map image encryption", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an image and write the ciphertext as PNG
    Encrypt(commands::encrypt::EncryptArgs),

    /// Decrypt a ciphertext PNG
    Decrypt(commands::decrypt::DecryptArgs),

    /// Compare an original image with its ciphertext
    Analyze(commands::analyze::AnalyzeArgs),

    /// List the supported algorithms
    Algorithms,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chaoscrypt={level},chaoscrypt_core={level}")));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Encrypt(args) => commands::encrypt::execute(args, quiet),
        Commands::Decrypt(args) => commands::decrypt::execute(args, quiet),
        Commands::Analyze(args) => commands::analyze::execute(args, quiet),
        Commands::Algorithms => commands::algorithms::execute(quiet),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::success().into(),
        Err(err) => {
            let exit = ExitCode::from_anyhow(&err);
            if let Some(message) = &exit.message {
                eprintln!("{} {}", "Error:".red().bold(), message);
            }
            exit.into()
        }
    }
}
