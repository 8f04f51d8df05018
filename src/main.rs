use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use zigverm_release::{ReleaseConfig, Zig, make_release};

#[derive(Parser)]
#[command(name = "zigverm-release")]
#[command(version)]
#[command(about = "Cross-compile zigverm and package release archives")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every target and write zipped releases into ./releases
    MakeRelease,

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Unknown(args) => {
            let name = args.first().map(String::as_str).unwrap_or_default();
            eprintln!("invalid usage. No such subcommand '{}'", name);
            process::exit(2);
        }
        Commands::MakeRelease => {
            init_logging();

            let config = ReleaseConfig::default();
            let zig = Zig::from_config(&config);

            match make_release(&config, &zig) {
                Ok(summary) => {
                    let built = summary.built().count();
                    let failed = summary.failed().count();
                    if summary.is_success() {
                        println!("Built {} releases for zigverm {}", built, summary.version);
                    } else {
                        eprintln!(
                            "{} {} of {} targets failed for zigverm {}",
                            "error:".red().bold(),
                            failed,
                            built + failed,
                            summary.version
                        );
                        process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", "error:".red().bold(), e);
                    process::exit(1);
                }
            }
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .init();
}
