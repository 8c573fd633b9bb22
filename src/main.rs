mod checksum;
mod commands;
mod core;
mod recipe;
mod ui;
mod version;

use clap::{Parser, Subcommand};
use commands::{PatchArgs, UpdateOptions};
use crate::core::error::{BumpError, print_error};
use std::path::PathBuf;

/// Keep conda-forge feedstocks in sync with upstream runtime releases
#[derive(Parser)]
#[command(name = "forge-bump")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve upstream releases and update feedstocks (patch, rerender, push, PR)
  Update {
    /// Preview gate decisions without making any changes
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Restrict the run to one configured target
    #[arg(long)]
    target: Option<String>,
    /// Output the run summary in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show the latest release per tracked series without touching feedstocks
  Resolve {
    /// Restrict to one configured target
    #[arg(long)]
    target: Option<String>,
    /// Output resolved candidates in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Apply a version and checksum set to a local feedstock checkout
  Patch {
    /// Path to the feedstock checkout
    feedstock_dir: PathBuf,
    /// Version to write into the recipe
    #[arg(long)]
    to: String,
    /// Digest for one artifact: unix=<hex>, win-64=<hex>, win-arm64=<hex>,
    /// or <url>=<hex> (repeatable)
    #[arg(long = "sha256", value_name = "KEY=HEX")]
    sha256: Vec<String>,
    /// Package name substituted for {{ name }} in recipe URLs
    /// (default: feedstock directory name without "-feedstock")
    #[arg(long)]
    package: Option<String>,
  },
}

fn main() {
  let cli = Cli::parse();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let result = match cli.command {
    Commands::Update { dry_run, target, json } => commands::run_update(&cwd, UpdateOptions { dry_run, target, json }),
    Commands::Resolve { target, json } => commands::run_resolve(&cwd, target, json),
    Commands::Patch {
      feedstock_dir,
      to,
      sha256,
      package,
    } => commands::run_patch(PatchArgs {
      feedstock_dir,
      to,
      sha256,
      package,
    }),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: BumpError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}
