mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_generate, cmd_get, cmd_list};
use output::{OutputFormat, print_error};

/// credforge - generate credentials once and keep them
#[derive(Parser)]
#[command(name = "credforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate every variable in a definitions file that is not stored yet
  Generate {
    /// Path to the variable definitions file
    #[arg(short, long, env = "CREDFORGE_DEF_FILE")]
    def_file: PathBuf,

    /// Path to the variables store file
    #[arg(short = 's', long, env = "CREDFORGE_VAR_STORE")]
    var_store: PathBuf,
  },

  /// List the names of stored variables
  List {
    /// Path to the variables store file
    #[arg(short = 's', long, env = "CREDFORGE_VAR_STORE")]
    var_store: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Print a stored variable without generating it
  Get {
    /// Variable name
    name: String,

    /// Path to the variables store file
    #[arg(short = 's', long, env = "CREDFORGE_VAR_STORE")]
    var_store: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Generate { def_file, var_store } => cmd_generate(&def_file, &var_store),
    Commands::List { var_store, output } => cmd_list(&var_store, output),
    Commands::Get {
      name,
      var_store,
      output,
    } => cmd_get(&var_store, &name, output),
  }
}
