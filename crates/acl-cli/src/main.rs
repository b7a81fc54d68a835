//! Command-line front end for the ACLang adventure compiler.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "acl",
    about = "ACLang: compile text adventures into runtime artifacts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `ACL_LOG` overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a script and print its syntax tree
    Parse {
        /// Script file
        file: PathBuf,

        /// Directory holding `&use` libraries (default: the script's directory)
        #[arg(short, long)]
        lib: Option<PathBuf>,
    },

    /// Parse a script and report diagnostics only
    Check {
        /// Script file
        file: PathBuf,

        /// Directory holding `&use` libraries (default: the script's directory)
        #[arg(short, long)]
        lib: Option<PathBuf>,
    },

    /// Compile the built-in sample adventure
    Sample {
        /// Output file
        #[arg(short, long, default_value = "test.acl")]
        output: PathBuf,

        /// Compile as this compiler version instead of the built-in one
        #[arg(long)]
        compiler_version: Option<String>,
    },

    /// Decode a compiled artifact and list its records
    Inspect {
        /// Artifact file
        artifact: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("ACL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { file, lib } => commands::parse::run(&file, lib.as_deref()),
        Commands::Check { file, lib } => commands::check::run(&file, lib.as_deref()),
        Commands::Sample {
            output,
            compiler_version,
        } => commands::sample::run(&output, compiler_version.as_deref()),
        Commands::Inspect { artifact } => commands::inspect::run(&artifact),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
