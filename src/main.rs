use anyhow::Result;
use clap::Parser;
use debsel::commands::{self, OutputOptions};
use debsel::selection::Sources;
use std::path::PathBuf;

/// debsel - list Debian packages the user installed on purpose
///
/// Reads the dpkg status database and apt's extended states directly and
/// prints installed packages that were neither pulled in as dependencies nor
/// shipped as part of the base system.
///
/// Examples:
///   debsel              # List user-installed packages
///   debsel -v           # Include the first line of each description
///   debsel why vim      # Explain how vim is classified
#[derive(Parser, Debug)]
#[command(author, version = env!("DEBSEL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Filesystem root the default database paths live under (also via DEBSEL_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "DEBSEL_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// dpkg status database (defaults to /var/lib/dpkg/status)
    #[arg(
        long = "status-file",
        env = "DEBSEL_STATUS_FILE",
        value_name = "PATH",
        global = true
    )]
    pub status_file: Option<PathBuf>,

    /// apt extended states database (defaults to /var/lib/apt/extended_states)
    #[arg(
        long = "extended-states",
        env = "DEBSEL_EXTENDED_STATES",
        value_name = "PATH",
        global = true
    )]
    pub extended_states: Option<PathBuf>,

    /// Show package descriptions in addition to names
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
enum Commands {
    /// List packages explicitly installed by the user (default)
    List,

    /// Explain why a package is or is not listed
    Why(WhyArgs),
}

#[derive(clap::Args, Debug, PartialEq)]
pub struct WhyArgs {
    /// Package name
    #[arg(value_name = "PACKAGE")]
    pub package: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = debsel::runtime::RealRuntime;

    let sources = Sources::resolve(cli.root, cli.status_file, cli.extended_states);
    let options = OutputOptions {
        verbose: cli.verbose,
        json: cli.json,
    };

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => commands::list(&runtime, &sources, options)?,
        Commands::Why(args) => commands::why(&runtime, &sources, &args.package, options)?,
    }
    Ok(())
}
