mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "skillsmith",
    about = "Build, package and guard a skills monorepo",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository root (default: auto-detect from skillsmith.yaml or .git/)
    #[arg(long, global = true, env = "SKILLSMITH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the generated skills tree from the development tree
    Build,

    /// Assemble the JavaScript and TypeScript release bundles
    Release,

    /// Pre-commit check: unstage and reject hand-edited generated files
    Guard,

    /// List skills in the development tree
    List {
        /// Only show skills that have a test-fixture directory
        #[arg(long)]
        with_tests: bool,
    },

    /// Show or validate the effective configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

impl Commands {
    /// Prefix for the one-line failure diagnostic.
    fn component(&self) -> &'static str {
        match self {
            Commands::Build => "build-skills",
            Commands::Release => "prepare-release-bundles",
            Commands::Guard => "guard-skills-paths",
            Commands::List { .. } => "list-skills",
            Commands::Config { .. } => "config",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let component = cli.command.component();

    let result = match cli.command {
        Commands::Build => cmd::build::run(&root, cli.json),
        Commands::Release => cmd::release::run(&root, cli.json),
        Commands::Guard => cmd::guard::run(&root, cli.json),
        Commands::List { with_tests } => cmd::list::run(&root, with_tests, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("{component} failed: {e:#}");
        std::process::exit(1);
    }
}
