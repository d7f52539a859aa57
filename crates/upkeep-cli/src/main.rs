mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "upkeep",
    about = "Local project-maintenance control panel and reintegration diff",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .upkeep/ or .git/)
    #[arg(long, global = true, env = "UPKEEP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control panel server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Require this token via the x-upkeep-token header
        #[arg(long)]
        token: Option<String>,

        /// Directory for job logs (overrides config)
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Copy an external copy of the managed subdirectory into scratch and
    /// diff it against the local tree by content hash
    Reintegrate {
        /// Path to the external checkout (or the subdirectory itself)
        #[arg(long)]
        source: PathBuf,

        /// Subdirectory name to locate inside the source
        #[arg(long, default_value = upkeep_core::paths::UPKEEP_DIR)]
        subdir: String,

        /// Scratch root for timestamped copies
        #[arg(long)]
        scratch_root: Option<PathBuf>,

        /// JSON report output path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Markdown summary output path
        #[arg(long)]
        markdown: Option<PathBuf>,
    },

    /// List the whitelisted maintenance actions
    Actions,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            token,
            log_dir,
        } => cmd::serve::run(&root, host, port, token, log_dir),
        Commands::Reintegrate {
            source,
            subdir,
            scratch_root,
            report,
            markdown,
        } => cmd::reintegrate::run(&root, source, subdir, scratch_root, report, markdown, cli.json),
        Commands::Actions => cmd::actions::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
