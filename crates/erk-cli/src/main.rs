mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use erk_core::PlanState;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "erk-plan",
    about = "Read and write plans stored as GitHub issues with embedded metadata blocks",
    version,
    propagate_version = true
)]
struct Cli {
    /// Repository root (default: auto-detect from .erk/ or .git/)
    #[arg(long, global = true, env = "ERK_ROOT")]
    root: Option<PathBuf>,

    /// Target repository as OWNER/NAME (default: inferred by gh)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a single plan
    Get {
        /// Plan identifier (issue number)
        id: String,
    },

    /// List plans
    List {
        /// Only plans carrying this label (repeatable; all must match)
        #[arg(long = "label", short = 'l')]
        labels: Vec<String>,

        /// open or closed
        #[arg(long)]
        state: Option<PlanState>,

        /// Maximum number of plans to return
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the submission status history of a plan
    History {
        /// Plan issue number
        number: u64,

        /// Completion timestamp (ISO-8601; default: now)
        #[arg(long)]
        completed_at: Option<String>,
    },

    /// Print the metadata blocks found in markdown
    Blocks {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only blocks of this kind
        #[arg(long)]
        kind: Option<String>,
    },

    /// Validate every metadata block found in markdown
    Validate {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Encode a metadata block
    Render {
        /// Block kind, e.g. submission-queued
        kind: String,

        /// Payload field as KEY=VALUE (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
    },
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

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    let context = || {
        let root = root::resolve_root(cli.root.as_deref());
        cmd::Context::load(root, cli.repo.clone(), json)
    };

    match &cli.command {
        Commands::Get { id } => cmd::get::run(&context()?, id),
        Commands::List {
            labels,
            state,
            limit,
        } => cmd::list::run(&context()?, labels.clone(), *state, *limit),
        Commands::History {
            number,
            completed_at,
        } => cmd::history::run(&context()?, *number, completed_at.clone()),
        Commands::Blocks { file, kind } => {
            let text = cmd::read_input(file.as_deref())?;
            cmd::blocks::run(&text, kind.as_deref(), json)
        }
        Commands::Validate { file } => {
            let text = cmd::read_input(file.as_deref())?;
            cmd::validate::run(&text, json)
        }
        Commands::Render { kind, fields } => cmd::render::run(kind, fields),
    }
}
