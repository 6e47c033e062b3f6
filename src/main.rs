use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graph::HEAD;
use logrebase_core::{
    format_todo, parse_todo, validate_entries, CancellationFlag, LinearHistoryResolver, PlanError,
    PlanSource, RebasePlanner, Repository, ResolveError, ResolverConfig,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logrebase")]
#[command(about = "Plan interactive rebases from the commit graph", long_about = None)]
struct Cli {
    /// Path to the repository
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the todo list for editing every commit from COMMIT up to HEAD
    Plan {
        /// Oldest commit to edit
        commit: String,
        /// Print the whole plan as JSON
        #[arg(long)]
        json: bool,
        /// Fail instead of walking the repository when the graph can't be used
        #[arg(long)]
        no_fallback: bool,
    },
    /// Check a todo file written by git against the plan built from the graph
    Verify {
        /// Oldest commit to edit
        commit: String,
        /// Todo file, usually .git/rebase-merge/git-rebase-todo
        todo: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    // Graph walks and metadata lookups block; keep them off the runtime.
    let outcome = tokio::task::spawn_blocking(move || run(cli, config, &cancel)).await?;
    match outcome {
        Err(e) if is_cancelled(&e) => {
            debug!("cancelled");
            std::process::exit(130);
        }
        other => other,
    }
}

fn run(cli: Cli, mut config: ResolverConfig, cancel: &CancellationFlag) -> Result<()> {
    let repo = Repository::open(&cli.path)?;

    match cli.command {
        Commands::Plan { commit, json, no_fallback } => {
            if no_fallback {
                config.fallback = false;
            }
            let target = repo.resolve_commit(&commit)?;
            let dag = repo.load_graph(config.graph_limit)?;
            debug!(commits = dag.node_count(), merges = dag.merge_count(), "loaded commit graph");

            let plan = RebasePlanner::new(config).plan(&repo, &dag, &target, cancel)?;
            match &plan.source {
                PlanSource::Log { .. } => info!(commits = plan.entries.len(), "planned from the commit graph"),
                PlanSource::Revwalk { reason } => info!(%reason, "planned from a revision walk"),
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                match &plan.base {
                    Some(base) => info!("rebase onto {}", base),
                    None => info!("rebase from the root commit"),
                }
                print!("{}", format_todo(&plan.entries));
            }
        }
        Commands::Verify { commit, todo } => {
            let target = repo.resolve_commit(&commit)?;
            let dag = repo.load_graph(config.graph_limit)?;

            let history = LinearHistoryResolver::new(config).resolve(&dag, &repo, HEAD, &target, cancel)?;
            let text = std::fs::read_to_string(&todo)
                .with_context(|| format!("Failed to read {}", todo.display()))?;
            let real = parse_todo(&text)?;

            validate_entries(history.entries(), &real)?;
            println!("{} matches the planned {} entries", todo.display(), history.len());
        }
    }

    Ok(())
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<PlanError>(), Some(PlanError::Cancelled))
        || e.downcast_ref::<ResolveError>().is_some_and(ResolveError::is_cancelled)
}
