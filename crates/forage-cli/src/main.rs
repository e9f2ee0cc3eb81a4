use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use forage_core::policy::{IdlePolicy, Policy, SeekPolicy};
use forage_core::{ForageConfig, ForageEnv};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyKind {
    /// Thrust toward the observed target.
    Seek,
    /// Never move.
    Idle,
}

/// Run headless foraging episodes and print a JSON summary.
#[derive(Parser, Debug)]
#[command(name = "forage", version)]
struct Args {
    /// JSON config file; fields left out keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    episodes: usize,

    /// Steps per episode. Training episodes may end earlier at `max_steps`.
    #[arg(long, default_value_t = 2000)]
    max_steps: usize,

    #[arg(long, default_value_t = 100)]
    sample_every: usize,

    /// Overrides the config seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    agents: Option<usize>,

    /// Force training mode on.
    #[arg(long)]
    training: bool,

    #[arg(long, value_enum, default_value_t = PolicyKind::Seek)]
    policy: PolicyKind,

    /// Write the summary here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> Result<ForageConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ForageConfig::from_json_str(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ForageConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(agents) = args.agents {
        config.num_agents = agents;
    }
    if args.training {
        config.training_mode = true;
    }
    config.validate().context("invalid config overrides")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        seed = config.seed,
        agents = config.num_agents,
        training = config.training_mode,
        "starting run"
    );

    let mut env = ForageEnv::try_new(config).context("failed to build environment")?;
    let mut policy: Box<dyn Policy> = match args.policy {
        PolicyKind::Seek => Box::new(SeekPolicy::default()),
        PolicyKind::Idle => Box::new(IdlePolicy),
    };
    let summary = env
        .run_experiment(args.episodes, args.max_steps, args.sample_every, policy.as_mut())
        .context("run failed")?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    info!(
        episodes = summary.episodes.len(),
        total_steps = summary.total_steps,
        mean_amount = summary.mean_amount_obtained,
        "run finished"
    );
    Ok(())
}
