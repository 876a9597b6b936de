use anyhow::Result;
use clap::Parser;
use flowenv::{known_ids, run, RolloutConfig};
use std::path::PathBuf;

/// Runs a random policy through a sequenced environment.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file of a rollout configuration, other options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment identifier
    #[arg(short, long)]
    env: Option<String>,

    /// Seed of the simulator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Seed of the preprocessing pipeline
    #[arg(long)]
    env_seed: Option<u64>,

    /// The number of steps
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    /// Directory for episode statistics
    #[arg(short, long)]
    logdir: Option<PathBuf>,

    /// Output CSV file of episode summaries
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Clip rewards of Atari games to their sign
    #[arg(long, default_value_t = false)]
    clip_rewards: bool,

    /// Print known environment identifiers and exit
    #[arg(long, default_value_t = false)]
    list: bool,

    /// Print the configuration in YAML and exit
    #[arg(long, default_value_t = false)]
    show_config: bool,
}

fn config(args: &Args) -> Result<RolloutConfig> {
    let mut config = match &args.config {
        Some(path) => RolloutConfig::load(path)?,
        None => RolloutConfig::default(),
    };

    if let Some(name) = &args.env {
        config.env = config.env.name(name.as_str());
    }
    if let Some(seed) = args.seed {
        config.env = config.env.seed(seed);
    }
    if args.env_seed.is_some() {
        config.env = config.env.env_seed(args.env_seed);
    }
    if let Some(logdir) = &args.logdir {
        config.env = config.env.logdir(logdir);
    }
    if let Some(n_steps) = args.steps {
        config.n_steps = n_steps;
    }
    if args.csv.is_some() {
        config.csv = args.csv.clone();
    }
    if args.clip_rewards {
        config.atari = config.atari.clip_rewards(true);
    }

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for id in known_ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    let config = config(&args)?;
    if args.show_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    let summaries = run(&config)?;
    let n = summaries.len();
    if n > 0 {
        let mean = summaries.iter().map(|s| s.episode_return).sum::<f32>() / n as f32;
        println!("{} episodes, mean return {:.3}", n, mean);
    } else {
        println!("No episode finished in {} steps", config.n_steps);
    }

    Ok(())
}
