//! Command-line front end for few-shot task sampling
//!
//! Reads a label file (one integer label per line, line `i` labels record
//! `i`) and prints task specifications, sampled episodes or interleaved
//! index batches as record positions.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;

use few_shot_tasks::prelude::*;

#[derive(Parser)]
#[command(name = "few-shot-tasks")]
#[command(version)]
#[command(about = "Episodic few-shot task sampling over a label file", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/sampling.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seed for the random number generator (entropy when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the task specifications built for a label file
    Tasks {
        /// Label file, one label per line
        #[arg(short, long)]
        labels: PathBuf,
    },

    /// Sample episodes and print their record positions
    Sample {
        /// Label file, one label per line
        #[arg(short, long)]
        labels: PathBuf,

        /// Number of episodes to draw
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Shots per class (overrides the configuration)
        #[arg(long)]
        shots: Option<usize>,

        /// Walk every stored task once with the configured shots instead of
        /// drawing at random
        #[arg(long, conflicts_with_all = ["shots", "count"])]
        traverse: bool,
    },

    /// Run the fixed-grouping sampler and print interleaved batches
    Batches {
        /// Label file, one non-negative label id per line
        #[arg(short, long)]
        labels: PathBuf,
    },

    /// Write the default configuration
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config/sampling.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .with_context(|| format!("failed to load {}", cli.config.display()))?
    } else {
        Config::default()
    };

    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    setup_logging(log_level)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Commands::Tasks { labels } => list_tasks(&config, &labels, &mut rng)?,
        Commands::Sample {
            labels,
            count,
            shots,
            traverse,
        } => sample_episodes(&config, &labels, count, shots, traverse, &mut rng)?,
        Commands::Batches { labels } => run_batches(&config, &labels, &mut rng)?,
        Commands::InitConfig { output } => init_config(&output)?,
    }

    Ok(())
}

/// Read one integer label per non-empty line
fn read_labels(path: &Path) -> Result<Vec<i64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            line.trim()
                .parse::<i64>()
                .with_context(|| format!("{}:{}: invalid label {:?}", path.display(), n + 1, line))
        })
        .collect()
}

fn build_sampler(
    config: &Config,
    path: &Path,
    rng: &mut StdRng,
) -> Result<EpisodeSampler<Vec<(usize, i64)>>> {
    let records: Vec<(usize, i64)> = read_labels(path)?.into_iter().enumerate().collect();
    info!("Loaded {} records from {}", records.len(), path.display());

    Ok(EpisodeSampler::new(records, config.tasks.clone(), rng)?)
}

fn list_tasks(config: &Config, path: &Path, rng: &mut StdRng) -> Result<()> {
    let sampler = build_sampler(config, path, rng)?;

    println!(
        "{} tasks ({}-way over {} classes)",
        sampler.len(),
        sampler.store().ways(),
        sampler.store().classes().len()
    );
    for (i, task) in sampler.store().tasks().iter().enumerate() {
        println!("{:>6}: {:?}", i, task.labels());
    }

    Ok(())
}

fn sample_episodes(
    config: &Config,
    path: &Path,
    count: usize,
    shots: Option<usize>,
    traverse: bool,
    rng: &mut StdRng,
) -> Result<()> {
    let sampler = build_sampler(config, path, rng)?;

    let episodes: Vec<Episode<usize, i64>> = if traverse {
        sampler.traverse(rng).collect::<few_shot_tasks::Result<_>>()?
    } else {
        (0..count)
            .map(|_| sampler.sample(rng, shots, None))
            .collect::<few_shot_tasks::Result<_>>()?
    };

    for (i, episode) in episodes.iter().enumerate() {
        println!("episode {} task {:?}", i, episode.task().labels());
        for class in 0..episode.ways() {
            let positions: Vec<usize> = episode
                .class_block(class)
                .iter()
                .map(|(position, _)| *position)
                .collect();
            println!("  class {} ({:?}): {:?}", class, episode.decode(class), positions);
        }
    }

    Ok(())
}

fn run_batches(config: &Config, path: &Path, rng: &mut StdRng) -> Result<()> {
    let labels = read_labels(path)?;
    let ids = labels
        .iter()
        .map(|&label| usize::try_from(label))
        .collect::<std::result::Result<Vec<usize>, _>>();
    let ids = match ids {
        Ok(ids) => ids,
        Err(_) => bail!("fixed-grouping sampling needs non-negative label ids"),
    };

    let sampler = FixedGroupSampler::new(&ids, config.fixed.clone())?;
    info!(
        "Sampling {} rounds of {}-way {}+{} batches",
        sampler.len(),
        sampler.ways(),
        sampler.shots(),
        sampler.query()
    );

    for (i, batch) in sampler.batches(rng).enumerate() {
        println!("batch {}: {:?}", i, batch?.positions());
    }

    Ok(())
}

fn init_config(output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Config::create_default(output)?;
    info!("Wrote default configuration to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traverse_conflicts_with_shots_and_count() {
        let base = ["few-shot-tasks", "sample", "--labels", "labels.txt", "--traverse"];

        let with_shots = Cli::try_parse_from(base.iter().chain(&["--shots", "3"]));
        assert!(with_shots.is_err());

        let with_count = Cli::try_parse_from(base.iter().chain(&["--count", "5"]));
        assert!(with_count.is_err());

        let cli = Cli::try_parse_from(base).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Sample {
                traverse: true,
                count: 1,
                shots: None,
                ..
            }
        ));
    }

    #[test]
    fn test_sample_accepts_shots_and_count() {
        let cli = Cli::try_parse_from([
            "few-shot-tasks",
            "--seed",
            "7",
            "sample",
            "--labels",
            "labels.txt",
            "--count",
            "4",
            "--shots",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        assert!(matches!(
            cli.command,
            Commands::Sample {
                count: 4,
                shots: Some(2),
                traverse: false,
                ..
            }
        ));
    }
}
