//! eventlogic CLI: propagate, solve or sample a fact/formula pair.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eventlogic::config::EngineConfig;
use eventlogic::domain::Domain;
use eventlogic::inference::{McSat, MaxWalkSat};
use eventlogic::interval::{Interval, MAX_TIME, MIN_TIME};
use eventlogic::parser::load_domain;
use eventlogic::syntax::{ELSentence, Weight};
use eventlogic::unitprop::propagate_domain;

#[derive(Parser)]
#[command(name = "eventlogic")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weighted interval event logic inference")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Fact file: one `[!]atom @ region` per line
    #[arg(long, value_name = "FILE")]
    facts: PathBuf,

    /// Formula file: one `[weight:] sentence [@ region]` per line
    #[arg(long, value_name = "FILE")]
    formulas: PathBuf,

    /// TOML configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run unit propagation and print the simplified domain
    Propagate {
        #[command(flatten)]
        inputs: Inputs,
    },

    /// Search for a high-scoring model with MaxWalkSat
    Solve {
        #[command(flatten)]
        inputs: Inputs,

        /// Override the iteration limit
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Weight given to hard formulas left after propagation
        #[arg(long, default_value = "1000")]
        hard_weight: f64,
    },

    /// Draw models with MC-SAT and report how often each atom holds
    Sample {
        #[command(flatten)]
        inputs: Inputs,

        /// Override the number of samples
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        /// Interval to report frequencies over, as `start:finish`
        #[arg(long, value_parser = parse_interval)]
        interval: Option<Interval>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Propagate { inputs } => {
            let (domain, _) = load(&inputs)?;
            let propagated = propagate_domain(&domain)?;
            if cli.json {
                println!("{}", domain_report(&propagated));
            } else {
                print_domain(&propagated);
            }
        }
        Commands::Solve {
            inputs,
            iterations,
            hard_weight,
        } => {
            let (domain, mut config) = load(&inputs)?;
            if let Some(iterations) = iterations {
                config.maxwalksat.max_iterations = iterations;
            }
            let propagated = propagate_domain(&domain)?;
            let formulas = propagated
                .formulas()
                .iter()
                .map(|f| soften(f, hard_weight))
                .collect();
            let searchable = propagated.with_formulas(formulas);

            let mut rng = StdRng::seed_from_u64(inputs.seed);
            let outcome = MaxWalkSat::new(&searchable)
                .with_config(config.maxwalksat)
                .run(&mut rng)?;
            info!(iterations = outcome.iterations, "search finished");
            if cli.json {
                let model: serde_json::Map<String, serde_json::Value> = outcome
                    .model
                    .atoms()
                    .iter()
                    .map(|atom| (atom.to_string(), json!(outcome.model.get_atom(atom).to_string())))
                    .collect();
                let report = json!({
                    "score": outcome.score,
                    "iterations": outcome.iterations,
                    "model": model,
                });
                println!("{}", report);
            } else {
                println!("score: {}", outcome.score);
                println!("{}", outcome.model);
            }
        }
        Commands::Sample {
            inputs,
            samples,
            interval,
        } => {
            let (domain, mut config) = load(&inputs)?;
            if let Some(samples) = samples {
                config.mcsat.num_samples = samples;
            }
            let interval = interval.unwrap_or(domain.max_interval());

            let mut rng = StdRng::seed_from_u64(inputs.seed);
            let mut sampler = McSat::new(&domain).with_config(config.mcsat);
            sampler.run(&mut rng)?;
            if cli.json {
                let frequencies: serde_json::Map<String, serde_json::Value> = domain
                    .atoms()
                    .iter()
                    .map(|atom| (atom.to_string(), json!(sampler.frequency(atom, &interval))))
                    .collect();
                let report = json!({
                    "samples": sampler.size(),
                    "interval": interval.to_string(),
                    "frequencies": frequencies,
                });
                println!("{}", report);
            } else {
                println!("samples: {}", sampler.size());
                for atom in domain.atoms() {
                    println!("{} @ {}: {:.3}", atom, interval, sampler.frequency(atom, &interval));
                }
            }
        }
    }
    Ok(())
}

fn load(inputs: &Inputs) -> Result<(Domain, EngineConfig)> {
    let config = match &inputs.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let facts = read(&inputs.facts)?;
    let formulas = read(&inputs.formulas)?;
    let domain = load_domain(&facts, &formulas, config.domain.clone())
        .with_context(|| format!("parsing {} / {}", inputs.facts.display(), inputs.formulas.display()))?;
    info!(
        universe = %domain.max_interval(),
        formulas = domain.formulas().len(),
        observations = domain.observations().len(),
        "loaded domain"
    );
    Ok((domain, config))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn soften(formula: &ELSentence, hard_weight: f64) -> ELSentence {
    if formula.has_infinite_weight() {
        formula.clone().with_weight(Weight::Finite(hard_weight))
    } else {
        formula.clone()
    }
}

fn print_domain(domain: &Domain) {
    for (prop, region) in domain.observations() {
        println!("{} @ {}", prop, region);
    }
    for formula in domain.formulas() {
        println!("{}", formula);
    }
}

fn domain_report(domain: &Domain) -> serde_json::Value {
    let observations: Vec<serde_json::Value> = domain
        .observations()
        .iter()
        .map(|(prop, region)| {
            json!({
                "proposition": prop.to_string(),
                "region": region.to_string(),
            })
        })
        .collect();
    let formulas: Vec<String> = domain.formulas().iter().map(|f| f.to_string()).collect();
    json!({
        "observations": observations,
        "formulas": formulas,
    })
}

fn parse_interval(text: &str) -> Result<Interval, String> {
    let (start, finish) = text
        .split_once(':')
        .ok_or_else(|| format!("expected start:finish, got '{}'", text))?;
    let start: i64 = start.trim().parse().map_err(|e| format!("bad start: {}", e))?;
    let finish: i64 = finish.trim().parse().map_err(|e| format!("bad finish: {}", e))?;
    for t in [start, finish] {
        if !(MIN_TIME..=MAX_TIME).contains(&t) {
            return Err(format!("time point {} is out of range", t));
        }
    }
    if start > finish {
        return Err(format!("start {} is after finish {}", start, finish));
    }
    Ok(Interval::new(start, finish))
}
