//! Neuroevolution trainer CLI.
//!
//! Trains a population against a built-in curve-tracking sandbox driven by a
//! flat JSON configuration, or replays a saved genome.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use neat_trainer::compute::Network;
use neat_trainer::compute::evolution::{
    Environment, PopulationController, ScoringStrategy, StatsLog,
};
use neat_trainer::schema::{GenomeFile, Topology, TrainerConfig, flat_map_from_json};

/// Samples per evaluation.
const SAMPLES: usize = 64;

/// Sandbox agent: sees a window of a sine wave and predicts its next value on
/// output 0. Fitness rewards small prediction error.
struct CurveTracker {
    network: Option<Network>,
    step: f64,
}

impl CurveTracker {
    fn new() -> Self {
        Self {
            network: None,
            step: 0.35,
        }
    }

    /// Run the assigned network over every sample and score it.
    fn evaluate(&self) -> Result<f64, neat_trainer::compute::NetworkError> {
        let Some(network) = &self.network else {
            return Ok(0.0);
        };

        let window = network.topology().inputs;
        let mut fitness = 0.0;
        for sample in 0..SAMPLES {
            let phase = sample as f64 * 0.2;
            let inputs: Vec<f64> = (0..window)
                .map(|j| (phase + j as f64 * self.step).sin())
                .collect();
            let target = (phase + window as f64 * self.step).sin();

            let outputs = network.run(&inputs)?;
            fitness += 1.0 - (outputs[0] - target).abs().min(1.0);
        }
        Ok(fitness / SAMPLES as f64 * 10.0)
    }
}

impl Environment for CurveTracker {
    fn assign_genome(&mut self, genome: &Network) {
        self.network = Some(genome.clone());
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "--replay" => {
            let (Some(genome), Some(config)) = (args.get(2), args.get(3)) else {
                print_usage(&args[0]);
                std::process::exit(1);
            };
            replay(Path::new(genome), Path::new(config));
        }
        config => {
            let generations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(50);
            train(Path::new(config), generations);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json> [generations]", program);
    eprintln!("       {} --replay <genome.json> <config.json>", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Train networks against the curve-tracking sandbox.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Flat JSON map with trainer and topology keys");
    eprintln!("  generations  Number of generations to train (default: 50)");
    eprintln!();
    eprintln!("Setting noveltyThreshold in the config switches to novelty search.");
}

fn load_map(path: &Path) -> HashMap<String, String> {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    flat_map_from_json(&json).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn train(config_path: &Path, generations: usize) {
    let map = load_map(config_path);
    let config = TrainerConfig::from_map(&map).unwrap_or_else(|e| {
        eprintln!("Invalid trainer config: {}", e);
        std::process::exit(1);
    });
    let topology = Topology::from_map(&map).unwrap_or_else(|e| {
        eprintln!("Invalid topology: {}", e);
        std::process::exit(1);
    });

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let stats = StatsLog::create(base_dir.join("logs")).unwrap_or_else(|e| {
        eprintln!("Error creating stats log: {}", e);
        std::process::exit(1);
    });

    println!("Neuroevolution Trainer");
    println!("======================");
    println!(
        "Topology: {} -> {:?} -> {} ({:?})",
        topology.inputs, topology.hidden, topology.outputs, topology.activations
    );
    println!("Population: {}", config.initial_population);
    println!("Generations: {}", generations);
    println!("Stats: {}", stats.path().display());
    println!();

    let result = if config.novelty_threshold.is_some() {
        println!("Selection: novelty search");
        PopulationController::with_novelty(config, topology)
            .map(|c| run_training(c.with_stats_log(stats), generations))
    } else {
        println!("Selection: fitness");
        PopulationController::new(config, topology)
            .map(|c| run_training(c.with_stats_log(stats), generations))
    };

    let champion = result.unwrap_or_else(|e| {
        eprintln!("Error creating trainer: {}", e);
        std::process::exit(1);
    });

    if let Some(champion) = champion {
        let file = GenomeFile::from_network(&champion);
        let path: PathBuf = base_dir.join("networks").join(file.file_name());
        match file.save(&path) {
            Ok(()) => println!("Saved best network to {}", path.display()),
            Err(e) => eprintln!("Error saving best network: {}", e),
        }
    }
}

/// Drive the controller through `generations` full generations and return
/// the champion.
fn run_training<S: ScoringStrategy>(
    mut controller: PopulationController<S>,
    generations: usize,
) -> Option<Network> {
    let mut env = CurveTracker::new();
    if let Err(e) = controller.start(&mut env) {
        eprintln!("Error starting trainer: {}", e);
        std::process::exit(1);
    }

    let start = Instant::now();
    let last_generation = controller.generation() + generations;
    let report_every = (generations / 10).max(1);

    while controller.generation() < last_generation {
        let fitness = env.evaluate().unwrap_or_else(|e| {
            eprintln!("Error running network: {}", e);
            std::process::exit(1);
        });

        let generation = controller.generation();
        if let Err(e) = controller.death(fitness, &mut env) {
            eprintln!("Error during training: {}", e);
            std::process::exit(1);
        }

        if controller.generation() != generation && generation % report_every == 0 {
            let progress = controller.progress();
            println!(
                "  Generation {}: best score={:.4}, archive={}, {:.1} gens/s",
                generation,
                progress.best_score,
                progress.archive_size,
                generation as f32 / start.elapsed().as_secs_f32()
            );
        }
    }

    println!();
    println!(
        "Finished {} generations in {:.2}s",
        generations,
        start.elapsed().as_secs_f32()
    );
    println!("Best score: {:.4}", controller.best_score());

    controller.champion().cloned()
}

fn replay(genome_path: &Path, config_path: &Path) {
    let map = load_map(config_path);
    let topology = Topology::from_map(&map).unwrap_or_else(|e| {
        eprintln!("Invalid topology: {}", e);
        std::process::exit(1);
    });

    let file = GenomeFile::load_source(Some(genome_path)).unwrap_or_else(|e| {
        eprintln!("Error loading genome: {}", e);
        std::process::exit(1);
    });
    let network = file.genome.decode(&topology).unwrap_or_else(|e| {
        eprintln!("Genome does not fit the configured topology: {}", e);
        std::process::exit(1);
    });

    let mut env = CurveTracker::new();
    env.assign_genome(&network);
    let fitness = env.evaluate().unwrap_or_else(|e| {
        eprintln!("Error running network: {}", e);
        std::process::exit(1);
    });

    println!("Saved fitness:    {:.4}", file.fitness);
    println!("Replayed fitness: {:.4}", fitness);
}

fn print_example_config() {
    let mut map: BTreeMap<String, String> = TrainerConfig::default().to_map().into_iter().collect();
    map.insert("inputsAmount".to_string(), "5".to_string());
    map.insert("neuronsInHiddenLayerCount".to_string(), "8,6".to_string());
    map.insert("outputsAmount".to_string(), "3".to_string());
    map.insert("activations".to_string(), "tanh,tanh,sigmoid".to_string());

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&map) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example config: {}", e),
    }
}
