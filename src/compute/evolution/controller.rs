//! Generational population controller.
//!
//! The environment evaluates one genome at a time and reports its score
//! through [`PopulationController::death`]. Once every genome of the
//! generation has died, the controller builds the next generation:
//! sort, elitism, crossover, mutation, random fill.

use std::io;

use log::{debug, info, warn};
use serde::Serialize;

use super::gene_pool::GenePool;
use super::genome::GenomeRng;
use super::scoring::{FitnessScoring, NoveltySearch, ScoringStrategy};
use super::stats::StatsLog;
use crate::compute::{Network, NetworkError, validate_topology};
use crate::schema::{ConfigError, Topology, TrainerConfig};

/// Receives the genome it should drive next.
pub trait Environment {
    /// Rebind the live agent to `genome`.
    fn assign_genome(&mut self, genome: &Network);
}

/// Errors surfaced by the controller.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("No genome is being evaluated; start the controller first")]
    NotEvaluating,
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write generation stats: {0}")]
    Io(#[from] io::Error),
}

/// Snapshot of where training stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationProgress {
    /// Current generation, starting at 1.
    pub generation: usize,
    /// Index of the genome being evaluated.
    pub genome: usize,
    /// Genomes per generation.
    pub population_size: usize,
    /// Running best score (fitness, or novelty for novelty search).
    pub best_score: f64,
    /// Archived genomes (novelty search only).
    pub archive_size: usize,
}

/// Owns the population and advances it one genome death at a time.
pub struct PopulationController<S = FitnessScoring> {
    config: TrainerConfig,
    topology: Topology,
    scoring: S,
    rng: GenomeRng,
    population: Vec<Network>,
    gene_pool: GenePool,
    current: Option<usize>,
    generation: usize,
    best_score: f64,
    champion: Option<Network>,
    stats: Option<StatsLog>,
}

impl PopulationController<FitnessScoring> {
    /// Controller ranking genomes by raw fitness.
    pub fn new(config: TrainerConfig, topology: Topology) -> Result<Self, TrainerError> {
        Self::with_strategy(config, topology, FitnessScoring)
    }
}

impl PopulationController<NoveltySearch> {
    /// Controller ranking genomes by novelty; requires `noveltyThreshold`.
    pub fn with_novelty(config: TrainerConfig, topology: Topology) -> Result<Self, TrainerError> {
        let threshold = config.novelty_threshold()?;
        Self::with_strategy(config, topology, NoveltySearch::new(threshold))
    }
}

impl<S: ScoringStrategy> PopulationController<S> {
    /// Controller with an explicit scoring strategy.
    pub fn with_strategy(
        config: TrainerConfig,
        topology: Topology,
        scoring: S,
    ) -> Result<Self, TrainerError> {
        config.validate()?;
        validate_topology(&topology)?;

        let rng = config
            .random_seed
            .map(GenomeRng::new)
            .unwrap_or_else(GenomeRng::random);

        Ok(Self {
            config,
            topology,
            scoring,
            rng,
            population: Vec::new(),
            gene_pool: GenePool::new(),
            current: None,
            generation: 1,
            best_score: f64::NEG_INFINITY,
            champion: None,
            stats: None,
        })
    }

    /// Append per-generation rows to `log` on every repopulation.
    pub fn with_stats_log(mut self, log: StatsLog) -> Self {
        self.stats = Some(log);
        self
    }

    /// Create the initial random population and hand genome 0 to `env`.
    ///
    /// Calling it again starts a fresh run: the running best, the champion
    /// and the gene pool are cleared. The random source and any novelty
    /// archive carry over.
    pub fn start<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<(), TrainerError> {
        let mut population = Vec::with_capacity(self.config.initial_population);
        self.fill_random(&mut population)?;

        self.population = population;
        self.gene_pool.clear();
        self.generation = 1;
        self.best_score = f64::NEG_INFINITY;
        self.champion = None;
        self.current = Some(0);
        info!(
            "Starting training: {} genomes, topology {} -> {:?} -> {}",
            self.population.len(),
            self.topology.inputs,
            self.topology.hidden,
            self.topology.outputs
        );

        env.assign_genome(&self.population[0]);
        Ok(())
    }

    /// Genome the environment should currently be driving.
    pub fn current_genome(&self) -> Result<&Network, TrainerError> {
        let index = self.current.ok_or(TrainerError::NotEvaluating)?;
        Ok(&self.population[index])
    }

    /// Record `score` for the current genome, then advance to the next
    /// genome or, after the last one, build the next generation.
    pub fn death<E: Environment + ?Sized>(
        &mut self,
        score: f64,
        env: &mut E,
    ) -> Result<(), TrainerError> {
        let index = self.current.ok_or(TrainerError::NotEvaluating)?;

        let genome = &mut self.population[index];
        let recorded = self.scoring.on_death(genome, score)?;
        debug!(
            "Generation {} genome {} died: signal {:.4}, score {:.4}",
            self.generation, index, score, recorded
        );

        if recorded > self.best_score {
            self.best_score = recorded;
            self.champion = Some(genome.clone());
        }

        if index + 1 < self.population.len() {
            self.current = Some(index + 1);
        } else {
            self.repopulate()?;
        }

        if let Some(next) = self.current {
            env.assign_genome(&self.population[next]);
        }
        Ok(())
    }

    /// Replace the evaluated generation with the next one.
    fn repopulate(&mut self) -> Result<(), TrainerError> {
        if let Some(stats) = &mut self.stats {
            stats.append(self.generation, &self.population)?;
        }

        self.gene_pool.clear();
        self.generation += 1;

        self.sort_population();
        let mut next = self.select_elites();
        self.crossover(&mut next)?;

        let mut mutated = 0;
        for genome in &mut next {
            mutated += self.rng.mutate(genome, self.config.mutation_chance);
        }
        let filled = next.len();

        self.fill_random(&mut next)?;

        info!(
            "Generation {} ready: best score {:.4}, {} selected, {} matrices mutated, gene pool {} entries ({} distinct)",
            self.generation,
            self.best_score,
            filled,
            mutated,
            self.gene_pool.len(),
            self.gene_pool.distinct()
        );

        self.population = next;
        self.current = Some(0);
        Ok(())
    }

    /// Stable sort, best score first.
    fn sort_population(&mut self) {
        let scoring = &self.scoring;
        self.population
            .sort_by(|a, b| scoring.score(b).total_cmp(&scoring.score(a)));
    }

    /// Clone the elites and feed the gene pool from the best and worst genomes.
    fn select_elites(&mut self) -> Vec<Network> {
        let mut next = Vec::with_capacity(self.config.initial_population);
        let multiplier = self.config.fitness_multiplier;

        for (i, genome) in self
            .population
            .iter()
            .enumerate()
            .take(self.config.best_agent_selection)
        {
            next.push(genome.clone_fresh());
            self.gene_pool.add(
                i,
                GenePool::copies_for(self.scoring.score(genome), multiplier),
            );
        }

        let last = self.population.len() - 1;
        for i in 0..self.config.worst_agent_selection.min(self.population.len()) {
            let index = last - i;
            let score = self.scoring.score(&self.population[index]);
            self.gene_pool
                .add(index, GenePool::copies_for(score, multiplier));
        }

        next
    }

    /// Fill the crossover slots, two children per parent pair.
    fn crossover(&mut self, next: &mut Vec<Network>) -> Result<(), TrainerError> {
        for i in (0..self.config.number_to_crossover).step_by(2) {
            let (first, second) = match self.gene_pool.draw_parents(&mut self.rng) {
                Some(pair) => pair,
                None => {
                    if !self.gene_pool.is_empty() {
                        warn!(
                            "Gene pool holds a single genome; crossing loop indices {} and {}",
                            i,
                            i + 1
                        );
                    }
                    (i, i + 1)
                }
            };

            let children = self.rng.crossover(
                &self.population[first],
                &self.population[second],
                self.config.crossover_chance,
            )?;
            next.extend(children);
        }
        Ok(())
    }

    /// Top up with fresh random genomes until the population is full.
    fn fill_random(&mut self, next: &mut Vec<Network>) -> Result<(), TrainerError> {
        while next.len() < self.config.initial_population {
            next.push(self.rng.random_network(&self.topology)?);
        }
        Ok(())
    }

    /// Current generation, starting at 1.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Index of the genome being evaluated, once started.
    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Running best score.
    #[inline]
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Copy of the genome that produced the running best score.
    ///
    /// Unlike elites, the copy keeps the `fitness` and `novelty` it died with.
    pub fn champion(&self) -> Option<&Network> {
        self.champion.as_ref()
    }

    pub fn population(&self) -> &[Network] {
        &self.population
    }

    /// Gene pool built by the last repopulation.
    pub fn gene_pool(&self) -> &GenePool {
        &self.gene_pool
    }

    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Get current progress.
    pub fn progress(&self) -> GenerationProgress {
        GenerationProgress {
            generation: self.generation,
            genome: self.current.unwrap_or(0),
            population_size: self.population.len(),
            best_score: self.best_score,
            archive_size: self.scoring.archive_size(),
        }
    }
}
