//! Neuro-evolution of paddle networks.
//!
//! Every generation plays a round robin: each pair of genomes meets once,
//! left against right, on the training geometry. A genome's fitness is the
//! sum over its matches of paddle hits plus simulated seconds played, minus a
//! penalty for every move into a wall and a small one for every held tick.
//! The fittest survive unchanged, the rest are bred by tournament selection,
//! uniform crossover and mutation.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::audio::SilentAudio;
use crate::config::{Config, TrainingConfig};
use crate::error::{Error, Result};
use crate::game_loop::{MatchController, Termination};
use crate::network::Network;
use crate::policy::NetworkPolicy;
use crate::sim::{Match, MoveOutcome, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub id: u64,
    pub network: Network,
    pub fitness: f32,
}

/// A generation waiting to be evaluated. This is what checkpoints store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub generation: u32,
    pub seed: u64,
    pub genomes: Vec<Genome>,
    next_id: u64,
}

impl Population {
    pub fn random(settings: &TrainingConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let genomes = (0..settings.population as u64)
            .map(|id| Genome {
                id,
                network: Network::random(settings.hidden, &mut rng),
                fitness: 0.0,
            })
            .collect();
        Self {
            generation: 0,
            seed,
            genomes,
            next_id: settings.population as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Index of the fittest genome; ties go to the earlier one.
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, genome) in self.genomes.iter().enumerate() {
            match best {
                Some(b) if self.genomes[b].fitness >= genome.fitness => {}
                _ => best = Some(i),
            }
        }
        best
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let population: Population = serde_json::from_str(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if population.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "{}: checkpoint holds fewer than two genomes",
                path.display()
            )));
        }
        Ok(population)
    }
}

/// What one match earned each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairOutcome {
    pub fitness: [f32; 2],
    pub hits: [u32; 2],
    pub ticks: u64,
    pub termination: Termination,
}

/// Sees every tick of a watched match. Returning `false` stops training.
pub trait Watcher {
    fn frame(&mut self, game: &Match, generation: u32) -> bool;
}

/// Plays `left` against `right` once. `on_tick` returning `false` abandons
/// the match and yields `None`.
pub fn play_pair<F>(
    config: &Config,
    left: &Network,
    right: &Network,
    seed: u64,
    mut on_tick: F,
) -> Option<PairOutcome>
where
    F: FnMut(&Match) -> bool,
{
    let settings = &config.training;
    let mut controller = MatchController::new(
        Match::new(config, seed),
        config.rules,
        Box::new(NetworkPolicy::new(left.clone())),
        Box::new(NetworkPolicy::new(right.clone())),
    );
    let mut fitness = [0.0f32; 2];

    controller.start();
    let termination = loop {
        let report = controller.tick(&mut SilentAudio);
        for side in Side::BOTH {
            fitness[side.index()] -= match report.outcome(side) {
                MoveOutcome::Blocked => settings.blocked_move_penalty,
                MoveOutcome::Held => settings.hold_penalty,
                MoveOutcome::Moved => 0.0,
            };
        }
        if !on_tick(controller.game()) {
            return None;
        }
        if let Some(termination) = controller.termination() {
            break termination;
        }
    };

    let game = controller.game();
    let seconds = game.tick as f32 / config.ticks_per_second() as f32;
    let hits = [game.paddles[0].hits, game.paddles[1].hits];
    for side in Side::BOTH {
        fitness[side.index()] += hits[side.index()] as f32 + seconds;
    }
    Some(PairOutcome {
        fitness,
        hits,
        ticks: game.tick,
        termination,
    })
}

/// Round-robin schedule: every unordered pair once, lower index on the left.
pub fn round_robin(size: usize) -> Vec<(usize, usize)> {
    (0..size)
        .flat_map(|i| (i + 1..size).map(move |j| (i, j)))
        .collect()
}

fn derive_seed(base: u64, generation: u32, slot: u64) -> u64 {
    base.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ ((generation as u64) << 40) ^ slot
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    pub generation: u32,
    pub best: f32,
    pub mean: f32,
    pub best_id: u64,
    pub matches: usize,
    pub longest_rally: u32,
}

pub struct Trainer {
    config: Config,
    population: Population,
    checkpoint_dir: Option<PathBuf>,
}

impl Trainer {
    pub fn new(config: Config, seed: u64) -> Result<Self> {
        let population = Population::random(&config.training, seed);
        Self::with_population(config, population)
    }

    /// Continues from a checkpoint written by an earlier run.
    pub fn resume(config: Config, checkpoint: &Path) -> Result<Self> {
        let population = Population::load(checkpoint)?;
        log::info!(
            "resuming at generation {} with {} genomes",
            population.generation,
            population.len()
        );
        Self::with_population(config, population)
    }

    fn with_population(config: Config, population: Population) -> Result<Self> {
        config.validate()?;
        let rules = &config.rules;
        if rules.win_score.is_none()
            && !rules.end_on_score
            && rules.hit_cap.is_none()
            && rules.tick_budget.is_none()
        {
            return Err(Error::InvalidConfig(
                "training matches need at least one end condition".into(),
            ));
        }
        if population.genomes.iter().any(|g| g.network.hidden() != config.training.hidden) {
            log::warn!(
                "population hidden width differs from config ({}); crossover pairs may be truncated",
                config.training.hidden
            );
        }
        Ok(Self {
            config,
            population,
            checkpoint_dir: None,
        })
    }

    /// Writes `gen-NNNN.json` into `dir` after every generation.
    pub fn checkpoint_into(mut self, dir: PathBuf) -> Self {
        self.checkpoint_dir = Some(dir);
        self
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn record(&mut self, outcomes: &[((usize, usize), PairOutcome)]) -> GenerationReport {
        for genome in &mut self.population.genomes {
            genome.fitness = 0.0;
        }
        let mut longest_rally = 0;
        for &((left, right), outcome) in outcomes {
            self.population.genomes[left].fitness += outcome.fitness[0];
            self.population.genomes[right].fitness += outcome.fitness[1];
            longest_rally = longest_rally.max(outcome.hits[0] + outcome.hits[1]);
        }

        let genomes = &self.population.genomes;
        let mean = genomes.iter().map(|g| g.fitness).sum::<f32>() / genomes.len() as f32;
        let (best, best_id) = self
            .population
            .best()
            .map(|i| (genomes[i].fitness, genomes[i].id))
            .unwrap_or((0.0, 0));
        GenerationReport {
            generation: self.population.generation,
            best,
            mean,
            best_id,
            matches: outcomes.len(),
            longest_rally,
        }
    }

    /// Plays every pair of the current generation in parallel and assigns fitness.
    pub fn evaluate(&mut self) -> GenerationReport {
        let pairs = round_robin(self.population.len());
        let config = &self.config;
        let genomes = &self.population.genomes;
        let (seed, generation) = (self.population.seed, self.population.generation);

        let outcomes: Vec<_> = pairs
            .par_iter()
            .enumerate()
            .filter_map(|(slot, &(left, right))| {
                play_pair(
                    config,
                    &genomes[left].network,
                    &genomes[right].network,
                    derive_seed(seed, generation, slot as u64),
                    |_| true,
                )
                .map(|outcome| ((left, right), outcome))
            })
            .collect();
        self.record(&outcomes)
    }

    /// Same as [`Trainer::evaluate`] but one match at a time, shown to `watcher`.
    /// Returns `None` when the watcher asked to stop.
    pub fn evaluate_watched(&mut self, watcher: &mut dyn Watcher) -> Option<GenerationReport> {
        let pairs = round_robin(self.population.len());
        let (seed, generation) = (self.population.seed, self.population.generation);
        let mut outcomes = Vec::with_capacity(pairs.len());

        for (slot, &(left, right)) in pairs.iter().enumerate() {
            let outcome = play_pair(
                &self.config,
                &self.population.genomes[left].network,
                &self.population.genomes[right].network,
                derive_seed(seed, generation, slot as u64),
                |game| watcher.frame(game, generation),
            )?;
            outcomes.push(((left, right), outcome));
        }
        Some(self.record(&outcomes))
    }

    /// Replaces the evaluated generation with its offspring.
    pub fn evolve(&mut self) {
        let settings = self.config.training;
        let population = &mut self.population;
        let mut rng = Pcg32::seed_from_u64(derive_seed(
            population.seed,
            population.generation,
            u64::MAX,
        ));

        let mut ranked = population.genomes.clone();
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let mut next: Vec<Genome> = ranked
            .iter()
            .take(settings.elites)
            .cloned()
            .map(|genome| Genome {
                fitness: 0.0,
                ..genome
            })
            .collect();

        while next.len() < settings.population {
            let a = tournament(&ranked, settings.tournament, &mut rng);
            let b = tournament(&ranked, settings.tournament, &mut rng);
            let mut network = Network::crossover(&a.network, &b.network, &mut rng);
            network.mutate(settings.mutation_rate, settings.mutation_strength, &mut rng);
            next.push(Genome {
                id: population.next_id,
                network,
                fitness: 0.0,
            });
            population.next_id += 1;
        }

        population.genomes = next;
        population.generation += 1;
    }

    fn checkpoint(&self) -> Result<()> {
        let Some(dir) = &self.checkpoint_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("gen-{:04}.json", self.population.generation));
        self.population.save(&path)?;
        log::debug!("checkpoint written to {}", path.display());
        Ok(())
    }

    /// Runs generations until the configured count or the fitness threshold
    /// is reached and returns the best genome of the last evaluated
    /// generation. With a watcher, matches run one by one and are shown; if
    /// it stops training, the best of the last finished generation is
    /// returned, or `None` when no generation finished.
    pub fn run(&mut self, mut watcher: Option<&mut dyn Watcher>) -> Result<Option<Genome>> {
        let settings = self.config.training;
        if self.population.generation >= settings.generations {
            return Err(Error::InvalidConfig(format!(
                "population is already at generation {} of {}",
                self.population.generation, settings.generations
            )));
        }

        let mut winner = None;
        while self.population.generation < settings.generations {
            let report = match watcher.as_deref_mut() {
                Some(watcher) => match self.evaluate_watched(watcher) {
                    Some(report) => report,
                    None => {
                        log::info!("training stopped during generation {}", self.population.generation);
                        return Ok(winner);
                    }
                },
                None => self.evaluate(),
            };
            log::info!(
                "generation {}: best {:.2} (genome {}), mean {:.2}, longest rally {} over {} matches",
                report.generation,
                report.best,
                report.best_id,
                report.mean,
                report.longest_rally,
                report.matches
            );
            winner = self.population.best().map(|i| self.population.genomes[i].clone());

            if settings.fitness_threshold.is_some_and(|t| report.best >= t) {
                log::info!("fitness threshold reached at generation {}", report.generation);
                break;
            }
            self.evolve();
            self.checkpoint()?;
        }
        Ok(winner)
    }
}

fn tournament<'a, R: Rng>(ranked: &'a [Genome], size: usize, rng: &mut R) -> &'a Genome {
    let mut best = rng.random_range(0..ranked.len());
    for _ in 1..size.max(1) {
        best = best.min(rng.random_range(0..ranked.len()));
    }
    &ranked[best]
}
