use pong::{
    game_loop::Termination,
    network::Network,
    sim::Match,
    training::{play_pair, Population, Trainer, Watcher},
    Config, Error,
};

/// A network that ignores its inputs and always picks `choice` (0 up, 1 down, 2 hold).
fn fixed(choice: usize) -> Network {
    let mut output_biases = [0.0; 3];
    output_biases[choice] = 5.0;
    Network {
        input_scale: [1.0; 3],
        hidden_weights: vec![[0.0; 3]],
        hidden_biases: vec![0.0],
        output_weights: [vec![0.0], vec![0.0], vec![0.0]],
        output_biases,
    }
}

fn small_config() -> Config {
    let mut config = Config::training();
    config.training.population = 4;
    config.training.generations = 2;
    config.training.hidden = 3;
    config
}

#[test]
fn fitness_is_hits_plus_seconds_minus_penalties() {
    let config = Config::training();
    let outcome = play_pair(&config, &fixed(0), &fixed(2), 5, |_| true).unwrap();
    assert!(matches!(
        outcome.termination,
        Termination::PointScored(_) | Termination::HitCap
    ));

    let seconds = outcome.ticks as f32 / 60.0;
    // from 250 the paddle top reaches 4 after 28 steps, every later push is blocked
    let blocked = outcome.ticks as f32 - 28.0;
    let climber = outcome.hits[0] as f32 + seconds - blocked;
    let holder = outcome.hits[1] as f32 + seconds - 0.01 * outcome.ticks as f32;
    assert!((outcome.fitness[0] - climber).abs() < 1e-2, "{outcome:?}");
    assert!((outcome.fitness[1] - holder).abs() < 1e-2, "{outcome:?}");
}

#[test]
fn same_seed_same_match() {
    let config = Config::training();
    let a = play_pair(&config, &fixed(1), &fixed(2), 77, |_| true);
    let b = play_pair(&config, &fixed(1), &fixed(2), 77, |_| true);
    assert_eq!(a, b);
}

#[test]
fn resumed_training_matches_an_uninterrupted_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut straight = Trainer::new(small_config(), 11)
        .unwrap()
        .checkpoint_into(dir.path().to_path_buf());
    let winner = straight.run(None).unwrap().expect("a generation finished");
    assert_eq!(straight.population().generation, 2);
    assert!(dir.path().join("gen-0001.json").exists());
    assert!(dir.path().join("gen-0002.json").exists());

    let mut resumed = Trainer::resume(small_config(), &dir.path().join("gen-0001.json")).unwrap();
    let resumed_winner = resumed.run(None).unwrap().expect("a generation finished");
    assert_eq!(resumed.population(), straight.population());
    assert_eq!(resumed_winner, winner);

    let saved = dir.path().join("winner.json");
    winner.network.save(&saved).unwrap();
    assert_eq!(Network::load(&saved).unwrap(), winner.network);
}

#[test]
fn finished_population_cannot_be_trained_further() {
    let dir = tempfile::tempdir().unwrap();
    let mut trainer = Trainer::new(small_config(), 2)
        .unwrap()
        .checkpoint_into(dir.path().to_path_buf());
    trainer.run(None).unwrap();

    let mut again = Trainer::resume(small_config(), &dir.path().join("gen-0002.json")).unwrap();
    assert!(matches!(again.run(None), Err(Error::InvalidConfig(_))));
}

#[test]
fn threshold_stops_before_evolving() {
    let mut config = small_config();
    config.training.fitness_threshold = Some(f32::MIN);
    let mut trainer = Trainer::new(config, 4).unwrap();
    assert!(trainer.run(None).unwrap().is_some());
    assert_eq!(trainer.population().generation, 0);
}

struct Budget {
    frames: u32,
    generations: Vec<u32>,
}

impl Watcher for Budget {
    fn frame(&mut self, _game: &Match, generation: u32) -> bool {
        self.generations.push(generation);
        match self.frames.checked_sub(1) {
            Some(left) => {
                self.frames = left;
                true
            }
            None => false,
        }
    }
}

#[test]
fn watcher_can_stop_training() {
    let mut trainer = Trainer::new(small_config(), 9).unwrap();
    let mut budget = Budget {
        frames: 10,
        generations: Vec::new(),
    };
    let winner = trainer.run(Some(&mut budget)).unwrap();
    assert!(winner.is_none());
    assert_eq!(budget.generations.len(), 11);
    assert!(budget.generations.iter().all(|&g| g == 0));
    assert_eq!(trainer.population().generation, 0);
}

#[test]
fn watched_and_parallel_evaluation_agree() {
    let mut parallel = Trainer::new(small_config(), 21).unwrap();
    let mut watched = Trainer::new(small_config(), 21).unwrap();
    let mut budget = Budget {
        frames: u32::MAX,
        generations: Vec::new(),
    };
    let a = parallel.evaluate();
    let b = watched.evaluate_watched(&mut budget).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.matches, 6);
    assert_eq!(parallel.population(), watched.population());
}

#[test]
fn checkpoint_with_one_genome_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.json");
    let mut population = Population::random(&small_config().training, 1);
    population.genomes.truncate(1);
    population.save(&path).unwrap();
    assert!(matches!(Population::load(&path), Err(Error::InvalidConfig(_))));
}
