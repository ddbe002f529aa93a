//! Small fixed-topology feed-forward network used as the learned paddle policy.
//!
//! Inputs are the three observation values, scaled by `input_scale`; one tanh
//! hidden layer; three outputs (up, down, hold) read by argmax.

use std::{fs, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::policy::Activate;

pub const INPUTS: usize = 3;
pub const OUTPUTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub input_scale: [f32; INPUTS],
    /// One row of input weights per hidden node
    pub hidden_weights: Vec<[f32; INPUTS]>,
    pub hidden_biases: Vec<f32>,
    /// One row of hidden weights per output
    pub output_weights: [Vec<f32>; OUTPUTS],
    pub output_biases: [f32; OUTPUTS],
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl Network {
    /// Random weights in `-1..1`. Inputs are scaled to roughly unit range for the default field.
    pub fn random<R: Rng>(hidden: usize, rng: &mut R) -> Self {
        let mut weight = || -> f32 { rng.random_range(-1.0..1.0) };
        let hidden_weights = (0..hidden)
            .map(|_| [weight(), weight(), weight()])
            .collect();
        let hidden_biases = (0..hidden).map(|_| weight()).collect();
        let output_weights = std::array::from_fn(|_| (0..hidden).map(|_| weight()).collect());
        let output_biases = [weight(), weight(), weight()];
        Self {
            input_scale: [1.0 / 500.0, 1.0 / 500.0, 1.0 / 800.0],
            hidden_weights,
            hidden_biases,
            output_weights,
            output_biases,
        }
    }

    pub fn hidden(&self) -> usize {
        self.hidden_biases.len()
    }

    fn weights_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.hidden_weights
            .iter_mut()
            .flat_map(|row| row.iter_mut())
            .chain(self.hidden_biases.iter_mut())
            .chain(self.output_weights.iter_mut().flat_map(|row| row.iter_mut()))
            .chain(self.output_biases.iter_mut())
    }

    pub fn weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.hidden_weights
            .iter()
            .flat_map(|row| row.iter().copied())
            .chain(self.hidden_biases.iter().copied())
            .chain(self.output_weights.iter().flat_map(|row| row.iter().copied()))
            .chain(self.output_biases.iter().copied())
    }

    /// Perturbs each weight with probability `rate` by up to `strength`.
    pub fn mutate<R: Rng>(&mut self, rate: f32, strength: f32, rng: &mut R) {
        for w in self.weights_mut() {
            if rng.random::<f32>() < rate {
                *w += rng.random_range(-strength..=strength);
            }
        }
    }

    /// Uniform crossover: every weight comes from one parent or the other.
    /// Both parents must have the same hidden width.
    pub fn crossover<R: Rng>(a: &Network, b: &Network, rng: &mut R) -> Network {
        let mut child = a.clone();
        for (w, other) in child.weights_mut().zip(b.weights()) {
            if rng.random_bool(0.5) {
                *w = other;
            }
        }
        child
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        log::info!("saved network to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let network: Network = serde_json::from_str(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if network.hidden_weights.len() != network.hidden()
            || network.output_weights.iter().any(|row| row.len() != network.hidden())
        {
            return Err(Error::InvalidConfig(format!(
                "{}: layer sizes do not match",
                path.display()
            )));
        }
        Ok(network)
    }
}

impl Activate for Network {
    fn activate(&self, inputs: [f32; INPUTS]) -> Vec<f32> {
        let scaled: [f32; INPUTS] = std::array::from_fn(|i| inputs[i] * self.input_scale[i]);
        let hidden: Vec<f32> = self
            .hidden_weights
            .iter()
            .zip(&self.hidden_biases)
            .map(|(row, bias)| {
                let sum: f32 = row.iter().zip(&scaled).map(|(w, x)| w * x).sum();
                (sum + bias).tanh()
            })
            .collect();
        self.output_weights
            .iter()
            .zip(&self.output_biases)
            .map(|(row, bias)| {
                let sum: f32 = row.iter().zip(&hidden).map(|(w, h)| w * h).sum();
                sigmoid(sum + bias)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn activation_gives_three_probabilities() {
        let mut rng = Pcg32::seed_from_u64(7);
        let net = Network::random(6, &mut rng);
        let out = net.activate([200.0, 250.0, 365.0]);
        assert_eq!(out.len(), OUTPUTS);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn weight_count_matches_topology() {
        let mut rng = Pcg32::seed_from_u64(7);
        let net = Network::random(4, &mut rng);
        assert_eq!(net.weights().count(), 4 * 3 + 4 + 3 * 4 + 3);
    }

    #[test]
    fn mutation_rate_zero_changes_nothing() {
        let mut rng = Pcg32::seed_from_u64(7);
        let net = Network::random(5, &mut rng);
        let mut copy = net.clone();
        copy.mutate(0.0, 1.0, &mut rng);
        assert_eq!(net, copy);
        copy.mutate(1.0, 1.0, &mut rng);
        assert_ne!(net, copy);
    }

    #[test]
    fn crossover_takes_each_weight_from_a_parent() {
        let mut rng = Pcg32::seed_from_u64(11);
        let a = Network::random(3, &mut rng);
        let b = Network::random(3, &mut rng);
        let child = Network::crossover(&a, &b, &mut rng);
        for ((c, x), y) in child.weights().zip(a.weights()).zip(b.weights()) {
            assert!(c == x || c == y);
        }
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winner.json");
        let mut rng = Pcg32::seed_from_u64(1);
        let net = Network::random(6, &mut rng);
        net.save(&path).unwrap();
        assert_eq!(Network::load(&path).unwrap(), net);
    }

    #[test]
    fn load_rejects_mismatched_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut rng = Pcg32::seed_from_u64(1);
        let mut net = Network::random(6, &mut rng);
        net.output_weights[1].pop();
        net.save(&path).unwrap();
        assert!(matches!(Network::load(&path), Err(Error::InvalidConfig(_))));
    }
}
