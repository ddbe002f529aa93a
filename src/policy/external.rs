use super::{Decision, Policy, View};

/// Anything that turns the three observation inputs into one score per decision.
pub trait Activate {
    fn activate(&self, inputs: [f32; 3]) -> Vec<f32>;
}

impl<A: Activate + ?Sized> Activate for &A {
    fn activate(&self, inputs: [f32; 3]) -> Vec<f32> {
        (**self).activate(inputs)
    }
}

/// Drives a paddle from a learned model. Only the observation is exposed to
/// the model, and malformed outputs become [`Decision::Hold`].
#[derive(Debug, Clone)]
pub struct NetworkPolicy<N> {
    network: N,
}

impl<N: Activate> NetworkPolicy<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &N {
        &self.network
    }
}

impl<N: Activate> Policy for NetworkPolicy<N> {
    fn decide(&mut self, view: &View<'_>) -> Decision {
        let outputs = self.network.activate(view.observation().as_array());
        if outputs.len() != 3 {
            log::trace!("policy returned {} outputs, holding", outputs.len());
            return Decision::Hold;
        }
        Decision::from_outputs(&outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::{Match, Side};

    struct Fixed(Vec<f32>);

    impl Activate for Fixed {
        fn activate(&self, _inputs: [f32; 3]) -> Vec<f32> {
            self.0.clone()
        }
    }

    struct Echo;

    impl Activate for Echo {
        fn activate(&self, inputs: [f32; 3]) -> Vec<f32> {
            inputs.to_vec()
        }
    }

    #[test]
    fn picks_the_strongest_output() {
        let game = Match::new(&Config::training(), 0);
        let view = View::of(&game, Side::Left);
        let mut policy = NetworkPolicy::new(Fixed(vec![0.1, 0.7, 0.2]));
        assert_eq!(policy.decide(&view), Decision::Down);
    }

    #[test]
    fn untrusted_outputs_hold() {
        let game = Match::new(&Config::training(), 0);
        let view = View::of(&game, Side::Left);
        for outputs in [
            vec![],
            vec![f32::INFINITY, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.9, 0.1, 0.0, 0.0],
        ] {
            let mut policy = NetworkPolicy::new(Fixed(outputs));
            assert_eq!(policy.decide(&view), Decision::Hold);
        }
    }

    #[test]
    fn sees_only_the_observation() {
        let game = Match::new(&Config::training(), 0);
        let view = View::of(&game, Side::Right);
        // paddle top 200, ball y 250, distance 365: the largest input wins
        let mut policy = NetworkPolicy::new(Echo);
        assert_eq!(policy.decide(&view), Decision::Hold);
    }
}
