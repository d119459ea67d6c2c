//! Defines a `Sampler` for likelihood weighted particle generation over Bayesian networks.
//!
//! Koller & Friedman Algorithm 12.2 (pp 493)

use super::{WeightedSample, WeightedSampler};
use crate::evidence::EvidenceCase;
use crate::network::{NetworkType, ProbNet};
use crate::potential::{Potential, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::{Assignment, Variable};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


/// How a node takes part in a particle
enum Step {
    /// Drawn from its potential; ICI potentials are sampled channel by channel
    Sampled(Potential),

    /// Fixed by the evidence, contributing ```P(var = e | Pa(var))``` to the weight
    Observed(TablePotential, usize),
}


/// A simple `Sampler` for Bayesian networks that uses likelihood weighted sampling to draw full
/// assignments from the network given evidence.
pub struct LikelihoodWeightedSampler<R: Rng = StdRng> {

    /// The nodes in topological order
    steps: Vec<(Variable, Step)>,

    rng: R,
}


impl LikelihoodWeightedSampler<StdRng> {

    /// Build a sampler seeded from the operating system
    pub fn new(net: &ProbNet, evidence: &EvidenceCase) -> Result<Self> {
        LikelihoodWeightedSampler::with_rng(net, evidence, StdRng::from_entropy())
    }

    /// Build a reproducible sampler
    pub fn seeded(net: &ProbNet, evidence: &EvidenceCase, seed: u64) -> Result<Self> {
        LikelihoodWeightedSampler::with_rng(net, evidence, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LikelihoodWeightedSampler<R> {

    /// Build a sampler drawing from `rng`.
    ///
    /// # Errors
    /// * `ProbNetError::NotEvaluableNetwork` if `net` is not a Bayesian network or fails its
    ///   structural checks
    pub fn with_rng(net: &ProbNet, evidence: &EvidenceCase, rng: R) -> Result<Self> {
        if net.network_type() != NetworkType::BayesianNetwork {
            return Err(ProbNetError::NotEvaluableNetwork(
                String::from("likelihood weighting needs a Bayesian network")
            ));
        }
        net.check_evaluable()?;

        let mut steps = Vec::with_capacity(net.num_nodes());
        for var in net.topological_order() {
            let potential = net.resolve_potential(&var)?
                               .ok_or_else(|| ProbNetError::NotEvaluableNetwork(format!("{} has no potential", var)))?;

            let step = match evidence.state(&var) {
                Some(state) => Step::Observed(potential.to_table()?, state),
                None => match potential {
                    Potential::Table(_) | Potential::Ici(_) | Potential::Uniform { .. } => Step::Sampled(potential),
                    other => Step::Sampled(Potential::Table(other.to_table()?)),
                },
            };
            steps.push((var, step));
        }

        Ok(LikelihoodWeightedSampler { steps, rng })
    }

    fn get_sample(&mut self) -> Result<WeightedSample> {
        let mut a = Assignment::new();
        let mut w = 1.0;

        for (var, step) in self.steps.iter() {
            match step {
                Step::Observed(cpd, state) => {
                    a.set(var, *state);
                    // update the weight by P(var | Pa(var))
                    w *= cpd.value(&a)?;
                }
                Step::Sampled(cpd) => {
                    // every parent precedes var in topological order, so it is already assigned
                    let state = cpd.sample(&mut self.rng, &a)?;
                    a.set(var, state);
                }
            }
        }

        Ok(WeightedSample(a, w))
    }
}


impl<R: Rng> WeightedSampler for LikelihoodWeightedSampler<R> {

    fn weighted_sample(&mut self) -> Result<WeightedSample> {
        self.get_sample()
    }

}
