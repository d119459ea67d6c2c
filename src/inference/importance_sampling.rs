//! Defines an importance-sampling `ConditionalInferenceEngine` for approximate inference using
//! particle-based approximations.
//!
//! Implementation of Importance Sampling via Normalized Likelihood Weighting, described in Koller &
//! Friedman 12.2.3.3

use super::options::InferenceOptions;
use super::ConditionalInferenceEngine;
use crate::evidence::EvidenceCase;
use crate::network::ProbNet;
use crate::potential::{ops, PotentialRole, Table, TablePotential};
use crate::samplers::{LikelihoodWeightedSampler, WeightedSample, WeightedSampler};
use crate::util::{ProbNetError, Result};
use crate::variable::Variable;

use ndarray::IxDyn;
use tracing::debug;


/// A `ConditionalInferenceEngine` for Bayesian networks using Importance Sampling
pub struct ImportanceSamplingEngine {

    /// The variables of the network the engine was built for
    variables: Vec<Variable>,

    /// The Likelihood-Weighted sampler for the network and evidence
    sampler: LikelihoodWeightedSampler,

    options: InferenceOptions,
}


impl ImportanceSamplingEngine {

    /// Create an engine drawing `options.sample_size` particles per query
    ///
    /// # Errors
    /// * `ProbNetError::NotEvaluableNetwork` if `net` is not an evaluable Bayesian network
    pub fn new(net: &ProbNet, evidence: &EvidenceCase, options: InferenceOptions) -> Result<Self> {
        Ok(ImportanceSamplingEngine {
            variables: net.variables(),
            sampler: LikelihoodWeightedSampler::new(net, evidence)?,
            options,
        })
    }

}

impl ConditionalInferenceEngine for ImportanceSamplingEngine {

    fn infer(&mut self, variables: &[Variable]) -> Result<TablePotential> {
        // check input arguments
        if let Some(v) = variables.iter().find(|v| !self.variables.contains(v)) {
            return Err(ProbNetError::NodeNotFound(v.to_string()));
        }

        let shape: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();
        let mut table = Table::zeros(IxDyn(&shape));

        // sample away...
        for _ in 0..self.options.sample_size {
            if self.options.is_cancelled() {
                return Err(ProbNetError::Cancelled);
            }

            let WeightedSample(a, w) = self.sampler.weighted_sample()?;
            let idx = a.indices(variables)?;
            table[IxDyn(&idx)] += w;
        }

        let total: f64 = table.sum();
        debug!(samples = self.options.sample_size, total_weight = total, "particles drawn");

        let estimate = TablePotential::new(variables.to_vec(), table, PotentialRole::JointProbability)?;
        ops::normalize(&estimate).map_err(|e| match e {
            ProbNetError::NormalizeZeroVector => {
                ProbNetError::IncompatibleEvidence(String::from("every particle has weight 0"))
            }
            other => other,
        })
    }

}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::network::ProbNetBuilder;
    use crate::variable::Assignment;

    #[test]
    fn marginal_without_evidence() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let net = ProbNetBuilder::new()
            .with_chance(&a, &[], Initialization::Binomial(0.7))
            .with_chance(&b, &[a.clone()], Initialization::Values(&[0.9, 0.2, 0.1, 0.8]))
            .build()
            .unwrap();

        let options = InferenceOptions::new().with_sample_size(20000);
        let mut engine = ImportanceSamplingEngine::new(&net, &EvidenceCase::new(), options).unwrap();
        let pb = engine.infer(&[b.clone()]).unwrap();

        let mut assn = Assignment::new();
        assn.set(&b, 0);
        assert!((pb.value(&assn).unwrap() - 0.41).abs() < 0.02);
    }

    #[test]
    fn impossible_evidence() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let net = ProbNetBuilder::new()
            .with_chance(&a, &[], Initialization::Binomial(0.7))
            .with_chance(&b, &[a.clone()], Initialization::Values(&[1.0, 1.0, 0.0, 0.0]))
            .build()
            .unwrap();

        let evidence = EvidenceCase::from_states(&[(b.clone(), 1)]).unwrap();
        let mut engine = ImportanceSamplingEngine::new(&net, &evidence, InferenceOptions::new().with_sample_size(100)).unwrap();
        assert!(matches!(engine.infer(&[a.clone()]), Err(ProbNetError::IncompatibleEvidence(_))));
        assert!(matches!(engine.infer(&[Variable::binary("C")]), Err(ProbNetError::NodeNotFound(_))));
    }
}
