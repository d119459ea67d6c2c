//! Defines the interface to inference engines

use crate::potential::TablePotential;
use crate::util::Result;
use crate::variable::Variable;

pub mod elimination;
pub mod heuristic;
mod importance_sampling;
pub mod options;
pub mod partial_order;
mod variable_elimination;

pub use self::importance_sampling::ImportanceSamplingEngine;
pub use self::options::{CancellationToken, EvidenceCheck, HeuristicKind, InferenceOptions, TieBreak};
pub use self::variable_elimination::VariableElimination;


/// What an inference pass computes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InferencePurpose {
    /// The optimal strategy and the maximum expected utility
    StrategyAndMeu,

    /// A posterior probability
    PosteriorProb,

    /// The expected value of a utility node
    PosteriorUtil,

    /// The expected utility of a decision as a function of its informational predecessors
    ExpectedUtil,
}


/// The lifecycle of a `VariableElimination` engine. The only transition is
/// ```PreResolution -> PostResolution```, when the strategy is first computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InferenceState {
    PreResolution,
    PostResolution,
}


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
///
/// `ConditionalInferenceEngine`s are stateful and hold the evidence `e` themselves.
pub trait ConditionalInferenceEngine {

    /// Infer the joint distribution ```P(variables | evidence)```, with its variables in the
    /// requested order
    fn infer(&mut self, variables: &[Variable]) -> Result<TablePotential>;

}


#[cfg(test)]
/// Tests shared by the inference engines. Any tests specific to an engine are held within that
/// submodule's tests module.
///
/// Example derived from Koller & Friedman's student example. Koller & Friedman do not offer an
/// example of the results of the exact inference on the student (or extended-student) example.
///
/// However, example 6d of [1] provides the results of exact (via variable elimination) and
/// approximate (via particle methods) inference of P(I | D=0, L=1, S=0) on a modified version
/// of the K&F Student example. We use that result here to test our implementation.
///
/// [1] https://www.uni-oldenburg.de/en/lcs/probabilistic-programming/webchurch-and-openbugs/
mod tests {
    use super::*;
    use crate::evidence::EvidenceCase;
    use crate::init::Initialization;
    use crate::network::{ProbNet, ProbNetBuilder};
    use crate::variable::Assignment;

    /// Utility function to build the student inference example
    fn build_student_example() -> (Variable, ProbNet, EvidenceCase) {
        let d = Variable::binary("Difficulty");
        let i = Variable::binary("Intelligence");
        let g = Variable::binary("Grade");
        let s = Variable::binary("SAT");
        let l = Variable::binary("Letter");

        let net = ProbNetBuilder::new()
            .with_chance(&d, &[], Initialization::Binomial(0.4))
            .with_chance(&i, &[], Initialization::Binomial(0.3))
            .with_chance(&g, &[i.clone(), d.clone()], Initialization::Values(&[
                0.3, 0.05, 0.9, 0.5,
                0.7, 0.95, 0.1, 0.5,
            ]))
            .with_chance(&s, &[i.clone()], Initialization::Values(&[0.95, 0.2, 0.05, 0.8]))
            .with_chance(&l, &[g.clone()], Initialization::Values(&[0.9, 0.4, 0.1, 0.6]))
            .build()
            .unwrap();

        let evidence = EvidenceCase::from_states(&[(d, 0), (l, 1), (s, 0)]).unwrap();

        (i, net, evidence)
    }

    /// Utility method to test the actual inference task
    fn test_inference(i: &Variable, engine: &mut dyn ConditionalInferenceEngine, precision: f64) {
        let f = engine.infer(&[i.clone()]);

        assert!(!f.is_err());

        let f = f.unwrap();
        assert_eq!(f.variables(), &[i.clone()]);
        let mut assn = Assignment::new();
        assn.set(i, 1);

        let expected = 0.02919708;
        assert!((f.value(&assn).unwrap() - expected).abs() < precision);
    }

    #[test]
    /// Test variable elimination
    fn variable_elimination() {
        let (i, net, evidence) = build_student_example();

        let mut engine = VariableElimination::new(&net, InferenceOptions::new()).unwrap();
        engine.set_post_resolution_evidence(evidence).unwrap();

        // the result should be the same on subsequent iterations
        for _ in 0..10 {
            test_inference(&i, &mut engine, 0.00000001);
        }
    }

    #[test]
    /// Test variable elimination with the fill-in heuristic
    fn variable_elimination_minimal_fill_in() {
        let (i, net, evidence) = build_student_example();

        let options = InferenceOptions::new().with_heuristic(HeuristicKind::MinimalFillIn);
        let mut engine = VariableElimination::new(&net, options).unwrap();
        engine.set_post_resolution_evidence(evidence).unwrap();
        test_inference(&i, &mut engine, 0.00000001);
    }

    #[test]
    /// Test importance sampling
    fn importance_sampling() {
        let (i, net, evidence) = build_student_example();

        let options = InferenceOptions::new().with_sample_size(20000);
        let mut engine = ImportanceSamplingEngine::new(&net, &evidence, options).unwrap();

        for _ in 0..3 {
            test_inference(&i, &mut engine, 0.01);
        }
    }
}
