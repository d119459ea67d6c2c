//! Provides an example of how to use probnet to evaluate a Bayesian network and an influence
//! diagram.

use probnet as p;
use p::evidence::EvidenceCase;
use p::inference::{ConditionalInferenceEngine, ImportanceSamplingEngine, InferenceOptions, VariableElimination};
use p::init::Initialization;
use p::network::{ProbNet, ProbNetBuilder};
use p::variable::{all_assignments, Variable};

fn main() -> p::Result<()> {
    bayesian_network()?;
    influence_diagram()?;
    Ok(())
}

fn bayesian_network() -> p::Result<()> {
    let a = Variable::binary("A");
    let b = Variable::binary("B");

    /////////////////////////////////////////////////////
    // Step 1: Build the network A -> B
    let net = ProbNetBuilder::new()
        .with_chance(&a, &[], Initialization::Binomial(0.7))
        .with_chance(&b, &[a.clone()], Initialization::Values(&[0.9, 0.2, 0.1, 0.8]))
        .build()?;

    /////////////////////////////////////////////////////
    // Step 2: Query without evidence
    let mut engine = VariableElimination::new(&net, InferenceOptions::new())?;
    let marginals = engine.probs_and_utilities(&[b.clone()])?;
    for (i, assignment) in all_assignments(&[b.clone()]).enumerate() {
        println!("P(B = {}) = {:.4}", i, marginals[&b].value(&assignment)?);
    }

    /////////////////////////////////////////////////////
    // Step 3: Compile some evidence and query again
    let evidence = EvidenceCase::from_states(&[(b.clone(), 1)])?;
    engine.set_post_resolution_evidence(evidence.clone())?;
    let posterior = engine.infer(&[a.clone()])?;
    for (i, assignment) in all_assignments(&[a.clone()]).enumerate() {
        println!("P(A = {} | B = 1) = {:.4}", i, posterior.value(&assignment)?);
    }

    // the same query, approximated by likelihood weighting
    let mut sampling = ImportanceSamplingEngine::new(&net, &evidence, InferenceOptions::new().with_sample_size(5000))?;
    let estimate = sampling.infer(&[a.clone()])?;
    for (i, assignment) in all_assignments(&[a.clone()]).enumerate() {
        println!("P(A = {} | B = 1) ~ {:.4}", i, estimate.value(&assignment)?);
    }

    /////////////////////////////////////////////////////
    // Step 4: Evidence with probability 0
    let certain = ProbNetBuilder::new()
        .with_chance(&a, &[], Initialization::Binomial(0.7))
        .with_chance(&b, &[a.clone()], Initialization::Values(&[1.0, 0.2, 0.0, 0.8]))
        .build()?;
    let mut engine = VariableElimination::new(&certain, InferenceOptions::new())?;
    engine.set_post_resolution_evidence(EvidenceCase::from_states(&[(a.clone(), 0), (b.clone(), 1)])?)?;
    match engine.joint_probability(&[a, b]) {
        Err(e) => println!("A = 0, B = 1: {}", e),
        Ok(p) => println!("unexpected joint {}", p),
    }

    Ok(())
}

fn influence_diagram() -> p::Result<()> {
    let d = Variable::binary("D");
    let u = Variable::numeric("U");

    let net: ProbNet = ProbNetBuilder::new()
        .with_decision(&d, &[])
        .with_utility(&u, &[d.clone()], Initialization::Values(&[10.0, 20.0]))
        .build()?;

    let mut engine = VariableElimination::new(&net, InferenceOptions::new())?;
    let policy = engine.optimized_policy(&d)?;
    for (i, assignment) in all_assignments(&[d.clone()]).enumerate() {
        println!("policy(D = {}) = {}", i, policy.value(&assignment)?);
    }
    println!("expected utilities: {}", engine.expected_utilities(&d)?);
    println!("maximum expected utility: {}", engine.global_utility()?);

    Ok(())
}
