//! The elimination loop of variable elimination, as a pure function of a network, a set of
//! potentials and a heuristic.

use super::heuristic::EliminationHeuristic;
use super::options::InferenceOptions;
use super::InferencePurpose;
use crate::network::{NodeType, ProbNet};
use crate::potential::{ops, PotentialRole, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::Variable;

use indexmap::IndexMap;
use tracing::debug;


/// How a variable was removed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EliminationKind {
    /// Fused product and sum over a chance variable, no utility involved
    Marginalization,

    /// Sum over a chance variable, weighting the utilities by its conditional probability
    Expectation,

    /// Maximization over a decision, recording its policy
    Maximization,
}


/// One entry of the trace of an elimination pass
#[derive(Clone, Debug, PartialEq)]
pub struct EliminationStep {
    pub variable: Variable,
    pub kind: EliminationKind,

    /// Number of potentials that contained the variable
    pub potentials_in: usize,

    /// Total number of table entries of the potentials produced
    pub result_size: usize,
}


/// What is left after the elimination loop
#[derive(Clone, Debug, Default)]
pub struct EliminationOutcome {
    /// Potentials that still have variables
    pub potentials: Vec<TablePotential>,

    /// Utilities reduced to a constant
    pub constant_utilities: Vec<TablePotential>,

    /// The policy of every decision maximized out, in elimination order
    pub policies: IndexMap<Variable, TablePotential>,

    pub trace: Vec<EliminationStep>,
}


/// `None` for a missing or unit probability, which can be dropped
fn non_unity(p: Option<TablePotential>) -> Option<TablePotential> {
    p.filter(|p| p.constant_value() != Some(1.0))
}

/// Eliminate every variable the heuristic returns.
///
/// # Args
/// * `net`: the working network, only used to tell decisions from chance variables
/// * `potentials`: the potentials of the problem, already projected onto the evidence
/// * `heuristic`: source of the elimination order
/// * `purpose`: what the pass computes
/// * `options`: tie-breaking and cancellation
///
/// # Errors
/// * `ProbNetError::UnexpectedInference` if the heuristic returns a variable unknown to `net`
/// * `ProbNetError::IncompatibleEvidence` if a probability collapses to the constant 0
/// * `ProbNetError::Cancelled` if the cancellation token of `options` is set
pub fn eliminate(
    net: &ProbNet,
    potentials: Vec<TablePotential>,
    heuristic: &mut dyn EliminationHeuristic,
    purpose: InferencePurpose,
    options: &InferenceOptions,
) -> Result<EliminationOutcome> {
    let mut outcome = EliminationOutcome { potentials, ..EliminationOutcome::default() };

    while let Some(var) = heuristic.next_variable() {
        if options.is_cancelled() {
            return Err(ProbNetError::Cancelled);
        }

        let node_type = net.node_type(&var).ok_or_else(|| ProbNetError::UnexpectedInference(
            format!("the heuristic returned {}, which is not in the network", var)
        ))?;
        if node_type == NodeType::Utility {
            return Err(ProbNetError::UnexpectedInference(format!("utility variable {} cannot be eliminated", var)));
        }

        let (involved, rest): (Vec<TablePotential>, Vec<TablePotential>) = outcome.potentials
                                                                                  .drain(..)
                                                                                  .partition(|p| p.contains(&var));
        outcome.potentials = rest;
        let (utilities, probabilities): (Vec<TablePotential>, Vec<TablePotential>) = involved.iter()
                                                                                             .cloned()
                                                                                             .partition(|p| p.role().is_utility());

        let decision = node_type == NodeType::Decision && purpose != InferencePurpose::PosteriorProb;
        let (kind, probability, new_utilities) = if decision {
            let (probability, new_utilities, policy) = maximize(&var, &probabilities, &utilities, options)?;
            if let Some(policy) = policy {
                outcome.policies.insert(var.clone(), policy);
            }
            (EliminationKind::Maximization, probability, new_utilities)
        } else if utilities.is_empty() {
            let marginal = ops::multiply_and_eliminate(&probabilities, &var)?;
            (EliminationKind::Marginalization, non_unity(Some(marginal)), Vec::new())
        } else {
            let (probability, new_utilities) = expectation(&var, &probabilities, &utilities)?;
            (EliminationKind::Expectation, probability, new_utilities)
        };

        let mut result_size = 0;
        if let Some(p) = probability {
            result_size += p.table_size();
            match p.constant_value() {
                Some(v) if v == 0.0 => {
                    return Err(ProbNetError::IncompatibleEvidence(
                        format!("the probability of the evidence is 0 after eliminating {}", var)
                    ));
                }
                Some(_) => (),
                None => outcome.potentials.push(p),
            }
        }
        for u in new_utilities {
            result_size += u.table_size();
            if u.variables().is_empty() {
                outcome.constant_utilities.push(u);
            } else {
                outcome.potentials.push(u);
            }
        }

        debug!(variable = %var, ?kind, potentials = involved.len(), result_size, "variable eliminated");
        outcome.trace.push(EliminationStep { variable: var.clone(), kind, potentials_in: involved.len(), result_size });
        heuristic.variable_eliminated(&var);
    }

    Ok(outcome)
}

/// The joint probability of the potentials containing `var`, and its marginal once `var` is
/// removed by `reduce`
fn joint_and_marginal<F>(probabilities: &[TablePotential], reduce: F) -> Result<(Option<TablePotential>, Option<TablePotential>)>
    where F: Fn(&TablePotential) -> TablePotential
{
    if probabilities.is_empty() {
        return Ok((None, None));
    }
    let joint = ops::multiply(probabilities)?;
    let marginal = non_unity(Some(reduce(&joint)));
    Ok((Some(joint), marginal))
}

/// The conditional probability of `var` given the rest of the joint
fn conditional(joint: Option<TablePotential>, marginal: &Option<TablePotential>) -> Result<Option<TablePotential>> {
    match (joint, marginal) {
        (Some(j), Some(m)) => Ok(Some(ops::divide(&j, m)?)),
        (joint, _) => Ok(joint),
    }
}

/// Sum out a chance variable: the probabilities are marginalized and each utility is replaced by
/// its expectation over `var`
fn expectation(var: &Variable, probabilities: &[TablePotential], utilities: &[TablePotential])
    -> Result<(Option<TablePotential>, Vec<TablePotential>)>
{
    let (joint, marginal) = joint_and_marginal(probabilities, |j| ops::marginalize(j, &[var.clone()]))?;
    let weights = conditional(joint, &marginal)?;

    let new_utilities = utilities.iter()
                                 .map(|u| {
                                     let expected = match &weights {
                                         Some(w) => ops::multiply_and_eliminate(vec![w, u], var)?,
                                         None => ops::marginalize(u, &[var.clone()]),
                                     };
                                     Ok(expected.with_role(PotentialRole::Utility)
                                                .with_utility_variable(u.utility_variable().cloned()))
                                 })
                                 .collect::<Result<Vec<_>>>()?;

    Ok((marginal, new_utilities))
}

/// Maximize out a decision: the probabilities are maximized and the utilities are added up and
/// maximized, which yields the policy of the decision
fn maximize(var: &Variable, probabilities: &[TablePotential], utilities: &[TablePotential], options: &InferenceOptions)
    -> Result<(Option<TablePotential>, Vec<TablePotential>, Option<TablePotential>)>
{
    let (joint, marginal) = joint_and_marginal(probabilities, |j| ops::maximize(j, var))?;
    if utilities.is_empty() {
        return Ok((marginal, Vec::new(), None));
    }

    let weights = conditional(joint, &marginal)?;
    let total = ops::sum(utilities)?;
    let unit = TablePotential::from_vec(vec![var.clone()], vec![1.0; var.num_states()], PotentialRole::ConditionalProbability)?;

    let mut factors = vec![&unit, &total];
    if let Some(w) = &weights {
        factors.push(w);
    }
    let (max, policy) = ops::multiply_and_maximize(factors, var, options.tie_break)?;

    let utility_variable = if utilities.len() == 1 { utilities[0].utility_variable().cloned() } else { None };
    let max = max.with_role(PotentialRole::Utility).with_utility_variable(utility_variable);

    Ok((marginal, vec![max], Some(policy)))
}
