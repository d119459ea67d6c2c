//! Defines a `ConditionalInferenceEngine` that uses exact inference by variable elimination to
//! evaluate Bayesian networks and influence diagrams.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE, extended with the
//! maximization of decisions and the expectation of utilities of Koller & Friedman 23.3.
//!
//! An engine starts in `InferenceState::PreResolution`. The first query that needs the strategy
//! of the influence diagram resolves it: the optimal policy of every decision and the maximum
//! expected utility are computed once, under the pre-resolution evidence, and the engine moves to
//! `InferenceState::PostResolution` for good. Every later query treats the decisions as chance
//! nodes distributed according to their policy, under both evidence cases.

use super::elimination::{self, EliminationStep};
use super::heuristic;
use super::options::{EvidenceCheck, InferenceOptions};
use super::partial_order::PartialOrder;
use super::{ConditionalInferenceEngine, InferencePurpose, InferenceState};
use crate::evidence::EvidenceCase;
use crate::network::{pruning, NetworkType, NodeType, ProbNet};
use crate::potential::{ops, Potential, PotentialRole, Table, TablePotential};
use crate::super_value;
use crate::util::{ProbNetError, Result};
use crate::variable::Variable;

use indexmap::IndexMap;
use ndarray::{Axis, IxDyn};
use tracing::{debug, info};


pub struct VariableElimination {

    /// A private copy of the network. Every inference pass works on a copy of this copy.
    net: ProbNet,

    options: InferenceOptions,

    state: InferenceState,

    /// Evidence known before the decisions are taken; the strategy depends on it
    pre_resolution_evidence: EvidenceCase,

    /// Evidence used by the queries answered after resolution
    post_resolution_evidence: EvidenceCase,

    /// Variables that are never eliminated and stay in the results
    conditioning_variables: Vec<Variable>,

    /// The optimal policy of every decision without an imposed policy
    strategy: IndexMap<Variable, TablePotential>,

    /// The maximum expected utility, set on resolution
    global_utility: Option<TablePotential>,

    /// The steps of the last elimination pass
    last_trace: Vec<EliminationStep>,
}


impl VariableElimination {

    /// Create an engine for `net`. The network is copied; later changes to `net` are not seen by
    /// the engine.
    ///
    /// # Errors
    /// * `ProbNetError::NotEvaluableNetwork` if `net` fails its structural checks
    pub fn new(net: &ProbNet, options: InferenceOptions) -> Result<Self> {
        net.check_evaluable()?;
        debug!(nodes = net.num_nodes(), network_type = ?net.network_type(), "variable elimination engine created");

        Ok(VariableElimination {
            net: net.clone(),
            options,
            state: InferenceState::PreResolution,
            pre_resolution_evidence: EvidenceCase::new(),
            post_resolution_evidence: EvidenceCase::new(),
            conditioning_variables: Vec::new(),
            strategy: IndexMap::new(),
            global_utility: None,
            last_trace: Vec::new(),
        })
    }

    pub fn state(&self) -> InferenceState {
        self.state
    }

    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    /// The policies computed so far, keyed by decision
    pub fn strategy(&self) -> &IndexMap<Variable, TablePotential> {
        &self.strategy
    }

    /// The eliminations performed by the last inference pass, in order
    pub fn last_trace(&self) -> &[EliminationStep] {
        &self.last_trace
    }

    /// Set the evidence the strategy is optimized for.
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` once the engine is resolved, or if a finding is about a
    ///   utility node
    /// * `ProbNetError::NodeNotFound` if a finding is about a variable outside the network
    pub fn set_pre_resolution_evidence(&mut self, evidence: EvidenceCase) -> Result<()> {
        if self.state == InferenceState::PostResolution {
            return Err(ProbNetError::InvalidArgument(
                String::from("the pre-resolution evidence cannot change after resolution")
            ));
        }
        self.check_findings(&evidence)?;
        self.pre_resolution_evidence = evidence;
        Ok(())
    }

    /// Set the evidence of the queries answered after resolution
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if a finding is about a utility node
    /// * `ProbNetError::NodeNotFound` if a finding is about a variable outside the network
    pub fn set_post_resolution_evidence(&mut self, evidence: EvidenceCase) -> Result<()> {
        self.check_findings(&evidence)?;
        self.post_resolution_evidence = evidence;
        Ok(())
    }

    /// Set the variables that are kept in every result instead of being eliminated
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` once the engine is resolved, or for a utility variable
    /// * `ProbNetError::NodeNotFound` for a variable outside the network
    pub fn set_conditioning_variables(&mut self, variables: &[Variable]) -> Result<()> {
        if self.state == InferenceState::PostResolution {
            return Err(ProbNetError::InvalidArgument(
                String::from("the conditioning variables cannot change after resolution")
            ));
        }
        for v in variables {
            self.check_chance_or_decision(v)?;
        }
        self.conditioning_variables = variables.to_vec();
        Ok(())
    }

    /// The decisions with a path to `decision` and the chance parents of `decision` or of those
    /// decisions, in network order
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if `decision` is not a decision node
    pub fn informational_predecessors(&self, decision: &Variable) -> Result<Vec<Variable>> {
        self.check_decision(decision)?;

        let decisions: Vec<Variable> = self.net
                                           .variables_of_type(NodeType::Decision)
                                           .into_iter()
                                           .filter(|d| d != decision && self.net.exists_path(d, decision))
                                           .collect();

        let observed_before = |v: &Variable| {
            self.net.has_link(v, decision) || decisions.iter().any(|d| self.net.has_link(v, d))
        };

        Ok(self.net
               .variables()
               .into_iter()
               .filter(|v| match self.net.node_type(v) {
                   Some(NodeType::Decision) => decisions.contains(v),
                   Some(NodeType::Chance) => observed_before(v),
                   _ => false,
               })
               .collect())
    }

    /// Compute the optimal strategy and the maximum expected utility, if not done yet.
    ///
    /// Decisions whose policy could not be optimized, because no utility depends on them, get a
    /// uniform policy over their parents. A decision observed in the pre-resolution evidence
    /// gets a policy that always picks the observed state. Conditioning decisions get no policy.
    pub fn resolve(&mut self) -> Result<()> {
        if self.state == InferenceState::PostResolution {
            return Ok(());
        }

        if self.net.network_type() == NetworkType::BayesianNetwork {
            self.global_utility = Some(TablePotential::constant(0.0, PotentialRole::Utility));
            self.state = InferenceState::PostResolution;
            return Ok(());
        }

        let aux = self.auxiliary_network(InferencePurpose::StrategyAndMeu, &[], &[])?;
        let evidence = self.pre_resolution_evidence.clone();
        let meu = self.perform_inference(aux, InferencePurpose::StrategyAndMeu, &[], &evidence)?;

        for d in self.net.variables_of_type(NodeType::Decision) {
            if self.conditioning_variables.contains(&d)
                || self.net.imposed_policy(&d).is_some()
                || self.strategy.contains_key(&d)
            {
                continue;
            }
            let policy = self.completion_policy(&d)?;
            self.strategy.insert(d, policy);
        }

        info!(decisions = self.strategy.len(), global_utility = ?meu.constant_value(), "influence diagram resolved");
        self.global_utility = Some(meu);
        self.state = InferenceState::PostResolution;
        Ok(())
    }

    /// The optimal policy of `decision`, as a `Policy` potential over the decision and the
    /// variables it depends on. An imposed policy is returned as it is.
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if `decision` is not a decision node, or is a
    ///   conditioning variable without a policy
    pub fn optimized_policy(&mut self, decision: &Variable) -> Result<TablePotential> {
        self.check_decision(decision)?;

        if let Some(imposed) = self.net.imposed_policy(decision) {
            return Ok(imposed.to_table()?.with_role(PotentialRole::Policy));
        }

        self.resolve()?;
        self.strategy
            .get(decision)
            .cloned()
            .ok_or_else(|| ProbNetError::InvalidArgument(format!("{} has no policy", decision)))
    }

    /// The expected utility of each option of `decision` for each configuration of its
    /// informational predecessors, under the evidence. The decision is the first variable of the
    /// result; observed predecessors are not in it.
    pub fn expected_utilities(&mut self, decision: &Variable) -> Result<TablePotential> {
        let mut queries = vec![decision.clone()];
        queries.extend(self.informational_predecessors(decision)?);

        self.resolve()?;
        let evidence = self.evidence()?;
        self.check_evidence(&evidence)?;

        let aux = self.auxiliary_network(InferencePurpose::ExpectedUtil, &queries, &queries)?;
        self.perform_inference(aux, InferencePurpose::ExpectedUtil, &queries, &evidence)
    }

    /// The maximum expected utility under the pre-resolution evidence, a zero-variable
    /// potential unless there are conditioning variables. It is 0 for a Bayesian network.
    pub fn global_utility(&mut self) -> Result<TablePotential> {
        self.resolve()?;
        self.global_utility
            .clone()
            .ok_or_else(|| ProbNetError::UnexpectedInference(String::from("resolved without a global utility")))
    }

    /// The posterior distribution of each chance or decision variable in `variables` and the
    /// expected value of each utility variable, under the evidence. Observed variables get a
    /// one-hot distribution.
    ///
    /// # Errors
    /// * `ProbNetError::NodeNotFound` for a variable outside the network
    /// * `ProbNetError::IncompatibleEvidence` if the evidence has probability 0
    pub fn probs_and_utilities(&mut self, variables: &[Variable]) -> Result<IndexMap<Variable, TablePotential>> {
        for v in variables {
            self.check_exists(v)?;
        }

        self.resolve()?;
        let evidence = self.evidence()?;
        self.check_evidence(&evidence)?;

        let probability_queries: Vec<Variable> = variables.iter()
                                                          .filter(|v| !self.is_utility(v) && !evidence.contains(v))
                                                          .cloned()
                                                          .collect();
        // one auxiliary network for every probability query
        let probability_net = if probability_queries.is_empty() {
            if !evidence.is_empty() {
                // a pass without queries still detects incompatible evidence
                let aux = self.auxiliary_network(InferencePurpose::PosteriorProb, &[], &[])?;
                self.perform_inference(aux, InferencePurpose::PosteriorProb, &[], &evidence)?;
            }
            None
        } else {
            Some(self.auxiliary_network(InferencePurpose::PosteriorProb, &probability_queries, &[])?)
        };

        let mut results = IndexMap::new();
        for v in variables {
            let query = vec![v.clone()];
            let result = if self.is_utility(v) {
                let aux = self.auxiliary_network(InferencePurpose::PosteriorUtil, &query, &[])?;
                self.perform_inference(aux, InferencePurpose::PosteriorUtil, &query, &evidence)?
                    .with_utility_variable(Some(v.clone()))
            } else if let Some(state) = evidence.state(v) {
                TablePotential::one_hot(v, state)?
            } else {
                let aux = probability_net.clone().ok_or_else(|| ProbNetError::UnexpectedInference(
                    format!("no auxiliary network for {}", v)
                ))?;
                self.perform_inference(aux, InferencePurpose::PosteriorProb, &query, &evidence)?
            };
            results.insert(v.clone(), result);
        }

        Ok(results)
    }

    /// The joint posterior distribution of `variables`, in that order. Observed variables are
    /// included as one-hot factors.
    ///
    /// # Errors
    /// * `ProbNetError::NodeNotFound` for a variable outside the network
    /// * `ProbNetError::InvalidArgument` for a utility variable
    /// * `ProbNetError::IncompatibleEvidence` if the evidence has probability 0
    pub fn joint_probability(&mut self, variables: &[Variable]) -> Result<TablePotential> {
        for v in variables {
            self.check_chance_or_decision(v)?;
        }

        self.resolve()?;
        let evidence = self.evidence()?;
        self.check_evidence(&evidence)?;

        let (observed, free): (Vec<Variable>, Vec<Variable>) = variables.iter()
                                                                       .cloned()
                                                                       .partition(|v| evidence.contains(v));

        // run even without free variables, the pass detects incompatible evidence
        let aux = self.auxiliary_network(InferencePurpose::PosteriorProb, &free, &[])?;
        let mut factors = vec![self.perform_inference(aux, InferencePurpose::PosteriorProb, &free, &evidence)?];
        for v in observed.iter() {
            if let Some(state) = evidence.state(v) {
                factors.push(TablePotential::one_hot(v, state)?);
            }
        }

        let joint = ops::multiply(&factors)?.with_role(PotentialRole::JointProbability);
        front(&joint, variables)
    }

    /// The union of both evidence cases
    fn evidence(&self) -> Result<EvidenceCase> {
        let mut evidence = self.pre_resolution_evidence.clone();
        evidence.fuse(&self.post_resolution_evidence, false)?;
        Ok(evidence)
    }

    /// Fail with `IncompatibleEvidence` if the evidence has probability 0, subject to
    /// `InferenceOptions::evidence_check`
    fn check_evidence(&mut self, evidence: &EvidenceCase) -> Result<()> {
        match self.options.evidence_check {
            EvidenceCheck::Disabled => return Ok(()),
            EvidenceCheck::Shortcut if evidence.len() >= self.net.chance_and_decision_variables().len() => return Ok(()),
            _ => (),
        }
        if evidence.is_empty() {
            return Ok(());
        }

        let observed = evidence.variables();
        let aux = self.auxiliary_network(InferencePurpose::PosteriorProb, &observed, &[])?;
        let joint = self.perform_inference(aux, InferencePurpose::PosteriorProb, &observed, &EvidenceCase::new())?;
        let joint = ops::marginalize(&joint, &self.conditioning_variables);

        if joint.value(&evidence.to_assignment())? <= 0.0 {
            return Err(ProbNetError::IncompatibleEvidence(format!("{:?} has probability 0", observed)));
        }
        Ok(())
    }

    /// The network a pass works on.
    ///
    /// Utility nodes are reduced when the pass needs them and stripped otherwise. Every decision
    /// that has a policy (imposed, or optimized once resolved) and is not in `kept_decisions`
    /// becomes a chance node distributed according to that policy.
    fn auxiliary_network(&self, purpose: InferencePurpose, queries: &[Variable], kept_decisions: &[Variable]) -> Result<ProbNet> {
        if self.net.network_type() == NetworkType::BayesianNetwork {
            return Ok(self.net.clone());
        }

        let utility_queries: Vec<&Variable> = queries.iter().filter(|q| self.is_utility(q)).collect();
        let with_utilities = self.state == InferenceState::PreResolution
            || purpose == InferencePurpose::ExpectedUtil
            || !utility_queries.is_empty();

        let mut aux = if with_utilities {
            let keep = if utility_queries.len() == 1 { Some(utility_queries[0]) } else { None };
            super_value::remove_super_value_nodes(&self.net, None, false, true, keep)?
        } else {
            super_value::remove_utility_nodes(&self.net)?
        };

        for d in self.net.variables_of_type(NodeType::Decision) {
            if kept_decisions.contains(&d) {
                continue;
            }

            let policy = match self.net.imposed_policy(&d) {
                Some(imposed) => Some(imposed.to_table()?),
                None if self.state == InferenceState::PostResolution => self.strategy.get(&d).cloned(),
                None => None,
            };

            if let Some(policy) = policy {
                aux.set_node_type(&d, NodeType::Chance)?;
                for v in policy.variables().iter().filter(|v| **v != d) {
                    aux.add_link(v, &d)?;
                }
                let cpt = policy.with_role(PotentialRole::ConditionalProbability);
                aux.set_potentials(&d, vec![Potential::Table(cpt)])?;
            }
        }

        Ok(aux)
    }

    /// One elimination pass over `work`.
    ///
    /// # Returns
    /// * for `PosteriorProb`, the normalized joint distribution of `queries`
    /// * for the other purposes, the sum of the remaining utilities; for `ExpectedUtil` it covers
    ///   every unobserved query, with the first query in front
    fn perform_inference(&mut self, mut work: ProbNet, purpose: InferencePurpose, queries: &[Variable], evidence: &EvidenceCase)
        -> Result<TablePotential>
    {
        let mut kept: Vec<Variable> = queries.to_vec();
        kept.extend(self.conditioning_variables.iter().cloned());

        ///////////////////////////////////////////////////////////////////////
        // 1) Prune what cannot influence a posterior probability
        if self.state == InferenceState::PostResolution && purpose == InferencePurpose::PosteriorProb {
            pruning::remove_barren_nodes(&mut work, &kept, evidence)?;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Project the potentials onto the evidence, setting constants apart
        let mut potentials = Vec::new();
        let mut constants = Vec::new();
        for var in work.variables() {
            let node_type = match work.node_type(&var) {
                Some(NodeType::Decision) | None => continue,
                Some(t) => t,
            };
            let potential = match work.resolve_potential(&var)? {
                Some(p) => p,
                None => continue,
            };
            if purpose == InferencePurpose::PosteriorProb && matches!(potential, Potential::Uniform { .. }) {
                continue;
            }
            if let Some(missing) = potential.variables().iter().find(|v| !work.contains(v)) {
                return Err(ProbNetError::UnexpectedInference(format!(
                    "the {} potential of {} refers to {}, which is not in the network",
                    potential.kind(), var, missing
                )));
            }

            let mut table = potential.table_project(evidence)?;
            if node_type == NodeType::Utility {
                table = table.with_role(PotentialRole::Utility).with_utility_variable(Some(var.clone()));
            }

            match table.constant_value() {
                Some(v) if !table.role().is_utility() => {
                    if v == 0.0 {
                        return Err(ProbNetError::IncompatibleEvidence(
                            format!("the evidence has probability 0 given the potential of {}", var)
                        ));
                    }
                }
                Some(_) => constants.push(table),
                None => potentials.push(table),
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Eliminate every variable that is not kept or observed
        let mut keep_order = kept.clone();
        keep_order.extend(evidence.variables());
        let order = PartialOrder::new(&work).project(&keep_order);
        debug!(?purpose, order = %order, potentials = potentials.len(), "elimination order computed");

        let mut h = heuristic::create(self.options.heuristic, &potentials, order);
        let outcome = elimination::eliminate(&work, potentials, h.as_mut(), purpose, &self.options)?;
        self.last_trace = outcome.trace;
        if purpose == InferencePurpose::StrategyAndMeu {
            self.strategy.extend(outcome.policies);
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Combine what is left
        let (utilities, probabilities): (Vec<TablePotential>, Vec<TablePotential>) = outcome.potentials
                                                                                           .into_iter()
                                                                                           .partition(|p| p.role().is_utility());

        if purpose == InferencePurpose::PosteriorProb {
            let mut joint = ops::multiply(&probabilities)?;
            let missing: Vec<Variable> = queries.iter()
                                                .filter(|q| !joint.contains(q) && !evidence.contains(q))
                                                .cloned()
                                                .collect();
            if !missing.is_empty() {
                let flat = TablePotential::uniform(missing, PotentialRole::JointProbability);
                joint = ops::multiply(vec![&joint, &flat])?;
            }

            let joint = ops::normalize(&joint.with_role(PotentialRole::JointProbability)).map_err(|e| match e {
                ProbNetError::NormalizeZeroVector => {
                    ProbNetError::IncompatibleEvidence(String::from("the evidence has probability 0"))
                }
                other => other,
            })?;
            return front(&joint, queries);
        }

        let mut terms = utilities;
        terms.extend(outcome.constant_utilities);
        terms.extend(constants);
        let mut total = if terms.is_empty() {
            TablePotential::constant(0.0, PotentialRole::Utility)
        } else {
            ops::sum(&terms)?
        };

        if purpose == InferencePurpose::ExpectedUtil {
            let missing: Vec<Variable> = queries.iter()
                                                .filter(|q| !total.contains(q) && !evidence.contains(q))
                                                .cloned()
                                                .collect();
            if !missing.is_empty() {
                // a utility independent of some queries is constant along them
                let zero = TablePotential::uniform(missing, PotentialRole::Utility);
                total = ops::sum(vec![&total, &zero])?;
            }
            total = front(&total, queries)?;
        }

        Ok(total)
    }

    /// The policy of a decision the elimination left without one: the observed state when the
    /// decision is in the pre-resolution evidence, uniform otherwise
    fn completion_policy(&self, decision: &Variable) -> Result<TablePotential> {
        let mut scope = vec![decision.clone()];
        scope.extend(self.net.parents(decision));

        match self.pre_resolution_evidence.state(decision) {
            Some(state) => {
                decision.check_state(state)?;
                let shape: Vec<usize> = scope.iter().map(|v| v.num_states()).collect();
                let mut values = Table::zeros(IxDyn(&shape));
                values.index_axis_mut(Axis(0), state).fill(1.0);
                TablePotential::new(scope, values, PotentialRole::Policy)
            }
            None => Ok(TablePotential::uniform(scope, PotentialRole::Policy)),
        }
    }

    fn is_utility(&self, var: &Variable) -> bool {
        self.net.node_type(var) == Some(NodeType::Utility)
    }

    fn check_exists(&self, var: &Variable) -> Result<()> {
        if self.net.contains(var) {
            Ok(())
        } else {
            Err(ProbNetError::NodeNotFound(var.to_string()))
        }
    }

    fn check_chance_or_decision(&self, var: &Variable) -> Result<()> {
        self.check_exists(var)?;
        if self.is_utility(var) {
            return Err(ProbNetError::InvalidArgument(format!("{} is a utility variable", var)));
        }
        Ok(())
    }

    fn check_decision(&self, var: &Variable) -> Result<()> {
        match self.net.node_type(var) {
            Some(NodeType::Decision) => Ok(()),
            Some(_) => Err(ProbNetError::InvalidArgument(format!("{} is not a decision", var))),
            None => Err(ProbNetError::NodeNotFound(var.to_string())),
        }
    }

    fn check_findings(&self, evidence: &EvidenceCase) -> Result<()> {
        for v in evidence.variables() {
            self.check_chance_or_decision(&v)?;
        }
        Ok(())
    }
}


/// `potential` with the variables of `first` it contains moved to the front, in that order
fn front(potential: &TablePotential, first: &[Variable]) -> Result<TablePotential> {
    let mut order: Vec<Variable> = Vec::with_capacity(potential.variables().len());
    for v in first.iter().chain(potential.variables()) {
        if potential.contains(v) && !order.contains(v) {
            order.push(v.clone());
        }
    }
    potential.reorder(&order)
}


impl ConditionalInferenceEngine for VariableElimination {

    fn infer(&mut self, variables: &[Variable]) -> Result<TablePotential> {
        self.joint_probability(variables)
    }

}
