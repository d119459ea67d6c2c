//! Defines a `ProbNet`, the graph of chance, decision and utility nodes that the inference
//! engines evaluate, and the `ProbNetBuilder` used to assemble one.

pub mod pruning;

use crate::init::Initialization;
use crate::potential::{Potential, PotentialRole, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::{Assignment, Variable};

use bidir_map::BidirMap;
use indexmap::{IndexMap, IndexSet};

use std::collections::HashSet;
use std::fmt;


/// The role of a node in a network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Chance,
    Decision,
    Utility,
}


/// The kinds of network the engines know how to evaluate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkType {
    /// Only chance nodes
    BayesianNetwork,

    /// Chance, decision and utility nodes
    InfluenceDiagram,
}


/// A node of a `ProbNet`: a `Variable`, its role, its potentials and its links.
#[derive(Clone, Debug)]
pub struct ProbNode {
    variable: Variable,
    node_type: NodeType,
    potentials: Vec<Potential>,
    parents: IndexSet<Variable>,
    children: IndexSet<Variable>,
}

impl ProbNode {

    fn new(variable: &Variable, node_type: NodeType) -> Self {
        ProbNode {
            variable: variable.clone(),
            node_type,
            potentials: Vec::new(),
            parents: IndexSet::new(),
            children: IndexSet::new(),
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn potentials(&self) -> &[Potential] {
        &self.potentials
    }

    pub fn parents(&self) -> impl Iterator<Item = &Variable> {
        self.parents.iter()
    }

    pub fn children(&self) -> impl Iterator<Item = &Variable> {
        self.children.iter()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }
}


/// A probabilistic graphical network: a Bayesian network or an influence diagram.
///
/// # Representation
/// Nodes are held in an `IndexMap` keyed by their `Variable`, in insertion order, and each node
/// keeps both its parents and its children so that links can be walked in either direction.
/// `Clone` is a deep copy: the inference engines clone the network before any destructive pass.
#[derive(Clone)]
pub struct ProbNet {
    nodes: IndexMap<Variable, ProbNode>,

    /// ```(name -> Variable)``` lookup, names include the time slice
    names: BidirMap<String, Variable>,
}

impl ProbNet {

    pub fn new() -> Self {
        ProbNet { nodes: IndexMap::new(), names: BidirMap::new() }
    }

    /// Add a node without links or potentials
    ///
    /// # Errors
    /// * `ProbNetError::DuplicateVariable` if `var` is already in the network
    /// * `ProbNetError::InvalidArgument` if `var` has no states
    pub fn add_node(&mut self, var: &Variable, node_type: NodeType) -> Result<()> {
        if self.nodes.contains_key(var) {
            return Err(ProbNetError::DuplicateVariable(var.to_string()));
        }
        if var.num_states() == 0 {
            return Err(ProbNetError::InvalidArgument(format!("{} has no states", var)));
        }

        self.nodes.insert(var.clone(), ProbNode::new(var, node_type));
        self.names.insert(var.to_string(), var.clone());
        Ok(())
    }

    /// Remove a node and every link touching it
    pub fn remove_node(&mut self, var: &Variable) -> Result<ProbNode> {
        let node = self.nodes.shift_remove(var).ok_or_else(|| ProbNetError::NodeNotFound(var.to_string()))?;
        for p in node.parents.iter() {
            if let Some(parent) = self.nodes.get_mut(p) {
                parent.children.shift_remove(var);
            }
        }
        for c in node.children.iter() {
            if let Some(child) = self.nodes.get_mut(c) {
                child.parents.shift_remove(var);
            }
        }
        self.names.remove_by_first(&var.to_string());
        Ok(node)
    }

    /// Add the link ```from -> to```. Adding an existing link does nothing.
    ///
    /// # Errors
    /// * `ProbNetError::NodeNotFound` if either node is missing
    /// * `ProbNetError::CyclicNetwork` if the link would close a directed cycle
    pub fn add_link(&mut self, from: &Variable, to: &Variable) -> Result<()> {
        self.check_node(from)?;
        self.check_node(to)?;
        if self.has_link(from, to) {
            return Ok(());
        }
        if self.exists_path(to, from) {
            return Err(ProbNetError::CyclicNetwork(format!("{} -> {}", from, to)));
        }

        if let Some(node) = self.nodes.get_mut(from) {
            node.children.insert(to.clone());
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.parents.insert(from.clone());
        }
        Ok(())
    }

    /// Remove the link ```from -> to```, if there is one
    pub fn remove_link(&mut self, from: &Variable, to: &Variable) {
        if let Some(node) = self.nodes.get_mut(from) {
            node.children.shift_remove(to);
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.parents.shift_remove(from);
        }
    }

    pub fn has_link(&self, from: &Variable, to: &Variable) -> bool {
        self.nodes.get(from).map_or(false, |n| n.children.contains(to))
    }

    pub fn node(&self, var: &Variable) -> Option<&ProbNode> {
        self.nodes.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.nodes.contains_key(var)
    }

    /// Lookup a `Variable` in the network by its name (```"name"``` or ```"name [t]"```)
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.names.get_by_first(&String::from(name))
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// All the `Variable`s of the network, in insertion order
    pub fn variables(&self) -> Vec<Variable> {
        self.nodes.keys().cloned().collect()
    }

    pub fn variables_of_type(&self, node_type: NodeType) -> Vec<Variable> {
        self.nodes.values()
                  .filter(|n| n.node_type == node_type)
                  .map(|n| n.variable.clone())
                  .collect()
    }

    pub fn chance_and_decision_variables(&self) -> Vec<Variable> {
        self.nodes.values()
                  .filter(|n| n.node_type != NodeType::Utility)
                  .map(|n| n.variable.clone())
                  .collect()
    }

    /// The node type of `var`, if it is in the network
    pub fn node_type(&self, var: &Variable) -> Option<NodeType> {
        self.nodes.get(var).map(|n| n.node_type)
    }

    /// Change the type of a node, keeping its links. Its potentials are discarded.
    pub fn set_node_type(&mut self, var: &Variable, node_type: NodeType) -> Result<()> {
        let node = self.node_mut(var)?;
        node.node_type = node_type;
        node.potentials.clear();
        Ok(())
    }

    /// The parents of `var`; empty if `var` is not in the network
    pub fn parents(&self, var: &Variable) -> Vec<Variable> {
        self.nodes.get(var).map_or_else(Vec::new, |n| n.parents.iter().cloned().collect())
    }

    /// The children of `var`; empty if `var` is not in the network
    pub fn children(&self, var: &Variable) -> Vec<Variable> {
        self.nodes.get(var).map_or_else(Vec::new, |n| n.children.iter().cloned().collect())
    }

    /// Check if there is a directed path ```from -> ... -> to```. A node reaches itself.
    pub fn exists_path(&self, from: &Variable, to: &Variable) -> bool {
        let mut visited: HashSet<&Variable> = HashSet::new();
        let mut stack: Vec<&Variable> = vec![from];

        while let Some(v) = stack.pop() {
            if v == to {
                return true;
            }
            if !visited.insert(v) {
                continue;
            }
            if let Some(node) = self.nodes.get(v) {
                stack.extend(node.children.iter());
            }
        }

        false
    }

    /// Get a topological order of the network. Ties keep insertion order.
    pub fn topological_order(&self) -> Vec<Variable> {
        let mut in_degree: IndexMap<&Variable, usize> = self.nodes.iter()
                                                                 .map(|(v, n)| (v, n.parents.len()))
                                                                 .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(next) = in_degree.iter().find(|(_, d)| **d == 0).map(|(v, _)| *v) {
            in_degree.shift_remove(next);
            for c in self.nodes[next].children.iter() {
                if let Some(d) = in_degree.get_mut(c) {
                    *d -= 1;
                }
            }
            order.push(next.clone());
        }

        order
    }

    pub fn potentials(&self, var: &Variable) -> &[Potential] {
        self.nodes.get(var).map_or(&[][..], |n| n.potentials.as_slice())
    }

    /// Replace the potentials of a node
    pub fn set_potentials(&mut self, var: &Variable, potentials: Vec<Potential>) -> Result<()> {
        self.node_mut(var)?.potentials = potentials;
        Ok(())
    }

    /// The policy imposed by the user on a decision node, if any
    pub fn imposed_policy(&self, decision: &Variable) -> Option<&Potential> {
        self.nodes.get(decision)
                  .filter(|n| n.node_type == NodeType::Decision)
                  .and_then(|n| n.potentials.first())
    }

    /// A network is a Bayesian network when all its nodes are chance nodes
    pub fn network_type(&self) -> NetworkType {
        if self.nodes.values().all(|n| n.node_type == NodeType::Chance) {
            NetworkType::BayesianNetwork
        } else {
            NetworkType::InfluenceDiagram
        }
    }

    /// The first potential of `var` with every network-dependent form resolved: a
    /// `SameAsPrevious` potential becomes the potential of the node in the previous time slice,
    /// moved to the slice of `var`.
    ///
    /// # Returns
    /// `None` if the node has no potential
    pub fn resolve_potential(&self, var: &Variable) -> Result<Option<Potential>> {
        let node = self.nodes.get(var).ok_or_else(|| ProbNetError::NodeNotFound(var.to_string()))?;
        match node.potentials.first() {
            None => Ok(None),
            Some(Potential::SameAsPrevious { variables, role }) => {
                let previous = var.previous_slice()
                                  .ok_or_else(|| ProbNetError::NonProjectablePotential(
                                      format!("{} has no previous time slice", var)
                                  ))?;
                let source = self.resolve_potential(&previous)?
                                 .ok_or_else(|| ProbNetError::NonProjectablePotential(
                                     format!("{} has no potential to copy", previous)
                                 ))?
                                 .to_table()?;

                let shift = |v: &Variable| match v.time_slice() {
                    Some(t) => self.slice_variable(v, t + 1),
                    None => Ok(v.clone()),
                };
                let moved = source.variables().iter().map(shift).collect::<Result<Vec<_>>>()?;
                let table = TablePotential::new(moved, source.values().clone(), *role)?
                    .with_utility_variable(if role.is_utility() { Some(var.clone()) } else { None })
                    .reorder(variables)?;
                Ok(Some(Potential::Table(table)))
            }
            Some(p) => Ok(Some(p.clone())),
        }
    }

    /// Determine the probability of a full `Assignment` to the chance `Variable`s by the chain rule
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        self.nodes.values()
                  .filter(|n| n.node_type == NodeType::Chance)
                  .map(|n| match self.resolve_potential(&n.variable)? {
                      Some(p) => p.to_table()?.value(assignment),
                      None => Err(ProbNetError::NotEvaluableNetwork(format!("{} has no potential", n.variable))),
                  })
                  .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }

    /// Check the structural preconditions of the inference engines: every chance and utility
    /// node has one potential over exactly itself and its parents, decisions carry at most one
    /// imposed policy, and utility nodes only point to utility nodes.
    ///
    /// # Errors
    /// * `ProbNetError::NotEvaluableNetwork` describing the first violation found
    pub fn check_evaluable(&self) -> Result<()> {
        let fail = |msg: String| Err(ProbNetError::NotEvaluableNetwork(msg));

        for node in self.nodes.values() {
            let var = &node.variable;
            let mut expected: HashSet<&Variable> = node.parents.iter().collect();
            if node.node_type != NodeType::Utility {
                expected.insert(var);
            }

            match (node.node_type, node.potentials.len()) {
                (NodeType::Chance, 1) | (NodeType::Utility, 1) | (NodeType::Decision, 0) | (NodeType::Decision, 1) => (),
                (t, n) => return fail(format!("{:?} node {} has {} potentials", t, var, n)),
            }

            if let Some(p) = node.potentials.first() {
                let actual: HashSet<&Variable> = p.variables().iter().collect();
                if actual != expected {
                    return fail(format!("the potential of {} is over {:?}", var, p.variables()));
                }
            }

            if node.node_type == NodeType::Utility {
                let bad_child = node.children.iter().find(|c| self.node_type(c) != Some(NodeType::Utility));
                if let Some(c) = bad_child {
                    return fail(format!("utility node {} has the non-utility child {}", var, c));
                }
            }
        }

        Ok(())
    }

    fn check_node(&self, var: &Variable) -> Result<()> {
        if self.nodes.contains_key(var) {
            Ok(())
        } else {
            Err(ProbNetError::NodeNotFound(var.to_string()))
        }
    }

    fn node_mut(&mut self, var: &Variable) -> Result<&mut ProbNode> {
        self.nodes.get_mut(var).ok_or_else(|| ProbNetError::NodeNotFound(var.to_string()))
    }

    /// The network's own `Variable` with the name of `var` in time slice `slice`
    fn slice_variable(&self, var: &Variable, slice: u32) -> Result<Variable> {
        let target = var.in_time_slice(slice);
        self.nodes.get_key_value(&target)
                  .map(|(v, _)| v.clone())
                  .ok_or_else(|| ProbNetError::NodeNotFound(target.to_string()))
    }
}


/// An implementation of the [builder pattern] for creating a `ProbNet`.
///
/// Networks are assembled in topological order: the parents of a node must already be in the
/// network when the node is added.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct ProbNetBuilder {

    net: ProbNet,

    /// The error state of the builder
    err: Option<ProbNetError>,
}

impl ProbNetBuilder {

    /// Construct a new `ProbNetBuilder` representing an empty network
    pub fn new() -> Self {
        ProbNetBuilder { net: ProbNet::new(), err: None }
    }

    /// Add a chance node.
    ///
    /// # Args
    /// * `var`: the variable to add to the network
    /// * `parents`: the parent variables. The parents must already be in the network.
    /// * `init`: the initialization of the conditional probability of `var`
    pub fn with_chance(self, var: &Variable, parents: &[Variable], init: Initialization) -> Self {
        self.add_node(var, NodeType::Chance, parents, Some((init, PotentialRole::ConditionalProbability)))
    }

    /// Add a decision node observing `parents`, without an imposed policy
    pub fn with_decision(self, var: &Variable, parents: &[Variable]) -> Self {
        self.add_node(var, NodeType::Decision, parents, None)
    }

    /// Add a utility node. The utility function is defined over `parents`.
    pub fn with_utility(self, var: &Variable, parents: &[Variable], init: Initialization) -> Self {
        self.add_node(var, NodeType::Utility, parents, Some((init, PotentialRole::Utility)))
    }

    /// Impose a policy on a decision node already in the network
    pub fn with_imposed_policy(mut self, decision: &Variable, init: Initialization) -> Self {
        if self.err.is_some() {
            return self;
        }

        if self.net.node_type(decision) != Some(NodeType::Decision) {
            self.err = Some(ProbNetError::InvalidArgument(format!("{} is not a decision", decision)));
            return self;
        }

        let parents = self.net.parents(decision);
        match init.build_potential(decision, &parents, PotentialRole::Policy) {
            Ok(p) => {
                if let Err(e) = self.net.set_potentials(decision, vec![p]) {
                    self.err = Some(e);
                }
            }
            Err(e) => self.err = Some(e),
        }

        self
    }

    /// Complete building the network.
    ///
    /// # Returns
    /// the `ProbNet`, or an error if one was generated during the building process
    pub fn build(self) -> Result<ProbNet> {
        if let Some(e) = self.err {
            Err(e)
        } else {
            Ok(self.net)
        }
    }

    /// Internal function that actually does the node addition to the network
    fn add_node(
        mut self,
        var: &Variable,
        node_type: NodeType,
        parents: &[Variable],
        init: Option<(Initialization, PotentialRole)>,
    ) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if let Some(missing) = parents.iter().find(|p| !self.net.contains(p)) {
            self.err = Some(ProbNetError::NodeNotFound(missing.to_string()));
            return self;
        }

        if let Err(e) = self.net.add_node(var, node_type) {
            self.err = Some(e);
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Link and build the potential based on the initialization
        for p in parents {
            if let Err(e) = self.net.add_link(p, var) {
                self.err = Some(e);
                return self;
            }
        }

        if let Some((init, role)) = init {
            let potential = init.build_potential(var, parents, role)
                                .and_then(|p| self.net.set_potentials(var, vec![p]));
            if let Err(e) = potential {
                self.err = Some(e);
            }
        }

        self
    }
}

impl Default for ProbNet {
    fn default() -> Self {
        ProbNet::new()
    }
}

impl fmt::Debug for ProbNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.nodes.iter().map(|(v, n)| (v, n.node_type))).finish()
    }
}


impl Default for ProbNetBuilder {
    fn default() -> Self {
        ProbNetBuilder::new()
    }
}
