//! Heuristics choosing the next variable to eliminate.

use super::options::HeuristicKind;
use super::partial_order::PartialOrder;
use crate::potential::TablePotential;
use crate::variable::Variable;

use bidir_map::BidirMap;

use std::collections::BTreeSet;


/// Picks the variables to eliminate, one at a time.
///
/// The engine calls `next_variable`, eliminates the returned variable, then reports it with
/// `variable_eliminated` before asking for the next one.
pub trait EliminationHeuristic {

    /// The next variable to eliminate, or `None` when there is nothing left
    fn next_variable(&mut self) -> Option<Variable>;

    /// Update the internal state after `var` has been eliminated
    fn variable_eliminated(&mut self, var: &Variable);
}


/// Build the heuristic selected by `kind`
pub fn create(kind: HeuristicKind, potentials: &[TablePotential], order: PartialOrder) -> Box<dyn EliminationHeuristic> {
    match kind {
        HeuristicKind::Simple => Box::new(SimpleElimination::new(potentials, order)),
        HeuristicKind::MinimalFillIn => Box::new(MinimalFillIn::new(potentials, order)),
    }
}


/// The interaction graph of a set of potentials: variables are linked when they share a
/// potential. Eliminating a variable deactivates it and links all its active neighbours.
struct InteractionGraph {
    index: BidirMap<Variable, usize>,
    adjacency: Vec<BTreeSet<usize>>,
    active: Vec<bool>,
}

impl InteractionGraph {

    fn new(potentials: &[TablePotential], extra: &[Variable]) -> Self {
        let mut graph = InteractionGraph { index: BidirMap::new(), adjacency: Vec::new(), active: Vec::new() };

        for v in extra {
            graph.vertex(v);
        }
        for p in potentials {
            let ids: Vec<usize> = p.variables().iter().map(|v| graph.vertex(v)).collect();
            for &i in ids.iter() {
                for &j in ids.iter().filter(|&&j| j != i) {
                    graph.adjacency[i].insert(j);
                }
            }
        }

        graph
    }

    fn vertex(&mut self, var: &Variable) -> usize {
        if let Some(&i) = self.index.get_by_first(var) {
            return i;
        }
        let i = self.adjacency.len();
        self.index.insert(var.clone(), i);
        self.adjacency.push(BTreeSet::new());
        self.active.push(true);
        i
    }

    fn id(&self, var: &Variable) -> Option<usize> {
        self.index.get_by_first(var).cloned()
    }

    fn neighbours(&self, i: usize) -> Vec<usize> {
        self.adjacency[i].iter().cloned().filter(|&j| self.active[j]).collect()
    }

    fn num_neighbours(&self, var: &Variable) -> usize {
        self.id(var).map_or(0, |i| self.neighbours(i).len())
    }

    /// Number of links that eliminating `var` would add
    fn fill_in(&self, var: &Variable) -> usize {
        let i = match self.id(var) {
            Some(i) => i,
            None => return 0,
        };

        let n = self.neighbours(i);
        let mut missing = 0;
        for (k, &a) in n.iter().enumerate() {
            missing += n[k + 1..].iter().filter(|&&b| !self.adjacency[a].contains(&b)).count();
        }
        missing
    }

    fn eliminate(&mut self, var: &Variable) {
        if let Some(i) = self.id(var) {
            let n = self.neighbours(i);
            for &a in n.iter() {
                for &b in n.iter().filter(|&&b| b != a) {
                    self.adjacency[a].insert(b);
                }
            }
            self.active[i] = false;
        }
    }
}


/// State shared by the heuristics: the groups still to be eliminated and the graph
struct GroupedElimination {
    groups: Vec<Vec<Variable>>,
    graph: InteractionGraph,
}

impl GroupedElimination {

    fn new(potentials: &[TablePotential], order: PartialOrder) -> Self {
        let graph = InteractionGraph::new(potentials, &order.variables());
        GroupedElimination { groups: order.groups().to_vec(), graph }
    }

    /// The variable of the last non-empty group with the lowest score. Ties keep group order.
    fn best_by<F>(&self, score: F) -> Option<Variable>
        where F: Fn(&InteractionGraph, &Variable) -> usize
    {
        let group = self.groups.iter().rev().find(|g| !g.is_empty())?;
        group.iter()
             .min_by_key(|v| score(&self.graph, v))
             .cloned()
    }

    fn eliminated(&mut self, var: &Variable) {
        for g in self.groups.iter_mut() {
            g.retain(|v| v != var);
        }
        self.graph.eliminate(var);
    }
}


/// Eliminates, inside the last pending group of the partial order, the variable with the fewest
/// neighbours in the interaction graph.
pub struct SimpleElimination(GroupedElimination);

impl SimpleElimination {
    pub fn new(potentials: &[TablePotential], order: PartialOrder) -> Self {
        SimpleElimination(GroupedElimination::new(potentials, order))
    }
}

impl EliminationHeuristic for SimpleElimination {

    fn next_variable(&mut self) -> Option<Variable> {
        self.0.best_by(|g, v| g.num_neighbours(v))
    }

    fn variable_eliminated(&mut self, var: &Variable) {
        self.0.eliminated(var)
    }
}


/// Eliminates, inside the last pending group of the partial order, the variable whose
/// elimination adds the fewest links to the interaction graph.
pub struct MinimalFillIn(GroupedElimination);

impl MinimalFillIn {
    pub fn new(potentials: &[TablePotential], order: PartialOrder) -> Self {
        MinimalFillIn(GroupedElimination::new(potentials, order))
    }
}

impl EliminationHeuristic for MinimalFillIn {

    fn next_variable(&mut self) -> Option<Variable> {
        self.0.best_by(|g, v| g.fill_in(v))
    }

    fn variable_eliminated(&mut self, var: &Variable) {
        self.0.eliminated(var)
    }
}
