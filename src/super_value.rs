//! Reduction of super-value nodes: utility nodes whose value combines the values of other
//! utility nodes.

use crate::evidence::EvidenceCase;
use crate::network::{NodeType, ProbNet};
use crate::potential::{ops, Potential, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::Variable;

use tracing::trace;


/// Check if a utility node has two or more utility parents
pub fn is_super_value_node(net: &ProbNet, var: &Variable) -> bool {
    net.node_type(var) == Some(NodeType::Utility) && utility_parents(net, var).len() >= 2
}

/// The utility nodes without children
pub fn terminal_utility_nodes(net: &ProbNet) -> Vec<Variable> {
    net.variables_of_type(NodeType::Utility)
       .into_iter()
       .filter(|u| net.children(u).is_empty())
       .collect()
}

/// A copy of `net` without its utility nodes
pub fn remove_utility_nodes(net: &ProbNet) -> Result<ProbNet> {
    let mut out = net.clone();
    for u in net.variables_of_type(NodeType::Utility) {
        out.remove_node(&u)?;
    }
    Ok(out)
}

fn utility_parents(net: &ProbNet, var: &Variable) -> Vec<Variable> {
    net.parents(var)
       .into_iter()
       .filter(|p| net.node_type(p) == Some(NodeType::Utility))
       .collect()
}

/// Check if a node adds up its utility parents. `SameAsPrevious` follows the previous slice.
fn is_sum_node(net: &ProbNet, var: &Variable) -> bool {
    match net.potentials(var).first() {
        Some(Potential::Sum { .. }) => true,
        Some(Potential::SameAsPrevious { .. }) => var.previous_slice()
                                                      .map_or(false, |prev| is_sum_node(net, &prev)),
        _ => false,
    }
}

/// The utility function of a node over chance and decision variables only.
///
/// A node with utility parents combines their functions, recursively, by their sum if its own
/// potential is `Sum` and by their product otherwise. Any other node uses its own potential,
/// projected onto `evidence` when given.
///
/// # Returns
/// a utility `TablePotential` whose utility variable is `var`
pub fn utility_function(net: &ProbNet, var: &Variable, evidence: Option<&EvidenceCase>) -> Result<TablePotential> {
    let parents = utility_parents(net, var);

    let function = if parents.is_empty() {
        let potential = net.resolve_potential(var)?
                           .ok_or_else(|| ProbNetError::NotEvaluableNetwork(format!("{} has no potential", var)))?;
        match evidence {
            Some(e) => potential.table_project(e)?,
            None => potential.to_table()?,
        }
    } else {
        let functions = parents.iter()
                               .map(|p| utility_function(net, p, evidence))
                               .collect::<Result<Vec<_>>>()?;
        if is_sum_node(net, var) {
            ops::sum(&functions)?
        } else {
            ops::multiply(&functions)?
        }
    };

    Ok(function.with_utility_variable(Some(var.clone())))
}

/// The terminal utility nodes, with every `Sum` node replaced by its utility parents until none
/// is left. Summing the kept nodes afterwards gives the same global utility.
fn implicit_sum_nodes(net: &ProbNet) -> Vec<Variable> {
    let mut keep = terminal_utility_nodes(net);

    while let Some(i) = keep.iter().position(|u| is_sum_node(net, u)) {
        let sum_node = keep.remove(i);
        for p in utility_parents(net, &sum_node) {
            if !keep.contains(&p) {
                keep.push(p);
            }
        }
    }

    keep
}

/// Rewrite the utility structure of a network.
///
/// Every utility node with utility parents (or only `var_to_keep`, when given) gets its resolved
/// utility function as potential and is relinked directly to the chance and decision variables
/// of that function. Then, unless `keep_components` is set, only some utility nodes survive:
/// * `var_to_keep`, if given;
/// * otherwise, with `leave_implicit_sum`, the smallest set of nodes whose values must still be
///   added up;
/// * otherwise, the terminal utility nodes.
///
/// # Returns
/// a new network; `net` is not modified
pub fn remove_super_value_nodes(
    net: &ProbNet,
    evidence: Option<&EvidenceCase>,
    keep_components: bool,
    leave_implicit_sum: bool,
    var_to_keep: Option<&Variable>,
) -> Result<ProbNet> {
    let mut out = net.clone();
    let utilities = net.variables_of_type(NodeType::Utility);

    for u in utilities.iter() {
        let rewire = match var_to_keep {
            Some(k) => k == u,
            None => !utility_parents(net, u).is_empty(),
        };
        if !rewire {
            continue;
        }

        let function = utility_function(net, u, evidence)?;
        for p in utility_parents(net, u) {
            out.remove_link(&p, u);
        }
        for v in function.variables() {
            out.add_link(v, u)?;
        }
        trace!(utility = %u, scope = function.variables().len(), "utility function resolved");
        out.set_potentials(u, vec![Potential::Table(function)])?;
    }

    if !keep_components {
        let keep = match var_to_keep {
            Some(k) => vec![k.clone()],
            None if leave_implicit_sum => implicit_sum_nodes(net),
            None => terminal_utility_nodes(net),
        };
        for u in utilities.iter().filter(|u| !keep.contains(u)) {
            out.remove_node(u)?;
        }
    }

    Ok(out)
}
