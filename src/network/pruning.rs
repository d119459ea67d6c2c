//! Removal of the nodes that cannot influence a query.

use super::{NodeType, ProbNet};
use crate::evidence::EvidenceCase;
use crate::util::Result;
use crate::variable::Variable;

use tracing::trace;


/// Iteratively remove barren nodes: chance and decision nodes without children that are neither
/// of interest nor observed. Removing a barren node may leave its parents barren in turn.
///
/// # Args
/// * `net`: the network to prune, modified in place
/// * `of_interest`: the variables that must be kept
/// * `evidence`: observed variables, which are kept too
///
/// # Returns
/// the removed variables, in removal order
pub fn remove_barren_nodes(net: &mut ProbNet, of_interest: &[Variable], evidence: &EvidenceCase) -> Result<Vec<Variable>> {
    let mut removed = Vec::new();

    loop {
        let barren: Vec<Variable> = net.variables()
                                       .into_iter()
                                       .filter(|v| net.node_type(v) != Some(NodeType::Utility))
                                       .filter(|v| net.node(v).map_or(false, |n| n.num_children() == 0))
                                       .filter(|v| !of_interest.contains(v) && !evidence.contains(v))
                                       .collect();
        if barren.is_empty() {
            break;
        }

        for v in barren {
            trace!(variable = %v, "removing barren node");
            net.remove_node(&v)?;
            removed.push(v);
        }
    }

    Ok(removed)
}
