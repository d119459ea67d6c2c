//! The partial order of elimination imposed by the decisions of an influence diagram.

use crate::network::{NodeType, ProbNet};
use crate::variable::Variable;

use indexmap::IndexSet;

use std::fmt;


/// Groups of variables in the order in which they become known: the chance variables observed
/// before the first decision, the first decision, the chance variables observed before the
/// second decision, and so on. The last group holds the chance variables that are never observed.
///
/// Elimination goes backwards: every variable of a group is eliminated before any variable of an
/// earlier group, in any order inside the group.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialOrder {
    groups: Vec<Vec<Variable>>,
}

impl PartialOrder {

    /// Compute the partial order of the chance and decision nodes of `net`
    pub fn new(net: &ProbNet) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) Peel childless nodes off the graph. Decisions come off in reverse order.
        let mut remaining: IndexSet<Variable> = net.variables().into_iter().collect();
        let mut stack: Vec<Variable> = Vec::new();
        while remaining.iter().any(|v| net.node_type(v) == Some(NodeType::Decision)) {
            let leaves: Vec<Variable> = remaining.iter()
                                                 .filter(|v| net.children(v).iter().all(|c| !remaining.contains(c)))
                                                 .cloned()
                                                 .collect();
            if leaves.is_empty() {
                break;
            }
            for v in leaves {
                if net.node_type(&v) == Some(NodeType::Decision) {
                    stack.push(v.clone());
                }
                remaining.shift_remove(&v);
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Each decision is preceded by the chance parents not claimed by an earlier one
        let mut unassigned = net.variables_of_type(NodeType::Chance);
        let mut groups = Vec::new();

        while let Some(decision) = stack.pop() {
            let observed: Vec<Variable> = net.parents(&decision)
                                             .into_iter()
                                             .filter(|p| unassigned.contains(p))
                                             .collect();
            unassigned.retain(|v| !observed.contains(v));
            if !observed.is_empty() {
                groups.push(observed);
            }
            groups.push(vec![decision]);
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) The never observed chance variables
        if !unassigned.is_empty() {
            groups.push(unassigned);
        }

        PartialOrder { groups }
    }

    pub(crate) fn from_groups(groups: Vec<Vec<Variable>>) -> Self {
        PartialOrder { groups }
    }

    pub fn groups(&self) -> &[Vec<Variable>] {
        &self.groups
    }

    /// The index of the group containing `var`
    pub fn group_of(&self, var: &Variable) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(var))
    }

    pub fn num_variables(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.groups.iter().flatten().cloned().collect()
    }

    /// The order without the variables in `remove`, typically the query, evidence and
    /// conditioning variables. Groups left empty are dropped; the relative order is kept.
    pub fn project(&self, remove: &[Variable]) -> PartialOrder {
        let groups = self.groups
                         .iter()
                         .map(|g| g.iter().filter(|v| !remove.contains(v)).cloned().collect::<Vec<_>>())
                         .filter(|g| !g.is_empty())
                         .collect();
        PartialOrder { groups }
    }
}

impl fmt::Display for PartialOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let groups: Vec<String> = self.groups
                                      .iter()
                                      .map(|g| {
                                          let names: Vec<String> = g.iter().map(|v| v.to_string()).collect();
                                          if g.len() > 1 { format!("{{{}}}", names.join(", ")) } else { names.join("") }
                                      })
                                      .collect();
        write!(f, "[{}]", groups.join(", "))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::network::ProbNetBuilder;

    /// Two decisions: test -> T -> treat, with the disease X observed by neither
    ///
    /// A -> D1 -> T -> D2 -> U, X -> T, X -> U, A -> X
    fn two_decisions() -> (ProbNet, Vec<Variable>) {
        let a = Variable::binary("A");
        let x = Variable::binary("X");
        let d1 = Variable::binary("D1");
        let t = Variable::binary("T");
        let d2 = Variable::binary("D2");
        let u = Variable::numeric("U");

        let net = ProbNetBuilder::new()
            .with_chance(&a, &[], Initialization::Uniform)
            .with_chance(&x, &[a.clone()], Initialization::Uniform)
            .with_decision(&d1, &[a.clone()])
            .with_chance(&t, &[d1.clone(), x.clone()], Initialization::Uniform)
            .with_decision(&d2, &[t.clone(), d1.clone()])
            .with_utility(&u, &[d2.clone(), x.clone()], Initialization::Uniform)
            .build()
            .unwrap();

        (net, vec![a, x, d1, t, d2, u])
    }

    #[test]
    fn order_of_a_two_decision_diagram() {
        let (net, vars) = two_decisions();
        let (a, x, d1, t, d2) = (&vars[0], &vars[1], &vars[2], &vars[3], &vars[4]);

        let order = PartialOrder::new(&net);
        assert_eq!(order.groups(), &[
            vec![a.clone()],
            vec![d1.clone()],
            vec![t.clone()],
            vec![d2.clone()],
            vec![x.clone()],
        ]);
        assert_eq!(order.num_variables(), 5);
        assert_eq!(order.to_string(), "[A, D1, T, D2, X]");
    }

    #[test]
    fn earlier_decisions_come_first() {
        let (net, vars) = two_decisions();
        let (d1, d2) = (&vars[2], &vars[4]);
        let order = PartialOrder::new(&net);

        // D1 precedes every group holding a parent of D2 other than D1 itself
        let g1 = order.group_of(d1).unwrap();
        let g2 = order.group_of(d2).unwrap();
        assert!(g1 < g2);
        for p in net.parents(d2).iter().filter(|p| *p != d1) {
            let gp = order.group_of(p).unwrap();
            assert!(g1 <= gp && gp < g2);
        }
    }

    #[test]
    fn projection_drops_empty_groups() {
        let (net, vars) = two_decisions();
        let (a, x, d1, t, d2) = (&vars[0], &vars[1], &vars[2], &vars[3], &vars[4]);

        let projected = PartialOrder::new(&net).project(&[t.clone(), a.clone()]);
        assert_eq!(projected.groups(), &[vec![d1.clone()], vec![d2.clone()], vec![x.clone()]]);
    }

    #[test]
    fn bayesian_network_is_one_group() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let net = ProbNetBuilder::new()
            .with_chance(&a, &[], Initialization::Uniform)
            .with_chance(&b, &[a.clone()], Initialization::Uniform)
            .build()
            .unwrap();

        let order = PartialOrder::new(&net);
        assert_eq!(order.groups(), &[vec![a.clone(), b.clone()]]);
        assert!(order.project(&[a, b]).groups().is_empty());
    }
}
