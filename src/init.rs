//! Module containing initialization routines for the potentials of a network.

use crate::potential::{ops, Potential, PotentialRole, Table, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::Variable;

use ndarray::IxDyn;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;


/// Defines possible ways to initialize the potential of a node.
pub enum Initialization<'a> {
    /// A uniform distribution over the states of the node (or a zero utility)
    Uniform,

    /// Random weights, normalized for each configuration of the parents
    Random,

    /// A Binomial distribution with parameter ```p``` for the second state.
    /// Note that this `Initialization` is valid only to a binary `Variable` with no parents.
    Binomial(f64),

    /// A Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only to a `Variable` with no parents.
    Multinomial(&'a [f64]),

    /// Explicit values in row-major order over ```[node, parents...]``` (or ```[parents...]``` for
    /// utility nodes)
    Values(&'a [f64]),

    /// A super-value node adding up its utility parents
    Sum,

    /// A super-value node multiplying its utility parents
    Product,

    /// Reuse the potential of the same node in the previous time slice
    SameAsPrevious,

    /// A user defined potential. Its variables must be exactly the node and its parents.
    Potential(Potential),
}


impl<'a> Initialization<'a> {

    /// Construct the potential of a node, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the variable of the node
    /// * `parents`: the parents of the node, in the order used for the table
    /// * `role`: `ConditionalProbability` for chance nodes, `Policy` for imposed policies,
    ///   `Utility` for utility nodes
    ///
    /// # Returns
    /// a `Potential` over ```[var, parents...]```, or over ```parents``` with `var` as utility
    /// variable when `role` is `Utility`
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if the initialization does not apply to the node
    /// * `ProbNetError::InvalidScope` if a user defined potential has the wrong variables
    pub fn build_potential(self, var: &Variable, parents: &[Variable], role: PotentialRole) -> Result<Potential> {
        let utility = role.is_utility();
        let variables: Vec<Variable> = if utility {
            parents.to_vec()
        } else {
            let mut v = vec![var.clone()];
            v.extend(parents.iter().cloned());
            v
        };
        let shape: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();

        let table = match self {
            ///////////////////////////////////////////////////////////////////////////////
            // Forms that are not tables
            Initialization::Sum | Initialization::Product if !utility => {
                return Err(ProbNetError::InvalidArgument(format!(
                    "only utility nodes combine their parents, {} is not one", var
                )));
            }
            Initialization::Sum => {
                return Ok(Potential::Sum { variables, utility_variable: var.clone() });
            }
            Initialization::Product => {
                return Ok(Potential::Product { variables, utility_variable: var.clone() });
            }
            Initialization::SameAsPrevious => {
                if var.previous_slice().is_none() {
                    return Err(ProbNetError::InvalidArgument(format!("{} has no previous time slice", var)));
                }
                return Ok(Potential::SameAsPrevious { variables, role });
            }
            Initialization::Potential(p) => {
                let same = p.variables().len() == variables.len()
                    && variables.iter().all(|v| p.contains(v));
                if !same {
                    return Err(ProbNetError::InvalidScope(format!(
                        "potential over {:?} given for {} with parents {:?}", p.variables(), var, parents
                    )));
                }
                return Ok(p);
            }

            ///////////////////////////////////////////////////////////////////////////////
            // Tables
            Initialization::Uniform => return Ok(Potential::Uniform { variables, role }),
            Initialization::Random => {
                let tbl = Table::random(IxDyn(&shape), Uniform::new(1.0, 100.0));
                let p = TablePotential::new(variables, tbl, role)?;
                if utility { p } else { ops::normalize(&p)? }
            }
            Initialization::Binomial(p) => {
                if !parents.is_empty() || var.num_states() != 2 || utility {
                    return Err(ProbNetError::InvalidArgument(format!(
                        "a binomial initialization needs a binary node without parents, not {}", var
                    )));
                }
                TablePotential::from_vec(variables, vec![1.0 - p, p], role)?
            }
            Initialization::Multinomial(ps) => {
                if !parents.is_empty() || ps.len() != var.num_states() || utility {
                    return Err(ProbNetError::InvalidArgument(format!(
                        "a multinomial initialization needs one parameter per state of {} and no parents", var
                    )));
                }
                TablePotential::from_vec(variables, ps.to_vec(), role)?
            }
            Initialization::Values(values) => TablePotential::from_vec(variables, values.to_vec(), role)?,
        };

        let table = if utility { table.with_utility_variable(Some(var.clone())) } else { table };
        Ok(Potential::Table(table))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Axis};

    #[test]
    fn table_initializations() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 3);

        let p = Initialization::Binomial(0.7).build_potential(&a, &[], PotentialRole::ConditionalProbability).unwrap();
        assert_eq!(p.to_table().unwrap().values(), &array![0.3, 0.7].into_dyn());

        let p = Initialization::Values(&[0.9, 0.2, 0.5, 0.1, 0.8, 0.5])
            .build_potential(&a, &[b.clone()], PotentialRole::ConditionalProbability)
            .unwrap();
        assert_eq!(p.variables(), &[a.clone(), b.clone()]);

        let p = Initialization::Uniform.build_potential(&b, &[a.clone()], PotentialRole::ConditionalProbability).unwrap();
        assert!(p.is_uniform());

        let p = Initialization::Random.build_potential(&b, &[a.clone()], PotentialRole::ConditionalProbability).unwrap();
        let sums = p.to_table().unwrap().values().sum_axis(Axis(0));
        for s in sums.iter() {
            assert_abs_diff_eq!(*s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn utility_initializations() {
        let d = Variable::binary("D");
        let u = Variable::numeric("U");

        let p = Initialization::Values(&[10., 20.]).build_potential(&u, &[d.clone()], PotentialRole::Utility).unwrap();
        let t = p.to_table().unwrap();
        assert_eq!(t.variables(), &[d.clone()]);
        assert_eq!(t.utility_variable(), Some(&u));

        let s = Initialization::Sum.build_potential(&u, &[Variable::numeric("U1")], PotentialRole::Utility).unwrap();
        assert_eq!(s.kind(), "Sum");
    }

    #[test]
    fn invalid_initializations() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 3);

        assert!(Initialization::Binomial(0.5).build_potential(&b, &[], PotentialRole::ConditionalProbability).is_err());
        assert!(Initialization::Binomial(0.5).build_potential(&a, &[b.clone()], PotentialRole::ConditionalProbability).is_err());
        assert!(Initialization::Multinomial(&[0.5, 0.5]).build_potential(&b, &[], PotentialRole::ConditionalProbability).is_err());
        assert!(Initialization::Values(&[0.5]).build_potential(&a, &[], PotentialRole::ConditionalProbability).is_err());
        assert!(Initialization::Sum.build_potential(&a, &[], PotentialRole::ConditionalProbability).is_err());
        assert!(Initialization::SameAsPrevious.build_potential(&a, &[], PotentialRole::ConditionalProbability).is_err());

        let wrong = Potential::Uniform { variables: vec![b.clone()], role: PotentialRole::ConditionalProbability };
        assert!(matches!(
            Initialization::Potential(wrong).build_potential(&a, &[], PotentialRole::ConditionalProbability),
            Err(ProbNetError::InvalidScope(_))
        ));
    }
}
