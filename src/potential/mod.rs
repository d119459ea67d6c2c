//! Definition of the potential module
//!
//! A `Potential` is a function from the configurations of an ordered list of `Variable`s to real
//! numbers: a conditional or joint probability, a utility, or a decision policy. Most potentials
//! are dense tables (`TablePotential`); the remaining variants of `Potential` are compact or
//! context-dependent representations that expand into a table on demand.
//!
//! # Table layout
//! The values of a `TablePotential` are stored in an `ndarray::ArrayD<f64>` whose axis `i`
//! corresponds to the `i`-th variable. Tables are row-major, so the last variable varies fastest.
//! Every operation in this module and in `ops` follows that convention.

use crate::evidence::EvidenceCase;
use crate::util::{ProbNetError, Result};
use crate::variable::{Assignment, Variable};

use ndarray::prelude as nd;
use ndarray::{Axis, IxDyn};
use rand::Rng;

use std::fmt;

pub mod ici;
pub mod ops;

pub use self::ici::{IciFamily, IciPotential};
pub use self::ops::TieBreak;

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;


/// What the values of a potential mean
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PotentialRole {
    /// `P(first variable | remaining variables)`
    ConditionalProbability,

    /// A joint distribution over all of its variables
    JointProbability,

    /// A utility function
    Utility,

    /// A decision rule `P(decision | informational predecessors)`
    Policy,
}

impl PotentialRole {

    pub fn is_utility(self) -> bool {
        self == PotentialRole::Utility
    }
}


/// A dense table over an ordered list of `Variable`s.
#[derive(Clone, Debug, PartialEq)]
pub struct TablePotential {

    /// The ordered scope of the table. Axis `i` of `values` belongs to `variables[i]`.
    variables: Vec<Variable>,

    /// The values of the table
    values: Table,

    role: PotentialRole,

    /// For utility potentials, the utility node whose value this potential represents
    utility_variable: Option<Variable>,

}


impl TablePotential {

    /// Create a new `TablePotential`
    ///
    /// # Args
    /// * `variables`: the ordered scope. May be empty, in which case `values` is zero-dimensional.
    /// * `values`: a table with one axis per variable, of length equal to its number of states
    /// * `role`: the meaning of the values
    ///
    /// # Errors
    /// * `ProbNetError::DuplicateVariable` if a variable appears twice
    /// * `ProbNetError::InvalidScope` if the table does not have the shape of the scope
    pub fn new(variables: Vec<Variable>, values: Table, role: PotentialRole) -> Result<Self> {
        for (i, v) in variables.iter().enumerate() {
            if variables[..i].contains(v) {
                return Err(ProbNetError::DuplicateVariable(v.to_string()));
            }
        }

        let expected: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();
        if values.shape() != expected.as_slice() {
            return Err(ProbNetError::InvalidScope(format!(
                "table of shape {:?} does not match variables {:?} of shape {:?}",
                values.shape(), variables, expected
            )));
        }

        Ok(TablePotential { variables, values, role, utility_variable: None })
    }

    /// Create a new `TablePotential` from a flat vector of values in row-major order
    pub fn from_vec(variables: Vec<Variable>, values: Vec<f64>, role: PotentialRole) -> Result<Self> {
        let shape: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();
        let table = Table::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
            ProbNetError::InvalidArgument(format!("values do not fit variables {:?}: {}", variables, e))
        })?;

        TablePotential::new(variables, table, role)
    }

    /// Create a utility potential for the utility node `utility_variable`
    pub fn utility(variables: Vec<Variable>, values: Vec<f64>, utility_variable: &Variable) -> Result<Self> {
        let p = TablePotential::from_vec(variables, values, PotentialRole::Utility)?;
        Ok(p.with_utility_variable(Some(utility_variable.clone())))
    }

    /// A zero-variable potential holding `value`
    pub fn constant(value: f64, role: PotentialRole) -> Self {
        TablePotential {
            variables: Vec::new(),
            values: Table::from_elem(IxDyn(&[]), value),
            role,
            utility_variable: None,
        }
    }

    /// The uniform potential for the given role. Conditional probabilities and policies are
    /// uniform over the first variable, joint probabilities over the whole table, and utilities
    /// are zero.
    pub fn uniform(variables: Vec<Variable>, role: PotentialRole) -> Self {
        let shape: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();
        let value = match role {
            PotentialRole::Utility => 0.0,
            PotentialRole::JointProbability => 1.0 / shape.iter().product::<usize>() as f64,
            _ => 1.0 / shape.first().cloned().unwrap_or(1) as f64,
        };

        TablePotential {
            variables,
            values: Table::from_elem(IxDyn(&shape), value),
            role,
            utility_variable: None,
        }
    }

    /// A potential over `var` with probability 1 for `state` and 0 elsewhere
    pub fn one_hot(var: &Variable, state: usize) -> Result<Self> {
        var.check_state(state)?;
        let mut values = Table::zeros(IxDyn(&[var.num_states()]));
        values[[state].as_ref()] = 1.0;
        TablePotential::new(vec![var.clone()], values, PotentialRole::ConditionalProbability)
    }

    pub fn with_utility_variable(mut self, utility_variable: Option<Variable>) -> Self {
        self.utility_variable = utility_variable;
        self
    }

    pub fn with_role(mut self, role: PotentialRole) -> Self {
        self.role = role;
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn values(&self) -> &Table {
        &self.values
    }

    pub fn role(&self) -> PotentialRole {
        self.role
    }

    pub fn utility_variable(&self) -> Option<&Variable> {
        self.utility_variable.as_ref()
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.variables.contains(var)
    }

    /// The number of entries of the table
    pub fn table_size(&self) -> usize {
        self.values.len()
    }

    /// The value of a zero-variable potential
    pub fn constant_value(&self) -> Option<f64> {
        if self.variables.is_empty() {
            self.values.iter().next().cloned()
        } else {
            None
        }
    }

    /// Check whether every entry of the table holds the same value
    pub fn is_uniform(&self) -> bool {
        match self.values.iter().next() {
            Some(&first) => self.values.iter().all(|&v| v == first),
            None => true,
        }
    }

    /// Retrieve the value for an assignment to (at least) the scope of this potential
    ///
    /// # Errors
    /// * `ProbNetError::IncompleteAssignment`, if assignment does not cover the scope
    /// * `ProbNetError::InvalidState`, if an assigned state is out of range
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let idx = assignment.indices(&self.variables)?;
        if let Some((var, state)) = self.variables.iter()
                                        .zip(idx.iter().cloned())
                                        .find(|(v, s)| *s >= v.num_states()) {
            return Err(ProbNetError::InvalidState { variable: var.to_string(), state });
        }

        self.values.get(IxDyn(&idx)).cloned().ok_or_else(|| {
            ProbNetError::InvalidScope(format!("no entry at {:?} in {:?}", idx, self.variables))
        })
    }

    /// Project the potential onto the evidence: every observed variable is fixed at its observed
    /// state and removed from the scope.
    ///
    /// # Errors
    /// * `ProbNetError::InvalidState` if an observed state does not exist in the table
    pub fn project(&self, evidence: &EvidenceCase) -> Result<Self> {
        if !self.variables.iter().any(|v| evidence.contains(v)) {
            return Ok(self.clone());
        }

        let mut view = self.values.view();
        let mut kept = Vec::new();

        // go backwards so that the axis indices of the remaining variables stay valid
        for (i, var) in self.variables.iter().enumerate().rev() {
            match evidence.state(var) {
                Some(state) => {
                    if state >= view.len_of(Axis(i)) {
                        return Err(ProbNetError::InvalidState { variable: var.to_string(), state });
                    }
                    view = view.index_axis_move(Axis(i), state);
                }
                None => kept.push(var.clone()),
            }
        }
        kept.reverse();

        Ok(TablePotential {
            variables: kept,
            values: view.to_owned(),
            role: self.role,
            utility_variable: self.utility_variable.clone(),
        })
    }

    /// Permute the table so that its variables follow `order`
    ///
    /// # Errors
    /// * `ProbNetError::InvalidScope` if `order` is not a permutation of the scope
    pub fn reorder(&self, order: &[Variable]) -> Result<Self> {
        if order.len() != self.variables.len() {
            return Err(ProbNetError::InvalidScope(format!(
                "{:?} is not a permutation of {:?}", order, self.variables
            )));
        }

        let mut perm = Vec::with_capacity(order.len());
        for v in order {
            match self.variables.iter().position(|w| w == v) {
                Some(i) if !perm.contains(&i) => perm.push(i),
                _ => {
                    return Err(ProbNetError::InvalidScope(format!(
                        "{:?} is not a permutation of {:?}", order, self.variables
                    )));
                }
            }
        }

        let values = self.values
                         .view()
                         .permuted_axes(IxDyn(&perm))
                         .as_standard_layout()
                         .into_owned();

        Ok(TablePotential {
            variables: order.to_vec(),
            values,
            role: self.role,
            utility_variable: self.utility_variable.clone(),
        })
    }

    /// Draw a state of the first variable given the states of the others in `assignment`.
    ///
    /// # Errors
    /// * `ProbNetError::IncompleteAssignment` if a conditioning variable is unassigned
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, assignment: &Assignment) -> Result<usize> {
        if self.variables.is_empty() {
            return Err(ProbNetError::InvalidScope(String::from("cannot sample a constant potential")));
        }
        if self.variables[0].num_states() == 0 {
            return Err(ProbNetError::InvalidArgument(format!("{} has no states to sample", self.variables[0])));
        }

        let mut view = self.values.view();
        for (i, var) in self.variables.iter().enumerate().skip(1).rev() {
            let state = assignment.get(var)
                                  .ok_or_else(|| ProbNetError::IncompleteAssignment(var.to_string()))?;
            var.check_state(state)?;
            view = view.index_axis_move(Axis(i), state);
        }

        Ok(draw(rng, view.iter().cloned()))
    }
}

impl fmt::Display for TablePotential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self.variables.iter().map(|v| v.to_string()).collect();
        write!(f, "{:?}({}) = {}", self.role, names.join(", "), self.values)
    }
}


/// Draw an index from a discrete distribution with a single uniform draw: the result is the
/// first index whose cumulative probability meets or exceeds the draw.
pub(crate) fn draw<R, I>(rng: &mut R, probabilities: I) -> usize
    where R: Rng + ?Sized,
          I: IntoIterator<Item = f64>
{
    let u: f64 = rng.gen();
    let mut cumulative = 0.0;
    let mut last = 0;

    for (i, p) in probabilities.into_iter().enumerate() {
        cumulative += p;
        last = i;
        if cumulative >= u {
            return i;
        }
    }

    // rounding may leave the total just below the draw
    last
}


/// The potential attached to a node of a network.
///
/// `Table` is the general representation. The other variants are compact or derived forms that
/// become a `TablePotential` through `to_table`, or through `ProbNet::resolve_potential` for the
/// variants that need the surrounding network.
#[derive(Clone, Debug, PartialEq)]
pub enum Potential {

    Table(TablePotential),

    /// A uniform distribution over the first variable (zero for utilities)
    Uniform { variables: Vec<Variable>, role: PotentialRole },

    /// A canonical independence-of-causal-influence model
    Ici(IciPotential),

    /// A super-value utility node that adds up its utility parents
    Sum { variables: Vec<Variable>, utility_variable: Variable },

    /// A super-value utility node that multiplies its utility parents
    Product { variables: Vec<Variable>, utility_variable: Variable },

    /// A temporal node that reuses the potential of the same node in the previous time slice
    SameAsPrevious { variables: Vec<Variable>, role: PotentialRole },

}


impl Potential {

    pub fn variables(&self) -> &[Variable] {
        match self {
            Potential::Table(t) => t.variables(),
            Potential::Ici(p) => p.variables(),
            Potential::Uniform { variables, .. }
            | Potential::Sum { variables, .. }
            | Potential::Product { variables, .. }
            | Potential::SameAsPrevious { variables, .. } => variables,
        }
    }

    pub fn role(&self) -> PotentialRole {
        match self {
            Potential::Table(t) => t.role(),
            Potential::Ici(_) => PotentialRole::ConditionalProbability,
            Potential::Sum { .. } | Potential::Product { .. } => PotentialRole::Utility,
            Potential::Uniform { role, .. } | Potential::SameAsPrevious { role, .. } => *role,
        }
    }

    /// The name of the representation, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Potential::Table(_) => "Table",
            Potential::Uniform { .. } => "Uniform",
            Potential::Ici(p) => p.family().name(),
            Potential::Sum { .. } => "Sum",
            Potential::Product { .. } => "Product",
            Potential::SameAsPrevious { .. } => "SameAsPrevious",
        }
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.variables().contains(var)
    }

    pub fn is_uniform(&self) -> bool {
        match self {
            Potential::Uniform { .. } => true,
            Potential::Table(t) => t.is_uniform(),
            _ => false,
        }
    }

    /// The equivalent `TablePotential`.
    ///
    /// # Errors
    /// * `ProbNetError::NonProjectablePotential` for `Sum`, `Product` and `SameAsPrevious`, which
    ///   can only be resolved against their network
    pub fn to_table(&self) -> Result<TablePotential> {
        match self {
            Potential::Table(t) => Ok(t.clone()),
            Potential::Uniform { variables, role } => Ok(TablePotential::uniform(variables.clone(), *role)),
            Potential::Ici(p) => p.expand(),
            other => Err(ProbNetError::NonProjectablePotential(format!(
                "a {} potential over {:?} depends on the network", other.kind(), other.variables()
            ))),
        }
    }

    /// The equivalent `TablePotential` projected onto the evidence
    pub fn table_project(&self, evidence: &EvidenceCase) -> Result<TablePotential> {
        self.to_table()?.project(evidence)
    }

    /// Draw a state of the conditioned (first) variable given its parents' states
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, assignment: &Assignment) -> Result<usize> {
        match self {
            Potential::Table(t) => t.sample(rng, assignment),
            Potential::Ici(p) => p.sample(rng, assignment),
            Potential::Uniform { variables, .. } if !variables.is_empty() => {
                match variables[0].num_states() {
                    0 => Err(ProbNetError::InvalidArgument(format!("{} has no states to sample", variables[0]))),
                    n => Ok(rng.gen_range(0..n)),
                }
            }
            other => Err(ProbNetError::NonProjectablePotential(format!(
                "cannot sample from a {} potential", other.kind()
            ))),
        }
    }
}

impl From<TablePotential> for Potential {
    fn from(t: TablePotential) -> Self {
        Potential::Table(t)
    }
}

impl From<IciPotential> for Potential {
    fn from(p: IciPotential) -> Self {
        Potential::Ici(p)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Finding;

    use approx::assert_abs_diff_eq;
    use itertools::iproduct;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn table_potential() {
        let vars = vec![Variable::binary("A"), Variable::discrete("B", 5), Variable::discrete("C", 3)];
        let mut table = Table::ones(IxDyn(&[2, 5, 3]));
        table[[1, 1, 1].as_ref()] = 5.;

        let p = TablePotential::new(vars.clone(), table, PotentialRole::JointProbability).unwrap();

        for (x, y, z) in iproduct!(0..2, 0..5, 0..3) {
            let mut assn = Assignment::new();
            assn.set(&vars[0], x);
            assn.set(&vars[1], y);
            assn.set(&vars[2], z);

            let val = p.value(&assn).unwrap();
            if x == 1 && y == 1 && z == 1 {
                assert_eq!(5., val);
            } else {
                assert_eq!(1., val);
            }
        }
        assert_eq!(p.table_size(), 30);
        assert!(!p.is_uniform());
    }

    #[test]
    fn table_potential_errs() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");

        // mismatched number of dimensions
        let p = TablePotential::new(vec![a.clone(), b.clone()], Table::ones(IxDyn(&[2, 2, 2])), PotentialRole::Utility);
        match p {
            Err(ProbNetError::InvalidScope(_)) => (),
            other => panic!("wrong result {:?}", other),
        }

        // wrong cardinality
        let p = TablePotential::new(vec![a.clone(), b.clone()], Table::ones(IxDyn(&[2, 3])), PotentialRole::Utility);
        assert!(p.is_err());

        // duplicated variable
        let p = TablePotential::new(vec![a.clone(), a.clone()], Table::ones(IxDyn(&[2, 2])), PotentialRole::Utility);
        assert_eq!(p, Err(ProbNetError::DuplicateVariable(String::from("A"))));

        // wrong number of values
        assert!(TablePotential::from_vec(vec![a, b], vec![1.0, 2.0, 3.0], PotentialRole::Utility).is_err());
    }

    #[test]
    fn constants() {
        let c = TablePotential::constant(0.25, PotentialRole::JointProbability);
        assert_eq!(c.constant_value(), Some(0.25));
        assert!(c.variables().is_empty());
        assert_eq!(c.value(&Assignment::new()).unwrap(), 0.25);

        let a = Variable::binary("A");
        let u = TablePotential::uniform(vec![a.clone(), Variable::discrete("B", 4)], PotentialRole::ConditionalProbability);
        assert_eq!(u.constant_value(), None);
        assert!(u.is_uniform());
        assert!(u.values().iter().all(|&v| v == 0.5));

        let j = TablePotential::uniform(vec![a.clone(), Variable::discrete("B", 4)], PotentialRole::JointProbability);
        assert!(j.values().iter().all(|&v| v == 0.125));

        let h = TablePotential::one_hot(&a, 1).unwrap();
        assert_eq!(h.values(), &array![0., 1.].into_dyn());
        assert!(TablePotential::one_hot(&a, 2).is_err());
    }

    #[test]
    /// Example take from Koller & Friedman Figure 4.5
    fn project_simple() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");
        let c = Variable::binary("C");

        let table = Table::from_shape_vec(
            IxDyn(&[3, 2, 2]),
            vec![0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18]
        ).unwrap();
        let phi = TablePotential::new(vec![a.clone(), b.clone(), c.clone()], table, PotentialRole::JointProbability).unwrap();

        let evidence = EvidenceCase::from_states(&[(c.clone(), 0)]).unwrap();
        let reduced = phi.project(&evidence).unwrap();

        assert_eq!(reduced.variables(), &[a.clone(), b.clone()]);
        assert_eq!(reduced.values(), &array![[0.25, 0.08], [0.05, 0.], [0.15, 0.09]].into_dyn());

        let evidence = EvidenceCase::from_states(&[(c.clone(), 0), (a.clone(), 2)]).unwrap();
        let reduced = phi.project(&evidence).unwrap();
        assert_eq!(reduced.variables(), &[b.clone()]);
        assert_eq!(reduced.values(), &array![0.15, 0.09].into_dyn());

        let evidence = EvidenceCase::from_states(&[(c, 1), (a, 2), (b, 1)]).unwrap();
        let reduced = phi.project(&evidence).unwrap();
        assert_eq!(reduced.constant_value(), Some(0.18));
    }

    #[test]
    fn project_unrelated_evidence() {
        let a = Variable::binary("A");
        let p = TablePotential::from_vec(vec![a], vec![0.3, 0.7], PotentialRole::ConditionalProbability).unwrap();
        let evidence = EvidenceCase::from_states(&[(Variable::binary("Z"), 1)]).unwrap();
        assert_eq!(p.project(&evidence).unwrap(), p);
    }

    #[test]
    fn project_state_out_of_range() {
        let small = Variable::binary("A");
        let big = Variable::discrete("A", 3);
        let p = TablePotential::from_vec(vec![small], vec![0.3, 0.7], PotentialRole::ConditionalProbability).unwrap();

        let mut evidence = EvidenceCase::new();
        evidence.add_finding(Finding::new(&big, 2).unwrap()).unwrap();
        match p.project(&evidence) {
            Err(ProbNetError::InvalidState { state: 2, .. }) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn reorder() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");

        let p = TablePotential::new(
            vec![a.clone(), b.clone()],
            array![[1., 2.], [3., 4.], [5., 6.]].into_dyn(),
            PotentialRole::JointProbability
        ).unwrap();

        let r = p.reorder(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(r.variables(), &[b.clone(), a.clone()]);
        assert_eq!(r.values(), &array![[1., 3., 5.], [2., 4., 6.]].into_dyn());
        assert!(r.values().is_standard_layout());

        // the values of every configuration are preserved
        for (x, y) in iproduct!(0..3, 0..2) {
            let mut assn = Assignment::new();
            assn.set(&a, x);
            assn.set(&b, y);
            assert_eq!(p.value(&assn).unwrap(), r.value(&assn).unwrap());
        }

        assert!(p.reorder(&[a.clone()]).is_err());
        assert!(p.reorder(&[a.clone(), a]).is_err());
    }

    #[test]
    fn sample_conditional() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        // P(B | A) stored as [B, A]
        let p = TablePotential::new(
            vec![b.clone(), a.clone()],
            array![[1.0, 0.0], [0.0, 1.0]].into_dyn(),
            PotentialRole::ConditionalProbability
        ).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for state in 0..2 {
            let mut assn = Assignment::new();
            assn.set(&a, state);
            for _ in 0..20 {
                assert_eq!(p.sample(&mut rng, &assn).unwrap(), state);
            }
        }

        assert_eq!(
            p.sample(&mut rng, &Assignment::new()),
            Err(ProbNetError::IncompleteAssignment(String::from("A")))
        );
    }

    #[test]
    fn sample_stateless_variable() {
        let empty = Variable::new("E", &[]);
        let mut rng = StdRng::seed_from_u64(7);

        let uniform = Potential::Uniform { variables: vec![empty.clone()], role: PotentialRole::ConditionalProbability };
        assert!(matches!(uniform.sample(&mut rng, &Assignment::new()), Err(ProbNetError::InvalidArgument(_))));

        let table = TablePotential::uniform(vec![empty], PotentialRole::ConditionalProbability);
        assert!(matches!(table.sample(&mut rng, &Assignment::new()), Err(ProbNetError::InvalidArgument(_))));
    }

    #[test]
    fn draw_frequencies() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        for _ in 0..10000 {
            counts[draw(&mut rng, vec![0.2, 0.5, 0.3])] += 1;
        }
        assert_abs_diff_eq!(counts[0] as f64 / 10000., 0.2, epsilon = 0.02);
        assert_abs_diff_eq!(counts[1] as f64 / 10000., 0.5, epsilon = 0.02);
        assert_abs_diff_eq!(counts[2] as f64 / 10000., 0.3, epsilon = 0.02);

        // a distribution that sums to slightly less than one still yields a valid index
        assert!(draw(&mut rng, vec![0.0, 0.0]) <= 1);
    }

    #[test]
    fn potential_variants() {
        let a = Variable::binary("A");
        let u = Variable::binary("U");

        let uniform = Potential::Uniform { variables: vec![a.clone()], role: PotentialRole::ConditionalProbability };
        assert!(uniform.is_uniform());
        assert_eq!(uniform.to_table().unwrap().values(), &array![0.5, 0.5].into_dyn());

        let sum = Potential::Sum { variables: vec![a.clone()], utility_variable: u };
        assert_eq!(sum.role(), PotentialRole::Utility);
        match sum.to_table() {
            Err(ProbNetError::NonProjectablePotential(_)) => (),
            other => panic!("unexpected result {:?}", other),
        }

        let previous = Potential::SameAsPrevious { variables: vec![a.clone()], role: PotentialRole::ConditionalProbability };
        assert_eq!(previous.kind(), "SameAsPrevious");
        assert!(previous.table_project(&EvidenceCase::new()).is_err());

        let table: Potential = TablePotential::from_vec(vec![a.clone()], vec![0.1, 0.9], PotentialRole::ConditionalProbability)
            .unwrap()
            .into();
        let evidence = EvidenceCase::from_states(&[(a, 1)]).unwrap();
        assert_eq!(table.table_project(&evidence).unwrap().constant_value(), Some(0.9));
    }
}
