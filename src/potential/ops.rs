//! Factor algebra over `TablePotential`s.
//!
//! Every function here is pure: the inputs are borrowed and a new potential is returned. Result
//! variables follow the order in which they first appear among the inputs.

use super::{PotentialRole, Table, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::{all_assignments, Assignment, Variable};

use ndarray::{ArrayView1, ArrayViewD, Axis, IxDyn, Zip};


/// Values of a maximization closer than this to the maximum are considered ties
pub const MAX_ROUND_ERROR: f64 = 1e-5;


/// How `multiply_and_maximize` resolves several maximal decision states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieBreak {
    /// Every maximal state gets the same share of probability
    Uniform,

    /// The maximal state with the lowest index gets probability 1
    First,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::Uniform
    }
}


fn union_of(potentials: &[&TablePotential]) -> Vec<Variable> {
    let mut union: Vec<Variable> = Vec::new();
    for p in potentials {
        for v in p.variables() {
            if !union.contains(v) {
                union.push(v.clone());
            }
        }
    }
    union
}

fn shape_of(vars: &[Variable]) -> Vec<usize> {
    vars.iter().map(|v| v.num_states()).collect()
}

/// The role of a combination of potentials
fn combined_role(potentials: &[&TablePotential]) -> PotentialRole {
    if potentials.iter().any(|p| p.role().is_utility()) {
        PotentialRole::Utility
    } else if !potentials.is_empty() && potentials.iter().all(|p| p.role() == PotentialRole::JointProbability) {
        PotentialRole::JointProbability
    } else {
        PotentialRole::ConditionalProbability
    }
}

fn first_utility_variable(potentials: &[&TablePotential]) -> Option<Variable> {
    potentials.iter().filter_map(|p| p.utility_variable()).next().cloned()
}

/// Permute a table view over `vars` into the axis order of `target`, inserting a length-one axis
/// for every target variable it does not contain, so that it broadcasts onto a table over
/// `target`.
fn aligned<'a>(values: ArrayViewD<'a, f64>, vars: &[Variable], target: &[Variable]) -> Result<ArrayViewD<'a, f64>> {
    let perm: Vec<usize> = target.iter()
                                 .filter_map(|t| vars.iter().position(|v| v == t))
                                 .collect();
    if perm.len() != vars.len() {
        return Err(ProbNetError::InvalidScope(format!("{:?} is not contained in {:?}", vars, target)));
    }

    let mut view = values.permuted_axes(IxDyn(&perm));
    for (i, t) in target.iter().enumerate() {
        if !vars.contains(t) {
            view = view.insert_axis(Axis(i));
        }
    }
    Ok(view)
}

/// Fix the variables assigned in `config`, returning the remaining view and its variables
fn fixed<'a>(p: &'a TablePotential, config: &Assignment) -> (ArrayViewD<'a, f64>, Vec<Variable>) {
    let mut view = p.values().view();
    let mut vars = Vec::new();
    for (i, v) in p.variables().iter().enumerate().rev() {
        match config.get(v) {
            Some(state) => view = view.index_axis_move(Axis(i), state),
            None => vars.push(v.clone()),
        }
    }
    vars.reverse();
    (view, vars)
}


/// Product of a set of potentials.
///
/// Defined in Koller & Friedman Section 4.2.1
///
/// # Returns
/// A potential over the union of the scopes. The product of no potentials is the constant 1.
/// The result is a utility if any factor is a utility.
pub fn multiply<'a, I>(potentials: I) -> Result<TablePotential>
    where I: IntoIterator<Item = &'a TablePotential>
{
    let potentials: Vec<&TablePotential> = potentials.into_iter().collect();
    let variables = union_of(&potentials);

    let mut values = Table::ones(IxDyn(&shape_of(&variables)));
    for p in potentials.iter() {
        values *= &aligned(p.values().view(), p.variables(), &variables)?;
    }

    Ok(TablePotential::new(variables, values, combined_role(&potentials))?
        .with_utility_variable(first_utility_variable(&potentials)))
}


/// Sum out the given variables. Variables outside the scope are ignored.
///
/// Defined in Koller & Friedman 9.3.1
pub fn marginalize(potential: &TablePotential, variables: &[Variable]) -> TablePotential {
    let mut values = potential.values().clone();
    let mut kept: Vec<Variable> = potential.variables().to_vec();

    for v in variables {
        if let Some(i) = kept.iter().position(|k| k == v) {
            values = values.sum_axis(Axis(i));
            kept.remove(i);
        }
    }

    TablePotential {
        variables: kept,
        values,
        role: potential.role(),
        utility_variable: potential.utility_variable().cloned(),
    }
}


/// Multiply the potentials and sum out every variable not in `keep`, without building the joint
/// table over all the variables.
///
/// # Returns
/// a potential over the variables of the inputs that are in `keep`
pub fn multiply_and_marginalize<'a, I>(potentials: I, keep: &[Variable]) -> Result<TablePotential>
    where I: IntoIterator<Item = &'a TablePotential>
{
    let potentials: Vec<&TablePotential> = potentials.into_iter().collect();
    let (kept, eliminated): (Vec<Variable>, Vec<Variable>) = union_of(&potentials)
        .into_iter()
        .partition(|v| keep.contains(v));

    if eliminated.is_empty() {
        return multiply(potentials);
    }

    let shape = shape_of(&kept);
    let mut values = Table::zeros(IxDyn(&shape));
    let mut term = Table::ones(IxDyn(&shape));

    // one slice of the joint at a time
    for config in all_assignments(&eliminated) {
        term.fill(1.0);
        for p in potentials.iter() {
            let (view, vars) = fixed(p, &config);
            term *= &aligned(view, &vars, &kept)?;
        }
        values += &term;
    }

    Ok(TablePotential::new(kept, values, combined_role(&potentials))?
        .with_utility_variable(first_utility_variable(&potentials)))
}


/// Multiply the potentials and sum out `variable`
pub fn multiply_and_eliminate<'a, I>(potentials: I, variable: &Variable) -> Result<TablePotential>
    where I: IntoIterator<Item = &'a TablePotential>
{
    let potentials: Vec<&TablePotential> = potentials.into_iter().collect();
    let keep: Vec<Variable> = union_of(&potentials).into_iter().filter(|v| v != variable).collect();
    multiply_and_marginalize(potentials, &keep)
}


/// `a` if it is NaN or larger than `b`. NaN is never hidden by a maximization.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a >= b {
        a
    } else {
        b
    }
}

/// Maximize `variable` out of the potential
pub fn maximize(potential: &TablePotential, variable: &Variable) -> TablePotential {
    match potential.variables().iter().position(|v| v == variable) {
        Some(i) => {
            let values = potential.values().fold_axis(Axis(i), f64::NEG_INFINITY, |&acc, &v| nan_max(acc, v));
            let variables = potential.variables().iter().filter(|v| *v != variable).cloned().collect();
            TablePotential {
                variables,
                values,
                role: potential.role(),
                utility_variable: potential.utility_variable().cloned(),
            }
        }
        None => potential.clone(),
    }
}


/// The maximum of a lane and the states within `MAX_ROUND_ERROR` of it
fn maximal_states(lane: ArrayView1<f64>, tie_break: TieBreak) -> (f64, Vec<usize>) {
    if let Some(state) = lane.iter().position(|v| v.is_nan()) {
        return (f64::NAN, vec![state]);
    }

    let best = lane.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut ties: Vec<usize> = Vec::new();
    for (state, &v) in lane.iter().enumerate() {
        if v == best || best - v <= MAX_ROUND_ERROR {
            ties.push(state);
        }
    }

    if tie_break == TieBreak::First {
        ties.truncate(1);
    }
    (best, ties)
}


/// Multiply the potentials and maximize over `decision`.
///
/// # Args
/// * `potentials`: the potentials to combine; at least one must contain `decision`
/// * `decision`: the variable to maximize out
/// * `tie_break`: how to share the policy between maximal states
///
/// # Returns
/// `(max, policy)`: the maximum over `decision` for each configuration of the remaining
/// variables, and the policy over `[decision, remaining...]` that puts all its mass on the
/// maximal states
///
/// # Errors
/// * `ProbNetError::InvalidScope` if no potential contains `decision`
pub fn multiply_and_maximize<'a, I>(potentials: I, decision: &Variable, tie_break: TieBreak)
    -> Result<(TablePotential, TablePotential)>
    where I: IntoIterator<Item = &'a TablePotential>
{
    let potentials: Vec<&TablePotential> = potentials.into_iter().collect();
    let union = union_of(&potentials);
    if !union.contains(decision) {
        return Err(ProbNetError::InvalidScope(format!("no potential contains {}", decision)));
    }

    let mut order = vec![decision.clone()];
    order.extend(union.into_iter().filter(|v| v != decision));
    let rest: Vec<Variable> = order[1..].to_vec();

    let mut joint = Table::ones(IxDyn(&shape_of(&order)));
    for p in potentials.iter() {
        joint *= &aligned(p.values().view(), p.variables(), &order)?;
    }

    let mut max = Table::zeros(IxDyn(&shape_of(&rest)));
    let mut policy = Table::zeros(IxDyn(&shape_of(&order)));

    Zip::from(joint.lanes(Axis(0)))
        .and(policy.lanes_mut(Axis(0)))
        .and(&mut max)
        .for_each(|lane, mut choice, m| {
            let (best, states) = maximal_states(lane, tie_break);
            let share = 1.0 / states.len() as f64;
            *m = best;
            for s in states {
                choice[s] = share;
            }
        });

    let max = TablePotential::new(rest, max, combined_role(&potentials))?
        .with_utility_variable(first_utility_variable(&potentials));
    let policy = TablePotential::new(order, policy, PotentialRole::Policy)?;

    Ok((max, policy))
}


/// Normalize a potential according to its role.
///
/// Joint probabilities and zero-variable potentials are divided by the sum of all their values.
/// Every other role is treated as a distribution over the first variable, normalized separately
/// for each configuration of the remaining variables.
///
/// # Errors
/// * `ProbNetError::NormalizeZeroVector` if a sum is exactly zero
pub fn normalize(potential: &TablePotential) -> Result<TablePotential> {
    let mut values = potential.values().clone();

    if potential.role() == PotentialRole::JointProbability || potential.variables().is_empty() {
        let total = values.sum();
        if total == 0.0 {
            return Err(ProbNetError::NormalizeZeroVector);
        }
        values /= total;
    } else {
        let mut zero = false;
        for mut lane in values.lanes_mut(Axis(0)) {
            let total = lane.sum();
            if total == 0.0 {
                zero = true;
                break;
            }
            lane /= total;
        }
        if zero {
            return Err(ProbNetError::NormalizeZeroVector);
        }
    }

    Ok(TablePotential {
        variables: potential.variables().to_vec(),
        values,
        role: potential.role(),
        utility_variable: potential.utility_variable().cloned(),
    })
}


/// Add a set of potentials, typically utilities.
///
/// # Returns
/// a utility potential over the union of the scopes. The sum of a single potential is that
/// potential, and the sum of none is the constant 0. The utility variable is kept only when
/// every input refers to the same one.
pub fn sum<'a, I>(potentials: I) -> Result<TablePotential>
    where I: IntoIterator<Item = &'a TablePotential>
{
    let potentials: Vec<&TablePotential> = potentials.into_iter().collect();
    if potentials.len() == 1 {
        return Ok(potentials[0].clone());
    }

    let variables = union_of(&potentials);
    let mut values = Table::zeros(IxDyn(&shape_of(&variables)));
    for p in potentials.iter() {
        values += &aligned(p.values().view(), p.variables(), &variables)?;
    }

    let utility_variable = match potentials.first().and_then(|p| p.utility_variable()) {
        Some(u) if potentials.iter().all(|p| p.utility_variable() == Some(u)) => Some(u.clone()),
        _ => None,
    };

    Ok(TablePotential::new(variables, values, PotentialRole::Utility)?.with_utility_variable(utility_variable))
}


/// Division of potentials. Calculates `psi(X, Y) = phi1(X, Y) / phi2(Y)`.
///
/// Defined in Koller & Friedman Section 10.3.1
///
/// # Notes
/// In the context of this operation, 0/0 is defined as 0. However, X/0, where X != 0, is still
/// undefined.
///
/// # Errors
/// * `ProbNetError::InvalidScope` if the scope of `denominator` is not contained in the scope of
///   `numerator`
/// * `ProbNetError::DivideByZero` if a nonzero value is divided by zero
pub fn divide(numerator: &TablePotential, denominator: &TablePotential) -> Result<TablePotential> {
    let den = aligned(denominator.values().view(), denominator.variables(), numerator.variables())?;
    let mut values = numerator.values().clone();
    let mut undefined = false;

    Zip::from(&mut values)
        .and_broadcast(&den)
        .for_each(|n, &d| {
            if d == 0.0 {
                if *n != 0.0 {
                    undefined = true;
                }
                *n = 0.0;
            } else {
                *n /= d;
            }
        });

    if undefined {
        return Err(ProbNetError::DivideByZero);
    }

    Ok(TablePotential {
        variables: numerator.variables().to_vec(),
        values,
        role: numerator.role(),
        utility_variable: numerator.utility_variable().cloned(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use itertools::iproduct;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use proptest::prelude::*;

    fn joint(vars: Vec<Variable>, values: Table) -> TablePotential {
        TablePotential::new(vars, values, PotentialRole::JointProbability).unwrap()
    }

    fn value_of(p: &TablePotential, pairs: &[(&Variable, usize)]) -> f64 {
        let mut assn = Assignment::new();
        for (v, s) in pairs {
            assn.set(v, *s);
        }
        p.value(&assn).unwrap()
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 4.3
    fn product() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");
        let c = Variable::binary("C");

        let phi1 = joint(vec![a.clone(), b.clone()], array![[0.5, 0.8], [0.1, 0.], [0.3, 0.9]].into_dyn());
        let phi2 = joint(vec![b.clone(), c.clone()], array![[0.5, 0.7], [0.1, 0.2]].into_dyn());

        let phi = multiply(vec![&phi1, &phi2]).unwrap();
        assert_eq!(phi.variables(), &[a.clone(), b.clone(), c.clone()]);

        let expected = Table::from_shape_vec(
            IxDyn(&[3, 2, 2]),
            vec![0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18]
        ).unwrap();

        for (x, y, z) in iproduct!(0..3, 0..2, 0..2) {
            assert_abs_diff_eq!(
                expected[[x, y, z].as_ref()],
                value_of(&phi, &[(&a, x), (&b, y), (&c, z)]),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn product_disjoint_and_empty() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let pa = joint(vec![a.clone()], array![0.3, 0.7].into_dyn());
        let pb = joint(vec![b.clone()], array![0.4, 0.6].into_dyn());

        let ab = multiply(vec![&pa, &pb]).unwrap();
        let expected = array![[0.12, 0.18], [0.28, 0.42]].into_dyn();
        for (x, y) in ab.values().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }

        let one = multiply(Vec::<&TablePotential>::new()).unwrap();
        assert_eq!(one.constant_value(), Some(1.0));

        let c = TablePotential::constant(2.0, PotentialRole::JointProbability);
        let scaled = multiply(vec![&pa, &c]).unwrap();
        assert_eq!(scaled.values(), &array![0.6, 1.4].into_dyn());
    }

    #[test]
    fn product_roles() {
        let a = Variable::binary("A");
        let u = Variable::binary("U");
        let p = TablePotential::from_vec(vec![a.clone()], vec![0.3, 0.7], PotentialRole::ConditionalProbability).unwrap();
        let util = TablePotential::utility(vec![a.clone()], vec![10.0, 20.0], &u).unwrap();

        let r = multiply(vec![&p, &util]).unwrap();
        assert_eq!(r.role(), PotentialRole::Utility);
        assert_eq!(r.utility_variable(), Some(&u));

        let r = multiply(vec![&p, &p]).unwrap();
        assert_eq!(r.role(), PotentialRole::ConditionalProbability);
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 9.7
    fn marginalize_sum() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");
        let c = Variable::binary("C");

        let table = Table::from_shape_vec(
            IxDyn(&[3, 2, 2]),
            vec![0.25, 0.35, 0.08, 0.16, 0.05, 0.07, 0., 0., 0.15, 0.21, 0.09, 0.18]
        ).unwrap();
        let phi = joint(vec![a.clone(), b.clone(), c.clone()], table);

        let m = marginalize(&phi, &[b.clone()]);
        assert_eq!(m.variables(), &[a.clone(), c.clone()]);
        let expected = array![[0.33, 0.51], [0.05, 0.07], [0.24, 0.39]].into_dyn();
        for (x, y) in iproduct!(0..3, 0..2) {
            assert_abs_diff_eq!(expected[[x, y].as_ref()], value_of(&m, &[(&a, x), (&c, y)]), epsilon = 1e-12);
        }

        // variables outside the scope are ignored
        let same = marginalize(&phi, &[Variable::binary("Z")]);
        assert_eq!(same, phi);

        let all = marginalize(&phi, &[a, b, c]);
        assert_abs_diff_eq!(all.constant_value().unwrap(), 1.59, epsilon = 1e-12);
    }

    #[test]
    fn fused_matches_two_step() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");
        let c = Variable::discrete("C", 4);

        let p1 = joint(vec![a.clone(), b.clone()], Table::random(IxDyn(&[3, 2]), Uniform::new(0., 1.)));
        let p2 = joint(vec![c.clone(), b.clone()], Table::random(IxDyn(&[4, 2]), Uniform::new(0., 1.)));
        let p3 = joint(vec![a.clone()], Table::random(IxDyn(&[3]), Uniform::new(0., 1.)));

        let fused = multiply_and_marginalize(vec![&p1, &p2, &p3], &[c.clone()]).unwrap();
        let two_step = marginalize(&multiply(vec![&p1, &p2, &p3]).unwrap(), &[a.clone(), b.clone()]);

        assert_eq!(fused.variables(), &[c.clone()]);
        for (x, y) in fused.values().iter().zip(two_step.values().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }

        let eliminated = multiply_and_eliminate(vec![&p1, &p2], &b).unwrap();
        assert_eq!(eliminated.variables(), &[a.clone(), c.clone()]);
        let expected = marginalize(&multiply(vec![&p1, &p2]).unwrap(), &[b]);
        for (x, y) in eliminated.values().iter().zip(expected.values().iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn maximize_keeps_nan() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let p = joint(vec![a.clone(), b.clone()], array![[1., f64::NAN], [3., 0.5]].into_dyn());

        let m = maximize(&p, &a);
        assert_eq!(m.variables(), &[b.clone()]);
        assert_eq!(m.values()[[0].as_ref()], 3.);
        assert!(m.values()[[1].as_ref()].is_nan());
    }

    #[test]
    fn maximize_with_policy() {
        let d = Variable::binary("D");
        let x = Variable::binary("X");
        let u = Variable::binary("U");

        // U(X, D)
        let util = TablePotential::utility(vec![x.clone(), d.clone()], vec![1., 5., 7., 2.], &u).unwrap();
        let (max, policy) = multiply_and_maximize(vec![&util], &d, TieBreak::Uniform).unwrap();

        assert_eq!(max.variables(), &[x.clone()]);
        assert_eq!(max.values(), &array![5., 7.].into_dyn());
        assert_eq!(max.role(), PotentialRole::Utility);
        assert_eq!(max.utility_variable(), Some(&u));

        assert_eq!(policy.variables(), &[d.clone(), x.clone()]);
        assert_eq!(policy.role(), PotentialRole::Policy);
        // policy[d][x]
        assert_eq!(policy.values(), &array![[0., 1.], [1., 0.]].into_dyn());
    }

    #[test]
    fn maximize_ties() {
        let d = Variable::discrete("D", 3);
        let u = Variable::binary("U");
        let util = TablePotential::utility(vec![d.clone()], vec![4., 4.000001, 1.], &u).unwrap();

        let (max, policy) = multiply_and_maximize(vec![&util], &d, TieBreak::Uniform).unwrap();
        assert_abs_diff_eq!(max.constant_value().unwrap(), 4.000001, epsilon = 1e-12);
        assert_eq!(policy.values(), &array![0.5, 0.5, 0.].into_dyn());

        let (_, policy) = multiply_and_maximize(vec![&util], &d, TieBreak::First).unwrap();
        assert_eq!(policy.values(), &array![1., 0., 0.].into_dyn());

        // ties are measured against the maximum, not against each other
        let chain = TablePotential::utility(vec![d.clone()], vec![0., 8e-6, 1.6e-5], &u).unwrap();
        let (max, policy) = multiply_and_maximize(vec![&chain], &d, TieBreak::Uniform).unwrap();
        assert_eq!(max.constant_value(), Some(1.6e-5));
        assert_eq!(policy.values(), &array![0., 0.5, 0.5].into_dyn());

        let other = Variable::binary("Other");
        assert!(multiply_and_maximize(vec![&util], &other, TieBreak::First).is_err());
    }

    #[test]
    fn normalize_by_role() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");

        let cpt = TablePotential::new(
            vec![b.clone(), a.clone()],
            array![[1., 3.], [3., 1.]].into_dyn(),
            PotentialRole::ConditionalProbability
        ).unwrap();
        let n = normalize(&cpt).unwrap();
        assert_eq!(n.values(), &array![[0.25, 0.75], [0.75, 0.25]].into_dyn());

        let j = joint(vec![a.clone(), b.clone()], array![[1., 3.], [3., 1.]].into_dyn());
        let n = normalize(&j).unwrap();
        assert_eq!(n.values(), &array![[0.125, 0.375], [0.375, 0.125]].into_dyn());

        let zero = joint(vec![a.clone()], array![0., 0.].into_dyn());
        assert_eq!(normalize(&zero), Err(ProbNetError::NormalizeZeroVector));

        // a single zero column is enough to fail a conditional normalization
        let partial = TablePotential::new(
            vec![b, a],
            array![[1., 0.], [3., 0.]].into_dyn(),
            PotentialRole::ConditionalProbability
        ).unwrap();
        assert_eq!(normalize(&partial), Err(ProbNetError::NormalizeZeroVector));
    }

    #[test]
    fn normalize_propagates_nan() {
        let a = Variable::binary("A");
        let p = joint(vec![a], array![f64::NAN, 1.].into_dyn());
        let n = normalize(&p).unwrap();
        assert!(n.values().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sum_utilities() {
        let a = Variable::binary("A");
        let b = Variable::binary("B");
        let u = Variable::binary("U");

        let ua = TablePotential::utility(vec![a.clone()], vec![1., 2.], &u).unwrap();
        let ub = TablePotential::utility(vec![b.clone()], vec![10., 20.], &u).unwrap();
        let k = TablePotential::constant(100., PotentialRole::Utility);

        let s = sum(vec![&ua, &ub, &k]).unwrap();
        assert_eq!(s.variables(), &[a.clone(), b.clone()]);
        assert_eq!(s.values(), &array![[111., 121.], [112., 122.]].into_dyn());
        assert_eq!(s.role(), PotentialRole::Utility);
        assert_eq!(s.utility_variable(), None);

        let s = sum(vec![&ua, &ub]).unwrap();
        assert_eq!(s.utility_variable(), Some(&u));

        assert_eq!(sum(vec![&ua]).unwrap(), ua);
        assert_eq!(sum(Vec::<&TablePotential>::new()).unwrap().constant_value(), Some(0.0));
    }

    #[test]
    /// Example taken from Koller & Friedman Figure 4.3
    fn divide_tables() {
        let a = Variable::discrete("A", 3);
        let b = Variable::binary("B");

        let phi1 = joint(vec![a.clone(), b.clone()], array![[0.5, 0.2], [0., 0.], [0.3, 0.45]].into_dyn());
        let phi2 = joint(vec![a.clone()], array![0.8, 0., 0.6].into_dyn());

        let phi = divide(&phi1, &phi2).unwrap();
        let expected = array![[0.625, 0.25], [0., 0.], [0.5, 0.75]].into_dyn();
        for (x, y) in phi.values().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }

        assert!(matches!(divide(&phi2, &phi1), Err(ProbNetError::InvalidScope(_))));

        let zeros = joint(vec![a], array![0., 0., 0.].into_dyn());
        assert_eq!(divide(&phi1, &zeros), Err(ProbNetError::DivideByZero));
    }

    fn arb_table(len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.01f64..10.0, len)
    }

    proptest! {
        #[test]
        fn multiply_commutes(x in arb_table(6), y in arb_table(4)) {
            let a = Variable::discrete("A", 3);
            let b = Variable::binary("B");
            let c = Variable::binary("C");

            let p = TablePotential::from_vec(vec![a.clone(), b.clone()], x, PotentialRole::JointProbability).unwrap();
            let q = TablePotential::from_vec(vec![c.clone(), b.clone()], y, PotentialRole::JointProbability).unwrap();

            let pq = multiply(vec![&p, &q]).unwrap();
            let qp = multiply(vec![&q, &p]).unwrap().reorder(pq.variables()).unwrap();

            for (l, r) in pq.values().iter().zip(qp.values().iter()) {
                prop_assert!((l - r).abs() < 1e-9);
            }
        }

        #[test]
        fn marginal_of_product_is_total(x in arb_table(6), y in arb_table(4)) {
            let a = Variable::discrete("A", 3);
            let b = Variable::binary("B");
            let c = Variable::binary("C");

            let p = TablePotential::from_vec(vec![a.clone(), b.clone()], x, PotentialRole::JointProbability).unwrap();
            let q = TablePotential::from_vec(vec![b.clone(), c.clone()], y, PotentialRole::JointProbability).unwrap();

            let pq = multiply(vec![&p, &q]).unwrap();
            let total = marginalize(&pq, &[a, b, c]).constant_value().unwrap();
            prop_assert!((total - pq.values().sum()).abs() < 1e-9);
        }

        #[test]
        fn multiply_associates(x in arb_table(2), y in arb_table(4), z in arb_table(6)) {
            let a = Variable::binary("A");
            let b = Variable::binary("B");
            let c = Variable::discrete("C", 3);

            let p = TablePotential::from_vec(vec![a.clone()], x, PotentialRole::JointProbability).unwrap();
            let q = TablePotential::from_vec(vec![a.clone(), b.clone()], y, PotentialRole::JointProbability).unwrap();
            let r = TablePotential::from_vec(vec![b.clone(), c.clone()], z, PotentialRole::JointProbability).unwrap();

            let left = multiply(vec![&multiply(vec![&p, &q]).unwrap(), &r]).unwrap();
            let right = multiply(vec![&p, &multiply(vec![&q, &r]).unwrap()]).unwrap()
                .reorder(left.variables())
                .unwrap();

            for (l, r) in left.values().iter().zip(right.values().iter()) {
                prop_assert!((l - r).abs() < 1e-9);
            }
        }

        #[test]
        fn normalize_is_idempotent(x in arb_table(6), conditional in any::<bool>()) {
            let a = Variable::discrete("A", 3);
            let b = Variable::binary("B");
            let role = if conditional { PotentialRole::ConditionalProbability } else { PotentialRole::JointProbability };
            let p = TablePotential::from_vec(vec![a, b], x, role).unwrap();

            let once = normalize(&p).unwrap();
            let twice = normalize(&once).unwrap();
            for (l, r) in once.values().iter().zip(twice.values().iter()) {
                prop_assert!((l - r).abs() < 1e-12);
            }
        }
    }
}
