//! Definition of the variable module
//!
//! A `Variable` represents a discrete (or numeric placeholder) dimension of a probabilistic
//! network. `Variable`s are cheap to clone; every clone shares the same underlying description.
//! Identity is by name and time slice, so two independently created `Variable`s with the same
//! name and slice are the same variable.

use crate::util::{ProbNetError, Result};

use itertools::Itertools;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;


/// The kind of values a `Variable` ranges over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableType {
    /// A finite set of named states
    FiniteStates,

    /// A finite set of states, each standing for an interval of a continuous domain
    Discretized,

    /// A numeric placeholder. It has a single state for the purpose of table layout.
    Numeric,
}


/// A named state of a `Variable`
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    name: String,

    /// Interval `[lower, upper)` covered by this state, for discretized variables
    interval: Option<(f64, f64)>,
}

impl State {

    pub fn new(name: &str) -> Self {
        State { name: String::from(name), interval: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Option<(f64, f64)> {
        self.interval
    }
}


#[derive(Debug)]
struct VariableData {
    name: String,
    states: Vec<State>,
    var_type: VariableType,
    time_slice: Option<u32>,
}


#[derive(Clone)]
pub struct Variable(Arc<VariableData>);


impl Variable {

    /// Construct a finite-states `Variable` with the given state names
    pub fn new(name: &str, states: &[&str]) -> Self {
        Variable(Arc::new(VariableData {
            name: String::from(name),
            states: states.iter().map(|s| State::new(s)).collect(),
            var_type: VariableType::FiniteStates,
            time_slice: None,
        }))
    }

    /// Construct a binary `Variable` with states `absent` and `present`
    pub fn binary(name: &str) -> Self {
        Variable::new(name, &["absent", "present"])
    }

    /// Construct a finite-states `Variable` with `count` states named `s0 .. s{count-1}`
    pub fn discrete(name: &str, count: usize) -> Self {
        let names: Vec<String> = (0..count).map(|i| format!("s{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        Variable::new(name, &refs)
    }

    /// Construct a discretized `Variable` from a list of interval limits.
    ///
    /// # Args
    /// * `name`: the name of the variable
    /// * `limits`: strictly increasing limits; state `i` covers `[limits[i], limits[i+1])`
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if fewer than two limits are given or they are not
    ///   strictly increasing
    pub fn discretized(name: &str, limits: &[f64]) -> Result<Self> {
        if limits.len() < 2 || limits.iter().tuple_windows().any(|(a, b)| a >= b) {
            return Err(ProbNetError::InvalidArgument(
                format!("limits of {} must be strictly increasing and contain at least two values", name)
            ));
        }

        let states = limits.iter()
                           .tuple_windows()
                           .map(|(&lo, &hi)| State { name: format!("[{}, {})", lo, hi), interval: Some((lo, hi)) })
                           .collect();

        Ok(Variable(Arc::new(VariableData {
            name: String::from(name),
            states,
            var_type: VariableType::Discretized,
            time_slice: None,
        })))
    }

    /// Construct a numeric placeholder `Variable`
    pub fn numeric(name: &str) -> Self {
        Variable(Arc::new(VariableData {
            name: String::from(name),
            states: vec![State::new(name)],
            var_type: VariableType::Numeric,
            time_slice: None,
        }))
    }

    /// Get a copy of this `Variable` placed in the given time slice
    pub fn in_time_slice(&self, slice: u32) -> Self {
        Variable(Arc::new(VariableData {
            name: self.0.name.clone(),
            states: self.0.states.clone(),
            var_type: self.0.var_type,
            time_slice: Some(slice),
        }))
    }

    /// The same variable one time slice earlier, if there is one
    pub fn previous_slice(&self) -> Option<Self> {
        match self.0.time_slice {
            Some(t) if t > 0 => Some(self.in_time_slice(t - 1)),
            _ => None,
        }
    }

    /// Get the name of the `Variable`, without its time slice
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn time_slice(&self) -> Option<u32> {
        self.0.time_slice
    }

    pub fn is_temporal(&self) -> bool {
        self.0.time_slice.is_some()
    }

    pub fn var_type(&self) -> VariableType {
        self.0.var_type
    }

    /// The number of states of the `Variable`
    pub fn num_states(&self) -> usize {
        self.0.states.len()
    }

    pub fn states(&self) -> &[State] {
        &self.0.states
    }

    /// Find the index of the state with the given name
    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.0.states.iter().position(|s| s.name == name)
    }

    /// Find the state whose interval contains `value`. Only meaningful for discretized variables.
    pub fn state_for_value(&self, value: f64) -> Option<usize> {
        self.0.states.iter().position(|s| match s.interval {
            Some((lo, hi)) => lo <= value && value < hi,
            None => false,
        })
    }

    /// Check that `state` is a valid state index of this `Variable`
    ///
    /// # Errors
    /// * `ProbNetError::InvalidState` otherwise
    pub fn check_state(&self, state: usize) -> Result<()> {
        if state < self.num_states() {
            Ok(())
        } else {
            Err(ProbNetError::InvalidState { variable: self.to_string(), state })
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name && self.0.time_slice == other.0.time_slice)
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
        self.0.time_slice.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.time_slice {
            Some(t) => write!(f, "{} [{}]", self.0.name, t),
            None => write!(f, "{}", self.0.name),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Variable({})", self)
    }
}


/// An assignment of state indices to some set of `Variable`s
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: HashMap<Variable, usize>,
}

impl Assignment {

    pub fn new() -> Self {
        Assignment { values: HashMap::new() }
    }

    /// Set the state of `var`, replacing any previous value
    pub fn set(&mut self, var: &Variable, state: usize) {
        self.values.insert(var.clone(), state);
    }

    pub fn get(&self, var: &Variable) -> Option<usize> {
        self.values.get(var).cloned()
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The state indices for `vars`, in order
    ///
    /// # Errors
    /// * `ProbNetError::IncompleteAssignment` naming the first unassigned variable
    pub fn indices(&self, vars: &[Variable]) -> Result<Vec<usize>> {
        vars.iter()
            .map(|v| self.get(v).ok_or_else(|| ProbNetError::IncompleteAssignment(v.to_string())))
            .collect()
    }
}


/// Enumerate every complete `Assignment` over `vars`. The last variable varies fastest, the same
/// convention used by the tables of `TablePotential`.
pub fn all_assignments(vars: &[Variable]) -> impl Iterator<Item = Assignment> {
    let vars: Vec<Variable> = vars.to_vec();
    let ranges: Vec<std::ops::Range<usize>> = vars.iter().map(|v| 0..v.num_states()).collect();
    let empty = ranges.is_empty();

    let configs: Box<dyn Iterator<Item = Vec<usize>>> = if empty {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new(ranges.into_iter().multi_cartesian_product())
    };

    configs.map(move |states| {
        let mut a = Assignment::new();
        for (v, s) in vars.iter().zip(states) {
            a.set(v, s);
        }
        a
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_by_name() {
        let a = Variable::binary("A");
        let a2 = Variable::new("A", &["x", "y", "z"]);
        let b = Variable::binary("B");

        assert_eq!(a, a2);
        assert_ne!(a, b);

        let set: HashSet<Variable> = vec![a.clone(), a2, b].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Variable::binary("A")));
    }

    #[test]
    fn time_slices() {
        let x0 = Variable::binary("X").in_time_slice(0);
        let x1 = x0.in_time_slice(1);

        assert_ne!(x0, x1);
        assert_eq!(x1.previous_slice(), Some(x0.clone()));
        assert_eq!(x0.previous_slice(), None);
        assert_eq!(x1.to_string(), "X [1]");
        assert!(x1.is_temporal());
        assert!(!Variable::binary("X").is_temporal());
    }

    #[test]
    fn states() {
        let v = Variable::new("Weather", &["sunny", "cloudy", "rainy"]);
        assert_eq!(v.num_states(), 3);
        assert_eq!(v.state_index("rainy"), Some(2));
        assert_eq!(v.state_index("snow"), None);
        assert!(v.check_state(2).is_ok());
        assert_eq!(
            v.check_state(3),
            Err(ProbNetError::InvalidState { variable: String::from("Weather"), state: 3 })
        );
        assert_eq!(Variable::discrete("D", 4).states()[3].name(), "s3");
    }

    #[test]
    fn discretized() {
        let v = Variable::discretized("T", &[0.0, 10.0, 20.0]).unwrap();
        assert_eq!(v.var_type(), VariableType::Discretized);
        assert_eq!(v.num_states(), 2);
        assert_eq!(v.state_for_value(15.0), Some(1));
        assert_eq!(v.state_for_value(25.0), None);
        assert!(Variable::discretized("T", &[1.0, 1.0]).is_err());
        assert!(Variable::discretized("T", &[1.0]).is_err());
    }

    #[test]
    fn numeric() {
        let v = Variable::numeric("Cost");
        assert_eq!(v.var_type(), VariableType::Numeric);
        assert_eq!(v.num_states(), 1);
    }

    #[test]
    fn assignments() {
        let a = Variable::binary("A");
        let b = Variable::discrete("B", 3);

        let all: Vec<Assignment> = all_assignments(&[a.clone(), b.clone()]).collect();
        assert_eq!(all.len(), 6);
        // last variable varies fastest
        assert_eq!(all[1].indices(&[a.clone(), b.clone()]).unwrap(), vec![0, 1]);
        assert_eq!(all[3].indices(&[a.clone(), b.clone()]).unwrap(), vec![1, 0]);

        assert_eq!(all_assignments(&[]).count(), 1);

        let mut partial = Assignment::new();
        partial.set(&a, 1);
        assert_eq!(
            partial.indices(&[a, b]),
            Err(ProbNetError::IncompleteAssignment(String::from("B")))
        );
    }
}
