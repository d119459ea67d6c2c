//! Canonical models based on independence of causal influence (ICI).
//!
//! An `IciPotential` describes `P(child | parents)` with one noisy channel per parent plus a leak.
//! Each parent `X_i` drives an auxiliary variable `Z_i` (with the states of the child) through
//! `P(Z_i | X_i)`; the leak `L` accounts for causes outside the model. The child is a
//! deterministic function of the auxiliary variables and the leak: their maximum for Noisy-MAX
//! (which includes Noisy-OR), their minimum for Noisy-MIN (Noisy-AND), and the sign of the net
//! increment for Tuning.

use super::ops::multiply_and_eliminate;
use super::{draw, PotentialRole, Table, TablePotential};
use crate::util::{ProbNetError, Result};
use crate::variable::{Assignment, Variable};

use indexmap::IndexMap;
use ndarray::{Dimension, IxDyn};
use rand::Rng;


/// Tuning models only apply to variables with three states: decrease, keep, increase
const TUNING_STATES: usize = 3;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IciFamily {
    /// Noisy-MAX, and Noisy-OR for binary variables
    Max,

    /// Noisy-MIN, and Noisy-AND for binary variables
    Min,

    /// Tuning: each cause pushes the child down, keeps it, or pushes it up
    Tuning,
}

impl IciFamily {

    pub fn name(self) -> &'static str {
        match self {
            IciFamily::Max => "NoisyMax",
            IciFamily::Min => "NoisyMin",
            IciFamily::Tuning => "Tuning",
        }
    }

    /// The leak distribution that makes the leak irrelevant to the combination function
    fn default_leaky(self, num_states: usize) -> Vec<f64> {
        let neutral = match self {
            IciFamily::Max => 0,
            IciFamily::Min => num_states - 1,
            IciFamily::Tuning => num_states / 2,
        };
        let mut leaky = vec![0.0; num_states];
        leaky[neutral] = 1.0;
        leaky
    }

    /// The deterministic function that maps the states of the auxiliary variables and the leak
    /// to the state of the child
    pub fn combine(self, causes: &[usize], num_states: usize) -> usize {
        match self {
            IciFamily::Max => causes.iter().cloned().max().unwrap_or(0),
            IciFamily::Min => causes.iter().cloned().min().unwrap_or(num_states - 1),
            IciFamily::Tuning => {
                let increment: isize = causes.iter().map(|&s| s as isize - 1).sum();
                if increment < 0 {
                    0
                } else if increment == 0 {
                    1
                } else {
                    2
                }
            }
        }
    }
}


/// A canonical ICI potential over `[child, parents...]`.
///
/// Parameters are copied on structural change: `add_variable` and `remove_variable` return a
/// new potential and leave `self` untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct IciPotential {
    family: IciFamily,

    /// The child first, then the parents
    variables: Vec<Variable>,

    /// `P(Z_i | X_i)` for each parent, stored as `params[parent_state * child_states + z_state]`
    noisy: IndexMap<Variable, Vec<f64>>,

    /// `P(L)`, one value per child state
    leaky: Vec<f64>,
}


impl IciPotential {

    /// Create an ICI potential with identity channels and a neutral leak
    ///
    /// # Args
    /// * `family`: the combination function
    /// * `variables`: the child followed by its parents
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if `variables` is empty, a variable has no states, or a
    ///   Tuning model has a variable without exactly three states
    /// * `ProbNetError::DuplicateVariable` if a variable appears twice
    pub fn new(family: IciFamily, variables: Vec<Variable>) -> Result<Self> {
        let child = variables.first()
                             .cloned()
                             .ok_or_else(|| ProbNetError::InvalidArgument(String::from("an ICI potential needs a child")))?;

        for (i, v) in variables.iter().enumerate() {
            if variables[..i].contains(v) {
                return Err(ProbNetError::DuplicateVariable(v.to_string()));
            }
            Self::check_family(family, v)?;
        }

        let noisy = variables[1..].iter()
                                  .map(|p| (p.clone(), identity_parameters(&child, p)))
                                  .collect();

        Ok(IciPotential {
            family,
            leaky: family.default_leaky(child.num_states()),
            variables,
            noisy,
        })
    }

    fn check_family(family: IciFamily, var: &Variable) -> Result<()> {
        if var.num_states() == 0 {
            return Err(ProbNetError::InvalidArgument(format!("{} has no states", var)));
        }
        if family == IciFamily::Tuning && var.num_states() != TUNING_STATES {
            return Err(ProbNetError::InvalidArgument(format!(
                "tuning models need variables with {} states, {} has {}",
                TUNING_STATES, var, var.num_states()
            )));
        }
        Ok(())
    }

    pub fn family(&self) -> IciFamily {
        self.family
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn child(&self) -> &Variable {
        &self.variables[0]
    }

    pub fn parents(&self) -> &[Variable] {
        &self.variables[1..]
    }

    pub fn noisy_parameters(&self, parent: &Variable) -> Option<&[f64]> {
        self.noisy.get(parent).map(|p| p.as_slice())
    }

    pub fn leaky_parameters(&self) -> &[f64] {
        &self.leaky
    }

    /// Set the channel parameters of `parent`.
    ///
    /// # Args
    /// * `parent`: one of the parents of the potential
    /// * `parameters`: `child_states * parent_states` values laid out as
    ///   `parameters[parent_state * child_states + child_state]`. Tuning models also accept the
    ///   four compact parameters `[c++, c+-, c-+, c--]`.
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` if `parent` is not a parent or the length is wrong
    pub fn set_noisy_parameters(&mut self, parent: &Variable, parameters: &[f64]) -> Result<()> {
        let child_states = self.child().num_states();
        let slot = self.noisy
                       .get_mut(parent)
                       .ok_or_else(|| ProbNetError::InvalidArgument(format!("{} is not a parent", parent)))?;

        let values = if self.family == IciFamily::Tuning && parameters.len() == 4 {
            let (cpp, cpm, cmp, cmm) = (parameters[0], parameters[1], parameters[2], parameters[3]);
            vec![
                cmm, 1.0 - cmp - cmm, cmp,
                0.0, 1.0, 0.0,
                cpm, 1.0 - cpp - cpm, cpp,
            ]
        } else if parameters.len() == child_states * parent.num_states() {
            parameters.to_vec()
        } else {
            return Err(ProbNetError::InvalidArgument(format!(
                "{} parameters given for the link {} -> {}; expected {}",
                parameters.len(), parent, self.variables[0], child_states * parent.num_states()
            )));
        };

        *slot = values;
        Ok(())
    }

    /// Set the leak distribution.
    ///
    /// # Errors
    /// * `ProbNetError::InvalidArgument` unless there is exactly one value per child state
    pub fn set_leaky_parameters(&mut self, parameters: &[f64]) -> Result<()> {
        if parameters.len() != self.child().num_states() {
            return Err(ProbNetError::InvalidArgument(format!(
                "{} leaky parameters given; {} has {} states",
                parameters.len(), self.child(), self.child().num_states()
            )));
        }
        self.leaky = parameters.to_vec();
        Ok(())
    }

    /// A new potential with `parent` added. The existing channels and the leak are kept and the
    /// new parent gets an identity channel.
    pub fn add_variable(&self, parent: &Variable) -> Result<Self> {
        if self.variables.contains(parent) {
            return Err(ProbNetError::DuplicateVariable(parent.to_string()));
        }
        Self::check_family(self.family, parent)?;

        let mut added = self.clone();
        added.variables.push(parent.clone());
        added.noisy.insert(parent.clone(), identity_parameters(self.child(), parent));
        Ok(added)
    }

    /// A new potential without `parent`. The remaining channels and the leak are kept.
    pub fn remove_variable(&self, parent: &Variable) -> Result<Self> {
        if !self.noisy.contains_key(parent) {
            return Err(ProbNetError::InvalidArgument(format!("{} is not a parent", parent)));
        }

        let mut removed = self.clone();
        removed.variables.retain(|v| v != parent);
        removed.noisy.shift_remove(parent);
        Ok(removed)
    }

    /// The auxiliary variable of the channel of `parent`
    fn auxiliary_variable(&self, parent: &Variable) -> Variable {
        with_child_states(&format!("z_{}_{}", parent, self.child()), self.child())
    }

    fn leaky_variable(&self) -> Variable {
        with_child_states(&format!("{}-leaky", self.child()), self.child())
    }

    /// The deterministic table `P(child | Z_1 .. Z_n, L)`
    fn f_function(&self, auxiliary: &[Variable], leak: &Variable) -> Result<TablePotential> {
        let child_states = self.child().num_states();
        let mut variables = vec![self.child().clone()];
        variables.extend(auxiliary.iter().cloned());
        variables.push(leak.clone());

        let shape: Vec<usize> = variables.iter().map(|v| v.num_states()).collect();
        let mut values = Table::zeros(IxDyn(&shape));
        for (idx, v) in values.indexed_iter_mut() {
            let states = idx.slice();
            if self.family.combine(&states[1..], child_states) == states[0] {
                *v = 1.0;
            }
        }

        TablePotential::new(variables, values, PotentialRole::ConditionalProbability)
    }

    /// Expand into the equivalent conditional probability table over `[child, parents...]`.
    ///
    /// The auxiliary variables are eliminated in parent order and the leak last, so the result
    /// is identical on every call.
    pub fn expand(&self) -> Result<TablePotential> {
        let child = self.child();
        let auxiliary: Vec<Variable> = self.parents().iter().map(|p| self.auxiliary_variable(p)).collect();
        let leak = self.leaky_variable();

        let mut result = self.f_function(&auxiliary, &leak)?;

        for (parent, z) in self.parents().iter().zip(auxiliary.iter()) {
            let params = &self.noisy[parent];
            let child_states = child.num_states();
            // params are indexed [parent][z]; the table is laid out [z][parent]
            let values = Table::from_shape_fn(IxDyn(&[child_states, parent.num_states()]), |idx| {
                params[idx[1] * child_states + idx[0]]
            });
            let channel = TablePotential::new(vec![z.clone(), parent.clone()], values, PotentialRole::ConditionalProbability)?;
            result = multiply_and_eliminate(vec![&result, &channel], z)?;
        }

        let leaky = TablePotential::from_vec(vec![leak.clone()], self.leaky.clone(), PotentialRole::ConditionalProbability)?;
        result = multiply_and_eliminate(vec![&result, &leaky], &leak)?;

        Ok(result.reorder(&self.variables)?.with_role(PotentialRole::ConditionalProbability))
    }

    /// Draw a state of the child given the parents' states in `assignment`: one draw per channel,
    /// one for the leak, then the combination function.
    ///
    /// # Errors
    /// * `ProbNetError::IncompleteAssignment` if a parent is unassigned
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, assignment: &Assignment) -> Result<usize> {
        let child_states = self.child().num_states();
        let mut causes = Vec::with_capacity(self.variables.len());

        for parent in self.parents() {
            let state = assignment.get(parent)
                                  .ok_or_else(|| ProbNetError::IncompleteAssignment(parent.to_string()))?;
            parent.check_state(state)?;
            let params = &self.noisy[parent][state * child_states..(state + 1) * child_states];
            causes.push(draw(rng, params.iter().cloned()));
        }
        causes.push(draw(rng, self.leaky.iter().cloned()));

        Ok(self.family.combine(&causes, child_states))
    }
}


/// Channel parameters where `Z` copies the parent's state, saturating at the last child state
fn identity_parameters(child: &Variable, parent: &Variable) -> Vec<f64> {
    let child_states = child.num_states();
    let mut params = vec![0.0; child_states * parent.num_states()];
    for p in 0..parent.num_states() {
        params[p * child_states + p.min(child_states - 1)] = 1.0;
    }
    params
}

fn with_child_states(name: &str, child: &Variable) -> Variable {
    let states: Vec<&str> = child.states().iter().map(|s| s.name()).collect();
    Variable::new(name, &states)
}
