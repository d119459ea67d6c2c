//! Observations over the `Variable`s of a network.

use crate::util::{ProbNetError, Result};
use crate::variable::{Assignment, Variable, VariableType};

use indexmap::IndexMap;


/// A single observation: a `Variable` fixed to one of its states.
#[derive(Clone, Debug, PartialEq)]
pub struct Finding {
    variable: Variable,
    state: usize,

    /// The observed value of a numeric or discretized variable, if any
    numerical_value: Option<f64>,
}

impl Finding {

    /// Create a `Finding` fixing `variable` to the state with index `state`
    ///
    /// # Errors
    /// * `ProbNetError::InvalidState` if `state` is out of range
    pub fn new(variable: &Variable, state: usize) -> Result<Self> {
        variable.check_state(state)?;
        Ok(Finding { variable: variable.clone(), state, numerical_value: None })
    }

    /// Create a `Finding` from a state name
    pub fn with_state_name(variable: &Variable, name: &str) -> Result<Self> {
        let state = variable.state_index(name)
                            .ok_or_else(|| ProbNetError::InvalidArgument(
                                format!("{} has no state named {}", variable, name)
                            ))?;
        Finding::new(variable, state)
    }

    /// Create a `Finding` from a numerical value. Discretized variables map the value to the
    /// interval that contains it; numeric variables use their single state.
    pub fn with_value(variable: &Variable, value: f64) -> Result<Self> {
        let state = match variable.var_type() {
            VariableType::Numeric => 0,
            VariableType::Discretized => variable.state_for_value(value).ok_or_else(|| {
                ProbNetError::InvalidArgument(format!("{} is outside the domain of {}", value, variable))
            })?,
            VariableType::FiniteStates => {
                return Err(ProbNetError::InvalidArgument(
                    format!("{} does not take numerical values", variable)
                ));
            }
        };

        Ok(Finding { variable: variable.clone(), state, numerical_value: Some(value) })
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn numerical_value(&self) -> Option<f64> {
        self.numerical_value
    }
}


/// A set of `Finding`s, at most one per `Variable`.
///
/// Findings keep their insertion order so that projections and iteration are reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvidenceCase {
    findings: IndexMap<Variable, Finding>,
}

impl EvidenceCase {

    pub fn new() -> Self {
        EvidenceCase { findings: IndexMap::new() }
    }

    /// Build an `EvidenceCase` from `(variable, state)` pairs
    pub fn from_states(pairs: &[(Variable, usize)]) -> Result<Self> {
        let mut evidence = EvidenceCase::new();
        for (var, state) in pairs {
            evidence.add_finding(Finding::new(var, *state)?)?;
        }
        Ok(evidence)
    }

    /// Add a `Finding`.
    ///
    /// # Errors
    /// * `ProbNetError::IncompatibleEvidence` if the variable already has a different finding
    pub fn add_finding(&mut self, finding: Finding) -> Result<()> {
        if let Some(existing) = self.findings.get(finding.variable()) {
            if existing.state != finding.state {
                return Err(ProbNetError::IncompatibleEvidence(format!(
                    "{} is already observed in state {}", finding.variable, existing.state
                )));
            }
            return Ok(());
        }

        self.findings.insert(finding.variable.clone(), finding);
        Ok(())
    }

    /// Replace the finding of a variable, or add it if the variable is not observed
    pub fn change_finding(&mut self, finding: Finding) {
        self.findings.insert(finding.variable.clone(), finding);
    }

    /// Remove the finding of `var`, returning it
    pub fn remove_finding(&mut self, var: &Variable) -> Option<Finding> {
        self.findings.shift_remove(var)
    }

    /// The observed state of `var`
    pub fn state(&self, var: &Variable) -> Option<usize> {
        self.findings.get(var).map(|f| f.state)
    }

    pub fn finding(&self, var: &Variable) -> Option<&Finding> {
        self.findings.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.findings.contains_key(var)
    }

    /// Check if any of `vars` is observed
    pub fn exists_evidence(&self, vars: &[Variable]) -> bool {
        vars.iter().any(|v| self.contains(v))
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.findings.keys().cloned().collect()
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.values()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Merge another `EvidenceCase` into this one.
    ///
    /// # Args
    /// * `other`: the evidence to merge
    /// * `overwrite`: if `true`, findings of `other` replace conflicting findings of `self`;
    ///   otherwise a conflict is an error
    ///
    /// # Errors
    /// * `ProbNetError::IncompatibleEvidence` on a conflict when `overwrite` is `false`. `self` is
    ///   left unchanged.
    pub fn fuse(&mut self, other: &EvidenceCase, overwrite: bool) -> Result<()> {
        if !overwrite {
            let conflict = other.findings()
                                .find_map(|f| self.state(&f.variable).filter(|&s| s != f.state).map(|s| (f, s)));
            if let Some((f, existing)) = conflict {
                return Err(ProbNetError::IncompatibleEvidence(format!(
                    "{} is observed in state {} and in state {}", f.variable, existing, f.state
                )));
            }
        }

        for finding in other.findings() {
            self.change_finding(finding.clone());
        }
        Ok(())
    }

    /// The findings as an `Assignment`
    pub fn to_assignment(&self) -> Assignment {
        let mut a = Assignment::new();
        for f in self.findings() {
            a.set(&f.variable, f.state);
        }
        a
    }
}
