//! Configuration of the inference engines.

pub use crate::potential::TieBreak;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;


/// The rule used to pick the next variable to eliminate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeuristicKind {
    /// The variable with the fewest neighbours in the interaction graph
    Simple,

    /// The variable whose elimination adds the fewest links to the interaction graph
    MinimalFillIn,
}

impl Default for HeuristicKind {
    fn default() -> Self {
        HeuristicKind::Simple
    }
}


/// When to check up front that the evidence has a non-zero probability
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvidenceCheck {
    /// Never. Incompatible evidence still fails during projection and normalization.
    Disabled,

    /// Only when the evidence leaves some chance or decision variable unobserved
    Shortcut,

    /// Before every posterior query
    Strict,
}

impl Default for EvidenceCheck {
    fn default() -> Self {
        EvidenceCheck::Disabled
    }
}


/// A flag shared between an engine and its caller to stop a long elimination.
///
/// The engine checks the flag once per eliminated variable and fails with
/// `ProbNetError::Cancelled` once it is set.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {

    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}


/// Options of an inference engine, built with consuming `with_*` methods:
///
/// ```
/// use probnet::inference::{HeuristicKind, InferenceOptions, TieBreak};
///
/// let options = InferenceOptions::new()
///     .with_heuristic(HeuristicKind::MinimalFillIn)
///     .with_tie_break(TieBreak::First);
/// assert_eq!(options.heuristic, HeuristicKind::MinimalFillIn);
/// ```
#[derive(Clone, Debug)]
pub struct InferenceOptions {
    pub heuristic: HeuristicKind,
    pub tie_break: TieBreak,
    pub evidence_check: EvidenceCheck,
    pub cancellation: Option<CancellationToken>,

    /// Number of samples drawn by the approximate engines
    pub sample_size: usize,
}

impl InferenceOptions {

    pub fn new() -> Self {
        InferenceOptions {
            heuristic: HeuristicKind::default(),
            tie_break: TieBreak::default(),
            evidence_check: EvidenceCheck::default(),
            cancellation: None,
            sample_size: 10_000,
        }
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicKind) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_evidence_check(mut self, evidence_check: EvidenceCheck) -> Self {
        self.evidence_check = evidence_check;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().map_or(false, |c| c.is_cancelled())
    }
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions::new()
    }
}
