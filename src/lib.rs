//! Exact and approximate inference over discrete Bayesian networks and influence diagrams.
//!
//! A network is assembled with a `network::ProbNetBuilder` from `Variable`s and `init`
//! specifications, then handed to an inference engine:
//!
//! * `inference::VariableElimination` computes posterior distributions, expected utilities, the
//!   optimal strategy of an influence diagram and its maximum expected utility;
//! * `inference::ImportanceSamplingEngine` approximates posterior distributions of a Bayesian
//!   network by likelihood weighting.
//!
//! ```
//! use probnet::evidence::EvidenceCase;
//! use probnet::inference::{InferenceOptions, VariableElimination};
//! use probnet::init::Initialization;
//! use probnet::network::ProbNetBuilder;
//! use probnet::variable::Variable;
//!
//! let a = Variable::binary("A");
//! let b = Variable::binary("B");
//! let net = ProbNetBuilder::new()
//!     .with_chance(&a, &[], Initialization::Binomial(0.7))
//!     .with_chance(&b, &[a.clone()], Initialization::Values(&[0.9, 0.2, 0.1, 0.8]))
//!     .build()
//!     .unwrap();
//!
//! let mut engine = VariableElimination::new(&net, InferenceOptions::new()).unwrap();
//! engine.set_post_resolution_evidence(EvidenceCase::from_states(&[(b.clone(), 1)]).unwrap()).unwrap();
//! let posterior = engine.probs_and_utilities(&[a.clone()]).unwrap();
//! assert!((posterior[&a].values()[[0].as_ref()] - 0.03 / 0.59).abs() < 1e-9);
//! ```

pub mod evidence;
pub mod inference;
pub mod init;
pub mod network;
pub mod potential;
pub mod samplers;
pub mod super_value;
pub mod util;
pub mod variable;

pub use util::{ProbNetError, Result};
