//! Defines the `WeightedSampler` trait - an object that can randomly sample weighted particles
//! from a network.

use crate::util::Result;
use crate::variable::Assignment;

pub mod likelihood;

pub use self::likelihood::LikelihoodWeightedSampler;


/// A sample (a full assignment) and the associated weight.
/// Used for likelihood weighting.
#[derive(Clone, Debug)]
pub struct WeightedSample(pub Assignment, pub f64);


pub trait WeightedSampler {

    /// Draw one weighted particle
    fn weighted_sample(&mut self) -> Result<WeightedSample>;

}
