//! Parameter initialization from an explicit random source.
//!
//! Every LSTM parameter is drawn uniformly from `[-1/√H, 1/√H]`, where `H` is
//! the hidden size of the owning cell. Callers pass the generator in, so
//! initialization is reproducible from a seed and never touches global state.

use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Half-width of the initialization interval for a cell with `hidden_size` units.
pub fn uniform_bound(hidden_size: usize) -> f32 {
    1.0 / (hidden_size as f32).sqrt()
}

/// Uniform sampler over `[-bound, bound]`.
#[derive(Debug, Clone, Copy)]
pub struct UniformInit {
    dist: Uniform<f32>,
}

impl UniformInit {
    pub fn new(bound: f32) -> Self {
        Self {
            dist: Uniform::new_inclusive(-bound, bound),
        }
    }

    /// Sampler with the standard LSTM bound for `hidden_size` units.
    pub fn for_hidden_size(hidden_size: usize) -> Self {
        Self::new(uniform_bound(hidden_size))
    }

    pub fn matrix<R: Rng + ?Sized>(&self, rng: &mut R, rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_simple_fn((rows, cols), || self.dist.sample(&mut *rng))
    }

    pub fn vector<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> Array1<f32> {
        Array1::from_shape_simple_fn(len, || self.dist.sample(&mut *rng))
    }
}
