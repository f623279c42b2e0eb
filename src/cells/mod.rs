//! # LSTM Cell Implementations
//!
//! Single-timestep cells. They process one `[batch, features]` slice at a time
//! and are driven across a sequence by [`LayerRecurrence`](crate::rnn::LayerRecurrence).
//!
//! ## Cell Types
//!
//! | Cell | Description |
//! |------|-------------|
//! | [`LstmCell`] | Standard LSTM |
//! | [`ProjLstmCell`] | LSTM with optional peepholes and output projection |
//! | [`LayerCell`] | Either of the above, chosen once per layer |
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | `input` | `[batch, input_size]` |
//! | `state.hidden` | `[batch, output_size]` |
//! | `state.cell` | `[batch, hidden_size]` |
//!
//! `output_size` equals `hidden_size` unless the cell projects, in which case
//! it is `proj_size`.
//!
//! ## Example
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use lstmp::cells::{LstmState, ProjLstmCellConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//! let mut rng = StdRng::seed_from_u64(0);
//!
//! let cell = ProjLstmCellConfig::new(16, 32)
//!     .with_use_peepholes(true)
//!     .with_proj_size(Some(8))
//!     .init::<Backend, _>(&mut rng, &device)
//!     .unwrap();
//!
//! let input = Tensor::<Backend, 2>::zeros([4, 16], &device);
//! let state = LstmState::zeros(4, 8, 32, &device);
//! let next = cell.step(input, state).unwrap();
//!
//! assert_eq!(next.hidden.dims(), [4, 8]);
//! assert_eq!(next.cell.dims(), [4, 32]);
//! ```

pub mod layer_cell;
pub mod lstm_cell;
pub mod params;
pub mod proj_lstm_cell;
pub mod state;

pub use layer_cell::{CellKind, LayerCell};
pub use lstm_cell::{LstmCell, LstmCellConfig};
pub use params::{CellDims, CellParameters, PeepholeParameters};
pub use proj_lstm_cell::{ProjLstmCell, ProjLstmCellConfig};
pub use state::LstmState;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// A cell that can be stepped through time.
pub trait RecurrentCell<B: Backend> {
    /// Width of the input features.
    fn input_size(&self) -> usize;

    /// Width of the cell state.
    fn hidden_size(&self) -> usize;

    /// Width of the reported hidden state.
    fn output_size(&self) -> usize;

    /// Advance one time step from `state`.
    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> Result<LstmState<B>>;
}
