//! # lstmp - Stacked LSTM with Peepholes and Projection
//!
//! Forward pass of a multi-layer LSTM encoder on the Burn framework.
//!
//! ## Features
//!
//! - **LSTM cell**: the standard four-gate cell (input, forget, candidate, output)
//! - **Peepholes**: cell state feeding the gate pre-activations
//! - **Projection**: a learned map shrinking the reported hidden state (LSTMP)
//! - **Stacking**: any number of layers over time-major sequences, with layer
//!   input widths derived from the layer below
//! - **Seeded init**: parameters drawn from a caller-supplied RNG
//!
//! ## Quick Start
//!
//! ```rust
//! use lstmp::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let encoder = StackedEncoderConfig::new(8, 16)
//!     .with_num_layers(2)
//!     .init::<Backend, _>(&mut StdRng::seed_from_u64(7), &device)
//!     .unwrap();
//!
//! let input = Tensor::<Backend, 3>::zeros([5, 2, 8], &device);
//! let out = encoder.forward_zeros(input).unwrap();
//! assert_eq!(out.output.dims(), [5, 2, 16]);
//! ```

pub mod cells;
pub mod error;
pub mod gates;
pub mod init;
pub mod rnn;

pub use error::{LstmError, Result};

pub mod prelude {
    pub use crate::cells::{
        CellKind, CellParameters, LayerCell, LstmCell, LstmCellConfig, LstmState, ProjLstmCell,
        ProjLstmCellConfig, RecurrentCell,
    };
    pub use crate::error::LstmError;
    pub use crate::rnn::{
        EncoderOutput, LayerOutput, LayerRecurrence, StackedEncoder, StackedEncoderConfig,
    };
}
