//! # Sequence Processing
//!
//! [`LayerRecurrence`] folds one cell over time; [`StackedEncoder`] stacks
//! layers and threads each layer's full output sequence into the next.
//! **The encoder is the API most users want.**
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use lstmp::rnn::StackedEncoderConfig;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! let encoder = StackedEncoderConfig::new(16, 32)
//!     .with_num_layers(2)
//!     .with_use_peepholes(true)
//!     .with_proj_size(Some(8))
//!     .init::<Backend, _>(&mut rng, &device)
//!     .unwrap();
//!
//! // [seq_len=10, batch=4, features=16]
//! let input = Tensor::<Backend, 3>::zeros([10, 4, 16], &device);
//! let out = encoder.forward_zeros(input).unwrap();
//!
//! assert_eq!(out.output.dims(), [10, 4, 8]);
//! assert_eq!(out.hidden.dims(), [2, 4, 8]);
//! assert_eq!(out.cell.dims(), [2, 4, 32]);
//! ```
//!
//! ## Tensor Shapes
//!
//! Input is always **time-major**: `[seq_len, batch, features]`. Batch-first
//! input is not supported.
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | `input` | `[T, batch, input_size]` |
//! | `output` | `[T, batch, output_size]` |
//! | `hidden` | `[num_layers, batch, output_size]` |
//! | `cell` | `[num_layers, batch, hidden_size]` |
//!
//! ## Projection Across Layers
//!
//! When `proj_size` is set, every layer reports a `proj_size`-wide hidden
//! state, and every layer above the first is built to read exactly that width.
//!
//! ## Stateful Processing
//!
//! ```ignore
//! let out1 = encoder.forward(chunk1, encoder.zero_states(batch, &device))?;
//! let states = (0..encoder.num_layers()).filter_map(|l| out1.layer_state(l)).collect();
//! let out2 = encoder.forward(chunk2, states)?;
//! ```

pub mod encoder;
pub mod recurrence;

pub use encoder::{EncoderOutput, StackedEncoder, StackedEncoderConfig};
pub use recurrence::{LayerOutput, LayerRecurrence};
