//! Time recurrence for a single layer.
//!
//! Drives one cell across a time-major sequence, threading the running
//! `(hidden, cell)` state from step to step. Each step reads and overwrites
//! the running state, so steps run strictly in order.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{LstmState, RecurrentCell};
use crate::error::{LstmError, Result};

/// Per-step hidden outputs of one layer plus its final state.
#[derive(Debug, Clone)]
pub struct LayerOutput<B: Backend> {
    /// `T` tensors of shape `[batch, output_size]`, in time order
    pub outputs: Vec<Tensor<B, 2>>,
    /// Running state after the last step
    pub state: LstmState<B>,
}

impl<B: Backend> LayerOutput<B> {
    /// Number of time steps processed
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Stack the outputs into a `[T, batch, output_size]` tensor.
    ///
    /// Returns `None` for an empty sequence.
    pub fn stacked(&self) -> Option<Tensor<B, 3>> {
        if self.outputs.is_empty() {
            None
        } else {
            Some(Tensor::stack(self.outputs.clone(), 0))
        }
    }
}

/// Sequential fold of a cell over time.
#[derive(Debug, Clone, Copy)]
pub struct LayerRecurrence<'a, C> {
    cell: &'a C,
}

impl<'a, C> LayerRecurrence<'a, C> {
    pub fn new(cell: &'a C) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> &'a C {
        self.cell
    }

    /// Run over a time-major input of shape `[T, batch, input_size]`.
    ///
    /// # Arguments
    /// * `input` - Input sequence, time first
    /// * `initial_state` - State before step 0
    ///
    /// # Returns
    /// The `T` hidden outputs and the state after step `T - 1`. For `T = 0`
    /// the outputs are empty and the state is `initial_state` unchanged.
    pub fn run<B: Backend>(
        &self,
        input: Tensor<B, 3>,
        initial_state: LstmState<B>,
    ) -> Result<LayerOutput<B>>
    where
        C: RecurrentCell<B>,
    {
        let [seq_len, batch_size, features] = input.dims();
        if features != self.cell.input_size() {
            return Err(LstmError::shape(
                "input_sequence",
                &[seq_len, batch_size, self.cell.input_size()],
                &[seq_len, batch_size, features],
            ));
        }
        initial_state.check(batch_size, self.cell.output_size(), self.cell.hidden_size())?;

        // input[t, batch, features] -> [batch, features]
        let steps = (0..seq_len).map(|t| input.clone().narrow(0, t, 1).squeeze_dim::<2>(0));
        self.run_steps(steps, initial_state)
    }

    /// Run over an already split sequence of `[batch, input_size]` steps.
    pub fn run_steps<B, I>(&self, steps: I, initial_state: LstmState<B>) -> Result<LayerOutput<B>>
    where
        B: Backend,
        C: RecurrentCell<B>,
        I: IntoIterator<Item = Tensor<B, 2>>,
    {
        let steps = steps.into_iter();
        let mut outputs = Vec::with_capacity(steps.size_hint().0);
        let mut state = initial_state;

        for step_input in steps {
            state = self.cell.step(step_input, state)?;
            outputs.push(state.hidden.clone());
        }

        Ok(LayerOutput { outputs, state })
    }
}
