use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{check_dims, Result};

/// Running `(hidden, cell)` pair threaded through the time steps of one layer.
///
/// `hidden` is `[batch, output_size]` (the projection width when the owning
/// cell projects, else `hidden_size`); `cell` is always `[batch, hidden_size]`.
#[derive(Debug, Clone)]
pub struct LstmState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell: Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    pub fn new(hidden: Tensor<B, 2>, cell: Tensor<B, 2>) -> Self {
        Self { hidden, cell }
    }

    /// All-zero state for `batch_size` sequences.
    pub fn zeros(
        batch_size: usize,
        output_size: usize,
        hidden_size: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            hidden: Tensor::zeros([batch_size, output_size], device),
            cell: Tensor::zeros([batch_size, hidden_size], device),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.hidden.dims()[0]
    }

    /// Cut the state off from the autodiff graph.
    pub fn detach(self) -> Self {
        Self {
            hidden: self.hidden.detach(),
            cell: self.cell.detach(),
        }
    }

    /// Check both halves against the widths a cell expects.
    pub(crate) fn check(&self, batch_size: usize, output_size: usize, hidden_size: usize) -> Result<()> {
        check_dims("prev_hidden", [batch_size, output_size], self.hidden.dims())?;
        check_dims("prev_cell", [batch_size, hidden_size], self.cell.dims())
    }
}

impl<B: Backend> From<(Tensor<B, 2>, Tensor<B, 2>)> for LstmState<B> {
    fn from((hidden, cell): (Tensor<B, 2>, Tensor<B, 2>)) -> Self {
        Self::new(hidden, cell)
    }
}

impl<B: Backend> From<LstmState<B>> for (Tensor<B, 2>, Tensor<B, 2>) {
    fn from(state: LstmState<B>) -> Self {
        (state.hidden, state.cell)
    }
}
