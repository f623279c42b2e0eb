use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use super::lstm_cell::LstmCell;
use super::proj_lstm_cell::ProjLstmCell;
use super::state::LstmState;
use super::RecurrentCell;
use crate::error::Result;

/// Which cell variant an encoder builds for its layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Plain LSTM cell, no peepholes and no projection
    Basic,
    /// LSTM cell with optional peepholes and projection
    ProjectedPeephole,
}

/// One layer's cell: a closed set of variants fixed at construction.
#[derive(Module, Debug)]
pub enum LayerCell<B: Backend> {
    Basic(LstmCell<B>),
    ProjectedPeephole(ProjLstmCell<B>),
}

impl<B: Backend> LayerCell<B> {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Basic(_) => CellKind::Basic,
            Self::ProjectedPeephole(_) => CellKind::ProjectedPeephole,
        }
    }
}

impl<B: Backend> RecurrentCell<B> for LayerCell<B> {
    fn input_size(&self) -> usize {
        match self {
            Self::Basic(cell) => cell.input_size(),
            Self::ProjectedPeephole(cell) => cell.input_size(),
        }
    }

    fn hidden_size(&self) -> usize {
        match self {
            Self::Basic(cell) => cell.hidden_size(),
            Self::ProjectedPeephole(cell) => cell.hidden_size(),
        }
    }

    fn output_size(&self) -> usize {
        match self {
            Self::Basic(cell) => cell.hidden_size(),
            Self::ProjectedPeephole(cell) => cell.output_size(),
        }
    }

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> Result<LstmState<B>> {
        match self {
            Self::Basic(cell) => cell.step(input, state),
            Self::ProjectedPeephole(cell) => cell.step(input, state),
        }
    }
}

impl<B: Backend> From<LstmCell<B>> for LayerCell<B> {
    fn from(cell: LstmCell<B>) -> Self {
        Self::Basic(cell)
    }
}

impl<B: Backend> From<ProjLstmCell<B>> for LayerCell<B> {
    fn from(cell: ProjLstmCell<B>) -> Self {
        Self::ProjectedPeephole(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{LstmCellConfig, ProjLstmCellConfig};
    use burn::backend::NdArray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_layer_cell_dispatch() {
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(2);

        let basic: LayerCell<TestBackend> = LstmCellConfig::new(3, 5)
            .init(&mut rng, &device)
            .unwrap()
            .into();
        let proj: LayerCell<TestBackend> = ProjLstmCellConfig::new(3, 5)
            .with_proj_size(Some(2))
            .init(&mut rng, &device)
            .unwrap()
            .into();

        assert_eq!(basic.kind(), CellKind::Basic);
        assert_eq!(basic.output_size(), 5);
        assert_eq!(proj.kind(), CellKind::ProjectedPeephole);
        assert_eq!(proj.hidden_size(), 5);
        assert_eq!(proj.output_size(), 2);

        let input = Tensor::<TestBackend, 2>::ones([4, 3], &device);
        let next = proj
            .step(input, LstmState::zeros(4, 2, 5, &device))
            .unwrap();
        assert_eq!(next.hidden.dims(), [4, 2]);
        assert_eq!(next.cell.dims(), [4, 5]);
    }
}
