use burn::config::Config;
use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::Rng;

use super::params::{param_from_matrix, param_from_vector, CellDims, CellParameters};
use super::state::LstmState;
use super::RecurrentCell;
use crate::error::check_dims;
use crate::gates::{affine, GatePreActivations, Gates};

/// Configuration for [`LstmCell`].
#[derive(Config, Debug)]
pub struct LstmCellConfig {
    /// Width of the input features
    pub d_input: usize,
    /// Number of hidden units
    pub d_hidden: usize,
    /// Whether the cell carries `bias_ih` and `bias_hh`
    #[config(default = true)]
    pub bias: bool,
}

impl LstmCellConfig {
    pub fn dims(&self) -> CellDims {
        CellDims {
            input_size: self.d_input,
            hidden_size: self.d_hidden,
            proj_size: None,
            use_peepholes: false,
            bias: self.bias,
        }
    }

    /// Create a cell with parameters drawn from `rng`.
    pub fn init<B: Backend, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        device: &B::Device,
    ) -> crate::Result<LstmCell<B>> {
        let params = CellParameters::uniform(&self.dims(), rng)?;
        self.init_with_parameters(&params, device)
    }

    /// Create a cell from explicit parameters.
    ///
    /// Fails with [`InvalidConfiguration`](crate::LstmError::InvalidConfiguration)
    /// when a parameter does not match the configured dimensions, or when
    /// peephole/projection weights are supplied (the basic cell has neither).
    pub fn init_with_parameters<B: Backend>(
        &self,
        params: &CellParameters,
        device: &B::Device,
    ) -> crate::Result<LstmCell<B>> {
        params.validate(&self.dims())?;

        tracing::debug!(
            d_input = self.d_input,
            d_hidden = self.d_hidden,
            bias = self.bias,
            "initialized LSTM cell"
        );

        Ok(LstmCell {
            input_size: self.d_input,
            hidden_size: self.d_hidden,
            weight_ih: param_from_matrix(&params.weight_ih, device),
            weight_hh: param_from_matrix(&params.weight_hh, device),
            bias_ih: params.bias_ih.as_ref().map(|b| param_from_vector(b, device)),
            bias_hh: params.bias_hh.as_ref().map(|b| param_from_vector(b, device)),
        })
    }
}

/// Standard LSTM cell.
///
/// Implements the equations of Zaremba et al. (2014):
/// - i = σ(x·W_ii + h·W_hi + b_i)
/// - f = σ(x·W_if + h·W_hf + b_f)
/// - g = tanh(x·W_ig + h·W_hg + b_g)
/// - o = σ(x·W_io + h·W_ho + b_o)
/// - c' = f ⊙ c + i ⊙ g
/// - h' = o ⊙ tanh(c')
///
/// Weights are stored input-major (`[in, 4 * hidden]`), gate blocks in the
/// order i, f, g, o.
#[derive(Module, Debug)]
pub struct LstmCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    weight_ih: Param<Tensor<B, 2>>,
    weight_hh: Param<Tensor<B, 2>>,
    bias_ih: Option<Param<Tensor<B, 1>>>,
    bias_hh: Option<Param<Tensor<B, 1>>>,
}

impl<B: Backend> LstmCell<B> {
    /// Get the input size
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the hidden size
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn has_bias(&self) -> bool {
        self.bias_ih.is_some()
    }

    fn bias(&self) -> Option<Tensor<B, 1>> {
        match (&self.bias_ih, &self.bias_hh) {
            (Some(b_ih), Some(b_hh)) => Some(b_ih.val() + b_hh.val()),
            _ => None,
        }
    }

    /// Compute the activated gates and the new cell state for one step.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, input_size]`
    /// * `state` - Previous state, both halves `[batch_size, hidden_size]`
    pub fn gates(&self, input: Tensor<B, 2>, state: &LstmState<B>) -> crate::Result<Gates<B>> {
        let batch_size = input.dims()[0];
        check_dims("input", [batch_size, self.input_size], input.dims())?;
        state.check(batch_size, self.hidden_size, self.hidden_size)?;

        let z = affine(
            input,
            state.hidden.clone(),
            self.weight_ih.val(),
            self.weight_hh.val(),
            self.bias(),
        );
        Ok(Gates::standard(
            GatePreActivations::split(z),
            state.cell.clone(),
        ))
    }

    /// Advance one time step.
    ///
    /// # Returns
    /// The new state, both halves `[batch_size, hidden_size]`
    pub fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> crate::Result<LstmState<B>> {
        let gates = self.gates(input, &state)?;
        let hidden = gates.hidden();
        Ok(LstmState::new(hidden, gates.cell))
    }
}

impl<B: Backend> RecurrentCell<B> for LstmCell<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn output_size(&self) -> usize {
        self.hidden_size
    }

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> crate::Result<LstmState<B>> {
        LstmCell::step(self, input, state)
    }
}
