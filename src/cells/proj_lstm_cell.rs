//! LSTM cell with optional peephole connections and output projection.
//!
//! Follows Sak, Senior & Beaufays, "Long Short-Term Memory Recurrent Neural
//! Network Architectures for Large Scale Acoustic Modeling" (INTERSPEECH 2014).
//!
//! With peepholes the input and forget gates see the previous cell state and
//! the output gate sees the new one:
//!
//! ```text
//! i  = σ(a_i + c_{t-1} ⊙ w_ic)
//! f  = σ(a_f + c_{t-1} ⊙ w_fc)
//! g  = tanh(a_g)
//! c_t = f ⊙ c_{t-1} + i ⊙ g
//! o  = σ(a_o + c_t ⊙ w_oc)
//! h_t = (o ⊙ tanh(c_t)) · W_hm        // only when proj_size is set
//! ```
//!
//! The projected hidden state `[batch, proj_size]` is what the cell reports and
//! what it feeds back into its own recurrent weights. The cell state is never
//! projected and stays `[batch, hidden_size]`.

use burn::config::Config;
use burn::module::{Module, Param};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::Rng;

use super::params::{param_from_matrix, param_from_vector, CellDims, CellParameters};
use super::state::LstmState;
use super::RecurrentCell;
use crate::error::check_dims;
use crate::gates::{affine, GatePreActivations, Gates, Peepholes};

/// Configuration for [`ProjLstmCell`].
#[derive(Config, Debug)]
pub struct ProjLstmCellConfig {
    /// Width of the input features
    pub d_input: usize,
    /// Number of hidden units (cell state width)
    pub d_hidden: usize,
    /// Enable peephole connections from the cell state into the gates
    #[config(default = false)]
    pub use_peepholes: bool,
    /// Projection width of the reported hidden state, if any
    pub proj_size: Option<usize>,
    /// Whether the cell carries `bias_ih` and `bias_hh`
    #[config(default = true)]
    pub bias: bool,
}

impl ProjLstmCellConfig {
    pub fn dims(&self) -> CellDims {
        CellDims {
            input_size: self.d_input,
            hidden_size: self.d_hidden,
            proj_size: self.proj_size,
            use_peepholes: self.use_peepholes,
            bias: self.bias,
        }
    }

    /// Create a cell with parameters drawn from `rng`.
    ///
    /// Fails with [`InvalidConfiguration`](crate::LstmError::InvalidConfiguration)
    /// when any size is zero, including `proj_size = Some(0)`.
    pub fn init<B: Backend, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        device: &B::Device,
    ) -> crate::Result<ProjLstmCell<B>> {
        let params = CellParameters::uniform(&self.dims(), rng)?;
        self.init_with_parameters(&params, device)
    }

    /// Create a cell from explicit parameters, validated against this config.
    pub fn init_with_parameters<B: Backend>(
        &self,
        params: &CellParameters,
        device: &B::Device,
    ) -> crate::Result<ProjLstmCell<B>> {
        params.validate(&self.dims())?;

        tracing::debug!(
            d_input = self.d_input,
            d_hidden = self.d_hidden,
            use_peepholes = self.use_peepholes,
            proj_size = ?self.proj_size,
            "initialized projected LSTM cell"
        );

        let (weight_ic, weight_fc, weight_oc) = match &params.peepholes {
            Some(p) => (
                Some(param_from_vector(&p.weight_ic, device)),
                Some(param_from_vector(&p.weight_fc, device)),
                Some(param_from_vector(&p.weight_oc, device)),
            ),
            None => (None, None, None),
        };

        Ok(ProjLstmCell {
            input_size: self.d_input,
            hidden_size: self.d_hidden,
            proj_size: self.proj_size,
            weight_ih: param_from_matrix(&params.weight_ih, device),
            weight_hh: param_from_matrix(&params.weight_hh, device),
            bias_ih: params.bias_ih.as_ref().map(|b| param_from_vector(b, device)),
            bias_hh: params.bias_hh.as_ref().map(|b| param_from_vector(b, device)),
            weight_ic,
            weight_fc,
            weight_oc,
            weight_hm: params.weight_hm.as_ref().map(|w| param_from_matrix(w, device)),
        })
    }
}

/// LSTM cell with optional peepholes and projection.
///
/// Both extensions are fixed when the cell is built. With neither enabled the
/// cell computes exactly what [`LstmCell`](super::LstmCell) computes.
#[derive(Module, Debug)]
pub struct ProjLstmCell<B: Backend> {
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    #[module(skip)]
    proj_size: Option<usize>,
    weight_ih: Param<Tensor<B, 2>>,
    /// `[output_size, 4 * hidden_size]`
    weight_hh: Param<Tensor<B, 2>>,
    bias_ih: Option<Param<Tensor<B, 1>>>,
    bias_hh: Option<Param<Tensor<B, 1>>>,
    weight_ic: Option<Param<Tensor<B, 1>>>,
    weight_fc: Option<Param<Tensor<B, 1>>>,
    weight_oc: Option<Param<Tensor<B, 1>>>,
    weight_hm: Option<Param<Tensor<B, 2>>>,
}

impl<B: Backend> ProjLstmCell<B> {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn proj_size(&self) -> Option<usize> {
        self.proj_size
    }

    /// Width of the reported hidden state (`proj_size` or `hidden_size`)
    pub fn output_size(&self) -> usize {
        self.proj_size.unwrap_or(self.hidden_size)
    }

    pub fn use_peepholes(&self) -> bool {
        self.weight_ic.is_some()
    }

    fn bias(&self) -> Option<Tensor<B, 1>> {
        match (&self.bias_ih, &self.bias_hh) {
            (Some(b_ih), Some(b_hh)) => Some(b_ih.val() + b_hh.val()),
            _ => None,
        }
    }

    fn peepholes(&self) -> Option<Peepholes<B>> {
        match (&self.weight_ic, &self.weight_fc, &self.weight_oc) {
            (Some(ic), Some(fc), Some(oc)) => Some(Peepholes {
                input: ic.val(),
                forget: fc.val(),
                output: oc.val(),
            }),
            _ => None,
        }
    }

    /// Compute the activated gates and the new cell state for one step.
    ///
    /// `state.hidden` is `[batch, output_size]`, `state.cell` is
    /// `[batch, hidden_size]`.
    pub fn gates(&self, input: Tensor<B, 2>, state: &LstmState<B>) -> crate::Result<Gates<B>> {
        let batch_size = input.dims()[0];
        check_dims("input", [batch_size, self.input_size], input.dims())?;
        state.check(batch_size, self.output_size(), self.hidden_size)?;

        let z = affine(
            input,
            state.hidden.clone(),
            self.weight_ih.val(),
            self.weight_hh.val(),
            self.bias(),
        );
        let pre = GatePreActivations::split(z);
        let prev_cell = state.cell.clone();

        Ok(match self.peepholes() {
            Some(peepholes) => Gates::peephole(pre, prev_cell, peepholes),
            None => Gates::standard(pre, prev_cell),
        })
    }

    /// Advance one time step.
    ///
    /// # Returns
    /// New state with `hidden` of shape `[batch, output_size]` and `cell` of
    /// shape `[batch, hidden_size]`
    pub fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> crate::Result<LstmState<B>> {
        let gates = self.gates(input, &state)?;
        let raw_hidden = gates.hidden();

        let hidden = match &self.weight_hm {
            Some(weight_hm) => raw_hidden.matmul(weight_hm.val()),
            None => raw_hidden,
        };

        Ok(LstmState::new(hidden, gates.cell))
    }
}

impl<B: Backend> RecurrentCell<B> for ProjLstmCell<B> {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn output_size(&self) -> usize {
        ProjLstmCell::output_size(self)
    }

    fn step(&self, input: Tensor<B, 2>, state: LstmState<B>) -> crate::Result<LstmState<B>> {
        ProjLstmCell::step(self, input, state)
    }
}
