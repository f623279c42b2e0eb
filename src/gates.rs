//! Gate algebra shared by the LSTM cell variants.
//!
//! The pre-activation of every cell is a `[batch, 4 * hidden]` tensor holding
//! four contiguous blocks in the fixed order **input, forget, candidate,
//! output**. Biases and peephole terms are added positionally, so the order
//! must never change.
//!
//! ```text
//! i  = σ(a_i [+ c_{t-1} ⊙ w_ic])
//! f  = σ(a_f [+ c_{t-1} ⊙ w_fc])
//! g  = tanh(a_g)
//! c_t = f ⊙ c_{t-1} + i ⊙ g
//! o  = σ(a_o [+ c_t ⊙ w_oc])
//! h_t = o ⊙ tanh(c_t)
//! ```

use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Number of gate blocks in the pre-activation.
pub const NUM_GATES: usize = 4;

/// Computes `input·w_ih + prev_hidden·w_hh (+ bias)` as a `[batch, 4H]` tensor.
///
/// `bias` is the already-summed `bias_ih + bias_hh` vector, if the cell has one.
pub fn affine<B: Backend>(
    input: Tensor<B, 2>,
    prev_hidden: Tensor<B, 2>,
    weight_ih: Tensor<B, 2>,
    weight_hh: Tensor<B, 2>,
    bias: Option<Tensor<B, 1>>,
) -> Tensor<B, 2> {
    let z = input.matmul(weight_ih) + prev_hidden.matmul(weight_hh);
    match bias {
        Some(bias) => z + bias.unsqueeze::<2>(),
        None => z,
    }
}

/// The four `[batch, hidden]` pre-activation blocks of one step.
#[derive(Debug, Clone)]
pub struct GatePreActivations<B: Backend> {
    pub input: Tensor<B, 2>,
    pub forget: Tensor<B, 2>,
    pub candidate: Tensor<B, 2>,
    pub output: Tensor<B, 2>,
}

impl<B: Backend> GatePreActivations<B> {
    /// Split a `[batch, 4H]` affine result into its four H-wide blocks.
    pub fn split(affine: Tensor<B, 2>) -> Self {
        let chunks = affine.chunk(NUM_GATES, 1);
        Self {
            input: chunks[0].clone(),
            forget: chunks[1].clone(),
            candidate: chunks[2].clone(),
            output: chunks[3].clone(),
        }
    }
}

/// Peephole diagonals, each `[hidden]`.
#[derive(Debug, Clone)]
pub struct Peepholes<B: Backend> {
    pub input: Tensor<B, 1>,
    pub forget: Tensor<B, 1>,
    pub output: Tensor<B, 1>,
}

/// Activated gates of one step together with the new cell state.
#[derive(Debug, Clone)]
pub struct Gates<B: Backend> {
    /// Input gate `i`, in (0, 1).
    pub input: Tensor<B, 2>,
    /// Forget gate `f`, in (0, 1).
    pub forget: Tensor<B, 2>,
    /// Candidate `g`, in (-1, 1).
    pub candidate: Tensor<B, 2>,
    /// Output gate `o`, in (0, 1).
    pub output: Tensor<B, 2>,
    /// `c_t = f ⊙ c_{t-1} + i ⊙ g`
    pub cell: Tensor<B, 2>,
}

impl<B: Backend> Gates<B> {
    /// Plain LSTM gating with no peephole terms.
    pub fn standard(pre: GatePreActivations<B>, prev_cell: Tensor<B, 2>) -> Self {
        let input = activation::sigmoid(pre.input);
        let forget = activation::sigmoid(pre.forget);
        let candidate = pre.candidate.tanh();
        let cell = forget.clone() * prev_cell + input.clone() * candidate.clone();
        let output = activation::sigmoid(pre.output);

        Self {
            input,
            forget,
            candidate,
            output,
            cell,
        }
    }

    /// Peephole gating.
    ///
    /// Input and forget gates peek at the previous cell state; the output gate
    /// peeks at the freshly computed one.
    pub fn peephole(
        pre: GatePreActivations<B>,
        prev_cell: Tensor<B, 2>,
        peepholes: Peepholes<B>,
    ) -> Self {
        let input =
            activation::sigmoid(pre.input + prev_cell.clone() * peepholes.input.unsqueeze::<2>());
        let forget =
            activation::sigmoid(pre.forget + prev_cell.clone() * peepholes.forget.unsqueeze::<2>());
        let candidate = pre.candidate.tanh();
        let cell = forget.clone() * prev_cell + input.clone() * candidate.clone();
        let output =
            activation::sigmoid(pre.output + cell.clone() * peepholes.output.unsqueeze::<2>());

        Self {
            input,
            forget,
            candidate,
            output,
            cell,
        }
    }

    /// Unprojected hidden state `o ⊙ tanh(c_t)`.
    pub fn hidden(&self) -> Tensor<B, 2> {
        self.output.clone() * self.cell.clone().tanh()
    }
}
