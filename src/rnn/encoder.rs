//! Stacked (multi-layer) LSTM encoder.
//!
//! Layer `l + 1` consumes the complete output sequence of layer `l`; every
//! layer's final state is collected into stacked `[L, batch, _]` tensors.

use burn::config::Config;
use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use rand::Rng;

use super::recurrence::LayerRecurrence;
use crate::cells::{CellKind, LayerCell, LstmCellConfig, LstmState, ProjLstmCellConfig, RecurrentCell};
use crate::error::{require_positive, LstmError};

/// Configuration for [`StackedEncoder`].
#[derive(Config, Debug)]
pub struct StackedEncoderConfig {
    /// Input feature width of the first layer
    pub d_input: usize,
    /// Hidden units per layer
    pub d_hidden: usize,
    /// Number of stacked layers
    #[config(default = 1)]
    pub num_layers: usize,
    /// Enable peephole connections in every layer
    #[config(default = false)]
    pub use_peepholes: bool,
    /// Projection width of every layer's reported hidden state
    pub proj_size: Option<usize>,
    /// Whether every cell carries biases
    #[config(default = true)]
    pub bias: bool,
    /// Cell variant used for all layers
    #[config(default = "CellKind::ProjectedPeephole")]
    pub cell_kind: CellKind,
}

impl StackedEncoderConfig {
    /// Width of each layer's reported hidden state.
    pub fn output_size(&self) -> usize {
        self.proj_size.unwrap_or(self.d_hidden)
    }

    /// Input width of every layer, bottom first.
    ///
    /// Layer 0 reads `d_input`; every later layer reads what its predecessor
    /// reports, which is `proj_size` when projecting.
    pub fn layer_input_sizes(&self) -> Vec<usize> {
        (0..self.num_layers)
            .map(|layer| {
                if layer == 0 {
                    self.d_input
                } else {
                    self.output_size()
                }
            })
            .collect()
    }

    fn validate(&self) -> crate::Result<()> {
        require_positive("d_input", self.d_input)?;
        require_positive("d_hidden", self.d_hidden)?;
        require_positive("num_layers", self.num_layers)?;
        if let Some(p) = self.proj_size {
            require_positive("proj_size", p)?;
        }
        if self.cell_kind == CellKind::Basic && (self.use_peepholes || self.proj_size.is_some()) {
            return Err(LstmError::config(
                "the basic cell supports neither peepholes nor projection",
            ));
        }
        Ok(())
    }

    /// Build the encoder, drawing all parameters from `rng` layer by layer.
    pub fn init<B: Backend, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        device: &B::Device,
    ) -> crate::Result<StackedEncoder<B>> {
        self.validate()?;

        let mut layers = Vec::with_capacity(self.num_layers);
        for input_size in self.layer_input_sizes() {
            let cell: LayerCell<B> = match self.cell_kind {
                CellKind::Basic => LstmCellConfig::new(input_size, self.d_hidden)
                    .with_bias(self.bias)
                    .init(&mut *rng, device)?
                    .into(),
                CellKind::ProjectedPeephole => ProjLstmCellConfig::new(input_size, self.d_hidden)
                    .with_use_peepholes(self.use_peepholes)
                    .with_proj_size(self.proj_size)
                    .with_bias(self.bias)
                    .init(&mut *rng, device)?
                    .into(),
            };
            layers.push(cell);
        }

        StackedEncoder::from_cells(layers)
    }
}

/// Result of a full forward pass.
#[derive(Debug, Clone)]
pub struct EncoderOutput<B: Backend> {
    /// Top layer outputs, `[T, batch, output_size]`
    pub output: Tensor<B, 3>,
    /// Final hidden state of every layer, `[L, batch, output_size]`
    pub hidden: Tensor<B, 3>,
    /// Final cell state of every layer, `[L, batch, hidden_size]`
    pub cell: Tensor<B, 3>,
}

impl<B: Backend> EncoderOutput<B> {
    /// Final state of one layer, or `None` when `layer` is out of range.
    pub fn layer_state(&self, layer: usize) -> Option<LstmState<B>> {
        let [num_layers, batch, out] = self.hidden.dims();
        let [_, _, hidden] = self.cell.dims();
        if layer >= num_layers {
            return None;
        }
        Some(LstmState::new(
            self.hidden.clone().narrow(0, layer, 1).reshape([batch, out]),
            self.cell.clone().narrow(0, layer, 1).reshape([batch, hidden]),
        ))
    }
}

/// Multi-layer LSTM over time-major sequences.
///
/// # Type Parameters
/// * `B` - The backend type
#[derive(Module, Debug)]
pub struct StackedEncoder<B: Backend> {
    /// One cell per layer, bottom first
    layers: Vec<LayerCell<B>>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    hidden_size: usize,
    #[module(skip)]
    output_size: usize,
}

impl<B: Backend> StackedEncoder<B> {
    /// Assemble an encoder from explicit cells, bottom layer first.
    ///
    /// Fails with [`LstmError::InvalidConfiguration`] when the list is empty,
    /// when a layer's input width differs from its predecessor's output width,
    /// or when layers disagree on hidden or output width (the final states of
    /// all layers are stacked into one tensor).
    pub fn from_cells(layers: Vec<LayerCell<B>>) -> crate::Result<Self> {
        let first = layers
            .first()
            .ok_or_else(|| LstmError::config("an encoder needs at least one layer"))?;
        let input_size = first.input_size();
        let hidden_size = first.hidden_size();
        let output_size = first.output_size();

        for (idx, pair) in layers.windows(2).enumerate() {
            let (below, above) = (&pair[0], &pair[1]);
            if above.input_size() != below.output_size() {
                return Err(LstmError::config(format!(
                    "layer {} expects input width {}, but layer {} reports {}",
                    idx + 1,
                    above.input_size(),
                    idx,
                    below.output_size()
                )));
            }
        }
        for (idx, layer) in layers.iter().enumerate() {
            if layer.hidden_size() != hidden_size || layer.output_size() != output_size {
                return Err(LstmError::config(format!(
                    "layer {} has hidden/output width {}/{}, expected {}/{}",
                    idx,
                    layer.hidden_size(),
                    layer.output_size(),
                    hidden_size,
                    output_size
                )));
            }
        }

        tracing::debug!(
            num_layers = layers.len(),
            input_size,
            hidden_size,
            output_size,
            "built stacked LSTM encoder"
        );

        Ok(Self {
            layers,
            input_size,
            hidden_size,
            output_size,
        })
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Width of the top layer's outputs
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn layers(&self) -> &[LayerCell<B>] {
        &self.layers
    }

    /// Zero initial state for every layer.
    pub fn zero_states(&self, batch_size: usize, device: &B::Device) -> Vec<LstmState<B>> {
        self.layers
            .iter()
            .map(|layer| {
                LstmState::zeros(batch_size, layer.output_size(), layer.hidden_size(), device)
            })
            .collect()
    }

    /// Forward pass through all layers.
    ///
    /// # Arguments
    /// * `input` - Time-major input `[T, batch, input_size]`
    /// * `initial_states` - One state per layer, bottom first
    ///
    /// # Returns
    /// Top layer outputs and the stacked final states of every layer. Any
    /// error aborts the whole pass.
    pub fn forward(
        &self,
        input: Tensor<B, 3>,
        initial_states: Vec<LstmState<B>>,
    ) -> crate::Result<EncoderOutput<B>> {
        let [seq_len, batch_size, features] = input.dims();
        let _span = tracing::debug_span!(
            "stacked_encoder_forward",
            seq_len,
            batch_size,
            num_layers = self.layers.len()
        )
        .entered();

        if initial_states.len() != self.layers.len() {
            return Err(LstmError::shape(
                "initial_states",
                &[self.layers.len()],
                &[initial_states.len()],
            ));
        }
        if features != self.input_size {
            return Err(LstmError::shape(
                "input_sequence",
                &[seq_len, batch_size, self.input_size],
                &[seq_len, batch_size, features],
            ));
        }
        // No step runs for an empty sequence, so check every state up front.
        for (layer, state) in self.layers.iter().zip(&initial_states) {
            state.check(batch_size, layer.output_size(), layer.hidden_size())?;
        }

        let device = input.device();
        let mut layer_input: Vec<Tensor<B, 2>> = (0..seq_len)
            .map(|t| input.clone().narrow(0, t, 1).squeeze_dim::<2>(0))
            .collect();
        let mut final_hidden = Vec::with_capacity(self.layers.len());
        let mut final_cell = Vec::with_capacity(self.layers.len());

        for (idx, (layer, state)) in self.layers.iter().zip(initial_states).enumerate() {
            let out = LayerRecurrence::new(layer).run_steps(layer_input, state)?;
            tracing::trace!(layer = idx, steps = out.len(), "layer done");

            final_hidden.push(out.state.hidden);
            final_cell.push(out.state.cell);
            layer_input = out.outputs;
        }

        let output = if layer_input.is_empty() {
            Tensor::zeros([0, batch_size, self.output_size], &device)
        } else {
            Tensor::stack(layer_input, 0)
        };

        Ok(EncoderOutput {
            output,
            hidden: Tensor::stack(final_hidden, 0),
            cell: Tensor::stack(final_cell, 0),
        })
    }

    /// Forward pass starting every layer from a zero state.
    pub fn forward_zeros(&self, input: Tensor<B, 3>) -> crate::Result<EncoderOutput<B>> {
        let batch_size = input.dims()[1];
        let states = self.zero_states(batch_size, &input.device());
        self.forward(input, states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestBackend = NdArray<f32>;

    fn to_vec<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    fn encoder(config: &StackedEncoderConfig, seed: u64) -> StackedEncoder<TestBackend> {
        let mut rng = StdRng::seed_from_u64(seed);
        config.init(&mut rng, &Default::default()).unwrap()
    }

    #[test]
    fn test_encoder_creation() {
        let config = StackedEncoderConfig::new(10, 20).with_num_layers(3);
        let enc = encoder(&config, 1);

        assert_eq!(enc.num_layers(), 3);
        assert_eq!(enc.input_size(), 10);
        assert_eq!(enc.hidden_size(), 20);
        assert_eq!(enc.output_size(), 20);
        assert_eq!(config.layer_input_sizes(), vec![10, 20, 20]);
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(10, 20).with_num_layers(2), 1);

        let input = Tensor::<TestBackend, 3>::random([6, 4, 10], Distribution::Uniform(-1.0, 1.0), &device);
        let out = enc.forward_zeros(input).unwrap();

        assert_eq!(out.output.dims(), [6, 4, 20]);
        assert_eq!(out.hidden.dims(), [2, 4, 20]);
        assert_eq!(out.cell.dims(), [2, 4, 20]);
    }

    #[test]
    fn test_projected_stack_derives_layer_widths() {
        let device = Default::default();
        let config = StackedEncoderConfig::new(10, 16)
            .with_num_layers(3)
            .with_use_peepholes(true)
            .with_proj_size(Some(6));
        let enc = encoder(&config, 4);

        assert_eq!(config.layer_input_sizes(), vec![10, 6, 6]);
        assert_eq!(enc.output_size(), 6);

        let input = Tensor::<TestBackend, 3>::ones([5, 2, 10], &device);
        let out = enc.forward_zeros(input).unwrap();

        assert_eq!(out.output.dims(), [5, 2, 6]);
        assert_eq!(out.hidden.dims(), [3, 2, 6]);
        assert_eq!(out.cell.dims(), [3, 2, 16]);
    }

    #[test]
    fn test_top_output_ends_with_top_final_hidden() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(3, 4).with_num_layers(2), 8);

        let input = Tensor::<TestBackend, 3>::random([4, 2, 3], Distribution::Uniform(-1.0, 1.0), &device);
        let out = enc.forward_zeros(input).unwrap();

        let last_step: Tensor<TestBackend, 2> = out.output.clone().narrow(0, 3, 1).squeeze_dim(0);
        assert_eq!(to_vec(last_step), to_vec(out.layer_state(1).unwrap().hidden));
    }

    #[test]
    fn test_single_layer_matches_recurrence() {
        let device = Default::default();
        let enc = encoder(
            &StackedEncoderConfig::new(5, 7).with_use_peepholes(true),
            12,
        );

        let input = Tensor::<TestBackend, 3>::random([6, 3, 5], Distribution::Uniform(-1.0, 1.0), &device);
        let state = LstmState::new(
            Tensor::random([3, 7], Distribution::Uniform(-1.0, 1.0), &device),
            Tensor::random([3, 7], Distribution::Uniform(-1.0, 1.0), &device),
        );

        let out = enc.forward(input.clone(), vec![state.clone()]).unwrap();
        let single = LayerRecurrence::new(&enc.layers()[0])
            .run(input, state)
            .unwrap();

        assert_eq!(to_vec(out.output.clone()), to_vec(single.stacked().unwrap()));
        let final_state = out.layer_state(0).unwrap();
        assert!(out.layer_state(1).is_none());
        assert_eq!(to_vec(final_state.hidden), to_vec(single.state.hidden));
        assert_eq!(to_vec(final_state.cell), to_vec(single.state.cell));
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Default::default();
        let config = StackedEncoderConfig::new(4, 6)
            .with_num_layers(2)
            .with_proj_size(Some(3));
        let a = encoder(&config, 77);
        let b = encoder(&config, 77);

        let input = Tensor::<TestBackend, 3>::random([5, 2, 4], Distribution::Uniform(-1.0, 1.0), &device);
        let out_a1 = a.forward_zeros(input.clone()).unwrap();
        let out_a2 = a.forward_zeros(input.clone()).unwrap();
        let out_b = b.forward_zeros(input).unwrap();

        assert_eq!(to_vec(out_a1.output.clone()), to_vec(out_a2.output));
        assert_eq!(to_vec(out_a1.output), to_vec(out_b.output));
        assert_eq!(to_vec(out_a1.cell), to_vec(out_b.cell));
    }

    #[test]
    fn test_wrong_number_of_states() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(3, 4).with_num_layers(2), 0);

        let input = Tensor::<TestBackend, 3>::zeros([2, 1, 3], &device);
        let states = vec![LstmState::zeros(1, 4, 4, &device)];

        assert!(matches!(
            enc.forward(input, states),
            Err(LstmError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_empty_sequence_rejects_wrong_state_width() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(3, 4).with_num_layers(2), 0);

        let input = Tensor::<TestBackend, 3>::zeros([0, 2, 3], &device);
        let states = vec![
            LstmState::zeros(2, 9, 9, &device),
            LstmState::zeros(2, 9, 9, &device),
        ];

        assert!(matches!(
            enc.forward(input, states),
            Err(LstmError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_empty_sequence_rejects_batch_mismatch_across_layers() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(3, 4).with_num_layers(2), 0);

        let input = Tensor::<TestBackend, 3>::zeros([0, 2, 3], &device);
        let states = vec![
            LstmState::zeros(2, 4, 4, &device),
            LstmState::zeros(5, 4, 4, &device),
        ];

        assert!(matches!(
            enc.forward(input, states),
            Err(LstmError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_wrong_input_width() {
        let device = Default::default();
        let enc = encoder(&StackedEncoderConfig::new(3, 4), 0);

        let result = enc.forward_zeros(Tensor::<TestBackend, 3>::zeros([2, 1, 5], &device));
        assert!(matches!(result, Err(LstmError::InvalidShape { .. })));
    }

    #[test]
    fn test_invalid_configs() {
        let mut rng = StdRng::seed_from_u64(0);
        let device = Default::default();

        for config in [
            StackedEncoderConfig::new(3, 4).with_num_layers(0),
            StackedEncoderConfig::new(3, 0),
            StackedEncoderConfig::new(0, 4),
            StackedEncoderConfig::new(3, 4).with_proj_size(Some(0)),
            StackedEncoderConfig::new(3, 4)
                .with_cell_kind(CellKind::Basic)
                .with_use_peepholes(true),
        ] {
            let result = config.init::<TestBackend, _>(&mut rng, &device);
            assert!(
                matches!(result, Err(LstmError::InvalidConfiguration(_))),
                "config should be rejected: {}",
                config
            );
        }
    }

    #[test]
    fn test_from_cells_rejects_unchained_widths() {
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(0);
        let bottom = ProjLstmCellConfig::new(3, 8)
            .with_proj_size(Some(4))
            .init::<TestBackend, _>(&mut rng, &device)
            .unwrap();
        // expects the unprojected width
        let top = ProjLstmCellConfig::new(8, 8)
            .with_proj_size(Some(4))
            .init::<TestBackend, _>(&mut rng, &device)
            .unwrap();

        let result = StackedEncoder::from_cells(vec![bottom.into(), top.into()]);
        assert!(matches!(result, Err(LstmError::InvalidConfiguration(_))));

        assert!(matches!(
            StackedEncoder::<TestBackend>::from_cells(Vec::new()),
            Err(LstmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_basic_cell_kind() {
        let device = Default::default();
        let enc = encoder(
            &StackedEncoderConfig::new(3, 4)
                .with_num_layers(2)
                .with_cell_kind(CellKind::Basic),
            3,
        );

        assert!(enc.layers().iter().all(|l| l.kind() == CellKind::Basic));
        let out = enc
            .forward_zeros(Tensor::<TestBackend, 3>::ones([3, 2, 3], &device))
            .unwrap();
        assert_eq!(out.output.dims(), [3, 2, 4]);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = StackedEncoderConfig::new(12, 32)
            .with_num_layers(2)
            .with_use_peepholes(true)
            .with_proj_size(Some(8));

        let json = config.to_string();
        let restored = StackedEncoderConfig::load_binary(json.as_bytes()).unwrap();

        assert_eq!(restored.d_input, 12);
        assert_eq!(restored.num_layers, 2);
        assert!(restored.use_peepholes);
        assert_eq!(restored.proj_size, Some(8));
        assert_eq!(restored.cell_kind, CellKind::ProjectedPeephole);
    }
}
