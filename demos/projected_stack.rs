//! Peephole LSTM with projection (LSTMP)
//!
//! Every layer keeps a 64-wide cell state but reports (and feeds upward) a
//! 16-wide projected hidden state.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use lstmp::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> lstmp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Projected Peephole LSTM ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();
    let mut rng = StdRng::seed_from_u64(2014);

    let config = StackedEncoderConfig::new(40, 64)
        .with_num_layers(3)
        .with_use_peepholes(true)
        .with_proj_size(Some(16));
    println!("Config: {}", config);
    println!("Layer input widths: {:?}\n", config.layer_input_sizes());

    let encoder = config.init::<Backend, _>(&mut rng, &device)?;

    // [seq=25, batch=2, features=40]
    let input = Tensor::<Backend, 3>::random([25, 2, 40], Distribution::Uniform(-1.0, 1.0), &device);
    let out = encoder.forward_zeros(input)?;

    println!("  Output shape:       {:?}", out.output.dims());
    println!("  Final hidden shape: {:?}  (projected)", out.hidden.dims());
    println!("  Final cell shape:   {:?}  (never projected)", out.cell.dims());

    // A single cell, stepped by hand
    let cell = ProjLstmCellConfig::new(40, 64)
        .with_use_peepholes(true)
        .with_proj_size(Some(16))
        .init::<Backend, _>(&mut rng, &device)?;
    let gates = cell.gates(
        Tensor::<Backend, 2>::ones([1, 40], &device),
        &LstmState::zeros(1, 16, 64, &device),
    )?;
    println!(
        "\nSingle step: mean output gate {:.4}, mean forget gate {:.4}",
        gates.output.mean().into_scalar(),
        gates.forget.mean().into_scalar()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
