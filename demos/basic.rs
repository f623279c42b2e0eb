//! Basic usage of the stacked LSTM encoder
//!
//! Builds a two-layer encoder from a seed and runs a time-major batch through it.
//! Run with `RUST_LOG=lstmp=debug` to see construction and forward-pass logs.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use lstmp::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> lstmp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== lstmp Basic Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();
    let mut rng = StdRng::seed_from_u64(12345);

    let encoder = StackedEncoderConfig::new(20, 50)
        .with_num_layers(2)
        .init::<Backend, _>(&mut rng, &device)?;

    println!("Created encoder:");
    println!("  Layers:      {}", encoder.num_layers());
    println!("  Input size:  {}", encoder.input_size());
    println!("  Hidden size: {}", encoder.hidden_size());
    println!();

    // [seq=10, batch=4, features=20]
    let input = Tensor::<Backend, 3>::random([10, 4, 20], Distribution::Uniform(-1.0, 1.0), &device);
    let out = encoder.forward_zeros(input)?;

    println!("  Input shape:        [10, 4, 20]");
    println!("  Output shape:       {:?}", out.output.dims());
    println!("  Final hidden shape: {:?}", out.hidden.dims());
    println!("  Final cell shape:   {:?}", out.cell.dims());
    println!();

    // Continue from where the first chunk stopped
    let states = (0..encoder.num_layers())
        .filter_map(|layer| out.layer_state(layer))
        .collect();
    let next_chunk = Tensor::<Backend, 3>::random([5, 4, 20], Distribution::Uniform(-1.0, 1.0), &device);
    let out2 = encoder.forward(next_chunk, states)?;
    println!("Continued with 5 more steps: {:?}", out2.output.dims());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
