//! Host-side LSTM parameters.
//!
//! [`CellParameters`] holds plain `ndarray` arrays so that weights can be
//! drawn from a seeded generator, handed in from another framework, or
//! written by hand in tests. Cells validate them against their declared
//! dimensions and turn them into Burn parameters once, at construction.

use burn::module::Param;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use ndarray::{Array1, Array2};
use rand::Rng;

use crate::error::{require_positive, LstmError, Result};
use crate::gates::NUM_GATES;
use crate::init::UniformInit;

/// Dimensions and structural flags of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDims {
    pub input_size: usize,
    pub hidden_size: usize,
    pub proj_size: Option<usize>,
    pub use_peepholes: bool,
    pub bias: bool,
}

impl CellDims {
    /// Width of the reported (and recurrent) hidden state.
    pub fn output_size(&self) -> usize {
        self.proj_size.unwrap_or(self.hidden_size)
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("input_size", self.input_size)?;
        require_positive("hidden_size", self.hidden_size)?;
        if let Some(p) = self.proj_size {
            require_positive("proj_size", p)?;
        }
        Ok(())
    }
}

/// The three peephole diagonals, each of length `hidden_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct PeepholeParameters {
    pub weight_ic: Array1<f32>,
    pub weight_fc: Array1<f32>,
    pub weight_oc: Array1<f32>,
}

/// All trainable values of one cell.
///
/// | field | shape |
/// |-------|-------|
/// | `weight_ih` | `[input_size, 4 * hidden_size]` |
/// | `weight_hh` | `[output_size, 4 * hidden_size]` |
/// | `bias_ih`, `bias_hh` | `[4 * hidden_size]` (both or neither) |
/// | `peepholes` | 3 × `[hidden_size]` |
/// | `weight_hm` | `[hidden_size, proj_size]` |
#[derive(Debug, Clone, PartialEq)]
pub struct CellParameters {
    pub weight_ih: Array2<f32>,
    pub weight_hh: Array2<f32>,
    pub bias_ih: Option<Array1<f32>>,
    pub bias_hh: Option<Array1<f32>>,
    pub peepholes: Option<PeepholeParameters>,
    pub weight_hm: Option<Array2<f32>>,
}

impl CellParameters {
    /// Draw every parameter from `U(-1/√H, 1/√H)`.
    ///
    /// Values are drawn in a fixed order (input weights, recurrent weights,
    /// peepholes, projection, biases), so a given seed always yields the same
    /// cell.
    pub fn uniform<R: Rng + ?Sized>(dims: &CellDims, rng: &mut R) -> Result<Self> {
        dims.validate()?;
        let init = UniformInit::for_hidden_size(dims.hidden_size);
        let gates = NUM_GATES * dims.hidden_size;

        let weight_ih = init.matrix(&mut *rng, dims.input_size, gates);
        let weight_hh = init.matrix(&mut *rng, dims.output_size(), gates);
        let peepholes = dims.use_peepholes.then(|| PeepholeParameters {
            weight_ic: init.vector(&mut *rng, dims.hidden_size),
            weight_fc: init.vector(&mut *rng, dims.hidden_size),
            weight_oc: init.vector(&mut *rng, dims.hidden_size),
        });
        let weight_hm = dims
            .proj_size
            .map(|p| init.matrix(&mut *rng, dims.hidden_size, p));
        let (bias_ih, bias_hh) = if dims.bias {
            (Some(init.vector(&mut *rng, gates)), Some(init.vector(&mut *rng, gates)))
        } else {
            (None, None)
        };

        Ok(Self {
            weight_ih,
            weight_hh,
            bias_ih,
            bias_hh,
            peepholes,
            weight_hm,
        })
    }

    /// All-zero parameters with the layout `dims` describes.
    pub fn zeros(dims: &CellDims) -> Result<Self> {
        dims.validate()?;
        let gates = NUM_GATES * dims.hidden_size;
        let h = dims.hidden_size;

        Ok(Self {
            weight_ih: Array2::zeros((dims.input_size, gates)),
            weight_hh: Array2::zeros((dims.output_size(), gates)),
            bias_ih: dims.bias.then(|| Array1::zeros(gates)),
            bias_hh: dims.bias.then(|| Array1::zeros(gates)),
            peepholes: dims.use_peepholes.then(|| PeepholeParameters {
                weight_ic: Array1::zeros(h),
                weight_fc: Array1::zeros(h),
                weight_oc: Array1::zeros(h),
            }),
            weight_hm: dims.proj_size.map(|p| Array2::zeros((h, p))),
        })
    }

    /// Check every array against `dims`, including which optional parts exist.
    pub fn validate(&self, dims: &CellDims) -> Result<()> {
        dims.validate()?;
        let gates = NUM_GATES * dims.hidden_size;

        check_matrix("weight_ih", &self.weight_ih, (dims.input_size, gates))?;
        check_matrix("weight_hh", &self.weight_hh, (dims.output_size(), gates))?;

        match (&self.bias_ih, &self.bias_hh, dims.bias) {
            (Some(b_ih), Some(b_hh), true) => {
                check_vector("bias_ih", b_ih, gates)?;
                check_vector("bias_hh", b_hh, gates)?;
            }
            (None, None, false) => {}
            (None, None, true) => return Err(LstmError::config("bias enabled but no biases given")),
            (Some(_), Some(_), false) => {
                return Err(LstmError::config("biases given but bias disabled"))
            }
            _ => {
                return Err(LstmError::config(
                    "bias_ih and bias_hh must be given together",
                ))
            }
        }

        match (&self.peepholes, dims.use_peepholes) {
            (Some(p), true) => {
                check_vector("weight_ic", &p.weight_ic, dims.hidden_size)?;
                check_vector("weight_fc", &p.weight_fc, dims.hidden_size)?;
                check_vector("weight_oc", &p.weight_oc, dims.hidden_size)?;
            }
            (None, false) => {}
            (None, true) => {
                return Err(LstmError::config(
                    "peepholes enabled but no peephole weights given",
                ))
            }
            (Some(_), false) => {
                return Err(LstmError::config(
                    "peephole weights given but peepholes disabled",
                ))
            }
        }

        match (&self.weight_hm, dims.proj_size) {
            (Some(w), Some(p)) => check_matrix("weight_hm", w, (dims.hidden_size, p))?,
            (None, None) => {}
            (None, Some(_)) => {
                return Err(LstmError::config("proj_size set but no weight_hm given"))
            }
            (Some(_), None) => {
                return Err(LstmError::config("weight_hm given but proj_size unset"))
            }
        }

        Ok(())
    }
}

fn check_matrix(name: &str, arr: &Array2<f32>, expected: (usize, usize)) -> Result<()> {
    if arr.dim() == expected {
        Ok(())
    } else {
        Err(LstmError::config(format!(
            "{name} has shape {:?}, expected {:?}",
            arr.dim(),
            expected
        )))
    }
}

fn check_vector(name: &str, arr: &Array1<f32>, expected: usize) -> Result<()> {
    if arr.len() == expected {
        Ok(())
    } else {
        Err(LstmError::config(format!(
            "{name} has length {}, expected {}",
            arr.len(),
            expected
        )))
    }
}

/// Convert a host matrix into a Burn parameter (row-major).
pub(crate) fn param_from_matrix<B: Backend>(
    arr: &Array2<f32>,
    device: &B::Device,
) -> Param<Tensor<B, 2>> {
    let (rows, cols) = arr.dim();
    let data: Vec<f32> = arr.iter().copied().collect();
    let tensor: Tensor<B, 2> =
        Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([rows, cols]);
    Param::from_tensor(tensor)
}

/// Convert a host vector into a Burn parameter.
pub(crate) fn param_from_vector<B: Backend>(
    arr: &Array1<f32>,
    device: &B::Device,
) -> Param<Tensor<B, 1>> {
    let data: Vec<f32> = arr.iter().copied().collect();
    Param::from_tensor(Tensor::<B, 1>::from_floats(data.as_slice(), device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dims(proj_size: Option<usize>, use_peepholes: bool) -> CellDims {
        CellDims {
            input_size: 3,
            hidden_size: 4,
            proj_size,
            use_peepholes,
            bias: true,
        }
    }

    #[test]
    fn test_uniform_layout() {
        let d = dims(Some(2), true);
        let params = CellParameters::uniform(&d, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(params.weight_ih.dim(), (3, 16));
        // recurrent input is the projected hidden
        assert_eq!(params.weight_hh.dim(), (2, 16));
        assert_eq!(params.weight_hm.as_ref().unwrap().dim(), (4, 2));
        assert_eq!(params.peepholes.as_ref().unwrap().weight_oc.len(), 4);
        assert!(params.validate(&d).is_ok());

        // U(-1/2, 1/2) for H = 4
        assert!(params.weight_ih.iter().all(|x| x.abs() <= 0.5));
        assert!(params.bias_hh.as_ref().unwrap().iter().all(|x| x.abs() <= 0.5));
    }

    #[test]
    fn test_uniform_is_seeded() {
        let d = dims(None, false);
        let a = CellParameters::uniform(&d, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = CellParameters::uniform(&d, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_rejects_wrong_shapes() {
        let d = dims(None, false);
        let mut params = CellParameters::zeros(&d).unwrap();
        params.weight_hh = Array2::zeros((3, 16));

        assert!(matches!(
            params.validate(&d),
            Err(LstmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_parts() {
        let params = CellParameters::zeros(&dims(None, false)).unwrap();

        assert!(params.validate(&dims(Some(2), false)).is_err());
        assert!(params.validate(&dims(None, true)).is_err());

        let mut half_bias = params.clone();
        half_bias.bias_hh = None;
        assert!(half_bias.validate(&dims(None, false)).is_err());
    }

    #[test]
    fn test_zero_proj_size_rejected() {
        let d = dims(Some(0), false);
        assert!(matches!(
            CellParameters::uniform(&d, &mut StdRng::seed_from_u64(0)),
            Err(LstmError::InvalidConfiguration(_))
        ));
    }
}
