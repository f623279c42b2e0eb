//! Error types for LSTM construction and forward passes.

use thiserror::Error;

/// Result type alias for fallible LSTM operations.
pub type Result<T> = std::result::Result<T, LstmError>;

/// Errors raised while building or running cells, layers, and encoders.
///
/// Every error is raised synchronously at the point of detection. A failed
/// forward pass leaves no partial result behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LstmError {
    /// A dimension, flag, or supplied parameter does not describe a valid model.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A tensor handed to a forward method has the wrong shape.
    #[error("invalid shape for {context}: expected {expected:?}, got {actual:?}")]
    InvalidShape {
        /// What was being checked (e.g. `"prev_hidden"`).
        context: String,
        /// Expected dimensions.
        expected: Vec<usize>,
        /// Actual dimensions.
        actual: Vec<usize>,
    },
}

impl LstmError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub(crate) fn shape(context: impl Into<String>, expected: &[usize], actual: &[usize]) -> Self {
        Self::InvalidShape {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Fails with [`LstmError::InvalidShape`] unless `actual == expected`.
pub(crate) fn check_dims<const D: usize>(
    context: &str,
    expected: [usize; D],
    actual: [usize; D],
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LstmError::shape(context, &expected, &actual))
    }
}

/// Fails with [`LstmError::InvalidConfiguration`] when a size is zero.
pub(crate) fn require_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        Err(LstmError::config(format!("{name} must be positive, got 0")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dims() {
        assert!(check_dims("x", [2, 3], [2, 3]).is_ok());

        let err = check_dims("prev_cell", [2, 3], [2, 4]).unwrap_err();
        assert_eq!(
            err,
            LstmError::InvalidShape {
                context: "prev_cell".to_string(),
                expected: vec![2, 3],
                actual: vec![2, 4],
            }
        );
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("d_hidden", 1).is_ok());
        assert!(matches!(
            require_positive("d_hidden", 0),
            Err(LstmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = LstmError::shape("input", &[1, 2], &[1, 3]);
        assert_eq!(
            err.to_string(),
            "invalid shape for input: expected [1, 2], got [1, 3]"
        );
        let err = LstmError::config("proj_size must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: proj_size must be positive"
        );
    }
}
