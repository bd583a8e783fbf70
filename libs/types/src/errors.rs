//! Error types for fixed-point arithmetic
//!
//! Every checked operation in `numeric` reports failure through `MathError`
//! instead of wrapping or panicking.

use thiserror::Error;

/// Fixed-point arithmetic errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,

    #[error("Division by zero")]
    DivisionByZero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_error_display() {
        assert_eq!(MathError::Overflow.to_string(), "Arithmetic overflow");
        assert_eq!(MathError::DivisionByZero.to_string(), "Division by zero");
    }
}
