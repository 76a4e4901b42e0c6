//! Checked arithmetic for token amounts.
//!
//! Every amount in the contract is an `i128` (the SEP-41 token unit). Sums and
//! differences use the checked operations below and surface
//! `OracleError::Overflow` instead of wrapping. Proportional payouts go through [`mul_div_floor`], which widens
//! the product to 256 bits so that `a * b` never overflows before the
//! division.

use soroban_sdk::{Env, I256};

use crate::error::OracleError;

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self, OracleError>;
    fn safe_sub(self, rhs: Self) -> Result<Self, OracleError>;
}

impl SafeMath for i128 {
    fn safe_add(self, rhs: Self) -> Result<Self, OracleError> {
        self.checked_add(rhs).ok_or(OracleError::Overflow)
    }

    fn safe_sub(self, rhs: Self) -> Result<Self, OracleError> {
        self.checked_sub(rhs).ok_or(OracleError::Overflow)
    }
}

impl SafeMath for u64 {
    fn safe_add(self, rhs: Self) -> Result<Self, OracleError> {
        self.checked_add(rhs).ok_or(OracleError::Overflow)
    }

    fn safe_sub(self, rhs: Self) -> Result<Self, OracleError> {
        self.checked_sub(rhs).ok_or(OracleError::Overflow)
    }
}

/// `floor(a * b / d)` for non-negative operands, multiplying before dividing.
///
/// The intermediate product is held in an `I256`, so only a quotient that
/// does not fit back into `i128` can fail with `Overflow`.
pub fn mul_div_floor(env: &Env, a: i128, b: i128, d: i128) -> Result<i128, OracleError> {
    if d == 0 {
        return Err(OracleError::DivisionByZero);
    }
    if a < 0 || b < 0 || d < 0 {
        return Err(OracleError::InvalidArgument);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }

    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    // Operands are non-negative, so truncating division is floor division.
    product
        .div(&I256::from_i128(env, d))
        .to_i128()
        .ok_or(OracleError::Overflow)
}
