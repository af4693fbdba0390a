//! Parsing of the result-limit answer

use std::num::IntErrorKind;

use corpusstore::Limit;
use thiserror::Error;

/// Why a limit answer was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitInputError {
    #[error("Limit must be a positive number (e.g. 100).")]
    NotPositive,

    #[error("Invalid input. Please enter a number (e.g. 50) or the word all.")]
    NotANumber,
}

/// Parse `all` (any case) or a positive integer
pub fn parse_limit(input: &str) -> Result<Limit, LimitInputError> {
    let input = input.trim().to_lowercase();
    if input == "all" {
        return Ok(Limit::Unbounded);
    }

    match input.parse::<i64>() {
        Ok(n) if n <= 0 => Err(LimitInputError::NotPositive),
        Ok(n) => Ok(Limit::at_most(usize::try_from(n).unwrap_or(usize::MAX))),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Limit::at_most(usize::MAX)),
            IntErrorKind::NegOverflow => Err(LimitInputError::NotPositive),
            _ => Err(LimitInputError::NotANumber),
        },
    }
}
