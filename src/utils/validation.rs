//! Argument checks shared by commands whose flags clap cannot relate.

use crate::error::{Error, Result};

pub fn require<T>(opt: Option<T>, field: &str, message: &str) -> Result<T> {
    opt.ok_or_else(|| Error::validation_invalid_argument(field, message, None, None))
}

/// Require exactly one of two mutually exclusive sources to be set.
///
/// Used for commands that take either an explicit repository name or a
/// domain/project pair to look it up.
pub fn require_one_of<'a>(
    first: Option<&'a str>,
    first_field: &str,
    second: Option<(&'a str, &'a str)>,
    second_fields: &str,
) -> Result<Either<&'a str, (&'a str, &'a str)>> {
    match (first, second) {
        (Some(value), None) => Ok(Either::Left(value)),
        (None, Some(pair)) => Ok(Either::Right(pair)),
        (Some(_), Some(_)) => Err(Error::validation_invalid_argument(
            first_field,
            format!("Provide either --{} or {}, not both", first_field, second_fields),
            None,
            None,
        )),
        (None, None) => Err(Error::validation_missing_argument(vec![
            first_field.to_string(),
            second_fields.to_string(),
        ])),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}
