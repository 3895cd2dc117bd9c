//! Integer and decimal parsers.

use super::{ArgumentParser, ParseError};
use crate::dispatch::CommandContext;
use std::any::Any;
use std::marker::PhantomData;
use std::str::FromStr;

const INVALID_NUMBER: &str = "Invalid number";

/// Parses integers with Rust's standard literal grammar (`i32` by default).
///
/// An optional leading `+` or `-` is accepted; anything else that is not a
/// plain run of decimal digits, or that overflows `T`, fails with
/// "Invalid number".
pub struct IntegerParser<T = i32> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> IntegerParser<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for IntegerParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ArgumentParser for IntegerParser<T>
where
    T: FromStr + Any + Send + Sync,
{
    type Output = T;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<T, ParseError> {
        token
            .parse::<T>()
            .map_err(|_| ParseError::new(INVALID_NUMBER, token))
    }

    fn error_message(&self) -> &str {
        INVALID_NUMBER
    }
}

/// Floating point types accepted by [`DoubleParser`].
pub trait Decimal: FromStr + Copy + Any + Send + Sync {
    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
}

impl Decimal for f64 {
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
}

impl Decimal for f32 {
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }
    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
}

/// Parses decimal and scientific literals (`f64` by default).
///
/// The standard grammar also accepts `nan`, `inf` and `infinity`, and large
/// exponents overflow to infinity; all of these are rejected with dedicated
/// messages.
pub struct DoubleParser<T = f64> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DoubleParser<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DoubleParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Decimal> ArgumentParser for DoubleParser<T> {
    type Output = T;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<T, ParseError> {
        let value: T = token
            .parse()
            .map_err(|_| ParseError::new(INVALID_NUMBER, token))?;
        if value.is_nan() {
            return Err(ParseError::new("Number cannot be NaN", token));
        }
        if value.is_infinite() {
            return Err(ParseError::new("Number cannot be infinite", token));
        }
        Ok(value)
    }

    fn error_message(&self) -> &str {
        INVALID_NUMBER
    }
}
