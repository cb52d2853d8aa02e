use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::ZakatError;

/// Conversion of caller-supplied values into `Decimal` amounts.
///
/// Lets the public API accept `i64`, `f64`, `&str` and friends directly
/// without wrapping every argument in `dec!()` or `Decimal::from()`.
/// Non-finite floats and unparsable strings are rejected at the boundary.
pub trait IntoAmount {
    fn into_amount(self) -> Result<Decimal, ZakatError>;
}

impl IntoAmount for Decimal {
    fn into_amount(self) -> Result<Decimal, ZakatError> {
        Ok(self)
    }
}

macro_rules! impl_into_amount_int {
    ($($t:ty),*) => {
        $(
            impl IntoAmount for $t {
                fn into_amount(self) -> Result<Decimal, ZakatError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_amount_int!(i32, u32, i64, u64, isize, usize);

macro_rules! impl_into_amount_float {
    ($($t:ty),*) => {
        $(
            impl IntoAmount for $t {
                fn into_amount(self) -> Result<Decimal, ZakatError> {
                    Decimal::from_f64_retain(self as f64).ok_or_else(|| {
                        ZakatError::invalid_input("amount", format!("not a finite number: {}", self))
                    })
                }
            }
        )*
    };
}

impl_into_amount_float!(f32, f64);

impl IntoAmount for &str {
    fn into_amount(self) -> Result<Decimal, ZakatError> {
        Decimal::from_str(self)
            .map_err(|e| ZakatError::invalid_input("amount", format!("unparsable amount: {}", e)))
    }
}

impl IntoAmount for String {
    fn into_amount(self) -> Result<Decimal, ZakatError> {
        self.as_str().into_amount()
    }
}
