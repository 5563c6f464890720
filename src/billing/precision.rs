//! Decimal Conversion and Fixed-Context Arithmetic
//!
//! All monetary math in the rollup engine flows through this module.
//! Floating-point inputs are converted to `Decimal` through their
//! round-trip textual form, and every multiply/add goes through a
//! [`DecimalContext`] that refuses to round: a result is exact or it is
//! an error.

use rust_decimal::Decimal;

use crate::error::{BillingError, Result};

/// Convert a float into an exact decimal.
///
/// The value is formatted with the round-trip `Display` form (the
/// shortest text that parses back to the same float) and parsed exactly,
/// so the decimal is byte-identical to the default textual formatting of
/// the input. Non-finite values and values outside the representable
/// range are rejected, never truncated.
pub fn decimal_from_f64(value: f64) -> Result<Decimal> {
    decimal_from_str(&value.to_string())
}

/// Parse text into an exact decimal, rejecting anything that cannot be
/// represented without loss.
pub fn decimal_from_str(value: &str) -> Result<Decimal> {
    Decimal::from_str_exact(value).map_err(|err| BillingError::Conversion {
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// Immutable precision/exponent configuration under which all spend
/// arithmetic runs.
///
/// Threaded explicitly through every call site instead of living in
/// global state, so the same bounds apply to every operation of a run
/// and results are reproducible bit for bit. The backing representation
/// carries 28 significant digits; the effective guard on any operation
/// is the stricter of that and the configured precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    /// Maximum significant digits a result may carry.
    pub precision: u32,
    /// Largest allowed adjusted exponent.
    pub max_exponent: i32,
    /// Smallest adjusted exponent before a result is out of range.
    pub min_exponent: i32,
}

/// The context every spend calculation uses.
pub const SPEND_CONTEXT: DecimalContext = DecimalContext {
    precision: 65,
    max_exponent: 65,
    min_exponent: -18,
};

impl Default for DecimalContext {
    fn default() -> Self {
        SPEND_CONTEXT
    }
}

impl DecimalContext {
    /// Multiply two decimals without rounding.
    ///
    /// An exact product keeps the combined fractional scale of its
    /// operands; a result with fewer fractional digits means digits were
    /// dropped to fit, which is reported as an arithmetic error instead.
    pub fn mul(&self, lhs: Decimal, rhs: Decimal) -> Result<Decimal> {
        let product = lhs.checked_mul(rhs).ok_or(BillingError::Arithmetic {
            operation: "multiply",
        })?;
        if product.scale() < lhs.scale() + rhs.scale() {
            return Err(BillingError::Arithmetic {
                operation: "multiply",
            });
        }
        self.check_bounds(&product, "multiply")?;
        Ok(product)
    }

    /// Add two decimals, with the same exact-or-error contract as
    /// [`DecimalContext::mul`].
    pub fn add(&self, lhs: Decimal, rhs: Decimal) -> Result<Decimal> {
        let sum = lhs
            .checked_add(rhs)
            .ok_or(BillingError::Arithmetic { operation: "add" })?;
        if sum.scale() < lhs.scale().max(rhs.scale()) {
            return Err(BillingError::Arithmetic { operation: "add" });
        }
        self.check_bounds(&sum, "add")?;
        Ok(sum)
    }

    fn check_bounds(&self, value: &Decimal, operation: &'static str) -> Result<()> {
        let digits = significant_digits(value);
        if digits > self.precision {
            return Err(BillingError::Arithmetic { operation });
        }
        let adjusted_exponent = digits as i32 - 1 - value.scale() as i32;
        if adjusted_exponent > self.max_exponent {
            return Err(BillingError::Arithmetic { operation });
        }
        if adjusted_exponent < self.min_exponent - (self.precision as i32 - 1) {
            return Err(BillingError::Arithmetic { operation });
        }
        Ok(())
    }
}

fn significant_digits(value: &Decimal) -> u32 {
    let mantissa = value.mantissa().unsigned_abs();
    if mantissa == 0 {
        1
    } else {
        mantissa.ilog10() + 1
    }
}
