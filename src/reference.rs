//! Comparison of quantized values against a reference produced elsewhere, typically by running
//! the same data through the hardware toolchain's own C++ simulation headers.
//!
//! Two checks are provided:
//!
//!   - [`check`], numerically: `|actual - expected| < 1.5 × 10^-d`, with `d` the number of
//!     decimal digits that the format's fractional bits can resolve ([`decimals`]);
//!   - [`check_fraction_bits`], textually: the bits after the radix point in the
//!     [`Repr::Binary`](crate::Repr::Binary) rendering must be identical.
//!
//! ```
//! # use soft_fixed::*;
//! let fmt: FixedFormat = "ap_fixed<8,5,AP_RND_CONV,AP_SAT>".parse()?;
//! let q = quantize_batch(&Batch::Sequence(vec![1.3, -2.2]), fmt)?;
//! let Batch::Sequence(q) = q else { unreachable!() };
//! reference::check(&q, &[1.25, -2.25])?;
//! reference::check_fraction_bits(&q, &["00001.010", "11101.110"])?;
//! # Ok::<(), soft_fixed::Error>(())
//! ```

use core::f64::consts::LOG10_2;

use crate::{Error, FixedFormat, QuantizedValue, Rendered, Repr, Result};

/// The number of decimal digits resolved by the fractional bits of `format`: `⌈log10(2^F)⌉`, or
/// 0 if `F <= 0`.
pub fn decimals(format: FixedFormat) -> u32 {
  let f = format.frac_bits();
  if f <= 0 {
    0
  } else {
    (f as f64 * LOG10_2).ceil() as u32
  }
}

/// The largest difference [`check`] accepts for a value of `format`: `1.5 × 10^-decimals`.
pub fn tolerance(format: FixedFormat) -> f64 {
  1.5 * 10f64.powi(-(decimals(format) as i32))
}

fn lengths(values: usize, reference: usize) -> Result<()> {
  if values == reference {
    Ok(())
  } else {
    Err(Error::LengthMismatch { expected: reference, got: values })
  }
}

/// Check `values[i]` against `reference[i]` for every `i`, each within the [`tolerance`] of its
/// own format. Fails with [`Error::LengthMismatch`] if the lengths differ, or with
/// [`Error::ReferenceMismatch`] at the first value out of tolerance. A NaN in the reference never
/// matches.
pub fn check(values: &[QuantizedValue], reference: &[f64]) -> Result<()> {
  lengths(values.len(), reference.len())?;
  for (index, (q, &expected)) in values.iter().zip(reference).enumerate() {
    let actual = q.to_f64();
    if !((actual - expected).abs() < tolerance(q.format())) {
      return Err(Error::ReferenceMismatch { index, expected: expected.to_string(), actual: actual.to_string() })
    }
  }
  tracing::debug!(values = values.len(), "values match the reference");
  Ok(())
}

/// Check the fractional bits of every value (the part after the `.` of its binary rendering)
/// against those of the corresponding reference string.
///
/// Values whose rendering has no `.` (formats with `F <= 0`) have no fractional bits and are
/// skipped. A reference string without a `.` never matches a value that has one.
pub fn check_fraction_bits<S: AsRef<str>>(values: &[QuantizedValue], reference: &[S]) -> Result<()> {
  lengths(values.len(), reference.len())?;
  let mut compared = 0_usize;
  for (index, (q, expected)) in values.iter().zip(reference).enumerate() {
    let Rendered::Text(actual) = q.render(Repr::Binary)? else { continue };
    let Some((_, bits)) = actual.split_once('.') else { continue };
    let expected = expected.as_ref();
    if expected.split_once('.').map(|(_, e)| e) != Some(bits) {
      return Err(Error::ReferenceMismatch { index, expected: expected.to_owned(), actual })
    }
    compared += 1;
  }
  tracing::debug!(values = values.len(), compared, "fraction bits match the reference");
  Ok(())
}
