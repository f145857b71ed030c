//! This module and its submodules contain the quantization engine: turning an `f64` into the raw
//! integer of a [`FixedFormat`], bit-exactly, under any of its rounding and overflow modes, and
//! turning that raw integer back into text or numbers.
//!
//! The pipeline for one value is:
//!
//!   1. **Decode** the `f64` exactly into a sign, an integer mantissa, and a power-of-two exponent
//!      ([`decode`]). Nothing is lost here; every finite `f64` is `±mant × 2^exp`.
//!   2. **Scale and round** ([`round`]). Scaling by `2^F` only moves the exponent, so the scaled
//!      value is still exact. Rounding it to an integer only needs to look at the bits that fall
//!      off to the right of the radix point: the first of them (`round`), and whether any of the
//!      rest is set (`sticky`).
//!   3. **Handle overflow** ([`overflow`]): clamp or wrap the rounded integer into the range of
//!      the format.
//!
//! The result is a [`QuantizedValue`], which can then be rendered in several representations
//! ([`repr`]).

use crate::FixedFormat;

/// A value quantized into a [`FixedFormat`]: the format, plus the raw two's complement integer
/// `raw` that the hardware would store. It represents the real number `raw × 2^-F`.
///
/// Quantized values are created by [`quantize`](crate::quantize) (or, if you already have the
/// raw bits, by [`QuantizedValue::from_raw`]) and never change afterwards.
///
/// ```
/// # use soft_fixed::*;
/// let fmt: FixedFormat = "ap_fixed<8,5,AP_RND_INF,AP_SAT>".parse()?;
/// let q = quantize(-2.3, fmt)?;
/// assert_eq!(q.raw(), -18);
/// assert_eq!(q.to_f64(), -2.25);
/// assert_eq!(q.format(), fmt);
/// # Ok::<(), soft_fixed::Error>(())
/// ```
#[derive(Clone, Copy)]
#[derive(Eq, PartialEq, Hash)]
pub struct QuantizedValue {
  format: FixedFormat,
  raw: i128,
}

/// Basics
mod basics;

/// Exact decomposition of `f64`s
mod decode;

/// Scaling and rounding to an integer
mod round;

/// Saturation and wrap-around
mod overflow;

/// The `quantize` entry points
mod quantize;

/// Conversion to binary, hex, base-N, float, and int
mod repr;

/// Debug and Display
mod fmt;

#[cfg(test)]
mod rational;


pub use quantize::{quantize, quantize_batch};
pub use repr::{Rendered, Repr, convert};

#[cfg(feature = "bench")]
pub(crate) use decode::decode_f64;
#[cfg(feature = "bench")]
pub(crate) use round::scale_round;
