//! This crate provides a bit-accurate software emulation of the fixed-point number formats used by
//! FPGA/ASIC high-level synthesis toolchains (the `ap_fixed`, `ap_ufixed`, `ap_int` and `ap_uint`
//! family), so that an algorithm can be validated against its hardware target before synthesis.
//!
//! # Introduction
//!
//! A fixed-point format stores a number as a plain two's complement integer `raw` of `W` bits,
//! with an implicit scale of `2^-F`: the real value is `raw × 2^-F`. In hardware toolchains the
//! format is parameterised by the word width `W` and the number of *integer* bits `I`, so that
//! `F = W - I` (and, unusually, both `I` and `F` may be negative or exceed `W`).
//!
//! Turning a real value into such a format requires two policies:
//!
//!   - a **rounding mode**, telling which representable value to pick when the input falls between
//!     two of them (see [`RoundingMode`]), and
//!   - an **overflow mode**, telling what to do when the rounded value falls outside the
//!     representable range (see [`OverflowMode`]).
//!
//! Both are applied exactly: the input `f64` is decomposed into its integer mantissa and
//! exponent, so no floating point rounding ever sneaks into the result. Correctness is checked
//! against an exact rational oracle.
//!
//! The crate also provides [`RangeScaler`], which learns from data a power-of-two mapping
//! `inf + (x - min) / 2^shift` placing each field inside a target interval, so that real data can
//! be brought into range *before* quantization, with a shift that is free in hardware.
//!
//! # Usage
//!
//! ```
//! use soft_fixed::{FixedFormat, OverflowMode, RoundingMode, Repr, Rendered, quantize};
//!
//! // Build formats by value, or parse the HLS spelling.
//! let fmt = FixedFormat::ap_fixed(8, 5)?
//!   .with_modes(RoundingMode::RoundNearestAwayFromZero, OverflowMode::Saturate)?;
//! let same: FixedFormat = "ap_fixed<8,5,AP_RND_INF,AP_SAT>".parse()?;
//! assert_eq!(fmt, same);
//!
//! // Quantize, then look at the result in several representations.
//! let q = quantize(3.99, fmt)?;
//! assert_eq!(q.raw(), 32);
//! assert_eq!(q.to_f64(), 4.0);
//! assert_eq!(q.render(Repr::Binary)?, Rendered::Text("00100.000".into()));
//! assert_eq!(q.render(Repr::Hex)?, Rendered::Text("0x20".into()));
//! # Ok::<(), soft_fixed::Error>(())
//! ```
//!
//! Batches keep their shape: a sequence gives back a sequence, and a keyed collection (a mapping
//! from field names to sequences, or a column-oriented table) gives back the same keys, in the
//! same order. See [`Batch`].

mod error;
mod format;
mod fixed;
mod batch;
mod scaler;

pub mod par;
pub mod reference;

pub use error::{Error, Result};
pub use format::{FixedFormat, OverflowMode, RoundingMode};
pub use fixed::{QuantizedValue, Rendered, Repr, convert, quantize, quantize_batch};
pub use batch::{Batch, FieldId, Keyed};
pub use scaler::{FitOptions, RangeScaler, ScalerRow, ScalerTable, Target};

/// Re-export some internals for benchmarking purposes, only on `feature = "bench"`.
#[cfg(feature = "bench")]
mod bench;
#[cfg(feature = "bench")]
pub use bench::*;

/// Number of cases for each `proptest!` block in this crate.
#[cfg(test)]
const PROPTEST_CASES: u32 = if cfg!(debug_assertions) {0x4000} else {0x10_0000};
