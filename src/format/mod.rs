//! This module contains the description of a fixed-point format: how wide it is, where the radix
//! point sits, whether it carries a sign, and which rounding and overflow policies apply when a
//! value is brought into it.
//!
//! Some notation used in the comments:
//!
//!   - **W**: total width in bits ([`FixedFormat::total_bits`]), sign bit included.
//!   - **I**: integer bits ([`FixedFormat::int_bits`]), sign bit included for signed formats.
//!   - **F**: fractional bits, always `W - I` ([`FixedFormat::frac_bits`]).
//!   - **raw**: the stored integer; the represented value is `raw × 2^-F`.
//!
//! `I` is not restricted to `0 ..= W`. If `I > W` then `F < 0`: the format only represents
//! multiples of `2^-F`, and low-order integer bits are lost. If `I < 0` then `F > W`: the format
//! only represents small magnitudes, all below `2^I`. Both are legal, and both behave exactly like
//! the hardware types with the same parameters.

/// A fixed-point format: width, radix point, signedness, and rounding/overflow policy.
///
/// Formats are small `Copy` values and cannot be changed once built. Build them with
/// [`FixedFormat::new`], with the HLS-flavoured shorthands ([`FixedFormat::ap_fixed`],
/// [`FixedFormat::ap_ufixed`], [`FixedFormat::ap_int`], [`FixedFormat::ap_uint`]), or by parsing
/// the HLS spelling:
///
/// ```
/// # use soft_fixed::*;
/// let a: FixedFormat = "ap_fixed<16,6,AP_RND_CONV,AP_SAT>".parse()?;
/// let b = FixedFormat::new(16, 6, true, RoundingMode::Convergent, OverflowMode::Saturate)?;
/// assert_eq!(a, b);
/// assert_eq!(a.frac_bits(), 10);
/// assert_eq!(a.to_string(), "ap_fixed<16,6,AP_RND_CONV,AP_SAT>");
/// # Ok::<(), soft_fixed::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
#[derive(Eq, PartialEq, Hash)]
pub struct FixedFormat {
  total_bits: u32,
  int_bits: i32,
  signed: bool,
  rounding: RoundingMode,
  overflow: OverflowMode,
}

/// Constructors, accessors, representable range
mod basics;

/// Rounding and overflow modes, and their HLS names
mod modes;

/// `FromStr` and `Display` in the HLS spelling
mod parse;

pub use modes::{OverflowMode, RoundingMode};
pub(crate) use basics::{ldexp, pow2};
