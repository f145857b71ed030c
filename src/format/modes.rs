use crate::{Error, Result};

/// How to pick a representable value when the input falls between two of them.
///
/// Rounding acts on the input scaled by `2^F`, i.e. it picks the integer `raw`. Every mode also
/// has an HLS name (see [`RoundingMode::hls_name`]), which is what [`FromStr`] accepts.
///
/// | Mode                          | HLS name         | Picks                                   |
/// |-------------------------------|------------------|-----------------------------------------|
/// | [`RoundNearestAwayFromZero`]  | `AP_RND_INF`     | nearest; ties away from zero            |
/// | [`Truncate`]                  | `AP_TRN`         | the one below (floor, towards −∞)       |
/// | [`TruncateTowardZero`]        | `AP_TRN_ZERO`    | the one closer to zero                  |
/// | [`RoundPlusInfinity`]         | `AP_RND`         | nearest; ties towards +∞                |
/// | [`RoundMinusInfinity`]        | `AP_RND_MIN_INF` | nearest; ties towards −∞                |
/// | [`RoundHalfTowardZero`]       | `AP_RND_ZERO`    | nearest; ties towards zero              |
/// | [`Convergent`]                | `AP_RND_CONV`    | nearest; ties to the even one           |
///
/// The default is [`Truncate`], as in the hardware types.
///
/// [`RoundNearestAwayFromZero`]: RoundingMode::RoundNearestAwayFromZero
/// [`Truncate`]: RoundingMode::Truncate
/// [`TruncateTowardZero`]: RoundingMode::TruncateTowardZero
/// [`RoundPlusInfinity`]: RoundingMode::RoundPlusInfinity
/// [`RoundMinusInfinity`]: RoundingMode::RoundMinusInfinity
/// [`RoundHalfTowardZero`]: RoundingMode::RoundHalfTowardZero
/// [`Convergent`]: RoundingMode::Convergent
/// [`FromStr`]: core::str::FromStr
#[derive(Clone, Copy, Debug, Default)]
#[derive(Eq, PartialEq, Hash)]
pub enum RoundingMode {
  RoundNearestAwayFromZero,
  #[default]
  Truncate,
  TruncateTowardZero,
  RoundPlusInfinity,
  RoundMinusInfinity,
  RoundHalfTowardZero,
  Convergent,
}

/// What to do with a rounded value that falls outside the representable range.
///
/// | Mode                      | HLS name      | Implemented |
/// |---------------------------|---------------|-------------|
/// | [`Saturate`]              | `AP_SAT`      | yes         |
/// | [`Wrap`]                  | `AP_WRAP`     | yes         |
/// | [`SaturateZero`]          | `AP_SAT_ZERO` | no          |
/// | [`SaturateSymmetric`]     | `AP_SAT_SYM`  | no          |
/// | [`WrapSignMagnitude`]     | `AP_WRAP_SM`  | no          |
///
/// The unimplemented modes exist so that their names can be recognised and refused with
/// [`Error::NotImplemented`] when a format is built, rather than rejected as unknown or,
/// worse, replaced by another mode.
///
/// The default is [`Wrap`], as in the hardware types.
///
/// [`Saturate`]: OverflowMode::Saturate
/// [`Wrap`]: OverflowMode::Wrap
/// [`SaturateZero`]: OverflowMode::SaturateZero
/// [`SaturateSymmetric`]: OverflowMode::SaturateSymmetric
/// [`WrapSignMagnitude`]: OverflowMode::WrapSignMagnitude
#[derive(Clone, Copy, Debug, Default)]
#[derive(Eq, PartialEq, Hash)]
pub enum OverflowMode {
  /// Clamp to the smallest or largest representable value.
  Saturate,
  /// Keep the low `W` bits, i.e. reduce modulo `2^W`, and read them back as two's complement if
  /// the format is signed.
  #[default]
  Wrap,
  SaturateZero,
  SaturateSymmetric,
  WrapSignMagnitude,
}

impl RoundingMode {
  pub const ALL: [Self; 7] = [
    Self::RoundNearestAwayFromZero,
    Self::Truncate,
    Self::TruncateTowardZero,
    Self::RoundPlusInfinity,
    Self::RoundMinusInfinity,
    Self::RoundHalfTowardZero,
    Self::Convergent,
  ];

  pub const fn hls_name(self) -> &'static str {
    match self {
      Self::RoundNearestAwayFromZero => "AP_RND_INF",
      Self::Truncate => "AP_TRN",
      Self::TruncateTowardZero => "AP_TRN_ZERO",
      Self::RoundPlusInfinity => "AP_RND",
      Self::RoundMinusInfinity => "AP_RND_MIN_INF",
      Self::RoundHalfTowardZero => "AP_RND_ZERO",
      Self::Convergent => "AP_RND_CONV",
    }
  }
}

impl OverflowMode {
  pub const ALL: [Self; 5] = [
    Self::Saturate,
    Self::Wrap,
    Self::SaturateZero,
    Self::SaturateSymmetric,
    Self::WrapSignMagnitude,
  ];

  pub const fn hls_name(self) -> &'static str {
    match self {
      Self::Saturate => "AP_SAT",
      Self::Wrap => "AP_WRAP",
      Self::SaturateZero => "AP_SAT_ZERO",
      Self::SaturateSymmetric => "AP_SAT_SYM",
      Self::WrapSignMagnitude => "AP_WRAP_SM",
    }
  }

  /// Whether values can actually be quantized with this mode.
  pub const fn is_implemented(self) -> bool {
    matches!(self, Self::Saturate | Self::Wrap)
  }
}

impl core::str::FromStr for RoundingMode {
  type Err = Error;

  /// Parse an HLS mode name, case-insensitively (`"AP_RND_CONV"`, `"ap_trn"`, ...).
  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    Self::ALL.into_iter()
      .find(|mode| mode.hls_name().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownMode(s.into()))
  }
}

impl core::str::FromStr for OverflowMode {
  type Err = Error;

  /// Parse an HLS mode name, case-insensitively (`"AP_SAT"`, `"ap_wrap"`, ...). Unimplemented
  /// modes parse fine; they are refused when a format is built with them.
  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    Self::ALL.into_iter()
      .find(|mode| mode.hls_name().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownMode(s.into()))
  }
}

impl core::fmt::Display for RoundingMode {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.hls_name())
  }
}

impl core::fmt::Display for OverflowMode {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.hls_name())
  }
}
