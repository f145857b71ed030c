use super::*;

use crate::{Error, Result};

impl core::str::FromStr for FixedFormat {
  type Err = Error;

  /// Parse the HLS spelling of a format:
  ///
  ///   - `ap_fixed<W, I>`, `ap_fixed<W, I, Q>`, `ap_fixed<W, I, Q, O>`, `ap_fixed<W, I, Q, O, N>`
  ///   - the same for `ap_ufixed`
  ///   - `ap_int<W>`, `ap_uint<W>`
  ///
  /// where `Q` and `O` are HLS mode names (see [`RoundingMode`] and [`OverflowMode`]), defaulting
  /// to `AP_TRN` and `AP_WRAP`. The saturation bit count `N` is accepted only if it is `0`.
  ///
  /// ```
  /// # use soft_fixed::*;
  /// let fmt: FixedFormat = "ap_ufixed<12, 4, AP_RND, AP_SAT>".parse()?;
  /// assert!(!fmt.signed());
  /// assert_eq!(fmt.rounding(), RoundingMode::RoundPlusInfinity);
  ///
  /// assert_eq!("ap_int<8>".parse::<FixedFormat>()?, FixedFormat::ap_int(8)?);
  /// # Ok::<(), soft_fixed::Error>(())
  /// ```
  fn from_str(s: &str) -> Result<Self> {
    let malformed = || Error::InvalidFormat(format!("cannot parse {s:?} as an ap_* type"));

    let (name, rest) = s.trim().split_once('<').ok_or_else(malformed)?;
    let params = rest.strip_suffix('>').ok_or_else(malformed)?;
    let params: Vec<&str> = params.split(',').map(str::trim).collect();

    let width = |p: &str| p.parse::<u32>().map_err(|_| malformed());
    match (name.trim(), params.as_slice()) {
      ("ap_int", [w]) => Self::ap_int(width(*w)?),
      ("ap_uint", [w]) => Self::ap_uint(width(*w)?),
      (name @ ("ap_fixed" | "ap_ufixed"), [w, i, modes @ ..]) if modes.len() <= 3 => {
        let total_bits = width(*w)?;
        let int_bits = i.parse::<i32>().map_err(|_| malformed())?;
        let rounding = modes.first().map_or(Ok(RoundingMode::default()), |q| q.parse())?;
        let overflow = modes.get(1).map_or(Ok(OverflowMode::default()), |o| o.parse())?;
        if let Some(n) = modes.get(2) {
          if n.parse::<u32>().map_err(|_| malformed())? != 0 {
            return Err(Error::NotImplemented("saturation bits (N) other than 0"))
          }
        }
        Self::new(total_bits, int_bits, name == "ap_fixed", rounding, overflow)
      },
      _ => Err(malformed()),
    }
  }
}

impl core::fmt::Display for FixedFormat {
  /// The HLS spelling, such that parsing it gives back `self`. Integer formats with the default
  /// policies print as `ap_int<W>` / `ap_uint<W>`; everything else prints all four parameters.
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let is_int = self.frac_bits() == 0
      && self.rounding == RoundingMode::default()
      && self.overflow == OverflowMode::Wrap;
    match (is_int, self.signed) {
      (true, true) => write!(f, "ap_int<{}>", self.total_bits),
      (true, false) => write!(f, "ap_uint<{}>", self.total_bits),
      (false, signed) => write!(
        f, "{}<{},{},{},{}>",
        if signed {"ap_fixed"} else {"ap_ufixed"},
        self.total_bits, self.int_bits, self.rounding, self.overflow,
      ),
    }
  }
}
